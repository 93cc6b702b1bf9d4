//! # Table Geometry
//!
//! Everything the walker needs to know about an architecture: index widths,
//! the linear-map offset, and how to read a leaf entry.

use crate::level::Level;
use crate::split::SplitAddress;
use mmu_addresses::{PageSizeClass, PageSizeTable, PhysicalAddress, VirtualAddress};
use mmu_bits::{DecodedWord, FieldSpec, Layout, LayoutError, UnknownEnumValue};

/// Why a [`GeometryConfig`] was rejected.
#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GeometryError {
    #[error(transparent)]
    InvalidLayout(#[from] LayoutError),
    #[error("geometry `{geometry}`: {level} level has {bits} index bits, expected 1..=16")]
    LevelWidth {
        geometry: &'static str,
        level: Level,
        bits: u8,
    },
    #[error("geometry `{geometry}`: {total} translated address bits exceed 64")]
    AddressWidth { geometry: &'static str, total: u32 },
    #[error("geometry `{geometry}`: page shift {shift} is not a supported page size")]
    PageShift { geometry: &'static str, shift: u8 },
    #[error("geometry `{geometry}`: leaf layout has no field `{field}`")]
    MissingField {
        geometry: &'static str,
        field: &'static str,
    },
    #[error("geometry `{geometry}`: frame shift {shift} is out of range")]
    FrameShift { geometry: &'static str, shift: u8 },
    #[error("geometry `{geometry}`: huge flag `{field}` must be a single bit below 64")]
    HugeFlag {
        geometry: &'static str,
        field: &'static str,
    },
}

/// Static description of an architecture's tables, validated by
/// [`Geometry::new`].
#[derive(Copy, Clone, Debug)]
pub struct GeometryConfig {
    /// Label used in logs and reports.
    pub name: &'static str,
    pub pgd_bits: u8,
    pub pmd_bits: u8,
    pub pte_bits: u8,
    /// log2 of the base page size.
    pub page_shift: u8,
    /// Added to a directory entry to reach the next table.
    pub phys_to_virt_offset: u64,
    /// Marks a PMD entry as a leaf. `None` if the architecture has no huge
    /// pages.
    pub huge_flag: Option<FieldSpec>,
    pub leaf_name: &'static str,
    pub leaf_fields: &'static [FieldSpec],
    /// Leaf field holding the frame number.
    pub pfn_field: &'static str,
    /// Left shift turning a frame number into a frame base address.
    pub frame_shift: u8,
    /// Leaf field holding the page-size code. `None` means every leaf maps a
    /// base page.
    pub page_size_field: Option<&'static str>,
    pub page_sizes: PageSizeTable,
}

/// A validated table geometry. Immutable once built.
///
/// ### Examples
/// ```rust
/// # use mmu_addresses::{PageSizeClass, PageSizeEntry, PageSizeTable, VirtualAddress};
/// # use mmu_bits::FieldSpec;
/// # use mmu_walk::{Geometry, GeometryConfig, Level};
/// const LEAF: &[FieldSpec] = &[FieldSpec::flag("P", 0), FieldSpec::new("PFN", 12, 40)];
/// let geometry = Geometry::new(GeometryConfig {
///     name: "demo",
///     pgd_bits: 9,
///     pmd_bits: 9,
///     pte_bits: 9,
///     page_shift: 12,
///     phys_to_virt_offset: 0,
///     huge_flag: None,
///     leaf_name: "pte",
///     leaf_fields: LEAF,
///     pfn_field: "PFN",
///     frame_shift: 12,
///     page_size_field: None,
///     page_sizes: PageSizeTable::new("size", &[]),
/// })?;
/// assert_eq!(geometry.entries(Level::Pgd), 512);
/// assert_eq!(geometry.address_bits(), 39);
///
/// let split = geometry.split(VirtualAddress::new(0x0000_0040_0060_3abc));
/// assert_eq!((split.pgd_index, split.pmd_index, split.pte_index), (256, 3, 3));
/// assert_eq!(split.page_offset, 0xabc);
/// # Ok::<(), mmu_walk::GeometryError>(())
/// ```
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Geometry {
    name: &'static str,
    pgd_bits: u8,
    pmd_bits: u8,
    pte_bits: u8,
    page_shift: u8,
    base_page: PageSizeClass,
    phys_to_virt_offset: u64,
    huge_flag: Option<FieldSpec>,
    leaf_layout: Layout,
    pfn_field: FieldSpec,
    frame_shift: u8,
    page_size_field: Option<FieldSpec>,
    page_sizes: PageSizeTable,
}

impl Geometry {
    /// Validate `config`.
    ///
    /// # Errors
    /// - [`GeometryError::InvalidLayout`] if the leaf fields do not form a layout.
    /// - [`GeometryError::LevelWidth`] / [`GeometryError::AddressWidth`] for bad index widths.
    /// - [`GeometryError::PageShift`] if the base page is not a [`PageSizeClass`].
    /// - [`GeometryError::MissingField`] if the PFN or page-size field is not in the layout.
    /// - [`GeometryError::FrameShift`] / [`GeometryError::HugeFlag`] for out-of-range bits.
    pub fn new(config: GeometryConfig) -> Result<Self, GeometryError> {
        let geometry = config.name;
        let leaf_layout = Layout::new(config.leaf_name, config.leaf_fields)?;

        for (level, bits) in [
            (Level::Pgd, config.pgd_bits),
            (Level::Pmd, config.pmd_bits),
            (Level::Pte, config.pte_bits),
        ] {
            if !(1..=16).contains(&bits) {
                return Err(GeometryError::LevelWidth {
                    geometry,
                    level,
                    bits,
                });
            }
        }

        let total = u32::from(config.pgd_bits)
            + u32::from(config.pmd_bits)
            + u32::from(config.pte_bits)
            + u32::from(config.page_shift);
        if total > 64 {
            return Err(GeometryError::AddressWidth { geometry, total });
        }

        let base_page =
            PageSizeClass::from_shift(config.page_shift).ok_or(GeometryError::PageShift {
                geometry,
                shift: config.page_shift,
            })?;

        let field = |name: &'static str| {
            leaf_layout
                .field(name)
                .ok_or(GeometryError::MissingField {
                    geometry,
                    field: name,
                })
        };
        let pfn_field = field(config.pfn_field)?;
        let page_size_field = config.page_size_field.map(field).transpose()?;

        if config.frame_shift >= 64 {
            return Err(GeometryError::FrameShift {
                geometry,
                shift: config.frame_shift,
            });
        }

        if let Some(huge) = config.huge_flag
            && (!huge.is_flag() || huge.end() > 64)
        {
            return Err(GeometryError::HugeFlag {
                geometry,
                field: huge.name(),
            });
        }

        Ok(Self {
            name: config.name,
            pgd_bits: config.pgd_bits,
            pmd_bits: config.pmd_bits,
            pte_bits: config.pte_bits,
            page_shift: config.page_shift,
            base_page,
            phys_to_virt_offset: config.phys_to_virt_offset,
            huge_flag: config.huge_flag,
            leaf_layout,
            pfn_field,
            frame_shift: config.frame_shift,
            page_size_field,
            page_sizes: config.page_sizes,
        })
    }

    #[inline]
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Index bits consumed by `level`.
    #[inline]
    #[must_use]
    pub const fn bits(&self, level: Level) -> u8 {
        match level {
            Level::Pgd => self.pgd_bits,
            Level::Pmd => self.pmd_bits,
            Level::Pte => self.pte_bits,
        }
    }

    /// Number of 8-byte entries in a table at `level`.
    #[inline]
    #[must_use]
    pub const fn entries(&self, level: Level) -> usize {
        1 << self.bits(level)
    }

    /// Lowest address bit of `level`'s index.
    #[must_use]
    pub const fn index_shift(&self, level: Level) -> u8 {
        match level {
            Level::Pte => self.page_shift,
            Level::Pmd => self.page_shift + self.pte_bits,
            Level::Pgd => self.page_shift + self.pte_bits + self.pmd_bits,
        }
    }

    /// Number of address bits consumed by the walk.
    #[must_use]
    pub const fn address_bits(&self) -> u8 {
        self.index_shift(Level::Pgd) + self.pgd_bits
    }

    #[inline]
    #[must_use]
    pub const fn page_shift(&self) -> u8 {
        self.page_shift
    }

    #[inline]
    #[must_use]
    pub const fn base_page(&self) -> PageSizeClass {
        self.base_page
    }

    #[inline]
    #[must_use]
    pub const fn phys_to_virt_offset(&self) -> u64 {
        self.phys_to_virt_offset
    }

    /// Where the table referenced by a directory entry is readable.
    ///
    /// The raw entry is used unmasked; on the supported architectures
    /// directory entries hold a plain physical pointer.
    #[inline]
    #[must_use]
    pub const fn table_address(&self, raw: u64) -> VirtualAddress {
        PhysicalAddress::new(raw).to_virtual(self.phys_to_virt_offset)
    }

    #[inline]
    #[must_use]
    pub const fn huge_flag(&self) -> Option<FieldSpec> {
        self.huge_flag
    }

    /// Whether a PMD entry is a huge leaf rather than a table pointer.
    #[must_use]
    pub const fn is_huge(&self, raw: u64) -> bool {
        match self.huge_flag {
            Some(flag) => flag.is_set(raw),
            None => false,
        }
    }

    #[inline]
    #[must_use]
    pub const fn leaf_layout(&self) -> &Layout {
        &self.leaf_layout
    }

    #[inline]
    #[must_use]
    pub const fn pfn_field(&self) -> FieldSpec {
        self.pfn_field
    }

    #[inline]
    #[must_use]
    pub const fn frame_shift(&self) -> u8 {
        self.frame_shift
    }

    #[inline]
    #[must_use]
    pub const fn page_size_field(&self) -> Option<FieldSpec> {
        self.page_size_field
    }

    #[inline]
    #[must_use]
    pub const fn page_sizes(&self) -> &PageSizeTable {
        &self.page_sizes
    }

    /// Decode a leaf entry with [`leaf_layout`](Self::leaf_layout).
    #[must_use]
    pub fn decode_leaf(&self, raw: u64) -> DecodedWord {
        self.leaf_layout.decode(raw)
    }

    /// Frame base address of a leaf.
    #[must_use]
    pub const fn frame_base(&self, raw: u64) -> PhysicalAddress {
        PhysicalAddress::new(self.pfn_field.extract(raw) << self.frame_shift)
    }

    /// Page size mapped by a leaf.
    ///
    /// # Errors
    /// [`UnknownEnumValue`] if the leaf's size code has no class.
    pub fn page_size(&self, raw: u64) -> Result<PageSizeClass, UnknownEnumValue> {
        match self.page_size_field {
            Some(field) => self.page_sizes.class_for(field.extract(raw)),
            None => Ok(self.base_page),
        }
    }

    /// Split `address` into per-level indices. Total; see [`SplitAddress`].
    #[must_use]
    pub fn split(&self, address: VirtualAddress) -> SplitAddress {
        SplitAddress::new(address, self)
    }

    /// Rebuild the address a [`SplitAddress`] was taken from.
    #[must_use]
    pub fn join(&self, split: &SplitAddress) -> VirtualAddress {
        split.join(self)
    }
}
