use crate::field::FieldSpec;
use alloc::vec::Vec;

/// The named field values of one raw word, in layout order.
///
/// Produced by [`Layout::decode`](crate::Layout::decode); read-only.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct DecodedWord {
    layout: &'static str,
    raw: u64,
    values: Vec<(FieldSpec, u64)>,
}

impl DecodedWord {
    pub(crate) const fn new(layout: &'static str, raw: u64, values: Vec<(FieldSpec, u64)>) -> Self {
        Self {
            layout,
            raw,
            values,
        }
    }

    /// Name of the layout this word was decoded with.
    #[inline]
    #[must_use]
    pub const fn layout_name(&self) -> &'static str {
        self.layout
    }

    /// The undecoded word.
    #[inline]
    #[must_use]
    pub const fn raw(&self) -> u64 {
        self.raw
    }

    /// Value of the field called `name`, if the layout has one.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<u64> {
        self.values
            .iter()
            .find(|(field, _)| field.name() == name)
            .map(|&(_, value)| value)
    }

    /// `(spec, value)` pairs in layout order.
    pub fn fields(&self) -> impl DoubleEndedIterator<Item = (FieldSpec, u64)> + '_ {
        self.values.iter().copied()
    }

    /// `(name, value)` pairs in layout order.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (&'static str, u64)> + '_ {
        self.values.iter().map(|&(field, value)| (field.name(), value))
    }

    /// Names of the fields with a nonzero value, most-significant bit first.
    ///
    /// Multi-bit fields are listed like flags. Fields in `ignore` are skipped.
    pub fn set_fields<'a>(&'a self, ignore: &'a [&str]) -> impl Iterator<Item = &'static str> + 'a {
        let mut fields = self
            .values
            .iter()
            .filter(|(_, value)| *value != 0)
            .filter(|(field, _)| !ignore.contains(&field.name()))
            .map(|&(field, _)| field)
            .collect::<Vec<_>>();
        fields.sort_by_key(|field| core::cmp::Reverse(field.offset()));
        fields.into_iter().map(|field| field.name())
    }
}
