use core::fmt;

/// A level of the page-table tree, root first.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum Level {
    /// Page global directory; the root table.
    Pgd,
    /// Page middle directory; entries point to PTE tables or are huge leaves.
    Pmd,
    /// Page table; entries are always leaves.
    Pte,
}

impl Level {
    pub const ALL: [Self; 3] = [Self::Pgd, Self::Pmd, Self::Pte];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pgd => "PGD",
            Self::Pmd => "PMD",
            Self::Pte => "PTE",
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
