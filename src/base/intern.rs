//! Identifier interning for the symbol graph.

use rustc_hash::FxHashMap;
use smol_str::SmolStr;
use std::fmt;

/// An interned identifier.
///
/// `Name` is a lightweight handle (just a u32) into a [`NameTable`].
/// Comparing two names from the same table is an integer comparison, which
/// is what makes name-based member lookup cheap.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Name(u32);

impl Name {
    #[inline]
    pub(crate) const fn from_raw(index: u32) -> Self {
        Self(index)
    }

    /// Get the raw index.
    #[inline]
    pub const fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Name({})", self.0)
    }
}

/// Deduplicating storage for identifier strings.
///
/// The table is only mutable while a compilation is under construction;
/// once the graph is frozen no new names are interned, so lookups need no
/// synchronization at all. This mirrors the graph lifecycle: build once,
/// query from many threads.
#[derive(Clone, Default)]
pub struct NameTable {
    map: FxHashMap<SmolStr, u32>,
    strings: Vec<SmolStr>,
}

impl NameTable {
    /// Create a new empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern a string, returning its `Name` handle.
    ///
    /// Returns the existing handle if the string was interned before.
    pub fn intern(&mut self, s: &str) -> Name {
        if let Some(&index) = self.map.get(s) {
            return Name::from_raw(index);
        }
        let smol = SmolStr::new(s);
        let index = self.strings.len() as u32;
        self.strings.push(smol.clone());
        self.map.insert(smol, index);
        Name::from_raw(index)
    }

    /// Look up the handle for a string without interning it.
    pub fn get(&self, s: &str) -> Option<Name> {
        self.map.get(s).map(|&index| Name::from_raw(index))
    }

    /// Resolve a `Name` back to its string.
    ///
    /// Returns `None` for a handle from a different table.
    pub fn resolve(&self, name: Name) -> Option<&str> {
        self.strings.get(name.0 as usize).map(|s| s.as_str())
    }

    /// Get the number of interned strings.
    pub fn len(&self) -> usize {
        self.strings.len()
    }

    /// Check if the table is empty.
    pub fn is_empty(&self) -> bool {
        self.strings.is_empty()
    }
}

impl fmt::Debug for NameTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NameTable")
            .field("count", &self.strings.len())
            .finish()
    }
}
