//! Identifiers for compilations and the symbols they own.

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

/// A globally unique identifier for one compilation snapshot.
///
/// Every query id carries the `CompilationId` that minted it, so passing a
/// symbol from one compilation to another is detected instead of resolving
/// to garbage.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CompilationId(u32);

static NEXT_COMPILATION: AtomicU32 = AtomicU32::new(0);

impl CompilationId {
    pub(crate) fn fresh() -> Self {
        Self(NEXT_COMPILATION.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw index.
    #[inline]
    pub const fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for CompilationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "CompilationId({})", self.0)
    }
}

/// A handle for a symbol in a specific compilation.
///
/// Combines the owning compilation with an arena index. Stable only within
/// its compilation: [`super::Compilation::with_reference`] mints new ids.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SymbolId {
    /// The compilation that owns this symbol
    pub compilation: CompilationId,
    pub(crate) index: u32,
}

impl SymbolId {
    #[inline]
    pub(crate) const fn new(compilation: CompilationId, index: u32) -> Self {
        Self { compilation, index }
    }
}

impl fmt::Debug for SymbolId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SymbolId({}:{})", self.compilation.0, self.index)
    }
}

/// A handle for an assembly known to a specific compilation.
///
/// Two assemblies are the same assembly only when their `AssemblyId`s are
/// equal; identity is never inferred from a matching name.
#[derive(Copy, Clone, Eq, PartialEq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AssemblyId {
    /// The compilation that knows this assembly
    pub compilation: CompilationId,
    pub(crate) index: u32,
}

impl AssemblyId {
    #[inline]
    pub(crate) const fn new(compilation: CompilationId, index: u32) -> Self {
        Self { compilation, index }
    }
}

impl fmt::Debug for AssemblyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AssemblyId({}:{})", self.compilation.0, self.index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_compilation_ids_differ() {
        let a = CompilationId::fresh();
        let b = CompilationId::fresh();
        assert_ne!(a, b);
    }

    #[test]
    fn test_symbol_id_equality() {
        let c = CompilationId::fresh();
        let other = CompilationId::fresh();

        let a = SymbolId::new(c, 0);
        let b = SymbolId::new(c, 0);
        let d = SymbolId::new(c, 1);
        let e = SymbolId::new(other, 0);

        assert_eq!(a, b);
        assert_ne!(a, d); // different index
        assert_ne!(a, e); // different compilation
    }
}
