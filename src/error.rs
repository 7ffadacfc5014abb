//! API-misuse errors.
//!
//! These are programmer errors on the query surface, not language
//! diagnostics: accessibility failures, ambiguity and lookup misses are
//! expressed as [`crate::bind::CandidateReason`] values and never as `Err`.

use thiserror::Error;

use crate::symbols::{AssemblyId, CompilationId, SymbolId};

/// A misuse of the query surface.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QueryError {
    /// A symbol id from another compilation was passed to a query.
    ///
    /// Ids are scoped to the compilation that created them; a stale or
    /// foreign id is a caller bug and must not silently resolve to `false`.
    #[error("symbol {symbol:?} belongs to {actual:?}, not to the queried compilation {expected:?}")]
    ForeignSymbol {
        symbol: SymbolId,
        expected: CompilationId,
        actual: CompilationId,
    },

    /// An assembly id from another compilation was passed to a query.
    #[error("assembly {assembly:?} belongs to {actual:?}, not to the queried compilation {expected:?}")]
    ForeignAssembly {
        assembly: AssemblyId,
        expected: CompilationId,
        actual: CompilationId,
    },

    /// A symbol of the wrong kind was passed where a type is required.
    #[error("symbol {symbol:?} is not a type")]
    NotAType { symbol: SymbolId },
}
