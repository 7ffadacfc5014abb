//! # sable-binder
//!
//! Name resolution and accessibility checking core for the Sable compiler.
//!
//! Given an immutable declaration graph of assemblies, namespaces, types and
//! members, this crate resolves simple names and member-access receivers to
//! symbols, decides whether a name used as a receiver denotes a value or a
//! type (the `Color Color = new Color()` problem), and enforces declared
//! accessibility, including cross-assembly friendship and the
//! protected-through-receiver rule.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! bind     → name lookup, accessibility checks, candidate filtering
//!   ↓
//! symbols  → immutable per-compilation symbol graph
//!   ↓
//! base     → primitives (Name interning, source positions)
//! ```
//!
//! Lexing, parsing, overload-resolution scoring and code generation are
//! external collaborators: the syntax layer supplies scope chains and
//! positions, the overload stage is reached through [`bind::OverloadJudge`],
//! and everything here is a pure query over a frozen [`symbols::Compilation`].

/// Foundation types: Name interning, source positions
pub mod base;

/// The symbol graph: assemblies, symbols, compilations
pub mod symbols;

/// The binder: lookup, accessibility, receiver disambiguation, filtering
pub mod bind;

mod error;

pub use error::QueryError;

// Re-export the types most callers touch
pub use base::{FileId, LineCol, Name};
pub use bind::{CandidateReason, LookupOptions, LookupResult, SymbolInfo};
pub use symbols::{Accessibility, AssemblyId, Compilation, SymbolId, SymbolKind, Within};
