//! The symbol graph: assemblies, declared symbols, compilations.
//!
//! A [`Compilation`] owns an immutable arena of symbols built once from
//! declarations and metadata. All binder queries read it without locking;
//! adding a reference produces a *new* compilation (see
//! [`Compilation::with_reference`]) rather than mutating the old one.

mod assembly;
mod compilation;
mod ids;
mod symbol;

pub use assembly::AssemblyIdentity;
pub use compilation::{Compilation, CompilationBuilder, Within};
pub use ids::{AssemblyId, CompilationId, SymbolId};
pub use symbol::{Accessibility, SymbolData, SymbolKind};
