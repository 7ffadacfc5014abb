//! Foundation types for the Sable binder.
//!
//! This module provides the primitives the symbol graph is built on:
//! - [`Name`], [`NameTable`] - identifier interning
//! - [`FileId`] - source file handles
//! - [`LineCol`], [`LineIndex`] - diagnostic positions
//!
//! This module has NO dependencies on other sable modules.

mod intern;
mod source;

pub use intern::{Name, NameTable};
pub use source::{FileId, LineCol, LineIndex};

// Re-export text-size types for convenience
pub use text_size::{TextRange, TextSize};
