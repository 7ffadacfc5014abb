//! The binder: name lookup, accessibility, receiver disambiguation,
//! candidate filtering, and the diagnostics they feed.
//!
//! Everything here is a pure query over a frozen
//! [`crate::symbols::Compilation`]; the modules split along the data flow:
//!
//! ```text
//! lookup  → raw candidates from the scope chain (pre-accessibility)
//! receiver→ value-vs-type disambiguation for member-access receivers
//! filter  → accessibility + applicability, reduced to SymbolInfo
//! access  → the accessibility checker both of the above lean on
//! ```

mod access;
mod diagnostics;
mod filter;
mod lookup;
mod receiver;

pub use access::Access;
pub use diagnostics::{Diagnostic, DiagnosticCollector, RelatedInfo, Severity, codes};
pub use filter::{
    CandidateFilter, FilterOutcome, FilterResult, SymbolInfo, ValueUsage, reduce_method_group,
};
pub use lookup::{
    CandidateReason, LookupEngine, LookupOptions, LookupPosition, LookupResult, Scope, ScopeChain,
};
pub use receiver::{ArityJudge, MemberAccess, OverloadJudge, ReceiverBinder, ReceiverResolution};
