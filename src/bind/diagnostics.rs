//! Diagnostics — how resolution failures reach the frontend.
//!
//! Accessibility failures and receiver fallback never escape the binder as
//! errors; they arrive here as [`CandidateReason`] values and become
//! diagnostics with stable codes. Only API misuse is an `Err` (see
//! [`crate::QueryError`]).

use std::sync::Arc;

use crate::base::{FileId, LineCol, LineIndex, TextRange};
use crate::symbols::Compilation;

use super::filter::SymbolInfo;
use super::lookup::CandidateReason;

// ============================================================================
// DIAGNOSTIC TYPES
// ============================================================================

/// Severity level of a diagnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Severity {
    Error,
    Warning,
    Info,
    Hint,
}

impl Severity {
    /// Convert to LSP severity number.
    pub fn to_lsp(self) -> u32 {
        match self {
            Severity::Error => 1,
            Severity::Warning => 2,
            Severity::Info => 3,
            Severity::Hint => 4,
        }
    }
}

/// A diagnostic message with location.
#[derive(Clone, Debug)]
pub struct Diagnostic {
    /// The file containing this diagnostic.
    pub file: FileId,
    pub start: LineCol,
    pub end: LineCol,
    pub severity: Severity,
    /// Stable code (e.g. "E0401").
    pub code: Option<&'static str>,
    pub message: Arc<str>,
    /// Optional related locations (candidate declarations and the like).
    pub related: Vec<RelatedInfo>,
}

/// Related information for a diagnostic.
#[derive(Clone, Debug)]
pub struct RelatedInfo {
    pub file: FileId,
    pub pos: LineCol,
    pub message: Arc<str>,
}

impl Diagnostic {
    /// Create a new error diagnostic.
    pub fn error(file: FileId, start: LineCol, message: impl Into<Arc<str>>) -> Self {
        Self {
            file,
            start,
            end: start,
            severity: Severity::Error,
            code: None,
            message: message.into(),
            related: Vec::new(),
        }
    }

    /// Create an error diagnostic from the byte range of a syntax node.
    pub fn error_in_range(
        file: FileId,
        range: TextRange,
        lines: &LineIndex,
        message: impl Into<Arc<str>>,
    ) -> Self {
        Self::error(file, lines.line_col(range.start()), message)
            .with_end(lines.line_col(range.end()))
    }

    /// Set the end of the span.
    pub fn with_end(mut self, end: LineCol) -> Self {
        self.end = end;
        self
    }

    /// Set the error code.
    pub fn with_code(mut self, code: &'static str) -> Self {
        self.code = Some(code);
        self
    }

    /// Add related information.
    pub fn with_related(mut self, info: RelatedInfo) -> Self {
        self.related.push(info);
        self
    }
}

// ============================================================================
// DIAGNOSTIC CODES
// ============================================================================

/// Stable codes for binder diagnostics.
pub mod codes {
    /// The name does not exist in the current context.
    pub const UNDEFINED_NAME: &str = "E0400";
    /// Symbol exists but is inaccessible due to its protection level.
    pub const INACCESSIBLE_SYMBOL: &str = "E0401";
    /// Protected member reached through a qualifier of the wrong type.
    pub const INACCESSIBLE_VIA_QUALIFIER: &str = "E0402";
    /// Multiple equally ranked candidates.
    pub const AMBIGUOUS_REFERENCE: &str = "E0403";
    /// The receiver has no such member.
    pub const NO_SUCH_MEMBER: &str = "E0404";
    /// The candidate is not a value in a value position.
    pub const NOT_A_VALUE: &str = "E0405";
    /// The property is visible but the used accessor is not.
    pub const INACCESSIBLE_ACCESSOR: &str = "E0406";
    /// The overload stage found no single best candidate.
    pub const AMBIGUOUS_OVERLOAD: &str = "E0407";
    /// Instance member used in a static context, or the reverse.
    pub const STATIC_INSTANCE_MISMATCH: &str = "E0408";
}

// ============================================================================
// DIAGNOSTIC COLLECTOR
// ============================================================================

/// Collects diagnostics while the frontend binds expressions.
#[derive(Clone, Debug, Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollector {
    /// Create a new empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a diagnostic.
    pub fn add(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// The name does not exist.
    pub fn undefined_name(&mut self, file: FileId, pos: LineCol, name: &str) {
        self.add(
            Diagnostic::error(
                file,
                pos,
                format!("the name '{name}' does not exist in the current context"),
            )
            .with_code(codes::UNDEFINED_NAME),
        );
    }

    /// Inaccessible symbol.
    pub fn inaccessible_symbol(&mut self, file: FileId, pos: LineCol, name: &str) {
        self.add(
            Diagnostic::error(
                file,
                pos,
                format!("'{name}' is inaccessible due to its protection level"),
            )
            .with_code(codes::INACCESSIBLE_SYMBOL),
        );
    }

    /// Protected member reached through a qualifier of the wrong type.
    pub fn inaccessible_via_qualifier(
        &mut self,
        file: FileId,
        pos: LineCol,
        member: &str,
        qualifier: &str,
        required: &str,
    ) {
        self.add(
            Diagnostic::error(
                file,
                pos,
                format!(
                    "cannot access protected member '{member}' via a qualifier of type \
                     '{qualifier}'; the qualifier must be of type '{required}' or derived from it"
                ),
            )
            .with_code(codes::INACCESSIBLE_VIA_QUALIFIER),
        );
    }

    /// Ambiguous reference between named candidates.
    pub fn ambiguous_reference(&mut self, file: FileId, pos: LineCol, name: &str, candidates: &[&str]) {
        self.add(
            Diagnostic::error(
                file,
                pos,
                format!(
                    "'{name}' is an ambiguous reference between: {}",
                    candidates.join(", ")
                ),
            )
            .with_code(codes::AMBIGUOUS_REFERENCE),
        );
    }

    /// No such member on the receiver.
    pub fn no_such_member(&mut self, file: FileId, pos: LineCol, container: &str, member: &str) {
        self.add(
            Diagnostic::error(
                file,
                pos,
                format!("'{container}' does not contain a definition for '{member}'"),
            )
            .with_code(codes::NO_SUCH_MEMBER),
        );
    }

    /// Not a value (type/namespace/event misuse in a value position).
    pub fn not_a_value(&mut self, file: FileId, pos: LineCol, name: &str) {
        self.add(
            Diagnostic::error(
                file,
                pos,
                format!("'{name}' is not a value and cannot be used in this context"),
            )
            .with_code(codes::NOT_A_VALUE),
        );
    }

    /// The used accessor is more restricted than the property.
    pub fn inaccessible_accessor(
        &mut self,
        file: FileId,
        pos: LineCol,
        property: &str,
        accessor: &str,
    ) {
        self.add(
            Diagnostic::error(
                file,
                pos,
                format!("the {accessor} accessor of '{property}' is inaccessible"),
            )
            .with_code(codes::INACCESSIBLE_ACCESSOR),
        );
    }

    /// No single best overload.
    pub fn ambiguous_overload(&mut self, file: FileId, pos: LineCol, name: &str) {
        self.add(
            Diagnostic::error(file, pos, format!("the call to '{name}' is ambiguous"))
                .with_code(codes::AMBIGUOUS_OVERLOAD),
        );
    }

    /// Instance/static misuse.
    pub fn static_instance_mismatch(&mut self, file: FileId, pos: LineCol, name: &str) {
        self.add(
            Diagnostic::error(
                file,
                pos,
                format!("member '{name}' cannot be accessed in this instance/static context"),
            )
            .with_code(codes::STATIC_INSTANCE_MISMATCH),
        );
    }

    /// Report a failed [`SymbolInfo`] at a source position.
    ///
    /// Resolved infos report nothing; a reason maps to its code, and the
    /// candidates' names are pulled from the compilation for the message.
    pub fn report(
        &mut self,
        comp: &Compilation,
        file: FileId,
        pos: LineCol,
        name: &str,
        info: &SymbolInfo,
    ) {
        if info.is_resolved() {
            return;
        }
        match info.reason() {
            CandidateReason::None => self.undefined_name(file, pos, name),
            CandidateReason::Ambiguous => {
                let names: Vec<&str> = info
                    .candidate_symbols()
                    .iter()
                    .filter_map(|&id| comp.symbol_name(id).ok())
                    .collect();
                self.ambiguous_reference(file, pos, name, &names);
            }
            CandidateReason::OverloadResolutionFailure => self.ambiguous_overload(file, pos, name),
            CandidateReason::Inaccessible => self.inaccessible_symbol(file, pos, name),
            CandidateReason::NotAValue => self.not_a_value(file, pos, name),
            CandidateReason::StaticInstanceMismatch => {
                self.static_instance_mismatch(file, pos, name)
            }
            CandidateReason::InaccessibleGetter => {
                self.inaccessible_accessor(file, pos, name, "get")
            }
            CandidateReason::InaccessibleSetter => {
                self.inaccessible_accessor(file, pos, name, "set")
            }
        }
    }

    /// Get all diagnostics.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Get diagnostics for a specific file.
    pub fn diagnostics_for_file(&self, file: FileId) -> Vec<&Diagnostic> {
        self.diagnostics.iter().filter(|d| d.file == file).collect()
    }

    /// Get the number of errors.
    pub fn error_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .count()
    }

    /// Check if there are any errors.
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity == Severity::Error)
    }

    /// Take all diagnostics, leaving the collector empty.
    pub fn take(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }
}
