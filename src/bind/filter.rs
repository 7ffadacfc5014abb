//! Candidate filtering and reduction to [`SymbolInfo`].
//!
//! An inaccessible candidate is not part of the member group at all: it is
//! invisible, never "ambiguous" or "wrong overload". The one concession to
//! diagnostics is that emptying a non-empty set records why, and keeps the
//! discarded candidates so the frontend can point at the best one.

use crate::error::QueryError;
use crate::symbols::{Compilation, SymbolId, SymbolKind, Within};

use super::lookup::{CandidateReason, LookupOptions, LookupPosition, LookupResult};

/// The result shape tooling and diagnostics consume.
///
/// Invariant: a resolved `symbol` means no candidates and reason `None`;
/// an empty `symbol` carries a non-`None` reason whenever any candidate
/// existed.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SymbolInfo {
    symbol: Option<SymbolId>,
    candidates: Vec<SymbolId>,
    reason: CandidateReason,
}

impl SymbolInfo {
    /// A successful, unique resolution.
    pub fn resolved(symbol: SymbolId) -> Self {
        Self {
            symbol: Some(symbol),
            candidates: Vec::new(),
            reason: CandidateReason::None,
        }
    }

    /// A true miss: the name does not exist.
    pub fn none() -> Self {
        Self {
            symbol: None,
            candidates: Vec::new(),
            reason: CandidateReason::None,
        }
    }

    /// A diagnosed failure with the candidates that were considered.
    pub fn unresolved(reason: CandidateReason, candidates: Vec<SymbolId>) -> Self {
        debug_assert!(
            candidates.is_empty() || reason != CandidateReason::None,
            "candidates without a reason"
        );
        Self {
            symbol: None,
            candidates,
            reason,
        }
    }

    pub fn symbol(&self) -> Option<SymbolId> {
        self.symbol
    }

    pub fn candidate_symbols(&self) -> &[SymbolId] {
        &self.candidates
    }

    pub fn reason(&self) -> CandidateReason {
        self.reason
    }

    pub fn is_resolved(&self) -> bool {
        self.symbol.is_some()
    }
}

/// How the bound expression uses the value.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum ValueUsage {
    #[default]
    Read,
    Write,
    ReadWrite,
    /// `+=` / `-=` on an event.
    AddRemoveHandler,
}

/// What reduction produced: a decided answer, or a method group the
/// external overload stage still has to rank.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FilterOutcome {
    Decided(SymbolInfo),
    MethodGroup(Vec<SymbolId>),
}

/// Reduction result plus what diagnostics need to know about the denial.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FilterResult {
    pub outcome: FilterOutcome,
    /// Every accessibility denial was the protected-receiver rule: report
    /// the qualifier, not the member.
    pub qualifier_failure: bool,
}

impl FilterResult {
    fn decided(info: SymbolInfo) -> Self {
        Self {
            outcome: FilterOutcome::Decided(info),
            qualifier_failure: false,
        }
    }
}

/// Applies accessibility and applicability to a raw candidate set.
pub struct CandidateFilter<'a> {
    comp: &'a Compilation,
}

impl<'a> CandidateFilter<'a> {
    pub fn new(comp: &'a Compilation) -> Self {
        Self { comp }
    }

    /// Reduce raw lookup candidates for a binding position.
    ///
    /// `through` is the receiver's static type, when there is a receiver
    /// expression; it participates in protected-member checks only.
    pub fn filter(
        &self,
        raw: &LookupResult,
        within: Within,
        through: Option<SymbolId>,
        usage: ValueUsage,
        options: &LookupOptions,
    ) -> Result<FilterResult, QueryError> {
        self.comp.check_within(within)?;
        if let Some(t) = through {
            self.comp.check_symbol(t)?;
        }
        for candidate in raw.candidates() {
            self.comp.check_symbol(candidate)?;
        }

        // A tier-level ambiguity survives filtering as-is: the caller
        // reports it against the full candidate list.
        if raw.reason() == CandidateReason::Ambiguous {
            return Ok(FilterResult::decided(SymbolInfo::unresolved(
                CandidateReason::Ambiguous,
                raw.candidates().collect(),
            )));
        }

        if raw.is_empty() {
            return Ok(FilterResult::decided(SymbolInfo::none()));
        }

        // A `base` receiver waives the protected-receiver restriction.
        let through = if options.base_receiver { None } else { through };

        let mut survivors: Vec<SymbolId> = Vec::new();
        let mut removal: Option<CandidateReason> = None;
        let mut inaccessible_seen = false;
        let mut all_denials_through_receiver = true;

        for candidate in raw.candidates() {
            let data = self.comp.data(candidate);

            let access = self.comp.access_check(candidate, within, through);
            if !access.allowed {
                inaccessible_seen = true;
                if !access.failed_through_receiver {
                    all_denials_through_receiver = false;
                }
                continue;
            }

            if options.position == LookupPosition::Value && data.kind.is_type_or_namespace() {
                note(&mut removal, CandidateReason::NotAValue);
                continue;
            }

            if data.kind == SymbolKind::Event
                && !data.is_field_like
                && usage != ValueUsage::AddRemoveHandler
            {
                note(&mut removal, CandidateReason::NotAValue);
                continue;
            }

            let is_member = matches!(
                data.kind,
                SymbolKind::Field | SymbolKind::Property | SymbolKind::Event | SymbolKind::Method
            );
            if is_member && options.must_be_instance && data.is_static {
                note(&mut removal, CandidateReason::StaticInstanceMismatch);
                continue;
            }
            if is_member && options.must_not_be_instance && !data.is_static {
                note(&mut removal, CandidateReason::StaticInstanceMismatch);
                continue;
            }

            if data.kind == SymbolKind::Property {
                if let Some(denied) = self.accessor_denial(candidate, within, through, usage) {
                    note(&mut removal, denied);
                    continue;
                }
            }

            survivors.push(candidate);
        }

        if survivors.is_empty() {
            // Accessor and applicability reasons are more precise than a
            // blanket "inaccessible"; prefer them when recorded.
            let reason = removal.unwrap_or(CandidateReason::Inaccessible);
            return Ok(FilterResult {
                outcome: FilterOutcome::Decided(SymbolInfo::unresolved(
                    reason,
                    raw.candidates().collect(),
                )),
                qualifier_failure: inaccessible_seen
                    && removal.is_none()
                    && all_denials_through_receiver,
            });
        }

        let all_methods = survivors
            .iter()
            .all(|&id| self.comp.data(id).kind == SymbolKind::Method);
        if all_methods {
            return Ok(FilterResult {
                outcome: FilterOutcome::MethodGroup(survivors),
                qualifier_failure: false,
            });
        }

        if survivors.len() == 1 {
            return Ok(FilterResult::decided(SymbolInfo::resolved(survivors[0])));
        }

        Ok(FilterResult::decided(SymbolInfo::unresolved(
            CandidateReason::Ambiguous,
            survivors,
        )))
    }

    /// A property may be visible while one accessor is more restricted.
    /// The restricted accessor is checked like a member declared at its own
    /// level in the same containing type.
    fn accessor_denial(
        &self,
        property: SymbolId,
        within: Within,
        through: Option<SymbolId>,
        usage: ValueUsage,
    ) -> Option<CandidateReason> {
        let data = self.comp.data(property);

        let denied = |level| {
            !self
                .comp
                .level_check(property, level, within, through)
                .allowed
        };

        if matches!(usage, ValueUsage::Read | ValueUsage::ReadWrite) {
            if let Some(level) = data.getter {
                if denied(level) {
                    return Some(CandidateReason::InaccessibleGetter);
                }
            }
        }
        if matches!(usage, ValueUsage::Write | ValueUsage::ReadWrite) {
            if let Some(level) = data.setter {
                if denied(level) {
                    return Some(CandidateReason::InaccessibleSetter);
                }
            }
        }
        None
    }
}

/// Stamp the external overload stage's verdict onto a method group.
pub fn reduce_method_group(group: Vec<SymbolId>, winner: Option<SymbolId>) -> SymbolInfo {
    match winner {
        Some(symbol) => {
            debug_assert!(group.contains(&symbol));
            SymbolInfo::resolved(symbol)
        }
        None => SymbolInfo::unresolved(CandidateReason::OverloadResolutionFailure, group),
    }
}

fn note(slot: &mut Option<CandidateReason>, reason: CandidateReason) {
    if slot.is_none() {
        *slot = Some(reason);
    }
}
