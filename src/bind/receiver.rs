//! Value-vs-type disambiguation for member-access receivers.
//!
//! `Color Color = new Color();` makes the bare name `Color` denote both a
//! value (the field/property/local) and a type. When such a name is the
//! receiver of `E.M(...)`, the value interpretation is tried first and the
//! type interpretation is consulted only if the value binding fails hard:
//! no such member, every candidate inaccessible, or the overload stage
//! finding no winner. A value binding that succeeds settles the question,
//! even when it picked a worse overload than the type side would offer.

use tracing::debug;

use crate::error::QueryError;
use crate::symbols::{Compilation, SymbolId, SymbolKind, Within};

use super::filter::{
    CandidateFilter, FilterOutcome, SymbolInfo, ValueUsage, reduce_method_group,
};
use super::lookup::{CandidateReason, LookupEngine, LookupOptions, ScopeChain};

/// The external overload-resolution stage, seen from the binder.
///
/// The binder hands over a filtered method group and an argument count and
/// gets back a winner or nothing; scoring and betterness live outside.
pub trait OverloadJudge {
    fn pick(
        &self,
        comp: &Compilation,
        candidates: &[SymbolId],
        arg_count: usize,
    ) -> Option<SymbolId>;
}

/// A trivial arity-only judge, params-array aware.
///
/// Good enough to drive receiver disambiguation in tests and tools that do
/// not carry the full overload stage.
#[derive(Debug, Default)]
pub struct ArityJudge;

impl OverloadJudge for ArityJudge {
    fn pick(
        &self,
        comp: &Compilation,
        candidates: &[SymbolId],
        arg_count: usize,
    ) -> Option<SymbolId> {
        let mut fits = candidates.iter().copied().filter(|&m| {
            let Ok(data) = comp.symbol(m) else {
                return false;
            };
            let arity = data.params.len();
            let has_params_tail = data
                .params
                .last()
                .and_then(|&p| comp.symbol(p).ok())
                .is_some_and(|p| p.is_params);
            if has_params_tail {
                arg_count + 1 >= arity
            } else {
                arg_count == arity
            }
        });
        let winner = fits.next()?;
        if fits.next().is_some() {
            return None; // tie: the real overload stage must rank
        }
        Some(winner)
    }
}

/// One member access `E.M(...)` as seen by the receiver binder.
#[derive(Copy, Clone, Debug)]
pub struct MemberAccess<'a> {
    /// The member name `M`.
    pub member: &'a str,
    /// Argument count of the invocation. Ignored when the member binds to
    /// a non-invocable symbol.
    pub arg_count: usize,
    pub usage: ValueUsage,
    /// The access sits in a lambda whose parameter types are not yet
    /// known; the decision must wait for target-type inference.
    pub in_unresolved_lambda: bool,
}

/// What the receiver turned out to be.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ReceiverResolution {
    /// The receiver denotes a value; `member` bound through its type.
    Value {
        receiver: SymbolInfo,
        member: SymbolInfo,
    },
    /// The receiver denotes a type or namespace.
    Type {
        receiver: SymbolInfo,
        member: SymbolInfo,
    },
    /// The receiver name does not exist in any scope.
    NotFound,
    /// Inside an unbound lambda: re-run once parameter types are inferred.
    /// Using the access as a naked value without a resolvable target type
    /// is the caller's error to report.
    Deferred,
}

enum BindAttempt {
    /// The member bound (possibly to an error symbol, which is success:
    /// unresolved receivers must not cascade).
    Bound(SymbolInfo),
    /// A hard failure, eligible for color-color fallback.
    HardFailure(SymbolInfo),
}

/// Disambiguates member-access receivers over one compilation.
pub struct ReceiverBinder<'a> {
    comp: &'a Compilation,
    judge: &'a dyn OverloadJudge,
}

impl<'a> ReceiverBinder<'a> {
    pub fn new(comp: &'a Compilation, judge: &'a dyn OverloadJudge) -> Self {
        Self { comp, judge }
    }

    /// Classify the receiver `name` of `name.member(...)`.
    ///
    /// The classification holds for this member access only; other uses of
    /// the bare name in the same scope still resolve normally.
    pub fn resolve_receiver(
        &self,
        name: &str,
        chain: &ScopeChain,
        within: Within,
        access: &MemberAccess<'_>,
    ) -> Result<ReceiverResolution, QueryError> {
        self.comp.check_within(within)?;

        if access.in_unresolved_lambda {
            return Ok(ReceiverResolution::Deferred);
        }

        let value_receiver = self.value_alternative(name, chain, within)?;
        let type_receiver = self.type_alternative(name, chain)?;

        match (value_receiver, type_receiver) {
            (Some(value), Some(ty)) => {
                debug!(
                    name,
                    member = access.member,
                    "name denotes both a value and a type; trying the value first"
                );
                match self.bind_through_value(value, within, access)? {
                    BindAttempt::Bound(member) => Ok(ReceiverResolution::Value {
                        receiver: SymbolInfo::resolved(value),
                        member,
                    }),
                    BindAttempt::HardFailure(value_member) => {
                        match self.bind_on_type_or_namespace(ty, within, access)? {
                            BindAttempt::Bound(member) => Ok(ReceiverResolution::Type {
                                receiver: SymbolInfo::resolved(ty),
                                member,
                            }),
                            // Both interpretations failed: the value one is
                            // the default, and its failure gets reported.
                            BindAttempt::HardFailure(_) => Ok(ReceiverResolution::Value {
                                receiver: SymbolInfo::resolved(value),
                                member: value_member,
                            }),
                        }
                    }
                }
            }
            (Some(value), None) => {
                let member = match self.bind_through_value(value, within, access)? {
                    BindAttempt::Bound(info) | BindAttempt::HardFailure(info) => info,
                };
                Ok(ReceiverResolution::Value {
                    receiver: SymbolInfo::resolved(value),
                    member,
                })
            }
            (None, Some(ty)) => {
                // The type wins the receiver role even when inaccessible;
                // the inaccessibility is then the thing to report.
                if !self.comp.access_check(ty, within, None).allowed {
                    return Ok(ReceiverResolution::Type {
                        receiver: SymbolInfo::unresolved(CandidateReason::Inaccessible, vec![ty]),
                        member: SymbolInfo::none(),
                    });
                }
                let member = match self.bind_on_type_or_namespace(ty, within, access)? {
                    BindAttempt::Bound(info) | BindAttempt::HardFailure(info) => info,
                };
                Ok(ReceiverResolution::Type {
                    receiver: SymbolInfo::resolved(ty),
                    member,
                })
            }
            (None, None) => Ok(ReceiverResolution::NotFound),
        }
    }

    /// The unique accessible value the name denotes, if any.
    fn value_alternative(
        &self,
        name: &str,
        chain: &ScopeChain,
        within: Within,
    ) -> Result<Option<SymbolId>, QueryError> {
        let raw = LookupEngine::new(self.comp).lookup(name, chain, &LookupOptions::value())?;
        let filtered = CandidateFilter::new(self.comp).filter(
            &raw,
            within,
            None,
            ValueUsage::Read,
            &LookupOptions::value(),
        )?;
        match filtered.outcome {
            FilterOutcome::Decided(info) => Ok(info
                .symbol()
                .filter(|&s| self.comp.data(s).kind.is_value())),
            FilterOutcome::MethodGroup(_) => Ok(None),
        }
    }

    /// The unique type or namespace the name denotes, if any.
    ///
    /// Deliberately pre-accessibility: an inaccessible type still claims
    /// the receiver role, and the denial is what gets diagnosed.
    fn type_alternative(
        &self,
        name: &str,
        chain: &ScopeChain,
    ) -> Result<Option<SymbolId>, QueryError> {
        let raw =
            LookupEngine::new(self.comp).lookup(name, chain, &LookupOptions::type_or_namespace())?;
        if raw.reason() != CandidateReason::None {
            return Ok(None);
        }
        Ok(raw
            .single()
            .filter(|&s| self.comp.data(s).kind.is_type_or_namespace()))
    }

    /// Bind `member` through the value interpretation: members of the
    /// value's type, instance context, receiver type as the qualifier.
    fn bind_through_value(
        &self,
        value: SymbolId,
        within: Within,
        access: &MemberAccess<'_>,
    ) -> Result<BindAttempt, QueryError> {
        let Some(receiver_ty) = self.comp.data(value).ty else {
            return Ok(BindAttempt::HardFailure(SymbolInfo::none()));
        };
        if self.comp.data(receiver_ty).is_error {
            // Binding against an unresolved type succeeds vacuously.
            return Ok(BindAttempt::Bound(SymbolInfo::none()));
        }
        let options = LookupOptions::either().with_instance_receiver();
        self.bind_member(receiver_ty, Some(receiver_ty), within, access, &options)
    }

    /// Bind `member` through the type interpretation: static context, no
    /// qualifying receiver.
    fn bind_on_type_or_namespace(
        &self,
        container: SymbolId,
        within: Within,
        access: &MemberAccess<'_>,
    ) -> Result<BindAttempt, QueryError> {
        if self.comp.data(container).is_error {
            return Ok(BindAttempt::Bound(SymbolInfo::none()));
        }
        // An inaccessible receiver type is a hard failure of this
        // interpretation.
        if !self.comp.access_check(container, within, None).allowed {
            return Ok(BindAttempt::HardFailure(SymbolInfo::unresolved(
                CandidateReason::Inaccessible,
                vec![container],
            )));
        }
        let options = if self.comp.data(container).kind == SymbolKind::Type {
            LookupOptions::either().with_static_receiver()
        } else {
            LookupOptions::either()
        };
        self.bind_member(container, None, within, access, &options)
    }

    fn bind_member(
        &self,
        container: SymbolId,
        through: Option<SymbolId>,
        within: Within,
        access: &MemberAccess<'_>,
        options: &LookupOptions,
    ) -> Result<BindAttempt, QueryError> {
        let raw = LookupEngine::new(self.comp).lookup_members(container, access.member, options)?;
        if raw.is_empty() {
            // No such member.
            return Ok(BindAttempt::HardFailure(SymbolInfo::none()));
        }

        let filtered = CandidateFilter::new(self.comp).filter(
            &raw,
            within,
            through,
            access.usage,
            options,
        )?;
        match filtered.outcome {
            FilterOutcome::Decided(info) => {
                if info.is_resolved() {
                    Ok(BindAttempt::Bound(info))
                } else {
                    Ok(BindAttempt::HardFailure(info))
                }
            }
            FilterOutcome::MethodGroup(group) => {
                let winner = self.judge.pick(self.comp, &group, access.arg_count);
                let info = reduce_method_group(group, winner);
                if info.is_resolved() {
                    Ok(BindAttempt::Bound(info))
                } else {
                    Ok(BindAttempt::HardFailure(info))
                }
            }
        }
    }
}
