//! Name lookup over the lexical scope chain.
//!
//! Lookup is pre-accessibility and pre-disambiguation: it walks the scope
//! chain innermost-first and returns the raw candidates of the first tier
//! that has any, tagged with a [`CandidateReason`] when the tier itself is
//! ambiguous. Accessibility and applicability are the
//! [`super::CandidateFilter`]'s job.

use indexmap::IndexSet;
use rustc_hash::FxBuildHasher;
use tracing::trace;

use crate::error::QueryError;
use crate::symbols::{Compilation, SymbolId, SymbolKind};

use crate::base::Name;

type FxIndexSet<T> = IndexSet<T, FxBuildHasher>;

/// Longest base-type chain lookup will follow.
const MAX_BASE_WALK: usize = 256;

/// Why a lookup produced no unique symbol.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CandidateReason {
    /// Nothing wrong: either a unique symbol, or a true "name not found".
    #[default]
    None,
    /// Multiple equally ranked non-overloadable candidates.
    Ambiguous,
    /// A method group where the overload stage reported no winner.
    OverloadResolutionFailure,
    /// Candidates existed but none were accessible.
    Inaccessible,
    /// The candidate does not denote a value in a value position.
    NotAValue,
    /// Instance member in a static context, or the reverse.
    StaticInstanceMismatch,
    /// The property is visible but its getter is not.
    InaccessibleGetter,
    /// The property is visible but its setter is not.
    InaccessibleSetter,
}

/// What the binding position accepts.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LookupPosition {
    /// An expression value is required.
    Value,
    /// A type or namespace is required; aliases resolve here.
    TypeOrNamespace,
    /// Either interpretation is acceptable; aliases resolve here.
    Either,
}

/// Knobs a binding position sets before looking a name up.
#[derive(Copy, Clone, Debug)]
pub struct LookupOptions {
    pub position: LookupPosition,
    /// The position requires an instance member (value receiver).
    pub must_be_instance: bool,
    /// The position requires a static member (type receiver).
    pub must_not_be_instance: bool,
    /// The receiver is `base`: the protected-receiver restriction is
    /// waived, since the receiver is known to be the current instance.
    pub base_receiver: bool,
}

impl LookupOptions {
    pub fn value() -> Self {
        Self {
            position: LookupPosition::Value,
            must_be_instance: false,
            must_not_be_instance: false,
            base_receiver: false,
        }
    }

    pub fn type_or_namespace() -> Self {
        Self {
            position: LookupPosition::TypeOrNamespace,
            ..Self::value()
        }
    }

    pub fn either() -> Self {
        Self {
            position: LookupPosition::Either,
            ..Self::value()
        }
    }

    pub fn with_instance_receiver(mut self) -> Self {
        self.must_be_instance = true;
        self
    }

    pub fn with_static_receiver(mut self) -> Self {
        self.must_not_be_instance = true;
        self
    }

    pub fn through_base(mut self) -> Self {
        self.base_receiver = true;
        self
    }
}

impl Default for LookupOptions {
    fn default() -> Self {
        Self::either()
    }
}

/// One tier of the lexical scope chain, supplied by the syntax layer.
#[derive(Clone, Debug)]
pub enum Scope {
    /// Locals and parameters declared in one block.
    Block { symbols: Vec<SymbolId> },
    /// The body of a type: its members and its bases' members.
    TypeBody { ty: SymbolId },
    /// `using Q = E;` directives of the current file.
    Aliases { aliases: Vec<SymbolId> },
    /// A namespace body: its members, then namespaces imported by `using`.
    NamespaceBody {
        ns: SymbolId,
        usings: Vec<SymbolId>,
    },
}

/// The lexical scope chain at a binding position, outermost first as
/// declared, searched innermost first.
#[derive(Clone, Debug, Default)]
pub struct ScopeChain {
    scopes: Vec<Scope>,
}

impl ScopeChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter a scope; the most recently entered scope is searched first.
    pub fn enter(mut self, scope: Scope) -> Self {
        self.scopes.push(scope);
        self
    }

    pub fn enter_namespace(self, ns: SymbolId, usings: Vec<SymbolId>) -> Self {
        self.enter(Scope::NamespaceBody { ns, usings })
    }

    pub fn enter_aliases(self, aliases: Vec<SymbolId>) -> Self {
        self.enter(Scope::Aliases { aliases })
    }

    pub fn enter_type(self, ty: SymbolId) -> Self {
        self.enter(Scope::TypeBody { ty })
    }

    pub fn enter_block(self, symbols: Vec<SymbolId>) -> Self {
        self.enter(Scope::Block { symbols })
    }

    fn innermost_first(&self) -> impl Iterator<Item = &Scope> {
        self.scopes.iter().rev()
    }
}

/// The raw candidates a lookup produced.
///
/// Candidates keep insertion (declaration/search) order and are
/// deduplicated by identity.
#[derive(Clone, Debug, Default)]
pub struct LookupResult {
    candidates: FxIndexSet<SymbolId>,
    reason: CandidateReason,
}

impl LookupResult {
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn add(&mut self, id: SymbolId) {
        self.candidates.insert(id);
    }

    pub(crate) fn set_reason(&mut self, reason: CandidateReason) {
        self.reason = reason;
    }

    pub fn reason(&self) -> CandidateReason {
        self.reason
    }

    pub fn candidates(&self) -> impl Iterator<Item = SymbolId> + '_ {
        self.candidates.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    /// The unique candidate, if there is exactly one.
    pub fn single(&self) -> Option<SymbolId> {
        if self.candidates.len() == 1 {
            self.candidates.first().copied()
        } else {
            None
        }
    }
}

/// Lookup over a compilation's symbol graph.
pub struct LookupEngine<'a> {
    comp: &'a Compilation,
}

impl<'a> LookupEngine<'a> {
    pub fn new(comp: &'a Compilation) -> Self {
        Self { comp }
    }

    /// Resolve a simple name against the scope chain.
    ///
    /// Returns the candidates of the innermost tier that has any. An empty
    /// result with reason `None` is a true "name does not exist".
    pub fn lookup(
        &self,
        name: &str,
        chain: &ScopeChain,
        options: &LookupOptions,
    ) -> Result<LookupResult, QueryError> {
        // A name nobody interned cannot name any symbol.
        let Some(name) = self.comp.lookup_name(name) else {
            return Ok(LookupResult::empty());
        };

        for scope in chain.innermost_first() {
            let result = match scope {
                Scope::Block { symbols } => {
                    if options.position == LookupPosition::TypeOrNamespace {
                        continue;
                    }
                    self.lookup_in_list(symbols, name)?
                }
                Scope::TypeBody { ty } => {
                    self.comp.check_symbol(*ty)?;
                    self.lookup_in_type(*ty, name, options)
                }
                Scope::Aliases { aliases } => {
                    if options.position == LookupPosition::Value {
                        continue;
                    }
                    self.lookup_in_aliases(aliases, name)?
                }
                Scope::NamespaceBody { ns, usings } => {
                    self.comp.check_symbol(*ns)?;
                    self.lookup_in_namespace(*ns, usings, name, options)?
                }
            };
            if !result.is_empty() {
                trace!(
                    name = self.comp.resolve_name(name),
                    candidates = result.len(),
                    "name found in scope tier"
                );
                return Ok(result);
            }
        }

        Ok(LookupResult::empty())
    }

    /// Look a member name up on a receiver type or namespace.
    ///
    /// Member lookup on an error type is fail-open: it reports an empty
    /// result that the member-access binder treats as bind-to-error, not
    /// as "no such member".
    pub fn lookup_members(
        &self,
        container: SymbolId,
        name: &str,
        options: &LookupOptions,
    ) -> Result<LookupResult, QueryError> {
        self.comp.check_symbol(container)?;
        let Some(name) = self.comp.lookup_name(name) else {
            return Ok(LookupResult::empty());
        };
        let data = self.comp.data(container);
        match data.kind {
            SymbolKind::Namespace => {
                let mut result = LookupResult::empty();
                self.collect_members(container, name, options, &mut result);
                classify(self.comp, &mut result);
                Ok(result)
            }
            SymbolKind::Type => Ok(self.lookup_in_type(container, name, options)),
            _ => Err(QueryError::NotAType { symbol: container }),
        }
    }

    fn lookup_in_list(&self, symbols: &[SymbolId], name: Name) -> Result<LookupResult, QueryError> {
        let mut result = LookupResult::empty();
        for &id in symbols {
            self.comp.check_symbol(id)?;
            if self.comp.data(id).name == name {
                result.add(id);
            }
        }
        classify(self.comp, &mut result);
        Ok(result)
    }

    /// Walk a type and its bases. A match at a more derived level hides
    /// every base member of the same name, regardless of signature.
    fn lookup_in_type(&self, ty: SymbolId, name: Name, options: &LookupOptions) -> LookupResult {
        let mut result = LookupResult::empty();
        // Fuel bounds malformed cyclic base chains.
        let mut fuel = MAX_BASE_WALK;
        let mut current = Some(ty);
        while let Some(t) = current {
            let data = self.comp.data(t);
            if data.is_error {
                break;
            }
            self.collect_members(t, name, options, &mut result);
            if !result.is_empty() || fuel == 0 {
                break;
            }
            fuel -= 1;
            current = data.base;
        }
        classify(self.comp, &mut result);
        result
    }

    fn collect_members(
        &self,
        container: SymbolId,
        name: Name,
        options: &LookupOptions,
        result: &mut LookupResult,
    ) {
        for &member in &self.comp.data(container).members {
            let data = self.comp.data(member);
            if data.name != name {
                continue;
            }
            let admitted = match options.position {
                LookupPosition::Value => !data.kind.is_type_or_namespace(),
                LookupPosition::TypeOrNamespace => data.kind.is_type_or_namespace(),
                LookupPosition::Either => true,
            };
            if admitted {
                result.add(member);
            }
        }
    }

    fn lookup_in_aliases(
        &self,
        aliases: &[SymbolId],
        name: Name,
    ) -> Result<LookupResult, QueryError> {
        let mut result = LookupResult::empty();
        for &id in aliases {
            self.comp.check_symbol(id)?;
            let data = self.comp.data(id);
            if data.name == name {
                // An alias is transparent: candidates are its target.
                if let Some(target) = data.alias_target {
                    result.add(target);
                }
            }
        }
        classify(self.comp, &mut result);
        Ok(result)
    }

    /// Names declared in the namespace win over names imported by `using`;
    /// imports from different usings can collide into ambiguity.
    fn lookup_in_namespace(
        &self,
        ns: SymbolId,
        usings: &[SymbolId],
        name: Name,
        options: &LookupOptions,
    ) -> Result<LookupResult, QueryError> {
        let mut result = LookupResult::empty();
        self.collect_members(ns, name, options, &mut result);
        if !result.is_empty() {
            classify(self.comp, &mut result);
            return Ok(result);
        }

        for &imported in usings {
            self.comp.check_symbol(imported)?;
            self.collect_members(imported, name, options, &mut result);
        }
        classify(self.comp, &mut result);
        Ok(result)
    }
}

/// Tag a tier's candidates: a lone candidate or a pure method group is
/// clean; anything else equally ranked is ambiguous.
fn classify(comp: &Compilation, result: &mut LookupResult) {
    if result.len() <= 1 {
        return;
    }
    let all_methods = result
        .candidates()
        .all(|id| comp.data(id).kind == SymbolKind::Method);
    if !all_methods {
        result.set_reason(CandidateReason::Ambiguous);
    }
}
