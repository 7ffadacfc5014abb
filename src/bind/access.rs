//! Accessibility checking.
//!
//! One question, asked everywhere: can `symbol` be referenced from `within`,
//! optionally through a receiver of a given static type? The answer composes
//! the symbol's declared accessibility with every enclosing type, the
//! assembly/friendship facts, and the protected-receiver rule, with the most
//! restrictive level governing.

use tracing::trace;

use crate::error::QueryError;
use crate::symbols::{Accessibility, Compilation, SymbolId, SymbolKind, Within};

/// Outcome of one accessibility check.
///
/// `failed_through_receiver` is set when the *only* obstacle was the
/// protected-receiver rule: the member would have been accessible had the
/// receiver's static type been the accessing type or derived from it. The
/// frontend uses this to report the qualifier, not the member.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct Access {
    pub allowed: bool,
    pub failed_through_receiver: bool,
}

impl Access {
    pub(crate) const ALLOW: Access = Access {
        allowed: true,
        failed_through_receiver: false,
    };
    pub(crate) const DENY: Access = Access {
        allowed: false,
        failed_through_receiver: false,
    };
}

impl Compilation {
    /// Can `symbol` be referenced from `within`?
    ///
    /// Fails (rather than answering `false`) when either id belongs to a
    /// different compilation.
    pub fn is_accessible(&self, symbol: SymbolId, within: Within) -> Result<bool, QueryError> {
        self.check_symbol(symbol)?;
        self.check_within(within)?;
        Ok(self.access_check(symbol, within, None).allowed)
    }

    /// Can `symbol` be referenced from `within`, through a receiver whose
    /// static type is `through`?
    ///
    /// `through` only matters for protected-flavored members; it is ignored
    /// for every other accessibility level.
    pub fn is_accessible_through(
        &self,
        symbol: SymbolId,
        within: Within,
        through: SymbolId,
    ) -> Result<bool, QueryError> {
        self.check_symbol(symbol)?;
        self.check_within(within)?;
        self.check_symbol(through)?;
        if self.data(through).kind != SymbolKind::Type {
            return Err(QueryError::NotAType { symbol: through });
        }
        Ok(self.access_check(symbol, within, Some(through)).allowed)
    }

    /// Is any symbol in the containment chain declared `private`?
    pub fn is_effectively_private(&self, symbol: SymbolId) -> Result<bool, QueryError> {
        self.check_symbol(symbol)?;
        let mut current = Some(symbol);
        while let Some(s) = current {
            if self.data(s).accessibility == Accessibility::Private {
                return Ok(true);
            }
            current = self.data(s).containing;
        }
        Ok(false)
    }

    /// Is any symbol in the containment chain internal-flavored, capping
    /// visibility at the declaring assembly and its friends?
    pub fn is_effectively_internal(&self, symbol: SymbolId) -> Result<bool, QueryError> {
        self.check_symbol(symbol)?;
        let mut current = Some(symbol);
        while let Some(s) = current {
            if self.data(s).accessibility.involves_internal() {
                return Ok(true);
            }
            current = self.data(s).containing;
        }
        Ok(false)
    }

    /// The full check. Ids must already be validated.
    pub(crate) fn access_check(
        &self,
        symbol: SymbolId,
        within: Within,
        through: Option<SymbolId>,
    ) -> Access {
        let data = self.data(symbol);

        // Unresolved placeholders are always accessible: one missing type
        // must not cascade into a flood of accessibility errors.
        if data.is_error {
            return Access::ALLOW;
        }

        // Scope-bound kinds are visible wherever their scope is, capped
        // only by their value type (a local of an inaccessible type is
        // itself inaccessible).
        if data.kind.ignores_declared_accessibility() {
            return match data.ty {
                Some(ty) => self.access_check(ty, within, through),
                None => Access::ALLOW,
            };
        }

        // An alias is as accessible as what it names.
        if data.kind == SymbolKind::Alias {
            return match data.alias_target {
                Some(target) => self.access_check(target, within, through),
                None => Access::ALLOW,
            };
        }

        // Constructed types: every element contributor must be accessible
        // under the same context. An array of K is no more visible than K.
        if data.is_constructed_type() {
            for &contributor in &data.element_contributors {
                let access = self.access_check(contributor, within, through);
                if !access.allowed {
                    return access;
                }
            }
            return Access::ALLOW;
        }

        let level = self.level_check(symbol, data.accessibility, within, through);
        if !level.allowed {
            trace!(
                symbol = self.resolve_name(data.name),
                level = %data.accessibility,
                "denied at declared level"
            );
            return level;
        }

        // Accessibility of a nested symbol is capped by every enclosing
        // type: a public member of a private nested type is invisible from
        // outside that type's subtree.
        if let Some(container) = self.containing_type_of(symbol) {
            let outer = self.access_check(container, within, through);
            if !outer.allowed {
                return outer;
            }
        }

        Access::ALLOW
    }

    /// Check one declared accessibility level against the context. The
    /// containment cap is the caller's job.
    pub(crate) fn level_check(
        &self,
        symbol: SymbolId,
        level: Accessibility,
        within: Within,
        through: Option<SymbolId>,
    ) -> Access {
        match level {
            Accessibility::Public => Access::ALLOW,
            Accessibility::Internal => {
                if self.internal_check(symbol, within) {
                    Access::ALLOW
                } else {
                    Access::DENY
                }
            }
            Accessibility::Private => {
                if self.private_check(symbol, within) {
                    Access::ALLOW
                } else {
                    Access::DENY
                }
            }
            Accessibility::Protected => self.protected_check(symbol, within, through),
            Accessibility::ProtectedInternal => {
                // Protected OR internal.
                if self.internal_check(symbol, within) {
                    Access::ALLOW
                } else {
                    self.protected_check(symbol, within, through)
                }
            }
            Accessibility::PrivateProtected => {
                // Protected AND internal.
                if !self.internal_check(symbol, within) {
                    Access::DENY
                } else {
                    self.protected_check(symbol, within, through)
                }
            }
        }
    }

    /// Same assembly (by identity, never by name), or a friend grant
    /// declared by the symbol's own assembly for the consumer.
    fn internal_check(&self, symbol: SymbolId, within: Within) -> bool {
        let producer = self.data(symbol).assembly;
        let consumer = self.assembly_of_within(within);
        if producer == consumer {
            return true;
        }
        self.identity(producer)
            .grants_access_to(self.identity(consumer))
    }

    /// Private: the context must be the declaring type or lexically nested
    /// inside it. A sibling nested type never qualifies.
    fn private_check(&self, symbol: SymbolId, within: Within) -> bool {
        let Within::Type(context) = within else {
            return false;
        };
        let Some(declaring) = self.containing_type_of(symbol) else {
            return false;
        };
        context == declaring || self.is_nested_in(context, declaring)
    }

    /// Protected: some type lexically enclosing the context (including the
    /// context itself) must be the declaring type or derived from it, and
    /// when a receiver type is supplied it must be that accessing type or
    /// derived from *it*; being derived from the declaring type alone is
    /// not enough.
    fn protected_check(
        &self,
        symbol: SymbolId,
        within: Within,
        through: Option<SymbolId>,
    ) -> Access {
        let Within::Type(context) = within else {
            // From a bare assembly there is no type to satisfy derivation.
            return Access::DENY;
        };
        let Some(declaring) = self.containing_type_of(symbol) else {
            return Access::DENY;
        };

        let mut failed_through_receiver = false;
        let mut current = Some(context);
        while let Some(accessor) = current {
            if self.data(accessor).kind == SymbolKind::Type
                && (accessor == declaring || self.derives_from(accessor, declaring))
            {
                match through {
                    None => return Access::ALLOW,
                    Some(receiver) => {
                        if receiver == accessor || self.derives_from(receiver, accessor) {
                            return Access::ALLOW;
                        }
                        failed_through_receiver = true;
                    }
                }
            }
            current = self.data(accessor).containing;
        }

        Access {
            allowed: false,
            failed_through_receiver,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbols::AssemblyIdentity;

    #[test]
    fn test_public_member_of_private_nested_type_is_capped() {
        let mut b = Compilation::builder(AssemblyIdentity::new("App"));
        let root = b.global_namespace();
        let asm = b.source_assembly();
        let outer = b.type_in(root, "Outer", Accessibility::Public, asm);
        let hidden = b.type_in(outer, "Hidden", Accessibility::Private, asm);
        let field = b.field(hidden, "value", Accessibility::Public, hidden, false);
        let other = b.type_in(root, "Other", Accessibility::Public, asm);
        let c = b.finish();

        // Visible inside the subtree that can see Hidden.
        assert!(c.is_accessible(field, Within::Type(outer)).unwrap());
        // The public field is capped by its private containing type.
        assert!(!c.is_accessible(field, Within::Type(other)).unwrap());
    }

    #[test]
    fn test_error_symbol_fails_open() {
        let mut b = Compilation::builder(AssemblyIdentity::new("App"));
        let root = b.global_namespace();
        let asm = b.source_assembly();
        let unknown = b.error_type("unknowntype");
        let holder = b.type_in(root, "Holder", Accessibility::Public, asm);
        let field = b.field(holder, "mystery", Accessibility::Public, unknown, false);
        let anywhere = b.type_in(root, "Anywhere", Accessibility::Public, asm);
        let c = b.finish();

        assert!(c.is_accessible(unknown, Within::Type(anywhere)).unwrap());
        assert!(c.is_accessible(field, Within::Type(anywhere)).unwrap());
    }

    #[test]
    fn test_protected_receiver_rule() {
        let mut b = Compilation::builder(AssemblyIdentity::new("App"));
        let root = b.global_namespace();
        let asm = b.source_assembly();
        let animal = b.type_in(root, "Animal", Accessibility::Public, asm);
        let field = b.field(animal, "pulse", Accessibility::Protected, animal, false);
        let dog = b.type_in(root, "Dog", Accessibility::Public, asm);
        let cat = b.type_in(root, "Cat", Accessibility::Public, asm);
        b.set_base_type(dog, animal);
        b.set_base_type(cat, animal);
        let c = b.finish();

        // From Dog, through a Dog receiver: fine.
        assert!(c.is_accessible_through(field, Within::Type(dog), dog).unwrap());
        // From Dog, through an Animal or Cat receiver: denied, even though
        // both relate to the declaring type.
        assert!(!c.is_accessible_through(field, Within::Type(dog), animal).unwrap());
        assert!(!c.is_accessible_through(field, Within::Type(dog), cat).unwrap());
        // Without a receiver the derivation test alone decides.
        assert!(c.is_accessible(field, Within::Type(dog)).unwrap());

        let denial = c.access_check(field, Within::Type(dog), Some(cat));
        assert!(!denial.allowed);
        assert!(denial.failed_through_receiver);
    }

    #[test]
    fn test_protected_from_nested_type_of_accessor() {
        let mut b = Compilation::builder(AssemblyIdentity::new("App"));
        let root = b.global_namespace();
        let asm = b.source_assembly();
        let base = b.type_in(root, "Base", Accessibility::Public, asm);
        let member = b.field(base, "shared", Accessibility::Protected, base, false);
        let derived = b.type_in(root, "Derived", Accessibility::Public, asm);
        b.set_base_type(derived, base);
        let helper = b.type_in(derived, "Helper", Accessibility::Private, asm);
        let c = b.finish();

        // Helper is not derived from Base, but its enclosing type is.
        assert!(c.is_accessible(member, Within::Type(helper)).unwrap());
    }

    #[test]
    fn test_internal_respects_assembly_identity_not_name() {
        let mut b = Compilation::builder(AssemblyIdentity::new("Lib"));
        let root = b.global_namespace();
        let asm = b.source_assembly();
        // A reference that happens to carry the same simple name.
        let twin = b.add_reference(AssemblyIdentity::new("Lib"));
        let mine = b.type_in(root, "Mine", Accessibility::Internal, asm);
        let theirs = b.type_in(root, "Theirs", Accessibility::Internal, twin);
        let c = b.finish();

        assert!(c.is_accessible(mine, Within::Assembly(asm)).unwrap());
        // Same name, different assembly: not the same assembly.
        assert!(!c.is_accessible(theirs, Within::Assembly(asm)).unwrap());
    }

    #[test]
    fn test_assembly_context_degrades_protected() {
        let mut b = Compilation::builder(AssemblyIdentity::new("App"));
        let root = b.global_namespace();
        let asm = b.source_assembly();
        let ty = b.type_in(root, "T", Accessibility::Public, asm);
        let prot = b.field(ty, "a", Accessibility::Protected, ty, false);
        let prot_internal = b.field(ty, "b", Accessibility::ProtectedInternal, ty, false);
        let priv_protected = b.field(ty, "c", Accessibility::PrivateProtected, ty, false);
        let c = b.finish();

        // No enclosing type can satisfy derivation from a bare assembly.
        assert!(!c.is_accessible(prot, Within::Assembly(asm)).unwrap());
        // The internal half of protected-internal is enough on its own.
        assert!(c.is_accessible(prot_internal, Within::Assembly(asm)).unwrap());
        // Private-protected needs both halves.
        assert!(!c.is_accessible(priv_protected, Within::Assembly(asm)).unwrap());
    }

    #[test]
    fn test_array_of_less_accessible_element() {
        let mut b = Compilation::builder(AssemblyIdentity::new("App"));
        let root = b.global_namespace();
        let asm = b.source_assembly();
        let outer = b.type_in(root, "Outer", Accessibility::Public, asm);
        let secret = b.type_in(outer, "Secret", Accessibility::Private, asm);
        let array = b.array_type(secret);
        let elsewhere = b.type_in(root, "Elsewhere", Accessibility::Public, asm);
        let c = b.finish();

        assert!(c.is_accessible(array, Within::Type(outer)).unwrap());
        assert!(!c.is_accessible(array, Within::Type(elsewhere)).unwrap());
    }

    #[test]
    fn test_scope_bound_kinds_follow_their_type() {
        let mut b = Compilation::builder(AssemblyIdentity::new("App"));
        let root = b.global_namespace();
        let asm = b.source_assembly();
        let outer = b.type_in(root, "Outer", Accessibility::Public, asm);
        let secret = b.type_in(outer, "Secret", Accessibility::Private, asm);
        let open = b.type_in(root, "Open", Accessibility::Public, asm);
        let elsewhere = b.type_in(root, "Elsewhere", Accessibility::Public, asm);

        let local = b.local("tmp", secret);
        let discard = b.discard(secret);
        let range_var = b.range_variable("item", open);
        let alias = b.alias("S", secret);
        let pointer = b.pointer_type(secret);
        let c = b.finish();

        // Visible where the value type is visible.
        assert!(c.is_accessible(local, Within::Type(outer)).unwrap());
        assert!(c.is_accessible(range_var, Within::Type(elsewhere)).unwrap());
        // Capped by an inaccessible value/target/pointee type.
        assert!(!c.is_accessible(local, Within::Type(elsewhere)).unwrap());
        assert!(!c.is_accessible(discard, Within::Type(elsewhere)).unwrap());
        assert!(!c.is_accessible(alias, Within::Type(elsewhere)).unwrap());
        assert!(!c.is_accessible(pointer, Within::Type(elsewhere)).unwrap());
    }

    #[test]
    fn test_function_pointer_checks_both_positions() {
        let mut b = Compilation::builder(AssemblyIdentity::new("App"));
        let root = b.global_namespace();
        let asm = b.source_assembly();
        let owner = b.type_in(root, "Owner", Accessibility::Public, asm);
        let hidden = b.type_in(owner, "Hidden", Accessibility::Private, asm);
        let open = b.type_in(root, "Open", Accessibility::Public, asm);
        let elsewhere = b.type_in(root, "Elsewhere", Accessibility::Public, asm);

        let in_position = b.function_pointer_type(&[hidden], open);
        let out_position = b.function_pointer_type(&[open], hidden);
        let clean = b.function_pointer_type(&[open], open);
        let c = b.finish();

        assert!(!c.is_accessible(in_position, Within::Type(elsewhere)).unwrap());
        assert!(!c.is_accessible(out_position, Within::Type(elsewhere)).unwrap());
        assert!(c.is_accessible(clean, Within::Type(elsewhere)).unwrap());
    }

    #[test]
    fn test_effective_visibility_helpers() {
        let mut b = Compilation::builder(AssemblyIdentity::new("App"));
        let root = b.global_namespace();
        let asm = b.source_assembly();
        let outer = b.type_in(root, "Outer", Accessibility::Internal, asm);
        let nested = b.type_in(outer, "Nested", Accessibility::Private, asm);
        let field = b.field(nested, "x", Accessibility::Public, nested, false);
        let c = b.finish();

        assert!(c.is_effectively_private(field).unwrap());
        assert!(c.is_effectively_internal(field).unwrap());
        assert!(!c.is_effectively_private(outer).unwrap());
    }

    #[test]
    fn test_cross_compilation_query_is_an_error() {
        let mk = || {
            let mut b = Compilation::builder(AssemblyIdentity::new("App"));
            let root = b.global_namespace();
            let asm = b.source_assembly();
            let t = b.type_in(root, "T", Accessibility::Public, asm);
            (b.finish(), t)
        };
        let (a, t_in_a) = mk();
        let (b, t_in_b) = mk();

        let err = a.is_accessible(t_in_b, Within::Type(t_in_a)).unwrap_err();
        assert!(matches!(err, QueryError::ForeignSymbol { .. }));
        let err = b.is_accessible(t_in_b, Within::Type(t_in_a)).unwrap_err();
        assert!(matches!(err, QueryError::ForeignSymbol { .. }));
    }
}
