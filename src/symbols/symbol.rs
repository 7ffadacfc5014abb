//! Declared symbols and their accessibility.

use std::fmt;

use crate::base::Name;

use super::ids::{AssemblyId, CompilationId, SymbolId};

/// Declared accessibility of a symbol.
///
/// `ProtectedInternal` is protected **or** internal; `PrivateProtected` is
/// protected **and** internal (same assembly or friend).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Accessibility {
    Public,
    Internal,
    Protected,
    ProtectedInternal,
    PrivateProtected,
    Private,
}

impl Accessibility {
    /// Does this level have a protected half?
    pub fn involves_protected(self) -> bool {
        matches!(
            self,
            Accessibility::Protected
                | Accessibility::ProtectedInternal
                | Accessibility::PrivateProtected
        )
    }

    /// Does this level have an internal half?
    pub fn involves_internal(self) -> bool {
        matches!(
            self,
            Accessibility::Internal
                | Accessibility::ProtectedInternal
                | Accessibility::PrivateProtected
        )
    }
}

impl fmt::Display for Accessibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Accessibility::Public => "public",
            Accessibility::Internal => "internal",
            Accessibility::Protected => "protected",
            Accessibility::ProtectedInternal => "protected internal",
            Accessibility::PrivateProtected => "private protected",
            Accessibility::Private => "private",
        };
        f.write_str(text)
    }
}

/// The kind of a declared symbol.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum SymbolKind {
    Namespace,
    Type,
    Field,
    Property,
    Event,
    Method,
    Local,
    Parameter,
    Alias,
    Discard,
    RangeVariable,
}

impl SymbolKind {
    /// Kinds that denote an expression value.
    pub fn is_value(self) -> bool {
        matches!(
            self,
            SymbolKind::Field
                | SymbolKind::Property
                | SymbolKind::Event
                | SymbolKind::Local
                | SymbolKind::Parameter
                | SymbolKind::Discard
                | SymbolKind::RangeVariable
        )
    }

    /// Kinds that denote a type or namespace.
    pub fn is_type_or_namespace(self) -> bool {
        matches!(self, SymbolKind::Type | SymbolKind::Namespace)
    }

    /// Kinds whose declared accessibility is meaningless: they are visible
    /// wherever their scope is, capped only by their value type.
    pub fn ignores_declared_accessibility(self) -> bool {
        matches!(
            self,
            SymbolKind::Namespace
                | SymbolKind::Local
                | SymbolKind::Parameter
                | SymbolKind::Discard
                | SymbolKind::RangeVariable
        )
    }
}

/// Declaration facts for one symbol.
///
/// Source-declared and metadata-imported symbols share this shape; the
/// binder never cares which side a symbol came from, only what it declares.
#[derive(Clone, Debug)]
pub struct SymbolData {
    pub name: Name,
    pub kind: SymbolKind,
    pub accessibility: Accessibility,
    /// Containing symbol: type → containing type or namespace, member →
    /// containing type. The global namespace has none.
    pub containing: Option<SymbolId>,
    pub assembly: AssemblyId,
    /// Value type, for fields/properties/events/locals/parameters/discards/
    /// range variables.
    pub ty: Option<SymbolId>,
    /// Base type, for types with a derivation chain.
    pub base: Option<SymbolId>,
    /// For constructed types (array, pointer, function pointer): the
    /// element/parameter/return types whose accessibility must also hold.
    pub element_contributors: Vec<SymbolId>,
    /// Alias target, for `using Q = E;` symbols.
    pub alias_target: Option<SymbolId>,
    /// Parameters, in declaration order (methods).
    pub params: Vec<SymbolId>,
    /// Accessor accessibility overrides (properties). `None` means the
    /// accessor exists with the property's own accessibility.
    pub getter: Option<Accessibility>,
    pub setter: Option<Accessibility>,
    /// Members in declaration order (types and namespaces).
    pub members: Vec<SymbolId>,
    pub is_static: bool,
    /// Unresolved/error placeholder: universally accessible (fail-open).
    pub is_error: bool,
    /// Field-like event (usable as a value, not only in `+=`/`-=`).
    pub is_field_like: bool,
    /// Params-array final parameter.
    pub is_params: bool,
}

impl SymbolData {
    pub(crate) fn new(
        name: Name,
        kind: SymbolKind,
        accessibility: Accessibility,
        assembly: AssemblyId,
    ) -> Self {
        Self {
            name,
            kind,
            accessibility,
            containing: None,
            assembly,
            ty: None,
            base: None,
            element_contributors: Vec::new(),
            alias_target: None,
            params: Vec::new(),
            getter: None,
            setter: None,
            members: Vec::new(),
            is_static: false,
            is_error: false,
            is_field_like: false,
            is_params: false,
        }
    }

    /// Is this a constructed type whose accessibility is the conjunction of
    /// its element contributors?
    pub fn is_constructed_type(&self) -> bool {
        self.kind == SymbolKind::Type && !self.element_contributors.is_empty()
    }

    /// Re-tag every embedded id with a new compilation id.
    ///
    /// Used when a compilation snapshot is cloned into a successor; indices
    /// are stable, only the owning compilation changes.
    pub(crate) fn retagged(mut self, compilation: CompilationId) -> Self {
        let retag = |id: SymbolId| SymbolId::new(compilation, id.index);
        self.containing = self.containing.map(retag);
        self.assembly = AssemblyId::new(compilation, self.assembly.index);
        self.ty = self.ty.map(retag);
        self.base = self.base.map(retag);
        self.alias_target = self.alias_target.map(retag);
        for id in self
            .element_contributors
            .iter_mut()
            .chain(self.params.iter_mut())
            .chain(self.members.iter_mut())
        {
            *id = retag(*id);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protected_internal_halves() {
        assert!(Accessibility::ProtectedInternal.involves_protected());
        assert!(Accessibility::ProtectedInternal.involves_internal());
        assert!(Accessibility::PrivateProtected.involves_protected());
        assert!(Accessibility::PrivateProtected.involves_internal());
        assert!(!Accessibility::Public.involves_protected());
        assert!(!Accessibility::Protected.involves_internal());
    }

    #[test]
    fn test_accessibility_display() {
        assert_eq!(Accessibility::PrivateProtected.to_string(), "private protected");
        assert_eq!(Accessibility::ProtectedInternal.to_string(), "protected internal");
    }

    #[test]
    fn test_kind_classification() {
        assert!(SymbolKind::Field.is_value());
        assert!(SymbolKind::RangeVariable.is_value());
        assert!(!SymbolKind::Type.is_value());
        assert!(SymbolKind::Namespace.is_type_or_namespace());
        assert!(SymbolKind::Local.ignores_declared_accessibility());
        assert!(!SymbolKind::Field.ignores_declared_accessibility());
    }
}
