//! Compilation snapshots: the frozen symbol graph and its builder.

use std::collections::hash_map::Entry;

use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::base::{Name, NameTable};
use crate::bind::SymbolInfo;
use crate::error::QueryError;

use super::assembly::AssemblyIdentity;
use super::ids::{AssemblyId, CompilationId, SymbolId};
use super::symbol::{Accessibility, SymbolData, SymbolKind};

/// The context an accessibility question is asked from: a specific type, or
/// a whole assembly ("can anything in this assembly see the symbol").
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Within {
    Type(SymbolId),
    Assembly(AssemblyId),
}

/// One immutable compilation snapshot.
///
/// Built once by [`CompilationBuilder`], then only read. Queries from many
/// threads share a snapshot freely; the only interior mutability is the
/// per-node result cache, which is compute-if-absent and idempotent.
pub struct Compilation {
    id: CompilationId,
    names: NameTable,
    symbols: Vec<SymbolData>,
    assemblies: Vec<AssemblyIdentity>,
    global_namespace: u32,
    cache: QueryCache,
}

impl Compilation {
    /// Start building a compilation whose source assembly is `source`.
    pub fn builder(source: AssemblyIdentity) -> CompilationBuilder {
        CompilationBuilder::new(source)
    }

    /// This snapshot's identity.
    pub fn id(&self) -> CompilationId {
        self.id
    }

    /// The root namespace.
    pub fn global_namespace(&self) -> SymbolId {
        SymbolId::new(self.id, self.global_namespace)
    }

    /// The assembly being compiled.
    pub fn source_assembly(&self) -> AssemblyId {
        AssemblyId::new(self.id, 0)
    }

    /// Declaration facts for a symbol, with the cross-compilation guard.
    pub fn symbol(&self, id: SymbolId) -> Result<&SymbolData, QueryError> {
        self.check_symbol(id)?;
        Ok(self.data(id))
    }

    /// The declared name of a symbol.
    pub fn symbol_name(&self, id: SymbolId) -> Result<&str, QueryError> {
        self.check_symbol(id)?;
        Ok(self.resolve_name(self.data(id).name))
    }

    /// The identity of an assembly, with the cross-compilation guard.
    pub fn assembly_identity(&self, id: AssemblyId) -> Result<&AssemblyIdentity, QueryError> {
        self.check_assembly(id)?;
        Ok(&self.assemblies[id.index as usize])
    }

    pub(crate) fn resolve_name(&self, name: Name) -> &str {
        self.names.resolve(name).unwrap_or("")
    }

    pub(crate) fn lookup_name(&self, text: &str) -> Option<Name> {
        self.names.get(text)
    }

    /// Unchecked access; callers validate ids at the query boundary.
    pub(crate) fn data(&self, id: SymbolId) -> &SymbolData {
        &self.symbols[id.index as usize]
    }

    pub(crate) fn identity(&self, id: AssemblyId) -> &AssemblyIdentity {
        &self.assemblies[id.index as usize]
    }

    pub(crate) fn check_symbol(&self, id: SymbolId) -> Result<(), QueryError> {
        if id.compilation != self.id {
            return Err(QueryError::ForeignSymbol {
                symbol: id,
                expected: self.id,
                actual: id.compilation,
            });
        }
        debug_assert!((id.index as usize) < self.symbols.len());
        Ok(())
    }

    pub(crate) fn check_assembly(&self, id: AssemblyId) -> Result<(), QueryError> {
        if id.compilation != self.id {
            return Err(QueryError::ForeignAssembly {
                assembly: id,
                expected: self.id,
                actual: id.compilation,
            });
        }
        debug_assert!((id.index as usize) < self.assemblies.len());
        Ok(())
    }

    pub(crate) fn check_within(&self, within: Within) -> Result<(), QueryError> {
        match within {
            Within::Type(t) => {
                self.check_symbol(t)?;
                if self.data(t).kind != SymbolKind::Type {
                    return Err(QueryError::NotAType { symbol: t });
                }
                Ok(())
            }
            Within::Assembly(a) => self.check_assembly(a),
        }
    }

    /// Does `sub` derive (transitively) from `sup`? Never true reflexively.
    pub(crate) fn derives_from(&self, sub: SymbolId, sup: SymbolId) -> bool {
        // Fuel bounds malformed cyclic base chains.
        let mut fuel = self.symbols.len();
        let mut current = self.data(sub).base;
        while let Some(base) = current {
            if base == sup {
                return true;
            }
            if fuel == 0 {
                return false;
            }
            fuel -= 1;
            current = self.data(base).base;
        }
        false
    }

    /// Is `inner` lexically nested (transitively) inside `outer`?
    pub(crate) fn is_nested_in(&self, inner: SymbolId, outer: SymbolId) -> bool {
        let mut current = self.data(inner).containing;
        while let Some(parent) = current {
            if parent == outer {
                return true;
            }
            current = self.data(parent).containing;
        }
        false
    }

    /// The nearest enclosing type of a symbol, excluding the symbol itself.
    pub(crate) fn containing_type_of(&self, id: SymbolId) -> Option<SymbolId> {
        let mut current = self.data(id).containing;
        while let Some(parent) = current {
            if self.data(parent).kind == SymbolKind::Type {
                return Some(parent);
            }
            current = self.data(parent).containing;
        }
        None
    }

    /// The assembly a `Within` context queries from.
    pub(crate) fn assembly_of_within(&self, within: Within) -> AssemblyId {
        match within {
            Within::Type(t) => self.data(t).assembly,
            Within::Assembly(a) => a,
        }
    }

    /// Produce a new compilation with one more referenced assembly.
    ///
    /// Additive only: this snapshot is untouched, and the successor gets a
    /// fresh [`CompilationId`], so ids minted here are foreign to it.
    /// `populate` receives the new builder and the new assembly's id so the
    /// metadata loader can declare the reference's symbols.
    pub fn with_reference(
        &self,
        identity: AssemblyIdentity,
        populate: impl FnOnce(&mut CompilationBuilder, AssemblyId),
    ) -> Compilation {
        let id = CompilationId::fresh();
        let mut builder = CompilationBuilder {
            id,
            names: self.names.clone(),
            symbols: self
                .symbols
                .iter()
                .map(|data| data.clone().retagged(id))
                .collect(),
            assemblies: self.assemblies.clone(),
            global_namespace: self.global_namespace,
        };
        let assembly = builder.add_reference(identity);
        populate(&mut builder, assembly);
        builder.finish()
    }

    /// Memoized per-node symbol info.
    ///
    /// Compute-if-absent: concurrent callers for the same node may all run
    /// `compute`, but they compute equal results over the frozen graph, so
    /// the first write wins and the rest are discarded.
    pub fn cached_symbol_info(
        &self,
        node: u32,
        compute: impl FnOnce() -> SymbolInfo,
    ) -> SymbolInfo {
        if let Some(hit) = self.cache.results.read().get(&node) {
            return hit.clone();
        }
        let computed = compute();
        match self.cache.results.write().entry(node) {
            Entry::Occupied(entry) => entry.get().clone(),
            Entry::Vacant(entry) => {
                entry.insert(computed.clone());
                computed
            }
        }
    }
}

impl std::fmt::Debug for Compilation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Compilation")
            .field("id", &self.id)
            .field("symbols", &self.symbols.len())
            .field("assemblies", &self.assemblies.len())
            .finish()
    }
}

#[derive(Default)]
struct QueryCache {
    results: RwLock<FxHashMap<u32, SymbolInfo>>,
}

/// Builder for a [`Compilation`].
///
/// Source declarations and metadata-imported facts use the same methods;
/// the metadata loader simply passes the reference's [`AssemblyId`].
pub struct CompilationBuilder {
    id: CompilationId,
    names: NameTable,
    symbols: Vec<SymbolData>,
    assemblies: Vec<AssemblyIdentity>,
    global_namespace: u32,
}

impl CompilationBuilder {
    fn new(source: AssemblyIdentity) -> Self {
        let id = CompilationId::fresh();
        let mut builder = Self {
            id,
            names: NameTable::new(),
            symbols: Vec::new(),
            assemblies: vec![source],
            global_namespace: 0,
        };
        let root_name = builder.names.intern("");
        builder.symbols.push(SymbolData::new(
            root_name,
            SymbolKind::Namespace,
            Accessibility::Public,
            AssemblyId::new(id, 0),
        ));
        builder
    }

    fn make(
        &mut self,
        name: &str,
        kind: SymbolKind,
        accessibility: Accessibility,
        assembly: AssemblyId,
    ) -> (SymbolId, &mut SymbolData) {
        let name = self.names.intern(name);
        let index = self.symbols.len() as u32;
        self.symbols
            .push(SymbolData::new(name, kind, accessibility, assembly));
        let id = SymbolId::new(self.id, index);
        (id, &mut self.symbols[index as usize])
    }

    fn attach(&mut self, child: SymbolId, parent: SymbolId) {
        self.symbols[child.index as usize].containing = Some(parent);
        self.symbols[parent.index as usize].members.push(child);
    }

    /// The assembly being compiled.
    pub fn source_assembly(&self) -> AssemblyId {
        AssemblyId::new(self.id, 0)
    }

    /// The root namespace.
    pub fn global_namespace(&self) -> SymbolId {
        SymbolId::new(self.id, self.global_namespace)
    }

    /// Register a referenced assembly.
    pub fn add_reference(&mut self, identity: AssemblyIdentity) -> AssemblyId {
        let index = self.assemblies.len() as u32;
        self.assemblies.push(identity);
        AssemblyId::new(self.id, index)
    }

    /// Declare (or merge into) a namespace under `parent`.
    pub fn namespace(&mut self, parent: SymbolId, name: &str) -> SymbolId {
        if let Some(existing) = self.names.get(name) {
            let found = self.symbols[parent.index as usize]
                .members
                .iter()
                .copied()
                .find(|&m| {
                    let data = &self.symbols[m.index as usize];
                    data.kind == SymbolKind::Namespace && data.name == existing
                });
            if let Some(ns) = found {
                return ns;
            }
        }
        let assembly = self.source_assembly();
        let (id, _) = self.make(name, SymbolKind::Namespace, Accessibility::Public, assembly);
        self.attach(id, parent);
        id
    }

    /// Declare a type under a namespace or (for nested types) a type.
    pub fn type_in(
        &mut self,
        parent: SymbolId,
        name: &str,
        accessibility: Accessibility,
        assembly: AssemblyId,
    ) -> SymbolId {
        let (id, _) = self.make(name, SymbolKind::Type, accessibility, assembly);
        self.attach(id, parent);
        id
    }

    /// Declare an unresolved/error type placeholder.
    pub fn error_type(&mut self, name: &str) -> SymbolId {
        let assembly = self.source_assembly();
        let (id, data) = self.make(name, SymbolKind::Type, Accessibility::Public, assembly);
        data.is_error = true;
        id
    }

    /// Construct an array type over `element`.
    pub fn array_type(&mut self, element: SymbolId) -> SymbolId {
        let name = format!("{}[]", self.display_name(element));
        let assembly = self.source_assembly();
        let (id, data) = self.make(&name, SymbolKind::Type, Accessibility::Public, assembly);
        data.element_contributors.push(element);
        id
    }

    /// Construct a pointer type over `pointee`.
    pub fn pointer_type(&mut self, pointee: SymbolId) -> SymbolId {
        let name = format!("{}*", self.display_name(pointee));
        let assembly = self.source_assembly();
        let (id, data) = self.make(&name, SymbolKind::Type, Accessibility::Public, assembly);
        data.element_contributors.push(pointee);
        id
    }

    fn display_name(&self, id: SymbolId) -> &str {
        self.names
            .resolve(self.symbols[id.index as usize].name)
            .unwrap_or("")
    }

    /// Construct a function-pointer type; parameter and return types all
    /// contribute to its accessibility.
    pub fn function_pointer_type(&mut self, params: &[SymbolId], ret: SymbolId) -> SymbolId {
        let assembly = self.source_assembly();
        let (id, data) = self.make("delegate*", SymbolKind::Type, Accessibility::Public, assembly);
        data.element_contributors.extend_from_slice(params);
        data.element_contributors.push(ret);
        id
    }

    /// Record that `ty` derives from `base`.
    pub fn set_base_type(&mut self, ty: SymbolId, base: SymbolId) {
        self.symbols[ty.index as usize].base = Some(base);
    }

    /// Declare a field.
    pub fn field(
        &mut self,
        owner: SymbolId,
        name: &str,
        accessibility: Accessibility,
        ty: SymbolId,
        is_static: bool,
    ) -> SymbolId {
        let assembly = self.symbols[owner.index as usize].assembly;
        let (id, data) = self.make(name, SymbolKind::Field, accessibility, assembly);
        data.ty = Some(ty);
        data.is_static = is_static;
        self.attach(id, owner);
        id
    }

    /// Declare a property. Accessor restrictions are added separately with
    /// [`Self::restrict_accessors`].
    pub fn property(
        &mut self,
        owner: SymbolId,
        name: &str,
        accessibility: Accessibility,
        ty: SymbolId,
        is_static: bool,
    ) -> SymbolId {
        let assembly = self.symbols[owner.index as usize].assembly;
        let (id, data) = self.make(name, SymbolKind::Property, accessibility, assembly);
        data.ty = Some(ty);
        data.is_static = is_static;
        self.attach(id, owner);
        id
    }

    /// Restrict a property's accessors below the property's accessibility.
    pub fn restrict_accessors(
        &mut self,
        property: SymbolId,
        getter: Option<Accessibility>,
        setter: Option<Accessibility>,
    ) {
        let data = &mut self.symbols[property.index as usize];
        data.getter = getter;
        data.setter = setter;
    }

    /// Declare an event.
    pub fn event(
        &mut self,
        owner: SymbolId,
        name: &str,
        accessibility: Accessibility,
        ty: SymbolId,
        field_like: bool,
    ) -> SymbolId {
        let assembly = self.symbols[owner.index as usize].assembly;
        let (id, data) = self.make(name, SymbolKind::Event, accessibility, assembly);
        data.ty = Some(ty);
        data.is_field_like = field_like;
        self.attach(id, owner);
        id
    }

    /// Declare a method. Parameters are added with [`Self::parameter`].
    pub fn method(
        &mut self,
        owner: SymbolId,
        name: &str,
        accessibility: Accessibility,
        is_static: bool,
    ) -> SymbolId {
        let assembly = self.symbols[owner.index as usize].assembly;
        let (id, data) = self.make(name, SymbolKind::Method, accessibility, assembly);
        data.is_static = is_static;
        self.attach(id, owner);
        id
    }

    /// Declare a parameter, optionally as the params-array tail.
    pub fn parameter(
        &mut self,
        method: Option<SymbolId>,
        name: &str,
        ty: SymbolId,
        is_params: bool,
    ) -> SymbolId {
        let assembly = self.source_assembly();
        let (id, data) = self.make(name, SymbolKind::Parameter, Accessibility::Public, assembly);
        data.ty = Some(ty);
        data.is_params = is_params;
        if let Some(method) = method {
            data.containing = Some(method);
            self.symbols[method.index as usize].params.push(id);
        }
        id
    }

    /// Declare a local variable (scope membership comes from the caller's
    /// scope chain, not from containment).
    pub fn local(&mut self, name: &str, ty: SymbolId) -> SymbolId {
        let assembly = self.source_assembly();
        let (id, data) = self.make(name, SymbolKind::Local, Accessibility::Public, assembly);
        data.ty = Some(ty);
        id
    }

    /// Declare a discard (`_`) of a given type.
    pub fn discard(&mut self, ty: SymbolId) -> SymbolId {
        let assembly = self.source_assembly();
        let (id, data) = self.make("_", SymbolKind::Discard, Accessibility::Public, assembly);
        data.ty = Some(ty);
        id
    }

    /// Declare a query range variable.
    pub fn range_variable(&mut self, name: &str, ty: SymbolId) -> SymbolId {
        let assembly = self.source_assembly();
        let (id, data) = self.make(name, SymbolKind::RangeVariable, Accessibility::Public, assembly);
        data.ty = Some(ty);
        id
    }

    /// Declare a file-scope alias (`using Q = E;`).
    pub fn alias(&mut self, name: &str, target: SymbolId) -> SymbolId {
        let assembly = self.source_assembly();
        let (id, data) = self.make(name, SymbolKind::Alias, Accessibility::Public, assembly);
        data.alias_target = Some(target);
        id
    }

    /// Freeze the graph.
    pub fn finish(self) -> Compilation {
        debug!(
            compilation = self.id.index(),
            symbols = self.symbols.len(),
            assemblies = self.assemblies.len(),
            "compilation graph frozen"
        );
        Compilation {
            id: self.id,
            names: self.names,
            symbols: self.symbols,
            assemblies: self.assemblies,
            global_namespace: self.global_namespace,
            cache: QueryCache::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small() -> Compilation {
        let mut b = Compilation::builder(AssemblyIdentity::new("App"));
        let root = b.global_namespace();
        let asm = b.source_assembly();
        let ns = b.namespace(root, "Collections");
        let list = b.type_in(ns, "List", Accessibility::Public, asm);
        let node = b.type_in(list, "Node", Accessibility::Private, asm);
        b.field(node, "next", Accessibility::Public, node, false);
        b.finish()
    }

    #[test]
    fn test_namespace_merging() {
        let mut b = Compilation::builder(AssemblyIdentity::new("App"));
        let root = b.global_namespace();
        let a = b.namespace(root, "Collections");
        let b2 = b.namespace(root, "Collections");
        assert_eq!(a, b2);
    }

    #[test]
    fn test_nesting_queries() {
        let mut b = Compilation::builder(AssemblyIdentity::new("App"));
        let root = b.global_namespace();
        let asm = b.source_assembly();
        let outer = b.type_in(root, "Outer", Accessibility::Public, asm);
        let mid = b.type_in(outer, "Mid", Accessibility::Public, asm);
        let inner = b.type_in(mid, "Inner", Accessibility::Public, asm);
        let sibling = b.type_in(outer, "Sibling", Accessibility::Public, asm);
        let c = b.finish();

        assert!(c.is_nested_in(inner, outer));
        assert!(c.is_nested_in(inner, mid));
        assert!(!c.is_nested_in(sibling, mid));
        assert!(!c.is_nested_in(outer, inner));
    }

    #[test]
    fn test_derivation_walk() {
        let mut b = Compilation::builder(AssemblyIdentity::new("App"));
        let root = b.global_namespace();
        let asm = b.source_assembly();
        let base = b.type_in(root, "Base", Accessibility::Public, asm);
        let mid = b.type_in(root, "Mid", Accessibility::Public, asm);
        let leaf = b.type_in(root, "Leaf", Accessibility::Public, asm);
        b.set_base_type(mid, base);
        b.set_base_type(leaf, mid);
        let c = b.finish();

        assert!(c.derives_from(leaf, base));
        assert!(c.derives_from(mid, base));
        assert!(!c.derives_from(base, leaf));
        assert!(!c.derives_from(base, base)); // not reflexive
    }

    #[test]
    fn test_foreign_symbol_rejected() {
        let a = small();
        let other = small();

        let foreign = other.global_namespace();
        let err = a.symbol(foreign).unwrap_err();
        assert!(matches!(err, QueryError::ForeignSymbol { .. }));
    }

    #[test]
    fn test_with_reference_is_additive() {
        let a = small();
        let before = a.id();

        let b = a.with_reference(AssemblyIdentity::new("Ext"), |builder, asm| {
            let root = builder.global_namespace();
            builder.type_in(root, "Imported", Accessibility::Public, asm);
        });

        // The original snapshot is untouched and keeps its identity.
        assert_eq!(a.id(), before);
        assert_ne!(a.id(), b.id());
        // Old ids are foreign to the successor.
        assert!(b.symbol(a.global_namespace()).is_err());
        assert!(b.symbol(b.global_namespace()).is_ok());
    }

    #[test]
    fn test_cached_symbol_info_is_sticky() {
        let c = small();
        let first = c.cached_symbol_info(7, SymbolInfo::none);
        let second = c.cached_symbol_info(7, || {
            panic!("cache must not recompute");
        });
        assert_eq!(first, second);
    }
}
