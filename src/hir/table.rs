//! Symbol table construction.
//!
//! [`SymbolTableBuilder`] walks the input declaration tree exactly once,
//! creating one [`Scope`] per scope-introducing node and inserting each
//! declared name into its owning scope in source order. A finalize pass then
//! resolves textual supertype references, computes inheritance
//! linearizations, pairs companions and materializes synthetic members.
//!
//! The resulting [`SymbolTable`] is immutable: rebuilds produce a whole new
//! table rather than mutating in place, which is what lets resolve queries
//! run lock-free against a snapshot.

use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use smol_str::SmolStr;
use thiserror::Error;
use tracing::debug;

use super::decl::{Declaration, Param};
use super::linearize::{self, Linearized};
use super::overload::ArgShape;
use super::resolve::{Reference, ResolveError, Resolver};
use super::synthetic;
use crate::ast::{self, DeclKind, Unit, Visibility};
use crate::base::{DeclId, Interner, Name, ScopeId, TextRange, UnitId};

/// What introduced a scope.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum ScopeKind {
    /// The compilation-unit root.
    Unit,
    /// A class, trait or object body. Participates in inheritance.
    Type,
    /// A method or constructor body. Owns parameters and locals.
    Body,
}

/// A region owning declarations, with one lexical parent and an ordered
/// supertype-scope list.
///
/// Lexical parents form a tree; supertype scopes are kept in a separate list
/// so inheritance lookup never gets conflated with the lexical chain.
#[derive(Clone, Debug)]
pub struct Scope {
    pub id: ScopeId,
    pub kind: ScopeKind,
    /// The declaration introducing this scope; `None` for the root.
    pub owner: Option<DeclId>,
    pub parent: Option<ScopeId>,
    /// Declarations by name, insertion order preserved. Same-named entries
    /// (overloads, companions) share one bucket.
    decls: IndexMap<Name, Vec<DeclId>>,
    /// Directly declared supertype scopes, in declaration order.
    /// Populated during finalize; only meaningful for `Type` scopes.
    supertypes: Vec<ScopeId>,
}

impl Scope {
    fn new(id: ScopeId, kind: ScopeKind, owner: Option<DeclId>, parent: Option<ScopeId>) -> Self {
        Self {
            id,
            kind,
            owner,
            parent,
            decls: IndexMap::new(),
            supertypes: Vec::new(),
        }
    }

    /// All declarations sharing `name` in this scope, in insertion order.
    pub fn get(&self, name: Name) -> Option<&[DeclId]> {
        self.decls.get(&name).map(Vec::as_slice)
    }

    /// Iterate all declarations in insertion order.
    pub fn decls(&self) -> impl Iterator<Item = DeclId> + '_ {
        self.decls.values().flatten().copied()
    }

    /// Iterate name buckets in insertion order.
    pub fn buckets(&self) -> impl Iterator<Item = (Name, &[DeclId])> {
        self.decls.iter().map(|(&name, ids)| (name, ids.as_slice()))
    }

    /// The directly declared supertype scopes.
    pub fn supertypes(&self) -> &[ScopeId] {
        &self.supertypes
    }

    pub fn len(&self) -> usize {
        self.decls.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.decls.is_empty()
    }

    fn insert(&mut self, name: Name, id: DeclId) {
        self.decls.entry(name).or_default().push(id);
    }

    /// Insert ahead of existing same-named entries, so synthetic members sit
    /// before user-declared ones.
    fn insert_front(&mut self, name: Name, id: DeclId) {
        self.decls.entry(name).or_default().insert(0, id);
    }
}

/// Structurally malformed input tree.
///
/// These indicate a broken collaborator, not a user-facing name error: a
/// well-formed AST never triggers them. The build aborts; nothing partial is
/// published.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum BuildError {
    #[error("constructor outside a class body in '{owner}'")]
    MisplacedConstructor { owner: SmolStr },

    #[error("parameter '{name}' declared outside a parameter list")]
    MisplacedParam { name: SmolStr },

    #[error("'{name}' cannot own nested declarations")]
    NoBodyScope { name: SmolStr },

    #[error("variadic parameter '{param}' of '{name}' is not last")]
    VariadicNotLast { name: SmolStr, param: SmolStr },

    #[error("default-valued parameter '{param}' of '{name}' precedes a required one")]
    DefaultNotTrailing { name: SmolStr, param: SmolStr },
}

/// An immutable, queryable table of scopes and declarations for one
/// compilation unit.
///
/// `Send + Sync`: concurrent resolve queries borrow it read-only. Replaced
/// wholesale on rebuild, never patched.
#[derive(Debug)]
pub struct SymbolTable {
    unit: UnitId,
    unit_name: SmolStr,
    interner: Interner,
    scopes: Vec<Scope>,
    decls: Vec<Declaration>,
    /// Symmetric class ↔ object companion pairing.
    companions: FxHashMap<DeclId, DeclId>,
    /// Per-type linearization outcome, computed once at build time.
    linearizations: FxHashMap<DeclId, Linearized>,
    /// Reference sites recorded in the input tree, for whole-unit checking.
    references: Vec<Reference>,
}

impl SymbolTable {
    /// Build a table from an input tree. Convenience for
    /// [`SymbolTableBuilder::build`].
    pub fn build(unit: UnitId, tree: &Unit) -> Result<SymbolTable, BuildError> {
        SymbolTableBuilder::new(unit).build(tree)
    }

    pub fn unit(&self) -> UnitId {
        self.unit
    }

    pub fn unit_name(&self) -> &str {
        &self.unit_name
    }

    /// The compilation-unit root scope.
    pub fn root(&self) -> ScopeId {
        ScopeId::new(0)
    }

    pub fn scope(&self, id: ScopeId) -> &Scope {
        &self.scopes[id.index()]
    }

    pub fn decl(&self, id: DeclId) -> &Declaration {
        &self.decls[id.index()]
    }

    /// The text of an interned name.
    pub fn name_text(&self, name: Name) -> SmolStr {
        self.interner.text(name)
    }

    /// Look up an already-interned name. `None` means no declaration in this
    /// table carries the string.
    pub fn find_name(&self, text: &str) -> Option<Name> {
        self.interner.find(text)
    }

    pub fn interner(&self) -> &Interner {
        &self.interner
    }

    /// The companion of a class/object declaration, if paired.
    pub fn companion_of(&self, decl: DeclId) -> Option<DeclId> {
        self.companions.get(&decl).copied()
    }

    /// The inheritance linearization of a type declaration: its own scope
    /// first, then ancestors nearest-first, duplicates collapsed.
    ///
    /// Non-type declarations yield an empty list. A type involved in an
    /// inheritance cycle yields [`ResolveError::CyclicInheritance`]; other
    /// types resolve unaffected.
    pub fn linearization(&self, decl: DeclId) -> Result<&[ScopeId], ResolveError> {
        match self.linearizations.get(&decl) {
            Some(Linearized::Acyclic(scopes)) => Ok(scopes),
            Some(Linearized::Cyclic) => Err(ResolveError::CyclicInheritance {
                type_name: self.name_text(self.decl(decl).name),
            }),
            None => Ok(&[]),
        }
    }

    /// Reference sites recorded at build time, for whole-unit diagnostics.
    pub fn references(&self) -> &[Reference] {
        &self.references
    }

    pub fn decl_count(&self) -> usize {
        self.decls.len()
    }

    pub fn scope_count(&self) -> usize {
        self.scopes.len()
    }

    /// Iterate all declarations.
    pub fn decls(&self) -> impl Iterator<Item = &Declaration> {
        self.decls.iter()
    }

    /// Iterate all scopes.
    pub fn scopes(&self) -> impl Iterator<Item = &Scope> {
        self.scopes.iter()
    }

    /// A resolver over this snapshot with the default structural oracle.
    pub fn resolver(&self) -> Resolver<'_> {
        Resolver::new(self)
    }
}

/// Walks a declaration tree once and produces a [`SymbolTable`].
pub struct SymbolTableBuilder {
    unit: UnitId,
    interner: Interner,
    scopes: Vec<Scope>,
    decls: Vec<Declaration>,
    references: Vec<Reference>,
    companions: FxHashMap<DeclId, DeclId>,
    /// Textual supertype lists awaiting resolution, per type scope.
    pending_supers: Vec<(ScopeId, Vec<SmolStr>)>,
}

impl SymbolTableBuilder {
    pub fn new(unit: UnitId) -> Self {
        Self {
            unit,
            interner: Interner::new(),
            scopes: Vec::new(),
            decls: Vec::new(),
            references: Vec::new(),
            companions: FxHashMap::default(),
            pending_supers: Vec::new(),
        }
    }

    /// Build the table: one walk, then finalize (supertypes, linearizations,
    /// companions, synthetic members).
    pub fn build(mut self, tree: &Unit) -> Result<SymbolTable, BuildError> {
        let root = self.alloc_scope(ScopeKind::Unit, None, None);

        for node in &tree.decls {
            self.walk(node, root)?;
        }
        for site in &tree.refs {
            let reference = self.convert_ref(site, root);
            self.references.push(reference);
        }

        self.resolve_supertypes();
        let linearizations = linearize::compute(&self.scopes, &self.decls);
        self.pair_companions();

        debug!(
            unit = %tree.name,
            decls = self.decls.len(),
            scopes = self.scopes.len(),
            "built symbol table"
        );

        Ok(SymbolTable {
            unit: self.unit,
            unit_name: tree.name.clone(),
            interner: self.interner,
            scopes: self.scopes,
            decls: self.decls,
            companions: self.companions,
            linearizations,
            references: self.references,
        })
    }

    fn alloc_scope(
        &mut self,
        kind: ScopeKind,
        owner: Option<DeclId>,
        parent: Option<ScopeId>,
    ) -> ScopeId {
        let id = ScopeId::new(self.scopes.len() as u32);
        self.scopes.push(Scope::new(id, kind, owner, parent));
        id
    }

    fn alloc_decl(&mut self, decl: Declaration) -> DeclId {
        let id = decl.id;
        debug_assert_eq!(id.index(), self.decls.len());
        self.decls.push(decl);
        id
    }

    fn next_decl_id(&self) -> DeclId {
        DeclId::new(self.decls.len() as u32)
    }

    fn check_params(name: &SmolStr, params: &[ast::ParamNode]) -> Result<(), BuildError> {
        let mut seen_default = false;
        for (i, p) in params.iter().enumerate() {
            if p.variadic && i + 1 != params.len() {
                return Err(BuildError::VariadicNotLast {
                    name: name.clone(),
                    param: p.name.clone(),
                });
            }
            if p.has_default {
                seen_default = true;
            } else if seen_default && !p.variadic {
                return Err(BuildError::DefaultNotTrailing {
                    name: name.clone(),
                    param: p.name.clone(),
                });
            }
        }
        Ok(())
    }

    fn lower_params(&mut self, params: &[ast::ParamNode]) -> Vec<Param> {
        params
            .iter()
            .map(|p| Param {
                name: self.interner.intern(&p.name),
                type_name: p.type_name.as_deref().map(|t| self.interner.intern(t)),
                has_default: p.has_default,
                variadic: p.variadic,
            })
            .collect()
    }

    /// Insert one parameter declaration per descriptor into a body scope.
    fn declare_params(&mut self, params: &[Param], body: ScopeId, span: TextRange) {
        for &p in params {
            let id = self.next_decl_id();
            self.alloc_decl(Declaration {
                id,
                name: p.name,
                kind: DeclKind::Param,
                owner: body,
                params: None,
                visibility: Visibility::Public,
                synthetic: false,
                type_name: p.type_name,
                body: None,
                span,
            });
            self.scopes[body.index()].insert(p.name, id);
        }
    }

    fn walk(&mut self, node: &ast::DeclNode, owner: ScopeId) -> Result<(), BuildError> {
        match node.kind {
            DeclKind::Param => Err(BuildError::MisplacedParam {
                name: node.name.clone(),
            }),
            DeclKind::Constructor => self.walk_constructor(node, owner),
            kind if kind.is_type() => self.walk_type(node, owner),
            DeclKind::Method => self.walk_method(node, owner),
            _ => self.walk_leaf(node, owner),
        }
    }

    fn walk_type(&mut self, node: &ast::DeclNode, owner: ScopeId) -> Result<(), BuildError> {
        let name = self.interner.intern(&node.name);
        let id = self.next_decl_id();
        let body = self.alloc_scope(ScopeKind::Type, Some(id), Some(owner));

        self.alloc_decl(Declaration {
            id,
            name,
            kind: node.kind,
            owner,
            params: None,
            visibility: node.visibility,
            synthetic: false,
            type_name: None,
            body: Some(body),
            span: node.span,
        });
        self.scopes[owner.index()].insert(name, id);

        if !node.supertypes.is_empty() {
            self.pending_supers.push((body, node.supertypes.clone()));
        }

        // A parameter list on a class node is its primary constructor.
        if let Some(param_nodes) = &node.params {
            Self::check_params(&node.name, param_nodes)?;
            let params = self.lower_params(param_nodes);
            self.declare_constructor(name, params, node.visibility, body, node.span);
        }

        for child in &node.children {
            self.walk(child, body)?;
        }
        for site in &node.refs {
            let reference = self.convert_ref(site, body);
            self.references.push(reference);
        }
        Ok(())
    }

    /// Constructors are stored under their class's name, so constructor
    /// invocations (`C(...)`, `super(...)`) find them by the same lookup path
    /// as everything else.
    fn declare_constructor(
        &mut self,
        class_name: Name,
        params: Vec<Param>,
        visibility: Visibility,
        class_body: ScopeId,
        span: TextRange,
    ) -> DeclId {
        // The constructor must occupy its reserved arena slot before its
        // parameters allocate theirs.
        let id = self.next_decl_id();
        let body = self.alloc_scope(ScopeKind::Body, Some(id), Some(class_body));
        self.alloc_decl(Declaration {
            id,
            name: class_name,
            kind: DeclKind::Constructor,
            owner: class_body,
            params: Some(params.clone()),
            visibility,
            synthetic: false,
            type_name: None,
            body: Some(body),
            span,
        });
        self.scopes[class_body.index()].insert(class_name, id);
        self.declare_params(&params, body, span);
        id
    }

    fn walk_constructor(&mut self, node: &ast::DeclNode, owner: ScopeId) -> Result<(), BuildError> {
        let scope = &self.scopes[owner.index()];
        let class_decl = match (scope.kind, scope.owner) {
            (ScopeKind::Type, Some(owner_decl))
                if self.decls[owner_decl.index()].kind == DeclKind::Class =>
            {
                owner_decl
            }
            _ => {
                return Err(BuildError::MisplacedConstructor {
                    owner: node.name.clone(),
                })
            }
        };
        let class_name = self.decls[class_decl.index()].name;

        let param_nodes = node.params.as_deref().unwrap_or(&[]);
        Self::check_params(&node.name, param_nodes)?;
        let params = self.lower_params(param_nodes);
        let id = self.declare_constructor(class_name, params, node.visibility, owner, node.span);

        let body = self.decls[id.index()].body;
        for site in &node.refs {
            let reference = self.convert_ref(site, body.unwrap_or(owner));
            self.references.push(reference);
        }
        if let Some(child) = node.children.first() {
            return Err(BuildError::NoBodyScope {
                name: child.name.clone(),
            });
        }
        Ok(())
    }

    fn walk_method(&mut self, node: &ast::DeclNode, owner: ScopeId) -> Result<(), BuildError> {
        let name = self.interner.intern(&node.name);
        let param_nodes = node.params.as_deref().unwrap_or(&[]);
        Self::check_params(&node.name, param_nodes)?;
        let params = self.lower_params(param_nodes);

        let id = self.next_decl_id();
        let body = self.alloc_scope(ScopeKind::Body, Some(id), Some(owner));
        self.alloc_decl(Declaration {
            id,
            name,
            kind: DeclKind::Method,
            owner,
            params: Some(params.clone()),
            visibility: node.visibility,
            synthetic: false,
            type_name: node.type_name.as_deref().map(|t| self.interner.intern(t)),
            body: Some(body),
            span: node.span,
        });
        self.scopes[owner.index()].insert(name, id);
        self.declare_params(&params, body, node.span);

        for child in &node.children {
            self.walk(child, body)?;
        }
        for site in &node.refs {
            let reference = self.convert_ref(site, body);
            self.references.push(reference);
        }
        Ok(())
    }

    /// Fields and type aliases: no body scope, no children.
    fn walk_leaf(&mut self, node: &ast::DeclNode, owner: ScopeId) -> Result<(), BuildError> {
        if let Some(child) = node.children.first() {
            return Err(BuildError::NoBodyScope {
                name: child.name.clone(),
            });
        }
        let name = self.interner.intern(&node.name);
        let id = self.next_decl_id();
        self.alloc_decl(Declaration {
            id,
            name,
            kind: node.kind,
            owner,
            params: None,
            visibility: node.visibility,
            synthetic: false,
            type_name: node.type_name.as_deref().map(|t| self.interner.intern(t)),
            body: None,
            span: node.span,
        });
        self.scopes[owner.index()].insert(name, id);

        for site in &node.refs {
            let reference = self.convert_ref(site, owner);
            self.references.push(reference);
        }
        Ok(())
    }

    fn convert_ref(&mut self, node: &ast::RefNode, scope: ScopeId) -> Reference {
        Reference {
            name: node.name.clone(),
            scope,
            args: node.args.clone().map(ArgShape::from_hints),
            qualifier: node
                .qualifier
                .as_deref()
                .map(|q| Box::new(self.convert_ref(q, scope))),
            super_call: node.super_call,
            span: node.span,
        }
    }

    // ------------------------------------------------------------------
    // Finalize
    // ------------------------------------------------------------------

    /// Resolve the textual supertype lists into scope links.
    ///
    /// Supertype names are looked up along the lexical chain only (own
    /// declarations per scope, outward walk): inheritance has not been
    /// computed yet, so inherited names cannot participate here.
    fn resolve_supertypes(&mut self) {
        let pending = std::mem::take(&mut self.pending_supers);
        for (type_scope, names) in pending {
            let from = self.scopes[type_scope.index()].parent;
            for name in names {
                match from.and_then(|s| self.find_type_decl(&name, s)) {
                    Some(target) => {
                        let Some(target_scope) = self.decls[target.index()].body else {
                            continue;
                        };
                        self.scopes[type_scope.index()].supertypes.push(target_scope);
                    }
                    None => {
                        debug!(supertype = %name, "unresolved supertype reference, skipping");
                    }
                }
            }
        }
    }

    /// Lexical outward walk for a type declaration with the given name.
    fn find_type_decl(&self, name: &str, from: ScopeId) -> Option<DeclId> {
        let name = self.interner.find(name)?;
        let mut cursor = Some(from);
        while let Some(scope) = cursor {
            let scope = &self.scopes[scope.index()];
            if let Some(bucket) = scope.get(name) {
                if let Some(&found) = bucket
                    .iter()
                    .find(|&&d| self.decls[d.index()].kind.is_type())
                {
                    return Some(found);
                }
            }
            cursor = scope.parent;
        }
        None
    }

    /// Pair same-named class/object declarations sharing an owner scope and
    /// materialize the object's synthetic members.
    fn pair_companions(&mut self) {
        let mut pairs: Vec<(DeclId, DeclId)> = Vec::new();
        for scope in &self.scopes {
            for (_, bucket) in scope.buckets() {
                let class = bucket
                    .iter()
                    .find(|&&d| self.decls[d.index()].kind == DeclKind::Class);
                let object = bucket
                    .iter()
                    .find(|&&d| self.decls[d.index()].kind == DeclKind::Object);
                if let (Some(&class), Some(&object)) = (class, object) {
                    pairs.push((class, object));
                }
            }
        }

        for (class, object) in pairs {
            self.synthesize_members(class, object);
        }
    }

    fn synthesize_members(&mut self, class: DeclId, object: DeclId) {
        let class_decl = &self.decls[class.index()];
        let class_name = class_decl.name;
        let class_scope = class_decl.body.expect("class decl has a body scope");
        let object_decl = &self.decls[object.index()];
        let object_scope = object_decl.body.expect("object decl has a body scope");
        let object_span = object_decl.span;

        let ctors: Vec<DeclId> = self.scopes[class_scope.index()]
            .get(class_name)
            .map(|bucket| {
                bucket
                    .iter()
                    .copied()
                    .filter(|&d| self.decls[d.index()].kind == DeclKind::Constructor)
                    .collect()
            })
            .unwrap_or_default();
        let ctor_decls: Vec<&Declaration> =
            ctors.iter().map(|&d| &self.decls[d.index()]).collect();

        let members = synthetic::synthesize_for_pair(&self.interner, class_name, &ctor_decls);
        debug!(
            class = %self.interner.text(class_name),
            members = members.len(),
            "synthesized companion members"
        );

        // Reverse so repeated front-insertion preserves member order.
        for member in members.into_iter().rev() {
            let id = self.next_decl_id();
            self.alloc_decl(Declaration {
                id,
                name: member.name,
                kind: DeclKind::Method,
                owner: object_scope,
                params: Some(member.params),
                visibility: Visibility::Public,
                synthetic: true,
                type_name: member.type_name,
                body: None,
                span: object_span,
            });
            self.scopes[object_scope.index()].insert_front(member.name, id);
        }

        self.companions.insert(class, object);
        self.companions.insert(object, class);
    }
}
