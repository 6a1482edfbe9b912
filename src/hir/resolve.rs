//! Reference resolution — mapping reference sites to declarations.
//!
//! A [`Resolver`] borrows an immutable [`SymbolTable`] snapshot and answers
//! queries; it holds no mutable state, so concurrent queries need no locking.
//!
//! Lookup order for an unqualified reference:
//!
//! 1. Walk the lexical scope chain from the reference's own scope outward.
//! 2. At each lexical level, search the scope's own declarations first, then
//!    its inheritance linearization. Inheritance lookup happens *inside*
//!    each lexical level, not after exhausting the whole chain: a subclass
//!    member shadows an outer lexical declaration only when the subclass
//!    scope is lexically closer.
//! 3. The first level (own or inherited) yielding any same-named declaration
//!    stops the walk; all candidates at that level go to overload selection.
//!    Inner hides outer, never merges.
//!
//! Qualified references (`a.b`) resolve the qualifier first, then search
//! only the qualifier's type scope and its linearization — no lexical
//! fallback. `super(...)` delegations resolve against the immediate
//! superclass's constructor set only.

use smol_str::SmolStr;
use thiserror::Error;
use tracing::trace;

use super::overload::{self, ArgShape, NameMatchOracle, TypeOracle};
use super::table::{ScopeKind, SymbolTable};
use crate::ast::DeclKind;
use crate::base::{DeclId, Name, ScopeId, TextRange};

/// A reference site: a name occurring in some scope, optionally call-shaped,
/// optionally qualified.
#[derive(Clone, Debug)]
pub struct Reference {
    /// The textual name as written in source.
    pub name: SmolStr,
    /// The scope the reference lexically occurs in.
    pub scope: ScopeId,
    /// Argument shape when the reference is a call; `None` for bare
    /// identifiers.
    pub args: Option<ArgShape>,
    /// Qualifier expression for `a.b` lookups, resolved first.
    pub qualifier: Option<Box<Reference>>,
    /// Marks a `super(...)` constructor delegation.
    pub super_call: bool,
    pub span: TextRange,
}

impl Reference {
    /// A bare identifier reference.
    pub fn ident(name: impl Into<SmolStr>, scope: ScopeId) -> Self {
        Self {
            name: name.into(),
            scope,
            args: None,
            qualifier: None,
            super_call: false,
            span: TextRange::default(),
        }
    }

    /// A call-shaped reference.
    pub fn call(name: impl Into<SmolStr>, scope: ScopeId, args: ArgShape) -> Self {
        Self {
            args: Some(args),
            ..Self::ident(name, scope)
        }
    }

    /// A `super(...)` constructor delegation.
    pub fn super_call(scope: ScopeId, args: ArgShape) -> Self {
        Self {
            super_call: true,
            ..Self::call("super", scope, args)
        }
    }

    /// Attach a qualifier expression.
    pub fn qualified_by(mut self, qualifier: Reference) -> Self {
        self.qualifier = Some(Box::new(qualifier));
        self
    }
}

/// Why a reference failed to resolve.
///
/// Every failure is local to one query and carries enough context for a
/// caller to render a diagnostic; nothing here ever corrupts the table.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("cyclic inheritance involving '{type_name}'")]
    CyclicInheritance { type_name: SmolStr },

    #[error("unresolved reference '{name}'")]
    UnresolvedReference { name: SmolStr },

    #[error("no applicable overload for '{name}' with {arity} argument(s)")]
    NoApplicableOverload {
        name: SmolStr,
        arity: usize,
        /// Candidates that existed but were rejected, for diagnostics.
        rejected: Vec<DeclId>,
    },

    #[error("ambiguous reference '{name}'")]
    AmbiguousReference {
        name: SmolStr,
        /// The full top-ranked tied set, for diagnostics.
        candidates: Vec<DeclId>,
    },
}

impl ResolveError {
    pub(super) fn unresolved(name: &str) -> Self {
        Self::UnresolvedReference {
            name: SmolStr::new(name),
        }
    }

    pub(super) fn ambiguous(name: &str, candidates: Vec<DeclId>) -> Self {
        Self::AmbiguousReference {
            name: SmolStr::new(name),
            candidates,
        }
    }
}

/// Outcome of one resolve query.
pub type ResolutionResult = Result<DeclId, ResolveError>;

/// Query-time resolution over one table snapshot.
///
/// Candidate sets are transient: built fresh per query, never persisted.
#[derive(Clone, Copy)]
pub struct Resolver<'a> {
    table: &'a SymbolTable,
    oracle: &'a dyn TypeOracle,
}

static DEFAULT_ORACLE: NameMatchOracle = NameMatchOracle;

impl<'a> Resolver<'a> {
    /// A resolver with the default structural oracle.
    pub fn new(table: &'a SymbolTable) -> Self {
        Self {
            table,
            oracle: &DEFAULT_ORACLE,
        }
    }

    /// Swap in the host's type-compatibility oracle.
    pub fn with_oracle(mut self, oracle: &'a dyn TypeOracle) -> Self {
        self.oracle = oracle;
        self
    }

    /// Resolve a reference to the unique declaration it denotes.
    pub fn resolve(&self, reference: &Reference) -> ResolutionResult {
        trace!(name = %reference.name, scope = ?reference.scope, "resolve");

        if reference.super_call {
            return self.resolve_super(reference);
        }

        let candidates = match &reference.qualifier {
            Some(qualifier) => self.qualified_candidates(reference, qualifier)?,
            None => self.lexical_candidates(&reference.name, reference.scope)?,
        };

        if candidates.is_empty() {
            return Err(ResolveError::unresolved(&reference.name));
        }

        // A reference site is term position: when a companion pair shares the
        // name, the object denotes the value and wins over the class.
        let candidates = self.prefer_companion_objects(candidates);

        // Call-shaped references to a class or object mean "invoke": expand
        // classes to their constructor sets and objects to their `apply`
        // members before overload selection.
        let candidates = match &reference.args {
            Some(_) => self.expand_invocations(&reference.name, candidates)?,
            None => candidates,
        };

        overload::select(
            self.table,
            self.oracle,
            &reference.name,
            candidates,
            reference.args.as_ref(),
        )
    }

    // ------------------------------------------------------------------
    // Candidate collection
    // ------------------------------------------------------------------

    /// Unqualified lookup: lexical chain outward, inherited scopes searched
    /// inside each lexical level.
    fn lexical_candidates(
        &self,
        name: &str,
        from: ScopeId,
    ) -> Result<Vec<DeclId>, ResolveError> {
        let Some(interned) = self.table.find_name(name) else {
            return Ok(Vec::new());
        };

        let mut cursor = Some(from);
        while let Some(scope_id) = cursor {
            if let Some(found) = self.level_candidates(interned, scope_id)? {
                return Ok(found);
            }
            cursor = self.table.scope(scope_id).parent;
        }
        Ok(Vec::new())
    }

    /// Search one lexical level: own declarations, then the level's
    /// inheritance linearization. `Ok(None)` means nothing at this level.
    fn level_candidates(
        &self,
        name: Name,
        scope_id: ScopeId,
    ) -> Result<Option<Vec<DeclId>>, ResolveError> {
        let scope = self.table.scope(scope_id);
        if let Some(bucket) = scope.get(name) {
            return Ok(Some(bucket.to_vec()));
        }

        // Inherited members participate at the lexical level of the type
        // scope that inherits them.
        if scope.kind == ScopeKind::Type {
            if let Some(owner) = scope.owner {
                for &ancestor in self.table.linearization(owner)?.iter().skip(1) {
                    if let Some(bucket) = self.table.scope(ancestor).get(name) {
                        let visible = self.visible_from_subtype(bucket);
                        // A bucket of only-private members does not shadow:
                        // keep walking outward.
                        if !visible.is_empty() {
                            return Ok(Some(visible));
                        }
                    }
                }
            }
        }
        Ok(None)
    }

    /// Qualified lookup: the qualifier's type scope and its linearization
    /// only, no lexical fallback.
    ///
    /// When the qualifier's type is a class with a companion object, the
    /// companion's members are searched after the class's own: module
    /// members are reachable through the shared name.
    fn qualified_candidates(
        &self,
        reference: &Reference,
        qualifier: &Reference,
    ) -> Result<Vec<DeclId>, ResolveError> {
        let qualifier_decl = self.resolve(qualifier)?;
        let Some(type_decl) = self.qualifier_type(qualifier_decl) else {
            return Ok(Vec::new());
        };

        let found = self.member_candidates(type_decl, &reference.name)?;
        if !found.is_empty() {
            return Ok(found);
        }
        if self.table.decl(type_decl).kind == DeclKind::Class {
            if let Some(companion) = self.table.companion_of(type_decl) {
                return self.member_candidates(companion, &reference.name);
            }
        }
        Ok(Vec::new())
    }

    /// Members named `name` of a type declaration: own scope first, then its
    /// linearization, first matching level wins.
    fn member_candidates(
        &self,
        type_decl: DeclId,
        name: &str,
    ) -> Result<Vec<DeclId>, ResolveError> {
        let Some(interned) = self.table.find_name(name) else {
            return Ok(Vec::new());
        };
        let Some(body) = self.table.decl(type_decl).body else {
            return Ok(Vec::new());
        };

        if let Some(bucket) = self.table.scope(body).get(interned) {
            return Ok(bucket.to_vec());
        }
        for &ancestor in self.table.linearization(type_decl)?.iter().skip(1) {
            if let Some(bucket) = self.table.scope(ancestor).get(interned) {
                let visible = self.visible_from_subtype(bucket);
                if !visible.is_empty() {
                    return Ok(visible);
                }
            }
        }
        Ok(Vec::new())
    }

    /// The type declaration whose members a qualifier exposes: a type is its
    /// own member scope, anything else goes through the oracle's declared
    /// type.
    fn qualifier_type(&self, decl: DeclId) -> Option<DeclId> {
        let declaration = self.table.decl(decl);
        if declaration.kind.is_type() {
            return Some(decl);
        }
        let type_name = self.oracle.type_of(self.table, decl)?;
        self.find_type_lexically(&type_name, declaration.owner)
    }

    /// Outward lexical walk for a type declaration by name.
    fn find_type_lexically(&self, name: &str, from: ScopeId) -> Option<DeclId> {
        let interned = self.table.find_name(name)?;
        let mut cursor = Some(from);
        while let Some(scope_id) = cursor {
            let scope = self.table.scope(scope_id);
            if let Some(bucket) = scope.get(interned) {
                if let Some(&found) = bucket
                    .iter()
                    .find(|&&d| self.table.decl(d).kind.is_type())
                {
                    return Some(found);
                }
            }
            cursor = scope.parent;
        }
        None
    }

    /// Private inherited members are not visible from subtypes.
    fn visible_from_subtype(&self, bucket: &[DeclId]) -> Vec<DeclId> {
        bucket
            .iter()
            .copied()
            .filter(|&d| self.table.decl(d).visibility != crate::ast::Visibility::Private)
            .collect()
    }

    /// Drop a class candidate when its paired companion object is also in
    /// the set: `O` and `O(...)` at a use site denote the object.
    fn prefer_companion_objects(&self, candidates: Vec<DeclId>) -> Vec<DeclId> {
        if candidates.len() < 2 {
            return candidates;
        }
        candidates
            .iter()
            .copied()
            .filter(|&d| {
                self.table.decl(d).kind != DeclKind::Class
                    || self
                        .table
                        .companion_of(d)
                        .is_none_or(|companion| !candidates.contains(&companion))
            })
            .collect()
    }

    // ------------------------------------------------------------------
    // Invocation expansion
    // ------------------------------------------------------------------

    /// For a call-shaped reference, replace class candidates with their
    /// constructor sets and object candidates with their `apply` members.
    /// Other candidates pass through unchanged.
    fn expand_invocations(
        &self,
        name: &str,
        candidates: Vec<DeclId>,
    ) -> Result<Vec<DeclId>, ResolveError> {
        let mut out = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            let decl = self.table.decl(candidate);
            match decl.kind {
                DeclKind::Class => {
                    let ctors = self.constructors_of(candidate);
                    if ctors.is_empty() {
                        // Keep the class so selection reports it as rejected
                        // rather than pretending the name does not exist.
                        out.push(candidate);
                    } else {
                        out.extend(ctors);
                    }
                }
                DeclKind::Object => {
                    let applies = self.applies_of(candidate)?;
                    if applies.is_empty() {
                        out.push(candidate);
                    } else {
                        out.extend(applies);
                    }
                }
                _ => out.push(candidate),
            }
        }
        trace!(name, expanded = out.len(), "expanded invocation candidates");
        Ok(out)
    }

    /// The constructor set of a class, in declaration order.
    fn constructors_of(&self, class: DeclId) -> Vec<DeclId> {
        let declaration = self.table.decl(class);
        let Some(body) = declaration.body else {
            return Vec::new();
        };
        self.table
            .scope(body)
            .get(declaration.name)
            .map(|bucket| {
                bucket
                    .iter()
                    .copied()
                    .filter(|&d| self.table.decl(d).kind == DeclKind::Constructor)
                    .collect()
            })
            .unwrap_or_default()
    }

    /// The `apply` members of an object, own scope first then inherited.
    fn applies_of(&self, object: DeclId) -> Result<Vec<DeclId>, ResolveError> {
        let Some(body) = self.table.decl(object).body else {
            return Ok(Vec::new());
        };
        let Some(apply) = self.table.find_name("apply") else {
            return Ok(Vec::new());
        };

        let scope = self.table.scope(body);
        if let Some(bucket) = scope.get(apply) {
            return Ok(bucket.to_vec());
        }
        for &ancestor in self.table.linearization(object)?.iter().skip(1) {
            if let Some(bucket) = self.table.scope(ancestor).get(apply) {
                return Ok(self.visible_from_subtype(bucket));
            }
        }
        Ok(Vec::new())
    }

    // ------------------------------------------------------------------
    // Super delegation
    // ------------------------------------------------------------------

    /// Resolve `super(...)` against the immediate superclass's constructor
    /// set only — single-level delegation, never the full linearization.
    fn resolve_super(&self, reference: &Reference) -> ResolutionResult {
        let Some(class) = self.enclosing_class(reference.scope) else {
            return Err(ResolveError::unresolved(&reference.name));
        };

        let linearization = self.table.linearization(class)?;
        let Some(&super_scope) = linearization.get(1) else {
            // No superclass to delegate to.
            return Err(ResolveError::unresolved(&reference.name));
        };

        let scope = self.table.scope(super_scope);
        let Some(super_decl) = scope.owner else {
            return Err(ResolveError::unresolved(&reference.name));
        };
        let super_name = self.table.decl(super_decl).name;
        let ctors: Vec<DeclId> = scope
            .get(super_name)
            .map(|bucket| {
                bucket
                    .iter()
                    .copied()
                    .filter(|&d| self.table.decl(d).kind == DeclKind::Constructor)
                    .collect()
            })
            .unwrap_or_default();

        if ctors.is_empty() {
            return Err(ResolveError::unresolved(&reference.name));
        }

        overload::select(
            self.table,
            self.oracle,
            &reference.name,
            ctors,
            reference.args.as_ref(),
        )
    }

    /// The nearest enclosing class declaration of a scope.
    fn enclosing_class(&self, from: ScopeId) -> Option<DeclId> {
        let mut cursor = Some(from);
        while let Some(scope_id) = cursor {
            let scope = self.table.scope(scope_id);
            if scope.kind == ScopeKind::Type {
                if let Some(owner) = scope.owner {
                    if self.table.decl(owner).kind == DeclKind::Class {
                        return Some(owner);
                    }
                }
            }
            cursor = scope.parent;
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{DeclNode, Unit};
    use crate::base::UnitId;

    fn build(unit: Unit) -> SymbolTable {
        SymbolTable::build(UnitId::new(0), &unit).unwrap()
    }

    fn scope_of(table: &SymbolTable, type_name: &str) -> ScopeId {
        let name = table.find_name(type_name).unwrap();
        let decl = *table
            .scope(table.root())
            .get(name)
            .unwrap()
            .iter()
            .find(|&&d| table.decl(d).kind.is_type())
            .unwrap();
        table.decl(decl).body.unwrap()
    }

    #[test]
    fn test_own_scope_lookup() {
        let table = build(
            Unit::new("t.scala").decl(DeclNode::class("C").child(DeclNode::field("x", "Int"))),
        );
        let scope = scope_of(&table, "C");

        let decl = table.resolver().resolve(&Reference::ident("x", scope)).unwrap();
        assert_eq!(table.name_text(table.decl(decl).name), "x");
        assert_eq!(table.decl(decl).owner, scope);
    }

    #[test]
    fn test_inner_shadows_outer() {
        let table = build(
            Unit::new("t.scala")
                .decl(DeclNode::field("x", "String"))
                .decl(DeclNode::class("C").child(DeclNode::field("x", "Int"))),
        );
        let scope = scope_of(&table, "C");

        let decl = table.resolver().resolve(&Reference::ident("x", scope)).unwrap();
        // The inner field, typed Int, wins; the outer one is never merged in
        let ty = table.decl(decl).type_name.unwrap();
        assert_eq!(table.name_text(ty), "Int");
    }

    #[test]
    fn test_inherited_member_found_at_subclass_level() {
        let table = build(
            Unit::new("t.scala")
                .decl(DeclNode::class("Base").child(DeclNode::field("size", "Int")))
                .decl(DeclNode::class("Sub").extends("Base")),
        );
        let scope = scope_of(&table, "Sub");

        let decl = table
            .resolver()
            .resolve(&Reference::ident("size", scope))
            .unwrap();
        assert_eq!(table.name_text(table.decl(decl).name), "size");
    }

    #[test]
    fn test_inherited_beats_outer_lexical() {
        // `v` exists both at the unit root and on the superclass; the
        // subclass scope is lexically closer, so the inherited one wins.
        let table = build(
            Unit::new("t.scala")
                .decl(DeclNode::field("v", "String"))
                .decl(DeclNode::class("Base").child(DeclNode::field("v", "Int")))
                .decl(DeclNode::class("Sub").extends("Base")),
        );
        let scope = scope_of(&table, "Sub");

        let decl = table.resolver().resolve(&Reference::ident("v", scope)).unwrap();
        let ty = table.decl(decl).type_name.unwrap();
        assert_eq!(table.name_text(ty), "Int");
    }

    #[test]
    fn test_private_members_not_inherited() {
        let table = build(
            Unit::new("t.scala")
                .decl(DeclNode::class("Base").child(
                    DeclNode::field("secret", "Int").visibility(crate::ast::Visibility::Private),
                ))
                .decl(DeclNode::class("Sub").extends("Base")),
        );
        let scope = scope_of(&table, "Sub");

        let err = table
            .resolver()
            .resolve(&Reference::ident("secret", scope))
            .unwrap_err();
        assert!(matches!(err, ResolveError::UnresolvedReference { .. }));
    }

    #[test]
    fn test_unknown_name_is_unresolved() {
        let table = build(Unit::new("t.scala").decl(DeclNode::class("C")));
        let err = table
            .resolver()
            .resolve(&Reference::ident("nonesuch", table.root()))
            .unwrap_err();
        assert_eq!(err, ResolveError::unresolved("nonesuch"));
    }

    #[test]
    fn test_object_call_hits_synthetic_apply() {
        let table = build(
            Unit::new("t.scala")
                .decl(DeclNode::class("O").param("x", "Int"))
                .decl(DeclNode::object("O")),
        );

        let decl = table
            .resolver()
            .resolve(&Reference::call("O", table.root(), ArgShape::of_arity(1)))
            .unwrap();
        let resolved = table.decl(decl);
        assert!(resolved.synthetic);
        assert_eq!(table.name_text(resolved.name), "apply");
    }

    #[test]
    fn test_class_call_hits_constructor() {
        let table = build(Unit::new("t.scala").decl(DeclNode::class("C").param("x", "Int")));

        let decl = table
            .resolver()
            .resolve(&Reference::call("C", table.root(), ArgShape::of_arity(1)))
            .unwrap();
        assert_eq!(table.decl(decl).kind, DeclKind::Constructor);
    }

    #[test]
    fn test_super_resolves_to_immediate_superclass() {
        let table = build(
            Unit::new("t.scala")
                .decl(DeclNode::class("A").param("y", "Int"))
                .decl(DeclNode::class("B").extends("A")),
        );
        let scope = scope_of(&table, "B");

        let decl = table
            .resolver()
            .resolve(&Reference::super_call(scope, ArgShape::of_arity(1)))
            .unwrap();
        let resolved = table.decl(decl);
        assert_eq!(resolved.kind, DeclKind::Constructor);

        // The resolved constructor's owning scope belongs to class A
        let owner = table.scope(resolved.owner).owner.unwrap();
        assert_eq!(table.name_text(table.decl(owner).name), "A");
    }

    #[test]
    fn test_super_without_superclass_fails() {
        let table = build(Unit::new("t.scala").decl(DeclNode::class("Root")));
        let scope = scope_of(&table, "Root");

        let err = table
            .resolver()
            .resolve(&Reference::super_call(scope, ArgShape::of_arity(0)))
            .unwrap_err();
        assert!(matches!(err, ResolveError::UnresolvedReference { .. }));
    }

    #[test]
    fn test_qualified_skips_lexical_chain() {
        // `holder.x` must look in Holder's scope only; the root-level `x`
        // is not a fallback.
        let table = build(
            Unit::new("t.scala")
                .decl(DeclNode::field("x", "Int"))
                .decl(DeclNode::class("Holder"))
                .decl(DeclNode::field("holder", "Holder")),
        );

        let reference = Reference::ident("x", table.root())
            .qualified_by(Reference::ident("holder", table.root()));
        let err = table.resolver().resolve(&reference).unwrap_err();
        assert!(matches!(err, ResolveError::UnresolvedReference { .. }));
    }

    #[test]
    fn test_qualified_member_lookup() {
        let table = build(
            Unit::new("t.scala")
                .decl(DeclNode::class("Point").child(DeclNode::field("x", "Int")))
                .decl(DeclNode::field("p", "Point")),
        );

        let reference =
            Reference::ident("x", table.root()).qualified_by(Reference::ident("p", table.root()));
        let decl = table.resolver().resolve(&reference).unwrap();
        assert_eq!(table.name_text(table.decl(decl).name), "x");
    }

    #[test]
    fn test_cyclic_type_poisons_only_its_own_lookups() {
        let table = build(
            Unit::new("t.scala")
                .decl(DeclNode::class("A").extends("B"))
                .decl(DeclNode::class("B").extends("A").child(DeclNode::field("member", "Int")))
                .decl(DeclNode::class("Ok").child(DeclNode::field("fine", "Int"))),
        );

        // Lookup inside the cyclic class propagates the cycle error
        let cyclic_scope = scope_of(&table, "A");
        let err = table
            .resolver()
            .resolve(&Reference::ident("member", cyclic_scope))
            .unwrap_err();
        assert!(matches!(err, ResolveError::CyclicInheritance { .. }));

        // Unrelated queries still work
        let ok_scope = scope_of(&table, "Ok");
        assert!(table
            .resolver()
            .resolve(&Reference::ident("fine", ok_scope))
            .is_ok());
    }
}
