//! Inheritance linearization.
//!
//! For every class/trait/object the build computes a flat, ordered ancestor
//! list: the type's own scope first, then a depth-first, left-to-right walk
//! of its supertype lists with duplicates collapsed to their first (nearest)
//! occurrence. Lookup then walks a plain slice; nothing at query time
//! re-traverses the inheritance graph.
//!
//! Cycles are detected here, before any lookup can consult the list: a type
//! that inherits from itself transitively is marked [`Linearized::Cyclic`],
//! which is fatal for that type's resolution only. Queries not touching the
//! cyclic type are unaffected.
//!
//! Tie-break for multi-mixin "same level" conflicts: left-to-right
//! declaration order of the supertype list, first occurrence winning. This
//! is deliberate and documented rather than accidental.

use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use super::decl::Declaration;
use super::table::Scope;
use crate::base::{DeclId, ScopeId};

/// Linearization outcome for one type declaration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(super) enum Linearized {
    /// Own scope first, then ancestors nearest-first, duplicate-free.
    Acyclic(Vec<ScopeId>),
    /// The type participates in (or inherits through) an inheritance cycle.
    Cyclic,
}

/// Compute linearizations for every type declaration in the table.
pub(super) fn compute(scopes: &[Scope], decls: &[Declaration]) -> FxHashMap<DeclId, Linearized> {
    let mut done: FxHashMap<DeclId, Linearized> = FxHashMap::default();
    let mut visiting: Vec<DeclId> = Vec::new();

    for decl in decls {
        if decl.kind.is_type() {
            linearize(decl.id, scopes, decls, &mut done, &mut visiting);
        }
    }
    done
}

fn linearize(
    decl: DeclId,
    scopes: &[Scope],
    decls: &[Declaration],
    done: &mut FxHashMap<DeclId, Linearized>,
    visiting: &mut Vec<DeclId>,
) -> Linearized {
    if let Some(cached) = done.get(&decl) {
        return cached.clone();
    }
    if visiting.contains(&decl) {
        // Re-entered a type still being linearized: inheritance cycle.
        debug!(?decl, "inheritance cycle detected");
        done.insert(decl, Linearized::Cyclic);
        return Linearized::Cyclic;
    }

    let own_scope = match decls[decl.index()].body {
        Some(scope) => scope,
        None => {
            // A type declaration always introduces a body scope; tolerate a
            // missing one as an empty linearization rather than panicking.
            let out = Linearized::Acyclic(Vec::new());
            done.insert(decl, out.clone());
            return out;
        }
    };

    visiting.push(decl);
    let mut out = vec![own_scope];
    let mut cyclic = false;

    for &super_scope in scopes[own_scope.index()].supertypes() {
        let Some(super_decl) = scopes[super_scope.index()].owner else {
            continue;
        };
        match linearize(super_decl, scopes, decls, done, visiting) {
            Linearized::Cyclic => {
                cyclic = true;
                break;
            }
            Linearized::Acyclic(ancestors) => {
                for ancestor in ancestors {
                    if !out.contains(&ancestor) {
                        out.push(ancestor);
                    }
                }
            }
        }
    }
    visiting.pop();

    let result = if cyclic {
        Linearized::Cyclic
    } else {
        trace!(?decl, len = out.len(), "linearized");
        Linearized::Acyclic(out)
    };
    // A cycle may already have marked this decl while we were on the stack;
    // the cyclic verdict wins.
    done.entry(decl).or_insert(result.clone());
    done.get(&decl).cloned().unwrap_or(result)
}

#[cfg(test)]
mod tests {
    use crate::ast::{DeclNode, Unit};
    use crate::base::UnitId;
    use crate::hir::{DeclKind, ResolveError, SymbolTable};

    fn build(unit: Unit) -> SymbolTable {
        SymbolTable::build(UnitId::new(0), &unit).unwrap()
    }

    fn type_decl(table: &SymbolTable, name: &str) -> crate::base::DeclId {
        let interned = table.find_name(name).unwrap();
        *table
            .scope(table.root())
            .get(interned)
            .unwrap()
            .iter()
            .find(|&&d| table.decl(d).kind.is_type())
            .unwrap()
    }

    fn linearized_names(table: &SymbolTable, name: &str) -> Vec<String> {
        table
            .linearization(type_decl(table, name))
            .unwrap()
            .iter()
            .map(|&s| {
                let owner = table.scope(s).owner.unwrap();
                table.name_text(table.decl(owner).name).to_string()
            })
            .collect()
    }

    #[test]
    fn test_single_chain_nearest_first() {
        let table = build(
            Unit::new("t.scala")
                .decl(DeclNode::class("A"))
                .decl(DeclNode::class("B").extends("A"))
                .decl(DeclNode::class("C").extends("B")),
        );
        assert_eq!(linearized_names(&table, "C"), vec!["C", "B", "A"]);
    }

    #[test]
    fn test_diamond_collapses_duplicates() {
        let table = build(
            Unit::new("t.scala")
                .decl(DeclNode::trait_("Top"))
                .decl(DeclNode::trait_("Left").extends("Top"))
                .decl(DeclNode::trait_("Right").extends("Top"))
                .decl(DeclNode::class("Bottom").extends("Left").extends("Right")),
        );
        // Depth-first, left-to-right, first occurrence kept
        assert_eq!(
            linearized_names(&table, "Bottom"),
            vec!["Bottom", "Left", "Top", "Right"]
        );
    }

    #[test]
    fn test_mixin_order_is_declaration_order() {
        let table = build(
            Unit::new("t.scala")
                .decl(DeclNode::trait_("M1"))
                .decl(DeclNode::trait_("M2"))
                .decl(DeclNode::class("C").extends("M2").extends("M1")),
        );
        assert_eq!(linearized_names(&table, "C"), vec!["C", "M2", "M1"]);
    }

    #[test]
    fn test_cycle_is_error_not_loop() {
        let table = build(
            Unit::new("t.scala")
                .decl(DeclNode::class("A").extends("B"))
                .decl(DeclNode::class("B").extends("A"))
                .decl(DeclNode::class("Fine")),
        );

        let err = table.linearization(type_decl(&table, "A")).unwrap_err();
        assert!(matches!(err, ResolveError::CyclicInheritance { .. }));

        // Unrelated types still linearize
        assert_eq!(linearized_names(&table, "Fine"), vec!["Fine"]);
    }

    #[test]
    fn test_self_inheritance_is_cyclic() {
        let table = build(Unit::new("t.scala").decl(DeclNode::class("Ouroboros").extends("Ouroboros")));
        assert!(table.linearization(type_decl(&table, "Ouroboros")).is_err());
    }

    #[test]
    fn test_deterministic_across_builds() {
        let make = || {
            build(
                Unit::new("t.scala")
                    .decl(DeclNode::trait_("Top"))
                    .decl(DeclNode::trait_("Left").extends("Top"))
                    .decl(DeclNode::trait_("Right").extends("Top"))
                    .decl(DeclNode::class("Bottom").extends("Left").extends("Right")),
            )
        };
        let a = make();
        let b = make();
        assert_eq!(linearized_names(&a, "Bottom"), linearized_names(&b, "Bottom"));
    }

    #[test]
    fn test_non_type_decl_has_empty_linearization() {
        let table = build(Unit::new("t.scala").decl(DeclNode::method("f")));
        let f = *table
            .scope(table.root())
            .get(table.find_name("f").unwrap())
            .unwrap()
            .first()
            .unwrap();
        assert_eq!(table.decl(f).kind, DeclKind::Method);
        assert_eq!(table.linearization(f).unwrap(), &[]);
    }
}
