//! Synthetic member synthesis for companion objects.
//!
//! A class and an object sharing one name and owner scope are companions.
//! The pairing licenses compiler-generated members on the object:
//!
//! - one `apply` per public constructor of the class, parameter-list-equal
//!   to that constructor (a nullary `apply` when the class declares none),
//! - one `unapply` taking a single value of the class's type.
//!
//! Synthesis is a pure function of the class's constructor set: rebuilding
//! an unchanged pair yields a structurally identical member set, and the
//! members never outlive the class declaration they derive from. Once
//! inserted they are ordinary declarations; lookup and overload selection
//! never special-case them.

use tracing::trace;

use super::decl::{Declaration, Param};
use crate::ast::{DeclKind, Visibility};
use crate::base::{Interner, Name};

/// A synthesized member before arena insertion: name, parameters, and the
/// declared (return) type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SyntheticMember {
    pub name: Name,
    pub params: Vec<Param>,
    pub type_name: Option<Name>,
}

/// Derive the synthetic members for one companion pair.
///
/// `ctors` is the paired class's constructor set in declaration order;
/// entries that are not public constructors are ignored. The result is
/// deterministic: `apply` members first (one per constructor, nullary
/// fallback included), then `unapply`.
pub fn synthesize_for_pair(
    interner: &Interner,
    class_name: Name,
    ctors: &[&Declaration],
) -> Vec<SyntheticMember> {
    let apply = interner.intern("apply");
    let unapply = interner.intern("unapply");
    let value = interner.intern("value");

    let mut members = Vec::new();
    let mut factory_count = 0;
    for ctor in ctors {
        if ctor.kind != DeclKind::Constructor || ctor.visibility != Visibility::Public {
            continue;
        }
        members.push(SyntheticMember {
            name: apply,
            params: ctor.params.clone().unwrap_or_default(),
            type_name: Some(class_name),
        });
        factory_count += 1;
    }
    if factory_count == 0 {
        // A class with no constructors still gets a nullary factory.
        members.push(SyntheticMember {
            name: apply,
            params: Vec::new(),
            type_name: Some(class_name),
        });
    }

    members.push(SyntheticMember {
        name: unapply,
        params: vec![Param {
            name: value,
            type_name: Some(class_name),
            has_default: false,
            variadic: false,
        }],
        type_name: None,
    });

    trace!(members = members.len(), "derived synthetic members");
    members
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{DeclNode, Unit};
    use crate::base::UnitId;
    use crate::hir::SymbolTable;

    fn paired_table() -> SymbolTable {
        let unit = Unit::new("t.scala")
            .decl(DeclNode::class("Box").param("x", "Int"))
            .decl(DeclNode::object("Box"));
        SymbolTable::build(UnitId::new(0), &unit).unwrap()
    }

    fn class_ctors(table: &SymbolTable) -> Vec<Declaration> {
        let name = table.find_name("Box").unwrap();
        let class = *table
            .scope(table.root())
            .get(name)
            .unwrap()
            .iter()
            .find(|&&d| table.decl(d).kind == DeclKind::Class)
            .unwrap();
        let body = table.decl(class).body.unwrap();
        table
            .scope(body)
            .get(name)
            .unwrap()
            .iter()
            .map(|&d| table.decl(d).clone())
            .filter(|d| d.kind == DeclKind::Constructor)
            .collect()
    }

    #[test]
    fn test_apply_mirrors_constructor_params() {
        let table = paired_table();
        let ctors = class_ctors(&table);
        let refs: Vec<&Declaration> = ctors.iter().collect();

        let members = synthesize_for_pair(table.interner(), table.find_name("Box").unwrap(), &refs);

        let apply = table.find_name("apply").unwrap();
        let applies: Vec<_> = members.iter().filter(|m| m.name == apply).collect();
        assert_eq!(applies.len(), 1);
        assert_eq!(applies[0].params, *ctors[0].params.as_ref().unwrap());
    }

    #[test]
    fn test_no_constructors_yields_nullary_apply() {
        let table = SymbolTable::build(
            UnitId::new(0),
            &Unit::new("t.scala")
                .decl(DeclNode::class("Marker"))
                .decl(DeclNode::object("Marker")),
        )
        .unwrap();

        let apply = table.find_name("apply").unwrap();
        let synthetic: Vec<_> = table
            .decls()
            .filter(|d| d.synthetic && d.name == apply)
            .collect();
        assert_eq!(synthetic.len(), 1);
        assert_eq!(synthetic[0].params.as_deref(), Some(&[][..]));
    }

    #[test]
    fn test_private_constructor_not_mirrored() {
        let unit = Unit::new("t.scala")
            .decl(
                DeclNode::class("Sealed")
                    .child(DeclNode::constructor().param("x", "Int").visibility(Visibility::Private)),
            )
            .decl(DeclNode::object("Sealed"));
        let table = SymbolTable::build(UnitId::new(0), &unit).unwrap();

        let apply = table.find_name("apply").unwrap();
        let applies: Vec<_> = table
            .decls()
            .filter(|d| d.synthetic && d.name == apply)
            .collect();
        // Falls back to the nullary factory instead of mirroring the private ctor
        assert_eq!(applies.len(), 1);
        assert!(applies[0].params.as_deref().unwrap().is_empty());
    }

    #[test]
    fn test_synthesis_is_idempotent() {
        let table = paired_table();
        let ctors = class_ctors(&table);
        let refs: Vec<&Declaration> = ctors.iter().collect();
        let name = table.find_name("Box").unwrap();

        let first = synthesize_for_pair(table.interner(), name, &refs);
        let second = synthesize_for_pair(table.interner(), name, &refs);
        assert_eq!(first, second);
    }

    #[test]
    fn test_unapply_takes_class_value() {
        let table = paired_table();
        let unapply = table.find_name("unapply").unwrap();
        let decl = table.decls().find(|d| d.synthetic && d.name == unapply).unwrap();

        let params = decl.params.as_deref().unwrap();
        assert_eq!(params.len(), 1);
        assert_eq!(params[0].type_name, table.find_name("Box"));
    }

    #[test]
    fn test_synthetics_precede_user_members() {
        let unit = Unit::new("t.scala")
            .decl(DeclNode::class("P").param("x", "Int"))
            .decl(DeclNode::object("P").child(DeclNode::method("apply").param("s", "String")));
        let table = SymbolTable::build(UnitId::new(0), &unit).unwrap();

        let name = table.find_name("P").unwrap();
        let object = *table
            .scope(table.root())
            .get(name)
            .unwrap()
            .iter()
            .find(|&&d| table.decl(d).kind == DeclKind::Object)
            .unwrap();
        let body = table.decl(object).body.unwrap();
        let apply = table.find_name("apply").unwrap();
        let bucket = table.scope(body).get(apply).unwrap();

        assert!(bucket.len() >= 2);
        assert!(table.decl(bucket[0]).synthetic, "synthetic apply sits first");
        assert!(!table.decl(*bucket.last().unwrap()).synthetic);
    }
}
