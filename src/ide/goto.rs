//! Goto declaration — jumping from a reference site to its target.

use smol_str::SmolStr;

use crate::ast::DeclKind;
use crate::base::{DeclId, TextRange, UnitId};
use crate::hir::{Reference, ResolveError, SymbolTable, TypeOracle};

/// A navigation target: the declaration a reference denotes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GotoTarget {
    pub unit: UnitId,
    pub decl: DeclId,
    pub range: TextRange,
    pub name: SmolStr,
    pub kind: DeclKind,
    /// Synthetic members have no source of their own; editors jump to the
    /// owning declaration's span instead.
    pub synthetic: bool,
}

impl GotoTarget {
    fn new(table: &SymbolTable, decl: DeclId) -> Self {
        let declaration = table.decl(decl);
        Self {
            unit: table.unit(),
            decl,
            range: declaration.span,
            name: table.name_text(declaration.name),
            kind: declaration.kind,
            synthetic: declaration.synthetic,
        }
    }
}

/// Resolve a reference and package the winner as a navigation target.
pub fn goto_declaration(
    table: &SymbolTable,
    oracle: &dyn TypeOracle,
    reference: &Reference,
) -> Result<GotoTarget, ResolveError> {
    let decl = table.resolver().with_oracle(oracle).resolve(reference)?;
    Ok(GotoTarget::new(table, decl))
}

/// The supertype chain of a type declaration as navigation targets, nearest
/// first. A cyclic chain yields no targets.
pub fn super_targets(table: &SymbolTable, type_decl: DeclId) -> Vec<GotoTarget> {
    let Ok(linearization) = table.linearization(type_decl) else {
        return Vec::new();
    };
    linearization
        .iter()
        .skip(1)
        .filter_map(|&scope| table.scope(scope).owner)
        .map(|owner| GotoTarget::new(table, owner))
        .collect()
}
