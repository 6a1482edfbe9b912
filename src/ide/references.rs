//! Find usages — reference sites denoting a given declaration.

use rayon::prelude::*;
use smol_str::SmolStr;

use crate::base::{DeclId, TextRange};
use crate::hir::{SymbolTable, TypeOracle};

/// One reference site that resolved to the queried declaration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UsageSite {
    pub range: TextRange,
    pub name: SmolStr,
}

/// All recorded reference sites in the unit that resolve to `decl`, in
/// recording order. Sites that fail to resolve are skipped, not reported.
pub fn find_usages(table: &SymbolTable, oracle: &dyn TypeOracle, decl: DeclId) -> Vec<UsageSite> {
    let resolver = table.resolver().with_oracle(oracle);
    table
        .references()
        .par_iter()
        .filter(|reference| resolver.resolve(reference) == Ok(decl))
        .map(|reference| UsageSite {
            range: reference.span,
            name: reference.name.clone(),
        })
        .collect()
}
