//! Semantic model: symbol table, linearization, synthesis, resolution.
//!
//! The data flow mirrors the build/query split:
//!
//! 1. [`SymbolTableBuilder`] walks an [`ast::Unit`](crate::ast::Unit) once and
//!    produces an immutable [`SymbolTable`]: scopes, declarations, companion
//!    pairings, synthetic members and inheritance linearizations.
//! 2. [`Resolver`] answers queries against that snapshot; queries never
//!    mutate shared state, so they parallelize without locking.
//! 3. [`AnalysisHost`] owns tables per compilation unit and swaps whole
//!    snapshots on rebuild.

mod decl;
mod diagnostics;
mod host;
mod linearize;
mod overload;
mod resolve;
mod synthetic;
mod table;

pub use decl::{Declaration, Param};
pub use diagnostics::{check_unit, codes, Diagnostic, DiagnosticCollector, RelatedInfo, Severity};
pub use host::AnalysisHost;
pub use overload::{ArgShape, NameMatchOracle, TypeOracle};
pub use resolve::{Reference, ResolutionResult, ResolveError, Resolver};
pub use synthetic::synthesize_for_pair;
pub use table::{BuildError, Scope, ScopeKind, SymbolTable, SymbolTableBuilder};

// The declaration kinds live in `ast` because the input tree uses them too.
pub use crate::ast::{DeclKind, Visibility};
