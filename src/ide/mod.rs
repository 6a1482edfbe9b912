//! Navigation features — high-level APIs over resolution.
//!
//! Each function takes a [`SymbolTable`](crate::hir::SymbolTable) snapshot
//! and returns plain data; editor protocol types are a caller concern.

mod goto;
mod references;

pub use goto::{goto_declaration, super_targets, GotoTarget};
pub use references::{find_usages, UsageSite};
