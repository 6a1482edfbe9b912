//! Foundation types for the resolution engine.
//!
//! This module provides fundamental types used throughout the crate:
//! - [`UnitId`], [`ScopeId`], [`DeclId`] - Interned identifiers
//! - [`TextRange`], [`TextSize`] - Source positions
//! - [`LineCol`], [`LineIndex`] - Line/column conversion
//! - [`Name`], [`Interner`] - String interning
//!
//! This module has NO dependencies on other denote modules.

mod ids;
mod intern;
mod span;

pub use ids::{DeclId, ScopeId, UnitId};
pub use intern::{Interner, Name};
pub use span::{LineCol, LineIndex, TextRange, TextSize};

// Re-export text-size types for convenience
pub use text_size;
