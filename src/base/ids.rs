//! Identifiers for compilation units, scopes and declarations.
//!
//! All three are lightweight `u32` handles into arenas owned by a
//! [`SymbolTable`](crate::hir::SymbolTable). Using handles instead of
//! references keeps the table freely cloneable and `Send + Sync`, and makes
//! comparisons O(1).

use std::fmt;

/// Identifier for a compilation unit within an [`AnalysisHost`](crate::hir::AnalysisHost).
///
/// Stable for the lifetime of the host: rebuilding a unit's symbol table
/// keeps its id, so callers can hold on to it across edits.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct UnitId(pub u32);

impl UnitId {
    #[inline]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    #[inline]
    pub const fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Debug for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UnitId({})", self.0)
    }
}

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unit#{}", self.0)
    }
}

/// Index of a scope within one symbol table.
///
/// Assigned sequentially as scopes are created during the build walk; the
/// root scope of a unit is always `ScopeId(0)`.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct ScopeId(pub u32);

impl ScopeId {
    #[inline]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for ScopeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ScopeId({})", self.0)
    }
}

/// Index of a declaration within one symbol table.
///
/// Ids are only meaningful for the table that produced them; a wholesale
/// rebuild yields a fresh id space.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct DeclId(pub u32);

impl DeclId {
    #[inline]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Debug for DeclId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DeclId({})", self.0)
    }
}
