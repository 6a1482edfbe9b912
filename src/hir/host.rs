//! Analysis host — unit registry and snapshot handout.
//!
//! The host assigns stable [`UnitId`]s to unit names and keeps one built
//! [`SymbolTable`] per unit behind an `Arc`. Re-analysis builds a fresh
//! table off to the side and swaps the `Arc` wholesale, so snapshots held
//! by readers stay valid and internally consistent; a failed build leaves
//! the previous snapshot untouched.

use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::RwLock;
use rayon::prelude::*;
use smol_str::SmolStr;
use tracing::debug;

use crate::ast::Unit;
use crate::base::UnitId;
use super::diagnostics::{check_unit, Diagnostic};
use super::overload::TypeOracle;
use super::resolve::ResolutionResult;
use super::table::{BuildError, SymbolTable};

/// Owns the analysis state for a set of units.
#[derive(Debug, Default)]
pub struct AnalysisHost {
    inner: RwLock<HostInner>,
}

#[derive(Debug, Default)]
struct HostInner {
    /// Unit name → UnitId mapping.
    name_to_id: IndexMap<SmolStr, UnitId>,
    /// UnitId → current table snapshot.
    tables: IndexMap<UnitId, Arc<SymbolTable>>,
    /// Next UnitId to assign.
    next_id: u32,
}

impl AnalysisHost {
    /// Create a new empty host.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or create the UnitId for a unit name.
    ///
    /// The same name always maps to the same id, across rebuilds.
    pub fn unit_id(&self, name: &str) -> UnitId {
        // Fast path: read lock
        {
            let inner = self.inner.read();
            if let Some(&id) = inner.name_to_id.get(name) {
                return id;
            }
        }

        // Slow path: write lock
        let mut inner = self.inner.write();

        // Double-check
        if let Some(&id) = inner.name_to_id.get(name) {
            return id;
        }

        let id = UnitId::new(inner.next_id);
        inner.next_id += 1;
        inner.name_to_id.insert(SmolStr::new(name), id);
        id
    }

    /// Analyze a unit and install the result as the unit's new snapshot.
    ///
    /// The table is built before any state changes; on a build error the
    /// unit's previous snapshot, if any, remains current.
    pub fn set_unit(&mut self, unit: Unit) -> Result<UnitId, BuildError> {
        let id = self.unit_id(&unit.name);
        let table = SymbolTable::build(id, &unit)?;
        debug!(unit = %unit.name, decls = table.decl_count(), "installed snapshot");
        self.inner.write().tables.insert(id, Arc::new(table));
        Ok(id)
    }

    /// The current snapshot for a unit, if it has been analyzed.
    pub fn snapshot(&self, id: UnitId) -> Option<Arc<SymbolTable>> {
        self.inner.read().tables.get(&id).cloned()
    }

    /// Drop a unit's snapshot and name registration.
    pub fn remove(&mut self, id: UnitId) {
        let mut inner = self.inner.write();
        inner.tables.swap_remove(&id);
        if let Some(name) = inner
            .name_to_id
            .iter()
            .find(|&(_, &v)| v == id)
            .map(|(k, _)| k.clone())
        {
            inner.name_to_id.swap_remove(&name);
        }
    }

    /// Ids of all analyzed units.
    pub fn units(&self) -> Vec<UnitId> {
        self.inner.read().tables.keys().copied().collect()
    }

    /// Number of analyzed units.
    pub fn len(&self) -> usize {
        self.inner.read().tables.len()
    }

    /// Check if the host holds no analyzed units.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Resolve every reference recorded in a unit, in parallel.
    ///
    /// Results are in recording order. Queries run against one snapshot;
    /// a concurrent `set_unit` never tears them.
    pub fn resolve_all(&self, id: UnitId, oracle: &dyn TypeOracle) -> Option<Vec<ResolutionResult>> {
        let table = self.snapshot(id)?;
        let resolver = table.resolver().with_oracle(oracle);
        Some(
            table
                .references()
                .par_iter()
                .map(|reference| resolver.resolve(reference))
                .collect(),
        )
    }

    /// Run the full diagnostic pass over one unit.
    pub fn diagnostics(&self, id: UnitId, oracle: &dyn TypeOracle) -> Option<Vec<Diagnostic>> {
        let table = self.snapshot(id)?;
        Some(check_unit(&table, oracle))
    }
}
