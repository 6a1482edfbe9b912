//! Diagnostics — rendering build and resolution failures for editors.
//!
//! [`check_unit`] runs every reference recorded in a table through the
//! resolver and reports each failure as a [`Diagnostic`], alongside
//! structural checks (duplicate definitions, inheritance cycles) that do
//! not belong to any single reference site.

use std::sync::Arc;

use crate::base::{TextRange, UnitId};
use super::decl::Declaration;
use super::overload::TypeOracle;
use super::resolve::ResolveError;
use super::table::SymbolTable;

// ============================================================================
// DIAGNOSTIC TYPES
// ============================================================================

/// Severity level of a diagnostic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Severity {
    Error,
    Warning,
    Info,
    Hint,
}

impl Severity {
    /// Convert to LSP severity number.
    pub fn to_lsp(&self) -> u32 {
        match self {
            Severity::Error => 1,
            Severity::Warning => 2,
            Severity::Info => 3,
            Severity::Hint => 4,
        }
    }
}

/// A diagnostic message anchored to a source range.
#[derive(Clone, Debug)]
pub struct Diagnostic {
    /// The unit the diagnostic belongs to.
    pub unit: UnitId,
    /// Source range the message points at.
    pub range: TextRange,
    /// Severity level.
    pub severity: Severity,
    /// Error/warning code (e.g., "E0001").
    pub code: Option<Arc<str>>,
    /// The diagnostic message.
    pub message: Arc<str>,
    /// Optional related locations.
    pub related: Vec<RelatedInfo>,
}

/// Related information for a diagnostic.
#[derive(Clone, Debug)]
pub struct RelatedInfo {
    pub unit: UnitId,
    pub range: TextRange,
    pub message: Arc<str>,
}

impl Diagnostic {
    /// Create a new error diagnostic.
    pub fn error(unit: UnitId, range: TextRange, message: impl Into<Arc<str>>) -> Self {
        Self {
            unit,
            range,
            severity: Severity::Error,
            code: None,
            message: message.into(),
            related: Vec::new(),
        }
    }

    /// Create a new warning diagnostic.
    pub fn warning(unit: UnitId, range: TextRange, message: impl Into<Arc<str>>) -> Self {
        Self {
            severity: Severity::Warning,
            ..Self::error(unit, range, message)
        }
    }

    /// Set the error code.
    pub fn with_code(mut self, code: impl Into<Arc<str>>) -> Self {
        self.code = Some(code.into());
        self
    }

    /// Add related information.
    pub fn with_related(mut self, info: RelatedInfo) -> Self {
        self.related.push(info);
        self
    }
}

// ============================================================================
// DIAGNOSTIC CODES
// ============================================================================

/// Standard diagnostic codes for resolution errors.
pub mod codes {
    /// Unresolved reference (name not found).
    pub const UNRESOLVED_REFERENCE: &str = "E0001";
    /// Ambiguous reference (tied top-ranked candidates).
    pub const AMBIGUOUS_REFERENCE: &str = "E0002";
    /// No overload accepts the argument shape.
    pub const NO_APPLICABLE_OVERLOAD: &str = "E0003";
    /// Duplicate definition in one scope.
    pub const DUPLICATE_DEFINITION: &str = "E0004";
    /// Cyclic inheritance chain.
    pub const CYCLIC_INHERITANCE: &str = "E0005";
}

// ============================================================================
// DIAGNOSTIC COLLECTOR
// ============================================================================

/// Collects diagnostics during semantic analysis.
#[derive(Clone, Debug, Default)]
pub struct DiagnosticCollector {
    diagnostics: Vec<Diagnostic>,
}

impl DiagnosticCollector {
    /// Create a new empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a diagnostic.
    pub fn add(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Report one failed reference, with candidate locations attached for
    /// ambiguity and overload failures.
    pub fn resolve_failure(
        &mut self,
        table: &SymbolTable,
        range: TextRange,
        error: &ResolveError,
    ) {
        let unit = table.unit();
        let diag = match error {
            ResolveError::UnresolvedReference { .. } => {
                Diagnostic::error(unit, range, error.to_string())
                    .with_code(codes::UNRESOLVED_REFERENCE)
            }
            ResolveError::CyclicInheritance { .. } => {
                Diagnostic::error(unit, range, error.to_string())
                    .with_code(codes::CYCLIC_INHERITANCE)
            }
            ResolveError::AmbiguousReference { candidates, .. } => {
                let mut diag = Diagnostic::error(unit, range, error.to_string())
                    .with_code(codes::AMBIGUOUS_REFERENCE);
                for &candidate in candidates {
                    diag = diag.with_related(related_candidate(table, table.decl(candidate)));
                }
                diag
            }
            ResolveError::NoApplicableOverload { rejected, .. } => {
                let mut diag = Diagnostic::error(unit, range, error.to_string())
                    .with_code(codes::NO_APPLICABLE_OVERLOAD);
                for &candidate in rejected {
                    diag = diag.with_related(related_candidate(table, table.decl(candidate)));
                }
                diag
            }
        };
        self.add(diag);
    }

    /// Report a name defined twice in one scope.
    pub fn duplicate_definition(
        &mut self,
        table: &SymbolTable,
        duplicate: &Declaration,
        existing: &Declaration,
    ) {
        let name = table.name_text(duplicate.name);
        self.add(
            Diagnostic::error(
                table.unit(),
                duplicate.span,
                format!("duplicate definition: '{name}' is already defined"),
            )
            .with_code(codes::DUPLICATE_DEFINITION)
            .with_related(RelatedInfo {
                unit: table.unit(),
                range: existing.span,
                message: Arc::from(format!("previous definition of '{name}'")),
            }),
        );
    }

    /// Report a type whose inheritance chain loops back on itself.
    pub fn cyclic_inheritance(&mut self, table: &SymbolTable, decl: &Declaration) {
        let name = table.name_text(decl.name);
        self.add(
            Diagnostic::error(
                table.unit(),
                decl.span,
                format!("cyclic inheritance involving '{name}'"),
            )
            .with_code(codes::CYCLIC_INHERITANCE),
        );
    }

    /// Get all diagnostics.
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Get the number of errors.
    pub fn error_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Error)
            .count()
    }

    /// Get the number of warnings.
    pub fn warning_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| d.severity == Severity::Warning)
            .count()
    }

    /// Check if there are any errors.
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.severity == Severity::Error)
    }

    /// Take all diagnostics, leaving the collector empty.
    pub fn take(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    /// Clear all diagnostics.
    pub fn clear(&mut self) {
        self.diagnostics.clear();
    }
}

fn related_candidate(table: &SymbolTable, decl: &Declaration) -> RelatedInfo {
    RelatedInfo {
        unit: table.unit(),
        range: decl.span,
        message: Arc::from(format!(
            "candidate: {} '{}'",
            decl.kind.display(),
            table.name_text(decl.name)
        )),
    }
}

// ============================================================================
// UNIT CHECKER
// ============================================================================

/// Check one unit: resolve every recorded reference and run the structural
/// scans, returning all diagnostics found.
pub fn check_unit(table: &SymbolTable, oracle: &dyn TypeOracle) -> Vec<Diagnostic> {
    let mut collector = DiagnosticCollector::new();
    let resolver = table.resolver().with_oracle(oracle);

    for reference in table.references() {
        if let Err(error) = resolver.resolve(reference) {
            collector.resolve_failure(table, reference.span, &error);
        }
    }

    check_duplicates(table, &mut collector);
    check_cycles(table, &mut collector);

    collector.take()
}

/// Two same-named declarations of the same kind in one scope are duplicates.
/// Callables are exempt: overload sets share a name on purpose. A class and
/// its companion object share a name across kinds, which is also fine.
fn check_duplicates(table: &SymbolTable, collector: &mut DiagnosticCollector) {
    for scope in table.scopes() {
        for (_, bucket) in scope.buckets() {
            let plain: Vec<&Declaration> = bucket
                .iter()
                .map(|&id| table.decl(id))
                .filter(|d| !d.synthetic && !d.is_callable())
                .collect();
            for (index, decl) in plain.iter().enumerate() {
                if let Some(existing) =
                    plain[..index].iter().find(|e| e.kind == decl.kind)
                {
                    collector.duplicate_definition(table, decl, existing);
                }
            }
        }
    }
}

fn check_cycles(table: &SymbolTable, collector: &mut DiagnosticCollector) {
    for decl in table.decls() {
        if decl.kind.is_type()
            && matches!(
                table.linearization(decl.id),
                Err(ResolveError::CyclicInheritance { .. })
            )
        {
            collector.cyclic_inheritance(table, decl);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{DeclNode, RefNode, Unit};
    use crate::base::UnitId;
    use crate::hir::overload::NameMatchOracle;

    fn check(unit: Unit) -> Vec<Diagnostic> {
        let table = SymbolTable::build(UnitId::new(0), &unit).unwrap();
        check_unit(&table, &NameMatchOracle)
    }

    #[test]
    fn test_diagnostic_with_code() {
        let diag = Diagnostic::error(UnitId::new(0), TextRange::default(), "test")
            .with_code(codes::UNRESOLVED_REFERENCE);
        assert_eq!(diag.code.as_deref(), Some("E0001"));
    }

    #[test]
    fn test_collector_counts() {
        let mut collector = DiagnosticCollector::new();
        collector.add(Diagnostic::error(UnitId::new(0), TextRange::default(), "error 1"));
        collector.add(Diagnostic::error(UnitId::new(0), TextRange::default(), "error 2"));
        collector.add(Diagnostic::warning(UnitId::new(0), TextRange::default(), "warning"));

        assert_eq!(collector.error_count(), 2);
        assert_eq!(collector.warning_count(), 1);
        assert!(collector.has_errors());
    }

    #[test]
    fn test_severity_to_lsp() {
        assert_eq!(Severity::Error.to_lsp(), 1);
        assert_eq!(Severity::Warning.to_lsp(), 2);
        assert_eq!(Severity::Info.to_lsp(), 3);
        assert_eq!(Severity::Hint.to_lsp(), 4);
    }

    #[test]
    fn test_clean_unit_has_no_diagnostics() {
        let diagnostics = check(
            Unit::new("t.scala")
                .decl(DeclNode::class("C").child(DeclNode::field("x", "Int")))
                .decl(DeclNode::field("c", "C")),
        );
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_unresolved_reference_reported() {
        let diagnostics =
            check(Unit::new("t.scala").decl(DeclNode::class("C").reference(RefNode::ident("ghost"))));

        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code.as_deref(), Some(codes::UNRESOLVED_REFERENCE));
        assert!(diagnostics[0].message.contains("ghost"));
    }

    #[test]
    fn test_duplicate_field_reported_with_related() {
        let diagnostics = check(
            Unit::new("t.scala").decl(
                DeclNode::class("C")
                    .child(DeclNode::field("x", "Int"))
                    .child(DeclNode::field("x", "String")),
            ),
        );

        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code.as_deref(), Some(codes::DUPLICATE_DEFINITION));
        assert_eq!(diagnostics[0].related.len(), 1);
    }

    #[test]
    fn test_companion_pair_is_not_a_duplicate() {
        let diagnostics = check(
            Unit::new("t.scala")
                .decl(DeclNode::class("C").param("x", "Int"))
                .decl(DeclNode::object("C")),
        );
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_method_overloads_are_not_duplicates() {
        let diagnostics = check(
            Unit::new("t.scala").decl(
                DeclNode::class("C")
                    .child(DeclNode::method("f").param("x", "Int"))
                    .child(DeclNode::method("f").param("x", "Int").param("y", "String")),
            ),
        );
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_inheritance_cycle_reported_per_type() {
        let diagnostics = check(
            Unit::new("t.scala")
                .decl(DeclNode::class("A").extends("B"))
                .decl(DeclNode::class("B").extends("A")),
        );

        let cyclic: Vec<_> = diagnostics
            .iter()
            .filter(|d| d.code.as_deref() == Some(codes::CYCLIC_INHERITANCE))
            .collect();
        assert_eq!(cyclic.len(), 2);
    }
}
