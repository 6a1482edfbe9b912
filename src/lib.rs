//! # denote
//!
//! Name/reference resolution engine for class/object-based languages with
//! companion singletons and constructor chaining.
//!
//! Given an already-built declaration tree, `denote` answers resolve queries:
//! which declaration does a reference (identifier, call, constructor
//! invocation, or `super(...)` delegation) denote? Resolution honors lexical
//! scope, inheritance linearization, compiler-synthesized members (an
//! object's implicit `apply`/`unapply` factories) and overload/arity
//! selection.
//!
//! ## Module Structure (dependency order)
//!
//! ```text
//! ide     → navigation features (goto-declaration, go-to-super, usages)
//!   ↓
//! hir     → symbol table, linearization, synthesis, resolver, diagnostics
//!   ↓
//! ast     → the input declaration tree (collaborator-provided)
//!   ↓
//! base    → primitives (ids, spans, name interning)
//! ```
//!
//! Parsing, type inference and the host project model are collaborators, not
//! part of this crate: the [`ast`] module is the hand-off point, and the
//! [`hir::TypeOracle`] trait is the seam to the host's type checker.
//!
//! ## Usage
//!
//! ```
//! use denote::ast::{DeclNode, Unit};
//! use denote::hir::{AnalysisHost, ArgShape, Reference};
//!
//! let unit = Unit::new("pair.scala")
//!     .decl(DeclNode::class("Pair").param("x", "Int").param("y", "Int"))
//!     .decl(DeclNode::object("Pair"));
//!
//! let mut host = AnalysisHost::new();
//! let id = host.set_unit(unit).unwrap();
//! let table = host.snapshot(id).unwrap();
//!
//! // `Pair(1, 2)` resolves to the synthetic `apply` on object Pair.
//! let reference = Reference::call("Pair", table.root(), ArgShape::of_arity(2));
//! let decl = table.resolver().resolve(&reference).unwrap();
//! assert!(table.decl(decl).synthetic);
//! ```

/// Foundation types: ids, spans, name interning
pub mod base;

/// The input declaration tree consumed by the symbol table builder
pub mod ast;

/// Semantic model: symbol table, resolver, diagnostics
pub mod hir;

/// Navigation features built on top of resolution
pub mod ide;

// Re-export commonly needed items
pub use base::{DeclId, Interner, Name, ScopeId, TextRange, TextSize, UnitId};
pub use hir::{
    AnalysisHost, ArgShape, BuildError, Reference, ResolveError, Resolver, SymbolTable,
};
