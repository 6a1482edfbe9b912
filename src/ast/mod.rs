//! The input declaration tree.
//!
//! Parsing is a collaborator concern: a host front-end lowers its syntax tree
//! into this shape and hands it to
//! [`SymbolTableBuilder`](crate::hir::SymbolTableBuilder). The types here are
//! plain data plus a small builder API so hosts and tests can assemble trees
//! without a parser.
//!
//! Supertypes and parameter types are *textual* at this level; the builder
//! resolves them against the table it constructs. Reference sites recorded on
//! a node are resolved from the scope that node introduces.

use smol_str::SmolStr;

use crate::base::TextRange;

/// The kind of a declared entity.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum DeclKind {
    Class,
    Trait,
    Object,
    Method,
    Constructor,
    Field,
    Param,
    TypeAlias,
}

impl DeclKind {
    /// Kinds that introduce a type scope (a body that owns members and can
    /// appear in an inheritance linearization).
    pub fn is_type(self) -> bool {
        matches!(self, DeclKind::Class | DeclKind::Trait | DeclKind::Object)
    }

    /// Kinds that carry a parameter list and can be the target of a call.
    pub fn is_callable(self) -> bool {
        matches!(self, DeclKind::Method | DeclKind::Constructor)
    }

    pub fn display(self) -> &'static str {
        match self {
            DeclKind::Class => "class",
            DeclKind::Trait => "trait",
            DeclKind::Object => "object",
            DeclKind::Method => "method",
            DeclKind::Constructor => "constructor",
            DeclKind::Field => "field",
            DeclKind::Param => "parameter",
            DeclKind::TypeAlias => "type alias",
        }
    }
}

/// Source visibility of a declaration.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Default)]
pub enum Visibility {
    #[default]
    Public,
    Protected,
    Private,
}

/// One compilation unit: a root scope holding top-level declarations.
#[derive(Clone, Debug, Default)]
pub struct Unit {
    /// Display name of the unit (typically the file path).
    pub name: SmolStr,
    /// Top-level declarations in source order.
    pub decls: Vec<DeclNode>,
    /// Reference sites occurring at the top level of the unit.
    pub refs: Vec<RefNode>,
}

impl Unit {
    pub fn new(name: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            decls: Vec::new(),
            refs: Vec::new(),
        }
    }

    /// Append a top-level declaration.
    pub fn decl(mut self, node: DeclNode) -> Self {
        self.decls.push(node);
        self
    }

    /// Record a top-level reference site.
    pub fn reference(mut self, node: RefNode) -> Self {
        self.refs.push(node);
        self
    }
}

/// A declaration node in the input tree.
///
/// Children are the declarations lexically nested in this one's body;
/// `refs` are the reference sites occurring in that body.
#[derive(Clone, Debug)]
pub struct DeclNode {
    pub name: SmolStr,
    pub kind: DeclKind,
    pub visibility: Visibility,
    /// Parameter list; `Some` even when empty for callables declared with `()`.
    pub params: Option<Vec<ParamNode>>,
    /// Textual supertype references, in declaration order (`extends` first,
    /// then `with` mixins).
    pub supertypes: Vec<SmolStr>,
    /// Declared type, for fields and type aliases.
    pub type_name: Option<SmolStr>,
    pub children: Vec<DeclNode>,
    pub refs: Vec<RefNode>,
    pub span: TextRange,
}

impl DeclNode {
    fn new(name: impl Into<SmolStr>, kind: DeclKind) -> Self {
        Self {
            name: name.into(),
            kind,
            visibility: Visibility::Public,
            params: None,
            supertypes: Vec::new(),
            type_name: None,
            children: Vec::new(),
            refs: Vec::new(),
            span: TextRange::default(),
        }
    }

    pub fn class(name: impl Into<SmolStr>) -> Self {
        Self::new(name, DeclKind::Class)
    }

    pub fn trait_(name: impl Into<SmolStr>) -> Self {
        Self::new(name, DeclKind::Trait)
    }

    pub fn object(name: impl Into<SmolStr>) -> Self {
        Self::new(name, DeclKind::Object)
    }

    pub fn method(name: impl Into<SmolStr>) -> Self {
        Self::new(name, DeclKind::Method).with_params([])
    }

    /// A secondary constructor. Primary constructors are implied by `param`
    /// calls on a class node instead.
    pub fn constructor() -> Self {
        Self::new("<init>", DeclKind::Constructor).with_params([])
    }

    pub fn field(name: impl Into<SmolStr>, type_name: impl Into<SmolStr>) -> Self {
        let mut node = Self::new(name, DeclKind::Field);
        node.type_name = Some(type_name.into());
        node
    }

    pub fn type_alias(name: impl Into<SmolStr>, target: impl Into<SmolStr>) -> Self {
        let mut node = Self::new(name, DeclKind::TypeAlias);
        node.type_name = Some(target.into());
        node
    }

    /// Replace the parameter list wholesale.
    pub fn with_params(mut self, params: impl IntoIterator<Item = ParamNode>) -> Self {
        self.params = Some(params.into_iter().collect());
        self
    }

    /// Append a typed parameter.
    pub fn param(mut self, name: impl Into<SmolStr>, type_name: impl Into<SmolStr>) -> Self {
        self.params
            .get_or_insert_with(Vec::new)
            .push(ParamNode::new(name, type_name));
        self
    }

    /// Append a parameter carrying a default value.
    pub fn param_default(mut self, name: impl Into<SmolStr>, type_name: impl Into<SmolStr>) -> Self {
        let mut p = ParamNode::new(name, type_name);
        p.has_default = true;
        self.params.get_or_insert_with(Vec::new).push(p);
        self
    }

    /// Append a variadic trailing parameter.
    pub fn param_variadic(mut self, name: impl Into<SmolStr>, type_name: impl Into<SmolStr>) -> Self {
        let mut p = ParamNode::new(name, type_name);
        p.variadic = true;
        self.params.get_or_insert_with(Vec::new).push(p);
        self
    }

    /// Append a supertype reference.
    pub fn extends(mut self, name: impl Into<SmolStr>) -> Self {
        self.supertypes.push(name.into());
        self
    }

    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Nest a child declaration in this node's body.
    pub fn child(mut self, node: DeclNode) -> Self {
        self.children.push(node);
        self
    }

    /// Record a reference site in this node's body.
    pub fn reference(mut self, node: RefNode) -> Self {
        self.refs.push(node);
        self
    }

    pub fn span(mut self, span: TextRange) -> Self {
        self.span = span;
        self
    }
}

/// A parameter descriptor on a callable or class node.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ParamNode {
    pub name: SmolStr,
    pub type_name: Option<SmolStr>,
    pub has_default: bool,
    pub variadic: bool,
}

impl ParamNode {
    pub fn new(name: impl Into<SmolStr>, type_name: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            type_name: Some(type_name.into()),
            has_default: false,
            variadic: false,
        }
    }

    pub fn untyped(name: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            type_name: None,
            has_default: false,
            variadic: false,
        }
    }
}

/// A reference site recorded in a declaration body.
///
/// Argument entries are textual type hints for the collaborator oracle;
/// `None` means the host could not infer one.
#[derive(Clone, Debug, Default)]
pub struct RefNode {
    pub name: SmolStr,
    /// `Some` when the reference is call-shaped, with one hint per argument.
    pub args: Option<Vec<Option<SmolStr>>>,
    /// Qualifier expression for `a.b` lookups, resolved first.
    pub qualifier: Option<Box<RefNode>>,
    /// Marks a `super(...)` constructor delegation.
    pub super_call: bool,
    pub span: TextRange,
}

impl RefNode {
    /// A bare identifier reference.
    pub fn ident(name: impl Into<SmolStr>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// A call-shaped reference with untyped arguments.
    pub fn call(name: impl Into<SmolStr>, arity: usize) -> Self {
        Self {
            name: name.into(),
            args: Some(vec![None; arity]),
            ..Self::default()
        }
    }

    /// A call-shaped reference with per-argument type hints.
    pub fn call_typed<I, S>(name: impl Into<SmolStr>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<SmolStr>,
    {
        Self {
            name: name.into(),
            args: Some(args.into_iter().map(|s| Some(s.into())).collect()),
            ..Self::default()
        }
    }

    /// A `super(...)` constructor delegation with the given arity.
    pub fn super_call(arity: usize) -> Self {
        Self {
            name: SmolStr::new_static("super"),
            args: Some(vec![None; arity]),
            super_call: true,
            ..Self::default()
        }
    }

    /// Attach a qualifier expression (`qualifier.self`).
    pub fn qualified_by(mut self, qualifier: RefNode) -> Self {
        self.qualifier = Some(Box::new(qualifier));
        self
    }

    pub fn span(mut self, span: TextRange) -> Self {
        self.span = span;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_shapes() {
        let unit = Unit::new("a.scala").decl(
            DeclNode::class("A")
                .param("x", "Int")
                .extends("Base")
                .child(DeclNode::method("f").param("y", "Int")),
        );

        let class = &unit.decls[0];
        assert_eq!(class.kind, DeclKind::Class);
        assert_eq!(class.params.as_ref().map(Vec::len), Some(1));
        assert_eq!(class.supertypes, vec![SmolStr::new("Base")]);
        assert_eq!(class.children[0].kind, DeclKind::Method);
    }

    #[test]
    fn test_method_has_empty_param_list() {
        // `def f` with no `param` calls is still call-shaped
        let node = DeclNode::method("f");
        assert_eq!(node.params.as_deref(), Some(&[][..]));
    }

    #[test]
    fn test_ref_shapes() {
        let bare = RefNode::ident("x");
        assert!(bare.args.is_none());

        let call = RefNode::call_typed("f", ["Int", "String"]);
        assert_eq!(call.args.as_ref().map(Vec::len), Some(2));

        let sup = RefNode::super_call(1);
        assert!(sup.super_call);
    }
}
