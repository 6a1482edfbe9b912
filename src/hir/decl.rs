//! Declarations as stored in a symbol table.

use crate::ast::{DeclKind, Visibility};
use crate::base::{DeclId, Name, ScopeId, TextRange};

/// A named, kind-tagged entity owned by exactly one scope.
///
/// Declarations are arena-allocated in the table; all cross-references use
/// [`DeclId`]/[`ScopeId`] handles. The `synthetic` flag distinguishes
/// compiler-generated members (an object's `apply`/`unapply`) from
/// source-declared ones; lookup and overload selection treat both alike.
#[derive(Clone, Debug)]
pub struct Declaration {
    pub id: DeclId,
    pub name: Name,
    pub kind: DeclKind,
    /// The scope this declaration is owned by (exclusive ownership).
    pub owner: ScopeId,
    /// Parameter list for callables; `Some([])` is a nullary callable,
    /// `None` means not callable at all.
    pub params: Option<Vec<Param>>,
    pub visibility: Visibility,
    /// Compiler-generated rather than written in source.
    pub synthetic: bool,
    /// Declared type, for fields, parameters and type aliases. Feeds
    /// qualifier lookup through the [`TypeOracle`](super::TypeOracle).
    pub type_name: Option<Name>,
    /// The scope this declaration introduces (class body, method body),
    /// if it introduces one.
    pub body: Option<ScopeId>,
    pub span: TextRange,
}

impl Declaration {
    /// Whether a call-shaped reference can target this declaration directly.
    pub fn is_callable(&self) -> bool {
        self.params.is_some() && self.kind.is_callable()
    }

    /// Minimum number of arguments a call must supply.
    pub fn required_arity(&self) -> usize {
        self.params
            .as_deref()
            .map(|params| {
                params
                    .iter()
                    .filter(|p| !p.has_default && !p.variadic)
                    .count()
            })
            .unwrap_or(0)
    }

    /// Whether the parameter list ends in a variadic tail.
    pub fn is_variadic(&self) -> bool {
        self.params
            .as_deref()
            .and_then(<[Param]>::last)
            .is_some_and(|p| p.variadic)
    }
}

/// A parameter descriptor on a callable declaration.
///
/// Parameters also exist as [`Declaration`]s of kind [`DeclKind::Param`] in
/// the callable's body scope so that body references resolve to them; this
/// descriptor is the copy overload selection reads.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Param {
    pub name: Name,
    pub type_name: Option<Name>,
    pub has_default: bool,
    pub variadic: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decl(params: Option<Vec<Param>>, kind: DeclKind) -> Declaration {
        Declaration {
            id: DeclId::new(0),
            name: Name::from_raw(0),
            kind,
            owner: ScopeId::new(0),
            params,
            visibility: Visibility::Public,
            synthetic: false,
            type_name: None,
            body: None,
            span: TextRange::default(),
        }
    }

    fn param(has_default: bool, variadic: bool) -> Param {
        Param {
            name: Name::from_raw(1),
            type_name: None,
            has_default,
            variadic,
        }
    }

    #[test]
    fn test_required_arity_skips_defaults_and_variadic() {
        let d = decl(
            Some(vec![param(false, false), param(true, false), param(false, true)]),
            DeclKind::Method,
        );
        assert_eq!(d.required_arity(), 1);
        assert!(d.is_variadic());
    }

    #[test]
    fn test_callable_needs_params_and_kind() {
        assert!(decl(Some(vec![]), DeclKind::Method).is_callable());
        assert!(decl(Some(vec![]), DeclKind::Constructor).is_callable());
        assert!(!decl(None, DeclKind::Field).is_callable());
        // A class is a lookup result, not a direct call target; calls expand
        // to its constructors first.
        assert!(!decl(Some(vec![]), DeclKind::Class).is_callable());
    }
}
