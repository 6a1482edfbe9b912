//! Overload and arity selection.
//!
//! Given the candidate set from scope lookup and the argument shape of a
//! call-shaped reference, narrow to the single best declaration:
//!
//! 1. Discard candidates whose parameter list cannot accept the arity
//!    (trailing defaults relax the lower bound, a variadic tail removes the
//!    upper one).
//! 2. Rank survivors by specificity: exact arity beats defaulted/variadic
//!    acceptance; among equals, the compatibility score from the collaborator
//!    [`TypeOracle`] breaks ties.
//! 3. Exactly one of `Ok(decl)`, `NoApplicableOverload`, `AmbiguousReference`
//!    comes out; selection is total.
//!
//! Bare identifiers (no argument shape) skip all of this: a single candidate
//! resolves directly regardless of callability.

use smol_str::SmolStr;

use super::resolve::ResolveError;
use super::table::SymbolTable;
use crate::base::{DeclId, Name};

/// The shape of a call's argument list: arity plus per-argument type hints.
///
/// Hints are whatever the collaborator type-checker could precompute;
/// `None` entries score as "unknown" rather than rejecting.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct ArgShape {
    hints: Vec<Option<SmolStr>>,
}

impl ArgShape {
    /// A shape with `n` untyped arguments.
    pub fn of_arity(n: usize) -> Self {
        Self {
            hints: vec![None; n],
        }
    }

    /// A shape with one type hint per argument.
    pub fn typed<I, S>(hints: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<SmolStr>,
    {
        Self {
            hints: hints.into_iter().map(|s| Some(s.into())).collect(),
        }
    }

    pub fn from_hints(hints: Vec<Option<SmolStr>>) -> Self {
        Self { hints }
    }

    pub fn arity(&self) -> usize {
        self.hints.len()
    }

    pub fn hints(&self) -> &[Option<SmolStr>] {
        &self.hints
    }
}

/// Collaborator seam to the host's type checker.
///
/// The engine treats both operations as opaque: scores only order candidates,
/// and `type_of` only picks the scope for qualified lookup. Implementations
/// must be cheap and side-effect free; they run inside resolve queries that
/// may execute concurrently.
pub trait TypeOracle: Sync {
    /// Compatibility of one argument with one parameter type.
    ///
    /// `None` rejects the candidate outright; `Some(score)` accepts, higher
    /// scores meaning a closer match.
    fn score(&self, table: &SymbolTable, arg_hint: Option<&str>, param_type: Option<Name>)
        -> Option<u32>;

    /// The declared type of a resolved declaration, used to pick the scope a
    /// qualified reference searches.
    fn type_of(&self, table: &SymbolTable, decl: DeclId) -> Option<SmolStr>;
}

/// Structural default oracle: compares textual type names.
///
/// Equal names score 2, an unknown side scores 1, distinct known names
/// reject. Hosts with real type inference supply their own implementation.
#[derive(Copy, Clone, Debug, Default)]
pub struct NameMatchOracle;

impl TypeOracle for NameMatchOracle {
    fn score(
        &self,
        table: &SymbolTable,
        arg_hint: Option<&str>,
        param_type: Option<Name>,
    ) -> Option<u32> {
        match (arg_hint, param_type) {
            (Some(hint), Some(param)) => {
                if table.name_text(param) == hint {
                    Some(2)
                } else {
                    None
                }
            }
            _ => Some(1),
        }
    }

    fn type_of(&self, table: &SymbolTable, decl: DeclId) -> Option<SmolStr> {
        let decl = table.decl(decl);
        if decl.kind.is_type() {
            // A type used as a qualifier is its own type (object member access).
            return Some(table.name_text(decl.name));
        }
        decl.type_name.map(|n| table.name_text(n))
    }
}

/// How well one candidate fits the argument shape.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
struct Fit {
    /// Arity equals the parameter count with no defaulting or variadic
    /// absorption involved.
    exact: bool,
    score: u32,
}

impl Fit {
    fn beats(self, other: Fit) -> bool {
        (self.exact, self.score) > (other.exact, other.score)
    }
}

/// Test one candidate against the shape. `None` means rejected.
fn fit(
    table: &SymbolTable,
    oracle: &dyn TypeOracle,
    candidate: DeclId,
    shape: &ArgShape,
) -> Option<Fit> {
    let decl = table.decl(candidate);
    if !decl.is_callable() {
        return None;
    }
    let params = decl.params.as_deref()?;
    let arity = shape.arity();
    let required = decl.required_arity();
    let variadic = decl.is_variadic();

    if arity < required {
        return None;
    }
    if !variadic && arity > params.len() {
        return None;
    }

    let mut score = 0;
    for (i, hint) in shape.hints().iter().enumerate() {
        // Arguments past the end bind to the variadic tail.
        let param = params.get(i).or_else(|| params.last())?;
        score += oracle.score(table, hint.as_deref(), param.type_name)?;
    }

    Some(Fit {
        exact: arity == params.len() && !variadic,
        score,
    })
}

/// Narrow a candidate set to the single best match.
///
/// With no shape, a lone candidate resolves directly; with a shape, arity and
/// oracle filtering then specificity ranking apply. See the module docs for
/// the full contract.
pub(super) fn select(
    table: &SymbolTable,
    oracle: &dyn TypeOracle,
    name: &str,
    candidates: Vec<DeclId>,
    shape: Option<&ArgShape>,
) -> Result<DeclId, ResolveError> {
    let Some(shape) = shape else {
        return match candidates.len() {
            0 => Err(ResolveError::unresolved(name)),
            1 => Ok(candidates[0]),
            _ => Err(ResolveError::ambiguous(name, candidates)),
        };
    };

    if candidates.is_empty() {
        return Err(ResolveError::unresolved(name));
    }

    let mut best: Option<(DeclId, Fit)> = None;
    let mut tied: Vec<DeclId> = Vec::new();
    let mut rejected: Vec<DeclId> = Vec::new();

    for &candidate in &candidates {
        let Some(f) = fit(table, oracle, candidate, shape) else {
            rejected.push(candidate);
            continue;
        };
        match best {
            None => {
                best = Some((candidate, f));
                tied = vec![candidate];
            }
            Some((_, b)) if f.beats(b) => {
                best = Some((candidate, f));
                tied = vec![candidate];
            }
            Some((_, b)) if b.beats(f) => {}
            Some(_) => tied.push(candidate),
        }
    }

    match best {
        None => Err(ResolveError::NoApplicableOverload {
            name: SmolStr::new(name),
            arity: shape.arity(),
            rejected,
        }),
        Some((winner, _)) if tied.len() == 1 => Ok(winner),
        Some(_) => Err(ResolveError::ambiguous(name, tied)),
    }
}
