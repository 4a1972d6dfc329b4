//! Contains the outcome of a call to [`crate::ArithmeticSolver::check`].

use crate::basic_types::Explanation;
use crate::engine::variables::ArithVar;
use crate::engine::variables::Literal;
use crate::math::InfRational;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CheckResult {
    /// Every active bound holds under the current assignment, including integrality and the
    /// tracked nonlinear products.
    Sat,
    /// The active bounds are infeasible; the explanation is a subset of the asserted literals
    /// which is infeasible on its own.
    Unsat(Explanation),
    /// The rational relaxation is feasible but an integer variable has a fractional value. The
    /// boolean engine should decide one of the two literals of the split.
    Branch(CaseSplit),
    /// The incomplete nonlinear reasoning could neither find a model nor a conflict.
    Unknown,
}

impl CheckResult {
    pub fn is_sat(&self) -> bool {
        matches!(self, CheckResult::Sat)
    }

    pub fn is_unsat(&self) -> bool {
        matches!(self, CheckResult::Unsat(_))
    }
}

/// A branch on an integer variable with a fractional value: either `var <= floor(value)` holds
/// ([`CaseSplit::down`]) or `var >= ceil(value)` does ([`CaseSplit::up`]).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CaseSplit {
    pub var: ArithVar,
    pub value: InfRational,
    pub down: Literal,
    pub up: Literal,
}
