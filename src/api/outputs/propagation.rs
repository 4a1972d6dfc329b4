use crate::basic_types::Explanation;
use crate::engine::variables::ArithVar;
use crate::engine::variables::Literal;

/// A literal implied by the active bounds, pulled with
/// [`crate::ArithmeticSolver::next_propagation`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Propagation {
    pub literal: Literal,
    pub explanation: Explanation,
}

/// Two variables fixed to the same value, pulled with [`crate::ArithmeticSolver::next_equality`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EqualityPropagation {
    pub left: ArithVar,
    pub right: ArithVar,
    pub explanation: Explanation,
}
