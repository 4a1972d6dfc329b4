use thiserror::Error;

use crate::engine::variables::ArithVar;
use crate::engine::variables::Literal;

/// Errors caused by misuse of the engine's interface. Infeasibility is never reported through
/// this type; it is a regular outcome of [`crate::ArithmeticSolver::check`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ArithmeticError {
    #[error("variable {0} does not exist")]
    UnknownVariable(ArithVar),

    #[error("literal {0} does not refer to a registered atom")]
    UnknownLiteral(Literal),

    #[error("variable {0} cannot head a new row, it already occurs in the tableau")]
    BaseNotFresh(ArithVar),

    #[error("a monomial needs at least two factors, got {0}")]
    DegenerateMonomial(usize),

    #[error("cannot pop {requested} scope(s), only {open} are open")]
    PopBelowRoot { requested: usize, open: usize },
}
