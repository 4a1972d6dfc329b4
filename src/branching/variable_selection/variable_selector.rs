use crate::branching::SelectionContext;
use crate::engine::variables::ArithVar;

/// A trait containing the interface for [`VariableSelector`]s, specifying the appropriate hooks
/// into the engine and the methods required for selecting variables.
pub trait VariableSelector {
    /// Determines which variable to branch next on. Only candidates of the context may be
    /// returned; `None` declines every candidate, in which case the engine branches on the
    /// fractional variable with the smallest id.
    fn select_variable(&mut self, context: &SelectionContext) -> Option<ArithVar>;
}
