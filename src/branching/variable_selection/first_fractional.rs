use crate::branching::SelectionContext;
use crate::branching::variable_selection::VariableSelector;
use crate::engine::variables::ArithVar;

/// A [`VariableSelector`] which selects the candidate with the smallest id.
#[derive(Clone, Copy, Debug, Default)]
pub struct FirstFractional;

impl VariableSelector for FirstFractional {
    fn select_variable(&mut self, context: &SelectionContext) -> Option<ArithVar> {
        context.candidates().map(|candidate| candidate.var).min()
    }
}
