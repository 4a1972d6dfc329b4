//! Conditions under which the case-split driver stops early. The engine itself never times out.
mod indefinite;
mod node_budget;

pub use indefinite::Indefinite;
pub use node_budget::NodeBudget;

/// Decides whether a search should stop before it reaches a verdict.
pub trait TerminationCondition {
    /// Called once per explored node of the case-split tree.
    fn should_stop(&mut self) -> bool;
}

impl<T: TerminationCondition> TerminationCondition for Option<T> {
    fn should_stop(&mut self) -> bool {
        self.as_mut().is_some_and(TerminationCondition::should_stop)
    }
}
