//! Contains the strategies which decide which integer variable with a fractional value the engine
//! branches on when it cannot close the integer gap by other means.
//!
//! A [`variable_selection::VariableSelector`] is handed a [`SelectionContext`] holding every
//! candidate and returns the variable to split on.
mod selection_context;
pub mod variable_selection;

pub use selection_context::BranchCandidate;
pub use selection_context::SelectionContext;
