//! Provides the [`VariableSelector`] trait which is required for variable selectors to implement;
//! the main method in this trait is [`VariableSelector::select_variable`].
//!
//! Furthermore, it defines the implementations [`MostFractional`] (the default) and
//! [`FirstFractional`].

mod first_fractional;
mod most_fractional;
mod variable_selector;

pub use first_fractional::FirstFractional;
pub use most_fractional::MostFractional;
pub use variable_selector::VariableSelector;
