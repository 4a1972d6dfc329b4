//! The values handed back to the boolean engine.
mod check_result;
mod propagation;

pub use check_result::CaseSplit;
pub use check_result::CheckResult;
pub use propagation::EqualityPropagation;
pub use propagation::Propagation;
