pub(crate) mod outputs;

pub use outputs::*;

pub use crate::basic_types::ArithmeticError;
pub use crate::basic_types::Explanation;
pub use crate::branching::BranchCandidate;
pub use crate::branching::SelectionContext;
pub use crate::branching::variable_selection::FirstFractional;
pub use crate::branching::variable_selection::MostFractional;
pub use crate::branching::variable_selection::VariableSelector;
pub use crate::diagnostics::Diagnostics;
pub use crate::diagnostics::ThreadingMode;
pub use crate::diagnostics::TraceSink;
pub use crate::diagnostics::TraceTag;
pub use crate::engine::bounds::BoundKind;
pub use crate::engine::tableau::RowId;
pub use crate::engine::variables::ArithVar;
pub use crate::engine::variables::Literal;
pub use crate::engine::variables::TermId;
pub use crate::engine::variables::VarKind;
pub use crate::engine::variables::VarSort;
pub use crate::engine::ArithStatistics;
pub use crate::engine::ArithmeticOptions;
pub use crate::engine::ArithmeticSolver;
pub use crate::engine::DebugHelper;
pub use crate::engine::DetachedTerms;
pub use crate::engine::ScopeMark;
pub use crate::engine::TermOracle;
pub use crate::math::InfRational;
pub use crate::math::Rational;

pub mod results {
    //! Outcomes of driving the engine to completion with [`crate::runner::solve_with_splits`].
    pub use crate::runner::solve_with_splits;
    pub use crate::runner::SearchResult;
}

pub mod termination {
    pub use crate::engine::termination::*;
}
