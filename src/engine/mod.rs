pub(crate) mod atoms;
pub(crate) mod bounds;
pub(crate) mod dependencies;
pub(crate) mod tableau;
pub(crate) mod termination;
pub(crate) mod variables;

mod arith_statistics;
mod arithmetic_solver;
mod bound_propagation;
mod debug_helper;
mod display;
mod export;
mod integer;
mod nonlinear;
mod simplex;
mod term_oracle;
pub(crate) mod test_helper;
mod variable_names;

pub use arith_statistics::ArithStatistics;
pub use arithmetic_solver::ArithmeticOptions;
pub use arithmetic_solver::ArithmeticSolver;
pub use arithmetic_solver::ScopeMark;
pub use debug_helper::DebugHelper;
pub use term_oracle::DetachedTerms;
pub use term_oracle::TermOracle;
