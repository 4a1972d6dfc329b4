//! # Arith-theory
//! The linear arithmetic engine of an SMT solver. The engine keeps a set of linear rows over
//! rational and integer variables in a sparse simplex tableau and decides whether the bounds the
//! boolean engine asserts on those variables are satisfiable.
//!
//! Every bound carries a justification, so a conflict comes with the asserted literals which
//! caused it and bounds derived from the rows can be handed back as propagations. Integer
//! variables are handled by GCD tests, Gomory cuts and case splits which the host decides.
//! Products of variables get limited support through interval propagation and a bounded Gröbner
//! basis step.
//!
//! ```
//! use arith_theory::ArithmeticSolver;
//! use arith_theory::BoundKind;
//! use arith_theory::CheckResult;
//! use arith_theory::Rational;
//! use arith_theory::TermId;
//! use arith_theory::VarSort;
//!
//! let mut solver = ArithmeticSolver::default();
//! let x = solver.mk_var(VarSort::Real, TermId(0));
//! let y = solver.mk_var(VarSort::Real, TermId(1));
//! let sum = solver
//!     .mk_linear_var(
//!         VarSort::Real,
//!         TermId(2),
//!         &[(x, Rational::from_integer(1.into())), (y, Rational::from_integer(1.into()))],
//!     )
//!     .unwrap();
//!
//! let x_large = solver
//!     .mk_atom(x, BoundKind::Lower, Rational::from_integer(3.into()))
//!     .unwrap();
//! let sum_small = solver
//!     .mk_atom(sum, BoundKind::Upper, Rational::from_integer(2.into()))
//!     .unwrap();
//! solver.assert_literal(x_large).unwrap();
//! solver.assert_literal(sum_small).unwrap();
//! assert_eq!(CheckResult::Sat, solver.check());
//!
//! let y_positive = solver
//!     .mk_atom(y, BoundKind::Lower, Rational::from_integer(0.into()))
//!     .unwrap();
//! solver.assert_literal(y_positive).unwrap();
//! match solver.check() {
//!     CheckResult::Unsat(explanation) => assert_eq!(3, explanation.literals.len()),
//!     other => panic!("expected a conflict, got {other:?}"),
//! }
//! ```
pub mod asserts;
pub(crate) mod basic_types;
pub(crate) mod branching;
pub(crate) mod diagnostics;
pub(crate) mod engine;
pub(crate) mod math;
pub mod runner;
pub mod statistics;

#[cfg(test)]
mod tests;

mod api;

pub use api::*;
