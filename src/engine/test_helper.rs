#![cfg(any(test, doc))]
//! This module exposes helpers that aid testing of the arithmetic engine. The [`TestEngine`] wraps
//! an [`ArithmeticSolver`] with named variables and integer constants, and can verify the models
//! the engine reports.
use num_traits::One;

use super::bounds::BoundKind;
use super::variables::ArithVar;
use super::variables::Literal;
use super::variables::TermId;
use super::variables::VarSort;
use super::ArithmeticOptions;
use super::ArithmeticSolver;
use crate::api::CheckResult;
use crate::basic_types::Explanation;
use crate::math::ratio;
use crate::math::rational;
use crate::math::Rational;

/// An engine with helpers to set up scenarios.
#[derive(Debug)]
pub(crate) struct TestEngine {
    pub(crate) solver: ArithmeticSolver,
    next_term: u32,
}

impl Default for TestEngine {
    fn default() -> Self {
        TestEngine::new(ArithmeticOptions::default())
    }
}

#[allow(unused, reason = "not every scenario needs every helper")]
impl TestEngine {
    pub(crate) fn new(options: ArithmeticOptions) -> TestEngine {
        // shows engine logs with `RUST_LOG` set; later engines find the logger installed
        #[cfg(test)]
        let _ = env_logger::builder().is_test(true).try_init();
        TestEngine {
            solver: ArithmeticSolver::new(options),
            next_term: 0,
        }
    }

    fn fresh_term(&mut self) -> TermId {
        self.next_term += 1;
        TermId(self.next_term - 1)
    }

    pub(crate) fn var(&mut self, name: &str, sort: VarSort) -> ArithVar {
        let term = self.fresh_term();
        let var = self.solver.mk_var(sort, term);
        self.solver
            .set_name(var, name)
            .expect("the variable was just created");
        var
    }

    pub(crate) fn real(&mut self, name: &str) -> ArithVar {
        self.var(name, VarSort::Real)
    }

    pub(crate) fn int(&mut self, name: &str) -> ArithVar {
        self.var(name, VarSort::Int)
    }

    /// A variable defined as `Σ coeff·var`.
    pub(crate) fn linear(&mut self, name: &str, sort: VarSort, terms: &[(ArithVar, i64)]) -> ArithVar {
        let term = self.fresh_term();
        let terms = terms
            .iter()
            .map(|&(var, coeff)| (var, rational(coeff)))
            .collect::<Vec<_>>();
        let var = self
            .solver
            .mk_linear_var(sort, term, &terms)
            .expect("the terms refer to existing variables");
        self.solver
            .set_name(var, name)
            .expect("the variable was just created");
        var
    }

    pub(crate) fn product(&mut self, name: &str, factors: &[ArithVar]) -> ArithVar {
        let var = self
            .solver
            .mk_monomial(factors)
            .expect("the factors exist");
        self.solver.set_name(var, name).expect("the monomial exists");
        var
    }

    pub(crate) fn atom(&mut self, var: ArithVar, kind: BoundKind, value: Rational) -> Literal {
        self.solver
            .mk_atom(var, kind, value)
            .expect("the variable exists")
    }

    pub(crate) fn assert(&mut self, literal: Literal) -> Literal {
        self.solver
            .assert_literal(literal)
            .expect("the literal was created by this engine");
        literal
    }

    /// Asserts `var >= value`.
    pub(crate) fn at_least(&mut self, var: ArithVar, value: i64) -> Literal {
        let literal = self.atom(var, BoundKind::Lower, rational(value));
        self.assert(literal)
    }

    /// Asserts `var <= value`.
    pub(crate) fn at_most(&mut self, var: ArithVar, value: i64) -> Literal {
        let literal = self.atom(var, BoundKind::Upper, rational(value));
        self.assert(literal)
    }

    /// Asserts `var > numerator / denominator` as the negation of `var <= ...`.
    pub(crate) fn greater_than(&mut self, var: ArithVar, numerator: i64, denominator: i64) -> Literal {
        let literal = self.atom(var, BoundKind::Upper, ratio(numerator, denominator));
        self.assert(!literal)
    }

    /// Asserts `var < numerator / denominator` as the negation of `var >= ...`.
    pub(crate) fn less_than(&mut self, var: ArithVar, numerator: i64, denominator: i64) -> Literal {
        let literal = self.atom(var, BoundKind::Lower, ratio(numerator, denominator));
        self.assert(!literal)
    }

    pub(crate) fn equal(&mut self, var: ArithVar, value: i64) -> (Literal, Literal) {
        self.solver
            .assert_eq_atom(var, rational(value))
            .expect("the variable exists")
    }

    pub(crate) fn check(&mut self) -> CheckResult {
        self.solver.check()
    }

    /// Checks, expects a model, verifies it and returns it.
    pub(crate) fn assert_sat(&mut self) -> Vec<Rational> {
        match self.solver.check() {
            CheckResult::Sat => {}
            other => panic!("expected a model, got {other:?}"),
        }
        let model = self.solver.model();
        self.verify_model(&model);
        model
    }

    pub(crate) fn assert_unsat(&mut self) -> Explanation {
        match self.solver.check() {
            CheckResult::Unsat(explanation) => explanation,
            other => panic!("expected a conflict, got {other:?}"),
        }
    }

    /// Panics unless `model` satisfies every row, every active bound, the integrality of the
    /// integer variables and the definition of every monomial.
    pub(crate) fn verify_model(&self, model: &[Rational]) {
        let solver = &self.solver;
        let value = |var: ArithVar| &model[var.id as usize];

        for row in solver.tableau.row_ids() {
            let base = solver.row_base(row);
            let sum = solver
                .row_entries(row)
                .iter()
                .fold(rational(0), |acc, (var, coeff)| acc + coeff * value(*var));
            assert_eq!(
                value(base),
                &sum,
                "row {} is violated",
                solver.display_row(row)
            );
        }

        let epsilon = solver.compute_epsilon();
        for var in solver.values.keys() {
            let name = solver.var_name(var);
            if let Some(lower) = solver.lower_bound(var) {
                assert!(
                    value(var) >= &lower.evaluate(&epsilon),
                    "{name} = {} is below {lower}",
                    value(var)
                );
            }
            if let Some(upper) = solver.upper_bound(var) {
                assert!(
                    value(var) <= &upper.evaluate(&epsilon),
                    "{name} = {} is above {upper}",
                    value(var)
                );
            }
            if solver.sort(var).is_int() {
                assert!(value(var).is_integer(), "{name} = {} is fractional", value(var));
            }
            if let Some(factors) = solver.monomial_factors(var) {
                let product = factors
                    .iter()
                    .fold(Rational::one(), |acc, &factor| acc * value(factor));
                assert_eq!(value(var), &product, "{name} is not the product of its factors");
            }
        }
    }
}
