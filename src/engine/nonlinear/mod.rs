//! Limited reasoning about products of variables. A monomial is a variable standing for the product
//! of its factors; the linear engine treats it like any other variable. Once the linear and integer
//! parts are satisfied, the model is checked against the monomial definitions. Mismatches are
//! resolved by interval propagation, a cross-nested evaluation of the rows, repairing the value of
//! a monomial, or a bounded Gröbner basis computation, in that order.
mod grobner;
mod interval;
mod propagation;

use num_traits::One;

use super::variables::ArithVar;
use super::variables::TermId;
use super::variables::VarKind;
use super::variables::VarSort;
use super::ArithmeticSolver;
use crate::basic_types::ArithmeticError;
use crate::basic_types::HashMap;
use crate::diagnostics::arith_trace;
use crate::diagnostics::TraceTag;
use crate::math::InfRational;
use crate::math::Rational;

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Monomial {
    pub(crate) var: ArithVar,
    /// Sorted, a factor occurs once per power.
    pub(crate) factors: Vec<ArithVar>,
}

impl Monomial {
    /// The distinct factors with their exponents.
    pub(crate) fn powers(&self) -> Vec<(ArithVar, usize)> {
        let mut powers: Vec<(ArithVar, usize)> = vec![];
        for &factor in &self.factors {
            match powers.last_mut() {
                Some((last, exponent)) if *last == factor => *exponent += 1,
                _ => powers.push((factor, 1)),
            }
        }
        powers
    }
}

/// The monomials in creation order, interned by their factors.
#[derive(Clone, Debug, Default)]
pub(crate) struct Monomials {
    monomials: Vec<Monomial>,
    by_factors: HashMap<Vec<ArithVar>, ArithVar>,
}

impl Monomials {
    pub(crate) fn len(&self) -> usize {
        self.monomials.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.monomials.is_empty()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &Monomial> + '_ {
        self.monomials.iter()
    }

    pub(crate) fn get(&self, index: usize) -> &Monomial {
        &self.monomials[index]
    }

    pub(crate) fn find(&self, factors: &[ArithVar]) -> Option<ArithVar> {
        self.by_factors.get(factors).copied()
    }

    pub(crate) fn of_var(&self, var: ArithVar) -> Option<&Monomial> {
        self.monomials.iter().find(|monomial| monomial.var == var)
    }

    fn add(&mut self, monomial: Monomial) {
        let _ = self
            .by_factors
            .insert(monomial.factors.clone(), monomial.var);
        self.monomials.push(monomial);
    }

    pub(crate) fn truncate(&mut self, len: usize) {
        for monomial in self.monomials.drain(len..) {
            let _ = self.by_factors.remove(&monomial.factors);
        }
    }
}

/// The outcome of [`ArithmeticSolver::check_nonlinear`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum NonlinearCheck {
    /// Every monomial agrees with its factors in the model.
    Consistent,
    /// A conflict was recorded in the engine state.
    Conflict,
    /// New bounds were derived; the linear part has to be repaired again.
    Progress,
    GiveUp,
}

/// The work already done on the monomials during a single check.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct NonlinearPass {
    propagation_rounds: u32,
    grobner_done: bool,
}

/// Marks that a conflict was recorded in the engine state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct NonlinearConflict;

impl ArithmeticSolver {
    /// Create (or find) the variable standing for the product of `factors`. A factor repeated `n`
    /// times stands for its `n`-th power.
    pub fn mk_monomial(&mut self, factors: &[ArithVar]) -> Result<ArithVar, ArithmeticError> {
        if factors.len() < 2 {
            return Err(ArithmeticError::DegenerateMonomial(factors.len()));
        }
        for &factor in factors {
            self.check_var(factor)?;
        }

        let mut factors = factors.to_vec();
        factors.sort();
        if let Some(var) = self.monomials.find(&factors) {
            return Ok(var);
        }

        let sort = if factors.iter().all(|&factor| self.sorts[factor].is_int()) {
            VarSort::Int
        } else {
            VarSort::Real
        };
        let var = self.mk_var(sort, TermId::INTERNAL);
        arith_trace!(
            self.diagnostics,
            TraceTag::Nonlinear,
            "{var} = {}",
            factors
                .iter()
                .map(|&factor| self.var_name(factor))
                .collect::<Vec<_>>()
                .join("·")
        );
        self.monomials.add(Monomial { var, factors });
        Ok(var)
    }

    /// The factors of `var` if it is a monomial.
    pub fn monomial_factors(&self, var: ArithVar) -> Option<&[ArithVar]> {
        self.monomials
            .of_var(var)
            .map(|monomial| monomial.factors.as_slice())
    }

    pub(crate) fn check_nonlinear(&mut self, pass: &mut NonlinearPass) -> NonlinearCheck {
        if self.inconsistent_monomials().is_empty() {
            return NonlinearCheck::Consistent;
        }

        if pass.propagation_rounds < self.options.nl_rounds {
            pass.propagation_rounds += 1;
            if self.cross_nested_check().is_err() {
                return NonlinearCheck::Conflict;
            }
            match self.propagate_monomial_bounds() {
                Err(NonlinearConflict) => return NonlinearCheck::Conflict,
                Ok(true) => return NonlinearCheck::Progress,
                Ok(false) => {}
            }
        }

        if self.repair_monomials() {
            return NonlinearCheck::Consistent;
        }

        if self.options.enable_grobner && !pass.grobner_done {
            pass.grobner_done = true;
            match self.grobner_step() {
                Err(NonlinearConflict) => return NonlinearCheck::Conflict,
                Ok(true) => return NonlinearCheck::Progress,
                Ok(false) => {}
            }
        }

        NonlinearCheck::GiveUp
    }

    /// The product of the values of the factors, if they are all rational.
    fn factor_product(&self, monomial: &Monomial) -> Option<Rational> {
        monomial
            .factors
            .iter()
            .try_fold(Rational::one(), |acc, &factor| {
                let value = self.value(factor);
                value.is_rational().then(|| acc * value.real())
            })
    }

    fn is_consistent_monomial(&self, monomial: &Monomial, epsilon: &Rational) -> bool {
        let product = monomial
            .factors
            .iter()
            .fold(Rational::one(), |acc, &factor| {
                acc * self.value(factor).evaluate(epsilon)
            });
        self.value(monomial.var).evaluate(epsilon) == product
    }

    fn inconsistent_monomials(&self) -> Vec<Monomial> {
        let epsilon = self.compute_epsilon();
        self.monomials
            .iter()
            .filter(|monomial| !self.is_consistent_monomial(monomial, &epsilon))
            .cloned()
            .collect()
    }

    /// Move non-base monomials onto the product of their factors where no bound is broken.
    /// Returns whether every monomial is consistent afterwards.
    fn repair_monomials(&mut self) -> bool {
        for monomial in self.inconsistent_monomials() {
            if self.tableau.kind(monomial.var) != VarKind::NonBase {
                continue;
            }
            let Some(product) = self.factor_product(&monomial) else {
                continue;
            };

            let target = InfRational::from(product);
            let delta = &target - &self.values[monomial.var];
            if self.admits_move(monomial.var, &target, &delta) {
                arith_trace!(
                    self.diagnostics,
                    TraceTag::Nonlinear,
                    "repair {} to {target}",
                    self.var_name(monomial.var)
                );
                self.update_value(monomial.var, &delta);
            }
        }

        self.inconsistent_monomials().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use crate::api::CheckResult;
    use crate::basic_types::ArithmeticError;
    use crate::engine::bounds::BoundKind;
    use crate::engine::variables::TermId;
    use crate::engine::variables::VarSort;
    use crate::engine::ArithmeticOptions;
    use crate::engine::ArithmeticSolver;
    use crate::math::rational;
    use crate::math::InfRational;

    #[test]
    fn monomials_are_interned_by_their_factors() {
        let mut solver = ArithmeticSolver::default();
        let x = solver.mk_var(VarSort::Int, TermId(0));
        let y = solver.mk_var(VarSort::Real, TermId(1));

        let xy = solver.mk_monomial(&[x, y]).expect("factors exist");
        let yx = solver.mk_monomial(&[y, x]).expect("factors exist");
        let xx = solver.mk_monomial(&[x, x]).expect("factors exist");

        assert_eq!(xy, yx);
        assert_eq!(VarSort::Real, solver.sort(xy));
        assert_eq!(VarSort::Int, solver.sort(xx));
        assert_eq!(Some(&[x, x][..]), solver.monomial_factors(xx));
        assert_eq!(
            Err(ArithmeticError::DegenerateMonomial(1)),
            solver.mk_monomial(&[x])
        );
    }

    #[test]
    fn monomials_created_in_a_scope_are_dropped_on_pop() {
        let mut solver = ArithmeticSolver::default();
        let x = solver.mk_var(VarSort::Real, TermId(0));
        let y = solver.mk_var(VarSort::Real, TermId(1));

        solver.push();
        let xy = solver.mk_monomial(&[x, y]).expect("factors exist");
        assert_eq!(Some(&[x, y][..]), solver.monomial_factors(xy));
        solver.pop(1).expect("one scope is open");

        assert_eq!(2, solver.num_vars());
        assert_eq!(None, solver.monomial_factors(xy));
    }

    #[test]
    fn fixed_factors_fix_the_monomial() {
        let mut solver = ArithmeticSolver::default();
        let x = solver.mk_var(VarSort::Real, TermId(0));
        let y = solver.mk_var(VarSort::Real, TermId(1));
        let xy = solver.mk_monomial(&[x, y]).expect("factors exist");
        let _ = solver.assert_eq_atom(x, rational(2)).expect("x exists");
        let _ = solver.assert_eq_atom(y, rational(3)).expect("y exists");

        assert_eq!(CheckResult::Sat, solver.check());
        assert_eq!(rational(6), solver.model_value(xy));
        assert_eq!(Some(&InfRational::from(rational(6))), solver.lower_bound(xy));
    }

    #[test]
    fn products_outside_the_factor_intervals_conflict() {
        // x, y in [1, 2] and s = x·y >= 5
        let mut solver = ArithmeticSolver::default();
        let x = solver.mk_var(VarSort::Real, TermId(0));
        let y = solver.mk_var(VarSort::Real, TermId(1));
        let xy = solver.mk_monomial(&[x, y]).expect("factors exist");
        let s = solver
            .mk_linear_var(VarSort::Real, TermId(2), &[(xy, rational(1))])
            .expect("xy exists");
        let mut literals = vec![];
        for (var, kind, value) in [
            (x, BoundKind::Lower, 1),
            (x, BoundKind::Upper, 2),
            (y, BoundKind::Lower, 1),
            (y, BoundKind::Upper, 2),
            (s, BoundKind::Lower, 5),
        ] {
            let literal = solver.mk_atom(var, kind, rational(value)).expect("var exists");
            solver.assert_literal(literal).expect("known literal");
            literals.push(literal);
        }

        match solver.check() {
            CheckResult::Unsat(explanation) => {
                assert!(explanation.literals.contains(&literals[4]));
                assert!(explanation
                    .literals
                    .iter()
                    .all(|literal| literals.contains(literal)));
            }
            other => panic!("expected a conflict, got {other:?}"),
        }
        assert!(solver.statistics().nonlinear_bounds > 0);
    }

    #[test]
    fn free_monomials_are_repaired() {
        let mut solver = ArithmeticSolver::new(ArithmeticOptions {
            nl_rounds: 0,
            ..Default::default()
        });
        let x = solver.mk_var(VarSort::Real, TermId(0));
        let y = solver.mk_var(VarSort::Real, TermId(1));
        let xy = solver.mk_monomial(&[x, y]).expect("factors exist");
        let low = solver.mk_atom(x, BoundKind::Lower, rational(2)).expect("x");
        let high = solver.mk_atom(y, BoundKind::Lower, rational(3)).expect("y");
        solver.assert_literal(low).expect("known literal");
        solver.assert_literal(high).expect("known literal");

        assert_eq!(CheckResult::Sat, solver.check());
        assert_eq!(0, solver.statistics().nonlinear_bounds);
        let model = solver.model();
        assert_eq!(&model[x.id as usize] * &model[y.id as usize], model[xy.id as usize]);
    }
}
