//! Bounds on monomials and their factors derived by interval arithmetic.
use std::collections::BTreeMap;

use num_traits::One;
use num_traits::Zero;

use super::interval::Endpoint;
use super::interval::Interval;
use super::Monomial;
use super::NonlinearConflict;
use crate::diagnostics::arith_trace;
use crate::diagnostics::TraceTag;
use crate::engine::bounds::BoundKind;
use crate::engine::bounds::BoundOrigin;
use crate::engine::dependencies::DependencyId;
use crate::engine::variables::ArithVar;
use crate::engine::ArithmeticSolver;
use crate::math::Rational;

/// A product `coeff · Π factors` in a row with the monomials expanded.
struct ProductTerm {
    coeff: Rational,
    factors: Vec<ArithVar>,
    /// The monomial variable this term came from.
    monomial: Option<ArithVar>,
}

impl ArithmeticSolver {
    pub(crate) fn var_interval(&self, var: ArithVar) -> Interval {
        Interval {
            lower: self
                .bounds
                .lower_value(var)
                .map_or(Endpoint::Infinite, |value| {
                    Endpoint::from_bound(BoundKind::Lower, value)
                }),
            upper: self
                .bounds
                .upper_value(var)
                .map_or(Endpoint::Infinite, |value| {
                    Endpoint::from_bound(BoundKind::Upper, value)
                }),
        }
    }

    /// The justifications of the active bounds of `var`.
    pub(crate) fn bound_reasons(&self, var: ArithVar) -> impl Iterator<Item = DependencyId> + '_ {
        [self.bounds.lower(var), self.bounds.upper(var)]
            .into_iter()
            .flatten()
            .map(|bound| bound.dependency)
    }

    fn product_interval<'a>(&self, factors: impl IntoIterator<Item = &'a ArithVar>) -> Interval {
        let mut powers: BTreeMap<ArithVar, usize> = BTreeMap::new();
        for &factor in factors {
            *powers.entry(factor).or_default() += 1;
        }
        powers
            .into_iter()
            .fold(Interval::point(Rational::one()), |acc, (var, exponent)| {
                acc.mul(&self.var_interval(var).power(exponent))
            })
    }

    /// Install the finite endpoints of `interval` as derived bounds of `var` where they are
    /// tighter. Returns whether a bound changed.
    fn tighten(
        &mut self,
        var: ArithVar,
        interval: &Interval,
        reasons: &[DependencyId],
    ) -> Result<bool, NonlinearConflict> {
        let mut changed = false;
        for (kind, endpoint) in [
            (BoundKind::Lower, &interval.lower),
            (BoundKind::Upper, &interval.upper),
        ] {
            let Some(value) = endpoint.to_bound(kind) else {
                continue;
            };
            let value = self.round_bound(var, kind, value);
            if !self.is_tighter(var, kind, &value) {
                continue;
            }

            arith_trace!(
                self.diagnostics,
                TraceTag::Nonlinear,
                "{} {kind} {value} from {interval}",
                self.var_name(var)
            );
            self.statistics.nonlinear_bounds += 1;
            changed = true;
            let dependency = self.dependencies.join_all(reasons.iter().copied());
            if !self.install_bound(var, kind, value, dependency, BoundOrigin::Derived) {
                return Err(NonlinearConflict);
            }
        }
        Ok(changed)
    }

    /// One round over every monomial, upwards from the factors to the monomial and downwards from
    /// the monomial to a factor.
    pub(crate) fn propagate_monomial_bounds(&mut self) -> Result<bool, NonlinearConflict> {
        let mut changed = false;
        for index in 0..self.monomials.len() {
            let monomial = self.monomials.get(index).clone();
            changed |= self.propagate_upwards(&monomial)?;
            changed |= self.propagate_downwards(&monomial)?;
        }
        Ok(changed)
    }

    fn propagate_upwards(&mut self, monomial: &Monomial) -> Result<bool, NonlinearConflict> {
        let interval = self.product_interval(&monomial.factors);
        let reasons = monomial
            .factors
            .iter()
            .flat_map(|&factor| self.bound_reasons(factor))
            .collect::<Vec<_>>();
        self.tighten(monomial.var, &interval, &reasons)
    }

    /// `x ∈ m / Π others` for a factor `x` of degree one whose cofactor excludes zero.
    fn propagate_downwards(&mut self, monomial: &Monomial) -> Result<bool, NonlinearConflict> {
        let mut changed = false;
        for (factor, exponent) in monomial.powers() {
            if exponent != 1 {
                continue;
            }
            let others = monomial
                .factors
                .iter()
                .filter(|&&other| other != factor)
                .collect::<Vec<_>>();
            let Some(inverse) = self.product_interval(others.iter().copied()).inverse() else {
                continue;
            };

            let interval = self.var_interval(monomial.var).mul(&inverse);
            let reasons = self
                .bound_reasons(monomial.var)
                .chain(others.iter().flat_map(|&&other| self.bound_reasons(other)))
                .collect::<Vec<_>>();
            changed |= self.tighten(factor, &interval, &reasons)?;
        }
        Ok(changed)
    }

    /// Evaluate every row holding a monomial as `x·(Σ inner) + Σ rest` for the variable `x`
    /// shared by most of its products. A result excluding zero refutes the row.
    pub(crate) fn cross_nested_check(&mut self) -> Result<(), NonlinearConflict> {
        let rows = self.tableau.row_ids().collect::<Vec<_>>();
        for row_id in rows {
            let row = self.tableau.row(row_id);
            if row.quasi {
                continue;
            }
            let base = row.base;
            let mut terms = vec![(base, -Rational::one())];
            terms.extend(row.sorted_entries());

            let products = terms
                .into_iter()
                .map(|(var, coeff)| match self.monomials.of_var(var) {
                    Some(monomial) => ProductTerm {
                        coeff,
                        factors: monomial.factors.clone(),
                        monomial: Some(var),
                    },
                    None => ProductTerm {
                        coeff,
                        factors: vec![var],
                        monomial: None,
                    },
                })
                .collect::<Vec<_>>();
            if products.iter().all(|product| product.monomial.is_none()) {
                continue;
            }

            let Some(shared) = Self::most_shared_factor(&products) else {
                continue;
            };
            self.statistics.nonlinear_horner += 1;

            let mut inner = Interval::point(Rational::zero());
            let mut rest = Interval::point(Rational::zero());
            for product in &products {
                if let Some(position) = product.factors.iter().position(|&f| f == shared) {
                    let cofactor = product
                        .factors
                        .iter()
                        .enumerate()
                        .filter(|(index, _)| *index != position)
                        .map(|(_, factor)| factor);
                    inner = inner.add(&self.product_interval(cofactor).scale(&product.coeff));
                } else {
                    let mut interval = self.product_interval(&product.factors);
                    if let Some(var) = product.monomial {
                        interval = interval.intersect(&self.var_interval(var));
                    }
                    rest = rest.add(&interval.scale(&product.coeff));
                }
            }

            let total = self.var_interval(shared).mul(&inner).add(&rest);
            if total.contains_zero() {
                continue;
            }

            let reasons = products
                .iter()
                .flat_map(|product| product.factors.iter().copied().chain(product.monomial))
                .flat_map(|var| self.bound_reasons(var))
                .collect::<Vec<_>>();
            arith_trace!(
                self.diagnostics,
                TraceTag::Nonlinear,
                "row of {} evaluates to {total} around {}",
                self.var_name(base),
                self.var_name(shared)
            );
            let dependency = self.dependencies.join_all(reasons);
            self.set_conflict(dependency);
            return Err(NonlinearConflict);
        }
        Ok(())
    }

    /// The factor occurring in most products, if some factor occurs in two of them.
    fn most_shared_factor(products: &[ProductTerm]) -> Option<ArithVar> {
        let mut occurrences: BTreeMap<ArithVar, usize> = BTreeMap::new();
        for product in products {
            let mut factors = product.factors.clone();
            factors.dedup();
            for factor in factors {
                *occurrences.entry(factor).or_default() += 1;
            }
        }
        occurrences
            .into_iter()
            .filter(|(_, count)| *count >= 2)
            .max_by_key(|&(var, count)| (count, std::cmp::Reverse(var)))
            .map(|(var, _)| var)
    }
}

#[cfg(test)]
mod tests {
    use crate::api::CheckResult;
    use crate::engine::bounds::BoundKind;
    use crate::engine::variables::ArithVar;
    use crate::engine::variables::TermId;
    use crate::engine::variables::VarSort;
    use crate::engine::ArithmeticOptions;
    use crate::engine::ArithmeticSolver;
    use crate::math::rational;
    use crate::math::InfRational;

    fn assert_bound(solver: &mut ArithmeticSolver, var: ArithVar, kind: BoundKind, value: i64) {
        let literal = solver.mk_atom(var, kind, rational(value)).expect("var exists");
        solver.assert_literal(literal).expect("known literal");
    }

    #[test]
    fn factors_are_bounded_through_the_monomial() {
        // x·y in [4, 8] with y in [2, 4] gives x in [1, 4]
        let mut solver = ArithmeticSolver::default();
        let x = solver.mk_var(VarSort::Real, TermId(0));
        let y = solver.mk_var(VarSort::Real, TermId(1));
        let xy = solver.mk_monomial(&[x, y]).expect("factors exist");
        assert_bound(&mut solver, y, BoundKind::Lower, 2);
        assert_bound(&mut solver, y, BoundKind::Upper, 4);
        assert_bound(&mut solver, xy, BoundKind::Lower, 4);
        assert_bound(&mut solver, xy, BoundKind::Upper, 8);
        assert!(solver.propagate());

        assert_eq!(Ok(true), solver.propagate_monomial_bounds());
        assert_eq!(Some(&InfRational::from(rational(1))), solver.lower_bound(x));
        assert_eq!(Some(&InfRational::from(rational(4))), solver.upper_bound(x));
    }

    #[test]
    fn even_powers_are_bounded_below_by_zero() {
        let mut solver = ArithmeticSolver::default();
        let x = solver.mk_var(VarSort::Int, TermId(0));
        let xx = solver.mk_monomial(&[x, x]).expect("factors exist");
        assert_bound(&mut solver, x, BoundKind::Lower, -3);
        assert_bound(&mut solver, x, BoundKind::Upper, 2);
        assert!(solver.propagate());

        assert_eq!(Ok(true), solver.propagate_monomial_bounds());
        assert_eq!(Some(&InfRational::from(rational(0))), solver.lower_bound(xx));
        assert_eq!(Some(&InfRational::from(rational(9))), solver.upper_bound(xx));
    }

    #[test]
    fn cross_nested_evaluation_refutes_rows() {
        // x·y - x·z = 1 with y, z in [0, 0] and x in [1, 2]
        let mut solver = ArithmeticSolver::new(ArithmeticOptions {
            propagate_bounds: false,
            ..Default::default()
        });
        let x = solver.mk_var(VarSort::Real, TermId(0));
        let y = solver.mk_var(VarSort::Real, TermId(1));
        let z = solver.mk_var(VarSort::Real, TermId(2));
        let xy = solver.mk_monomial(&[x, y]).expect("factors exist");
        let xz = solver.mk_monomial(&[x, z]).expect("factors exist");
        let s = solver
            .mk_linear_var(
                VarSort::Real,
                TermId(3),
                &[(xy, rational(1)), (xz, rational(-1))],
            )
            .expect("monomials exist");
        assert_bound(&mut solver, x, BoundKind::Lower, 1);
        assert_bound(&mut solver, x, BoundKind::Upper, 2);
        for var in [y, z] {
            assert_bound(&mut solver, var, BoundKind::Lower, 0);
            assert_bound(&mut solver, var, BoundKind::Upper, 0);
        }
        let _ = solver.assert_eq_atom(s, rational(1)).expect("s exists");
        assert!(solver.propagate());

        assert!(solver.cross_nested_check().is_err());
        assert_eq!(1, solver.statistics().nonlinear_horner);
        assert!(solver.is_infeasible());
    }
}
