//! Gomory mixed-integer cuts.
//!
//! Take a row `b = Σ a·x` whose integer base has a fractional value `β` while every non-base
//! variable sits on one of its bounds. Shift each variable to a non-negative distance `t` from that
//! bound (`t = x - l` at a lower bound, `t = u - x` at an upper one), giving
//! `b + Σ ā·t = β`. With `f0` the fractional part of `β`, every integer solution satisfies
//! `Σ g·t >= 1` where, for integer `t`, `g = f/f0` if the fractional part `f` of `ā` is at most
//! `f0` and `(1 - f)/(1 - f0)` otherwise, and for real `t`, `g = ā/f0` if `ā >= 0` and
//! `-ā/(1 - f0)` otherwise. The current point has every `t = 0` and violates the cut.
use num_traits::One;
use num_traits::Signed;
use num_traits::Zero;

use crate::diagnostics::arith_trace;
use crate::diagnostics::TraceTag;
use crate::engine::bounds::BoundKind;
use crate::engine::bounds::BoundOrigin;
use crate::engine::tableau::RowId;
use crate::engine::variables::ArithVar;
use crate::engine::variables::TermId;
use crate::engine::variables::VarSort;
use crate::engine::ArithmeticSolver;
use crate::math::denominators_lcm;
use crate::math::fractional_part;
use crate::math::InfRational;
use crate::math::Rational;

impl ArithmeticSolver {
    /// Whether a cut can be derived from `row`: its base is an integer variable with a fractional
    /// rational value and every other variable is at a bound with a rational value.
    pub(crate) fn is_gomory_target(&self, row: RowId) -> bool {
        let row = self.tableau.row(row);
        let value = &self.values[row.base];
        if row.quasi || !self.sorts[row.base].is_int() || !value.is_rational() || value.is_integer()
        {
            return false;
        }

        row.iter().all(|(_, entry)| {
            let value = &self.values[entry.var];
            value.is_rational()
                && (self.bounds.at_lower(entry.var, value) || self.bounds.at_upper(entry.var, value))
        })
    }

    /// Add the cut derived from `row` as a new slack variable with a lower bound. Returns `false`
    /// if the cut is trivially violated, in which case a conflict is recorded.
    pub(crate) fn mk_gomory_cut(&mut self, row: RowId) -> bool {
        let base = self.tableau.row(row).base;
        let f0 = fractional_part(self.values[base].real());
        let one_minus_f0 = Rational::one() - &f0;

        let mut cut: Vec<(ArithVar, Rational)> = vec![];
        let mut bound = Rational::one();
        let mut reasons = vec![];
        let mut all_int = true;

        for (var, coeff) in self.tableau.row(row).sorted_entries() {
            let value = &self.values[var];
            let at_lower = self.bounds.at_lower(var, value);
            let kind = if at_lower {
                BoundKind::Lower
            } else {
                BoundKind::Upper
            };
            reasons.push(self.bound_dependency(var, kind));
            let limit = value.real().clone();

            let shifted = if at_lower { -coeff } else { coeff };
            let weight = if self.sorts[var].is_int() {
                let fraction = fractional_part(&shifted);
                if fraction <= f0 {
                    fraction / &f0
                } else {
                    (Rational::one() - fraction) / &one_minus_f0
                }
            } else {
                all_int = false;
                if !shifted.is_negative() {
                    shifted / &f0
                } else {
                    -shifted / &one_minus_f0
                }
            };
            if weight.is_zero() {
                continue;
            }

            // g·(x - l) >= ...  or  g·(u - x) >= ...
            if at_lower {
                bound += &weight * &limit;
                cut.push((var, weight));
            } else {
                bound -= &weight * &limit;
                cut.push((var, -weight));
            }
        }

        let dependency = self.dependencies.join_all(reasons);
        if cut.is_empty() {
            self.set_conflict(dependency);
            return false;
        }

        let sort = if all_int {
            let scale = Rational::from_integer(denominators_lcm(cut.iter().map(|(_, c)| c)));
            for (_, coeff) in cut.iter_mut() {
                *coeff *= &scale;
            }
            bound *= &scale;
            VarSort::Int
        } else {
            VarSort::Real
        };

        let slack = self.mk_var(sort, TermId::INTERNAL);
        let cut_row = self.tableau.add_row(slack, cut, true);
        self.normalize_row(cut_row);
        self.statistics.gomory_cuts += 1;

        arith_trace!(
            self.diagnostics,
            TraceTag::Integer,
            "cut from {row}: {} >= {bound}",
            self.display_row(cut_row)
        );

        self.install_bound(
            slack,
            BoundKind::Lower,
            InfRational::from(bound),
            dependency,
            BoundOrigin::Cut,
        )
    }
}

#[cfg(test)]
mod tests {
    use crate::api::CheckResult;
    use crate::engine::bounds::BoundKind;
    use crate::engine::variables::TermId;
    use crate::engine::variables::VarSort;
    use crate::engine::ArithmeticOptions;
    use crate::engine::ArithmeticSolver;
    use crate::math::ratio;
    use crate::math::rational;

    #[test]
    fn a_cut_closes_a_gap_without_integers() {
        let mut solver = ArithmeticSolver::new(ArithmeticOptions {
            propagate_bounds: false,
            branch_cut_ratio: 1,
            ..Default::default()
        });
        let x = solver.mk_var(VarSort::Int, TermId(0));
        let s = solver
            .mk_linear_var(VarSort::Real, TermId(1), &[(x, rational(2))])
            .expect("x exists");
        let low = solver.mk_atom(s, BoundKind::Lower, rational(1)).expect("s");
        let high = solver.mk_atom(s, BoundKind::Upper, ratio(3, 2)).expect("s");
        solver.assert_literal(low).expect("known literal");
        solver.assert_literal(high).expect("known literal");

        match solver.check() {
            CheckResult::Unsat(explanation) => {
                assert_eq!(vec![low, high], explanation.literals)
            }
            other => panic!("expected a conflict, got {other:?}"),
        }
        assert_eq!(1, solver.statistics().gomory_cuts);
        assert_eq!(0, solver.statistics().branches);
    }

    #[test]
    fn cuts_keep_integer_solutions() {
        let mut solver = ArithmeticSolver::new(ArithmeticOptions {
            propagate_bounds: false,
            branch_cut_ratio: 1,
            ..Default::default()
        });
        let x = solver.mk_var(VarSort::Int, TermId(0));
        let s = solver
            .mk_linear_var(VarSort::Real, TermId(1), &[(x, rational(2))])
            .expect("x exists");
        let low = solver.mk_atom(s, BoundKind::Lower, rational(1)).expect("s");
        let high = solver.mk_atom(s, BoundKind::Upper, rational(3)).expect("s");
        solver.assert_literal(low).expect("known literal");
        solver.assert_literal(high).expect("known literal");

        assert_eq!(CheckResult::Sat, solver.check());
        assert_eq!(rational(1), solver.model_value(x));
    }
}
