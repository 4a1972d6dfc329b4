//! Integer reasoning on top of a feasible rational relaxation. In order: the GCD tests look for
//! rows without integer solutions, patching tries to move variables to integral values, a Gomory
//! cut is added every few checks, and otherwise the engine asks for a case split.
mod gomory;

use log::debug;
use num_traits::One;
use num_traits::Signed;

use super::bounds::BoundKind;
use super::variables::ArithVar;
use super::variables::TermId;
use super::variables::VarKind;
use super::ArithmeticSolver;
use crate::api::CaseSplit;
use crate::branching::BranchCandidate;
use crate::branching::SelectionContext;
use crate::diagnostics::arith_trace;
use crate::diagnostics::TraceTag;
use crate::math::InfRational;
use crate::math::Rational;

/// The outcome of [`ArithmeticSolver::check_integers`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum IntegerCheck {
    /// Every integer variable has an integral value.
    Feasible,
    /// A conflict was recorded in the engine state.
    Conflict,
    /// A cut was added; the rational relaxation has to be repaired again.
    CutAdded,
    Branch(CaseSplit),
    /// A fractional integer variable remains but no split could be made.
    GiveUp,
}

#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct IntegerState {
    /// The number of integer checks which found a fractional value.
    num_checks: u64,
    cuts_this_check: u32,
}

impl IntegerState {
    pub(crate) fn start_check(&mut self) {
        self.cuts_this_check = 0;
    }
}

impl ArithmeticSolver {
    pub(crate) fn check_integers(&mut self) -> IntegerCheck {
        if !self.has_fractional_integer() {
            return IntegerCheck::Feasible;
        }
        self.integer.num_checks += 1;

        let rows = self.tableau.row_ids().collect::<Vec<_>>();
        for &row in &rows {
            if !self.gcd_test(row) {
                return IntegerCheck::Conflict;
            }
        }

        self.patch_integer_values();
        if !self.has_fractional_integer() {
            return IntegerCheck::Feasible;
        }

        let ratio = self.options.branch_cut_ratio;
        if ratio > 0
            && self.integer.num_checks % ratio == 0
            && self.integer.cuts_this_check < self.options.max_gomory_cuts
        {
            if let Some(row) = rows.iter().copied().find(|&row| self.is_gomory_target(row)) {
                self.integer.cuts_this_check += 1;
                return if self.mk_gomory_cut(row) {
                    IntegerCheck::CutAdded
                } else {
                    IntegerCheck::Conflict
                };
            }
        }

        match self.select_branch() {
            Some(split) => IntegerCheck::Branch(split),
            None => IntegerCheck::GiveUp,
        }
    }

    fn is_fractional(&self, var: ArithVar) -> bool {
        self.sorts[var].is_int() && !self.value(var).is_integer()
    }

    fn has_fractional_integer(&self) -> bool {
        self.values.keys().any(|var| self.is_fractional(var))
    }

    /// Try to move variables so that integer variables get integral values without breaking any
    /// bound.
    pub(crate) fn patch_integer_values(&mut self) {
        let non_base = self
            .values
            .keys()
            .filter(|&var| self.tableau.kind(var) == VarKind::NonBase && self.is_fractional(var))
            .collect::<Vec<_>>();
        for var in non_base {
            self.statistics.patches += 1;
            let value = self.values[var].clone();
            let targets = [value.floor(), value.ceil()];
            if self.try_patch(var, &targets, &value) {
                self.statistics.patches_succ += 1;
            }
        }

        let bases = self
            .values
            .keys()
            .filter(|&var| self.tableau.kind(var) == VarKind::Base && self.is_fractional(var))
            .collect::<Vec<_>>();
        for base in bases {
            self.statistics.patches += 1;
            if self.patch_base(base) {
                self.statistics.patches_succ += 1;
            }
        }
    }

    /// Shift a real non-base variable of the row of `base` so that `base` becomes integral.
    fn patch_base(&mut self, base: ArithVar) -> bool {
        let Some(row) = self.tableau.base_row(base) else {
            return false;
        };
        let value = self.values[base].clone();
        let real_entries = self
            .tableau
            .row(row)
            .sorted_entries()
            .into_iter()
            .filter(|(var, _)| !self.sorts[*var].is_int())
            .collect::<Vec<_>>();

        for (var, coeff) in real_entries {
            for target in [value.floor(), value.ceil()] {
                let delta = &(&InfRational::from(target) - &value) * &(Rational::one() / &coeff);
                let moved = &self.values[var] + &delta;
                if self.admits_move(var, &moved, &delta) {
                    self.update_value(var, &delta);
                    return true;
                }
            }
        }
        false
    }

    fn try_patch(&mut self, var: ArithVar, targets: &[Rational], value: &InfRational) -> bool {
        let mut targets = targets.to_vec();
        // the closest integer first
        targets.sort_by_key(|target| (target - value.real()).abs());

        for target in targets {
            let moved = InfRational::from(target);
            let delta = &moved - value;
            if self.admits_move(var, &moved, &delta) {
                self.update_value(var, &delta);
                return true;
            }
        }
        false
    }

    /// Whether the non-base `var` can take the value `moved` (a shift by `delta`) while every
    /// dependent base keeps its bounds and integer bases stay integral.
    pub(crate) fn admits_move(&self, var: ArithVar, moved: &InfRational, delta: &InfRational) -> bool {
        if self.bounds.below_lower(var, moved) || self.bounds.above_upper(var, moved) {
            return false;
        }

        self.tableau.column(var).iter().all(|(_, entry)| {
            let row = self.tableau.row(entry.row);
            if row.quasi {
                return true;
            }
            let Some(coeff) = row.coefficient_of(var) else {
                return true;
            };
            let base_value = &self.values[row.base] + &(delta * coeff);
            let stays_integral = !self.sorts[row.base].is_int()
                || base_value.is_integer()
                || !self.values[row.base].is_integer();
            stays_integral
                && !self.bounds.below_lower(row.base, &base_value)
                && !self.bounds.above_upper(row.base, &base_value)
        })
    }

    fn select_branch(&mut self) -> Option<CaseSplit> {
        let candidates = self
            .values
            .keys()
            .filter(|&var| self.is_fractional(var))
            .map(|var| BranchCandidate {
                var,
                value: self.value(var),
                relevant: match self.terms[var] {
                    TermId::INTERNAL => false,
                    term => self.oracle.is_relevant(term),
                },
            })
            .collect::<Vec<_>>();

        // a declined or foreign choice falls back to the smallest fractional variable
        let chosen = self
            .selector
            .select_variable(&SelectionContext::new(&candidates))
            .and_then(|var| candidates.iter().find(|candidate| candidate.var == var))
            .or_else(|| candidates.first())?;
        let (var, value) = (chosen.var, chosen.value.clone());

        let down = self.intern_atom(var, BoundKind::Upper, value.floor());
        let up = self.intern_atom(var, BoundKind::Lower, value.ceil());
        self.statistics.branches += 1;

        debug!("Branching on {} = {value}", self.var_name(var));
        arith_trace!(
            self.diagnostics,
            TraceTag::Integer,
            "branch {}: {down} | {up}",
            self.var_name(var)
        );

        Some(CaseSplit {
            var,
            value,
            down,
            up,
        })
    }
}

#[cfg(test)]
mod tests {
    use crate::api::CheckResult;
    use crate::engine::bounds::BoundKind;
    use crate::engine::variables::TermId;
    use crate::engine::variables::VarKind;
    use crate::engine::variables::VarSort;
    use crate::engine::ArithmeticOptions;
    use crate::engine::ArithmeticSolver;
    use crate::math::ratio;
    use crate::math::rational;

    #[test]
    fn integral_assignments_need_no_integer_reasoning() {
        let mut solver = ArithmeticSolver::default();
        let x = solver.mk_var(VarSort::Int, TermId(0));
        let literal = solver.mk_atom(x, BoundKind::Lower, rational(3)).expect("x");
        solver.assert_literal(literal).expect("known literal");

        assert_eq!(CheckResult::Sat, solver.check());
        assert_eq!(rational(3), solver.model_value(x));
        assert_eq!(0, solver.statistics().branches);
    }

    #[test]
    fn fractional_bases_are_patched_through_real_variables() {
        let mut solver = ArithmeticSolver::new(ArithmeticOptions {
            propagate_bounds: false,
            branch_cut_ratio: 0,
            ..Default::default()
        });
        let r = solver.mk_var(VarSort::Real, TermId(0));
        let x = solver
            .mk_linear_var(VarSort::Int, TermId(1), &[(r, rational(1))])
            .expect("r exists");
        let literal = solver
            .mk_atom(r, BoundKind::Lower, ratio(1, 2))
            .expect("r exists");
        solver.assert_literal(literal).expect("known literal");

        assert_eq!(CheckResult::Sat, solver.check());
        assert_eq!(rational(1), solver.model_value(x));
        assert_eq!(rational(1), solver.model_value(r));
        assert_eq!(1, solver.statistics().patches_succ);
        assert_eq!(0, solver.statistics().branches);
    }

    #[test]
    fn branches_split_around_the_fractional_value() {
        let mut solver = ArithmeticSolver::new(ArithmeticOptions {
            propagate_bounds: false,
            branch_cut_ratio: 0,
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

        let CheckResult::Branch(split) = solver.check() else {
            panic!("expected a case split");
        };
        assert_eq!(x, split.var);
        assert_eq!(VarKind::Base, solver.kind(x));
        assert_eq!(rational(0), split.value.floor());
        assert_eq!(1, solver.statistics().branches);

        solver.push();
        solver.assert_literal(split.up).expect("known literal");
        match solver.check() {
            CheckResult::Unsat(explanation) => {
                assert_eq!(vec![high, split.up], explanation.literals)
            }
            other => panic!("expected a conflict, got {other:?}"),
        }
        solver.pop(1).expect("one scope is open");

        solver.push();
        solver.assert_literal(split.down).expect("known literal");
        assert!(solver.check().is_unsat());
        solver.pop(1).expect("one scope is open");
    }
}
