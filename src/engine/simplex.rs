//! The repair loop of the general simplex method. Non-base variables always satisfy their bounds;
//! a base variable outside its bounds is brought back by pivoting it out of its row in exchange
//! for a non-base variable which still has slack in the right direction.
use num_traits::One;
use num_traits::Signed;

use super::bounds::BoundKind;
use super::dependencies::DependencyId;
use super::tableau::RowId;
use super::variables::ArithVar;
use super::ArithmeticSolver;
use crate::arith_assert_moderate;
use crate::arith_assert_simple;
use crate::diagnostics::arith_trace;
use crate::diagnostics::TraceTag;
use crate::math::InfRational;
use crate::math::Rational;

impl ArithmeticSolver {
    /// Put every quasi row in reduced form and give its base the value the row defines.
    pub(crate) fn normalize_quasi_rows(&mut self) {
        let quasi_rows = self
            .tableau
            .row_ids()
            .filter(|&row| self.tableau.row(row).quasi)
            .collect::<Vec<_>>();

        for row in quasi_rows {
            self.normalize_row(row);
        }
    }

    pub(crate) fn normalize_row(&mut self, row: RowId) {
        if self.tableau.normalize(row) {
            arith_trace!(
                self.diagnostics,
                TraceTag::Simplex,
                "normalized {row}: {}",
                self.display_row(row)
            );
        }

        let base = self.tableau.row(row).base;
        let value = self.row_value(row);
        self.set_value(base, value);
        let _ = self.to_patch.insert(base);
    }

    /// The value of the right hand side of a normalized row.
    pub(crate) fn row_value(&self, row: RowId) -> InfRational {
        self.tableau
            .row(row)
            .iter()
            .fold(InfRational::zero(), |acc, (_, entry)| {
                acc + &self.values[entry.var] * &entry.coeff
            })
    }

    /// Move the non-base variable `var` by `delta`, keeping every normalized row satisfied.
    pub(crate) fn update_value(&mut self, var: ArithVar, delta: &InfRational) {
        let moved = &self.values[var] + delta;
        self.set_value(var, moved);

        let dependents = self
            .tableau
            .column(var)
            .iter()
            .map(|(_, entry)| entry.row)
            .filter(|&row| !self.tableau.row(row).quasi)
            .collect::<Vec<_>>();

        for row in dependents {
            let (base, coeff) = {
                let row = self.tableau.row(row);
                match row.coefficient_of(var) {
                    Some(coeff) => (row.base, coeff.clone()),
                    None => continue,
                }
            };
            let value = &self.values[base] + &(delta * &coeff);
            self.set_value(base, value);
            let _ = self.to_patch.insert(base);
        }
    }

    /// Repair every violated base variable. Returns `false` when some row cannot be repaired, in
    /// which case the engine is infeasible.
    pub(crate) fn make_feasible(&mut self) -> bool {
        while let Some(base) = self.to_patch.pop_first() {
            let Some(row) = self.tableau.base_row(base) else {
                continue;
            };

            let value = &self.values[base];
            let (kind, target) = if self.bounds.below_lower(base, value) {
                (BoundKind::Lower, self.bounds.lower_value(base).cloned())
            } else if self.bounds.above_upper(base, value) {
                (BoundKind::Upper, self.bounds.upper_value(base).cloned())
            } else {
                continue;
            };
            let Some(target) = target else {
                continue;
            };

            match self.select_entering(row, kind) {
                Some(entering) => self.pivot_and_update(row, entering, &target),
                None => {
                    let conflict = self.row_conflict(row, kind);
                    let _ = self.to_patch.insert(base);
                    self.set_conflict(conflict);
                    return false;
                }
            }
        }

        if self.state.is_checking() {
            self.state.declare_consistent();
        }
        self.arith_assert_consistent();
        true
    }

    /// The smallest non-base variable of `row` which can move the base towards its violated
    /// bound.
    fn select_entering(&self, row: RowId, violated: BoundKind) -> Option<ArithVar> {
        self.tableau
            .row(row)
            .iter()
            .filter(|(_, entry)| {
                let increase_base = violated == BoundKind::Lower;
                let increase_var = increase_base == entry.coeff.is_positive();
                if increase_var {
                    self.can_increase(entry.var)
                } else {
                    self.can_decrease(entry.var)
                }
            })
            .map(|(_, entry)| entry.var)
            .min()
    }

    pub(crate) fn can_increase(&self, var: ArithVar) -> bool {
        self.bounds
            .upper_value(var)
            .map_or(true, |upper| &self.values[var] < upper)
    }

    pub(crate) fn can_decrease(&self, var: ArithVar) -> bool {
        self.bounds
            .lower_value(var)
            .map_or(true, |lower| &self.values[var] > lower)
    }

    /// Give the base of `row` the value `target` by moving `entering`, then exchange the two.
    fn pivot_and_update(&mut self, row: RowId, entering: ArithVar, target: &InfRational) {
        let leaving = self.tableau.row(row).base;
        let Some(coeff) = self.tableau.row(row).coefficient_of(entering).cloned() else {
            panic!("{entering} was selected to enter {row} but does not occur in it");
        };

        let theta = &(target - &self.values[leaving]) * &(Rational::one() / coeff);
        self.update_value(entering, &theta);
        arith_assert_simple!(&self.values[leaving] == target);

        self.tableau.pivot(row, entering);
        let _ = self.to_patch.insert(entering);

        arith_trace!(
            self.diagnostics,
            TraceTag::Simplex,
            "pivot {row}: {} leaves, {} enters at {}",
            self.var_name(leaving),
            self.var_name(entering),
            self.values[entering]
        );
        arith_assert_moderate!(self.tableau.is_consistent());
    }

    /// The reason why the base of `row` cannot reach its violated bound: that bound together with
    /// the bound of every non-base variable blocking the repair.
    pub(crate) fn row_conflict(&mut self, row: RowId, violated: BoundKind) -> DependencyId {
        let base = self.tableau.row(row).base;
        let mut reasons = vec![self.bound_dependency(base, violated)];

        for (_, entry) in self.tableau.row(row).iter() {
            // the bound in the direction the base needs the variable to move
            let blocking = if (violated == BoundKind::Lower) == entry.coeff.is_positive() {
                BoundKind::Upper
            } else {
                BoundKind::Lower
            };
            reasons.push(self.bound_dependency(entry.var, blocking));
        }

        self.dependencies.join_all(reasons)
    }

    pub(crate) fn bound_dependency(&self, var: ArithVar, kind: BoundKind) -> DependencyId {
        match self.bounds.get(var, kind) {
            Some(bound) => bound.dependency,
            None => panic!("{var} is blocking without a {kind:?} bound"),
        }
    }
}
