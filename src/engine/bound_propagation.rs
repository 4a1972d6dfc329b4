//! Consequences of the active bounds which are handed back to the host: atoms entailed by a bound,
//! bounds implied by a row, and equalities between fixed variables.
use std::collections::BTreeSet;

use log::trace;
use num_traits::One;
use num_traits::Signed;

use super::atoms::AtomId;
use super::bounds::BoundKind;
use super::bounds::BoundOrigin;
use super::tableau::RowId;
use super::variables::ArithVar;
use super::variables::Literal;
use super::variables::TermId;
use super::variables::VarSort;
use super::ArithmeticSolver;
use crate::api::EqualityPropagation;
use crate::api::Propagation;
use crate::basic_types::ArithmeticError;
use crate::basic_types::HashMap;
use crate::diagnostics::arith_trace;
use crate::diagnostics::TraceTag;
use crate::math::InfRational;
use crate::math::Rational;

/// One side of the interval of a row sum, ignoring at most one unbounded term.
struct RowSum {
    bounded: InfRational,
    unbounded: Option<ArithVar>,
    /// More than one term is unbounded; nothing can be derived.
    exhausted: bool,
}

impl ArithmeticSolver {
    /// Hand out the literal of `atom` if the active bounds decide it.
    pub(crate) fn propagate_atom(&mut self, atom: AtomId) {
        let Some(entry) = self.atoms.get(atom) else {
            return;
        };
        if entry.assignment.is_some() || entry.propagated {
            return;
        }

        let var = entry.var;
        let threshold = InfRational::from_rational(entry.threshold.clone());
        let decided = match entry.kind {
            BoundKind::Lower => self
                .bounds
                .lower(var)
                .filter(|lower| lower.value >= threshold)
                .map(|lower| (true, lower.dependency))
                .or_else(|| {
                    self.bounds
                        .upper(var)
                        .filter(|upper| upper.value < threshold)
                        .map(|upper| (false, upper.dependency))
                }),
            BoundKind::Upper => self
                .bounds
                .upper(var)
                .filter(|upper| upper.value <= threshold)
                .map(|upper| (true, upper.dependency))
                .or_else(|| {
                    self.bounds
                        .lower(var)
                        .filter(|lower| lower.value > threshold)
                        .map(|lower| (false, lower.dependency))
                }),
        };

        if let Some((is_positive, dependency)) = decided {
            let literal = Literal::new(atom, is_positive);
            self.atoms.mark_propagated(atom);
            self.statistics.bound_propagations += 1;
            arith_trace!(self.diagnostics, TraceTag::Atoms, "propagated {literal}");
            self.propagations.push_back(Propagation {
                literal,
                explanation: self.dependencies.linearize(dependency),
            });
        }
    }

    pub(crate) fn propagate_atoms_on(&mut self, var: ArithVar) {
        let atoms = self.atoms.atoms_on(var).to_vec();
        for atom in atoms {
            self.propagate_atom(atom);
        }
    }

    /// Derive bounds from the rows touched since the last round. Returns `false` on a conflict.
    pub(crate) fn propagate_implied_bounds(&mut self) -> bool {
        let touched = std::mem::take(&mut self.touched_rows);
        let budget = self.options.max_implied_bound_rows;

        for row in touched.into_iter().take(budget) {
            if !self.implied_bounds_of(row) {
                return false;
            }
        }
        true
    }

    /// The row `base = Σ c·w` is read as `0 = -base + Σ c·w`. For every term `c_v·v`, the other
    /// terms bound it from both sides: `c_v·v <= -L_v` and `c_v·v >= -U_v` where `L_v`/`U_v` are
    /// the least and greatest values of the sum without `v`.
    fn implied_bounds_of(&mut self, row: RowId) -> bool {
        if self.tableau.row(row).quasi {
            return true;
        }

        let mut terms = vec![(self.tableau.row(row).base, -Rational::one())];
        terms.extend(self.tableau.row(row).sorted_entries());

        let least = self.row_sum(&terms, BoundKind::Lower);
        let greatest = self.row_sum(&terms, BoundKind::Upper);

        for (var, coeff) in &terms {
            for (side, sum) in [(BoundKind::Lower, &least), (BoundKind::Upper, &greatest)] {
                let Some(rest) = self.sum_without(sum, *var, coeff, side) else {
                    continue;
                };
                // c_v·v <= -L_v   or   c_v·v >= -U_v
                let scaled = &(-rest) * &(Rational::one() / coeff);
                let kind = match (side, coeff.is_positive()) {
                    (BoundKind::Lower, true) | (BoundKind::Upper, false) => BoundKind::Upper,
                    (BoundKind::Lower, false) | (BoundKind::Upper, true) => BoundKind::Lower,
                };
                if !self.implied_bound(&terms, *var, kind, scaled, side) {
                    return false;
                }
            }
        }
        true
    }

    fn row_sum(&self, terms: &[(ArithVar, Rational)], side: BoundKind) -> RowSum {
        let mut sum = RowSum {
            bounded: InfRational::zero(),
            unbounded: None,
            exhausted: false,
        };

        for (var, coeff) in terms {
            match self.term_extreme(*var, coeff, side) {
                Some(extreme) => sum.bounded += &extreme,
                None if sum.unbounded.is_none() => sum.unbounded = Some(*var),
                None => sum.exhausted = true,
            }
        }
        sum
    }

    /// The least (for [`BoundKind::Lower`]) or greatest value `coeff·var` can take.
    fn term_extreme(&self, var: ArithVar, coeff: &Rational, side: BoundKind) -> Option<InfRational> {
        let kind = Self::bound_used(coeff, side);
        self.bounds
            .get(var, kind)
            .map(|bound| &bound.value * coeff)
    }

    fn bound_used(coeff: &Rational, side: BoundKind) -> BoundKind {
        if coeff.is_positive() {
            side
        } else {
            side.opposite()
        }
    }

    fn sum_without(
        &self,
        sum: &RowSum,
        var: ArithVar,
        coeff: &Rational,
        side: BoundKind,
    ) -> Option<InfRational> {
        if sum.exhausted {
            return None;
        }
        match sum.unbounded {
            Some(unbounded) if unbounded == var => Some(sum.bounded.clone()),
            Some(_) => None,
            None => {
                let own = self.term_extreme(var, coeff, side)?;
                Some(&sum.bounded - &own)
            }
        }
    }

    fn implied_bound(
        &mut self,
        terms: &[(ArithVar, Rational)],
        var: ArithVar,
        kind: BoundKind,
        value: InfRational,
        side: BoundKind,
    ) -> bool {
        let value = self.round_bound(var, kind, value);
        if !self.is_tighter(var, kind, &value) {
            return true;
        }

        let reasons = terms
            .iter()
            .filter(|(other, _)| *other != var)
            .map(|(other, coeff)| self.bound_dependency(*other, Self::bound_used(coeff, side)))
            .collect::<Vec<_>>();
        let dependency = self.dependencies.join_all(reasons);

        trace!("{} {kind} {value} implied by a row", self.var_name(var));
        self.statistics.implied_bounds += 1;
        self.install_bound(var, kind, value, dependency, BoundOrigin::Derived)
    }

    /// Report pairs of shared variables which are fixed to the same value.
    pub(crate) fn propagate_fixed_equalities(&mut self) {
        let mut representatives: HashMap<InfRational, ArithVar> = HashMap::default();
        let reported = self
            .reported_equalities
            .iter()
            .copied()
            .collect::<BTreeSet<_>>();

        for var in self.values.keys() {
            let term = self.terms[var];
            if term == TermId::INTERNAL || !self.bounds.is_fixed(var) || !self.oracle.is_shared(term)
            {
                continue;
            }
            let Some(value) = self.bounds.lower_value(var).cloned() else {
                continue;
            };
            let Some(&representative) = representatives.get(&value) else {
                let _ = representatives.insert(value, var);
                continue;
            };
            if reported.contains(&(representative, var)) {
                continue;
            }

            let reasons = [
                self.bound_dependency(representative, BoundKind::Lower),
                self.bound_dependency(representative, BoundKind::Upper),
                self.bound_dependency(var, BoundKind::Lower),
                self.bound_dependency(var, BoundKind::Upper),
            ];
            let dependency = self.dependencies.join_all(reasons);

            self.statistics.fixed_eqs += 1;
            self.reported_equalities.push((representative, var));
            arith_trace!(
                self.diagnostics,
                TraceTag::Bounds,
                "{} = {} (both fixed to {value})",
                self.var_name(representative),
                self.var_name(var)
            );
            self.equalities.push_back(EqualityPropagation {
                left: representative,
                right: var,
                explanation: self.dependencies.linearize(dependency),
            });
        }
    }

    /// Tell the engine that two variables are equal, for example because another theory merged
    /// their terms. Conflicts depending on this fact mention the pair in their explanation.
    pub fn assert_var_equality(
        &mut self,
        left: ArithVar,
        right: ArithVar,
    ) -> Result<(), ArithmeticError> {
        self.check_var(left)?;
        self.check_var(right)?;
        if left == right {
            return Ok(());
        }

        let sort = if self.sorts[left].is_int() && self.sorts[right].is_int() {
            VarSort::Int
        } else {
            VarSort::Real
        };
        let difference = self.mk_var(sort, TermId::INTERNAL);
        let _ = self.add_row(
            difference,
            &[(left, Rational::one()), (right, -Rational::one())],
        )?;

        let dependency = self.dependencies.mk_equality(left, right);
        for kind in [BoundKind::Lower, BoundKind::Upper] {
            if !self.install_bound(
                difference,
                kind,
                InfRational::zero(),
                dependency,
                BoundOrigin::Derived,
            ) {
                break;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::api::CheckResult;
    use crate::engine::bounds::BoundKind;
    use crate::engine::term_oracle::TermOracle;
    use crate::engine::variables::TermId;
    use crate::engine::variables::VarSort;
    use crate::engine::ArithmeticSolver;
    use crate::math::rational;
    use crate::math::InfRational;

    #[test]
    fn tightened_bounds_propagate_entailed_atoms() {
        let mut solver = ArithmeticSolver::default();
        let x = solver.mk_var(VarSort::Real, TermId(0));
        let at_least_five = solver.mk_atom(x, BoundKind::Lower, rational(5)).expect("x");
        let at_least_three = solver.mk_atom(x, BoundKind::Lower, rational(3)).expect("x");
        let at_most_four = solver.mk_atom(x, BoundKind::Upper, rational(4)).expect("x");

        solver.assert_literal(at_least_five).expect("known literal");
        assert!(solver.propagate());

        let propagated = std::iter::from_fn(|| solver.next_propagation())
            .map(|propagation| (propagation.literal, propagation.explanation.literals))
            .collect::<Vec<_>>();
        assert_eq!(
            vec![
                (at_least_three, vec![at_least_five]),
                (!at_most_four, vec![at_least_five])
            ],
            propagated
        );
    }

    #[test]
    fn rows_imply_bounds_on_their_variables() {
        let mut solver = ArithmeticSolver::default();
        let x = solver.mk_var(VarSort::Real, TermId(0));
        let y = solver.mk_var(VarSort::Real, TermId(1));
        let s = solver
            .mk_linear_var(VarSort::Real, TermId(2), &[(x, rational(1)), (y, rational(1))])
            .expect("variables exist");

        // s <= 10 and y >= 4 imply x <= 6
        let s_small = solver.mk_atom(s, BoundKind::Upper, rational(10)).expect("s");
        let y_large = solver.mk_atom(y, BoundKind::Lower, rational(4)).expect("y");
        let x_small = solver.mk_atom(x, BoundKind::Upper, rational(6)).expect("x");
        solver.assert_literal(s_small).expect("known literal");
        solver.assert_literal(y_large).expect("known literal");
        assert!(solver.propagate());

        assert_eq!(Some(&InfRational::from(rational(6))), solver.upper_bound(x));
        let propagation = std::iter::from_fn(|| solver.next_propagation())
            .find(|propagation| propagation.literal == x_small)
            .expect("x <= 6 is entailed");
        assert_eq!(vec![s_small, y_large], propagation.explanation.literals);
    }

    struct EverythingShared;

    impl TermOracle for EverythingShared {
        fn is_shared(&self, _term: TermId) -> bool {
            true
        }

        fn is_relevant(&self, _term: TermId) -> bool {
            true
        }
    }

    #[test]
    fn shared_fixed_variables_are_reported_equal_once() {
        let mut solver = ArithmeticSolver::default();
        solver.set_term_oracle(Box::new(EverythingShared));
        let x = solver.mk_var(VarSort::Real, TermId(0));
        let y = solver.mk_var(VarSort::Real, TermId(1));
        let _ = solver.assert_eq_atom(x, rational(2)).expect("x exists");
        let _ = solver.assert_eq_atom(y, rational(2)).expect("y exists");

        assert_eq!(CheckResult::Sat, solver.check());
        let equality = solver.next_equality().expect("x and y are both fixed to 2");
        assert_eq!((x, y), (equality.left, equality.right));
        assert_eq!(4, equality.explanation.literals.len());

        assert_eq!(CheckResult::Sat, solver.check());
        assert!(solver.next_equality().is_none());
    }

    #[test]
    fn detached_variables_are_never_reported_equal() {
        let mut solver = ArithmeticSolver::default();
        let x = solver.mk_var(VarSort::Real, TermId(0));
        let y = solver.mk_var(VarSort::Real, TermId(1));
        let _ = solver.assert_eq_atom(x, rational(2)).expect("x exists");
        let _ = solver.assert_eq_atom(y, rational(2)).expect("y exists");

        assert_eq!(CheckResult::Sat, solver.check());
        assert!(solver.next_equality().is_none());
    }

    #[test]
    fn asserted_equalities_appear_in_conflicts() {
        let mut solver = ArithmeticSolver::default();
        let x = solver.mk_var(VarSort::Real, TermId(0));
        let y = solver.mk_var(VarSort::Real, TermId(1));
        let x_large = solver.mk_atom(x, BoundKind::Lower, rational(1)).expect("x");
        let y_small = solver.mk_atom(y, BoundKind::Upper, rational(0)).expect("y");
        solver.assert_literal(x_large).expect("known literal");
        solver.assert_literal(y_small).expect("known literal");
        solver.assert_var_equality(x, y).expect("variables exist");

        match solver.check() {
            CheckResult::Unsat(explanation) => {
                assert_eq!(vec![x_large, y_small], explanation.literals);
                assert_eq!(vec![(x, y)], explanation.equalities);
            }
            other => panic!("expected a conflict, got {other:?}"),
        }
    }
}
