use std::fmt::Debug;
use std::fmt::Formatter;

#[cfg(any(feature = "explanation-checks", test))]
use log::debug;
#[cfg(any(feature = "explanation-checks", test))]
use log::warn;

#[cfg(any(feature = "explanation-checks", test))]
use super::variables::TermId;
#[cfg(any(feature = "explanation-checks", test))]
use super::ArithmeticSolver;
#[cfg(any(feature = "explanation-checks", test))]
use crate::api::CheckResult;
#[cfg(any(feature = "explanation-checks", test))]
use crate::basic_types::Explanation;

#[derive(Copy, Clone)]
pub(crate) struct DebugDyn<'a> {
    trait_name: &'a str,
}

impl<'a> DebugDyn<'a> {
    pub(crate) fn from(trait_name: &'a str) -> Self {
        DebugDyn { trait_name }
    }
}

impl Debug for DebugDyn<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "<dyn {}>", self.trait_name)
    }
}

#[derive(Debug, Copy, Clone)]
pub struct DebugHelper {}

#[cfg(any(feature = "explanation-checks", test))]
impl DebugHelper {
    /// Replays a conflict in a fresh engine holding only the rows, the axioms and the bounds of
    /// the explaining literals, and panics if that engine finds a model.
    ///
    /// Only purely linear conflicts over the reals are replayed. Integer reasoning, cuts and
    /// monomials rely on facts that are not part of the explanation, and equalities between
    /// variables are owned by the host.
    pub fn debug_check_conflict(solver: &ArithmeticSolver, explanation: &Explanation) {
        let has_integers = solver
            .values
            .keys()
            .any(|var| solver.sorts[var].is_int());
        if has_integers
            || !solver.monomials.is_empty()
            || solver.statistics.gomory_cuts > 0
            || !explanation.equalities.is_empty()
        {
            return;
        }

        let mut replay = ArithmeticSolver::new(solver.options);
        replay.check_explanations = false;
        for var in solver.values.keys() {
            let _ = replay.mk_var(solver.sorts[var], TermId::INTERNAL);
        }

        for row in solver.tableau.row_ids() {
            let base = solver.row_base(row);
            if let Err(error) = replay.add_row(base, &solver.row_entries(row)) {
                panic!("rows of a consistent tableau can be replayed: {error}");
            }
        }
        for (var, kind, value) in &solver.axioms {
            if let Err(error) = replay.assert_axiom(*var, *kind, value.clone()) {
                panic!("axioms refer to existing variables: {error}");
            }
        }
        for &literal in &explanation.literals {
            let Some((var, kind, value)) = solver.literal_bound(literal) else {
                panic!("explanation literal {literal} does not refer to an atom");
            };
            if let Err(error) = replay.assert_axiom(var, kind, value) {
                panic!("explanation literals refer to existing variables: {error}");
            }
        }

        match replay.check() {
            CheckResult::Unsat(_) => debug!("Explanation {explanation} replayed as a conflict"),
            result => {
                warn!(
                    "The explanation {explanation} does not refute the bounds, the replay engine answered {result:?}:\n{}",
                    replay.display_vars()
                );
                panic!("conflict explanation is not infeasible");
            }
        }
    }
}
