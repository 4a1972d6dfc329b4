//! A small depth-first driver which stands in for the boolean engine: whenever
//! [`ArithmeticSolver::check`] asks for a case split, both sides are explored in their own scope
//! and the explanations of refuted sides are combined.
use log::debug;

use crate::api::CheckResult;
use crate::basic_types::ArithmeticError;
use crate::basic_types::Explanation;
use crate::branching::variable_selection::VariableSelector;
use crate::engine::termination::TerminationCondition;
use crate::engine::variables::Literal;
use crate::engine::ArithmeticSolver;
use crate::math::Rational;

/// The verdict of [`solve_with_splits`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SearchResult {
    /// A model, indexed by variable id. Slack variables of cuts added below the root are
    /// included.
    Sat(Vec<Rational>),
    /// The asserted literals are infeasible; the explanation no longer mentions branch literals.
    Unsat(Explanation),
    /// The nonlinear reasoning gave up on some node and no other node produced a model.
    Unknown,
    /// The termination condition fired before a verdict was reached.
    Stopped,
}

impl SearchResult {
    pub fn is_sat(&self) -> bool {
        matches!(self, SearchResult::Sat(_))
    }

    pub fn is_unsat(&self) -> bool {
        matches!(self, SearchResult::Unsat(_))
    }
}

/// Decide the currently asserted literals, branching on integer variables with `selector`.
///
/// Every node of the case-split tree lives in its own scope, so the engine is back at its
/// starting depth when this returns.
pub fn solve_with_splits(
    solver: &mut ArithmeticSolver,
    selector: impl VariableSelector + 'static,
    termination: &mut impl TerminationCondition,
) -> Result<SearchResult, ArithmeticError> {
    solver.set_variable_selector(Box::new(selector));
    search(solver, termination, 0)
}

fn search(
    solver: &mut ArithmeticSolver,
    termination: &mut impl TerminationCondition,
    depth: usize,
) -> Result<SearchResult, ArithmeticError> {
    if termination.should_stop() {
        return Ok(SearchResult::Stopped);
    }

    let split = match solver.check() {
        CheckResult::Sat => return Ok(SearchResult::Sat(solver.model())),
        CheckResult::Unsat(explanation) => return Ok(SearchResult::Unsat(explanation)),
        CheckResult::Unknown => return Ok(SearchResult::Unknown),
        CheckResult::Branch(split) => split,
    };

    debug!(
        "Branching on {} = {} at depth {depth}",
        solver.var_name(split.var),
        split.value
    );

    let down = explore(solver, termination, split.down, depth)?;
    let down_explanation = match down {
        SearchResult::Unsat(explanation) if !explanation.contains(split.down) => {
            // the refutation does not depend on the branch, so neither does the parent's
            return Ok(SearchResult::Unsat(explanation));
        }
        SearchResult::Unsat(explanation) => Some(explanation),
        SearchResult::Unknown => None,
        other @ (SearchResult::Sat(_) | SearchResult::Stopped) => return Ok(other),
    };

    let up = explore(solver, termination, split.up, depth)?;
    match (down_explanation, up) {
        (_, SearchResult::Unsat(up)) if !up.contains(split.up) => Ok(SearchResult::Unsat(up)),
        (Some(down), SearchResult::Unsat(up)) => Ok(SearchResult::Unsat(
            down.resolve(up, &[split.down, split.up]),
        )),
        (None, SearchResult::Unsat(_)) => Ok(SearchResult::Unknown),
        (_, up) => Ok(up),
    }
}

fn explore(
    solver: &mut ArithmeticSolver,
    termination: &mut impl TerminationCondition,
    branch: Literal,
    depth: usize,
) -> Result<SearchResult, ArithmeticError> {
    solver.push();
    let result = solver
        .assert_literal(branch)
        .and_then(|()| search(solver, termination, depth + 1));
    solver.pop(1)?;
    result
}
