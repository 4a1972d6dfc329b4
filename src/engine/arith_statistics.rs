use crate::statistics::log_statistic;

/// Counters kept by the engine, written out with [`crate::ArithmeticSolver::log_statistics`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ArithStatistics {
    pub checks: u64,
    pub conflicts: u64,
    pub assert_lower: u64,
    pub assert_upper: u64,
    /// Literals handed to the boolean engine because a bound entails them.
    pub bound_propagations: u64,
    /// Bounds derived from rows.
    pub implied_bounds: u64,
    pub fixed_eqs: u64,
    pub gcd_tests: u64,
    pub gcd_conflicts: u64,
    pub patches: u64,
    pub patches_succ: u64,
    pub gomory_cuts: u64,
    pub branches: u64,
    pub grobner: u64,
    pub nonlinear_bounds: u64,
    pub nonlinear_horner: u64,
}

impl ArithStatistics {
    pub(crate) fn log(&self, pivots: u64, max_rows: usize, max_columns: usize) {
        log_statistic("arithChecks", self.checks);
        log_statistic("arithConflicts", self.conflicts);
        log_statistic("arithPivots", pivots);
        log_statistic("arithAssertLower", self.assert_lower);
        log_statistic("arithAssertUpper", self.assert_upper);
        log_statistic("arithBoundPropagations", self.bound_propagations);
        log_statistic("arithImpliedBounds", self.implied_bounds);
        log_statistic("arithFixedEqs", self.fixed_eqs);
        log_statistic("arithGcdTests", self.gcd_tests);
        log_statistic("arithGcdConflicts", self.gcd_conflicts);
        log_statistic("arithPatches", self.patches);
        log_statistic("arithPatchesSucc", self.patches_succ);
        log_statistic("arithGomoryCuts", self.gomory_cuts);
        log_statistic("arithBranches", self.branches);
        log_statistic("arithGrobner", self.grobner);
        log_statistic("arithNonlinearBounds", self.nonlinear_bounds);
        log_statistic("arithNonlinearHorner", self.nonlinear_horner);
        log_statistic("arithTableauMaxRows", max_rows);
        log_statistic("arithTableauMaxColumns", max_columns);
    }
}
