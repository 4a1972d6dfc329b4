//! Houses the arithmetic engine which decides the satisfiability of a conjunction of linear
//! bounds over rational and integer variables, using the general simplex method over a sparse
//! tableau.

use std::collections::BTreeSet;
use std::collections::VecDeque;
use std::fmt::Debug;
use std::fmt::Formatter;

use log::debug;
use num_traits::One;
use num_traits::Zero;

use super::arith_statistics::ArithStatistics;
use super::atoms::AtomRegistry;
use super::atoms::Assignment;
use super::bounds::Bound;
use super::bounds::BoundKind;
use super::bounds::BoundOrigin;
use super::bounds::BoundStore;
use super::bounds::BoundUpdate;
use super::dependencies::DependencyId;
use super::dependencies::DependencyManager;
use super::integer::IntegerCheck;
use super::integer::IntegerState;
use super::nonlinear::Monomials;
use super::nonlinear::NonlinearCheck;
use super::nonlinear::NonlinearPass;
use super::tableau::RowId;
use super::tableau::Tableau;
use super::term_oracle::DetachedTerms;
use super::term_oracle::TermOracle;
use super::variable_names::VariableNames;
use super::variables::ArithVar;
use super::variables::Literal;
use super::variables::TermId;
use super::variables::VarKind;
use super::variables::VarSort;
use crate::api::CheckResult;
use crate::api::EqualityPropagation;
use crate::api::Propagation;
use crate::arith_assert_advanced;
use crate::arith_assert_extreme;
use crate::arith_assert_simple;
use crate::basic_types::ArithmeticError;
use crate::basic_types::Explanation;
use crate::basic_types::KeyedVec;
use crate::basic_types::StorageKey;
use crate::branching::variable_selection::MostFractional;
use crate::branching::variable_selection::VariableSelector;
use crate::diagnostics::arith_trace;
use crate::diagnostics::Diagnostics;
use crate::diagnostics::TraceTag;
use crate::engine::debug_helper::DebugDyn;
use crate::math::InfRational;
use crate::math::Rational;

/// Options which influence the behaviour of the [`ArithmeticSolver`].
#[derive(Debug, Clone, Copy)]
pub struct ArithmeticOptions {
    /// Derive bounds from the rows touched by asserted bounds once the tableau is feasible.
    pub propagate_bounds: bool,
    /// The maximum number of rows inspected for implied bounds per propagation round.
    pub max_implied_bound_rows: usize,
    /// A Gomory cut is attempted on every `branch_cut_ratio`-th integer check; zero disables
    /// cuts.
    pub branch_cut_ratio: u64,
    /// The maximum number of cuts added in one call to [`ArithmeticSolver::check`] before the
    /// engine falls back to branching.
    pub max_gomory_cuts: u32,
    /// The number of interval propagation rounds over the monomials per check.
    pub nl_rounds: u32,
    pub enable_grobner: bool,
    /// The number of S-polynomials the basis step may reduce before it gives up.
    pub max_grobner_steps: usize,
    /// A row or column is compacted once its dead entries exceed this percentage of its live
    /// ones.
    pub dead_entry_ratio: usize,
    /// Put new rows in reduced form immediately instead of at the next propagation.
    pub eager_normalization: bool,
}

impl Default for ArithmeticOptions {
    fn default() -> Self {
        ArithmeticOptions {
            propagate_bounds: true,
            max_implied_bound_rows: 1000,
            branch_cut_ratio: 2,
            max_gomory_cuts: 4,
            nl_rounds: 4,
            enable_grobner: true,
            max_grobner_steps: 64,
            dead_entry_ratio: 50,
            eager_normalization: false,
        }
    }
}

/// A position which [`ArithmeticSolver::retract_to`] can return to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScopeMark {
    depth: usize,
}

#[derive(Clone, Copy, Debug)]
struct Scope {
    num_vars: usize,
    tableau_trail: usize,
    bounds: super::bounds::BoundMark,
    atoms: super::atoms::AtomMark,
    dependencies: usize,
    value_trail: usize,
    monomials: usize,
    axioms: usize,
    reported_equalities: usize,
    state: SolverState,
    parent_scope_id: u32,
}

/// The engine for linear arithmetic (with integer and limited nonlinear extensions) inside an SMT
/// solver. Bounds arrive as literals of atoms; [`ArithmeticSolver::check`] decides whether they
/// are jointly satisfiable.
///
/// # Practical
/// Every variable has a current value. Non-base variables always lie within their bounds; base
/// variables are defined by their row and may violate their bounds until the simplex loop in
/// [`ArithmeticSolver::propagate`] repairs them by pivoting. The repair follows Bland's rule:
/// the violated base variable with the smallest id is repaired first, using the eligible
/// non-base variable with the smallest id. This guarantees termination.
///
/// All state can be saved with [`ArithmeticSolver::push`] and restored exactly with
/// [`ArithmeticSolver::pop`], including the pivots made in between.
///
/// # Bibliography
/// \[1\] B. Dutertre and L. de Moura, ‘A fast linear-arithmetic solver for DPLL(T)’, in
/// International Conference on Computer Aided Verification, 2006, pp. 81–94.
///
/// \[2\] R. E. Gomory, ‘An algorithm for integer solutions to linear programs’, Recent advances in
/// mathematical programming, 1963.
pub struct ArithmeticSolver {
    /// The engine changes states as bounds arrive and get repaired.
    pub(crate) state: SolverState,
    pub(crate) options: ArithmeticOptions,
    pub(crate) sorts: KeyedVec<ArithVar, VarSort>,
    pub(crate) terms: KeyedVec<ArithVar, TermId>,
    /// The current assignment. The values of quasi-base variables are only meaningful after
    /// their row has been normalized; use [`ArithmeticSolver::value`] to read them.
    pub(crate) values: KeyedVec<ArithVar, InfRational>,
    pub(crate) tableau: Tableau,
    pub(crate) bounds: BoundStore,
    pub(crate) dependencies: DependencyManager,
    pub(crate) atoms: AtomRegistry,
    pub(crate) monomials: Monomials,
    /// Base variables which might violate one of their bounds.
    pub(crate) to_patch: BTreeSet<ArithVar>,
    /// Rows containing a variable which received an asserted bound since the last round of
    /// implied bound propagation.
    pub(crate) touched_rows: BTreeSet<RowId>,
    pub(crate) propagations: VecDeque<Propagation>,
    pub(crate) equalities: VecDeque<EqualityPropagation>,
    /// The pairs of fixed variables reported as equal, oldest first.
    pub(crate) reported_equalities: Vec<(ArithVar, ArithVar)>,
    /// The value a variable had before its first change in the current scope.
    value_trail: Vec<(ArithVar, InfRational)>,
    /// The id of the scope in which a variable's value was last saved to the trail.
    value_stamps: KeyedVec<ArithVar, u32>,
    scopes: Vec<Scope>,
    scope_id: u32,
    next_scope_id: u32,
    /// Bounds that hold unconditionally; replayed when conflict explanations are checked.
    pub(crate) axioms: Vec<(ArithVar, BoundKind, InfRational)>,
    pub(crate) integer: IntegerState,
    pub(crate) statistics: ArithStatistics,
    pub(crate) diagnostics: Diagnostics,
    pub(crate) oracle: Box<dyn TermOracle>,
    pub(crate) selector: Box<dyn VariableSelector>,
    pub(crate) variable_names: VariableNames,
    /// Whether conflicts are replayed in a fresh engine to validate their explanation.
    pub(crate) check_explanations: bool,
}

impl Default for ArithmeticSolver {
    fn default() -> Self {
        ArithmeticSolver::new(ArithmeticOptions::default())
    }
}

impl Debug for ArithmeticSolver {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArithmeticSolver")
            .field("state", &self.state)
            .field("options", &self.options)
            .field("num_vars", &self.num_vars())
            .field("num_rows", &self.tableau.num_rows())
            .field("num_atoms", &self.atoms.num_atoms())
            .field("scope_depth", &self.scopes.len())
            .field("statistics", &self.statistics)
            .field("diagnostics", &self.diagnostics)
            .field("oracle", &DebugDyn::from("TermOracle"))
            .field("selector", &DebugDyn::from("VariableSelector"))
            .finish()
    }
}

impl ArithmeticSolver {
    pub fn new(options: ArithmeticOptions) -> ArithmeticSolver {
        ArithmeticSolver {
            state: SolverState::default(),
            options,
            sorts: KeyedVec::default(),
            terms: KeyedVec::default(),
            values: KeyedVec::default(),
            tableau: Tableau::new(options.dead_entry_ratio),
            bounds: BoundStore::default(),
            dependencies: DependencyManager::default(),
            atoms: AtomRegistry::default(),
            monomials: Monomials::default(),
            to_patch: BTreeSet::new(),
            touched_rows: BTreeSet::new(),
            propagations: VecDeque::new(),
            equalities: VecDeque::new(),
            reported_equalities: vec![],
            value_trail: vec![],
            value_stamps: KeyedVec::default(),
            scopes: vec![],
            scope_id: 0,
            next_scope_id: 0,
            axioms: vec![],
            integer: IntegerState::default(),
            statistics: ArithStatistics::default(),
            diagnostics: Diagnostics::default(),
            oracle: Box::new(DetachedTerms),
            selector: Box::new(MostFractional),
            variable_names: VariableNames::default(),
            check_explanations: cfg!(any(feature = "explanation-checks", test)),
        }
    }

    pub fn with_diagnostics(mut self, diagnostics: Diagnostics) -> ArithmeticSolver {
        self.diagnostics = diagnostics;
        self
    }

    pub fn set_term_oracle(&mut self, oracle: Box<dyn TermOracle>) {
        self.oracle = oracle;
    }

    pub fn set_variable_selector(&mut self, selector: Box<dyn VariableSelector>) {
        self.selector = selector;
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diagnostics
    }

    pub fn diagnostics_mut(&mut self) -> &mut Diagnostics {
        &mut self.diagnostics
    }

    pub fn options(&self) -> &ArithmeticOptions {
        &self.options
    }

    pub fn statistics(&self) -> &ArithStatistics {
        &self.statistics
    }

    pub fn num_pivots(&self) -> u64 {
        self.tableau.num_pivots
    }

    pub fn log_statistics(&self) {
        self.statistics.log(
            self.tableau.num_pivots,
            self.tableau.max_rows,
            self.tableau.max_columns,
        );
    }

    pub fn num_vars(&self) -> usize {
        self.sorts.len()
    }

    /// Create a variable of the given sort standing for `term`.
    pub fn mk_var(&mut self, sort: VarSort, term: TermId) -> ArithVar {
        let var = self.sorts.push(sort);
        let _ = self.terms.push(term);
        let _ = self.values.push(InfRational::zero());
        let _ = self.value_stamps.push(0);
        self.tableau.add_var();
        self.bounds.grow(var);
        self.atoms.grow(var);
        var
    }

    pub fn set_name(&mut self, var: ArithVar, name: impl Into<String>) -> Result<(), ArithmeticError> {
        self.check_var(var)?;
        self.variable_names.add_name(var, name.into());
        Ok(())
    }

    pub fn var_by_name(&self, name: &str) -> Option<ArithVar> {
        self.variable_names.get_var_by_name(name)
    }

    /// The name used for `var` in diagnostic output.
    pub fn var_name(&self, var: ArithVar) -> String {
        self.variable_names
            .get_name(var)
            .map(str::to_owned)
            .or_else(|| match self.terms[var] {
                TermId::INTERNAL => None,
                term => self.oracle.name(term),
            })
            .unwrap_or_else(|| format!("x{}", var.id))
    }

    pub fn sort(&self, var: ArithVar) -> VarSort {
        self.sorts[var]
    }

    pub fn kind(&self, var: ArithVar) -> VarKind {
        self.tableau.kind(var)
    }

    pub fn term(&self, var: ArithVar) -> TermId {
        self.terms[var]
    }

    /// Add the row `base = Σ coeff * var`. The base must be a variable which occurs in no row
    /// yet.
    pub fn add_row(
        &mut self,
        base: ArithVar,
        entries: &[(ArithVar, Rational)],
    ) -> Result<RowId, ArithmeticError> {
        self.check_var(base)?;
        for &(var, _) in entries {
            self.check_var(var)?;
            if var == base {
                return Err(ArithmeticError::BaseNotFresh(base));
            }
        }
        if !self.tableau.is_fresh(base) {
            return Err(ArithmeticError::BaseNotFresh(base));
        }

        let row = self.tableau.add_row(base, entries.iter().cloned(), true);
        if self.options.eager_normalization {
            self.normalize_row(row);
        } else {
            let value = self.value(base);
            self.set_value(base, value);
        }
        let _ = self.to_patch.insert(base);
        let _ = self.touched_rows.insert(row);
        if self.state.is_consistent() {
            self.state.declare_checking();
        }

        arith_trace!(
            self.diagnostics,
            TraceTag::Simplex,
            "added {row}: {}",
            self.display_row(row)
        );
        Ok(row)
    }

    /// Create a fresh variable together with the row defining it as `Σ coeff * var`.
    pub fn mk_linear_var(
        &mut self,
        sort: VarSort,
        term: TermId,
        entries: &[(ArithVar, Rational)],
    ) -> Result<ArithVar, ArithmeticError> {
        for &(var, _) in entries {
            self.check_var(var)?;
        }
        let base = self.mk_var(sort, term);
        let _ = self.add_row(base, entries)?;
        Ok(base)
    }

    /// The atom `var >= threshold` (for [`BoundKind::Lower`]) or `var <= threshold`, as a
    /// positive literal.
    pub fn mk_atom(
        &mut self,
        var: ArithVar,
        kind: BoundKind,
        threshold: Rational,
    ) -> Result<Literal, ArithmeticError> {
        self.check_var(var)?;
        Ok(self.intern_atom(var, kind, threshold))
    }

    pub(crate) fn intern_atom(&mut self, var: ArithVar, kind: BoundKind, threshold: Rational) -> Literal {
        let (atom, created) = self.atoms.mk_atom(var, kind, threshold);
        if created {
            // a fresh atom may already be entailed by the active bounds
            self.propagate_atom(atom);
        }
        Literal::new(atom, true)
    }

    /// Assert a literal. Its bound is installed at the next [`ArithmeticSolver::propagate`] or
    /// [`ArithmeticSolver::check`], in the order the literals were asserted.
    pub fn assert_literal(&mut self, literal: Literal) -> Result<(), ArithmeticError> {
        if self.atoms.get(literal.atom()).is_none() {
            return Err(ArithmeticError::UnknownLiteral(literal));
        }

        match self.atoms.assign(literal) {
            Assignment::Queued => {
                arith_trace!(self.diagnostics, TraceTag::Atoms, "asserted {literal}");
            }
            Assignment::Redundant => {}
            Assignment::Conflicting => {
                let asserted = self.dependencies.mk_literal(literal);
                let opposite = self.dependencies.mk_literal(!literal);
                let conflict = self.dependencies.join(asserted, opposite);
                self.set_conflict(conflict);
            }
        }

        Ok(())
    }

    /// Assert `var >= k` and `var <= k` through two atoms.
    pub fn assert_eq_atom(
        &mut self,
        var: ArithVar,
        value: Rational,
    ) -> Result<(Literal, Literal), ArithmeticError> {
        let lower = self.mk_atom(var, BoundKind::Lower, value.clone())?;
        let upper = self.mk_atom(var, BoundKind::Upper, value)?;
        self.assert_literal(lower)?;
        self.assert_literal(upper)?;
        Ok((lower, upper))
    }

    /// Install a bound which holds unconditionally. Conflicts it causes are explained without it.
    pub fn assert_axiom(
        &mut self,
        var: ArithVar,
        kind: BoundKind,
        value: InfRational,
    ) -> Result<(), ArithmeticError> {
        self.check_var(var)?;
        self.axioms.push((var, kind, value.clone()));
        let _ = self.install_bound(var, kind, value, DependencyId::EMPTY, BoundOrigin::Axiom);
        Ok(())
    }

    /// The explanation of the current conflict, if the engine is infeasible.
    pub fn conflict(&self) -> Option<Explanation> {
        self.state
            .conflict()
            .map(|conflict| self.dependencies.linearize(conflict))
    }

    pub fn is_infeasible(&self) -> bool {
        self.state.is_infeasible()
    }

    /// Take the next literal implied by the active bounds.
    pub fn next_propagation(&mut self) -> Option<Propagation> {
        self.propagations.pop_front()
    }

    /// Take the next pair of variables found to be equal.
    pub fn next_equality(&mut self) -> Option<EqualityPropagation> {
        self.equalities.pop_front()
    }

    /// Install the delayed bounds and repair the assignment over the rationals. Returns `false`
    /// when the bounds are infeasible; see [`ArithmeticSolver::conflict`].
    pub fn propagate(&mut self) -> bool {
        if self.state.is_infeasible() {
            return false;
        }

        self.normalize_quasi_rows();

        while let Some(literal) = self.atoms.next_delayed() {
            if !self.apply_literal(literal) {
                return false;
            }
        }

        loop {
            if !self.make_feasible() {
                return false;
            }
            if !self.options.propagate_bounds || self.touched_rows.is_empty() {
                break;
            }
            if !self.propagate_implied_bounds() {
                return false;
            }
            if self.to_patch.is_empty() {
                break;
            }
        }

        self.propagate_fixed_equalities();
        true
    }

    /// Decide the asserted bounds. Integer and nonlinear reasoning run once the rational
    /// relaxation is feasible.
    pub fn check(&mut self) -> CheckResult {
        self.statistics.checks += 1;
        self.integer.start_check();
        let mut nonlinear_pass = NonlinearPass::default();

        loop {
            if !self.propagate() {
                return self.conflict_result();
            }

            match self.check_integers() {
                IntegerCheck::Feasible => {}
                IntegerCheck::Conflict => return self.conflict_result(),
                IntegerCheck::CutAdded => continue,
                IntegerCheck::Branch(split) => return CheckResult::Branch(split),
                IntegerCheck::GiveUp => return CheckResult::Unknown,
            }

            if self.monomials.is_empty() {
                return CheckResult::Sat;
            }

            match self.check_nonlinear(&mut nonlinear_pass) {
                NonlinearCheck::Consistent => return CheckResult::Sat,
                NonlinearCheck::Conflict => return self.conflict_result(),
                NonlinearCheck::Progress => continue,
                NonlinearCheck::GiveUp => return CheckResult::Unknown,
            }
        }
    }

    fn conflict_result(&mut self) -> CheckResult {
        let explanation = self.conflict().unwrap_or_default();
        debug!("Arithmetic conflict: {explanation}");

        #[cfg(any(feature = "explanation-checks", test))]
        if self.check_explanations {
            super::DebugHelper::debug_check_conflict(self, &explanation);
        }

        CheckResult::Unsat(explanation)
    }

    pub fn push(&mut self) {
        self.scopes.push(Scope {
            num_vars: self.num_vars(),
            tableau_trail: self.tableau.trail_len(),
            bounds: self.bounds.mark(),
            atoms: self.atoms.mark(),
            dependencies: self.dependencies.num_nodes(),
            value_trail: self.value_trail.len(),
            monomials: self.monomials.len(),
            axioms: self.axioms.len(),
            reported_equalities: self.reported_equalities.len(),
            state: self.state,
            parent_scope_id: self.scope_id,
        });
        self.next_scope_id += 1;
        self.scope_id = self.next_scope_id;
        self.tableau.set_recording(true);

        arith_trace!(
            self.diagnostics,
            TraceTag::Backtrack,
            "push to depth {}",
            self.scopes.len()
        );
    }

    /// Undo everything done since the matching number of [`ArithmeticSolver::push`] calls.
    pub fn pop(&mut self, num_scopes: usize) -> Result<(), ArithmeticError> {
        if num_scopes > self.scopes.len() {
            return Err(ArithmeticError::PopBelowRoot {
                requested: num_scopes,
                open: self.scopes.len(),
            });
        }

        for _ in 0..num_scopes {
            self.pop_scope();
        }
        Ok(())
    }

    pub fn scope_depth(&self) -> usize {
        self.scopes.len()
    }

    pub fn mark(&self) -> ScopeMark {
        ScopeMark {
            depth: self.scopes.len(),
        }
    }

    /// Pop back to the depth recorded in `mark`.
    pub fn retract_to(&mut self, mark: ScopeMark) -> Result<(), ArithmeticError> {
        let num_scopes =
            self.scopes
                .len()
                .checked_sub(mark.depth)
                .ok_or(ArithmeticError::PopBelowRoot {
                    requested: mark.depth,
                    open: self.scopes.len(),
                })?;
        self.pop(num_scopes)
    }

    fn pop_scope(&mut self) {
        let Some(scope) = self.scopes.pop() else {
            return;
        };

        while self.value_trail.len() > scope.value_trail {
            if let Some((var, value)) = self.value_trail.pop() {
                self.values[var] = value;
            }
        }

        self.tableau.undo_to(scope.tableau_trail);
        self.bounds.retract_to(scope.bounds);
        self.atoms.retract_to(scope.atoms);
        self.monomials.truncate(scope.monomials);
        self.dependencies.truncate(scope.dependencies);
        self.axioms.truncate(scope.axioms);
        self.reported_equalities.truncate(scope.reported_equalities);

        self.sorts.truncate(scope.num_vars);
        self.terms.truncate(scope.num_vars);
        self.values.truncate(scope.num_vars);
        self.value_stamps.truncate(scope.num_vars);
        self.tableau.truncate_vars(scope.num_vars);
        self.bounds.shrink(scope.num_vars);
        self.atoms.shrink(scope.num_vars);
        self.variable_names.truncate(scope.num_vars);

        self.state = scope.state;
        self.scope_id = scope.parent_scope_id;
        self.tableau.set_recording(!self.scopes.is_empty());

        self.propagations.clear();
        self.equalities.clear();
        self.touched_rows.clear();
        self.to_patch = self
            .values
            .keys()
            .filter(|&var| self.tableau.kind(var) != VarKind::NonBase)
            .collect();
        arith_assert_advanced!(self.tableau.is_consistent());

        arith_trace!(
            self.diagnostics,
            TraceTag::Backtrack,
            "pop to depth {}",
            self.scopes.len()
        );
    }

    /// The current value of `var`.
    pub fn value(&self, var: ArithVar) -> InfRational {
        match self.tableau.kind(var) {
            VarKind::QuasiBase => {
                let Some(row) = self.tableau.base_row(var) else {
                    return self.values[var].clone();
                };
                self.tableau
                    .row(row)
                    .iter()
                    .fold(InfRational::zero(), |acc, (_, entry)| {
                        acc + &self.value(entry.var) * &entry.coeff
                    })
            }
            VarKind::Base | VarKind::NonBase => self.values[var].clone(),
        }
    }

    pub fn lower_bound(&self, var: ArithVar) -> Option<&InfRational> {
        self.bounds.lower_value(var)
    }

    pub fn upper_bound(&self, var: ArithVar) -> Option<&InfRational> {
        self.bounds.upper_value(var)
    }

    pub fn is_fixed(&self, var: ArithVar) -> bool {
        self.bounds.is_fixed(var)
    }

    /// A positive rational to substitute for the infinitesimal such that every active bound
    /// still holds under the current assignment.
    pub fn compute_epsilon(&self) -> Rational {
        let mut epsilon = Rational::one();

        for var in self.values.keys() {
            let value = self.value(var);
            if let Some(lower) = self.bounds.lower_value(var) {
                if lower.real() < value.real() && lower.eps() > value.eps() {
                    let limit = (value.real() - lower.real()) / (lower.eps() - value.eps());
                    epsilon = epsilon.min(limit);
                }
            }
            if let Some(upper) = self.bounds.upper_value(var) {
                if value.real() < upper.real() && value.eps() > upper.eps() {
                    let limit = (upper.real() - value.real()) / (value.eps() - upper.eps());
                    epsilon = epsilon.min(limit);
                }
            }
        }

        epsilon
    }

    /// The rational model: the current assignment with the infinitesimal replaced by
    /// [`ArithmeticSolver::compute_epsilon`].
    pub fn model(&self) -> Vec<Rational> {
        let epsilon = self.compute_epsilon();
        self.values
            .keys()
            .map(|var| self.value(var).evaluate(&epsilon))
            .collect()
    }

    pub fn model_value(&self, var: ArithVar) -> Rational {
        self.value(var).evaluate(&self.compute_epsilon())
    }

    pub fn num_rows(&self) -> usize {
        self.tableau.num_rows()
    }

    pub fn row_base(&self, row: RowId) -> ArithVar {
        self.tableau.row(row).base
    }

    /// The live entries of `row`, sorted by variable.
    pub fn row_entries(&self, row: RowId) -> Vec<(ArithVar, Rational)> {
        self.tableau.row(row).sorted_entries()
    }

    pub fn base_row(&self, var: ArithVar) -> Option<RowId> {
        self.tableau.base_row(var)
    }

    pub(crate) fn check_var(&self, var: ArithVar) -> Result<(), ArithmeticError> {
        if var.index() < self.num_vars() {
            Ok(())
        } else {
            Err(ArithmeticError::UnknownVariable(var))
        }
    }

    /// Overwrite the value of `var`, saving the old value the first time it changes in the
    /// current scope.
    pub(crate) fn set_value(&mut self, var: ArithVar, value: InfRational) {
        if !self.scopes.is_empty() && self.value_stamps[var] != self.scope_id {
            self.value_stamps[var] = self.scope_id;
            let previous = std::mem::replace(&mut self.values[var], value);
            self.value_trail.push((var, previous));
        } else {
            self.values[var] = value;
        }
    }

    pub(crate) fn set_conflict(&mut self, conflict: DependencyId) {
        if self.state.is_infeasible() {
            return;
        }
        self.statistics.conflicts += 1;
        self.state.declare_infeasible(conflict);
        arith_trace!(
            self.diagnostics,
            TraceTag::Bounds,
            "conflict {}",
            self.dependencies.linearize(conflict)
        );
    }

    /// The bound a literal stands for: `¬(x >= k)` is `x <= k - ε` and `¬(x <= k)` is
    /// `x >= k + ε`.
    pub(crate) fn literal_bound(&self, literal: Literal) -> Option<(ArithVar, BoundKind, InfRational)> {
        let atom = self.atoms.get(literal.atom())?;
        let threshold = atom.threshold.clone();
        let bound = match (atom.kind, literal.is_positive()) {
            (kind, true) => (kind, InfRational::from_rational(threshold)),
            (BoundKind::Lower, false) => (
                BoundKind::Upper,
                InfRational::new(threshold, -Rational::one()),
            ),
            (BoundKind::Upper, false) => (
                BoundKind::Lower,
                InfRational::new(threshold, Rational::one()),
            ),
        };
        let value = self.round_bound(atom.var, bound.0, bound.1);
        Some((atom.var, bound.0, value))
    }

    /// Integer bounds are tightened to the nearest integer on the feasible side.
    pub(crate) fn round_bound(&self, var: ArithVar, kind: BoundKind, value: InfRational) -> InfRational {
        if !self.sorts[var].is_int() {
            return value;
        }

        let real = value.real();
        let rounded = match kind {
            BoundKind::Lower if value.eps() > &Rational::zero() => real.floor() + Rational::one(),
            BoundKind::Lower => real.ceil(),
            BoundKind::Upper if value.eps() < &Rational::zero() => real.ceil() - Rational::one(),
            BoundKind::Upper => real.floor(),
        };
        InfRational::from_rational(rounded)
    }

    /// Whether `value` as a `kind` bound of `var` is stronger than the active one.
    pub(crate) fn is_tighter(&self, var: ArithVar, kind: BoundKind, value: &InfRational) -> bool {
        match (kind, self.bounds.get(var, kind)) {
            (_, None) => true,
            (BoundKind::Lower, Some(current)) => value > &current.value,
            (BoundKind::Upper, Some(current)) => value < &current.value,
        }
    }

    fn apply_literal(&mut self, literal: Literal) -> bool {
        let Some((var, kind, value)) = self.literal_bound(literal) else {
            return true;
        };
        let dependency = self.dependencies.mk_literal(literal);
        self.install_bound(var, kind, value, dependency, BoundOrigin::Atom(literal))
    }

    /// Install a bound and keep the assignment invariant: a non-base variable moved out of its
    /// new bound is moved onto it. Returns `false` on a conflict.
    pub(crate) fn install_bound(
        &mut self,
        var: ArithVar,
        kind: BoundKind,
        value: InfRational,
        dependency: DependencyId,
        origin: BoundOrigin,
    ) -> bool {
        let value = self.round_bound(var, kind, value);
        let update = self.bounds.assert_bound(Bound {
            var,
            kind,
            value: value.clone(),
            dependency,
            origin,
        });

        match update {
            BoundUpdate::Conflict(opposite) => {
                let conflict = self.dependencies.join(dependency, opposite);
                self.set_conflict(conflict);
                false
            }
            BoundUpdate::Unchanged => true,
            BoundUpdate::Tightened => {
                match kind {
                    BoundKind::Lower => self.statistics.assert_lower += 1,
                    BoundKind::Upper => self.statistics.assert_upper += 1,
                }
                arith_trace!(
                    self.diagnostics,
                    TraceTag::Bounds,
                    "{} {kind} {value} ({origin:?})",
                    self.var_name(var)
                );

                if origin != BoundOrigin::Derived {
                    self.touch_rows_of(var);
                }

                match self.tableau.kind(var) {
                    VarKind::NonBase => {
                        let current = self.values[var].clone();
                        let violated = match kind {
                            BoundKind::Lower => current < value,
                            BoundKind::Upper => current > value,
                        };
                        if violated {
                            self.update_value(var, &(&value - &current));
                        }
                    }
                    VarKind::Base | VarKind::QuasiBase => {
                        let _ = self.to_patch.insert(var);
                    }
                }

                if !self.to_patch.is_empty() && self.state.is_consistent() {
                    self.state.declare_checking();
                }

                self.propagate_atoms_on(var);
                true
            }
        }
    }

    fn touch_rows_of(&mut self, var: ArithVar) {
        if let Some(row) = self.tableau.base_row(var) {
            let _ = self.touched_rows.insert(row);
        }
        let rows = self
            .tableau
            .column(var)
            .iter()
            .map(|(_, entry)| entry.row)
            .collect::<Vec<_>>();
        self.touched_rows.extend(rows);
    }

    /// Whether every non-base variable lies within its bounds and every normalized row holds
    /// under the current values.
    pub(crate) fn assignment_is_consistent(&self) -> bool {
        let rows_hold = self.tableau.row_ids().all(|row_id| {
            let row = self.tableau.row(row_id);
            row.quasi
                || row
                    .iter()
                    .fold(InfRational::zero(), |acc, (_, entry)| {
                        acc + &self.values[entry.var] * &entry.coeff
                    })
                    == self.values[row.base]
        });

        let non_base_within_bounds = self.values.keys().all(|var| {
            self.tableau.kind(var) != VarKind::NonBase
                || (!self.bounds.below_lower(var, &self.values[var])
                    && !self.bounds.above_upper(var, &self.values[var]))
        });

        rows_hold && non_base_within_bounds
    }

    pub(crate) fn arith_assert_consistent(&self) {
        arith_assert_simple!(self.sorts.len() == self.values.len());
        arith_assert_extreme!(self.tableau.is_consistent());
        arith_assert_extreme!(self.assignment_is_consistent());
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum SolverStateInternal {
    #[default]
    Consistent,
    Checking,
    Infeasible {
        conflict: DependencyId,
    },
}

/// The state of the assignment: `Consistent` when every bound holds, `Checking` when some base
/// variable may violate a bound, and `Infeasible` once a conflict has been found.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct SolverState {
    internal_state: SolverStateInternal,
}

impl SolverState {
    pub(crate) fn is_consistent(&self) -> bool {
        matches!(self.internal_state, SolverStateInternal::Consistent)
    }

    pub(crate) fn is_checking(&self) -> bool {
        matches!(self.internal_state, SolverStateInternal::Checking)
    }

    pub(crate) fn is_infeasible(&self) -> bool {
        matches!(self.internal_state, SolverStateInternal::Infeasible { .. })
    }

    pub(crate) fn conflict(&self) -> Option<DependencyId> {
        match self.internal_state {
            SolverStateInternal::Infeasible { conflict } => Some(conflict),
            _ => None,
        }
    }

    pub(crate) fn declare_checking(&mut self) {
        arith_assert_simple!(!self.is_infeasible());
        self.internal_state = SolverStateInternal::Checking;
    }

    pub(crate) fn declare_consistent(&mut self) {
        arith_assert_simple!(!self.is_infeasible());
        self.internal_state = SolverStateInternal::Consistent;
    }

    pub(crate) fn declare_infeasible(&mut self, conflict: DependencyId) {
        arith_assert_simple!(!self.is_infeasible());
        self.internal_state = SolverStateInternal::Infeasible { conflict };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::ratio;
    use crate::math::rational;

    #[test]
    fn state_transitions() {
        let mut state = SolverState::default();
        assert!(state.is_consistent());

        state.declare_checking();
        assert!(state.is_checking());

        state.declare_consistent();
        state.declare_infeasible(DependencyId::EMPTY);
        assert!(state.is_infeasible());
        assert_eq!(Some(DependencyId::EMPTY), state.conflict());
    }

    #[test]
    fn negated_atoms_become_strict_bounds() {
        let mut solver = ArithmeticSolver::default();
        let x = solver.mk_var(VarSort::Real, TermId(0));
        let at_least_two = solver
            .mk_atom(x, BoundKind::Lower, rational(2))
            .expect("x exists");

        assert_eq!(
            Some((
                x,
                BoundKind::Upper,
                InfRational::new(rational(2), rational(-1))
            )),
            solver.literal_bound(!at_least_two)
        );
    }

    #[test]
    fn integer_bounds_are_rounded_towards_the_feasible_side() {
        let mut solver = ArithmeticSolver::default();
        let x = solver.mk_var(VarSort::Int, TermId(0));
        let strict = |real: Rational, eps: i64| InfRational::new(real, rational(eps));

        assert_eq!(
            InfRational::from(rational(2)),
            solver.round_bound(x, BoundKind::Lower, strict(ratio(3, 2), 0))
        );
        assert_eq!(
            InfRational::from(rational(2)),
            solver.round_bound(x, BoundKind::Lower, strict(rational(1), 1))
        );
        assert_eq!(
            InfRational::from(rational(1)),
            solver.round_bound(x, BoundKind::Upper, strict(ratio(3, 2), 0))
        );
        assert_eq!(
            InfRational::from(rational(0)),
            solver.round_bound(x, BoundKind::Upper, strict(rational(1), -1))
        );
    }

    #[test]
    fn epsilon_keeps_strict_bounds_satisfied() {
        let mut solver = ArithmeticSolver::default();
        let x = solver.mk_var(VarSort::Real, TermId(0));
        let y = solver.mk_var(VarSort::Real, TermId(1));
        let s = solver
            .mk_linear_var(VarSort::Real, TermId(2), &[(x, rational(1)), (y, rational(1))])
            .expect("variables exist");

        // x > 0, y > 0, x + y < 1
        let x_positive = solver.mk_atom(x, BoundKind::Upper, rational(0)).expect("x");
        let y_positive = solver.mk_atom(y, BoundKind::Upper, rational(0)).expect("y");
        let sum_small = solver.mk_atom(s, BoundKind::Lower, rational(1)).expect("s");
        for literal in [!x_positive, !y_positive, !sum_small] {
            solver.assert_literal(literal).expect("known literal");
        }

        assert_eq!(CheckResult::Sat, solver.check());

        let model = solver.model();
        assert!(model[x.index()] > rational(0));
        assert!(model[y.index()] > rational(0));
        assert!(&model[x.index()] + &model[y.index()] < rational(1));
        assert_eq!(model[s.index()], &model[x.index()] + &model[y.index()]);
    }

    #[test]
    fn unknown_literals_are_rejected() {
        let mut solver = ArithmeticSolver::default();
        let x = solver.mk_var(VarSort::Real, TermId(0));
        let literal = solver.mk_atom(x, BoundKind::Lower, rational(0)).expect("x");

        let mut other = ArithmeticSolver::default();
        assert_eq!(
            Err(ArithmeticError::UnknownLiteral(literal)),
            other.assert_literal(literal)
        );
    }

    #[test]
    fn rows_need_a_fresh_base() {
        let mut solver = ArithmeticSolver::default();
        let x = solver.mk_var(VarSort::Real, TermId(0));
        let y = solver.mk_var(VarSort::Real, TermId(1));
        let s = solver
            .mk_linear_var(VarSort::Real, TermId(2), &[(x, rational(1))])
            .expect("x exists");

        assert_eq!(
            Err(ArithmeticError::BaseNotFresh(x)),
            solver.add_row(x, &[(y, rational(1))])
        );
        assert_eq!(
            Err(ArithmeticError::BaseNotFresh(s)),
            solver.add_row(s, &[(y, rational(1))])
        );
    }

    #[test]
    fn popping_too_far_is_an_error() {
        let mut solver = ArithmeticSolver::default();
        solver.push();

        assert_eq!(
            Err(ArithmeticError::PopBelowRoot {
                requested: 2,
                open: 1
            }),
            solver.pop(2)
        );
        assert_eq!(Ok(()), solver.pop(1));
    }
}
