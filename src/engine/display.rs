//! Human readable views of the engine state, used by the trace output and the replay tool.
use std::fmt::Display;
use std::fmt::Formatter;

use num_traits::One;
use num_traits::Signed;

use super::tableau::RowId;
use super::variables::ArithVar;
use super::variables::Literal;
use super::ArithmeticSolver;
use crate::math::Rational;

struct RowView<'a> {
    solver: &'a ArithmeticSolver,
    row: RowId,
}

impl Display for RowView<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let row = self.solver.tableau.row(self.row);
        write!(f, "{} = ", self.solver.var_name(row.base))?;
        write_sum(f, self.solver, &row.sorted_entries())
    }
}

/// Writes `2·y - z + 1/2·w`, or `0` for an empty sum.
fn write_sum(
    f: &mut Formatter<'_>,
    solver: &ArithmeticSolver,
    terms: &[(ArithVar, Rational)],
) -> std::fmt::Result {
    if terms.is_empty() {
        return write!(f, "0");
    }

    for (index, (var, coeff)) in terms.iter().enumerate() {
        let magnitude = coeff.abs();
        match (index, coeff.is_negative()) {
            (0, true) => write!(f, "-")?,
            (0, false) => {}
            (_, true) => write!(f, " - ")?,
            (_, false) => write!(f, " + ")?,
        }
        if !magnitude.is_one() {
            write!(f, "{magnitude}·")?;
        }
        write!(f, "{}", solver.var_name(*var))?;
    }
    Ok(())
}

struct VarsView<'a>(&'a ArithmeticSolver);

impl Display for VarsView<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let solver = self.0;
        for var in solver.values.keys() {
            write!(
                f,
                "{} ({:?} {:?}) = {}",
                solver.var_name(var),
                solver.kind(var),
                solver.sort(var),
                solver.value(var)
            )?;
            match solver.bounds.lower_value(var) {
                Some(lower) => write!(f, " [{lower}")?,
                None => write!(f, " (-oo")?,
            }
            match solver.bounds.upper_value(var) {
                Some(upper) => writeln!(f, ", {upper}]")?,
                None => writeln!(f, ", oo)")?,
            }
        }
        Ok(())
    }
}

struct AtomsView<'a>(&'a ArithmeticSolver);

impl Display for AtomsView<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let solver = self.0;
        for (atom, entry) in solver.atoms.iter() {
            write!(
                f,
                "a{}: {} {} {}",
                atom.id,
                solver.var_name(entry.var),
                entry.kind,
                entry.threshold
            )?;
            match entry.assignment {
                Some(true) => write!(f, " (true)")?,
                Some(false) => write!(f, " (false)")?,
                None => {}
            }
            if entry.propagated {
                write!(f, " (propagated)")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

struct QueuesView<'a>(&'a ArithmeticSolver);

impl Display for QueuesView<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "asserted: {}", join_literals(self.0.atoms.asserted()))?;
        writeln!(f, "delayed: {}", join_literals(self.0.atoms.delayed()))?;
        writeln!(f, "to patch: {}", self.0.to_patch.len())?;
        writeln!(f, "propagations: {}", self.0.propagations.len())?;
        writeln!(f, "equalities: {}", self.0.equalities.len())
    }
}

fn join_literals(literals: &[Literal]) -> String {
    literals
        .iter()
        .map(Literal::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

struct MonomialsView<'a>(&'a ArithmeticSolver);

impl Display for MonomialsView<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let solver = self.0;
        for monomial in solver.monomials.iter() {
            let factors = monomial
                .factors
                .iter()
                .map(|&factor| solver.var_name(factor))
                .collect::<Vec<_>>();
            writeln!(
                f,
                "{} = {} ({})",
                solver.var_name(monomial.var),
                factors.join("·"),
                solver.value(monomial.var)
            )?;
        }
        Ok(())
    }
}

struct RowStatsView<'a>(&'a ArithmeticSolver);

impl Display for RowStatsView<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let tableau = &self.0.tableau;
        let sizes = tableau
            .row_ids()
            .map(|row| tableau.row(row).size())
            .collect::<Vec<_>>();
        let entries = sizes.iter().sum::<usize>();
        let largest_column = self
            .0
            .values
            .keys()
            .map(|var| tableau.column(var).size())
            .max()
            .unwrap_or(0);

        write!(
            f,
            "rows: {}, entries: {entries}, largest row: {}, largest column: {largest_column}, pivots: {}",
            sizes.len(),
            sizes.iter().max().copied().unwrap_or(0),
            tableau.num_pivots
        )
    }
}

impl ArithmeticSolver {
    /// `row` as `base = c·x + ...`.
    pub fn display_row(&self, row: RowId) -> impl Display + '_ {
        RowView { solver: self, row }
    }

    /// Every variable with its kind, sort, value and bounds, one per line.
    pub fn display_vars(&self) -> impl Display + '_ {
        VarsView(self)
    }

    pub fn display_atoms(&self) -> impl Display + '_ {
        AtomsView(self)
    }

    /// The asserted literals, the delayed ones, and the sizes of the other queues.
    pub fn display_queues(&self) -> impl Display + '_ {
        QueuesView(self)
    }

    pub fn display_monomials(&self) -> impl Display + '_ {
        MonomialsView(self)
    }

    pub fn display_row_stats(&self) -> impl Display + '_ {
        RowStatsView(self)
    }
}

#[cfg(test)]
mod tests {
    use crate::engine::bounds::BoundKind;
    use crate::engine::variables::TermId;
    use crate::engine::variables::VarSort;
    use crate::engine::ArithmeticSolver;
    use crate::math::ratio;
    use crate::math::rational;

    #[test]
    fn rows_are_written_compactly() {
        let mut solver = ArithmeticSolver::default();
        let y = solver.mk_var(VarSort::Real, TermId(0));
        let z = solver.mk_var(VarSort::Real, TermId(1));
        let w = solver.mk_var(VarSort::Real, TermId(2));
        let x = solver.mk_var(VarSort::Real, TermId(3));
        for (var, name) in [(x, "x"), (y, "y"), (z, "z"), (w, "w")] {
            solver.set_name(var, name).expect("var exists");
        }
        let row = solver
            .add_row(
                x,
                &[(y, rational(2)), (z, rational(-1)), (w, ratio(1, 2))],
            )
            .expect("x is fresh");

        assert_eq!("x = 2·y - z + 1/2·w", solver.display_row(row).to_string());
    }

    #[test]
    fn variables_show_their_bounds() {
        let mut solver = ArithmeticSolver::default();
        let x = solver.mk_var(VarSort::Int, TermId(0));
        solver.set_name(x, "x").expect("x exists");
        let literal = solver.mk_atom(x, BoundKind::Lower, rational(2)).expect("x");
        solver.assert_literal(literal).expect("known literal");
        assert!(solver.propagate());

        assert_eq!(
            "x (NonBase Int) = 2 [2, oo)\n",
            solver.display_vars().to_string()
        );
        assert_eq!("a0: x >= 2 (true)\n", solver.display_atoms().to_string());
    }

    #[test]
    fn queues_show_delayed_literals_until_propagation() {
        let mut solver = ArithmeticSolver::default();
        let x = solver.mk_var(VarSort::Real, TermId(0));
        let literal = solver.mk_atom(x, BoundKind::Upper, rational(1)).expect("x");
        solver.assert_literal(literal).expect("known literal");

        let before = solver.display_queues().to_string();
        assert!(before.starts_with(&format!("asserted: {literal}\ndelayed: {literal}\n")));

        assert!(solver.propagate());
        let after = solver.display_queues().to_string();
        assert!(after.starts_with(&format!("asserted: {literal}\ndelayed: \n")));
    }

    #[test]
    fn monomials_list_their_factors() {
        let mut solver = ArithmeticSolver::default();
        let x = solver.mk_var(VarSort::Real, TermId(0));
        let y = solver.mk_var(VarSort::Real, TermId(1));
        solver.set_name(x, "x").expect("x exists");
        solver.set_name(y, "y").expect("y exists");
        let xy = solver.mk_monomial(&[y, x]).expect("factors exist");
        solver.set_name(xy, "xy").expect("xy exists");

        assert_eq!("xy = x·y (0)\n", solver.display_monomials().to_string());
        assert!(solver
            .display_row_stats()
            .to_string()
            .starts_with("rows: 0, entries: 0,"));
    }
}
