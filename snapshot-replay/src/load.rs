//! Rebuilds an engine from a snapshot. Declarations become variables, rows and products become
//! tableau rows and monomials, and every bound becomes an asserted atom.
use std::collections::HashMap;

use anyhow::bail;
use anyhow::Context;
use arith_theory::ArithVar;
use arith_theory::ArithmeticError;
use arith_theory::ArithmeticSolver;
use arith_theory::BoundKind;
use arith_theory::InfRational;
use arith_theory::Rational;
use arith_theory::TermId;
use arith_theory::VarSort;
use log::debug;
use num_rational::BigRational;
use snapshot_format::Assertion;
use snapshot_format::Snapshot;
use snapshot_format::Sort;

/// Declares the variables of `snapshot` in `solver` and asserts its assertions at the current
/// scope. Returns the declared variables in declaration order.
pub(crate) fn load_snapshot(
    solver: &mut ArithmeticSolver,
    snapshot: &Snapshot,
) -> anyhow::Result<Vec<(String, ArithVar)>> {
    let mut declared = Vec::with_capacity(snapshot.declarations.len());
    let mut by_name = HashMap::new();

    for (index, declaration) in snapshot.declarations.iter().enumerate() {
        let sort = match declaration.sort {
            Sort::Int => VarSort::Int,
            Sort::Real => VarSort::Real,
        };
        let term = TermId(u32::try_from(index).context("too many declarations")?);
        let var = solver.mk_var(sort, term);
        solver.set_name(var, declaration.name.clone())?;
        if by_name.insert(declaration.name.as_str(), var).is_some() {
            bail!("variable '{}' is declared twice", declaration.name);
        }
        declared.push((declaration.name.clone(), var));
    }

    let lookup = |name: &str| {
        by_name
            .get(name)
            .copied()
            .with_context(|| format!("variable '{name}' is not declared"))
    };

    // Products go first so that rows mentioning a product var see its defining row.
    for assertion in &snapshot.assertions {
        if let Assertion::Product { var, factors } = assertion {
            let var = lookup(var)?;
            let factors = factors
                .iter()
                .map(|factor| lookup(factor))
                .collect::<anyhow::Result<Vec<_>>>()?;
            let monomial = solver.mk_monomial(&factors)?;
            define(solver, var, &[(monomial, Rational::from_integer(1.into()))])?;
        }
    }

    for assertion in &snapshot.assertions {
        match assertion {
            Assertion::Product { .. } => {}
            Assertion::Row { base, terms } => {
                let base = lookup(base)?;
                let entries = terms
                    .iter()
                    .map(|(coeff, var)| Ok((lookup(var)?, coeff.clone())))
                    .collect::<anyhow::Result<Vec<_>>>()?;
                define(solver, base, &entries)?;
            }
            Assertion::Fixed { var, value } => {
                let _ = solver.assert_eq_atom(lookup(var)?, value.clone())?;
            }
            Assertion::Lower { var, value, strict } => {
                assert_bound(solver, lookup(var)?, BoundKind::Lower, value, *strict)?;
            }
            Assertion::Upper { var, value, strict } => {
                assert_bound(solver, lookup(var)?, BoundKind::Upper, value, *strict)?;
            }
        }
    }

    debug!(
        "Loaded {} variables and {} assertions",
        declared.len(),
        snapshot.assertions.len()
    );
    Ok(declared)
}

/// Add the row `base = Σ entries`. When `base` already occurs in the tableau, the row is
/// expressed through a slack fixed to zero instead.
fn define(
    solver: &mut ArithmeticSolver,
    base: ArithVar,
    entries: &[(ArithVar, Rational)],
) -> Result<(), ArithmeticError> {
    match solver.add_row(base, entries) {
        Ok(_) => Ok(()),
        Err(ArithmeticError::BaseNotFresh(_)) => {
            let mut difference = entries.to_vec();
            difference.push((base, Rational::from_integer((-1).into())));
            let slack = solver.mk_linear_var(VarSort::Real, TermId::INTERNAL, &difference)?;
            solver.assert_axiom(slack, BoundKind::Lower, InfRational::zero())?;
            solver.assert_axiom(slack, BoundKind::Upper, InfRational::zero())
        }
        Err(error) => Err(error),
    }
}

/// A strict lower bound `x > k` is the negation of the atom `x <= k`, and the other way around.
fn assert_bound(
    solver: &mut ArithmeticSolver,
    var: ArithVar,
    kind: BoundKind,
    value: &BigRational,
    strict: bool,
) -> Result<(), ArithmeticError> {
    let literal = if strict {
        let opposite = match kind {
            BoundKind::Lower => BoundKind::Upper,
            BoundKind::Upper => BoundKind::Lower,
        };
        !solver.mk_atom(var, opposite, value.clone())?
    } else {
        solver.mk_atom(var, kind, value.clone())?
    };
    solver.assert_literal(literal)
}
