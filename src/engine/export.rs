//! Dumps the rows, monomials and active bounds of the engine as an SMT-LIB snapshot.
use num_traits::Signed;
use num_traits::Zero;
use snapshot_format::Assertion;
use snapshot_format::Snapshot;
use snapshot_format::Sort;

use super::variables::VarSort;
use super::ArithmeticSolver;

impl ArithmeticSolver {
    /// A snapshot equivalent to the current tableau and bounds. A bound whose infinitesimal points
    /// away from the variable (`x >= k - ε`) is written as the non-strict bound on `k`.
    pub fn export_bounds(&self) -> Snapshot {
        let mut snapshot = Snapshot::default();

        for var in self.values.keys() {
            let sort = match self.sorts[var] {
                VarSort::Int => Sort::Int,
                VarSort::Real => Sort::Real,
            };
            snapshot.declare(self.var_name(var), sort);
        }

        for row in self.tableau.row_ids() {
            let row = self.tableau.row(row);
            snapshot.assert(Assertion::Row {
                base: self.var_name(row.base),
                terms: row
                    .sorted_entries()
                    .into_iter()
                    .map(|(var, coeff)| (coeff, self.var_name(var)))
                    .collect(),
            });
        }

        for monomial in self.monomials.iter() {
            snapshot.assert(Assertion::Product {
                var: self.var_name(monomial.var),
                factors: monomial
                    .factors
                    .iter()
                    .map(|&factor| self.var_name(factor))
                    .collect(),
            });
        }

        for var in self.values.keys() {
            let name = self.var_name(var);
            let lower = self.bounds.lower_value(var);
            let upper = self.bounds.upper_value(var);

            if let (Some(lower), Some(upper)) = (lower, upper) {
                if lower == upper && lower.eps().is_zero() {
                    snapshot.assert(Assertion::Fixed {
                        var: name,
                        value: lower.real().clone(),
                    });
                    continue;
                }
            }
            if let Some(lower) = lower {
                snapshot.assert(Assertion::Lower {
                    var: name.clone(),
                    value: lower.real().clone(),
                    strict: lower.eps().is_positive(),
                });
            }
            if let Some(upper) = upper {
                snapshot.assert(Assertion::Upper {
                    var: name,
                    value: upper.real().clone(),
                    strict: upper.eps().is_negative(),
                });
            }
        }

        snapshot
    }
}
