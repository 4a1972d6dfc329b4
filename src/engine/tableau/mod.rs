//! The sparse tableau. Rows and columns index each other: every live row entry knows the
//! position of its paired column entry and vice versa. Deleting an entry leaves a tombstone which
//! is squashed out once a row or column holds more dead than live slots (scaled by the configured
//! ratio).
//!
//! Every structural change made while [`Tableau::set_recording`] is on is written to a trail, and
//! [`Tableau::undo_to`] replays the inverse operations. A pivot is undone by pivoting the same row
//! on the variable which left it, which restores every row exactly.
mod column;
mod row;

pub(crate) use column::Column;
pub(crate) use column::ColumnEntry;
pub(crate) use row::Row;
pub(crate) use row::RowEntry;
pub use row::RowId;

use num_traits::One;
use num_traits::Zero;

use crate::arith_assert_eq_simple;
use crate::arith_assert_moderate;
use crate::arith_assert_simple;
use crate::basic_types::HashMap;
use crate::basic_types::KeyedVec;
use crate::engine::variables::ArithVar;
use crate::engine::variables::VarKind;
use crate::math::Rational;

#[derive(Clone, Debug)]
enum TableauChange {
    AddRow(RowId),
    Pivot { row: RowId, leaving: ArithVar },
    Normalize {
        row: RowId,
        entries: Vec<(ArithVar, Rational)>,
    },
}

#[derive(Debug)]
pub(crate) struct Tableau {
    rows: KeyedVec<RowId, Row>,
    columns: KeyedVec<ArithVar, Column>,
    base_row: KeyedVec<ArithVar, Option<RowId>>,
    trail: Vec<TableauChange>,
    recording: bool,
    /// Compact once `dead * 100 > dead_entry_ratio * live`.
    dead_entry_ratio: usize,
    pub(crate) num_pivots: u64,
    pub(crate) max_rows: usize,
    pub(crate) max_columns: usize,
}

impl Tableau {
    pub(crate) fn new(dead_entry_ratio: usize) -> Tableau {
        Tableau {
            rows: KeyedVec::default(),
            columns: KeyedVec::default(),
            base_row: KeyedVec::default(),
            trail: vec![],
            recording: false,
            dead_entry_ratio,
            num_pivots: 0,
            max_rows: 0,
            max_columns: 0,
        }
    }

    pub(crate) fn add_var(&mut self) {
        let _ = self.columns.push(Column::default());
        let _ = self.base_row.push(None);
        self.max_columns = self.max_columns.max(self.columns.len());
    }

    /// Forget every variable from `num_vars` on. None of them may still occur in a row.
    pub(crate) fn truncate_vars(&mut self, num_vars: usize) {
        arith_assert_simple!(self
            .columns
            .iter()
            .skip(num_vars)
            .all(|column| column.size() == 0));
        self.columns.truncate(num_vars);
        self.base_row.truncate(num_vars);
    }

    pub(crate) fn num_rows(&self) -> usize {
        self.rows.len()
    }

    pub(crate) fn row_ids(&self) -> impl Iterator<Item = RowId> {
        self.rows.keys()
    }

    pub(crate) fn row(&self, row: RowId) -> &Row {
        &self.rows[row]
    }

    pub(crate) fn column(&self, var: ArithVar) -> &Column {
        &self.columns[var]
    }

    pub(crate) fn base_row(&self, var: ArithVar) -> Option<RowId> {
        self.base_row[var]
    }

    pub(crate) fn kind(&self, var: ArithVar) -> VarKind {
        match self.base_row[var] {
            Some(row) if self.rows[row].quasi => VarKind::QuasiBase,
            Some(_) => VarKind::Base,
            None => VarKind::NonBase,
        }
    }

    /// A variable can head a new row if it has no row and occurs in none.
    pub(crate) fn is_fresh(&self, var: ArithVar) -> bool {
        self.base_row[var].is_none() && self.columns[var].size() == 0
    }

    pub(crate) fn set_recording(&mut self, recording: bool) {
        self.recording = recording;
    }

    pub(crate) fn trail_len(&self) -> usize {
        self.trail.len()
    }

    /// Add `base = Σ coeff * var`. Duplicate variables are merged and zero coefficients dropped.
    /// A quasi row may mention the bases of other rows until it is normalized.
    pub(crate) fn add_row(
        &mut self,
        base: ArithVar,
        entries: impl IntoIterator<Item = (ArithVar, Rational)>,
        quasi: bool,
    ) -> RowId {
        arith_assert_simple!(self.is_fresh(base), "the base of a new row must be fresh");

        let mut merged: Vec<(ArithVar, Rational)> = vec![];
        for (var, coeff) in entries {
            arith_assert_simple!(var != base, "a row cannot mention its own base");
            match merged.iter_mut().find(|(existing, _)| *existing == var) {
                Some((_, existing)) => *existing += coeff,
                None => merged.push((var, coeff)),
            }
        }

        let row = self.rows.push(Row::new(base, quasi));
        for (var, coeff) in merged {
            if !coeff.is_zero() {
                self.insert_entry(row, var, coeff);
            }
        }
        self.base_row[base] = Some(row);
        self.max_rows = self.max_rows.max(self.rows.len());

        if self.recording {
            self.trail.push(TableauChange::AddRow(row));
        }

        row
    }

    /// Substitute away every base variable mentioned by a quasi row, putting it in reduced form.
    /// Returns whether any entry changed.
    pub(crate) fn normalize(&mut self, row: RowId) -> bool {
        if !self.rows[row].quasi {
            return false;
        }

        let original = self.rows[row].sorted_entries();
        let mut changed = false;

        loop {
            let found = self.rows[row].iter().find_map(|(index, entry)| {
                self.base_row[entry.var]
                    .filter(|source| *source != row)
                    .map(|source| (index, source))
            });
            let Some((index, source)) = found else {
                break;
            };
            self.substitute(row, index, source);
            changed = true;
        }

        self.rows[row].quasi = false;
        if self.recording {
            self.trail.push(TableauChange::Normalize {
                row,
                entries: original,
            });
        }

        changed
    }

    /// Exchange the base of `row` with `entering`, rewriting every other row mentioning
    /// `entering` so the tableau stays in reduced form.
    pub(crate) fn pivot(&mut self, row: RowId, entering: ArithVar) {
        let leaving = self.rows[row].base;
        self.pivot_row(row, entering);
        self.num_pivots += 1;

        if self.recording {
            self.trail.push(TableauChange::Pivot { row, leaving });
        }
    }

    /// Undo every change after trail position `len`, most recent first.
    pub(crate) fn undo_to(&mut self, len: usize) {
        while self.trail.len() > len {
            let Some(change) = self.trail.pop() else {
                break;
            };
            match change {
                TableauChange::AddRow(row) => self.remove_last_row(row),
                TableauChange::Pivot { row, leaving } => self.pivot_row(row, leaving),
                TableauChange::Normalize { row, entries } => self.replace_entries(row, entries),
            }
        }
    }

    fn pivot_row(&mut self, row: RowId, entering: ArithVar) {
        arith_assert_moderate!(
            !self.rows.iter().any(|row| row.quasi),
            "pivoting requires every row to be normalized"
        );

        let Some(index) = self.rows[row].position_of(entering) else {
            panic!("cannot pivot {row} on {entering}: the variable does not occur in the row");
        };
        let leaving = self.rows[row].base;

        // base = a * entering + rest  becomes  entering = (1/a) * base - rest / a
        let coeff = self.remove_entry(row, index);
        arith_assert_simple!(!coeff.is_zero());
        let inverse = Rational::one() / coeff;
        let negated_inverse = -&inverse;
        for entry in self.rows[row].entries.iter_mut().flatten() {
            entry.coeff *= &negated_inverse;
        }
        self.insert_entry(row, leaving, inverse);

        self.rows[row].base = entering;
        self.base_row[leaving] = None;
        self.base_row[entering] = Some(row);

        let targets = self.columns[entering]
            .iter()
            .map(|(_, entry)| (entry.row, entry.row_index))
            .collect::<Vec<_>>();
        for (target, index) in targets {
            arith_assert_simple!(target != row);
            self.substitute(target, index, row);
        }
    }

    /// Replace the variable at `index` in `target` by the right hand side of `source`, whose base
    /// it is.
    fn substitute(&mut self, target: RowId, index: usize, source: RowId) {
        let factor = self.remove_entry(target, index);
        let source_entries = self.rows[source]
            .iter()
            .map(|(_, entry)| (entry.var, entry.coeff.clone()))
            .collect::<Vec<_>>();

        let mut positions: HashMap<ArithVar, usize> = self.rows[target]
            .iter()
            .map(|(index, entry)| (entry.var, index))
            .collect();

        for (var, coeff) in source_entries {
            let delta = &factor * &coeff;
            match positions.get(&var).copied() {
                Some(position) => {
                    let cancelled = match self.rows[target].entries[position].as_mut() {
                        Some(entry) => {
                            entry.coeff += &delta;
                            entry.coeff.is_zero()
                        }
                        None => unreachable!("positions only holds live entries"),
                    };
                    if cancelled {
                        let _ = self.remove_entry(target, position);
                        let _ = positions.remove(&var);
                    }
                }
                None => {
                    arith_assert_simple!(var != self.rows[target].base);
                    let position = self.insert_entry(target, var, delta);
                    let _ = positions.insert(var, position);
                }
            }
        }

        self.compact_row_if_sparse(target);
    }

    fn insert_entry(&mut self, row: RowId, var: ArithVar, coeff: Rational) -> usize {
        let row_index = self.rows[row].insert(RowEntry {
            var,
            coeff,
            column_index: 0,
        });
        let column_index = self.columns[var].insert(ColumnEntry { row, row_index });
        if let Some(entry) = self.rows[row].entries[row_index].as_mut() {
            entry.column_index = column_index;
        }
        row_index
    }

    /// Kill the entry at `index` of `row` together with its column entry. Returns the coefficient.
    fn remove_entry(&mut self, row: RowId, index: usize) -> Rational {
        let Some(entry) = self.rows[row].kill(index) else {
            panic!("entry {index} of {row} is already dead");
        };
        self.columns[entry.var].kill(entry.column_index);
        self.compact_column_if_sparse(entry.var);
        entry.coeff
    }

    fn is_sparse(&self, live: usize, dead: usize) -> bool {
        dead > 4 && dead * 100 > self.dead_entry_ratio * live
    }

    fn compact_row_if_sparse(&mut self, row: RowId) {
        if !self.is_sparse(self.rows[row].size(), self.rows[row].num_dead()) {
            return;
        }

        for (old, new) in self.rows[row].compact() {
            arith_assert_simple!(new <= old);
            let Some(entry) = self.rows[row].entries[new].as_ref() else {
                continue;
            };
            let (var, column_index) = (entry.var, entry.column_index);
            if let Some(column_entry) = self.columns[var].entries[column_index].as_mut() {
                column_entry.row_index = new;
            }
        }
    }

    fn compact_column_if_sparse(&mut self, var: ArithVar) {
        if !self.is_sparse(self.columns[var].size(), self.columns[var].num_dead()) {
            return;
        }

        for (_, new) in self.columns[var].compact() {
            let Some(entry) = self.columns[var].entries[new] else {
                continue;
            };
            if let Some(row_entry) = self.rows[entry.row].entries[entry.row_index].as_mut() {
                row_entry.column_index = new;
            }
        }
    }

    fn remove_last_row(&mut self, row: RowId) {
        arith_assert_eq_simple!(Some(row.id as usize), self.rows.len().checked_sub(1));

        let live = self.rows[row]
            .iter()
            .map(|(index, _)| index)
            .collect::<Vec<_>>();
        for index in live {
            let _ = self.remove_entry(row, index);
        }

        let base = self.rows[row].base;
        self.base_row[base] = None;
        let _ = self.rows.pop();
    }

    fn replace_entries(&mut self, row: RowId, entries: Vec<(ArithVar, Rational)>) {
        let live = self.rows[row]
            .iter()
            .map(|(index, _)| index)
            .collect::<Vec<_>>();
        for index in live {
            let _ = self.remove_entry(row, index);
        }
        for (var, coeff) in entries {
            let _ = self.insert_entry(row, var, coeff);
        }
        self.rows[row].quasi = true;
    }

    /// Check that rows and columns mirror each other and that normalized rows are in reduced
    /// form.
    pub(crate) fn is_consistent(&self) -> bool {
        for row_id in self.rows.keys() {
            let row = &self.rows[row_id];
            if self.base_row[row.base] != Some(row_id) {
                return false;
            }
            for (index, entry) in row.iter() {
                let paired = self.columns[entry.var].entries[entry.column_index];
                if paired != Some(ColumnEntry {
                    row: row_id,
                    row_index: index,
                }) {
                    return false;
                }
                if entry.coeff.is_zero() {
                    return false;
                }
                if !row.quasi && self.base_row[entry.var].is_some() {
                    return false;
                }
            }
        }

        self.columns.keys().all(|var| {
            self.columns[var].iter().all(|(index, entry)| {
                self.rows
                    .get(entry.row)
                    .and_then(|row| row.entries.get(entry.row_index))
                    .and_then(Option::as_ref)
                    .is_some_and(|row_entry| row_entry.var == var && row_entry.column_index == index)
            })
        })
    }
}
