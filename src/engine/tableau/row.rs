use std::fmt::Display;
use std::fmt::Formatter;

use crate::basic_types::StorageKey;
use crate::engine::variables::ArithVar;
use crate::math::Rational;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RowId {
    pub id: u32,
}

impl StorageKey for RowId {
    fn index(&self) -> usize {
        self.id as usize
    }

    fn create_from_index(index: usize) -> Self {
        RowId { id: index as u32 }
    }
}

impl Display for RowId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "r{}", self.id)
    }
}

#[derive(Clone, Debug)]
pub(crate) struct RowEntry {
    pub(crate) var: ArithVar,
    pub(crate) coeff: Rational,
    /// Position of the paired entry in the column of `var`.
    pub(crate) column_index: usize,
}

/// The equation `base = Σ coeff * var` over the live entries. Dead entries are tombstones whose
/// slots are reused before the vector grows.
#[derive(Clone, Debug)]
pub(crate) struct Row {
    pub(crate) base: ArithVar,
    pub(crate) entries: Vec<Option<RowEntry>>,
    free: Vec<usize>,
    size: usize,
    pub(crate) quasi: bool,
}

impl Row {
    pub(crate) fn new(base: ArithVar, quasi: bool) -> Row {
        Row {
            base,
            entries: vec![],
            free: vec![],
            size: 0,
            quasi,
        }
    }

    /// The number of live entries.
    pub(crate) fn size(&self) -> usize {
        self.size
    }

    pub(crate) fn num_dead(&self) -> usize {
        self.entries.len() - self.size
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (usize, &RowEntry)> + '_ {
        self.entries
            .iter()
            .enumerate()
            .filter_map(|(index, entry)| entry.as_ref().map(|entry| (index, entry)))
    }

    /// The live entries as `(var, coeff)` pairs sorted by variable.
    pub(crate) fn sorted_entries(&self) -> Vec<(ArithVar, Rational)> {
        let mut entries = self
            .iter()
            .map(|(_, entry)| (entry.var, entry.coeff.clone()))
            .collect::<Vec<_>>();
        entries.sort_by_key(|(var, _)| *var);
        entries
    }

    pub(crate) fn position_of(&self, var: ArithVar) -> Option<usize> {
        self.iter()
            .find(|(_, entry)| entry.var == var)
            .map(|(index, _)| index)
    }

    pub(crate) fn coefficient_of(&self, var: ArithVar) -> Option<&Rational> {
        self.iter()
            .find(|(_, entry)| entry.var == var)
            .map(|(_, entry)| &entry.coeff)
    }

    pub(crate) fn insert(&mut self, entry: RowEntry) -> usize {
        self.size += 1;
        match self.free.pop() {
            Some(index) => {
                self.entries[index] = Some(entry);
                index
            }
            None => {
                self.entries.push(Some(entry));
                self.entries.len() - 1
            }
        }
    }

    pub(crate) fn kill(&mut self, index: usize) -> Option<RowEntry> {
        let entry = self.entries[index].take()?;
        self.size -= 1;
        self.free.push(index);
        Some(entry)
    }

    /// Squash out the tombstones. Returns the old and new position of every live entry.
    pub(crate) fn compact(&mut self) -> Vec<(usize, usize)> {
        let mut moves = vec![];
        let mut compacted = Vec::with_capacity(self.size);
        for (index, entry) in std::mem::take(&mut self.entries).into_iter().enumerate() {
            if let Some(entry) = entry {
                moves.push((index, compacted.len()));
                compacted.push(Some(entry));
            }
        }
        self.entries = compacted;
        self.free.clear();
        moves
    }
}
