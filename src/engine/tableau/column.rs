use super::RowId;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct ColumnEntry {
    pub(crate) row: RowId,
    /// Position of the paired entry in `row`.
    pub(crate) row_index: usize,
}

/// The rows a variable occurs in, with the same tombstone scheme as a row.
#[derive(Clone, Debug, Default)]
pub(crate) struct Column {
    pub(crate) entries: Vec<Option<ColumnEntry>>,
    free: Vec<usize>,
    size: usize,
}

impl Column {
    pub(crate) fn size(&self) -> usize {
        self.size
    }

    pub(crate) fn num_dead(&self) -> usize {
        self.entries.len() - self.size
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (usize, &ColumnEntry)> + '_ {
        self.entries
            .iter()
            .enumerate()
            .filter_map(|(index, entry)| entry.as_ref().map(|entry| (index, entry)))
    }

    pub(crate) fn insert(&mut self, entry: ColumnEntry) -> usize {
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

    pub(crate) fn kill(&mut self, index: usize) {
        if self.entries[index].take().is_some() {
            self.size -= 1;
            self.free.push(index);
        }
    }

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
