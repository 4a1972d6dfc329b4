use std::fmt::Display;
use std::fmt::Formatter;

use crate::basic_types::StorageKey;

/// A handle to an arithmetic variable. Handles are dense, start at zero, and are only reused after
/// the scope that created them has been popped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ArithVar {
    pub id: u32,
}

impl ArithVar {
    pub fn new(id: u32) -> ArithVar {
        ArithVar { id }
    }
}

impl StorageKey for ArithVar {
    fn index(&self) -> usize {
        self.id as usize
    }

    fn create_from_index(index: usize) -> Self {
        ArithVar { id: index as u32 }
    }
}

impl Display for ArithVar {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "v{}", self.id)
    }
}

/// An opaque identifier of the term a variable stands for, owned by the term layer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TermId(pub u32);

impl TermId {
    /// Stands for variables the engine introduces itself, such as cut slacks. The term layer is
    /// never asked about it.
    pub const INTERNAL: TermId = TermId(u32::MAX);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VarSort {
    Int,
    Real,
}

impl VarSort {
    pub fn is_int(self) -> bool {
        matches!(self, VarSort::Int)
    }
}

/// The role of a variable in the tableau.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum VarKind {
    /// Heads a row which is in reduced form.
    Base,
    /// Heads a row which may still mention other base variables; the row is normalized before the
    /// simplex loop looks at it.
    QuasiBase,
    NonBase,
}
