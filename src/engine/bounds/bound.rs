use std::fmt::Display;
use std::fmt::Formatter;

use crate::engine::dependencies::DependencyId;
use crate::engine::variables::ArithVar;
use crate::engine::variables::Literal;
use crate::math::InfRational;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BoundKind {
    Lower,
    Upper,
}

impl BoundKind {
    pub fn opposite(self) -> BoundKind {
        match self {
            BoundKind::Lower => BoundKind::Upper,
            BoundKind::Upper => BoundKind::Lower,
        }
    }
}

impl Display for BoundKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            BoundKind::Lower => write!(f, ">="),
            BoundKind::Upper => write!(f, "<="),
        }
    }
}

/// Why a bound was installed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum BoundOrigin {
    /// Part of the problem; justified by nothing.
    Axiom,
    /// An asserted atom.
    Atom(Literal),
    /// Implied by a row, by interval reasoning or by the basis step.
    Derived,
    /// The lower bound on the slack of a cutting plane.
    Cut,
}

#[derive(Clone, Debug)]
pub(crate) struct Bound {
    pub(crate) var: ArithVar,
    pub(crate) kind: BoundKind,
    pub(crate) value: InfRational,
    pub(crate) dependency: DependencyId,
    pub(crate) origin: BoundOrigin,
}

impl Display for Bound {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {}", self.var, self.kind, self.value)
    }
}
