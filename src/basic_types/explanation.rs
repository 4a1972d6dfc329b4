use std::fmt::Display;
use std::fmt::Formatter;

use crate::engine::variables::ArithVar;
use crate::engine::variables::Literal;

/// A flattened justification: the literals and variable equalities which together force a
/// propagation or a conflict. Both lists are sorted and free of duplicates.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Explanation {
    pub literals: Vec<Literal>,
    pub equalities: Vec<(ArithVar, ArithVar)>,
}

impl Explanation {
    pub fn is_empty(&self) -> bool {
        self.literals.is_empty() && self.equalities.is_empty()
    }

    pub fn contains(&self, literal: Literal) -> bool {
        self.literals.binary_search(&literal).is_ok()
    }

    /// Combine two explanations, dropping the literals in `resolved`.
    pub fn resolve(mut self, other: Explanation, resolved: &[Literal]) -> Explanation {
        self.literals.extend(other.literals);
        self.literals.retain(|literal| !resolved.contains(literal));
        self.literals.sort();
        self.literals.dedup();

        self.equalities.extend(other.equalities);
        self.equalities.sort();
        self.equalities.dedup();

        self
    }
}

impl Display for Explanation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{{")?;
        let mut first = true;
        for literal in &self.literals {
            if !first {
                write!(f, ", ")?;
            }
            first = false;
            write!(f, "{literal}")?;
        }
        for (left, right) in &self.equalities {
            if !first {
                write!(f, ", ")?;
            }
            first = false;
            write!(f, "{left} = {right}")?;
        }
        write!(f, "}}")
    }
}
