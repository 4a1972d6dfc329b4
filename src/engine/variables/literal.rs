use std::fmt::Display;
use std::fmt::Formatter;

use bitfield::bitfield;

use crate::engine::atoms::AtomId;

bitfield! {
    /// A signed reference to an atom: bit 0 holds the sign, the remaining bits the atom index.
    #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    pub struct Literal(u32);
    impl Debug;
    pub is_negative, set_negative: 0;
    u32, code, set_code: 31, 1;
}

impl Literal {
    pub(crate) fn new(atom: AtomId, is_positive: bool) -> Literal {
        let mut literal = Literal(0);
        literal.set_code(atom.id);
        literal.set_negative(!is_positive);
        literal
    }

    pub fn is_positive(&self) -> bool {
        !self.is_negative()
    }

    pub(crate) fn atom(&self) -> AtomId {
        AtomId { id: self.code() }
    }
}

impl std::ops::Not for Literal {
    type Output = Literal;

    fn not(self) -> Self::Output {
        let mut negated = self;
        negated.set_negative(!self.is_negative());
        negated
    }
}

impl Display for Literal {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.is_negative() {
            write!(f, "~a{}", self.code())
        } else {
            write!(f, "a{}", self.code())
        }
    }
}
