use num_traits::One;

use crate::engine::variables::ArithVar;
use crate::math::fractional_part;
use crate::math::InfRational;
use crate::math::Rational;

/// An integer variable whose current value is not integral.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BranchCandidate {
    pub var: ArithVar,
    pub value: InfRational,
    /// Whether the term layer considers the variable part of the active search.
    pub relevant: bool,
}

impl BranchCandidate {
    /// The distance from the value to the nearest integer, ignoring the infinitesimal part.
    pub fn distance_to_integer(&self) -> Rational {
        let fraction = fractional_part(self.value.real());
        let remainder = Rational::one() - &fraction;
        fraction.min(remainder)
    }
}

/// The view a [`crate::branching::variable_selection::VariableSelector`] gets of the engine.
#[derive(Clone, Copy, Debug)]
pub struct SelectionContext<'a> {
    candidates: &'a [BranchCandidate],
}

impl<'a> SelectionContext<'a> {
    pub fn new(candidates: &'a [BranchCandidate]) -> SelectionContext<'a> {
        SelectionContext { candidates }
    }

    /// The candidates ordered by variable.
    pub fn candidates(&self) -> impl Iterator<Item = &'a BranchCandidate> + 'a {
        self.candidates.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::ratio;
    use crate::math::rational;

    #[test]
    fn distance_is_measured_to_the_nearest_integer() {
        let candidate = |real: Rational| BranchCandidate {
            var: ArithVar::new(0),
            value: InfRational::from(real),
            relevant: true,
        };

        assert_eq!(ratio(1, 4), candidate(ratio(7, 4)).distance_to_integer());
        assert_eq!(ratio(1, 3), candidate(ratio(-4, 3)).distance_to_integer());
        assert_eq!(rational(0), candidate(rational(3)).distance_to_integer());
    }
}
