use std::cmp::Reverse;

use crate::branching::SelectionContext;
use crate::branching::variable_selection::VariableSelector;
use crate::engine::variables::ArithVar;

/// A [`VariableSelector`] which prefers relevant candidates, then the candidate whose value is
/// furthest from an integer, then the smallest id.
#[derive(Clone, Copy, Debug, Default)]
pub struct MostFractional;

impl VariableSelector for MostFractional {
    fn select_variable(&mut self, context: &SelectionContext) -> Option<ArithVar> {
        context
            .candidates()
            .min_by_key(|candidate| {
                (
                    !candidate.relevant,
                    Reverse(candidate.distance_to_integer()),
                    candidate.var,
                )
            })
            .map(|candidate| candidate.var)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::branching::BranchCandidate;
    use crate::math::ratio;
    use crate::math::InfRational;
    use crate::math::Rational;

    fn candidate(id: u32, value: Rational, relevant: bool) -> BranchCandidate {
        BranchCandidate {
            var: ArithVar::new(id),
            value: InfRational::from(value),
            relevant,
        }
    }

    #[test]
    fn the_most_fractional_candidate_is_selected() {
        let candidates = [
            candidate(0, ratio(1, 4), true),
            candidate(1, ratio(5, 2), true),
            candidate(2, ratio(2, 3), true),
        ];

        let selected = MostFractional.select_variable(&SelectionContext::new(&candidates));
        assert_eq!(Some(ArithVar::new(1)), selected);
    }

    #[test]
    fn ties_go_to_the_smallest_variable() {
        let candidates = [candidate(4, ratio(1, 2), true), candidate(2, ratio(3, 2), true)];

        let selected = MostFractional.select_variable(&SelectionContext::new(&candidates));
        assert_eq!(Some(ArithVar::new(2)), selected);
    }

    #[test]
    fn relevant_candidates_come_first() {
        let candidates = [candidate(0, ratio(1, 2), false), candidate(1, ratio(1, 10), true)];

        let selected = MostFractional.select_variable(&SelectionContext::new(&candidates));
        assert_eq!(Some(ArithVar::new(1)), selected);
    }
}
