use crate::engine::variables::TermId;

/// The engine's view of the term layer. Answers only influence diagnostic output, which fixed
/// variables are reported as equal, and the order in which branching candidates are considered.
pub trait TermOracle {
    /// Whether the term is shared with another theory.
    fn is_shared(&self, term: TermId) -> bool;

    /// Whether the term is part of the active search.
    fn is_relevant(&self, term: TermId) -> bool;

    /// A human-readable name for the term.
    fn name(&self, _term: TermId) -> Option<String> {
        None
    }
}

/// The oracle used when no term layer is attached: nothing is shared and everything is relevant.
#[derive(Clone, Copy, Debug, Default)]
pub struct DetachedTerms;

impl TermOracle for DetachedTerms {
    fn is_shared(&self, _term: TermId) -> bool {
        false
    }

    fn is_relevant(&self, _term: TermId) -> bool {
        true
    }
}
