//! Justifications are stored as an arena of immutable nodes. A node either names a literal, names
//! an equality between two variables, or joins two earlier nodes. Since a join can only refer to
//! nodes which already exist, the graph is acyclic.
use std::fmt::Display;
use std::fmt::Formatter;

use crate::arith_assert_moderate;
use crate::basic_types::Explanation;
use crate::basic_types::HashSet;
use crate::engine::variables::ArithVar;
use crate::engine::variables::Literal;

/// A handle to a justification node. [`DependencyId::EMPTY`] justifies facts which hold
/// unconditionally.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) struct DependencyId(u32);

impl DependencyId {
    pub(crate) const EMPTY: DependencyId = DependencyId(u32::MAX);

    pub(crate) fn is_empty(self) -> bool {
        self == DependencyId::EMPTY
    }
}

impl Display for DependencyId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            write!(f, "d-")
        } else {
            write!(f, "d{}", self.0)
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum DependencyNode {
    Literal(Literal),
    Equality(ArithVar, ArithVar),
    Join(DependencyId, DependencyId),
}

#[derive(Debug, Default)]
pub(crate) struct DependencyManager {
    nodes: Vec<DependencyNode>,
}

impl DependencyManager {
    pub(crate) fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Drop every node created after the arena had `len` nodes.
    pub(crate) fn truncate(&mut self, len: usize) {
        self.nodes.truncate(len);
    }

    pub(crate) fn mk_literal(&mut self, literal: Literal) -> DependencyId {
        self.push(DependencyNode::Literal(literal))
    }

    pub(crate) fn mk_equality(&mut self, left: ArithVar, right: ArithVar) -> DependencyId {
        let (left, right) = if left <= right {
            (left, right)
        } else {
            (right, left)
        };
        self.push(DependencyNode::Equality(left, right))
    }

    pub(crate) fn join(&mut self, left: DependencyId, right: DependencyId) -> DependencyId {
        if left.is_empty() {
            return right;
        }
        if right.is_empty() || left == right {
            return left;
        }

        arith_assert_moderate!(
            (left.0 as usize) < self.nodes.len() && (right.0 as usize) < self.nodes.len(),
            "a join may only refer to existing nodes"
        );
        self.push(DependencyNode::Join(left, right))
    }

    pub(crate) fn join_all(
        &mut self,
        dependencies: impl IntoIterator<Item = DependencyId>,
    ) -> DependencyId {
        dependencies
            .into_iter()
            .fold(DependencyId::EMPTY, |acc, dependency| self.join(acc, dependency))
    }

    /// Flatten a justification into its literals and equalities. Shared sub-graphs are visited
    /// once.
    pub(crate) fn linearize(&self, dependency: DependencyId) -> Explanation {
        let mut explanation = Explanation::default();
        if dependency.is_empty() {
            return explanation;
        }

        let mut visited: HashSet<DependencyId> = HashSet::default();
        let mut stack = vec![dependency];

        while let Some(current) = stack.pop() {
            if current.is_empty() || !visited.insert(current) {
                continue;
            }

            match self.nodes[current.0 as usize] {
                DependencyNode::Literal(literal) => explanation.literals.push(literal),
                DependencyNode::Equality(left, right) => {
                    explanation.equalities.push((left, right))
                }
                DependencyNode::Join(left, right) => {
                    stack.push(right);
                    stack.push(left);
                }
            }
        }

        explanation.literals.sort();
        explanation.literals.dedup();
        explanation.equalities.sort();
        explanation.equalities.dedup();

        explanation
    }

    fn push(&mut self, node: DependencyNode) -> DependencyId {
        self.nodes.push(node);
        DependencyId((self.nodes.len() - 1) as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::atoms::AtomId;

    fn literal(id: u32) -> Literal {
        Literal::new(AtomId { id }, true)
    }

    #[test]
    fn joining_with_empty_returns_the_other_side() {
        let mut manager = DependencyManager::default();
        let leaf = manager.mk_literal(literal(0));

        assert_eq!(leaf, manager.join(DependencyId::EMPTY, leaf));
        assert_eq!(leaf, manager.join(leaf, DependencyId::EMPTY));
        assert_eq!(1, manager.num_nodes());
    }

    #[test]
    fn linearize_collects_sorted_unique_antecedents() {
        let mut manager = DependencyManager::default();
        let a = manager.mk_literal(literal(3));
        let b = manager.mk_literal(literal(1));
        let eq = manager.mk_equality(ArithVar::new(5), ArithVar::new(2));
        let ab = manager.join(a, b);
        let abb = manager.join(ab, b);
        let all = manager.join(abb, eq);

        let explanation = manager.linearize(all);

        assert_eq!(vec![literal(1), literal(3)], explanation.literals);
        assert_eq!(
            vec![(ArithVar::new(2), ArithVar::new(5))],
            explanation.equalities
        );
    }

    #[test]
    fn deep_sharing_does_not_blow_up() {
        let mut manager = DependencyManager::default();
        let mut current = manager.mk_literal(literal(0));
        for index in 1..64 {
            let next = manager.mk_literal(literal(index));
            let left = manager.join(current, next);
            let right = manager.join(next, current);
            current = manager.join(left, right);
        }

        let explanation = manager.linearize(current);
        assert_eq!(64, explanation.literals.len());
    }

    #[test]
    fn truncation_forgets_newer_nodes() {
        let mut manager = DependencyManager::default();
        let _ = manager.mk_literal(literal(0));
        let mark = manager.num_nodes();
        let _ = manager.mk_literal(literal(1));

        manager.truncate(mark);
        assert_eq!(1, manager.num_nodes());
    }
}
