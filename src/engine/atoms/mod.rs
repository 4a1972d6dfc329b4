//! Atoms are the arithmetic facts the boolean engine can see, `var >= k` and `var <= k`. They are
//! interned so that asking twice for the same fact returns the same atom. Assigned literals are
//! kept in arrival order; the ones whose bound has not been installed yet form the delayed
//! suffix of that list and are processed first-in first-out.
use std::fmt::Display;
use std::fmt::Formatter;

use crate::arith_assert_simple;
use crate::basic_types::HashMap;
use crate::basic_types::KeyedVec;
use crate::basic_types::StorageKey;
use crate::engine::bounds::BoundKind;
use crate::engine::variables::ArithVar;
use crate::engine::variables::Literal;
use crate::math::Rational;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) struct AtomId {
    pub(crate) id: u32,
}

impl StorageKey for AtomId {
    fn index(&self) -> usize {
        self.id as usize
    }

    fn create_from_index(index: usize) -> Self {
        AtomId { id: index as u32 }
    }
}

#[derive(Clone, Debug)]
pub(crate) struct Atom {
    pub(crate) var: ArithVar,
    pub(crate) kind: BoundKind,
    pub(crate) threshold: Rational,
    /// The sign the atom was asserted with, if any.
    pub(crate) assignment: Option<bool>,
    /// Whether a literal of this atom has been handed out as a propagation.
    pub(crate) propagated: bool,
}

impl Display for Atom {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {}", self.var, self.kind, self.threshold)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Assignment {
    /// The literal is new and was appended to the delayed queue.
    Queued,
    /// The literal was already true.
    Redundant,
    /// The opposite literal is already true.
    Conflicting,
}

#[derive(Clone, Copy, Debug)]
enum AtomChange {
    Assigned(AtomId),
    Propagated(AtomId),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct AtomMark {
    atoms: usize,
    trail: usize,
    asserted: usize,
    processed: usize,
}

#[derive(Debug, Default)]
pub(crate) struct AtomRegistry {
    atoms: KeyedVec<AtomId, Atom>,
    interned: HashMap<(ArithVar, BoundKind, Rational), AtomId>,
    /// Per variable, its atoms ordered by threshold.
    by_var: KeyedVec<ArithVar, Vec<AtomId>>,
    asserted: Vec<Literal>,
    /// `asserted[processed..]` is the delayed queue.
    processed: usize,
    trail: Vec<AtomChange>,
}

impl AtomRegistry {
    pub(crate) fn grow(&mut self, var: ArithVar) {
        self.by_var.accomodate(var, vec![]);
    }

    pub(crate) fn shrink(&mut self, num_vars: usize) {
        self.by_var.truncate(num_vars);
    }

    pub(crate) fn num_atoms(&self) -> usize {
        self.atoms.len()
    }

    /// Returns the interned atom and whether it was created by this call.
    pub(crate) fn mk_atom(
        &mut self,
        var: ArithVar,
        kind: BoundKind,
        threshold: Rational,
    ) -> (AtomId, bool) {
        if let Some(&atom) = self.interned.get(&(var, kind, threshold.clone())) {
            return (atom, false);
        }

        let atom = self.atoms.push(Atom {
            var,
            kind,
            threshold: threshold.clone(),
            assignment: None,
            propagated: false,
        });
        let _ = self.interned.insert((var, kind, threshold), atom);

        let atoms = &self.atoms;
        let on_var = &mut self.by_var[var];
        let position = on_var.partition_point(|other| {
            (&atoms[*other].threshold, atoms[*other].kind) < (&atoms[atom].threshold, kind)
        });
        on_var.insert(position, atom);

        (atom, true)
    }

    pub(crate) fn get(&self, atom: AtomId) -> Option<&Atom> {
        self.atoms.get(atom)
    }

    pub(crate) fn atoms_on(&self, var: ArithVar) -> &[AtomId] {
        &self.by_var[var]
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (AtomId, &Atom)> + '_ {
        self.atoms.keys().zip(self.atoms.iter())
    }

    pub(crate) fn assign(&mut self, literal: Literal) -> Assignment {
        let atom = literal.atom();
        let sign = literal.is_positive();
        match self.atoms[atom].assignment {
            Some(existing) if existing == sign => Assignment::Redundant,
            Some(_) => Assignment::Conflicting,
            None => {
                self.atoms[atom].assignment = Some(sign);
                self.trail.push(AtomChange::Assigned(atom));
                self.asserted.push(literal);
                Assignment::Queued
            }
        }
    }

    pub(crate) fn mark_propagated(&mut self, atom: AtomId) {
        if !self.atoms[atom].propagated {
            self.atoms[atom].propagated = true;
            self.trail.push(AtomChange::Propagated(atom));
        }
    }

    /// Take the oldest literal whose bound has not been installed.
    pub(crate) fn next_delayed(&mut self) -> Option<Literal> {
        let literal = self.asserted.get(self.processed).copied()?;
        self.processed += 1;
        Some(literal)
    }

    pub(crate) fn asserted(&self) -> &[Literal] {
        &self.asserted
    }

    pub(crate) fn delayed(&self) -> &[Literal] {
        &self.asserted[self.processed..]
    }

    pub(crate) fn mark(&self) -> AtomMark {
        AtomMark {
            atoms: self.atoms.len(),
            trail: self.trail.len(),
            asserted: self.asserted.len(),
            processed: self.processed,
        }
    }

    pub(crate) fn retract_to(&mut self, mark: AtomMark) {
        arith_assert_simple!(mark.trail <= self.trail.len());

        while self.trail.len() > mark.trail {
            match self.trail.pop() {
                Some(AtomChange::Assigned(atom)) => self.atoms[atom].assignment = None,
                Some(AtomChange::Propagated(atom)) => self.atoms[atom].propagated = false,
                None => break,
            }
        }
        self.asserted.truncate(mark.asserted);
        self.processed = mark.processed;

        while self.atoms.len() > mark.atoms {
            let Some(atom) = self.atoms.pop() else {
                break;
            };
            let _ = self
                .interned
                .remove(&(atom.var, atom.kind, atom.threshold.clone()));
            if atom.var.index() < self.by_var.len() {
                let limit = mark.atoms as u32;
                self.by_var[atom.var].retain(|other| other.id < limit);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::rational;

    fn registry_with_vars(num_vars: u32) -> AtomRegistry {
        let mut registry = AtomRegistry::default();
        for var in 0..num_vars {
            registry.grow(ArithVar::new(var));
        }
        registry
    }

    #[test]
    fn atoms_are_interned() {
        let mut registry = registry_with_vars(1);
        let x = ArithVar::new(0);

        let (first, created) = registry.mk_atom(x, BoundKind::Lower, rational(3));
        let (second, created_again) = registry.mk_atom(x, BoundKind::Lower, rational(3));
        let (other, _) = registry.mk_atom(x, BoundKind::Upper, rational(3));

        assert!(created);
        assert!(!created_again);
        assert_eq!(first, second);
        assert_ne!(first, other);
    }

    #[test]
    fn atoms_on_a_variable_are_ordered_by_threshold() {
        let mut registry = registry_with_vars(1);
        let x = ArithVar::new(0);

        let (five, _) = registry.mk_atom(x, BoundKind::Lower, rational(5));
        let (one, _) = registry.mk_atom(x, BoundKind::Upper, rational(1));
        let (three, _) = registry.mk_atom(x, BoundKind::Lower, rational(3));

        assert_eq!(&[one, three, five], registry.atoms_on(x));
    }

    #[test]
    fn delayed_literals_come_out_in_arrival_order() {
        let mut registry = registry_with_vars(1);
        let x = ArithVar::new(0);
        let literals = (0..3)
            .map(|k| Literal::new(registry.mk_atom(x, BoundKind::Lower, rational(k)).0, true))
            .collect::<Vec<_>>();

        for &literal in literals.iter().rev() {
            assert_eq!(Assignment::Queued, registry.assign(literal));
        }

        let drained = std::iter::from_fn(|| registry.next_delayed()).collect::<Vec<_>>();
        assert_eq!(literals.into_iter().rev().collect::<Vec<_>>(), drained);
    }

    #[test]
    fn opposite_assignments_conflict() {
        let mut registry = registry_with_vars(1);
        let (atom, _) = registry.mk_atom(ArithVar::new(0), BoundKind::Upper, rational(0));
        let literal = Literal::new(atom, true);

        assert_eq!(Assignment::Queued, registry.assign(literal));
        assert_eq!(Assignment::Redundant, registry.assign(literal));
        assert_eq!(Assignment::Conflicting, registry.assign(!literal));
    }

    #[test]
    fn retracting_restores_assignments_queue_and_atoms() {
        let mut registry = registry_with_vars(1);
        let x = ArithVar::new(0);
        let (kept, _) = registry.mk_atom(x, BoundKind::Lower, rational(0));
        let _ = registry.assign(Literal::new(kept, true));
        let mark = registry.mark();

        let _ = registry.next_delayed();
        let (dropped, _) = registry.mk_atom(x, BoundKind::Lower, rational(1));
        let _ = registry.assign(Literal::new(dropped, false));
        registry.mark_propagated(kept);
        registry.retract_to(mark);

        assert_eq!(1, registry.num_atoms());
        assert_eq!(&[kept], registry.atoms_on(x));
        assert_eq!(&[Literal::new(kept, true)], registry.delayed());
        assert!(!registry.get(kept).is_some_and(|atom| atom.propagated));
        let (recreated, created) = registry.mk_atom(x, BoundKind::Lower, rational(1));
        assert!(created);
        assert_eq!(dropped, recreated);
    }
}
