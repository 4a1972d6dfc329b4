//! The bound store keeps, per variable, the tightest lower and upper bound currently in force.
//! Every installation attempt is recorded on a trail so that [`BoundStore::retract_to`] can undo
//! them in strict reverse order.
mod bound;

pub use bound::BoundKind;
pub(crate) use bound::Bound;
pub(crate) use bound::BoundOrigin;

use crate::arith_assert_simple;
use crate::basic_types::KeyedVec;
use crate::engine::dependencies::DependencyId;
use crate::engine::variables::ArithVar;
use crate::math::InfRational;

/// Handle to an installed bound record.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct BoundId(u32);

/// The result of [`BoundStore::assert_bound`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum BoundUpdate {
    /// The new bound is strictly tighter and is now active.
    Tightened,
    /// The active bound was at least as tight; nothing changed.
    Unchanged,
    /// The new bound crosses the active opposite bound, whose justification is returned. The
    /// store is left untouched.
    Conflict(DependencyId),
}

#[derive(Clone, Copy, Debug)]
struct TrailEntry {
    var: ArithVar,
    kind: BoundKind,
    previous: Option<BoundId>,
}

/// A position on the bound trail to retract to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct BoundMark {
    trail: usize,
    records: usize,
}

#[derive(Debug, Default)]
pub(crate) struct BoundStore {
    records: Vec<Bound>,
    lower: KeyedVec<ArithVar, Option<BoundId>>,
    upper: KeyedVec<ArithVar, Option<BoundId>>,
    trail: Vec<TrailEntry>,
}

impl BoundStore {
    pub(crate) fn grow(&mut self, var: ArithVar) {
        self.lower.accomodate(var, None);
        self.upper.accomodate(var, None);
    }

    /// Forget the slots of every variable from `num_vars` on. Their bounds must have been
    /// retracted already.
    pub(crate) fn shrink(&mut self, num_vars: usize) {
        self.lower.truncate(num_vars);
        self.upper.truncate(num_vars);
    }

    pub(crate) fn mark(&self) -> BoundMark {
        BoundMark {
            trail: self.trail.len(),
            records: self.records.len(),
        }
    }

    pub(crate) fn trail_len(&self) -> usize {
        self.trail.len()
    }

    pub(crate) fn assert_bound(&mut self, bound: Bound) -> BoundUpdate {
        let var = bound.var;
        let kind = bound.kind;

        if let Some(opposite) = self.get(var, kind.opposite()) {
            let crosses = match kind {
                BoundKind::Lower => bound.value > opposite.value,
                BoundKind::Upper => bound.value < opposite.value,
            };
            if crosses {
                return BoundUpdate::Conflict(opposite.dependency);
            }
        }

        let previous = self.slot(var, kind);
        self.trail.push(TrailEntry {
            var,
            kind,
            previous,
        });

        let tighter = match self.get(var, kind) {
            None => true,
            Some(current) => match kind {
                BoundKind::Lower => bound.value > current.value,
                BoundKind::Upper => bound.value < current.value,
            },
        };
        if !tighter {
            return BoundUpdate::Unchanged;
        }

        self.records.push(bound);
        let id = BoundId((self.records.len() - 1) as u32);
        *self.slot_mut(var, kind) = Some(id);

        BoundUpdate::Tightened
    }

    /// Undo every trail entry after `mark`, most recent first.
    pub(crate) fn retract_to(&mut self, mark: BoundMark) {
        arith_assert_simple!(mark.trail <= self.trail.len());

        while self.trail.len() > mark.trail {
            if let Some(entry) = self.trail.pop() {
                *self.slot_mut(entry.var, entry.kind) = entry.previous;
            }
        }
        self.records.truncate(mark.records);
    }

    pub(crate) fn get(&self, var: ArithVar, kind: BoundKind) -> Option<&Bound> {
        self.slot(var, kind).map(|id| &self.records[id.0 as usize])
    }

    pub(crate) fn lower(&self, var: ArithVar) -> Option<&Bound> {
        self.get(var, BoundKind::Lower)
    }

    pub(crate) fn upper(&self, var: ArithVar) -> Option<&Bound> {
        self.get(var, BoundKind::Upper)
    }

    pub(crate) fn lower_value(&self, var: ArithVar) -> Option<&InfRational> {
        self.lower(var).map(|bound| &bound.value)
    }

    pub(crate) fn upper_value(&self, var: ArithVar) -> Option<&InfRational> {
        self.upper(var).map(|bound| &bound.value)
    }

    pub(crate) fn is_fixed(&self, var: ArithVar) -> bool {
        match (self.lower(var), self.upper(var)) {
            (Some(lower), Some(upper)) => lower.value == upper.value,
            _ => false,
        }
    }

    pub(crate) fn below_lower(&self, var: ArithVar, value: &InfRational) -> bool {
        self.lower_value(var).is_some_and(|lower| value < lower)
    }

    pub(crate) fn above_upper(&self, var: ArithVar, value: &InfRational) -> bool {
        self.upper_value(var).is_some_and(|upper| value > upper)
    }

    pub(crate) fn at_lower(&self, var: ArithVar, value: &InfRational) -> bool {
        self.lower_value(var).is_some_and(|lower| value == lower)
    }

    pub(crate) fn at_upper(&self, var: ArithVar, value: &InfRational) -> bool {
        self.upper_value(var).is_some_and(|upper| value == upper)
    }

    /// Every active bound, lower bounds first per variable.
    pub(crate) fn active(&self) -> impl Iterator<Item = &Bound> + '_ {
        self.lower
            .keys()
            .flat_map(move |var| [self.lower(var), self.upper(var)])
            .flatten()
    }

    fn slot(&self, var: ArithVar, kind: BoundKind) -> Option<BoundId> {
        match kind {
            BoundKind::Lower => self.lower[var],
            BoundKind::Upper => self.upper[var],
        }
    }

    fn slot_mut(&mut self, var: ArithVar, kind: BoundKind) -> &mut Option<BoundId> {
        match kind {
            BoundKind::Lower => &mut self.lower[var],
            BoundKind::Upper => &mut self.upper[var],
        }
    }
}
