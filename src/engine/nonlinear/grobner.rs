//! A bounded Buchberger completion over the rows and monomial definitions, with fixed variables
//! replaced by their values. A nonzero constant in the basis refutes the bounds it was derived
//! from, and a polynomial `c·x + d` fixes `x`.
use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::collections::VecDeque;

use num_traits::One;
use num_traits::Zero;

use super::NonlinearConflict;
use crate::diagnostics::arith_trace;
use crate::diagnostics::TraceTag;
use crate::engine::bounds::BoundKind;
use crate::engine::bounds::BoundOrigin;
use crate::engine::dependencies::DependencyId;
use crate::engine::variables::ArithVar;
use crate::engine::ArithmeticSolver;
use crate::math::InfRational;
use crate::math::Rational;

/// A product of variables, sorted, with one occurrence per power. Ordered by degree first and
/// then lexicographically with smaller variables ranking higher.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
struct PowerProduct(Vec<ArithVar>);

impl PowerProduct {
    fn is_one(&self) -> bool {
        self.0.is_empty()
    }

    fn mul(&self, other: &PowerProduct) -> PowerProduct {
        let mut vars = self.0.clone();
        vars.extend_from_slice(&other.0);
        vars.sort();
        PowerProduct(vars)
    }

    /// `self / other` if `other` divides `self`.
    fn div(&self, other: &PowerProduct) -> Option<PowerProduct> {
        let mut rest = vec![];
        let mut divisor = other.0.iter().peekable();
        for &var in &self.0 {
            match divisor.peek() {
                Some(&&next) if next == var => {
                    let _ = divisor.next();
                }
                Some(&&next) if next < var => return None,
                _ => rest.push(var),
            }
        }
        divisor.peek().is_none().then_some(PowerProduct(rest))
    }

    fn lcm(&self, other: &PowerProduct) -> PowerProduct {
        let mut vars = vec![];
        let (mut left, mut right) = (self.0.iter().peekable(), other.0.iter().peekable());
        loop {
            let next = match (left.peek(), right.peek()) {
                (None, None) => break,
                (Some(&&l), None) => {
                    let _ = left.next();
                    l
                }
                (None, Some(&&r)) => {
                    let _ = right.next();
                    r
                }
                (Some(&&l), Some(&&r)) => match l.cmp(&r) {
                    Ordering::Less => {
                        let _ = left.next();
                        l
                    }
                    Ordering::Greater => {
                        let _ = right.next();
                        r
                    }
                    Ordering::Equal => {
                        let _ = left.next();
                        let _ = right.next();
                        l
                    }
                },
            };
            vars.push(next);
        }
        PowerProduct(vars)
    }

    fn is_coprime(&self, other: &PowerProduct) -> bool {
        self.0.iter().all(|var| !other.0.contains(var))
    }
}

impl PartialOrd for PowerProduct {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PowerProduct {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .len()
            .cmp(&other.0.len())
            .then_with(|| other.0.cmp(&self.0))
    }
}

/// A polynomial with its terms in decreasing order together with the bounds used to derive it.
#[derive(Clone, Debug)]
struct Polynomial {
    terms: Vec<(PowerProduct, Rational)>,
    reasons: BTreeSet<DependencyId>,
}

impl Polynomial {
    fn new(terms: Vec<(PowerProduct, Rational)>, reasons: BTreeSet<DependencyId>) -> Polynomial {
        let mut terms = terms;
        terms.sort_by(|(left, _), (right, _)| right.cmp(left));

        let mut merged: Vec<(PowerProduct, Rational)> = vec![];
        for (product, coeff) in terms {
            match merged.last_mut() {
                Some((last, sum)) if *last == product => *sum += coeff,
                _ => merged.push((product, coeff)),
            }
        }
        merged.retain(|(_, coeff)| !coeff.is_zero());

        Polynomial {
            terms: merged,
            reasons,
        }
    }

    fn is_zero(&self) -> bool {
        self.terms.is_empty()
    }

    fn leading(&self) -> Option<&(PowerProduct, Rational)> {
        self.terms.first()
    }

    fn is_constant(&self) -> bool {
        self.terms.len() == 1 && self.terms[0].0.is_one()
    }

    /// `self - factor·shift·other`.
    fn sub_scaled(
        &self,
        factor: &Rational,
        shift: &PowerProduct,
        other: &Polynomial,
    ) -> Polynomial {
        let mut terms = self.terms.clone();
        terms.extend(
            other
                .terms
                .iter()
                .map(|(product, coeff)| (product.mul(shift), -(factor * coeff))),
        );
        let reasons = self.reasons.union(&other.reasons).copied().collect();
        Polynomial::new(terms, reasons)
    }

    /// The variable and value of a polynomial `c·x + d`.
    fn as_assignment(&self) -> Option<(ArithVar, Rational)> {
        match self.terms.as_slice() {
            [(product, _)] if product.0.len() == 1 => Some((product.0[0], Rational::zero())),
            [(product, coeff), (constant, value)] if product.0.len() == 1 && constant.is_one() => {
                Some((product.0[0], -(value / coeff)))
            }
            _ => None,
        }
    }
}

/// The state of one bounded completion.
struct Completion {
    basis: Vec<Polynomial>,
    steps: usize,
    budget: usize,
}

impl Completion {
    fn exhausted(&self) -> bool {
        self.steps >= self.budget
    }

    /// Reduce `polynomial` by the basis as far as the budget allows.
    fn reduce(&mut self, polynomial: Polynomial) -> Polynomial {
        let mut current = polynomial;
        let mut index = 0;
        while index < current.terms.len() && !self.exhausted() {
            let (product, coeff) = current.terms[index].clone();
            let reducer = self.basis.iter().find_map(|candidate| {
                let (lead, lead_coeff) = candidate.leading()?;
                product
                    .div(lead)
                    .map(|shift| (candidate, shift, &coeff / lead_coeff))
            });
            match reducer {
                Some((candidate, shift, factor)) => {
                    current = current.sub_scaled(&factor, &shift, candidate);
                    self.steps += 1;
                }
                None => index += 1,
            }
        }
        current
    }

    fn s_polynomial(&self, left: usize, right: usize) -> Option<Polynomial> {
        let (left, right) = (&self.basis[left], &self.basis[right]);
        let ((left_lead, left_coeff), (right_lead, right_coeff)) =
            (left.leading()?, right.leading()?);
        if left_lead.is_coprime(right_lead) {
            return None;
        }

        let lcm = left_lead.lcm(right_lead);
        let left_shift = lcm.div(left_lead)?;
        let right_shift = lcm.div(right_lead)?;
        let scaled_left = Polynomial::new(vec![], BTreeSet::new()).sub_scaled(
            &-(Rational::one() / left_coeff),
            &left_shift,
            left,
        );
        Some(scaled_left.sub_scaled(&(Rational::one() / right_coeff), &right_shift, right))
    }

    /// Add a reduced nonzero polynomial. Returns it if it is a nonzero constant.
    fn insert(
        &mut self,
        polynomial: Polynomial,
        pairs: &mut VecDeque<(usize, usize)>,
    ) -> Option<Polynomial> {
        if polynomial.is_constant() {
            return Some(polynomial);
        }
        let index = self.basis.len();
        pairs.extend((0..index).map(|other| (other, index)));
        self.basis.push(polynomial);
        None
    }
}

impl ArithmeticSolver {
    /// A polynomial over the non-fixed variables. Fixed variables with a rational value are replaced
    /// by that value and their bounds become reasons.
    fn substitute_fixed(&self, terms: Vec<(Vec<ArithVar>, Rational)>) -> Polynomial {
        let mut reasons = BTreeSet::new();
        let mut substituted = vec![];
        for (vars, mut coeff) in terms {
            let mut product = vec![];
            for var in vars {
                match self.bounds.lower_value(var) {
                    Some(value) if self.bounds.is_fixed(var) && value.is_rational() => {
                        coeff *= value.real();
                        reasons.extend(self.bound_reasons(var));
                    }
                    _ => product.push(var),
                }
            }
            product.sort();
            substituted.push((PowerProduct(product), coeff));
        }
        Polynomial::new(substituted, reasons)
    }

    /// The rows mentioning a monomial or one of its factors and the definitions of the monomials.
    fn grobner_input(&self) -> Vec<Polynomial> {
        let mut involved = BTreeSet::new();
        let mut input = vec![];
        for monomial in self.monomials.iter() {
            let _ = involved.insert(monomial.var);
            involved.extend(monomial.factors.iter().copied());
            input.push(self.substitute_fixed(vec![
                (vec![monomial.var], Rational::one()),
                (monomial.factors.clone(), -Rational::one()),
            ]));
        }

        for row in self.tableau.row_ids() {
            let row = self.tableau.row(row);
            if row.quasi {
                continue;
            }
            let mut terms = vec![(vec![row.base], -Rational::one())];
            terms.extend(
                row.sorted_entries()
                    .into_iter()
                    .map(|(var, coeff)| (vec![var], coeff)),
            );
            if terms
                .iter()
                .any(|(vars, _)| vars.iter().any(|var| involved.contains(var)))
            {
                input.push(self.substitute_fixed(terms));
            }
        }
        input.retain(|polynomial| !polynomial.is_zero());
        input
    }

    /// Run the completion with the step budget. Returns whether a variable became fixed.
    pub(crate) fn grobner_step(&mut self) -> Result<bool, NonlinearConflict> {
        self.statistics.grobner += 1;
        let mut completion = Completion {
            basis: vec![],
            steps: 0,
            budget: self.options.max_grobner_steps,
        };
        let mut pairs = VecDeque::new();

        let mut refutation = None;
        for polynomial in self.grobner_input() {
            let reduced = completion.reduce(polynomial);
            if !reduced.is_zero() {
                refutation = completion.insert(reduced, &mut pairs);
                if refutation.is_some() {
                    break;
                }
            }
        }

        while refutation.is_none() && !completion.exhausted() {
            let Some((left, right)) = pairs.pop_front() else {
                break;
            };
            let Some(s_polynomial) = completion.s_polynomial(left, right) else {
                continue;
            };
            completion.steps += 1;
            let reduced = completion.reduce(s_polynomial);
            if !reduced.is_zero() {
                refutation = completion.insert(reduced, &mut pairs);
            }
        }

        if let Some(constant) = refutation {
            arith_trace!(
                self.diagnostics,
                TraceTag::Nonlinear,
                "basis reduces to a nonzero constant after {} steps",
                completion.steps
            );
            let dependency = self.dependencies.join_all(constant.reasons);
            self.set_conflict(dependency);
            return Err(NonlinearConflict);
        }

        let mut changed = false;
        for polynomial in &completion.basis {
            let Some((var, value)) = polynomial.as_assignment() else {
                continue;
            };
            let value = InfRational::from(value);
            let dependency = self
                .dependencies
                .join_all(polynomial.reasons.iter().copied());
            for kind in [BoundKind::Lower, BoundKind::Upper] {
                if !self.is_tighter(var, kind, &value) {
                    continue;
                }
                arith_trace!(
                    self.diagnostics,
                    TraceTag::Nonlinear,
                    "{} = {value} from the basis",
                    self.var_name(var)
                );
                changed = true;
                let installed =
                    self.install_bound(var, kind, value.clone(), dependency, BoundOrigin::Derived);
                if !installed {
                    return Err(NonlinearConflict);
                }
            }
        }
        Ok(changed)
    }
}
