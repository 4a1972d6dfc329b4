//! Intervals over the rationals with closed, open or infinite endpoints.
use std::cmp::Ordering;
use std::fmt::Display;
use std::fmt::Formatter;

use num_traits::pow;
use num_traits::One;
use num_traits::Signed;
use num_traits::Zero;

use crate::engine::bounds::BoundKind;
use crate::math::InfRational;
use crate::math::Rational;

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum Endpoint {
    Infinite,
    Closed(Rational),
    Open(Rational),
}

impl Endpoint {
    /// The endpoint a bound stands for. A bound whose infinitesimal points away from the interval
    /// (`x >= k - ε` or `x <= k + ε`) has no rational counterpart and is dropped.
    pub(crate) fn from_bound(kind: BoundKind, value: &InfRational) -> Endpoint {
        let eps = value.eps();
        let real = value.real().clone();
        match kind {
            _ if eps.is_zero() => Endpoint::Closed(real),
            BoundKind::Lower if eps.is_positive() => Endpoint::Open(real),
            BoundKind::Upper if eps.is_negative() => Endpoint::Open(real),
            BoundKind::Lower | BoundKind::Upper => Endpoint::Infinite,
        }
    }

    /// The bound this endpoint stands for as an endpoint of the given side.
    pub(crate) fn to_bound(&self, kind: BoundKind) -> Option<InfRational> {
        match self {
            Endpoint::Infinite => None,
            Endpoint::Closed(value) => Some(InfRational::from(value.clone())),
            Endpoint::Open(value) => {
                let eps = match kind {
                    BoundKind::Lower => Rational::one(),
                    BoundKind::Upper => -Rational::one(),
                };
                Some(InfRational::new(value.clone(), eps))
            }
        }
    }

    fn value(&self) -> Option<&Rational> {
        match self {
            Endpoint::Infinite => None,
            Endpoint::Closed(value) | Endpoint::Open(value) => Some(value),
        }
    }

    fn is_open(&self) -> bool {
        !matches!(self, Endpoint::Closed(_))
    }
}

/// A point of the extended rational line used while combining endpoints.
#[derive(Clone, Debug, PartialEq, Eq)]
enum Extended {
    NegativeInfinity,
    Finite(Rational),
    PositiveInfinity,
}

impl Extended {
    fn sign(&self) -> i8 {
        match self {
            Extended::NegativeInfinity => -1,
            Extended::PositiveInfinity => 1,
            Extended::Finite(value) if value.is_zero() => 0,
            Extended::Finite(value) if value.is_positive() => 1,
            Extended::Finite(_) => -1,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Extended::NegativeInfinity => 0,
            Extended::Finite(_) => 1,
            Extended::PositiveInfinity => 2,
        }
    }
}

impl PartialOrd for Extended {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Extended {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Extended::Finite(left), Extended::Finite(right)) => left.cmp(right),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

/// An endpoint seen as a point together with whether it is attained.
#[derive(Clone, Debug)]
struct Corner {
    point: Extended,
    open: bool,
}

impl Corner {
    fn of(endpoint: &Endpoint, kind: BoundKind) -> Corner {
        match endpoint {
            Endpoint::Infinite => Corner {
                point: match kind {
                    BoundKind::Lower => Extended::NegativeInfinity,
                    BoundKind::Upper => Extended::PositiveInfinity,
                },
                open: true,
            },
            Endpoint::Closed(value) | Endpoint::Open(value) => Corner {
                point: Extended::Finite(value.clone()),
                open: endpoint.is_open(),
            },
        }
    }

    /// The product of two corners. A closed zero absorbs anything, including an infinity.
    fn times(&self, other: &Corner) -> Corner {
        let closed_zero = |corner: &Corner| corner.point.sign() == 0 && !corner.open;
        if closed_zero(self) || closed_zero(other) {
            return Corner {
                point: Extended::Finite(Rational::zero()),
                open: false,
            };
        }

        let point = match (&self.point, &other.point) {
            (Extended::Finite(left), Extended::Finite(right)) => Extended::Finite(left * right),
            _ if self.point.sign() == 0 || other.point.sign() == 0 => {
                Extended::Finite(Rational::zero())
            }
            _ if self.point.sign() * other.point.sign() > 0 => Extended::PositiveInfinity,
            _ => Extended::NegativeInfinity,
        };
        Corner {
            point,
            open: self.open || other.open,
        }
    }

    fn into_endpoint(self) -> Endpoint {
        match self.point {
            Extended::Finite(value) if self.open => Endpoint::Open(value),
            Extended::Finite(value) => Endpoint::Closed(value),
            Extended::NegativeInfinity | Extended::PositiveInfinity => Endpoint::Infinite,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Interval {
    pub(crate) lower: Endpoint,
    pub(crate) upper: Endpoint,
}

impl Interval {
    pub(crate) fn point(value: Rational) -> Interval {
        Interval {
            lower: Endpoint::Closed(value.clone()),
            upper: Endpoint::Closed(value),
        }
    }

    pub(crate) fn contains_zero(&self) -> bool {
        let above_lower = match &self.lower {
            Endpoint::Infinite => true,
            Endpoint::Closed(value) => !value.is_positive(),
            Endpoint::Open(value) => value.is_negative(),
        };
        let below_upper = match &self.upper {
            Endpoint::Infinite => true,
            Endpoint::Closed(value) => !value.is_negative(),
            Endpoint::Open(value) => value.is_positive(),
        };
        above_lower && below_upper
    }

    pub(crate) fn add(&self, other: &Interval) -> Interval {
        let side = |left: &Endpoint, right: &Endpoint| match (left.value(), right.value()) {
            (Some(l), Some(r)) if left.is_open() || right.is_open() => Endpoint::Open(l + r),
            (Some(l), Some(r)) => Endpoint::Closed(l + r),
            _ => Endpoint::Infinite,
        };
        Interval {
            lower: side(&self.lower, &other.lower),
            upper: side(&self.upper, &other.upper),
        }
    }

    pub(crate) fn scale(&self, factor: &Rational) -> Interval {
        self.mul(&Interval::point(factor.clone()))
    }

    pub(crate) fn mul(&self, other: &Interval) -> Interval {
        let left = [
            Corner::of(&self.lower, BoundKind::Lower),
            Corner::of(&self.upper, BoundKind::Upper),
        ];
        let right = [
            Corner::of(&other.lower, BoundKind::Lower),
            Corner::of(&other.upper, BoundKind::Upper),
        ];
        let products = left
            .iter()
            .flat_map(|l| right.iter().map(move |r| l.times(r)))
            .collect::<Vec<_>>();

        Interval {
            lower: Self::extreme(&products, Ordering::Less),
            upper: Self::extreme(&products, Ordering::Greater),
        }
    }

    /// The smallest (or greatest) corner; it is attained if any corner reaching it is.
    fn extreme(products: &[Corner], direction: Ordering) -> Endpoint {
        let mut best: Option<Corner> = None;
        for corner in products {
            best = match best {
                None => Some(corner.clone()),
                Some(current) => match corner.point.cmp(&current.point) {
                    ordering if ordering == direction => Some(corner.clone()),
                    Ordering::Equal => Some(Corner {
                        point: current.point,
                        open: current.open && corner.open,
                    }),
                    _ => Some(current),
                },
            };
        }
        best.map_or(Endpoint::Infinite, Corner::into_endpoint)
    }

    fn negate(&self) -> Interval {
        let negated = |endpoint: &Endpoint| match endpoint {
            Endpoint::Infinite => Endpoint::Infinite,
            Endpoint::Closed(value) => Endpoint::Closed(-value),
            Endpoint::Open(value) => Endpoint::Open(-value),
        };
        Interval {
            lower: negated(&self.upper),
            upper: negated(&self.lower),
        }
    }

    fn is_non_negative(&self) -> bool {
        match &self.lower {
            Endpoint::Infinite => false,
            Endpoint::Closed(value) | Endpoint::Open(value) => !value.is_negative(),
        }
    }

    fn is_non_positive(&self) -> bool {
        match &self.upper {
            Endpoint::Infinite => false,
            Endpoint::Closed(value) | Endpoint::Open(value) => !value.is_positive(),
        }
    }

    fn abs(&self) -> Interval {
        if self.is_non_negative() {
            return self.clone();
        }
        if self.is_non_positive() {
            return self.negate();
        }

        let negated = self.negate();
        let upper = match (negated.upper.value(), self.upper.value()) {
            (Some(left), Some(right)) => match left.cmp(right) {
                Ordering::Greater => negated.upper.clone(),
                Ordering::Less => self.upper.clone(),
                Ordering::Equal if negated.upper.is_open() => self.upper.clone(),
                Ordering::Equal => negated.upper.clone(),
            },
            _ => Endpoint::Infinite,
        };
        Interval {
            lower: Endpoint::Closed(Rational::zero()),
            upper,
        }
    }

    /// The interval of `x^exponent` for `x` in this interval. Odd powers are monotone, so the
    /// endpoints are raised directly; even powers are the power of the absolute value.
    pub(crate) fn power(&self, exponent: usize) -> Interval {
        if exponent % 2 == 1 {
            let raise = |endpoint: &Endpoint| match endpoint {
                Endpoint::Infinite => Endpoint::Infinite,
                Endpoint::Closed(value) => Endpoint::Closed(pow(value.clone(), exponent)),
                Endpoint::Open(value) => Endpoint::Open(pow(value.clone(), exponent)),
            };
            return Interval {
                lower: raise(&self.lower),
                upper: raise(&self.upper),
            };
        }

        // the absolute value is non-negative, where repeated products are exact
        let base = self.abs();
        (1..exponent).fold(base.clone(), |acc, _| acc.mul(&base))
    }

    /// `1 / x` for `x` in this interval, which must exclude zero.
    pub(crate) fn inverse(&self) -> Option<Interval> {
        if self.contains_zero() {
            return None;
        }

        let invert = |endpoint: &Endpoint| match endpoint {
            Endpoint::Infinite => Endpoint::Open(Rational::zero()),
            Endpoint::Closed(value) => Endpoint::Closed(value.recip()),
            Endpoint::Open(value) if value.is_zero() => Endpoint::Infinite,
            Endpoint::Open(value) => Endpoint::Open(value.recip()),
        };
        Some(Interval {
            lower: invert(&self.upper),
            upper: invert(&self.lower),
        })
    }

    /// The tighter of the two intervals on each side.
    pub(crate) fn intersect(&self, other: &Interval) -> Interval {
        let pick = |mine: &Endpoint, theirs: &Endpoint, kind: BoundKind| {
            let (Some(mine_bound), Some(theirs_bound)) = (mine.to_bound(kind), theirs.to_bound(kind))
            else {
                return if matches!(mine, Endpoint::Infinite) {
                    theirs.clone()
                } else {
                    mine.clone()
                };
            };
            let take_mine = match kind {
                BoundKind::Lower => mine_bound >= theirs_bound,
                BoundKind::Upper => mine_bound <= theirs_bound,
            };
            if take_mine {
                mine.clone()
            } else {
                theirs.clone()
            }
        };
        Interval {
            lower: pick(&self.lower, &other.lower, BoundKind::Lower),
            upper: pick(&self.upper, &other.upper, BoundKind::Upper),
        }
    }
}

impl Display for Interval {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match &self.lower {
            Endpoint::Infinite => write!(f, "(-oo")?,
            Endpoint::Closed(value) => write!(f, "[{value}")?,
            Endpoint::Open(value) => write!(f, "({value}")?,
        }
        write!(f, ", ")?;
        match &self.upper {
            Endpoint::Infinite => write!(f, "oo)"),
            Endpoint::Closed(value) => write!(f, "{value}]"),
            Endpoint::Open(value) => write!(f, "{value})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::ratio;
    use crate::math::rational;

    fn closed(lower: i64, upper: i64) -> Interval {
        Interval {
            lower: Endpoint::Closed(rational(lower)),
            upper: Endpoint::Closed(rational(upper)),
        }
    }

    #[test]
    fn products_take_the_extreme_corners() {
        assert_eq!(closed(-6, 9), closed(-2, 3).mul(&closed(1, 3)));
        assert_eq!(closed(-12, 8), closed(-2, 3).mul(&closed(-4, 2)));
    }

    #[test]
    fn intersections_keep_the_tighter_side() {
        assert_eq!(closed(0, 2), closed(-1, 2).intersect(&closed(0, 5)));
    }

    #[test]
    fn a_closed_zero_absorbs_infinity() {
        let non_negative = Interval {
            lower: Endpoint::Closed(rational(0)),
            upper: Endpoint::Infinite,
        };
        let product = non_negative.mul(&closed(2, 3));

        assert_eq!(Endpoint::Closed(rational(0)), product.lower);
        assert_eq!(Endpoint::Infinite, product.upper);
    }

    #[test]
    fn open_endpoints_stay_open() {
        let positive = Interval {
            lower: Endpoint::Open(rational(1)),
            upper: Endpoint::Closed(rational(2)),
        };
        let product = positive.mul(&closed(3, 3));

        assert_eq!(Endpoint::Open(rational(3)), product.lower);
        assert_eq!(Endpoint::Closed(rational(6)), product.upper);
    }

    #[test]
    fn even_powers_are_not_negative() {
        assert_eq!(closed(0, 9), closed(-3, 2).power(2));
        assert_eq!(closed(-27, 8), closed(-3, 2).power(3));
        assert_eq!(closed(4, 9), closed(-3, -2).power(2));
    }

    #[test]
    fn odd_powers_raise_their_endpoints() {
        assert_eq!(closed(-27, 8), closed(-3, 2).power(3));
        assert_eq!(closed(-1, 32), closed(-1, 2).power(5));
        assert_eq!(
            Interval {
                lower: Endpoint::Open(rational(-8)),
                upper: Endpoint::Infinite,
            },
            Interval {
                lower: Endpoint::Open(rational(-2)),
                upper: Endpoint::Infinite,
            }
            .power(3)
        );
    }

    #[test]
    fn inverses_exist_away_from_zero() {
        assert_eq!(None, closed(-1, 1).inverse());
        assert_eq!(
            Some(Interval {
                lower: Endpoint::Closed(ratio(1, 4)),
                upper: Endpoint::Closed(ratio(1, 2)),
            }),
            closed(2, 4).inverse()
        );
    }

    #[test]
    fn wrong_side_infinitesimals_are_dropped() {
        let slightly_below = InfRational::new(rational(2), rational(-1));

        assert_eq!(
            Endpoint::Infinite,
            Endpoint::from_bound(BoundKind::Lower, &slightly_below)
        );
        assert_eq!(
            Endpoint::Open(rational(2)),
            Endpoint::from_bound(BoundKind::Upper, &slightly_below)
        );
    }
}
