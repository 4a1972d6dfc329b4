//! Helpers over exact rationals. All arithmetic in the engine goes through [`Rational`]; there is
//! no floating point anywhere.
use num_bigint::BigInt;
use num_integer::Integer;
use num_traits::One;

pub type Rational = num_rational::BigRational;

pub(crate) fn rational(value: i64) -> Rational {
    Rational::from_integer(BigInt::from(value))
}

pub(crate) fn ratio(numerator: i64, denominator: i64) -> Rational {
    Rational::new(BigInt::from(numerator), BigInt::from(denominator))
}

/// `value - floor(value)`, always in `[0, 1)`.
pub(crate) fn fractional_part(value: &Rational) -> Rational {
    value - value.floor()
}

pub(crate) fn gcd(left: &BigInt, right: &BigInt) -> BigInt {
    left.gcd(right)
}

pub(crate) fn lcm(left: &BigInt, right: &BigInt) -> BigInt {
    left.lcm(right)
}

/// The least common multiple of the denominators of `values`.
pub(crate) fn denominators_lcm<'a>(values: impl IntoIterator<Item = &'a Rational>) -> BigInt {
    values
        .into_iter()
        .fold(BigInt::one(), |acc, value| lcm(&acc, value.denom()))
}
