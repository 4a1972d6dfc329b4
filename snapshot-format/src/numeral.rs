use std::fmt::Display;
use std::fmt::Formatter;

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::One;
use num_traits::Signed;
use num_traits::Zero;

/// Renders a rational as an SMT-LIB numeral term: `5`, `(- 5)`, `(/ 1 2)` or `(- (/ 1 2))`.
#[derive(Clone, Copy, Debug)]
pub struct Numeral<'a>(pub &'a BigRational);

impl Display for Numeral<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let value = self.0;
        let magnitude = value.abs();

        if value.is_negative() {
            write!(f, "(- ")?;
        }

        if magnitude.denom().is_one() {
            write!(f, "{}", magnitude.numer())?;
        } else {
            write!(f, "(/ {} {})", magnitude.numer(), magnitude.denom())?;
        }

        if value.is_negative() {
            write!(f, ")")?;
        }

        Ok(())
    }
}

/// Builds the rational `numerator / denominator`. Returns `None` for a zero denominator.
pub(crate) fn ratio(numerator: BigInt, denominator: BigInt) -> Option<BigRational> {
    if denominator.is_zero() {
        None
    } else {
        Some(BigRational::new(numerator, denominator))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(numerator: i64, denominator: i64) -> String {
        let value = BigRational::new(numerator.into(), denominator.into());
        Numeral(&value).to_string()
    }

    #[test]
    fn integers_are_written_plainly() {
        assert_eq!("7", render(7, 1));
        assert_eq!("0", render(0, 1));
    }

    #[test]
    fn negative_values_are_wrapped_in_a_minus() {
        assert_eq!("(- 7)", render(-7, 1));
        assert_eq!("(- (/ 3 4))", render(-3, 4));
    }

    #[test]
    fn fractions_are_reduced() {
        assert_eq!("(/ 1 2)", render(2, 4));
    }
}
