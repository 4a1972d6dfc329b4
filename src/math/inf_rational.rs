use std::fmt::Display;
use std::fmt::Formatter;
use std::ops::Add;
use std::ops::AddAssign;
use std::ops::Mul;
use std::ops::Neg;
use std::ops::Sub;
use std::ops::SubAssign;

use num_traits::One;
use num_traits::Signed;
use num_traits::Zero;

use super::Rational;

/// A value `real + eps * ε` where `ε` is a positive infinitesimal. Strict bounds are encoded as
/// non-strict bounds shifted by `ε`, so `x > 3` becomes `x >= 3 + ε`.
///
/// The derived ordering is lexicographic over `(real, eps)`, which is exactly the order of the
/// values for any sufficiently small positive `ε`.
#[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InfRational {
    real: Rational,
    eps: Rational,
}

impl InfRational {
    pub fn new(real: Rational, eps: Rational) -> InfRational {
        InfRational { real, eps }
    }

    pub fn from_rational(real: Rational) -> InfRational {
        InfRational {
            real,
            eps: Rational::zero(),
        }
    }

    pub fn zero() -> InfRational {
        InfRational::default()
    }

    pub fn real(&self) -> &Rational {
        &self.real
    }

    pub fn eps(&self) -> &Rational {
        &self.eps
    }

    pub fn is_rational(&self) -> bool {
        self.eps.is_zero()
    }

    /// Whether the value is an integer, which requires a zero infinitesimal part.
    pub fn is_integer(&self) -> bool {
        self.is_rational() && self.real.is_integer()
    }

    /// The greatest integer which is at most this value.
    pub fn floor(&self) -> Rational {
        if self.real.is_integer() && self.eps.is_negative() {
            &self.real - Rational::one()
        } else {
            self.real.floor()
        }
    }

    /// The least integer which is at least this value.
    pub fn ceil(&self) -> Rational {
        if self.real.is_integer() && self.eps.is_positive() {
            &self.real + Rational::one()
        } else {
            self.real.ceil()
        }
    }

    /// Substitute `delta` for `ε`.
    pub fn evaluate(&self, delta: &Rational) -> Rational {
        &self.real + &self.eps * delta
    }
}

impl From<Rational> for InfRational {
    fn from(real: Rational) -> Self {
        InfRational::from_rational(real)
    }
}

impl Add<&InfRational> for &InfRational {
    type Output = InfRational;

    fn add(self, rhs: &InfRational) -> InfRational {
        InfRational {
            real: &self.real + &rhs.real,
            eps: &self.eps + &rhs.eps,
        }
    }
}

impl Add for InfRational {
    type Output = InfRational;

    fn add(self, rhs: InfRational) -> InfRational {
        &self + &rhs
    }
}

impl Sub<&InfRational> for &InfRational {
    type Output = InfRational;

    fn sub(self, rhs: &InfRational) -> InfRational {
        InfRational {
            real: &self.real - &rhs.real,
            eps: &self.eps - &rhs.eps,
        }
    }
}

impl Sub for InfRational {
    type Output = InfRational;

    fn sub(self, rhs: InfRational) -> InfRational {
        &self - &rhs
    }
}

impl AddAssign<&InfRational> for InfRational {
    fn add_assign(&mut self, rhs: &InfRational) {
        self.real += &rhs.real;
        self.eps += &rhs.eps;
    }
}

impl SubAssign<&InfRational> for InfRational {
    fn sub_assign(&mut self, rhs: &InfRational) {
        self.real -= &rhs.real;
        self.eps -= &rhs.eps;
    }
}

impl Mul<&Rational> for &InfRational {
    type Output = InfRational;

    fn mul(self, rhs: &Rational) -> InfRational {
        InfRational {
            real: &self.real * rhs,
            eps: &self.eps * rhs,
        }
    }
}

impl Neg for InfRational {
    type Output = InfRational;

    fn neg(self) -> InfRational {
        InfRational {
            real: -self.real,
            eps: -self.eps,
        }
    }
}

impl Display for InfRational {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.real)?;
        if self.eps.is_positive() {
            if self.eps.is_one() {
                write!(f, " + ε")
            } else {
                write!(f, " + {}ε", self.eps)
            }
        } else if self.eps.is_negative() {
            if (-&self.eps).is_one() {
                write!(f, " - ε")
            } else {
                write!(f, " - {}ε", -&self.eps)
            }
        } else {
            Ok(())
        }
    }
}
