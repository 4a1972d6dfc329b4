mod inf_rational;
mod rational;

pub use inf_rational::InfRational;
pub use rational::Rational;
pub(crate) use rational::*;
