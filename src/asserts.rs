//! Leveled assertions for internal invariants. An assertion at a level above
//! [`ARITH_ASSERT_LEVEL_DEFINITION`] compiles to a constant-false branch.

#[cfg(all(not(test), not(feature = "debug-checks")))]
pub const ARITH_ASSERT_LEVEL_DEFINITION: u8 = ARITH_ASSERT_SIMPLE;

#[cfg(any(test, feature = "debug-checks"))]
pub const ARITH_ASSERT_LEVEL_DEFINITION: u8 = ARITH_ASSERT_EXTREME;

pub const ARITH_ASSERT_SIMPLE: u8 = 1;
pub const ARITH_ASSERT_MODERATE: u8 = 2;
pub const ARITH_ASSERT_ADVANCED: u8 = 3;
pub const ARITH_ASSERT_EXTREME: u8 = 4;

#[macro_export]
#[doc(hidden)]
macro_rules! print_arith_assert_warning_message {
    () => {
        if $crate::asserts::ARITH_ASSERT_LEVEL_DEFINITION >= $crate::asserts::ARITH_ASSERT_MODERATE {
            log::warn!("Potential performance degradation: the arithmetic assert level is set to {}, meaning tableau and bound consistency checks run after every pivot.", $crate::asserts::ARITH_ASSERT_LEVEL_DEFINITION);
        };
    };
}

#[macro_export]
#[doc(hidden)]
macro_rules! arith_assert_simple {
    ($($arg:tt)*) => {
        if $crate::asserts::ARITH_ASSERT_LEVEL_DEFINITION >= $crate::asserts::ARITH_ASSERT_SIMPLE {
            assert!($($arg)*);
        }
    };
}

#[macro_export]
#[doc(hidden)]
macro_rules! arith_assert_eq_simple {
    ($($arg:tt)*) => {
        if $crate::asserts::ARITH_ASSERT_LEVEL_DEFINITION >= $crate::asserts::ARITH_ASSERT_SIMPLE {
            assert_eq!($($arg)*);
        }
    };
}

#[macro_export]
#[doc(hidden)]
macro_rules! arith_assert_moderate {
    ($($arg:tt)*) => {
        if $crate::asserts::ARITH_ASSERT_LEVEL_DEFINITION >= $crate::asserts::ARITH_ASSERT_MODERATE {
            assert!($($arg)*);
        }
    };
}

#[macro_export]
#[doc(hidden)]
macro_rules! arith_assert_advanced {
    ($($arg:tt)*) => {
        if $crate::asserts::ARITH_ASSERT_LEVEL_DEFINITION >= $crate::asserts::ARITH_ASSERT_ADVANCED {
            assert!($($arg)*);
        }
    };
}

#[macro_export]
#[doc(hidden)]
macro_rules! arith_assert_extreme {
    ($($arg:tt)*) => {
        if $crate::asserts::ARITH_ASSERT_LEVEL_DEFINITION >= $crate::asserts::ARITH_ASSERT_EXTREME {
            assert!($($arg)*);
        }
    };
}
