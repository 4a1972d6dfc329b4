//! This crate contains abstractions for dealing with SMT-LIB snapshots of the bound store of an
//! arithmetic engine. A snapshot declares the variables, the tableau rows and nonlinear products
//! that define them, and one assertion per bounded or fixed variable.
//!
//! To write a snapshot, build a [`Snapshot`] and pass it to [`write_snapshot`]. Snapshots written
//! this way can be read back with [`read_snapshot`].
mod numeral;
mod reader;
mod snapshot;
mod writer;

pub use numeral::*;
pub use reader::*;
pub use snapshot::*;
pub use writer::*;
