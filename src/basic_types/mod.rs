mod arithmetic_error;
mod explanation;
mod hash_structures;
mod keyed_vec;

pub use arithmetic_error::ArithmeticError;
pub use explanation::Explanation;
pub(crate) use hash_structures::HashMap;
pub(crate) use hash_structures::HashSet;
pub(crate) use keyed_vec::KeyedVec;
pub(crate) use keyed_vec::StorageKey;
