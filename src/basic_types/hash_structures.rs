//! Hashing here is over small integer handles and rationals, so the default SipHash is swapped for
//! the faster FNV hasher.

pub(crate) type HashMap<K, V, Hasher = fnv::FnvBuildHasher> = std::collections::HashMap<K, V, Hasher>;
pub(crate) type HashSet<K, Hasher = fnv::FnvBuildHasher> = std::collections::HashSet<K, Hasher>;
