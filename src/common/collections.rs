//! Hash collections used throughout the crate.
//!
//! These alias to `rustc-hash` maps; the keys we hash are small integer ids,
//! which FxHash handles well.

pub type HashMap<K, V> = rustc_hash::FxHashMap<K, V>;
pub type HashSet<T> = rustc_hash::FxHashSet<T>;

pub use std::collections::{BTreeMap, BTreeSet};

pub mod hash_map {
    pub use std::collections::hash_map::Entry;
}
