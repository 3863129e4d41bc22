//! Order-independent content hashing for [`crate::Map`].
//!
//! `φ(S) = Σ f(k, v)` folded with wrapping addition over all entries. Two
//! mixing seeds prevent degeneration when `hash(v) = 0`, and the fold is
//! commutative so insertion order never affects the result.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};

/// First mixing seed (golden ratio constant).
const SEED_1: u64 = 0x9E37_79B9_7F4A_7C15;

/// Second mixing seed (large prime).
const SEED_2: u64 = 0x517C_C1B7_2722_0A95;

/// Computes the 64-bit hash of a value using the standard hasher.
pub fn hash_one<T: Hash + ?Sized>(value: &T) -> u64 {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    hasher.finish()
}

/// Computes the contribution of a single entry to the running content hash.
///
/// `f(k, v) = key_hash · SEED₁ ⊕ value_hash · SEED₂`
const fn entry_adhash(key_hash: u64, value_hash: u64) -> u64 {
    key_hash.wrapping_mul(SEED_1) ^ value_hash.wrapping_mul(SEED_2)
}

/// Folds an iterator of bindings into an order-independent content hash.
pub fn content_hash<'a, K, V>(entries: impl Iterator<Item = (&'a K, &'a V)>) -> u64
where
    K: Hash + 'a,
    V: Hash + 'a,
{
    entries.fold(0u64, |acc, (k, v)| acc.wrapping_add(entry_adhash(hash_one(k), hash_one(v))))
}
