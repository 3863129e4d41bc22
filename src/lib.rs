//! Persistent hash map based on a 32-way Hash Array Mapped Trie.
//!
//! A `Map<K, V>` is immutable once built: `assoc` and `without` return a new
//! map in O(log₃₂ N), sharing every subtree untouched by the update with the
//! original via reference counting. Batched changes go through a
//! [`Draft`], which stamps touched nodes with a private mutation token so
//! a run of `set`/`delete` calls mutates in place instead of allocating a
//! fresh path per call, then [`Draft::finish`] hands back an ordinary
//! persistent `Map`.
//!
//! # Key properties
//!
//! - **Structural sharing**: unaffected subtrees are reused, not copied
//! - **Order-independent content hash**: via [`Map::content_hash`]
//! - **Zero `unsafe`**: enforced by `#![forbid(unsafe_code)]`; exclusive
//!   ownership for in-place mutation is proven by `Rc::get_mut`, not by a
//!   raw-pointer invariant
//!
//! # References
//!
//! - Bagwell, 2001 — "Ideal Hash Trees"
//! - Steindorfer & Vinju, 2015 — "Optimizing Hash-Array Mapped Tries for
//!   Fast and Lean Immutable JVM Collections", OOPSLA 2015

#![forbid(unsafe_code)]
#![deny(missing_docs)]
#![allow(clippy::module_name_repetitions)]

mod adhash;
mod draft;
mod error;
mod hash;
mod iter;
mod map;
mod node;
mod ops;

#[cfg(test)]
mod tests;

pub use draft::Draft;
pub use error::MapError;
pub use iter::Iter;
pub use map::Map;
