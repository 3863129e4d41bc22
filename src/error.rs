//! Error type for every fallible operation this crate exposes.

use thiserror::Error;

/// Failure modes raised by [`crate::Map`] and [`crate::Draft`].
///
/// `Hash`, `Equality`, `ConstructionFromDraft`, and `BadItem` are carried
/// for parity with a host whose hashing, equality, and dynamic-arity
/// checks can themselves fail at runtime. Rust's `Hash`/`Eq` bounds are
/// infallible and its type system rules out passing a `Draft` where a
/// `Map` is expected or an item with no `AsRef<[T]>` impl into
/// [`crate::Draft::try_update_pairs`], so those four variants cannot be
/// produced through this crate's safe API; see `DESIGN.md`.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MapError {
    /// The host hash primitive failed. Unreachable via `K: Hash`.
    #[error("hash computation failed")]
    Hash,

    /// The host equality primitive failed. Unreachable via `K: Eq`.
    #[error("equality comparison failed")]
    Equality,

    /// The key was not present.
    #[error("key not found: {0}")]
    KeyMissing(String),

    /// A draft operation was attempted after the draft was finalised.
    #[error("mutation attempted on a finished draft")]
    MutationAfterFinish,

    /// Reserved for parity with a host where a draft-like value could be
    /// mistaken for a persistent map. Unreachable: no safe API accepts a
    /// `Draft` where a `Map` is expected.
    #[error("cannot construct a map directly from a draft")]
    ConstructionFromDraft,

    /// A bulk-update source element at the given index was not a
    /// two-element sequence.
    #[error("bad pair at index {0}: expected a 2-element sequence")]
    BadPair(usize),

    /// Reserved for parity with a host where bulk-update elements are not
    /// statically known to be sequences. Unreachable: every element
    /// accepted by `try_update_pairs` is bounded by `AsRef<[T]>`.
    #[error("item is not a sequence")]
    BadItem,
}
