//! The persistent map façade.

use std::cell::Cell;
use std::fmt;
use std::hash::Hash;
use std::ops::Index;
use std::rc::Rc;

use crate::draft::Draft;
use crate::error::MapError;
use crate::hash::hash32;
use crate::iter::{Iter, Keys, Values};
use crate::node::Node;
use crate::ops::assoc::assoc_root;
use crate::ops::find::find;
use crate::ops::without::without_root;

/// A persistent (immutable) associative map backed by a 32-way HAMT.
///
/// Every update (`assoc`, `without`) returns a new `Map` in O(log₃₂ N) via
/// structural sharing: untouched subtrees are shared with the original
/// `Map` through reference counting, never copied.
pub struct Map<K, V> {
    root: Option<Rc<Node<K, V>>>,
    size: usize,
    hash_memo: Cell<Option<u64>>,
}

// ---------------------------------------------------------------------------
// Construction & accessors — no trait bounds
// ---------------------------------------------------------------------------

impl<K, V> Map<K, V> {
    /// Creates an empty map. Allocation-free: the empty root is `None`.
    #[must_use]
    pub const fn new() -> Self {
        Self { root: None, size: 0, hash_memo: Cell::new(Some(0)) }
    }

    /// Returns the number of key-value pairs.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.size
    }

    /// Returns `true` if the map contains no entries.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Returns an iterator over `(&K, &V)` pairs.
    #[must_use]
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(self.root.as_ref())
    }

    /// Returns an iterator over `&K` keys, in the same order as [`Map::iter`].
    #[must_use]
    pub fn keys(&self) -> Keys<'_, K, V> {
        Keys(self.iter())
    }

    /// Returns an iterator over `&V` values, in the same order as [`Map::iter`].
    #[must_use]
    pub fn values(&self) -> Values<'_, K, V> {
        Values(self.iter())
    }

    /// Starts a batched mutation draft that shares this map's structure
    /// until a draft step actually needs to change it.
    #[must_use]
    pub fn mutate(&self) -> Draft<K, V> {
        Draft::new(self.clone())
    }

    /// Writes a multi-line structural dump, for debugging and tests. No
    /// stability guarantee across versions.
    #[must_use]
    pub fn dump(&self) -> String
    where
        K: fmt::Debug,
        V: fmt::Debug,
    {
        let mut out = String::new();
        match &self.root {
            Some(root) => root.dump(&mut out, 0),
            None => out.push_str("<empty>\n"),
        }
        out
    }

    /// Counts leaf bindings by walking the tree. Used to cross-check `len`
    /// against the actual structure in debug assertions and tests.
    pub(crate) fn count_leaves(&self) -> usize {
        self.root.as_ref().map_or(0, |root| root.count_leaves())
    }
}

impl<K, V> Default for Map<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Clone for Map<K, V> {
    fn clone(&self) -> Self {
        Self { root: self.root.clone(), size: self.size, hash_memo: Cell::new(self.hash_memo.get()) }
    }
}

impl<K, V> Map<K, V> {
    /// Decomposes into the raw parts a [`Draft`] is built from.
    pub(crate) fn into_parts(self) -> (Option<Rc<Node<K, V>>>, usize) {
        (self.root, self.size)
    }

    /// Reassembles a `Map` from a drafted root and count.
    pub(crate) const fn from_parts(root: Option<Rc<Node<K, V>>>, size: usize) -> Self {
        Self { root, size, hash_memo: Cell::new(None) }
    }
}

// ---------------------------------------------------------------------------
// Read operations — K: Hash + Eq
// ---------------------------------------------------------------------------

impl<K: Hash + Eq, V> Map<K, V> {
    /// Returns a reference to the value associated with `key`.
    #[must_use]
    pub fn get(&self, key: &K) -> Option<&V> {
        let hash = hash32(key);
        self.root.as_ref().and_then(|root| find(root, 0, hash, key))
    }

    /// Returns a reference to the value associated with `key`, or
    /// `default` if the key is absent.
    #[must_use]
    pub fn get_or<'a>(&'a self, key: &K, default: &'a V) -> &'a V {
        self.get(key).unwrap_or(default)
    }

    /// Returns `true` if the map contains the given key.
    #[must_use]
    pub fn contains_key(&self, key: &K) -> bool {
        self.get(key).is_some()
    }
}

// ---------------------------------------------------------------------------
// Write operations
// ---------------------------------------------------------------------------

impl<K: Hash + Eq + Clone, V: Clone + PartialEq> Map<K, V> {
    /// Returns a new map with `key` bound to `value`.
    ///
    /// If `key` is already bound to a `PartialEq`-equal value this is a
    /// no-op replacement: cardinality does not change and no other subtree
    /// is touched.
    #[must_use]
    pub fn assoc(&self, key: K, value: V) -> Self {
        let mut root = self.root.clone();
        let hash = hash32(&key);
        let added = assoc_root(&mut root, hash, key, value, 0);
        let result = Self { root, size: self.size + usize::from(added), hash_memo: Cell::new(None) };
        debug_assert_eq!(result.count_leaves(), result.size);
        result
    }

    /// Applies a bulk update, returning a new map.
    ///
    /// Equivalent to starting a draft, applying every pair in `source`, and
    /// finishing it — a single structural-sharing pass rather than one
    /// `assoc` per pair.
    #[must_use]
    pub fn update(&self, source: impl IntoIterator<Item = (K, V)>) -> Self {
        let mut draft = self.mutate();
        draft.update_iter(source);
        draft.finish()
    }
}

impl<K: Hash + Eq + Clone + fmt::Debug, V: Clone> Map<K, V> {
    /// Returns a new map with `key` removed.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::KeyMissing`] if `key` is not present.
    pub fn without(&self, key: &K) -> Result<Self, MapError> {
        let mut root = self.root.clone();
        let hash = hash32(key);
        if without_root(&mut root, hash, key, 0) {
            let result = Self { root, size: self.size - 1, hash_memo: Cell::new(None) };
            debug_assert_eq!(result.count_leaves(), result.size);
            Ok(result)
        } else {
            Err(MapError::KeyMissing(format!("{key:?}")))
        }
    }
}

// ---------------------------------------------------------------------------
// Content hash
// ---------------------------------------------------------------------------

impl<K: Hash, V: Hash> Map<K, V> {
    /// Returns the current order-independent content hash.
    ///
    /// Equal maps under [`PartialEq`] always produce equal `content_hash`;
    /// unequal maps collide with probability `2⁻⁶⁴`. Memoised after first
    /// computation and invalidated by any structural change.
    #[must_use]
    pub fn content_hash(&self) -> u64 {
        if let Some(h) = self.hash_memo.get() {
            return h;
        }
        let h = crate::adhash::content_hash(self.iter());
        self.hash_memo.set(Some(h));
        h
    }
}

// ---------------------------------------------------------------------------
// Trait impls
// ---------------------------------------------------------------------------

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Map<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Map").field("len", &self.size).finish_non_exhaustive()
    }
}

impl<K: Hash + Eq, V: Hash + PartialEq> PartialEq for Map<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.size == other.size && self.iter().all(|(k, v)| other.get(k).is_some_and(|v2| v2 == v))
    }
}

impl<K: Hash + Eq, V: Hash + Eq> Eq for Map<K, V> {}

impl<K: Hash + Eq + Clone, V: Clone + PartialEq> Extend<(K, V)> for Map<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        *self = self.update(iter);
    }
}

impl<K: Hash + Eq + Clone, V: Clone + PartialEq> FromIterator<(K, V)> for Map<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::new().update(iter)
    }
}

impl<K: Hash + Eq, V> Index<&K> for Map<K, V> {
    type Output = V;

    fn index(&self, key: &K) -> &V {
        self.get(key).expect("key not found")
    }
}

impl<'a, K, V> IntoIterator for &'a Map<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Iter<'a, K, V> {
        self.iter()
    }
}
