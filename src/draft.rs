//! Batched, in-place mutation of a map's structure.

use std::cell::Cell;
use std::fmt;
use std::hash::Hash;
use std::rc::Rc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::MapError;
use crate::hash::hash32;
use crate::iter::Iter;
use crate::map::Map;
use crate::node::Node;
use crate::ops::assoc::assoc_root;
use crate::ops::without::without_root;

static NEXT_MUTID: AtomicU64 = AtomicU64::new(1);

/// Draws a fresh, process-wide-unique, non-zero mutation token.
fn next_mutid() -> u64 {
    loop {
        let id = NEXT_MUTID.fetch_add(1, Ordering::Relaxed);
        if id != 0 {
            return id;
        }
    }
}

/// A transient, mutable view of a [`Map`], stamped with a private mutation
/// token.
///
/// Every draft owns a unique token drawn from a process-wide counter. Nodes
/// created or touched under this token may be mutated in place on
/// subsequent draft operations (no cloning); nodes from the originating
/// `Map`, or from any other draft, are copy-on-write. [`Draft::finish`]
/// hands back an ordinary persistent `Map` sharing the drafted structure.
pub struct Draft<K, V> {
    root: Option<Rc<Node<K, V>>>,
    size: usize,
    mutid: u64,
    finished: Cell<bool>,
}

impl<K, V> Draft<K, V> {
    pub(crate) fn new(map: Map<K, V>) -> Self {
        let (root, size) = map.into_parts();
        Self { root, size, mutid: next_mutid(), finished: Cell::new(false) }
    }

    /// Number of key-value pairs currently drafted.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.size
    }

    /// Whether the draft currently holds no bindings.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Consumes the draft, returning a persistent `Map` that shares its
    /// final structure.
    #[must_use]
    pub fn finish(self) -> Map<K, V> {
        Map::from_parts(self.root, self.size)
    }

    /// Runs `f` against a draft of `map`, finalising on every exit path —
    /// including an unwinding panic, which still propagates after the
    /// partial draft is marked finished rather than being silently leaked —
    /// and returning the resulting `Map`.
    pub fn scoped(map: Map<K, V>, f: impl FnOnce(&mut Self)) -> Map<K, V>
    where
        K: Hash + Eq + Clone,
        V: Clone + PartialEq,
    {
        let mut draft = Self::new(map);
        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| f(&mut draft)));
        draft.finished.set(true);
        match result {
            Ok(()) => draft.finish(),
            Err(payload) => std::panic::resume_unwind(payload),
        }
    }

    fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(self.root.as_ref())
    }
}

impl<'a, K, V> IntoIterator for &'a Draft<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Iter<'a, K, V> {
        self.iter()
    }
}

impl<K: Hash + Eq, V> Draft<K, V> {
    /// Looks up `key` in the drafted structure.
    #[must_use]
    pub fn get(&self, key: &K) -> Option<&V> {
        let hash = hash32(key);
        self.root.as_ref().and_then(|root| crate::ops::find::find(root, 0, hash, key))
    }

    /// Looks up `key`, returning `default` if absent.
    #[must_use]
    pub fn get_or<'a>(&'a self, key: &K, default: &'a V) -> &'a V {
        self.get(key).unwrap_or(default)
    }

    /// Whether `key` is present in the drafted structure.
    #[must_use]
    pub fn contains(&self, key: &K) -> bool {
        self.get(key).is_some()
    }
}

impl<K: Hash + Eq + Clone, V: Clone + PartialEq> Draft<K, V> {
    /// Binds `key` to `value`, mutating in place wherever the draft's token
    /// already grants exclusive ownership.
    pub fn set(&mut self, key: K, value: V) {
        let hash = hash32(&key);
        let added = assoc_root(&mut self.root, hash, key, value, self.mutid);
        self.size += usize::from(added);
    }

    /// Applies every binding from `other`, in place.
    pub fn update_map(&mut self, other: &Map<K, V>) {
        for (k, v) in other {
            self.set(k.clone(), v.clone());
        }
    }

    /// Applies every `(key, value)` pair from `source`, in place.
    pub fn update_iter(&mut self, source: impl IntoIterator<Item = (K, V)>) {
        for (k, v) in source {
            self.set(k, v);
        }
    }

    /// Applies every element of `source` as a two-element sequence, in
    /// place.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::MutationAfterFinish`] if called after a
    /// [`Draft::scoped`] closure's scope has ended, or
    /// [`MapError::BadPair`] at the index of any element whose
    /// `as_ref().len() != 2`.
    pub fn try_update_pairs<S, T>(&mut self, source: impl IntoIterator<Item = S>) -> Result<(), MapError>
    where
        S: AsRef<[T]>,
        T: Clone,
        K: From<T>,
        V: From<T>,
    {
        if self.finished.get() {
            return Err(MapError::MutationAfterFinish);
        }
        for (index, item) in source.into_iter().enumerate() {
            let pair = item.as_ref();
            if pair.len() != 2 {
                return Err(MapError::BadPair(index));
            }
            self.set(K::from(pair[0].clone()), V::from(pair[1].clone()));
        }
        Ok(())
    }
}

impl<K: Hash + Eq + Clone + fmt::Debug, V: Clone> Draft<K, V> {
    /// Removes `key`, in place.
    ///
    /// # Errors
    ///
    /// Returns [`MapError::MutationAfterFinish`] if called after a
    /// [`Draft::scoped`] closure's scope has ended, or
    /// [`MapError::KeyMissing`] if `key` is absent.
    pub fn delete(&mut self, key: &K) -> Result<(), MapError> {
        if self.finished.get() {
            return Err(MapError::MutationAfterFinish);
        }
        let hash = hash32(key);
        if without_root(&mut self.root, hash, key, self.mutid) {
            self.size -= 1;
            Ok(())
        } else {
            Err(MapError::KeyMissing(format!("{key:?}")))
        }
    }

    /// Removes `key`, in place, returning the removed value if present.
    pub fn pop(&mut self, key: &K) -> Option<V> {
        let value = self.get(key).cloned()?;
        let hash = hash32(key);
        without_root(&mut self.root, hash, key, self.mutid);
        self.size -= 1;
        Some(value)
    }

    /// Removes `key`, in place, returning the removed value or `default`.
    pub fn pop_or(&mut self, key: &K, default: V) -> V {
        self.pop(key).unwrap_or(default)
    }
}

impl<K: Hash + Eq, V: Hash + PartialEq> PartialEq for Draft<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.size == other.size && self.iter().all(|(k, v)| other.get(k).is_some_and(|v2| v2 == v))
    }
}

impl<K: Hash + Eq, V: Hash + Eq> Eq for Draft<K, V> {}
