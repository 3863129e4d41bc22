//! HAMT node types and bitmap helpers.

use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

/// Bits per trie level (5 → 32-way branching).
pub const BITS_PER_LEVEL: u32 = 5;

/// Maximum bit-shift value. 32-bit hashes are fully consumed by shift 30
/// (the last five-bit window overlaps the two remaining high bits), so any
/// two distinct hashes must diverge into different bitmap slots by then;
/// only literally equal hashes can still collide past this shift.
pub const MAX_SHIFT: u32 = 30;

/// A slot inside a [`Node::Bitmap`]: either an inline binding or a pointer
/// to a child subtree.
pub enum Slot<K, V> {
    /// An inline key-value binding.
    Leaf(K, V),
    /// A pointer to a child subtree.
    Child(Rc<Node<K, V>>),
}

impl<K: Clone, V: Clone> Clone for Slot<K, V> {
    fn clone(&self) -> Self {
        match self {
            Self::Leaf(k, v) => Self::Leaf(k.clone(), v.clone()),
            Self::Child(c) => Self::Child(Rc::clone(c)),
        }
    }
}

/// A HAMT node.
///
/// Three variants trade off memory density against indirection:
///
/// - [`Bitmap`](Self::Bitmap) — sparse node, at most 16 entries, addressed
///   by a 32-bit occupancy bitmap.
/// - [`Array`](Self::Array) — dense node, a fixed 32-slot child array with
///   no inline bindings.
/// - [`Collision`](Self::Collision) — a linear list of bindings that all
///   share the same 32-bit hash.
///
/// Every node carries a mutation token (`mutid`). `0` marks a persistent
/// node; any other value marks a node exclusively owned by the draft that
/// stamped it. See [`crate::draft::Draft`] for the discipline this token
/// supports.
pub enum Node<K, V> {
    /// Sparse, bitmap-addressed node with at most 16 entries.
    Bitmap {
        bitmap: u32,
        entries: Vec<Slot<K, V>>,
        mutid: Cell<u64>,
    },
    /// Dense node with exactly 32 child slots and no inline bindings.
    Array {
        slots: Vec<Option<Rc<Self>>>,
        count: usize,
        mutid: Cell<u64>,
    },
    /// Linear list of bindings that share the same 32-bit hash.
    Collision {
        hash: i32,
        entries: Vec<(K, V)>,
        mutid: Cell<u64>,
    },
}

impl<K, V> Node<K, V> {
    /// A single-leaf `Bitmap` node occupying the slot for `hash` at `shift`.
    pub fn single_leaf(key: K, value: V, shift: u32, hash: i32, mutid: u64) -> Self {
        Self::Bitmap {
            bitmap: bitpos(hash, shift),
            entries: vec![Slot::Leaf(key, value)],
            mutid: Cell::new(mutid),
        }
    }

    /// An empty `Bitmap` node, used as a scratch placeholder while a node
    /// is temporarily taken out of its `Rc` for in-place mutation.
    pub const fn empty_bitmap(mutid: u64) -> Self {
        Self::Bitmap {
            bitmap: 0,
            entries: Vec::new(),
            mutid: Cell::new(mutid),
        }
    }

    pub const fn mutid_cell(&self) -> &Cell<u64> {
        match self {
            Self::Bitmap { mutid, .. } | Self::Array { mutid, .. } | Self::Collision { mutid, .. } => mutid,
        }
    }

    /// Number of leaf bindings directly or transitively reachable from this node.
    pub fn count_leaves(&self) -> usize {
        match self {
            Self::Bitmap { entries, .. } => entries
                .iter()
                .map(|e| match e {
                    Slot::Leaf(..) => 1,
                    Slot::Child(c) => c.count_leaves(),
                })
                .sum(),
            Self::Array { slots, .. } => slots.iter().flatten().map(|c| c.count_leaves()).sum(),
            Self::Collision { entries, .. } => entries.len(),
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug> Node<K, V> {
    /// Writes a multi-line structural dump, indented two spaces per depth.
    pub fn dump(&self, out: &mut String, depth: usize) {
        use fmt::Write as _;
        let pad = "  ".repeat(depth);
        match self {
            Self::Bitmap { bitmap, entries, mutid } => {
                let _ = writeln!(out, "{pad}Bitmap bitmap={bitmap:#034b} len={} mutid={}", entries.len(), mutid.get());
                for entry in entries {
                    match entry {
                        Slot::Leaf(k, v) => {
                            let _ = writeln!(out, "{pad}  Leaf {k:?} => {v:?}");
                        }
                        Slot::Child(c) => c.dump(out, depth + 1),
                    }
                }
            }
            Self::Array { slots, count, mutid } => {
                let _ = writeln!(out, "{pad}Array count={count} mutid={}", mutid.get());
                for child in slots.iter().flatten() {
                    child.dump(out, depth + 1);
                }
            }
            Self::Collision { hash, entries, mutid } => {
                let _ = writeln!(out, "{pad}Collision hash={hash} len={} mutid={}", entries.len(), mutid.get());
                for (k, v) in entries {
                    let _ = writeln!(out, "{pad}  {k:?} => {v:?}");
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Bitmap helpers
// ---------------------------------------------------------------------------

/// Extracts the 5-bit hash fragment at the given bit-shift depth.
#[inline]
pub const fn mask(hash: i32, shift: u32) -> u32 {
    debug_assert!(shift <= MAX_SHIFT, "shift exceeds the deepest valid trie level");
    (hash.cast_unsigned() >> shift) & 0x1F
}

/// Returns the single-bit mask for the fragment of `hash` at `shift`.
#[inline]
pub const fn bitpos(hash: i32, shift: u32) -> u32 {
    1u32 << mask(hash, shift)
}

/// Returns the compact index of `bit` within `bitmap`: the count of set
/// bits below it.
#[inline]
pub const fn bitindex(bitmap: u32, bit: u32) -> usize {
    (bitmap & (bit - 1)).count_ones() as usize
}

/// Position of the `n`-th (0-indexed) set bit in `bitmap`.
pub const fn nth_set_bit(bitmap: u32, n: usize) -> u32 {
    let mut bm = bitmap;
    let mut seen = 0usize;
    let mut pos = 0u32;
    while pos < 32 {
        if bm & 1 != 0 {
            if seen == n {
                return pos;
            }
            seen += 1;
        }
        bm >>= 1;
        pos += 1;
    }
    unreachable!()
}

// ---------------------------------------------------------------------------
// Mutation-token discipline
// ---------------------------------------------------------------------------

/// Whether `rc` may be mutated in place on behalf of `mutid`.
///
/// True only when `mutid` is non-zero, `rc` is the sole reference to its
/// node (`Rc::get_mut` succeeds — the safe-Rust proof of exclusivity), and
/// that node already carries this draft's token.
pub fn eligible<K, V>(rc: &mut Rc<Node<K, V>>, mutid: u64) -> bool {
    if mutid == 0 {
        return false;
    }
    Rc::get_mut(rc).is_some_and(|node| node.mutid_cell().get() == mutid)
}

/// Attempts to recover a leaf binding from `rc`'s node if it is a
/// single-leaf `Bitmap` (the shape [`super::ops::without`] must inline per
/// the canonical-form invariant). Returns the original `Rc` back on any
/// other shape, including when it is still shared.
pub fn single_leaf_owned<K, V>(rc: Rc<Node<K, V>>) -> Result<(K, V), Rc<Node<K, V>>> {
    match Rc::try_unwrap(rc) {
        Ok(Node::Bitmap { bitmap, mut entries, mutid }) => {
            if entries.len() == 1 && matches!(entries[0], Slot::Leaf(..)) {
                log::trace!("inlining single-leaf child into parent (canonical-form collapse)");
                match entries.pop() {
                    Some(Slot::Leaf(k, v)) => Ok((k, v)),
                    _ => unreachable!(),
                }
            } else {
                Err(Rc::new(Node::Bitmap { bitmap, entries, mutid }))
            }
        }
        Ok(other) => Err(Rc::new(other)),
        Err(rc) => Err(rc),
    }
}

/// Like [`single_leaf_owned`], but peeks through a shared `Rc` by cloning
/// the binding instead of requiring unique ownership.
///
/// Demotion inspects every surviving child of an `Array` node, most of
/// which were never touched by the removal that triggered the demotion and
/// so are still shared with the map the removal started from — `Rc::get_mut`
/// / `Rc::try_unwrap` would fail on every one of them. Cloning the `(K, V)`
/// out of a shared single-leaf child still upholds the canonical-form
/// invariant without requiring exclusive ownership.
pub fn single_leaf_cloned<K: Clone, V: Clone>(rc: &Rc<Node<K, V>>) -> Option<(K, V)> {
    match &**rc {
        Node::Bitmap { entries, .. } if entries.len() == 1 => match &entries[0] {
            Slot::Leaf(k, v) => {
                log::trace!("inlining shared single-leaf child into parent (canonical-form collapse)");
                Some((k.clone(), v.clone()))
            }
            Slot::Child(_) => None,
        },
        _ => None,
    }
}
