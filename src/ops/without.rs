//! Removing a binding from a subtree, with demotion, collapse, and inlining.

use std::cell::Cell;
use std::rc::Rc;

use crate::node::{bitindex, bitpos, eligible, mask, single_leaf_cloned, single_leaf_owned, Node, Slot, BITS_PER_LEVEL};

/// Result of removing a key from a subtree.
pub enum WithoutStatus {
    /// The key was not present; the subtree is unchanged.
    NotFound,
    /// The subtree was updated in place (`*rc` now reflects the removal).
    Updated,
    /// The subtree became empty; the caller must drop this slot entirely.
    Empty,
}

enum WithoutOutcome<K, V> {
    /// Key absent; carries the node back unchanged so callers that took
    /// ownership of it can restore it.
    NotFound(Node<K, V>),
    Empty,
    NewNode(Node<K, V>),
}

/// Removes `key` from the map rooted at `root`. Returns `true` iff a
/// binding was actually removed.
pub fn without_root<K, V>(root: &mut Option<Rc<Node<K, V>>>, hash: i32, key: &K, mutid: u64) -> bool
where
    K: Eq + Clone,
    V: Clone,
{
    let Some(rc) = root.as_mut() else {
        return false;
    };
    match without(rc, 0, hash, key, mutid) {
        WithoutStatus::NotFound => false,
        WithoutStatus::Updated => true,
        WithoutStatus::Empty => {
            *root = None;
            true
        }
    }
}

/// Removes `key` from `*rc`, mutating in place when `mutid` grants
/// exclusive ownership and cloning otherwise.
pub fn without<K, V>(rc: &mut Rc<Node<K, V>>, shift: u32, hash: i32, key: &K, mutid: u64) -> WithoutStatus
where
    K: Eq + Clone,
    V: Clone,
{
    let can_mutate = eligible(rc, mutid);
    let outcome = if can_mutate {
        let node = Rc::get_mut(rc).expect("checked eligible");
        let taken = std::mem::replace(node, Node::empty_bitmap(mutid));
        without_owned(taken, shift, hash, key, mutid)
    } else {
        without_cloned(rc, shift, hash, key, mutid)
    };
    match outcome {
        WithoutOutcome::NotFound(restored) => {
            if can_mutate {
                *Rc::get_mut(rc).expect("checked eligible") = restored;
            }
            WithoutStatus::NotFound
        }
        WithoutOutcome::Empty => WithoutStatus::Empty,
        WithoutOutcome::NewNode(new_node) => {
            if can_mutate {
                *Rc::get_mut(rc).expect("checked eligible") = new_node;
            } else {
                *rc = Rc::new(new_node);
            }
            WithoutStatus::Updated
        }
    }
}

fn without_owned<K, V>(node: Node<K, V>, shift: u32, hash: i32, key: &K, mutid: u64) -> WithoutOutcome<K, V>
where
    K: Eq + Clone,
    V: Clone,
{
    match node {
        Node::Bitmap { bitmap, entries, .. } => without_bitmap(bitmap, entries, shift, hash, key, mutid),
        Node::Array { slots, count, .. } => without_array(slots, count, shift, hash, key, mutid),
        Node::Collision { hash: col_hash, entries, .. } => without_collision(col_hash, entries, shift, hash, key, mutid),
    }
}

fn without_cloned<K, V>(rc: &Rc<Node<K, V>>, shift: u32, hash: i32, key: &K, mutid: u64) -> WithoutOutcome<K, V>
where
    K: Eq + Clone,
    V: Clone,
{
    match &**rc {
        Node::Bitmap { bitmap, entries, .. } => without_bitmap(*bitmap, entries.clone(), shift, hash, key, mutid),
        Node::Array { slots, count, .. } => without_array(slots.clone(), *count, shift, hash, key, mutid),
        Node::Collision { hash: col_hash, entries, .. } => {
            without_collision(*col_hash, entries.clone(), shift, hash, key, mutid)
        }
    }
}

fn without_bitmap<K, V>(
    bitmap: u32,
    mut entries: Vec<Slot<K, V>>,
    shift: u32,
    hash: i32,
    key: &K,
    mutid: u64,
) -> WithoutOutcome<K, V>
where
    K: Eq + Clone,
    V: Clone,
{
    let bit = bitpos(hash, shift);
    if bitmap & bit == 0 {
        return WithoutOutcome::NotFound(Node::Bitmap { bitmap, entries, mutid: Cell::new(mutid) });
    }
    let idx = bitindex(bitmap, bit);

    match entries.remove(idx) {
        Slot::Child(mut child) => match without(&mut child, shift + BITS_PER_LEVEL, hash, key, mutid) {
            WithoutStatus::NotFound => {
                entries.insert(idx, Slot::Child(child));
                WithoutOutcome::NotFound(Node::Bitmap { bitmap, entries, mutid: Cell::new(mutid) })
            }
            WithoutStatus::Updated => {
                let slot = match single_leaf_owned(child) {
                    Ok((k, v)) => Slot::Leaf(k, v),
                    Err(child) => Slot::Child(child),
                };
                entries.insert(idx, slot);
                WithoutOutcome::NewNode(Node::Bitmap { bitmap, entries, mutid: Cell::new(mutid) })
            }
            WithoutStatus::Empty => {
                let new_bitmap = bitmap & !bit;
                if entries.is_empty() {
                    WithoutOutcome::Empty
                } else {
                    WithoutOutcome::NewNode(Node::Bitmap { bitmap: new_bitmap, entries, mutid: Cell::new(mutid) })
                }
            }
        },
        Slot::Leaf(k2, v2) => {
            if &k2 != key {
                entries.insert(idx, Slot::Leaf(k2, v2));
                WithoutOutcome::NotFound(Node::Bitmap { bitmap, entries, mutid: Cell::new(mutid) })
            } else if entries.is_empty() {
                WithoutOutcome::Empty
            } else {
                WithoutOutcome::NewNode(Node::Bitmap { bitmap: bitmap & !bit, entries, mutid: Cell::new(mutid) })
            }
        }
    }
}

fn without_array<K, V>(
    mut slots: Vec<Option<Rc<Node<K, V>>>>,
    mut count: usize,
    shift: u32,
    hash: i32,
    key: &K,
    mutid: u64,
) -> WithoutOutcome<K, V>
where
    K: Eq + Clone,
    V: Clone,
{
    let i = mask(hash, shift) as usize;
    match slots[i].take() {
        None => WithoutOutcome::NotFound(Node::Array { slots, count, mutid: Cell::new(mutid) }),
        Some(mut child) => match without(&mut child, shift + BITS_PER_LEVEL, hash, key, mutid) {
            WithoutStatus::NotFound => {
                slots[i] = Some(child);
                WithoutOutcome::NotFound(Node::Array { slots, count, mutid: Cell::new(mutid) })
            }
            WithoutStatus::Updated => {
                slots[i] = Some(child);
                WithoutOutcome::NewNode(Node::Array { slots, count, mutid: Cell::new(mutid) })
            }
            WithoutStatus::Empty => {
                count -= 1;
                if count == 0 {
                    WithoutOutcome::Empty
                } else if count >= 16 {
                    WithoutOutcome::NewNode(Node::Array { slots, count, mutid: Cell::new(mutid) })
                } else {
                    log::trace!("demoting array to bitmap at shift={shift} (down to {count} entries)");
                    WithoutOutcome::NewNode(demote_to_bitmap(slots, mutid))
                }
            }
        },
    }
}

/// Array → Bitmap demotion, mirroring the inlining rule: any surviving
/// child that is itself a single-leaf `Bitmap` is folded into a direct leaf.
///
/// Most surviving children were never touched by the removal that triggered
/// this demotion, so they are still shared with the map the removal started
/// from and cannot be unwrapped out of their `Rc`. Peek through the share via
/// [`single_leaf_cloned`] instead of requiring unique ownership.
fn demote_to_bitmap<K, V>(slots: Vec<Option<Rc<Node<K, V>>>>, mutid: u64) -> Node<K, V>
where
    K: Clone,
    V: Clone,
{
    let mut bitmap = 0u32;
    let mut entries = Vec::new();
    for (pos, slot) in slots.into_iter().enumerate() {
        if let Some(child) = slot {
            bitmap |= 1 << pos;
            let entry = match single_leaf_cloned(&child) {
                Some((k, v)) => Slot::Leaf(k, v),
                None => Slot::Child(child),
            };
            entries.push(entry);
        }
    }
    Node::Bitmap { bitmap, entries, mutid: Cell::new(mutid) }
}

fn without_collision<K, V>(
    col_hash: i32,
    mut entries: Vec<(K, V)>,
    shift: u32,
    hash: i32,
    key: &K,
    mutid: u64,
) -> WithoutOutcome<K, V>
where
    K: Eq,
{
    if hash != col_hash {
        return WithoutOutcome::NotFound(Node::Collision { hash: col_hash, entries, mutid: Cell::new(mutid) });
    }
    match entries.iter().position(|(k, _)| k == key) {
        None => WithoutOutcome::NotFound(Node::Collision { hash: col_hash, entries, mutid: Cell::new(mutid) }),
        Some(pos) => {
            entries.remove(pos);
            if entries.len() == 1 {
                let (k, v) = entries.pop().expect("one entry remains");
                WithoutOutcome::NewNode(Node::Bitmap {
                    bitmap: bitpos(col_hash, shift),
                    entries: vec![Slot::Leaf(k, v)],
                    mutid: Cell::new(mutid),
                })
            } else {
                WithoutOutcome::NewNode(Node::Collision { hash: col_hash, entries, mutid: Cell::new(mutid) })
            }
        }
    }
}
