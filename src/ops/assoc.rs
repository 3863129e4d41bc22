//! Associating a binding into a subtree (insert-or-replace).

use std::cell::Cell;
use std::hash::Hash;
use std::rc::Rc;

use crate::node::{bitindex, bitpos, eligible, mask, nth_set_bit, Node, Slot, BITS_PER_LEVEL};

/// Associates `key => value` into the root slot, returning whether the
/// map's cardinality grew.
pub fn assoc_root<K, V>(
    root: &mut Option<Rc<Node<K, V>>>,
    hash: i32,
    key: K,
    value: V,
    mutid: u64,
) -> bool
where
    K: Hash + Eq + Clone,
    V: Clone + PartialEq,
{
    match root {
        None => {
            *root = Some(Rc::new(Node::single_leaf(key, value, 0, hash, mutid)));
            true
        }
        Some(rc) => assoc(rc, 0, hash, key, value, mutid),
    }
}

/// Associates `key => value` into `*rc`, mutating it in place when `mutid`
/// grants exclusive ownership and cloning otherwise.
pub fn assoc<K, V>(rc: &mut Rc<Node<K, V>>, shift: u32, hash: i32, key: K, value: V, mutid: u64) -> bool
where
    K: Hash + Eq + Clone,
    V: Clone + PartialEq,
{
    let can_mutate = eligible(rc, mutid);
    let (new_node, added) = if can_mutate {
        let node = Rc::get_mut(rc).expect("checked eligible");
        let taken = std::mem::replace(node, Node::empty_bitmap(mutid));
        assoc_owned(taken, shift, hash, key, value, mutid)
    } else {
        assoc_cloned(rc, shift, hash, key, value, mutid)
    };
    if can_mutate {
        *Rc::get_mut(rc).expect("checked eligible") = new_node;
    } else {
        *rc = Rc::new(new_node);
    }
    added
}

fn assoc_owned<K, V>(node: Node<K, V>, shift: u32, hash: i32, key: K, value: V, mutid: u64) -> (Node<K, V>, bool)
where
    K: Hash + Eq + Clone,
    V: Clone + PartialEq,
{
    match node {
        Node::Bitmap { bitmap, entries, .. } => assoc_bitmap(bitmap, entries, shift, hash, key, value, mutid),
        Node::Array { slots, count, .. } => assoc_array(slots, count, shift, hash, key, value, mutid),
        Node::Collision { hash: col_hash, entries, .. } => {
            assoc_collision(col_hash, entries, shift, hash, key, value, mutid)
        }
    }
}

fn assoc_cloned<K, V>(rc: &Rc<Node<K, V>>, shift: u32, hash: i32, key: K, value: V, mutid: u64) -> (Node<K, V>, bool)
where
    K: Hash + Eq + Clone,
    V: Clone + PartialEq,
{
    match &**rc {
        Node::Bitmap { bitmap, entries, .. } => assoc_bitmap(*bitmap, entries.clone(), shift, hash, key, value, mutid),
        Node::Array { slots, count, .. } => assoc_array(slots.clone(), *count, shift, hash, key, value, mutid),
        Node::Collision { hash: col_hash, entries, .. } => {
            assoc_collision(*col_hash, entries.clone(), shift, hash, key, value, mutid)
        }
    }
}

fn assoc_bitmap<K, V>(
    bitmap: u32,
    mut entries: Vec<Slot<K, V>>,
    shift: u32,
    hash: i32,
    key: K,
    value: V,
    mutid: u64,
) -> (Node<K, V>, bool)
where
    K: Hash + Eq + Clone,
    V: Clone + PartialEq,
{
    let bit = bitpos(hash, shift);
    let idx = bitindex(bitmap, bit);

    if bitmap & bit != 0 {
        match entries.remove(idx) {
            Slot::Child(mut child) => {
                let added = assoc(&mut child, shift + BITS_PER_LEVEL, hash, key, value, mutid);
                entries.insert(idx, Slot::Child(child));
                (Node::Bitmap { bitmap, entries, mutid: Cell::new(mutid) }, added)
            }
            Slot::Leaf(k2, v2) => {
                if k2 == key {
                    entries.insert(idx, Slot::Leaf(k2, value));
                    (Node::Bitmap { bitmap, entries, mutid: Cell::new(mutid) }, false)
                } else {
                    let h2 = crate::hash::hash32(&k2);
                    let child = make_bitmap_or_collision(
                        (h2, k2, v2),
                        (hash, key, value),
                        shift + BITS_PER_LEVEL,
                        mutid,
                    );
                    entries.insert(idx, Slot::Child(Rc::new(child)));
                    (Node::Bitmap { bitmap, entries, mutid: Cell::new(mutid) }, true)
                }
            }
        }
    } else {
        let n = entries.len();
        if n < 16 {
            entries.insert(idx, Slot::Leaf(key, value));
            (
                Node::Bitmap { bitmap: bitmap | bit, entries, mutid: Cell::new(mutid) },
                true,
            )
        } else {
            log::trace!("promoting bitmap to array at shift={shift} (17th entry)");
            (promote_to_array(bitmap, entries, shift, hash, key, value, mutid), true)
        }
    }
}

fn promote_to_array<K, V>(
    bitmap: u32,
    entries: Vec<Slot<K, V>>,
    shift: u32,
    hash: i32,
    key: K,
    value: V,
    mutid: u64,
) -> Node<K, V>
where
    K: Hash + Eq + Clone,
{
    let mut slots: Vec<Option<Rc<Node<K, V>>>> = (0..32).map(|_| None).collect();
    let mut count = 0usize;
    for (i, slot) in entries.into_iter().enumerate() {
        let pos = nth_set_bit(bitmap, i) as usize;
        let child = match slot {
            Slot::Child(c) => c,
            Slot::Leaf(k, v) => {
                let h = crate::hash::hash32(&k);
                Rc::new(Node::single_leaf(k, v, shift + BITS_PER_LEVEL, h, mutid))
            }
        };
        slots[pos] = Some(child);
        count += 1;
    }
    let incoming = mask(hash, shift) as usize;
    slots[incoming] = Some(Rc::new(Node::single_leaf(key, value, shift + BITS_PER_LEVEL, hash, mutid)));
    count += 1;
    Node::Array { slots, count, mutid: Cell::new(mutid) }
}

fn assoc_array<K, V>(
    mut slots: Vec<Option<Rc<Node<K, V>>>>,
    mut count: usize,
    shift: u32,
    hash: i32,
    key: K,
    value: V,
    mutid: u64,
) -> (Node<K, V>, bool)
where
    K: Hash + Eq + Clone,
    V: Clone + PartialEq,
{
    let i = mask(hash, shift) as usize;
    let added = if let Some(mut child) = slots[i].take() {
        let added = assoc(&mut child, shift + BITS_PER_LEVEL, hash, key, value, mutid);
        slots[i] = Some(child);
        added
    } else {
        slots[i] = Some(Rc::new(Node::single_leaf(key, value, shift + BITS_PER_LEVEL, hash, mutid)));
        count += 1;
        true
    };
    (Node::Array { slots, count, mutid: Cell::new(mutid) }, added)
}

fn assoc_collision<K, V>(
    col_hash: i32,
    mut entries: Vec<(K, V)>,
    shift: u32,
    hash: i32,
    key: K,
    value: V,
    mutid: u64,
) -> (Node<K, V>, bool)
where
    K: Hash + Eq + Clone,
    V: Clone + PartialEq,
{
    if hash == col_hash {
        if let Some(existing) = entries.iter_mut().find(|(k, _)| *k == key) {
            existing.1 = value;
            return (Node::Collision { hash: col_hash, entries, mutid: Cell::new(mutid) }, false);
        }
        entries.push((key, value));
        (Node::Collision { hash: col_hash, entries, mutid: Cell::new(mutid) }, true)
    } else {
        let collision_node = Node::Collision { hash: col_hash, entries, mutid: Cell::new(mutid) };
        let bitmap_parent = Node::Bitmap {
            bitmap: bitpos(col_hash, shift),
            entries: vec![Slot::Child(Rc::new(collision_node))],
            mutid: Cell::new(mutid),
        };
        let mut rc = Rc::new(bitmap_parent);
        let added = assoc(&mut rc, shift, hash, key, value, mutid);
        let node = Rc::try_unwrap(rc).unwrap_or_else(|_| unreachable!("uniquely owned scratch node"));
        (node, added)
    }
}

/// Builds the smallest subtree holding two known-distinct bindings,
/// diverging level by level until their hashes disagree (a `Bitmap`
/// chain) or collapsing into a `Collision` node if the hashes are equal.
fn make_bitmap_or_collision<K, V>(first: (i32, K, V), second: (i32, K, V), shift: u32, mutid: u64) -> Node<K, V>
where
    K: Hash + Eq + Clone,
    V: Clone + PartialEq,
{
    let (h1, k1, v1) = first;
    let (h2, k2, v2) = second;
    if h1 == h2 {
        log::trace!("collapsing into collision node at shift={shift} (hash {h1:#010x})");
        return Node::Collision { hash: h1, entries: vec![(k1, v1), (k2, v2)], mutid: Cell::new(mutid) };
    }
    let mut rc = Rc::new(Node::empty_bitmap(mutid));
    assoc(&mut rc, shift, h1, k1, v1, mutid);
    assoc(&mut rc, shift, h2, k2, v2, mutid);
    Rc::try_unwrap(rc).unwrap_or_else(|_| unreachable!("uniquely owned scratch node"))
}
