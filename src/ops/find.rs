//! Read-only key lookup.

use crate::node::{bitindex, bitpos, mask, Node, Slot, BITS_PER_LEVEL};

/// Looks up `key` in the subtree rooted at `node`.
pub fn find<'a, K: Eq, V>(node: &'a Node<K, V>, shift: u32, hash: i32, key: &K) -> Option<&'a V> {
    match node {
        Node::Bitmap { bitmap, entries, .. } => {
            let bit = bitpos(hash, shift);
            if bitmap & bit == 0 {
                return None;
            }
            match &entries[bitindex(*bitmap, bit)] {
                Slot::Leaf(k, v) => (k == key).then_some(v),
                Slot::Child(child) => find(child, shift + BITS_PER_LEVEL, hash, key),
            }
        }
        Node::Array { slots, .. } => slots[mask(hash, shift) as usize]
            .as_ref()
            .and_then(|child| find(child, shift + BITS_PER_LEVEL, hash, key)),
        Node::Collision { hash: col_hash, entries, .. } => {
            if *col_hash != hash {
                return None;
            }
            entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
        }
    }
}
