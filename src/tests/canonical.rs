use crate::Map;

/// Insertion order must not affect the resulting content hash.
#[test]
fn assoc_order_abc_cba_bca() {
    let orders: [&[(i32, i32)]; 3] =
        [&[(1, 10), (2, 20), (3, 30)], &[(3, 30), (2, 20), (1, 10)], &[(2, 20), (3, 30), (1, 10)]];

    let maps: Vec<Map<i32, i32>> = orders
        .iter()
        .map(|pairs| {
            let mut m = Map::new();
            for &(k, v) in *pairs {
                m = m.assoc(k, v);
            }
            m
        })
        .collect();

    assert_eq!(maps[0].content_hash(), maps[1].content_hash());
    assert_eq!(maps[1].content_hash(), maps[2].content_hash());
    assert_eq!(maps[0], maps[1]);
    assert_eq!(maps[1], maps[2]);
}

/// Larger set — 100 entries, three orderings.
#[test]
fn assoc_order_100_entries() {
    let entries: Vec<(u64, u64)> = (0..100).map(|i| (i, i * 7)).collect();

    let mut forward = Map::new();
    for &(k, v) in &entries {
        forward = forward.assoc(k, v);
    }

    let mut backward = Map::new();
    for &(k, v) in entries.iter().rev() {
        backward = backward.assoc(k, v);
    }

    let mut interleaved = Map::new();
    for &(k, v) in entries.iter().step_by(2) {
        interleaved = interleaved.assoc(k, v);
    }
    for &(k, v) in entries.iter().skip(1).step_by(2) {
        interleaved = interleaved.assoc(k, v);
    }

    assert_eq!(forward.content_hash(), backward.content_hash());
    assert_eq!(forward.content_hash(), interleaved.content_hash());
    assert_eq!(forward.len(), 100);
}

/// After overwrite, order independence still holds.
#[test]
fn overwrite_preserves_canonicity() {
    let map_a = Map::new().assoc(1, 10).assoc(2, 20).assoc(1, 11);
    let map_b = Map::new().assoc(2, 20).assoc(1, 11);

    assert_eq!(map_a.content_hash(), map_b.content_hash());
    assert_eq!(map_a, map_b);
}

/// After removal, order independence holds.
#[test]
fn without_preserves_canonicity() {
    let map_a = Map::new().assoc(1, 10).assoc(2, 20).assoc(3, 30).without(&2).unwrap();
    let map_b = Map::new().assoc(3, 30).assoc(1, 10);

    assert_eq!(map_a.content_hash(), map_b.content_hash());
    assert_eq!(map_a, map_b);
}
