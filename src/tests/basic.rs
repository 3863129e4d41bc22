use crate::Map;

#[test]
fn empty_map() {
    let map: Map<String, i32> = Map::new();
    assert_eq!(map.len(), 0);
    assert!(map.is_empty());
    assert_eq!(map.content_hash(), 0);
}

#[test]
fn assoc_one() {
    let map = Map::new().assoc("hello", 42);
    assert_eq!(map.len(), 1);
    assert!(!map.is_empty());
    assert_ne!(map.content_hash(), 0);
}

#[test]
fn assoc_and_get() {
    let map = Map::new().assoc("key", 100);
    assert_eq!(map.get(&"key"), Some(&100));
}

#[test]
fn get_missing_key() {
    let map = Map::new().assoc("a", 1);
    assert_eq!(map.get(&"b"), None);
}

#[test]
fn assoc_multiple() {
    let mut map = Map::new();
    for i in 0..10 {
        map = map.assoc(i, i * 10);
    }
    assert_eq!(map.len(), 10);
    for i in 0..10 {
        assert_eq!(map.get(&i), Some(&(i * 10)));
    }
}

#[test]
fn overwrite_value() {
    let map = Map::new().assoc("k", 1);
    assert_eq!(map.len(), 1);
    let map2 = map.assoc("k", 2);
    assert_eq!(map2.len(), 1);
    assert_eq!(map2.get(&"k"), Some(&2));
    // Original is untouched — persistence.
    assert_eq!(map.get(&"k"), Some(&1));
}

#[test]
fn contains_key_true() {
    let map = Map::new().assoc(42, "val");
    assert!(map.contains_key(&42));
}

#[test]
fn contains_key_false() {
    let map = Map::new().assoc(1, "a");
    assert!(!map.contains_key(&2));
}

#[test]
fn without_existing() {
    let map = Map::new().assoc("a", 1).assoc("b", 2);
    let map2 = map.without(&"a").unwrap();
    assert_eq!(map2.len(), 1);
    assert_eq!(map2.get(&"a"), None);
    assert_eq!(map2.get(&"b"), Some(&2));
}

#[test]
fn without_missing() {
    let map = Map::new().assoc("a", 1);
    assert!(map.without(&"z").is_err());
    assert_eq!(map.len(), 1);
}

#[test]
fn without_all() {
    let map = Map::new().assoc(1, 10).assoc(2, 20).assoc(3, 30);
    let map = map.without(&1).unwrap();
    let map = map.without(&2).unwrap();
    let map = map.without(&3).unwrap();
    assert!(map.is_empty());
    assert_eq!(map.content_hash(), 0);
}

#[test]
fn content_hash_changes_on_assoc() {
    let m0 = Map::new();
    let h0 = m0.content_hash();
    let m1 = m0.assoc(1, 1);
    let h1 = m1.content_hash();
    let m2 = m1.assoc(2, 2);
    let h2 = m2.content_hash();
    assert_ne!(h0, h1);
    assert_ne!(h1, h2);
}

#[test]
fn content_hash_changes_on_overwrite() {
    let m1 = Map::new().assoc("k", 1);
    let h1 = m1.content_hash();
    let m2 = m1.assoc("k", 2);
    let h2 = m2.content_hash();
    assert_ne!(h1, h2);
}
