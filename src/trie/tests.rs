use proptest::collection::vec as pvec;
use proptest::prelude::*;

use super::Trie;

fn hash_all(trie: &mut Trie, s: &[u8]) -> u32 {
    trie.hash(s, 0, s.len())
}

#[test]
fn empty_slice_is_always_zero() {
    let mut trie = Trie::new();
    assert_eq!(hash_all(&mut trie, b""), 0);
    assert_eq!(hash_all(&mut trie, b"anything"), trie.hash(b"anything", 0, 8));
    assert_eq!(hash_all(&mut trie, b""), 0);
}

#[test]
fn repeated_insertion_returns_same_id() {
    let mut trie = Trie::new();
    let a = hash_all(&mut trie, b"hello");
    let b = hash_all(&mut trie, b"hello");
    assert_eq!(a, b);
    assert_eq!(trie.value(a), b"hello");
}

#[test]
fn distinct_values_get_distinct_ids() {
    let mut trie = Trie::new();
    let a = hash_all(&mut trie, b"hello");
    let b = hash_all(&mut trie, b"world");
    assert_ne!(a, b);
    assert_eq!(trie.value(a), b"hello");
    assert_eq!(trie.value(b), b"world");
}

#[test]
fn ids_are_assigned_in_first_use_order() {
    let mut trie = Trie::new();
    let first = hash_all(&mut trie, b"alpha");
    let second = hash_all(&mut trie, b"beta");
    let third = hash_all(&mut trie, b"gamma");
    assert_eq!([first, second, third], [1, 2, 3]);
}

#[test]
fn shared_prefix_extends_without_collision() {
    let mut trie = Trie::new();
    let a = hash_all(&mut trie, b"a");
    let ab = hash_all(&mut trie, b"ab");
    let abc = hash_all(&mut trie, b"abc");
    assert_ne!(a, ab);
    assert_ne!(ab, abc);
    assert_eq!(trie.value(a), b"a");
    assert_eq!(trie.value(ab), b"ab");
    assert_eq!(trie.value(abc), b"abc");

    // Re-insertion after the tree has branched still finds the right node.
    assert_eq!(hash_all(&mut trie, b"a"), a);
    assert_eq!(hash_all(&mut trie, b"ab"), ab);
    assert_eq!(hash_all(&mut trie, b"abc"), abc);
}

#[test]
fn divergent_suffixes_split_the_edge() {
    let mut trie = Trie::new();
    let apple = hash_all(&mut trie, b"apple");
    let apply = hash_all(&mut trie, b"apply");
    assert_ne!(apple, apply);
    assert_eq!(trie.value(apple), b"apple");
    assert_eq!(trie.value(apply), b"apply");

    // The shared prefix "appl" never got its own cell content; only full
    // inserted strings do.
    let appl = hash_all(&mut trie, b"appl");
    assert_ne!(appl, apple);
    assert_ne!(appl, apply);
    assert_eq!(trie.value(appl), b"appl");
}

#[test]
fn prefix_inserted_after_its_extension_still_splits_correctly() {
    let mut trie = Trie::new();
    let apple = hash_all(&mut trie, b"apple");
    // Insert a prefix of an already-present string: exercises the
    // "exhausted mid-edge" split (AddNewEnd).
    let app = hash_all(&mut trie, b"app");
    assert_ne!(apple, app);
    assert_eq!(trie.value(app), b"app");
    assert_eq!(hash_all(&mut trie, b"app"), app);
    assert_eq!(hash_all(&mut trie, b"apple"), apple);
}

#[test]
fn long_values_beyond_four_bytes_round_trip() {
    let mut trie = Trie::new();
    let long_value = b"this value is much longer than four bytes of prefix";
    let id = hash_all(&mut trie, long_value);
    assert_eq!(trie.value(id), long_value);
    assert_eq!(hash_all(&mut trie, long_value), id);
}

#[test]
fn many_single_byte_siblings_under_root() {
    let mut trie = Trie::new();
    let mut ids = Vec::new();
    for byte in 0u8..=255 {
        ids.push(hash_all(&mut trie, &[byte]));
    }
    for (byte, &id) in ids.iter().enumerate() {
        assert_eq!(trie.value(id), &[byte as u8]);
    }
}

proptest! {
    #[test]
    fn hash_is_consistent_and_injective(values in pvec(pvec(any::<u8>(), 0..12), 1..40)) {
        let mut trie = Trie::new();
        let mut by_id: std::collections::HashMap<u32, Vec<u8>> = std::collections::HashMap::new();
        for v in &values {
            let id = trie.hash(v, 0, v.len());
            if v.is_empty() {
                prop_assert_eq!(id, 0);
                continue;
            }
            prop_assert!(id > 0);
            if let Some(existing) = by_id.get(&id) {
                prop_assert_eq!(existing, v);
            } else {
                by_id.insert(id, v.clone());
            }
            prop_assert_eq!(trie.value(id), v.as_slice());
        }
    }
}
