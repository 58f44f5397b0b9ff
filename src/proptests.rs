use super::*;

use proptest::prelude::*;
use proptest_derive::Arbitrary;
use std::collections::BTreeMap;

/// Reference model: sorted map plus an explicit insertion-order vector.
#[derive(Default)]
struct Model {
    map: BTreeMap<Vec<u8>, Option<Vec<u8>>>,
    order: Vec<Vec<u8>>,
}

impl Model {
    fn insert(&mut self, key: Vec<u8>, value: Option<Vec<u8>>) -> Result<()> {
        if self.map.contains_key(&key) {
            return Err(TreeError::DuplicateKey);
        }
        self.order.push(key.clone());
        self.map.insert(key, value);
        Ok(())
    }

    fn delete(&mut self, key: &[u8]) -> Result<()> {
        self.map.remove(key).ok_or(TreeError::KeyNotFound)?;
        self.order.retain(|k| k != key);
        Ok(())
    }

    fn update(&mut self, key: &[u8], value: Option<Vec<u8>>) -> Result<()> {
        let slot = self.map.get_mut(key).ok_or(TreeError::KeyNotFound)?;
        *slot = value;
        Ok(())
    }
}

fn validate_tree<C: Comparator>(t: &AssocTree<'_, C>, mode: DeleteRebalance) {
    let stats = t.verify().unwrap_or_else(|e| panic!("invalid tree: {e}"));
    assert_eq!(stats.len, t.len());
    if mode == DeleteRebalance::Conformant {
        assert!(stats.black_height.is_some(), "black-height must be equal on all paths");
    }
}

fn check_against_model(t: &AssocTree<'_, Lexicographic>, m: &Model) {
    if m.map.is_empty() {
        assert_eq!(t.array_sorted(), Err(TreeError::Empty));
        assert_eq!(t.array_insertion_order(), Err(TreeError::Empty));
        return;
    }
    let sorted: Vec<Vec<u8>> = t.array_sorted().unwrap().iter().map(|k| k.to_vec()).collect();
    let expected: Vec<Vec<u8>> = m.map.keys().cloned().collect();
    assert_eq!(sorted, expected);

    let order: Vec<Vec<u8>> = t
        .array_insertion_order()
        .unwrap()
        .iter()
        .map(|k| k.to_vec())
        .collect();
    assert_eq!(order, m.order);

    for (k, v) in &m.map {
        let got = t.value_of(k).unwrap().map(<[u8]>::to_vec);
        assert_eq!(&got, v);
    }
}

#[derive(Clone, Debug, Arbitrary)]
enum Op {
    Insert(u8, Option<u8>),
    Delete(u8),
    Update(u8, Option<u8>),
    Get(u8),
    Release,
}

/// Map a small key space onto variable-length keys so that prefixes and
/// equal-length neighbours both occur.
fn key_bytes(k: u8) -> Vec<u8> {
    let mut key = vec![b'k'; usize::from(k % 5)];
    key.push(k);
    key
}

fn run_ops(ops: Vec<Op>, mode: DeleteRebalance) -> std::result::Result<(), TestCaseError> {
    let config = TreeConfig::new().with_delete_rebalance(mode);
    let mut t = AssocTree::with_config(Lexicographic, config);
    let mut m = Model::default();

    for op in ops {
        match op {
            Op::Insert(k, v) => {
                let key = key_bytes(k);
                let value = v.map(|v| vec![v; usize::from(v % 40)]);
                let got = t.insert(Blob::copied(&key), value.as_deref().map(Blob::copied));
                prop_assert_eq!(got, m.insert(key, value));
            }
            Op::Delete(k) => {
                let key = key_bytes(k);
                prop_assert_eq!(t.delete(&key), m.delete(&key));
            }
            Op::Update(k, v) => {
                let key = key_bytes(k);
                let value = v.map(|v| vec![v]);
                let got = t.update(&key, value.as_deref().map(Blob::copied));
                prop_assert_eq!(got, m.update(&key, value));
            }
            Op::Get(k) => {
                let key = key_bytes(k);
                let got = t.value_of(&key).map(|v| v.map(<[u8]>::to_vec));
                let expected = m.map.get(&key).cloned().ok_or(TreeError::KeyNotFound);
                prop_assert_eq!(got, expected);
            }
            Op::Release => {
                t.release();
                m = Model::default();
            }
        }
        prop_assert_eq!(t.len(), m.map.len());
    }

    validate_tree(&t, mode);
    check_against_model(&t, &m);
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        max_shrink_iters: 50_000,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_equivalence_conformant(ops in prop::collection::vec(any::<Op>(), 0..=2000)) {
        run_ops(ops, DeleteRebalance::Conformant)?;
    }

    #[test]
    fn prop_equivalence_red_only(ops in prop::collection::vec(any::<Op>(), 0..=2000)) {
        run_ops(ops, DeleteRebalance::RedOnly)?;
    }

    #[test]
    fn prop_insert_permutation_is_balanced(
        keys in Just((0u16..3000).collect::<Vec<u16>>()).prop_shuffle()
    ) {
        let mut t = AssocTree::new(Lexicographic);
        for k in &keys {
            t.insert(Blob::copied(&k.to_be_bytes()), None).unwrap();
        }
        prop_assert_eq!(t.len(), keys.len());
        let stats = t.verify().unwrap();
        prop_assert!(stats.black_height.is_some());
        // 2 * log2(3001)
        prop_assert!(stats.height <= 24);

        let order: Vec<Vec<u8>> = t
            .array_insertion_order()
            .unwrap()
            .iter()
            .map(|k| k.to_vec())
            .collect();
        let expected: Vec<Vec<u8>> = keys.iter().map(|k| k.to_be_bytes().to_vec()).collect();
        prop_assert_eq!(order, expected);
    }

    #[test]
    fn prop_descending_comparator(keys in prop::collection::btree_set(any::<u32>(), 1..500)) {
        let mut t = AssocTree::new(Reverse(Lexicographic));
        for k in &keys {
            t.insert(Blob::copied(&k.to_be_bytes()), None).unwrap();
        }
        let sorted: Vec<Vec<u8>> = t.array_sorted().unwrap().iter().map(|k| k.to_vec()).collect();
        let expected: Vec<Vec<u8>> = keys.iter().rev().map(|k| k.to_be_bytes().to_vec()).collect();
        prop_assert_eq!(sorted, expected);
        t.verify().unwrap();
    }
}

fn for_each_permutation<T: Clone>(items: &[T], mut f: impl FnMut(Vec<T>)) {
    fn rec<T: Clone>(items: &[T], used: &mut [bool], out: &mut Vec<T>, f: &mut impl FnMut(Vec<T>)) {
        if out.len() == items.len() {
            f(out.clone());
            return;
        }
        for i in 0..items.len() {
            if used[i] {
                continue;
            }
            used[i] = true;
            out.push(items[i].clone());
            rec(items, used, out, f);
            out.pop();
            used[i] = false;
        }
    }

    let mut used = vec![false; items.len()];
    let mut out = Vec::with_capacity(items.len());
    rec(items, &mut used, &mut out, &mut f);
}

fn small_keys() -> Vec<Vec<u8>> {
    vec![
        b"a".to_vec(),
        b"b".to_vec(),
        b"c".to_vec(),
        b"aa".to_vec(),
        b"ab".to_vec(),
        b"ba".to_vec(),
        b"bb".to_vec(),
    ]
}

#[test]
fn exhaustive_insert_order_small_set() {
    let keys = small_keys();
    for_each_permutation(&keys, |perm| {
        let mut t = AssocTree::new(Lexicographic);
        let mut m = Model::default();
        for (i, k) in perm.into_iter().enumerate() {
            let v = vec![i as u8];
            t.insert(Blob::copied(&k), Some(Blob::copied(&v))).unwrap();
            m.insert(k, Some(v)).unwrap();
        }
        validate_tree(&t, DeleteRebalance::Conformant);
        check_against_model(&t, &m);
    });
}

#[test]
fn exhaustive_delete_order_small_set() {
    let keys = small_keys();

    for mode in [DeleteRebalance::Conformant, DeleteRebalance::RedOnly] {
        // Insert in a fixed order, then delete in all permutations.
        let config = TreeConfig::new().with_delete_rebalance(mode);
        let mut base_tree = AssocTree::with_config(Lexicographic, config);
        let mut base_model = Model::default();
        for (i, k) in keys.iter().enumerate() {
            let v = vec![i as u8];
            base_tree.insert(Blob::copied(k), Some(Blob::copied(&v))).unwrap();
            base_model.insert(k.clone(), Some(v)).unwrap();
        }

        for_each_permutation(&keys, |perm| {
            let mut t = base_tree.clone();
            let mut m = Model {
                map: base_model.map.clone(),
                order: base_model.order.clone(),
            };

            for k in perm {
                assert_eq!(t.delete(&k), m.delete(&k));
                assert_eq!(t.len(), m.map.len());
                validate_tree(&t, mode);
                check_against_model(&t, &m);
            }
            assert!(t.is_empty());
            assert!(t.raw.root.is_nil());
            assert!(t.raw.head.is_nil());
        });
    }
}
