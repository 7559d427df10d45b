//! Property tests for identity and error tracking under arbitrary edits

use fieldkit_list::{ItemKey, ListController, ListSchema};
use fieldkit_schema::{FieldPath, Record, RecordSchema, TextRule};
use proptest::prelude::*;
use serde_json::json;
use std::collections::{BTreeMap, HashSet};

#[derive(Debug, Clone)]
enum Op {
    Append(bool),
    Insert(usize, bool),
    Remove(usize),
    Move(usize, usize),
    Swap(usize, usize),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        any::<bool>().prop_map(Op::Append),
        (0usize..8, any::<bool>()).prop_map(|(i, v)| Op::Insert(i, v)),
        (0usize..8).prop_map(Op::Remove),
        (0usize..8, 0usize..8).prop_map(|(a, b)| Op::Move(a, b)),
        (0usize..8, 0usize..8).prop_map(|(a, b)| Op::Swap(a, b)),
    ]
}

fn schema() -> ListSchema {
    ListSchema::new(
        RecordSchema::builder()
            .field("name", TextRule::required("Name is required"))
            .build()
            .unwrap(),
    )
}

fn item(valid: bool) -> Record {
    let name = if valid { "ok" } else { "" };
    Record::from_value(json!({ "name": name })).unwrap()
}

fn apply(list: &mut ListController, op: &Op) {
    match *op {
        Op::Append(valid) => {
            list.append(item(valid));
        }
        Op::Insert(index, valid) => {
            list.insert(index, item(valid));
        }
        Op::Remove(index) => {
            list.remove(index);
        }
        Op::Move(from, to) => {
            list.move_item(from, to);
        }
        Op::Swap(a, b) => {
            list.swap(a, b);
        }
    }
}

fn invalid_keys(list: &ListController) -> BTreeMap<ItemKey, bool> {
    list.keys()
        .iter()
        .map(|key| (*key, !list.item_errors(*key).unwrap().is_empty()))
        .collect()
}

proptest! {
    #[test]
    fn keys_stay_unique_and_are_never_reused(ops in prop::collection::vec(op(), 0..40)) {
        let mut list = ListController::new(schema());
        let mut seen = HashSet::new();
        for op in &ops {
            let before: HashSet<ItemKey> = list.keys().iter().copied().collect();
            apply(&mut list, op);
            let current: HashSet<ItemKey> = list.keys().iter().copied().collect();
            prop_assert_eq!(current.len(), list.len());
            for key in current.difference(&before) {
                prop_assert!(seen.insert(*key), "key {} issued twice", key);
            }
        }
    }

    #[test]
    fn errors_follow_their_entry(ops in prop::collection::vec(op(), 0..40)) {
        let mut list = ListController::new(schema());
        let mut expected: BTreeMap<ItemKey, bool> = BTreeMap::new();
        for op in &ops {
            apply(&mut list, op);
            let now = invalid_keys(&list);
            for (key, invalid) in &now {
                if let Some(prev) = expected.get(key) {
                    prop_assert_eq!(prev, invalid);
                }
            }
            expected = now;
        }
    }

    #[test]
    fn absolute_errors_match_positions(ops in prop::collection::vec(op(), 0..40)) {
        let mut list = ListController::new(schema());
        for op in &ops {
            apply(&mut list, op);
        }
        let prefix = FieldPath::key("people");
        let tree = list.errors_at(&prefix);
        for (position, (_, record)) in list.iter().enumerate() {
            let path = prefix.child_index(position).child_key("name");
            let empty = record.get_str("name") == Some("");
            prop_assert_eq!(tree.field(&path).is_some(), empty);
        }
        prop_assert_eq!(tree.list(&prefix).is_some(), list.is_empty());
    }

    #[test]
    fn move_then_move_back_restores_order(len in 1usize..8, from in 0usize..8, to in 0usize..8) {
        let mut list = ListController::new(schema());
        for _ in 0..len {
            list.append(item(true));
        }
        let original = list.keys().to_vec();
        let (from, to) = (from % len, to % len);
        list.move_item(from, to);
        list.move_item(to, from);
        prop_assert_eq!(list.keys(), original.as_slice());
    }
}
