//! End-to-end list scenarios over a time-entry list

use fieldkit_list::{ListController, ListSchema};
use fieldkit_schema::{FieldPath, Record, RecordSchema, TextRule};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};

fn p(s: &str) -> FieldPath {
    s.parse().unwrap()
}

fn times_schema() -> ListSchema {
    let entry = RecordSchema::builder()
        .field("start", TextRule::required("Start time is required"))
        .field("end", TextRule::required("End time is required"))
        .field("dinner", TextRule::optional())
        .build()
        .unwrap();
    ListSchema::builder(entry)
        .min_message("At least one time entry is required")
        .build()
        .unwrap()
}

fn time(start: &str) -> Record {
    Record::from_value(json!({ "start": start, "end": "17:00", "dinner": "" })).unwrap()
}

fn starts(list: &ListController) -> Vec<Value> {
    list.iter().map(|(_, r)| r.get("start").cloned().unwrap_or(Value::Null)).collect()
}

#[test]
fn move_last_to_front() {
    let mut list = ListController::with_records(
        times_schema(),
        vec![time("A"), time("B"), time("C")],
        true,
    );
    let [k1, k2, k3] = [list.keys()[0], list.keys()[1], list.keys()[2]];

    assert!(list.move_item(2, 0));

    assert_eq!(starts(&list), vec![json!("C"), json!("A"), json!("B")]);
    assert_eq!(list.keys(), &[k3, k1, k2]);
    assert_eq!(k1.to_string(), "k1");
}

#[test]
fn removing_last_entry_reports_minimum() {
    let mut list = ListController::with_records(times_schema(), vec![time("08:00")], true);

    list.remove(0);

    assert_eq!(list.to_value(), json!([]));
    let tree = list.errors_at(&p("times"));
    assert_eq!(tree.list(&p("times")), Some("At least one time entry is required"));
    assert_eq!(
        tree.to_flat().get("times.root").map(String::as_str),
        Some("At least one time entry is required")
    );
}

#[test]
fn appending_clears_minimum() {
    let mut list = ListController::new(times_schema());
    assert!(list.has_errors());

    list.append(time("08:00"));

    assert_eq!(list.list_error(), None);
    assert!(!list.has_errors());
}

#[test]
fn clearing_a_required_field_reports_it_at_the_entry_path() {
    let mut list =
        ListController::with_records(times_schema(), vec![time("08:00"), time("09:00")], true);

    assert!(list.set_field(1, &p("end"), json!("")));

    let tree = list.errors_at(&p("times"));
    assert_eq!(tree.field(&p("times.1.end")), Some("End time is required"));
    assert_eq!(tree.len(), 1);
}

#[test]
fn move_to_same_position_changes_nothing() {
    let mut list =
        ListController::with_records(times_schema(), vec![time("A"), time("")], true);
    let keys = list.keys().to_vec();
    let errors = list.errors_at(&p("times"));

    assert!(!list.move_item(1, 1));

    assert_eq!(list.keys(), keys.as_slice());
    assert_eq!(list.errors_at(&p("times")), errors);
    assert_eq!(errors.field(&p("times.1.start")), Some("Start time is required"));
}

#[test]
fn removed_keys_are_not_reissued() {
    let mut list = ListController::new(times_schema());
    let first = list.append(time("A"));
    list.remove(0);
    let second = list.append(time("B"));
    assert!(second > first);
}
