use fieldkit_demo::*;
use fieldkit_schema::Record;

#[test]
fn default_forms_are_valid() {
    let flat = flat_schema(&fruit_options()).unwrap();
    let mut values = flat_defaults();
    values.insert("name", "Ada");
    assert!(flat.fields().validate(&values).is_ok());

    let times = times_schema().unwrap();
    assert!(times.fields().validate(&times_defaults()).is_ok());
    assert_eq!(times_defaults().get("times").unwrap().as_array().unwrap().len(), 2);

    let produce = produce_schema().unwrap();
    let list = produce.list("produce").unwrap();
    for item in produce_defaults().unwrap().get("produce").unwrap().as_array().unwrap() {
        let record = Record::from_value(item.clone()).unwrap();
        assert!(list.item().validate(&record).is_ok());
    }
}

#[test]
fn typed_produce_round_trips_through_records() {
    for item in default_produce() {
        let record = Record::from_serialize(&item).unwrap();
        assert!(record.get_str("type").is_some());
        assert_eq!(record.to_typed::<Produce>().unwrap(), item);
    }
}

#[test]
fn empty_option_list_cannot_build_flat_schema() {
    assert!(flat_schema(&[]).is_err());
}

#[test]
fn variant_defaults_cover_both_variants() {
    assert_eq!(variant_defaults("fruit").get_str("fruitName"), Some(""));
    assert_eq!(variant_defaults("vegetable").get_str("vegetableName"), Some(""));
    assert!(variant_defaults("meat").is_empty());
}
