//! Demo forms for fieldkit
//!
//! Schemas and initial values of the three demonstration forms:
//! - flat: name, fetched fruit choice, optional comment
//! - times: name, fruit and a reorderable list of time entries
//! - produce: a list of vegetable or fruit entries

#![warn(unreachable_pub)]
#![allow(missing_docs)]

use fieldkit_core::{CachedOptions, DelayedOptions, FormSchema, StaticOptions};
use fieldkit_list::ListSchema;
use fieldkit_schema::{
    ChoiceOption, ChoiceRule, NumberRule, Record, RecordError, RecordSchema, SchemaError,
    TextRule, UnionSchema, Value,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Message for a missing or unknown fruit
pub const FRUIT_MESSAGE: &str = "Please select a fruit";
/// Message for an empty time-entry list
pub const TIMES_MIN_MESSAGE: &str = "At least one time entry is required";
/// Message for an amount below one
pub const AMOUNT_MESSAGE: &str = "Amount must be at least 1";

// ============================================================================
// Options
// ============================================================================

/// Fruit choices served by the option fetch
pub fn fruit_options() -> Vec<ChoiceOption> {
    vec![
        ChoiceOption::new("apple", "Apple"),
        ChoiceOption::new("banana", "Banana"),
        ChoiceOption::new("orange", "Orange"),
        ChoiceOption::new("blueberry", "Blueberry"),
    ]
}

/// Fruit options behind a one-time delayed fetch
pub fn fruit_source(delay: Duration) -> CachedOptions<DelayedOptions<StaticOptions>> {
    CachedOptions::new(DelayedOptions::new(StaticOptions::new(fruit_options()), delay))
}

// ============================================================================
// Flat form: name, fruit, comment
// ============================================================================

/// Name, fruit chosen from `options`, optional comment
pub fn flat_schema(options: &[ChoiceOption]) -> Result<FormSchema, SchemaError> {
    let fields = RecordSchema::builder()
        .field("name", TextRule::required("Name is required"))
        .field("fruit", ChoiceRule::from_options(options).message(FRUIT_MESSAGE))
        .field("comment", TextRule::optional())
        .build()?;
    FormSchema::builder().fields(fields).build()
}

/// Empty name, `apple`, empty comment
pub fn flat_defaults() -> Record {
    [("name", ""), ("fruit", "apple"), ("comment", "")]
        .into_iter()
        .collect()
}

// ============================================================================
// Times form: name, fruit, times[]
// ============================================================================

/// One entry of the times list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeEntry {
    pub start: String,
    pub end: String,
    pub dinner: String,
}

impl TimeEntry {
    pub fn new(start: &str, end: &str, dinner: &str) -> Self {
        Self {
            start: start.to_string(),
            end: end.to_string(),
            dinner: dinner.to_string(),
        }
    }

    pub fn to_record(&self) -> Record {
        [
            ("start", self.start.as_str()),
            ("end", self.end.as_str()),
            ("dinner", self.dinner.as_str()),
        ]
        .into_iter()
        .collect()
    }
}

/// Every time-entry field is required
pub fn time_entry_schema() -> Result<RecordSchema, SchemaError> {
    RecordSchema::builder()
        .field("start", TextRule::required("Start time is required"))
        .field("end", TextRule::required("End time is required"))
        .field("dinner", TextRule::required("Dinner plan is required"))
        .build()
}

/// Name, fruit and a non-empty list of time entries
pub fn times_schema() -> Result<FormSchema, SchemaError> {
    let fields = RecordSchema::builder()
        .field("name", TextRule::required("Name is required"))
        .field(
            "fruit",
            ChoiceRule::new(["apple", "banana", "orange"]).message(FRUIT_MESSAGE),
        )
        .build()?;
    let times = ListSchema::builder(time_entry_schema()?)
        .min_message(TIMES_MIN_MESSAGE)
        .build()?;
    FormSchema::builder().fields(fields).list("times", times).build()
}

/// Working day and evening
pub fn default_times() -> Vec<TimeEntry> {
    vec![
        TimeEntry::new("09:00", "17:00", "Pasta"),
        TimeEntry::new("18:00", "22:00", "Salad"),
    ]
}

/// John Doe, apple and [`default_times`]
pub fn times_defaults() -> Record {
    let mut defaults: Record = [("name", "John Doe"), ("fruit", "apple")].into_iter().collect();
    let times = default_times()
        .iter()
        .map(|t| t.to_record().into_value())
        .collect();
    defaults.insert("times", Value::Array(times));
    defaults
}

// ============================================================================
// Produce form: produce[] of vegetable | fruit
// ============================================================================

/// Typed produce entry, tagged by `type`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Produce {
    Vegetable {
        #[serde(rename = "vegetableName")]
        vegetable_name: String,
        amount: f64,
    },
    Fruit {
        #[serde(rename = "fruitName")]
        fruit_name: String,
        amount: f64,
    },
}

/// Vegetable or fruit, discriminated by `type`
pub fn produce_union() -> Result<UnionSchema, SchemaError> {
    let amount = || NumberRule::required().min_with_message(1.0, AMOUNT_MESSAGE);
    UnionSchema::builder("type")
        .variant(
            "vegetable",
            RecordSchema::builder()
                .field("vegetableName", TextRule::required("Vegetable name is required"))
                .field("amount", amount())
                .build()?,
        )
        .variant(
            "fruit",
            RecordSchema::builder()
                .field("fruitName", TextRule::required("Fruit name is required"))
                .field("amount", amount())
                .build()?,
        )
        .build()
}

/// A single list of produce entries
pub fn produce_schema() -> Result<FormSchema, SchemaError> {
    FormSchema::builder()
        .list("produce", ListSchema::new(produce_union()?))
        .build()
}

/// A carrot and five apples
pub fn default_produce() -> Vec<Produce> {
    vec![
        Produce::Vegetable {
            vegetable_name: "Carrot".to_string(),
            amount: 2.0,
        },
        Produce::Fruit {
            fruit_name: "Apple".to_string(),
            amount: 5.0,
        },
    ]
}

/// Initial values of the produce form
pub fn produce_defaults() -> Result<Record, RecordError> {
    let items = default_produce()
        .iter()
        .map(|p| Record::from_serialize(p).map(Record::into_value))
        .collect::<Result<Vec<_>, _>>()?;
    Ok([("produce", Value::Array(items))].into_iter().collect())
}

/// Fill-ins used when an entry switches to `variant`
pub fn variant_defaults(variant: &str) -> Record {
    match variant {
        "vegetable" => [("vegetableName", "")].into_iter().collect(),
        "fruit" => [("fruitName", "")].into_iter().collect(),
        _ => Record::new(),
    }
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
