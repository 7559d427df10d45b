//! Per-field validation rules
//!
//! Supported rules:
//! - text: required/non-empty string, optional string
//! - number: numeric with inclusive lower bound, string input coerced first
//! - choice: enum membership with an overridable mismatch message
//! - nested: a record validated by its own [`RecordSchema`]

use crate::record::json_type_name;
use crate::schema::RecordSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};

/// Validation rule for a single field
#[derive(Debug, Clone, PartialEq)]
pub enum FieldRule {
    /// String field
    Text(TextRule),
    /// Numeric field
    Number(NumberRule),
    /// Enum membership
    Choice(ChoiceRule),
    /// Nested record
    Nested(RecordSchema),
}

impl FieldRule {
    /// Returns the rule name for diagnostics
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            FieldRule::Text(_) => "text",
            FieldRule::Number(_) => "number",
            FieldRule::Choice(_) => "choice",
            FieldRule::Nested(_) => "nested",
        }
    }
}

impl From<TextRule> for FieldRule {
    fn from(rule: TextRule) -> Self {
        FieldRule::Text(rule)
    }
}

impl From<NumberRule> for FieldRule {
    fn from(rule: NumberRule) -> Self {
        FieldRule::Number(rule)
    }
}

impl From<ChoiceRule> for FieldRule {
    fn from(rule: ChoiceRule) -> Self {
        FieldRule::Choice(rule)
    }
}

impl From<RecordSchema> for FieldRule {
    fn from(schema: RecordSchema) -> Self {
        FieldRule::Nested(schema)
    }
}

/// Message used when a required value is absent and no override exists
pub const REQUIRED_MESSAGE: &str = "Required";

/// String rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRule {
    required: bool,
    min_len: usize,
    message: String,
}

impl TextRule {
    /// Required, non-empty string
    #[must_use]
    pub fn required(message: impl Into<String>) -> Self {
        Self {
            required: true,
            min_len: 1,
            message: message.into(),
        }
    }

    /// Optional string; missing and empty values pass
    #[must_use]
    pub fn optional() -> Self {
        Self {
            required: false,
            min_len: 0,
            message: REQUIRED_MESSAGE.to_string(),
        }
    }

    /// Minimum length in characters for non-empty values
    #[must_use]
    pub fn min_len(mut self, min_len: usize) -> Self {
        self.min_len = min_len;
        self
    }

    /// Whether the field must be present and non-empty
    #[inline]
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.required
    }

    pub(crate) fn check(&self, value: Option<&Value>) -> Option<String> {
        match value {
            None | Some(Value::Null) => self.required.then(|| self.message.clone()),
            Some(Value::String(s)) => {
                if s.is_empty() && !self.required {
                    None
                } else if s.chars().count() < self.min_len {
                    Some(self.message.clone())
                } else {
                    None
                }
            }
            Some(other) => Some(format!(
                "Expected string, received {}",
                json_type_name(other)
            )),
        }
    }
}

/// Numeric rule with optional inclusive lower bound
#[derive(Debug, Clone, PartialEq)]
pub struct NumberRule {
    required: bool,
    min: Option<f64>,
    integer: bool,
    required_message: String,
    min_message: Option<String>,
}

impl NumberRule {
    /// Required number
    #[must_use]
    pub fn required() -> Self {
        Self {
            required: true,
            min: None,
            integer: false,
            required_message: REQUIRED_MESSAGE.to_string(),
            min_message: None,
        }
    }

    /// Optional number
    #[must_use]
    pub fn optional() -> Self {
        Self {
            required: false,
            ..Self::required()
        }
    }

    /// Inclusive lower bound
    #[must_use]
    pub fn min(mut self, min: f64) -> Self {
        self.min = Some(min);
        self
    }

    /// Inclusive lower bound with a custom message
    #[must_use]
    pub fn min_with_message(mut self, min: f64, message: impl Into<String>) -> Self {
        self.min = Some(min);
        self.min_message = Some(message.into());
        self
    }

    /// Reject values with a fractional part
    #[must_use]
    pub fn integer(mut self) -> Self {
        self.integer = true;
        self
    }

    /// Message for missing values
    #[must_use]
    pub fn required_message(mut self, message: impl Into<String>) -> Self {
        self.required_message = message.into();
        self
    }

    /// Declared lower bound
    #[inline]
    #[must_use]
    pub fn lower_bound(&self) -> Option<f64> {
        self.min
    }

    /// Coerce a value into a number without checking bounds
    ///
    /// Numeric strings (surrounding whitespace allowed) become numbers;
    /// anything else is returned unchanged.
    #[must_use]
    pub fn coerce(value: &Value) -> Value {
        match value {
            Value::String(s) => match parse_number(s) {
                Some(n) => Number::from_f64(n).map_or_else(|| value.clone(), Value::Number),
                None => value.clone(),
            },
            other => other.clone(),
        }
    }

    pub(crate) fn check(&self, value: Option<&Value>) -> Option<String> {
        let number = match value {
            None | Some(Value::Null) => {
                return self.required.then(|| self.required_message.clone());
            }
            Some(Value::Number(n)) => n.as_f64().unwrap_or(f64::NAN),
            Some(Value::String(s)) if s.trim().is_empty() => {
                return self.required.then(|| self.required_message.clone());
            }
            Some(Value::String(s)) => match parse_number(s) {
                Some(n) => n,
                None => return Some("Expected number, received string".to_string()),
            },
            Some(other) => {
                return Some(format!(
                    "Expected number, received {}",
                    json_type_name(other)
                ));
            }
        };

        if self.integer && number.fract() != 0.0 {
            return Some("Expected integer, received float".to_string());
        }

        match self.min {
            Some(min) if number < min => Some(
                self.min_message
                    .clone()
                    .unwrap_or_else(|| format!("Number must be greater than or equal to {min}")),
            ),
            _ => None,
        }
    }
}

fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|n| n.is_finite())
}

/// One selectable option, as supplied by an options source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChoiceOption {
    /// Value stored in the record
    pub value: String,
    /// Human-readable label
    pub label: String,
}

impl ChoiceOption {
    /// Create new option
    #[must_use]
    pub fn new(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
        }
    }
}

/// Enum membership rule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceRule {
    options: Vec<String>,
    message: Option<String>,
}

impl ChoiceRule {
    /// Rule accepting exactly the given values
    #[must_use]
    pub fn new<I, S>(options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            options: options.into_iter().map(Into::into).collect(),
            message: None,
        }
    }

    /// Rule accepting the values of fetched options
    #[must_use]
    pub fn from_options(options: &[ChoiceOption]) -> Self {
        Self::new(options.iter().map(|o| o.value.clone()))
    }

    /// Replace every failure message with a fixed fallback
    #[must_use]
    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Accepted values
    #[inline]
    #[must_use]
    pub fn options(&self) -> &[String] {
        &self.options
    }

    /// Check membership
    #[inline]
    #[must_use]
    pub fn accepts(&self, value: &str) -> bool {
        self.options.iter().any(|o| o == value)
    }

    pub(crate) fn check(&self, value: Option<&Value>) -> Option<String> {
        let failure = match value {
            Some(Value::String(s)) if self.accepts(s) => return None,
            None | Some(Value::Null) => REQUIRED_MESSAGE.to_string(),
            Some(Value::String(s)) => format!(
                "Invalid option: expected one of {}, received '{s}'",
                quoted_list(&self.options)
            ),
            Some(other) => format!("Expected string, received {}", json_type_name(other)),
        };
        Some(self.message.clone().unwrap_or(failure))
    }
}

/// Joins names as `'a' | 'b' | 'c'`
pub(crate) fn quoted_list<S: AsRef<str>>(names: &[S]) -> String {
    names
        .iter()
        .map(|n| format!("'{}'", n.as_ref()))
        .collect::<Vec<_>>()
        .join(" | ")
}
