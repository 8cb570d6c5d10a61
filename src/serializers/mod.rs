pub mod recipe;
pub mod tag;
pub mod user;

use std::collections::BTreeMap;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde_json::{Map, Value};

pub use recipe::{RecipeDetailOut, RecipeImageOut, RecipeOut, RecipePayload};
pub use tag::{IngredientPayload, NamedOut, TagPayload};
pub use user::{CredentialsPayload, UserOut, UserPayload};

pub const REQUIRED: &str = "This field is required.";
pub const BLANK: &str = "This field may not be blank.";

/// Field-level validation messages keyed by payload field name
#[derive(Debug, Clone, Default, PartialEq, thiserror::Error)]
#[error("Invalid input for: {}", .0.keys().cloned().collect::<Vec<_>>().join(", "))]
pub struct FieldErrors(BTreeMap<String, String>);

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(field: impl Into<String>, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    /// Keeps the first message per field
    pub fn add(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.0.entry(field.into()).or_insert_with(|| message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    pub fn fields(&self) -> Vec<String> {
        self.0.keys().cloned().collect()
    }

    pub fn into_map(self) -> BTreeMap<String, String> {
        self.0
    }

    /// `Ok(value)` when nothing was recorded
    pub fn check<T>(self, value: T) -> Result<T, FieldErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

/// Turns a raw request payload into the fields a store accepts.
pub trait Validate {
    type Output;

    fn validate(self) -> Result<Self::Output, FieldErrors>;
}

/// Reads typed fields out of a JSON object, collecting messages as it goes.
pub(crate) struct FieldReader<'a> {
    map: &'a Map<String, Value>,
    pub errors: FieldErrors,
}

impl<'a> FieldReader<'a> {
    pub fn new(map: &'a Map<String, Value>) -> Self {
        Self {
            map,
            errors: FieldErrors::new(),
        }
    }

    fn present(&mut self, field: &str, required: bool) -> Option<&'a Value> {
        match self.map.get(field) {
            Some(Value::Null) | None => {
                if required {
                    self.errors.add(field, REQUIRED);
                }
                None
            }
            Some(value) => Some(value),
        }
    }

    pub fn string(&mut self, field: &str, required: bool, allow_blank: bool, max_len: usize) -> Option<String> {
        let value = self.present(field, required)?;
        let Some(s) = value.as_str() else {
            self.errors.add(field, "Not a valid string.");
            return None;
        };

        let s = s.trim();
        if s.is_empty() && !allow_blank {
            self.errors.add(field, BLANK);
            return None;
        }
        if s.chars().count() > max_len {
            self.errors
                .add(field, format!("Ensure this field has no more than {} characters.", max_len));
            return None;
        }
        Some(s.to_string())
    }

    pub fn integer(&mut self, field: &str, required: bool) -> Option<i32> {
        let value = self.present(field, required)?;
        let parsed = match value {
            Value::Number(n) => n.as_i64().and_then(|i| i32::try_from(i).ok()),
            Value::String(s) => s.trim().parse::<i32>().ok(),
            _ => None,
        };
        if parsed.is_none() {
            self.errors.add(field, "A valid integer is required.");
        }
        parsed
    }

    /// Decimal limited to `max_digits` total digits and `places` after the point
    pub fn decimal(&mut self, field: &str, required: bool, max_digits: u32, places: u32) -> Option<Decimal> {
        let value = self.present(field, required)?;
        let parsed = match value {
            Value::Number(n) => Decimal::from_str(&n.to_string()).ok(),
            Value::String(s) => Decimal::from_str(s.trim()).ok(),
            _ => None,
        };
        let Some(decimal) = parsed else {
            self.errors.add(field, "A valid number is required.");
            return None;
        };

        let normalized = decimal.normalize();
        if normalized.scale() > places {
            self.errors
                .add(field, format!("Ensure that there are no more than {} decimal places.", places));
            return None;
        }
        let limit = Decimal::from(10i64.pow(max_digits - places));
        if normalized.abs() >= limit {
            self.errors
                .add(field, format!("Ensure that there are no more than {} digits in total.", max_digits));
            return None;
        }

        let mut rounded = normalized;
        rounded.rescale(places);
        Some(rounded)
    }

    /// List of primary keys, de-duplicated in first-seen order
    pub fn id_list(&mut self, field: &str) -> Option<Vec<i64>> {
        let value = self.present(field, false)?;
        let Some(items) = value.as_array() else {
            self.errors
                .add(field, format!("Expected a list of items but got type \"{}\".", type_name(value)));
            return None;
        };

        let mut ids = Vec::with_capacity(items.len());
        for item in items {
            match item.as_i64() {
                Some(id) => {
                    if !ids.contains(&id) {
                        ids.push(id);
                    }
                }
                None => {
                    self.errors
                        .add(field, format!("Incorrect type. Expected pk value, received {}.", type_name(item)));
                    return None;
                }
            }
        }
        Some(ids)
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(n) if n.is_i64() => "int",
        Value::Number(_) => "float",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}
