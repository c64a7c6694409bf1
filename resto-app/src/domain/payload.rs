use chrono::{DateTime, Utc};
use resto_errors::{AppError, FieldErrors};
use serde_json::{Map, Value};

pub const REQUIRED: &str = "This field is required.";
const NOT_NULL: &str = "This field may not be null.";
const NOT_BLANK: &str = "This field may not be blank.";
const NOT_A_STRING: &str = "Not a valid string.";
const NOT_A_BOOLEAN: &str = "Must be a valid boolean.";
const NOT_AN_INTEGER: &str = "A valid integer is required.";
const BAD_DATETIME: &str = "Datetime has wrong format. Use one of these formats instead: \
                            YYYY-MM-DDThh:mm[:ss[.uuuuuu]][+HH:MM|-HH:MM|Z].";

/// Validation rules for a text field.
#[derive(Debug, Clone, Copy)]
pub struct TextField {
    name: &'static str,
    required: bool,
    allow_blank: bool,
    max_len: Option<usize>,
}

impl TextField {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            required: false,
            allow_blank: false,
            max_len: None,
        }
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn allow_blank(mut self) -> Self {
        self.allow_blank = true;
        self
    }

    pub fn max_len(mut self, max_len: usize) -> Self {
        self.max_len = Some(max_len);
        self
    }
}

/// A decoded JSON request body.
///
/// Each accessor consumes one field, checks it, and records any problem in
/// the collected [`FieldErrors`]. Callers read every field they care about and
/// then call [`Payload::finish`], so a client sees all errors at once and no
/// partially valid value ever escapes.
///
/// In partial mode (`PATCH`) missing required fields are not an error.
#[derive(Debug)]
pub struct Payload {
    fields: Map<String, Value>,
    partial: bool,
    errors: FieldErrors,
}

impl Payload {
    /// Parse a raw body. An empty body is treated as an empty object.
    pub fn parse(body: &[u8], partial: bool) -> Result<Self, AppError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::from_map(Map::new(), partial));
        }
        let value: Value = serde_json::from_slice(body)?;
        Ok(Self::from_value(value, partial)?)
    }

    pub fn from_value(value: Value, partial: bool) -> Result<Self, FieldErrors> {
        match value {
            Value::Object(fields) => Ok(Self::from_map(fields, partial)),
            other => Err(FieldErrors::non_field(format!(
                "Invalid data. Expected a dictionary, but got {}.",
                type_name(&other)
            ))),
        }
    }

    fn from_map(fields: Map<String, Value>, partial: bool) -> Self {
        Self {
            fields,
            partial,
            errors: FieldErrors::new(),
        }
    }

    pub fn finish(self) -> Result<(), AppError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(self.errors))
        }
    }

    fn take(&mut self, field: &str, required: bool, nullable: bool) -> Option<Value> {
        match self.fields.remove(field) {
            None => {
                if required && !self.partial {
                    self.errors.add(field, REQUIRED);
                }
                None
            }
            Some(Value::Null) if !nullable => {
                self.errors.add(field, NOT_NULL);
                None
            }
            Some(value) => Some(value),
        }
    }

    /// Strict JSON boolean: strings and numbers are rejected.
    pub fn boolean(&mut self, field: &str, required: bool) -> Option<bool> {
        match self.take(field, required, false)? {
            Value::Bool(value) => Some(value),
            _ => {
                self.errors.add(field, NOT_A_BOOLEAN);
                None
            }
        }
    }

    /// Whitespace is trimmed before the blank and length checks.
    pub fn text(&mut self, rules: TextField) -> Option<String> {
        let value = self.take(rules.name, rules.required, false)?;
        self.check_text(rules, value)
    }

    /// Like [`Payload::text`] but `null` is accepted and yields `Some(None)`.
    pub fn nullable_text(&mut self, rules: TextField) -> Option<Option<String>> {
        match self.take(rules.name, rules.required, true)? {
            Value::Null => Some(None),
            value => self.check_text(rules, value).map(Some),
        }
    }

    fn check_text(&mut self, rules: TextField, value: Value) -> Option<String> {
        let text = match value {
            Value::String(text) => text.trim().to_string(),
            Value::Number(number) => number.to_string(),
            _ => {
                self.errors.add(rules.name, NOT_A_STRING);
                return None;
            }
        };
        if text.is_empty() && !rules.allow_blank {
            self.errors.add(rules.name, NOT_BLANK);
            return None;
        }
        if let Some(max_len) = rules.max_len {
            if text.chars().count() > max_len {
                self.errors.add(
                    rules.name,
                    format!("Ensure this field has no more than {max_len} characters."),
                );
                return None;
            }
        }
        Some(text)
    }

    /// Integer within `min..=max`. Numeric strings are accepted.
    pub fn nullable_integer(&mut self, field: &str, min: i64, max: i64) -> Option<Option<i64>> {
        let value = match self.take(field, false, true)? {
            Value::Null => return Some(None),
            value => value,
        };
        let Some(number) = as_integer(&value) else {
            self.errors.add(field, NOT_AN_INTEGER);
            return None;
        };
        if number < min {
            self.errors.add(
                field,
                format!("Ensure this value is greater than or equal to {min}."),
            );
            return None;
        }
        if number > max {
            self.errors.add(
                field,
                format!("Ensure this value is less than or equal to {max}."),
            );
            return None;
        }
        Some(Some(number))
    }

    /// Reference to another record by integer primary key. Existence is
    /// checked by the caller.
    pub fn primary_key(&mut self, field: &str, required: bool) -> Option<i32> {
        let value = self.take(field, required, false)?;
        match as_integer(&value).and_then(|id| i32::try_from(id).ok()) {
            Some(id) => Some(id),
            None if value.is_string() => {
                self.errors.add(
                    field,
                    format!("Invalid pk \"{}\" - object does not exist.", value.as_str().unwrap_or_default()),
                );
                None
            }
            None => {
                self.errors.add(
                    field,
                    format!("Incorrect type. Expected pk value, received {}.", type_name(&value)),
                );
                None
            }
        }
    }

    /// RFC 3339 timestamp.
    pub fn datetime(&mut self, field: &str, required: bool) -> Option<DateTime<Utc>> {
        let parsed = match self.take(field, required, false)? {
            Value::String(raw) => DateTime::parse_from_rfc3339(raw.trim()).ok(),
            _ => None,
        };
        match parsed {
            Some(at) => Some(at.with_timezone(&Utc)),
            None => {
                self.errors.add(field, BAD_DATETIME);
                None
            }
        }
    }
}

/// Build the "object does not exist" error for a reference that parsed
/// but points nowhere (or at an inactive record).
pub fn missing_reference(field: &str, id: i32) -> FieldErrors {
    FieldErrors::single(field, format!("Invalid pk \"{id}\" - object does not exist."))
}

fn as_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number.as_i64(),
        Value::String(raw) => raw.trim().parse().ok(),
        _ => None,
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "NoneType",
        Value::Bool(_) => "bool",
        Value::Number(number) if number.is_f64() => "float",
        Value::Number(_) => "int",
        Value::String(_) => "str",
        Value::Array(_) => "list",
        Value::Object(_) => "dict",
    }
}
