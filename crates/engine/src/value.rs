// Cell values
//
// Every cell in a table holds one tagged scalar. The tag is part of the
// value's identity: the text "5" and the number 5 are different values.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A numeric cell. Integer and float storage are kept apart so the loader can
/// report what it read; equality across the two is decided by the merge
/// engine's fingerprint normalization, not here.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Number {
    Int(i64),
    Float(f64),
}

impl Number {
    pub fn as_f64(&self) -> f64 {
        match *self {
            Number::Int(i) => i as f64,
            Number::Float(f) => f,
        }
    }

    pub fn is_nan(&self) -> bool {
        matches!(self, Number::Float(f) if f.is_nan())
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Number::Int(i) => write!(f, "{}", i),
            // Integral floats print without a trailing ".0" (matches how the
            // spreadsheet importers render whole numbers)
            Number::Float(n) if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 => {
                write!(f, "{}", n as i64)
            }
            Number::Float(n) => write!(f, "{}", n),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    #[default]
    Null,
    Boolean(bool),
    Number(Number),
    Text(String),
}

impl Value {
    pub fn text(s: impl Into<String>) -> Self {
        Value::Text(s.into())
    }

    pub fn int(i: i64) -> Self {
        Value::Number(Number::Int(i))
    }

    pub fn float(f: f64) -> Self {
        Value::Number(Number::Float(f))
    }

    /// Infer a typed value from untyped text (CSV fields, CLI input).
    ///
    /// A field becomes a number or boolean only when that value renders back
    /// to exactly the same text, so `007`, `+5`, `1.50` and `true` stay Text.
    /// Writing a loaded table back out therefore reproduces every field.
    pub fn from_input(input: &str) -> Self {
        if input.is_empty() {
            return Value::Null;
        }

        let typed = if let Ok(i) = input.parse::<i64>() {
            Value::int(i)
        } else if let Some(f) = input.parse::<f64>().ok().filter(|f| f.is_finite()) {
            Value::float(f)
        } else {
            match input {
                "TRUE" => Value::Boolean(true),
                "FALSE" => Value::Boolean(false),
                _ => return Value::Text(input.to_string()),
            }
        };

        if typed.display() == input {
            typed
        } else {
            Value::Text(input.to_string())
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<Number> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Render for text outputs (CSV export, summaries). Null renders empty.
    pub fn display(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Boolean(true) => "TRUE".to_string(),
            Value::Boolean(false) => "FALSE".to_string(),
            Value::Number(n) => n.to_string(),
            Value::Text(s) => s.clone(),
        }
    }

    /// Short type name for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Boolean(_) => "boolean",
            Value::Number(Number::Int(_)) => "integer",
            Value::Number(Number::Float(_)) => "float",
            Value::Text(_) => "text",
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::int(i as i64)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}
