//! Typed entry points for caller-supplied values
//!
//! MCP arguments arrive as JSON. Fields that must end up as integers are
//! deserialized into [`IntegerInput`] so that both `67` and `"67"` reach the
//! validator, which then decides whether the value is acceptable.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An integer-like value as supplied by a caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum IntegerInput {
    /// A JSON integer
    Integer(i64),
    /// A JSON number with a fractional part or outside the `i64` range
    Float(f64),
    /// A string that may hold a decimal integer
    Text(String),
}

impl IntegerInput {
    /// Interpret the input as an integer
    ///
    /// Whole finite floats (`10.0`) and decimal strings (`" 10 "`) are
    /// accepted. Anything else yields `None`.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            IntegerInput::Integer(value) => Some(*value),
            IntegerInput::Float(value) => {
                if value.is_finite()
                    && value.fract() == 0.0
                    && *value >= i64::MIN as f64
                    && *value <= i64::MAX as f64
                {
                    Some(*value as i64)
                } else {
                    None
                }
            }
            IntegerInput::Text(text) => text.trim().parse::<i64>().ok(),
        }
    }
}

impl fmt::Display for IntegerInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntegerInput::Integer(value) => write!(f, "{value}"),
            IntegerInput::Float(value) => write!(f, "{value}"),
            IntegerInput::Text(text) => write!(f, "{text}"),
        }
    }
}

impl From<i64> for IntegerInput {
    fn from(value: i64) -> Self {
        IntegerInput::Integer(value)
    }
}

impl From<i32> for IntegerInput {
    fn from(value: i32) -> Self {
        IntegerInput::Integer(i64::from(value))
    }
}

impl From<u32> for IntegerInput {
    fn from(value: u32) -> Self {
        IntegerInput::Integer(i64::from(value))
    }
}

impl From<f64> for IntegerInput {
    fn from(value: f64) -> Self {
        IntegerInput::Float(value)
    }
}

impl From<&str> for IntegerInput {
    fn from(value: &str) -> Self {
        IntegerInput::Text(value.to_string())
    }
}

impl From<String> for IntegerInput {
    fn from(value: String) -> Self {
        IntegerInput::Text(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_number_and_string() {
        let number: IntegerInput = serde_json::from_str("67").unwrap();
        assert_eq!(number, IntegerInput::Integer(67));

        let text: IntegerInput = serde_json::from_str("\"67\"").unwrap();
        assert_eq!(text, IntegerInput::Text("67".to_string()));

        let float: IntegerInput = serde_json::from_str("6.5").unwrap();
        assert_eq!(float, IntegerInput::Float(6.5));
    }

    #[test]
    fn test_as_integer() {
        assert_eq!(IntegerInput::from(12).as_integer(), Some(12));
        assert_eq!(IntegerInput::from(" 12 ").as_integer(), Some(12));
        assert_eq!(IntegerInput::from(12.0).as_integer(), Some(12));
        assert_eq!(IntegerInput::from(12.5).as_integer(), None);
        assert_eq!(IntegerInput::from(f64::NAN).as_integer(), None);
        assert_eq!(IntegerInput::from("twelve").as_integer(), None);
    }
}
