use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Value of a choice or autocomplete suggestion as Discord sends it.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ChoiceValue {
    Integer(i64),
    Number(f64),
    String(String),
}

impl ChoiceValue {
    fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Integer(value) => Some(*value as f64),
            Self::Number(value) => Some(*value),
            Self::String(_) => None,
        }
    }
}

// Integer and Number compare by value so `1` and `1.0` from the API match.
impl PartialEq for ChoiceValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::String(left), Self::String(right)) => left == right,
            (Self::Integer(left), Self::Integer(right)) => left == right,
            _ => match (self.as_f64(), other.as_f64()) {
                (Some(left), Some(right)) => left == right,
                _ => false,
            },
        }
    }
}

impl Default for ChoiceValue {
    fn default() -> Self {
        Self::String(String::new())
    }
}

impl fmt::Display for ChoiceValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(value) => write!(f, "{value}"),
            Self::Number(value) => write!(f, "{value}"),
            Self::String(value) => f.write_str(value),
        }
    }
}

impl From<&str> for ChoiceValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_owned())
    }
}

impl From<String> for ChoiceValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<i64> for ChoiceValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<i32> for ChoiceValue {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<f64> for ChoiceValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

/// A fixed choice of an option. `name` starts out as the value text and is
/// replaced by the default-locale translation during localization.
#[derive(Clone, Debug, PartialEq)]
pub struct Choice {
    pub name: String,
    pub name_localizations: HashMap<String, String>,
    pub value: ChoiceValue,
}

impl Choice {
    pub fn new(value: impl Into<ChoiceValue>) -> Self {
        let value = value.into();
        Self {
            name: value.to_string(),
            name_localizations: HashMap::new(),
            value,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_values_compare_across_variants() {
        assert_eq!(ChoiceValue::Integer(2), ChoiceValue::Number(2.0));
        assert_ne!(ChoiceValue::Integer(2), ChoiceValue::Number(2.5));
        assert_ne!(ChoiceValue::Integer(2), ChoiceValue::from("2"));
    }

    #[test]
    fn deserializes_json_numbers_by_shape() {
        let values: Vec<ChoiceValue> = serde_json::from_str(r#"[1, 1.5, "one"]"#).unwrap();
        assert!(matches!(values[0], ChoiceValue::Integer(1)));
        assert!(matches!(values[1], ChoiceValue::Number(n) if n == 1.5));
        assert_eq!(values[2], ChoiceValue::from("one"));
    }

    #[test]
    fn choice_name_defaults_to_value_text() {
        assert_eq!(Choice::new(42).name, "42");
        assert_eq!(Choice::new("dice").name, "dice");
    }
}
