use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// A numeric sheet leaf that remembers whether the user cleared it.
///
/// Formulas read a blank as 0, but a blank stays blank when the sheet is
/// saved so a cleared input redisplays empty instead of "0".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NumberField {
    Value(i32),
    Blank,
}

/// Largest magnitude formulas read from a single leaf. Sums of a sheet's
/// fixed leaves stay well inside `i32` at this bound.
pub const LEAF_LIMIT: i32 = 1_000_000;

impl NumberField {
    pub const ZERO: NumberField = NumberField::Value(0);

    /// The value formulas see, bounded to `±LEAF_LIMIT`.
    pub fn value(self) -> i32 {
        match self {
            NumberField::Value(value) => value.clamp(-LEAF_LIMIT, LEAF_LIMIT),
            NumberField::Blank => 0,
        }
    }

    pub fn is_blank(self) -> bool {
        matches!(self, NumberField::Blank)
    }

    /// Keeps blanks, raises negative values to zero.
    pub fn non_negative(self) -> Self {
        match self {
            NumberField::Value(value) => NumberField::Value(value.max(0)),
            NumberField::Blank => NumberField::Blank,
        }
    }

    pub fn clamped(self, min: i32, max: i32) -> Self {
        match self {
            NumberField::Value(value) => NumberField::Value(value.clamp(min, max)),
            NumberField::Blank => NumberField::Blank,
        }
    }

    /// Lenient conversion from any JSON value.
    ///
    /// Numbers are truncated toward zero, numeric strings are parsed, booleans
    /// count as 1/0. Everything else is blank.
    pub fn from_json(value: &Value) -> Self {
        match value {
            Value::Number(number) => number
                .as_i64()
                .map(saturate)
                .or_else(|| number.as_f64().and_then(from_float))
                .map(NumberField::Value)
                .unwrap_or(NumberField::Blank),
            Value::String(text) => Self::parse_lenient(text),
            Value::Bool(flag) => NumberField::Value(i32::from(*flag)),
            Value::Null | Value::Array(_) | Value::Object(_) => NumberField::Blank,
        }
    }

    /// Parses user text. Blank and non-numeric text give `Blank`.
    pub fn parse_lenient(text: &str) -> Self {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return NumberField::Blank;
        }
        trimmed
            .parse::<i64>()
            .ok()
            .map(saturate)
            .or_else(|| trimmed.parse::<f64>().ok().and_then(from_float))
            .map(NumberField::Value)
            .unwrap_or(NumberField::Blank)
    }
}

fn saturate(value: i64) -> i32 {
    value.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32
}

fn from_float(value: f64) -> Option<i32> {
    if !value.is_finite() {
        return None;
    }
    Some(value.trunc().clamp(f64::from(i32::MIN), f64::from(i32::MAX)) as i32)
}

impl Default for NumberField {
    fn default() -> Self {
        NumberField::ZERO
    }
}

impl From<i32> for NumberField {
    fn from(value: i32) -> Self {
        NumberField::Value(value)
    }
}

impl fmt::Display for NumberField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NumberField::Value(value) => write!(f, "{}", value),
            NumberField::Blank => Ok(()),
        }
    }
}

impl Serialize for NumberField {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            NumberField::Value(value) => serializer.serialize_i32(*value),
            NumberField::Blank => serializer.serialize_str(""),
        }
    }
}

impl<'de> Deserialize<'de> for NumberField {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(NumberField::from_json(&value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn reads_blank_as_zero() {
        assert_eq!(NumberField::Blank.value(), 0);
        assert_eq!(NumberField::Value(7).value(), 7);
    }

    #[test]
    fn formulas_read_bounded_values() {
        assert_eq!(NumberField::Value(i32::MAX).value(), LEAF_LIMIT);
        assert_eq!(NumberField::Value(i32::MIN).value(), -LEAF_LIMIT);
        assert_eq!(NumberField::from_json(&json!(1e12)).value(), LEAF_LIMIT);
        assert_eq!(NumberField::from_json(&json!("99999999999")).value(), LEAF_LIMIT);
    }

    #[test]
    fn lenient_json_conversion() {
        assert_eq!(NumberField::from_json(&json!(4)), NumberField::Value(4));
        assert_eq!(NumberField::from_json(&json!(3.9)), NumberField::Value(3));
        assert_eq!(NumberField::from_json(&json!(-2.5)), NumberField::Value(-2));
        assert_eq!(NumberField::from_json(&json!("12")), NumberField::Value(12));
        assert_eq!(NumberField::from_json(&json!(" 5 ")), NumberField::Value(5));
        assert_eq!(NumberField::from_json(&json!(true)), NumberField::Value(1));
        assert_eq!(NumberField::from_json(&json!("")), NumberField::Blank);
        assert_eq!(NumberField::from_json(&json!("abc")), NumberField::Blank);
        assert_eq!(NumberField::from_json(&json!(null)), NumberField::Blank);
        assert_eq!(NumberField::from_json(&json!({"dp": 1})), NumberField::Blank);
    }

    #[test]
    fn blank_serializes_as_empty_string() {
        assert_eq!(serde_json::to_value(NumberField::Blank).unwrap(), json!(""));
        assert_eq!(serde_json::to_value(NumberField::Value(3)).unwrap(), json!(3));
    }

    #[test]
    fn deserialize_never_fails_on_junk() {
        let field: NumberField = serde_json::from_value(json!(["x"])).unwrap();
        assert!(field.is_blank());
    }

    #[test]
    fn clamping_keeps_blank() {
        assert_eq!(NumberField::Value(-3).non_negative(), NumberField::Value(0));
        assert_eq!(NumberField::Value(120).clamped(0, 99), NumberField::Value(99));
        assert_eq!(NumberField::Blank.clamped(0, 99), NumberField::Blank);
    }
}
