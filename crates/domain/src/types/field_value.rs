use serde::{Deserialize, Serialize};

use super::NumberField;

/// A coerced input value, ready to be written into a sheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    Empty,
    Boolean(bool),
    Number(f64),
    Text(String),
}

impl FieldValue {
    /// Coerces raw input from a numeric or choice field.
    ///
    /// Blank input stays `Empty` (never 0), `true`/`false` in any case become
    /// booleans, anything that parses as a number becomes a number, and the
    /// rest is kept as text.
    pub fn coerce(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return FieldValue::Empty;
        }
        if trimmed.eq_ignore_ascii_case("true") {
            return FieldValue::Boolean(true);
        }
        if trimmed.eq_ignore_ascii_case("false") {
            return FieldValue::Boolean(false);
        }
        match trimmed.parse::<f64>() {
            Ok(number) if number.is_finite() => FieldValue::Number(number),
            _ => FieldValue::Text(raw.to_string()),
        }
    }

    /// Raw input from a free-text field. Only blankness is interpreted.
    pub fn text(raw: &str) -> Self {
        if raw.trim().is_empty() {
            FieldValue::Empty
        } else {
            FieldValue::Text(raw.to_string())
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            FieldValue::Number(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            FieldValue::Boolean(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::Text(value) => Some(value.as_str()),
            _ => None,
        }
    }

    /// The numeric leaf this value stores as. Text that is not a number is blank.
    pub fn to_number_field(&self) -> NumberField {
        match self {
            FieldValue::Empty => NumberField::Blank,
            FieldValue::Boolean(value) => NumberField::Value(i32::from(*value)),
            FieldValue::Number(value) => {
                NumberField::from_json(&serde_json::Value::from(*value))
            }
            FieldValue::Text(value) => NumberField::parse_lenient(value),
        }
    }

    /// The text this value displays as.
    pub fn to_text(&self) -> String {
        match self {
            FieldValue::Empty => String::new(),
            FieldValue::Boolean(value) => value.to_string(),
            FieldValue::Number(value) if value.fract() == 0.0 && value.abs() < 1e15 => {
                format!("{}", *value as i64)
            }
            FieldValue::Number(value) => value.to_string(),
            FieldValue::Text(value) => value.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coerce_blank_is_empty_not_zero() {
        assert_eq!(FieldValue::coerce(""), FieldValue::Empty);
        assert_eq!(FieldValue::coerce("   "), FieldValue::Empty);
        assert_eq!(FieldValue::coerce("").to_number_field(), NumberField::Blank);
    }

    #[test]
    fn coerce_booleans_case_insensitive() {
        assert_eq!(FieldValue::coerce("TRUE"), FieldValue::Boolean(true));
        assert_eq!(FieldValue::coerce("False"), FieldValue::Boolean(false));
    }

    #[test]
    fn coerce_numbers() {
        assert_eq!(FieldValue::coerce("3"), FieldValue::Number(3.0));
        assert_eq!(FieldValue::coerce("-1.5"), FieldValue::Number(-1.5));
        assert_eq!(FieldValue::coerce(" 42 "), FieldValue::Number(42.0));
    }

    #[test]
    fn coerce_keeps_other_text() {
        assert_eq!(
            FieldValue::coerce("Greymon"),
            FieldValue::Text("Greymon".to_string())
        );
        assert_eq!(FieldValue::coerce("NaN"), FieldValue::Text("NaN".to_string()));
    }

    #[test]
    fn numeric_reads_default_to_zero() {
        assert_eq!(FieldValue::coerce("abc").to_number_field().value(), 0);
        assert_eq!(FieldValue::Boolean(true).to_number_field().value(), 1);
        assert_eq!(FieldValue::Number(4.7).to_number_field().value(), 4);
    }

    #[test]
    fn text_fields_do_not_coerce_digits() {
        assert_eq!(FieldValue::text("007").to_text(), "007");
        assert_eq!(FieldValue::Number(5.0).to_text(), "5");
        assert_eq!(FieldValue::text("  "), FieldValue::Empty);
    }
}
