//! Forgiving deserializers for sheet documents.
//!
//! Saved sheets come from hand-edited files and older app versions. A field
//! with the wrong shape falls back to its default instead of rejecting the
//! whole document.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Deserializes `T`, or `T::default()` when the value has the wrong shape.
pub(crate) fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).unwrap_or_default())
}

/// Deserializes free text. Numbers and booleans keep their printed form.
pub(crate) fn text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(text) => text,
        Value::Number(number) => number.to_string(),
        Value::Bool(flag) => flag.to_string(),
        Value::Null | Value::Array(_) | Value::Object(_) => String::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Default, Deserialize, PartialEq)]
    struct Inner {
        bonus: i32,
    }

    #[derive(Debug, Default, Deserialize)]
    #[serde(default)]
    struct Outer {
        #[serde(deserialize_with = "lenient")]
        inner: Inner,
        #[serde(deserialize_with = "text")]
        name: String,
    }

    #[test]
    fn wrong_shape_falls_back_to_default() {
        let outer: Outer = serde_json::from_value(json!({"inner": "junk"})).unwrap();
        assert_eq!(outer.inner, Inner::default());
    }

    #[test]
    fn text_accepts_scalars() {
        let outer: Outer = serde_json::from_value(json!({"name": 12})).unwrap();
        assert_eq!(outer.name, "12");
        let outer: Outer = serde_json::from_value(json!({"name": null})).unwrap();
        assert_eq!(outer.name, "");
    }
}
