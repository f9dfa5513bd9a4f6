//! Serde helpers for partial-update inputs.

use serde::de::Error;
use serde::{Deserialize, Deserializer};

/// Deserializes a nullable patch field so that an explicit `null` becomes
/// `Some(None)` (clear the value) while a missing field stays `None`
/// (leave the value unchanged).
///
/// Must be combined with `#[serde(default)]` on the field.
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

/// Deserializes a required patch field, rejecting an explicit `null`.
///
/// A missing field stays `None` through `#[serde(default)]`; a `null` is an
/// error instead of being read as "leave unchanged".
pub fn non_null<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    match Option::<T>::deserialize(deserializer)? {
        Some(value) => Ok(Some(value)),
        None => Err(D::Error::custom("null is not allowed for this field")),
    }
}

/// Deserializes a patch field whose value may itself be JSON `null`.
///
/// Any present value, `null` included, becomes `Some`.
pub fn present<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::{double_option, non_null, present};
    use serde::Deserialize;
    use serde_json::{json, Value};

    #[derive(Debug, Default, Deserialize)]
    struct NotePatch {
        #[serde(default, deserialize_with = "double_option")]
        note: Option<Option<String>>,
    }

    #[test]
    fn distinguishes_missing_null_and_value() {
        let missing: NotePatch = serde_json::from_str("{}").unwrap();
        let null: NotePatch = serde_json::from_str(r#"{"note":null}"#).unwrap();
        let value: NotePatch = serde_json::from_str(r#"{"note":"hi"}"#).unwrap();

        assert_eq!(missing.note, None);
        assert_eq!(null.note, Some(None));
        assert_eq!(value.note, Some(Some("hi".to_string())));
    }

    #[derive(Debug, Default, Deserialize)]
    #[serde(deny_unknown_fields)]
    struct Required {
        #[serde(default, deserialize_with = "non_null")]
        title: Option<String>,
        #[serde(default, deserialize_with = "present")]
        context: Option<Value>,
    }

    #[test]
    fn required_field_rejects_null_but_allows_absence() {
        let missing: Required = serde_json::from_str("{}").unwrap();
        let value: Required = serde_json::from_str(r#"{"title":"t"}"#).unwrap();

        assert_eq!(missing.title, None);
        assert_eq!(value.title.as_deref(), Some("t"));
        assert!(serde_json::from_str::<Required>(r#"{"title":null}"#).is_err());
    }

    #[test]
    fn json_value_field_keeps_explicit_null() {
        let missing: Required = serde_json::from_str("{}").unwrap();
        let null: Required = serde_json::from_str(r#"{"context":null}"#).unwrap();
        let object: Required = serde_json::from_str(r#"{"context":{"a":1}}"#).unwrap();

        assert_eq!(missing.context, None);
        assert_eq!(null.context, Some(Value::Null));
        assert_eq!(object.context, Some(json!({ "a": 1 })));
    }
}
