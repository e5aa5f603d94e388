//! Record document and request payload types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::records::id::RecordId;

/// Placeholder used by the unvalidated create path when `name` is absent.
pub const DEFAULT_NAME: &str = "Default Name";
/// Placeholder used by the unvalidated create path when `email` is absent.
pub const DEFAULT_EMAIL: &str = "default@example.com";
/// Placeholder used by the unvalidated create path when `phoneNumber` is absent.
pub const DEFAULT_PHONE_NUMBER: &str = "0000000000";

/// A persisted contact record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    #[serde(rename = "_id")]
    pub id: RecordId,
    pub name: String,
    pub email: String,
    pub phone_number: String,
    pub created_at: DateTime<Utc>,
}

impl Record {
    /// Overwrite all mutable fields. `id` and `created_at` are untouched.
    pub fn apply(&mut self, fields: RecordFields) {
        self.name = fields.name;
        self.email = fields.email;
        self.phone_number = fields.phone_number;
    }
}

/// The three client-controlled fields of a record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordFields {
    pub name: String,
    pub email: String,
    pub phone_number: String,
}

impl RecordFields {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        phone_number: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            phone_number: phone_number.into(),
        }
    }

    /// Name of the first field that is empty, if any.
    pub fn first_empty(&self) -> Option<&'static str> {
        [
            ("name", &self.name),
            ("email", &self.email),
            ("phoneNumber", &self.phone_number),
        ]
        .into_iter()
        .find(|(_, value)| value.is_empty())
        .map(|(field, _)| field)
    }
}

/// Error returned when a request body is not a JSON object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("request body is not a JSON object")]
pub struct PayloadError;

/// Loosely-typed request body for create and update.
///
/// Fields keep their raw JSON value so that wrong types can be reported by
/// the validator instead of failing deserialization.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordPayload {
    pub name: Option<Value>,
    pub email: Option<Value>,
    pub phone_number: Option<Value>,
}

impl RecordPayload {
    /// Parse a raw JSON body. An empty body is an empty object.
    pub fn parse(bytes: &[u8]) -> Result<Self, PayloadError> {
        if bytes.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        // Going through `Value` keeps serde from filling fields from an array.
        match serde_json::from_slice::<Value>(bytes) {
            Ok(object @ Value::Object(_)) => serde_json::from_value(object).map_err(|_| PayloadError),
            _ => Err(PayloadError),
        }
    }

    /// True when none of `name`, `email`, `phoneNumber` was supplied.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.phone_number.is_none()
    }

    /// Build fields for the unvalidated create path, substituting the fixed
    /// placeholders for anything absent or empty.
    pub fn into_fields_with_defaults(self) -> RecordFields {
        RecordFields {
            name: coerce(self.name).unwrap_or_else(|| DEFAULT_NAME.to_string()),
            email: coerce(self.email).unwrap_or_else(|| DEFAULT_EMAIL.to_string()),
            phone_number: coerce(self.phone_number)
                .unwrap_or_else(|| DEFAULT_PHONE_NUMBER.to_string()),
        }
    }
}

/// URL-encoded form body. Every field arrives as text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FormPayload {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone_number: Option<String>,
}

impl From<FormPayload> for RecordPayload {
    fn from(form: FormPayload) -> Self {
        Self {
            name: form.name.map(Value::String),
            email: form.email.map(Value::String),
            phone_number: form.phone_number.map(Value::String),
        }
    }
}

/// The string view of a field, or `None` if it is absent or not a string.
pub fn field_text(value: Option<&Value>) -> Option<&str> {
    value.and_then(Value::as_str)
}

// Scalars are cast to strings the way a document mapper would; empty strings,
// `false`, `0`, arrays and objects count as missing.
fn coerce(value: Option<Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s),
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        Value::Bool(true) => Some("true".to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_body_is_an_empty_payload() {
        assert_eq!(RecordPayload::parse(b"").unwrap(), RecordPayload::default());
        assert_eq!(RecordPayload::parse(b"  \n").unwrap(), RecordPayload::default());
        assert!(RecordPayload::parse(b"{}").unwrap().is_empty());
    }

    #[test]
    fn non_object_bodies_are_rejected() {
        assert_eq!(RecordPayload::parse(b"not json"), Err(PayloadError));
        assert_eq!(RecordPayload::parse(b"[1,2]"), Err(PayloadError));
        assert_eq!(RecordPayload::parse(b"\"name\""), Err(PayloadError));
        assert_eq!(
            RecordPayload::parse(br#"["Ada","ada@example.com","12345"]"#),
            Err(PayloadError)
        );
    }

    #[test]
    fn form_fields_become_strings() {
        let form = FormPayload {
            name: Some("Ada".into()),
            email: None,
            phone_number: Some("".into()),
        };
        let payload = RecordPayload::from(form);
        assert_eq!(payload.name, Some(json!("Ada")));
        assert_eq!(payload.email, None);
        assert_eq!(payload.phone_number, Some(json!("")));
    }

    #[test]
    fn unknown_keys_are_not_recognizable_fields() {
        let payload = RecordPayload::parse(br#"{"nickname":"Al","name":null}"#).unwrap();
        assert!(payload.is_empty());
    }

    #[test]
    fn defaults_fill_missing_fields() {
        let payload = RecordPayload::parse(br#"{"name":"Ada"}"#).unwrap();
        let fields = payload.into_fields_with_defaults();
        assert_eq!(fields, RecordFields::new("Ada", DEFAULT_EMAIL, DEFAULT_PHONE_NUMBER));
    }

    #[test]
    fn empty_strings_fall_back_and_scalars_are_cast() {
        let payload = RecordPayload {
            name: Some(json!("")),
            email: Some(json!(["a@b.co"])),
            phone_number: Some(json!(5551234)),
        };
        let fields = payload.into_fields_with_defaults();
        assert_eq!(fields.name, DEFAULT_NAME);
        assert_eq!(fields.email, DEFAULT_EMAIL);
        assert_eq!(fields.phone_number, "5551234");
    }

    #[test]
    fn record_serializes_with_document_keys() {
        let record = Record {
            id: RecordId::new_unchecked("65a1f0c2b3d4e5f601234567"),
            name: "Ada".into(),
            email: "ada@example.com".into(),
            phone_number: "12345".into(),
            created_at: DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["_id"], "65a1f0c2b3d4e5f601234567");
        assert_eq!(value["phoneNumber"], "12345");
        assert!(value["createdAt"].as_str().unwrap().starts_with("2023-11-14T"));
        assert!(value.get("id").is_none());
    }

    #[test]
    fn first_empty_reports_field_name() {
        assert_eq!(RecordFields::new("Ada", "", "").first_empty(), Some("email"));
        assert_eq!(RecordFields::new("Ada", "a@b.co", "12345").first_empty(), None);
    }
}
