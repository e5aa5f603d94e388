//! Field validation for record payloads.
//!
//! Every rule is evaluated independently and all failures are returned, in
//! field order, so a client can fix the whole form in one round trip.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::records::model::{field_text, RecordFields, RecordPayload};

pub const NAME_REQUIRED: &str = "Name is required";
pub const NAME_TOO_SHORT: &str = "Name must be at least 2 characters long";
pub const EMAIL_REQUIRED: &str = "Email is required";
pub const EMAIL_INVALID: &str = "Invalid email format";
pub const PHONE_REQUIRED: &str = "Phone number is required";
pub const PHONE_TOO_SHORT: &str = "Phone number must be at least 5 characters";

const MIN_NAME_CHARS: usize = 2;
const MIN_PHONE_CHARS: usize = 5;

/// Validate a payload, returning the fields as submitted or every violation.
pub fn validate_payload(payload: &RecordPayload) -> Result<RecordFields, Vec<String>> {
    let mut errors = Vec::new();

    let name = check_min_len(
        payload.name.as_ref(),
        MIN_NAME_CHARS,
        NAME_REQUIRED,
        NAME_TOO_SHORT,
        &mut errors,
    );
    let email = check_email(payload.email.as_ref(), &mut errors);
    let phone_number = check_min_len(
        payload.phone_number.as_ref(),
        MIN_PHONE_CHARS,
        PHONE_REQUIRED,
        PHONE_TOO_SHORT,
        &mut errors,
    );

    match (name, email, phone_number) {
        (Some(name), Some(email), Some(phone_number)) if errors.is_empty() => {
            Ok(RecordFields::new(name, email, phone_number))
        }
        _ => Err(errors),
    }
}

fn check_min_len<'a>(
    value: Option<&'a Value>,
    min_chars: usize,
    required: &str,
    too_short: &str,
    errors: &mut Vec<String>,
) -> Option<&'a str> {
    let Some(text) = non_blank(value) else {
        errors.push(required.to_string());
        return None;
    };
    if text.trim().chars().count() < min_chars {
        errors.push(too_short.to_string());
        return None;
    }
    Some(text)
}

fn check_email<'a>(value: Option<&'a Value>, errors: &mut Vec<String>) -> Option<&'a str> {
    let Some(text) = non_blank(value) else {
        errors.push(EMAIL_REQUIRED.to_string());
        return None;
    };
    if !is_email_shaped(text) {
        errors.push(EMAIL_INVALID.to_string());
        return None;
    }
    Some(text)
}

fn non_blank(value: Option<&Value>) -> Option<&str> {
    field_text(value).filter(|text| !text.trim().is_empty())
}

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

pub fn is_email_shaped(email: &str) -> bool {
    EMAIL_RE.is_match(email)
}
