//! Field validation for registration payloads.
//!
//! Every check collects into a [`FieldError`] list so the client can show
//! all problems at once instead of one per round trip.

use lazy_static::lazy_static;
use regex::Regex;
use serde::Serialize;
use serde_json::Value;

use crate::user::user_models::{Location, RoleProfile, UserRole};

lazy_static! {
    static ref EMAIL_REGEX: Regex =
        Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").unwrap();
    static ref POSTAL_CODE_REGEX: Regex = Regex::new(r"^[0-9]{6}$").unwrap();
}

#[derive(Clone, Serialize, Debug, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

impl FieldError {
    fn new(field: &'static str, message: &str) -> Self {
        FieldError {
            field,
            message: message.to_string(),
        }
    }
}

/// Names must be alphabetic once whitespace is stripped, so "Jane Doe"
/// passes while "Jane123" does not.
pub fn validate_name(field: &'static str, value: &str) -> Option<FieldError> {
    let stripped: String = value.chars().filter(|c| !c.is_whitespace()).collect();
    if stripped.is_empty() {
        return Some(FieldError::new(field, "must not be empty"));
    }
    if !stripped.chars().all(|c| c.is_alphabetic()) {
        return Some(FieldError::new(field, "must contain only letters"));
    }
    None
}

pub fn validate_email(value: &str) -> Option<FieldError> {
    if EMAIL_REGEX.is_match(value) {
        None
    } else {
        Some(FieldError::new("email", "is not a valid email address"))
    }
}

/// Passwords need at least 8 chars with an uppercase letter, a lowercase
/// letter, a digit and a symbol.
pub fn validate_password(value: &str) -> Option<FieldError> {
    let long_enough = value.chars().count() >= 8;
    let has_upper = value.chars().any(|c| c.is_uppercase());
    let has_lower = value.chars().any(|c| c.is_lowercase());
    let has_digit = value.chars().any(|c| c.is_ascii_digit());
    let has_symbol = value.chars().any(|c| !c.is_alphanumeric());
    if long_enough && has_upper && has_lower && has_digit && has_symbol {
        None
    } else {
        Some(FieldError::new(
            "password",
            "must be at least 8 characters with uppercase, lowercase, digit and symbol",
        ))
    }
}

pub fn is_valid_postal_code(value: &str) -> bool {
    POSTAL_CODE_REGEX.is_match(value)
}

/// Normalizes a free-form expertise tag: drop everything that is not a
/// letter or whitespace, collapse the rest into a single word, then
/// capitalize the first letter and lowercase the remainder.
pub fn normalize_tag(raw: &str) -> Option<String> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_alphabetic() && c.is_ascii())
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    let mut chars = cleaned.chars();
    let first = chars.next()?;
    let mut tag = first.to_uppercase().to_string();
    tag.push_str(&chars.as_str().to_lowercase());
    Some(tag)
}

pub fn normalize_expertise(raw: &[String]) -> Vec<String> {
    raw.iter().filter_map(|tag| normalize_tag(tag)).collect()
}

fn required_str(
    data: &Value,
    key: &str,
    field: &'static str,
    errors: &mut Vec<FieldError>,
) -> String {
    match data.get(key).and_then(Value::as_str) {
        Some(s) if !s.trim().is_empty() => s.trim().to_string(),
        _ => {
            errors.push(FieldError::new(field, "is required"));
            String::new()
        }
    }
}

/// A required field that must also pass the alphabetic name rule.
fn required_name(
    data: &Value,
    key: &str,
    field: &'static str,
    errors: &mut Vec<FieldError>,
) -> String {
    let value = required_str(data, key, field, errors);
    if !value.is_empty() {
        if let Some(error) = validate_name(field, &value) {
            errors.push(error);
        }
    }
    value
}

fn optional_str(data: &Value, key: &str) -> Option<String> {
    data.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Only service providers carry a street address, institutions register
/// with just the postal code fields.
fn parse_location(data: &Value, require_address: bool, errors: &mut Vec<FieldError>) -> Location {
    let address = if require_address {
        let address = required_str(data, "address", "address", errors);
        (!address.is_empty()).then_some(address)
    } else {
        optional_str(data, "address")
    };
    let postal_code = required_str(data, "postalCode", "postalCode", errors);
    if !postal_code.is_empty() && !is_valid_postal_code(&postal_code) {
        errors.push(FieldError::new("postalCode", "must be a 6 digit code"));
    }
    Location {
        address,
        postal_code,
        district: optional_str(data, "district"),
        state: optional_str(data, "state"),
        country: optional_str(data, "country"),
    }
}

/// Builds the role-specific profile out of the free-form `additionalData`
/// object. District, state and country may still be missing here, postal
/// autofill runs before the final completeness check in the manager.
pub fn build_role_profile(role: UserRole, data: &Value) -> Result<RoleProfile, Vec<FieldError>> {
    let mut errors = Vec::new();
    let profile = match role {
        UserRole::Artist => RoleProfile::Artist {
            art_form: required_str(data, "artForm", "artForm", &mut errors),
            specialisation: required_name(data, "specialisation", "specialisation", &mut errors),
        },
        UserRole::ViewerStudent => RoleProfile::ViewerStudent {
            art_form: required_str(data, "artForm", "artForm", &mut errors),
        },
        UserRole::Institution => RoleProfile::Institution {
            university_affiliation: required_name(
                data,
                "universityAffiliation",
                "universityAffiliation",
                &mut errors,
            ),
            registration_id: required_str(data, "registrationID", "registrationID", &mut errors),
            location: parse_location(data, false, &mut errors),
        },
        UserRole::ServiceProvider => {
            let raw_expertise: Vec<String> = data
                .get("expertise")
                .and_then(Value::as_array)
                .map(|tags| {
                    tags.iter()
                        .filter_map(Value::as_str)
                        .map(str::to_string)
                        .collect()
                })
                .unwrap_or_default();
            let expertise = normalize_expertise(&raw_expertise);
            if expertise.is_empty() {
                errors.push(FieldError::new("expertise", "is required"));
            }
            RoleProfile::ServiceProvider {
                owner_name: required_name(data, "ownerName", "ownerName", &mut errors),
                expertise,
                location: parse_location(data, true, &mut errors),
            }
        }
    };
    if errors.is_empty() {
        Ok(profile)
    } else {
        Err(errors)
    }
}

/// Final completeness check for location roles. Runs after postal autofill
/// so a lookup can still fill in the missing pieces.
pub fn validate_location_complete(location: &Location) -> Vec<FieldError> {
    let mut errors = Vec::new();
    if location.district.is_none() {
        errors.push(FieldError::new("district", "is required"));
    }
    if location.state.is_none() {
        errors.push(FieldError::new("state", "is required"));
    }
    if location.country.is_none() {
        errors.push(FieldError::new("country", "is required"));
    }
    errors
}
