use once_cell::sync::Lazy;
use regex::Regex;
use uuid::Uuid;
use crate::domain::{models::user::UserField, ports::ManagerRepository};
use crate::error::{AppError, ValidationError};

static PHONE_NOISE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\s-]").expect("phone noise regex should compile"));
static PHONE_DIGITS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{10}$").expect("phone digits regex should compile"));
static PAN_FORMAT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z]{5}[0-9]{4}[A-Z]$").expect("PAN regex should compile"));

pub const FULL_NAME_MESSAGE: &str = "Full name must not be empty.";
pub const MOBILE_MESSAGE: &str = "Invalid mobile number. It must be a valid 10-digit number.";
pub const PAN_MESSAGE: &str = "Invalid PAN number. It must follow the format AABCP1234C.";
pub const MANAGER_MESSAGE: &str = "Invalid manager_id. Manager does not exist or is inactive.";
pub const DUPLICATE_MOBILE_MESSAGE: &str = "Mobile number already belongs to another active user.";

/// Rejects empty and whitespace-only names. The name is stored as given.
pub fn validate_full_name(full_name: &str) -> Result<String, ValidationError> {
    if full_name.trim().is_empty() {
        return Err(ValidationError::new(UserField::FullName, FULL_NAME_MESSAGE));
    }
    Ok(full_name.to_string())
}

/// Reduces a mobile number to its 10 canonical digits.
///
/// One leading `+91` or one leading `0` is dropped, then spaces and hyphens
/// anywhere in the number. Whatever remains must be exactly ten ASCII digits.
pub fn validate_and_format_phone(mob_num: &str) -> Result<String, ValidationError> {
    let trimmed = mob_num.trim();
    let unprefixed = trimmed
        .strip_prefix("+91")
        .or_else(|| trimmed.strip_prefix('0'))
        .unwrap_or(trimmed);
    let digits = PHONE_NOISE.replace_all(unprefixed, "");

    if PHONE_DIGITS.is_match(&digits) {
        Ok(digits.into_owned())
    } else {
        Err(ValidationError::new(UserField::MobNum, MOBILE_MESSAGE))
    }
}

/// Upper-cases a PAN and checks it is five letters, four digits, one letter.
pub fn validate_and_format_tax_id(pan_num: &str) -> Result<String, ValidationError> {
    let upper = pan_num.to_uppercase();
    if PAN_FORMAT.is_match(&upper) {
        Ok(upper)
    } else {
        Err(ValidationError::new(UserField::PanNum, PAN_MESSAGE))
    }
}

/// Lowercase hyphenated form of a manager id, or `None` if it is not a UUID.
pub fn canonical_manager_id(manager_id: &str) -> Option<String> {
    Uuid::parse_str(manager_id.trim()).ok().map(|id| id.to_string())
}

/// Resolves a manager reference through the manager lookup.
///
/// Returns the canonical id on success. Store failures are passed through
/// untouched so callers can tell them apart from a bad reference.
pub async fn validate_manager_ref(
    managers: &dyn ManagerRepository,
    manager_id: &str,
) -> Result<String, AppError> {
    let invalid = || AppError::Validation(ValidationError::new(UserField::ManagerId, MANAGER_MESSAGE));

    if manager_id.trim().is_empty() {
        return Err(invalid());
    }
    let canonical = canonical_manager_id(manager_id).ok_or_else(invalid)?;

    match managers.find_by_id(&canonical).await? {
        Some(_) => Ok(canonical),
        None => Err(invalid()),
    }
}
