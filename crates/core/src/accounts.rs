//! Account input validation and identifier normalization.
//!
//! Usernames and emails are stored trimmed and lower-cased so that login by
//! either identifier is case-insensitive. Everything here is pure and
//! synchronous; persistence lives in `vidtube-db`.

use validator::{Validate, ValidationErrors};

use crate::error::CoreError;

/// Minimum password length enforced on registration and password change.
pub const MIN_PASSWORD_LENGTH: usize = 8;

// ---------------------------------------------------------------------------
// Inputs
// ---------------------------------------------------------------------------

/// Fields supplied when registering a new account.
///
/// `avatar` and `cover_image` are URLs of media that has already been
/// uploaded elsewhere.
#[derive(Debug, Clone, Validate)]
pub struct NewAccount {
    #[validate(length(min = 1, message = "fullName is required"))]
    pub full_name: String,
    #[validate(email(message = "email must be a valid email address"))]
    pub email: String,
    #[validate(
        length(min = 1, max = 30, message = "username must be between 1 and 30 characters"),
        does_not_contain(pattern = "@", message = "username must not contain '@'")
    )]
    pub username: String,
    pub password: String,
    #[validate(url(message = "avatar must be a valid URL"))]
    pub avatar: String,
    #[validate(url(message = "coverImage must be a valid URL"))]
    pub cover_image: Option<String>,
}

/// Partial profile update. `None` fields are left untouched.
#[derive(Debug, Clone, Default, Validate)]
pub struct AccountChanges {
    #[validate(length(min = 1, message = "fullName must not be empty"))]
    pub full_name: Option<String>,
    #[validate(email(message = "email must be a valid email address"))]
    pub email: Option<String>,
    #[validate(url(message = "avatar must be a valid URL"))]
    pub avatar: Option<String>,
    #[validate(url(message = "coverImage must be a valid URL"))]
    pub cover_image: Option<String>,
}

impl AccountChanges {
    /// Returns `true` if no field would change.
    pub fn is_empty(&self) -> bool {
        self.full_name.is_none()
            && self.email.is_none()
            && self.avatar.is_none()
            && self.cover_image.is_none()
    }
}

// ---------------------------------------------------------------------------
// Normalization
// ---------------------------------------------------------------------------

/// Normalize a username or email for storage and lookup.
pub fn normalize_identifier(raw: &str) -> String {
    raw.trim().to_lowercase()
}

impl NewAccount {
    /// Trim free-text fields and normalize the identifiers.
    pub fn normalized(self) -> Self {
        Self {
            full_name: self.full_name.trim().to_string(),
            email: normalize_identifier(&self.email),
            username: normalize_identifier(&self.username),
            password: self.password,
            avatar: self.avatar.trim().to_string(),
            cover_image: self
                .cover_image
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty()),
        }
    }
}

impl AccountChanges {
    /// Trim free-text fields and normalize the email.
    pub fn normalized(self) -> Self {
        Self {
            full_name: self.full_name.map(|n| n.trim().to_string()),
            email: self.email.map(|e| normalize_identifier(&e)),
            avatar: self.avatar.map(|a| a.trim().to_string()),
            cover_image: self.cover_image.map(|c| c.trim().to_string()),
        }
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Reject any required field that is missing or blank.
///
/// Fields are checked in order; the first blank one produces
/// `"<name> is required"`.
pub fn require_fields(fields: &[(&str, Option<&str>)]) -> Result<(), CoreError> {
    for (name, value) in fields {
        match value {
            Some(v) if !v.trim().is_empty() => {}
            _ => return Err(CoreError::Validation(format!("{name} is required"))),
        }
    }
    Ok(())
}

/// Validate that a password meets minimum strength requirements.
pub fn validate_password_strength(password: &str, min_length: usize) -> Result<(), CoreError> {
    if password.chars().count() < min_length {
        return Err(CoreError::Validation(format!(
            "Password must be at least {min_length} characters long"
        )));
    }
    Ok(())
}

/// Validate a registration after normalization.
pub fn validate_new_account(account: &NewAccount) -> Result<(), CoreError> {
    account.validate().map_err(validation_error)?;
    validate_password_strength(&account.password, MIN_PASSWORD_LENGTH)
}

/// Validate a profile update after normalization.
pub fn validate_account_changes(changes: &AccountChanges) -> Result<(), CoreError> {
    if changes.is_empty() {
        return Err(CoreError::Validation(
            "At least one field is required to update the account".into(),
        ));
    }
    changes.validate().map_err(validation_error)
}

/// Flatten `validator` errors into a single sorted, human-readable message.
fn validation_error(errors: ValidationErrors) -> CoreError {
    let mut messages: Vec<String> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            let field = field.to_string();
            errs.iter()
                .map(|e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("{field} is invalid"))
                })
                .collect::<Vec<_>>()
        })
        .collect();
    messages.sort();
    messages.dedup();
    CoreError::Validation(messages.join("; "))
}
