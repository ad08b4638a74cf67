//! Password-reset payload validation.
//!
//! Both `password` and `confirmPassword` go through the same four rules, in
//! order, and every failure is collected:
//!
//! 1. `isNotEmpty`: present, not null, not `""`.
//! 2. `isString`: a JSON string.
//! 3. `isStrongPassword`: at least [`STRENGTH_MIN_LENGTH`] characters with
//!    one lowercase letter, one uppercase letter, one digit, and one symbol.
//! 4. `length`: between [`LENGTH_MIN`] and [`LENGTH_MAX`] characters.
//!
//! The strength minimum sits above the lower length bound, so passwords of
//! 8 to 11 characters satisfy `length` yet can never pass. Both bounds are
//! kept as configured.
//!
//! The two fields are validated independently; equality between them is not
//! checked here.

use serde::Serialize;
use serde_json::{Value, json};
use utoipa::ToSchema;

use super::Error;

/// Lower bound of the accepted length window.
pub const LENGTH_MIN: usize = 8;
/// Upper bound of the accepted length window.
pub const LENGTH_MAX: usize = 20;
/// Minimum length demanded by the strength rule.
pub const STRENGTH_MIN_LENGTH: usize = 12;

const SYMBOLS: &str = "-#!$@£%^&*()_+|~=`{}[]:\";'<>?,./\\ ";

/// Rule that rejected a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum Constraint {
    IsNotEmpty,
    IsString,
    IsStrongPassword,
    Length,
}

/// A single field-level validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct FieldError {
    /// Wire name of the offending field.
    #[schema(example = "password")]
    pub field: &'static str,
    pub constraint: Constraint,
    #[schema(example = "password is not strong enough")]
    pub message: String,
}

/// Every failure found in a payload, in field then rule order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
    /// The collected failures.
    pub fn errors(&self) -> &[FieldError] {
        &self.0
    }

    /// Failures reported against `field`.
    pub fn for_field<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a FieldError> + 'a {
        self.0.iter().filter(move |error| error.field == field)
    }
}

impl From<ValidationErrors> for Error {
    fn from(value: ValidationErrors) -> Self {
        Error::invalid_request("Validation failed").with_details(json!({
            "code": "validation_failed",
            "errors": value.0,
        }))
    }
}

/// Minimum character class counts for a strong password.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StrengthRule {
    pub min_length: usize,
    pub min_lowercase: usize,
    pub min_uppercase: usize,
    pub min_numbers: usize,
    pub min_symbols: usize,
}

impl StrengthRule {
    /// Strength rule applied to password-reset fields.
    pub const RESET: Self = Self {
        min_length: STRENGTH_MIN_LENGTH,
        min_lowercase: 1,
        min_uppercase: 1,
        min_numbers: 1,
        min_symbols: 1,
    };

    /// Whether `candidate` meets every minimum.
    pub fn is_satisfied_by(&self, candidate: &str) -> bool {
        let mut lowercase = 0;
        let mut uppercase = 0;
        let mut numbers = 0;
        let mut symbols = 0;
        for c in candidate.chars() {
            if c.is_ascii_lowercase() {
                lowercase += 1;
            } else if c.is_ascii_uppercase() {
                uppercase += 1;
            } else if c.is_ascii_digit() {
                numbers += 1;
            } else if SYMBOLS.contains(c) {
                symbols += 1;
            }
        }

        candidate.chars().count() >= self.min_length
            && lowercase >= self.min_lowercase
            && uppercase >= self.min_uppercase
            && numbers >= self.min_numbers
            && symbols >= self.min_symbols
    }
}

/// Rule set applied to a single password field.
#[derive(Debug, Clone, Copy)]
struct PasswordField {
    name: &'static str,
    label: &'static str,
}

const PASSWORD: PasswordField = PasswordField {
    name: "password",
    label: "Password",
};

const CONFIRM_PASSWORD: PasswordField = PasswordField {
    name: "confirmPassword",
    label: "Confirm password",
};

impl PasswordField {
    fn error(&self, constraint: Constraint, message: String) -> FieldError {
        FieldError {
            field: self.name,
            constraint,
            message,
        }
    }

    /// Push every failing rule for `value`; return the text when all pass.
    fn validate<'a>(
        &self,
        value: Option<&'a Value>,
        errors: &mut Vec<FieldError>,
    ) -> Option<&'a str> {
        let before = errors.len();
        let text = value.and_then(Value::as_str);

        let present = match value {
            None | Some(Value::Null) => false,
            Some(Value::String(s)) => !s.is_empty(),
            Some(_) => true,
        };
        if !present {
            errors.push(self.error(
                Constraint::IsNotEmpty,
                format!("{} should not be empty", self.name),
            ));
        }

        if text.is_none() {
            errors.push(self.error(
                Constraint::IsString,
                format!("{} must be a string", self.name),
            ));
        }

        if !text.is_some_and(|candidate| StrengthRule::RESET.is_satisfied_by(candidate)) {
            errors.push(self.error(
                Constraint::IsStrongPassword,
                format!("{} is not strong enough", self.name),
            ));
        }

        let within_bounds = text.is_some_and(|candidate| {
            (LENGTH_MIN..=LENGTH_MAX).contains(&candidate.chars().count())
        });
        if !within_bounds {
            errors.push(self.error(
                Constraint::Length,
                format!(
                    "{} has to be between {LENGTH_MIN} and {LENGTH_MAX} characters",
                    self.label
                ),
            ));
        }

        text.filter(|_| errors.len() == before)
    }
}

/// A password-reset payload whose fields both passed the policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordResetRequest {
    password: String,
    confirm_password: String,
}

impl PasswordResetRequest {
    /// Validate a raw JSON payload of the shape
    /// `{ "password": ..., "confirmPassword": ... }`.
    ///
    /// # Errors
    ///
    /// Returns every rule violation on either field.
    ///
    /// # Examples
    /// ```
    /// use orders_backend::domain::PasswordResetRequest;
    /// use serde_json::json;
    ///
    /// let ok = PasswordResetRequest::from_payload(&json!({
    ///     "password": "Sup3r$ecretPw",
    ///     "confirmPassword": "Sup3r$ecretPw",
    /// }));
    /// assert!(ok.is_ok());
    ///
    /// let short = PasswordResetRequest::from_payload(&json!({
    ///     "password": "Ab1$",
    ///     "confirmPassword": "Sup3r$ecretPw",
    /// }))
    /// .expect_err("short password fails");
    /// assert_eq!(short.for_field("password").count(), 2);
    /// ```
    pub fn from_payload(payload: &Value) -> Result<Self, ValidationErrors> {
        let mut errors = Vec::new();
        let password = PASSWORD.validate(payload.get(PASSWORD.name), &mut errors);
        let confirm_password =
            CONFIRM_PASSWORD.validate(payload.get(CONFIRM_PASSWORD.name), &mut errors);

        match (password, confirm_password) {
            (Some(password), Some(confirm_password)) => Ok(Self {
                password: password.to_owned(),
                confirm_password: confirm_password.to_owned(),
            }),
            _ => Err(ValidationErrors(errors)),
        }
    }

    /// The new password.
    pub fn password(&self) -> &str {
        &self.password
    }

    /// The confirmation value.
    pub fn confirm_password(&self) -> &str {
        &self.confirm_password
    }
}
