//! Shared validation helpers for inbound HTTP adapters.
//!
//! Failures become [`Error::invalid_request`] with `details` of the form
//! `{ field, value, code }`.

use serde_json::json;

use crate::domain::{Error, OrderId, OrderStatus, UserId};

/// Validation error codes for HTTP request failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    InvalidUuid,
    InvalidInteger,
    InvalidStatus,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::InvalidUuid => "invalid_uuid",
            ErrorCode::InvalidInteger => "invalid_integer",
            ErrorCode::InvalidStatus => "invalid_status",
        }
    }
}

/// Newtype wrapper for HTTP field names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(&self) -> &'static str {
        self.0
    }
}

fn invalid_value(field: FieldName, message: String, code: ErrorCode, value: &str) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field.as_str(),
        "value": value,
        "code": code.as_str(),
    }))
}

pub(crate) fn invalid_uuid_error(field: FieldName, value: &str) -> Error {
    let name = field.as_str();
    invalid_value(
        field,
        format!("{name} must be a valid UUID"),
        ErrorCode::InvalidUuid,
        value,
    )
}

pub(crate) fn parse_order_id(value: &str, field: FieldName) -> Result<OrderId, Error> {
    OrderId::new(value).map_err(|_| invalid_uuid_error(field, value))
}

pub(crate) fn parse_user_id(value: &str, field: FieldName) -> Result<UserId, Error> {
    UserId::new(value).map_err(|_| invalid_uuid_error(field, value))
}

/// Parse an optional integer query parameter, falling back to `default`.
pub(crate) fn parse_optional_i64(
    value: Option<&str>,
    field: FieldName,
    default: i64,
) -> Result<i64, Error> {
    let Some(value) = value else {
        return Ok(default);
    };
    value.trim().parse().map_err(|_| {
        let name = field.as_str();
        invalid_value(
            field,
            format!("{name} must be an integer"),
            ErrorCode::InvalidInteger,
            value,
        )
    })
}

pub(crate) fn parse_status(value: &str, field: FieldName) -> Result<OrderStatus, Error> {
    value.parse().map_err(|_| {
        let name = field.as_str();
        invalid_value(
            field,
            format!("{name} must be one of pending, shipping, finished, cancelled"),
            ErrorCode::InvalidStatus,
            value,
        )
    })
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use serde_json::json;

    use super::*;
    use crate::domain::ErrorCode as DomainCode;

    #[rstest]
    fn invalid_uuid_reports_field_value_and_code() {
        let error = parse_order_id("abc", FieldName::new("orderId")).expect_err("invalid");

        assert_eq!(error.code(), DomainCode::InvalidRequest);
        assert_eq!(error.message(), "orderId must be a valid UUID");
        assert_eq!(
            error.details(),
            Some(&json!({ "field": "orderId", "value": "abc", "code": "invalid_uuid" }))
        );
    }

    #[rstest]
    #[case(None, 10)]
    #[case(Some("25"), 25)]
    #[case(Some(" 3 "), 3)]
    #[case(Some("-1"), -1)]
    fn optional_integers_default_or_parse(#[case] raw: Option<&str>, #[case] expected: i64) {
        let parsed = parse_optional_i64(raw, FieldName::new("limit"), 10).expect("valid integer");
        assert_eq!(parsed, expected);
    }

    #[rstest]
    #[case("ten")]
    #[case("1.5")]
    #[case("")]
    fn non_integers_are_rejected(#[case] raw: &str) {
        let error =
            parse_optional_i64(Some(raw), FieldName::new("page"), 1).expect_err("not an integer");
        assert_eq!(
            error.details().and_then(|d| d.get("code")),
            Some(&json!("invalid_integer"))
        );
    }

    #[rstest]
    #[case("shipping", OrderStatus::Shipping)]
    #[case("cancelled", OrderStatus::Cancelled)]
    fn known_statuses_parse(#[case] raw: &str, #[case] expected: OrderStatus) {
        assert_eq!(parse_status(raw, FieldName::new("status")), Ok(expected));
    }

    #[rstest]
    #[case("Shipping")]
    #[case("lost")]
    fn unknown_statuses_are_rejected(#[case] raw: &str) {
        let error = parse_status(raw, FieldName::new("status")).expect_err("unknown status");
        assert_eq!(
            error.details(),
            Some(&json!({ "field": "status", "value": raw, "code": "invalid_status" }))
        );
    }
}
