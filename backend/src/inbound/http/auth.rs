//! Password-reset HTTP handler.
//!
//! ```text
//! POST /api/v1/auth/reset-password/validate
//! ```
//!
//! The raw JSON body is handed to the password policy untouched so that
//! non-string values are reported as rule failures rather than as parse
//! errors.

use actix_web::{post, web};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::ToSchema;

use crate::domain::{EmptyData, Envelope, Error, PasswordResetRequest};
use crate::inbound::http::ApiResult;

const RESET_PAYLOAD_VALID: &str = "Password reset payload is valid";

/// Documented shape of the reset payload.
#[derive(Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequestBody {
    #[schema(example = "Sup3r$ecretPw")]
    pub password: String,
    #[schema(example = "Sup3r$ecretPw")]
    pub confirm_password: String,
}

/// Check a password-reset payload against the password policy.
#[utoipa::path(
    post,
    path = "/api/v1/auth/reset-password/validate",
    request_body = ResetPasswordRequestBody,
    responses(
        (status = 200, description = "Payload satisfies the policy", body = Envelope<EmptyData>),
        (status = 400, description = "Validation failed", body = Error)
    ),
    tags = ["auth"],
    operation_id = "validatePasswordReset"
)]
#[post("/auth/reset-password/validate")]
pub async fn validate_password_reset(
    payload: web::Json<Value>,
) -> ApiResult<web::Json<Envelope<EmptyData>>> {
    PasswordResetRequest::from_payload(&payload).map_err(Error::from)?;
    Ok(web::Json(Envelope::ok(RESET_PAYLOAD_VALID, EmptyData::default())))
}
