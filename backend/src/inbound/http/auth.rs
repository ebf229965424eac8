//! Authentication endpoints: login and logout.
//!
//! ```text
//! POST /auth/login {"email":"ada@example.com","password":"..."}
//! GET /auth/logout
//! ```

use actix_web::{get, post, web, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::domain::{CredentialValidationError, Error, LoginCredentials};

use super::error::ApiResult;
use super::session::SessionContext;
use super::state::HttpState;
use super::validation::{invalid_field_error, FieldName};
use super::views::see_other;

pub(crate) const PROFILE_PATH: &str = "/user/profile";

/// Login request body for `POST /auth/login`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

fn map_credential_validation_error(err: CredentialValidationError) -> Error {
    match err {
        CredentialValidationError::InvalidEmail(inner) => {
            invalid_field_error(FieldName::new("email"), "invalid_email", inner.to_string())
        }
        CredentialValidationError::EmptyPassword => invalid_field_error(
            FieldName::new("password"),
            "empty_password",
            "password must not be empty",
        ),
        CredentialValidationError::PasswordTooShort { min } => invalid_field_error(
            FieldName::new("password"),
            "password_too_short",
            format!("password must be at least {min} characters"),
        ),
    }
}

/// Authenticate and establish a session.
///
/// On success the session cookie carries the authenticated identity and the
/// response redirects to the profile view with a success notice queued.
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 303, description = "Login success; session established", headers(("Set-Cookie" = String, description = "Session cookie"))),
        (status = 400, description = "Invalid request", body = Error),
        (status = 401, description = "Invalid credentials", body = Error),
        (status = 500, description = "Internal server error")
    ),
    tags = ["auth"],
    operation_id = "login",
    security([])
)]
#[post("/login")]
pub async fn login(
    state: web::Data<HttpState>,
    session: SessionContext,
    payload: web::Json<LoginRequest>,
) -> ApiResult<HttpResponse> {
    let payload = payload.into_inner();
    let credentials = LoginCredentials::try_from_parts(&payload.email, &payload.password)
        .map_err(map_credential_validation_error)?;
    let user_id = state.login.authenticate(&credentials).await?;
    session.persist_user(&user_id)?;
    Ok(see_other(PROFILE_PATH))
}

/// Destroy the session: identity and queued notices.
#[utoipa::path(
    get,
    path = "/auth/logout",
    responses(
        (status = 303, description = "Session destroyed"),
    ),
    tags = ["auth"],
    operation_id = "logout",
    security([])
)]
#[get("/logout")]
pub async fn logout(session: SessionContext) -> HttpResponse {
    session.purge();
    see_other("/")
}
