//! Rendered view payloads and response helpers.
//!
//! Every GET payload carries the drained flash notices so the client renders
//! them exactly once, mirroring the redirect-with-notice convention used by
//! the mutation endpoints.

use actix_web::http::header;
use actix_web::HttpResponse;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::{Notice, User};

/// `303 See Other` redirect used after every mutation.
pub(crate) fn see_other(location: &str) -> HttpResponse {
    HttpResponse::SeeOther()
        .insert_header((header::LOCATION, location))
        .finish()
}

/// Profile payload for the acting user.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileView {
    pub user: User,
    pub notices: Vec<Notice>,
}

/// Bounded user listing.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserListView {
    pub users: Vec<User>,
    pub notices: Vec<Notice>,
}

/// Single-user payload for the view and edit screens.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserDetailView {
    pub user: User,
    pub notices: Vec<Notice>,
}

/// Registration form payload.
///
/// `email` echoes the submitted address back after a validation failure so
/// the client can preserve it for correction.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterFormView {
    pub email: Option<String>,
    pub notices: Vec<Notice>,
}
