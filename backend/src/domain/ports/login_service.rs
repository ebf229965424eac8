//! Driving port for login/authentication use-cases.
//!
//! In hexagonal terms this is a *driving* port: inbound adapters call it to
//! authenticate credentials without knowing (or importing) the backing
//! infrastructure. This makes HTTP handler tests deterministic because they
//! can substitute a test double instead of wiring persistence.

use async_trait::async_trait;

use crate::domain::auth::LoginCredentials;
use crate::domain::error::Error;
use crate::domain::user::UserId;

/// Domain use-case port for authentication.
#[async_trait]
pub trait LoginService: Send + Sync {
    /// Validate credentials and return the authenticated user id.
    ///
    /// Unknown email and wrong password are indistinguishable to the caller;
    /// both yield the same unauthorised error.
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<UserId, Error>;
}
