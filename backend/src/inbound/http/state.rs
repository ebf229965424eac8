//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{LoginService, UserRepository};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    /// Authentication use-case.
    pub login: Arc<dyn LoginService>,
    /// User record store.
    pub users: Arc<dyn UserRepository>,
}

impl HttpState {
    /// Bundle the port implementations used by the HTTP layer.
    pub fn new(login: Arc<dyn LoginService>, users: Arc<dyn UserRepository>) -> Self {
        Self { login, users }
    }
}
