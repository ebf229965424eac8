//! Diesel-backed `LoginService` adapter built on the user repository port.
//!
//! Fetches the stored credential hash by email and verifies the presented
//! password. Unknown email and wrong password yield the same error so the
//! endpoint does not leak which accounts exist.

use std::sync::Arc;

use async_trait::async_trait;

use crate::domain::ports::{LoginService, UserPersistenceError, UserRepository};
use crate::domain::{Error, LoginCredentials, UserId};

use super::diesel_user_repository::DieselUserRepository;

/// Diesel-backed `LoginService` verifying argon2 credential hashes.
#[derive(Clone)]
pub struct DieselLoginService {
    users: Arc<dyn UserRepository>,
}

impl DieselLoginService {
    /// Create a new service backed by a Diesel user repository.
    pub fn new(users: DieselUserRepository) -> Self {
        Self {
            users: Arc::new(users),
        }
    }

    #[cfg(test)]
    fn from_repository(users: Arc<dyn UserRepository>) -> Self {
        Self { users }
    }
}

fn map_persistence_error(error: UserPersistenceError) -> Error {
    match error {
        UserPersistenceError::Connection { message } => Error::service_unavailable(message),
        other => Error::internal(other.to_string()),
    }
}

#[async_trait]
impl LoginService for DieselLoginService {
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<UserId, Error> {
        let stored = self
            .users
            .credentials_by_email(credentials.email())
            .await
            .map_err(map_persistence_error)?
            .ok_or_else(|| Error::unauthorized("invalid credentials"))?;

        if credentials.password().verify(&stored.password_hash) {
            Ok(stored.user_id)
        } else {
            Err(Error::unauthorized("invalid credentials"))
        }
    }
}
