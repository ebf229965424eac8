//! Port abstraction for user persistence adapters and their errors.
//!
//! Uniqueness and conditional deletion are the store's job: `insert` and
//! `update_email` surface constraint conflicts as [`UserPersistenceError::DuplicateEmail`]
//! instead of relying on a check-then-act sequence, and `delete_where_role`
//! only removes the row if its role still matches the caller's snapshot.

use async_trait::async_trait;

use crate::domain::auth::PasswordHash;
use crate::domain::role::Role;
use crate::domain::user::{EmailAddress, NewUser, User, UserId};

/// Persistence errors raised by user repository adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UserPersistenceError {
    /// Repository connection could not be established.
    #[error("user repository connection failed: {message}")]
    Connection { message: String },
    /// Query or mutation failed during execution.
    #[error("user repository query failed: {message}")]
    Query { message: String },
    /// An insert or email change collided with the unique email constraint.
    #[error("email already exists: {email}")]
    DuplicateEmail { email: String },
    /// The targeted record does not exist (or no longer matches the
    /// caller's snapshot for conditional operations).
    #[error("user record not found")]
    NotFound,
}

impl UserPersistenceError {
    /// Create a connection error with the given message.
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Create a query error with the given message.
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }

    /// Create a duplicate-email conflict for the given address.
    pub fn duplicate_email(email: impl Into<String>) -> Self {
        Self::DuplicateEmail {
            email: email.into(),
        }
    }
}

/// Stored credential material for login verification.
///
/// Only the login service consumes this; it never reaches handlers.
#[derive(Debug, Clone)]
pub struct StoredCredentials {
    /// Identifier of the matching account.
    pub user_id: UserId,
    /// PHC-format password hash.
    pub password_hash: PasswordHash,
}

/// Driven port for user record persistence.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user record.
    ///
    /// The unique email constraint is enforced by the store; a conflict
    /// surfaces as [`UserPersistenceError::DuplicateEmail`].
    async fn insert(&self, user: &NewUser) -> Result<(), UserPersistenceError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch a user by email.
    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserPersistenceError>;

    /// Fetch login credentials by email.
    async fn credentials_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<StoredCredentials>, UserPersistenceError>;

    /// List users ordered by email, bounded to `limit` records.
    async fn list(&self, limit: i64) -> Result<Vec<User>, UserPersistenceError>;

    /// Replace the record's email, re-validating the full record.
    ///
    /// Returns the updated record. A constraint conflict surfaces as
    /// [`UserPersistenceError::DuplicateEmail`]; a missing record as
    /// [`UserPersistenceError::NotFound`].
    async fn update_email(
        &self,
        id: &UserId,
        email: &EmailAddress,
    ) -> Result<User, UserPersistenceError>;

    /// Replace the record's role, re-validating the full record.
    ///
    /// Returns the updated record so callers can report the new state.
    async fn update_role(&self, id: &UserId, role: Role) -> Result<User, UserPersistenceError>;

    /// Delete the record only if its role still matches `role`.
    ///
    /// Zero affected rows (the record vanished or its role changed since
    /// the caller's read) surfaces as [`UserPersistenceError::NotFound`].
    async fn delete_where_role(
        &self,
        id: &UserId,
        role: Role,
    ) -> Result<(), UserPersistenceError>;
}
