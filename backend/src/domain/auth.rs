//! Authentication primitives: login credentials and password material.
//!
//! Keep inbound payload parsing outside the domain by exposing constructors
//! that validate string inputs before a handler talks to a port or service.
//! Password hashing and verification live here so adapters never see raw
//! credential bytes.

use std::fmt;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use zeroize::Zeroizing;

use super::user::{EmailAddress, UserValidationError};

/// Minimum accepted password length at registration.
pub const PASSWORD_MIN: usize = 8;

/// Domain error returned when credential payload values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialValidationError {
    /// Email was missing, blank, or malformed.
    InvalidEmail(UserValidationError),
    /// Password was blank.
    EmptyPassword,
    /// Password was shorter than [`PASSWORD_MIN`].
    PasswordTooShort { min: usize },
}

impl fmt::Display for CredentialValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidEmail(inner) => write!(f, "{inner}"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
            Self::PasswordTooShort { min } => {
                write!(f, "password must be at least {min} characters")
            }
        }
    }
}

impl std::error::Error for CredentialValidationError {}

/// Raw password material, zeroised on drop.
///
/// ## Invariants
/// - Non-empty; length is only enforced by [`Password::new_for_registration`]
///   so existing accounts with shorter passwords can still log in.
#[derive(Clone)]
pub struct Password(Zeroizing<String>);

impl Password {
    /// Accept any non-empty password, for login verification.
    pub fn new(password: impl Into<String>) -> Result<Self, CredentialValidationError> {
        let password = password.into();
        if password.is_empty() {
            return Err(CredentialValidationError::EmptyPassword);
        }
        Ok(Self(Zeroizing::new(password)))
    }

    /// Accept a password for a new account, enforcing the minimum length.
    pub fn new_for_registration(
        password: impl Into<String>,
    ) -> Result<Self, CredentialValidationError> {
        let password = Self::new(password)?;
        if password.0.chars().count() < PASSWORD_MIN {
            return Err(CredentialValidationError::PasswordTooShort { min: PASSWORD_MIN });
        }
        Ok(password)
    }

    /// Hash this password for storage.
    ///
    /// Uses the default Argon2id parameters with a fresh random salt.
    pub fn hash(&self) -> Result<PasswordHash, PasswordHashError> {
        let salt = SaltString::generate(&mut OsRng);
        let hashed = Argon2::default()
            .hash_password(self.0.as_bytes(), &salt)
            .map_err(|error| PasswordHashError {
                message: error.to_string(),
            })?;
        Ok(PasswordHash(hashed.to_string()))
    }

    /// Check this password against a stored hash.
    ///
    /// An unparsable stored hash verifies as `false` rather than erroring, so
    /// a corrupt record behaves like a wrong password instead of a 500.
    pub fn verify(&self, stored: &PasswordHash) -> bool {
        let Ok(parsed) = argon2::PasswordHash::new(stored.as_str()) else {
            tracing::warn!("stored password hash failed to parse; treating as mismatch");
            return false;
        };
        Argon2::default()
            .verify_password(self.0.as_bytes(), &parsed)
            .is_ok()
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(..)")
    }
}

/// Failure while computing a password hash.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("password hashing failed: {message}")]
pub struct PasswordHashError {
    message: String,
}

/// Stored credential hash in PHC string format.
///
/// Opaque to everything except [`Password::verify`]; deliberately neither
/// `Serialize` nor `Deserialize` so it cannot end up in a response body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Wrap a hash string loaded from the store.
    pub fn from_stored(hash: impl Into<String>) -> Self {
        Self(hash.into())
    }

    /// The PHC-format hash string for storage.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

/// Validated login credentials used by authentication services.
///
/// ## Invariants
/// - `email` passes [`EmailAddress`] validation (trimmed, lowercased).
/// - `password` is non-empty and retains caller-provided whitespace to avoid
///   surprising credential comparisons.
#[derive(Debug, Clone)]
pub struct LoginCredentials {
    email: EmailAddress,
    password: Password,
}

impl LoginCredentials {
    /// Construct credentials from raw email/password inputs.
    pub fn try_from_parts(
        email: &str,
        password: &str,
    ) -> Result<Self, CredentialValidationError> {
        let email = EmailAddress::new(email).map_err(CredentialValidationError::InvalidEmail)?;
        let password = Password::new(password)?;
        Ok(Self { email, password })
    }

    /// Email used for the account lookup.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Password to verify against the stored hash.
    pub fn password(&self) -> &Password {
        &self.password
    }
}
