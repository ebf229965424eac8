//! User data model.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use super::auth::PasswordHash;
use super::role::Role;

/// Validation errors returned by the user constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    EmptyId,
    InvalidId,
    EmptyEmail,
    InvalidEmail,
    EmailTooLong { max: usize },
    EmptyDisplayName,
    DisplayNameTooLong { max: usize },
    DisplayNameInvalidCharacters,
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyId => write!(f, "user id must not be empty"),
            Self::InvalidId => write!(f, "user id must be a valid UUID"),
            Self::EmptyEmail => write!(f, "email must not be empty"),
            Self::InvalidEmail => write!(f, "email must be a valid address"),
            Self::EmailTooLong { max } => {
                write!(f, "email must be at most {max} characters")
            }
            Self::EmptyDisplayName => write!(f, "display name must not be empty"),
            Self::DisplayNameTooLong { max } => {
                write!(f, "display name must be at most {max} characters")
            }
            Self::DisplayNameInvalidCharacters => write!(
                f,
                "display name may only contain letters, numbers, spaces, or underscores",
            ),
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Stable user identifier stored as a UUID.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(Uuid);

impl UserId {
    /// Validate and construct a [`UserId`] from string input.
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let raw = id.as_ref();
        if raw.is_empty() {
            return Err(UserValidationError::EmptyId);
        }
        if raw.trim() != raw {
            return Err(UserValidationError::InvalidId);
        }
        let parsed = Uuid::parse_str(raw).map_err(|_| UserValidationError::InvalidId)?;
        Ok(Self(parsed))
    }

    /// Generate a new random [`UserId`].
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Construct from an already-parsed UUID.
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Access the underlying UUID.
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.0.to_string()
    }
}

impl TryFrom<String> for UserId {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Maximum stored length for an email address.
pub const EMAIL_MAX: usize = 254;

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        // Shape check only; deliverability is not this layer's concern.
        let pattern = r"^[^@\s]+@[^@\s]+\.[^@\s]+$";
        Regex::new(pattern)
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

/// Unique, validated email address identifying a user.
///
/// ## Invariants
/// - Stored trimmed and lowercased so uniqueness is case-insensitive.
/// - Must match a minimal `local@domain.tld` shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Validate and construct an [`EmailAddress`].
    pub fn new(email: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let normalised = email.as_ref().trim().to_ascii_lowercase();
        if normalised.is_empty() {
            return Err(UserValidationError::EmptyEmail);
        }
        if normalised.chars().count() > EMAIL_MAX {
            return Err(UserValidationError::EmailTooLong { max: EMAIL_MAX });
        }
        if !email_regex().is_match(&normalised) {
            return Err(UserValidationError::InvalidEmail);
        }
        Ok(Self(normalised))
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Maximum allowed length for a display name.
pub const DISPLAY_NAME_MAX: usize = 64;

static DISPLAY_NAME_RE: OnceLock<Regex> = OnceLock::new();

fn display_name_regex() -> &'static Regex {
    DISPLAY_NAME_RE.get_or_init(|| {
        // Length is enforced separately; this regex constrains allowed characters.
        let pattern = "^[A-Za-z0-9_ ]+$";
        Regex::new(pattern)
            .unwrap_or_else(|error| panic!("display name regex failed to compile: {error}"))
    })
}

/// Human readable display name for the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DisplayName(String);

impl DisplayName {
    /// Validate and construct a [`DisplayName`].
    pub fn new(display_name: impl Into<String>) -> Result<Self, UserValidationError> {
        let display_name = display_name.into();
        if display_name.trim().is_empty() {
            return Err(UserValidationError::EmptyDisplayName);
        }
        if display_name.chars().count() > DISPLAY_NAME_MAX {
            return Err(UserValidationError::DisplayNameTooLong {
                max: DISPLAY_NAME_MAX,
            });
        }
        if !display_name_regex().is_match(&display_name) {
            return Err(UserValidationError::DisplayNameInvalidCharacters);
        }
        Ok(Self(display_name))
    }
}

impl AsRef<str> for DisplayName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<DisplayName> for String {
    fn from(value: DisplayName) -> Self {
        value.0
    }
}

impl TryFrom<String> for DisplayName {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Application user as seen by handlers and views.
///
/// Credential material never travels on this type; it stays behind the
/// repository port.
///
/// ## Invariants
/// - `id` is a valid UUID.
/// - `email` is unique across the store (enforced at the persistence layer).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
#[serde(try_from = "UserDto", into = "UserDto")]
pub struct User {
    #[schema(value_type = String, example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    id: UserId,
    #[schema(value_type = String, example = "ada@example.com")]
    email: EmailAddress,
    #[schema(value_type = String, example = "Ada Lovelace")]
    display_name: DisplayName,
    role: Role,
}

impl User {
    /// Build a new [`User`] from validated components.
    pub fn new(id: UserId, email: EmailAddress, display_name: DisplayName, role: Role) -> Self {
        Self {
            id,
            email,
            display_name,
            role,
        }
    }

    /// Fallible constructor enforcing every field invariant from strings.
    pub fn try_from_strings(
        id: impl AsRef<str>,
        email: impl AsRef<str>,
        display_name: impl Into<String>,
        role: Role,
    ) -> Result<Self, UserValidationError> {
        let id = UserId::new(id)?;
        let email = EmailAddress::new(email)?;
        let display_name = DisplayName::new(display_name)?;
        Ok(Self::new(id, email, display_name, role))
    }

    /// Stable user identifier.
    pub fn id(&self) -> &UserId {
        &self.id
    }

    /// Unique login email.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Display name shown on listings and profile views.
    pub fn display_name(&self) -> &DisplayName {
        &self.display_name
    }

    /// Privilege tier.
    pub fn role(&self) -> Role {
        self.role
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
struct UserDto {
    id: String,
    email: String,
    display_name: String,
    role: Role,
}

impl From<User> for UserDto {
    fn from(value: User) -> Self {
        let User {
            id,
            email,
            display_name,
            role,
        } = value;
        Self {
            id: id.to_string(),
            email: email.into(),
            display_name: display_name.into(),
            role,
        }
    }
}

impl TryFrom<UserDto> for User {
    type Error = UserValidationError;

    fn try_from(value: UserDto) -> Result<Self, Self::Error> {
        User::try_from_strings(value.id, value.email, value.display_name, value.role)
    }
}

/// Payload for creating a user record, carrying the credential hash.
///
/// Only the registration path builds this; it never round-trips through
/// serde, so the hash cannot leak into a response body.
#[derive(Debug, Clone)]
pub struct NewUser {
    id: UserId,
    email: EmailAddress,
    display_name: DisplayName,
    role: Role,
    password_hash: PasswordHash,
}

impl NewUser {
    /// Assemble a new record from validated components.
    pub fn new(
        email: EmailAddress,
        display_name: DisplayName,
        role: Role,
        password_hash: PasswordHash,
    ) -> Self {
        Self {
            id: UserId::random(),
            email,
            display_name,
            role,
            password_hash,
        }
    }

    /// Identifier assigned at construction time.
    pub fn id(&self) -> &UserId {
        &self.id
    }

    /// Unique login email.
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Display name for listings.
    pub fn display_name(&self) -> &DisplayName {
        &self.display_name
    }

    /// Privilege tier assigned at registration.
    pub fn role(&self) -> Role {
        self.role
    }

    /// Stored credential hash.
    pub fn password_hash(&self) -> &PasswordHash {
        &self.password_hash
    }

    /// The user view of this record, without credential material.
    pub fn to_user(&self) -> User {
        User::new(
            self.id.clone(),
            self.email.clone(),
            self.display_name.clone(),
            self.role,
        )
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case("", UserValidationError::EmptyId)]
    #[case("not-a-uuid", UserValidationError::InvalidId)]
    #[case(" 3fa85f64-5717-4562-b3fc-2c963f66afa6", UserValidationError::InvalidId)]
    fn user_id_rejects_invalid_input(#[case] input: &str, #[case] expected: UserValidationError) {
        let err = UserId::new(input).expect_err("invalid ids must fail");
        assert_eq!(err, expected);
    }

    #[test]
    fn user_id_round_trips_through_string() {
        let id = UserId::random();
        let raw = id.to_string();
        let parsed = UserId::new(&raw).expect("round trip");
        assert_eq!(parsed, id);
    }

    #[rstest]
    #[case("ada@example.com", "ada@example.com")]
    #[case("  Ada@Example.COM  ", "ada@example.com")]
    fn email_normalises_case_and_whitespace(#[case] input: &str, #[case] expected: &str) {
        let email = EmailAddress::new(input).expect("valid email");
        assert_eq!(email.as_ref(), expected);
    }

    #[rstest]
    #[case("", UserValidationError::EmptyEmail)]
    #[case("no-at-sign", UserValidationError::InvalidEmail)]
    #[case("spaces in@example.com", UserValidationError::InvalidEmail)]
    #[case("missing-tld@example", UserValidationError::InvalidEmail)]
    fn email_rejects_invalid_shapes(#[case] input: &str, #[case] expected: UserValidationError) {
        let err = EmailAddress::new(input).expect_err("invalid emails must fail");
        assert_eq!(err, expected);
    }

    #[rstest]
    #[case("", UserValidationError::EmptyDisplayName)]
    #[case("   ", UserValidationError::EmptyDisplayName)]
    #[case("bad!name", UserValidationError::DisplayNameInvalidCharacters)]
    fn display_name_rejects_invalid_input(
        #[case] input: &str,
        #[case] expected: UserValidationError,
    ) {
        let err = DisplayName::new(input).expect_err("invalid names must fail");
        assert_eq!(err, expected);
    }

    #[test]
    fn user_serialises_camel_case_without_credentials() {
        let user = User::try_from_strings(
            "3fa85f64-5717-4562-b3fc-2c963f66afa6",
            "ada@example.com",
            "Ada Lovelace",
            Role::Admin,
        )
        .expect("valid user");

        let value = serde_json::to_value(&user).expect("serialise user");
        assert_eq!(
            value.get("displayName").and_then(|v| v.as_str()),
            Some("Ada Lovelace")
        );
        assert_eq!(value.get("role").and_then(|v| v.as_str()), Some("admin"));
        assert!(value.get("passwordHash").is_none());
        assert!(value.get("display_name").is_none());
    }
}
