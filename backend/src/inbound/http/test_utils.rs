//! Test helpers for inbound HTTP components.

use std::sync::{Arc, Mutex};

use actix_session::{storage::CookieSessionStore, SessionMiddleware};
use actix_web::body::MessageBody;
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{Service, ServiceResponse};
use actix_web::{test, web, HttpResponse};
use async_trait::async_trait;
use serde::Deserialize;

use crate::domain::ports::{
    LoginService, StoredCredentials, UserPersistenceError, UserRepository,
};
use crate::domain::{
    DisplayName, EmailAddress, Error, LoginCredentials, NewUser, PasswordHash, Role, User, UserId,
};

use super::session::SessionContext;
use super::state::HttpState;

/// Build a session middleware configured for tests.
///
/// - Generates a fresh signing/encryption key per invocation.
/// - Sets the cookie name to `session` and disables the `Secure` flag for
///   local HTTP tests.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name("session".to_owned())
        .cookie_secure(false)
        .build()
}

struct StoredUser {
    user: User,
    password_hash: PasswordHash,
}

/// In-memory [`UserRepository`] mirroring the store contract, including the
/// unique email constraint and conditional deletion.
#[derive(Default)]
pub struct InMemoryUsers {
    state: Mutex<Vec<StoredUser>>,
}

impl InMemoryUsers {
    /// Store a user with an unusable credential hash.
    pub fn seed_user(&self, email: &str, role: Role) -> User {
        self.seed_with_hash(email, role, PasswordHash::from_stored("seeded-unusable"))
    }

    /// Store a user whose password will verify via the login service.
    pub fn seed_user_with_password(&self, email: &str, role: Role, password: &str) -> User {
        let hash = crate::domain::Password::new(password)
            .expect("valid test password")
            .hash()
            .expect("hashing succeeds");
        self.seed_with_hash(email, role, hash)
    }

    fn seed_with_hash(&self, email: &str, role: Role, password_hash: PasswordHash) -> User {
        let user = User::new(
            UserId::random(),
            EmailAddress::new(email).expect("valid test email"),
            DisplayName::new("Seeded User").expect("valid test name"),
            role,
        );
        self.state.lock().expect("state lock").push(StoredUser {
            user: user.clone(),
            password_hash,
        });
        user
    }

    /// Drop a record directly, bypassing the policy layer.
    pub fn remove(&self, id: &UserId) {
        self.state
            .lock()
            .expect("state lock")
            .retain(|stored| stored.user.id() != id);
    }

    /// Current records, unordered.
    pub fn snapshot(&self) -> Vec<User> {
        self.state
            .lock()
            .expect("state lock")
            .iter()
            .map(|stored| stored.user.clone())
            .collect()
    }
}

#[async_trait]
impl UserRepository for InMemoryUsers {
    async fn insert(&self, user: &NewUser) -> Result<(), UserPersistenceError> {
        let mut state = self.state.lock().expect("state lock");
        if state
            .iter()
            .any(|stored| stored.user.email() == user.email())
        {
            return Err(UserPersistenceError::duplicate_email(
                user.email().to_string(),
            ));
        }
        state.push(StoredUser {
            user: user.to_user(),
            password_hash: user.password_hash().clone(),
        });
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        Ok(self
            .state
            .lock()
            .expect("state lock")
            .iter()
            .find(|stored| stored.user.id() == id)
            .map(|stored| stored.user.clone()))
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserPersistenceError> {
        Ok(self
            .state
            .lock()
            .expect("state lock")
            .iter()
            .find(|stored| stored.user.email() == email)
            .map(|stored| stored.user.clone()))
    }

    async fn credentials_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<StoredCredentials>, UserPersistenceError> {
        Ok(self
            .state
            .lock()
            .expect("state lock")
            .iter()
            .find(|stored| stored.user.email() == email)
            .map(|stored| StoredCredentials {
                user_id: stored.user.id().clone(),
                password_hash: stored.password_hash.clone(),
            }))
    }

    async fn list(&self, limit: i64) -> Result<Vec<User>, UserPersistenceError> {
        let mut users = self.snapshot();
        users.sort_by(|a, b| a.email().as_ref().cmp(b.email().as_ref()));
        users.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(users)
    }

    async fn update_email(
        &self,
        id: &UserId,
        email: &EmailAddress,
    ) -> Result<User, UserPersistenceError> {
        let mut state = self.state.lock().expect("state lock");
        if state
            .iter()
            .any(|stored| stored.user.email() == email && stored.user.id() != id)
        {
            return Err(UserPersistenceError::duplicate_email(email.to_string()));
        }
        let stored = state
            .iter_mut()
            .find(|stored| stored.user.id() == id)
            .ok_or(UserPersistenceError::NotFound)?;
        stored.user = User::new(
            stored.user.id().clone(),
            email.clone(),
            stored.user.display_name().clone(),
            stored.user.role(),
        );
        Ok(stored.user.clone())
    }

    async fn update_role(&self, id: &UserId, role: Role) -> Result<User, UserPersistenceError> {
        let mut state = self.state.lock().expect("state lock");
        let stored = state
            .iter_mut()
            .find(|stored| stored.user.id() == id)
            .ok_or(UserPersistenceError::NotFound)?;
        stored.user = User::new(
            stored.user.id().clone(),
            stored.user.email().clone(),
            stored.user.display_name().clone(),
            role,
        );
        Ok(stored.user.clone())
    }

    async fn delete_where_role(
        &self,
        id: &UserId,
        role: Role,
    ) -> Result<(), UserPersistenceError> {
        let mut state = self.state.lock().expect("state lock");
        let before = state.len();
        state.retain(|stored| !(stored.user.id() == id && stored.user.role() == role));
        if state.len() == before {
            return Err(UserPersistenceError::NotFound);
        }
        Ok(())
    }
}

/// Login service backed by [`InMemoryUsers`] credentials.
pub struct InMemoryLogin {
    users: Arc<InMemoryUsers>,
}

#[async_trait]
impl LoginService for InMemoryLogin {
    async fn authenticate(&self, credentials: &LoginCredentials) -> Result<UserId, Error> {
        let stored = self
            .users
            .credentials_by_email(credentials.email())
            .await
            .map_err(|err| Error::internal(err.to_string()))?
            .ok_or_else(|| Error::unauthorized("invalid credentials"))?;
        if credentials.password().verify(&stored.password_hash) {
            Ok(stored.user_id)
        } else {
            Err(Error::unauthorized("invalid credentials"))
        }
    }
}

/// Build an [`HttpState`] over a shared in-memory store.
pub fn seeded_state() -> (HttpState, Arc<InMemoryUsers>) {
    let users = Arc::new(InMemoryUsers::default());
    let login = Arc::new(InMemoryLogin {
        users: Arc::clone(&users),
    });
    (HttpState::new(login, users.clone()), users)
}

#[derive(Deserialize)]
pub struct SessionLoginQuery {
    id: String,
}

/// Test-only route handler establishing a session for an arbitrary user id.
pub async fn session_login(
    session: SessionContext,
    query: web::Query<SessionLoginQuery>,
) -> Result<HttpResponse, Error> {
    let id = UserId::new(&query.id).map_err(|err| Error::invalid_request(err.to_string()))?;
    session.persist_user(&id)?;
    Ok(HttpResponse::Ok().finish())
}

/// Log the given user in through `/session-login` and return the cookie.
pub async fn login_cookie<S, B>(app: &S, id: &UserId) -> Cookie<'static>
where
    S: Service<actix_http::Request, Response = ServiceResponse<B>, Error = actix_web::Error>,
    B: MessageBody,
{
    let res = test::call_service(
        app,
        test::TestRequest::get()
            .uri(&format!("/session-login?id={id}"))
            .to_request(),
    )
    .await;
    assert!(res.status().is_success(), "session login must succeed");
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == "session")
        .expect("session cookie set")
        .into_owned()
}
