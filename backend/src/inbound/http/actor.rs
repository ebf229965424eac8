//! Acting-user resolution for HTTP handlers.
//!
//! The authentication gate: every request's acting user is derived from the
//! session subject and the user store, never from client-supplied fields.

use actix_web::{dev::Payload, web, FromRequest, HttpMessage, HttpRequest};
use futures_util::future::LocalBoxFuture;

use crate::domain::ports::UserRepository;
use crate::domain::{Error, Role, User, UserId};

use super::error::map_user_persistence_error;
use super::session::SessionContext;
use super::state::HttpState;

/// The authenticated user acting on the current request.
///
/// Extracting this type resolves the session subject against the user store,
/// so a stale session whose account has been deleted is unauthenticated
/// rather than a ghost actor. The role-gate middleware caches the resolved
/// actor in request extensions; the extractor reuses that when present.
#[derive(Debug, Clone)]
pub struct CurrentUser(User);

impl CurrentUser {
    /// Wrap an already-resolved user.
    pub(crate) fn new(user: User) -> Self {
        Self(user)
    }

    /// The acting user's record.
    pub fn user(&self) -> &User {
        &self.0
    }

    /// The acting user's identifier.
    pub fn id(&self) -> &UserId {
        self.0.id()
    }

    /// The acting user's privilege tier.
    pub fn role(&self) -> Role {
        self.0.role()
    }
}

/// Resolve the session subject to a live user record.
pub(crate) async fn resolve_actor(
    session: &SessionContext,
    users: &dyn UserRepository,
) -> Result<CurrentUser, Error> {
    let user_id = session.require_user_id()?;
    let user = users
        .find_by_id(&user_id)
        .await
        .map_err(map_user_persistence_error)?
        .ok_or_else(|| {
            tracing::warn!(user_id = %user_id, "session references a missing user");
            Error::unauthorized("login required")
        })?;
    Ok(CurrentUser::new(user))
}

impl FromRequest for CurrentUser {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        if let Some(actor) = req.extensions().get::<CurrentUser>().cloned() {
            return Box::pin(async move { Ok(actor) });
        }

        let state = req.app_data::<web::Data<HttpState>>().cloned();
        let session_fut = SessionContext::from_request(req, payload);
        Box::pin(async move {
            let state = state
                .ok_or_else(|| Error::internal("HttpState missing from app data"))?;
            let session = session_fut.await?;
            let actor = resolve_actor(&session, state.users.as_ref()).await?;
            Ok(actor)
        })
    }
}
