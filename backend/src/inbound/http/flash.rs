//! One-shot notice queue stored in the cookie session.
//!
//! Mutation handlers push notices before redirecting; render handlers drain
//! the queue into the response payload. Draining removes the notices, so
//! each one is shown exactly once.

use actix_web::{dev::Payload, FromRequest, HttpRequest};
use futures_util::future::LocalBoxFuture;

use crate::domain::{Error, Notice};

use super::session::SessionContext;

pub(crate) const NOTICES_KEY: &str = "flash_notices";

/// Session-backed flash notice queue.
#[derive(Clone)]
pub struct FlashBag(SessionContext);

impl FlashBag {
    /// Wrap a session for notice access.
    pub fn new(session: SessionContext) -> Self {
        Self(session)
    }

    /// Append a notice to the queue.
    pub fn push(&self, notice: Notice) -> Result<(), Error> {
        let mut pending = self.pending()?;
        pending.push(notice);
        self.0
            .raw()
            .insert(NOTICES_KEY, pending)
            .map_err(|error| Error::internal(format!("failed to queue notice: {error}")))
    }

    /// Remove and return all queued notices.
    pub fn take(&self) -> Result<Vec<Notice>, Error> {
        let pending = self.pending()?;
        if !pending.is_empty() {
            self.0.raw().remove(NOTICES_KEY);
        }
        Ok(pending)
    }

    fn pending(&self) -> Result<Vec<Notice>, Error> {
        let stored = self
            .0
            .raw()
            .get::<Vec<Notice>>(NOTICES_KEY)
            .map_err(|error| Error::internal(format!("failed to read notices: {error}")))?;
        Ok(stored.unwrap_or_default())
    }
}

impl FromRequest for FlashBag {
    type Error = actix_web::Error;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, payload: &mut Payload) -> Self::Future {
        let fut = SessionContext::from_request(req, payload);
        Box::pin(async move { fut.await.map(FlashBag::new) })
    }
}
