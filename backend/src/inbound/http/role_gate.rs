//! Scope-level role gate for the admin route groups.
//!
//! Wraps a `web::scope` and admits only requests whose session subject
//! resolves to a user at or above the required tier. Denials short-circuit
//! before any handler runs: 401 for missing/stale sessions, 403 for
//! insufficient privilege. The resolved actor is cached in request
//! extensions so handlers don't repeat the store lookup.

use std::rc::Rc;
use std::task::{Context, Poll};

use actix_session::SessionExt;
use actix_web::body::{EitherBody, MessageBody};
use actix_web::dev::{Service, ServiceRequest, ServiceResponse, Transform};
use actix_web::{web, Error as ActixError, HttpMessage, ResponseError};
use futures_util::future::{ready, LocalBoxFuture, Ready};

use crate::domain::{policy, Error, Role};

use super::actor::{resolve_actor, CurrentUser};
use super::session::SessionContext;
use super::state::HttpState;

/// Middleware factory admitting actors at or above a minimum role.
#[derive(Clone, Copy)]
pub struct RoleGate {
    minimum: Role,
}

impl RoleGate {
    /// Gate for the `/admin` scope: admin or super admin.
    pub const fn admin() -> Self {
        Self {
            minimum: Role::Admin,
        }
    }

    /// Gate for the `/super-admin` scope: super admin only.
    pub const fn super_admin() -> Self {
        Self {
            minimum: Role::SuperAdmin,
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for RoleGate
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = ActixError> + 'static,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = ActixError;
    type InitError = ();
    type Transform = RoleGateMiddleware<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(RoleGateMiddleware {
            service: Rc::new(service),
            minimum: self.minimum,
        }))
    }
}

/// Service wrapper produced by [`RoleGate`].
pub struct RoleGateMiddleware<S> {
    service: Rc<S>,
    minimum: Role,
}

async fn admit(req: &ServiceRequest, minimum: Role) -> Result<CurrentUser, Error> {
    let state = req
        .app_data::<web::Data<HttpState>>()
        .cloned()
        .ok_or_else(|| Error::internal("HttpState missing from app data"))?;
    let session = SessionContext::new(req.get_session());
    let actor = resolve_actor(&session, state.users.as_ref()).await?;
    policy::can_access(actor.role(), minimum)
        .map_err(|denial| Error::forbidden(denial.message()))?;
    Ok(actor)
}

impl<S, B> Service<ServiceRequest> for RoleGateMiddleware<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = ActixError> + 'static,
    S::Future: 'static,
    B: MessageBody + 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = ActixError;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.service.poll_ready(cx)
    }

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let minimum = self.minimum;
        Box::pin(async move {
            match admit(&req, minimum).await {
                Ok(actor) => {
                    req.extensions_mut().insert(actor);
                    let res = service.call(req).await?;
                    Ok(res.map_into_left_body())
                }
                Err(error) => {
                    tracing::debug!(code = ?error.code(), "role gate denied request");
                    let response = error.error_response();
                    Ok(req.into_response(response).map_into_right_body())
                }
            }
        })
    }
}
