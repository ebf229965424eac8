//! Self-service endpoints under `/user`.
//!
//! ```text
//! GET /user/profile
//! POST /user/update-user-info {"email":"new@example.com"}
//! ```

use actix_web::{get, post, web, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::domain::ports::UserPersistenceError;
use crate::domain::{EmailAddress, Error, Notice};

use super::actor::CurrentUser;
use super::auth::PROFILE_PATH;
use super::error::{map_user_persistence_error, ApiResult};
use super::flash::FlashBag;
use super::state::HttpState;
use super::views::{see_other, ProfileView};

/// Request body for `POST /user/update-user-info`.
///
/// The target record is always the session subject; any client-supplied
/// identifier is ignored.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserInfoRequest {
    pub email: Option<String>,
}

/// Render the acting user's profile.
#[utoipa::path(
    get,
    path = "/user/profile",
    responses(
        (status = 200, description = "Profile", body = ProfileView),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["user"],
    operation_id = "profile"
)]
#[get("/profile")]
pub async fn profile(actor: CurrentUser, flash: FlashBag) -> ApiResult<web::Json<ProfileView>> {
    Ok(web::Json(ProfileView {
        user: actor.user().clone(),
        notices: flash.take()?,
    }))
}

/// Update the acting user's email.
///
/// The record identifier derives from the authenticated session, so one
/// account can never mutate another through this route.
#[utoipa::path(
    post,
    path = "/user/update-user-info",
    request_body = UpdateUserInfoRequest,
    responses(
        (status = 303, description = "Redirect to the profile with the outcome notice queued"),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["user"],
    operation_id = "updateUserInfo"
)]
#[post("/update-user-info")]
pub async fn update_user_info(
    actor: CurrentUser,
    state: web::Data<HttpState>,
    flash: FlashBag,
    payload: web::Json<UpdateUserInfoRequest>,
) -> ApiResult<HttpResponse> {
    let Some(raw_email) = payload.into_inner().email else {
        flash.push(Notice::error("Invalid request."))?;
        return Ok(see_other(PROFILE_PATH));
    };
    let email = match EmailAddress::new(&raw_email) {
        Ok(email) => email,
        Err(err) => {
            flash.push(Notice::error(err.to_string()))?;
            return Ok(see_other(PROFILE_PATH));
        }
    };

    match state.users.update_email(actor.id(), &email).await {
        Ok(updated) => {
            flash.push(Notice::info(format!("Updated user {}.", updated.email())))?;
        }
        Err(UserPersistenceError::DuplicateEmail { .. }) => {
            flash.push(Notice::warning("Email already exists."))?;
        }
        Err(other) => return Err(map_user_persistence_error(other)),
    }
    Ok(see_other(PROFILE_PATH))
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use actix_web::http::StatusCode;
    use actix_web::{test as actix_test, App};

    use crate::domain::Role;
    use crate::inbound::http::test_utils::{login_cookie, seeded_state, test_session_middleware};

    use super::*;

    fn test_app(
        state: HttpState,
    ) -> App<
        impl actix_web::dev::ServiceFactory<
            actix_web::dev::ServiceRequest,
            Config = (),
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
            InitError = (),
        >,
    > {
        App::new()
            .app_data(web::Data::new(state))
            .wrap(test_session_middleware())
            .service(
                web::scope("/user")
                    .service(profile)
                    .service(update_user_info),
            )
            .route(
                "/session-login",
                web::get().to(crate::inbound::http::test_utils::session_login),
            )
    }

    #[actix_web::test]
    async fn profile_requires_a_session() {
        let (state, _) = seeded_state();
        let app = actix_test::init_service(test_app(state)).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get().uri("/user/profile").to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_web::test]
    async fn profile_renders_the_acting_user() {
        let (state, users) = seeded_state();
        let me = users.seed_user("me@example.com", Role::User);
        let app = actix_test::init_service(test_app(state)).await;
        let cookie = login_cookie(&app, me.id()).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/user/profile")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let view: ProfileView =
            serde_json::from_slice(&actix_test::read_body(res).await).expect("profile payload");
        assert_eq!(view.user.email().as_ref(), "me@example.com");
        assert!(view.notices.is_empty());
    }

    #[actix_web::test]
    async fn update_ignores_client_identifiers_and_targets_the_session_user() {
        let (state, users) = seeded_state();
        let me = users.seed_user("me@example.com", Role::User);
        let other = users.seed_user("other@example.com", Role::User);
        let app = actix_test::init_service(test_app(state.clone())).await;
        let cookie = login_cookie(&app, me.id()).await;

        // A forged id field is simply ignored by the deserialiser.
        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/user/update-user-info")
                .cookie(cookie)
                .set_json(serde_json::json!({
                    "id": other.id().to_string(),
                    "email": "renamed@example.com",
                }))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::SEE_OTHER);

        let snapshot = users.snapshot();
        let me_now = snapshot
            .iter()
            .find(|user| user.id() == me.id())
            .expect("acting user still present");
        let other_now = snapshot
            .iter()
            .find(|user| user.id() == other.id())
            .expect("other user still present");
        assert_eq!(me_now.email().as_ref(), "renamed@example.com");
        assert_eq!(other_now.email().as_ref(), "other@example.com");
    }

    #[actix_web::test]
    async fn duplicate_email_queues_a_warning_and_leaves_the_record() {
        let (state, users) = seeded_state();
        let me = users.seed_user("me@example.com", Role::User);
        users.seed_user("taken@example.com", Role::User);
        let app = actix_test::init_service(test_app(state)).await;
        let cookie = login_cookie(&app, me.id()).await;

        let update = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/user/update-user-info")
                .cookie(cookie.clone())
                .set_json(&UpdateUserInfoRequest {
                    email: Some("taken@example.com".into()),
                })
                .to_request(),
        )
        .await;
        assert_eq!(update.status(), StatusCode::SEE_OTHER);
        let cookie = update
            .response()
            .cookies()
            .find(|c| c.name() == "session")
            .map(|c| c.into_owned())
            .unwrap_or(cookie);

        let profile_res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/user/profile")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        let view: ProfileView = serde_json::from_slice(&actix_test::read_body(profile_res).await)
            .expect("profile payload");
        assert_eq!(view.user.email().as_ref(), "me@example.com");
        assert_eq!(view.notices.len(), 1);
        assert_eq!(view.notices[0].message(), "Email already exists.");
    }

    #[actix_web::test]
    async fn missing_email_field_queues_invalid_request() {
        let (state, users) = seeded_state();
        let me = users.seed_user("me@example.com", Role::User);
        let app = actix_test::init_service(test_app(state)).await;
        let cookie = login_cookie(&app, me.id()).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/user/update-user-info")
                .cookie(cookie)
                .set_json(serde_json::json!({}))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
    }
}
