//! User-administration endpoints.
//!
//! Registered under `/admin` (admin or super admin) and, for the mirrored
//! subset, `/super-admin` (super admin only); the scope gate enforces the
//! tier, handlers enforce the per-target policy. Every guard denial queues
//! a notice and returns immediately; nothing runs past a denial.

use actix_web::{delete, get, post, web, HttpResponse};
use serde::{Deserialize, Serialize};

use crate::domain::ports::UserPersistenceError;
use crate::domain::{
    policy, Denial, DisplayName, EmailAddress, Error, NewUser, Notice, Password, Role, UserId,
};

use super::actor::CurrentUser;
use super::error::{map_user_persistence_error, ApiResult};
use super::flash::FlashBag;
use super::state::HttpState;
use super::validation::clamp_limit;
use super::views::{see_other, RegisterFormView, UserDetailView, UserListView};

pub(crate) const USERS_DETAILS_PATH: &str = "/admin/users-details";
pub(crate) const ADD_USER_PATH: &str = "/admin/add-user";

/// Query parameters for the user listings.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    limit: Option<i64>,
}

async fn render_user_list(
    state: &HttpState,
    flash: &FlashBag,
    query: ListQuery,
) -> ApiResult<UserListView> {
    let users = state
        .users
        .list(clamp_limit(query.limit))
        .await
        .map_err(map_user_persistence_error)?;
    Ok(UserListView {
        users,
        notices: flash.take()?,
    })
}

/// List users, bounded by the `limit` query parameter.
#[utoipa::path(
    get,
    path = "/admin/users",
    params(("limit" = Option<i64>, Query, description = "Page size, clamped to 1..=200")),
    responses(
        (status = 200, description = "Users", body = UserListView),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["admin"],
    operation_id = "listUsers"
)]
#[get("/users")]
pub async fn list_users(
    state: web::Data<HttpState>,
    flash: FlashBag,
    query: web::Query<ListQuery>,
) -> ApiResult<web::Json<UserListView>> {
    Ok(web::Json(
        render_user_list(&state, &flash, query.into_inner()).await?,
    ))
}

/// Detailed user listing; same payload as `/users`.
#[utoipa::path(
    get,
    path = "/admin/users-details",
    params(("limit" = Option<i64>, Query, description = "Page size, clamped to 1..=200")),
    responses(
        (status = 200, description = "Users", body = UserListView),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["admin"],
    operation_id = "listUsersDetails"
)]
#[get("/users-details")]
pub async fn users_details(
    state: web::Data<HttpState>,
    flash: FlashBag,
    query: web::Query<ListQuery>,
) -> ApiResult<web::Json<UserListView>> {
    Ok(web::Json(
        render_user_list(&state, &flash, query.into_inner()).await?,
    ))
}

/// Registration form payload with any queued notices.
#[utoipa::path(
    get,
    path = "/admin/add-user",
    responses(
        (status = 200, description = "Form payload", body = RegisterFormView),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error)
    ),
    tags = ["admin"],
    operation_id = "addUserForm"
)]
#[get("/add-user")]
pub async fn add_user_form(flash: FlashBag) -> ApiResult<web::Json<RegisterFormView>> {
    Ok(web::Json(RegisterFormView {
        email: None,
        notices: flash.take()?,
    }))
}

/// Request body for `POST /admin/register`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub display_name: Option<String>,
    /// Defaults to `user` when absent.
    pub role: Option<String>,
}

struct ValidRegistration {
    email: EmailAddress,
    password: Password,
    display_name: DisplayName,
    role: Role,
}

fn validate_registration(
    actor: &CurrentUser,
    payload: &RegisterRequest,
) -> Result<ValidRegistration, Vec<Notice>> {
    let mut notices = Vec::new();

    let email = match payload.email.as_deref() {
        None | Some("") => {
            notices.push(Notice::error("email must not be empty"));
            None
        }
        Some(raw) => match EmailAddress::new(raw) {
            Ok(email) => Some(email),
            Err(err) => {
                notices.push(Notice::error(err.to_string()));
                None
            }
        },
    };

    let password = match payload.password.as_deref() {
        None | Some("") => {
            notices.push(Notice::error("password must not be empty"));
            None
        }
        Some(raw) => match Password::new_for_registration(raw) {
            Ok(password) => Some(password),
            Err(err) => {
                notices.push(Notice::error(err.to_string()));
                None
            }
        },
    };

    let display_name = match payload.display_name.as_deref() {
        None | Some("") => {
            notices.push(Notice::error("display name must not be empty"));
            None
        }
        Some(raw) => match DisplayName::new(raw) {
            Ok(name) => Some(name),
            Err(err) => {
                notices.push(Notice::error(err.to_string()));
                None
            }
        },
    };

    let role = match payload.role.as_deref() {
        None => Some(Role::User),
        Some(raw) => match Role::parse(raw) {
            Ok(role) => Some(role),
            Err(_) => {
                notices.push(Notice::error("Invalid role."));
                None
            }
        },
    };
    if let Some(role) = role {
        if let Err(denial) = policy::can_assign_role(actor.role(), role) {
            notices.push(Notice::error(denial.message()));
        }
    }

    match (email, password, display_name, role) {
        (Some(email), Some(password), Some(display_name), Some(role)) if notices.is_empty() => {
            Ok(ValidRegistration {
                email,
                password,
                display_name,
                role,
            })
        }
        _ => Err(notices),
    }
}

/// Create a user record.
///
/// Field validation failures re-render the form payload with the submitted
/// email preserved; a duplicate email queues a warning and redirects back to
/// the form. The store's unique constraint is the duplicate check; there is
/// no pre-read.
#[utoipa::path(
    post,
    path = "/admin/register",
    request_body = RegisterRequest,
    responses(
        (status = 303, description = "User created; redirect with a success notice"),
        (status = 400, description = "Validation failure; form payload with error notices", body = RegisterFormView),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["admin"],
    operation_id = "registerUser"
)]
#[post("/register")]
pub async fn register(
    actor: CurrentUser,
    state: web::Data<HttpState>,
    flash: FlashBag,
    payload: web::Json<RegisterRequest>,
) -> ApiResult<HttpResponse> {
    let payload = payload.into_inner();
    let valid = match validate_registration(&actor, &payload) {
        Ok(valid) => valid,
        Err(notices) => {
            return Ok(HttpResponse::BadRequest().json(RegisterFormView {
                email: payload.email,
                notices,
            }));
        }
    };

    let password_hash = valid
        .password
        .hash()
        .map_err(|err| Error::internal(err.to_string()))?;
    let new_user = NewUser::new(valid.email, valid.display_name, valid.role, password_hash);

    match state.users.insert(&new_user).await {
        Ok(()) => {
            flash.push(Notice::success(format!(
                "{} registered successfully.",
                new_user.email()
            )))?;
        }
        Err(UserPersistenceError::DuplicateEmail { .. }) => {
            flash.push(Notice::warning("Email already exists."))?;
        }
        Err(other) => return Err(map_user_persistence_error(other)),
    }
    Ok(see_other(ADD_USER_PATH))
}

async fn render_user_detail(
    state: &HttpState,
    flash: &FlashBag,
    raw_id: String,
) -> ApiResult<HttpResponse> {
    let Ok(id) = UserId::new(&raw_id) else {
        flash.push(Notice::error("Invalid id."))?;
        return Ok(see_other(USERS_DETAILS_PATH));
    };
    let user = state
        .users
        .find_by_id(&id)
        .await
        .map_err(map_user_persistence_error)?
        .ok_or_else(|| Error::not_found("user not found"))?;
    Ok(HttpResponse::Ok().json(UserDetailView {
        user,
        notices: flash.take()?,
    }))
}

/// View a single user.
///
/// A malformed id never reaches the store; it redirects to the listing with
/// an error notice. An unknown id is a 404.
#[utoipa::path(
    get,
    path = "/admin/user/{id}",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "User", body = UserDetailView),
        (status = 303, description = "Malformed id; redirect with an error notice"),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["admin"],
    operation_id = "viewUser"
)]
#[get("/user/{id}")]
pub async fn view_user(
    state: web::Data<HttpState>,
    flash: FlashBag,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    render_user_detail(&state, &flash, path.into_inner()).await
}

/// Edit-form payload for a single user; same contract as the view route.
#[utoipa::path(
    get,
    path = "/admin/user-edit/{id}",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 200, description = "User", body = UserDetailView),
        (status = 303, description = "Malformed id; redirect with an error notice"),
        (status = 404, description = "Not found", body = Error)
    ),
    tags = ["admin"],
    operation_id = "editUser"
)]
#[get("/user-edit/{id}")]
pub async fn edit_user(
    state: web::Data<HttpState>,
    flash: FlashBag,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    render_user_detail(&state, &flash, path.into_inner()).await
}

fn denial_notice(denial: &Denial) -> Notice {
    Notice::error(denial.message())
}

/// Delete a user.
///
/// Guards run in order (well-formed id, target exists, policy admits) and
/// each denial queues its notice and returns at once. The store delete is
/// conditional on the role observed here, so a concurrent promotion cannot
/// slip past the super-admin check.
#[utoipa::path(
    delete,
    path = "/admin/user-delete/{id}",
    params(("id" = String, Path, description = "User id")),
    responses(
        (status = 303, description = "Redirect to the listing with the outcome notice queued"),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["admin"],
    operation_id = "deleteUser"
)]
#[delete("/user-delete/{id}")]
pub async fn delete_user(
    actor: CurrentUser,
    state: web::Data<HttpState>,
    flash: FlashBag,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let raw = path.into_inner();
    let Ok(target_id) = UserId::new(&raw) else {
        flash.push(Notice::error("Invalid id."))?;
        return Ok(see_other(USERS_DETAILS_PATH));
    };

    let Some(target) = state
        .users
        .find_by_id(&target_id)
        .await
        .map_err(map_user_persistence_error)?
    else {
        flash.push(Notice::error("No such user."))?;
        return Ok(see_other(USERS_DETAILS_PATH));
    };

    if let Err(denial) = policy::can_delete_user(actor.role(), actor.id(), &target_id, target.role())
    {
        flash.push(denial_notice(&denial))?;
        return Ok(see_other(USERS_DETAILS_PATH));
    }

    match state.users.delete_where_role(&target_id, target.role()).await {
        Ok(()) => {
            flash.push(Notice::success("User deleted successfully."))?;
        }
        Err(UserPersistenceError::NotFound) => {
            // The record vanished or changed role since the read above.
            flash.push(Notice::error("User record changed; nothing was deleted."))?;
        }
        Err(other) => return Err(map_user_persistence_error(other)),
    }
    Ok(see_other(USERS_DETAILS_PATH))
}

/// Request body for `POST /admin/update-role`.
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRoleRequest {
    pub id: Option<String>,
    pub role: Option<String>,
}

/// Change a user's role.
///
/// Missing fields, a malformed id, and an unrecognised role each queue an
/// error notice and redirect without touching the store. The assignment
/// policy caps the new role at the actor's own tier.
#[utoipa::path(
    post,
    path = "/admin/update-role",
    request_body = UpdateRoleRequest,
    responses(
        (status = 303, description = "Redirect to the listing with the outcome notice queued"),
        (status = 401, description = "Unauthorised", body = Error),
        (status = 403, description = "Forbidden", body = Error),
        (status = 500, description = "Internal server error", body = Error)
    ),
    tags = ["admin"],
    operation_id = "updateRole"
)]
#[post("/update-role")]
pub async fn update_role(
    actor: CurrentUser,
    state: web::Data<HttpState>,
    flash: FlashBag,
    payload: web::Json<UpdateRoleRequest>,
) -> ApiResult<HttpResponse> {
    let UpdateRoleRequest { id, role } = payload.into_inner();
    let (Some(raw_id), Some(raw_role)) = (id, role) else {
        flash.push(Notice::error("Invalid request."))?;
        return Ok(see_other(USERS_DETAILS_PATH));
    };

    let Ok(target_id) = UserId::new(&raw_id) else {
        flash.push(Notice::error("Invalid id."))?;
        return Ok(see_other(USERS_DETAILS_PATH));
    };

    let Ok(new_role) = Role::parse(&raw_role) else {
        flash.push(Notice::error("Invalid role."))?;
        return Ok(see_other(USERS_DETAILS_PATH));
    };

    if let Err(denial) = policy::can_update_role(actor.role(), actor.id(), &target_id, new_role) {
        flash.push(denial_notice(&denial))?;
        return Ok(see_other(USERS_DETAILS_PATH));
    }

    match state.users.update_role(&target_id, new_role).await {
        Ok(updated) => {
            flash.push(Notice::info(format!(
                "Updated role for {} to {}.",
                updated.email(),
                updated.role()
            )))?;
        }
        Err(UserPersistenceError::NotFound) => {
            flash.push(Notice::error("No such user."))?;
        }
        Err(other) => return Err(map_user_persistence_error(other)),
    }
    Ok(see_other(USERS_DETAILS_PATH))
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use actix_web::cookie::Cookie;
    use actix_web::http::{header, StatusCode};
    use actix_web::{test as actix_test, App};
    use rstest::rstest;

    use crate::domain::NoticeLevel;
    use crate::inbound::http::role_gate::RoleGate;
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
                web::scope("/admin")
                    .wrap(RoleGate::admin())
                    .service(list_users)
                    .service(users_details)
                    .service(add_user_form)
                    .service(register)
                    .service(view_user)
                    .service(edit_user)
                    .service(delete_user)
                    .service(update_role),
            )
            .service(
                web::scope("/super-admin")
                    .wrap(RoleGate::super_admin())
                    .service(list_users)
                    .service(delete_user)
                    .service(update_role),
            )
            .route(
                "/session-login",
                web::get().to(crate::inbound::http::test_utils::session_login),
            )
    }

    /// Merge any rewritten session cookie from `res` into the running cookie.
    fn carry_cookie(
        res: &actix_web::dev::ServiceResponse,
        current: Cookie<'static>,
    ) -> Cookie<'static> {
        res.response()
            .cookies()
            .find(|cookie| cookie.name() == "session")
            .map(|cookie| cookie.into_owned())
            .unwrap_or(current)
    }

    async fn drained_notices<S>(app: &S, cookie: Cookie<'static>) -> Vec<Notice>
    where
        S: actix_web::dev::Service<
            actix_http::Request,
            Response = actix_web::dev::ServiceResponse,
            Error = actix_web::Error,
        >,
    {
        let res = actix_test::call_service(
            app,
            actix_test::TestRequest::get()
                .uri("/admin/users-details")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let view: UserListView =
            serde_json::from_slice(&actix_test::read_body(res).await).expect("list payload");
        view.notices
    }

    fn register_body(email: &str, role: Option<&str>) -> RegisterRequest {
        RegisterRequest {
            email: Some(email.into()),
            password: Some("correct horse battery".into()),
            display_name: Some("New Person".into()),
            role: role.map(Into::into),
        }
    }

    #[actix_web::test]
    async fn listing_is_bounded_and_ordered_by_email() {
        let (state, users) = seeded_state();
        let admin = users.seed_user("admin@example.com", Role::Admin);
        users.seed_user("zara@example.com", Role::User);
        users.seed_user("bea@example.com", Role::User);
        let app = actix_test::init_service(test_app(state)).await;
        let cookie = login_cookie(&app, admin.id()).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/admin/users?limit=2")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::OK);
        let view: UserListView =
            serde_json::from_slice(&actix_test::read_body(res).await).expect("list payload");
        let emails: Vec<&str> = view.users.iter().map(|u| u.email().as_ref()).collect();
        assert_eq!(emails, ["admin@example.com", "bea@example.com"]);
    }

    #[actix_web::test]
    async fn registration_creates_a_user_and_queues_success() {
        let (state, users) = seeded_state();
        let admin = users.seed_user("admin@example.com", Role::Admin);
        let app = actix_test::init_service(test_app(state)).await;
        let cookie = login_cookie(&app, admin.id()).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/admin/register")
                .cookie(cookie.clone())
                .set_json(register_body("a@x.com", Some("user")))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            res.headers()
                .get(header::LOCATION)
                .and_then(|v| v.to_str().ok()),
            Some(ADD_USER_PATH)
        );
        let cookie = carry_cookie(&res, cookie);

        let form_res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/admin/add-user")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        let form: RegisterFormView =
            serde_json::from_slice(&actix_test::read_body(form_res).await).expect("form payload");
        assert_eq!(form.notices.len(), 1);
        assert_eq!(form.notices[0].level(), NoticeLevel::Success);
        assert!(form.notices[0].message().contains("a@x.com"));

        assert!(users
            .snapshot()
            .iter()
            .any(|user| user.email().as_ref() == "a@x.com" && user.role() == Role::User));
    }

    #[actix_web::test]
    async fn duplicate_registration_never_creates_a_second_record() {
        let (state, users) = seeded_state();
        let admin = users.seed_user("admin@example.com", Role::Admin);
        users.seed_user("a@x.com", Role::User);
        let app = actix_test::init_service(test_app(state)).await;
        let cookie = login_cookie(&app, admin.id()).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/admin/register")
                .cookie(cookie.clone())
                .set_json(register_body("a@x.com", None))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        let cookie = carry_cookie(&res, cookie);

        let duplicates = users
            .snapshot()
            .iter()
            .filter(|user| user.email().as_ref() == "a@x.com")
            .count();
        assert_eq!(duplicates, 1, "duplicate email must not create a record");

        let form_res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri("/admin/add-user")
                .cookie(cookie)
                .to_request(),
        )
        .await;
        let form: RegisterFormView =
            serde_json::from_slice(&actix_test::read_body(form_res).await).expect("form payload");
        assert_eq!(form.notices.len(), 1);
        assert_eq!(form.notices[0].level(), NoticeLevel::Warning);
    }

    #[actix_web::test]
    async fn invalid_registration_rerenders_with_the_submitted_email() {
        let (state, users) = seeded_state();
        let admin = users.seed_user("admin@example.com", Role::Admin);
        let app = actix_test::init_service(test_app(state)).await;
        let cookie = login_cookie(&app, admin.id()).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/admin/register")
                .cookie(cookie)
                .set_json(&RegisterRequest {
                    email: Some("someone@example.com".into()),
                    password: Some("short".into()),
                    display_name: None,
                    role: None,
                })
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let form: RegisterFormView =
            serde_json::from_slice(&actix_test::read_body(res).await).expect("form payload");
        assert_eq!(form.email.as_deref(), Some("someone@example.com"));
        assert_eq!(form.notices.len(), 2);
        assert!(!users
            .snapshot()
            .iter()
            .any(|user| user.email().as_ref() == "someone@example.com"));
    }

    #[actix_web::test]
    async fn admin_cannot_register_a_super_admin() {
        let (state, users) = seeded_state();
        let admin = users.seed_user("admin@example.com", Role::Admin);
        let app = actix_test::init_service(test_app(state)).await;
        let cookie = login_cookie(&app, admin.id()).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/admin/register")
                .cookie(cookie)
                .set_json(register_body("boss@example.com", Some("super_admin")))
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert!(!users
            .snapshot()
            .iter()
            .any(|user| user.email().as_ref() == "boss@example.com"));
    }

    #[rstest]
    #[case("/admin/user/not-a-uuid")]
    #[case("/admin/user-edit/not-a-uuid")]
    #[actix_web::test]
    async fn malformed_id_redirects_with_an_error_notice(#[case] path: &str) {
        let (state, users) = seeded_state();
        let admin = users.seed_user("admin@example.com", Role::Admin);
        let app = actix_test::init_service(test_app(state)).await;
        let cookie = login_cookie(&app, admin.id()).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri(path)
                .cookie(cookie.clone())
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        let cookie = carry_cookie(&res, cookie);

        let notices = drained_notices(&app, cookie).await;
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].message(), "Invalid id.");
    }

    #[actix_web::test]
    async fn unknown_id_is_not_found() {
        let (state, users) = seeded_state();
        let admin = users.seed_user("admin@example.com", Role::Admin);
        let app = actix_test::init_service(test_app(state)).await;
        let cookie = login_cookie(&app, admin.id()).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::get()
                .uri(&format!("/admin/user/{}", UserId::random()))
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }

    #[actix_web::test]
    async fn self_deletion_is_denied_and_the_record_survives() {
        let (state, users) = seeded_state();
        let admin = users.seed_user("admin@example.com", Role::Admin);
        let app = actix_test::init_service(test_app(state)).await;
        let cookie = login_cookie(&app, admin.id()).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::delete()
                .uri(&format!("/admin/user-delete/{}", admin.id()))
                .cookie(cookie.clone())
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        let cookie = carry_cookie(&res, cookie);

        assert!(users.snapshot().iter().any(|user| user.id() == admin.id()));
        let notices = drained_notices(&app, cookie).await;
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].message(), Denial::SelfDeletion.message());
    }

    /// Regression test for the fall-through bug: a denial must leave the
    /// record intact and queue exactly the denial notice, never a denial
    /// notice and a deletion together.
    #[actix_web::test]
    async fn denied_delete_is_all_or_nothing() {
        let (state, users) = seeded_state();
        let admin = users.seed_user("admin@example.com", Role::Admin);
        let boss = users.seed_user("boss@example.com", Role::SuperAdmin);
        let app = actix_test::init_service(test_app(state)).await;
        let cookie = login_cookie(&app, admin.id()).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::delete()
                .uri(&format!("/admin/user-delete/{}", boss.id()))
                .cookie(cookie.clone())
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        let cookie = carry_cookie(&res, cookie);

        assert!(
            users.snapshot().iter().any(|user| user.id() == boss.id()),
            "denied delete must not remove the record"
        );
        let notices = drained_notices(&app, cookie).await;
        assert_eq!(notices.len(), 1, "exactly one notice after a denial");
        assert_eq!(notices[0].level(), NoticeLevel::Error);
        assert_eq!(notices[0].message(), Denial::TargetOutranksActor.message());
    }

    #[actix_web::test]
    async fn super_admin_can_delete_a_super_admin() {
        let (state, users) = seeded_state();
        let boss = users.seed_user("boss@example.com", Role::SuperAdmin);
        let other = users.seed_user("other@example.com", Role::SuperAdmin);
        let app = actix_test::init_service(test_app(state)).await;
        let cookie = login_cookie(&app, boss.id()).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::delete()
                .uri(&format!("/super-admin/user-delete/{}", other.id()))
                .cookie(cookie)
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert!(!users.snapshot().iter().any(|user| user.id() == other.id()));
    }

    #[actix_web::test]
    async fn invalid_role_string_leaves_the_record_unchanged() {
        let (state, users) = seeded_state();
        let admin = users.seed_user("admin@example.com", Role::Admin);
        let target = users.seed_user("target@example.com", Role::User);
        let app = actix_test::init_service(test_app(state)).await;
        let cookie = login_cookie(&app, admin.id()).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/admin/update-role")
                .cookie(cookie.clone())
                .set_json(&UpdateRoleRequest {
                    id: Some(target.id().to_string()),
                    role: Some("emperor".into()),
                })
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        let cookie = carry_cookie(&res, cookie);

        let unchanged = users
            .snapshot()
            .into_iter()
            .find(|user| user.id() == target.id())
            .expect("target still present");
        assert_eq!(unchanged.role(), Role::User);
        let notices = drained_notices(&app, cookie).await;
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].message(), "Invalid role.");
    }

    #[actix_web::test]
    async fn missing_fields_queue_invalid_request() {
        let (state, users) = seeded_state();
        let admin = users.seed_user("admin@example.com", Role::Admin);
        let app = actix_test::init_service(test_app(state)).await;
        let cookie = login_cookie(&app, admin.id()).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/admin/update-role")
                .cookie(cookie.clone())
                .set_json(&UpdateRoleRequest {
                    id: None,
                    role: Some("admin".into()),
                })
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        let cookie = carry_cookie(&res, cookie);
        let notices = drained_notices(&app, cookie).await;
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].message(), "Invalid request.");
    }

    #[actix_web::test]
    async fn admin_cannot_promote_to_super_admin() {
        let (state, users) = seeded_state();
        let admin = users.seed_user("admin@example.com", Role::Admin);
        let target = users.seed_user("target@example.com", Role::User);
        let app = actix_test::init_service(test_app(state)).await;
        let cookie = login_cookie(&app, admin.id()).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/admin/update-role")
                .cookie(cookie.clone())
                .set_json(&UpdateRoleRequest {
                    id: Some(target.id().to_string()),
                    role: Some("super_admin".into()),
                })
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        let cookie = carry_cookie(&res, cookie);

        let unchanged = users
            .snapshot()
            .into_iter()
            .find(|user| user.id() == target.id())
            .expect("target still present");
        assert_eq!(unchanged.role(), Role::User);
        let notices = drained_notices(&app, cookie).await;
        assert_eq!(notices[0].message(), Denial::AssignmentAboveActor.message());
    }

    #[actix_web::test]
    async fn role_update_reports_the_new_role_in_the_notice() {
        let (state, users) = seeded_state();
        let boss = users.seed_user("boss@example.com", Role::SuperAdmin);
        let target = users.seed_user("target@example.com", Role::User);
        let app = actix_test::init_service(test_app(state)).await;
        let cookie = login_cookie(&app, boss.id()).await;

        let res = actix_test::call_service(
            &app,
            actix_test::TestRequest::post()
                .uri("/admin/update-role")
                .cookie(cookie.clone())
                .set_json(&UpdateRoleRequest {
                    id: Some(target.id().to_string()),
                    role: Some("ADMIN".into()),
                })
                .to_request(),
        )
        .await;
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        let cookie = carry_cookie(&res, cookie);

        let updated = users
            .snapshot()
            .into_iter()
            .find(|user| user.id() == target.id())
            .expect("target still present");
        assert_eq!(updated.role(), Role::Admin);
        let notices = drained_notices(&app, cookie).await;
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].level(), NoticeLevel::Info);
        assert!(notices[0].message().contains("target@example.com"));
        assert!(notices[0].message().contains("admin"));
    }
}
