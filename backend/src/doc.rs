//! OpenAPI documentation configuration.
//!
//! Defines the [`ApiDoc`] struct generating the OpenAPI specification for
//! the HTTP surface: auth, self-service, admin, and health endpoints. The
//! generated document backs Swagger UI in debug builds.

use utoipa::openapi::security::{ApiKey, ApiKeyValue, SecurityScheme};
use utoipa::{Modify, OpenApi};

/// Enrich the generated document with the session cookie security scheme.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi
            .components
            .get_or_insert_with(utoipa::openapi::Components::default);

        components.add_security_scheme(
            "SessionCookie",
            SecurityScheme::ApiKey(ApiKey::Cookie(ApiKeyValue::with_description(
                "session",
                "Session cookie issued by POST /auth/login.",
            ))),
        );
    }
}

/// OpenAPI document for the HTTP API.
#[derive(OpenApi)]
#[openapi(
    modifiers(&SecurityAddon),
    info(
        title = "User administration API",
        description = "Session-authenticated, role-gated user management."
    ),
    servers(
        (url = "/", description = "Relative to the deployment base URL")
    ),
    security(("SessionCookie" = [])),
    paths(
        crate::inbound::http::auth::login,
        crate::inbound::http::auth::logout,
        crate::inbound::http::profile::profile,
        crate::inbound::http::profile::update_user_info,
        crate::inbound::http::admin::list_users,
        crate::inbound::http::admin::users_details,
        crate::inbound::http::admin::add_user_form,
        crate::inbound::http::admin::register,
        crate::inbound::http::admin::view_user,
        crate::inbound::http::admin::edit_user,
        crate::inbound::http::admin::delete_user,
        crate::inbound::http::admin::update_role,
        crate::inbound::http::health::ready,
        crate::inbound::http::health::live,
    ),
    components(schemas(
        crate::domain::Error,
        crate::domain::ErrorCode,
        crate::domain::Notice,
        crate::domain::NoticeLevel,
        crate::domain::Role,
        crate::domain::User,
        crate::inbound::http::auth::LoginRequest,
        crate::inbound::http::profile::UpdateUserInfoRequest,
        crate::inbound::http::admin::RegisterRequest,
        crate::inbound::http::admin::UpdateRoleRequest,
        crate::inbound::http::views::ProfileView,
        crate::inbound::http::views::UserListView,
        crate::inbound::http::views::UserDetailView,
        crate::inbound::http::views::RegisterFormView,
    ))
)]
pub struct ApiDoc;
