//! Server construction and middleware wiring.

mod config;

pub use config::ServerConfig;

use actix_session::{storage::CookieSessionStore, SessionMiddleware};
use actix_web::dev::Server;
use actix_web::{web, App, HttpServer};
#[cfg(debug_assertions)]
use utoipa::OpenApi;
#[cfg(debug_assertions)]
use utoipa_swagger_ui::SwaggerUi;

#[cfg(debug_assertions)]
use crate::doc::ApiDoc;
use crate::inbound::http::admin::{
    add_user_form, delete_user, edit_user, list_users, register, update_role, users_details,
    view_user,
};
use crate::inbound::http::auth::{login, logout};
use crate::inbound::http::health::{live, ready, HealthState};
use crate::inbound::http::profile::{profile, update_user_info};
use crate::inbound::http::role_gate::RoleGate;
use crate::middleware::Trace;

/// Build and start the HTTP server.
///
/// The session middleware wraps every scope; the role gates wrap only the
/// admin scopes. The readiness probe flips to 200 once the server is bound.
pub fn run(config: ServerConfig) -> std::io::Result<Server> {
    let ServerConfig {
        key,
        cookie_secure,
        same_site,
        bind_addr,
        state,
    } = config;

    let health_state = web::Data::new(HealthState::new());
    // Clone for the server factory so the readiness probe stays accessible.
    let server_health_state = health_state.clone();
    let state_data = web::Data::new(state);

    let server = HttpServer::new(move || {
        let session = SessionMiddleware::builder(CookieSessionStore::default(), key.clone())
            .cookie_name("session".into())
            .cookie_path("/".into())
            .cookie_secure(cookie_secure)
            .cookie_http_only(true)
            .cookie_same_site(same_site)
            .build();

        let mut app = App::new()
            .app_data(server_health_state.clone())
            .app_data(state_data.clone())
            .wrap(session)
            .wrap(Trace)
            .service(web::scope("/auth").service(login).service(logout))
            .service(
                web::scope("/user")
                    .service(profile)
                    .service(update_user_info),
            )
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
            .service(ready)
            .service(live);

        #[cfg(debug_assertions)]
        {
            app = app
                .service(SwaggerUi::new("/docs/{_:.*}").url("/api-docs/openapi.json", ApiDoc::openapi()));
        }

        app
    })
    .bind(bind_addr)?;

    health_state.mark_ready();
    Ok(server.run())
}
