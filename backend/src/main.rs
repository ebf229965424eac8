//! Backend entry-point: wires persistence, sessions, and the HTTP surface.

use std::env;
use std::net::SocketAddr;
use std::sync::Arc;

use actix_web::cookie::{Key, SameSite};
use diesel::{Connection, PgConnection};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use tracing::warn;
use tracing_subscriber::{fmt, EnvFilter};

use backend::inbound::http::state::HttpState;
use backend::outbound::persistence::{
    DbPool, DieselLoginService, DieselUserRepository, PoolConfig,
};
use backend::server::{self, ServerConfig};

const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

fn session_key() -> std::io::Result<Key> {
    let key_path =
        env::var("SESSION_KEY_FILE").unwrap_or_else(|_| "/var/run/secrets/session_key".into());
    match std::fs::read(&key_path) {
        Ok(bytes) => Ok(Key::derive_from(&bytes)),
        Err(e) => {
            let allow_dev = env::var("SESSION_ALLOW_EPHEMERAL").ok().as_deref() == Some("1");
            if cfg!(debug_assertions) || allow_dev {
                warn!(path = %key_path, error = %e, "using temporary session key (dev only)");
                Ok(Key::generate())
            } else {
                Err(std::io::Error::other(format!(
                    "failed to read session key at {key_path}: {e}"
                )))
            }
        }
    }
}

fn run_migrations(database_url: &str) -> std::io::Result<()> {
    let mut conn = PgConnection::establish(database_url)
        .map_err(|e| std::io::Error::other(format!("failed to connect for migrations: {e}")))?;
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|e| std::io::Error::other(format!("failed to run migrations: {e}")))?;
    Ok(())
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let database_url = env::var("DATABASE_URL")
        .map_err(|_| std::io::Error::other("DATABASE_URL must be set"))?;
    run_migrations(&database_url)?;

    let pool = DbPool::new(PoolConfig::new(&database_url))
        .await
        .map_err(|e| std::io::Error::other(e.to_string()))?;
    let repository = DieselUserRepository::new(pool);
    let state = HttpState::new(
        Arc::new(DieselLoginService::new(repository.clone())),
        Arc::new(repository),
    );

    let cookie_secure = env::var("SESSION_COOKIE_SECURE")
        .map(|v| v != "0")
        .unwrap_or(true);
    let bind_addr: SocketAddr = env::var("BIND_ADDR")
        .unwrap_or_else(|_| "0.0.0.0:8080".into())
        .parse()
        .map_err(|e| std::io::Error::other(format!("invalid BIND_ADDR: {e}")))?;

    let config = ServerConfig::new(session_key()?, cookie_secure, SameSite::Lax, bind_addr, state);
    server::run(config)?.await
}
