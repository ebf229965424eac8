//! Ports connecting the domain to inbound and outbound adapters.

mod login_service;
mod user_repository;

pub use login_service::LoginService;
pub use user_repository::{StoredCredentials, UserPersistenceError, UserRepository};
