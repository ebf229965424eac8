//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementations of the domain repository ports backed by
//! PostgreSQL via Diesel with async support through `diesel-async` and
//! `bb8` connection pooling.
//!
//! - **Thin adapters**: repository implementations only translate between
//!   Diesel models and domain types. No business logic resides here.
//! - **Internal models**: Diesel row structs (`models.rs`) and schema
//!   definitions (`schema.rs`) are internal implementation details, never
//!   exposed to the domain layer.
//! - **Strongly typed errors**: all database errors are mapped to domain
//!   persistence error types; the unique email constraint surfaces as the
//!   typed duplicate error.

mod diesel_login_service;
mod diesel_user_repository;
mod models;
mod pool;
mod schema;

pub use diesel_login_service::DieselLoginService;
pub use diesel_user_repository::DieselUserRepository;
pub use pool::{DbPool, PoolConfig, PoolError};
