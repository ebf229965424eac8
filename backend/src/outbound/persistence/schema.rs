//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match the database migrations exactly. They are
//! used by Diesel for compile-time query validation and type-safe SQL
//! generation. When migrations change the schema, regenerate with
//! `diesel print-schema` or update by hand.

diesel::table! {
    /// User accounts table.
    ///
    /// The `email` column carries a unique index; duplicate inserts fail at
    /// the constraint, not at an application-level pre-check.
    users (id) {
        /// Primary key: UUID v4 identifier.
        id -> Uuid,
        /// Unique login email, stored lowercased.
        email -> Varchar,
        /// Human-readable display name.
        display_name -> Varchar,
        /// Privilege tier label: `user`, `admin`, or `super_admin`.
        role -> Varchar,
        /// Argon2 PHC-format credential hash.
        password_hash -> Text,
        /// Record creation timestamp.
        created_at -> Timestamptz,
        /// Last modification timestamp.
        updated_at -> Timestamptz,
    }
}
