//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.
//!
//! Uniqueness lives in the database: inserts and email changes surface
//! `UniqueViolation` as the typed duplicate error rather than pre-checking,
//! and deletion is conditional on the role the caller observed, so the
//! store itself closes the check-then-act races.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel_async::RunQueryDsl;
use tracing::debug;

use crate::domain::ports::{StoredCredentials, UserPersistenceError, UserRepository};
use crate::domain::{
    DisplayName, EmailAddress, NewUser, PasswordHash, Role, User, UserId,
};

use super::models::{NewUserRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Diesel-backed implementation of the `UserRepository` port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserPersistenceError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            UserPersistenceError::connection(message)
        }
    }
}

/// Map Diesel errors to domain persistence errors.
///
/// `unique_email` supplies the conflicting address when the operation can
/// hit the email constraint; operations that cannot conflict pass `None`.
fn map_diesel_error(error: DieselError, unique_email: Option<&EmailAddress>) -> UserPersistenceError {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::NotFound => UserPersistenceError::NotFound,
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => match unique_email {
            Some(email) => UserPersistenceError::duplicate_email(email.to_string()),
            None => UserPersistenceError::query("unexpected unique violation"),
        },
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            UserPersistenceError::connection("database connection error")
        }
        DieselError::QueryBuilderError(_) => UserPersistenceError::query("database query error"),
        _ => UserPersistenceError::query("database error"),
    }
}

/// Rebuild a domain user from a row through the validated constructors.
///
/// This re-validates the whole record on every read and update, so a row
/// that drifted outside the schema constraints surfaces as a query error
/// instead of flowing through the application.
fn row_to_user(row: UserRow) -> Result<User, UserPersistenceError> {
    let email = EmailAddress::new(&row.email).map_err(|err| {
        UserPersistenceError::query(format!("stored email failed validation: {err}"))
    })?;
    let display_name = DisplayName::new(row.display_name).map_err(|err| {
        UserPersistenceError::query(format!("stored display name failed validation: {err}"))
    })?;
    let role = Role::parse(&row.role).map_err(|err| {
        UserPersistenceError::query(format!("stored role failed validation: {err}"))
    })?;
    Ok(User::new(
        UserId::from_uuid(row.id),
        email,
        display_name,
        role,
    ))
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn insert(&self, user: &NewUser) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row = NewUserRow {
            id: *user.id().as_uuid(),
            email: user.email().as_ref(),
            display_name: user.display_name().as_ref(),
            role: user.role().as_str(),
            password_hash: user.password_hash().as_str(),
        };

        diesel::insert_into(users::table)
            .values(&row)
            .execute(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, Some(user.email())))?;
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<UserRow> = users::table
            .filter(users::id.eq(id.as_uuid()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, None))?;

        row.map(row_to_user).transpose()
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<UserRow> = users::table
            .filter(users::email.eq(email.as_ref()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, None))?;

        row.map(row_to_user).transpose()
    }

    async fn credentials_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<StoredCredentials>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<UserRow> = users::table
            .filter(users::email.eq(email.as_ref()))
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, None))?;

        Ok(row.map(|row| StoredCredentials {
            user_id: UserId::from_uuid(row.id),
            password_hash: PasswordHash::from_stored(row.password_hash),
        }))
    }

    async fn list(&self, limit: i64) -> Result<Vec<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<UserRow> = users::table
            .order(users::email.asc())
            .limit(limit)
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, None))?;

        rows.into_iter().map(row_to_user).collect()
    }

    async fn update_email(
        &self,
        id: &UserId,
        email: &EmailAddress,
    ) -> Result<User, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: UserRow = diesel::update(users::table.filter(users::id.eq(id.as_uuid())))
            .set((
                users::email.eq(email.as_ref()),
                users::updated_at.eq(diesel::dsl::now),
            ))
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, Some(email)))?;

        row_to_user(row)
    }

    async fn update_role(&self, id: &UserId, role: Role) -> Result<User, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: UserRow = diesel::update(users::table.filter(users::id.eq(id.as_uuid())))
            .set((
                users::role.eq(role.as_str()),
                users::updated_at.eq(diesel::dsl::now),
            ))
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, None))?;

        row_to_user(row)
    }

    async fn delete_where_role(
        &self,
        id: &UserId,
        role: Role,
    ) -> Result<(), UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let affected = diesel::delete(
            users::table
                .filter(users::id.eq(id.as_uuid()))
                .filter(users::role.eq(role.as_str())),
        )
        .execute(&mut conn)
        .await
        .map_err(|err| map_diesel_error(err, None))?;

        if affected == 0 {
            return Err(UserPersistenceError::NotFound);
        }
        Ok(())
    }
}
