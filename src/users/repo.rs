use serde::Serialize;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;

use crate::error::{AppError, AppResult};
use crate::users::password::{hash_password, verify_password};

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub hashed_password: String,
    pub created: OffsetDateTime,
}

/// Create a new user, hashing the password first. A unique violation on the
/// email column surfaces as `DuplicateEmail`.
pub async fn insert(db: &PgPool, name: &str, email: &str, password: &str) -> AppResult<i64> {
    let hash = hash_password(password)?;
    let result = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO users (name, email, hashed_password, created)
        VALUES ($1, $2, $3, now())
        RETURNING id
        "#,
    )
    .bind(name)
    .bind(email)
    .bind(&hash)
    .fetch_one(db)
    .await;

    match result {
        Ok(id) => Ok(id),
        Err(sqlx::Error::Database(e)) if e.is_unique_violation() => Err(AppError::DuplicateEmail),
        Err(e) => Err(e.into()),
    }
}

/// Verify email/password and return the user id. Unknown email and wrong
/// password are indistinguishable to the caller.
pub async fn authenticate(db: &PgPool, email: &str, password: &str) -> AppResult<i64> {
    let row = sqlx::query_as::<_, (i64, String)>(
        r#"
        SELECT id, hashed_password
        FROM users
        WHERE email = $1
        "#,
    )
    .bind(email)
    .fetch_optional(db)
    .await?;

    let (id, hash) = row.ok_or(AppError::InvalidCredentials)?;
    if verify_password(password, &hash)? {
        Ok(id)
    } else {
        Err(AppError::InvalidCredentials)
    }
}

pub async fn get(db: &PgPool, id: i64) -> AppResult<User> {
    let user = sqlx::query_as::<_, User>(
        r#"
        SELECT id, name, email, hashed_password, created
        FROM users
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await?;
    user.ok_or(AppError::NotFound)
}

/// Check the current password before allowing a change.
pub async fn compare_password(db: &PgPool, id: i64, current: &str) -> AppResult<()> {
    let hash = sqlx::query_scalar::<_, String>(
        r#"
        SELECT hashed_password
        FROM users
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await?;

    let hash = hash.ok_or(AppError::InvalidCredentials)?;
    if verify_password(current, &hash)? {
        Ok(())
    } else {
        Err(AppError::InvalidCredentials)
    }
}

pub async fn update_password(db: &PgPool, id: i64, new_password: &str) -> AppResult<()> {
    let hash = hash_password(new_password)?;
    sqlx::query(
        r#"
        UPDATE users
        SET hashed_password = $1
        WHERE id = $2
        "#,
    )
    .bind(&hash)
    .bind(id)
    .execute(db)
    .await?;
    Ok(())
}
