use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;

use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, FromRow)]
pub struct Snippet {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub created: OffsetDateTime,
    pub expires: OffsetDateTime,
    pub author_name: String,
}

/// Insert a snippet expiring `expires_days` from now and return its id.
/// The caller's validator restricts `expires_days` to {1, 7, 365}.
pub async fn insert(
    db: &PgPool,
    title: &str,
    content: &str,
    expires_days: i32,
    author_name: &str,
) -> AppResult<i64> {
    let id = sqlx::query_scalar::<_, i64>(
        r#"
        INSERT INTO snippets (title, content, created, expires, author_name)
        VALUES ($1, $2, NOW(), NOW() + INTERVAL '1 day' * $3, $4)
        RETURNING id
        "#,
    )
    .bind(title)
    .bind(content)
    .bind(expires_days)
    .bind(author_name)
    .fetch_one(db)
    .await?;
    Ok(id)
}

/// Fetch one unexpired snippet. An expired row and an absent row both come
/// back as `NotFound`.
pub async fn get(db: &PgPool, id: i64) -> AppResult<Snippet> {
    let snippet = sqlx::query_as::<_, Snippet>(
        r#"
        SELECT id, title, content, created, expires, author_name
        FROM snippets
        WHERE expires > NOW() AND id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(db)
    .await?;
    snippet.ok_or(AppError::NotFound)
}

/// Up to ten most recent unexpired snippets, newest id first.
pub async fn latest(db: &PgPool) -> AppResult<Vec<Snippet>> {
    let snippets = sqlx::query_as::<_, Snippet>(
        r#"
        SELECT id, title, content, created, expires, author_name
        FROM snippets
        WHERE expires > NOW()
        ORDER BY id DESC
        LIMIT 10
        "#,
    )
    .fetch_all(db)
    .await?;
    Ok(snippets)
}
