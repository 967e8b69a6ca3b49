//! Helpers over the cookie-token session store: flash messages, the
//! authenticated user id, and the per-session anti-forgery token.
//!
//! Session ids are cycled (new token, same data) on every privilege change
//! to defeat fixation.

use tower_sessions::Session;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::views::PageContext;

pub const AUTH_USER_ID_KEY: &str = "authenticatedUserID";
pub const FLASH_KEY: &str = "flash";
pub const CSRF_TOKEN_KEY: &str = "csrfToken";

pub async fn put_flash(session: &Session, message: &str) -> AppResult<()> {
    session.insert(FLASH_KEY, message.to_string()).await?;
    Ok(())
}

/// One-shot read: returns the flash message and clears it.
pub async fn take_flash(session: &Session) -> AppResult<Option<String>> {
    Ok(session.remove::<String>(FLASH_KEY).await?)
}

/// The session's anti-forgery token, minted on first use.
pub async fn csrf_token(session: &Session) -> AppResult<String> {
    if let Some(token) = session.get::<String>(CSRF_TOKEN_KEY).await? {
        return Ok(token);
    }
    let token = Uuid::new_v4().simple().to_string();
    session.insert(CSRF_TOKEN_KEY, token.clone()).await?;
    Ok(token)
}

/// Reject a form submission whose token does not match the session's.
pub async fn verify_csrf(session: &Session, supplied: &str) -> AppResult<()> {
    match session.get::<String>(CSRF_TOKEN_KEY).await? {
        Some(token) if !supplied.is_empty() && token == supplied => Ok(()),
        _ => Err(AppError::BadRequest),
    }
}

pub async fn authenticated_user(session: &Session) -> AppResult<Option<i64>> {
    Ok(session.get::<i64>(AUTH_USER_ID_KEY).await?)
}

/// Mark the session authenticated, cycling the token first.
pub async fn log_in(session: &Session, user_id: i64) -> AppResult<()> {
    session.cycle_id().await?;
    session.insert(AUTH_USER_ID_KEY, user_id).await?;
    Ok(())
}

/// Drop authentication. Cycles the token first, and succeeds even when no
/// user was logged in.
pub async fn log_out(session: &Session) -> AppResult<()> {
    session.cycle_id().await?;
    session.remove::<i64>(AUTH_USER_ID_KEY).await?;
    Ok(())
}

/// Session-derived state every rendered page needs.
pub async fn page_context(session: &Session) -> AppResult<PageContext> {
    Ok(PageContext {
        flash: take_flash(session).await?,
        is_authenticated: authenticated_user(session).await?.is_some(),
        csrf_token: csrf_token(session).await?,
    })
}
