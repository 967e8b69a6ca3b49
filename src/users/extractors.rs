use axum::{
    async_trait,
    extract::FromRequestParts,
    http::request::Parts,
    response::Redirect,
};
use tower_sessions::Session;

use crate::session;

/// Extracts the authenticated user's id from the session. Unauthenticated
/// visitors are redirected to the login page.
pub struct AuthUser(pub i64);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = Redirect;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let session = Session::from_request_parts(parts, state)
            .await
            .map_err(|_| Redirect::to("/user/login"))?;

        match session::authenticated_user(&session).await {
            Ok(Some(id)) => Ok(AuthUser(id)),
            _ => Err(Redirect::to("/user/login")),
        }
    }
}
