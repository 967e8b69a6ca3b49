pub mod extractors;
pub mod forms;
pub mod handlers;
pub mod password;
pub mod repo;

use axum::routing::{get, post};
use axum::Router;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/user/signup",
            get(handlers::user_signup).post(handlers::user_signup_post),
        )
        .route(
            "/user/login",
            get(handlers::user_login).post(handlers::user_login_post),
        )
        .route("/user/logout", post(handlers::user_logout_post))
        .route("/account/view", get(handlers::view_account))
        .route(
            "/account/password/update",
            get(handlers::update_password).post(handlers::update_password_post),
        )
}
