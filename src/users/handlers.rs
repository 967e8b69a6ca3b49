use axum::extract::rejection::FormRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Form;
use tower_sessions::Session;
use tracing::{info, instrument, warn};

use crate::error::{AppError, AppResult};
use crate::session;
use crate::state::AppState;
use crate::users::extractors::AuthUser;
use crate::users::forms::{ChangePasswordForm, LoginForm, LogoutForm, SignupForm};
use crate::users::repo;
use crate::validation::{matches, min_chars, not_blank, EMAIL_RE};
use crate::views;

#[instrument(skip(session))]
pub async fn user_signup(session: Session) -> AppResult<Response> {
    let ctx = session::page_context(&session).await?;
    Ok(views::signup_page(&ctx, &SignupForm::default()).into_response())
}

#[instrument(skip(state, session, form))]
pub async fn user_signup_post(
    State(state): State<AppState>,
    session: Session,
    form: Result<Form<SignupForm>, FormRejection>,
) -> AppResult<Response> {
    let Form(mut form) = form.map_err(|_| AppError::BadRequest)?;
    session::verify_csrf(&session, &form.csrf_token).await?;

    form.validator
        .check_field(not_blank(&form.name), "name", "This field cannot be blank");
    form.validator
        .check_field(not_blank(&form.email), "email", "This field cannot be blank");
    form.validator.check_field(
        matches(&form.email, &EMAIL_RE),
        "email",
        "This field must be a valid email address",
    );
    form.validator.check_field(
        not_blank(&form.password),
        "password",
        "This field cannot be blank",
    );
    form.validator.check_field(
        min_chars(&form.password, 8),
        "password",
        "This field must be at least 8 characters long",
    );

    if !form.validator.is_valid() {
        let ctx = session::page_context(&session).await?;
        return Ok((
            StatusCode::UNPROCESSABLE_ENTITY,
            views::signup_page(&ctx, &form),
        )
            .into_response());
    }

    let id = match repo::insert(&state.db, &form.name, &form.email, &form.password).await {
        Ok(id) => id,
        Err(AppError::DuplicateEmail) => {
            warn!(email = %form.email, "signup with duplicate email");
            form.validator
                .add_field_error("email", "Email address is already in use");
            let ctx = session::page_context(&session).await?;
            return Ok((
                StatusCode::UNPROCESSABLE_ENTITY,
                views::signup_page(&ctx, &form),
            )
                .into_response());
        }
        Err(e) => return Err(e),
    };
    info!(user_id = id, "user signed up");

    // New accounts are logged in straight away.
    session::put_flash(&session, "Account created successfully.").await?;
    session::log_in(&session, id).await?;

    Ok(Redirect::to("/snippet/create").into_response())
}

#[instrument(skip(session))]
pub async fn user_login(session: Session) -> AppResult<Response> {
    let ctx = session::page_context(&session).await?;
    Ok(views::login_page(&ctx, &LoginForm::default()).into_response())
}

#[instrument(skip(state, session, form))]
pub async fn user_login_post(
    State(state): State<AppState>,
    session: Session,
    form: Result<Form<LoginForm>, FormRejection>,
) -> AppResult<Response> {
    let Form(mut form) = form.map_err(|_| AppError::BadRequest)?;
    session::verify_csrf(&session, &form.csrf_token).await?;

    form.validator
        .check_field(not_blank(&form.email), "email", "This field cannot be blank");
    form.validator.check_field(
        matches(&form.email, &EMAIL_RE),
        "email",
        "This field must be a valid email address",
    );
    form.validator.check_field(
        not_blank(&form.password),
        "password",
        "This field cannot be blank",
    );

    if !form.validator.is_valid() {
        let ctx = session::page_context(&session).await?;
        return Ok((
            StatusCode::UNPROCESSABLE_ENTITY,
            views::login_page(&ctx, &form),
        )
            .into_response());
    }

    let id = match repo::authenticate(&state.db, &form.email, &form.password).await {
        Ok(id) => id,
        Err(AppError::InvalidCredentials) => {
            warn!(email = %form.email, "login with invalid credentials");
            form.validator
                .add_non_field_error("Email or password is incorrect");
            let ctx = session::page_context(&session).await?;
            return Ok((
                StatusCode::UNPROCESSABLE_ENTITY,
                views::login_page(&ctx, &form),
            )
                .into_response());
        }
        Err(e) => return Err(e),
    };
    info!(user_id = id, "user logged in");

    session::log_in(&session, id).await?;
    Ok(Redirect::to("/snippet/create").into_response())
}

/// Logout works for any visitor: the token renewal must happen even when
/// no user was authenticated.
#[instrument(skip(session, form))]
pub async fn user_logout_post(
    session: Session,
    form: Result<Form<LogoutForm>, FormRejection>,
) -> AppResult<Response> {
    let Form(form) = form.map_err(|_| AppError::BadRequest)?;
    session::verify_csrf(&session, &form.csrf_token).await?;

    session::log_out(&session).await?;
    session::put_flash(&session, "You've been logged out successfully!").await?;
    Ok(Redirect::to("/").into_response())
}

#[instrument(skip(state, session))]
pub async fn view_account(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    session: Session,
) -> AppResult<Response> {
    let user = repo::get(&state.db, user_id).await?;
    let ctx = session::page_context(&session).await?;
    Ok(views::account_page(&ctx, &user).into_response())
}

#[instrument(skip(session))]
pub async fn update_password(AuthUser(_): AuthUser, session: Session) -> AppResult<Response> {
    let ctx = session::page_context(&session).await?;
    Ok(views::password_page(&ctx, &ChangePasswordForm::default()).into_response())
}

#[instrument(skip(state, session, form))]
pub async fn update_password_post(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    session: Session,
    form: Result<Form<ChangePasswordForm>, FormRejection>,
) -> AppResult<Response> {
    let Form(mut form) = form.map_err(|_| AppError::BadRequest)?;
    session::verify_csrf(&session, &form.csrf_token).await?;

    form.validator.check_field(
        not_blank(&form.current_password),
        "currentPassword",
        "This field cannot be blank",
    );
    form.validator.check_field(
        not_blank(&form.new_password),
        "newPassword",
        "This field cannot be blank",
    );
    form.validator.check_field(
        min_chars(&form.new_password, 8),
        "newPassword",
        "This field must be at least 8 characters long",
    );
    form.validator.check_field(
        not_blank(&form.new_password_confirmation),
        "newPasswordConfirmation",
        "This field cannot be blank",
    );
    form.validator.check_field(
        form.new_password == form.new_password_confirmation,
        "newPasswordConfirmation",
        "This field must match the new password",
    );

    if !form.validator.is_valid() {
        let ctx = session::page_context(&session).await?;
        return Ok((
            StatusCode::UNPROCESSABLE_ENTITY,
            views::password_page(&ctx, &form),
        )
            .into_response());
    }

    match repo::compare_password(&state.db, user_id, &form.current_password).await {
        Ok(()) => {}
        Err(AppError::InvalidCredentials) => {
            warn!(user_id, "password change with wrong current password");
            form.validator
                .add_field_error("currentPassword", "Incorrect password");
            let ctx = session::page_context(&session).await?;
            return Ok((
                StatusCode::UNPROCESSABLE_ENTITY,
                views::password_page(&ctx, &form),
            )
                .into_response());
        }
        Err(e) => return Err(e),
    }

    repo::update_password(&state.db, user_id, &form.new_password).await?;
    info!(user_id, "password updated");

    session::put_flash(&session, "Password updated successfully!").await?;
    Ok(Redirect::to("/account/view").into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validate_password_change(form: &mut ChangePasswordForm) {
        form.validator.check_field(
            not_blank(&form.current_password),
            "currentPassword",
            "This field cannot be blank",
        );
        form.validator.check_field(
            not_blank(&form.new_password),
            "newPassword",
            "This field cannot be blank",
        );
        form.validator.check_field(
            min_chars(&form.new_password, 8),
            "newPassword",
            "This field must be at least 8 characters long",
        );
        form.validator.check_field(
            not_blank(&form.new_password_confirmation),
            "newPasswordConfirmation",
            "This field cannot be blank",
        );
        form.validator.check_field(
            form.new_password == form.new_password_confirmation,
            "newPasswordConfirmation",
            "This field must match the new password",
        );
    }

    #[test]
    fn mismatched_confirmation_is_a_field_error() {
        let mut form = ChangePasswordForm {
            current_password: "old-password".into(),
            new_password: "new-password-1".into(),
            new_password_confirmation: "new-password-2".into(),
            ..ChangePasswordForm::default()
        };
        validate_password_change(&mut form);
        assert!(!form.validator.is_valid());
        assert_eq!(
            form.validator.field_error("newPasswordConfirmation"),
            Some("This field must match the new password")
        );
        assert_eq!(form.validator.field_error("newPassword"), None);
    }

    #[test]
    fn short_new_password_is_rejected() {
        let mut form = ChangePasswordForm {
            current_password: "old-password".into(),
            new_password: "short".into(),
            new_password_confirmation: "short".into(),
            ..ChangePasswordForm::default()
        };
        validate_password_change(&mut form);
        assert_eq!(
            form.validator.field_error("newPassword"),
            Some("This field must be at least 8 characters long")
        );
    }

    #[test]
    fn matching_fields_pass_validation() {
        let mut form = ChangePasswordForm {
            current_password: "old-password".into(),
            new_password: "new-password-1".into(),
            new_password_confirmation: "new-password-1".into(),
            ..ChangePasswordForm::default()
        };
        validate_password_change(&mut form);
        assert!(form.validator.is_valid());
    }

    #[test]
    fn signup_validation_requires_valid_email_and_long_password() {
        let mut form = SignupForm {
            name: "Alice".into(),
            email: "not-an-email".into(),
            password: "1234567".into(),
            ..SignupForm::default()
        };
        form.validator
            .check_field(not_blank(&form.name), "name", "This field cannot be blank");
        form.validator
            .check_field(not_blank(&form.email), "email", "This field cannot be blank");
        form.validator.check_field(
            matches(&form.email, &EMAIL_RE),
            "email",
            "This field must be a valid email address",
        );
        form.validator.check_field(
            min_chars(&form.password, 8),
            "password",
            "This field must be at least 8 characters long",
        );

        assert_eq!(
            form.validator.field_error("email"),
            Some("This field must be a valid email address")
        );
        assert_eq!(
            form.validator.field_error("password"),
            Some("This field must be at least 8 characters long")
        );
        assert_eq!(form.validator.field_error("name"), None);
    }
}
