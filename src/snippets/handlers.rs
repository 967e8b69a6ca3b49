use axum::extract::rejection::FormRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Form;
use tower_sessions::Session;
use tracing::{info, instrument};

use crate::error::{AppError, AppResult};
use crate::session;
use crate::snippets::forms::SnippetForm;
use crate::snippets::repo;
use crate::state::AppState;
use crate::users;
use crate::users::extractors::AuthUser;
use crate::validation::{max_chars, not_blank, permitted_value};
use crate::views;

/// Path ids must be numeric and positive; anything else reads as a missing
/// snippet, not a malformed request.
fn parse_id(raw: &str) -> Option<i64> {
    raw.parse::<i64>().ok().filter(|id| *id >= 1)
}

#[instrument(skip(state, session))]
pub async fn home(State(state): State<AppState>, session: Session) -> AppResult<Response> {
    let snippets = repo::latest(&state.db).await?;
    let ctx = session::page_context(&session).await?;
    Ok(views::home_page(&ctx, &snippets).into_response())
}

#[instrument(skip(state, session))]
pub async fn snippet_view(
    State(state): State<AppState>,
    session: Session,
    Path(id): Path<String>,
) -> AppResult<Response> {
    let id = parse_id(&id).ok_or(AppError::NotFound)?;
    let snippet = repo::get(&state.db, id).await?;
    let ctx = session::page_context(&session).await?;
    Ok(views::snippet_page(&ctx, &snippet).into_response())
}

#[instrument(skip(session))]
pub async fn snippet_create(AuthUser(_): AuthUser, session: Session) -> AppResult<Response> {
    let ctx = session::page_context(&session).await?;
    let form = SnippetForm::default();
    Ok(views::snippet_form_page(&ctx, &form).into_response())
}

#[instrument(skip(state, session, form))]
pub async fn snippet_create_post(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    session: Session,
    form: Result<Form<SnippetForm>, FormRejection>,
) -> AppResult<Response> {
    let Form(mut form) = form.map_err(|_| AppError::BadRequest)?;
    session::verify_csrf(&session, &form.csrf_token).await?;

    form.validator
        .check_field(not_blank(&form.title), "title", "This field cannot be blank");
    form.validator.check_field(
        max_chars(&form.title, 100),
        "title",
        "This field cannot be more than 100 characters long",
    );
    form.validator.check_field(
        not_blank(&form.content),
        "content",
        "This field cannot be blank",
    );
    form.validator.check_field(
        permitted_value(&form.expires, &[1, 7, 365]),
        "expires",
        "This field must equal 1, 7 or 365",
    );

    if !form.validator.is_valid() {
        let ctx = session::page_context(&session).await?;
        return Ok((
            StatusCode::UNPROCESSABLE_ENTITY,
            views::snippet_form_page(&ctx, &form),
        )
            .into_response());
    }

    // The snippet carries the author's display name, not a user id.
    let author = users::repo::get(&state.db, user_id).await?;
    let id = repo::insert(
        &state.db,
        &form.title,
        &form.content,
        form.expires,
        &author.name,
    )
    .await?;
    info!(snippet_id = id, "snippet created");

    session::put_flash(&session, "Snippet successfully created!").await?;
    Ok(Redirect::to(&format!("/snippet/view/{id}")).into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_id_rejects_non_numeric_and_non_positive() {
        assert_eq!(parse_id("abc"), None);
        assert_eq!(parse_id("0"), None);
        assert_eq!(parse_id("-3"), None);
        assert_eq!(parse_id(""), None);
        assert_eq!(parse_id("1.5"), None);
    }

    #[test]
    fn parse_id_accepts_positive_integers() {
        assert_eq!(parse_id("1"), Some(1));
        assert_eq!(parse_id("42"), Some(42));
    }

    #[test]
    fn create_form_validation_rules() {
        let mut form = SnippetForm {
            title: "a".repeat(101),
            content: "  ".into(),
            expires: 30,
            ..SnippetForm::default()
        };

        form.validator
            .check_field(not_blank(&form.title), "title", "This field cannot be blank");
        form.validator.check_field(
            max_chars(&form.title, 100),
            "title",
            "This field cannot be more than 100 characters long",
        );
        form.validator.check_field(
            not_blank(&form.content),
            "content",
            "This field cannot be blank",
        );
        form.validator.check_field(
            permitted_value(&form.expires, &[1, 7, 365]),
            "expires",
            "This field must equal 1, 7 or 365",
        );

        assert!(!form.validator.is_valid());
        assert_eq!(
            form.validator.field_error("title"),
            Some("This field cannot be more than 100 characters long")
        );
        assert_eq!(
            form.validator.field_error("content"),
            Some("This field cannot be blank")
        );
        assert_eq!(
            form.validator.field_error("expires"),
            Some("This field must equal 1, 7 or 365")
        );
    }
}
