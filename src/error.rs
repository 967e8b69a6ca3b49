use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::error;

pub type AppResult<T> = std::result::Result<T, AppError>;

/// Closed set of failures a request can end in. Domain variants
/// (`DuplicateEmail`, `InvalidCredentials`) are normally intercepted by the
/// handler and turned into form errors before they ever reach a response.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("not found")]
    NotFound,
    #[error("bad request")]
    BadRequest,
    #[error("email address is already in use")]
    DuplicateEmail,
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("session error")]
    Session {
        #[from]
        source: tower_sessions::session::Error,
    },
    #[error("database error")]
    Database { source: sqlx::Error },
    #[error("password hash error: {0}")]
    Hash(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::BadRequest => StatusCode::BAD_REQUEST,
            AppError::DuplicateEmail => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::InvalidCredentials => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Session { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Database { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Hash(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Full detail stays in the log; the client only ever sees the
        // canned status text.
        match &self {
            AppError::Database { source } => error!(error = %source, "database failure"),
            AppError::Session { source } => error!(error = %source, "session failure"),
            AppError::Hash(msg) => error!(error = %msg, "password hash failure"),
            _ => {}
        }

        let status = self.status_code();
        let body = match status {
            StatusCode::NOT_FOUND => "Not Found",
            StatusCode::BAD_REQUEST => "Bad Request",
            StatusCode::UNPROCESSABLE_ENTITY => "Unprocessable Entity",
            _ => "Internal Server Error",
        };
        (status, body).into_response()
    }
}

impl From<sqlx::Error> for AppError {
    fn from(source: sqlx::Error) -> Self {
        match source {
            sqlx::Error::RowNotFound => AppError::NotFound,
            _ => AppError::Database { source },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_mapping() {
        assert_eq!(AppError::NotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::BadRequest.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::DuplicateEmail.status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            AppError::InvalidCredentials.status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            AppError::Hash("boom".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn row_not_found_maps_to_not_found() {
        let err: AppError = sqlx::Error::RowNotFound.into();
        assert!(matches!(err, AppError::NotFound));
    }

    #[test]
    fn other_sqlx_errors_map_to_database() {
        let err: AppError = sqlx::Error::PoolClosed.into();
        assert!(matches!(err, AppError::Database { .. }));
    }
}
