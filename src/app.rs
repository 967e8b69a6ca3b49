use std::net::SocketAddr;

use axum::response::{IntoResponse, Response};
use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;
use tower_sessions::{Session, SessionManagerLayer};
use tower_sessions_sqlx_store::PostgresStore;

use crate::error::AppResult;
use crate::session;
use crate::state::AppState;
use crate::views;
use crate::{snippets, users};

pub fn build_app(state: AppState, session_layer: SessionManagerLayer<PostgresStore>) -> Router {
    Router::new()
        .merge(snippets::router())
        .merge(users::router())
        .route("/about", get(about))
        .route("/ping", get(ping))
        .with_state(state)
        .layer(session_layer)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!("http_request", %method, uri = %uri)
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     _latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        if status.is_server_error() {
                            tracing::error!(%status, "response");
                        } else {
                            tracing::info!(%status, "response");
                        }
                    },
                ),
        )
}

/// Liveness check: no auth, no session, fixed body.
async fn ping() -> &'static str {
    "OK"
}

async fn about(session: Session) -> AppResult<Response> {
    let ctx = session::page_context(&session).await?;
    Ok(views::about_page(&ctx).into_response())
}

pub async fn serve(app: Router) -> anyhow::Result<()> {
    let addr: SocketAddr = format!(
        "{}:{}",
        std::env::var("APP_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
        std::env::var("APP_PORT").unwrap_or_else(|_| "4000".into())
    )
    .parse()?;

    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
