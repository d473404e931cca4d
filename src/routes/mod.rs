//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! One Axum router serves the server-rendered pages, the dashboard event
//! stream, and static assets. The session gate wraps every route and only
//! acts on `/dashboard` and `/auth` paths; everything else passes straight
//! through.

pub mod auth;
pub mod dashboard;
pub mod guard;
pub mod pages;

use std::path::PathBuf;

use axum::Router;
use axum::http::StatusCode;
use axum::middleware;
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{get, post};
use tower_http::compression::CompressionLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::views::ViewError;

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(pages::home))
        .route("/theme", post(pages::set_theme))
        .route("/auth/signin", get(auth::signin_page).post(auth::signin_submit))
        .route("/auth/signup", get(auth::signup_page).post(auth::signup_submit))
        .route("/auth/callback", get(auth::callback))
        .route("/auth/auth-error", get(auth::auth_error))
        .route("/dashboard", get(dashboard::page))
        .route("/dashboard/events", get(dashboard::events))
        .route("/dashboard/signout", post(dashboard::sign_out))
        .route("/healthz", get(healthz))
        .layer(middleware::from_fn_with_state(state.clone(), guard::session_gate))
        .nest_service("/static", ServeDir::new(static_dir()))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Resolve the static asset directory.
fn static_dir() -> PathBuf {
    std::env::var("STATIC_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("static"))
}

/// Turn a rendered page into a response; render failures become a 500.
pub(crate) fn html(rendered: Result<String, ViewError>) -> Response {
    match rendered {
        Ok(body) => Html(body).into_response(),
        Err(e) => {
            tracing::error!(error = %e, "page render failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "page render failed").into_response()
        }
    }
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
