//! Session gate — per-request redirects for `/dashboard` and `/auth` paths.
//!
//! ARCHITECTURE
//! ============
//! The gate is an Axum middleware. For paths in scope it asks the auth
//! client for the current session, which may refresh an expiring token.
//! Any cookies that produces are written twice: into the request's `Cookie`
//! header, so the handler reads the refreshed session instead of the stale
//! one, and onto the response, so the browser stores it. Cookies the handler
//! sets itself take precedence over the gate's.
//!
//! An `EventSource` cannot follow a redirect to an HTML page, so requests that
//! accept `text/event-stream` get the redirect as a single `navigate` event.

use std::collections::{BTreeMap, HashSet};

use axum::extract::{Request, State};
use axum::http::header::{ACCEPT, COOKIE, SET_COOKIE};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use tracing::{debug, error};

use super::dashboard::navigate_response;
use crate::services::session_cookie::is_removal;
use crate::state::AppState;

pub const PROTECTED_PREFIX: &str = "/dashboard";
pub const AUTH_PAGES_PREFIX: &str = "/auth";
pub const SIGNIN_PATH: &str = "/auth/signin";
pub const DASHBOARD_PATH: &str = "/dashboard";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Forward,
    Redirect(&'static str),
}

/// `prefix` itself or any path below it. `/dashboards` is not under `/dashboard`.
fn is_under(path: &str, prefix: &str) -> bool {
    path.strip_prefix(prefix)
        .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
}

/// Whether the gate looks at `path` at all.
#[must_use]
pub fn in_scope(path: &str) -> bool {
    is_under(path, PROTECTED_PREFIX) || is_under(path, AUTH_PAGES_PREFIX)
}

/// Redirect rule, checked in order: protected without a session goes to
/// sign-in, auth pages with a session go to the dashboard.
#[must_use]
pub fn decide(path: &str, has_session: bool) -> GateDecision {
    if is_under(path, PROTECTED_PREFIX) && !has_session {
        return GateDecision::Redirect(SIGNIN_PATH);
    }
    if is_under(path, AUTH_PAGES_PREFIX) && has_session {
        return GateDecision::Redirect(DASHBOARD_PATH);
    }
    GateDecision::Forward
}

pub async fn session_gate(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let path = request.uri().path().to_string();
    if !in_scope(&path) {
        return next.run(request).await;
    }

    let incoming = CookieJar::from_headers(request.headers());
    let mut client = state.auth_client(incoming.clone());
    let session = match client.get_session().await {
        Ok(session) => session,
        Err(e) => {
            error!(error = %e, %path, "session lookup failed");
            return (StatusCode::BAD_GATEWAY, "identity provider unavailable").into_response();
        }
    };
    let cookies = client.into_cookies();

    match decide(&path, session.is_some()) {
        GateDecision::Redirect(target) => {
            debug!(%path, target, "session gate redirect");
            if wants_event_stream(request.headers()) {
                return (cookies, navigate_response(target)).into_response();
            }
            (cookies, Redirect::to(target)).into_response()
        }
        GateDecision::Forward => {
            rewrite_request_cookies(request.headers_mut(), &incoming, &cookies);
            let response = next.run(request).await;
            append_missing_cookies(response, &cookies)
        }
    }
}

fn wants_event_stream(headers: &HeaderMap) -> bool {
    headers
        .get_all(ACCEPT)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .any(|v| v.contains("text/event-stream"))
}

/// Replace the `Cookie` header with `incoming` updated by `outgoing`.
fn rewrite_request_cookies(headers: &mut HeaderMap, incoming: &CookieJar, outgoing: &CookieJar) {
    if outgoing.iter().next().is_none() {
        return;
    }
    let mut merged: BTreeMap<String, String> =
        incoming.iter().map(|c| (c.name().to_string(), c.value().to_string())).collect();
    for cookie in outgoing.iter() {
        if is_removal(cookie) {
            merged.remove(cookie.name());
        } else {
            merged.insert(cookie.name().to_string(), cookie.value().to_string());
        }
    }

    headers.remove(COOKIE);
    let header = merged
        .iter()
        .map(|(name, value)| format!("{name}={value}"))
        .collect::<Vec<_>>()
        .join("; ");
    if header.is_empty() {
        return;
    }
    match HeaderValue::from_str(&header) {
        Ok(value) => {
            headers.insert(COOKIE, value);
        }
        Err(e) => error!(error = %e, "rewritten cookie header is not a valid header value"),
    }
}

/// Add `cookies` to the response unless the handler already set the same name.
fn append_missing_cookies(mut response: Response, cookies: &CookieJar) -> Response {
    let already_set: HashSet<String> = response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|v| Cookie::parse(v).ok())
        .map(|c| c.name().to_string())
        .collect();

    for cookie in cookies.iter().filter(|c| !already_set.contains(c.name())) {
        match HeaderValue::from_str(&cookie.to_string()) {
            Ok(value) => {
                response.headers_mut().append(SET_COOKIE, value);
            }
            Err(e) => error!(error = %e, name = cookie.name(), "cookie is not a valid header value"),
        }
    }
    response
}

#[cfg(test)]
#[path = "guard_test.rs"]
mod tests;
