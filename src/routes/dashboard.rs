//! Dashboard routes — page shell, live profile stream, and sign-out.
//!
//! The page itself is a shell with a busy indicator. `GET /dashboard/events`
//! mounts a [`DashboardView`] and streams it as server-sent events:
//!
//! - `profile`: the rendered profile fragment, sent once after mount and
//!   again after every auth event for this browser
//! - `navigate`: a path the browser should go to; the stream ends after it
//!
//! Closing the connection drops the stream and with it the view.

use std::convert::Infallible;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::CookieJar;
use futures::Stream;
use tracing::{error, warn};

use super::html;
use crate::config::SignOutPolicy;
use crate::state::AppState;
use crate::views::dashboard::{DashboardView, MountOutcome, render_shell};
use crate::views::theme::ThemeContext;
use crate::views::{ViewError, Views};

pub const HOME_PATH: &str = "/";

/// `GET /dashboard`
pub async fn page(State(state): State<AppState>, theme: ThemeContext) -> Response {
    html(render_shell(&state.views, &theme.layout(), None))
}

/// `GET /dashboard/events`
pub async fn events(State(state): State<AppState>, jar: CookieJar) -> Response {
    let mut client = state.auth_client(jar);
    let outcome = DashboardView::mount(&mut client).await;
    let stream = dashboard_stream(state.views.clone(), outcome);
    (client.into_cookies(), Sse::new(stream).keep_alive(KeepAlive::default())).into_response()
}

/// An event stream that only tells the browser to go to `to`.
pub fn navigate_response(to: &'static str) -> Response {
    let event = Event::default().event("navigate").data(to);
    Sse::new(futures::stream::once(async move { Ok::<_, Infallible>(event) })).into_response()
}

enum StreamState {
    Mounted(MountOutcome),
    Live(DashboardView),
    Done,
}

fn profile_event(views: &Views, view: &DashboardView) -> Result<Event, ViewError> {
    let fragment = view.render_profile(views)?;
    Ok(Event::default().event("profile").data(fragment.replace('\r', "")))
}

fn dashboard_stream(views: Arc<Views>, outcome: MountOutcome) -> impl Stream<Item = Result<Event, ViewError>> {
    futures::stream::unfold(StreamState::Mounted(outcome), move |stream_state| {
        let views = views.clone();
        async move {
            match stream_state {
                StreamState::Mounted(MountOutcome::Navigate(to)) => {
                    Some((Ok(Event::default().event("navigate").data(to)), StreamState::Done))
                }
                StreamState::Mounted(MountOutcome::Ready(view)) => {
                    let event = profile_event(&views, &view);
                    Some((event, StreamState::Live(view)))
                }
                StreamState::Live(mut view) => {
                    let auth_event = view.next_event().await?;
                    view.apply(&auth_event);
                    let event = profile_event(&views, &view);
                    Some((event, StreamState::Live(view)))
                }
                StreamState::Done => None,
            }
        }
    })
}

/// `POST /dashboard/signout`
pub async fn sign_out(State(state): State<AppState>, theme: ThemeContext, jar: CookieJar) -> Response {
    let mut client = state.auth_client(jar);
    let Err(e) = client.sign_out().await else {
        return (client.into_cookies(), Redirect::to(HOME_PATH)).into_response();
    };

    match state.config.sign_out_policy {
        SignOutPolicy::Redirect => {
            warn!(error = %e, "provider sign-out failed; clearing local session");
            client.clear_local_session();
            (client.into_cookies(), Redirect::to(HOME_PATH)).into_response()
        }
        SignOutPolicy::Strict => {
            error!(error = %e, "provider sign-out failed");
            let message = e.to_string();
            let page = html(render_shell(&state.views, &theme.layout(), Some(&message)));
            (StatusCode::BAD_GATEWAY, client.into_cookies(), page).into_response()
        }
    }
}

#[cfg(test)]
#[path = "dashboard_test.rs"]
mod tests;
