//! Public pages and the theme toggle endpoint.

use axum::Form;
use axum::extract::State;
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::html;
use crate::state::AppState;
use crate::views::theme::{Layout, ThemeContext, theme_cookie};

const FEATURES: [&str; 3] = ["Explore", "Create", "Share"];

#[derive(Serialize)]
struct HomePage {
    layout: Layout,
    features: [&'static str; 3],
}

/// `GET /`
pub async fn home(State(state): State<AppState>, theme: ThemeContext) -> Response {
    html(state.views.render("home.html", HomePage { layout: theme.layout(), features: FEATURES }))
}

#[derive(Deserialize)]
pub struct ThemeInput {
    next: Option<String>,
}

/// Same-site path to return to. Anything that could leave the site, or that
/// cannot be sent as a `Location` header, becomes `/`.
#[must_use]
pub fn local_redirect_target(next: Option<&str>) -> &str {
    match next {
        Some(path)
            if path.starts_with('/')
                && !path.starts_with("//")
                && !path.contains('\\')
                && path.bytes().all(|b| b.is_ascii_graphic()) =>
        {
            path
        }
        _ => "/",
    }
}

/// `POST /theme` — flip between light and dark, then go back.
pub async fn set_theme(State(state): State<AppState>, theme: ThemeContext, Form(input): Form<ThemeInput>) -> Response {
    let preference = theme.preference.toggled();
    let target = local_redirect_target(input.next.as_deref());
    debug!(theme = preference.as_str(), target, "theme toggled");
    let jar = CookieJar::new().add(theme_cookie(preference, state.config.cookie_secure));
    (jar, Redirect::to(target)).into_response()
}

#[cfg(test)]
#[path = "pages_test.rs"]
mod tests;
