//! Auth routes — sign-in, sign-up, and the email link callback.

use axum::Form;
use axum::extract::{Query, State};
use axum::response::{IntoResponse, Redirect, Response};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::guard::DASHBOARD_PATH;
use super::html;
use crate::services::auth_client::SignUpOptions;
use crate::state::AppState;
use crate::views::signin::SignInForm;
use crate::views::signup::SignUpForm;
use crate::views::theme::{Layout, ThemeContext};
use crate::views::FormOutcome;

pub const AUTH_ERROR_PATH: &str = "/auth/auth-error";

// =============================================================================
// SIGN-IN
// =============================================================================

#[derive(Deserialize)]
pub struct SignInInput {
    email: String,
    password: String,
}

/// `GET /auth/signin`
pub async fn signin_page(State(state): State<AppState>, theme: ThemeContext) -> Response {
    html(SignInForm::new().render(&state.views, &theme.layout()))
}

/// `POST /auth/signin` — 303 to the dashboard on success, the form with the
/// provider's message otherwise.
pub async fn signin_submit(
    State(state): State<AppState>,
    theme: ThemeContext,
    jar: CookieJar,
    Form(input): Form<SignInInput>,
) -> Response {
    let mut client = state.auth_client(jar);
    let mut form = SignInForm::new();
    match form.submit(&mut client, &input.email, &input.password).await {
        FormOutcome::Navigate(to) => (client.into_cookies(), Redirect::to(to)).into_response(),
        FormOutcome::Stay => {
            let page = html(form.render(&state.views, &theme.layout()));
            (client.into_cookies(), page).into_response()
        }
    }
}

// =============================================================================
// SIGN-UP
// =============================================================================

#[derive(Deserialize)]
pub struct SignUpInput {
    email: String,
    password: String,
    confirm_password: String,
}

/// `GET /auth/signup`
pub async fn signup_page(State(state): State<AppState>, theme: ThemeContext) -> Response {
    html(SignUpForm::new().render(&state.views, &theme.layout()))
}

/// `POST /auth/signup` — always re-renders the form with its outcome.
pub async fn signup_submit(
    State(state): State<AppState>,
    theme: ThemeContext,
    jar: CookieJar,
    Form(input): Form<SignUpInput>,
) -> Response {
    let options = SignUpOptions { email_redirect_to: Some(state.config.email_redirect_to.clone()) };
    let mut client = state.auth_client(jar);
    let mut form = SignUpForm::new();
    form.submit(&mut client, &input.email, &input.password, &input.confirm_password, &options)
        .await;
    let page = html(form.render(&state.views, &theme.layout()));
    (client.into_cookies(), page).into_response()
}

// =============================================================================
// CALLBACK
// =============================================================================

#[derive(Deserialize)]
pub struct CallbackQuery {
    code: Option<String>,
}

/// `GET /auth/callback?code=...` — exchange the one-time code, then go to the
/// dashboard, or to the error page if anything is missing or rejected.
pub async fn callback(State(state): State<AppState>, jar: CookieJar, Query(params): Query<CallbackQuery>) -> Response {
    let mut client = state.auth_client(jar);
    let target = match params.code.as_deref().filter(|code| !code.is_empty()) {
        Some(code) => match client.exchange_code_for_session(code).await {
            Ok(_) => DASHBOARD_PATH,
            Err(e) => {
                warn!(error = %e, "auth code exchange failed");
                AUTH_ERROR_PATH
            }
        },
        None => AUTH_ERROR_PATH,
    };
    (client.into_cookies(), Redirect::to(target)).into_response()
}

#[derive(Serialize)]
struct AuthErrorPage {
    layout: Layout,
}

/// `GET /auth/auth-error`
pub async fn auth_error(State(state): State<AppState>, theme: ThemeContext) -> Response {
    html(state.views.render("auth_error.html", AuthErrorPage { layout: theme.layout() }))
}

#[cfg(test)]
#[path = "auth_test.rs"]
mod tests;
