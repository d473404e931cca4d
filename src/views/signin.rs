//! Sign-in form.

use serde::Serialize;
use tracing::warn;

use super::theme::Layout;
use super::{FormOutcome, FormStatus, ViewError, Views};
use crate::services::auth_client::AuthClient;

pub const DASHBOARD_PATH: &str = "/dashboard";

#[derive(Debug, Clone, Default)]
pub struct SignInForm {
    pub email: String,
    status: FormStatus,
}

#[derive(Serialize)]
struct SignInPage<'a> {
    layout: &'a Layout,
    email: &'a str,
    error: Option<&'a str>,
    busy: bool,
    button_label: &'static str,
    busy_label: &'static str,
}

impl SignInForm {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    #[must_use]
    pub fn status(&self) -> &FormStatus {
        &self.status
    }

    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.status == FormStatus::Submitting
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        match &self.status {
            FormStatus::Failed(message) => Some(message),
            _ => None,
        }
    }

    #[must_use]
    pub fn button_label(&self) -> &'static str {
        if self.is_busy() { "Signing in..." } else { "Sign In" }
    }

    /// Enter the submitting state. Refused while already submitting.
    pub fn begin_submit(&mut self, email: &str) -> bool {
        if self.is_busy() {
            return false;
        }
        self.email = email.to_string();
        self.status = FormStatus::Submitting;
        true
    }

    /// Settle a submission with the provider's answer.
    pub fn finish<T, E: std::fmt::Display>(&mut self, result: Result<T, E>) -> FormOutcome {
        match result {
            Ok(_) => {
                self.status = FormStatus::Succeeded;
                FormOutcome::Navigate(DASHBOARD_PATH)
            }
            Err(e) => {
                self.status = FormStatus::Failed(e.to_string());
                FormOutcome::Stay
            }
        }
    }

    /// Sign in through `client`. Success navigates to the dashboard; failure
    /// keeps the form with the provider's message.
    pub async fn submit(&mut self, client: &mut AuthClient, email: &str, password: &str) -> FormOutcome {
        if !self.begin_submit(email) {
            return FormOutcome::Stay;
        }
        let result = client.sign_in_with_password(email, password).await;
        if let Err(e) = &result {
            warn!(error = %e, "sign-in failed");
        }
        self.finish(result)
    }

    /// # Errors
    ///
    /// Returns an error if the template fails to render.
    pub fn render(&self, views: &Views, layout: &Layout) -> Result<String, ViewError> {
        views.render(
            "signin.html",
            SignInPage {
                layout,
                email: &self.email,
                error: self.error(),
                busy: self.is_busy(),
                button_label: self.button_label(),
                busy_label: "Signing in...",
            },
        )
    }
}

#[cfg(test)]
#[path = "signin_test.rs"]
mod tests;
