//! Sign-up form.

use serde::Serialize;
use tracing::warn;

use super::theme::Layout;
use super::{FormOutcome, FormStatus, ViewError, Views};
use crate::services::auth_client::{AuthClient, SignUpOptions};

pub const PASSWORD_MISMATCH: &str = "Passwords do not match";
pub const CONFIRMATION_SENT: &str = "Check your email for the confirmation link.";

#[derive(Debug, Clone, Default)]
pub struct SignUpForm {
    pub email: String,
    status: FormStatus,
}

#[derive(Serialize)]
struct SignUpPage<'a> {
    layout: &'a Layout,
    email: &'a str,
    error: Option<&'a str>,
    message: Option<&'static str>,
    busy: bool,
    button_label: &'static str,
    busy_label: &'static str,
}

impl SignUpForm {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
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

    /// Confirmation text shown after a successful sign-up.
    #[must_use]
    pub fn message(&self) -> Option<&'static str> {
        (self.status == FormStatus::Succeeded).then_some(CONFIRMATION_SENT)
    }

    #[must_use]
    pub fn button_label(&self) -> &'static str {
        if self.is_busy() { "Creating account..." } else { "Sign Up" }
    }

    /// Enter the submitting state. A password mismatch fails immediately;
    /// a submission already in flight is refused.
    pub fn begin_submit(&mut self, email: &str, password: &str, confirm_password: &str) -> bool {
        if self.is_busy() {
            return false;
        }
        self.email = email.to_string();
        if password != confirm_password {
            self.status = FormStatus::Failed(PASSWORD_MISMATCH.to_string());
            return false;
        }
        self.status = FormStatus::Submitting;
        true
    }

    pub fn finish<T, E: std::fmt::Display>(&mut self, result: Result<T, E>) -> FormOutcome {
        self.status = match result {
            Ok(_) => FormStatus::Succeeded,
            Err(e) => FormStatus::Failed(e.to_string()),
        };
        FormOutcome::Stay
    }

    /// Register through `client`. The provider is never called when the
    /// passwords differ.
    pub async fn submit(
        &mut self,
        client: &mut AuthClient,
        email: &str,
        password: &str,
        confirm_password: &str,
        options: &SignUpOptions,
    ) -> FormOutcome {
        if !self.begin_submit(email, password, confirm_password) {
            return FormOutcome::Stay;
        }
        let result = client.sign_up(email, password, options).await;
        if let Err(e) = &result {
            warn!(error = %e, "sign-up failed");
        }
        self.finish(result)
    }

    /// # Errors
    ///
    /// Returns an error if the template fails to render.
    pub fn render(&self, views: &Views, layout: &Layout) -> Result<String, ViewError> {
        views.render(
            "signup.html",
            SignUpPage {
                layout,
                email: &self.email,
                error: self.error(),
                message: self.message(),
                busy: self.is_busy(),
                button_label: self.button_label(),
                busy_label: "Creating account...",
            },
        )
    }
}

#[cfg(test)]
#[path = "signup_test.rs"]
mod tests;
