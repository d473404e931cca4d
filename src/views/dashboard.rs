//! Live dashboard view.
//!
//! DESIGN
//! ======
//! A `DashboardView` exists for as long as one browser connection is
//! listening for updates. Mounting subscribes to the browser's auth events
//! and fetches the user once; every later event replaces the displayed user.
//! The subscription is a field, so dropping the view (disconnect, or an
//! explicit [`DashboardView::unmount`]) unsubscribes exactly once. A fetch
//! still in flight when the connection goes away is cancelled with the
//! future that owns it and never touches a view.

use serde::Serialize;
use time::{OffsetDateTime, UtcOffset};
use tracing::warn;

use super::theme::Layout;
use super::{ViewError, Views};
use crate::provider::User;
use crate::services::auth_client::AuthClient;
use crate::services::events::{AuthEvent, Subscription};

pub const SIGNIN_PATH: &str = "/auth/signin";

pub struct DashboardView {
    user: Option<User>,
    loading: bool,
    subscription: Option<Subscription>,
}

/// Result of mounting: a live view, or a redirect when the user is unknown.
pub enum MountOutcome {
    Ready(DashboardView),
    Navigate(&'static str),
}

#[derive(Serialize)]
struct ProfileContext<'a> {
    email: &'a str,
    last_sign_in: String,
}

#[derive(Serialize)]
struct ShellContext<'a> {
    layout: &'a Layout,
    error: Option<&'a str>,
}

impl DashboardView {
    /// Subscribe, then fetch the current user.
    pub async fn mount(client: &mut AuthClient) -> MountOutcome {
        let mut view = Self { user: None, loading: true, subscription: Some(client.on_auth_state_change()) };
        match client.get_user().await {
            Ok(user) => {
                view.user = Some(user);
                view.loading = false;
                MountOutcome::Ready(view)
            }
            Err(e) => {
                warn!(error = %e, browser = %client.browser(), "dashboard user fetch failed");
                MountOutcome::Navigate(SIGNIN_PATH)
            }
        }
    }

    #[cfg(test)]
    #[must_use]
    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    #[cfg(test)]
    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    #[cfg(test)]
    #[must_use]
    pub fn is_mounted(&self) -> bool {
        self.subscription.is_some()
    }

    /// Next auth event for this browser. `None` once unmounted.
    pub async fn next_event(&mut self) -> Option<AuthEvent> {
        self.subscription.as_mut()?.recv().await
    }

    /// Show the event's user, or nobody when the event carries no session.
    pub fn apply(&mut self, event: &AuthEvent) {
        self.user = event.user().cloned();
    }

    pub fn unmount(&mut self) {
        self.subscription.take();
    }

    /// # Errors
    ///
    /// Returns an error if the template fails to render.
    pub fn render_profile(&self, views: &Views) -> Result<String, ViewError> {
        let email = self.user.as_ref().and_then(|u| u.email.as_deref()).unwrap_or_default();
        let last_sign_in = self
            .user
            .as_ref()
            .and_then(|u| u.last_sign_in_at)
            .map_or_else(|| "N/A".to_string(), format_last_sign_in);
        views.render("dashboard_profile.html", ProfileContext { email, last_sign_in })
    }
}

/// Page shell with the busy indicator; the profile arrives over the event
/// stream. `error` is shown above it when a sign-out was refused.
///
/// # Errors
///
/// Returns an error if the template fails to render.
pub fn render_shell(views: &Views, layout: &Layout, error: Option<&str>) -> Result<String, ViewError> {
    views.render("dashboard.html", ShellContext { layout, error })
}

/// `M/D/YYYY, h:mm:ss AM|PM UTC`.
#[must_use]
pub fn format_last_sign_in(at: OffsetDateTime) -> String {
    let at = at.to_offset(UtcOffset::UTC);
    let (hour, meridiem) = match at.hour() {
        0 => (12, "AM"),
        h @ 1..=11 => (h, "AM"),
        12 => (12, "PM"),
        h => (h - 12, "PM"),
    };
    format!(
        "{}/{}/{}, {}:{:02}:{:02} {} UTC",
        u8::from(at.month()),
        at.day(),
        at.year(),
        hour,
        at.minute(),
        at.second(),
        meridiem
    )
}

#[cfg(test)]
#[path = "dashboard_test.rs"]
mod tests;
