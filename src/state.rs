//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is cloned into every handler. It holds only long-lived,
//! shareable pieces: configuration, the identity provider, the auth event
//! bus, and compiled templates. Anything tied to one request (cookies, the
//! current session) lives in an [`AuthClient`] built from it.

use std::sync::Arc;

use axum_extra::extract::cookie::CookieJar;

use crate::config::AppConfig;
use crate::provider::AuthProvider;
use crate::services::auth_client::AuthClient;
use crate::services::events::AuthEventBus;
use crate::services::session_cookie::CookieSettings;
use crate::views::Views;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub provider: Arc<dyn AuthProvider>,
    pub events: AuthEventBus,
    pub views: Arc<Views>,
    pub cookies: CookieSettings,
}

impl AppState {
    #[must_use]
    pub fn new(config: AppConfig, provider: Arc<dyn AuthProvider>, views: Views) -> Self {
        let cookies = CookieSettings::new(&config.project_ref, config.cookie_secure);
        Self { config: Arc::new(config), provider, events: AuthEventBus::new(), views: Arc::new(views), cookies }
    }

    /// Auth client for one request, reading from `jar`.
    #[must_use]
    pub fn auth_client(&self, jar: CookieJar) -> AuthClient {
        AuthClient::new(self.provider.clone(), self.events.clone(), self.cookies.clone(), jar)
    }
}
