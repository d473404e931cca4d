//! Request-scoped auth client.
//!
//! ARCHITECTURE
//! ============
//! `AuthClient` is the only thing handlers talk to. It wraps the shared
//! provider and event bus for the duration of one request and carries an
//! explicit pair of cookie jars: the inbound jar it reads the stored session
//! from, and an outbound jar that collects every cookie it wants the browser
//! to change. Callers take the outbound jar with [`AuthClient::into_cookies`]
//! and attach it to whatever response they build.
//!
//! Refresh happens lazily inside [`AuthClient::get_session`] when the access
//! token is within [`EXPIRY_MARGIN_SECS`] of expiry. The refreshed session
//! only reaches the browser if the caller forwards the outbound jar.

use std::sync::Arc;

use axum_extra::extract::cookie::{Cookie, CookieJar};
use time::OffsetDateTime;
use tracing::{info, warn};

use super::events::{AuthEvent, AuthEventBus, Subscription};
use super::pkce;
use super::session_cookie::{
    BROWSER_COOKIE, BrowserId, CookieSettings, decode_session, encode_session, read_chunked, remove_chunked,
    write_chunked,
};
use crate::provider::{AuthProvider, ProviderError, Session, SignUpOutcome, SignUpRequest, User};

/// Refresh when the access token has this many seconds or fewer left.
pub const EXPIRY_MARGIN_SECS: i64 = 10;

#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    #[error(transparent)]
    Provider(#[from] ProviderError),
    #[error("Auth session missing!")]
    AuthSessionMissing,
    #[error("PKCE code verifier not found in storage")]
    MissingCodeVerifier,
    #[error("session encode failed: {0}")]
    SessionEncode(#[from] serde_json::Error),
}

/// Options for [`AuthClient::sign_up`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SignUpOptions {
    /// Landing URL for the confirmation email link.
    pub email_redirect_to: Option<String>,
}

pub struct AuthClient {
    provider: Arc<dyn AuthProvider>,
    events: AuthEventBus,
    settings: CookieSettings,
    browser: BrowserId,
    incoming: CookieJar,
    outgoing: CookieJar,
    /// `None` until the stored session has been read for this request.
    current: Option<Option<Session>>,
}

impl AuthClient {
    /// Build a client for one request. Assigns a browser id when the inbound
    /// jar has none.
    #[must_use]
    pub fn new(
        provider: Arc<dyn AuthProvider>,
        events: AuthEventBus,
        settings: CookieSettings,
        incoming: CookieJar,
    ) -> Self {
        let mut outgoing = CookieJar::new();
        let browser = if let Some(id) = BrowserId::from_jar(&incoming) {
            id
        } else {
            let id = BrowserId::generate();
            outgoing = outgoing.add(settings.build(BROWSER_COOKIE, id.to_string()));
            id
        };
        Self { provider, events, settings, browser, incoming, outgoing, current: None }
    }

    #[must_use]
    pub fn browser(&self) -> &BrowserId {
        &self.browser
    }

    /// Cookies this client wants written so far.
    #[cfg(test)]
    #[must_use]
    pub fn outgoing(&self) -> &CookieJar {
        &self.outgoing
    }

    /// Consume the client, yielding the outbound cookie jar.
    #[must_use]
    pub fn into_cookies(self) -> CookieJar {
        self.outgoing
    }

    // =========================================================================
    // SESSION
    // =========================================================================

    fn stored_session(&mut self) -> Option<Session> {
        let raw = read_chunked(&self.incoming, &self.settings.session_name)?;
        let session = decode_session(&raw);
        if session.is_none() {
            warn!(browser = %self.browser, "discarding undecodable session cookie");
            self.remove_session_cookies();
        }
        session
    }

    fn remove_session_cookies(&mut self) {
        let outgoing = std::mem::take(&mut self.outgoing);
        self.outgoing = remove_chunked(&self.settings, &self.incoming, outgoing, &self.settings.session_name);
    }

    fn persist(&mut self, session: &Session) -> Result<(), ClientError> {
        let encoded = encode_session(session)?;
        let outgoing = std::mem::take(&mut self.outgoing);
        self.outgoing = write_chunked(&self.settings, &self.incoming, outgoing, &self.settings.session_name, &encoded);
        self.current = Some(Some(session.clone()));
        Ok(())
    }

    fn publish(&self, event: &AuthEvent) {
        self.events.publish(&self.browser, event);
    }

    /// Current session, refreshed first if it is about to expire.
    ///
    /// A refresh the provider rejects clears the stored session and yields
    /// `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns an error if the refresh call cannot reach the provider.
    pub async fn get_session(&mut self) -> Result<Option<Session>, ClientError> {
        let stored = match &self.current {
            Some(known) => known.clone(),
            None => self.stored_session(),
        };
        let Some(session) = stored else {
            self.current = Some(None);
            return Ok(None);
        };

        let now = OffsetDateTime::now_utc().unix_timestamp();
        if !session.expires_within(now, EXPIRY_MARGIN_SECS) {
            self.current = Some(Some(session.clone()));
            return Ok(Some(session));
        }

        match self.provider.refresh_session(&session.refresh_token).await {
            Ok(fresh) => {
                self.persist(&fresh)?;
                info!(user_id = %fresh.user.id, "session refreshed");
                self.publish(&AuthEvent::token_refreshed(fresh.clone()));
                Ok(Some(fresh))
            }
            Err(e) if e.is_rejection() => {
                warn!(error = %e, user_id = %session.user.id, "refresh rejected, dropping session");
                self.clear_local_session();
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// The user behind the current session, as the provider sees it now.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::AuthSessionMissing`] without a session, or the
    /// provider's error.
    pub async fn get_user(&mut self) -> Result<User, ClientError> {
        let session = self.get_session().await?.ok_or(ClientError::AuthSessionMissing)?;
        Ok(self.provider.get_user(&session.access_token).await?)
    }

    // =========================================================================
    // SIGN-IN / SIGN-UP
    // =========================================================================

    /// # Errors
    ///
    /// Returns the provider's rejection (e.g. "Invalid login credentials").
    pub async fn sign_in_with_password(&mut self, email: &str, password: &str) -> Result<Session, ClientError> {
        let session = self.provider.sign_in_with_password(email, password).await?;
        self.persist(&session)?;
        info!(user_id = %session.user.id, "signed in");
        self.publish(&AuthEvent::signed_in(session.clone()));
        Ok(session)
    }

    /// Register an account. Stores a PKCE verifier so the emailed link can be
    /// exchanged later by this browser.
    ///
    /// # Errors
    ///
    /// Returns the provider's rejection (e.g. "User already registered").
    pub async fn sign_up(
        &mut self,
        email: &str,
        password: &str,
        options: &SignUpOptions,
    ) -> Result<SignUpOutcome, ClientError> {
        let pair = pkce::generate();
        let request = SignUpRequest {
            email: email.to_string(),
            password: password.to_string(),
            email_redirect_to: options.email_redirect_to.clone(),
            code_challenge: Some(pair.challenge),
        };
        let outcome = self.provider.sign_up(&request).await?;

        if let Some(session) = &outcome.session {
            self.persist(session)?;
            info!(user_id = %session.user.id, "signed up with immediate session");
            self.publish(&AuthEvent::signed_in(session.clone()));
        } else {
            let verifier = self.settings.build(self.settings.verifier_name.clone(), pair.verifier);
            self.outgoing = std::mem::take(&mut self.outgoing).add(verifier);
        }
        Ok(outcome)
    }

    /// Trade the one-time code from an email link for a session. The stored
    /// verifier is consumed whether or not the exchange succeeds.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::MissingCodeVerifier`] if this browser never
    /// started the flow, or the provider's rejection.
    pub async fn exchange_code_for_session(&mut self, auth_code: &str) -> Result<Session, ClientError> {
        let verifier = self
            .incoming
            .get(&self.settings.verifier_name)
            .map(Cookie::value)
            .filter(|v| !v.is_empty())
            .map(str::to_string);
        let removal = self.settings.removal(self.settings.verifier_name.clone());
        self.outgoing = std::mem::take(&mut self.outgoing).add(removal);

        let verifier = verifier.ok_or(ClientError::MissingCodeVerifier)?;
        let session = self
            .provider
            .exchange_code_for_session(auth_code, &verifier)
            .await?;
        self.persist(&session)?;
        info!(user_id = %session.user.id, "code exchanged for session");
        self.publish(&AuthEvent::signed_in(session.clone()));
        Ok(session)
    }

    // =========================================================================
    // EVENTS / SIGN-OUT
    // =========================================================================

    /// Subscribe to auth events for this browser.
    #[must_use]
    pub fn on_auth_state_change(&self) -> Subscription {
        self.events.subscribe(&self.browser)
    }

    /// Revoke the session with the provider, then forget it locally.
    ///
    /// Without a session this is a no-op: a rejected refresh inside
    /// `get_session` has already cleared it. On provider failure the session
    /// is kept; see [`AuthClient::clear_local_session`].
    ///
    /// # Errors
    ///
    /// Returns the provider's error.
    pub async fn sign_out(&mut self) -> Result<(), ClientError> {
        let Some(session) = self.get_session().await? else {
            return Ok(());
        };
        self.provider.sign_out(&session.access_token).await?;
        info!(user_id = %session.user.id, "signed out");
        self.clear_local_session();
        Ok(())
    }

    /// Forget the session in this browser without asking the provider.
    pub fn clear_local_session(&mut self) {
        self.remove_session_cookies();
        self.current = Some(None);
        self.publish(&AuthEvent::signed_out());
    }
}

#[cfg(test)]
#[path = "auth_client_test.rs"]
mod tests;
