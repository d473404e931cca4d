//! Provider types — sessions, users, and provider errors.
//!
//! Shapes mirror the identity provider's JSON so they pass through without
//! translation. Nothing here is persisted server-side.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

// =============================================================================
// ERROR
// =============================================================================

/// Errors produced by identity provider calls.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ProviderError {
    /// The provider answered with a non-success status. `message` is the
    /// provider's human-readable text and is shown to users as-is.
    #[error("{message}")]
    Api { status: u16, code: Option<String>, message: String },

    /// The HTTP request could not be completed (DNS, TLS, connection reset).
    #[error("provider request failed: {0}")]
    Request(String),

    /// The provider response body could not be deserialized.
    #[error("provider response parse failed: {0}")]
    Parse(String),

    /// The underlying HTTP client could not be constructed.
    #[error("HTTP client build failed: {0}")]
    HttpClientBuild(String),
}

impl ProviderError {
    /// True when the provider looked at the request and refused it (4xx).
    #[must_use]
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Api { status: 400..=499, .. })
    }
}

// =============================================================================
// USER
// =============================================================================

/// Identity record as returned by the provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub aud: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub last_sign_in_at: Option<OffsetDateTime>,
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub created_at: Option<OffsetDateTime>,
    #[serde(default)]
    pub app_metadata: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    pub user_metadata: serde_json::Map<String, serde_json::Value>,
}

// =============================================================================
// SESSION
// =============================================================================

/// Token bundle for an authenticated browser.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    pub expires_in: i64,
    /// Absolute expiry, unix seconds.
    pub expires_at: i64,
    pub user: User,
}

fn default_token_type() -> String {
    "bearer".into()
}

impl Session {
    /// True if the access token expires within `margin_secs` of `now`.
    #[must_use]
    pub fn expires_within(&self, now: i64, margin_secs: i64) -> bool {
        self.expires_at - now <= margin_secs
    }
}

// =============================================================================
// SIGN-UP
// =============================================================================

/// Parameters for a password sign-up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignUpRequest {
    pub email: String,
    pub password: String,
    /// Where the confirmation email's link should land.
    pub email_redirect_to: Option<String>,
    /// PKCE challenge (`s256`) binding the emailed code to this browser.
    pub code_challenge: Option<String>,
}

/// Result of a sign-up. `session` is only present on auto-confirm projects.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SignUpOutcome {
    pub user: Option<User>,
    pub session: Option<Session>,
}

#[cfg(test)]
#[path = "types_test.rs"]
mod tests;
