//! GoTrue REST client.
//!
//! Thin HTTP wrapper for the provider's `/auth/v1` endpoints. Pure parsing in
//! `parse_session`, `parse_sign_up`, and `parse_error` for testability.

use std::time::Duration;

use serde::Deserialize;
use serde_json::json;
use time::OffsetDateTime;
use tracing::{debug, warn};

use super::AuthProvider;
use super::types::{ProviderError, Session, SignUpOutcome, SignUpRequest, User};
use crate::config::ProviderTimeouts;

const AUTH_PATH: &str = "/auth/v1";

// =============================================================================
// CLIENT
// =============================================================================

pub struct GoTrueClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl GoTrueClient {
    /// Build a client for the project at `project_url` (e.g. `https://abcd.supabase.co`).
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client fails to build.
    pub fn new(project_url: &str, api_key: String, timeouts: ProviderTimeouts) -> Result<Self, ProviderError> {
        let mut builder = reqwest::Client::builder();
        if let Some(secs) = timeouts.request_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        if let Some(secs) = timeouts.connect_secs {
            builder = builder.connect_timeout(Duration::from_secs(secs));
        }
        let http = builder
            .build()
            .map_err(|e| ProviderError::HttpClientBuild(e.to_string()))?;
        let base_url = format!("{}{AUTH_PATH}", project_url.trim_end_matches('/'));
        Ok(Self { http, base_url, api_key })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Attach provider headers, send, and return the body of a 2xx response.
    async fn send(&self, request: reqwest::RequestBuilder, bearer: Option<&str>) -> Result<String, ProviderError> {
        let token = bearer.unwrap_or(&self.api_key);
        let response = request
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {token}"))
            .send()
            .await
            .map_err(|e| ProviderError::Request(e.to_string()))?;

        let status = response.status().as_u16();
        let text = response
            .text()
            .await
            .map_err(|e| ProviderError::Request(e.to_string()))?;

        if !(200..300).contains(&status) {
            return Err(parse_error(status, &text));
        }
        Ok(text)
    }
}

#[async_trait::async_trait]
impl AuthProvider for GoTrueClient {
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session, ProviderError> {
        debug!(email = %email, "password grant");
        let request = self
            .http
            .post(self.endpoint("/token"))
            .query(&[("grant_type", "password")])
            .json(&json!({ "email": email, "password": password }));
        let body = self.send(request, None).await?;
        parse_session(&body, now())
    }

    async fn sign_up(&self, request: &SignUpRequest) -> Result<SignUpOutcome, ProviderError> {
        debug!(email = %request.email, "sign-up");
        let mut payload = json!({ "email": request.email, "password": request.password });
        if let Some(challenge) = &request.code_challenge {
            payload["code_challenge"] = json!(challenge);
            payload["code_challenge_method"] = json!("s256");
        }

        let mut builder = self.http.post(self.endpoint("/signup")).json(&payload);
        if let Some(redirect_to) = &request.email_redirect_to {
            builder = builder.query(&[("redirect_to", redirect_to.as_str())]);
        }
        let body = self.send(builder, None).await?;
        parse_sign_up(&body, now())
    }

    async fn get_user(&self, access_token: &str) -> Result<User, ProviderError> {
        let request = self.http.get(self.endpoint("/user"));
        let body = self.send(request, Some(access_token)).await?;
        serde_json::from_str(&body).map_err(|e| ProviderError::Parse(e.to_string()))
    }

    async fn refresh_session(&self, refresh_token: &str) -> Result<Session, ProviderError> {
        debug!("refresh grant");
        let request = self
            .http
            .post(self.endpoint("/token"))
            .query(&[("grant_type", "refresh_token")])
            .json(&json!({ "refresh_token": refresh_token }));
        let body = self.send(request, None).await?;
        parse_session(&body, now())
    }

    async fn exchange_code_for_session(&self, auth_code: &str, code_verifier: &str) -> Result<Session, ProviderError> {
        debug!("pkce grant");
        let request = self
            .http
            .post(self.endpoint("/token"))
            .query(&[("grant_type", "pkce")])
            .json(&json!({ "auth_code": auth_code, "code_verifier": code_verifier }));
        let body = self.send(request, None).await?;
        parse_session(&body, now())
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), ProviderError> {
        let request = self
            .http
            .post(self.endpoint("/logout"))
            .query(&[("scope", "global")]);
        match self.send(request, Some(access_token)).await {
            Ok(_) => Ok(()),
            // Token already revoked or expired: nothing left to sign out of.
            Err(ProviderError::Api { status: 401 | 403 | 404, .. }) => {
                warn!("sign-out on an already invalid session");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}

fn now() -> i64 {
    OffsetDateTime::now_utc().unix_timestamp()
}

// =============================================================================
// WIRE TYPES
// =============================================================================

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    refresh_token: String,
    #[serde(default)]
    token_type: Option<String>,
    expires_in: i64,
    #[serde(default)]
    expires_at: Option<i64>,
    user: User,
}

impl TokenResponse {
    fn into_session(self, now: i64) -> Session {
        Session {
            access_token: self.access_token,
            refresh_token: self.refresh_token,
            token_type: self.token_type.unwrap_or_else(|| "bearer".into()),
            expires_in: self.expires_in,
            expires_at: self.expires_at.unwrap_or(now + self.expires_in),
            user: self.user,
        }
    }
}

#[derive(Deserialize, Default)]
struct ErrorBody {
    #[serde(default)]
    msg: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_code: Option<String>,
}

// =============================================================================
// PARSING
// =============================================================================

fn parse_session(json: &str, now: i64) -> Result<Session, ProviderError> {
    let token: TokenResponse = serde_json::from_str(json).map_err(|e| ProviderError::Parse(e.to_string()))?;
    Ok(token.into_session(now))
}

/// Sign-up answers with a full token response on auto-confirm projects and
/// with the bare user object otherwise.
fn parse_sign_up(json: &str, now: i64) -> Result<SignUpOutcome, ProviderError> {
    let value: serde_json::Value = serde_json::from_str(json).map_err(|e| ProviderError::Parse(e.to_string()))?;
    if value.get("access_token").is_some() {
        let token: TokenResponse = serde_json::from_value(value).map_err(|e| ProviderError::Parse(e.to_string()))?;
        let session = token.into_session(now);
        return Ok(SignUpOutcome { user: Some(session.user.clone()), session: Some(session) });
    }

    let user: User = serde_json::from_value(value).map_err(|e| ProviderError::Parse(e.to_string()))?;
    Ok(SignUpOutcome { user: Some(user), session: None })
}

fn parse_error(status: u16, body: &str) -> ProviderError {
    let parsed: ErrorBody = serde_json::from_str(body).unwrap_or_default();
    let message = parsed
        .msg
        .or(parsed.error_description)
        .or(parsed.message)
        .or_else(|| parsed.error.clone())
        .or_else(|| Some(body.trim().to_string()).filter(|b| !b.is_empty() && !b.starts_with('{')))
        .unwrap_or_else(|| format!("identity provider returned HTTP {status}"));
    let code = parsed.error_code.or(parsed.error);
    ProviderError::Api { status, code, message }
}

#[cfg(test)]
#[path = "gotrue_test.rs"]
mod tests;
