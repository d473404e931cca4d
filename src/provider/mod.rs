//! Identity provider — the external auth service behind every sign-in.
//!
//! DESIGN
//! ======
//! `AuthProvider` is the token-level surface of the provider. Production
//! uses [`gotrue::GoTrueClient`]; tests swap in an in-memory mock. Cookie
//! storage, refresh timing, and auth events live one layer up in
//! `services::auth_client`, so implementations stay stateless.

pub mod gotrue;
pub mod types;

pub use types::{ProviderError, Session, SignUpOutcome, SignUpRequest, User};

#[async_trait::async_trait]
pub trait AuthProvider: Send + Sync {
    /// Password grant.
    async fn sign_in_with_password(&self, email: &str, password: &str) -> Result<Session, ProviderError>;

    /// Register a new account. Usually returns only the unconfirmed user.
    async fn sign_up(&self, request: &SignUpRequest) -> Result<SignUpOutcome, ProviderError>;

    /// Resolve the user behind an access token.
    async fn get_user(&self, access_token: &str) -> Result<User, ProviderError>;

    /// Trade a refresh token for a fresh session.
    async fn refresh_session(&self, refresh_token: &str) -> Result<Session, ProviderError>;

    /// PKCE grant: trade a one-time auth code plus its verifier for a session.
    async fn exchange_code_for_session(&self, auth_code: &str, code_verifier: &str) -> Result<Session, ProviderError>;

    /// Revoke the session behind an access token.
    async fn sign_out(&self, access_token: &str) -> Result<(), ProviderError>;
}
