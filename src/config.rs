//! Application configuration parsed from environment variables.

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_EMAIL_REDIRECT_TO: &str = "https://xplr-app.pages.dev/auth/callback";

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required env var {var}")]
    Missing { var: &'static str },
    #[error("invalid value for {var}: {value:?}")]
    Invalid { var: &'static str, value: String },
}

/// What the dashboard does when the provider refuses a sign-out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignOutPolicy {
    /// Drop the local session anyway and go home. Provider errors are logged only.
    Redirect,
    /// Keep the session and show the provider's error on the dashboard.
    Strict,
}

/// Optional HTTP timeouts for provider calls. `None` waits indefinitely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ProviderTimeouts {
    pub request_secs: Option<u64>,
    pub connect_secs: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Provider project URL, without trailing slash.
    pub provider_url: String,
    /// Public (anon) API key sent with every provider call.
    pub provider_anon_key: String,
    /// First host label of `provider_url`; namespaces the session cookies.
    pub project_ref: String,
    pub port: u16,
    /// Link target embedded in sign-up confirmation emails.
    pub email_redirect_to: String,
    pub cookie_secure: bool,
    pub sign_out_policy: SignOutPolicy,
    pub timeouts: ProviderTimeouts,
}

impl AppConfig {
    /// Build typed config from environment variables.
    ///
    /// Required:
    /// - `SUPABASE_URL`
    /// - `SUPABASE_ANON_KEY`
    ///
    /// Optional:
    /// - `PORT`: default 3000
    /// - `EMAIL_REDIRECT_TO`: default [`DEFAULT_EMAIL_REDIRECT_TO`]
    /// - `COOKIE_SECURE`: inferred from the `EMAIL_REDIRECT_TO` scheme when unset
    /// - `SIGN_OUT_POLICY`: `redirect` (default) or `strict`
    /// - `PROVIDER_REQUEST_TIMEOUT_SECS`, `PROVIDER_CONNECT_TIMEOUT_SECS`: unset = no timeout
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or any value fails to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        let provider_url = required("SUPABASE_URL")?.trim_end_matches('/').to_string();
        let provider_anon_key = required("SUPABASE_ANON_KEY")?;
        let project_ref = project_ref(&provider_url)
            .ok_or_else(|| ConfigError::Invalid { var: "SUPABASE_URL", value: provider_url.clone() })?;

        let port = match std::env::var("PORT") {
            Ok(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::Invalid { var: "PORT", value: raw })?,
            Err(_) => DEFAULT_PORT,
        };

        let email_redirect_to =
            std::env::var("EMAIL_REDIRECT_TO").unwrap_or_else(|_| DEFAULT_EMAIL_REDIRECT_TO.to_string());
        let cookie_secure = env_bool("COOKIE_SECURE").unwrap_or_else(|| email_redirect_to.starts_with("https://"));
        let sign_out_policy = parse_sign_out_policy(std::env::var("SIGN_OUT_POLICY").ok().as_deref())?;
        let timeouts = ProviderTimeouts {
            request_secs: env_parse_u64("PROVIDER_REQUEST_TIMEOUT_SECS")?,
            connect_secs: env_parse_u64("PROVIDER_CONNECT_TIMEOUT_SECS")?,
        };

        Ok(Self {
            provider_url,
            provider_anon_key,
            project_ref,
            port,
            email_redirect_to,
            cookie_secure,
            sign_out_policy,
            timeouts,
        })
    }
}

fn required(var: &'static str) -> Result<String, ConfigError> {
    std::env::var(var)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or(ConfigError::Missing { var })
}

pub(crate) fn env_bool(key: &str) -> Option<bool> {
    std::env::var(key)
        .ok()
        .and_then(|raw| match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => None,
        })
}

fn env_parse_u64(var: &'static str) -> Result<Option<u64>, ConfigError> {
    match std::env::var(var) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|_| ConfigError::Invalid { var, value: raw }),
        Err(_) => Ok(None),
    }
}

fn parse_sign_out_policy(raw: Option<&str>) -> Result<SignOutPolicy, ConfigError> {
    match raw.map(str::trim).unwrap_or("redirect") {
        "redirect" => Ok(SignOutPolicy::Redirect),
        "strict" => Ok(SignOutPolicy::Strict),
        other => Err(ConfigError::Invalid { var: "SIGN_OUT_POLICY", value: other.to_string() }),
    }
}

/// Extract the project ref (first host label) from a provider URL,
/// e.g. `abcd` from `https://abcd.supabase.co`.
#[must_use]
pub fn project_ref(url: &str) -> Option<String> {
    let parsed = reqwest::Url::parse(url).ok()?;
    let label = parsed.host_str()?.split('.').next()?;
    if label.is_empty() {
        return None;
    }
    Some(label.to_string())
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
