//! Cookie storage for sessions, PKCE verifiers, and browser ids.
//!
//! ARCHITECTURE
//! ============
//! The session lives only in the browser: JSON, base64url-encoded behind a
//! `base64-` prefix, written under `sb-<project-ref>-auth-token`. Browsers cap
//! a cookie near 4 KiB, so long values are split into `<name>.0`, `<name>.1`,
//! ... chunks. Every write also schedules removal of chunks left over from an
//! earlier, longer value so a reader never stitches stale pieces together.
//!
//! Reads always come from the inbound jar; writes always go to the outbound
//! jar. Nothing here mutates the request.

use std::collections::BTreeSet;
use std::fmt::Write;

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::Rng;
use time::Duration;

use crate::provider::Session;

/// Largest value written into a single cookie.
pub const CHUNK_SIZE: usize = 3180;
const MAX_CHUNKS: usize = 32;
const BASE64_PREFIX: &str = "base64-";
const COOKIE_MAX_AGE_DAYS: i64 = 400;

pub const BROWSER_COOKIE: &str = "xplr-browser";

// =============================================================================
// SETTINGS
// =============================================================================

/// Cookie names and attributes derived from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieSettings {
    pub session_name: String,
    pub verifier_name: String,
    pub secure: bool,
}

impl CookieSettings {
    #[must_use]
    pub fn new(project_ref: &str, secure: bool) -> Self {
        Self {
            session_name: format!("sb-{project_ref}-auth-token"),
            verifier_name: format!("sb-{project_ref}-auth-token-code-verifier"),
            secure,
        }
    }

    /// A long-lived, HTTP-only cookie.
    #[must_use]
    pub fn build(&self, name: impl Into<String>, value: impl Into<String>) -> Cookie<'static> {
        Cookie::build((name.into(), value.into()))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure)
            .max_age(Duration::days(COOKIE_MAX_AGE_DAYS))
            .build()
    }

    /// An empty, immediately expiring cookie that deletes `name` in the browser.
    #[must_use]
    pub fn removal(&self, name: impl Into<String>) -> Cookie<'static> {
        Cookie::build((name.into(), ""))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.secure)
            .max_age(Duration::ZERO)
            .build()
    }
}

/// True for cookies produced by [`CookieSettings::removal`].
#[must_use]
pub fn is_removal(cookie: &Cookie<'_>) -> bool {
    cookie.max_age() == Some(Duration::ZERO)
}

// =============================================================================
// SESSION CODEC
// =============================================================================

/// Serialize a session into its cookie form.
///
/// # Errors
///
/// Returns an error if the session cannot be serialized to JSON.
pub fn encode_session(session: &Session) -> Result<String, serde_json::Error> {
    let json = serde_json::to_vec(session)?;
    Ok(format!("{BASE64_PREFIX}{}", URL_SAFE_NO_PAD.encode(json)))
}

/// Parse a cookie value back into a session. Unknown or corrupt values yield `None`.
#[must_use]
pub fn decode_session(raw: &str) -> Option<Session> {
    let json = match raw.strip_prefix(BASE64_PREFIX) {
        Some(encoded) => URL_SAFE_NO_PAD.decode(encoded).ok()?,
        None => raw.as_bytes().to_vec(),
    };
    serde_json::from_slice(&json).ok()
}

// =============================================================================
// CHUNKING
// =============================================================================

fn chunk_name(name: &str, index: usize) -> String {
    format!("{name}.{index}")
}

fn is_chunk_of(candidate: &str, name: &str) -> bool {
    candidate
        .strip_prefix(name)
        .and_then(|rest| rest.strip_prefix('.'))
        .is_some_and(|idx| !idx.is_empty() && idx.chars().all(|c| c.is_ascii_digit()))
}

/// Split on char boundaries into pieces of at most [`CHUNK_SIZE`] bytes.
fn split_chunks(value: &str) -> Vec<&str> {
    let mut chunks = Vec::new();
    let mut rest = value;
    while rest.len() > CHUNK_SIZE {
        let mut cut = CHUNK_SIZE;
        while !rest.is_char_boundary(cut) {
            cut -= 1;
        }
        let (head, tail) = rest.split_at(cut);
        chunks.push(head);
        rest = tail;
    }
    chunks.push(rest);
    chunks
}

/// Every cookie name in `jar` that belongs to the (possibly chunked) `name`.
fn stored_names(jar: &CookieJar, name: &str) -> BTreeSet<String> {
    jar.iter()
        .map(|c| c.name().to_string())
        .filter(|n| n == name || is_chunk_of(n, name))
        .collect()
}

/// Reassemble a value stored under `name` or its numbered chunks.
#[must_use]
pub fn read_chunked(jar: &CookieJar, name: &str) -> Option<String> {
    if let Some(cookie) = jar.get(name) {
        return Some(cookie.value().to_string()).filter(|v| !v.is_empty());
    }

    let mut value = String::new();
    for index in 0..MAX_CHUNKS {
        match jar.get(&chunk_name(name, index)) {
            Some(cookie) => value.push_str(cookie.value()),
            None => break,
        }
    }
    Some(value).filter(|v| !v.is_empty())
}

/// Write `value` under `name`, chunking as needed and removing stale pieces
/// found in either jar.
#[must_use]
pub fn write_chunked(
    settings: &CookieSettings,
    incoming: &CookieJar,
    mut outgoing: CookieJar,
    name: &str,
    value: &str,
) -> CookieJar {
    let chunks = split_chunks(value);
    let mut written = BTreeSet::new();
    if chunks.len() == 1 {
        outgoing = outgoing.add(settings.build(name.to_string(), value.to_string()));
        written.insert(name.to_string());
    } else {
        for (index, chunk) in chunks.iter().enumerate() {
            let chunk_cookie = chunk_name(name, index);
            outgoing = outgoing.add(settings.build(chunk_cookie.clone(), (*chunk).to_string()));
            written.insert(chunk_cookie);
        }
    }

    let mut stale = stored_names(incoming, name);
    stale.extend(stored_names(&outgoing, name));
    for old in stale.difference(&written) {
        outgoing = outgoing.add(settings.removal(old.clone()));
    }
    outgoing
}

/// Schedule removal of `name` and all of its chunks.
#[must_use]
pub fn remove_chunked(settings: &CookieSettings, incoming: &CookieJar, mut outgoing: CookieJar, name: &str) -> CookieJar {
    let mut names = stored_names(incoming, name);
    names.extend(stored_names(&outgoing, name));
    for old in names {
        outgoing = outgoing.add(settings.removal(old));
    }
    outgoing
}

// =============================================================================
// BROWSER ID
// =============================================================================

/// Identifies one browser across tabs. Auth events are delivered per browser.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BrowserId(String);

pub(crate) fn bytes_to_hex(bytes: &[u8]) -> String {
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        let _ = write!(s, "{b:02x}");
    }
    s
}

impl BrowserId {
    /// Generate a random 32-byte hex id.
    #[must_use]
    pub fn generate() -> Self {
        let bytes: [u8; 32] = rand::rng().random();
        Self(bytes_to_hex(&bytes))
    }

    /// Read a well-formed id from the browser cookie.
    #[must_use]
    pub fn from_jar(jar: &CookieJar) -> Option<Self> {
        let raw = jar.get(BROWSER_COOKIE)?.value();
        (raw.len() == 64 && raw.chars().all(|c| c.is_ascii_hexdigit())).then(|| Self(raw.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for BrowserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
#[path = "session_cookie_test.rs"]
mod tests;
