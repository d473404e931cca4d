//! Theme preference and the light/dark toggle.
//!
//! The preference lives in the `theme` cookie. Anything other than `light`
//! or `dark` means "follow the system", which the server renders as light.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::Serialize;
use time::Duration;

pub const THEME_COOKIE: &str = "theme";
const THEME_MAX_AGE_DAYS: i64 = 365;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemePreference {
    Light,
    Dark,
    #[default]
    System,
}

impl ThemePreference {
    #[must_use]
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("light") => Self::Light,
            Some("dark") => Self::Dark,
            _ => Self::System,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
            Self::System => "system",
        }
    }

    #[must_use]
    pub fn is_dark(self) -> bool {
        self == Self::Dark
    }

    /// The opposite of what is currently shown. Always `Light` or `Dark`.
    #[must_use]
    pub fn toggled(self) -> Self {
        if self.is_dark() { Self::Light } else { Self::Dark }
    }
}

/// Render data for the header toggle button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ThemeToggle {
    pub title: &'static str,
    /// Preference written when the button is pressed.
    pub next: &'static str,
    pub label: &'static str,
}

impl ThemeToggle {
    #[must_use]
    pub fn for_preference(preference: ThemePreference) -> Self {
        let title = if preference.is_dark() { "Switch to light mode" } else { "Switch to dark mode" };
        Self { title, next: preference.toggled().as_str(), label: "Toggle theme" }
    }
}

/// Cookie that stores `preference`.
#[must_use]
pub fn theme_cookie(preference: ThemePreference, secure: bool) -> Cookie<'static> {
    Cookie::build((THEME_COOKIE, preference.as_str()))
        .path("/")
        .same_site(SameSite::Lax)
        .secure(secure)
        .max_age(Duration::days(THEME_MAX_AGE_DAYS))
        .build()
}

// =============================================================================
// EXTRACTOR
// =============================================================================

/// The request's theme plus the path the toggle should return to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeContext {
    pub preference: ThemePreference,
    pub current_path: String,
}

/// Values every page layout needs.
#[derive(Debug, Clone, Serialize)]
pub struct Layout {
    pub dark: bool,
    pub toggle: ThemeToggle,
    pub current_path: String,
}

impl ThemeContext {
    #[must_use]
    pub fn layout(&self) -> Layout {
        Layout {
            dark: self.preference.is_dark(),
            toggle: ThemeToggle::for_preference(self.preference),
            current_path: self.current_path.clone(),
        }
    }
}

impl<S> FromRequestParts<S> for ThemeContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let jar = CookieJar::from_request_parts(parts, state).await?;
        let preference = ThemePreference::parse(jar.get(THEME_COOKIE).map(Cookie::value));
        let current_path = parts
            .uri
            .path_and_query()
            .map_or_else(|| "/".to_string(), |pq| pq.as_str().to_string());
        Ok(Self { preference, current_path })
    }
}

#[cfg(test)]
#[path = "theme_test.rs"]
mod tests;
