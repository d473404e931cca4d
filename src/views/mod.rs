//! Server-rendered views.
//!
//! SYSTEM CONTEXT
//! ==============
//! Each interactive page is backed by a small view-model that owns its state
//! machine (`idle -> submitting -> succeeded | failed`, or the dashboard's
//! mount/update/unmount cycle) and renders itself through a shared
//! [`Views`] template environment. Handlers drive the view-models; the
//! templates only display what the view-model exposes.

pub mod dashboard;
pub mod signin;
pub mod signup;
pub mod theme;

use minijinja::{Environment, UndefinedBehavior};
use serde::Serialize;

#[derive(Debug, thiserror::Error)]
pub enum ViewError {
    #[error("template render failed: {0}")]
    Render(#[from] minijinja::Error),
}

/// Lifecycle of a submitted form.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FormStatus {
    #[default]
    Idle,
    Submitting,
    Succeeded,
    Failed(String),
}

/// What the browser should do after a form submission settles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormOutcome {
    Navigate(&'static str),
    Stay,
}

const TEMPLATES: &[(&str, &str)] = &[
    ("layout.html", include_str!("../../templates/layout.html")),
    ("home.html", include_str!("../../templates/home.html")),
    ("signin.html", include_str!("../../templates/signin.html")),
    ("signup.html", include_str!("../../templates/signup.html")),
    ("auth_error.html", include_str!("../../templates/auth_error.html")),
    ("dashboard.html", include_str!("../../templates/dashboard.html")),
    ("dashboard_profile.html", include_str!("../../templates/dashboard_profile.html")),
];

/// Compiled templates. Built once at startup and shared read-only.
pub struct Views {
    env: Environment<'static>,
}

impl Views {
    /// Compile every bundled template.
    ///
    /// # Errors
    ///
    /// Returns an error if a template fails to parse.
    pub fn new() -> Result<Self, ViewError> {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Strict);
        for (name, source) in TEMPLATES {
            env.add_template(name, source)?;
        }
        Ok(Self { env })
    }

    /// Render `name` with `ctx`. `.html` templates are auto-escaped.
    ///
    /// # Errors
    ///
    /// Returns an error if the template is unknown or references a missing value.
    pub fn render<S: Serialize>(&self, name: &str, ctx: S) -> Result<String, ViewError> {
        Ok(self.env.get_template(name)?.render(ctx)?)
    }
}

#[cfg(test)]
#[path = "mod_test.rs"]
mod tests;
