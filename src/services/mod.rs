//! Auth services used by the HTTP routes.
//!
//! ARCHITECTURE
//! ============
//! Service modules own session storage, PKCE, and auth event delivery so
//! route handlers can stay focused on protocol translation and rendering.

pub mod auth_client;
pub mod events;
pub mod pkce;
pub mod session_cookie;
