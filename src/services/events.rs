//! Auth-state event bus.
//!
//! DESIGN
//! ======
//! A registry of per-subscription unbounded senders keyed by [`BrowserId`].
//! Publishing fans an event out to every live subscription of that browser.
//! A [`Subscription`] owns its receiver and removes its registry entry on
//! drop, so teardown follows the owner's lifetime and happens once.
//!
//! Senders whose receiver is gone are pruned lazily on the next publish.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde::Serialize;
use tokio::sync::mpsc;
use tracing::debug;

use super::session_cookie::BrowserId;
use crate::provider::{Session, User};

// =============================================================================
// EVENTS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuthEventKind {
    SignedIn,
    SignedOut,
    TokenRefreshed,
}

impl AuthEventKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::SignedIn => "SIGNED_IN",
            Self::SignedOut => "SIGNED_OUT",
            Self::TokenRefreshed => "TOKEN_REFRESHED",
        }
    }
}

/// A session change pushed to subscribers.
#[derive(Debug, Clone, PartialEq)]
pub struct AuthEvent {
    pub kind: AuthEventKind,
    pub session: Option<Session>,
}

impl AuthEvent {
    #[must_use]
    pub fn signed_in(session: Session) -> Self {
        Self { kind: AuthEventKind::SignedIn, session: Some(session) }
    }

    #[must_use]
    pub fn signed_out() -> Self {
        Self { kind: AuthEventKind::SignedOut, session: None }
    }

    #[must_use]
    pub fn token_refreshed(session: Session) -> Self {
        Self { kind: AuthEventKind::TokenRefreshed, session: Some(session) }
    }

    /// The user carried by the event's session, if any.
    #[must_use]
    pub fn user(&self) -> Option<&User> {
        self.session.as_ref().map(|s| &s.user)
    }
}

// =============================================================================
// BUS
// =============================================================================

#[derive(Default)]
struct Registry {
    next_id: u64,
    listeners: HashMap<BrowserId, HashMap<u64, mpsc::UnboundedSender<AuthEvent>>>,
}

/// Shared, cloneable handle to the registry.
#[derive(Clone, Default)]
pub struct AuthEventBus {
    inner: Arc<Mutex<Registry>>,
}

impl AuthEventBus {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn registry(&self) -> MutexGuard<'_, Registry> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a listener for `browser`.
    #[must_use]
    pub fn subscribe(&self, browser: &BrowserId) -> Subscription {
        let (tx, rx) = mpsc::unbounded_channel();
        let id = {
            let mut registry = self.registry();
            let id = registry.next_id;
            registry.next_id += 1;
            registry
                .listeners
                .entry(browser.clone())
                .or_default()
                .insert(id, tx);
            id
        };
        debug!(%browser, id, "auth subscription added");
        Subscription { id, browser: browser.clone(), bus: self.clone(), rx }
    }

    /// Deliver `event` to every live subscription of `browser`. Returns the
    /// number of subscriptions reached.
    pub fn publish(&self, browser: &BrowserId, event: &AuthEvent) -> usize {
        let mut registry = self.registry();
        let Some(listeners) = registry.listeners.get_mut(browser) else {
            return 0;
        };
        listeners.retain(|_, tx| tx.send(event.clone()).is_ok());
        let delivered = listeners.len();
        if listeners.is_empty() {
            registry.listeners.remove(browser);
        }
        debug!(%browser, kind = event.kind.as_str(), delivered, "auth event published");
        delivered
    }

    /// Number of live subscriptions for `browser`.
    #[cfg(test)]
    #[must_use]
    pub fn listener_count(&self, browser: &BrowserId) -> usize {
        self.registry()
            .listeners
            .get(browser)
            .map_or(0, HashMap::len)
    }

    fn remove(&self, browser: &BrowserId, id: u64) -> bool {
        let mut registry = self.registry();
        let Some(listeners) = registry.listeners.get_mut(browser) else {
            return false;
        };
        let removed = listeners.remove(&id).is_some();
        if listeners.is_empty() {
            registry.listeners.remove(browser);
        }
        removed
    }
}

// =============================================================================
// SUBSCRIPTION
// =============================================================================

/// A live registration on the bus. Dropping it unsubscribes.
pub struct Subscription {
    id: u64,
    browser: BrowserId,
    bus: AuthEventBus,
    rx: mpsc::UnboundedReceiver<AuthEvent>,
}

impl Subscription {
    /// Wait for the next event. `None` only if the registration was removed.
    pub async fn recv(&mut self) -> Option<AuthEvent> {
        self.rx.recv().await
    }

    /// Explicit teardown; equivalent to dropping.
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if self.bus.remove(&self.browser, self.id) {
            debug!(browser = %self.browser, id = self.id, "auth subscription removed");
        }
    }
}

#[cfg(test)]
#[path = "events_test.rs"]
mod tests;
