//! Per-handshake state carried across the OAuth redirect round trip.
//!
//! A single read-once slot per in-flight handshake, keyed by the `state`
//! nonce sent to the provider. Not general session state: the only thing
//! stashed is the caller-supplied post-login redirect target.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use uuid::Uuid;

/// Handshakes older than this are pruned; a provider round trip that takes
/// longer has failed anyway.
const HANDSHAKE_TTL: Duration = Duration::from_secs(10 * 60);

#[derive(Debug, Clone)]
pub struct PendingLogin {
    pub return_to: Option<String>,
    created_at: Instant,
}

/// In-memory store of in-flight OAuth handshakes.
#[derive(Clone, Default)]
pub struct HandshakeStore {
    inner: Arc<Mutex<HashMap<String, PendingLogin>>>,
}

impl HandshakeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stash the redirect target and return the state nonce identifying this
    /// handshake. Stale entries are pruned on the way in.
    pub fn begin(&self, return_to: Option<String>) -> String {
        let state = Uuid::new_v4().to_string();
        let mut inner = self.inner.lock().expect("handshake store poisoned");
        inner.retain(|_, pending| pending.created_at.elapsed() < HANDSHAKE_TTL);
        inner.insert(
            state.clone(),
            PendingLogin {
                return_to,
                created_at: Instant::now(),
            },
        );
        state
    }

    /// Consume the handshake for a state nonce. The entry is removed
    /// unconditionally: a second read returns `None`.
    pub fn take(&self, state: &str) -> Option<PendingLogin> {
        let mut inner = self.inner.lock().expect("handshake store poisoned");
        let pending = inner.remove(state)?;
        if pending.created_at.elapsed() >= HANDSHAKE_TTL {
            return None;
        }
        Some(pending)
    }
}
