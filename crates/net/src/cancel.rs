//! Per-resource cancellation handles
//!
//! Each active download registers a [`CancelToken`] under its resource id.
//! The registration is held by a [`Registration`] guard that removes the
//! entry when the download ends, however it ends.

use dashmap::DashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

#[derive(Debug, Default)]
struct TokenState {
    cancelled: AtomicBool,
    notify: Notify,
}

/// Cooperative cancellation flag that can also be awaited
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    state: Arc<TokenState>,
}

impl CancelToken {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the flag and wake every task waiting in [`CancelToken::cancelled`]
    pub fn cancel(&self) {
        self.state.cancelled.store(true, Ordering::SeqCst);
        self.state.notify.notify_waiters();
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.state.cancelled.load(Ordering::SeqCst)
    }

    /// Resolve once the token is cancelled
    pub async fn cancelled(&self) {
        loop {
            // Registered before the flag check so a concurrent cancel is not lost
            let notified = self.state.notify.notified();
            if self.is_cancelled() {
                return;
            }
            notified.await;
        }
    }

    /// Whether both handles refer to the same token
    #[must_use]
    pub fn same_as(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.state, &other.state)
    }
}

/// Shared map of active downloads, keyed by resource id
#[derive(Debug, Clone, Default)]
pub struct CancelRegistry {
    handles: Arc<DashMap<String, CancelToken>>,
}

impl CancelRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a fresh token for `resource_id`
    ///
    /// A token already registered under the same id is replaced; the earlier
    /// download keeps running but can no longer be cancelled by id.
    #[must_use]
    pub fn register(&self, resource_id: &str) -> Registration {
        let token = CancelToken::new();
        if self
            .handles
            .insert(resource_id.to_string(), token.clone())
            .is_some()
        {
            tracing::debug!(resource_id, "replaced existing cancellation handle");
        }

        Registration {
            handles: Arc::clone(&self.handles),
            resource_id: resource_id.to_string(),
            token,
        }
    }

    /// Cancel and deregister; returns whether a handle was present
    pub fn cancel(&self, resource_id: &str) -> bool {
        match self.handles.remove(resource_id) {
            Some((_, token)) => {
                token.cancel();
                true
            }
            None => false,
        }
    }

    #[must_use]
    pub fn is_active(&self, resource_id: &str) -> bool {
        self.handles.contains_key(resource_id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.handles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }
}

/// RAII registration of one download's cancellation handle
#[derive(Debug)]
pub struct Registration {
    handles: Arc<DashMap<String, CancelToken>>,
    resource_id: String,
    token: CancelToken,
}

impl Registration {
    #[must_use]
    pub fn token(&self) -> &CancelToken {
        &self.token
    }

    #[must_use]
    pub fn resource_id(&self) -> &str {
        &self.resource_id
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        // Only our own token; a newer download may have replaced it
        self.handles
            .remove_if(&self.resource_id, |_, token| token.same_as(&self.token));
    }
}
