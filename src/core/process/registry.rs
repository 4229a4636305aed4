// lerna-rs: Lerna child-process core - Rust Port
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Live-child bookkeeping and the "all children exited" notification.
//!
//! ```text
//! register() --> live += 1 --> Registration (one-shot latch)
//!
//! Registration::finish()      (idempotent; also on drop)
//!   live -= 1
//!   live == 0 ? --> caller runs completion sink
//!                   announce_empty()
//!                     spawn: yield_now()
//!                            on_all_exited callbacks
//!                            broadcast subscribers
//! ```

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock, RwLock};

use tokio::sync::broadcast;
use tracing::trace;

/// Process-wide registry used by [`super::Launcher::global`].
static GLOBAL_REGISTRY: OnceLock<ChildRegistry> = OnceLock::new();

type Listener = Arc<dyn Fn() + Send + Sync>;

/// Counts live children and notifies subscribers whenever the count drops
/// to zero.
///
/// Cloning is cheap; clones share the same counter and subscribers.
#[derive(Clone)]
pub struct ChildRegistry {
    inner: Arc<RegistryInner>,
}

struct RegistryInner {
    live: AtomicUsize,
    listeners: RwLock<Vec<Listener>>,
    empty_tx: broadcast::Sender<()>,
}

impl std::fmt::Debug for ChildRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChildRegistry")
            .field("live", &self.live_count())
            .finish_non_exhaustive()
    }
}

impl Default for ChildRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ChildRegistry {
    /// Creates an isolated registry.
    #[must_use]
    pub fn new() -> Self {
        let (empty_tx, _) = broadcast::channel(16);
        Self {
            inner: Arc::new(RegistryInner {
                live: AtomicUsize::new(0),
                listeners: RwLock::new(Vec::new()),
                empty_tx,
            }),
        }
    }

    /// Returns the process-wide registry.
    pub fn global() -> &'static Self {
        GLOBAL_REGISTRY.get_or_init(Self::new)
    }

    /// Returns the number of children registered but not yet finished.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.inner.live.load(Ordering::Acquire)
    }

    /// Registers a callback fired every time the live count returns to zero.
    pub fn on_all_exited<F>(&self, callback: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.inner
            .listeners
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .push(Arc::new(callback));
    }

    /// Subscribes to the "all exited" broadcast.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.inner.empty_tx.subscribe()
    }

    /// Resolves once no child is live.
    ///
    /// Returns immediately if nothing is running, otherwise waits for the
    /// next "all exited" broadcast.
    pub async fn wait_idle(&self) {
        let mut rx = self.subscribe();
        if self.live_count() == 0 {
            return;
        }
        // Lagged still means an empty broadcast happened
        let _ = rx.recv().await;
    }

    /// Counts a new child as live.
    #[must_use]
    pub fn register(&self) -> Registration {
        let live = self.inner.live.fetch_add(1, Ordering::AcqRel) + 1;
        trace!(live, "child registered");
        Registration {
            registry: self.clone(),
            accounted_for: AtomicBool::new(false),
        }
    }

    /// Schedules the "all exited" broadcast.
    ///
    /// Yields to the scheduler once first, so completion work tied to the
    /// final exit runs before subscribers observe the empty state. Outside a
    /// Tokio runtime the broadcast happens immediately.
    pub fn announce_empty(&self) {
        let registry = self.clone();
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    tokio::task::yield_now().await;
                    registry.broadcast_empty();
                });
            }
            Err(_) => registry.broadcast_empty(),
        }
    }

    fn broadcast_empty(&self) {
        trace!(live = self.live_count(), "all children exited");

        // Snapshot so callbacks may subscribe again without deadlocking
        let listeners: Vec<Listener> = self
            .inner
            .listeners
            .read()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .clone();
        for listener in listeners {
            listener();
        }
        let _ = self.inner.empty_tx.send(());
    }

    /// Decrements the counter, returning true if it reached zero.
    fn release(&self) -> bool {
        let previous = self.inner.live.fetch_sub(1, Ordering::AcqRel);
        trace!(live = previous - 1, "child finished");
        previous == 1
    }
}

/// One-shot de-registration latch for a single child.
///
/// Finishing twice (for example after both a wait error and an exit) only
/// decrements once. Dropping an unfinished registration finishes it and
/// announces the empty state if needed.
#[derive(Debug)]
pub struct Registration {
    registry: ChildRegistry,
    accounted_for: AtomicBool,
}

impl Registration {
    /// Marks the child as finished.
    ///
    /// Returns true if this call brought the live count to zero; the caller
    /// then runs its completion sink and calls
    /// [`ChildRegistry::announce_empty`].
    pub fn finish(&self) -> bool {
        if self.accounted_for.swap(true, Ordering::AcqRel) {
            return false;
        }
        self.registry.release()
    }

    /// Returns true once [`finish`](Self::finish) has run.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.accounted_for.load(Ordering::Acquire)
    }

    /// Returns the registry this child is counted in.
    #[must_use]
    pub const fn registry(&self) -> &ChildRegistry {
        &self.registry
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        if self.finish() {
            self.registry.announce_empty();
        }
    }
}
