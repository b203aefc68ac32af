//! Live-instance bookkeeping.
//!
//! A [`Registry`] counts the objects that are currently alive. Every
//! object embeds a [`Registration`] obtained from the registry; creating
//! the registration increments the count and dropping it decrements the
//! count, so the number stays exact no matter how or in which order
//! objects are destroyed (including when a container is cleared).

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Shared counter of live objects.
///
/// Cloning a registry yields another handle to the same counter.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    live: Arc<AtomicUsize>,
}

impl Registry {
    /// Create a registry with no live objects.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of constructed-but-not-yet-dropped objects.
    pub fn live(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }

    /// Whether every registered object has been dropped.
    pub fn is_drained(&self) -> bool {
        self.live() == 0
    }

    /// Register a new object.
    pub fn register(&self) -> Registration {
        let live = self.live.fetch_add(1, Ordering::SeqCst) + 1;
        tracing::trace!(live, "object registered");
        Registration {
            registry: self.clone(),
        }
    }

    /// Whether both handles share one counter.
    pub fn same_as(&self, other: &Registry) -> bool {
        Arc::ptr_eq(&self.live, &other.live)
    }
}

/// Proof of registration held by a live object.
///
/// Not `Clone`: a copy of an object must register itself again.
#[derive(Debug)]
pub struct Registration {
    registry: Registry,
}

impl Registration {
    /// The registry this object is counted in.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }
}

impl Drop for Registration {
    fn drop(&mut self) {
        let live = self.registry.live.fetch_sub(1, Ordering::SeqCst) - 1;
        tracing::trace!(live, "object released");
    }
}
