//! Tokio runtime spawner implementation.

use std::future::Future;

use tokio::runtime::{Handle, TryCurrentError};

use crate::core::Spawn;

/// Spawns admitted task runs onto a tokio runtime.
#[derive(Debug, Clone)]
pub struct TokioSpawner {
    handle: Handle,
}

impl TokioSpawner {
    /// Spawner bound to an explicit runtime handle.
    #[must_use]
    pub const fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Spawner bound to the runtime the caller is running on.
    ///
    /// # Errors
    ///
    /// Fails when called outside a tokio runtime.
    pub fn try_current() -> Result<Self, TryCurrentError> {
        Handle::try_current().map(Self::new)
    }
}

impl Spawn for TokioSpawner {
    fn spawn<F>(&self, fut: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        // Completion is observed through the pool's running set, not the join handle.
        drop(self.handle.spawn(fut));
    }
}
