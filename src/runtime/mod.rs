//! Runtime adapters for spawning admitted tasks.

pub mod tokio_spawner;

pub use tokio_spawner::TokioSpawner;
