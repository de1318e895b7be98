//! Telemetry helpers for structured logging and tracing.
//!
//! The pool logs through the `tracing` facade under the `weighted_task_pool`
//! target. Applications normally install their own subscriber; these helpers
//! exist for binaries, tests, and benches that want sensible output quickly.

use tracing_subscriber::EnvFilter;

/// Filter used when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "weighted_task_pool=info";

/// Install an env-filtered `fmt` subscriber unless one is already set.
pub fn init_tracing() {
    init_tracing_with(DEFAULT_FILTER);
}

/// Same as [`init_tracing`], falling back to `default_directive` when
/// `RUST_LOG` is unset or unparsable.
pub fn init_tracing_with(default_directive: &str) {
    if tracing::dispatcher::has_been_set() {
        return;
    }
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init();
}
