//! Tracing setup.
//!
//! The subscriber must be installed before the configuration file is even
//! read, so the level filter sits behind a reload layer: startup begins at
//! `info` and [`apply_logging_level`] swaps in `logging.level` once the
//! config is parsed. An explicit `RUST_LOG` always wins and is never
//! overridden.

use std::sync::OnceLock;

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Registry, fmt, reload};

static FILTER_HANDLE: OnceLock<reload::Handle<EnvFilter, Registry>> = OnceLock::new();

/// Installs the global subscriber. Idempotent; later calls are no-ops.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let (filter, handle) = reload::Layer::new(filter);
    let _ = FILTER_HANDLE.set(handle);

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .try_init();
}

/// Replaces the startup filter with the configured logging level.
///
/// Does nothing when `RUST_LOG` is set in the environment or when
/// [`init_tracing`] has not run.
pub fn apply_logging_level(level: &str) {
    if std::env::var("RUST_LOG").is_ok() {
        return;
    }
    if let Some(handle) = FILTER_HANDLE.get() {
        let _ = handle.modify(|filter| *filter = EnvFilter::new(level));
    }
}
