//! Tracing initialization.

use std::sync::Once;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use crate::config::defaults::DEFAULT_LOG_FILTER;

static INIT: Once = Once::new();

/// Initialize the Muster tracing/logging system.
///
/// Reads the `MUSTER_LOG` environment variable for per-module levels, e.g.
/// `MUSTER_LOG=muster_sync=debug,muster_storage=warn`. Falls back to
/// `muster=info` if unset or invalid. Safe to call more than once.
pub fn init_tracing() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env("MUSTER_LOG")
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

        // A host application may already own the global subscriber.
        let _ = tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true),
            )
            .with(filter)
            .try_init();
    });
}

/// Whether [`init_tracing`] has run in this process.
pub fn is_initialized() -> bool {
    INIT.is_completed()
}
