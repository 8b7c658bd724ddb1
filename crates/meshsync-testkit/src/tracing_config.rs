//! Tracing configuration for test output.

use std::sync::Once;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static INIT: Once = Once::new();

/// Initialize tracing for tests.
///
/// Safe to call from every test; only the first call installs a subscriber.
/// Uses `RUST_LOG` if set, otherwise `info` with meshsync crates at `debug`.
pub fn init_tracing() {
    init_tracing_with_filter(
        "info,meshsync=debug,meshsync_sync=debug,meshsync_store=debug",
    );
}

/// Initialize tracing with a specific default filter. `RUST_LOG` still wins.
pub fn init_tracing_with_filter(filter: &str) {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

        // Another test harness may have installed a global subscriber already.
        let _ = tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_test_writer()
                    .compact(),
            )
            .try_init();
    });
}
