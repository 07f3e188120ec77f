//! Tracing subscriber setup.

use std::sync::Once;

use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Install the global tracing subscriber.
///
/// Filter comes from `MEDTWIN_LOG` (falling back to `info`). Safe to call
/// more than once; only the first call installs anything.
pub fn init() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_env("MEDTWIN_LOG")
            .unwrap_or_else(|_| EnvFilter::new("info"));
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .init();
    });
}
