//! Development-time tracing.
//!
//! The library only emits `tracing` events: `trace` per poll tick and
//! engine query, `debug` for finished waits and performed actions, `warn`
//! when a scroll search gives up. Nothing is printed unless a subscriber is
//! installed, either by the host application or through [`init`].

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Filter used when `RUST_LOG` is unset
pub const DEFAULT_FILTER: &str = "warn";

fn filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install a stderr subscriber filtered by `RUST_LOG` (default `warn`).
///
/// Returns `false` if a global subscriber was already installed.
///
/// ```bash
/// RUST_LOG=uimatch=trace cargo test -p uimatch -- --nocapture
/// ```
pub fn init() -> bool {
    tracing_subscriber::registry()
        .with(filter())
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .try_init()
        .is_ok()
}

/// Install a subscriber that writes through the test harness's captured
/// output. Safe to call from every test.
pub fn init_for_tests() {
    let _ = tracing_subscriber::registry()
        .with(filter())
        .with(fmt::layer().with_test_writer().compact())
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repeated_init_is_harmless() {
        init_for_tests();
        init_for_tests();
        assert!(!init());
    }
}
