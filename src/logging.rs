//! Process-wide log output.
//!
//! The library only emits `tracing` events. Nothing is printed until an
//! application installs a subscriber, either its own or the one from
//! [`init`].

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install a fmt subscriber filtered by `RUST_LOG`, or by `default_filter`
/// when `RUST_LOG` is unset.
///
/// Returns `false` if a global subscriber was already installed; calling
/// this more than once is harmless.
///
/// ```
/// axiomtrade_rs::logging::init("axiomtrade_rs=info");
/// ```
pub fn init(default_filter: &str) -> bool {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_filter))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .try_init()
        .is_ok()
}
