//! Media Console - queued video playback with a live camera view.
//!
//! This is the main library crate for the media console. It owns the
//! playback-source coordinator and the capture/recording pipeline; rendering
//! and storage are plugged in through traits.

pub mod capture;
pub mod config;
pub mod console;
pub mod library;
pub mod store;
pub mod transport;
pub mod utils;

#[cfg(test)]
pub(crate) mod testing;

pub use config::ConsoleConfig;
pub use console::{ConsoleDeps, ConsoleEvent, ConsoleHandle, ConsoleSnapshot, Coordinator};
pub use utils::error::{ConsoleError, ConsoleResult};

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing/logging for an embedding application
pub fn init_tracing() {
    let _ = tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "media_console=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init();

    tracing::info!("Starting Media Console v{}", env!("CARGO_PKG_VERSION"));
}
