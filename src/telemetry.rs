//! Logging setup used by this crate's own tests/doctests. A consuming binary
//! is expected to install its own subscriber; this crate never calls
//! `.init()` outside of `#[cfg(test)]`.

use tracing_subscriber::EnvFilter;

pub fn init_default() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn,organizer_core=info")),
        )
        .with_test_writer()
        .try_init();
}
