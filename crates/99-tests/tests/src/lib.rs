//! End-to-end suite for the transfer buffer and its scenario engine.

#[cfg(test)]
mod native_e2e;

#[cfg(test)]
pub(crate) fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    // Several tests share the process; only the first install wins.
    let _ = fmt()
        .with_env_filter(env_filter)
        .with_test_writer()
        .try_init();
}
