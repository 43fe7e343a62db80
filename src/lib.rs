//! Shared helpers for the workspace integration tests.

/// Install a `tracing` subscriber filtered by `RUST_LOG`, once per process.
///
/// Later calls are ignored, so every test can call this.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::WARN.into()),
        )
        .with_test_writer()
        .try_init();
}
