use tracing_subscriber::EnvFilter;

/// Engine-level constants
pub const ENGINE_NAME: &str = "lines-interpreter";
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Version of the catalogue, weight table and calibration constants.
pub const MODEL_VERSION: &str = "1.0.0";

/// Filter used when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "lines_interpreter=info"
}

/// Install the fmt subscriber. A second call is a no-op.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_log_filter())),
        )
        .try_init();
}
