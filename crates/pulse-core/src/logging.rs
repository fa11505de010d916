use tracing_subscriber::EnvFilter;

/// Install the JSON log subscriber on stderr.
///
/// `RUST_LOG` takes precedence; otherwise only errors are shown when `quiet`
/// and info-level events otherwise. Calling this more than once is harmless.
pub fn init_logging(quiet: bool) {
    let default_directive = if quiet { "error" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    let _ = tracing_subscriber::fmt()
        .json()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
