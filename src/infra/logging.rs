//! Structured logging setup.

use tracing_subscriber::EnvFilter;

/// Installs the global subscriber. `RUST_LOG` wins when set; otherwise the
/// level is `info`, or `debug` with `--verbose`. Logs go to stderr so they do
/// not mix with command output.
pub fn init(verbose: bool) {
    let default = if verbose { "tarif_desk=debug" } else { "tarif_desk=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}
