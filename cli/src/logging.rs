use color_eyre::eyre::{eyre, Result};
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "info";

/// Logs go to stderr so stdout only carries the tracker's own messages.
/// `RUST_LOG` overrides the default filter.
pub fn init() -> Result<()> {
	let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));
	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(std::io::stderr)
		.with_target(false)
		.try_init()
		.map_err(|err| eyre!("failed to install log subscriber: {err}"))
}
