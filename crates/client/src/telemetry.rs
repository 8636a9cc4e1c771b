//! Tracing subscriber setup for hosts embedding the client.

use std::fs::OpenOptions;
use std::path::PathBuf;

use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

/// Directory that switches logging from stderr to a per-process file.
pub const LOG_DIR_ENV: &str = "SWAPLINE_LOG_DIR";

/// Installs the global subscriber. `RUST_LOG` overrides the default filter.
///
/// Returns `false` when a global subscriber was already installed.
pub fn init_tracing(verbose: bool) -> bool {
	let filter = || {
		EnvFilter::try_from_default_env().unwrap_or_else(|_| {
			if verbose {
				EnvFilter::new("swapline_targeting=trace,swapline_resilience=trace,swapline_cache=trace,debug")
			} else {
				EnvFilter::new("swapline_targeting=debug,swapline_resilience=debug,info")
			}
		})
	};

	if let Some(log_dir) = std::env::var(LOG_DIR_ENV).ok().map(PathBuf::from)
		&& std::fs::create_dir_all(&log_dir).is_ok()
	{
		let log_path = log_dir.join(format!("swapline.{}.log", std::process::id()));
		if let Ok(file) = OpenOptions::new().create(true).append(true).open(&log_path) {
			let file_layer = tracing_subscriber::fmt::layer().with_writer(file).with_ansi(false).with_target(true);
			let installed = tracing_subscriber::registry().with(filter()).with(file_layer).try_init().is_ok();
			if installed {
				tracing::info!(path = ?log_path, "telemetry.file_logging");
			}
			return installed;
		}
	}

	tracing_subscriber::registry()
		.with(filter())
		.with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
		.try_init()
		.is_ok()
}
