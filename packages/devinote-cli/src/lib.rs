//! Pieces every devinote binary shares: the version string, clap styling and the tracing setup.

use clap::builder::{
	Styles,
	styling::{AnsiColor, Effects},
};
use tracing_subscriber::EnvFilter;

/// `<package version>-<git sha>-<target triple>`.
pub const VERSION: &str = concat!(
	env!("CARGO_PKG_VERSION"),
	"-",
	env!("VERGEN_GIT_SHA"),
	"-",
	env!("VERGEN_CARGO_TARGET_TRIPLE"),
);
pub const FALLBACK_LOG_LEVEL: &str = "info";

pub fn styles() -> Styles {
	Styles::styled()
		.header(AnsiColor::Cyan.on_default() | Effects::BOLD)
		.usage(AnsiColor::Cyan.on_default() | Effects::BOLD)
		.literal(AnsiColor::Yellow.on_default() | Effects::BOLD)
		.placeholder(AnsiColor::Green.on_default())
		.error(AnsiColor::Red.on_default() | Effects::BOLD)
}

/// Parses `directives` as an `EnvFilter`. Blank or unparsable input falls back to
/// [`FALLBACK_LOG_LEVEL`].
pub fn env_filter(directives: &str) -> EnvFilter {
	let directives = directives.trim();

	if directives.is_empty() {
		return EnvFilter::new(FALLBACK_LOG_LEVEL);
	}

	EnvFilter::try_new(directives).unwrap_or_else(|err| {
		eprintln!("Ignoring log level {directives:?}: {err}. Using {FALLBACK_LOG_LEVEL}.");

		EnvFilter::new(FALLBACK_LOG_LEVEL)
	})
}

/// Installs the global fmt subscriber. Fails if one is already installed.
pub fn init_tracing(directives: &str) -> Result<(), String> {
	tracing_subscriber::fmt().with_env_filter(env_filter(directives)).try_init().map_err(|err| {
		format!("Failed to install tracing subscriber: {err}.")
	})
}
