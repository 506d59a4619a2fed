//! Log subscriber setup.
//!
//! Journeys log through `tracing`; nothing is printed until a subscriber is
//! installed. [`init_logging`] installs one driven by `RUST_LOG` (default
//! `info`) and `STOREFRONT_LOG_FORMAT` (`json` or human-readable text).

use tracing_subscriber::EnvFilter;

/// Environment variable selecting the output format
pub const LOG_FORMAT_ENV: &str = "STOREFRONT_LOG_FORMAT";

/// Output format of the log subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per event
    Json,
}

impl LogFormat {
    /// Parse a format name; unknown names fall back to text
    #[must_use]
    pub fn parse(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("json") {
            Self::Json
        } else {
            Self::Text
        }
    }

    /// Format requested by the environment
    #[must_use]
    pub fn from_env() -> Self {
        std::env::var(LOG_FORMAT_ENV).map_or(Self::Text, |v| Self::parse(&v))
    }
}

/// Install the global subscriber in the format the environment asks for.
///
/// Returns `false` when a subscriber was already installed, so every test
/// can call it.
pub fn init_logging() -> bool {
    init_logging_with(LogFormat::from_env())
}

/// Install the global subscriber in `format`
pub fn init_logging_with(format: LogFormat) -> bool {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_test_writer();
    let installed = match format {
        LogFormat::Text => builder.try_init().is_ok(),
        LogFormat::Json => builder.json().try_init().is_ok(),
    };
    if installed {
        tracing::debug!(?format, "logging initialised");
    }
    installed
}
