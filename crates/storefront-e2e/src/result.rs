//! Result and error types for storefront journeys.

use thiserror::Error;

use crate::locator::Readiness;

/// Result type for storefront operations
pub type StorefrontResult<T> = Result<T, StorefrontError>;

/// Errors that can occur while driving the storefront
#[derive(Debug, Error)]
pub enum StorefrontError {
    /// Browser launch error
    #[error("Failed to launch browser: {message}")]
    BrowserLaunchError {
        /// Error message
        message: String,
    },

    /// Navigation error
    #[error("Navigation to {url} failed: {message}")]
    NavigationError {
        /// URL that failed
        url: String,
        /// Error message
        message: String,
    },

    /// A required element never reached the required readiness state
    #[error("Element {locator} not {mode} after {ms}ms")]
    ElementNotFound {
        /// Locator description
        locator: String,
        /// Readiness mode that was awaited
        mode: Readiness,
        /// Wait budget in milliseconds
        ms: u64,
    },

    /// A non-element condition timed out
    #[error("Timed out after {ms}ms waiting for {waited_for}")]
    Timeout {
        /// What was waited for
        waited_for: String,
        /// Timeout in milliseconds
        ms: u64,
    },

    /// Element handle no longer refers to a node in the current DOM
    #[error("Stale element reference: {element}")]
    StaleElement {
        /// Element description
        element: String,
    },

    /// Script execution error
    #[error("Script execution failed: {message}")]
    ScriptError {
        /// Error message
        message: String,
    },

    /// Input simulation error
    #[error("Input simulation failed: {message}")]
    InputError {
        /// Error message
        message: String,
    },

    /// Screenshot error
    #[error("Screenshot failed: {message}")]
    ScreenshotError {
        /// Error message
        message: String,
    },

    /// Journey-level semantic check failed
    #[error("Assertion failed: {message}")]
    AssertionFailed {
        /// Error message
        message: String,
    },

    /// Fixture error (setup/teardown failed)
    #[error("Fixture error: {message}")]
    FixtureError {
        /// Error message
        message: String,
    },

    /// Invalid configuration value
    #[error("Invalid configuration {key}: {message}")]
    Config {
        /// Configuration key
        key: String,
        /// Error message
        message: String,
    },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StorefrontError {
    /// Whether this error is a wait budget running out.
    ///
    /// Best-effort call sites soften only these; everything else stays fatal.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::ElementNotFound { .. } | Self::Timeout { .. })
    }

    /// Whether this error is a journey assertion rather than a breakage
    #[must_use]
    pub const fn is_assertion(&self) -> bool {
        matches!(self, Self::AssertionFailed { .. })
    }

    /// Build an assertion failure
    #[must_use]
    pub fn assertion(message: impl Into<String>) -> Self {
        Self::AssertionFailed {
            message: message.into(),
        }
    }
}
