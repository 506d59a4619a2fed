//! Wait Mechanisms
//!
//! Polling waits over the [`WebDriver`] boundary. Every wait probes the
//! current DOM at least once, sleeps `poll_interval` between probes and gives
//! up once its budget has elapsed:
//!
//! - element waits fail with [`StorefrontError::ElementNotFound`]
//! - hidden and URL waits fail with [`StorefrontError::Timeout`]
//!
//! A stale handle seen during a probe means the DOM changed under us and
//! counts as "not ready yet"; every other driver error ends the wait.

use std::fmt;
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

use crate::driver::{ElementHandle, WebDriver};
use crate::locator::{Locator, Readiness};
use crate::result::{StorefrontError, StorefrontResult};

// =============================================================================
// CONSTANTS
// =============================================================================

/// Default timeout for wait operations (15 seconds)
pub const DEFAULT_WAIT_TIMEOUT_MS: u64 = 15_000;

/// Default polling interval (250ms)
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 250;

// =============================================================================
// WAIT OPTIONS
// =============================================================================

/// Options for wait operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitOptions {
    /// Timeout in milliseconds
    pub timeout_ms: u64,
    /// Polling interval in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for WaitOptions {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_WAIT_TIMEOUT_MS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
        }
    }
}

impl WaitOptions {
    /// Create new wait options with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Options from a budget and poll interval
    #[must_use]
    pub fn from_durations(timeout: Duration, poll_interval: Duration) -> Self {
        Self {
            timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
            poll_interval_ms: u64::try_from(poll_interval.as_millis()).unwrap_or(u64::MAX),
        }
    }

    /// Set timeout in milliseconds
    #[must_use]
    pub const fn with_timeout(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Set polling interval in milliseconds
    #[must_use]
    pub const fn with_poll_interval(mut self, poll_interval_ms: u64) -> Self {
        self.poll_interval_ms = poll_interval_ms;
        self
    }

    /// Get timeout as Duration
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Get poll interval as Duration
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

// =============================================================================
// URL PATTERN
// =============================================================================

/// Pattern for matching the session URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlPattern {
    /// Exact URL match
    Exact(String),
    /// Contains substring
    Contains(String),
    /// Prefix match
    Prefix(String),
}

impl UrlPattern {
    /// Check if a URL matches this pattern
    #[must_use]
    pub fn matches(&self, url: &str) -> bool {
        match self {
            Self::Exact(pattern) => url == pattern,
            Self::Contains(pattern) => url.contains(pattern.as_str()),
            Self::Prefix(pattern) => url.starts_with(pattern.as_str()),
        }
    }
}

impl fmt::Display for UrlPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(p) => write!(f, "URL equal to {p}"),
            Self::Contains(p) => write!(f, "URL containing {p}"),
            Self::Prefix(p) => write!(f, "URL starting with {p}"),
        }
    }
}

// =============================================================================
// WAITER IMPLEMENTATION
// =============================================================================

/// Waiter for synchronization operations against one driver
#[derive(Debug, Clone, Copy)]
pub struct Waiter<'a> {
    driver: &'a dyn WebDriver,
    options: WaitOptions,
}

impl<'a> Waiter<'a> {
    /// Create a waiter over `driver`
    #[must_use]
    pub const fn new(driver: &'a dyn WebDriver, options: WaitOptions) -> Self {
        Self { driver, options }
    }

    /// Options in use
    #[must_use]
    pub const fn options(&self) -> WaitOptions {
        self.options
    }

    /// First element matching `locator` that satisfies `mode`
    pub async fn for_element(
        &self,
        locator: &Locator,
        mode: Readiness,
    ) -> StorefrontResult<ElementHandle> {
        let found = self
            .poll(|| probe_element(self.driver, locator, mode))
            .await?;
        found.ok_or_else(|| StorefrontError::ElementNotFound {
            locator: locator.to_string(),
            mode,
            ms: self.options.timeout_ms,
        })
    }

    /// All elements matching `locator`, once at least one is present
    pub async fn for_all(&self, locator: &Locator) -> StorefrontResult<Vec<ElementHandle>> {
        let found = self
            .poll(move || async move {
                let handles = self.driver.find_elements(locator).await?;
                Ok((!handles.is_empty()).then_some(handles))
            })
            .await?;
        found.ok_or_else(|| StorefrontError::ElementNotFound {
            locator: locator.to_string(),
            mode: Readiness::Present,
            ms: self.options.timeout_ms,
        })
    }

    /// Wait until no element matching `locator` is displayed
    pub async fn until_hidden(&self, locator: &Locator) -> StorefrontResult<()> {
        let hidden = self
            .poll(|| probe_hidden(self.driver, locator))
            .await?;
        hidden.ok_or_else(|| StorefrontError::Timeout {
            waited_for: format!("{locator} to be hidden"),
            ms: self.options.timeout_ms,
        })
    }

    /// Wait until the current URL matches `pattern`; returns the URL
    pub async fn for_url(&self, pattern: &UrlPattern) -> StorefrontResult<String> {
        let url = self
            .poll(move || async move {
                let url = self.driver.current_url().await?;
                Ok(pattern.matches(&url).then_some(url))
            })
            .await?;
        url.ok_or_else(|| StorefrontError::Timeout {
            waited_for: pattern.to_string(),
            ms: self.options.timeout_ms,
        })
    }

    async fn poll<T, F, Fut>(&self, mut probe: F) -> StorefrontResult<Option<T>>
    where
        F: FnMut() -> Fut,
        Fut: std::future::Future<Output = StorefrontResult<Option<T>>>,
    {
        let start = Instant::now();
        let timeout = self.options.timeout();
        let mut attempts = 0_u32;
        loop {
            attempts += 1;
            if let Some(value) = probe().await? {
                debug!(attempts, elapsed = ?start.elapsed(), "wait satisfied");
                return Ok(Some(value));
            }
            let elapsed = start.elapsed();
            if elapsed >= timeout {
                debug!(attempts, timeout_ms = self.options.timeout_ms, "wait budget spent");
                return Ok(None);
            }
            tokio::time::sleep(self.options.poll_interval().min(timeout - elapsed)).await;
        }
    }
}

async fn probe_element(
    driver: &dyn WebDriver,
    locator: &Locator,
    mode: Readiness,
) -> StorefrontResult<Option<ElementHandle>> {
    let handles = driver.find_elements(locator).await?;
    if mode == Readiness::Present {
        return Ok(handles.into_iter().next());
    }
    for handle in handles {
        let state = match driver.element_state(&handle).await {
            Ok(state) => state,
            Err(StorefrontError::StaleElement { element }) => {
                debug!(%element, "stale during probe");
                continue;
            }
            Err(e) => return Err(e),
        };
        let ready = match mode {
            Readiness::Present => true,
            Readiness::Visible => state.displayed,
            Readiness::Clickable => state.displayed && state.enabled,
        };
        if ready {
            return Ok(Some(handle));
        }
    }
    Ok(None)
}

async fn probe_hidden(driver: &dyn WebDriver, locator: &Locator) -> StorefrontResult<Option<()>> {
    for handle in driver.find_elements(locator).await? {
        match driver.element_state(&handle).await {
            Ok(state) if state.displayed => return Ok(None),
            Ok(_) | Err(StorefrontError::StaleElement { .. }) => {}
            Err(e) => return Err(e),
        }
    }
    Ok(Some(()))
}
