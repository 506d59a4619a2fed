//! Suite configuration.
//!
//! Everything a journey needs to know about its environment lives in one
//! [`SuiteConfig`] owned by the session, so journeys with different budgets
//! or targets can run side by side.

use std::path::PathBuf;
use std::time::Duration;

use crate::browser::BrowserConfig;
use crate::result::{StorefrontError, StorefrontResult};

/// Default storefront entry point
pub const DEFAULT_BASE_URL: &str = "https://demo-opencart.ru/index.php";

/// Primary wait budget (15 seconds)
pub const PRIMARY_WAIT_MS: u64 = 15_000;

/// Secondary wait budget for cleanup checks (5 seconds)
pub const SECONDARY_WAIT_MS: u64 = 5_000;

/// Settle period after navigation (2 seconds)
pub const SETTLE_MS: u64 = 2_000;

/// Settle period after hover or scroll (1 second)
pub const SHORT_SETTLE_MS: u64 = 1_000;

/// Polling interval between DOM probes
pub const POLL_INTERVAL_MS: u64 = 250;

/// Implicit lookup wait for direct element queries (10 seconds)
pub const IMPLICIT_WAIT_MS: u64 = 10_000;

/// Wait and settle budgets for one session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WaitBudget {
    /// Budget for precondition waits
    pub primary: Duration,
    /// Budget for secondary/cleanup waits
    pub secondary: Duration,
    /// Pause after navigation for initial render
    pub settle: Duration,
    /// Pause after hover, scroll or menu interactions
    pub short_settle: Duration,
    /// Delay between probes
    pub poll_interval: Duration,
    /// How long direct lookups keep retrying an empty result
    pub implicit: Duration,
}

impl Default for WaitBudget {
    fn default() -> Self {
        Self {
            primary: Duration::from_millis(PRIMARY_WAIT_MS),
            secondary: Duration::from_millis(SECONDARY_WAIT_MS),
            settle: Duration::from_millis(SETTLE_MS),
            short_settle: Duration::from_millis(SHORT_SETTLE_MS),
            poll_interval: Duration::from_millis(POLL_INTERVAL_MS),
            implicit: Duration::from_millis(IMPLICIT_WAIT_MS),
        }
    }
}

impl WaitBudget {
    /// Budgets scaled down for in-memory storefronts
    #[must_use]
    pub const fn instant() -> Self {
        Self {
            primary: Duration::from_millis(200),
            secondary: Duration::from_millis(100),
            settle: Duration::ZERO,
            short_settle: Duration::ZERO,
            poll_interval: Duration::from_millis(5),
            implicit: Duration::ZERO,
        }
    }

    /// Set the primary budget
    #[must_use]
    pub const fn with_primary(mut self, primary: Duration) -> Self {
        self.primary = primary;
        self
    }

    /// Set the secondary budget
    #[must_use]
    pub const fn with_secondary(mut self, secondary: Duration) -> Self {
        self.secondary = secondary;
        self
    }

    /// Set the implicit lookup wait
    #[must_use]
    pub const fn with_implicit(mut self, implicit: Duration) -> Self {
        self.implicit = implicit;
        self
    }
}

/// Target application routes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Routes {
    base_url: String,
}

impl Routes {
    /// Success-route marker checked after registration
    pub const ACCOUNT_SUCCESS: &'static str = "route=account/success";

    /// Create routes rooted at `base_url`
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
        }
    }

    /// Base URL
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// URL for an arbitrary `route=` value
    #[must_use]
    pub fn route(&self, route: &str) -> String {
        format!("{}?route={route}", self.base_url)
    }

    /// Home page
    #[must_use]
    pub fn home(&self) -> String {
        self.route("common/home")
    }

    /// Registration form
    #[must_use]
    pub fn register(&self) -> String {
        self.route("account/register")
    }

    /// Registration success page
    #[must_use]
    pub fn account_success(&self) -> String {
        self.route("account/success")
    }

    /// Wishlist
    #[must_use]
    pub fn wishlist(&self) -> String {
        self.route("account/wishlist")
    }

    /// Search results for `query`
    #[must_use]
    pub fn search(&self, query: &str) -> String {
        format!(
            "{}&search={}",
            self.route("product/search"),
            urlencoding::encode(query)
        )
    }

    /// Category listing for a category path such as `20_26`
    #[must_use]
    pub fn category(&self, path: &str) -> String {
        format!("{}&path={path}", self.route("product/category"))
    }
}

impl Default for Routes {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

/// Configuration for one journey's session
#[derive(Debug, Clone)]
pub struct SuiteConfig {
    /// Storefront routes
    pub routes: Routes,
    /// Browser launch settings
    pub browser: BrowserConfig,
    /// Wait budgets
    pub waits: WaitBudget,
    /// Directory for Allure-compatible results (None = keep in memory)
    pub report_dir: Option<PathBuf>,
}

impl Default for SuiteConfig {
    fn default() -> Self {
        Self {
            routes: Routes::default(),
            browser: BrowserConfig::default(),
            waits: WaitBudget::default(),
            report_dir: None,
        }
    }
}

impl SuiteConfig {
    /// Create a config with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load overrides from `STOREFRONT_*` environment variables
    pub fn from_env() -> StorefrontResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load overrides through an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> StorefrontResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(url) = lookup("STOREFRONT_BASE_URL") {
            config.routes = Routes::new(url);
        }
        if let Some(value) = lookup("STOREFRONT_HEADLESS") {
            config.browser.headless = parse_bool("STOREFRONT_HEADLESS", &value)?;
        }
        if let Some(value) = lookup("STOREFRONT_NO_SANDBOX") {
            config.browser.sandbox = !parse_bool("STOREFRONT_NO_SANDBOX", &value)?;
        }
        if let Some(path) = lookup("CHROMIUM_PATH") {
            config.browser.chromium_path = Some(path);
        }
        if let Some(dir) = lookup("STOREFRONT_REPORT_DIR") {
            config.report_dir = Some(PathBuf::from(dir));
        }
        if let Some(value) = lookup("STOREFRONT_PRIMARY_WAIT_MS") {
            let ms = value.parse::<u64>().map_err(|e| StorefrontError::Config {
                key: "STOREFRONT_PRIMARY_WAIT_MS".to_string(),
                message: e.to_string(),
            })?;
            config.waits.primary = Duration::from_millis(ms);
        }

        Ok(config)
    }

    /// Set the base URL
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.routes = Routes::new(url);
        self
    }

    /// Set browser settings
    #[must_use]
    pub fn with_browser(mut self, browser: BrowserConfig) -> Self {
        self.browser = browser;
        self
    }

    /// Set wait budgets
    #[must_use]
    pub fn with_waits(mut self, waits: WaitBudget) -> Self {
        self.waits = waits;
        self
    }

    /// Persist journey outcomes under `dir`
    #[must_use]
    pub fn with_report_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.report_dir = Some(dir.into());
        self
    }
}

fn parse_bool(key: &str, value: &str) -> StorefrontResult<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(StorefrontError::Config {
            key: key.to_string(),
            message: format!("expected a boolean, got {other:?}"),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    mod wait_budget_tests {
        use super::*;

        #[test]
        fn test_defaults() {
            let waits = WaitBudget::default();
            assert_eq!(waits.primary, Duration::from_secs(15));
            assert_eq!(waits.secondary, Duration::from_secs(5));
            assert_eq!(waits.settle, Duration::from_secs(2));
            assert_eq!(waits.short_settle, Duration::from_secs(1));
            assert_eq!(waits.implicit, Duration::from_secs(10));
        }

        #[test]
        fn test_builders() {
            let waits = WaitBudget::instant()
                .with_primary(Duration::from_millis(50))
                .with_secondary(Duration::from_millis(20))
                .with_implicit(Duration::from_millis(30));
            assert_eq!(waits.primary, Duration::from_millis(50));
            assert_eq!(waits.secondary, Duration::from_millis(20));
            assert_eq!(waits.implicit, Duration::from_millis(30));
            assert_eq!(waits.settle, Duration::ZERO);
        }
    }

    mod routes_tests {
        use super::*;

        #[test]
        fn test_fixed_routes() {
            let routes = Routes::default();
            assert_eq!(
                routes.home(),
                "https://demo-opencart.ru/index.php?route=common/home"
            );
            assert_eq!(
                routes.wishlist(),
                "https://demo-opencart.ru/index.php?route=account/wishlist"
            );
            assert!(routes.account_success().contains(Routes::ACCOUNT_SUCCESS));
        }

        #[test]
        fn test_search_encodes_query() {
            let routes = Routes::new("http://shop.test/index.php");
            assert_eq!(
                routes.search("iPhone"),
                "http://shop.test/index.php?route=product/search&search=iPhone"
            );
            assert!(routes.search("Nikon D300").ends_with("search=Nikon%20D300"));
        }

        #[test]
        fn test_category() {
            let routes = Routes::new("http://shop.test/index.php");
            assert_eq!(
                routes.category("20_26"),
                "http://shop.test/index.php?route=product/category&path=20_26"
            );
        }
    }

    mod env_tests {
        use super::*;

        #[test]
        fn test_empty_lookup_keeps_defaults() {
            let config = SuiteConfig::from_lookup(|_| None).unwrap();
            assert_eq!(config.routes, Routes::default());
            assert!(config.browser.headless);
            assert!(config.report_dir.is_none());
        }

        #[test]
        fn test_overrides() {
            let config = SuiteConfig::from_lookup(lookup_from(&[
                ("STOREFRONT_BASE_URL", "http://localhost:8080/index.php"),
                ("STOREFRONT_HEADLESS", "false"),
                ("STOREFRONT_NO_SANDBOX", "1"),
                ("CHROMIUM_PATH", "/usr/bin/chromium"),
                ("STOREFRONT_REPORT_DIR", "target/allure-results"),
                ("STOREFRONT_PRIMARY_WAIT_MS", "30000"),
            ]))
            .unwrap();

            assert_eq!(config.routes.base_url(), "http://localhost:8080/index.php");
            assert!(!config.browser.headless);
            assert!(!config.browser.sandbox);
            assert_eq!(config.browser.chromium_path.as_deref(), Some("/usr/bin/chromium"));
            assert_eq!(config.report_dir, Some(PathBuf::from("target/allure-results")));
            assert_eq!(config.waits.primary, Duration::from_secs(30));
        }

        #[test]
        fn test_invalid_bool_rejected() {
            let err = SuiteConfig::from_lookup(lookup_from(&[("STOREFRONT_HEADLESS", "maybe")]))
                .unwrap_err();
            assert!(matches!(err, StorefrontError::Config { ref key, .. } if key == "STOREFRONT_HEADLESS"));
        }

        #[test]
        fn test_invalid_wait_rejected() {
            let err =
                SuiteConfig::from_lookup(lookup_from(&[("STOREFRONT_PRIMARY_WAIT_MS", "soon")]))
                    .unwrap_err();
            assert!(matches!(err, StorefrontError::Config { .. }));
        }
    }
}
