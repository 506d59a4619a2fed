//! Session - the page context shared by page objects.
//!
//! A [`Session`] bundles the browser handle, the per-session
//! [`SuiteConfig`] and the journey's [`Reporter`]. Cloning it clones the
//! handle, not the browser; the fixture that created it owns shutdown.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::config::{Routes, SuiteConfig, WaitBudget};
use crate::driver::{ElementHandle, WebDriver};
use crate::locator::{Locator, Readiness};
use crate::reporter::{Reporter, PNG};
use crate::result::StorefrontResult;
use crate::wait::{UrlPattern, WaitOptions, Waiter};

/// Scroll the document to its bottom edge
pub const SCROLL_TO_BOTTOM: &str = "window.scrollTo(0, document.body.scrollHeight);";

/// Scroll the first argument into view
pub const SCROLL_INTO_VIEW: &str = "arguments[0].scrollIntoView();";

/// Click the first argument from script, bypassing overlays
pub const FORCE_CLICK: &str = "arguments[0].click();";

/// Browser session handle
#[derive(Debug, Clone)]
pub struct Session {
    driver: Arc<dyn WebDriver>,
    config: Arc<SuiteConfig>,
    reporter: Reporter,
}

impl Session {
    /// Bind a driver, configuration and reporter
    #[must_use]
    pub fn new(driver: Arc<dyn WebDriver>, config: Arc<SuiteConfig>, reporter: Reporter) -> Self {
        Self {
            driver,
            config,
            reporter,
        }
    }

    /// Underlying driver
    #[must_use]
    pub fn driver(&self) -> &dyn WebDriver {
        self.driver.as_ref()
    }

    /// Session configuration
    #[must_use]
    pub fn config(&self) -> &SuiteConfig {
        &self.config
    }

    /// Target routes
    #[must_use]
    pub fn routes(&self) -> &Routes {
        &self.config.routes
    }

    /// Wait budgets
    #[must_use]
    pub fn waits(&self) -> &WaitBudget {
        &self.config.waits
    }

    /// Journey reporter
    #[must_use]
    pub const fn reporter(&self) -> &Reporter {
        &self.reporter
    }

    /// Waiter with the given budget and the session poll interval
    #[must_use]
    pub fn waiter(&self, budget: Duration) -> Waiter<'_> {
        Waiter::new(
            self.driver(),
            WaitOptions::from_durations(budget, self.waits().poll_interval),
        )
    }

    /// Waiter with the primary budget
    #[must_use]
    pub fn primary(&self) -> Waiter<'_> {
        self.waiter(self.waits().primary)
    }

    /// Waiter with the secondary budget
    #[must_use]
    pub fn secondary(&self) -> Waiter<'_> {
        self.waiter(self.waits().secondary)
    }

    /// Run `body` as a reporter step
    pub async fn step<T, F>(&self, name: impl Into<String>, body: F) -> StorefrontResult<T>
    where
        F: Future<Output = StorefrontResult<T>>,
    {
        self.reporter.step(name, body).await
    }

    /// Load `url`
    pub async fn navigate(&self, url: &str) -> StorefrontResult<()> {
        debug!(url, "navigate");
        self.driver.navigate(url).await
    }

    /// Current URL
    pub async fn current_url(&self) -> StorefrontResult<String> {
        self.driver.current_url().await
    }

    /// Wait with the primary budget until the URL matches `pattern`
    pub async fn wait_for_url(&self, pattern: &UrlPattern) -> StorefrontResult<String> {
        self.primary().for_url(pattern).await
    }

    /// Wait with the primary budget for an element in `mode`
    pub async fn wait_for(&self, locator: &Locator, mode: Readiness) -> StorefrontResult<ElementHandle> {
        self.primary().for_element(locator, mode).await
    }

    /// Direct lookup honouring the implicit wait.
    ///
    /// Retries an empty result until the implicit budget elapses, then
    /// returns whatever matched (possibly nothing).
    pub async fn find_elements(&self, locator: &Locator) -> StorefrontResult<Vec<ElementHandle>> {
        match self.waiter(self.waits().implicit).for_all(locator).await {
            Err(e) if e.is_timeout() => Ok(Vec::new()),
            other => other,
        }
    }

    /// Descendants of `parent` matching `locator`
    pub async fn find_children(
        &self,
        parent: &ElementHandle,
        locator: &Locator,
    ) -> StorefrontResult<Vec<ElementHandle>> {
        self.driver.find_child_elements(parent, locator).await
    }

    /// Visible text
    pub async fn text(&self, element: &ElementHandle) -> StorefrontResult<String> {
        self.driver.text(element).await
    }

    /// Click
    pub async fn click(&self, element: &ElementHandle) -> StorefrontResult<()> {
        self.driver.click(element).await
    }

    /// Hover
    pub async fn hover(&self, element: &ElementHandle) -> StorefrontResult<()> {
        self.driver.hover(element).await
    }

    /// Replace an input's value
    pub async fn fill(&self, element: &ElementHandle, text: &str) -> StorefrontResult<()> {
        self.driver.clear(element).await?;
        self.driver.send_keys(element, text).await
    }

    /// Type without clearing
    pub async fn type_text(&self, element: &ElementHandle, text: &str) -> StorefrontResult<()> {
        self.driver.send_keys(element, text).await
    }

    /// Click through script
    pub async fn force_click(&self, element: &ElementHandle) -> StorefrontResult<()> {
        self.driver
            .execute_script(FORCE_CLICK, std::slice::from_ref(element))
            .await
            .map(drop)
    }

    /// Scroll `element` into view
    pub async fn scroll_into_view(&self, element: &ElementHandle) -> StorefrontResult<()> {
        self.driver
            .execute_script(SCROLL_INTO_VIEW, std::slice::from_ref(element))
            .await
            .map(drop)
    }

    /// Scroll to the bottom of the document
    pub async fn scroll_to_bottom(&self) -> StorefrontResult<()> {
        self.driver.execute_script(SCROLL_TO_BOTTOM, &[]).await.map(drop)
    }

    /// Capture the viewport and attach it under `name`
    pub async fn screenshot(&self, name: &str) -> StorefrontResult<()> {
        let png = self.driver.screenshot().await?;
        self.reporter.attach(name, png, PNG);
        Ok(())
    }

    /// Pause for the settle period
    pub async fn settle(&self) {
        pause(self.waits().settle).await;
    }

    /// Pause for the short settle period
    pub async fn short_settle(&self) {
        pause(self.waits().short_settle).await;
    }
}

async fn pause(duration: Duration) {
    if !duration.is_zero() {
        tokio::time::sleep(duration).await;
    }
}
