//! Browser control for headless testing.
//!
//! When compiled with the `browser` feature, [`ChromiumDriver`] drives a real
//! Chromium over the Chrome `DevTools` Protocol via chromiumoxide. Without the
//! feature only [`BrowserConfig`] is available and journeys run against the
//! in-memory [`MockDriver`](crate::mock::MockDriver).

/// Browser configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserConfig {
    /// Run in headless mode
    pub headless: bool,
    /// Viewport width
    pub viewport_width: u32,
    /// Viewport height
    pub viewport_height: u32,
    /// Path to chromium binary (None = auto-detect)
    pub chromium_path: Option<String>,
    /// Sandbox mode (disable for containers)
    pub sandbox: bool,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            viewport_width: 1920,
            viewport_height: 1080,
            chromium_path: None,
            sandbox: true,
        }
    }
}

impl BrowserConfig {
    /// Set viewport dimensions
    #[must_use]
    pub const fn with_viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport_width = width;
        self.viewport_height = height;
        self
    }

    /// Set headless mode
    #[must_use]
    pub const fn with_headless(mut self, headless: bool) -> Self {
        self.headless = headless;
        self
    }

    /// Set chromium path
    #[must_use]
    pub fn with_chromium_path(mut self, path: impl Into<String>) -> Self {
        self.chromium_path = Some(path.into());
        self
    }

    /// Disable sandbox (for containers/CI)
    #[must_use]
    pub const fn with_no_sandbox(mut self) -> Self {
        self.sandbox = false;
        self
    }
}

/// Element handles of the loaded document, keyed by handle id
#[cfg(any(feature = "browser", test))]
#[derive(Debug)]
struct HandleRegistry<E> {
    document: Option<String>,
    elements: std::collections::HashMap<String, E>,
    next_id: u64,
}

#[cfg(any(feature = "browser", test))]
impl<E: Clone> HandleRegistry<E> {
    fn new() -> Self {
        Self {
            document: None,
            elements: std::collections::HashMap::new(),
            next_id: 1,
        }
    }

    /// Drop every handle and start tracking `url`
    fn reset(&mut self, url: &str) {
        self.elements.clear();
        self.document = Some(url.to_string());
    }

    /// Record the loaded URL; handles of a previous document are dropped
    fn observe(&mut self, url: &str) -> bool {
        if self.document.as_deref() == Some(url) {
            return false;
        }
        self.reset(url);
        true
    }

    fn register(&mut self, element: E) -> String {
        let id = format!("el-{}", self.next_id);
        self.next_id += 1;
        let _ = self.elements.insert(id.clone(), element);
        id
    }

    fn get(&self, id: &str) -> Option<E> {
        self.elements.get(id).cloned()
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.elements.len()
    }
}

/// Whether a CDP lookup error only says that nothing matched
#[cfg(any(feature = "browser", test))]
fn is_empty_lookup(message: &str) -> bool {
    const NO_MATCH: [&str; 3] = ["No node with given id", "No search result", "Could not find node"];
    NO_MATCH.iter().any(|m| message.contains(m))
}

// ============================================================================
// Real CDP Implementation (when `browser` feature is enabled)
// ============================================================================

#[cfg(feature = "browser")]
mod cdp {
    use super::{is_empty_lookup, BrowserConfig, HandleRegistry};
    use crate::driver::{ElementHandle, ElementState, WebDriver};
    use crate::locator::{Locator, Strategy};
    use crate::result::{StorefrontError, StorefrontResult};
    use async_trait::async_trait;
    use chromiumoxide::browser::{Browser as CdpBrowser, BrowserConfig as CdpConfig};
    use chromiumoxide::cdp::browser_protocol::emulation::SetDeviceMetricsOverrideParams;
    use chromiumoxide::cdp::browser_protocol::page::{
        CaptureScreenshotFormat, CaptureScreenshotParams,
    };
    use chromiumoxide::element::Element;
    use chromiumoxide::page::Page as CdpPage;
    use futures::StreamExt;
    use std::sync::{Mutex, MutexGuard, PoisonError};
    use tokio::task::JoinHandle;

    const STATE_FN: &str = "function() { \
        const r = this.getBoundingClientRect(); \
        const s = window.getComputedStyle(this); \
        const shown = r.width > 0 && r.height > 0 && s.visibility !== 'hidden' && s.display !== 'none'; \
        return (shown ? 1 : 0) | (this.disabled ? 0 : 2); }";

    const CLEAR_FN: &str = "function() { \
        this.value = ''; \
        this.dispatchEvent(new Event('input', { bubbles: true })); }";

    /// Browser instance with real CDP connection
    #[derive(Debug)]
    pub struct ChromiumDriver {
        browser: tokio::sync::Mutex<Option<CdpBrowser>>,
        handler: Mutex<Option<JoinHandle<()>>>,
        page: CdpPage,
        handles: Mutex<HandleRegistry<Element>>,
    }

    impl ChromiumDriver {
        /// Launch a new browser instance with real CDP
        pub async fn launch(config: &BrowserConfig) -> StorefrontResult<Self> {
            let mut builder = CdpConfig::builder()
                .window_size(config.viewport_width, config.viewport_height);

            if !config.headless {
                builder = builder.with_head();
            }

            if !config.sandbox {
                builder = builder.no_sandbox();
            }

            if let Some(ref path) = config.chromium_path {
                builder = builder.chrome_executable(path);
            }

            let cdp_config = builder
                .build()
                .map_err(|message| StorefrontError::BrowserLaunchError { message })?;

            let (browser, mut handler) = CdpBrowser::launch(cdp_config).await.map_err(|e| {
                StorefrontError::BrowserLaunchError {
                    message: e.to_string(),
                }
            })?;

            let handle = tokio::spawn(async move {
                while let Some(h) = handler.next().await {
                    if h.is_err() {
                        break;
                    }
                }
            });

            let page = browser.new_page("about:blank").await.map_err(|e| {
                StorefrontError::BrowserLaunchError {
                    message: e.to_string(),
                }
            })?;

            tracing::debug!(
                headless = config.headless,
                width = config.viewport_width,
                height = config.viewport_height,
                "chromium launched"
            );

            Ok(Self {
                browser: tokio::sync::Mutex::new(Some(browser)),
                handler: Mutex::new(Some(handle)),
                page,
                handles: Mutex::new(HandleRegistry::new()),
            })
        }

        fn handles(&self) -> MutexGuard<'_, HandleRegistry<Element>> {
            self.handles.lock().unwrap_or_else(PoisonError::into_inner)
        }

        fn register(&self, element: Element, description: &str) -> ElementHandle {
            let id = self.handles().register(element);
            ElementHandle::new(id, description)
        }

        fn resolve(&self, handle: &ElementHandle) -> StorefrontResult<Element> {
            self.handles()
                .get(&handle.id)
                .ok_or_else(|| StorefrontError::StaleElement {
                    element: handle.to_string(),
                })
        }

        /// Drop handles left over from a document replaced by a click
        async fn track_document(&self) -> StorefrontResult<()> {
            let url = self.current_url().await?;
            let mut handles = self.handles();
            if handles.observe(&url) {
                tracing::debug!(%url, "document changed, element handles dropped");
            }
            Ok(())
        }

        async fn call_on(&self, handle: &ElementHandle, function: &str) -> StorefrontResult<serde_json::Value> {
            let element = self.resolve(handle)?;
            let returns = element
                .call_js_fn(function, false)
                .await
                .map_err(|e| StorefrontError::StaleElement {
                    element: format!("{handle}: {e}"),
                })?;
            Ok(returns.result.value.unwrap_or(serde_json::Value::Null))
        }

        fn input_error(e: impl std::fmt::Display) -> StorefrontError {
            StorefrontError::InputError {
                message: e.to_string(),
            }
        }
    }

    #[async_trait]
    impl WebDriver for ChromiumDriver {
        async fn navigate(&self, url: &str) -> StorefrontResult<()> {
            self.page
                .goto(url)
                .await
                .map_err(|e| StorefrontError::NavigationError {
                    url: url.to_string(),
                    message: e.to_string(),
                })?;
            // Handles from the previous document can no longer be resolved
            let loaded = self.current_url().await?;
            self.handles().reset(&loaded);
            Ok(())
        }

        async fn current_url(&self) -> StorefrontResult<String> {
            let url = self
                .page
                .url()
                .await
                .map_err(|e| StorefrontError::NavigationError {
                    url: String::new(),
                    message: e.to_string(),
                })?;
            Ok(url.unwrap_or_default())
        }

        async fn find_elements(&self, locator: &Locator) -> StorefrontResult<Vec<ElementHandle>> {
            self.track_document().await?;
            let found = match (locator.strategy(), locator.to_css()) {
                (Strategy::XPath, _) => self.page.find_xpaths(locator.selector()).await,
                (_, Some(css)) => self.page.find_elements(css).await,
                (_, None) => Ok(Vec::new()),
            };
            // CDP reports some empty searches as errors rather than empty lists
            let elements = match found {
                Ok(elements) => elements,
                Err(e) if is_empty_lookup(&e.to_string()) => {
                    tracing::debug!(%locator, error = %e, "lookup returned no nodes");
                    Vec::new()
                }
                Err(e) => {
                    return Err(StorefrontError::ScriptError {
                        message: format!("lookup of {locator} failed: {e}"),
                    })
                }
            };
            let description = locator.to_string();
            Ok(elements
                .into_iter()
                .map(|el| self.register(el, &description))
                .collect())
        }

        async fn find_child_elements(
            &self,
            parent: &ElementHandle,
            locator: &Locator,
        ) -> StorefrontResult<Vec<ElementHandle>> {
            let css = locator.to_css().ok_or_else(|| StorefrontError::InputError {
                message: format!("child lookup needs a CSS-expressible locator, got {locator}"),
            })?;
            let element = self.resolve(parent)?;
            let children = element.find_elements(css).await.unwrap_or_default();
            let description = format!("{} > {locator}", parent.description);
            Ok(children
                .into_iter()
                .map(|el| self.register(el, &description))
                .collect())
        }

        async fn element_state(&self, element: &ElementHandle) -> StorefrontResult<ElementState> {
            let bits = self.call_on(element, STATE_FN).await?.as_u64().unwrap_or(0);
            Ok(ElementState {
                displayed: bits & 1 != 0,
                enabled: bits & 2 != 0,
            })
        }

        async fn text(&self, element: &ElementHandle) -> StorefrontResult<String> {
            let el = self.resolve(element)?;
            let text = el.inner_text().await.map_err(|e| StorefrontError::StaleElement {
                element: format!("{element}: {e}"),
            })?;
            Ok(text.unwrap_or_default())
        }

        async fn click(&self, element: &ElementHandle) -> StorefrontResult<()> {
            let el = self.resolve(element)?;
            el.click().await.map_err(Self::input_error)?;
            Ok(())
        }

        async fn send_keys(&self, element: &ElementHandle, text: &str) -> StorefrontResult<()> {
            let el = self.resolve(element)?;
            el.focus().await.map_err(Self::input_error)?;
            el.type_str(text).await.map_err(Self::input_error)?;
            Ok(())
        }

        async fn clear(&self, element: &ElementHandle) -> StorefrontResult<()> {
            self.call_on(element, CLEAR_FN).await?;
            Ok(())
        }

        async fn hover(&self, element: &ElementHandle) -> StorefrontResult<()> {
            let el = self.resolve(element)?;
            el.hover().await.map_err(Self::input_error)?;
            Ok(())
        }

        async fn execute_script(
            &self,
            script: &str,
            args: &[ElementHandle],
        ) -> StorefrontResult<serde_json::Value> {
            match args {
                [] => {
                    let result = self
                        .page
                        .evaluate(format!("(function() {{ {script} }})()"))
                        .await
                        .map_err(|e| StorefrontError::ScriptError {
                            message: e.to_string(),
                        })?;
                    Ok(result.value().cloned().unwrap_or(serde_json::Value::Null))
                }
                [target] => {
                    // Bind `arguments[0]` to the element by re-applying the body
                    let function = format!(
                        "function() {{ return (function() {{ {script} }}).apply(null, [this]); }}"
                    );
                    self.call_on(target, &function).await
                }
                _ => Err(StorefrontError::ScriptError {
                    message: format!("at most one element argument supported, got {}", args.len()),
                }),
            }
        }

        async fn screenshot(&self) -> StorefrontResult<Vec<u8>> {
            let params = CaptureScreenshotParams::builder()
                .format(CaptureScreenshotFormat::Png)
                .build();

            let screenshot =
                self.page
                    .execute(params)
                    .await
                    .map_err(|e| StorefrontError::ScreenshotError {
                        message: e.to_string(),
                    })?;

            use base64::Engine;
            base64::engine::general_purpose::STANDARD
                .decode(&screenshot.data)
                .map_err(|e| StorefrontError::ScreenshotError {
                    message: e.to_string(),
                })
        }

        async fn set_viewport(&self, width: u32, height: u32) -> StorefrontResult<()> {
            let params = SetDeviceMetricsOverrideParams::new(
                i64::from(width),
                i64::from(height),
                1.0,
                false,
            );
            self.page
                .execute(params)
                .await
                .map_err(|e| StorefrontError::BrowserLaunchError {
                    message: e.to_string(),
                })?;
            Ok(())
        }

        async fn quit(&self) -> StorefrontResult<()> {
            let mut guard = self.browser.lock().await;
            let Some(mut browser) = guard.take() else {
                return Ok(());
            };
            browser
                .close()
                .await
                .map_err(|e| StorefrontError::FixtureError {
                    message: e.to_string(),
                })?;
            let _ = browser.wait().await;
            if let Some(handle) = self
                .handler
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .take()
            {
                handle.abort();
            }
            Ok(())
        }
    }
}

#[cfg(feature = "browser")]
pub use cdp::ChromiumDriver;
