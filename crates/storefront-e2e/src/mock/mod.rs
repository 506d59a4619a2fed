//! Scripted in-memory storefront driver.
//!
//! [`MockDriver`] implements [`WebDriver`] over a [`MockSite`]: navigation
//! loads a fresh DOM (invalidating every handle from the previous one), click
//! and hover effects mutate it, and every command is recorded in a call
//! history for verification.

mod site;

pub use site::{Effect, MockElement, MockPage, MockSite};

use async_trait::async_trait;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::driver::{ElementHandle, ElementState, WebDriver};
use crate::locator::Locator;
use crate::result::{StorefrontError, StorefrontResult};

/// PNG signature returned for every mock screenshot
pub const MOCK_PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

#[derive(Debug)]
struct Node {
    element: MockElement,
    parent: Option<usize>,
    displayed: bool,
    reveal_remaining: u32,
    value: String,
}

#[derive(Debug, Default)]
struct Dom {
    generation: u64,
    url: String,
    nodes: Vec<Node>,
}

impl Dom {
    fn load(&mut self, url: &str, page: Option<&MockPage>) {
        self.generation += 1;
        self.url = url.to_string();
        self.nodes.clear();
        if let Some(page) = page {
            for element in &page.elements {
                self.insert(element, None);
            }
        }
    }

    fn insert(&mut self, element: &MockElement, parent: Option<usize>) {
        let index = self.nodes.len();
        let mut flat = element.clone();
        let children = std::mem::take(&mut flat.children);
        self.nodes.push(Node {
            displayed: flat.displayed,
            reveal_remaining: flat.reveal_after,
            element: flat,
            parent,
            value: String::new(),
        });
        for child in &children {
            self.insert(child, Some(index));
        }
    }

    fn handle(&self, index: usize, locator: &Locator) -> ElementHandle {
        ElementHandle::new(format!("g{}-n{index}", self.generation), locator.to_string())
    }

    fn resolve(&self, handle: &ElementHandle) -> StorefrontResult<usize> {
        let stale = || StorefrontError::StaleElement {
            element: handle.to_string(),
        };
        let (generation, index) = handle
            .id
            .strip_prefix('g')
            .and_then(|rest| rest.split_once("-n"))
            .ok_or_else(stale)?;
        let generation: u64 = generation.parse().map_err(|_| stale())?;
        let index: usize = index.parse().map_err(|_| stale())?;
        if generation != self.generation || index >= self.nodes.len() {
            return Err(stale());
        }
        Ok(index)
    }

    fn is_descendant(&self, mut index: usize, ancestor: usize) -> bool {
        while let Some(parent) = self.nodes[index].parent {
            if parent == ancestor {
                return true;
            }
            index = parent;
        }
        false
    }

    fn set_displayed(&mut self, locator: &Locator, displayed: bool) {
        for node in self.nodes.iter_mut().filter(|n| n.element.matches(locator)) {
            node.displayed = displayed;
            node.reveal_remaining = 0;
        }
    }
}

#[derive(Debug, Default)]
struct MockState {
    dom: Dom,
    history: Vec<String>,
    screenshots: usize,
    viewport: Option<(u32, u32)>,
    quit: bool,
}

/// Mock driver for journeys against a [`MockSite`]
#[derive(Debug)]
pub struct MockDriver {
    site: MockSite,
    state: Mutex<MockState>,
}

impl MockDriver {
    /// Create a driver over `site`, starting at `about:blank`
    #[must_use]
    pub fn new(site: MockSite) -> Self {
        let mut state = MockState::default();
        state.dom.load("about:blank", None);
        Self {
            site,
            state: Mutex::new(state),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Get call history
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.lock().history.clone()
    }

    /// Check if a command with this prefix was issued
    #[must_use]
    pub fn was_called(&self, prefix: &str) -> bool {
        self.lock().history.iter().any(|c| c.starts_with(prefix))
    }

    /// Number of commands with this prefix
    #[must_use]
    pub fn call_count(&self, prefix: &str) -> usize {
        self.lock()
            .history
            .iter()
            .filter(|c| c.starts_with(prefix))
            .count()
    }

    /// Number of screenshots taken
    #[must_use]
    pub fn screenshot_count(&self) -> usize {
        self.lock().screenshots
    }

    /// Viewport set through [`WebDriver::set_viewport`]
    #[must_use]
    pub fn viewport(&self) -> Option<(u32, u32)> {
        self.lock().viewport
    }

    /// Whether [`WebDriver::quit`] was called
    #[must_use]
    pub fn is_quit(&self) -> bool {
        self.lock().quit
    }

    /// URL of the loaded page
    #[must_use]
    pub fn url(&self) -> String {
        self.lock().dom.url.clone()
    }

    /// Current value of the first element matching `locator`
    #[must_use]
    pub fn value_of(&self, locator: &Locator) -> Option<String> {
        let state = self.lock();
        state
            .dom
            .nodes
            .iter()
            .find(|n| n.element.matches(locator))
            .map(|n| n.value.clone())
    }

    fn ensure_open(state: &MockState) -> StorefrontResult<()> {
        if state.quit {
            return Err(StorefrontError::FixtureError {
                message: "browser session already closed".to_string(),
            });
        }
        Ok(())
    }

    fn load(&self, state: &mut MockState, url: &str) {
        state.dom.load(url, self.site.page(url));
    }

    fn apply(&self, state: &mut MockState, effects: &[Effect]) -> StorefrontResult<()> {
        for effect in effects {
            match effect {
                Effect::Navigate(url) => {
                    state.history.push(format!("load:{url}"));
                    self.load(state, url);
                }
                Effect::NavigateWithValue { input, template } => {
                    let value = state
                        .dom
                        .nodes
                        .iter()
                        .find(|n| n.element.matches(input))
                        .map(|n| n.value.clone())
                        .unwrap_or_default();
                    let url = template.replace("{value}", &urlencoding::encode(&value));
                    state.history.push(format!("load:{url}"));
                    self.load(state, &url);
                }
                Effect::Show(locator) => state.dom.set_displayed(locator, true),
                Effect::Hide(locator) => state.dom.set_displayed(locator, false),
                Effect::Fail(message) => {
                    return Err(StorefrontError::InputError {
                        message: message.clone(),
                    })
                }
            }
        }
        Ok(())
    }

    fn click_node(&self, state: &mut MockState, index: usize, forced: bool) -> StorefrontResult<()> {
        let node = &state.dom.nodes[index];
        if !forced && !(node.displayed && node.element.enabled) {
            return Err(StorefrontError::InputError {
                message: format!("element not interactable: {:?}", node.element.locators),
            });
        }
        let effects = node.element.on_click.clone();
        self.apply(state, &effects)
    }
}

#[async_trait]
impl WebDriver for MockDriver {
    async fn navigate(&self, url: &str) -> StorefrontResult<()> {
        let mut state = self.lock();
        Self::ensure_open(&state)?;
        state.history.push(format!("navigate:{url}"));
        self.load(&mut state, url);
        Ok(())
    }

    async fn current_url(&self) -> StorefrontResult<String> {
        let state = self.lock();
        Self::ensure_open(&state)?;
        Ok(state.dom.url.clone())
    }

    async fn find_elements(&self, locator: &Locator) -> StorefrontResult<Vec<ElementHandle>> {
        let state = self.lock();
        Self::ensure_open(&state)?;
        Ok(state
            .dom
            .nodes
            .iter()
            .enumerate()
            .filter(|(_, n)| n.element.matches(locator))
            .map(|(i, _)| state.dom.handle(i, locator))
            .collect())
    }

    async fn find_child_elements(
        &self,
        parent: &ElementHandle,
        locator: &Locator,
    ) -> StorefrontResult<Vec<ElementHandle>> {
        let state = self.lock();
        Self::ensure_open(&state)?;
        let ancestor = state.dom.resolve(parent)?;
        Ok(state
            .dom
            .nodes
            .iter()
            .enumerate()
            .filter(|(i, n)| n.element.matches(locator) && state.dom.is_descendant(*i, ancestor))
            .map(|(i, _)| state.dom.handle(i, locator))
            .collect())
    }

    async fn element_state(&self, element: &ElementHandle) -> StorefrontResult<ElementState> {
        let mut state = self.lock();
        Self::ensure_open(&state)?;
        let index = state.dom.resolve(element)?;
        let node = &mut state.dom.nodes[index];
        if !node.displayed && node.reveal_remaining > 0 {
            node.reveal_remaining -= 1;
            if node.reveal_remaining == 0 {
                node.displayed = true;
            }
        }
        Ok(ElementState {
            displayed: node.displayed,
            enabled: node.element.enabled,
        })
    }

    async fn text(&self, element: &ElementHandle) -> StorefrontResult<String> {
        let state = self.lock();
        Self::ensure_open(&state)?;
        let index = state.dom.resolve(element)?;
        Ok(state.dom.nodes[index].element.text.clone())
    }

    async fn click(&self, element: &ElementHandle) -> StorefrontResult<()> {
        let mut state = self.lock();
        Self::ensure_open(&state)?;
        let index = state.dom.resolve(element)?;
        state.history.push(format!("click:{}", element.description));
        self.click_node(&mut state, index, false)
    }

    async fn send_keys(&self, element: &ElementHandle, text: &str) -> StorefrontResult<()> {
        let mut state = self.lock();
        Self::ensure_open(&state)?;
        let index = state.dom.resolve(element)?;
        state
            .history
            .push(format!("send_keys:{}:{text}", element.description));
        state.dom.nodes[index].value.push_str(text);
        Ok(())
    }

    async fn clear(&self, element: &ElementHandle) -> StorefrontResult<()> {
        let mut state = self.lock();
        Self::ensure_open(&state)?;
        let index = state.dom.resolve(element)?;
        state.history.push(format!("clear:{}", element.description));
        state.dom.nodes[index].value.clear();
        Ok(())
    }

    async fn hover(&self, element: &ElementHandle) -> StorefrontResult<()> {
        let mut state = self.lock();
        Self::ensure_open(&state)?;
        let index = state.dom.resolve(element)?;
        state.history.push(format!("hover:{}", element.description));
        let effects = state.dom.nodes[index].element.on_hover.clone();
        self.apply(&mut state, &effects)
    }

    async fn execute_script(
        &self,
        script: &str,
        args: &[ElementHandle],
    ) -> StorefrontResult<serde_json::Value> {
        let mut state = self.lock();
        Self::ensure_open(&state)?;
        let targets = args
            .iter()
            .map(|a| state.dom.resolve(a))
            .collect::<StorefrontResult<Vec<_>>>()?;
        match args.first() {
            Some(first) => state
                .history
                .push(format!("script:{script}:{}", first.description)),
            None => state.history.push(format!("script:{script}")),
        }
        // Script clicks bypass visibility and enablement checks
        if script.contains("arguments[0].click()") {
            if let Some(&index) = targets.first() {
                self.click_node(&mut state, index, true)?;
            }
        }
        Ok(serde_json::Value::Null)
    }

    async fn screenshot(&self) -> StorefrontResult<Vec<u8>> {
        let mut state = self.lock();
        Self::ensure_open(&state)?;
        state.screenshots += 1;
        Ok(MOCK_PNG.to_vec())
    }

    async fn set_viewport(&self, width: u32, height: u32) -> StorefrontResult<()> {
        let mut state = self.lock();
        Self::ensure_open(&state)?;
        state.history.push(format!("set_viewport:{width}x{height}"));
        if let Some((max_w, max_h)) = self.site.max_viewport() {
            if width > max_w || height > max_h {
                return Err(StorefrontError::InputError {
                    message: format!("viewport {width}x{height} exceeds {max_w}x{max_h}"),
                });
            }
        }
        state.viewport = Some((width, height));
        Ok(())
    }

    async fn quit(&self) -> StorefrontResult<()> {
        let mut state = self.lock();
        state.history.push("quit".to_string());
        state.quit = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOME: &str = "http://shop.test/home";
    const NEXT: &str = "http://shop.test/next";

    fn site() -> MockSite {
        MockSite::new()
            .with_page(
                HOME,
                MockPage::new()
                    .with(
                        MockElement::new(Locator::css("a.next"))
                            .text("Next")
                            .on_click(Effect::Navigate(NEXT.into())),
                    )
                    .with(
                        MockElement::new(Locator::css("a.menu"))
                            .on_hover(Effect::Show(Locator::css("a.sub"))),
                    )
                    .with(MockElement::new(Locator::css("a.sub")).hidden())
                    .with(
                        MockElement::new(Locator::css("table"))
                            .child(MockElement::new(Locator::css("td a")).text("iPhone")),
                    )
                    .with(MockElement::new(Locator::css("td a")).text("outside"))
                    .with(MockElement::new(Locator::name("search")))
                    .with(MockElement::new(Locator::css("#search button")).on_click(
                        Effect::NavigateWithValue {
                            input: Locator::name("search"),
                            template: "http://shop.test/search?q={value}".into(),
                        },
                    )),
            )
            .with_page(NEXT, MockPage::new().with(MockElement::new(Locator::tag("h1"))))
    }

    async fn at_home() -> MockDriver {
        let driver = MockDriver::new(site());
        driver.navigate(HOME).await.unwrap();
        driver
    }

    mod navigation_tests {
        use super::*;

        #[tokio::test]
        async fn test_navigate_loads_page() {
            let driver = at_home().await;
            assert_eq!(driver.current_url().await.unwrap(), HOME);
            assert_eq!(driver.find_elements(&Locator::css("a.next")).await.unwrap().len(), 1);
            assert!(driver.was_called("navigate:"));
        }

        #[tokio::test]
        async fn test_unknown_url_is_empty_page() {
            let driver = MockDriver::new(site());
            driver.navigate("http://shop.test/missing").await.unwrap();
            assert!(driver.find_elements(&Locator::tag("h1")).await.unwrap().is_empty());
        }

        #[tokio::test]
        async fn test_click_navigates_and_stales_old_handles() {
            let driver = at_home().await;
            let next = driver.find_elements(&Locator::css("a.next")).await.unwrap();
            driver.click(&next[0]).await.unwrap();

            assert_eq!(driver.url(), NEXT);
            let err = driver.text(&next[0]).await.unwrap_err();
            assert!(matches!(err, StorefrontError::StaleElement { .. }));
        }
    }

    mod interaction_tests {
        use super::*;

        #[tokio::test]
        async fn test_hover_reveals() {
            let driver = at_home().await;
            let sub = driver.find_elements(&Locator::css("a.sub")).await.unwrap();
            assert!(!driver.element_state(&sub[0]).await.unwrap().displayed);

            let menu = driver.find_elements(&Locator::css("a.menu")).await.unwrap();
            driver.hover(&menu[0]).await.unwrap();
            assert!(driver.element_state(&sub[0]).await.unwrap().displayed);
        }

        #[tokio::test]
        async fn test_hidden_element_rejects_click_but_not_script_click() {
            let driver = at_home().await;
            let sub = driver.find_elements(&Locator::css("a.sub")).await.unwrap();
            assert!(matches!(
                driver.click(&sub[0]).await,
                Err(StorefrontError::InputError { .. })
            ));
            driver
                .execute_script("arguments[0].click();", &sub)
                .await
                .unwrap();
            assert!(driver.was_called("script:arguments[0].click();:css=a.sub"));
        }

        #[tokio::test]
        async fn test_typed_value_feeds_navigation() {
            let driver = at_home().await;
            let input = driver.find_elements(&Locator::name("search")).await.unwrap();
            driver.send_keys(&input[0], "stale").await.unwrap();
            driver.clear(&input[0]).await.unwrap();
            driver.send_keys(&input[0], "Nikon D300").await.unwrap();
            assert_eq!(driver.value_of(&Locator::name("search")).as_deref(), Some("Nikon D300"));

            let button = driver.find_elements(&Locator::css("#search button")).await.unwrap();
            driver.click(&button[0]).await.unwrap();
            assert_eq!(driver.url(), "http://shop.test/search?q=Nikon%20D300");
        }

        #[tokio::test]
        async fn test_child_lookup_is_scoped() {
            let driver = at_home().await;
            let table = driver.find_elements(&Locator::css("table")).await.unwrap();
            let cells = driver
                .find_child_elements(&table[0], &Locator::css("td a"))
                .await
                .unwrap();
            assert_eq!(cells.len(), 1);
            assert_eq!(driver.text(&cells[0]).await.unwrap(), "iPhone");
            assert_eq!(driver.find_elements(&Locator::css("td a")).await.unwrap().len(), 2);
        }

        #[tokio::test]
        async fn test_reveal_after_probes() {
            let driver = MockDriver::new(MockSite::new().with_page(
                HOME,
                MockPage::new().with(MockElement::new(Locator::tag("h1")).reveal_after(2)),
            ));
            driver.navigate(HOME).await.unwrap();
            let h1 = driver.find_elements(&Locator::tag("h1")).await.unwrap();
            assert!(!driver.element_state(&h1[0]).await.unwrap().displayed);
            assert!(driver.element_state(&h1[0]).await.unwrap().displayed);
        }
    }

    mod lifecycle_tests {
        use super::*;

        #[tokio::test]
        async fn test_screenshot_and_viewport() {
            let driver = at_home().await;
            assert_eq!(driver.screenshot().await.unwrap(), MOCK_PNG);
            driver.set_viewport(1920, 1080).await.unwrap();
            assert_eq!(driver.screenshot_count(), 1);
            assert_eq!(driver.viewport(), Some((1920, 1080)));
        }

        #[tokio::test]
        async fn test_oversized_viewport_rejected() {
            let driver = MockDriver::new(MockSite::new().with_max_viewport(1280, 720));
            assert!(driver.set_viewport(1920, 1080).await.is_err());
            assert_eq!(driver.viewport(), None);
            driver.set_viewport(1280, 720).await.unwrap();
            assert_eq!(driver.viewport(), Some((1280, 720)));
        }

        #[tokio::test]
        async fn test_commands_fail_after_quit() {
            let driver = at_home().await;
            driver.quit().await.unwrap();
            assert!(driver.is_quit());
            assert!(driver.navigate(HOME).await.is_err());
            assert_eq!(driver.call_count("quit"), 1);
        }
    }
}
