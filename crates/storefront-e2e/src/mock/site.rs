//! Declarative description of a scripted storefront.
//!
//! A [`MockSite`] maps URLs to [`MockPage`]s; each page is a tree of
//! [`MockElement`]s carrying the locators that find them, their text, their
//! rendering state and what happens when they are clicked or hovered.

use std::collections::HashMap;

use crate::locator::Locator;

/// Side effect of interacting with a mock element
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Load the page registered at this URL
    Navigate(String),
    /// Load a URL built from an input's current value (`{value}` placeholder,
    /// percent-encoded)
    NavigateWithValue {
        /// Input whose value is substituted
        input: Locator,
        /// URL template
        template: String,
    },
    /// Display every element matching the locator
    Show(Locator),
    /// Hide every element matching the locator
    Hide(Locator),
    /// Reject the interaction with an input error
    Fail(String),
}

/// One element of a scripted page
#[derive(Debug, Clone)]
pub struct MockElement {
    pub(crate) locators: Vec<Locator>,
    pub(crate) text: String,
    pub(crate) displayed: bool,
    pub(crate) enabled: bool,
    pub(crate) reveal_after: u32,
    pub(crate) on_click: Vec<Effect>,
    pub(crate) on_hover: Vec<Effect>,
    pub(crate) children: Vec<MockElement>,
}

impl MockElement {
    /// Visible, enabled element found by `locator`
    #[must_use]
    pub fn new(locator: Locator) -> Self {
        Self {
            locators: vec![locator],
            text: String::new(),
            displayed: true,
            enabled: true,
            reveal_after: 0,
            on_click: Vec::new(),
            on_hover: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Also match `locator`
    #[must_use]
    pub fn also(mut self, locator: Locator) -> Self {
        self.locators.push(locator);
        self
    }

    /// Set the visible text
    #[must_use]
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    /// Start hidden
    #[must_use]
    pub const fn hidden(mut self) -> Self {
        self.displayed = false;
        self
    }

    /// Start disabled
    #[must_use]
    pub const fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// Start hidden and become displayed after `probes` state checks
    #[must_use]
    pub const fn reveal_after(mut self, probes: u32) -> Self {
        self.displayed = false;
        self.reveal_after = probes;
        self
    }

    /// Add a click effect
    #[must_use]
    pub fn on_click(mut self, effect: Effect) -> Self {
        self.on_click.push(effect);
        self
    }

    /// Add a hover effect
    #[must_use]
    pub fn on_hover(mut self, effect: Effect) -> Self {
        self.on_hover.push(effect);
        self
    }

    /// Nest a child element
    #[must_use]
    pub fn child(mut self, child: Self) -> Self {
        self.children.push(child);
        self
    }

    pub(crate) fn matches(&self, locator: &Locator) -> bool {
        self.locators.iter().any(|l| l == locator)
    }
}

/// A scripted page
#[derive(Debug, Clone, Default)]
pub struct MockPage {
    pub(crate) elements: Vec<MockElement>,
}

impl MockPage {
    /// Empty page
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a top-level element
    #[must_use]
    pub fn with(mut self, element: MockElement) -> Self {
        self.elements.push(element);
        self
    }

    /// Add several top-level elements
    #[must_use]
    pub fn with_all(mut self, elements: impl IntoIterator<Item = MockElement>) -> Self {
        self.elements.extend(elements);
        self
    }
}

/// URL-addressed collection of scripted pages
#[derive(Debug, Clone, Default)]
pub struct MockSite {
    pages: HashMap<String, MockPage>,
    max_viewport: Option<(u32, u32)>,
}

impl MockSite {
    /// Empty site
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `page` at `url`
    #[must_use]
    pub fn with_page(mut self, url: impl Into<String>, page: MockPage) -> Self {
        let _ = self.pages.insert(url.into(), page);
        self
    }

    /// Reject viewports larger than `width`x`height`
    #[must_use]
    pub const fn with_max_viewport(mut self, width: u32, height: u32) -> Self {
        self.max_viewport = Some((width, height));
        self
    }

    pub(crate) const fn max_viewport(&self) -> Option<(u32, u32)> {
        self.max_viewport
    }

    /// Page registered at `url`
    #[must_use]
    pub fn page(&self, url: &str) -> Option<&MockPage> {
        self.pages.get(url)
    }

    /// Number of registered pages
    #[must_use]
    pub fn len(&self) -> usize {
        self.pages.len()
    }

    /// Whether no page is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}
