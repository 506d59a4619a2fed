//! Locator abstraction for element selection.
//!
//! A [`Locator`] is an immutable `(strategy, selector)` pair. It identifies
//! zero or more elements in whatever DOM the session currently shows and is
//! resolved afresh on every use; handles obtained from it are never carried
//! across navigations.

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// How a selector string is interpreted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Strategy {
    /// CSS selector (e.g. `#search button`)
    Css,
    /// XPath expression
    XPath,
    /// `id` attribute
    Id,
    /// `name` attribute
    Name,
    /// Tag name (e.g. `h1`)
    TagName,
}

impl Strategy {
    /// Short prefix used in descriptions
    #[must_use]
    pub const fn prefix(&self) -> &'static str {
        match self {
            Self::Css => "css",
            Self::XPath => "xpath",
            Self::Id => "id",
            Self::Name => "name",
            Self::TagName => "tag",
        }
    }
}

/// Condition an element must satisfy before it is handed out
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Readiness {
    /// Element exists in the DOM (may be hidden)
    Present,
    /// Element exists and is rendered with non-zero size
    Visible,
    /// Element is visible and enabled
    Clickable,
}

impl fmt::Display for Readiness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Present => "present",
            Self::Visible => "visible",
            Self::Clickable => "clickable",
        };
        f.write_str(name)
    }
}

/// A declarative rule selecting UI elements
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locator {
    strategy: Strategy,
    selector: Cow<'static, str>,
}

impl Locator {
    /// Create a CSS locator
    #[must_use]
    pub const fn css(selector: &'static str) -> Self {
        Self {
            strategy: Strategy::Css,
            selector: Cow::Borrowed(selector),
        }
    }

    /// Create an XPath locator
    #[must_use]
    pub const fn xpath(selector: &'static str) -> Self {
        Self {
            strategy: Strategy::XPath,
            selector: Cow::Borrowed(selector),
        }
    }

    /// Create an `id` locator
    #[must_use]
    pub const fn id(id: &'static str) -> Self {
        Self {
            strategy: Strategy::Id,
            selector: Cow::Borrowed(id),
        }
    }

    /// Create a `name` attribute locator
    #[must_use]
    pub const fn name(name: &'static str) -> Self {
        Self {
            strategy: Strategy::Name,
            selector: Cow::Borrowed(name),
        }
    }

    /// Create a tag name locator
    #[must_use]
    pub const fn tag(tag: &'static str) -> Self {
        Self {
            strategy: Strategy::TagName,
            selector: Cow::Borrowed(tag),
        }
    }

    /// Create a locator from a runtime selector string
    #[must_use]
    pub fn new(strategy: Strategy, selector: impl Into<String>) -> Self {
        Self {
            strategy,
            selector: Cow::Owned(selector.into()),
        }
    }

    /// Anchor whose text contains `text`
    #[must_use]
    pub fn link_containing(text: &str) -> Self {
        Self::new(
            Strategy::XPath,
            format!("//a[contains(text(),{})]", xpath_literal(text)),
        )
    }

    /// Get the strategy
    #[must_use]
    pub const fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Get the selector string
    #[must_use]
    pub fn selector(&self) -> &str {
        &self.selector
    }

    /// Equivalent CSS selector, when the strategy has one
    #[must_use]
    pub fn to_css(&self) -> Option<String> {
        match self.strategy {
            Strategy::Css | Strategy::TagName => Some(self.selector.to_string()),
            Strategy::Id => Some(format!("[id={:?}]", self.selector)),
            Strategy::Name => Some(format!("[name={:?}]", self.selector)),
            Strategy::XPath => None,
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.strategy.prefix(), self.selector)
    }
}

/// Quote `text` as an XPath string literal.
///
/// XPath 1.0 has no escape sequences, so text holding both quote kinds is
/// split into a `concat()` call.
#[must_use]
pub fn xpath_literal(text: &str) -> String {
    if !text.contains('\'') {
        return format!("'{text}'");
    }
    if !text.contains('"') {
        return format!("\"{text}\"");
    }
    let parts: Vec<String> = text.split('\'').map(|p| format!("'{p}'")).collect();
    format!("concat({})", parts.join(", \"'\", "))
}
