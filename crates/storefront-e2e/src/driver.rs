//! Browser automation boundary.
//!
//! Page objects never talk to a browser directly: every command goes through
//! the [`WebDriver`] trait so the Chromium implementation (feature `browser`)
//! and the scripted [`MockDriver`](crate::mock::MockDriver) are
//! interchangeable.
//!
//! Semantics are blocking per call: each method resolves once the browser has
//! acknowledged the command, and failures are signalled per call.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::locator::Locator;
use crate::result::StorefrontResult;

/// Opaque reference to an element in the current DOM
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementHandle {
    /// Driver-assigned identifier
    pub id: String,
    /// Human-readable origin (usually the locator that produced it)
    pub description: String,
}

impl ElementHandle {
    /// Create a new element handle
    #[must_use]
    pub fn new(id: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            description: description.into(),
        }
    }
}

impl fmt::Display for ElementHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.description, self.id)
    }
}

/// Rendering state of an element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ElementState {
    /// Rendered with non-zero size and not hidden by style
    pub displayed: bool,
    /// Not disabled
    pub enabled: bool,
}

impl ElementState {
    /// Displayed and enabled
    #[must_use]
    pub const fn interactable() -> Self {
        Self {
            displayed: true,
            enabled: true,
        }
    }

    /// Present but hidden
    #[must_use]
    pub const fn hidden() -> Self {
        Self {
            displayed: false,
            enabled: true,
        }
    }
}

/// Abstract driver trait for browser automation.
///
/// # Implementations
///
/// - `ChromiumDriver` - CDP via chromiumoxide (feature `browser`)
/// - `MockDriver` - scripted storefront DOM for tests
#[async_trait]
pub trait WebDriver: Send + Sync + fmt::Debug {
    /// Navigate to URL
    async fn navigate(&self, url: &str) -> StorefrontResult<()>;

    /// Get current URL
    async fn current_url(&self) -> StorefrontResult<String>;

    /// All elements matching `locator` in document order; empty when none
    async fn find_elements(&self, locator: &Locator) -> StorefrontResult<Vec<ElementHandle>>;

    /// All descendants of `parent` matching `locator`
    async fn find_child_elements(
        &self,
        parent: &ElementHandle,
        locator: &Locator,
    ) -> StorefrontResult<Vec<ElementHandle>>;

    /// Rendering state of an element
    async fn element_state(&self, element: &ElementHandle) -> StorefrontResult<ElementState>;

    /// Visible text of an element
    async fn text(&self, element: &ElementHandle) -> StorefrontResult<String>;

    /// Click element
    async fn click(&self, element: &ElementHandle) -> StorefrontResult<()>;

    /// Type text into element
    async fn send_keys(&self, element: &ElementHandle, text: &str) -> StorefrontResult<()>;

    /// Clear an input's value
    async fn clear(&self, element: &ElementHandle) -> StorefrontResult<()>;

    /// Move the pointer over an element
    async fn hover(&self, element: &ElementHandle) -> StorefrontResult<()>;

    /// Execute a script body; `arguments[i]` refers to `args[i]`
    async fn execute_script(
        &self,
        script: &str,
        args: &[ElementHandle],
    ) -> StorefrontResult<serde_json::Value>;

    /// Capture the viewport as PNG bytes
    async fn screenshot(&self) -> StorefrontResult<Vec<u8>>;

    /// Resize the viewport
    async fn set_viewport(&self, width: u32, height: u32) -> StorefrontResult<()>;

    /// Close the browser
    async fn quit(&self) -> StorefrontResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_handle_creation() {
        let elem = ElementHandle::new("el-7", "css=#search button");
        assert_eq!(elem.id, "el-7");
        assert_eq!(elem.description, "css=#search button");
        assert_eq!(elem.to_string(), "css=#search button (el-7)");
    }

    #[test]
    fn test_element_state_constructors() {
        assert_eq!(ElementState::default(), ElementState { displayed: false, enabled: false });
        assert!(ElementState::interactable().displayed);
        assert!(ElementState::interactable().enabled);
        assert!(!ElementState::hidden().displayed);
    }

    #[test]
    fn test_element_handle_serde() {
        let elem = ElementHandle::new("el-1", "tag=h1");
        let json = serde_json::to_string(&elem).unwrap();
        let back: ElementHandle = serde_json::from_str(&json).unwrap();
        assert_eq!(back, elem);
    }
}
