//! Page Object Model Support
//!
//! A page object is a value bound to a [`Session`] and a [`PageUrl`]. The
//! [`PageObject`] trait supplies page opening and the locator waits every
//! page uses; pages add their own high-level actions on top.
//!
//! Actions that leave the page take `self` by value and return the next page
//! object, so a superseded page object cannot be used again.

use async_trait::async_trait;
use std::fmt;

use crate::driver::ElementHandle;
use crate::locator::{Locator, Readiness};
use crate::result::StorefrontResult;
use crate::session::Session;

/// Where a page object lives
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageUrl {
    /// A fixed URL
    Route(String),
    /// Whatever the session shows when the URL is asked for
    Current,
}

impl PageUrl {
    /// Resolve against the session
    pub async fn resolve(&self, session: &Session) -> StorefrontResult<String> {
        match self {
            Self::Route(url) => Ok(url.clone()),
            Self::Current => session.current_url().await,
        }
    }
}

/// Outcome of a best-effort observation.
///
/// `Unconfirmed` means the confirming element never appeared in time; any
/// other failure is still an `Err`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Confirmation<T> {
    /// The expected state was observed
    Confirmed(T),
    /// The expected state was not observed in time
    Unconfirmed {
        /// Why confirmation failed
        reason: String,
    },
}

impl<T> Confirmation<T> {
    /// Soften a wait timeout into `Unconfirmed`; keep other errors
    pub fn from_result(result: StorefrontResult<T>) -> StorefrontResult<Self> {
        match result {
            Ok(value) => Ok(Self::Confirmed(value)),
            Err(e) if e.is_timeout() => Ok(Self::Unconfirmed {
                reason: e.to_string(),
            }),
            Err(e) => Err(e),
        }
    }

    /// Check if confirmed
    #[must_use]
    pub const fn is_confirmed(&self) -> bool {
        matches!(self, Self::Confirmed(_))
    }

    /// Confirmed value, if any
    #[must_use]
    pub fn confirmed(self) -> Option<T> {
        match self {
            Self::Confirmed(value) => Some(value),
            Self::Unconfirmed { .. } => None,
        }
    }

    /// Borrow the confirmed value
    #[must_use]
    pub fn as_ref(&self) -> Confirmation<&T> {
        match self {
            Self::Confirmed(value) => Confirmation::Confirmed(value),
            Self::Unconfirmed { reason } => Confirmation::Unconfirmed {
                reason: reason.clone(),
            },
        }
    }

    /// Map the confirmed value
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Confirmation<U> {
        match self {
            Self::Confirmed(value) => Confirmation::Confirmed(f(value)),
            Self::Unconfirmed { reason } => Confirmation::Unconfirmed { reason },
        }
    }
}

impl<T> fmt::Display for Confirmation<T>
where
    T: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Confirmed(value) => write!(f, "{value}"),
            Self::Unconfirmed { reason } => write!(f, "unconfirmed ({reason})"),
        }
    }
}

/// Trait for page objects.
///
/// # Example
///
/// ```ignore
/// struct CartPage {
///     session: Session,
///     url: PageUrl,
/// }
///
/// impl PageObject for CartPage {
///     fn session(&self) -> &Session {
///         &self.session
///     }
///
///     fn page_url(&self) -> &PageUrl {
///         &self.url
///     }
/// }
/// ```
#[async_trait]
pub trait PageObject: Send + Sync {
    /// Session the page is bound to
    fn session(&self) -> &Session;

    /// Page location
    fn page_url(&self) -> &PageUrl;

    /// Get the page name for logging
    fn page_name(&self) -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Resolved page URL
    async fn url(&self) -> StorefrontResult<String> {
        self.page_url().resolve(self.session()).await
    }

    /// Navigate to the page, let it settle and attach one screenshot
    async fn open(&self) -> StorefrontResult<()> {
        let session = self.session();
        let url = self.url().await?;
        tracing::info!(page = self.page_name(), %url, "opening page");
        session
            .step(format!("Open page {url}"), async {
                session.navigate(&url).await?;
                session.settle().await;
                session.screenshot("page_screenshot").await
            })
            .await
    }

    /// Element present in the DOM
    async fn element(&self, locator: &Locator) -> StorefrontResult<ElementHandle> {
        self.session().wait_for(locator, Readiness::Present).await
    }

    /// Element present and displayed
    async fn visible_element(&self, locator: &Locator) -> StorefrontResult<ElementHandle> {
        self.session().wait_for(locator, Readiness::Visible).await
    }

    /// Element displayed and enabled
    async fn clickable_element(&self, locator: &Locator) -> StorefrontResult<ElementHandle> {
        self.session().wait_for(locator, Readiness::Clickable).await
    }
}
