//! storefront-e2e: page-object journeys for an e-commerce storefront
//!
//! Shopper flows (browsing, search, registration, wishlist, cart and
//! reviews) are driven through a real browser or a scripted in-memory
//! storefront, with Allure-compatible reporting.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌──────────────┐   ┌─────────────────┐
//! │ Journeys     │──►│ Page Objects │──►│ Session      │──►│ WebDriver       │
//! │ (journeys)   │   │ (pages)      │   │ + Waiter     │   │ Chromium / Mock │
//! └──────────────┘   └──────────────┘   └──────────────┘   └─────────────────┘
//!        ▲                                     │
//!        │                                     ▼
//! ┌──────────────┐                      ┌──────────────┐
//! │ Session      │─────────────────────►│ Reporter     │──► allure-results/
//! │ Fixture      │                      │              │
//! └──────────────┘                      └──────────────┘
//! ```
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use storefront_e2e::{journeys, MockFactory, MockSite, SessionFixture, SuiteConfig};
//!
//! # async fn run() {
//! let factory = Arc::new(MockFactory::new(MockSite::new()));
//! let mut fixture = SessionFixture::new(factory, SuiteConfig::new());
//! let outcome = fixture
//!     .run("search_product", "Search", journeys::search_product)
//!     .await;
//! println!("{:?}", outcome.status);
//! # }
//! ```

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]

pub mod browser;
pub mod config;
pub mod driver;
pub mod email;
pub mod fixture;
pub mod journeys;
pub mod locator;
pub mod logging;
pub mod mock;
pub mod page_object;
pub mod pages;
pub mod reporter;
pub mod result;
pub mod session;
pub mod wait;

pub use browser::BrowserConfig;
#[cfg(feature = "browser")]
pub use browser::ChromiumDriver;
pub use config::{Routes, SuiteConfig, WaitBudget};
pub use driver::{ElementHandle, ElementState, WebDriver};
pub use email::random_email;
#[cfg(feature = "browser")]
pub use fixture::ChromiumFactory;
pub use fixture::{DriverFactory, FixtureState, MockFactory, SessionFixture};
pub use locator::{Locator, Readiness, Strategy};
pub use logging::init_logging;
pub use mock::{Effect, MockDriver, MockElement, MockPage, MockSite};
pub use page_object::{Confirmation, PageObject, PageUrl};
pub use pages::{
    HomePage, ProductPage, RegisterPage, Registration, SearchResultsPage, StoreHeader,
    SuccessRegisterPage, ThumbnailReport, WishlistItem, WishlistPage,
};
pub use reporter::{JourneyOutcome, Reporter, Status};
pub use result::{StorefrontError, StorefrontResult};
pub use session::Session;
pub use wait::{UrlPattern, WaitOptions, Waiter};
