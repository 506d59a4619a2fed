//! Session Fixture
//!
//! Browser setup and teardown around one journey.
//!
//! [`SessionFixture::run`] connects a browser through a [`DriverFactory`],
//! hands the journey a fresh [`Session`], and always closes the browser
//! afterwards, whether the journey passed, returned an error or panicked. A
//! panic is re-raised once the browser is closed and the outcome recorded.

use async_trait::async_trait;
use futures::FutureExt;
use std::any::Any;
use std::fmt;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, PoisonError};
use tracing::{error, info, warn};
use uuid::Uuid;

use crate::browser::BrowserConfig;
use crate::config::SuiteConfig;
use crate::driver::WebDriver;
use crate::mock::{MockDriver, MockSite};
use crate::reporter::{JourneyOutcome, Reporter, Status};
use crate::result::{StorefrontError, StorefrontResult};
use crate::session::Session;

/// Creates browser drivers for fixtures
#[async_trait]
pub trait DriverFactory: Send + Sync + fmt::Debug {
    /// Start a browser configured by `config`
    async fn connect(&self, config: &BrowserConfig) -> StorefrontResult<Arc<dyn WebDriver>>;
}

/// Launches headless Chromium over CDP
#[cfg(feature = "browser")]
#[derive(Debug, Clone, Copy, Default)]
pub struct ChromiumFactory;

#[cfg(feature = "browser")]
#[async_trait]
impl DriverFactory for ChromiumFactory {
    async fn connect(&self, config: &BrowserConfig) -> StorefrontResult<Arc<dyn WebDriver>> {
        let driver = crate::browser::ChromiumDriver::launch(config).await?;
        Ok(Arc::new(driver))
    }
}

/// Hands out fresh [`MockDriver`]s over one scripted site
#[derive(Debug)]
pub struct MockFactory {
    site: MockSite,
    refuse: Option<String>,
    last: Mutex<Option<Arc<MockDriver>>>,
}

impl MockFactory {
    /// Factory over `site`
    #[must_use]
    pub fn new(site: MockSite) -> Self {
        Self {
            site,
            refuse: None,
            last: Mutex::new(None),
        }
    }

    /// Factory whose every connection fails with `message`
    #[must_use]
    pub fn refusing(message: impl Into<String>) -> Self {
        Self {
            site: MockSite::new(),
            refuse: Some(message.into()),
            last: Mutex::new(None),
        }
    }

    /// Driver handed out by the latest connection
    #[must_use]
    pub fn last_driver(&self) -> Option<Arc<MockDriver>> {
        self.last
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl DriverFactory for MockFactory {
    async fn connect(&self, _config: &BrowserConfig) -> StorefrontResult<Arc<dyn WebDriver>> {
        if let Some(message) = &self.refuse {
            return Err(StorefrontError::BrowserLaunchError {
                message: message.clone(),
            });
        }
        let driver = Arc::new(MockDriver::new(self.site.clone()));
        *self.last.lock().unwrap_or_else(PoisonError::into_inner) = Some(Arc::clone(&driver));
        Ok(driver)
    }
}

/// Lifecycle of the fixture's current browser
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixtureState {
    /// No browser yet
    Idle,
    /// Browser connected, journey running
    Active,
    /// Browser closed
    TornDown,
    /// Browser could not be started or closed
    Failed,
}

/// Runs journeys, one fresh browser each
#[derive(Debug)]
pub struct SessionFixture {
    factory: Arc<dyn DriverFactory>,
    config: Arc<SuiteConfig>,
    state: FixtureState,
}

impl SessionFixture {
    /// Fixture connecting through `factory` with `config`
    #[must_use]
    pub fn new(factory: Arc<dyn DriverFactory>, config: SuiteConfig) -> Self {
        Self {
            factory,
            config: Arc::new(config),
            state: FixtureState::Idle,
        }
    }

    /// Current state
    #[must_use]
    pub const fn state(&self) -> FixtureState {
        self.state
    }

    /// Configuration handed to every session
    #[must_use]
    pub fn config(&self) -> &SuiteConfig {
        &self.config
    }

    /// Run `journey` in a fresh session and record its outcome.
    ///
    /// The browser is closed in every case. A panicking journey is
    /// recorded as broken and the panic resumed afterwards.
    pub async fn run<F, Fut>(&mut self, name: &str, feature: &str, journey: F) -> JourneyOutcome
    where
        F: FnOnce(Session) -> Fut,
        Fut: Future<Output = StorefrontResult<()>>,
    {
        let reporter = Reporter::new();
        let start = chrono::Utc::now().timestamp_millis();
        self.state = FixtureState::Idle;
        info!(journey = name, feature, "journey starting");

        let browser = &self.config.browser;
        let mut launched: Option<Arc<dyn WebDriver>> = None;
        let connected = reporter
            .step("Browser initialization", async {
                let driver = self.factory.connect(browser).await?;
                launched = Some(Arc::clone(&driver));
                driver
                    .set_viewport(browser.viewport_width, browser.viewport_height)
                    .await?;
                info!(
                    width = browser.viewport_width,
                    height = browser.viewport_height,
                    headless = browser.headless,
                    "browser initialized"
                );
                Ok(driver)
            })
            .await;
        let driver = match connected {
            Ok(driver) => driver,
            Err(e) => {
                error!(journey = name, error = %e, "browser initialization failed");
                self.state = FixtureState::Failed;
                // Started but unusable: still release it
                if let Some(driver) = launched {
                    if let Err(quit) = close_browser(&reporter, driver.as_ref()).await {
                        warn!(error = %quit, "browser did not close cleanly");
                    }
                }
                return self.record(reporter, name, feature, start, Status::Broken, Some(e.to_string()));
            }
        };
        self.state = FixtureState::Active;

        let session = Session::new(Arc::clone(&driver), Arc::clone(&self.config), reporter.clone());
        let run = reporter.step(name, journey(session.clone()));
        let finished = AssertUnwindSafe(run).catch_unwind().await;
        reporter.close_open();

        let (status, message, panic_payload) = match finished {
            Ok(Ok(())) => (Status::Passed, None, None),
            Ok(Err(e)) => {
                error!(journey = name, error = %e, "journey failed");
                (Status::of_error(&e), Some(e.to_string()), None)
            }
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                error!(journey = name, panic = %message, "journey panicked");
                (Status::Broken, Some(message), Some(payload))
            }
        };
        if !status.is_passed() {
            if let Err(e) = session.screenshot("failure_screenshot").await {
                warn!(error = %e, "could not capture failure screenshot");
            }
        }

        let (status, message) = match close_browser(&reporter, driver.as_ref()).await {
            Ok(()) => {
                self.state = FixtureState::TornDown;
                (status, message)
            }
            Err(e) => {
                warn!(error = %e, "browser did not close cleanly");
                self.state = FixtureState::Failed;
                if status.is_passed() {
                    (Status::Broken, Some(e.to_string()))
                } else {
                    (status, message)
                }
            }
        };

        let outcome = self.record(reporter, name, feature, start, status, message);
        if let Some(payload) = panic_payload {
            panic::resume_unwind(payload);
        }
        outcome
    }

    fn record(
        &self,
        reporter: Reporter,
        name: &str,
        feature: &str,
        start: i64,
        status: Status,
        message: Option<String>,
    ) -> JourneyOutcome {
        let (steps, attachments) = reporter.finish();
        let outcome = JourneyOutcome {
            uuid: Uuid::new_v4(),
            name: name.to_string(),
            feature: feature.to_string(),
            status,
            message,
            start,
            stop: chrono::Utc::now().timestamp_millis(),
            steps,
            attachments,
        };
        info!(journey = name, status = ?outcome.status, "journey finished");
        if let Some(dir) = &self.config.report_dir {
            if let Err(e) = outcome.write_allure(dir) {
                warn!(dir = %dir.display(), error = %e, "could not write allure result");
            }
        }
        outcome
    }
}

async fn close_browser(reporter: &Reporter, driver: &dyn WebDriver) -> StorefrontResult<()> {
    reporter
        .step("Closing browser", async {
            driver.quit().await?;
            info!("browser closed");
            Ok(())
        })
        .await
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "journey panicked".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WaitBudget;
    use crate::mock::{MockElement, MockPage};
    use crate::locator::Locator;

    const HOME: &str = "http://shop.test/index.php?route=common/home";

    fn fixture() -> (SessionFixture, Arc<MockFactory>) {
        let site = MockSite::new().with_page(HOME, MockPage::new().with(MockElement::new(Locator::tag("h1"))));
        let factory = Arc::new(MockFactory::new(site));
        let config = SuiteConfig::new()
            .with_base_url("http://shop.test/index.php")
            .with_waits(WaitBudget::instant());
        (SessionFixture::new(factory.clone(), config), factory)
    }

    mod lifecycle_tests {
        use super::*;

        #[tokio::test]
        async fn test_passing_journey() {
            let (mut fixture, factory) = fixture();
            assert_eq!(fixture.state(), FixtureState::Idle);
            let outcome = fixture
                .run("smoke", "Navigation", |session| async move {
                    session.navigate(HOME).await
                })
                .await;

            assert!(outcome.is_passed());
            assert_eq!(fixture.state(), FixtureState::TornDown);
            let names: Vec<_> = outcome.steps.iter().map(|s| s.name.as_str()).collect();
            assert_eq!(names, vec!["Browser initialization", "smoke", "Closing browser"]);

            let driver = factory.last_driver().unwrap();
            assert!(driver.is_quit());
            assert_eq!(driver.viewport(), Some((1920, 1080)));
        }

        #[tokio::test]
        async fn test_failing_journey_still_quits() {
            let (mut fixture, factory) = fixture();
            let outcome = fixture
                .run("broken", "Navigation", |session| async move {
                    session.navigate(HOME).await?;
                    session.wait_for(&Locator::css("div.alert-success"), crate::locator::Readiness::Visible).await?;
                    Ok(())
                })
                .await;

            assert_eq!(outcome.status, Status::Broken);
            assert!(outcome.message.as_deref().unwrap().contains("div.alert-success"));
            assert!(outcome.all_attachments().any(|a| a.name == "failure_screenshot"));
            assert!(factory.last_driver().unwrap().is_quit());
        }

        #[tokio::test]
        async fn test_assertion_marks_failed() {
            let (mut fixture, _) = fixture();
            let outcome = fixture
                .run("assert", "Search", |_session| async move {
                    Err(StorefrontError::assertion("expected one wishlist row"))
                })
                .await;
            assert_eq!(outcome.status, Status::Failed);
            assert_eq!(outcome.find_step("assert").unwrap().status, Status::Failed);
        }

        #[tokio::test]
        async fn test_panicking_journey_quits_then_resumes() {
            let (mut fixture, factory) = fixture();
            let caught = AssertUnwindSafe(fixture.run("panics", "Navigation", |_session| async move {
                panic!("journey exploded");
            }))
            .catch_unwind()
            .await;

            let payload = caught.unwrap_err();
            assert_eq!(panic_message(payload.as_ref()), "journey exploded");
            assert!(factory.last_driver().unwrap().is_quit());
        }

        #[tokio::test]
        async fn test_refused_connection_is_broken() {
            let mut fixture = SessionFixture::new(
                Arc::new(MockFactory::refusing("chromium not found")),
                SuiteConfig::new().with_waits(WaitBudget::instant()),
            );
            let outcome = fixture.run("never", "Navigation", |_s| async { Ok(()) }).await;
            assert_eq!(outcome.status, Status::Broken);
            assert_eq!(fixture.state(), FixtureState::Failed);
            assert!(outcome.find_step("never").is_none());
        }

        #[tokio::test]
        async fn test_viewport_failure_still_quits() {
            let factory = Arc::new(MockFactory::new(MockSite::new().with_max_viewport(1280, 720)));
            let mut fixture = SessionFixture::new(
                factory.clone(),
                SuiteConfig::new().with_waits(WaitBudget::instant()),
            );
            let outcome = fixture.run("never", "Navigation", |_s| async { Ok(()) }).await;

            assert_eq!(outcome.status, Status::Broken);
            assert_eq!(fixture.state(), FixtureState::Failed);
            assert!(outcome.message.as_deref().unwrap().contains("1920x1080"));
            assert!(outcome.find_step("never").is_none());
            assert!(outcome.find_step("Closing browser").is_some());
            assert!(factory.last_driver().unwrap().is_quit());
        }

        #[tokio::test]
        async fn test_outcome_written_to_report_dir() {
            let dir = tempfile::tempdir().unwrap();
            let (_, factory) = fixture();
            let mut fixture = SessionFixture::new(
                factory,
                SuiteConfig::new()
                    .with_waits(WaitBudget::instant())
                    .with_report_dir(dir.path()),
            );
            let outcome = fixture.run("written", "Reports", |_s| async { Ok(()) }).await;
            assert!(dir.path().join(format!("{}-result.json", outcome.uuid)).exists());
        }
    }
}
