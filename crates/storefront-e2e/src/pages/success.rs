//! Page shown after a successful registration.

use tracing::info;

use crate::config::Routes;
use crate::locator::Locator;
use crate::page_object::{PageObject, PageUrl};
use crate::pages::StoreHeader;
use crate::result::StorefrontResult;
use crate::session::Session;
use crate::wait::UrlPattern;

/// Confirmation heading
pub const HEADING: Locator = Locator::xpath("//div[@id='content']/h1");

/// Heading text of a created account
pub const ACCOUNT_CREATED: &str = "Ваша учетная запись создана!";

/// Registration success page
#[derive(Debug)]
pub struct SuccessRegisterPage {
    session: Session,
    url: PageUrl,
}

impl PageObject for SuccessRegisterPage {
    fn session(&self) -> &Session {
        &self.session
    }

    fn page_url(&self) -> &PageUrl {
        &self.url
    }
}

impl SuccessRegisterPage {
    /// Wait for the session to reach the success route
    pub async fn arrive(session: Session) -> StorefrontResult<Self> {
        let pattern = UrlPattern::Contains(Routes::ACCOUNT_SUCCESS.to_string());
        let url = session.wait_for_url(&pattern).await?;
        Ok(Self {
            session,
            url: PageUrl::Route(url),
        })
    }

    /// Heading text
    pub async fn get_success_message(&self) -> StorefrontResult<String> {
        self.session
            .step("Get registration success message", async {
                let heading = self.visible_element(&HEADING).await?;
                let message = self.session.text(&heading).await?;
                info!(%message, "registration success message");
                self.session.screenshot("registration_success").await?;
                Ok(message)
            })
            .await
    }

    /// Header, for continuing as the new account
    #[must_use]
    pub fn header(self) -> StoreHeader {
        StoreHeader::new(self.session)
    }
}
