//! Account registration form.

use tracing::info;

use crate::locator::Locator;
use crate::page_object::{PageObject, PageUrl};
use crate::pages::SuccessRegisterPage;
use crate::result::StorefrontResult;
use crate::session::Session;

/// First name input
pub const FIRST_NAME: Locator = Locator::id("input-firstname");
/// Last name input
pub const LAST_NAME: Locator = Locator::id("input-lastname");
/// E-mail input
pub const EMAIL: Locator = Locator::id("input-email");
/// Telephone input
pub const TELEPHONE: Locator = Locator::id("input-telephone");
/// Password input
pub const PASSWORD: Locator = Locator::id("input-password");
/// Password confirmation input
pub const CONFIRM: Locator = Locator::id("input-confirm");
/// Privacy policy checkbox (styled, clicked from script)
pub const AGREE: Locator = Locator::name("agree");
/// Form submit
pub const CONTINUE: Locator = Locator::xpath("//input[@value='Продолжить']");

/// Data for a new account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    /// Given name
    pub first_name: String,
    /// Family name
    pub last_name: String,
    /// Account e-mail, must be unused
    pub email: String,
    /// Phone number
    pub telephone: String,
    /// Password, typed twice
    pub password: String,
}

impl Registration {
    /// Registration for `email` with the given personal data
    #[must_use]
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
        telephone: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
            telephone: telephone.into(),
            password: password.into(),
        }
    }
}

/// Registration page
#[derive(Debug)]
pub struct RegisterPage {
    session: Session,
    url: PageUrl,
}

impl PageObject for RegisterPage {
    fn session(&self) -> &Session {
        &self.session
    }

    fn page_url(&self) -> &PageUrl {
        &self.url
    }
}

impl RegisterPage {
    /// Registration page the session currently shows
    #[must_use]
    pub const fn new(session: Session) -> Self {
        Self {
            session,
            url: PageUrl::Current,
        }
    }

    /// Fill the form, accept the policy and submit.
    ///
    /// Resolves once the browser reaches the account success route.
    pub async fn register_user(self, registration: &Registration) -> StorefrontResult<SuccessRegisterPage> {
        info!(email = %registration.email, "registering user");
        let title = format!(
            "Register user {} {}",
            registration.first_name, registration.last_name
        );
        self.session
            .step(title, async {
                let fields = [
                    (&FIRST_NAME, registration.first_name.as_str()),
                    (&LAST_NAME, registration.last_name.as_str()),
                    (&EMAIL, registration.email.as_str()),
                    (&TELEPHONE, registration.telephone.as_str()),
                    (&PASSWORD, registration.password.as_str()),
                    (&CONFIRM, registration.password.as_str()),
                ];
                for (locator, value) in fields {
                    let input = self.visible_element(locator).await?;
                    self.session.type_text(&input, value).await?;
                }

                let agree = self.element(&AGREE).await?;
                self.session.force_click(&agree).await?;
                self.session.screenshot("registration_form_filled").await?;

                let submit = self.clickable_element(&CONTINUE).await?;
                self.session.click(&submit).await
            })
            .await?;
        SuccessRegisterPage::arrive(self.session).await
    }
}
