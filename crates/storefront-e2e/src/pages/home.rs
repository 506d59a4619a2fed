//! Storefront home page.

use tracing::info;

use crate::locator::Locator;
use crate::page_object::{PageObject, PageUrl};
use crate::pages::{ProductPage, RegisterPage, SearchResultsPage, StoreHeader};
use crate::result::StorefrontResult;
use crate::session::Session;

/// "My account" dropdown
pub const ACCOUNT_MENU: Locator = Locator::xpath("//a[@title='Личный кабинет']");

/// Registration entry in the account dropdown
pub const REGISTER_LINK: Locator = Locator::xpath("//a[contains(text(),'Регистрация')]");

/// "Computers" top menu entry
pub const COMPUTERS_MENU: Locator = Locator::xpath("//a[contains(text(),'Компьютеры')]");

/// PC sub-category revealed by hovering the computers menu
pub const PC_LINK: Locator =
    Locator::xpath("//a[contains(text(),'PC') and contains(@href,'path=20_26')]");

/// Home page
#[derive(Debug)]
pub struct HomePage {
    session: Session,
    url: PageUrl,
}

impl PageObject for HomePage {
    fn session(&self) -> &Session {
        &self.session
    }

    fn page_url(&self) -> &PageUrl {
        &self.url
    }
}

impl HomePage {
    /// Home page of the configured storefront
    #[must_use]
    pub fn new(session: Session) -> Self {
        let url = PageUrl::Route(session.routes().home());
        Self { session, url }
    }

    /// Header component of this page
    #[must_use]
    pub fn header(self) -> StoreHeader {
        StoreHeader::new(self.session)
    }

    /// Follow the first link whose text contains `name`
    pub async fn go_to_product_page(self, name: &str) -> StorefrontResult<ProductPage> {
        info!(product = name, "going to product page");
        self.session
            .step(format!("Go to product page {name}"), async {
                let link = self.clickable_element(&Locator::link_containing(name)).await?;
                self.session.click(&link).await
            })
            .await?;
        Ok(ProductPage::new(self.session))
    }

    /// Open the account menu and follow its registration link
    pub async fn go_to_register_page(self) -> StorefrontResult<RegisterPage> {
        info!("navigating to registration page");
        self.session
            .step("Go to registration page", async {
                let menu = self.clickable_element(&ACCOUNT_MENU).await?;
                self.session.click(&menu).await?;
                let link = self.clickable_element(&REGISTER_LINK).await?;
                self.session.click(&link).await
            })
            .await?;
        Ok(RegisterPage::new(self.session))
    }

    /// Search through the header
    pub async fn search_product(self, query: &str) -> StorefrontResult<SearchResultsPage> {
        self.header().search_product(query).await
    }

    /// Hover the computers menu and follow its PC link
    pub async fn open_pc_category(self) -> StorefrontResult<Session> {
        info!("opening PC category via menu");
        self.session
            .step("Open PC category via menu", async {
                let menu = self.visible_element(&COMPUTERS_MENU).await?;
                self.session.hover(&menu).await?;
                self.session.short_settle().await;
                let link = self.clickable_element(&PC_LINK).await?;
                self.session.click(&link).await
            })
            .await?;
        Ok(self.session)
    }
}
