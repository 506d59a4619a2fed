//! Search results page.

use tracing::{info, warn};

use crate::driver::ElementHandle;
use crate::locator::Locator;
use crate::page_object::{Confirmation, PageObject, PageUrl};
use crate::pages::ProductPage;
use crate::result::StorefrontResult;
use crate::session::Session;

/// Results heading
pub const TITLE: Locator = Locator::tag("h1");

/// One product card
pub const PRODUCT_CARD: Locator = Locator::css(".product-thumb");

/// Search results page
#[derive(Debug)]
pub struct SearchResultsPage {
    session: Session,
    url: PageUrl,
}

impl PageObject for SearchResultsPage {
    fn session(&self) -> &Session {
        &self.session
    }

    fn page_url(&self) -> &PageUrl {
        &self.url
    }
}

impl SearchResultsPage {
    /// Results page the session currently shows
    #[must_use]
    pub const fn new(session: Session) -> Self {
        Self {
            session,
            url: PageUrl::Current,
        }
    }

    /// Heading text, if it shows up in time
    pub async fn get_page_title(&self) -> StorefrontResult<Confirmation<String>> {
        let title = match self.visible_element(&TITLE).await {
            Ok(heading) => self.session.text(&heading).await,
            Err(e) => Err(e),
        };
        let title = Confirmation::from_result(title)?;
        match &title {
            Confirmation::Confirmed(text) => info!(title = %text, "search results title"),
            Confirmation::Unconfirmed { reason } => warn!(%reason, "could not get page title"),
        }
        Ok(title)
    }

    /// Product cards on the page (implicit wait, may be empty)
    pub async fn get_products(&self) -> StorefrontResult<Vec<ElementHandle>> {
        let products = self.session.find_elements(&PRODUCT_CARD).await?;
        info!(count = products.len(), "products in search results");
        Ok(products)
    }

    /// Follow the first result link whose text contains `name`
    pub async fn go_to_product_page(self, name: &str) -> StorefrontResult<ProductPage> {
        info!(product = name, "opening product from search results");
        self.session
            .step(format!("Go to product page {name}"), async {
                let link = self.clickable_element(&Locator::link_containing(name)).await?;
                self.session.click(&link).await
            })
            .await?;
        Ok(ProductPage::new(self.session))
    }
}
