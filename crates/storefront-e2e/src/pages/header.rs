//! Store header shared by every storefront page.

use tracing::info;

use crate::locator::{Locator, Readiness};
use crate::pages::SearchResultsPage;
use crate::result::StorefrontResult;
use crate::session::Session;

/// Search box in the header
pub const SEARCH_INPUT: Locator = Locator::css("input[name='search']");

/// Search submit button
pub const SEARCH_BUTTON: Locator = Locator::css("#search button");

/// Header component; consumed by the search it starts
#[derive(Debug)]
pub struct StoreHeader {
    session: Session,
}

impl StoreHeader {
    /// Header of whatever page the session shows
    #[must_use]
    pub const fn new(session: Session) -> Self {
        Self { session }
    }

    /// Type `query` into the search box and submit it
    pub async fn search_product(self, query: &str) -> StorefrontResult<SearchResultsPage> {
        info!(query, "searching for product");
        let session = &self.session;
        session
            .step(format!("Search product: {query}"), async {
                let input = session.wait_for(&SEARCH_INPUT, Readiness::Visible).await?;
                session.fill(&input, query).await?;
                session.screenshot("search_input").await?;
                let button = session.wait_for(&SEARCH_BUTTON, Readiness::Clickable).await?;
                session.click(&button).await
            })
            .await?;
        Ok(SearchResultsPage::new(self.session))
    }
}
