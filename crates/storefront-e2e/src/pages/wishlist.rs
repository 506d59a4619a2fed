//! Account wishlist.

use serde::Serialize;
use tracing::{info, warn};

use crate::driver::ElementHandle;
use crate::locator::Locator;
use crate::page_object::{Confirmation, PageObject, PageUrl};
use crate::result::StorefrontResult;
use crate::session::Session;

/// Wishlist table rows
pub const ROWS: Locator = Locator::css("table.table tbody tr");

/// Product link inside a row
pub const NAME_CELL: Locator = Locator::css("td.text-left a");

/// One wishlist row
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WishlistItem {
    /// Row element
    pub row: ElementHandle,
    /// Product name, empty when the row has no name cell
    pub name: String,
}

/// Wishlist page
#[derive(Debug)]
pub struct WishlistPage {
    session: Session,
    url: PageUrl,
}

impl PageObject for WishlistPage {
    fn session(&self) -> &Session {
        &self.session
    }

    fn page_url(&self) -> &PageUrl {
        &self.url
    }
}

impl WishlistPage {
    /// Wishlist at its canonical route
    #[must_use]
    pub fn new(session: Session) -> Self {
        let url = PageUrl::Route(session.routes().wishlist());
        Self { session, url }
    }

    /// Rows of the wishlist table.
    ///
    /// `Unconfirmed` when no row shows up within the primary budget.
    pub async fn get_wishlist_items(&self) -> StorefrontResult<Confirmation<Vec<WishlistItem>>> {
        self.session
            .step("Get wishlist items", async {
                let rows = Confirmation::from_result(self.session.primary().for_all(&ROWS).await)?;
                let rows = match rows {
                    Confirmation::Confirmed(rows) => rows,
                    Confirmation::Unconfirmed { reason } => {
                        warn!(%reason, "no wishlist rows");
                        return Ok(Confirmation::Unconfirmed { reason });
                    }
                };

                let mut items = Vec::with_capacity(rows.len());
                for row in rows {
                    let name = match self.session.find_children(&row, &NAME_CELL).await?.first() {
                        Some(cell) => self.session.text(cell).await?,
                        None => String::new(),
                    };
                    items.push(WishlistItem { row, name });
                }
                info!(count = items.len(), "wishlist items");
                self.session.screenshot("wishlist_items").await?;
                Ok(Confirmation::Confirmed(items))
            })
            .await
    }
}
