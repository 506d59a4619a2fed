//! Shopper journeys.
//!
//! Each journey is an `async fn(Session) -> StorefrontResult<()>` meant to be
//! run by [`SessionFixture::run`](crate::fixture::SessionFixture::run) in its
//! own browser. Journeys only compose page-object actions and check their
//! results; semantic mismatches surface as
//! [`StorefrontError::AssertionFailed`].

use tracing::{info, warn};

use crate::email::random_email;
use crate::page_object::{Confirmation, PageObject};
use crate::pages::success::ACCOUNT_CREATED;
use crate::pages::{HomePage, Registration, WishlistPage};
use crate::result::{StorefrontError, StorefrontResult};
use crate::session::Session;
use crate::wait::UrlPattern;

/// Product used by the gallery journey
pub const GALLERY_PRODUCT: &str = "MacBook";

/// Category path of the PC sub-menu
pub const PC_CATEGORY_PATH: &str = "path=20_26";

/// Product searched for and wished for
pub const SEARCH_QUERY: &str = "iPhone";

/// Product reviewed
pub const REVIEW_PRODUCT: &str = "iPhone";

/// Reviewer display name
pub const REVIEW_AUTHOR: &str = "Тестовый Пользователь";

/// Review body
pub const REVIEW_TEXT: &str = "Это автоматически созданный отзыв. Товар хорошего качества!";

/// Star rating given
pub const REVIEW_RATING: usize = 5;

/// Word expected in the review acknowledgement (lowercase)
pub const REVIEW_THANKS: &str = "спасибо";

/// One "add to cart" scenario
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartCase {
    /// Text typed into the search box
    pub query: &'static str,
    /// Link text of the product to open
    pub product: &'static str,
    /// Quantity to order; `None` keeps the page default
    pub quantity: Option<u32>,
}

/// Camera, three units
pub const CAMERA: CartCase = CartCase {
    query: "Nikon D300",
    product: "Nikon D300",
    quantity: Some(3),
};

/// Tablet, default quantity
pub const TABLET: CartCase = CartCase {
    query: "Samsung Galaxy Tab 10.1",
    product: "Samsung Galaxy Tab 10.1",
    quantity: None,
};

/// HTC phone, default quantity
pub const HTC_PHONE: CartCase = CartCase {
    query: "HTC",
    product: "HTC",
    quantity: None,
};

/// Every cart scenario
pub const CART_CASES: [CartCase; 3] = [CAMERA, TABLET, HTC_PHONE];

/// Fail with an assertion error unless `condition` holds
pub fn ensure(condition: bool, message: impl FnOnce() -> String) -> StorefrontResult<()> {
    if condition {
        Ok(())
    } else {
        Err(StorefrontError::assertion(message()))
    }
}

/// The account every registering journey creates, with a fresh e-mail
#[must_use]
pub fn test_registration() -> Registration {
    Registration::new("Иван", "Петров", random_email(), "+79123456789", "TestPassword123")
}

fn expect_title(expected: &str, title: &str) -> StorefrontResult<()> {
    ensure(title.contains(expected), || {
        format!("Expected '{expected}' in title, got '{title}'")
    })
}

/// Open a product and flip through its gallery
pub async fn product_screenshots_switching(session: Session) -> StorefrontResult<()> {
    let home = HomePage::new(session);
    home.open().await?;

    let product = home.go_to_product_page(GALLERY_PRODUCT).await?;
    expect_title(GALLERY_PRODUCT, &product.get_product_title().await?)?;

    let report = product.click_all_thumbnails().await?;
    if !report.failures.is_empty() {
        warn!(
            failed = report.failures.len(),
            total = report.total,
            "some thumbnails could not be previewed"
        );
    }
    Ok(())
}

/// Reach the (empty) PC category through the hover menu
pub async fn empty_pc_category_via_menu(session: Session) -> StorefrontResult<()> {
    let home = HomePage::new(session);
    home.open().await?;

    let session = home.open_pc_category().await?;
    session
        .wait_for_url(&UrlPattern::Contains(PC_CATEGORY_PATH.to_string()))
        .await?;
    session.settle().await;
    Ok(())
}

/// Register a new account and check the confirmation heading
pub async fn user_registration(session: Session) -> StorefrontResult<()> {
    let home = HomePage::new(session);
    home.open().await?;

    let register = home.go_to_register_page().await?;
    let success = register.register_user(&test_registration()).await?;

    let message = success.get_success_message().await?;
    ensure(message.contains(ACCOUNT_CREATED), || {
        format!("Expected registration success message, got '{message}'")
    })
}

/// Search from the header and check that results show up
pub async fn search_product(session: Session) -> StorefrontResult<()> {
    let home = HomePage::new(session.clone());
    home.open().await?;

    let results = home.search_product(SEARCH_QUERY).await?;
    session
        .wait_for_url(&UrlPattern::Contains(format!("search={SEARCH_QUERY}")))
        .await?;

    // The heading is cosmetic on this site; a mismatch is only logged
    match results.get_page_title().await? {
        Confirmation::Confirmed(title) if !title.contains(SEARCH_QUERY) => {
            warn!(%title, query = SEARCH_QUERY, "search title does not mention the query");
        }
        Confirmation::Confirmed(_) => {}
        Confirmation::Unconfirmed { reason } => warn!(%reason, "search title not shown"),
    }

    let products = results.get_products().await?;
    ensure(!products.is_empty(), || {
        format!("Expected search results for '{SEARCH_QUERY}', got none")
    })
}

/// Register, wish for a product and find it alone in the wishlist
pub async fn add_product_to_wishlist(session: Session) -> StorefrontResult<()> {
    let home = HomePage::new(session);
    home.open().await?;

    let register = home.go_to_register_page().await?;
    let account = register.register_user(&test_registration()).await?;

    let results = account.header().search_product(SEARCH_QUERY).await?;
    let product = results.go_to_product_page(SEARCH_QUERY).await?;
    expect_title(SEARCH_QUERY, &product.get_product_title().await?)?;

    let session = product.add_to_wishlist().await?;
    let wishlist = WishlistPage::new(session);
    wishlist.open().await?;

    let items = wishlist.get_wishlist_items().await?.confirmed().unwrap_or_default();
    ensure(items.len() == 1, || {
        format!("Expected 1 item in wishlist, got {}", items.len())
    })?;
    let name = &items[0].name;
    ensure(name.contains(SEARCH_QUERY), || {
        format!("Expected '{SEARCH_QUERY}' in wishlist, got '{name}'")
    })
}

/// Search for a product, open it and put it in the cart
pub async fn add_to_cart(session: Session, case: CartCase) -> StorefrontResult<()> {
    info!(product = case.product, quantity = ?case.quantity, "add to cart journey");
    let home = HomePage::new(session);
    home.open().await?;

    let results = home.search_product(case.query).await?;
    let product = results.go_to_product_page(case.product).await?;
    if let Some(quantity) = case.quantity {
        product.set_quantity(quantity).await?;
    }
    product.add_to_cart().await
}

/// Leave a five-star review; a missing acknowledgement is tolerated
pub async fn write_product_review(session: Session) -> StorefrontResult<()> {
    let home = HomePage::new(session.clone());
    home.open().await?;

    let product = home.go_to_product_page(REVIEW_PRODUCT).await?;
    expect_title(REVIEW_PRODUCT, &product.get_product_title().await?)?;

    match product.write_review(REVIEW_AUTHOR, REVIEW_TEXT, REVIEW_RATING).await? {
        Confirmation::Confirmed(message) => ensure(message.to_lowercase().contains(REVIEW_THANKS), || {
            format!("Expected success message not found, got: '{message}'")
        }),
        Confirmation::Unconfirmed { reason } => {
            warn!(%reason, "review acknowledgement missing, form was filled");
            session.screenshot("review_submit_error").await
        }
    }
}
