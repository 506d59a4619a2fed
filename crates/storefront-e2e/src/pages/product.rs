//! Product details page: gallery, wishlist, cart and reviews.

use tracing::{error, info, warn};

use crate::driver::ElementHandle;
use crate::locator::{Locator, Readiness};
use crate::page_object::{Confirmation, PageObject, PageUrl};
use crate::result::{StorefrontError, StorefrontResult};
use crate::session::Session;

/// Product name heading
pub const TITLE: Locator = Locator::xpath("//div[@id='content']//h1");

/// Gallery thumbnails
pub const THUMBNAILS: Locator = Locator::css("ul.thumbnails li a.thumbnail");

/// Image shown by the lightbox
pub const LIGHTBOX_IMAGE: Locator = Locator::css(".mfp-image");

/// Lightbox close button
pub const LIGHTBOX_CLOSE: Locator = Locator::css("button.mfp-close");

/// Lightbox container
pub const LIGHTBOX_CONTENT: Locator = Locator::css(".mfp-content");

/// "Add to wishlist" button
pub const WISHLIST_BUTTON: Locator = Locator::css("button[data-original-title='В закладки']");

/// Success banner
pub const SUCCESS_ALERT: Locator = Locator::css("div.alert-success");

/// Review tab link
pub const WRITE_REVIEW: Locator = Locator::xpath("//a[contains(text(),'Написать отзыв')]");

/// Reviewer name input
pub const REVIEW_NAME: Locator = Locator::xpath("//input[@placeholder='Ваше имя']");

/// Review body textarea
pub const REVIEW_TEXT: Locator = Locator::xpath("//textarea[@placeholder='Ваш отзыв']");

/// Rating radios, lowest first
pub const RATING: Locator = Locator::xpath("//input[@name='rating']");

/// Review submit button
pub const REVIEW_SUBMIT: Locator = Locator::xpath("//button[contains(text(),'Продолжить')]");

/// Quantity input
pub const QUANTITY: Locator = Locator::css("input[name='quantity']");

/// "Add to cart" button
pub const CART_BUTTON: Locator = Locator::css("button#button-cart");

/// Reason reported when a submitted review is never acknowledged
pub const REVIEW_UNCONFIRMED: &str = "Форма отправлена, но сообщение не найдено";

/// Tally of one pass over the gallery thumbnails
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThumbnailReport {
    /// Thumbnails found
    pub total: usize,
    /// Thumbnails opened, captured and closed without error
    pub previewed: usize,
    /// Close buttons clicked
    pub closes_attempted: usize,
    /// Failed thumbnails with their error
    pub failures: Vec<(usize, String)>,
}

impl ThumbnailReport {
    /// Every thumbnail went through cleanly
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty() && self.previewed == self.total
    }
}

/// Product page
#[derive(Debug)]
pub struct ProductPage {
    session: Session,
    url: PageUrl,
}

impl PageObject for ProductPage {
    fn session(&self) -> &Session {
        &self.session
    }

    fn page_url(&self) -> &PageUrl {
        &self.url
    }
}

impl ProductPage {
    /// Product page the session currently shows
    #[must_use]
    pub const fn new(session: Session) -> Self {
        Self {
            session,
            url: PageUrl::Current,
        }
    }

    /// Product name as displayed
    pub async fn get_product_title(&self) -> StorefrontResult<String> {
        self.session
            .step("Get product title", async {
                let heading = self.visible_element(&TITLE).await?;
                let title = self.session.text(&heading).await?;
                info!(%title, "product title");
                Ok(title)
            })
            .await
    }

    /// Open, capture and close every gallery thumbnail in turn.
    ///
    /// A thumbnail that fails is logged, captured as `thumbnail_error_{i}`
    /// and skipped; only a gallery that never appears fails the call.
    pub async fn click_all_thumbnails(&self) -> StorefrontResult<ThumbnailReport> {
        info!("clicking all product thumbnails");
        self.session
            .step("Click all product thumbnails", async {
                let thumbnails = self.session.primary().for_all(&THUMBNAILS).await?;
                let mut report = ThumbnailReport {
                    total: thumbnails.len(),
                    ..ThumbnailReport::default()
                };

                for (i, thumbnail) in thumbnails.iter().enumerate() {
                    let outcome = self
                        .session
                        .step(
                            format!("Thumbnail {}", i + 1),
                            self.preview(i, thumbnail, &mut report.closes_attempted),
                        )
                        .await;
                    match outcome {
                        Ok(()) => report.previewed += 1,
                        Err(e) => {
                            error!(thumbnail = i + 1, error = %e, "thumbnail preview failed");
                            let name = format!("thumbnail_error_{i}");
                            if let Err(shot) = self.session.screenshot(&name).await {
                                warn!(error = %shot, "could not capture thumbnail failure");
                            }
                            report.failures.push((i, e.to_string()));
                        }
                    }
                }

                info!(
                    total = report.total,
                    previewed = report.previewed,
                    failed = report.failures.len(),
                    "thumbnails processed"
                );
                Ok(report)
            })
            .await
    }

    async fn preview(
        &self,
        index: usize,
        thumbnail: &ElementHandle,
        closes_attempted: &mut usize,
    ) -> StorefrontResult<()> {
        let session = &self.session;
        session.scroll_into_view(thumbnail).await?;
        session.click(thumbnail).await?;
        session.short_settle().await;

        session.secondary().for_element(&LIGHTBOX_IMAGE, Readiness::Visible).await?;
        session.screenshot(&format!("thumbnail_{index}_preview")).await?;

        let close = session.secondary().for_element(&LIGHTBOX_CLOSE, Readiness::Clickable).await?;
        *closes_attempted += 1;
        session.click(&close).await?;
        session.secondary().until_hidden(&LIGHTBOX_CONTENT).await
    }

    /// Add the product to the wishlist and wait for the success banner
    pub async fn add_to_wishlist(self) -> StorefrontResult<Session> {
        info!("adding product to wishlist");
        self.session
            .step("Add product to wishlist", async {
                let button = self.clickable_element(&WISHLIST_BUTTON).await?;
                self.session.click(&button).await?;
                self.visible_element(&SUCCESS_ALERT).await?;
                self.session.screenshot("wishlist_success").await
            })
            .await?;
        Ok(self.session)
    }

    /// Fill and submit the review form.
    ///
    /// Returns the success banner text, or `Unconfirmed` when the banner
    /// never shows up after submitting. A `rating` outside the available
    /// radios leaves the rating untouched.
    pub async fn write_review(
        &self,
        name: &str,
        text: &str,
        rating: usize,
    ) -> StorefrontResult<Confirmation<String>> {
        info!(rating, "writing product review");
        let session = &self.session;
        session
            .step(format!("Write product review (rating: {rating})"), async {
                session.scroll_to_bottom().await?;
                session.short_settle().await;

                let tab = self.clickable_element(&WRITE_REVIEW).await?;
                session.click(&tab).await?;
                session.short_settle().await;

                let name_input = self.visible_element(&REVIEW_NAME).await?;
                session.type_text(&name_input, name).await?;
                let text_input = self.visible_element(&REVIEW_TEXT).await?;
                session.type_text(&text_input, text).await?;

                let radios = session.find_elements(&RATING).await?;
                match rating.checked_sub(1).and_then(|i| radios.get(i)) {
                    Some(radio) => {
                        session.scroll_into_view(radio).await?;
                        session.click(radio).await?;
                    }
                    None => warn!(rating, available = radios.len(), "rating not selectable"),
                }
                session.screenshot("review_form_filled").await?;

                let submit = self.clickable_element(&REVIEW_SUBMIT).await?;
                session.click(&submit).await?;

                let banner = match self.visible_element(&SUCCESS_ALERT).await {
                    Ok(alert) => session.text(&alert).await,
                    Err(e) => Err(e),
                };
                match Confirmation::from_result(banner)? {
                    Confirmation::Confirmed(message) => {
                        session.screenshot("review_success").await?;
                        Ok(Confirmation::Confirmed(message))
                    }
                    Confirmation::Unconfirmed { reason } => {
                        warn!(%reason, "review submitted but no confirmation found");
                        Ok(Confirmation::Unconfirmed {
                            reason: REVIEW_UNCONFIRMED.to_string(),
                        })
                    }
                }
            })
            .await
    }

    /// Replace the quantity to order
    pub async fn set_quantity(&self, quantity: u32) -> StorefrontResult<()> {
        if quantity == 0 {
            return Err(StorefrontError::InputError {
                message: "quantity must be at least 1".to_string(),
            });
        }
        self.session
            .step(format!("Set quantity to {quantity}"), async {
                let input = self.clickable_element(&QUANTITY).await?;
                self.session.fill(&input, &quantity.to_string()).await
            })
            .await
    }

    /// Click "add to cart", let the cart update and capture it
    pub async fn add_to_cart(&self) -> StorefrontResult<()> {
        info!("adding product to cart");
        self.session
            .step("Add product to cart", async {
                let button = self.clickable_element(&CART_BUTTON).await?;
                self.session.click(&button).await?;
                self.session.settle().await;
                self.session.screenshot("product_added_to_cart").await
            })
            .await
    }
}
