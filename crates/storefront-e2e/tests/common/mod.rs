//! Scripted storefront shared by the journey tests.
#![allow(dead_code)]

use std::sync::Arc;

use storefront_e2e::locator::Locator;
use storefront_e2e::pages::{header, home, product, register, search, success, wishlist};
use storefront_e2e::{
    Effect, MockElement, MockFactory, MockPage, MockSite, Routes, SessionFixture, SuiteConfig,
    WaitBudget,
};

pub const BASE: &str = "http://shop.test/index.php";

pub const REVIEW_THANKS: &str =
    "Спасибо за ваш отзыв. Он был отправлен администратору для одобрения.";

const REVIEW_ALERT: Locator = Locator::css("#review-alert");
const WISHLIST_ALERT: Locator = Locator::css("#wishlist-alert");

/// Catalogue entry: link text, heading and product id
struct Item {
    link: &'static str,
    title: &'static str,
    id: u32,
}

const CATALOGUE: [Item; 5] = [
    Item { link: "MacBook", title: "MacBook", id: 43 },
    Item { link: "iPhone", title: "iPhone", id: 40 },
    Item { link: "Nikon D300", title: "Nikon D300", id: 31 },
    Item { link: "Samsung Galaxy Tab 10.1", title: "Samsung Galaxy Tab 10.1", id: 49 },
    Item { link: "HTC", title: "HTC Touch HD", id: 28 },
];

/// Knobs for scripting failure paths
#[derive(Debug, Clone)]
pub struct StoreOptions {
    /// Gallery size of every product
    pub thumbnails: usize,
    /// Thumbnail whose click never opens the lightbox
    pub broken_thumbnail: Option<usize>,
    /// Whether submitting a review shows the thank-you banner
    pub review_acknowledged: bool,
    /// Product names listed in the wishlist
    pub wishlist: Vec<&'static str>,
    /// Whether "continue" on the registration form leads anywhere
    pub registration_accepted: bool,
    /// Whether search results carry their heading
    pub search_heading: bool,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            thumbnails: 3,
            broken_thumbnail: None,
            review_acknowledged: true,
            wishlist: vec!["iPhone"],
            registration_accepted: true,
            search_heading: true,
        }
    }
}

pub fn routes() -> Routes {
    Routes::new(BASE)
}

pub fn product_url(id: u32) -> String {
    format!("{}&product_id={id}", routes().route("product/product"))
}

pub fn config() -> SuiteConfig {
    SuiteConfig::new()
        .with_base_url(BASE)
        .with_waits(WaitBudget::instant())
}

/// Fixture over the default storefront, plus the factory for inspection
pub fn fixture() -> (SessionFixture, Arc<MockFactory>) {
    fixture_with(&StoreOptions::default())
}

pub fn fixture_with(options: &StoreOptions) -> (SessionFixture, Arc<MockFactory>) {
    let factory = Arc::new(MockFactory::new(storefront(options)));
    let fixture = SessionFixture::new(factory.clone(), config());
    (fixture, factory)
}

fn header_elements() -> Vec<MockElement> {
    let template = format!("{}&search={{value}}", routes().route("product/search"));
    vec![
        MockElement::new(header::SEARCH_INPUT),
        MockElement::new(header::SEARCH_BUTTON).on_click(Effect::NavigateWithValue {
            input: header::SEARCH_INPUT,
            template,
        }),
    ]
}

fn product_link(item: &Item) -> MockElement {
    MockElement::new(Locator::link_containing(item.link))
        .text(item.title)
        .on_click(Effect::Navigate(product_url(item.id)))
}

fn home_page() -> MockPage {
    let routes = routes();
    MockPage::new()
        .with_all(header_elements())
        .with(
            MockElement::new(home::ACCOUNT_MENU)
                .text("Личный кабинет")
                .on_click(Effect::Show(home::REGISTER_LINK)),
        )
        .with(
            MockElement::new(home::REGISTER_LINK)
                .text("Регистрация")
                .hidden()
                .on_click(Effect::Navigate(routes.register())),
        )
        .with(
            MockElement::new(home::COMPUTERS_MENU)
                .text("Компьютеры")
                .on_hover(Effect::Show(home::PC_LINK)),
        )
        .with(
            MockElement::new(home::PC_LINK)
                .text("PC (0)")
                .hidden()
                .on_click(Effect::Navigate(routes.category("20_26"))),
        )
        .with_all(CATALOGUE[..2].iter().map(product_link))
}

fn product_page(item: &Item, options: &StoreOptions) -> MockPage {
    let thumbnails = (0..options.thumbnails).map(|i| {
        let thumb = MockElement::new(product::THUMBNAILS);
        if options.broken_thumbnail == Some(i) {
            thumb
        } else {
            thumb
                .on_click(Effect::Show(product::LIGHTBOX_CONTENT))
                .on_click(Effect::Show(product::LIGHTBOX_CLOSE))
        }
    });
    let mut submit = MockElement::new(product::REVIEW_SUBMIT).text("Продолжить");
    if options.review_acknowledged {
        submit = submit.on_click(Effect::Show(REVIEW_ALERT));
    }

    MockPage::new()
        .with_all(header_elements())
        .with(MockElement::new(product::TITLE).text(item.title))
        .with_all(thumbnails)
        .with(
            MockElement::new(product::LIGHTBOX_CONTENT)
                .also(product::LIGHTBOX_IMAGE)
                .hidden(),
        )
        .with(
            MockElement::new(product::LIGHTBOX_CLOSE)
                .hidden()
                .on_click(Effect::Hide(product::LIGHTBOX_CONTENT))
                .on_click(Effect::Hide(product::LIGHTBOX_CLOSE)),
        )
        .with(MockElement::new(product::WISHLIST_BUTTON).on_click(Effect::Show(WISHLIST_ALERT)))
        .with(
            MockElement::new(product::SUCCESS_ALERT)
                .also(REVIEW_ALERT)
                .text(REVIEW_THANKS)
                .hidden(),
        )
        .with(
            MockElement::new(product::SUCCESS_ALERT)
                .also(WISHLIST_ALERT)
                .text(format!("Успех: Вы добавили {} в закладки!", item.title))
                .hidden(),
        )
        .with(
            MockElement::new(product::WRITE_REVIEW)
                .text("Написать отзыв")
                .on_click(Effect::Show(product::REVIEW_NAME))
                .on_click(Effect::Show(product::REVIEW_TEXT)),
        )
        .with(MockElement::new(product::REVIEW_NAME).hidden())
        .with(MockElement::new(product::REVIEW_TEXT).hidden())
        .with_all((0..5).map(|_| MockElement::new(product::RATING)))
        .with(submit)
        .with(MockElement::new(product::QUANTITY))
        .with(MockElement::new(product::CART_BUTTON).text("Купить"))
}

fn search_page(query: &str, hits: &[&Item], options: &StoreOptions) -> MockPage {
    let mut page = MockPage::new().with_all(header_elements());
    if options.search_heading {
        page = page.with(MockElement::new(search::TITLE).text(format!("Поиск - {query}")));
    }
    page.with_all(
        hits.iter()
            .map(|item| MockElement::new(search::PRODUCT_CARD).child(product_link(item))),
    )
}

fn register_page(options: &StoreOptions) -> MockPage {
    let mut proceed = MockElement::new(register::CONTINUE);
    if options.registration_accepted {
        proceed = proceed.on_click(Effect::Navigate(routes().account_success()));
    }
    MockPage::new()
        .with_all(header_elements())
        .with_all(
            [
                register::FIRST_NAME,
                register::LAST_NAME,
                register::EMAIL,
                register::TELEPHONE,
                register::PASSWORD,
                register::CONFIRM,
            ]
            .into_iter()
            .map(MockElement::new),
        )
        // Styled checkbox: the real input is not displayed
        .with(MockElement::new(register::AGREE).hidden())
        .with(proceed)
}

fn success_page() -> MockPage {
    MockPage::new()
        .with_all(header_elements())
        .with(MockElement::new(success::HEADING).text(success::ACCOUNT_CREATED))
}

fn wishlist_page(names: &[&str]) -> MockPage {
    MockPage::new().with_all(names.iter().map(|name| {
        MockElement::new(wishlist::ROWS)
            .child(MockElement::new(Locator::css("td.text-center")))
            .child(MockElement::new(wishlist::NAME_CELL).text(*name))
    }))
}

/// The whole scripted storefront
pub fn storefront(options: &StoreOptions) -> MockSite {
    let routes = routes();
    let mut site = MockSite::new()
        .with_page(routes.home(), home_page())
        .with_page(routes.register(), register_page(options))
        .with_page(routes.account_success(), success_page())
        .with_page(routes.wishlist(), wishlist_page(&options.wishlist))
        .with_page(
            routes.category("20_26"),
            MockPage::new().with(MockElement::new(Locator::tag("h2")).text("PC")),
        );
    for item in &CATALOGUE {
        site = site
            .with_page(product_url(item.id), product_page(item, options))
            .with_page(routes.search(item.link), search_page(item.link, &[item], options));
    }
    site
}
