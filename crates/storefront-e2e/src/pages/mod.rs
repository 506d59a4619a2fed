//! Storefront page objects.
//!
//! | Page | Reached from |
//! |------|--------------|
//! | [`HomePage`] | its route |
//! | [`ProductPage`] | a product link on home or search results |
//! | [`RegisterPage`] | the account menu |
//! | [`SuccessRegisterPage`] | a submitted registration |
//! | [`SearchResultsPage`] | the header search |
//! | [`WishlistPage`] | its route |
//!
//! Leaving a page consumes it, and page objects are not `Clone`:
//!
//! ```compile_fail
//! # use storefront_e2e::{HomePage, Session};
//! # async fn stale(session: Session) {
//! let home = HomePage::new(session);
//! let _product = home.go_to_product_page("MacBook").await;
//! let _register = home.go_to_register_page().await;
//! # }
//! ```
//!
//! ```compile_fail
//! # use storefront_e2e::{HomePage, Session};
//! # fn copy(session: Session) {
//! let home = HomePage::new(session);
//! let _copy: HomePage = home.clone();
//! # }
//! ```

pub mod header;
pub mod home;
pub mod product;
pub mod register;
pub mod search;
pub mod success;
pub mod wishlist;

pub use header::StoreHeader;
pub use home::HomePage;
pub use product::{ProductPage, ThumbnailReport};
pub use register::{RegisterPage, Registration};
pub use search::SearchResultsPage;
pub use success::SuccessRegisterPage;
pub use wishlist::{WishlistItem, WishlistPage};
