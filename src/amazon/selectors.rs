//! Selectors for the buy-box price on Amazon product pages.
//!
//! Two layouts carry the price: the older `apexPriceToPay` span and the
//! newer `priceToPay` span. Both wrap an `a-offscreen` span holding the
//! full price text ("$9.04"). The error-page selectors are consulted only
//! when neither container is present.

use scraper::Selector;
use std::sync::LazyLock;

/// Selectors for the buy-box price on product pages.
pub mod price {
    use super::*;

    /// Primary price container ("apex" buy box).
    pub static PRIMARY: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("span.apexPriceToPay").unwrap());

    /// Fallback price container used by the newer page layout.
    pub static FALLBACK: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("span.priceToPay").unwrap());

    /// Text-bearing child inside a price container.
    pub static TEXT: LazyLock<Selector> = LazyLock::new(|| Selector::parse("span").unwrap());

    /// Candidate containers in the order they are tried.
    pub fn candidates() -> [&'static Selector; 2] {
        [&*PRIMARY, &*FALLBACK]
    }
}

/// Selectors for detecting error/captcha pages.
pub mod errors {
    use super::*;

    /// CAPTCHA form.
    pub static CAPTCHA: LazyLock<Selector> = LazyLock::new(|| {
        Selector::parse(
            "form[action*='validateCaptcha'], \
             img[src*='captcha']",
        )
        .unwrap()
    });

    /// Dog page (Amazon's 503 error page) links back with this ref.
    pub static DOG_PAGE: LazyLock<Selector> =
        LazyLock::new(|| Selector::parse("a[href='/ref=cs_503_link']").unwrap());
}
