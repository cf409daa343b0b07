//! HTML parser for Amazon product pages.

use crate::amazon::models::{Extraction, PriceQuote};
use crate::amazon::selectors::{errors, price};
use anyhow::Result;
use regex_lite::Regex;
use scraper::{ElementRef, Html};
use std::sync::LazyLock;
use tracing::{debug, trace};

/// Integer, or integer with a single decimal fraction.
static PRICE_TOKEN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+\.\d+|\d+").unwrap());

/// Parser for Amazon product pages.
#[derive(Debug, Default, Clone, Copy)]
pub struct Parser;

impl Parser {
    /// Creates a new parser.
    pub fn new() -> Self {
        Self
    }

    /// Reads the buy-box price from a product page.
    ///
    /// A page with a price container is always read. Without one, CAPTCHA and
    /// error pages fail; anything else is [`Extraction::NotFound`].
    pub fn extract(&self, html: &str) -> Result<Extraction> {
        let document = Html::parse_document(html);

        let Some(container) = self.find_price_container(&document) else {
            self.check_for_errors(&document)?;
            debug!("No price container on page");
            return Ok(Extraction::NotFound);
        };

        let text = self.price_text(container);
        trace!("Price text: {:?}", text);

        let Some(price) = self.parse_price_value(&text) else {
            debug!("Price container holds no number: {:?}", text);
            return Ok(Extraction::MalformedPrice { text });
        };

        // A parsed price means the text has a digit, so the prefix always exists.
        let currency = self.find_currency(&text).unwrap_or_default();

        Ok(Extraction::Found(PriceQuote { price, currency }))
    }

    /// Checks for CAPTCHA or error pages.
    fn check_for_errors(&self, document: &Html) -> Result<()> {
        if document.select(&errors::CAPTCHA).next().is_some() {
            anyhow::bail!("CAPTCHA detected. Amazon is blocking requests.");
        }

        if document.select(&errors::DOG_PAGE).next().is_some() {
            anyhow::bail!("Amazon error page detected (503).");
        }

        Ok(())
    }

    /// Returns the first price container, trying selectors in priority order.
    fn find_price_container<'a>(&self, document: &'a Html) -> Option<ElementRef<'a>> {
        price::candidates().into_iter().find_map(|selector| document.select(selector).next())
    }

    /// Text of the container's first nested span, or its own text without one.
    fn price_text(&self, container: ElementRef) -> String {
        container
            .select(&price::TEXT)
            .next()
            .unwrap_or(container)
            .text()
            .collect::<String>()
    }

    /// Parses the first numeric token in the text.
    fn parse_price_value(&self, text: &str) -> Option<f64> {
        PRICE_TOKEN.find(text)?.as_str().parse().ok()
    }

    /// Returns everything before the first alphanumeric character, or `None`
    /// when the text has no alphanumeric character at all.
    fn find_currency(&self, text: &str) -> Option<String> {
        let end = text.find(char::is_alphanumeric)?;
        Some(text[..end].to_string())
    }
}
