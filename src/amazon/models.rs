//! Data models for extracted prices.

use serde::{Deserialize, Serialize};

/// A price read off a product page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
    /// Numeric price
    pub price: f64,
    /// Text before the first alphanumeric character, as printed ("$", "£", "")
    pub currency: String,
}

impl PriceQuote {
    pub fn new(price: f64, currency: impl Into<String>) -> Self {
        Self { price, currency: currency.into() }
    }
}

/// Outcome of reading a product page.
#[derive(Debug, Clone, PartialEq)]
pub enum Extraction {
    /// A price element was found and parsed.
    Found(PriceQuote),
    /// The page has no price element (out of stock, unavailable, ...).
    NotFound,
    /// A price element was found but its text holds no number.
    MalformedPrice {
        /// Raw text of the price element
        text: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_constructor() {
        let quote = PriceQuote::new(9.04, "$");
        assert_eq!(quote.price, 9.04);
        assert_eq!(quote.currency, "$");
    }

    #[test]
    fn test_extraction_variants_differ() {
        let found = Extraction::Found(PriceQuote::new(1.5, "€"));
        assert_ne!(found, Extraction::NotFound);
        assert_ne!(Extraction::NotFound, Extraction::MalformedPrice { text: String::new() });
    }

    #[test]
    fn test_quote_serde() {
        let quote = PriceQuote::new(44.04, "$");
        let json = serde_json::to_string(&quote).unwrap();
        assert_eq!(json, r#"{"price":44.04,"currency":"$"}"#);

        let json = serde_json::to_string(&PriceQuote::new(9.0, "")).unwrap();
        assert_eq!(json, r#"{"price":9.0,"currency":""}"#);
    }
}
