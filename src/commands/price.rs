//! Price lookup: fetch, extract, persist, respond.

use crate::amazon::{Extraction, Parser, ProductFetcher};
use crate::store::ProductStore;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info, warn};

pub const UNAVAILABLE: &str = "Product is unavailable or has no price";
pub const DATA_ERROR: &str = "Error with getting data";
pub const UNKNOWN_ERROR: &str = "Unknown error";
pub const MALFORMED_PRICE: &str = "Price has no numeric value";

/// Price returned to the caller after a successful lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductPrice {
    pub price: f64,
    pub currency: String,
    pub product_asin: String,
}

/// Error body; every failure is reported in this shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    #[serde(rename = "type")]
    pub kind: ErrorKind,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<serde_json::Value>,
}

/// Who is at fault: the request/product, or the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    Error,
    Server,
}

impl ErrorResponse {
    pub fn new(kind: ErrorKind, text: impl Into<String>) -> Self {
        Self { kind, text: text.into(), detail: None }
    }

    pub fn with_detail(mut self, detail: serde_json::Value) -> Self {
        self.detail = Some(detail);
        self
    }
}

/// Result of a lookup, serialized as either body shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PriceResponse {
    Found(ProductPrice),
    Failed(ErrorResponse),
}

impl PriceResponse {
    fn failed(kind: ErrorKind, text: &str) -> Self {
        PriceResponse::Failed(ErrorResponse::new(kind, text))
    }
}

/// Normalizes an ASIN (trimmed, uppercase) and checks its shape.
pub fn normalize_asin(asin: &str) -> Option<String> {
    let asin = asin.trim().to_uppercase();
    if asin.len() != 10 || !asin.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(asin)
}

/// Looks up product prices and records them in the store.
#[derive(Debug, Clone)]
pub struct PriceCommand {
    store: ProductStore,
    parser: Parser,
}

impl PriceCommand {
    /// Creates a new price command writing to the given store.
    pub fn new(store: ProductStore) -> Self {
        Self { store, parser: Parser::new() }
    }

    /// Returns the underlying store.
    pub fn store(&self) -> &ProductStore {
        &self.store
    }

    /// Fetches the product page, extracts its price and stores it.
    pub async fn lookup<F>(&self, fetcher: &F, asin: &str) -> PriceResponse
    where
        F: ProductFetcher + ?Sized,
    {
        let Some(asin) = normalize_asin(asin) else {
            warn!("Rejected invalid ASIN: {:?}", asin);
            return PriceResponse::Failed(ErrorResponse::new(
                ErrorKind::Error,
                format!(
                    "Invalid ASIN format: '{}'. ASIN should be 10 alphanumeric characters.",
                    asin.trim()
                ),
            ));
        };

        info!("Looking up price: {}", asin);

        let html = match fetcher.product(&asin).await {
            Ok(html) => html,
            Err(e) => {
                error!("Failed to fetch {}: {:#}", asin, e);
                return PriceResponse::failed(ErrorKind::Server, UNKNOWN_ERROR);
            }
        };

        let extraction = match self.parser.extract(&html) {
            Ok(extraction) => extraction,
            Err(e) => {
                error!("Unusable page for {}: {:#}", asin, e);
                return PriceResponse::failed(ErrorKind::Server, DATA_ERROR);
            }
        };

        let quote = match extraction {
            Extraction::Found(quote) => quote,
            Extraction::NotFound => {
                info!("No price on page for {}", asin);
                return PriceResponse::failed(ErrorKind::Error, UNAVAILABLE);
            }
            Extraction::MalformedPrice { text } => {
                warn!("Malformed price for {}: {:?}", asin, text);
                return PriceResponse::Failed(
                    ErrorResponse::new(ErrorKind::Error, MALFORMED_PRICE)
                        .with_detail(json!({ "field": "price", "input": text })),
                );
            }
        };

        if let Err(e) = self.store.upsert(&asin, &quote).await {
            error!("Failed to store price for {}: {}", asin, e);
            return PriceResponse::failed(ErrorKind::Server, DATA_ERROR);
        }

        PriceResponse::Found(ProductPrice {
            price: quote.price,
            currency: quote.currency,
            product_asin: asin,
        })
    }
}
