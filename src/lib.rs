//! amz-price - Amazon product price lookup service
//!
//! Fetches a product page by ASIN, reads the buy-box price, records it in a
//! local SQLite store and serves the result over HTTP.

pub mod amazon;
pub mod commands;
pub mod config;
pub mod server;
pub mod store;

pub use amazon::models::{Extraction, PriceQuote};
pub use config::Config;
pub use store::{ProductRecord, ProductStore, StoreError};
