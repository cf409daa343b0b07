//! Amazon-specific modules for HTTP client, parsing, and data models.

pub mod client;
pub mod models;
pub mod parser;
pub mod selectors;

pub use client::{AmazonClient, ProductFetcher};
pub use models::{Extraction, PriceQuote};
pub use parser::Parser;
