//! Command implementations shared by the CLI and the HTTP service.

pub mod price;

pub use price::{ErrorKind, ErrorResponse, PriceCommand, PriceResponse, ProductPrice};
