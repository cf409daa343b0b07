//! Integration tests for the price extractor using fixture files.

use amz_price::amazon::parser::Parser;
use amz_price::{Extraction, PriceQuote};

const PRIMARY_FIXTURE: &str = include_str!("fixtures/B004F829LQ.html");
const FALLBACK_FIXTURE: &str = include_str!("fixtures/fallback_price.html");
const UNAVAILABLE_FIXTURE: &str = include_str!("fixtures/unavailable.html");

#[test]
fn test_extract_primary_fixture() {
    let result = Parser::new().extract(PRIMARY_FIXTURE).unwrap();
    assert_eq!(result, Extraction::Found(PriceQuote::new(9.04, "$")));
}

#[test]
fn test_extract_fallback_fixture() {
    let result = Parser::new().extract(FALLBACK_FIXTURE).unwrap();
    assert_eq!(result, Extraction::Found(PriceQuote::new(57.01, "$")));
}

#[test]
fn test_extract_unavailable_fixture() {
    let result = Parser::new().extract(UNAVAILABLE_FIXTURE).unwrap();
    assert_eq!(result, Extraction::NotFound);
}
