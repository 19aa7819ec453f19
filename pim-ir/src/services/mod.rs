//! Service modules for the reconciliation scan

pub mod image_scanner;
pub mod product_matcher;

pub use image_scanner::{ImageScanner, ScanError};
pub use product_matcher::{match_products, serve_url};
