//! Data models for pim-ir

pub mod product;
pub mod reconcile;

pub use product::ProductRecord;
pub use reconcile::{ImageFile, MatchCandidate, MatchReport, ProductMatches};
