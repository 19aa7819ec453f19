//! Reconciliation scan models
//!
//! Wire field names are camelCase: these structures are consumed directly by
//! the browser UI.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::ProductRecord;

/// One image file discovered under the scan root
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageFile {
    /// Base name including extension
    pub filename: String,

    /// Absolute path, used to build the servable URL
    pub full_path: PathBuf,

    /// Path relative to the scan root, surfaced for disambiguation
    pub relative_path: PathBuf,
}

/// One candidate image attached to a product
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchCandidate {
    /// Servable URL for browser preview (built by the caller)
    pub url: String,

    /// Base name including extension
    pub filename: String,

    /// Path relative to the scan root
    pub relative_path: PathBuf,
}

/// A product together with its candidate images
///
/// Product fields are flattened into the object, matching the shape the
/// detail page already renders for catalog rows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductMatches {
    #[serde(flatten)]
    pub product: ProductRecord,

    /// Candidate images in scan discovery order
    pub candidate_images: Vec<MatchCandidate>,
}

/// Overall output of one matching pass
///
/// Recomputed in full on every call; nothing here survives across scans.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchReport {
    /// Products with at least one candidate, in catalog order
    pub matched: Vec<ProductMatches>,

    /// Images claimed by no product, in discovery order
    pub unmatched_images: Vec<ImageFile>,
}
