//! Product catalog record
//!
//! Read-only input to the reconciliation matcher. Every identifying field is
//! optional; the catalog has grown organically and rows with only a SKU, only
//! names, or neither all occur in practice.

use serde::{Deserialize, Serialize};

/// One product row from the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    /// Opaque unique identifier (assigned by the catalog service)
    pub id: String,

    /// Short identifier, highest-confidence match key
    pub sku: Option<String>,

    /// Secondary short identifier, same confidence as the SKU
    pub photo_id: Option<String>,

    /// English display name
    pub name_en: Option<String>,

    /// Spanish display name
    pub name_es: Option<String>,

    /// Generic display name
    pub name: Option<String>,

    /// Category label, carried through to output unchanged
    pub category: Option<String>,

    /// Currently assigned image, if any; not consulted during matching
    pub image: Option<String>,
}

/// Returns the field value only when it is present and non-blank.
///
/// Centralizes the "is this key usable" check so the exact-key and name-key
/// paths cannot drift apart in how they treat None vs empty vs whitespace.
pub fn non_blank(field: &Option<String>) -> Option<&str> {
    match field {
        Some(value) => {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                None
            } else {
                Some(trimmed)
            }
        }
        None => None,
    }
}
