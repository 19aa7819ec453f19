//! Product-to-image matching engine
//!
//! The core of the reconciliation scan: pairs every catalog product with the
//! image files discovered on disk, using filename stems against SKU /
//! photo-ID keys first and display-name word overlap second. Pure
//! computation over its inputs; all working state is local to one call, so
//! concurrent scans need no coordination.

use std::collections::HashSet;
use std::path::Path;

use crate::models::product::non_blank;
use crate::models::{ImageFile, MatchCandidate, MatchReport, ProductMatches, ProductRecord};

/// Minimum word length for a name-key word to count at all
const NAME_WORD_MIN_LEN: usize = 4;

/// A single word of at least this length is trusted on its own
const NAME_WORD_DISTINCTIVE_LEN: usize = 8;

/// Name-key words of ordinary length required to declare a match
const NAME_WORDS_REQUIRED: usize = 2;

/// Match every product against every discovered image.
///
/// `url_builder` turns an image into its servable preview URL; the engine
/// itself never touches storage or network.
///
/// Output ordering is deterministic: products keep catalog order (filtered
/// to those with at least one candidate), unmatched images keep discovery
/// order, and candidate lists keep discovery order. An image may appear as a
/// candidate for several products but is excluded from the unmatched list as
/// soon as one product claims it.
pub fn match_products<F>(
    products: &[ProductRecord],
    images: &[ImageFile],
    url_builder: F,
) -> MatchReport
where
    F: Fn(&ImageFile) -> String,
{
    // Stems are product-independent; compute them once up front.
    let stems: Vec<ImageStem> = images.iter().map(ImageStem::of).collect();

    let mut claimed: HashSet<&Path> = HashSet::new();
    let mut matched = Vec::new();

    for product in products {
        let keys = MatchKeys::of(product);
        if keys.is_empty() {
            continue;
        }

        let mut candidate_images = Vec::new();
        for (image, stem) in images.iter().zip(&stems) {
            if keys.matches(stem) {
                candidate_images.push(MatchCandidate {
                    url: url_builder(image),
                    filename: image.filename.clone(),
                    relative_path: image.relative_path.clone(),
                });
                claimed.insert(image.full_path.as_path());
            }
        }

        if !candidate_images.is_empty() {
            matched.push(ProductMatches {
                product: product.clone(),
                candidate_images,
            });
        }
    }

    let unmatched_images = images
        .iter()
        .filter(|image| !claimed.contains(image.full_path.as_path()))
        .cloned()
        .collect();

    tracing::debug!(
        products = products.len(),
        images = images.len(),
        matched = matched.len(),
        "Matching pass complete"
    );

    MatchReport {
        matched,
        unmatched_images,
    }
}

/// Lower-cased filename stem of one image, verbatim and separator-stripped
struct ImageStem {
    stem: String,
    stem_normalized: String,
}

impl ImageStem {
    fn of(image: &ImageFile) -> Self {
        let stem = Path::new(&image.filename)
            .file_stem()
            .map(|s| s.to_string_lossy().to_lowercase())
            .unwrap_or_else(|| image.filename.to_lowercase());
        let stem_normalized = strip_separators(&stem);
        Self {
            stem,
            stem_normalized,
        }
    }
}

/// Match keys derived from one product
struct MatchKeys {
    /// SKU / photo-ID, lower-cased verbatim
    exact: Vec<String>,
    /// SKU / photo-ID, lower-cased with separators stripped
    exact_normalized: Vec<String>,
    /// Display names, lower-cased
    names: Vec<String>,
}

impl MatchKeys {
    fn of(product: &ProductRecord) -> Self {
        let mut exact = Vec::new();
        let mut exact_normalized = Vec::new();
        for field in [&product.sku, &product.photo_id] {
            if let Some(value) = non_blank(field) {
                let verbatim = value.to_lowercase();
                let normalized = strip_separators(&verbatim);
                if !normalized.is_empty() {
                    exact_normalized.push(normalized);
                }
                exact.push(verbatim);
            }
        }

        let names = [&product.name_en, &product.name_es, &product.name]
            .into_iter()
            .filter_map(|field| non_blank(field).map(str::to_lowercase))
            .collect();

        Self {
            exact,
            exact_normalized,
            names,
        }
    }

    fn is_empty(&self) -> bool {
        self.exact.is_empty() && self.names.is_empty()
    }

    /// Exact-key containment first; name-word overlap only as a fallback.
    fn matches(&self, stem: &ImageStem) -> bool {
        // Containment, not equality: a short SKU embedded in a longer
        // filename still counts. Candidates are human-reviewed downstream,
        // so recall wins over precision here.
        let exact_hit = self.exact.iter().any(|key| stem.stem.contains(key))
            || self
                .exact_normalized
                .iter()
                .any(|key| stem.stem_normalized.contains(key));
        if exact_hit {
            return true;
        }

        self.names
            .iter()
            .any(|name| name_key_matches(&stem.stem, name))
    }
}

/// Word-overlap test for one display name against a filename stem.
///
/// Words shorter than four characters are noise and ignored. One
/// sufficiently long word is distinctive enough on its own; otherwise two
/// words from the same name must appear in the stem.
fn name_key_matches(stem: &str, name_key: &str) -> bool {
    let mut hits = 0;
    for word in name_key.split_whitespace() {
        let len = word.chars().count();
        if len < NAME_WORD_MIN_LEN {
            continue;
        }
        if stem.contains(word) {
            if len >= NAME_WORD_DISTINCTIVE_LEN {
                return true;
            }
            hits += 1;
            if hits >= NAME_WORDS_REQUIRED {
                return true;
            }
        }
    }
    false
}

/// Lower-case normalization shared by keys and stems: strip whitespace,
/// hyphens, and underscores.
fn strip_separators(value: &str) -> String {
    value
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-' && *c != '_')
        .collect()
}

/// Build the servable preview URL for an image.
///
/// The full path is URL-encoded into the serve endpoint's query parameter,
/// so paths on network shares stay previewable without copying the file.
pub fn serve_url(image: &ImageFile) -> String {
    format!(
        "/images/serve?path={}",
        urlencoding::encode(&image.full_path.to_string_lossy())
    )
}
