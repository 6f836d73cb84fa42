//! Image reference extraction.
//!
//! Runs a tag pass over image elements and, optionally, a style pass over
//! computed `background-image` values, then merges both into one list that
//! is unique and ordered by first appearance:
//! image elements → background images → stable dedup.

mod css_url;
mod dedup;
mod styles;
mod tags;

pub use css_url::css_url_tokens;
pub use dedup::unique_stable;

use serde::{Deserialize, Serialize};

use crate::document::Document;
use crate::reference::ImageReference;

/// Upper bound on elements examined by the background pass.
pub const MAX_STYLE_ELEMENTS: usize = 5000;

/// Elements covering less than this many square pixels are treated as not rendered.
pub const MIN_VISIBLE_AREA: f64 = 1.0;

/// Knobs for one extraction.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectOptions {
    /// Also scan computed `background-image` of every rendered element.
    pub include_background_images: bool,
    pub max_style_elements: usize,
    pub min_visible_area: f64,
}

impl Default for CollectOptions {
    fn default() -> Self {
        Self {
            include_background_images: false,
            max_style_elements: MAX_STYLE_ELEMENTS,
            min_visible_area: MIN_VISIBLE_AREA,
        }
    }
}

impl CollectOptions {
    pub fn with_background_images(mut self, include: bool) -> Self {
        self.include_background_images = include;
        self
    }
}

/// References found in one scan plus the count of ephemeral ones dropped.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    pub references: Vec<ImageReference>,
    pub excluded_count: usize,
}

/// Per-pass output before merging.
#[derive(Debug, Default)]
pub(crate) struct PassOutput {
    pub references: Vec<ImageReference>,
    pub excluded: usize,
}

/// Scans `document` for image references.
///
/// Reads the document's current state only; nothing is fetched or awaited.
pub fn collect(document: &dyn Document, options: &CollectOptions) -> ExtractionResult {
    let base = document.location();
    let from_tags = tags::scan(document, base);
    let from_styles = if options.include_background_images {
        styles::scan(document, base, options)
    } else {
        PassOutput::default()
    };

    let excluded_count = from_tags.excluded + from_styles.excluded;
    let combined = from_tags
        .references
        .into_iter()
        .chain(from_styles.references);
    let references = unique_stable(combined);

    tracing::debug!(
        location = %base,
        references = references.len(),
        excluded = excluded_count,
        background = options.include_background_images,
        "collected image references"
    );
    ExtractionResult {
        references,
        excluded_count,
    }
}
