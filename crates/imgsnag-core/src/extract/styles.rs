//! Style-sourced pass: computed `background-image` of rendered elements.

use url::Url;

use super::css_url::css_url_tokens;
use super::{CollectOptions, PassOutput};
use crate::document::Document;
use crate::reference::{resolve_candidate, Resolution};

/// Scans at most `options.max_style_elements` elements; every ephemeral
/// token found on a visible element counts as excluded.
pub(super) fn scan(document: &dyn Document, base: &Url, options: &CollectOptions) -> PassOutput {
    let mut out = PassOutput::default();
    let mut scanned = 0usize;
    for element in document.rendered_elements().take(options.max_style_elements) {
        scanned += 1;
        if !element.is_visible(options.min_visible_area) {
            continue;
        }
        let Some(value) = element.background_image.as_deref() else {
            continue;
        };
        if value.trim().eq_ignore_ascii_case("none") {
            continue;
        }
        for token in css_url_tokens(value) {
            match resolve_candidate(&token, base) {
                Resolution::Usable(reference) => out.references.push(reference),
                Resolution::Ephemeral => out.excluded += 1,
                Resolution::Unusable => {}
            }
        }
    }
    if scanned == options.max_style_elements {
        tracing::debug!(cap = options.max_style_elements, "background scan hit element cap");
    }
    out
}
