//! Tag-sourced pass: image elements in document order.

use url::Url;

use super::PassOutput;
use crate::document::Document;
use crate::reference::{resolve_candidate, Resolution};

/// Takes the first usable candidate of each element. An element is counted
/// as excluded only when it has no usable candidate and at least one of its
/// candidates was ephemeral.
pub(super) fn scan(document: &dyn Document, base: &Url) -> PassOutput {
    let mut out = PassOutput::default();
    for sources in document.image_elements() {
        let mut saw_ephemeral = false;
        let mut chosen = None;
        for candidate in sources.candidates() {
            match resolve_candidate(candidate, base) {
                Resolution::Usable(reference) => {
                    chosen = Some(reference);
                    break;
                }
                Resolution::Ephemeral => saw_ephemeral = true,
                Resolution::Unusable => {}
            }
        }
        match chosen {
            Some(reference) => out.references.push(reference),
            None if saw_ephemeral => out.excluded += 1,
            None => {}
        }
    }
    out
}
