//! Rendered-document model consumed by the extractor.
//!
//! The extractor never touches a DOM directly. It reads image elements and
//! per-element computed style through [`Document`], which has two adapters:
//! a JSON snapshot exported from a live page ([`SnapshotDocument`]) and a
//! static HTML parse with inline styles ([`HtmlDocument`]).

mod html;
mod snapshot;
mod style;

pub use html::HtmlDocument;
pub use snapshot::SnapshotDocument;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use url::Url;

/// Source candidates of one image element, highest priority first.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageSources {
    /// Source the element actually selected (responsive resolution).
    #[serde(default)]
    pub current_src: Option<String>,
    /// Declared source, resolved by the document.
    #[serde(default)]
    pub src: Option<String>,
    /// Raw `src` attribute text.
    #[serde(default)]
    pub attribute: Option<String>,
}

impl ImageSources {
    /// Candidates in priority order, skipping absent ones.
    pub fn candidates(&self) -> impl Iterator<Item = &str> + '_ {
        [&self.current_src, &self.src, &self.attribute]
            .into_iter()
            .filter_map(|c| c.as_deref())
    }
}

/// Rendered size of an element's border box, in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub fn area(&self) -> f64 {
        self.width.max(0.0) * self.height.max(0.0)
    }
}

/// Computed properties of one element, as needed by the background pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderedElement {
    #[serde(default)]
    pub background_image: Option<String>,
    #[serde(default)]
    pub display: Option<String>,
    #[serde(default)]
    pub visibility: Option<String>,
    /// `None` when layout is unknown; such elements count as visible.
    #[serde(default)]
    pub bounds: Option<Bounds>,
}

impl RenderedElement {
    /// True if the element is rendered at all and covers at least `min_area`.
    pub fn is_visible(&self, min_area: f64) -> bool {
        let display_none = self
            .display
            .as_deref()
            .is_some_and(|d| d.trim().eq_ignore_ascii_case("none"));
        let invisible = self.visibility.as_deref().is_some_and(|v| {
            let v = v.trim();
            v.eq_ignore_ascii_case("hidden") || v.eq_ignore_ascii_case("collapse")
        });
        let too_small = self.bounds.is_some_and(|b| b.area() < min_area);
        !(display_none || invisible || too_small)
    }
}

/// A rendered document as seen by the extractor.
pub trait Document {
    /// The document's own location; relative candidates resolve against it.
    fn location(&self) -> &Url;

    /// Image-bearing elements in document order.
    fn image_elements(&self) -> Vec<ImageSources>;

    /// Every element in document order with its computed style.
    fn rendered_elements(&self) -> Box<dyn Iterator<Item = RenderedElement> + '_>;
}

/// A document loaded from disk, dispatching to the matching adapter.
#[derive(Debug, Clone)]
pub enum LoadedDocument {
    Snapshot(SnapshotDocument),
    Html(HtmlDocument),
}

impl Document for LoadedDocument {
    fn location(&self) -> &Url {
        match self {
            LoadedDocument::Snapshot(d) => d.location(),
            LoadedDocument::Html(d) => d.location(),
        }
    }

    fn image_elements(&self) -> Vec<ImageSources> {
        match self {
            LoadedDocument::Snapshot(d) => d.image_elements(),
            LoadedDocument::Html(d) => d.image_elements(),
        }
    }

    fn rendered_elements(&self) -> Box<dyn Iterator<Item = RenderedElement> + '_> {
        match self {
            LoadedDocument::Snapshot(d) => d.rendered_elements(),
            LoadedDocument::Html(d) => d.rendered_elements(),
        }
    }
}

/// Loads `path` as a snapshot (`.json`) or as HTML (anything else).
///
/// For HTML, `base_url` overrides the document location; otherwise the
/// file's own `file://` URL is used. Snapshots carry their own location.
pub fn open(path: &Path, base_url: Option<&str>) -> Result<LoadedDocument> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read document {}", path.display()))?;
    let is_json = path
        .extension()
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));
    if is_json {
        let doc = SnapshotDocument::from_json(&text)
            .with_context(|| format!("parse snapshot {}", path.display()))?;
        return Ok(LoadedDocument::Snapshot(doc));
    }

    let location = match base_url {
        Some(u) => Url::parse(u).with_context(|| format!("invalid base URL: {u}"))?,
        None => {
            let abs = std::fs::canonicalize(path)
                .with_context(|| format!("canonicalize {}", path.display()))?;
            Url::from_file_path(&abs)
                .map_err(|_| anyhow::anyhow!("cannot build file URL for {}", abs.display()))?
        }
    };
    Ok(LoadedDocument::Html(HtmlDocument::parse(&text, location)))
}
