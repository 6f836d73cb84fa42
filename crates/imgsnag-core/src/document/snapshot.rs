//! JSON snapshot of a rendered page.
//!
//! Produced by a page-side exporter that reads `currentSrc`, `src`, the raw
//! attribute and `getComputedStyle` for each element. Field names are camelCase
//! to match what a browser script emits.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use url::Url;

use super::{Document, ImageSources, RenderedElement};

#[derive(Debug, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
struct RawSnapshot {
    location: String,
    #[serde(default)]
    images: Vec<ImageSources>,
    #[serde(default)]
    elements: Vec<RenderedElement>,
}

/// A page captured with real computed style and layout.
#[derive(Debug, Clone)]
pub struct SnapshotDocument {
    location: Url,
    images: Vec<ImageSources>,
    elements: Vec<RenderedElement>,
}

impl SnapshotDocument {
    pub fn new(location: Url, images: Vec<ImageSources>, elements: Vec<RenderedElement>) -> Self {
        Self {
            location,
            images,
            elements,
        }
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let raw: RawSnapshot = serde_json::from_str(text)?;
        let location = Url::parse(&raw.location)
            .with_context(|| format!("invalid snapshot location: {}", raw.location))?;
        Ok(Self::new(location, raw.images, raw.elements))
    }
}

impl Document for SnapshotDocument {
    fn location(&self) -> &Url {
        &self.location
    }

    fn image_elements(&self) -> Vec<ImageSources> {
        self.images.clone()
    }

    fn rendered_elements(&self) -> Box<dyn Iterator<Item = RenderedElement> + '_> {
        Box::new(self.elements.iter().cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Bounds;

    #[test]
    fn parses_camel_case_snapshot() {
        let json = r#"{
            "location": "https://site.example/page",
            "images": [
                { "currentSrc": "https://site.example/a@2x.png", "src": "https://site.example/a.png", "attribute": "a.png" }
            ],
            "elements": [
                { "backgroundImage": "url(\"bg.jpg\")", "display": "block", "visibility": "visible",
                  "bounds": { "width": 100, "height": 50 } },
                { "backgroundImage": "none" }
            ]
        }"#;
        let doc = SnapshotDocument::from_json(json).unwrap();
        assert_eq!(doc.location().as_str(), "https://site.example/page");
        let images = doc.image_elements();
        assert_eq!(images[0].current_src.as_deref(), Some("https://site.example/a@2x.png"));
        assert_eq!(images[0].attribute.as_deref(), Some("a.png"));
        let elements: Vec<_> = doc.rendered_elements().collect();
        assert_eq!(elements.len(), 2);
        assert_eq!(elements[0].bounds, Some(Bounds { width: 100.0, height: 50.0 }));
        assert!(elements[1].bounds.is_none());
    }

    #[test]
    fn rejects_bad_location() {
        assert!(SnapshotDocument::from_json(r#"{"location":"not a url"}"#).is_err());
    }
}
