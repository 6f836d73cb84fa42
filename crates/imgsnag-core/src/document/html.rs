//! Static HTML adapter.
//!
//! Approximates the rendered state of a page from its markup: `src` is the
//! attribute resolved against the document base, `currentSrc` is the largest
//! `srcset` candidate, and computed style comes from the inline `style`
//! attribute plus the `hidden` attribute and the UA's `display: none` tags.
//! Stylesheets are not evaluated.

use scraper::{ElementRef, Html};
use url::Url;

use super::style::{best_srcset_candidate, parse_length, InlineStyle};
use super::{Bounds, Document, ImageSources, RenderedElement};

/// Elements the user agent never renders.
const UA_HIDDEN: &[&str] = &[
    "head", "script", "style", "template", "title", "meta", "link", "base", "noscript",
];

/// A parsed HTML page, flattened into owned element data.
#[derive(Debug, Clone)]
pub struct HtmlDocument {
    location: Url,
    images: Vec<ImageSources>,
    elements: Vec<RenderedElement>,
}

impl HtmlDocument {
    /// Parses `html` as the document found at `location`.
    pub fn parse(html: &str, location: Url) -> Self {
        let parsed = Html::parse_document(html);
        let root = parsed.root_element();
        let base = document_base(root, &location);

        let mut images = Vec::new();
        let mut elements = Vec::new();
        // (element, inside a display:none subtree, inherited visibility)
        let mut stack: Vec<(ElementRef<'_>, bool, Option<String>)> = vec![(root, false, None)];
        while let Some((el, hidden_ancestor, inherited_visibility)) = stack.pop() {
            if el.value().name().eq_ignore_ascii_case("img") {
                images.push(image_sources(el, &base));
            }

            let mut rendered = rendered_element(el);
            let display_none = hidden_ancestor
                || rendered
                    .display
                    .as_deref()
                    .is_some_and(|d| d.trim().eq_ignore_ascii_case("none"));
            if display_none {
                rendered.display = Some("none".to_string());
            }
            if rendered.visibility.is_none() {
                rendered.visibility = inherited_visibility;
            }
            let visibility = rendered.visibility.clone();
            elements.push(rendered);

            let children: Vec<_> = el.children().filter_map(ElementRef::wrap).collect();
            for child in children.into_iter().rev() {
                stack.push((child, display_none, visibility.clone()));
            }
        }

        tracing::debug!(
            location = %location,
            images = images.len(),
            elements = elements.len(),
            "parsed html document"
        );
        Self {
            location,
            images,
            elements,
        }
    }
}

/// The first `<base href>` resolved against `location`, else `location`.
fn document_base(root: ElementRef<'_>, location: &Url) -> Url {
    root.descendants()
        .filter_map(ElementRef::wrap)
        .filter(|e| e.value().name().eq_ignore_ascii_case("base"))
        .find_map(|e| e.value().attr("href"))
        .and_then(|href| location.join(href.trim()).ok())
        .unwrap_or_else(|| location.clone())
}

fn resolve_or_raw(raw: &str, base: &Url) -> String {
    base.join(raw.trim())
        .map(|u| u.to_string())
        .unwrap_or_else(|_| raw.to_string())
}

fn image_sources(el: ElementRef<'_>, base: &Url) -> ImageSources {
    let attribute = el.value().attr("src").map(str::to_string);
    let src = attribute
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .map(|s| resolve_or_raw(s, base));
    let current_src = el
        .value()
        .attr("srcset")
        .and_then(best_srcset_candidate)
        .map(|s| resolve_or_raw(s, base))
        .or_else(|| src.clone());
    ImageSources {
        current_src,
        src,
        attribute,
    }
}

fn rendered_element(el: ElementRef<'_>) -> RenderedElement {
    let value = el.value();
    let style = value.attr("style").map(InlineStyle::parse).unwrap_or_default();

    let ua_hidden = UA_HIDDEN
        .iter()
        .any(|t| value.name().eq_ignore_ascii_case(t));
    let display = if ua_hidden || value.attr("hidden").is_some() {
        Some("none".to_string())
    } else {
        style.display
    };

    let width = style.width.or_else(|| value.attr("width").and_then(parse_length));
    let height = style.height.or_else(|| value.attr("height").and_then(parse_length));
    let bounds = match (width, height) {
        (Some(width), Some(height)) => Some(Bounds { width, height }),
        _ => None,
    };

    RenderedElement {
        background_image: style.background_image,
        display,
        visibility: style.visibility,
        bounds,
    }
}

impl Document for HtmlDocument {
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

    fn parse(html: &str) -> HtmlDocument {
        HtmlDocument::parse(html, Url::parse("https://site.example/a/page.html").unwrap())
    }

    #[test]
    fn images_in_document_order_with_resolved_src() {
        let doc = parse(
            r#"<body><img src="one.png"><div><img src="/two.jpg"></div><img></body>"#,
        );
        let images = doc.image_elements();
        assert_eq!(images.len(), 3);
        assert_eq!(images[0].src.as_deref(), Some("https://site.example/a/one.png"));
        assert_eq!(images[0].attribute.as_deref(), Some("one.png"));
        assert_eq!(images[1].current_src.as_deref(), Some("https://site.example/two.jpg"));
        assert_eq!(images[2], ImageSources::default());
    }

    #[test]
    fn base_href_changes_resolution() {
        let doc = parse(
            r#"<html><head><base href="https://cdn.example/assets/"></head><body><img src="x.png"></body></html>"#,
        );
        assert_eq!(
            doc.image_elements()[0].src.as_deref(),
            Some("https://cdn.example/assets/x.png")
        );
        assert_eq!(doc.location().as_str(), "https://site.example/a/page.html");
    }

    #[test]
    fn srcset_drives_current_src() {
        let doc = parse(r#"<img src="small.jpg" srcset="small.jpg 1x, large.jpg 2x">"#);
        let img = &doc.image_elements()[0];
        assert_eq!(img.current_src.as_deref(), Some("https://site.example/a/large.jpg"));
        assert_eq!(img.src.as_deref(), Some("https://site.example/a/small.jpg"));
    }

    #[test]
    fn blob_src_is_kept_verbatim() {
        let doc = parse(r#"<img src="blob:https://site.example/5e1f">"#);
        let img = &doc.image_elements()[0];
        assert!(img.src.as_deref().unwrap().starts_with("blob:"));
    }

    #[test]
    fn visibility_is_inherited_but_overridable() {
        let doc = parse(
            r#"<div style="visibility:hidden"><i style="background-image:url(a.png)"></i><b style="visibility:visible;background-image:url(b.png)"></b></div>"#,
        );
        let elements: Vec<_> = doc.rendered_elements().collect();
        let i = elements
            .iter()
            .find(|e| e.background_image.as_deref() == Some("url(a.png)"))
            .unwrap();
        let b = elements
            .iter()
            .find(|e| e.background_image.as_deref() == Some("url(b.png)"))
            .unwrap();
        assert!(!i.is_visible(1.0));
        assert!(b.is_visible(1.0));
    }

    #[test]
    fn hidden_ancestors_hide_descendants() {
        let doc = parse(
            r#"<body><div style="display:none"><span style="background-image:url(a.png)"></span></div>
               <p hidden></p>
               <section style="background: url('b.png') no-repeat; width: 20px; height: 10px"></section></body>"#,
        );
        let elements: Vec<_> = doc.rendered_elements().collect();
        let span = elements
            .iter()
            .find(|e| e.background_image.as_deref() == Some("url(a.png)"))
            .unwrap();
        assert!(!span.is_visible(1.0));
        let section = elements
            .iter()
            .find(|e| e.background_image.as_deref() == Some("url('b.png') no-repeat"))
            .unwrap();
        assert!(section.is_visible(1.0));
        assert_eq!(section.bounds, Some(Bounds { width: 20.0, height: 10.0 }));
        assert!(elements.iter().filter(|e| e.display.as_deref() == Some("none")).count() >= 3);
    }
}
