//! File extension inference from an image reference.

use url::Url;

/// Extension used whenever nothing better can be inferred.
const DEFAULT_EXTENSION: &str = ".jpg";

/// MIME fragments mapped to extensions; matched against the lowercased MIME type.
const MIME_EXTENSIONS: &[(&str, &str)] = &[
    ("jpeg", ".jpg"),
    ("png", ".png"),
    ("gif", ".gif"),
    ("webp", ".webp"),
    ("svg", ".svg"),
    ("bmp", ".bmp"),
];

/// Relative references are resolved against this; only the path matters.
const DUMMY_BASE: &str = "https://example.com/";

/// Infers a file extension (with the leading dot) for `reference`.
///
/// `data:` references map their MIME type; URLs use the extension of the
/// last path segment when it looks like one (`.` plus 1–5 lowercase
/// alphanumerics after lowercasing). Everything else yields `.jpg`.
///
/// # Examples
///
/// - `infer_extension("https://x.com/a/b.JPG?x=1")` → `".jpg"`
/// - `infer_extension("data:image/png;base64,AAA")` → `".png"`
/// - `infer_extension("https://x.com/noext")` → `".jpg"`
pub fn infer_extension(reference: &str) -> String {
    if reference.is_empty() {
        return DEFAULT_EXTENSION.to_string();
    }
    if starts_with_ignore_case(reference, "data:") {
        return from_data_mime(&reference[5..]).to_string();
    }
    from_url_path(reference).unwrap_or_else(|| DEFAULT_EXTENSION.to_string())
}

fn starts_with_ignore_case(s: &str, prefix: &str) -> bool {
    s.len() >= prefix.len()
        && s.as_bytes()[..prefix.len()].eq_ignore_ascii_case(prefix.as_bytes())
}

fn from_data_mime(after_scheme: &str) -> &'static str {
    let end = after_scheme
        .find(|c| c == ';' || c == ',')
        .unwrap_or(after_scheme.len());
    let mime = after_scheme[..end].trim().to_ascii_lowercase();
    if mime.is_empty() {
        return DEFAULT_EXTENSION;
    }
    MIME_EXTENSIONS
        .iter()
        .find(|(needle, _)| mime.contains(needle))
        .map(|(_, ext)| *ext)
        .unwrap_or(DEFAULT_EXTENSION)
}

fn from_url_path(reference: &str) -> Option<String> {
    let base = Url::parse(DUMMY_BASE).ok()?;
    let parsed = base.join(reference).ok()?;
    let last = parsed.path().rsplit('/').next()?;
    let dot = last.rfind('.')?;
    if dot + 1 >= last.len() {
        return None;
    }
    let ext = last[dot..].to_lowercase();
    let ext = ext.split(|c| c == '?' || c == '#').next()?;
    is_plain_extension(ext).then(|| ext.to_string())
}

fn is_plain_extension(ext: &str) -> bool {
    let Some(body) = ext.strip_prefix('.') else {
        return false;
    };
    (1..=5).contains(&body.len())
        && body
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit())
}
