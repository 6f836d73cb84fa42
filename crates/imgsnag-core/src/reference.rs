//! Image references and candidate resolution.
//!
//! A candidate string found in a document is either usable (a `data:` payload
//! or something that resolves to an absolute URL), ephemeral (a `blob:`
//! handle that only lives inside the page session), or unusable.

use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// A fetchable image: an absolute URL or an inline `data:` payload.
///
/// Never holds a `blob:` handle; those are excluded during resolution.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ImageReference(String);

impl ImageReference {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }

    pub fn is_data(&self) -> bool {
        has_scheme(&self.0, "data")
    }
}

impl fmt::Display for ImageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ImageReference {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Result of resolving one candidate string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Usable(ImageReference),
    /// Valid image source that cannot be fetched outside the page (`blob:`).
    Ephemeral,
    /// Empty, unparsable, or otherwise not a reference.
    Unusable,
}

/// True when `s` starts with `scheme:` (ASCII case-insensitive).
pub(crate) fn has_scheme(s: &str, scheme: &str) -> bool {
    let n = scheme.len();
    s.len() > n
        && s.as_bytes()[n] == b':'
        && s.as_bytes()[..n].eq_ignore_ascii_case(scheme.as_bytes())
}

/// Resolves a raw candidate against the document location.
///
/// `data:` passes through unchanged, `blob:` is ephemeral, anything else is
/// joined onto `base`.
pub fn resolve_candidate(raw: &str, base: &Url) -> Resolution {
    let candidate = raw.trim();
    if candidate.is_empty() {
        return Resolution::Unusable;
    }
    if has_scheme(candidate, "data") {
        return Resolution::Usable(ImageReference(candidate.to_string()));
    }
    if has_scheme(candidate, "blob") {
        return Resolution::Ephemeral;
    }
    match base.join(candidate) {
        Ok(url) => Resolution::Usable(ImageReference(url.to_string())),
        Err(e) => {
            tracing::trace!(candidate, "dropping unparsable candidate: {}", e);
            Resolution::Unusable
        }
    }
}

impl TryFrom<String> for ImageReference {
    type Error = String;

    /// Accepts absolute URLs and `data:` payloads; rejects `blob:` and relative forms.
    fn try_from(value: String) -> Result<Self, Self::Error> {
        let trimmed = value.trim();
        if has_scheme(trimmed, "data") {
            return Ok(ImageReference(trimmed.to_string()));
        }
        if has_scheme(trimmed, "blob") {
            return Err(value);
        }
        match Url::parse(trimmed) {
            Ok(url) => Ok(ImageReference(url.to_string())),
            Err(_) => Err(value),
        }
    }
}
