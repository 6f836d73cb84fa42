//! Filename derivation for downloaded images.
//!
//! Turns user-supplied base and folder names into filesystem-safe forms and
//! infers an extension from the image reference itself. Everything here is
//! pure and infallible: bad input degrades to a default, never to an error.

mod extension;
mod sanitize;

pub use extension::infer_extension;
pub use sanitize::{sanitize_base_name, sanitize_folder_name, DEFAULT_BASE_NAME};

use serde::{Deserialize, Serialize};

/// User-supplied naming for one batch. Both fields are raw; sanitize before use.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamingParameters {
    pub base_name: String,
    /// Empty means "directly under the download root".
    #[serde(default)]
    pub subfolder: String,
}

impl NamingParameters {
    pub fn new(base_name: impl Into<String>, subfolder: impl Into<String>) -> Self {
        Self {
            base_name: base_name.into(),
            subfolder: subfolder.into(),
        }
    }

    /// Sanitized copy; the result is safe to join onto a download root.
    pub fn sanitized(&self) -> NamingParameters {
        NamingParameters {
            base_name: sanitize_base_name(&self.base_name),
            subfolder: sanitize_folder_name(&self.subfolder),
        }
    }
}

/// Relative target path for the `ordinal`-th reference of a batch:
/// `[subfolder/]base-ordinal.ext`.
///
/// `params` must already be sanitized.
pub fn target_path(params: &NamingParameters, ordinal: usize, reference: &str) -> String {
    let file_name = format!("{}-{}{}", params.base_name, ordinal, infer_extension(reference));
    if params.subfolder.is_empty() {
        file_name
    } else {
        format!("{}/{}", params.subfolder, file_name)
    }
}
