//! `data:` URL decoding.

use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};
use base64::Engine;

use crate::reference::has_scheme;

/// Base64 engine that tolerates missing padding, as browsers do.
const LENIENT_BASE64: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new().with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

#[derive(Debug, thiserror::Error)]
pub enum DataUrlError {
    #[error("not a data: URL")]
    NotDataUrl,
    #[error("data: URL has no ',' separator")]
    MissingComma,
    #[error("invalid percent escape at byte {0}")]
    BadEscape(usize),
    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),
}

/// Decodes the payload of a `data:[<mediatype>][;base64],<data>` URL.
///
/// The payload is percent-decoded first; `;base64` payloads are then base64
/// decoded with ASCII whitespace ignored.
pub fn decode_data_url(url: &str) -> Result<Vec<u8>, DataUrlError> {
    if !has_scheme(url, "data") {
        return Err(DataUrlError::NotDataUrl);
    }
    let rest = &url[5..];
    let (header, payload) = rest.split_once(',').ok_or(DataUrlError::MissingComma)?;
    let is_base64 = header
        .rsplit(';')
        .next()
        .is_some_and(|p| p.trim().eq_ignore_ascii_case("base64"));

    let bytes = percent_decode(payload)?;
    if !is_base64 {
        return Ok(bytes);
    }
    let compact: Vec<u8> = bytes
        .into_iter()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    Ok(LENIENT_BASE64.decode(compact)?)
}

fn percent_decode(s: &str) -> Result<Vec<u8>, DataUrlError> {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = bytes.get(i + 1..i + 3).ok_or(DataUrlError::BadEscape(i))?;
            let hi = (hex[0] as char).to_digit(16).ok_or(DataUrlError::BadEscape(i))?;
            let lo = (hex[1] as char).to_digit(16).ok_or(DataUrlError::BadEscape(i))?;
            out.push((hi * 16 + lo) as u8);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    Ok(out)
}
