//! Parsing and building of base64 `data:` URIs.
//!
//! Generation results travel through the studio as data URIs
//! (`data:image/png;base64,iVBOR...`). This module converts between that
//! representation and raw bytes plus a MIME type.
//!
//! ```
//! use tryon::data_uri::{encode_data_uri, parse_data_uri};
//!
//! let uri = encode_data_uri("image/png", b"hello");
//! let parsed = parse_data_uri(&uri).unwrap();
//! assert_eq!(parsed.mime_type, "image/png");
//! assert_eq!(parsed.bytes, b"hello");
//! ```

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use std::error::Error;
use std::fmt;

/// Error raised when a string is not a usable base64 data URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataUriError {
    /// The string does not start with `data:` or has no `,` separator.
    Malformed(String),
    /// Only `;base64` payloads are supported.
    NotBase64,
    /// The payload is not valid base64.
    InvalidPayload(String),
}

impl fmt::Display for DataUriError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataUriError::Malformed(msg) => write!(f, "Malformed data URI: {}", msg),
            DataUriError::NotBase64 => write!(f, "Data URI is not base64 encoded"),
            DataUriError::InvalidPayload(msg) => write!(f, "Invalid data URI payload: {}", msg),
        }
    }
}

impl Error for DataUriError {}

/// Decoded content of a data URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedDataUri {
    /// MIME type from the header, e.g. `image/jpeg`. Empty when the header omits it.
    pub mime_type: String,
    /// Raw decoded bytes.
    pub bytes: Vec<u8>,
}

/// Build a `data:<mime>;base64,<payload>` string.
pub fn encode_data_uri(mime_type: &str, bytes: &[u8]) -> String {
    format!("data:{};base64,{}", mime_type, BASE64.encode(bytes))
}

/// Return the MIME type embedded in a data URI header without decoding the payload.
///
/// `data:image/webp;base64,...` yields `Some("image/webp")`. A header without a
/// MIME type, or a string that is not a data URI, yields `None`.
pub fn data_uri_mime_type(uri: &str) -> Option<&str> {
    let rest = uri.strip_prefix("data:")?;
    let header = rest.split(',').next()?;
    let mime = header.split(';').next()?.trim();
    if mime.is_empty() {
        None
    } else {
        Some(mime)
    }
}

/// Decode a base64 data URI into its MIME type and bytes.
pub fn parse_data_uri(uri: &str) -> Result<DecodedDataUri, DataUriError> {
    let rest = uri
        .trim()
        .strip_prefix("data:")
        .ok_or_else(|| DataUriError::Malformed("missing `data:` prefix".to_string()))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| DataUriError::Malformed("missing `,` separator".to_string()))?;

    let mut params = header.split(';');
    let mime_type = params.next().unwrap_or_default().trim().to_string();
    if !params.any(|param| param.trim().eq_ignore_ascii_case("base64")) {
        return Err(DataUriError::NotBase64);
    }

    let bytes = BASE64
        .decode(payload.trim().as_bytes())
        .map_err(|e| DataUriError::InvalidPayload(e.to_string()))?;

    Ok(DecodedDataUri { mime_type, bytes })
}

/// File extension for a MIME type: the subtype, or `png` when there is none.
///
/// `image/jpeg` maps to `jpeg` and `image/webp` to `webp`.
pub fn extension_for_mime(mime_type: &str) -> &str {
    mime_type
        .split('/')
        .nth(1)
        .map(|subtype| subtype.split(|c| c == ';' || c == '+').next().unwrap_or(subtype))
        .map(str::trim)
        .filter(|subtype| !subtype.is_empty())
        .unwrap_or("png")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_mime_and_payload() {
        let parsed = parse_data_uri("data:image/jpeg;base64,SGVsbG8=").unwrap();
        assert_eq!(parsed.mime_type, "image/jpeg");
        assert_eq!(parsed.bytes, b"Hello");
    }

    #[test]
    fn rejects_non_data_uris() {
        assert!(matches!(
            parse_data_uri("https://example.com/a.png"),
            Err(DataUriError::Malformed(_))
        ));
        assert!(matches!(
            parse_data_uri("data:image/png,plain"),
            Err(DataUriError::NotBase64)
        ));
        assert!(matches!(
            parse_data_uri("data:image/png;base64,@@@"),
            Err(DataUriError::InvalidPayload(_))
        ));
    }

    #[test]
    fn header_mime_lookup() {
        assert_eq!(data_uri_mime_type("data:image/webp;base64,AAAA"), Some("image/webp"));
        assert_eq!(data_uri_mime_type("data:;base64,AAAA"), None);
        assert_eq!(data_uri_mime_type("not a uri"), None);
    }

    #[test]
    fn extension_is_mime_subtype() {
        assert_eq!(extension_for_mime("image/jpeg"), "jpeg");
        assert_eq!(extension_for_mime("image/png"), "png");
        assert_eq!(extension_for_mime("image/svg+xml"), "svg");
        assert_eq!(extension_for_mime("image/"), "png");
        assert_eq!(extension_for_mime(""), "png");
    }
}
