//! Background image asset stored as a self-describing data URI.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use thiserror::Error;

const DATA_PREFIX: &str = "data:";
const BASE64_MARKER: &str = ";base64";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AssetError {
    #[error("asset is empty")]
    Empty,
    #[error("unrecognized image format")]
    UnknownFormat,
    #[error("not a base64 data uri")]
    NotDataUri,
    #[error("base64 decode failed: {0}")]
    Base64(String),
}

/// Image mime type recognised from magic bytes.
pub fn sniff_mime(bytes: &[u8]) -> Option<&'static str> {
    if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
        Some("image/png")
    } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some("image/jpeg")
    } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        Some("image/gif")
    } else if bytes.len() >= 12 && &bytes[..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        Some("image/webp")
    } else if bytes.starts_with(b"BM") {
        Some("image/bmp")
    } else if looks_like_svg(bytes) {
        Some("image/svg+xml")
    } else {
        None
    }
}

fn looks_like_svg(bytes: &[u8]) -> bool {
    let head = &bytes[..bytes.len().min(256)];
    let head = String::from_utf8_lossy(head);
    let head = head.trim_start();
    head.starts_with("<svg") || (head.starts_with("<?xml") && head.contains("<svg"))
}

/// Encode image bytes as `data:<mime>;base64,<payload>`.
pub fn encode_asset(bytes: &[u8]) -> Result<String, AssetError> {
    if bytes.is_empty() {
        return Err(AssetError::Empty);
    }
    let mime = sniff_mime(bytes).ok_or(AssetError::UnknownFormat)?;
    Ok(format!(
        "{DATA_PREFIX}{mime}{BASE64_MARKER},{}",
        STANDARD.encode(bytes)
    ))
}

/// Mime type declared by a data URI, if it is one.
pub fn asset_mime(data_uri: &str) -> Option<&str> {
    let header = data_uri.strip_prefix(DATA_PREFIX)?.split(',').next()?;
    header.strip_suffix(BASE64_MARKER)
}

/// Recover the raw bytes from a data URI produced by [`encode_asset`].
pub fn decode_asset(data_uri: &str) -> Result<Vec<u8>, AssetError> {
    let rest = data_uri
        .trim()
        .strip_prefix(DATA_PREFIX)
        .ok_or(AssetError::NotDataUri)?;
    let (header, payload) = rest.split_once(',').ok_or(AssetError::NotDataUri)?;
    if !header.ends_with(BASE64_MARKER) {
        return Err(AssetError::NotDataUri);
    }
    STANDARD
        .decode(payload)
        .map_err(|e| AssetError::Base64(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_HEADER: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

    #[test]
    fn encodes_png_as_data_uri() {
        let uri = encode_asset(PNG_HEADER).expect("encode");
        assert!(uri.starts_with("data:image/png;base64,"));
        assert_eq!(asset_mime(&uri), Some("image/png"));
        assert_eq!(decode_asset(&uri).expect("decode"), PNG_HEADER);
    }

    #[test]
    fn sniffs_common_formats() {
        assert_eq!(sniff_mime(&[0xFF, 0xD8, 0xFF, 0xE0]), Some("image/jpeg"));
        assert_eq!(sniff_mime(b"GIF89a...."), Some("image/gif"));
        assert_eq!(sniff_mime(b"RIFF\0\0\0\0WEBPVP8 "), Some("image/webp"));
        assert_eq!(
            sniff_mime(b"  <svg xmlns=\"http://www.w3.org/2000/svg\"/>"),
            Some("image/svg+xml")
        );
        assert_eq!(sniff_mime(b"hello"), None);
    }

    #[test]
    fn rejects_empty_and_unknown_bytes() {
        assert_eq!(encode_asset(b""), Err(AssetError::Empty));
        assert_eq!(encode_asset(b"plain text"), Err(AssetError::UnknownFormat));
    }

    #[test]
    fn decode_rejects_foreign_text() {
        assert_eq!(decode_asset("hello"), Err(AssetError::NotDataUri));
        assert_eq!(
            decode_asset("data:image/png,rawbytes"),
            Err(AssetError::NotDataUri)
        );
        assert!(matches!(
            decode_asset("data:image/png;base64,@@@"),
            Err(AssetError::Base64(_))
        ));
    }
}
