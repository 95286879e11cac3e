use base64::{engine::general_purpose, Engine as _};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::GenerationError;

/// MIME type assumed when neither the upload capability nor the byte sniffer
/// can tell us what the image is.
pub const FALLBACK_IMAGE_MIME: &str = "image/jpeg";

static DATA_URI_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^data:([^;,]+);base64,(.+)$").expect("valid data uri regex"));

pub fn detect_mime_type(data: &[u8]) -> Option<String> {
    // `infer` misses bare HEIC/HEIF containers, which is what most phone
    // portraits arrive as.
    if data.len() > 12 {
        let ftyp = &data[4..12];
        if ftyp.starts_with(b"ftyp") {
            let brand = &ftyp[4..8];
            if brand == b"heic" || brand == b"heif" || brand == b"hevc" {
                return Some("image/heic".to_string());
            }
        }
    }

    infer::get(data).map(|kind| kind.mime_type().to_string())
}

/// A user-supplied portrait photo. Duplicate detection in the upload history
/// keys on (name, size).
#[derive(Debug, Clone)]
pub struct SourceImage {
    pub bytes: Vec<u8>,
    pub mime_type: String,
    pub name: String,
}

impl SourceImage {
    /// Builds a source image from whatever the file-selection capability
    /// handed us. A missing or blank MIME type falls back to sniffing the
    /// bytes, then to `image/jpeg`.
    pub fn new(bytes: Vec<u8>, mime_type: Option<String>, name: impl Into<String>) -> Self {
        let mime_type = mime_type
            .filter(|value| !value.trim().is_empty())
            .or_else(|| detect_mime_type(&bytes))
            .unwrap_or_else(|| FALLBACK_IMAGE_MIME.to_string());
        SourceImage {
            bytes,
            mime_type,
            name: name.into(),
        }
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }
}

/// Encodes an image as the canonical self-contained result representation.
pub fn encode_data_uri(mime_type: &str, bytes: &[u8]) -> String {
    format!(
        "data:{};base64,{}",
        mime_type,
        general_purpose::STANDARD.encode(bytes)
    )
}

/// Decodes a `data:<mime>;base64,<payload>` string back into its MIME type
/// and raw bytes. Anything else is a malformed image for refinement purposes.
pub fn decode_data_uri(value: &str) -> Result<(String, Vec<u8>), GenerationError> {
    let captures = DATA_URI_RE
        .captures(value.trim())
        .ok_or_else(|| GenerationError::MalformedImage("expected a base64 data URI".to_string()))?;
    let mime_type = captures[1].to_string();
    let bytes = general_purpose::STANDARD
        .decode(captures[2].as_bytes())
        .map_err(|err| GenerationError::MalformedImage(err.to_string()))?;
    Ok((mime_type, bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_MAGIC: &[u8] = &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a, 0, 0, 0, 0, 0];

    #[test]
    fn data_uri_round_trips_mime_and_bytes() {
        let bytes = vec![0u8, 1, 2, 250, 255];
        let uri = encode_data_uri("image/png", &bytes);
        let (mime, decoded) = decode_data_uri(&uri).unwrap();
        assert_eq!(mime, "image/png");
        assert_eq!(decoded, bytes);
    }

    #[test]
    fn rejects_non_data_uri_input() {
        let err = decode_data_uri("https://example.com/headshot.png").unwrap_err();
        assert!(matches!(err, GenerationError::MalformedImage(_)));
    }

    #[test]
    fn rejects_undecodable_payload() {
        let err = decode_data_uri("data:image/png;base64,@@not-base64@@").unwrap_err();
        assert!(matches!(err, GenerationError::MalformedImage(_)));
    }

    #[test]
    fn sniffs_png_magic() {
        assert_eq!(detect_mime_type(PNG_MAGIC).as_deref(), Some("image/png"));
    }

    #[test]
    fn source_image_prefers_declared_mime() {
        let image = SourceImage::new(PNG_MAGIC.to_vec(), Some("image/webp".into()), "a.webp");
        assert_eq!(image.mime_type, "image/webp");
    }

    #[test]
    fn source_image_falls_back_to_sniffed_then_jpeg() {
        let sniffed = SourceImage::new(PNG_MAGIC.to_vec(), None, "a");
        assert_eq!(sniffed.mime_type, "image/png");

        let unknown = SourceImage::new(vec![1, 2, 3], Some("  ".into()), "b");
        assert_eq!(unknown.mime_type, FALLBACK_IMAGE_MIME);
    }
}
