//! Decoding base64 image payloads and storing them under the media root.
//!
//! Recipe images arrive inline in JSON as base64 (with or without a
//! `data:<mime>;base64,` prefix), get written to disk once, and are served
//! back as static files under `/media/`.

use base64::Engine;
use std::env;
use std::fs;
use std::path::PathBuf;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum MediaError {
    #[error("Invalid base64 image payload")]
    InvalidBase64,

    #[error("Unsupported image format")]
    UnsupportedFormat,

    #[error("Failed to store image: {0}")]
    Io(#[from] std::io::Error),
}

/// A decoded image ready to be written to disk.
pub struct DecodedImage {
    pub extension: &'static str,
    pub bytes: Vec<u8>,
}

/// Directory where uploaded media lives. Served at `/media/`.
pub fn media_root() -> PathBuf {
    PathBuf::from(env::var("MEDIA_ROOT").unwrap_or_else(|_| "./media".to_string()))
}

/// Public URL for a stored media path.
pub fn media_url(path: &str) -> String {
    format!("/media/{}", path)
}

/// Decode a base64 image payload, with or without a data-URL prefix.
/// The image format comes from the declared mime type when present,
/// otherwise from the magic bytes.
pub fn parse_image_payload(payload: &str) -> Result<DecodedImage, MediaError> {
    let (mime, data) = match payload.strip_prefix("data:") {
        Some(rest) => {
            let (mime, data) = rest
                .split_once(";base64,")
                .ok_or(MediaError::InvalidBase64)?;
            (Some(mime), data)
        }
        None => (None, payload),
    };

    let bytes = base64::engine::general_purpose::STANDARD
        .decode(data.trim())
        .map_err(|_| MediaError::InvalidBase64)?;

    let extension = match mime {
        Some(mime) => extension_for_mime(mime).ok_or(MediaError::UnsupportedFormat)?,
        None => sniff_extension(&bytes).ok_or(MediaError::UnsupportedFormat)?,
    };

    Ok(DecodedImage { extension, bytes })
}

/// Write a decoded recipe image under the media root and return its
/// media-relative path.
pub fn save_recipe_image(image: &DecodedImage) -> Result<String, MediaError> {
    let relative = format!("recipes/{}.{}", Uuid::new_v4(), image.extension);
    let path = media_root().join(&relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(&path, &image.bytes)?;
    Ok(relative)
}

fn extension_for_mime(mime: &str) -> Option<&'static str> {
    match mime {
        "image/png" => Some("png"),
        "image/jpeg" | "image/jpg" => Some("jpg"),
        "image/gif" => Some("gif"),
        "image/webp" => Some("webp"),
        _ => None,
    }
}

fn sniff_extension(bytes: &[u8]) -> Option<&'static str> {
    if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
        Some("png")
    } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some("jpg")
    } else if bytes.starts_with(b"GIF8") {
        Some("gif")
    } else if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        Some("webp")
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_BYTES: &[u8] = &[0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n', 0, 0];

    fn encode(bytes: &[u8]) -> String {
        base64::engine::general_purpose::STANDARD.encode(bytes)
    }

    #[test]
    fn test_parse_data_url() {
        let payload = format!("data:image/png;base64,{}", encode(PNG_BYTES));
        let image = parse_image_payload(&payload).unwrap();
        assert_eq!(image.extension, "png");
        assert_eq!(image.bytes, PNG_BYTES);
    }

    #[test]
    fn test_parse_raw_base64_sniffs_format() {
        let jpeg = [0xFF, 0xD8, 0xFF, 0xE0, 0x00];
        let image = parse_image_payload(&encode(&jpeg)).unwrap();
        assert_eq!(image.extension, "jpg");
    }

    #[test]
    fn test_declared_mime_wins_over_magic_bytes() {
        let payload = format!("data:image/webp;base64,{}", encode(PNG_BYTES));
        let image = parse_image_payload(&payload).unwrap();
        assert_eq!(image.extension, "webp");
    }

    #[test]
    fn test_invalid_base64_rejected() {
        assert!(matches!(
            parse_image_payload("data:image/png;base64,not-base64!"),
            Err(MediaError::InvalidBase64)
        ));
    }

    #[test]
    fn test_unknown_mime_rejected() {
        let payload = format!("data:application/pdf;base64,{}", encode(PNG_BYTES));
        assert!(matches!(
            parse_image_payload(&payload),
            Err(MediaError::UnsupportedFormat)
        ));
    }

    #[test]
    fn test_unrecognized_magic_rejected() {
        assert!(matches!(
            parse_image_payload(&encode(b"plain text")),
            Err(MediaError::UnsupportedFormat)
        ));
    }
}
