//! Image payload decoding: base64 or `data:` URI → raw bytes + format.
//!
//! The image service answers with bare base64, while callers that round-trip
//! through a browser hand back `data:<mime>;base64,<b64>` URIs. Both forms are
//! accepted everywhere a payload is consumed.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::ImageFormat;
use tracing::debug;

/// Container formats the archive knows how to name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlideFormat {
    Png,
    Jpeg,
    Webp,
}

impl SlideFormat {
    pub fn extension(self) -> &'static str {
        match self {
            SlideFormat::Png => "png",
            SlideFormat::Jpeg => "jpg",
            SlideFormat::Webp => "webp",
        }
    }

    pub fn mime(self) -> &'static str {
        match self {
            SlideFormat::Png => "image/png",
            SlideFormat::Jpeg => "image/jpeg",
            SlideFormat::Webp => "image/webp",
        }
    }
}

/// Identify the format from magic bytes. Anything unrecognised is treated as PNG.
pub fn sniff_format(bytes: &[u8]) -> SlideFormat {
    match image::guess_format(bytes) {
        Ok(ImageFormat::Jpeg) => SlideFormat::Jpeg,
        Ok(ImageFormat::WebP) => SlideFormat::Webp,
        _ => SlideFormat::Png,
    }
}

/// Strip an optional `data:...;base64,` prefix and decode.
pub fn decode_payload(payload: &str) -> Result<Vec<u8>, String> {
    let trimmed = payload.trim();
    let b64 = match trimmed.strip_prefix("data:") {
        Some(rest) => match rest.split_once(',') {
            Some((meta, data)) if meta.ends_with(";base64") => data,
            Some(_) => return Err("data URI is not base64-encoded".to_string()),
            None => return Err("data URI has no payload".to_string()),
        },
        None => trimmed,
    };

    if b64.is_empty() {
        return Err("empty payload".to_string());
    }

    let bytes = STANDARD
        .decode(b64)
        .map_err(|e| format!("invalid base64: {e}"))?;
    debug!("Decoded payload → {} bytes", bytes.len());
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, Rgba, RgbaImage};
    use std::io::Cursor;

    fn encoded(format: ImageFormat) -> Vec<u8> {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(4, 4, Rgba([26, 54, 93, 255])));
        let img = if format == ImageFormat::Jpeg {
            DynamicImage::ImageRgb8(img.to_rgb8())
        } else {
            img
        };
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), format)
            .expect("encode should succeed");
        buf
    }

    #[test]
    fn decodes_bare_base64() {
        let png = encoded(ImageFormat::Png);
        let b64 = STANDARD.encode(&png);
        assert_eq!(decode_payload(&b64).unwrap(), png);
    }

    #[test]
    fn decodes_data_uri() {
        let png = encoded(ImageFormat::Png);
        let uri = format!("data:image/png;base64,{}", STANDARD.encode(&png));
        assert_eq!(decode_payload(&uri).unwrap(), png);
    }

    #[test]
    fn rejects_non_base64_data_uri() {
        assert!(decode_payload("data:text/plain,hello").is_err());
        assert!(decode_payload("data:image/png;base64").is_err());
        assert!(decode_payload("   ").is_err());
        assert!(decode_payload("@@@").is_err());
    }

    #[test]
    fn sniffs_png_and_jpeg() {
        assert_eq!(sniff_format(&encoded(ImageFormat::Png)), SlideFormat::Png);
        assert_eq!(sniff_format(&encoded(ImageFormat::Jpeg)), SlideFormat::Jpeg);
        assert_eq!(SlideFormat::Jpeg.extension(), "jpg");
    }

    #[test]
    fn unknown_bytes_default_to_png() {
        assert_eq!(sniff_format(b"hello world"), SlideFormat::Png);
    }
}
