//! ZIP packaging of carousel slides.
//!
//! Entries are named `slide-<n>.<ext>` with `n` counting from 1 in input
//! order and `ext` taken from the decoded bytes. Reading an archive back
//! returns entries in the order they were written.

use crate::error::LinkpostError;
use crate::pipeline::encode::{decode_payload, sniff_format};
use std::io::{Cursor, Read, Write};
use tracing::debug;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Build a ZIP from base64 payloads or `data:` URIs.
pub fn package_slides<S: AsRef<str>>(payloads: &[S]) -> Result<Vec<u8>, LinkpostError> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

    for (idx, payload) in payloads.iter().enumerate() {
        let slide = idx + 1;
        let bytes = decode_payload(payload.as_ref())
            .map_err(|detail| LinkpostError::InvalidImagePayload { slide, detail })?;
        let name = format!("slide-{}.{}", slide, sniff_format(&bytes).extension());

        writer
            .start_file(name.as_str(), options)
            .map_err(|e| LinkpostError::Archive(format!("{name}: {e}")))?;
        writer
            .write_all(&bytes)
            .map_err(|e| LinkpostError::Archive(format!("{name}: {e}")))?;
        debug!("Packed {} ({} bytes)", name, bytes.len());
    }

    let cursor = writer
        .finish()
        .map_err(|e| LinkpostError::Archive(format!("finish: {e}")))?;
    Ok(cursor.into_inner())
}

/// Read every entry back as `(name, bytes)`, in archive order.
pub fn extract_archive(archive: &[u8]) -> Result<Vec<(String, Vec<u8>)>, LinkpostError> {
    let mut zip = ZipArchive::new(Cursor::new(archive))
        .map_err(|e| LinkpostError::Archive(format!("open: {e}")))?;

    let mut entries = Vec::with_capacity(zip.len());
    for i in 0..zip.len() {
        let mut file = zip
            .by_index(i)
            .map_err(|e| LinkpostError::Archive(format!("entry {i}: {e}")))?;
        let name = file.name().to_string();
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)
            .map_err(|e| LinkpostError::Archive(format!("{name}: {e}")))?;
        entries.push((name, bytes));
    }
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use image::{DynamicImage, ImageFormat, Rgb, RgbImage};

    fn encoded(format: ImageFormat, shade: u8) -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(3, 3, Rgb([shade, 42, 74])));
        let mut buf = Vec::new();
        img.write_to(&mut Cursor::new(&mut buf), format).unwrap();
        buf
    }

    #[test]
    fn round_trip_preserves_order_and_bytes() {
        let originals = vec![
            encoded(ImageFormat::Png, 10),
            encoded(ImageFormat::Jpeg, 20),
            encoded(ImageFormat::Png, 30),
        ];
        let payloads: Vec<String> = originals
            .iter()
            .enumerate()
            .map(|(i, b)| {
                if i == 1 {
                    format!("data:image/jpeg;base64,{}", STANDARD.encode(b))
                } else {
                    STANDARD.encode(b)
                }
            })
            .collect();

        let zip = package_slides(&payloads).unwrap();
        let entries = extract_archive(&zip).unwrap();

        let names: Vec<&str> = entries.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["slide-1.png", "slide-2.jpg", "slide-3.png"]);
        for ((_, bytes), original) in entries.iter().zip(&originals) {
            assert_eq!(bytes, original);
        }
    }

    #[test]
    fn empty_input_makes_empty_archive() {
        let zip = package_slides::<String>(&[]).unwrap();
        assert!(extract_archive(&zip).unwrap().is_empty());
    }

    #[test]
    fn bad_payload_names_slide() {
        let payloads = vec![STANDARD.encode(encoded(ImageFormat::Png, 1)), "%%%".to_string()];
        let err = package_slides(&payloads).unwrap_err();
        assert!(matches!(err, LinkpostError::InvalidImagePayload { slide: 2, .. }));
    }

    #[test]
    fn garbage_is_not_an_archive() {
        let err = extract_archive(b"not a zip").unwrap_err();
        assert_eq!(err.code(), "archive_error");
    }
}
