//! PDF text extraction via pdfium.
//!
//! pdfium is a blocking C library, so the whole parse runs inside
//! `spawn_blocking`. The bytes are spilled to a temporary file first because
//! pdfium wants a path it can memory-map.

use super::DocumentExtractor;
use crate::error::LinkpostError;
use async_trait::async_trait;
use pdfium_render::prelude::*;
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};

const PDF_MAGIC: &[u8; 4] = b"%PDF";

/// Plain text pulled out of a document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentText {
    /// Page texts joined with blank lines, in page order.
    pub text: String,
    pub page_count: usize,
    pub title: Option<String>,
}

/// Check the `%PDF` signature, returning the offending prefix otherwise.
pub fn check_pdf_magic(bytes: &[u8]) -> Result<(), LinkpostError> {
    if bytes.len() >= 4 && &bytes[..4] == PDF_MAGIC {
        return Ok(());
    }
    let mut magic = [0u8; 4];
    for (slot, b) in magic.iter_mut().zip(bytes.iter()) {
        *slot = *b;
    }
    Err(LinkpostError::NotAPdf { magic })
}

/// Default [`DocumentExtractor`] backed by pdfium.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfiumExtractor;

impl PdfiumExtractor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl DocumentExtractor for PdfiumExtractor {
    async fn extract(&self, bytes: &[u8]) -> Result<DocumentText, LinkpostError> {
        check_pdf_magic(bytes)?;

        let mut tmp = tempfile::NamedTempFile::new().map_err(|e| LinkpostError::DocumentExtraction {
            detail: format!("tempfile: {e}"),
        })?;
        tmp.write_all(bytes).map_err(|e| LinkpostError::DocumentExtraction {
            detail: format!("tempfile write: {e}"),
        })?;
        let path = tmp.path().to_path_buf();

        // `tmp` must outlive the blocking task
        let result = tokio::task::spawn_blocking(move || extract_blocking(&path))
            .await
            .map_err(|e| LinkpostError::Internal(format!("Extraction task panicked: {e}")))?;
        drop(tmp);

        let doc = result?;
        info!(
            "Extracted {} chars from {} page(s)",
            doc.text.len(),
            doc.page_count
        );
        Ok(doc)
    }
}

fn extract_blocking(pdf_path: &Path) -> Result<DocumentText, LinkpostError> {
    let pdfium = pdfium_auto::bind_pdfium_silent().map_err(|e| LinkpostError::DocumentExtraction {
        detail: format!("pdfium unavailable: {e}"),
    })?;

    let document = pdfium
        .load_pdf_from_file(pdf_path, None)
        .map_err(|e| LinkpostError::DocumentExtraction {
            detail: format!("{:?}", e),
        })?;

    let title = document
        .metadata()
        .get(PdfDocumentMetadataTagType::Title)
        .map(|t| t.value().trim().to_string())
        .filter(|v| !v.is_empty());

    let pages = document.pages();
    let page_count = pages.len() as usize;
    let mut texts = Vec::with_capacity(page_count);

    for (idx, page) in pages.iter().enumerate() {
        let text = page.text().map_err(|e| LinkpostError::DocumentExtraction {
            detail: format!("page {}: {:?}", idx + 1, e),
        })?;
        let content = text.all();
        debug!("Page {}: {} chars", idx + 1, content.len());
        let trimmed = content.trim();
        if !trimmed.is_empty() {
            texts.push(trimmed.to_string());
        }
    }

    Ok(DocumentText {
        text: texts.join("\n\n"),
        page_count,
        title,
    })
}
