use std::path::Path;

use log::{debug, warn};

use crate::error::{Result, StatementError};
use crate::ocr::TextRecognizer;

/// Resolution used when a page has to be rasterized for OCR.
pub const DEFAULT_RENDER_DPI: u32 = 300;

/// Text pulled out of one document, with a note of whether OCR was involved.
#[derive(Debug, Clone, Default)]
pub struct DocumentText {
    pub text: String,
    pub ocr_used: bool,
}

/// Extracts plain text from a statement document.
///
/// PDFs are read page by page: the embedded text layer is preferred, and any
/// page without a usable layer is handed to the recognizer (rasterized and
/// OCR'd). Plain images are recognized whole. A document that cannot be
/// opened or decoded is fatal for the request. The blocking PDF and OCR work
/// runs on the blocking thread pool.
pub async fn extract_document_text<R>(path: &Path, ocr: &R) -> Result<DocumentText>
where
    R: TextRecognizer + Clone + 'static,
{
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "pdf" => {
            let bytes = read_bytes(path).await?;
            let path = path.to_path_buf();
            let ocr = ocr.clone();
            tokio::task::spawn_blocking(move || extract_pdf_pages(&path, &bytes, &ocr)).await?
        }
        "png" | "jpg" | "jpeg" => {
            let bytes = read_bytes(path).await?;
            let ocr = ocr.clone();
            let text = tokio::task::spawn_blocking(move || ocr.recognize_bytes(&bytes)).await??;
            Ok(DocumentText {
                text: text.trim().to_string(),
                ocr_used: true,
            })
        }
        other => Err(StatementError::UnsupportedDocument(other.to_string())),
    }
}

async fn read_bytes(path: &Path) -> Result<Vec<u8>> {
    tokio::fs::read(path)
        .await
        .map_err(|e| StatementError::ReadDocument {
            path: path.to_path_buf(),
            source: e,
        })
}

fn extract_pdf_pages<R: TextRecognizer>(
    path: &Path,
    pdf_bytes: &[u8],
    ocr: &R,
) -> Result<DocumentText> {
    let doc = lopdf::Document::load_mem(pdf_bytes)
        .map_err(|e| StatementError::DocumentDecode(format!("Failed to load PDF: {}", e)))?;

    let mut text = String::new();
    let mut ocr_used = false;

    for (page_num, _) in doc.get_pages() {
        let layer_text = doc.extract_text(&[page_num]).unwrap_or_default();

        if page_needs_ocr(&layer_text) {
            debug!("Page {} has no usable text layer, falling back to OCR", page_num);
            let page_text = ocr.recognize_pdf_page(path, page_num)?;
            text.push_str(&page_text);
            ocr_used = true;
        } else {
            text.push_str(&layer_text);
        }
        text.push('\n');
    }

    if ocr_used {
        warn!("OCR fallback was used for at least one page of {}", path.display());
    }

    Ok(DocumentText {
        text: text.trim().to_string(),
        ocr_used,
    })
}

/// A page falls back to OCR when its text layer is absent or empty.
fn page_needs_ocr(layer_text: &str) -> bool {
    layer_text.trim().is_empty()
}
