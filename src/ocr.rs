use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::error::{Result, StatementError};

/// The image-recognition capability consumed by the text extractor:
/// image bytes in, recognized text out. Like [`crate::ModelClient`], the
/// pipeline depends only on this trait, so tests substitute a stub without
/// Tesseract or poppler installed.
pub trait TextRecognizer: Send + Sync {
    fn recognize_bytes(&self, image_data: &[u8]) -> Result<String>;

    /// Rasterizes one PDF page and recognizes it.
    fn recognize_pdf_page(&self, pdf_path: &Path, page_num: u32) -> Result<String>;
}

/// Tesseract-backed OCR for scanned statement pages.
#[derive(Debug, Clone)]
pub struct OcrEngine {
    languages: String,
    dpi: u32,
}

impl OcrEngine {
    pub fn new(languages: &[String], dpi: u32) -> Self {
        let languages = if languages.is_empty() {
            "eng".to_string()
        } else {
            languages.join("+")
        };

        Self { languages, dpi }
    }

    pub fn dpi(&self) -> u32 {
        self.dpi
    }
}

impl TextRecognizer for OcrEngine {
    fn recognize_bytes(&self, image_data: &[u8]) -> Result<String> {
        let img = image::load_from_memory(image_data)
            .map_err(|e| StatementError::Ocr(format!("Failed to load image: {}", e)))?;

        // Normalize to PNG in memory; leptess reads PNG reliably.
        let mut png_data = Vec::new();
        let mut cursor = Cursor::new(&mut png_data);
        img.write_to(&mut cursor, image::ImageFormat::Png)
            .map_err(|e| StatementError::Ocr(format!("Failed to convert image: {}", e)))?;

        let mut lt = leptess::LepTess::new(None, &self.languages)
            .map_err(|e| StatementError::Ocr(format!("Failed to initialize Tesseract: {}", e)))?;

        lt.set_image_from_mem(&png_data)
            .map_err(|e| StatementError::Ocr(format!("Failed to set image for OCR: {}", e)))?;

        let text = lt
            .get_utf8_text()
            .map_err(|e| StatementError::Ocr(format!("OCR failed: {}", e)))?;

        Ok(text)
    }

    fn recognize_pdf_page(&self, pdf_path: &Path, page_num: u32) -> Result<String> {
        let image_data = render_pdf_page(pdf_path, page_num, self.dpi)?;
        self.recognize_bytes(&image_data)
    }
}

impl Default for OcrEngine {
    fn default() -> Self {
        Self::new(&[], crate::document::DEFAULT_RENDER_DPI)
    }
}

/// Renders a single PDF page to a PNG via pdftoppm (poppler-utils),
/// reading straight from the document on disk.
fn render_pdf_page(pdf_path: &Path, page_num: u32, dpi: u32) -> Result<Vec<u8>> {
    let temp_dir = std::env::temp_dir();
    let output_prefix = temp_dir.join(format!("statement_page_{}", uuid::Uuid::new_v4()));

    let output = Command::new("pdftoppm")
        .args([
            "-png",
            "-r",
            &dpi.to_string(),
            "-f",
            &page_num.to_string(),
            "-l",
            &page_num.to_string(),
            pdf_path.to_string_lossy().as_ref(),
            output_prefix.to_string_lossy().as_ref(),
        ])
        .output()
        .map_err(|e| {
            StatementError::DocumentDecode(format!(
                "Failed to run pdftoppm: {}. Make sure poppler-utils is installed.",
                e
            ))
        })?;

    if !output.status.success() {
        return Err(StatementError::DocumentDecode(format!(
            "pdftoppm failed: {}",
            String::from_utf8_lossy(&output.stderr)
        )));
    }

    // pdftoppm zero-pads the page suffix depending on the page count, so
    // the output file is discovered by prefix rather than by guessing the
    // padding width. Only one page was rendered, so one match exists.
    let prefix = format!(
        "{}-",
        output_prefix
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    );
    let image_path = find_rendered_page(&temp_dir, &prefix)?;

    let image_data = std::fs::read(&image_path).map_err(|e| {
        StatementError::DocumentDecode(format!("Failed to read rendered image: {}", e))
    })?;

    let _ = std::fs::remove_file(&image_path);

    Ok(image_data)
}

fn find_rendered_page(dir: &Path, prefix: &str) -> Result<PathBuf> {
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with(prefix) && name.ends_with(".png") {
            return Ok(entry.path());
        }
    }

    Err(StatementError::DocumentDecode(
        "Failed to find rendered page image".to_string(),
    ))
}
