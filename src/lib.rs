//! # Bank Statement Parser
//!
//! Extracts structured financial data and human-readable insights from
//! bank-statement documents (PDF or scanned image).
//!
//! The pipeline runs in fixed sequential stages:
//!
//! 1. **Text extraction** - PDF text layer per page, with a 300 DPI render
//!    plus OCR fallback for pages without one; whole-image OCR for scans.
//! 2. **Field extraction** - a deterministic prompt describing the target
//!    schema is sent to the model, and the response is parsed tolerantly
//!    (code fences stripped, non-JSON degraded to a line list) and
//!    normalized to always expose a `fields` key.
//! 3. **Insight generation** - a second prompt over the normalized fields
//!    asks for bullet-point observations.
//!
//! The final [`ExtractionResult`] always carries `fields`, `insights`, and
//! `quality`, using empty defaults where a stage failed; model-side
//! failures never escape as faults.
//!
//! ## Example
//!
//! ```rust,ignore
//! use bank_statement_parser::{GeminiClient, StatementProcessor};
//!
//! let client = GeminiClient::from_env()?;
//! let processor = StatementProcessor::new(client);
//! let result = processor.process("statement.pdf", false).await?;
//! println!("{:?}", result.fields.summary.closing_balance);
//! ```

pub mod document;
pub mod error;
pub mod llm;
pub mod ocr;
pub mod pipeline;
pub mod schema;

pub use document::{extract_document_text, DocumentText, DEFAULT_RENDER_DPI};
pub use error::{Result, StatementError};
pub use llm::client::{GeminiClient, ModelClient, API_KEY_ENV};
pub use llm::prompts::{build_extraction_prompt, build_insight_prompt};
pub use llm::response::{model_json, normalize_extraction, ModelJson};
pub use ocr::{OcrEngine, TextRecognizer};
pub use pipeline::{mock_result, StatementProcessor};
pub use schema::{
    AccountInfo, ExtractionResult, FieldSet, QualityInfo, Summary, Transaction,
};
