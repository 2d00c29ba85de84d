use std::path::Path;

use log::{debug, info, warn};
use serde_json::Value;

use crate::document::{extract_document_text, DEFAULT_RENDER_DPI};
use crate::error::Result;
use crate::llm::client::ModelClient;
use crate::llm::prompts::{build_extraction_prompt, build_insight_prompt};
use crate::llm::response::{model_json, normalize_extraction};
use crate::ocr::OcrEngine;
use crate::schema::{
    AccountInfo, ExtractionResult, FieldSet, QualityInfo, Summary, Transaction,
};

/// Runs the full statement pipeline: text extraction, model extraction,
/// normalization, insight generation, result assembly.
///
/// The model client is constructed by the caller and passed in; the
/// processor holds no global or shared mutable state, so separate runs may
/// proceed concurrently.
pub struct StatementProcessor<M: ModelClient> {
    client: M,
    ocr_languages: Vec<String>,
    dpi: u32,
}

impl<M: ModelClient> StatementProcessor<M> {
    pub fn new(client: M) -> Self {
        Self {
            client,
            ocr_languages: Vec::new(),
            dpi: DEFAULT_RENDER_DPI,
        }
    }

    pub fn with_ocr_languages(mut self, languages: &[String]) -> Self {
        self.ocr_languages = languages.to_vec();
        self
    }

    pub fn with_dpi(mut self, dpi: u32) -> Self {
        self.dpi = dpi;
        self
    }

    /// Processes one statement document into an [`ExtractionResult`].
    ///
    /// With `test_mode` set, the canonical fixture is returned immediately
    /// with no I/O or model calls. Otherwise a document that cannot be read
    /// or decoded is an error, while model-side failures degrade: the
    /// result always carries all three top-level members, empty where a
    /// stage failed.
    pub async fn process(&self, path: impl AsRef<Path>, test_mode: bool) -> Result<ExtractionResult> {
        if test_mode {
            debug!("Test mode: returning canonical mock result");
            return Ok(mock_result());
        }

        let path = path.as_ref();
        let ocr = OcrEngine::new(&self.ocr_languages, self.dpi);
        let document = extract_document_text(path, &ocr).await?;

        info!(
            "Extracted {} chars from {} (ocr_used: {})",
            document.text.chars().count(),
            path.display(),
            document.ocr_used
        );

        let mut warnings = Vec::new();

        // Stage 1: structured field extraction.
        let extraction_prompt = build_extraction_prompt(&document.text);
        let extraction = normalize_extraction(model_json(&self.client, &extraction_prompt).await);

        let fields_value = extraction
            .get("fields")
            .cloned()
            .unwrap_or_else(|| Value::Object(Default::default()));

        if let Some(err) = fields_value.get("error").and_then(Value::as_str) {
            warnings.push(format!("Extraction failed: {}", err));
        }

        let fields: FieldSet = match serde_json::from_value(fields_value) {
            Ok(fields) => fields,
            Err(e) => {
                warn!("Extracted fields did not match the schema: {}", e);
                warnings.push(format!("Extracted fields did not match the schema: {}", e));
                FieldSet::default()
            }
        };

        if let Some(period_warning) = statement_period_warning(&fields.account_info) {
            warnings.push(period_warning);
        }

        // Stage 2: insights over whatever fields were available.
        let insight_prompt = build_insight_prompt(&extraction);
        let insights_value = model_json(&self.client, &insight_prompt).await;

        if let Some(err) = insights_value.get("error").and_then(Value::as_str) {
            warnings.push(format!("Insight generation failed: {}", err));
        }

        let insights = extract_insights(&insights_value);

        // Quality is assembled regardless of how the stages went.
        let quality = QualityInfo {
            text_length: document.text.chars().count(),
            raw_extraction_response: serde_json::to_string_pretty(&extraction)?,
            raw_insights_response: serde_json::to_string_pretty(&insights_value)?,
            ocr_used: document.ocr_used,
            warnings,
            mock_mode: false,
        };

        Ok(ExtractionResult {
            fields,
            insights,
            quality,
        })
    }

    /// Processes an uploaded document body. The bytes are written to a
    /// temporary file which is removed when this call returns, whether
    /// extraction succeeded or failed.
    pub async fn process_upload(&self, bytes: &[u8], extension: &str) -> Result<ExtractionResult> {
        let temp = tempfile::Builder::new()
            .prefix("statement_upload_")
            .suffix(&format!(".{}", extension.trim_start_matches('.')))
            .tempfile()?;

        tokio::fs::write(temp.path(), bytes).await?;

        self.process(temp.path(), false).await
    }
}

/// Flags a statement period whose end date precedes its start. The fields
/// are kept as extracted; this is diagnostic only.
fn statement_period_warning(info: &AccountInfo) -> Option<String> {
    let start = info.statement_period_start.as_deref()?;
    let end = info.statement_period_end.as_deref()?;

    let start_date = chrono::NaiveDate::parse_from_str(start, "%Y-%m-%d").ok()?;
    let end_date = chrono::NaiveDate::parse_from_str(end, "%Y-%m-%d").ok()?;

    if end_date < start_date {
        Some(format!(
            "Statement period end {} is before start {}",
            end, start
        ))
    } else {
        None
    }
}

/// Pulls the `insights` array out of an insight response, defaulting to an
/// empty list when the key is absent or the call failed.
fn extract_insights(value: &Value) -> Vec<String> {
    value
        .get("insights")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .map(|item| match item.as_str() {
                    Some(s) => s.to_string(),
                    None => item.to_string(),
                })
                .collect()
        })
        .unwrap_or_default()
}

/// The canonical fixture returned in test mode: a fixed Axis Bank statement
/// used for offline verification and UI demonstration.
pub fn mock_result() -> ExtractionResult {
    let transactions = vec![
        Transaction {
            date: Some("2019-02-01".to_string()),
            description: Some("Card payment - High St Petrol Station".to_string()),
            amount: Some(-24.5),
            balance: Some(39975.5),
            category: Some("Fuel".to_string()),
        },
        Transaction {
            date: Some("2019-02-04".to_string()),
            description: Some("Job BiWeekly Payment".to_string()),
            amount: Some(2575.0),
            balance: Some(42500.5),
            category: Some("Income".to_string()),
        },
        Transaction {
            date: Some("2019-02-28".to_string()),
            description: Some("Monthly Apartment Rent".to_string()),
            amount: Some(-987.33),
            balance: Some(44079.83),
            category: Some("Housing".to_string()),
        },
    ];

    ExtractionResult {
        fields: FieldSet {
            account_info: AccountInfo {
                bank_name: Some("Axis Bank".to_string()),
                account_holder: Some("Harisudan R T".to_string()),
                account_number_masked: Some("XXXXXXX7".to_string()),
                statement_period_start: Some("2019-02-01".to_string()),
                statement_period_end: Some("2019-03-01".to_string()),
                account_type: Some("Checking".to_string()),
            },
            summary: Summary {
                opening_balance: Some(40000.0),
                closing_balance: Some(44079.83),
                total_credits: Some(5474.0),
                total_debits: Some(1395.17),
                average_daily_balance: None,
                overdraft_count: None,
                nsf_count: None,
                currency: Some("INR".to_string()),
            },
            transactions,
        },
        insights: vec![
            "Your account balance increased by ₹4,079.83 in February 2019.".to_string(),
            "Main income source: 'Job' with two biweekly payments totaling ₹5,150.".to_string(),
            "Largest expense: Monthly Apartment Rent (₹987.33).".to_string(),
            "Spending categories: Housing, Fuel, Food, Insurance, Shopping.".to_string(),
        ],
        quality: QualityInfo {
            text_length: 0,
            raw_extraction_response: String::new(),
            raw_insights_response: String::new(),
            ocr_used: false,
            warnings: Vec::new(),
            mock_mode: true,
        },
    }
}
