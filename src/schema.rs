use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Identity and coverage details for the statement. Every member is optional:
/// a field the model did not find stays absent rather than being fabricated.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct AccountInfo {
    #[schemars(description = "Name of the issuing bank as printed on the statement")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bank_name: Option<String>,

    #[schemars(description = "Name of the account holder")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_holder: Option<String>,

    #[schemars(description = "Account number with most digits redacted, e.g. XXXXXXX7")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_number_masked: Option<String>,

    #[schemars(description = "First day the statement covers, ISO date (YYYY-MM-DD)")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub statement_period_start: Option<String>,

    #[schemars(description = "Last day the statement covers, ISO date (YYYY-MM-DD)")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub statement_period_end: Option<String>,

    #[schemars(description = "Account type, e.g. Checking, Savings")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_type: Option<String>,
}

/// Statement-level totals. Absent when the statement does not print them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct Summary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opening_balance: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub closing_balance: Option<f64>,

    #[schemars(description = "Sum of all credits over the statement period")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_credits: Option<f64>,

    #[schemars(description = "Sum of all debits over the statement period")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_debits: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub average_daily_balance: Option<f64>,

    #[schemars(description = "Number of overdraft events during the period")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overdraft_count: Option<u32>,

    #[schemars(description = "Number of non-sufficient-funds events during the period")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nsf_count: Option<u32>,

    #[schemars(description = "ISO 4217 currency code, e.g. INR, USD")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
}

/// A single statement line, in statement order. No dedup or re-sorting is
/// applied; the sequence is exactly what the model extracted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct Transaction {
    #[schemars(description = "Transaction date, ISO date (YYYY-MM-DD)")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[schemars(description = "Signed amount: negative for debits, positive for credits")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,

    #[schemars(description = "Running account balance after this transaction")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub balance: Option<f64>,

    #[schemars(description = "Free-text spending category, e.g. Housing, Fuel, Income")]
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// The structured fields extracted from one statement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct FieldSet {
    pub account_info: AccountInfo,
    pub summary: Summary,
    pub transactions: Vec<Transaction>,
}

impl FieldSet {
    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(FieldSet)
    }

    /// Pretty-printed JSON Schema of the field set, for model clients that
    /// enforce structured output server-side.
    pub fn schema_as_json() -> Result<String, serde_json::Error> {
        let schema = Self::generate_json_schema();
        serde_json::to_string_pretty(&schema)
    }
}

/// Diagnostic metadata for one pipeline run. Never feeds back into `fields`
/// or `insights`; kept for debugging and audit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QualityInfo {
    /// Length in characters of the text handed to the extraction prompt.
    pub text_length: usize,

    /// Pretty-printed JSON of the (normalized) extraction response.
    pub raw_extraction_response: String,

    /// Pretty-printed JSON of the insight response.
    pub raw_insights_response: String,

    /// Whether any page or image went through OCR.
    pub ocr_used: bool,

    pub warnings: Vec<String>,

    /// True only for the canonical offline fixture.
    pub mock_mode: bool,
}

/// Final pipeline output. All three members are always present; a failed
/// stage leaves its member at the empty default so consumers never need
/// top-level null checks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionResult {
    pub fields: FieldSet,
    pub insights: Vec<String>,
    pub quality: QualityInfo,
}
