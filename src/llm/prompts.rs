use serde_json::Value;

/// Schema description shared with the model. Field names here are the wire
/// contract consumers rely on; keep in sync with [`crate::schema::FieldSet`].
const EXTRACTION_TEMPLATE: &str = r#"You are a financial document parser. Extract this data in strict JSON.

fields:
  account_info:
    bank_name
    account_holder
    account_number_masked
    statement_period_start
    statement_period_end
    account_type
  summary:
    opening_balance
    closing_balance
    total_credits
    total_debits
    average_daily_balance
    overdraft_count
    nsf_count
    currency
  transactions:
    - date
      description
      amount
      balance
      category

Omit any field that is not present in the statement. Dates must be ISO
(YYYY-MM-DD). Amounts are signed decimals: negative for debits, positive
for credits.

Input:
"#;

/// Builds the extraction prompt for a statement's raw text. Pure string
/// template: the same text always produces the same prompt.
pub fn build_extraction_prompt(text: &str) -> String {
    format!("{}{}", EXTRACTION_TEMPLATE, text)
}

/// Builds the follow-up prompt asking for bullet-point observations about
/// the already-extracted statement data.
pub fn build_insight_prompt(extraction: &Value) -> String {
    let pretty =
        serde_json::to_string_pretty(extraction).unwrap_or_else(|_| extraction.to_string());

    format!(
        "Given this bank statement data, generate concise bullet-style financial insights.\n\
         Respond as JSON: {{\"insights\": [\"...\", \"...\"]}}\n\n{}",
        pretty
    )
}
