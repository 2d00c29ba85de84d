use log::warn;
use serde_json::{json, Value};

use crate::llm::client::ModelClient;

/// Outcome of parsing a raw model response.
///
/// Parsing is total: well-formed JSON round-trips exactly as `Parsed`, and
/// anything else degrades to the non-empty trimmed lines of the cleaned
/// text. Callers pattern-match instead of probing a shape-shifting value.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelJson {
    Parsed(Value),
    Degraded(Vec<String>),
}

impl ModelJson {
    pub fn parse(raw: &str) -> Self {
        let clean = strip_code_fences(raw);

        match serde_json::from_str::<Value>(&clean) {
            Ok(value) => ModelJson::Parsed(value),
            Err(_) => ModelJson::Degraded(
                clean
                    .lines()
                    .map(str::trim)
                    .filter(|line| !line.is_empty())
                    .map(String::from)
                    .collect(),
            ),
        }
    }

    /// Renders both variants as one value shape: a degraded parse becomes
    /// `{"insights": [<line>, ...]}`.
    pub fn into_value(self) -> Value {
        match self {
            ModelJson::Parsed(value) => value,
            ModelJson::Degraded(lines) => json!({ "insights": lines }),
        }
    }
}

/// Removes markdown code-fence wrappers some models put around JSON output.
fn strip_code_fences(raw: &str) -> String {
    raw.replace("```json", "").replace("```", "").trim().to_string()
}

/// Guarantees the extraction value exposes a `fields` key: a value that
/// already has one passes through unchanged, anything else is wrapped as
/// `{"fields": <value>}`. Idempotent, and never fabricates field values.
pub fn normalize_extraction(value: Value) -> Value {
    if value.get("fields").is_some() {
        value
    } else {
        json!({ "fields": value })
    }
}

/// Runs one model call and always yields a structured value: the parsed
/// response on success, or `{"error": ...}` when the call itself failed.
pub async fn model_json<M>(client: &M, prompt: &str) -> Value
where
    M: ModelClient + ?Sized,
{
    match client.generate(prompt).await {
        Ok(raw) => ModelJson::parse(raw.trim()).into_value(),
        Err(e) => {
            warn!("Model call failed: {}", e);
            json!({ "error": format!("Extraction parse failed: {}", e) })
        }
    }
}
