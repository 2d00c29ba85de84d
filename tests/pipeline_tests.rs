use async_trait::async_trait;
use bank_statement_parser::{
    mock_result, ModelClient, Result, StatementError, StatementProcessor,
};
use lopdf::{dictionary, Document, Object, Stream};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Model stub that always answers with the same canned text.
struct CannedClient {
    response: String,
}

impl CannedClient {
    fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
        }
    }
}

#[async_trait]
impl ModelClient for CannedClient {
    async fn generate(&self, _prompt: &str) -> Result<String> {
        Ok(self.response.clone())
    }
}

/// Model stub that simulates a network fault on every call.
struct FailingClient;

#[async_trait]
impl ModelClient for FailingClient {
    async fn generate(&self, _prompt: &str) -> Result<String> {
        Err(StatementError::ModelCall("connection reset".to_string()))
    }
}

/// Minimal one-page PDF with an embedded text layer, so tests never need
/// OCR or a model network round trip for the extraction stage.
fn statement_pdf(text: &str) -> tempfile::NamedTempFile {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();
    let font_id = doc.new_object_id();
    let resources_id = doc.new_object_id();
    let content_id = doc.new_object_id();
    let page_id = doc.new_object_id();

    doc.objects.insert(
        font_id,
        Object::Dictionary(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Courier",
        }),
    );
    doc.objects.insert(
        resources_id,
        Object::Dictionary(dictionary! {
            "Font" => dictionary! { "F1" => font_id },
        }),
    );

    let content = format!("BT /F1 12 Tf 50 700 Td ({}) Tj ET", text);
    doc.objects.insert(
        content_id,
        Object::Stream(Stream::new(dictionary! {}, content.into_bytes())),
    );
    doc.objects.insert(
        page_id,
        Object::Dictionary(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Resources" => resources_id,
            "Contents" => content_id,
        }),
    );
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        }),
    );
    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut pdf_bytes = Vec::new();
    doc.save_to(&mut pdf_bytes).unwrap();

    let temp = tempfile::Builder::new().suffix(".pdf").tempfile().unwrap();
    std::fs::write(temp.path(), &pdf_bytes).unwrap();
    temp
}

#[tokio::test]
async fn test_mode_is_deterministic_and_ignores_path() {
    init_logging();
    let processor = StatementProcessor::new(FailingClient);

    let a = processor.process("/does/not/exist.pdf", true).await.unwrap();
    let b = processor.process("another-path.png", true).await.unwrap();

    assert_eq!(a, b);
    assert_eq!(a, mock_result());
    assert_eq!(a.fields.summary.closing_balance, Some(44079.83));
    assert_eq!(a.fields.transactions.len(), 3);
    assert!(a.quality.mock_mode);
}

#[tokio::test]
async fn model_fault_degrades_without_raising() {
    init_logging();
    let pdf = statement_pdf("Statement of account 1234");
    let processor = StatementProcessor::new(FailingClient);

    let result = processor.process(pdf.path(), false).await.unwrap();

    // Empty defaults rather than an error from the orchestrator.
    assert_eq!(result.fields, Default::default());
    assert!(result.insights.is_empty());

    // The audit trail still records what happened upstream.
    assert!(result
        .quality
        .raw_extraction_response
        .contains("Extraction parse failed: Model call failed: connection reset"));
    assert!(!result.quality.warnings.is_empty());
    assert!(result.quality.text_length > 0);
    assert!(!result.quality.mock_mode);
}

#[tokio::test]
async fn fenced_model_output_is_parsed() {
    init_logging();
    let pdf = statement_pdf("Statement of account 1234");
    let client = CannedClient::new(
        "```json\n{\"fields\":{\"summary\":{\"closing_balance\":44079.83,\"currency\":\"INR\"},\
         \"transactions\":[{\"date\":\"2019-02-01\",\"amount\":-24.5}]}}\n```",
    );
    let processor = StatementProcessor::new(client);

    let result = processor.process(pdf.path(), false).await.unwrap();

    assert_eq!(result.fields.summary.closing_balance, Some(44079.83));
    assert_eq!(result.fields.summary.currency.as_deref(), Some("INR"));
    assert_eq!(result.fields.transactions.len(), 1);
    assert_eq!(result.fields.transactions[0].amount, Some(-24.5));
}

#[tokio::test]
async fn bare_fields_object_is_normalized() {
    init_logging();
    // Model forgot the `fields` wrapper; the normalizer adds it.
    let pdf = statement_pdf("Statement of account 1234");
    let client = CannedClient::new(r#"{"summary":{"opening_balance":40000.0}}"#);
    let processor = StatementProcessor::new(client);

    let result = processor.process(pdf.path(), false).await.unwrap();

    assert_eq!(result.fields.summary.opening_balance, Some(40000.0));
}

#[tokio::test]
async fn non_json_model_output_degrades_to_insight_lines() {
    init_logging();
    let pdf = statement_pdf("Statement of account 1234");
    let client = CannedClient::new("- balance went up\n- rent is the largest expense");
    let processor = StatementProcessor::new(client);

    let result = processor.process(pdf.path(), false).await.unwrap();

    // Extraction stage saw no structured fields, so fields stay empty, but
    // the insight stage picks up the degraded line list.
    assert_eq!(result.fields, Default::default());
    assert_eq!(
        result.insights,
        vec![
            "- balance went up".to_string(),
            "- rent is the largest expense".to_string()
        ]
    );
}

#[tokio::test]
async fn result_always_has_all_top_level_keys() {
    init_logging();
    let pdf = statement_pdf("Statement of account 1234");
    let processor = StatementProcessor::new(FailingClient);

    let result = processor.process(pdf.path(), false).await.unwrap();
    let json = serde_json::to_value(&result).unwrap();

    assert!(json.get("fields").is_some());
    assert!(json.get("insights").is_some());
    assert!(json.get("quality").is_some());
}

#[tokio::test]
async fn upload_temp_file_is_cleaned_up() {
    init_logging();
    let pdf = statement_pdf("Statement of account 1234");
    let bytes = std::fs::read(pdf.path()).unwrap();
    let processor = StatementProcessor::new(CannedClient::new(r#"{"fields":{}}"#));

    let before = count_upload_temp_files();
    let result = processor.process_upload(&bytes, "pdf").await.unwrap();
    let after = count_upload_temp_files();

    assert_eq!(result.fields, Default::default());
    assert_eq!(before, after, "upload temp file leaked");
}

#[tokio::test]
async fn unreadable_document_is_an_error() {
    init_logging();
    let processor = StatementProcessor::new(CannedClient::new("{}"));

    let result = processor.process("/does/not/exist.pdf", false).await;

    assert!(matches!(result, Err(StatementError::ReadDocument { .. })));
}

fn count_upload_temp_files() -> usize {
    std::fs::read_dir(std::env::temp_dir())
        .map(|entries| {
            entries
                .filter_map(|e| e.ok())
                .filter(|e| {
                    e.file_name()
                        .to_string_lossy()
                        .starts_with("statement_upload_")
                })
                .count()
        })
        .unwrap_or(0)
}
