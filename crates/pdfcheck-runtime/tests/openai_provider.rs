//! HTTP-level tests for the OpenAI provider against a wiremock server.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use pdfcheck_core::{DocumentText, Status};
use pdfcheck_runtime::{
    ChatMessage, CompletionConfig, ExtractError, ExtractedText, LlmProvider, OpenAiProvider,
    OrchestratorBuilder, ProviderError, RuntimeConfig, TextExtractor,
};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn provider_for(server: &MockServer) -> OpenAiProvider {
    OpenAiProvider::new("sk-test-key").with_base_url(format!("{}/v1", server.uri()))
}

fn completion_body(content: &str) -> serde_json::Value {
    json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "model": "gpt-4o-mini-2024-07-18",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }],
        "usage": { "prompt_tokens": 812, "completion_tokens": 64, "total_tokens": 876 }
    })
}

#[tokio::test]
async fn complete_sends_expected_request() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(header("authorization", "Bearer sk-test-key"))
        .and(body_partial_json(json!({
            "model": "gpt-4o-mini",
            "max_tokens": 500,
            "temperature": 0.3,
            "messages": [{ "role": "user", "content": "hello" }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("{}")))
        .expect(1)
        .mount(&server)
        .await;

    let response = provider_for(&server)
        .complete(vec![ChatMessage::user("hello")], &CompletionConfig::default())
        .await
        .unwrap();

    assert_eq!(response.content, "{}");
    assert_eq!(response.model, "gpt-4o-mini-2024-07-18");
    assert_eq!(response.usage.prompt_tokens, 812);
    assert_eq!(response.usage.completion_tokens, 64);
    assert_eq!(response.stop_reason.as_deref(), Some("stop"));
}

#[tokio::test]
async fn rate_limit_reports_retry_after() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).insert_header("retry-after", "7"))
        .mount(&server)
        .await;

    let err = provider_for(&server)
        .complete(vec![ChatMessage::user("hi")], &CompletionConfig::default())
        .await
        .unwrap_err();

    match err {
        ProviderError::RateLimited { retry_after } => {
            assert_eq!(retry_after, Some(Duration::from_secs(7)));
        }
        other => panic!("expected RateLimited, got {other:?}"),
    }
}

#[tokio::test]
async fn unauthorized_is_auth_error_with_message() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": { "message": "Incorrect API key provided", "type": "invalid_request_error" }
        })))
        .mount(&server)
        .await;

    let err = provider_for(&server)
        .complete(vec![ChatMessage::user("hi")], &CompletionConfig::default())
        .await
        .unwrap_err();

    assert!(matches!(&err, ProviderError::AuthError(msg) if msg.contains("Incorrect API key")));
    assert!(!err.is_transient());
}

#[tokio::test]
async fn server_error_is_transient_api_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(502).set_body_string("bad gateway"))
        .mount(&server)
        .await;

    let err = provider_for(&server)
        .complete(vec![ChatMessage::user("hi")], &CompletionConfig::default())
        .await
        .unwrap_err();

    assert!(matches!(&err, ProviderError::ApiError { status: 502, message } if message == "bad gateway"));
    assert!(err.is_transient());
}

#[tokio::test]
async fn empty_choices_is_parse_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "model": "gpt-4o-mini",
            "choices": []
        })))
        .mount(&server)
        .await;

    let err = provider_for(&server)
        .complete(vec![ChatMessage::user("hi")], &CompletionConfig::default())
        .await
        .unwrap_err();

    assert!(matches!(err, ProviderError::ParseError(_)));
}

#[tokio::test]
async fn unreachable_server_is_http_error() {
    let provider = OpenAiProvider::new("sk-test").with_base_url("http://127.0.0.1:1/v1");

    let err = provider
        .complete(vec![ChatMessage::user("hi")], &CompletionConfig::default())
        .await
        .unwrap_err();

    assert!(err.is_transient());
}

/// Extractor returning fixed text, so the end-to-end test needs no real PDF.
struct FixedExtractor(&'static str);

#[async_trait]
impl TextExtractor for FixedExtractor {
    async fn extract(&self, _bytes: &[u8]) -> Result<ExtractedText, ExtractError> {
        Ok(ExtractedText {
            text: DocumentText::new(self.0),
            page_count: Some(1),
        })
    }

    fn name(&self) -> &'static str {
        "fixed"
    }
}

#[tokio::test]
async fn end_to_end_signature_scenario() {
    let server = MockServer::start().await;
    let reply = r#"{"rule":"Contains a signature","status":"pass","evidence":"Signed by J. Doe","reasoning":"Signature block found","confidence":90}"#;

    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body(&format!(
            "```json\n{}\n```",
            reply
        ))))
        .expect(1)
        .mount(&server)
        .await;

    let orchestrator = OrchestratorBuilder::new()
        .provider(Arc::new(provider_for(&server)))
        .extractor(Arc::new(FixedExtractor("Agreement ... Signed by J. Doe")))
        .config(RuntimeConfig::default())
        .build()
        .unwrap();

    let report = orchestrator
        .check_document(b"%PDF-1.7\n", ["Contains a signature", "   "])
        .await
        .unwrap();

    assert_eq!(report.results.len(), 1);
    assert_eq!(
        serde_json::to_value(&report.results[0]).unwrap(),
        serde_json::from_str::<serde_json::Value>(reply).unwrap()
    );
    assert_eq!(report.results[0].status, Status::Pass);
    assert_eq!(orchestrator.usage().total_tokens, 876);
}
