//! OpenAI client against a mock server

use pounce::domain::errors::PipelineError;
use pounce::domain::models::{ChatMessage, ChatRequest};
use pounce::domain::ports::{ChatModel, EmbeddingProvider};
use pounce::infrastructure::http::RetryPolicy;
use pounce::infrastructure::openai::{
    OpenAiChatModel, OpenAiClient, OpenAiClientConfig, OpenAiEmbedder, OpenAiError,
};
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer, max_retries: u32) -> Arc<OpenAiClient> {
    Arc::new(
        OpenAiClient::new(OpenAiClientConfig {
            api_key: "sk-test-key".to_string(),
            base_url: server.uri(),
            rate_limit_rps: 100.0,
            burst_size: 100,
            retry_policy: RetryPolicy::new(max_retries, 1, 5),
            timeout_secs: 5,
        })
        .unwrap(),
    )
}

fn embedding_body(values: &[f32]) -> serde_json::Value {
    json!({
        "object": "list",
        "data": [{ "object": "embedding", "index": 0, "embedding": values }],
        "model": "text-embedding-ada-002",
        "usage": { "prompt_tokens": 5, "total_tokens": 5 }
    })
}

fn completion_body(content: &str) -> serde_json::Value {
    json!({
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "model": "gpt-4o-mini",
        "choices": [{
            "index": 0,
            "message": { "role": "assistant", "content": content },
            "finish_reason": "stop"
        }],
        "usage": { "prompt_tokens": 40, "completion_tokens": 8, "total_tokens": 48 }
    })
}

fn question() -> ChatRequest {
    ChatRequest {
        messages: vec![
            ChatMessage::system("You are Pounce."),
            ChatMessage::user("When must the FAFSA be submitted?"),
        ],
        temperature: 0.0,
        max_tokens: 64,
    }
}

#[tokio::test]
async fn test_embedding_sends_bearer_key_and_model() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .and(header("authorization", "Bearer sk-test-key"))
        .and(body_partial_json(json!({
            "model": "text-embedding-ada-002",
            "input": "When is the FAFSA due?"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(embedding_body(&[0.1, 0.2, 0.3])))
        .expect(1)
        .mount(&server)
        .await;

    let embedder = OpenAiEmbedder::new(client(&server, 0), "text-embedding-ada-002", 3);
    let values = embedder.embed("When is the FAFSA due?").await.unwrap();

    assert_eq!(values, vec![0.1, 0.2, 0.3]);
}

#[tokio::test]
async fn test_embedding_requests_configured_dimensions() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .and(body_partial_json(json!({
            "model": "text-embedding-3-small",
            "input": "When is the FAFSA due?",
            "dimensions": 4
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(embedding_body(&[0.5, 0.5, 0.5, 0.5])))
        .expect(1)
        .mount(&server)
        .await;

    let embedder = OpenAiEmbedder::new(client(&server, 0), "text-embedding-3-small", 4);
    let values = embedder.embed("When is the FAFSA due?").await.unwrap();

    assert_eq!(values.len(), 4);
}

#[tokio::test]
async fn test_embedding_dimension_mismatch_is_provider_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(embedding_body(&[0.1, 0.2])))
        .mount(&server)
        .await;

    let embedder = OpenAiEmbedder::new(client(&server, 0), "text-embedding-ada-002", 1536);
    let err = embedder.embed("hello").await.unwrap_err();

    assert!(matches!(err, PipelineError::Provider(ref m) if m.contains("1536")));
}

#[tokio::test]
async fn test_chat_completion_at_temperature_zero() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_partial_json(json!({
            "model": "gpt-4o-mini",
            "temperature": 0.0,
            "max_tokens": 64
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("By March 1.")))
        .expect(1)
        .mount(&server)
        .await;

    let model = OpenAiChatModel::new(client(&server, 0), "gpt-4o-mini");
    let reply = model.complete(question()).await.unwrap();

    assert_eq!(reply, "By March 1.");
}

#[tokio::test]
async fn test_rate_limit_is_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "error": { "message": "Rate limit reached", "type": "requests", "code": "rate_limit_exceeded" }
        })))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("By March 1.")))
        .expect(1)
        .mount(&server)
        .await;

    let model = OpenAiChatModel::new(client(&server, 2), "gpt-4o-mini");
    assert_eq!(model.complete(question()).await.unwrap(), "By March 1.");
}

#[tokio::test]
async fn test_server_errors_exhaust_retries() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream unavailable"))
        .expect(3)
        .mount(&server)
        .await;

    let embedder = OpenAiEmbedder::new(client(&server, 2), "text-embedding-ada-002", 3);
    let err = embedder.embed("hello").await.unwrap_err();

    assert!(matches!(err, PipelineError::Provider(_)));
}

#[tokio::test]
async fn test_bad_request_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": { "message": "max_tokens is too large", "type": "invalid_request_error", "code": null }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let err = client(&server, 3)
        .create_chat_completion(&pounce::infrastructure::openai::ChatCompletionRequest {
            model: "gpt-4o-mini".to_string(),
            messages: question().messages,
            temperature: 0.0,
            max_tokens: Some(1_000_000),
        })
        .await
        .unwrap_err();

    assert!(matches!(err, OpenAiError::InvalidRequest(ref m) if m == "max_tokens is too large"));
}

#[tokio::test]
async fn test_insufficient_quota_is_permanent() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "error": {
                "message": "You exceeded your current quota",
                "type": "insufficient_quota",
                "code": "insufficient_quota"
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let err = client(&server, 3)
        .create_embedding(&pounce::infrastructure::openai::EmbeddingRequest {
            model: "text-embedding-ada-002".to_string(),
            input: "hello".to_string(),
            dimensions: None,
        })
        .await
        .unwrap_err();

    assert!(matches!(err, OpenAiError::QuotaExceeded));
}

#[tokio::test]
async fn test_unauthorized_error_does_not_echo_key() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "error": { "message": "Incorrect API key provided: sk-test-key", "type": "invalid_request_error" }
        })))
        .mount(&server)
        .await;

    let model = OpenAiChatModel::new(client(&server, 0), "gpt-4o-mini");
    let err = model.complete(question()).await.unwrap_err();

    assert!(!err.to_string().contains("sk-test-key"));
}
