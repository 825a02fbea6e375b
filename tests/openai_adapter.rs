//! OpenAI-compatible adapter against a mock HTTP server.

use creator_graph::llm::openai::OpenAICompatibleAdapter;
use creator_graph::llm::LLMAdapter;
use creator_graph::types::{AppError, LLMMessage, LLMRequest};
use mockito::Matcher;

fn request() -> LLMRequest {
    LLMRequest {
        provider: "openai".to_string(),
        model: "gpt-4o-mini".to_string(),
        messages: vec![LLMMessage::user("Analyze these videos")],
        max_tokens: Some(512),
        temperature: Some(0.7),
        system_instruction: Some("You are an analyst".to_string()),
    }
}

#[tokio::test]
async fn returns_first_choice_content() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/chat/completions")
        .match_header("authorization", "Bearer test-key")
        .match_body(Matcher::AllOf(vec![
            Matcher::PartialJson(serde_json::json!({
                "model": "gpt-4o-mini",
                "max_tokens": 512,
                "response_format": { "type": "json_object" }
            })),
            Matcher::Regex(r#""role":"system","content":"You are an analyst""#.to_string()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{
                "id": "chatcmpl-1",
                "choices": [
                    { "index": 0, "message": { "role": "assistant", "content": "{\"genre\":\"Fitness\"}" }, "finish_reason": "stop" }
                ],
                "usage": { "prompt_tokens": 12, "completion_tokens": 5, "total_tokens": 17 }
            }"#,
        )
        .create_async()
        .await;

    let adapter = OpenAICompatibleAdapter::new("test-key", server.url());
    let response = adapter.create_chat_completion(&request()).await.unwrap();

    mock.assert_async().await;
    assert_eq!(response.content, r#"{"genre":"Fitness"}"#);
    assert_eq!(response.finish_reason, "stop");
    assert_eq!(response.usage.total_tokens, 17);
}

#[tokio::test]
async fn api_error_becomes_completion_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/chat/completions")
        .with_status(429)
        .with_header("content-type", "application/json")
        .with_body(r#"{"error": {"message": "Rate limit reached", "code": "rate_limit_exceeded"}}"#)
        .create_async()
        .await;

    let adapter = OpenAICompatibleAdapter::new("test-key", server.url());
    let err = adapter.create_chat_completion(&request()).await.unwrap_err();

    match err {
        AppError::Completion(message) => {
            assert!(message.contains("429"));
            assert!(message.contains("Rate limit reached"));
        }
        other => panic!("expected completion error, got {other:?}"),
    }
}

#[tokio::test]
async fn empty_choices_is_completion_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"choices": []}"#)
        .create_async()
        .await;

    let adapter = OpenAICompatibleAdapter::new("test-key", server.url());
    let err = adapter.create_chat_completion(&request()).await.unwrap_err();

    assert!(matches!(err, AppError::Completion(ref m) if m.contains("no choices")));
}
