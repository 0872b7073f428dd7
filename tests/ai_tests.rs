// AI endpoint tests: offline fallbacks and a mocked Gemini backend

mod common;

use axum::http::StatusCode;
use common::{
    assert_error, build_app, config_with_backend, gemini_text_response, spawn_silent_server,
    test_config, GENERATE_PATH,
};
use diary_edge::ai::fallbacks;
use diary_edge::models::PromptType;
use mockito::Matcher;
use serde_json::json;
use std::time::{Duration, Instant};

#[tokio::test]
async fn test_ai_endpoints_without_key_are_internal_errors() {
    let app = build_app(test_config());

    for (path, body) in [
        ("/api/ai-emotion", json!({ "message": "today was fine" })),
        ("/api/ai-chat", json!({ "message": "today was fine", "emotion": "normal" })),
        ("/api/ai-message", json!({ "message": "today was fine" })),
    ] {
        let response = app.post(path, body).await;
        assert_error(&response, StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR");
    }
}

#[tokio::test]
async fn test_missing_message_is_validation_error() {
    let app = build_app(test_config());

    for path in ["/api/ai-emotion", "/api/ai-chat", "/api/ai-message"] {
        let response = app.post(path, json!({ "message": "   " })).await;
        assert_error(&response, StatusCode::BAD_REQUEST, "INVALID_URL");
        assert_eq!(response.body["error"], "Message is required");
    }
}

#[tokio::test]
async fn test_offline_prompt_is_deterministic() {
    let app = build_app(test_config());

    for prompt_type in PromptType::ALL {
        let body = json!({ "type": prompt_type.as_str() });
        let first = app.post("/api/ai-prompt", body.clone()).await;
        let second = app.post("/api/ai-prompt", body).await;

        assert_eq!(first.status, StatusCode::OK);
        assert_eq!(first.body, second.body);
        assert_eq!(first.body["type"], prompt_type.as_str());
        assert_eq!(first.body["prompt"], fallbacks::offline_prompt(prompt_type).prompt);
    }
}

#[tokio::test]
async fn test_invalid_prompt_type() {
    let app = build_app(test_config());

    for body in [
        json!({ "type": "invalid-type" }),
        json!({ "type": "midnight" }),
        json!({}),
        json!({ "type": "Morning" }),
    ] {
        let response = app.post("/api/ai-prompt", body).await;
        assert_error(&response, StatusCode::BAD_REQUEST, "INVALID_URL");
        assert_eq!(response.body["error"], "Invalid prompt type");
    }
}

#[tokio::test]
async fn test_emotion_classified_by_backend() {
    let mut backend = mockito::Server::new_async().await;
    let call = backend
        .mock("POST", GENERATE_PATH)
        .match_header("x-goog-api-key", "test-key")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(gemini_text_response(r#"{"emotion":"happy","confidence":0.92}"#))
        .expect(1)
        .create_async()
        .await;

    let app = build_app(config_with_backend(&backend.url()));
    let response = app
        .post("/api/ai-emotion", json!({ "message": "I passed my exam!" }))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["emotion"], "happy");
    assert_eq!(response.body["confidence"], 0.92);
    call.assert_async().await;
}

#[tokio::test]
async fn test_malformed_classification_falls_back() {
    let mut backend = mockito::Server::new_async().await;
    let _call = backend
        .mock("POST", GENERATE_PATH)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(gemini_text_response("I think the writer feels great"))
        .create_async()
        .await;

    let app = build_app(config_with_backend(&backend.url()));
    let response = app.post("/api/ai-emotion", json!({ "message": "hello" })).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["emotion"], "normal");
    assert_eq!(response.body["confidence"], fallbacks::FALLBACK_CONFIDENCE);
}

#[tokio::test]
async fn test_backend_error_falls_back_for_chat() {
    let mut backend = mockito::Server::new_async().await;
    let _call = backend
        .mock("POST", GENERATE_PATH)
        .with_status(500)
        .with_header("content-type", "application/json")
        .with_body(r#"{"error":{"code":500,"message":"Internal error","status":"INTERNAL"}}"#)
        .create_async()
        .await;

    let app = build_app(config_with_backend(&backend.url()));
    let response = app
        .post("/api/ai-chat", json!({ "message": "long day", "emotion": "sad" }))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["message"], fallbacks::FALLBACK_REPLY);
    assert_eq!(response.body["followupQuestions"], json!([]));
}

#[tokio::test]
async fn test_chat_reply_from_backend() {
    let mut backend = mockito::Server::new_async().await;
    let _call = backend
        .mock("POST", GENERATE_PATH)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(gemini_text_response("That sounds exhausting. What helped you get through it?"))
        .create_async()
        .await;

    let app = build_app(config_with_backend(&backend.url()));
    let response = app
        .post("/api/ai-chat", json!({ "message": "long day at work" }))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(
        response.body["message"],
        "That sounds exhausting. What helped you get through it?"
    );
}

#[tokio::test]
async fn test_message_is_classified_then_answered() {
    let mut backend = mockito::Server::new_async().await;
    let classify = backend
        .mock("POST", GENERATE_PATH)
        .match_body(Matcher::Regex("responseSchema".to_string()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(gemini_text_response(r#"{"emotion":"angry","confidence":0.7}"#))
        .expect(1)
        .create_async()
        .await;
    // The reply is conditioned on the classified emotion.
    let reply = backend
        .mock("POST", GENERATE_PATH)
        .match_body(Matcher::Regex("seems angry".to_string()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(gemini_text_response("It makes sense to feel frustrated."))
        .expect(1)
        .create_async()
        .await;

    let app = build_app(config_with_backend(&backend.url()));
    let response = app
        .post("/api/ai-message", json!({ "message": "My train was cancelled again" }))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["emotion"]["emotion"], "angry");
    assert_eq!(response.body["response"]["message"], "It makes sense to feel frustrated.");
    classify.assert_async().await;
    reply.assert_async().await;
}

#[tokio::test]
async fn test_prompt_from_backend() {
    let mut backend = mockito::Server::new_async().await;
    let call = backend
        .mock("POST", GENERATE_PATH)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(gemini_text_response("\"What made you smile this evening?\""))
        .expect(1)
        .create_async()
        .await;

    let app = build_app(config_with_backend(&backend.url()));
    let response = app.post("/api/ai-prompt", json!({ "type": "evening" })).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["prompt"], "What made you smile this evening?");
    assert_eq!(response.body["type"], "evening");
    call.assert_async().await;
}

#[tokio::test]
async fn test_prompt_backend_failure_uses_degraded_table() {
    let mut backend = mockito::Server::new_async().await;
    let _call = backend
        .mock("POST", GENERATE_PATH)
        .with_status(503)
        .with_body("unavailable")
        .create_async()
        .await;

    let app = build_app(config_with_backend(&backend.url()));
    let response = app
        .post("/api/ai-prompt", json!({ "type": "emotion-based", "emotion": "sad" }))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["type"], "emotion-based");
    assert_eq!(
        response.body["prompt"],
        fallbacks::degraded_prompt(PromptType::EmotionBased).prompt
    );
    assert_ne!(
        response.body["prompt"],
        fallbacks::offline_prompt(PromptType::EmotionBased).prompt
    );
}

#[tokio::test]
async fn test_unresponsive_backend_is_bounded() {
    let backend = spawn_silent_server().await;

    let mut config = config_with_backend(&backend);
    config.gemini.timeout_seconds = 1;
    let app = build_app(config);

    let started = Instant::now();
    let response = app.post("/api/ai-emotion", json!({ "message": "hello" })).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["emotion"], "normal");
    assert_eq!(response.body["confidence"], fallbacks::FALLBACK_CONFIDENCE);
    assert!(started.elapsed() < Duration::from_secs(4));
}
