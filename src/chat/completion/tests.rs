use super::*;
use crate::config::Config;

fn test_config() -> Config {
    let mut config = Config::default();
    config.completion.base_url = "http://llm.test:9000".to_string();
    config.completion.model = "test-chat-model".to_string();
    config.completion.api_key_env = String::new();
    config
}

#[test]
fn client_configuration() {
    let client = CompletionClient::new(&test_config()).expect("Failed to create client");

    assert_eq!(client.model, "test-chat-model");
    assert_eq!(client.base_url.host_str(), Some("llm.test"));
    assert_eq!(client.base_url.port(), Some(9000));
    assert!(client.api_key.is_none());
}

#[test]
fn missing_api_key_is_rejected() {
    let mut config = test_config();
    config.completion.api_key_env = "GUIDE_CHAT_UNSET_CHAT_KEY".to_string();

    let result = CompletionClient::new(&config);
    assert!(matches!(result, Err(GuideError::Config(_))));
}

#[test]
fn request_serialization_includes_roles_and_temperature() {
    let messages = [
        ChatMessage::user("question prompt"),
        ChatMessage::assistant("earlier answer"),
    ];
    let request = ChatCompletionRequest {
        model: "test-chat-model",
        messages: messages
            .iter()
            .map(|message| WireMessage {
                role: message.role,
                content: &message.content,
            })
            .collect(),
        temperature: COMPLETION_TEMPERATURE,
    };

    let json = serde_json::to_value(&request).expect("serialize request");
    assert_eq!(json["model"], "test-chat-model");
    assert_eq!(json["messages"][0]["role"], "user");
    assert_eq!(json["messages"][0]["content"], "question prompt");
    assert_eq!(json["messages"][1]["role"], "assistant");
    let temperature = json["temperature"].as_f64().expect("temperature");
    assert!((temperature - 0.7).abs() < 1e-6);
}

#[test]
fn response_parsing_takes_first_choice() {
    let raw = r#"{
        "id": "chatcmpl-1",
        "object": "chat.completion",
        "choices": [
            {"index": 0, "message": {"role": "assistant", "content": "  the answer  "}, "finish_reason": "stop"},
            {"index": 1, "message": {"role": "assistant", "content": "another answer"}, "finish_reason": "stop"}
        ]
    }"#;

    let response: ChatCompletionResponse = serde_json::from_str(raw).expect("parse response");

    assert_eq!(response.choices.len(), 2);
    assert_eq!(response.choices[0].message.content, "  the answer  ");
}

#[test]
fn empty_choices_are_detected() {
    let raw = r#"{"choices": []}"#;

    let response: ChatCompletionResponse = serde_json::from_str(raw).expect("parse response");
    assert!(response.choices.is_empty());
}
