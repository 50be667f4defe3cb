use super::*;
use crate::config::Config;

fn test_config(base_url: &str) -> Config {
    let mut config = Config::default();
    config.embedding.base_url = base_url.to_string();
    config.embedding.model = "test-embedding-model".to_string();
    config.embedding.batch_size = 16;
    config.embedding.api_key_env = String::new();
    config
}

#[test]
fn client_configuration() {
    let config = test_config("http://embeddings.test:8080");
    let client = EmbeddingClient::new(&config).expect("Failed to create client");

    assert_eq!(client.model, "test-embedding-model");
    assert_eq!(client.batch_size, 16);
    assert_eq!(client.base_url.host_str(), Some("embeddings.test"));
    assert_eq!(client.base_url.port(), Some(8080));
    assert!(client.api_key.is_none());
}

#[test]
fn client_builder_methods() {
    let config = test_config("http://embeddings.test");
    let client = EmbeddingClient::new(&config)
        .expect("Failed to create client")
        .with_timeout(Duration::from_secs(60));

    // Note: timeout is part of the agent configuration
    assert_eq!(client.batch_size(), 16);
}

#[test]
fn invalid_endpoint_is_rejected() {
    let config = test_config("ftp://embeddings.test");

    let result = EmbeddingClient::new(&config);
    assert!(matches!(result, Err(GuideError::Config(_))));
}

#[test]
fn missing_api_key_is_rejected() {
    let mut config = test_config("http://embeddings.test");
    config.embedding.api_key_env = "GUIDE_CHAT_UNSET_EMBED_KEY".to_string();

    let result = EmbeddingClient::new(&config);
    assert!(matches!(result, Err(GuideError::Config(_))));
}

#[test]
fn embedding_request_serialization() {
    let input = vec!["first passage".to_string(), "second passage".to_string()];
    let request = EmbeddingRequest {
        model: "test-embedding-model",
        input: &input,
    };

    let json = serde_json::to_value(&request).expect("should serialize request");
    assert_eq!(json["model"], "test-embedding-model");
    assert_eq!(json["input"][1], "second passage");
}

#[test]
fn embedding_response_order_follows_index() {
    let raw = r#"{
        "data": [
            {"index": 1, "embedding": [0.2, 0.2]},
            {"index": 0, "embedding": [0.1, 0.1]}
        ]
    }"#;

    let response: EmbeddingResponse = serde_json::from_str(raw).expect("should parse response");
    let mut data = response.data;
    data.sort_by_key(|entry| entry.index);

    assert_eq!(data[0].embedding, vec![0.1, 0.1]);
    assert_eq!(data[1].embedding, vec![0.2, 0.2]);
}
