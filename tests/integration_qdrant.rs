#![expect(
    clippy::tests_outside_test_module,
    reason = "integration tests are only compiled in test mode"
)]

// Qdrant REST flow tests against a mock server
// Run with: cargo test --test integration_qdrant
//
// The store blocks on HTTP while the mock server runs on the same
// runtime, so every test needs the multi thread flavor.

use anyhow::Result;
use guide_chat::config::{Config, IndexBackend};
use guide_chat::store::{Document, QdrantStore, VectorStore};
use serde_json::{Value, json};
use serial_test::serial;
use std::env;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const COLLECTION: &str = "test_guides";

fn init_test_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter("debug")
        .with_test_writer()
        .try_init()
        .ok(); // Ignore error if already initialized
}

fn set_env(name: &str, value: &str) {
    // SAFETY: tests that touch the environment run serialized
    unsafe { env::set_var(name, value) };
}

fn remove_env(name: &str) {
    // SAFETY: tests that touch the environment run serialized
    unsafe { env::remove_var(name) };
}

/// Test helper pointing the store at the mock server without an API key
fn test_config(server_uri: &str) -> Config {
    let mut config = Config::default();
    config.index.backend = IndexBackend::Qdrant;
    config.index.url = server_uri.to_string();
    config.index.collection = COLLECTION.to_string();
    config
}

fn doc(id: &str, text: &str) -> Document {
    Document {
        id: id.to_string(),
        text: text.to_string(),
    }
}

fn count_response(count: usize) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "result": { "count": count } }))
}

fn ok_response() -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "result": true, "status": "ok" }))
}

async fn mount_count(server: &MockServer, count: usize) {
    Mock::given(method("POST"))
        .and(path(format!("/collections/{COLLECTION}/points/count")))
        .respond_with(count_response(count))
        .mount(server)
        .await;
}

async fn mount_upsert(server: &MockServer) {
    Mock::given(method("PUT"))
        .and(path(format!("/collections/{COLLECTION}/points")))
        .and(query_param("wait", "true"))
        .respond_with(ok_response())
        .expect(1)
        .mount(server)
        .await;
}

/// Pull the recorded upsert body back out of the mock server
async fn upsert_points(server: &MockServer) -> Vec<Value> {
    let requests = server.received_requests().await.expect("requests recorded");
    let upsert = requests
        .iter()
        .find(|request| request.url.path() == format!("/collections/{COLLECTION}/points"))
        .expect("upsert request sent");

    let body: Value = serde_json::from_slice(&upsert.body).expect("parse upsert body");
    body["points"].as_array().expect("points array").clone()
}

#[tokio::test(flavor = "multi_thread")]
async fn insert_creates_a_missing_collection() -> Result<()> {
    init_test_tracing();

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/collections/{COLLECTION}")))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path(format!("/collections/{COLLECTION}")))
        .and(body_partial_json(
            json!({ "vectors": { "size": 3, "distance": "Cosine" } }),
        ))
        .respond_with(ok_response())
        .expect(1)
        .mount(&server)
        .await;
    mount_count(&server, 0).await;
    mount_upsert(&server).await;

    let store = QdrantStore::new(&test_config(&server.uri()))?;
    store
        .insert(
            vec![doc("id0", "the first boss"), doc("id1", "the shop hours")],
            vec![vec![1.0, 0.0, 0.0], vec![0.0, 1.0, 0.0]],
        )
        .await?;

    let points = upsert_points(&server).await;
    assert_eq!(points.len(), 2);
    assert_eq!(points[0]["id"], 0);
    assert_eq!(points[1]["id"], 1);
    assert_eq!(points[0]["payload"]["doc_id"], "id0");
    assert_eq!(points[0]["payload"]["text"], "the first boss");

    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn insert_offsets_ids_past_existing_points() -> Result<()> {
    init_test_tracing();

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/collections/{COLLECTION}")))
        .respond_with(ok_response())
        .mount(&server)
        .await;
    // An existing collection must not be created again
    Mock::given(method("PUT"))
        .and(path(format!("/collections/{COLLECTION}")))
        .respond_with(ok_response())
        .expect(0)
        .mount(&server)
        .await;
    mount_count(&server, 5).await;
    mount_upsert(&server).await;

    let store = QdrantStore::new(&test_config(&server.uri()))?;
    store
        .insert(
            vec![doc("id5", "the shrine route"), doc("id6", "the hidden cave")],
            vec![vec![0.0, 0.0, 1.0], vec![0.5, 0.5, 0.0]],
        )
        .await?;

    let points = upsert_points(&server).await;
    assert_eq!(points.len(), 2);
    assert_eq!(points[0]["id"], 5);
    assert_eq!(points[1]["id"], 6);

    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn inserting_nothing_makes_no_requests() -> Result<()> {
    init_test_tracing();

    let server = MockServer::start().await;
    let store = QdrantStore::new(&test_config(&server.uri()))?;

    store.insert(vec![], vec![]).await?;

    let requests = server.received_requests().await.expect("requests recorded");
    assert!(requests.is_empty());

    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn search_parses_hits_and_drops_empty_payloads() -> Result<()> {
    init_test_tracing();

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/collections/{COLLECTION}/points/search")))
        .and(body_partial_json(json!({
            "vector": [0.25, 0.5, 0.25],
            "limit": 4,
            "with_payload": true,
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": [
                {
                    "id": 0,
                    "version": 3,
                    "score": 0.75,
                    "payload": { "doc_id": "id0", "text": "the first boss" }
                },
                { "id": 7, "version": 3, "score": 0.5, "payload": null },
                {
                    "id": 1,
                    "version": 3,
                    "score": 0.25,
                    "payload": { "doc_id": "id1", "text": "the shop hours" }
                }
            ]
        })))
        .mount(&server)
        .await;

    let store = QdrantStore::new(&test_config(&server.uri()))?;
    let hits = store.search_similar(&[0.25, 0.5, 0.25], 4).await?;

    assert_eq!(hits.len(), 2);
    assert_eq!(hits[0].id, "id0");
    assert_eq!(hits[0].text, "the first boss");
    assert!((hits[0].score - 0.75).abs() < 1e-6);
    assert_eq!(hits[1].id, "id1");
    assert!((hits[1].score - 0.25).abs() < 1e-6);

    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn count_reads_the_exact_total() -> Result<()> {
    init_test_tracing();

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/collections/{COLLECTION}/points/count")))
        .and(body_partial_json(json!({ "exact": true })))
        .respond_with(count_response(12))
        .mount(&server)
        .await;

    let store = QdrantStore::new(&test_config(&server.uri()))?;
    assert_eq!(store.count().await?, 12);

    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn count_treats_a_missing_collection_as_empty() -> Result<()> {
    init_test_tracing();

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/collections/{COLLECTION}/points/count")))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let store = QdrantStore::new(&test_config(&server.uri()))?;
    assert_eq!(store.count().await?, 0);

    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn clear_deletes_the_collection() -> Result<()> {
    init_test_tracing();

    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path(format!("/collections/{COLLECTION}")))
        .respond_with(ok_response())
        .expect(1)
        .mount(&server)
        .await;

    let store = QdrantStore::new(&test_config(&server.uri()))?;
    store.clear().await?;

    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
async fn clear_tolerates_a_missing_collection() -> Result<()> {
    init_test_tracing();

    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path(format!("/collections/{COLLECTION}")))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let store = QdrantStore::new(&test_config(&server.uri()))?;
    store.clear().await?;

    Ok(())
}

#[tokio::test(flavor = "multi_thread")]
#[serial]
async fn requests_carry_the_configured_api_key() -> Result<()> {
    init_test_tracing();

    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(format!("/collections/{COLLECTION}/points/count")))
        .and(header("api-key", "qdrant-secret"))
        .respond_with(count_response(3))
        .expect(1)
        .mount(&server)
        .await;

    let mut config = test_config(&server.uri());
    config.index.api_key_env = "QDRANT_TEST_KEY".to_string();

    set_env("QDRANT_TEST_KEY", "qdrant-secret");
    let store = QdrantStore::new(&config);
    remove_env("QDRANT_TEST_KEY");

    assert_eq!(store?.count().await?, 3);

    Ok(())
}
