//! Contract tests for HttpLogClient against a wiremock log service.
//!
//! | Method | Path | Test |
//! |--------|------|------|
//! | POST   | `/v1/leaves` | `append_*` |
//! | GET    | `/v1/leaves/{index}` | `get_by_index_*` |
//! | GET    | `/v1/leaves?leaf_hash=` | `get_by_leaf_hash_*` |
//! | GET    | `/v1/root` | `get_root_*` |
//! | GET    | `/v1/proof` | `get_inclusion_proof_*` |
//! | GET    | `/v1/size` | `get_sequenced_count_*` |

use std::time::Duration;

use attix_client::{ClientConfig, ClientError, HttpCollaborators, LogService};
use attix_core::Digest;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(server: &MockServer) -> HttpCollaborators {
    client_with_timeout(server, 5)
}

fn client_with_timeout(server: &MockServer, timeout_secs: u64) -> HttpCollaborators {
    let config = ClientConfig {
        log_url: server.uri().parse().unwrap(),
        map_url: "http://127.0.0.1:19001".parse().unwrap(),
        map_id: 1,
        timeout_secs,
    };
    HttpCollaborators::new(config).unwrap()
}

// ── POST /v1/leaves ─────────────────────────────────────────────────

#[tokio::test]
async fn append_sends_hex_value_and_returns_index() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/leaves"))
        .and(body_json(serde_json::json!({"value": "68656c6c6f"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"index": 41})))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    assert_eq!(client.log().append(b"hello").await.unwrap(), 41);
}

#[tokio::test]
async fn append_surfaces_server_error_without_retry() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/leaves"))
        .respond_with(ResponseTemplate::new(500).set_body_string("queue full"))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    match client.log().append(b"x").await.unwrap_err() {
        ClientError::Api { status, body, .. } => {
            assert_eq!(status, 500);
            assert!(body.contains("queue full"));
        }
        other => panic!("expected Api error, got: {other:?}"),
    }
}

#[tokio::test]
async fn append_is_sent_once_when_response_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/leaves"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"index": 0}))
                .set_delay(Duration::from_secs(2)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_with_timeout(&server, 1);
    let err = client.log().append(b"once").await.unwrap_err();
    assert!(matches!(err, ClientError::Timeout { .. }), "got {err:?}");
    assert!(err.is_transport());
}

#[tokio::test]
async fn append_to_unreachable_log_is_reported_as_transport() {
    let config = ClientConfig {
        log_url: "http://127.0.0.1:1".parse().unwrap(),
        map_url: "http://127.0.0.1:19001".parse().unwrap(),
        map_id: 1,
        timeout_secs: 1,
    };
    let client = HttpCollaborators::new(config).unwrap();
    let err = client.log().append(b"x").await.unwrap_err();
    assert!(matches!(err, ClientError::Http { .. }), "got {err:?}");
}

// ── GET /v1/leaves/{index} ──────────────────────────────────────────

#[tokio::test]
async fn get_by_index_decodes_entry() {
    let server = MockServer::start().await;
    let leaf_hash = attix_crypto::leaf_hash(b"payload");
    Mock::given(method("GET"))
        .and(path("/v1/leaves/3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "index": 3,
            "value": hex::encode(b"payload"),
            "leaf_hash": leaf_hash.to_hex(),
        })))
        .mount(&server)
        .await;

    let entry = test_client(&server).log().get_by_index(3).await.unwrap();
    assert_eq!(entry.index, 3);
    assert_eq!(entry.value, b"payload");
    assert_eq!(entry.leaf_hash, leaf_hash);
}

#[tokio::test]
async fn get_by_index_maps_404_to_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/leaves/99"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = test_client(&server).log().get_by_index(99).await.unwrap_err();
    assert!(matches!(err, ClientError::NotFound { .. }));
}

#[tokio::test]
async fn get_by_index_rejects_malformed_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/leaves/0"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"index\": \"zero\"}"))
        .mount(&server)
        .await;

    let err = test_client(&server).log().get_by_index(0).await.unwrap_err();
    assert!(matches!(err, ClientError::Deserialization { .. }));
}

// ── GET /v1/leaves?leaf_hash= ───────────────────────────────────────

#[tokio::test]
async fn get_by_leaf_hash_passes_hex_query() {
    let server = MockServer::start().await;
    let leaf_hash = attix_crypto::leaf_hash(b"dup");
    Mock::given(method("GET"))
        .and(path("/v1/leaves"))
        .and(query_param("leaf_hash", leaf_hash.to_hex().as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "entries": [
                {"index": 1, "value": hex::encode(b"dup"), "leaf_hash": leaf_hash.to_hex()},
                {"index": 5, "value": hex::encode(b"dup"), "leaf_hash": leaf_hash.to_hex()}
            ]
        })))
        .mount(&server)
        .await;

    let entries = test_client(&server)
        .log()
        .get_by_leaf_hash(&leaf_hash)
        .await
        .unwrap();
    assert_eq!(entries.iter().map(|e| e.index).collect::<Vec<_>>(), vec![1, 5]);
}

// ── GET /v1/root, /v1/proof, /v1/size ───────────────────────────────

#[tokio::test]
async fn get_root_decodes_root() {
    let server = MockServer::start().await;
    let root_hash = Digest::sha256(b"root");
    Mock::given(method("GET"))
        .and(path("/v1/root"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "tree_size": 12,
            "root_hash": root_hash.to_hex(),
        })))
        .mount(&server)
        .await;

    let root = test_client(&server).log().get_root().await.unwrap();
    assert_eq!(root.tree_size, 12);
    assert_eq!(root.root_hash, root_hash);
}

#[tokio::test]
async fn get_inclusion_proof_sends_size_and_hash() {
    let server = MockServer::start().await;
    let leaf_hash = attix_crypto::leaf_hash(b"p");
    let sibling = Digest::sha256(b"sibling");
    Mock::given(method("GET"))
        .and(path("/v1/proof"))
        .and(query_param("leaf_hash", leaf_hash.to_hex().as_str()))
        .and(query_param("tree_size", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "leaf_index": 0,
            "tree_size": 2,
            "audit_path": [sibling.to_hex()],
        })))
        .mount(&server)
        .await;

    let proof = test_client(&server)
        .log()
        .get_inclusion_proof(&leaf_hash, 2)
        .await
        .unwrap();
    assert_eq!(proof.leaf_index, 0);
    assert_eq!(proof.audit_path, vec![sibling]);
}

#[tokio::test]
async fn get_sequenced_count_reads_count() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/size"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"count": 7})))
        .mount(&server)
        .await;

    assert_eq!(test_client(&server).log().get_sequenced_count().await.unwrap(), 7);
}

#[tokio::test]
async fn slow_read_is_resent_then_surfaces_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/size"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({"count": 7}))
                .set_delay(Duration::from_secs(3)),
        )
        .expect(4)
        .mount(&server)
        .await;

    let client = client_with_timeout(&server, 1);
    let err = client.log().get_sequenced_count().await.unwrap_err();
    assert!(matches!(err, ClientError::Timeout { .. }), "got {err:?}");
    assert!(err.is_transport());
}
