#![allow(clippy::unwrap_used)]
// Integration tests for `RpcClient` and `Session` using wiremock.

use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;
use secrecy::{ExposeSecret, SecretString};
use serde_json::json;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use hmlink_api::{DEFAULT_INTERFACE, Error, Params, RpcClient, Session};

const RPC_PATH: &str = "/api/homematic.cgi";

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, RpcClient) {
    let server = MockServer::start().await;
    let client =
        RpcClient::with_client(reqwest::Client::new(), &server.uri(), DEFAULT_INTERFACE).unwrap();
    (server, client)
}

fn ok(result: serde_json::Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({ "version": "1.1", "result": result, "error": null }))
}

fn rpc_error(message: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "version": "1.1",
        "result": null,
        "error": { "name": "JSONRPCError", "code": 501, "message": message }
    }))
}

async fn mount_login(server: &MockServer, token: &str) {
    Mock::given(method("POST"))
        .and(path(RPC_PATH))
        .and(body_partial_json(json!({ "method": "Session.login" })))
        .respond_with(ok(json!(token)))
        .mount(server)
        .await;
}

fn password() -> SecretString {
    SecretString::from("secret".to_string())
}

async fn bodies_for(server: &MockServer, rpc_method: &str) -> Vec<serde_json::Value> {
    server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .map(|r| serde_json::from_slice::<serde_json::Value>(&r.body).unwrap())
        .filter(|b| b["method"] == rpc_method)
        .collect()
}

// ── Envelope handling ───────────────────────────────────────────────

#[tokio::test]
async fn test_call_sends_envelope_and_decodes_result() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path(RPC_PATH))
        .and(body_partial_json(json!({
            "jsonrpc": "1.1",
            "method": "Room.getAll",
            "params": {}
        })))
        .respond_with(ok(json!([
            { "id": "1230", "name": "Kitchen", "channelIds": ["1235", "1240"] }
        ])))
        .mount(&server)
        .await;

    let rooms = client.list_rooms().await.unwrap();

    assert_eq!(rooms.len(), 1);
    assert_eq!(rooms[0].name, "Kitchen");
    assert_eq!(rooms[0].channel_ids, vec!["1235", "1240"]);
}

#[tokio::test]
async fn test_error_indicator_wins_over_result() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path(RPC_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "result": [{ "id": "1", "name": "Looks valid", "channelIds": [] }],
            "error": { "code": 400, "message": "interface not available" }
        })))
        .mount(&server)
        .await;

    let result = client.list_rooms().await;

    match result {
        Err(Error::Rpc { ref method, ref message }) => {
            assert_eq!(method, "Room.getAll");
            assert!(message.contains("interface not available"), "got: {message}");
        }
        other => panic!("expected Rpc error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_malformed_envelope_is_deserialization_error() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path(RPC_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    let result = client.list_rooms().await;

    assert!(
        matches!(result, Err(Error::Deserialization { ref body, .. }) if body.contains("not json")),
        "expected Deserialization error, got: {result:?}"
    );
}

#[tokio::test]
async fn test_unexpected_result_shape_is_deserialization_error() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path(RPC_PATH))
        .respond_with(ok(json!({ "not": "a list" })))
        .mount(&server)
        .await;

    let result = client.list_devices().await;

    assert!(
        matches!(result, Err(Error::Deserialization { .. })),
        "expected Deserialization error, got: {result:?}"
    );
}

#[tokio::test]
async fn test_http_error_status_is_transport_error() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path(RPC_PATH))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let result = client.list_rooms().await;

    assert!(
        matches!(result, Err(Error::Transport(_))),
        "expected Transport error, got: {result:?}"
    );
}

#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    let server = MockServer::start().await;
    let uri = server.uri();
    drop(server);

    let client = RpcClient::with_client(reqwest::Client::new(), &uri, DEFAULT_INTERFACE).unwrap();
    let err = client.list_rooms().await.unwrap_err();

    assert!(
        matches!(err, Error::Transport(ref e) if e.is_connect()),
        "got: {err:?}"
    );
}

// ── Session handling ────────────────────────────────────────────────

#[tokio::test]
async fn test_login_stores_token_and_injects_it() {
    let (server, client) = setup().await;
    mount_login(&server, "tok-1").await;

    Mock::given(method("POST"))
        .and(path(RPC_PATH))
        .and(body_partial_json(json!({
            "method": "Room.getAll",
            "params": { "_session_id_": "tok-1" }
        })))
        .respond_with(ok(json!([])))
        .expect(1)
        .mount(&server)
        .await;

    assert!(!client.has_session());
    client.login("Admin", &password()).await.unwrap();
    assert_eq!(
        client.session_token().unwrap().expose_secret(),
        "tok-1"
    );

    client.list_rooms().await.unwrap();

    let login = bodies_for(&server, "Session.login").await;
    assert_eq!(login[0]["params"]["username"], "Admin");
    assert_eq!(login[0]["params"]["password"], "secret");
    assert!(login[0]["params"].get("_session_id_").is_none());
}

#[tokio::test]
async fn test_login_rejected_is_authentication_error() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path(RPC_PATH))
        .respond_with(rpc_error("invalid credentials"))
        .mount(&server)
        .await;

    let result = client.login("Admin", &password()).await;

    assert!(
        matches!(result, Err(Error::Authentication { ref message }) if message.contains("invalid credentials")),
        "expected Authentication error, got: {result:?}"
    );
    assert!(!client.has_session());
}

#[tokio::test]
async fn test_login_without_token_is_authentication_error() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path(RPC_PATH))
        .respond_with(ok(json!(null)))
        .mount(&server)
        .await;

    let result = client.login("Admin", &password()).await;

    assert!(matches!(result, Err(Error::Authentication { .. })), "got: {result:?}");
}

#[tokio::test]
async fn test_logout_carries_token_then_clears_it() {
    let (server, client) = setup().await;
    mount_login(&server, "tok-2").await;

    Mock::given(method("POST"))
        .and(path(RPC_PATH))
        .and(body_partial_json(json!({
            "method": "Session.logout",
            "params": { "_session_id_": "tok-2" }
        })))
        .respond_with(ok(json!(true)))
        .expect(1)
        .mount(&server)
        .await;

    client.login("Admin", &password()).await.unwrap();
    client.logout().await.unwrap();

    assert!(!client.has_session());
}

#[tokio::test]
async fn test_session_renews_with_token_until_closed() {
    let (server, client) = setup().await;
    mount_login(&server, "tok-3").await;

    Mock::given(method("POST"))
        .and(path(RPC_PATH))
        .and(body_partial_json(json!({
            "method": "Session.renew",
            "params": { "_session_id_": "tok-3" }
        })))
        .respond_with(ok(json!(true)))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path(RPC_PATH))
        .and(body_partial_json(json!({ "method": "Session.logout" })))
        .respond_with(ok(json!(true)))
        .expect(1)
        .mount(&server)
        .await;

    let cancel = CancellationToken::new();
    let session = Session::start(
        Arc::new(client),
        "Admin",
        &password(),
        Duration::from_millis(40),
        &cancel,
    )
    .await
    .unwrap();

    tokio::time::sleep(Duration::from_millis(200)).await;
    let client = Arc::clone(session.client());
    session.close().await.unwrap();

    let renewals = bodies_for(&server, "Session.renew").await;
    assert!(renewals.len() >= 2, "expected repeated renewals, got {}", renewals.len());

    // No renewal after close.
    tokio::time::sleep(Duration::from_millis(120)).await;
    assert_eq!(bodies_for(&server, "Session.renew").await.len(), renewals.len());
    assert!(!client.has_session());
}

#[tokio::test]
async fn test_renewal_failures_do_not_stop_the_loop() {
    let (server, client) = setup().await;
    mount_login(&server, "tok-4").await;

    Mock::given(method("POST"))
        .and(path(RPC_PATH))
        .and(body_partial_json(json!({ "method": "Session.renew" })))
        .respond_with(rpc_error("session expired"))
        .mount(&server)
        .await;

    let cancel = CancellationToken::new();
    let session = Session::start(
        Arc::new(client),
        "Admin",
        &password(),
        Duration::from_millis(30),
        &cancel,
    )
    .await
    .unwrap();

    tokio::time::sleep(Duration::from_millis(200)).await;

    assert!(bodies_for(&server, "Session.renew").await.len() >= 3);
    assert_eq!(
        session.client().session_token().unwrap().expose_secret(),
        "tok-4"
    );

    cancel.cancel();
}

#[tokio::test]
async fn test_zero_renewal_interval_is_rejected_before_login() {
    let (server, client) = setup().await;
    mount_login(&server, "tok-5").await;

    let cancel = CancellationToken::new();
    let result = Session::start(
        Arc::new(client),
        "Admin",
        &password(),
        Duration::ZERO,
        &cancel,
    )
    .await;

    assert!(matches!(result, Err(Error::Config(_))), "got: {result:?}");
    assert!(bodies_for(&server, "Session.login").await.is_empty());
}

// ── Values ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_get_value_parses_numeric_string() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path(RPC_PATH))
        .and(body_partial_json(json!({
            "method": "Interface.getValue",
            "params": { "interface": "BidCos-RF", "address": "NEQ0000002:1", "valueKey": "LEVEL" }
        })))
        .respond_with(ok(json!("0.500000")))
        .mount(&server)
        .await;

    let value = client.get_value("NEQ0000002:1", "LEVEL").await.unwrap();

    assert!((value - 0.5).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_get_value_non_numeric_is_parse_error() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path(RPC_PATH))
        .respond_with(ok(json!("unreachable")))
        .mount(&server)
        .await;

    let result = client.get_value("NEQ0000001:1", "STATE").await;

    assert!(
        matches!(result, Err(Error::ValueParse { ref value }) if value == "unreachable"),
        "expected ValueParse error, got: {result:?}"
    );
}

#[tokio::test]
async fn test_set_value_sends_typed_params() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path(RPC_PATH))
        .and(body_partial_json(json!({
            "method": "Interface.setValue",
            "params": {
                "interface": "BidCos-RF",
                "address": "NEQ0000001:1",
                "valueKey": "STATE",
                "type": "string",
                "value": "1"
            }
        })))
        .respond_with(ok(json!(true)))
        .expect(1)
        .mount(&server)
        .await;

    client
        .set_value("NEQ0000001:1", "STATE", "string", "1")
        .await
        .unwrap();
}

#[tokio::test]
async fn test_explicit_params_are_sent_verbatim() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path(RPC_PATH))
        .and(body_partial_json(json!({
            "method": "CCU.getVersion",
            "params": { "verbose": "1" }
        })))
        .respond_with(ok(json!("3.61.7")))
        .mount(&server)
        .await;

    let mut params = Params::new();
    params.insert("verbose".into(), "1".into());
    let version: String = client.call("CCU.getVersion", params).await.unwrap();

    assert_eq!(version, "3.61.7");
}
