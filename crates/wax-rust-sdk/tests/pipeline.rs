//! End-to-end tests of the fetch, encode, sign, sponsor and submit pipeline
//! against mocked chain, wallet and sponsor services.

use serde_json::{Value, json};
use std::sync::Arc;
use wax_rust_sdk::config::RemoteSignerConfig;
use wax_rust_sdk::crypto::Signature;
use wax_rust_sdk::identity::{LocalIdentity, RemoteIdentity};
use wax_rust_sdk::transaction::{
    ActionDescriptor, HttpPayerSigner, PayerInjection, PermissionLevel, SponsorPosition,
};
use wax_rust_sdk::{ChainId, Name, SigningIdentity, Wax, WaxConfig, WaxError};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{header, method, path},
};

const DEV_WIF: &str = "5KQwrPbwdL6PhXujxW37FSSQZ1JiwsST4cqQzDeyXtP79zkvFD3";
const TESTNET_CHAIN_ID: &str = "f16b1833c747c43682f4386fca9cbb327929334a762755ebec17f6f23c9b8a12";
const ACTION_LEN: usize = 8 + 8 + 1 + 16 + 1;
const FIRST_ACTION: usize = 15;

async fn mock_chain(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/v1/chain/get_info"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "server_version": "e3d1a3b4",
            "chain_id": TESTNET_CHAIN_ID,
            "head_block_num": 65700,
            "last_irreversible_block_num": 65636
        })))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/chain/get_block"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "00010064deadbeefefbeadde00000000000000000000000000000000000000ff",
            "block_num": 65636,
            "ref_block_prefix": 3735928559u32
        })))
        .mount(server)
        .await;
}

async fn mock_push(server: &MockServer, times: u64) {
    Mock::given(method("POST"))
        .and(path("/v1/chain/push_transaction"))
        .respond_with(ResponseTemplate::new(202).set_body_json(json!({
            "transaction_id": "5d1e0b2c",
            "processed": { "receipt": { "status": "executed" } }
        })))
        .expect(times)
        .mount(server)
        .await;
}

async fn push_body(server: &MockServer) -> Value {
    let requests = server.received_requests().await.unwrap();
    let push = requests
        .iter()
        .find(|r| r.url.path() == "/v1/chain/push_transaction")
        .unwrap();
    serde_json::from_slice(&push.body).unwrap()
}

fn packed_bytes(body: &Value) -> Vec<u8> {
    hex::decode(body["packed_trx"].as_str().unwrap()).unwrap()
}

fn action_name_at(bytes: &[u8], index: usize) -> [u8; 8] {
    let start = FIRST_ACTION + index * ACTION_LEN + 8;
    bytes[start..start + 8].try_into().unwrap()
}

fn action_account_at(bytes: &[u8], index: usize) -> [u8; 8] {
    let start = FIRST_ACTION + index * ACTION_LEN;
    bytes[start..start + 8].try_into().unwrap()
}

fn action(name: &str, actor: &str) -> ActionDescriptor {
    ActionDescriptor::parse(
        "eosio.token",
        name,
        vec![PermissionLevel::active(actor).unwrap()],
        vec![],
    )
    .unwrap()
}

fn remote(server: &MockServer, credential: &str, account: &str) -> SigningIdentity {
    let config = RemoteSignerConfig::default()
        .with_sign_url(&format!("{}/wam/sign", server.uri()))
        .unwrap();
    RemoteIdentity::new(credential, Name::new(account).unwrap(), config)
        .unwrap()
        .into()
}

async fn mock_wallet(server: &MockServer, credential: &str, signature: &str, times: u64) {
    Mock::given(method("POST"))
        .and(path("/wam/sign"))
        .and(header("x-access-token", credential))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "signatures": [signature] })))
        .expect(times)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_append_order_is_wire_order() {
    let server = MockServer::start().await;
    mock_chain(&server).await;
    mock_push(&server, 1).await;

    let wax = Wax::new(WaxConfig::custom(&server.uri()).unwrap()).unwrap();
    let alice = LocalIdentity::from_key_str(DEV_WIF, "alice").unwrap();
    let result = wax
        .transaction(alice)
        .with_action(action("a", "alice"))
        .with_action(action("b", "alice"))
        .with_action(action("c", "alice"))
        .push(None)
        .await
        .unwrap();
    assert_eq!(result.transaction_id, "5d1e0b2c");

    let body = push_body(&server).await;
    let bytes = packed_bytes(&body);
    assert_eq!(&bytes[4..6], &[0x64, 0x00]);
    assert_eq!(&bytes[6..10], &[0xEF, 0xBE, 0xAD, 0xDE]);
    assert_eq!(bytes[14], 3);
    for (index, name) in ["a", "b", "c"].iter().enumerate() {
        assert_eq!(action_name_at(&bytes, index), Name::new(*name).unwrap().to_le_bytes());
    }
}

#[tokio::test]
async fn test_local_signature_verifies_against_chain_digest() {
    let server = MockServer::start().await;
    mock_chain(&server).await;
    mock_push(&server, 1).await;

    let wax = Wax::new(WaxConfig::custom(&server.uri()).unwrap()).unwrap();
    let alice = LocalIdentity::from_key_str(DEV_WIF, "alice").unwrap();
    let public_key = alice.public_key();
    wax.transaction(alice)
        .with_action(action("transfer", "alice"))
        .push(None)
        .await
        .unwrap();

    let body = push_body(&server).await;
    let bytes = packed_bytes(&body);
    let signatures = body["signatures"].as_array().unwrap();
    assert_eq!(signatures.len(), 1);

    let signature: Signature = signatures[0].as_str().unwrap().parse().unwrap();
    let chain_id: ChainId = TESTNET_CHAIN_ID.parse().unwrap();
    let digest = wax_rust_sdk::crypto::signing_digest(&chain_id, &bytes, None);
    assert!(public_key.verify_digest(&digest, &signature).is_ok());
}

#[tokio::test]
async fn test_whitelist_signs_only_referenced_pool_members() {
    let server = MockServer::start().await;
    mock_chain(&server).await;
    mock_push(&server, 1).await;
    mock_wallet(&server, "session-x", "SIG_K1_xavier", 1).await;
    mock_wallet(&server, "session-y", "SIG_K1_yolanda", 0).await;
    mock_wallet(&server, "session-z", "SIG_K1_zed", 1).await;

    let wax = Wax::new(WaxConfig::custom(&server.uri()).unwrap()).unwrap();
    let pool = vec![
        remote(&server, "session-x", "xavier"),
        remote(&server, "session-y", "yolanda"),
        remote(&server, "session-z", "zed"),
    ];
    wax.multi_party(pool)
        .with_action(action("transfer", "xavier"))
        .with_action(action("transfer", "zed"))
        .push(None)
        .await
        .unwrap();

    let body = push_body(&server).await;
    assert_eq!(body["signatures"], json!(["SIG_K1_xavier", "SIG_K1_zed"]));
}

#[tokio::test]
async fn test_sponsored_push_concatenates_payer_signature() {
    let server = MockServer::start().await;
    mock_chain(&server).await;
    mock_push(&server, 1).await;
    Mock::given(method("POST"))
        .and(path("/v1/sign"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "success": true, "data": ["SIG_K1_payer"] })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let sponsor = ActionDescriptor::parse(
        "res.pink",
        "noop",
        vec![PermissionLevel::parse("res.pink", "paybw").unwrap()],
        vec![],
    )
    .unwrap();
    let endpoint = url::Url::parse(&format!("{}/v1/sign", server.uri())).unwrap();
    let injection = PayerInjection::new(sponsor, Some(endpoint), SponsorPosition::Prepend);

    let wax = Wax::new(WaxConfig::custom(&server.uri()).unwrap()).unwrap();
    let alice = LocalIdentity::from_key_str(DEV_WIF, "alice").unwrap();
    let mut adapter = wax
        .transaction(alice)
        .with_action(action("transfer", "alice"))
        .pay_with(injection)
        .unwrap();
    assert!(!adapter.ensure_injected());
    assert_eq!(adapter.builder().actions().len(), 2);

    let result = adapter.push(None).await.unwrap();
    assert_eq!(result.transaction_id, "5d1e0b2c");

    let body = push_body(&server).await;
    let signatures = body["signatures"].as_array().unwrap();
    assert_eq!(signatures.len(), 2);
    assert_eq!(signatures[1], "SIG_K1_payer");

    let bytes = packed_bytes(&body);
    assert_eq!(bytes[14], 2);
    assert_eq!(action_account_at(&bytes, 0), Name::new("res.pink").unwrap().to_le_bytes());
    assert_eq!(action_account_at(&bytes, 1), Name::new("eosio.token").unwrap().to_le_bytes());
}

#[tokio::test]
async fn test_payer_rejection_stops_before_submission() {
    let server = MockServer::start().await;
    mock_chain(&server).await;
    mock_push(&server, 0).await;
    Mock::given(method("POST"))
        .and(path("/nefty"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "error": "daily quota exhausted" })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let sponsor = ActionDescriptor::parse(
        "neftybrespay",
        "paycpu",
        vec![PermissionLevel::active("neftybrespay").unwrap()],
        vec![],
    )
    .unwrap();
    let injection = PayerInjection::new(sponsor, None, SponsorPosition::Prepend);
    let signer = Arc::new(HttpPayerSigner::new(
        url::Url::parse(&format!("{}/nefty", server.uri())).unwrap(),
        "transaction",
    )
    .unwrap());

    let wax = Wax::new(WaxConfig::custom(&server.uri()).unwrap()).unwrap();
    let alice = LocalIdentity::from_key_str(DEV_WIF, "alice").unwrap();
    let err = wax
        .transaction(alice)
        .with_action(action("transfer", "alice"))
        .pay_with_signer(injection, signer)
        .push(None)
        .await
        .unwrap_err();
    match err {
        WaxError::PayerRejected { message } => assert_eq!(message, "daily quota exhausted"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_identity_payer_signs_as_pool_member() {
    let server = MockServer::start().await;
    mock_chain(&server).await;
    mock_push(&server, 1).await;
    mock_wallet(&server, "session-payer", "SIG_K1_payer", 1).await;

    let wax = Wax::new(WaxConfig::custom(&server.uri()).unwrap()).unwrap();
    let alice = LocalIdentity::from_key_str(DEV_WIF, "alice").unwrap();
    let builder = wax
        .transaction(alice)
        .with_action(action("transfer", "alice"))
        .pay_with_identity(remote(&server, "session-payer", "payer"))
        .unwrap();
    builder.push(None).await.unwrap();

    let body = push_body(&server).await;
    let signatures = body["signatures"].as_array().unwrap();
    assert_eq!(signatures.len(), 2);
    assert_eq!(signatures[0], "SIG_K1_payer");

    let bytes = packed_bytes(&body);
    assert_eq!(action_account_at(&bytes, 0), Name::new("litewaxpayer").unwrap().to_le_bytes());
}

#[tokio::test]
async fn test_expired_submission_needs_rebuild() {
    let server = MockServer::start().await;
    mock_chain(&server).await;
    Mock::given(method("POST"))
        .and(path("/v1/chain/push_transaction"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "code": 500,
            "message": "Internal Service Error",
            "error": {
                "code": 3040005,
                "name": "expired_tx_exception",
                "what": "Expired Transaction",
                "details": []
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let wax = Wax::new(WaxConfig::custom(&server.uri()).unwrap()).unwrap();
    let alice = LocalIdentity::from_key_str(DEV_WIF, "alice").unwrap();
    let err = wax
        .transaction(alice)
        .with_action(action("transfer", "alice"))
        .push(None)
        .await
        .unwrap_err();
    assert!(matches!(err, WaxError::TransactionExpired(_)));
    assert!(err.needs_rebuild());
}

#[tokio::test]
async fn test_stale_session_never_reaches_chain() {
    let server = MockServer::start().await;
    mock_chain(&server).await;
    mock_push(&server, 0).await;
    Mock::given(method("POST"))
        .and(path("/wam/sign"))
        .respond_with(ResponseTemplate::new(401))
        .expect(1)
        .mount(&server)
        .await;

    let wax = Wax::new(WaxConfig::custom(&server.uri()).unwrap()).unwrap();
    let err = wax
        .transaction(remote(&server, "stale", "carol"))
        .with_action(action("transfer", "carol"))
        .push(None)
        .await
        .unwrap_err();
    assert!(err.requires_reauthentication());
}

#[tokio::test]
async fn test_pinned_chain_id_mismatch_is_config_error() {
    let server = MockServer::start().await;
    mock_chain(&server).await;
    mock_push(&server, 0).await;

    let config = WaxConfig::custom(&server.uri())
        .unwrap()
        .with_chain_id(ChainId::mainnet());
    let wax = Wax::new(config).unwrap();
    let alice = LocalIdentity::from_key_str(DEV_WIF, "alice").unwrap();
    let err = wax
        .transaction(alice)
        .with_action(action("transfer", "alice"))
        .push(None)
        .await
        .unwrap_err();
    assert!(matches!(err, WaxError::Config(_)));
}
