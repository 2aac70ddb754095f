//! Payment and callback integration tests.

mod common;

use axum::http::StatusCode;
use common::{TestHarness, TestUser, WEBHOOK_SECRET};
use devgenius_service::crypto::hmac_sha256_hex;
use serde_json::{json, Value};

async fn create_pro_payment(harness: &TestHarness, user: &TestUser) -> String {
    let response = harness
        .server
        .post("/api/payments/create")
        .add_header("authorization", user.auth_header())
        .json(&json!({ "plan_id": "pro" }))
        .await;
    response.assert_status(StatusCode::CREATED);

    let body: Value = response.json();
    body["transaction"]["id"].as_str().unwrap().to_string()
}

// ============================================================================
// Create
// ============================================================================

#[tokio::test]
async fn create_payment_is_pending_at_plan_price() {
    let harness = TestHarness::new();
    let user = harness.register("ada").await;

    let response = harness
        .server
        .post("/api/payments/create")
        .add_header("authorization", user.auth_header())
        .json(&json!({ "plan_id": "pro" }))
        .await;

    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["transaction"]["status"], "pending");
    assert_eq!(body["transaction"]["amount"], 999);
    assert_eq!(body["transaction"]["user_id"], user.id.as_str());
    assert_eq!(body["currency"], "USD");
}

#[tokio::test]
async fn create_payment_rejects_bad_amounts() {
    let harness = TestHarness::new();
    let user = harness.register("ada").await;

    for amount in [0, -5, 10] {
        harness
            .server
            .post("/api/payments/create")
            .add_header("authorization", user.auth_header())
            .json(&json!({ "plan_id": "pro", "amount": amount }))
            .await
            .assert_status(StatusCode::BAD_REQUEST);
    }
}

#[tokio::test]
async fn create_payment_for_free_plan_is_rejected() {
    let harness = TestHarness::new();
    let user = harness.register("ada").await;

    harness
        .server
        .post("/api/payments/create")
        .add_header("authorization", user.auth_header())
        .json(&json!({ "plan_id": "free" }))
        .await
        .assert_status(StatusCode::BAD_REQUEST);
}

// ============================================================================
// Lookup
// ============================================================================

#[tokio::test]
async fn owner_can_read_transaction() {
    let harness = TestHarness::new();
    let user = harness.register("ada").await;
    let tx_id = create_pro_payment(&harness, &user).await;

    let response = harness
        .server
        .get(&format!("/api/payments/transaction/{tx_id}"))
        .add_header("authorization", user.auth_header())
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["transaction"]["id"], tx_id.as_str());
}

#[tokio::test]
async fn other_user_cannot_read_transaction() {
    let harness = TestHarness::new();
    let owner = harness.register("ada").await;
    let other = harness.register("mallory").await;
    let tx_id = create_pro_payment(&harness, &owner).await;

    harness
        .server
        .get(&format!("/api/payments/transaction/{tx_id}"))
        .add_header("authorization", other.auth_header())
        .await
        .assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn unknown_transaction_is_not_found() {
    let harness = TestHarness::new();
    let user = harness.register("ada").await;

    for id in ["01ARZ3NDEKTSV4RRFFQ69G5FAV", "not-a-ulid"] {
        harness
            .server
            .get(&format!("/api/payments/transaction/{id}"))
            .add_header("authorization", user.auth_header())
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }
}

// ============================================================================
// Verify
// ============================================================================

#[tokio::test]
async fn verify_completes_payment_and_activates_plan() {
    let harness = TestHarness::new();
    let user = harness.register("ada").await;
    let tx_id = create_pro_payment(&harness, &user).await;

    let response = harness
        .server
        .post("/api/payments/verify")
        .add_header("authorization", user.auth_header())
        .json(&json!({ "transaction_id": tx_id }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["success"], true);
    assert_eq!(body["transaction"]["status"], "completed");
    assert!(body["transaction"]["completed_at"].is_string());
    assert_eq!(body["subscription"]["plan_id"], "pro");
    assert_eq!(body["subscription"]["transaction_id"], tx_id.as_str());

    let response = harness
        .server
        .post("/api/payments/verify")
        .add_header("authorization", user.auth_header())
        .json(&json!({ "transaction_id": tx_id }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn verify_someone_elses_payment_is_forbidden() {
    let harness = TestHarness::new();
    let owner = harness.register("ada").await;
    let other = harness.register("mallory").await;
    let tx_id = create_pro_payment(&harness, &owner).await;

    harness
        .server
        .post("/api/payments/verify")
        .add_header("authorization", other.auth_header())
        .json(&json!({ "transaction_id": tx_id }))
        .await
        .assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn new_payment_replaces_active_subscription() {
    let harness = TestHarness::new();
    let user = harness.register("ada").await;

    harness
        .server
        .post("/api/plans/subscribe")
        .add_header("authorization", user.auth_header())
        .json(&json!({ "plan_id": "free" }))
        .await
        .assert_status(StatusCode::CREATED);

    let tx_id = create_pro_payment(&harness, &user).await;
    harness
        .server
        .post("/api/payments/verify")
        .add_header("authorization", user.auth_header())
        .json(&json!({ "transaction_id": tx_id }))
        .await
        .assert_status_ok();

    let body: Value = harness
        .server
        .get(&format!("/api/plans/subscription/{}", user.id))
        .add_header("authorization", user.auth_header())
        .await
        .json();
    assert_eq!(body["subscription"]["plan_id"], "pro");
}

// ============================================================================
// Callback
// ============================================================================

#[tokio::test]
async fn signed_callback_completes_payment() {
    let harness = TestHarness::new();
    let user = harness.register("ada").await;
    let tx_id = create_pro_payment(&harness, &user).await;

    let payload = json!({ "transaction_id": tx_id }).to_string();
    let signature = hmac_sha256_hex(WEBHOOK_SECRET, payload.as_bytes());

    let response = harness
        .server
        .post("/api/payments/callback")
        .add_header("x-signature", signature.clone())
        .text(payload.clone())
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["received"], true);
    assert_eq!(body["already_processed"], false);

    let body: Value = harness
        .server
        .get(&format!("/api/payments/transaction/{tx_id}"))
        .add_header("authorization", user.auth_header())
        .await
        .json();
    assert_eq!(body["transaction"]["status"], "completed");

    let replay: Value = harness
        .server
        .post("/api/payments/callback")
        .add_header("x-signature", signature)
        .text(payload)
        .await
        .json();
    assert_eq!(replay["already_processed"], true);
}

#[tokio::test]
async fn callback_with_bad_signature_is_unauthorized() {
    let harness = TestHarness::new();
    let user = harness.register("ada").await;
    let tx_id = create_pro_payment(&harness, &user).await;

    let payload = json!({ "transaction_id": tx_id }).to_string();
    let forged = hmac_sha256_hex("wrong-secret", payload.as_bytes());

    harness
        .server
        .post("/api/payments/callback")
        .add_header("x-signature", forged)
        .text(payload.clone())
        .await
        .assert_status(StatusCode::UNAUTHORIZED);

    harness
        .server
        .post("/api/payments/callback")
        .text(payload)
        .await
        .assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn callback_without_secret_is_an_internal_error() {
    let harness = TestHarness::with_config(|config| config.payment_webhook_secret = None);

    harness
        .server
        .post("/api/payments/callback")
        .add_header("x-signature", "00")
        .text(r#"{"transaction_id":"01ARZ3NDEKTSV4RRFFQ69G5FAV"}"#)
        .await
        .assert_status(StatusCode::INTERNAL_SERVER_ERROR);
}
