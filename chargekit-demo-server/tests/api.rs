//! Endpoint tests driving the router in-process against `MockPlatform`.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chargekit_demo_server::{router, AppState};
use chargekit_lib::test_utils::{test_credentials, MockPlatform, PlatformOp, TEST_WALLET_NAME};
use chargekit_lib::{Amount, ChargekitError, Credentials, Network, SubscribeRequest, SubscriptionPlatform};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

fn app(platform: Arc<MockPlatform>) -> Router {
    router(AppState::new(
        platform,
        test_credentials(),
        TEST_WALLET_NAME,
        Network::Testnet,
    ))
}

async fn post(app: Router, path: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method("POST").uri(path);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

/// Provision the server wallet and subscribe it to `allowance`.
async fn subscribed(platform: &Arc<MockPlatform>, allowance: &str) -> String {
    let wallet = platform
        .create_or_get_wallet(TEST_WALLET_NAME, &test_credentials())
        .await
        .unwrap();
    platform
        .subscribe(&SubscribeRequest::new(
            wallet.address,
            Amount::from_str_checked(allowance).unwrap(),
        ))
        .await
        .unwrap()
        .id
}

// ============================================================================
// /API/create-wallet
// ============================================================================

mod create_wallet {
    use super::*;

    #[tokio::test]
    async fn test_repeated_calls_return_same_address() {
        let platform = MockPlatform::new();

        let (status, first) = post(app(platform.clone()), "/API/create-wallet", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(first["walletName"], TEST_WALLET_NAME);
        assert!(first["message"].is_string());

        let (_, second) = post(app(platform.clone()), "/API/create-wallet", None).await;
        assert_eq!(first["address"], second["address"]);
    }

    #[tokio::test]
    async fn test_body_is_ignored() {
        let platform = MockPlatform::new();
        let (status, _) = post(
            app(platform),
            "/API/create-wallet",
            Some(json!({ "name": "someone-else" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_platform_failure_is_500_with_error() {
        let platform = MockPlatform::new();
        let state = AppState::new(
            platform,
            Credentials::default(),
            TEST_WALLET_NAME,
            Network::Testnet,
        );

        let (status, body) = post(router(state), "/API/create-wallet", None).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body["error"].as_str().unwrap().contains("credentials"));
        assert!(body.get("success").is_none());
    }

    #[tokio::test]
    async fn test_lowercase_path_is_not_routed() {
        let platform = MockPlatform::new();
        let (status, _) = post(app(platform.clone()), "/api/create-wallet", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(platform.call_count(PlatformOp::CreateOrGetWallet), 0);
    }
}

// ============================================================================
// /API/charge-subscription
// ============================================================================

mod charge {
    use super::*;

    #[tokio::test]
    async fn test_empty_id_is_client_error() {
        let platform = MockPlatform::new();
        let (status, body) = post(
            app(platform.clone()),
            "/API/charge-subscription",
            Some(json!({ "subscriptionId": "" })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert!(body["error"].is_string());
        assert_eq!(platform.call_count(PlatformOp::Charge), 0);
    }

    #[tokio::test]
    async fn test_missing_body_is_client_error() {
        let platform = MockPlatform::new();
        let (status, body) = post(app(platform), "/API/charge-subscription", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
    }

    #[tokio::test]
    async fn test_amount_defaults_to_one() {
        let platform = MockPlatform::new();
        let id = subscribed(&platform, "19.99").await;

        let (status, body) = post(
            app(platform.clone()),
            "/API/charge-subscription",
            Some(json!({ "subscriptionId": id })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["amount"], "1.00");
        assert_eq!(body["subscriptionId"], id);
        assert!(body["transactionHash"].as_str().unwrap().starts_with("0x"));
        assert!(body.get("recipient").is_none());

        let wallet = platform.wallet(TEST_WALLET_NAME).unwrap();
        assert_eq!(body["subscriptionOwner"], wallet.address);
    }

    #[tokio::test]
    async fn test_recipient_is_echoed() {
        let platform = MockPlatform::new();
        let id = subscribed(&platform, "19.99").await;

        let (status, body) = post(
            app(platform),
            "/API/charge-subscription",
            Some(json!({ "subscriptionId": id, "amount": "2.50", "recipient": "0xfeed" })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["amount"], "2.50");
        assert_eq!(body["recipient"], "0xfeed");
    }

    #[tokio::test]
    async fn test_invalid_amount_is_client_error() {
        let platform = MockPlatform::new();
        let (status, body) = post(
            app(platform.clone()),
            "/API/charge-subscription",
            Some(json!({ "subscriptionId": "0xsub", "amount": "lots" })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(platform.call_count(PlatformOp::Charge), 0);
    }

    #[tokio::test]
    async fn test_gas_failure_is_forwarded_verbatim() {
        let platform = MockPlatform::new();
        let id = subscribed(&platform, "19.99").await;
        platform.set_gas_exhausted(true);

        let (status, body) = post(
            app(platform),
            "/API/charge-subscription",
            Some(json!({ "subscriptionId": id })),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Insufficient Gas");
        assert!(body["details"].is_string());
    }

    #[tokio::test]
    async fn test_platform_invalid_data_is_client_error() {
        let platform = MockPlatform::new();
        let id = subscribed(&platform, "19.99").await;
        platform.fail_next(
            PlatformOp::Charge,
            ChargekitError::invalid_data("recipient", "not an address"),
        );

        let (status, body) = post(
            app(platform),
            "/API/charge-subscription",
            Some(json!({ "subscriptionId": id, "recipient": "nowhere" })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "invalid recipient: not an address");
    }
}

// ============================================================================
// /API/revoke-subscription
// ============================================================================

mod revoke {
    use super::*;

    #[tokio::test]
    async fn test_missing_id_is_client_error() {
        let platform = MockPlatform::new();
        let (status, body) = post(
            app(platform.clone()),
            "/API/revoke-subscription",
            Some(json!({})),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["error"].is_string());
        assert_eq!(platform.call_count(PlatformOp::Revoke), 0);
    }

    #[tokio::test]
    async fn test_success_echoes_id_and_result() {
        let platform = MockPlatform::new();
        let id = subscribed(&platform, "19.99").await;

        let (status, body) = post(
            app(platform.clone()),
            "/API/revoke-subscription",
            Some(json!({ "subscriptionId": id })),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["subscriptionId"], id);
        assert_eq!(body["revokeResult"]["status"], "revoked");
        assert_eq!(platform.is_revoked(&id), Some(true));
    }

    #[tokio::test]
    async fn test_platform_failure_is_500() {
        let platform = MockPlatform::new();
        platform
            .create_or_get_wallet(TEST_WALLET_NAME, &test_credentials())
            .await
            .unwrap();

        let (status, body) = post(
            app(platform),
            "/API/revoke-subscription",
            Some(json!({ "subscriptionId": "0xunknown" })),
        )
        .await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["success"], false);
        assert!(body["error"].as_str().unwrap().contains("0xunknown"));
    }
}
