//! End-to-end flow: controller -> HttpBackend -> real router -> MockPlatform.
//!
//! The demo server router is served on an ephemeral port, identity lives in a
//! temporary directory, and the platform is the in-memory mock shared by the
//! server and the controller's client-side calls.

use std::sync::Arc;
use std::time::Duration;

use chargekit_demo_core::{
    ControllerConfig, ErrorKind, FileStore, HttpBackend, IdentityRecords, OperationError,
    SubscriptionController, Tone,
};
use chargekit_demo_server::{router, AppState};
use chargekit_lib::test_utils::{test_credentials, MockPlatform, PlatformOp, TEST_WALLET_NAME};
use chargekit_lib::{Amount, Network};
use tempfile::TempDir;

struct Demo {
    platform: Arc<MockPlatform>,
    base_url: String,
    storage: TempDir,
}

impl Demo {
    async fn start() -> Self {
        let platform = MockPlatform::new();
        let app = router(AppState::new(
            platform.clone(),
            test_credentials(),
            TEST_WALLET_NAME,
            Network::Testnet,
        ));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            platform,
            base_url: format!("http://{}", addr),
            storage: tempfile::tempdir().unwrap(),
        }
    }

    /// A fresh controller over the same storage: one page load.
    fn load_page(&self) -> SubscriptionController {
        let backend = HttpBackend::new(&self.base_url).unwrap();
        SubscriptionController::new(
            self.platform.clone(),
            Arc::new(backend),
            IdentityRecords::new(Arc::new(FileStore::new(self.storage.path()))),
            ControllerConfig::default().with_refresh_delay(Duration::from_millis(10)),
        )
    }
}

fn amount(s: &str) -> Amount {
    Amount::from_str_checked(s).unwrap()
}

#[tokio::test]
async fn test_subscribe_charge_and_refresh() {
    let demo = Demo::start().await;
    let page = demo.load_page();
    page.initialize().await;

    page.create_wallet().await;
    let wallet = page.snapshot().wallet.expect("wallet created");
    assert_eq!(wallet.wallet_name.as_deref(), Some(TEST_WALLET_NAME));

    page.create_subscription().await;
    let state = page.snapshot();
    let subscription = state.subscription.expect("subscription created");
    assert_eq!(subscription.recurring_charge_amount, amount("19.99"));
    assert_eq!(subscription.period_in_days, 30);
    let status = state.status.expect("status fetched after subscribing");
    assert!(status.is_subscribed);
    assert_eq!(status.remaining_charge_in_period, Some(amount("19.99")));

    page.charge_subscription(Some(amount("1.00")), None).await;
    let state = page.snapshot();
    assert!(state.banner.unwrap().is_success());
    let outcome = state.operations.charge.succeeded().cloned().unwrap();
    assert_eq!(outcome.amount, amount("1.00"));
    assert_eq!(outcome.subscription_owner, wallet.address);
    assert_eq!(
        state
            .status
            .unwrap()
            .remaining_charge_in_period
            .map(|a| a.to_string()),
        Some("18.99".to_string())
    );
}

#[tokio::test]
async fn test_reload_restores_identity_and_fetches_status_once() {
    let demo = Demo::start().await;
    {
        let page = demo.load_page();
        page.initialize().await;
        page.create_wallet().await;
        page.create_subscription().await;
    }
    demo.platform.reset_calls();

    let page = demo.load_page();
    page.initialize().await;
    page.initialize().await;

    let state = page.snapshot();
    assert!(state.wallet.is_some());
    assert!(state.subscription.is_some());
    assert!(state.status.unwrap().is_subscribed);
    assert_eq!(demo.platform.calls(), vec![PlatformOp::GetStatus]);
}

#[tokio::test]
async fn test_gas_failure_over_http() {
    let demo = Demo::start().await;
    let page = demo.load_page();
    page.create_wallet().await;
    page.create_subscription().await;
    let address = page.snapshot().wallet.unwrap().address;

    demo.platform.set_gas_exhausted(true);
    page.charge_subscription(None, None).await;

    let banner = page.snapshot().banner.unwrap();
    let Tone::Failure(err) = banner.tone else {
        panic!("expected a failure banner");
    };
    assert_eq!(err.kind(), ErrorKind::Gas);
    assert!(matches!(
        &err,
        OperationError::Structured { title, message, details: Some(_), .. }
            if title == "Insufficient Gas" && message.contains(&address)
    ));
}

#[tokio::test]
async fn test_revoke_keeps_record_and_platform_decides_next_charge() {
    let demo = Demo::start().await;
    let page = demo.load_page();
    page.create_wallet().await;
    page.create_subscription().await;

    page.revoke_subscription().await;
    let state = page.snapshot();
    assert!(state.banner.unwrap().is_success());
    assert!(!state.status.unwrap().is_subscribed);
    let revoke = state.operations.revoke.succeeded().cloned().unwrap();
    assert_eq!(revoke.revoke_result["status"], "revoked");

    // A reload still finds the subscription
    let reloaded = demo.load_page();
    reloaded.initialize().await;
    assert_eq!(reloaded.snapshot().subscription, state.subscription);

    reloaded.charge_subscription(None, None).await;
    let err = reloaded.snapshot().banner.unwrap();
    assert_eq!(
        err.error().map(|e| e.kind()),
        Some(ErrorKind::Error),
        "charge after revoke must fail"
    );
    assert_eq!(demo.platform.call_count(PlatformOp::Charge), 1);
}

#[tokio::test]
async fn test_unreachable_server_is_plain_error() {
    let demo = Demo::start().await;
    let backend = HttpBackend::new("http://127.0.0.1:9").unwrap();
    let page = SubscriptionController::new(
        demo.platform.clone(),
        Arc::new(backend),
        IdentityRecords::new(Arc::new(FileStore::new(demo.storage.path()))),
        ControllerConfig::default(),
    );

    page.create_wallet().await;
    let state = page.snapshot();
    assert!(state.wallet.is_none());
    assert!(matches!(
        state.operations.wallet.error(),
        Some(OperationError::Message(_))
    ));
}
