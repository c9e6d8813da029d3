//! Chargekit demo server.
//!
//! Three stateless JSON endpoints that act on subscriptions with the server's
//! custodial wallet. The platform credentials stay in this process; clients
//! only ever see wallet addresses, receipts and error messages.
//!
//! ```ignore
//! use chargekit_demo_server::{router, AppState};
//!
//! let app = router(AppState::new(platform, credentials, "chargekit-demo-wallet", Network::Testnet));
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await?;
//! axum::serve(listener, app).await?;
//! ```

pub mod config;
pub mod handlers;
pub mod state;

use axum::routing::post;
use axum::Router;

pub use config::ServerConfig;
pub use state::AppState;

/// Wallet provisioning route.
pub const CREATE_WALLET_PATH: &str = "/API/create-wallet";
/// Charge route.
pub const CHARGE_SUBSCRIPTION_PATH: &str = "/API/charge-subscription";
/// Revoke route.
pub const REVOKE_SUBSCRIPTION_PATH: &str = "/API/revoke-subscription";

/// Build the router. Paths are matched case-sensitively.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route(CREATE_WALLET_PATH, post(handlers::post_create_wallet))
        .route(
            CHARGE_SUBSCRIPTION_PATH,
            post(handlers::post_charge_subscription),
        )
        .route(
            REVOKE_SUBSCRIPTION_PATH,
            post(handlers::post_revoke_subscription),
        )
        .with_state(state)
}
