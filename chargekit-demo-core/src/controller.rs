//! Subscription controller.
//!
//! Sequences the five user operations (create wallet, subscribe, fetch status,
//! charge, revoke) and keeps everything a view needs to render them:
//!
//! - wallet and subscription identity, persisted through [`IdentityRecords`]
//! - the latest platform status, always fetched and never derived locally
//! - one [`OperationState`] per operation kind
//! - the most recent [`Banner`] (latest wins)
//!
//! Subscribe and status go straight to the platform's client-side calls.
//! Wallet, charge and revoke need the server wallet and go through a
//! [`BackendApi`].
//!
//! Operations may overlap. Each one guards only against a second run of the
//! same kind; results land in shared state as they arrive, so the last write
//! wins. After subscribe, charge and revoke the controller waits
//! [`ControllerConfig::refresh_delay`] and then refetches status within the
//! same call.
//!
//! # Example
//!
//! ```rust,ignore
//! let controller = SubscriptionController::new(platform, backend, records, ControllerConfig::default());
//! controller.initialize().await;
//! controller.create_wallet().await;
//! controller.create_subscription().await;
//! controller.charge_subscription(None, None).await;
//! println!("{:?}", controller.snapshot().status);
//! ```

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use chargekit_lib::{
    Amount, Network, SubscribeRequest, SubscriptionInfo, SubscriptionPlatform,
    SubscriptionStatus, WalletInfo, SUBSCRIPTION_PERIOD_DAYS,
};

use crate::backend::{BackendApi, BackendError, ChargeOutcome, RevokeConfirmation};
use crate::banner::{Banner, ErrorKind, OperationError};
use crate::operation::{OperationKind, OperationState};
use crate::records::{IdentityRecords, SUBSCRIPTION_KEY, WALLET_KEY};
use crate::store::StoreError;

/// Allowance used when subscribing, unless configured otherwise.
pub const DEFAULT_SUBSCRIPTION_AMOUNT: &str = "19.99";

/// Wait before the automatic status refresh.
pub const DEFAULT_REFRESH_DELAY: Duration = Duration::from_secs(2);

/// Controller settings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ControllerConfig {
    /// Recurring charge requested by `create_subscription`.
    pub subscription_amount: Amount,
    pub period_in_days: u32,
    pub network: Network,
    pub refresh_delay: Duration,
    /// Refetch status after subscribe, charge and revoke.
    pub refresh_status: bool,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            subscription_amount: Amount::new(1999, 2),
            period_in_days: SUBSCRIPTION_PERIOD_DAYS,
            network: Network::Testnet,
            refresh_delay: DEFAULT_REFRESH_DELAY,
            refresh_status: true,
        }
    }
}

impl ControllerConfig {
    pub fn with_subscription_amount(mut self, amount: Amount) -> Self {
        self.subscription_amount = amount;
        self
    }

    pub fn with_period(mut self, days: u32) -> Self {
        self.period_in_days = days;
        self
    }

    pub fn with_network(mut self, network: Network) -> Self {
        self.network = network;
        self
    }

    pub fn with_refresh_delay(mut self, delay: Duration) -> Self {
        self.refresh_delay = delay;
        self
    }

    pub fn with_status_refresh(mut self, enabled: bool) -> Self {
        self.refresh_status = enabled;
        self
    }
}

/// Progress of every operation kind.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OperationStates {
    pub wallet: OperationState<WalletInfo>,
    pub subscription: OperationState<SubscriptionInfo>,
    pub status: OperationState<SubscriptionStatus>,
    pub charge: OperationState<ChargeOutcome>,
    pub revoke: OperationState<RevokeConfirmation>,
}

impl OperationStates {
    pub fn is_pending(&self, kind: OperationKind) -> bool {
        match kind {
            OperationKind::Wallet => self.wallet.is_pending(),
            OperationKind::Subscription => self.subscription.is_pending(),
            OperationKind::Status => self.status.is_pending(),
            OperationKind::Charge => self.charge.is_pending(),
            OperationKind::Revoke => self.revoke.is_pending(),
        }
    }

    pub fn label(&self, kind: OperationKind) -> &'static str {
        match kind {
            OperationKind::Wallet => self.wallet.label(),
            OperationKind::Subscription => self.subscription.label(),
            OperationKind::Status => self.status.label(),
            OperationKind::Charge => self.charge.label(),
            OperationKind::Revoke => self.revoke.label(),
        }
    }

    fn fail(&mut self, kind: OperationKind, err: OperationError) {
        match kind {
            OperationKind::Wallet => self.wallet = OperationState::Failed(err),
            OperationKind::Subscription => self.subscription = OperationState::Failed(err),
            OperationKind::Status => self.status = OperationState::Failed(err),
            OperationKind::Charge => self.charge = OperationState::Failed(err),
            OperationKind::Revoke => self.revoke = OperationState::Failed(err),
        }
    }
}

/// Everything a view renders.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ControllerState {
    pub wallet: Option<WalletInfo>,
    pub subscription: Option<SubscriptionInfo>,
    pub status: Option<SubscriptionStatus>,
    pub operations: OperationStates,
    pub banner: Option<Banner>,
}

impl ControllerState {
    fn fail(&mut self, kind: OperationKind, err: OperationError) {
        self.operations.fail(kind, err.clone());
        self.banner = Some(Banner::failure(kind, err));
    }
}

/// Client-side subscription state machine.
pub struct SubscriptionController {
    platform: Arc<dyn SubscriptionPlatform>,
    backend: Arc<dyn BackendApi>,
    records: IdentityRecords,
    config: ControllerConfig,
    // Never held across an await
    state: Mutex<ControllerState>,
}

impl SubscriptionController {
    pub fn new(
        platform: Arc<dyn SubscriptionPlatform>,
        backend: Arc<dyn BackendApi>,
        records: IdentityRecords,
        config: ControllerConfig,
    ) -> Self {
        Self {
            platform,
            backend,
            records,
            config,
            state: Mutex::new(ControllerState::default()),
        }
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.config
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> ControllerState {
        self.lock().clone()
    }

    fn lock(&self) -> MutexGuard<'_, ControllerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Restore identity from storage and fetch status once if a subscription
    /// came back.
    ///
    /// Records that fail to load are logged and left out; malformed ones are
    /// also removed from storage.
    pub async fn initialize(&self) {
        let wallet = self.restore(WALLET_KEY, self.records.load_wallet());
        let subscription = self.restore(SUBSCRIPTION_KEY, self.records.load_subscription());

        let fetch = {
            let mut state = self.lock();
            if state.wallet.is_none() {
                state.wallet = wallet;
            }
            if state.subscription.is_none() {
                state.subscription = subscription;
            }

            let restored_id = state.subscription.as_ref().map(|s| s.id.clone());
            match restored_id {
                Some(id) if state.status.is_none() && state.operations.status.is_idle() => {
                    state.operations.status = OperationState::Pending;
                    Some(id)
                }
                _ => None,
            }
        };

        if let Some(id) = fetch {
            tracing::debug!(subscription_id = %id, "fetching status for restored subscription");
            self.fetch_status(id).await;
        }
    }

    fn restore<T>(&self, key: &str, loaded: Result<Option<T>, StoreError>) -> Option<T> {
        match loaded {
            Ok(record) => record,
            Err(err @ StoreError::Malformed { .. }) => {
                tracing::warn!(key, error = %err, "discarding malformed record");
                if let Err(err) = self.records.discard(key) {
                    tracing::warn!(key, error = %err, "failed to discard record");
                }
                None
            }
            Err(err) => {
                tracing::warn!(key, error = %err, "ignoring stored record");
                None
            }
        }
    }

    /// Provision the server wallet.
    ///
    /// No-op while a wallet request is in flight or once a wallet exists.
    pub async fn create_wallet(&self) {
        {
            let mut state = self.lock();
            if state.operations.wallet.is_pending() || state.wallet.is_some() {
                return;
            }
            state.operations.wallet = OperationState::Pending;
        }

        let result = self.backend.create_wallet().await;

        let mut state = self.lock();
        match result {
            Ok(created) => {
                let wallet = created.wallet_info();
                if let Err(err) = self.records.save_wallet(&wallet) {
                    tracing::warn!(error = %err, "failed to persist wallet");
                }
                let message = created
                    .message
                    .unwrap_or_else(|| format!("Wallet created: {}", wallet.address));
                tracing::info!(address = %wallet.address, "wallet ready");
                state.wallet = Some(wallet.clone());
                state.operations.wallet = OperationState::Succeeded(wallet);
                state.banner = Some(Banner::success(OperationKind::Wallet, message));
            }
            Err(err) => {
                tracing::warn!(error = %err, "wallet creation failed");
                state.fail(OperationKind::Wallet, OperationError::message(err.to_string()));
            }
        }
    }

    /// Subscribe the wallet with the configured allowance, then refresh status.
    ///
    /// Without a wallet this fails locally and never reaches the platform.
    pub async fn create_subscription(&self) {
        let owner = {
            let mut state = self.lock();
            if state.operations.subscription.is_pending() {
                return;
            }
            let Some(wallet) = state.wallet.clone() else {
                state.fail(
                    OperationKind::Subscription,
                    OperationError::message("Create a wallet before subscribing"),
                );
                return;
            };
            if state.subscription.is_some() {
                // Banner only; the earlier result stays in the operation state
                state.banner = Some(Banner::failure(
                    OperationKind::Subscription,
                    OperationError::message("A subscription already exists"),
                ));
                return;
            }
            state.operations.subscription = OperationState::Pending;
            wallet.address
        };

        let request = SubscribeRequest::new(owner, self.config.subscription_amount)
            .with_period(self.config.period_in_days)
            .with_network(self.config.network);
        let result = self.platform.subscribe(&request).await;

        let id = {
            let mut state = self.lock();
            match result {
                Ok(info) => {
                    if let Err(err) = self.records.save_subscription(&info) {
                        tracing::warn!(error = %err, "failed to persist subscription");
                    }
                    tracing::info!(subscription_id = %info.id, "subscription created");
                    state.banner = Some(Banner::success(
                        OperationKind::Subscription,
                        format!(
                            "Subscribed for {} every {} days",
                            info.recurring_charge_amount, info.period_in_days
                        ),
                    ));
                    state.subscription = Some(info.clone());
                    state.operations.subscription = OperationState::Succeeded(info.clone());
                    info.id
                }
                Err(err) => {
                    tracing::warn!(error = %err, "subscribe failed");
                    state.fail(
                        OperationKind::Subscription,
                        OperationError::message(err.to_string()),
                    );
                    return;
                }
            }
        };

        self.refresh_later(id).await;
    }

    /// Fetch status for `subscription_id`, or for the current subscription.
    ///
    /// The result replaces any earlier status. On failure the earlier status is kept.
    pub async fn get_status(&self, subscription_id: Option<&str>) {
        let id = {
            let mut state = self.lock();
            let id = subscription_id
                .map(str::to_string)
                .or_else(|| state.subscription.as_ref().map(|s| s.id.clone()));
            let Some(id) = id else {
                state.fail(
                    OperationKind::Status,
                    OperationError::message("No subscription to check"),
                );
                return;
            };
            state.operations.status = OperationState::Pending;
            id
        };

        self.fetch_status(id).await;
    }

    async fn fetch_status(&self, id: String) {
        let result = self.platform.get_status(&id, self.config.network).await;

        let mut state = self.lock();
        match result {
            Ok(status) => {
                tracing::debug!(
                    subscription_id = %id,
                    subscribed = status.is_subscribed,
                    "status fetched"
                );
                state.status = Some(status.clone());
                state.operations.status = OperationState::Succeeded(status);
            }
            Err(err) => {
                tracing::warn!(subscription_id = %id, error = %err, "status fetch failed");
                state.fail(OperationKind::Status, OperationError::message(err.to_string()));
            }
        }
    }

    /// Charge the subscription through the backend, then refresh status.
    ///
    /// `amount` defaults to `1.00`.
    pub async fn charge_subscription(&self, amount: Option<Amount>, recipient: Option<String>) {
        let (wallet, subscription_id) = {
            let mut state = self.lock();
            if state.operations.charge.is_pending() {
                return;
            }
            let wallet = state.wallet.clone();
            let subscription_id = state.subscription.as_ref().map(|s| s.id.clone());
            let (Some(wallet), Some(subscription_id)) = (wallet, subscription_id) else {
                state.fail(
                    OperationKind::Charge,
                    OperationError::message("Create a wallet and a subscription before charging"),
                );
                return;
            };
            state.operations.charge = OperationState::Pending;
            (wallet, subscription_id)
        };

        let amount = amount.unwrap_or_default();
        let result = self
            .backend
            .charge_subscription(&subscription_id, &amount, recipient.as_deref())
            .await;

        {
            let mut state = self.lock();
            match result {
                Ok(outcome) => {
                    tracing::info!(transaction = %outcome.transaction_hash, "charge succeeded");
                    let message = outcome.message.clone().unwrap_or_else(|| {
                        format!(
                            "Charged {} (transaction {})",
                            outcome.amount, outcome.transaction_hash
                        )
                    });
                    state.operations.charge = OperationState::Succeeded(outcome);
                    state.banner = Some(Banner::success(OperationKind::Charge, message));
                }
                Err(err) => {
                    tracing::warn!(error = %err, "charge failed");
                    state.fail(OperationKind::Charge, charge_error(err, &wallet));
                    return;
                }
            }
        }

        self.refresh_later(subscription_id).await;
    }

    /// Revoke the subscription through the backend, then refresh status.
    ///
    /// The subscription record is kept afterwards, so a later charge can show
    /// whether the revocation took effect.
    pub async fn revoke_subscription(&self) {
        let subscription_id = {
            let mut state = self.lock();
            if state.operations.revoke.is_pending() {
                return;
            }
            let Some(id) = state.subscription.as_ref().map(|s| s.id.clone()) else {
                state.fail(
                    OperationKind::Revoke,
                    OperationError::message("No subscription to revoke"),
                );
                return;
            };
            state.operations.revoke = OperationState::Pending;
            id
        };

        let result = self.backend.revoke_subscription(&subscription_id).await;

        {
            let mut state = self.lock();
            match result {
                Ok(confirmation) => {
                    tracing::info!(subscription_id = %subscription_id, "subscription revoked");
                    state.operations.revoke = OperationState::Succeeded(confirmation);
                    state.banner = Some(Banner::success(
                        OperationKind::Revoke,
                        format!(
                            "Subscription {} revoked. The subscription is kept here so you can \
                             try another charge to confirm the revocation.",
                            subscription_id
                        ),
                    ));
                }
                Err(err) => {
                    tracing::warn!(error = %err, "revoke failed");
                    state.fail(OperationKind::Revoke, OperationError::message(err.to_string()));
                    return;
                }
            }
        }

        self.refresh_later(subscription_id).await;
    }

    async fn refresh_later(&self, subscription_id: String) {
        if !self.config.refresh_status {
            return;
        }
        if !self.config.refresh_delay.is_zero() {
            tokio::time::sleep(self.config.refresh_delay).await;
        }
        self.get_status(Some(&subscription_id)).await;
    }
}

/// Classify a failed charge.
fn charge_error(err: BackendError, wallet: &WalletInfo) -> OperationError {
    match err {
        BackendError::Rejected { error, details, .. } => match ErrorKind::from_tag(&error) {
            ErrorKind::Gas => OperationError::structured(
                error,
                format!(
                    "The server wallet {} cannot pay for gas. Fund it with testnet gas and retry.",
                    wallet.address
                ),
                details,
                ErrorKind::Gas,
            ),
            ErrorKind::Error => OperationError::structured(
                error,
                details.clone().unwrap_or_else(|| "The charge was rejected".to_string()),
                details,
                ErrorKind::Error,
            ),
        },
        other => OperationError::message(other.to_string()),
    }
}
