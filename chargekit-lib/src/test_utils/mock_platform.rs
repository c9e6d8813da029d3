//! In-memory wallet/subscription platform for E2E testing.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde_json::json;

use super::fixtures::{derive_address, derive_hash};
use crate::platform::{Credentials, SubscriptionPlatform};
use crate::{
    Amount, ChargeReceipt, ChargeRequest, ChargekitError, Network, Result, RevokeRequest,
    RevokeResult, SubscribeRequest, SubscriptionInfo, SubscriptionStatus, WalletInfo,
};

/// Error title the platform reports when the server wallet cannot pay for gas.
pub const INSUFFICIENT_GAS: &str = "Insufficient Gas";

/// Platform operations, as recorded in the call log.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PlatformOp {
    /// `create_or_get_wallet`
    CreateOrGetWallet,
    /// `subscribe`
    Subscribe,
    /// `get_status`
    GetStatus,
    /// `charge`
    Charge,
    /// `revoke`
    Revoke,
}

#[derive(Clone, Debug)]
struct MockSubscription {
    info: SubscriptionInfo,
    owner: String,
    network: Network,
    spent: Amount,
    period_start: DateTime<Utc>,
    revoked: bool,
}

impl MockSubscription {
    fn period(&self) -> Duration {
        Duration::days(i64::from(self.info.period_in_days))
    }

    /// Start a fresh period once the current one has elapsed.
    fn roll_period(&mut self, now: DateTime<Utc>) {
        while now >= self.period_start + self.period() {
            self.period_start += self.period();
            self.spent = Amount::zero();
        }
    }

    fn remaining(&self) -> Amount {
        self.info
            .recurring_charge_amount
            .checked_sub(&self.spent)
            .unwrap_or_else(Amount::zero)
    }
}

#[derive(Default)]
struct MockState {
    wallets: HashMap<String, WalletInfo>,
    subscriptions: HashMap<String, MockSubscription>,
    calls: Vec<PlatformOp>,
    failures: HashMap<PlatformOp, VecDeque<ChargekitError>>,
    gas_exhausted: bool,
    sequence: u64,
}

impl MockState {
    fn next_sequence(&mut self) -> u64 {
        self.sequence += 1;
        self.sequence
    }

    /// Record the call and pop an injected failure, if any.
    fn begin(&mut self, op: PlatformOp) -> Result<()> {
        self.calls.push(op);
        match self.failures.get_mut(&op).and_then(VecDeque::pop_front) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn wallet(&self, name: &str) -> Result<WalletInfo> {
        self.wallets
            .get(name)
            .cloned()
            .ok_or_else(|| ChargekitError::not_found("wallet", name))
    }
}

/// A simulated platform for testing.
///
/// Wallet addresses are derived from the wallet name, subscriptions keep a
/// per-period allowance, and charges draw it down. Every call is logged so
/// tests can assert exactly which platform operations happened.
#[derive(Default)]
pub struct MockPlatform {
    state: Mutex<MockState>,
}

impl MockPlatform {
    /// Create a new, empty platform.
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make every subsequent charge fail with [`INSUFFICIENT_GAS`].
    pub fn set_gas_exhausted(&self, exhausted: bool) {
        self.state().gas_exhausted = exhausted;
    }

    /// Fail the next call of `op` with `error`.
    ///
    /// Injected failures queue up and are consumed in order.
    pub fn fail_next(&self, op: PlatformOp, error: ChargekitError) {
        self.state()
            .failures
            .entry(op)
            .or_default()
            .push_back(error);
    }

    /// All calls made so far, in order.
    pub fn calls(&self) -> Vec<PlatformOp> {
        self.state().calls.clone()
    }

    /// Number of calls of `op` made so far.
    pub fn call_count(&self, op: PlatformOp) -> usize {
        self.state().calls.iter().filter(|c| **c == op).count()
    }

    /// Forget the call log.
    pub fn reset_calls(&self) {
        self.state().calls.clear();
    }

    /// Get a provisioned wallet by name.
    pub fn wallet(&self, name: &str) -> Option<WalletInfo> {
        self.state().wallets.get(name).cloned()
    }

    /// Whether a subscription has been revoked.
    pub fn is_revoked(&self, subscription_id: &str) -> Option<bool> {
        self.state()
            .subscriptions
            .get(subscription_id)
            .map(|s| s.revoked)
    }

    /// Move a subscription's period start into the past, as if time had passed.
    pub fn age_subscription(&self, subscription_id: &str, by: Duration) {
        if let Some(sub) = self.state().subscriptions.get_mut(subscription_id) {
            sub.period_start -= by;
        }
    }
}

fn require_credentials(credentials: &Credentials) -> Result<()> {
    if credentials.is_complete() {
        Ok(())
    } else {
        Err(ChargekitError::Auth(
            "platform credentials are not configured".to_string(),
        ))
    }
}

fn check_owner(sub: &MockSubscription, wallet: &WalletInfo) -> Result<()> {
    if sub.owner == wallet.address {
        Ok(())
    } else {
        Err(ChargekitError::platform(
            "Wallet is not the subscription owner",
            Some(format!(
                "Subscription {} is owned by {}",
                sub.info.id, sub.owner
            )),
        ))
    }
}

#[async_trait]
impl SubscriptionPlatform for MockPlatform {
    async fn create_or_get_wallet(
        &self,
        name: &str,
        credentials: &Credentials,
    ) -> Result<WalletInfo> {
        let mut state = self.state();
        state.begin(PlatformOp::CreateOrGetWallet)?;
        require_credentials(credentials)?;

        let wallet = state
            .wallets
            .entry(name.to_string())
            .or_insert_with(|| WalletInfo::new(derive_address(name)).with_name(name))
            .clone();
        Ok(wallet)
    }

    async fn subscribe(&self, request: &SubscribeRequest) -> Result<SubscriptionInfo> {
        let mut state = self.state();
        state.begin(PlatformOp::Subscribe)?;

        if !request.recurring_charge_amount.is_positive() {
            return Err(ChargekitError::platform(
                "Invalid recurring charge",
                Some("The recurring charge must be greater than zero".to_string()),
            ));
        }
        if request.period_in_days == 0 {
            return Err(ChargekitError::platform(
                "Invalid period",
                Some("The period must be at least one day".to_string()),
            ));
        }

        let seq = state.next_sequence();
        let id = derive_hash(&format!("subscription:{}:{}", request.owner_address, seq));
        let info = SubscriptionInfo {
            id: id.clone(),
            payer_address: derive_address(&format!("payer:{}", request.owner_address)),
            recurring_charge_amount: request.recurring_charge_amount,
            period_in_days: request.period_in_days,
        };
        state.subscriptions.insert(
            id,
            MockSubscription {
                info: info.clone(),
                owner: request.owner_address.clone(),
                network: request.network,
                spent: Amount::zero(),
                period_start: Utc::now(),
                revoked: false,
            },
        );
        Ok(info)
    }

    async fn get_status(
        &self,
        subscription_id: &str,
        network: Network,
    ) -> Result<SubscriptionStatus> {
        let mut state = self.state();
        state.begin(PlatformOp::GetStatus)?;

        let sub = state
            .subscriptions
            .get_mut(subscription_id)
            .filter(|s| s.network == network)
            .ok_or_else(|| ChargekitError::not_found("subscription", subscription_id))?;
        sub.roll_period(Utc::now());

        if sub.revoked {
            return Ok(SubscriptionStatus {
                is_subscribed: false,
                remaining_charge_in_period: Some(Amount::zero()),
                next_period_start: None,
                owner: Some(sub.owner.clone()),
                payer: Some(sub.info.payer_address.clone()),
            });
        }

        Ok(SubscriptionStatus {
            is_subscribed: true,
            remaining_charge_in_period: Some(sub.remaining()),
            next_period_start: Some(sub.period_start + sub.period()),
            owner: Some(sub.owner.clone()),
            payer: Some(sub.info.payer_address.clone()),
        })
    }

    async fn charge(
        &self,
        request: &ChargeRequest,
        credentials: &Credentials,
    ) -> Result<ChargeReceipt> {
        let mut state = self.state();
        state.begin(PlatformOp::Charge)?;
        require_credentials(credentials)?;

        let wallet = state.wallet(&request.wallet_name)?;
        if state.gas_exhausted {
            return Err(ChargekitError::platform(
                INSUFFICIENT_GAS,
                Some(format!(
                    "Wallet {} does not hold enough native balance to pay for gas",
                    wallet.address
                )),
            ));
        }

        let seq = state.next_sequence();
        let sub = state
            .subscriptions
            .get_mut(&request.subscription_id)
            .filter(|s| s.network == request.network)
            .ok_or_else(|| ChargekitError::not_found("subscription", &request.subscription_id))?;
        check_owner(sub, &wallet)?;

        if sub.revoked {
            return Err(ChargekitError::platform(
                "Subscription is not active",
                Some("The subscription was revoked by its owner".to_string()),
            ));
        }
        if !request.amount.is_positive() {
            return Err(ChargekitError::platform("Invalid charge amount", None));
        }

        sub.roll_period(Utc::now());
        let remaining = sub.remaining();
        if !request.amount.is_within_limit(&remaining) {
            return Err(ChargekitError::platform(
                "Remaining spend limit exceeded",
                Some(format!(
                    "Requested {} but only {} remains in this period",
                    request.amount, remaining
                )),
            ));
        }

        sub.spent = sub
            .spent
            .checked_add(&request.amount)
            .ok_or_else(|| ChargekitError::Internal("charge total overflowed".to_string()))?;

        Ok(ChargeReceipt {
            id: derive_hash(&format!("charge:{}:{}", request.subscription_id, seq)),
            amount: request.amount,
            subscription_owner: wallet.address,
            subscription_id: request.subscription_id.clone(),
            recipient: request.recipient.clone(),
        })
    }

    async fn revoke(
        &self,
        request: &RevokeRequest,
        credentials: &Credentials,
    ) -> Result<RevokeResult> {
        let mut state = self.state();
        state.begin(PlatformOp::Revoke)?;
        require_credentials(credentials)?;

        let wallet = state.wallet(&request.wallet_name)?;
        let seq = state.next_sequence();
        let sub = state
            .subscriptions
            .get_mut(&request.subscription_id)
            .filter(|s| s.network == request.network)
            .ok_or_else(|| ChargekitError::not_found("subscription", &request.subscription_id))?;
        check_owner(sub, &wallet)?;

        if sub.revoked {
            return Err(ChargekitError::platform(
                "Subscription is already revoked",
                None,
            ));
        }
        sub.revoked = true;

        Ok(json!({
            "id": derive_hash(&format!("revoke:{}:{}", request.subscription_id, seq)),
            "subscriptionId": request.subscription_id,
            "status": "revoked",
        }))
    }
}
