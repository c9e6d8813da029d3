//! In-process stand-in for the demo server.

use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chargekit_lib::{
    Amount, ChargeRequest, ChargekitError, Credentials, Network, RevokeRequest,
    SubscriptionPlatform,
};

use crate::backend::{BackendApi, BackendError, ChargeOutcome, RevokeConfirmation, WalletCreated};
use crate::operation::OperationKind;

#[derive(Default)]
struct Script {
    calls: Vec<OperationKind>,
    failures: HashMap<OperationKind, VecDeque<BackendError>>,
}

/// Backend that calls the platform directly with server credentials.
pub struct MockBackend {
    platform: Arc<dyn SubscriptionPlatform>,
    credentials: Credentials,
    wallet_name: String,
    network: Network,
    script: Mutex<Script>,
}

impl MockBackend {
    pub fn new(
        platform: Arc<dyn SubscriptionPlatform>,
        credentials: Credentials,
        wallet_name: impl Into<String>,
    ) -> Arc<Self> {
        Arc::new(Self {
            platform,
            credentials,
            wallet_name: wallet_name.into(),
            network: Network::Testnet,
            script: Mutex::new(Script::default()),
        })
    }

    fn script(&self) -> MutexGuard<'_, Script> {
        self.script.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Answer the next call of `op` with `error` instead of reaching the platform.
    pub fn fail_next(&self, op: OperationKind, error: BackendError) {
        self.script().failures.entry(op).or_default().push_back(error);
    }

    /// Number of calls of `op` received.
    pub fn call_count(&self, op: OperationKind) -> usize {
        self.script().calls.iter().filter(|c| **c == op).count()
    }

    fn begin(&self, op: OperationKind) -> Result<(), BackendError> {
        let mut script = self.script();
        script.calls.push(op);
        match script.failures.get_mut(&op).and_then(VecDeque::pop_front) {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Shape the server gives platform failures.
fn rejected(err: ChargekitError) -> BackendError {
    BackendError::Rejected {
        status: 500,
        error: err.to_string(),
        details: err.details().map(str::to_string),
    }
}

#[async_trait]
impl BackendApi for MockBackend {
    async fn create_wallet(&self) -> Result<WalletCreated, BackendError> {
        self.begin(OperationKind::Wallet)?;
        let wallet = self
            .platform
            .create_or_get_wallet(&self.wallet_name, &self.credentials)
            .await
            .map_err(rejected)?;
        Ok(WalletCreated {
            address: wallet.address,
            wallet_name: Some(self.wallet_name.clone()),
            message: Some(format!("Wallet {} is ready", self.wallet_name)),
        })
    }

    async fn charge_subscription(
        &self,
        subscription_id: &str,
        amount: &Amount,
        recipient: Option<&str>,
    ) -> Result<ChargeOutcome, BackendError> {
        self.begin(OperationKind::Charge)?;
        let request = ChargeRequest {
            subscription_id: subscription_id.to_string(),
            amount: *amount,
            network: self.network,
            wallet_name: self.wallet_name.clone(),
            recipient: recipient.map(str::to_string),
        };
        let receipt = self
            .platform
            .charge(&request, &self.credentials)
            .await
            .map_err(rejected)?;
        Ok(ChargeOutcome {
            message: Some(format!("Charged {}", receipt.amount)),
            transaction_hash: receipt.id,
            amount: receipt.amount,
            subscription_owner: receipt.subscription_owner,
            subscription_id: receipt.subscription_id,
            recipient: receipt.recipient,
        })
    }

    async fn revoke_subscription(
        &self,
        subscription_id: &str,
    ) -> Result<RevokeConfirmation, BackendError> {
        self.begin(OperationKind::Revoke)?;
        let request = RevokeRequest {
            subscription_id: subscription_id.to_string(),
            network: self.network,
            wallet_name: self.wallet_name.clone(),
        };
        let revoke_result = self
            .platform
            .revoke(&request, &self.credentials)
            .await
            .map_err(rejected)?;
        Ok(RevokeConfirmation {
            subscription_id: subscription_id.to_string(),
            message: Some(format!("Subscription {} revoked", subscription_id)),
            revoke_result,
        })
    }
}
