//! Versioned wallet and subscription records.
//!
//! Each record lives under a fixed key as an envelope:
//!
//! ```json
//! {"version": 1, "record": {"address": "0x...", "walletName": "..."}}
//! ```
//!
//! Records written before versioning (the bare camelCase object) are read as
//! version 1 and rewritten in the envelope format. Anything else that does not
//! decode is reported as [`StoreError::Malformed`]; deciding to discard it is
//! the caller's job.

use std::sync::Arc;

use chargekit_lib::{SubscriptionInfo, WalletInfo};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::store::{KeyValueStore, StoreError, StoreResult};

/// Key of the wallet record.
pub const WALLET_KEY: &str = "chargekit_wallet";
/// Key of the subscription record.
pub const SUBSCRIPTION_KEY: &str = "chargekit_subscription";
/// Version written by this build.
pub const RECORD_VERSION: u64 = 1;

#[derive(Serialize, Deserialize)]
struct Envelope<T> {
    version: u64,
    record: T,
}

/// Typed access to the two identity records.
#[derive(Clone)]
pub struct IdentityRecords {
    store: Arc<dyn KeyValueStore>,
}

impl IdentityRecords {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn load_wallet(&self) -> StoreResult<Option<WalletInfo>> {
        self.load(WALLET_KEY)
    }

    pub fn save_wallet(&self, wallet: &WalletInfo) -> StoreResult<()> {
        self.save(WALLET_KEY, wallet)
    }

    pub fn load_subscription(&self) -> StoreResult<Option<SubscriptionInfo>> {
        self.load(SUBSCRIPTION_KEY)
    }

    pub fn save_subscription(&self, subscription: &SubscriptionInfo) -> StoreResult<()> {
        self.save(SUBSCRIPTION_KEY, subscription)
    }

    /// Drop a record, e.g. after it failed to load.
    pub fn discard(&self, key: &str) -> StoreResult<()> {
        self.store.remove(key)
    }

    /// Remove both records.
    pub fn clear(&self) -> StoreResult<()> {
        self.store.remove(WALLET_KEY)?;
        self.store.remove(SUBSCRIPTION_KEY)
    }

    fn save<T: Serialize>(&self, key: &str, record: &T) -> StoreResult<()> {
        let json = serde_json::to_string(&Envelope {
            version: RECORD_VERSION,
            record,
        })
        .map_err(|e| malformed(key, e))?;
        self.store.set(key, &json)
    }

    fn load<T>(&self, key: &str) -> StoreResult<Option<T>>
    where
        T: DeserializeOwned + Serialize,
    {
        let Some(raw) = self.store.get(key)? else {
            return Ok(None);
        };

        let mut value: Value = serde_json::from_str(&raw).map_err(|e| malformed(key, e))?;
        let Some(object) = value.as_object_mut() else {
            return Err(StoreError::Malformed {
                key: key.to_string(),
                reason: "record is not a JSON object".to_string(),
            });
        };

        match object.get("version").cloned() {
            Some(version) => {
                let found = version.as_u64().ok_or_else(|| StoreError::Malformed {
                    key: key.to_string(),
                    reason: format!("version {} is not a positive integer", version),
                })?;
                if found == 0 || found > RECORD_VERSION {
                    return Err(StoreError::UnsupportedVersion {
                        key: key.to_string(),
                        found,
                    });
                }
                let record = object.remove("record").ok_or_else(|| StoreError::Malformed {
                    key: key.to_string(),
                    reason: "envelope has no record".to_string(),
                })?;
                serde_json::from_value(record)
                    .map(Some)
                    .map_err(|e| malformed(key, e))
            }
            None => {
                let record: T = serde_json::from_value(value).map_err(|e| malformed(key, e))?;
                tracing::info!(key, version = RECORD_VERSION, "migrating unversioned record");
                self.save(key, &record)?;
                Ok(Some(record))
            }
        }
    }
}

fn malformed(key: &str, err: serde_json::Error) -> StoreError {
    StoreError::Malformed {
        key: key.to_string(),
        reason: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use chargekit_lib::Amount;

    fn records() -> (Arc<MemoryStore>, IdentityRecords) {
        let store = Arc::new(MemoryStore::new());
        (store.clone(), IdentityRecords::new(store))
    }

    fn subscription() -> SubscriptionInfo {
        SubscriptionInfo {
            id: "0xsub".to_string(),
            payer_address: "0xpayer".to_string(),
            recurring_charge_amount: Amount::from_str_checked("19.99").unwrap(),
            period_in_days: 30,
        }
    }

    #[test]
    fn test_save_writes_envelope() {
        let (store, records) = records();
        records
            .save_wallet(&WalletInfo::new("0xabc").with_name("shop"))
            .unwrap();

        let raw: Value = serde_json::from_str(&store.get(WALLET_KEY).unwrap().unwrap()).unwrap();
        assert_eq!(raw["version"], 1);
        assert_eq!(raw["record"]["address"], "0xabc");
        assert_eq!(raw["record"]["walletName"], "shop");
    }

    #[test]
    fn test_load_saved_records() {
        let (_, records) = records();
        assert_eq!(records.load_wallet().unwrap(), None);

        records.save_subscription(&subscription()).unwrap();
        assert_eq!(records.load_subscription().unwrap(), Some(subscription()));
    }

    #[test]
    fn test_legacy_record_is_migrated() {
        let (store, records) = records();
        store
            .set(
                SUBSCRIPTION_KEY,
                r#"{"id":"0xsub","payerAddress":"0xpayer","recurringChargeAmount":"19.99","periodInDays":30}"#,
            )
            .unwrap();

        assert_eq!(records.load_subscription().unwrap(), Some(subscription()));

        let raw: Value =
            serde_json::from_str(&store.get(SUBSCRIPTION_KEY).unwrap().unwrap()).unwrap();
        assert_eq!(raw["version"], 1);
        assert_eq!(raw["record"]["id"], "0xsub");
    }

    #[test]
    fn test_malformed_records() {
        let (store, records) = records();

        store.set(WALLET_KEY, "not json").unwrap();
        assert!(matches!(
            records.load_wallet(),
            Err(StoreError::Malformed { .. })
        ));

        store.set(WALLET_KEY, r#"{"walletName":"no address"}"#).unwrap();
        assert!(matches!(
            records.load_wallet(),
            Err(StoreError::Malformed { .. })
        ));

        store.set(WALLET_KEY, r#"{"version":1}"#).unwrap();
        assert!(matches!(
            records.load_wallet(),
            Err(StoreError::Malformed { .. })
        ));

        // Loading never drops anything by itself
        assert!(store.get(WALLET_KEY).unwrap().is_some());
        records.discard(WALLET_KEY).unwrap();
        assert_eq!(records.load_wallet().unwrap(), None);
    }

    #[test]
    fn test_newer_version_is_unsupported() {
        let (store, records) = records();
        store
            .set(WALLET_KEY, r#"{"version":7,"record":{"address":"0xabc"}}"#)
            .unwrap();
        assert_eq!(
            records.load_wallet(),
            Err(StoreError::UnsupportedVersion {
                key: WALLET_KEY.to_string(),
                found: 7
            })
        );
    }

    #[test]
    fn test_clear() {
        let (store, records) = records();
        records.save_wallet(&WalletInfo::new("0xabc")).unwrap();
        records.save_subscription(&subscription()).unwrap();
        records.clear().unwrap();
        assert!(store.is_empty());
    }
}
