//! HTTP endpoints proxying to the wallet/subscription platform.
//!
//! Each handler re-derives everything it needs (wallet name, credentials,
//! network) from [`AppState`] and makes exactly one platform call. Platform
//! failures are caught and returned as structured JSON; nothing escapes as an
//! unhandled error. A failure is a 400 when the caller caused it (invalid
//! data) and a 500 otherwise.
//!
//! | Route | Success | Failure |
//! |---|---|---|
//! | `POST /API/create-wallet` | `{address, walletName, message}` | 400/500 `{error}` |
//! | `POST /API/charge-subscription` | `{success, transactionHash, amount, subscriptionOwner, message, subscriptionId, recipient?}` | 400/500 `{success:false, error, details?}` |
//! | `POST /API/revoke-subscription` | `{success, subscriptionId, message, revokeResult}` | 400 `{error}`, 500 `{success:false, error}` |

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::instrument;
use uuid::Uuid;

use chargekit_lib::{
    Amount, ChargeReceipt, ChargeRequest, ChargekitError, RevokeRequest, RevokeResult,
    DEFAULT_CHARGE_AMOUNT,
};

use crate::state::AppState;

/// Body of `POST /API/charge-subscription`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChargeBody {
    #[serde(default)]
    pub subscription_id: Option<String>,
    #[serde(default)]
    pub amount: Option<String>,
    #[serde(default)]
    pub recipient: Option<String>,
}

/// Body of `POST /API/revoke-subscription`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevokeBody {
    #[serde(default)]
    pub subscription_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletResponse {
    pub address: String,
    pub wallet_name: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChargeResponse {
    pub success: bool,
    pub transaction_hash: String,
    pub amount: Amount,
    pub subscription_owner: String,
    pub message: String,
    pub subscription_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient: Option<String>,
}

impl From<ChargeReceipt> for ChargeResponse {
    fn from(receipt: ChargeReceipt) -> Self {
        Self {
            success: true,
            message: format!(
                "Charged {} to subscription {}",
                receipt.amount, receipt.subscription_id
            ),
            transaction_hash: receipt.id,
            amount: receipt.amount,
            subscription_owner: receipt.subscription_owner,
            subscription_id: receipt.subscription_id,
            recipient: receipt.recipient,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RevokeResponse {
    pub success: bool,
    pub subscription_id: String,
    pub message: String,
    pub revoke_result: RevokeResult,
}

/// Error payload. `success` is omitted where the endpoint's error shape has none.
#[derive(Debug, Serialize)]
pub struct ErrorBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorBody {
    fn plain(error: impl Into<String>) -> Self {
        Self {
            success: None,
            error: error.into(),
            details: None,
        }
    }

    fn failed(error: impl Into<String>) -> Self {
        Self {
            success: Some(false),
            error: error.into(),
            details: None,
        }
    }

    /// Forward a platform failure with its message untouched.
    fn from_platform(err: &ChargekitError) -> Self {
        Self {
            success: Some(false),
            error: err.to_string(),
            details: err.details().map(str::to_string),
        }
    }
}

fn reply(status: StatusCode, body: ErrorBody) -> Response {
    (status, Json(body)).into_response()
}

/// 400 for errors the caller caused, 500 for everything else.
fn status_for(err: &ChargekitError) -> StatusCode {
    if err.is_client_error() {
        StatusCode::BAD_REQUEST
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

/// Trimmed, non-empty subscription id.
fn required_id(raw: Option<String>) -> Option<String> {
    raw.map(|id| id.trim().to_string()).filter(|id| !id.is_empty())
}

/// `POST /API/create-wallet`: Provision (or look up) the server wallet.
///
/// Any request body is ignored. Repeated calls return the same wallet.
#[instrument(skip_all)]
pub async fn post_create_wallet(State(state): State<AppState>) -> Response {
    let request_id = Uuid::new_v4();
    tracing::info!(
        event = "create_wallet_start",
        request_id = %request_id,
        wallet_name = %state.wallet_name,
        "provisioning server wallet"
    );

    match state
        .platform
        .create_or_get_wallet(&state.wallet_name, &state.credentials)
        .await
    {
        Ok(wallet) => {
            tracing::info!(
                event = "create_wallet_completed",
                request_id = %request_id,
                address = %wallet.address,
                "server wallet ready"
            );
            let wallet_name = wallet
                .wallet_name
                .unwrap_or_else(|| state.wallet_name.to_string());
            Json(WalletResponse {
                message: format!("Wallet {} is ready", wallet_name),
                address: wallet.address,
                wallet_name,
            })
            .into_response()
        }
        Err(err) => {
            tracing::error!(
                event = "create_wallet_failed",
                request_id = %request_id,
                code = err.code() as i32,
                error = %err,
                "failed to provision server wallet"
            );
            reply(status_for(&err), ErrorBody::plain(err.to_string()))
        }
    }
}

/// `POST /API/charge-subscription`: Charge a subscription with the server wallet.
///
/// `amount` defaults to `"1.00"`. Platform errors are returned verbatim so
/// clients can recognise specific failures such as insufficient gas.
#[instrument(skip_all)]
pub async fn post_charge_subscription(
    State(state): State<AppState>,
    body: Result<Json<ChargeBody>, JsonRejection>,
) -> Response {
    let request_id = Uuid::new_v4();

    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => {
            tracing::warn!(
                event = "charge_rejected",
                request_id = %request_id,
                reason = %rejection.body_text(),
                "unreadable charge request"
            );
            return reply(
                StatusCode::BAD_REQUEST,
                ErrorBody::failed(format!("Invalid request body: {}", rejection.body_text())),
            );
        }
    };

    let Some(subscription_id) = required_id(body.subscription_id) else {
        return reply(
            StatusCode::BAD_REQUEST,
            ErrorBody::failed("subscriptionId is required"),
        );
    };

    let raw_amount = body
        .amount
        .filter(|a| !a.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_CHARGE_AMOUNT.to_string());
    let amount = match Amount::from_str_checked(&raw_amount) {
        Ok(amount) => amount,
        Err(reason) => {
            let err = ChargekitError::invalid_data("amount", reason);
            return reply(status_for(&err), ErrorBody::failed(err.to_string()));
        }
    };

    let request = ChargeRequest {
        subscription_id,
        amount,
        network: state.network,
        wallet_name: state.wallet_name.to_string(),
        recipient: body.recipient.filter(|r| !r.trim().is_empty()),
    };

    tracing::info!(
        event = "charge_start",
        request_id = %request_id,
        subscription_id = %request.subscription_id,
        amount = %request.amount,
        recipient = ?request.recipient,
        "processing charge request"
    );

    match state.platform.charge(&request, &state.credentials).await {
        Ok(receipt) => {
            tracing::info!(
                event = "charge_completed",
                request_id = %request_id,
                subscription_id = %receipt.subscription_id,
                transaction = %receipt.id,
                "subscription charged"
            );
            Json(ChargeResponse::from(receipt)).into_response()
        }
        Err(err) => {
            tracing::error!(
                event = "charge_failed",
                request_id = %request_id,
                subscription_id = %request.subscription_id,
                code = err.code() as i32,
                error = %err,
                details = ?err.details(),
                "platform charge failed"
            );
            reply(status_for(&err), ErrorBody::from_platform(&err))
        }
    }
}

/// `POST /API/revoke-subscription`: Cancel a subscription with the server wallet.
///
/// The platform's revoke result is passed through as `revokeResult`.
#[instrument(skip_all)]
pub async fn post_revoke_subscription(
    State(state): State<AppState>,
    body: Result<Json<RevokeBody>, JsonRejection>,
) -> Response {
    let request_id = Uuid::new_v4();

    let body = match body {
        Ok(Json(body)) => body,
        Err(rejection) => {
            tracing::warn!(
                event = "revoke_rejected",
                request_id = %request_id,
                reason = %rejection.body_text(),
                "unreadable revoke request"
            );
            return reply(
                StatusCode::BAD_REQUEST,
                ErrorBody::plain(format!("Invalid request body: {}", rejection.body_text())),
            );
        }
    };

    let Some(subscription_id) = required_id(body.subscription_id) else {
        return reply(
            StatusCode::BAD_REQUEST,
            ErrorBody::plain("subscriptionId is required"),
        );
    };

    let request = RevokeRequest {
        subscription_id,
        network: state.network,
        wallet_name: state.wallet_name.to_string(),
    };

    tracing::info!(
        event = "revoke_start",
        request_id = %request_id,
        subscription_id = %request.subscription_id,
        "processing revoke request"
    );

    match state.platform.revoke(&request, &state.credentials).await {
        Ok(revoke_result) => {
            tracing::info!(
                event = "revoke_completed",
                request_id = %request_id,
                subscription_id = %request.subscription_id,
                "subscription revoked"
            );
            Json(RevokeResponse {
                success: true,
                message: format!("Subscription {} revoked", request.subscription_id),
                subscription_id: request.subscription_id,
                revoke_result,
            })
            .into_response()
        }
        Err(err) => {
            tracing::error!(
                event = "revoke_failed",
                request_id = %request_id,
                subscription_id = %request.subscription_id,
                code = err.code() as i32,
                error = %err,
                "platform revoke failed"
            );
            reply(status_for(&err), ErrorBody::failed(err.to_string()))
        }
    }
}
