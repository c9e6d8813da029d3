//! Charge command - charge the subscription through the demo server

use anyhow::Result;
use chargekit_demo_core::ControllerConfig;
use chargekit_lib::Amount;

use super::{report, Context};
use crate::ui;

#[tracing::instrument(skip(ctx))]
pub async fn run(ctx: &Context, amount: &str, recipient: Option<String>) -> Result<()> {
    let amount = match Amount::from_str_checked(amount) {
        Ok(a) => a,
        Err(e) => {
            ui::error(&format!("Invalid amount: {}", e));
            return Ok(());
        }
    };

    let controller = ctx.open(ControllerConfig::default()).await?;

    let spinner = ui::spinner(&format!("Charging {}...", amount));
    controller.charge_subscription(Some(amount), recipient).await;
    spinner.finish_and_clear();

    if let Some(outcome) = controller.snapshot().operations.charge.succeeded() {
        ui::header("Charge");
        ui::key_value("Transaction", &outcome.transaction_hash);
        ui::key_value("Amount", &outcome.amount.to_string());
        ui::key_value("Owner", &outcome.subscription_owner);
        if let Some(recipient) = &outcome.recipient {
            ui::key_value("Recipient", recipient);
        }
        ui::separator();
    }

    report(ctx, &controller);
    Ok(())
}
