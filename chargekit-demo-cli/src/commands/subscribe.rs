//! Subscribe command - let the server wallet charge this payer

use anyhow::Result;
use chargekit_demo_core::ControllerConfig;
use chargekit_lib::Amount;

use super::{report, Context};
use crate::ui;

#[tracing::instrument(skip(ctx))]
pub async fn run(ctx: &Context, amount: &str) -> Result<()> {
    let amount = match Amount::from_str_checked(amount) {
        Ok(a) if a.is_positive() => a,
        _ => {
            ui::error(&format!("Invalid amount: {}", amount));
            return Ok(());
        }
    };

    let controller = ctx
        .open(ControllerConfig::default().with_subscription_amount(amount))
        .await?;

    let spinner = ui::spinner("Creating subscription...");
    controller.create_subscription().await;
    spinner.finish_and_clear();

    report(ctx, &controller);
    Ok(())
}
