//! Wallet command - provision the server wallet

use anyhow::Result;
use chargekit_demo_core::ControllerConfig;

use super::{report, Context};
use crate::ui;

#[tracing::instrument(skip(ctx))]
pub async fn run(ctx: &Context) -> Result<()> {
    let controller = ctx.open(ControllerConfig::default()).await?;

    if let Some(wallet) = controller.snapshot().wallet {
        ui::info(&format!("Wallet already stored: {}", wallet.address));
        return Ok(());
    }

    let spinner = ui::spinner("Creating wallet...");
    controller.create_wallet().await;
    spinner.finish_and_clear();

    report(ctx, &controller);
    Ok(())
}
