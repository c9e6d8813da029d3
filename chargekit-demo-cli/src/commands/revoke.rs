//! Revoke command - cancel the subscription through the demo server

use anyhow::Result;
use chargekit_demo_core::ControllerConfig;

use super::{report, Context};
use crate::ui;

#[tracing::instrument(skip(ctx))]
pub async fn run(ctx: &Context, yes: bool) -> Result<()> {
    let controller = ctx.open(ControllerConfig::default()).await?;

    if let Some(sub) = controller.snapshot().subscription {
        if !yes && !ui::confirm(&format!("Revoke subscription {}?", sub.id))? {
            ui::info("Cancelled");
            return Ok(());
        }
    }

    let spinner = ui::spinner("Revoking subscription...");
    controller.revoke_subscription().await;
    spinner.finish_and_clear();

    report(ctx, &controller);
    Ok(())
}
