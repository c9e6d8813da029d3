//! Status command - fetch live subscription state

use anyhow::Result;
use chargekit_demo_core::ControllerConfig;

use super::{report, Context};
use crate::ui;

#[tracing::instrument(skip(ctx))]
pub async fn run(ctx: &Context, subscription_id: Option<&str>) -> Result<()> {
    let controller = ctx.open(ControllerConfig::default()).await?;

    // A restored subscription was already queried while loading
    let fetched = controller.snapshot().operations.status.succeeded().is_some();
    if subscription_id.is_some() || !fetched {
        let spinner = ui::spinner("Fetching status...");
        controller.get_status(subscription_id).await;
        spinner.finish_and_clear();
    }

    report(ctx, &controller);
    if let Some(err) = controller.snapshot().operations.status.error() {
        tracing::debug!(error = %err, "status fetch failed");
        ui::warning("Status could not be fetched");
    }
    Ok(())
}
