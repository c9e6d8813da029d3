//! Reset command - forget the stored wallet and subscription

use anyhow::Result;

use super::Context;
use crate::ui;

#[tracing::instrument(skip(ctx))]
pub async fn run(ctx: &Context, yes: bool) -> Result<()> {
    if !yes && !ui::confirm("Forget the stored wallet and subscription?")? {
        ui::info("Cancelled");
        return Ok(());
    }

    ctx.records().clear()?;
    ui::success("Stored identity cleared");
    ui::warning("The subscription stays active on the platform until revoked");
    Ok(())
}
