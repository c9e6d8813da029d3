//! Show command - print stored identity and live status

use anyhow::Result;
use chargekit_demo_core::{ControllerConfig, FileStore};

use super::{report, Context};
use crate::ui;

#[tracing::instrument(skip(ctx))]
pub async fn run(ctx: &Context) -> Result<()> {
    let controller = ctx.open(ControllerConfig::default()).await?;

    ui::header("Chargekit Demo");
    ui::key_value(
        "Storage",
        &FileStore::new(&ctx.storage_dir).path().display().to_string(),
    );
    ui::key_value("Server", &ctx.server);
    ui::key_value("Network", ctx.network.as_str());
    ui::separator();

    report(ctx, &controller);
    Ok(())
}
