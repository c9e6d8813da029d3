//! Command implementations.

pub mod charge;
pub mod reset;
pub mod revoke;
pub mod show;
pub mod status;
pub mod subscribe;
pub mod wallet;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use chargekit_demo_core::{
    ControllerConfig, FileStore, HttpBackend, IdentityRecords, SubscriptionController,
};
use chargekit_lib::{HttpPlatform, Network, PlatformConfig, SubscriptionPlatform};

use crate::platform::UnconfiguredPlatform;
use crate::ui;

/// Settings shared by every command.
pub struct Context {
    pub storage_dir: PathBuf,
    pub server: String,
    pub platform_url: Option<String>,
    pub network: Network,
    pub verbose: bool,
}

impl Context {
    pub fn records(&self) -> IdentityRecords {
        IdentityRecords::new(Arc::new(FileStore::new(&self.storage_dir)))
    }

    fn platform(&self) -> Result<Arc<dyn SubscriptionPlatform>> {
        match &self.platform_url {
            Some(url) => {
                let config = PlatformConfig::new(url).with_network(self.network);
                let platform = HttpPlatform::new(config).context("Failed to create platform client")?;
                Ok(Arc::new(platform))
            }
            None => {
                tracing::debug!("no platform URL configured");
                Ok(Arc::new(UnconfiguredPlatform))
            }
        }
    }

    fn controller_config(&self, config: ControllerConfig) -> ControllerConfig {
        config
            .with_network(self.network)
            .with_status_refresh(self.platform_url.is_some())
    }

    /// Build a controller over the stored identity and run its startup
    /// restore, the same as a page load.
    ///
    /// Without a platform URL the post-operation status refresh is off, so an
    /// operation's own outcome is what gets reported.
    pub async fn open(&self, config: ControllerConfig) -> Result<SubscriptionController> {
        let backend = HttpBackend::new(&self.server).context("Failed to create backend client")?;
        let controller = SubscriptionController::new(
            self.platform()?,
            Arc::new(backend),
            self.records(),
            self.controller_config(config),
        );

        let spinner = ui::spinner("Loading identity...");
        controller.initialize().await;
        spinner.finish_and_clear();

        Ok(controller)
    }
}

/// Print the banner (if any) and the resulting state.
pub fn report(ctx: &Context, controller: &SubscriptionController) {
    let state = controller.snapshot();
    if let Some(banner) = &state.banner {
        ui::banner(banner);
    }
    ui::state(&state, ctx.verbose);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn context(platform_url: Option<&str>) -> Context {
        Context {
            storage_dir: PathBuf::from("."),
            server: "http://127.0.0.1:3000".to_string(),
            platform_url: platform_url.map(str::to_string),
            network: Network::Mainnet,
            verbose: false,
        }
    }

    #[test]
    fn test_refresh_needs_a_platform() {
        let config = context(None).controller_config(ControllerConfig::default());
        assert!(!config.refresh_status);
        assert_eq!(config.network, Network::Mainnet);

        let config = context(Some("http://platform.test")).controller_config(ControllerConfig::default());
        assert!(config.refresh_status);
    }
}
