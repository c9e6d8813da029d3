//! Chargekit demo server
//!
//! Serves the `/API/*` endpoints backed by the platform gateway.

use std::sync::Arc;

use anyhow::{Context, Result};
use chargekit_demo_server::{router, AppState, ServerConfig};
use chargekit_lib::SubscriptionPlatform;
use clap::Parser;

#[derive(Parser)]
#[command(name = "chargekit-server")]
#[command(about = "Chargekit demo server - wallet, charge and revoke endpoints", long_about = None)]
#[command(version)]
struct Cli {
    /// Address to listen on (overrides CHARGEKIT_BIND)
    #[arg(long)]
    bind: Option<String>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[cfg(feature = "http-platform")]
fn build_platform(config: &ServerConfig) -> Result<Arc<dyn SubscriptionPlatform>> {
    use chargekit_lib::{HttpPlatform, PlatformConfig};

    let api_url = config
        .platform_url
        .clone()
        .context("PLATFORM_API_URL is not set")?;
    let platform = HttpPlatform::new(PlatformConfig::new(api_url).with_network(config.network))
        .context("Failed to create platform client")?;
    Ok(Arc::new(platform))
}

#[cfg(not(feature = "http-platform"))]
fn build_platform(_config: &ServerConfig) -> Result<Arc<dyn SubscriptionPlatform>> {
    anyhow::bail!("built without the http-platform feature; no platform is available")
}

#[tokio::main]
async fn main() -> Result<()> {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();

    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("chargekit_demo_server=debug,chargekit_lib=debug")
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter("chargekit_demo_server=info,chargekit_lib=warn")
            .init();
    }

    let mut config = ServerConfig::from_env().context("Invalid server configuration")?;
    if let Some(bind) = cli.bind {
        config = config.with_bind(bind);
    }
    if !config.credentials.is_complete() {
        tracing::warn!("platform credentials are incomplete; wallet, charge and revoke will fail");
    }

    let platform = build_platform(&config)?;
    let app = router(AppState::from_config(platform, &config));

    let listener = tokio::net::TcpListener::bind(&config.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind))?;
    tracing::info!(
        bind = %config.bind,
        network = config.network.as_str(),
        wallet_name = %config.wallet_name,
        "chargekit server listening"
    );

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await
        .context("Server error")?;

    Ok(())
}
