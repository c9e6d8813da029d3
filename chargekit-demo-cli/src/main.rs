//! Chargekit Demo CLI
//!
//! Terminal front-end for the Chargekit subscription demo. Every invocation is
//! one "page load": identity is restored from the storage directory, status is
//! fetched if a subscription exists, the command runs, and the resulting state
//! is printed.

use anyhow::Result;
use chargekit_lib::Network;
use clap::{Parser, Subcommand};

mod commands;
mod platform;
mod ui;

#[derive(Parser)]
#[command(name = "chargekit-demo")]
#[command(about = "Chargekit Demo CLI - wallets, subscriptions and charges on a custodial platform", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Custom storage directory
    #[arg(long, global = true, env = "CHARGEKIT_DEMO_DIR")]
    storage_dir: Option<String>,

    /// Base URL of the Chargekit demo server
    #[arg(long, global = true, default_value = "http://127.0.0.1:3000")]
    server: String,

    /// Platform gateway URL for subscribe and status calls
    #[arg(long, global = true, env = "PLATFORM_API_URL")]
    platform_url: Option<String>,

    /// Network to subscribe and query on
    #[arg(long, global = true, default_value = "testnet")]
    network: Network,
}

#[derive(Subcommand)]
enum Commands {
    /// Create (or fetch) the server wallet
    Wallet,

    /// Subscribe the wallet to a recurring charge
    Subscribe {
        /// Allowance per period
        #[arg(short, long, default_value = "19.99")]
        amount: String,
    },

    /// Fetch live subscription status
    Status {
        /// Subscription to query instead of the stored one
        #[arg(long)]
        id: Option<String>,
    },

    /// Charge the subscription
    Charge {
        /// Amount to charge
        #[arg(short, long, default_value = "1.00")]
        amount: String,

        /// Address receiving the funds
        #[arg(short, long)]
        recipient: Option<String>,
    },

    /// Revoke the subscription
    Revoke {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Show stored identity and live status
    Show,

    /// Forget the stored wallet and subscription
    Reset {
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter("chargekit_demo_cli=debug,chargekit_demo_core=debug,chargekit_lib=debug")
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter("chargekit_demo_cli=info,chargekit_demo_core=warn,chargekit_lib=warn")
            .init();
    }

    // Setup storage directory
    let storage_dir = if let Some(dir) = cli.storage_dir {
        std::path::PathBuf::from(dir)
    } else {
        dirs::data_local_dir()
            .unwrap_or_else(|| std::path::PathBuf::from("."))
            .join("chargekit-demo")
    };

    let ctx = commands::Context {
        storage_dir,
        server: cli.server,
        platform_url: cli.platform_url,
        network: cli.network,
        verbose: cli.verbose,
    };

    // Dispatch commands
    match cli.command {
        Commands::Wallet => {
            commands::wallet::run(&ctx).await?;
        }
        Commands::Subscribe { amount } => {
            commands::subscribe::run(&ctx, &amount).await?;
        }
        Commands::Status { id } => {
            commands::status::run(&ctx, id.as_deref()).await?;
        }
        Commands::Charge { amount, recipient } => {
            commands::charge::run(&ctx, &amount, recipient).await?;
        }
        Commands::Revoke { yes } => {
            commands::revoke::run(&ctx, yes).await?;
        }
        Commands::Show => {
            commands::show::run(&ctx).await?;
        }
        Commands::Reset { yes } => {
            commands::reset::run(&ctx, yes).await?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from(["chargekit-demo", "charge"]).unwrap();
        assert_eq!(cli.server, "http://127.0.0.1:3000");
        assert_eq!(cli.network, Network::Testnet);
        match cli.command {
            Commands::Charge { amount, recipient } => {
                assert_eq!(amount, "1.00");
                assert!(recipient.is_none());
            }
            _ => panic!("expected charge"),
        }
    }
}
