//! Terminal output helpers.

use chargekit_demo_core::{Banner, ControllerState, OperationError, OperationKind, Tone};
use colored::Colorize;
use dialoguer::Confirm;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

pub fn success(msg: &str) {
    println!("{} {}", "✓".green().bold(), msg);
}

pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red().bold(), msg);
}

pub fn info(msg: &str) {
    println!("{} {}", "ℹ".blue(), msg);
}

pub fn warning(msg: &str) {
    println!("{} {}", "⚠".yellow(), msg);
}

pub fn header(msg: &str) {
    println!("\n{}", msg.bold().underline());
}

pub fn key_value(key: &str, value: &str) {
    println!("  {}: {}", key.cyan(), value);
}

pub fn spinner(msg: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    pb.set_message(msg.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

pub fn confirm(prompt: &str) -> anyhow::Result<bool> {
    Ok(Confirm::new().with_prompt(prompt).default(false).interact()?)
}

pub fn separator() {
    println!("{}", "─".repeat(60).dimmed());
}

/// Print the outcome banner of the last operation.
pub fn banner(banner: &Banner) {
    match &banner.tone {
        Tone::Success(message) => success(message),
        Tone::Failure(err) if err.is_gas() => gas_error(err),
        Tone::Failure(err) => error(&err.to_string()),
    }
}

fn gas_error(err: &OperationError) {
    let OperationError::Structured {
        title,
        message,
        details,
        ..
    } = err
    else {
        error(&err.to_string());
        return;
    };

    eprintln!("{} {}", "⛽".yellow(), title.yellow().bold());
    eprintln!("  {}", message);
    if let Some(details) = details {
        eprintln!("  {}", details.dimmed());
    }
}

/// Print the stored identity, live status and per-operation progress.
pub fn state(state: &ControllerState, verbose: bool) {
    header("Wallet");
    match &state.wallet {
        Some(wallet) => {
            key_value("Address", &wallet.address);
            if let Some(name) = &wallet.wallet_name {
                key_value("Name", name);
            }
        }
        None => info("No wallet yet. Run `chargekit-demo wallet`."),
    }

    header("Subscription");
    match &state.subscription {
        Some(sub) => {
            key_value("ID", &sub.id);
            key_value("Payer", &sub.payer_address);
            key_value(
                "Allowance",
                &format!("{} every {} days", sub.recurring_charge_amount, sub.period_in_days),
            );
        }
        None => info("No subscription yet. Run `chargekit-demo subscribe`."),
    }

    if let Some(status) = &state.status {
        header("Status");
        let active = if status.is_subscribed {
            "active".green().to_string()
        } else {
            "inactive".red().to_string()
        };
        key_value("State", &active);
        if let Some(remaining) = &status.remaining_charge_in_period {
            key_value("Remaining this period", &remaining.to_string());
        }
        if let Some(next) = &status.next_period_start {
            key_value("Next period", &next.format("%Y-%m-%d %H:%M UTC").to_string());
        }
    }

    if verbose {
        header("Operations");
        for kind in OperationKind::ALL {
            key_value(kind.label(), state.operations.label(kind));
        }
    }
}
