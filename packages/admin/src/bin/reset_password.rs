//! Operator utility: overwrite the password hash of one account.
//!
//! Exits 0 whether or not the reset succeeded; failures are reported on the
//! console and in the log.

use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use dialoguer::{theme::ColorfulTheme, Password};

use admin_core::common::NewCredential;
use admin_core::domains::accounts::{reset_password, ResetOutcome, ResetRequest};
use admin_core::kernel::{connect, init_tracing, with_pool};
use admin_core::DatabaseConfig;

#[derive(Parser)]
#[command(name = "reset_password")]
#[command(about = "Overwrite the stored password hash of one account")]
struct Cli {
    /// Email identifying the account
    #[arg(long)]
    email: String,

    /// New password in plain text; hashed with Argon2id before storing
    #[arg(long, conflicts_with = "hash")]
    password: Option<String>,

    /// Pre-computed PHC hash to store as is
    #[arg(long)]
    hash: Option<String>,

    /// Do not list existing accounts when the email is unknown
    #[arg(long)]
    no_list: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let cli = Cli::parse();
    let result = run(cli).await;

    if let Err(e) = &result {
        tracing::error!(error = %e, "Password reset failed");
        eprintln!("{} {:#}", "❌ Error resetting password:".red().bold(), e);
    }

    ExitCode::from(exit_status(&result))
}

/// Failures are reported, never signalled through the exit status.
fn exit_status(_result: &Result<()>) -> u8 {
    0
}

async fn run(cli: Cli) -> Result<()> {
    let credential = match (cli.password, cli.hash) {
        (Some(password), _) => NewCredential::Plaintext(password),
        (None, Some(hash)) => NewCredential::Hash(hash),
        (None, None) => NewCredential::Plaintext(prompt_password()?),
    };
    let credential = credential.prepare()?;

    let request = ResetRequest {
        email: cli.email,
        credential,
        list_on_miss: !cli.no_list,
    };

    let config = DatabaseConfig::from_env().context("Failed to load configuration")?;
    let pool = connect(&config).await?;

    let outcome = with_pool(pool, |pool| async move {
        reset_password(request, &pool).await
    })
    .await?;

    print_outcome(&outcome, !cli.no_list);
    Ok(())
}

fn prompt_password() -> Result<String> {
    Password::with_theme(&ColorfulTheme::default())
        .with_prompt("New password")
        .with_confirmation("Confirm password", "Passwords do not match")
        .interact()
        .context("Failed to read password")
}

fn print_outcome(outcome: &ResetOutcome, listed: bool) {
    match outcome {
        ResetOutcome::Updated { email, plaintext } => {
            println!("{} {}", "✅ Password updated for".green().bold(), email);
            match plaintext {
                Some(plaintext) => println!("   New password: {}", plaintext.bright_yellow()),
                None => println!("   Stored the supplied hash"),
            }
        }
        ResetOutcome::NotFound {
            email,
            known_emails,
        } => {
            println!("{} {}", "❌ Account not found:".red().bold(), email);
            if !listed {
                return;
            }
            if known_emails.is_empty() {
                println!("   No accounts exist yet");
            } else {
                println!("   Existing accounts:");
                for known in known_emails {
                    println!("   - {}", known);
                }
            }
        }
    }
}
