//! Apply one SQL migration script and confirm the columns it adds exist.
//!
//! Exit status is 1 on any failure, including a script that ran but left
//! expected columns missing.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;

use admin_core::domains::schema::{
    run_migration, ApplyMode, ExpectedColumn, RunOptions, SchemaReport, DEFAULT_SCRIPT_PATH,
};
use admin_core::kernel::{connect, init_tracing, with_pool};
use admin_core::DatabaseConfig;

#[derive(Parser)]
#[command(name = "run_migration")]
#[command(about = "Run a SQL migration script against the database")]
struct Cli {
    /// Path to the SQL script
    #[arg(long, short, default_value = DEFAULT_SCRIPT_PATH)]
    file: PathBuf,

    /// Column that must exist afterwards (table.column or schema.table.column)
    #[arg(long = "expect", value_name = "COLUMN")]
    expect: Vec<ExpectedColumn>,

    /// Wrap the script in an explicit transaction
    #[arg(long)]
    transaction: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let cli = Cli::parse();
    let result = run(cli).await;

    match &result {
        Ok(report) => print_report(report),
        Err(e) => {
            tracing::error!(error = %e, "Migration failed");
            eprintln!("{} {}", "❌ Migration failed:".red().bold(), e);
            eprintln!("{:?}", e);
        }
    }

    ExitCode::from(exit_status(&result))
}

/// 0 only when the script ran and every expected column was found.
fn exit_status(result: &Result<SchemaReport>) -> u8 {
    match result {
        Ok(_) => 0,
        Err(_) => 1,
    }
}

async fn run(cli: Cli) -> Result<SchemaReport> {
    let options = RunOptions {
        path: cli.file,
        extra_expectations: cli.expect,
        mode: if cli.transaction {
            ApplyMode::Transaction
        } else {
            ApplyMode::Batch
        },
    };

    let config = DatabaseConfig::from_env().context("Failed to load configuration")?;
    let pool = connect(&config).await?;

    with_pool(pool, |pool| async move {
        run_migration(options, &pool).await.map_err(Into::into)
    })
    .await
}

fn print_report(report: &SchemaReport) {
    println!(
        "{} {}",
        "✅ Migration applied:".green().bold(),
        report.path.display()
    );
    println!("   Rows affected: {}", report.rows_affected);

    if report.verified.is_empty() {
        println!("   No column additions declared; nothing to verify");
        return;
    }

    println!("   Verified columns:");
    for column in &report.verified {
        println!("   - {}", column);
    }
}
