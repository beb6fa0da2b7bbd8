use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use gz_reconcile::{EngineConfig, FallbackPolicy};
use gz_runtime::{LedgerService, ServiceConfig};
use gz_store::PgLedgerFeed;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "gz")]
#[command(about = "Gonza stock ledger reconciliation CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Database commands
    Db {
        #[command(subcommand)]
        cmd: DbCmd,
    },

    /// Full reconciliation for one product (entire history + sale lines)
    Reconcile {
        /// Product id (uuid)
        product_id: String,

        /// Surface unmatched ledger entries instead of dropping them
        #[arg(long, default_value_t = false)]
        strict: bool,
    },

    /// Windowed period summary for one product
    PeriodSummary {
        /// Product id (uuid)
        product_id: String,

        /// Window start, RFC 3339 (inclusive)
        #[arg(long)]
        from: DateTime<Utc>,

        /// Window end, RFC 3339 (exclusive)
        #[arg(long)]
        to: DateTime<Utc>,
    },

    /// Windowed period summary for every product in the catalog
    Report {
        /// Window start, RFC 3339 (inclusive)
        #[arg(long)]
        from: DateTime<Utc>,

        /// Window end, RFC 3339 (exclusive)
        #[arg(long)]
        to: DateTime<Utc>,
    },
}

#[derive(Subcommand)]
enum DbCmd {
    Status,

    /// Apply SQL migrations
    Migrate,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env.local if present (dev convenience).
    let _ = dotenvy::from_filename(".env.local");

    // Service-layer logs (report fan-out progress) go to stderr; results to
    // stdout stay machine-readable.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.cmd {
        Commands::Db { cmd } => {
            let pool = gz_store::connect_from_env().await?;
            match cmd {
                DbCmd::Status => {
                    let s = gz_store::status(&pool).await?;
                    println!(
                        "db_ok={} has_stock_history_table={}",
                        s.ok, s.has_stock_history_table
                    );
                }
                DbCmd::Migrate => {
                    gz_store::migrate(&pool).await?;
                    println!("migrations_applied=true");
                }
            }
        }

        Commands::Reconcile { product_id, strict } => {
            let product_id = parse_product_id(&product_id)?;
            let service = service_from_env(strict).await?;
            let result = service.reconcile(product_id).await?;
            println!("{}", serde_json::to_string_pretty(&result)?);
        }

        Commands::PeriodSummary {
            product_id,
            from,
            to,
        } => {
            check_window(from, to)?;
            let product_id = parse_product_id(&product_id)?;
            let service = service_from_env(false).await?;
            let row = service.period_summary(product_id, from, to).await?;
            println!("{}", serde_json::to_string_pretty(&row)?);
        }

        Commands::Report { from, to } => {
            check_window(from, to)?;
            let service = service_from_env(false).await?;
            let rows = service.catalog_period_report(from, to).await?;
            println!("row_count={}", rows.len());
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
    }

    Ok(())
}

async fn service_from_env(strict: bool) -> Result<LedgerService> {
    let pool = gz_store::connect_from_env().await?;
    let feed = Arc::new(PgLedgerFeed::new(pool));

    let mut config = ServiceConfig::from_env();
    if strict {
        config.engine = EngineConfig {
            fallback: FallbackPolicy::Strict,
            ..config.engine
        };
    }

    Ok(LedgerService::new(feed, config))
}

fn parse_product_id(raw: &str) -> Result<Uuid> {
    Uuid::parse_str(raw.trim()).context("invalid product_id uuid")
}

fn check_window(from: DateTime<Utc>, to: DateTime<Utc>) -> Result<()> {
    if from >= to {
        anyhow::bail!("window requires from < to (got from={from} to={to})");
    }
    Ok(())
}
