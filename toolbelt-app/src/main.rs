use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use toolbelt_app::config::AppConfig;
use toolbelt_app::screens::DashboardScreen;
use toolbelt_app::{logging, screens::ReportsScreen};
use toolbelt_core::db::RepositoryRegistry;
use toolbelt_core::pricing::common::format_money;
use toolbelt_db_sqlite::SqliteRepositoryFactory;
use tracing::info;

/// Operations dashboard for a small service business.
#[derive(Parser, Debug)]
#[command(name = "toolbelt")]
struct Args {
    /// Path to the TOML config file.
    #[arg(long, default_value = "toolbelt.toml")]
    config: PathBuf,

    /// Override the configured database connection string.
    #[arg(long)]
    database: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let config = AppConfig::load(&args.config)?;
    logging::init(&config.logging.level, config.logging.file.as_deref())?;

    let mut db_config = config.db_config();
    if let Some(database) = args.database {
        db_config.connection_string = database;
    }

    let mut registry = RepositoryRegistry::new();
    registry.register(Box::new(SqliteRepositoryFactory));
    let repo: Arc<dyn toolbelt_core::OpsRepository> = Arc::from(
        registry
            .create(&db_config)
            .await
            .context("failed to open repository")?,
    );
    info!(backend = %db_config.backend, "repository ready");

    let now = Utc::now();
    let dashboard = DashboardScreen::open(repo.clone()).await?;
    let metrics = dashboard.metrics(now);

    println!("Today's jobs:       {}", metrics.todays_jobs);
    println!("Pending estimates:  {}", metrics.pending_estimates);
    println!("Payments this month: {}", metrics.recent_payments);
    println!("Total earnings:     {}", format_money(metrics.total_earnings));

    let today = now.date_naive();
    let schedule = dashboard.todays_schedule(today);
    if schedule.is_empty() {
        println!("\nNo jobs scheduled for today.");
    } else {
        println!("\nToday's schedule:");
        for job in schedule {
            println!(
                "  {} - {} ({}) [{}]",
                job.scheduled_at.format("%H:%M"),
                job.client_name,
                job.service_type,
                job.status.as_str()
            );
        }
    }

    let reports = ReportsScreen::open(repo).await?;
    let by_service = reports.revenue_by_service();
    if !by_service.is_empty() {
        println!("\nRevenue by service:");
        for (service, total) in by_service {
            println!("  {service}: {}", format_money(total));
        }
    }

    Ok(())
}
