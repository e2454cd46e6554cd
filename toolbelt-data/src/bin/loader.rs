use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use toolbelt_core::db::{DbConfig, RepositoryRegistry};
use toolbelt_data::CatalogLoader;
use toolbelt_db_sqlite::SqliteRepositoryFactory;

/// Load a service catalog CSV into a repository backend.
#[derive(Parser, Debug)]
#[command(name = "toolbelt-catalog-loader")]
struct Args {
    /// Path to the catalog CSV file.
    csv: PathBuf,

    /// Store backend to load into.
    #[arg(long, default_value = "sqlite")]
    backend: String,

    /// Backend connection string (file path for sqlite).
    #[arg(long, default_value = "toolbelt.db")]
    database: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let file = File::open(&args.csv)
        .with_context(|| format!("cannot open catalog file '{}'", args.csv.display()))?;
    let records = CatalogLoader::parse(file).context("failed to parse catalog CSV")?;
    println!("Parsed {} catalog record(s)", records.len());

    let mut registry = RepositoryRegistry::new();
    registry.register(Box::new(SqliteRepositoryFactory));
    let repository = registry
        .create(&DbConfig {
            backend: args.backend,
            connection_string: args.database,
        })
        .await
        .context("failed to open repository")?;

    let created = CatalogLoader::load(repository.as_ref(), records)
        .await
        .context("failed to load catalog")?;
    println!("Loaded {} service(s)", created.len());
    for service in &created {
        println!("  [{}] {} ({})", service.id, service.name, service.category.as_str());
    }

    Ok(())
}
