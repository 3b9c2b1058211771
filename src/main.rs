// src/main.rs

use anyhow::Result;
use clap::Parser;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt};

use importance_backfill::config::BackfillConfig;
use importance_backfill::llm::{GeminiProvider, ImportanceClassifier};
use importance_backfill::storage::{self, ChangeLogStore};
use importance_backfill::tasks::BackfillTask;

#[derive(Parser)]
#[command(name = "backfill-importance")]
#[command(about = "Backfill the 'importance' column in the change_log table.")]
struct Args {
    /// Perform a dry run without committing any changes to the database.
    #[arg(long)]
    dry_run: bool,

    /// Database path (sqlite URL)
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// Gemini model used for classification
    #[arg(long, env = "BACKFILL_MODEL")]
    model: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = dotenvy::dotenv();

    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let mut config = BackfillConfig::from_env();
    if let Some(url) = args.database_url {
        config.database_url = url;
    }
    if let Some(model) = args.model {
        config.model = model;
    }
    info!("Config: {}", config.summary());

    let pool = storage::open_pool(&config.database_url).await?;
    let store = ChangeLogStore::new(pool.clone());

    let provider = Arc::new(GeminiProvider::from_config(&config)?);
    let classifier = ImportanceClassifier::from_config(provider, &config);

    let task = BackfillTask::from_config(store, classifier, &config, args.dry_run);
    let report = task.run().await?;
    pool.close().await;

    if report.write_failures > 0 {
        anyhow::bail!("{} rows could not be written", report.write_failures);
    }

    Ok(())
}
