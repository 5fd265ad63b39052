use anyhow::{Context, Result};
use media_migrate::config::MigrationConfig;
use media_migrate::error::MigrateError;
use media_migrate::executor::{DryRunExecutor, LiveExecutor, TargetExecutor};
use media_migrate::migrate::MediaMigrator;
use media_migrate::orchestrator::Orchestrator;
use media_migrate::retry::RetryClient;
use media_migrate::store::legacy::LegacyStore;
use media_migrate::store::target::TargetStore;
use media_migrate::util::env as env_util;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    // --- logging -------------------------------------------------------------
    env_util::init_env();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    // --- configuration -------------------------------------------------------
    // Missing token is fatal before any endpoint is contacted.
    let config = match MigrationConfig::from_env() {
        Ok(config) => config,
        Err(err @ MigrateError::StartupConfigMissing(_)) => {
            error!("{err}");
            std::process::exit(1);
        }
        Err(err) => return Err(err.into()),
    };

    info!(
        legacy = %config.legacy_base,
        target = %config.target_base,
        "media migration starting"
    );
    if config.dry_run {
        info!("dry-run mode enabled; no changes will be made");
    }

    // --- wiring --------------------------------------------------------------
    let http = reqwest::Client::builder()
        .user_agent(concat!("media-migrate/", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(60))
        .build()
        .context("failed to build HTTP client")?;
    let retry_client = RetryClient::new(http.clone());

    let legacy = LegacyStore::new(retry_client.clone(), config.legacy_base.clone());
    let target = TargetStore::new(
        retry_client,
        config.target_base.clone(),
        config.api_token.clone(),
    );

    let executor: Arc<dyn TargetExecutor> = if config.dry_run {
        Arc::new(DryRunExecutor)
    } else {
        Arc::new(LiveExecutor::new(target.clone()))
    };
    let migrator = MediaMigrator::new(http, executor.clone(), config.upload_pacing);

    // --- run -----------------------------------------------------------------
    // Per-entry errors are counted, not fatal; the process still exits 0.
    let stats = Orchestrator::new(legacy, target, migrator, executor)
        .run()
        .await;

    info!(
        images = stats.totals.images,
        gallery_items = stats.totals.gallery_items,
        documents = stats.totals.documents,
        skipped = stats.totals.skipped,
        errors = stats.totals.errors,
        "final totals"
    );
    Ok(())
}
