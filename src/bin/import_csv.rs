//! Load CSV fixtures into the configured database.
//!
//! Usage: `import_csv [DIR]` (defaults to `static/data`).

use reviewhub::config::Config;
use reviewhub::db::create_pool;
use reviewhub::import::{import_dir, Fixture};
use std::path::PathBuf;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    let dir = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("static/data"));

    let config = Config::from_env()?;
    let pool = create_pool(&config).await?;

    log::info!("Importing fixtures from {}", dir.display());
    let report = import_dir(&pool, &dir, &Fixture::ALL).await?;
    log::info!(
        "Import finished: {} files loaded, {} skipped",
        report.loaded.len(),
        report.skipped.len()
    );
    Ok(())
}
