//! `serve`: seed the in-memory store and run the server.

use std::sync::Arc;

use tracing::info;

use parley_core::config::AppConfig;
use parley_core::error::AppError;
use parley_database::MemoryDatabase;
use parley_database::memory::Fixtures;

/// Start the server and block until shutdown.
pub async fn execute(config: AppConfig) -> Result<(), AppError> {
    info!(version = env!("CARGO_PKG_VERSION"), "Starting Parley");

    let db = Arc::new(MemoryDatabase::new());
    if let Some(path) = &config.database.fixtures_path {
        info!(path = %path, "Loading fixtures");
        Fixtures::load(path).await?.apply(&db).await?;
    }

    parley_api::run_server(config, db).await
}
