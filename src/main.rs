use std::sync::Arc;

use coursenotes::catalog::{CatalogStore, MemoryCatalog, PgCatalog};
use coursenotes::config::{Config, Storage};
use coursenotes::connection::{establish_pool, run_migrations};
use coursenotes::seed::{seed_if_empty, SeedFile};
use coursenotes::{logging, server};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    logging::init_tracing();
    let config = Config::from_env()?;

    let store: Arc<dyn CatalogStore> = match &config.storage {
        Storage::Postgres(database) => {
            let pool = establish_pool(&database.url, database.pool_size)?;
            run_migrations(&pool)?;
            Arc::new(PgCatalog::new(pool))
        }
        Storage::Memory => {
            tracing::warn!("using in-memory storage; content is lost on exit");
            Arc::new(MemoryCatalog::new())
        }
    };

    // Initialize demo content if the store is empty
    if config.seed_if_empty {
        if let Some(report) = seed_if_empty(store.as_ref(), SeedFile::demo()?)? {
            tracing::info!(course_ids = ?report.course_ids, "seeded demo content");
        }
    }

    let app = server::app(Arc::clone(&store), &config.allowed_origins);
    server::serve(app, config.listen_addr()).await?;

    drop(store);
    tracing::info!("connection pool closed");
    Ok(())
}
