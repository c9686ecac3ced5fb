use std::path::PathBuf;

use clap::Parser;
use coursenotes::catalog::PgCatalog;
use coursenotes::config::DatabaseConfig;
use coursenotes::connection::{establish_pool, run_migrations};
use coursenotes::logging;
use coursenotes::seed::{seed, seed_if_empty, SeedFile};

/// Clears the database and loads demo course content.
#[derive(Parser, Debug)]
#[command(name = "coursenotes-seed", version)]
struct Args {
    /// Only seed when no courses exist yet.
    #[arg(long)]
    if_empty: bool,

    /// Seed from this JSON file instead of the built-in demo course.
    #[arg(long, value_name = "PATH")]
    file: Option<PathBuf>,
}

fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    logging::init_tracing();
    let args = Args::parse();

    let seed_file = match &args.file {
        Some(path) => SeedFile::from_json(&std::fs::read_to_string(path)?)?,
        None => SeedFile::demo()?,
    };

    let database = DatabaseConfig::from_env()?;
    let pool = establish_pool(&database.url, database.pool_size)?;
    run_migrations(&pool)?;
    let store = PgCatalog::new(pool);

    let report = if args.if_empty {
        seed_if_empty(&store, seed_file)?
    } else {
        Some(seed(&store, seed_file)?)
    };

    match report {
        Some(report) => {
            for course_id in &report.course_ids {
                tracing::info!(%course_id, "course seeded");
            }
        }
        None => tracing::info!("courses already present, nothing to do"),
    }
    Ok(())
}
