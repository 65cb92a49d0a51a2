use std::env;

use anyhow::Result;
use sql_connection::{config::PostgresDbConfig, connect_postgres_db};
use test_utils::{SqlMigrator, seed_inventory};
use tracing::{Level, info};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    info!("Starting database migration and seeding process");

    let config = PostgresDbConfig {
        max_conn: Some(4),
        min_conn: Some(1),
        ..PostgresDbConfig::from_env()
    };

    let db = connect_postgres_db(&config).await?;
    info!("Connected to database successfully");

    info!("Running database migrations...");
    let migrator = SqlMigrator::new(db.pool().clone());
    migrator.run_all_migrations().await?;
    info!("Database migrations completed successfully");

    let should_seed = env::var("SKIP_SEEDING")
        .map(|v| v.to_lowercase() != "true")
        .unwrap_or(true);

    if should_seed {
        let categories = seed_inventory(&db).await?;
        info!(?categories, "Database seeding completed successfully");
    }
    else {
        info!("Skipping database seeding (SKIP_SEEDING=true)");
    }

    Ok(())
}
