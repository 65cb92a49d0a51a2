use anyhow::Context;
use deadpool_postgres::Pool;
use tracing::info;

const MIGRATIONS: &[(&str, &str)] = &[(
    "001_create_inventory",
    include_str!("../../../domains/pricing/migrations/sql/001_create_inventory.sql"),
)];

const DOWN_MIGRATIONS: &[(&str, &str)] = &[(
    "001_create_inventory",
    include_str!(
        "../../../domains/pricing/migrations/sql/001_create_inventory.down.sql"
    ),
)];

/// Applies the plain `.sql` migrations in order, recording each in a
/// `_migrations` table.
pub struct SqlMigrator {
    pool: Pool,
}

impl SqlMigrator {
    pub fn new(pool: Pool) -> Self { Self { pool } }

    pub async fn run_all_migrations(&self) -> anyhow::Result<()> {
        self.create_migration_table().await?;

        for (name, sql) in MIGRATIONS {
            if self.is_migration_applied(name).await? {
                continue;
            }
            info!(migration = name, "running migration");

            let mut client = self.pool.get().await?;
            let tx = client.transaction().await?;
            tx.batch_execute(sql)
                .await
                .with_context(|| format!("Failed to run migration {name}"))?;
            tx.execute(
                "INSERT INTO _migrations (name, applied_at) VALUES ($1, NOW())",
                &[name],
            )
            .await?;
            tx.commit().await?;
        }

        Ok(())
    }

    /// Rolls back the named migrations, newest first.
    pub async fn run_down_migrations(
        &self, names: &[&str],
    ) -> anyhow::Result<()> {
        for (name, sql) in DOWN_MIGRATIONS.iter().rev() {
            if !names.contains(name) || !self.is_migration_applied(name).await?
            {
                continue;
            }
            info!(migration = name, "rolling back migration");

            let mut client = self.pool.get().await?;
            let tx = client.transaction().await?;
            tx.batch_execute(sql).await.with_context(|| {
                format!("Failed to roll back migration {name}")
            })?;
            tx.execute("DELETE FROM _migrations WHERE name = $1", &[name])
                .await?;
            tx.commit().await?;
        }

        Ok(())
    }

    pub async fn list_applied_migrations(&self) -> anyhow::Result<Vec<String>> {
        self.create_migration_table().await?;

        let client = self.pool.get().await?;
        let rows = client
            .query("SELECT name FROM _migrations ORDER BY applied_at, id", &[])
            .await?;

        Ok(rows.iter().map(|row| row.get("name")).collect())
    }

    async fn create_migration_table(&self) -> anyhow::Result<()> {
        let client = self.pool.get().await?;
        client
            .batch_execute(
                "CREATE TABLE IF NOT EXISTS _migrations (
                    id SERIAL PRIMARY KEY,
                    name VARCHAR(255) NOT NULL UNIQUE,
                    applied_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
                )",
            )
            .await?;
        Ok(())
    }

    async fn is_migration_applied(&self, name: &str) -> anyhow::Result<bool> {
        let client = self.pool.get().await?;
        let row = client
            .query_one(
                "SELECT EXISTS(SELECT 1 FROM _migrations WHERE name = $1)",
                &[&name],
            )
            .await?;
        Ok(row.get(0))
    }
}
