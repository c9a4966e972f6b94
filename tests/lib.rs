//! PostgreSQL harness for cross-crate integration tests.
//!
//! Tests call [`PgTestContext::new`] and return early on `None`, so the suite
//! stays green on machines without `TEST_DATABASE_URL`.

use anyhow::{Context, Result};
use chrono::Utc;
use migration::{Migrator, MigratorTrait};
use platform_db::DbPool;
use sea_orm::{ConnectionTrait, Database, DatabaseBackend, Statement};
use url::Url;

pub struct PgTestContext {
    pub pool: DbPool,
    admin_url: String,
    db_name: String,
}

impl PgTestContext {
    /// Creates a throwaway database and migrates it.
    pub async fn new() -> Result<Option<Self>> {
        let Ok(base) = std::env::var("TEST_DATABASE_URL") else {
            eprintln!("TEST_DATABASE_URL not set; skipping postgres test");
            return Ok(None);
        };
        let (admin_url, db_name, test_url) = build_urls(&base)?;

        let admin = Database::connect(&admin_url)
            .await
            .context("connect admin database")?;
        admin
            .execute(Statement::from_string(
                DatabaseBackend::Postgres,
                format!("CREATE DATABASE \"{db_name}\";"),
            ))
            .await
            .with_context(|| format!("create database {db_name}"))?;

        let pool = platform_db::connect_url(&test_url, 2).await?;
        Migrator::up(&pool, None).await.context("apply migrations")?;
        Ok(Some(Self {
            pool,
            admin_url,
            db_name,
        }))
    }

    pub async fn cleanup(self) {
        let Self {
            pool,
            admin_url,
            db_name,
        } = self;
        let _ = pool.close().await;
        if let Ok(admin) = Database::connect(&admin_url).await {
            let drop_sql = format!("DROP DATABASE IF EXISTS \"{db_name}\" WITH (FORCE);");
            let _ = admin
                .execute(Statement::from_string(DatabaseBackend::Postgres, drop_sql))
                .await;
        }
    }
}

fn build_urls(base: &str) -> Result<(String, String, String)> {
    let url = Url::parse(base).context("invalid TEST_DATABASE_URL")?;
    let db_path = url.path().trim_start_matches('/');
    let base_name = if db_path.is_empty() { "hr_test" } else { db_path };
    let suffix = Utc::now().timestamp_micros();
    let db_name = format!("{base_name}_{}_{suffix}", std::process::id());

    let mut admin_url = url.clone();
    admin_url.set_path("/postgres");
    let mut test_url = url;
    test_url.set_path(&format!("/{db_name}"));
    Ok((admin_url.to_string(), db_name, test_url.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn urls_point_at_admin_and_fresh_database() {
        let (admin, name, test) = build_urls("postgres://u:p@localhost:5432/hr").unwrap();
        assert_eq!(admin, "postgres://u:p@localhost:5432/postgres");
        assert!(name.starts_with("hr_"));
        assert!(test.ends_with(&format!("/{name}")));
    }
}
