//! Relational storage. One submodule per table family; every function
//! takes any SQLite executor so the services can run it on the pool or
//! inside a transaction.

pub mod appointments;
pub mod medicine;
pub mod notifications;
pub mod prescriptions;
pub mod profiles;
pub mod records;
pub mod users;

use std::{path::Path, str::FromStr, time::Duration};

use anyhow::{Context, Result};
use log::{error, info};
use sqlx::{
    migrate::Migrator,
    sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions},
};

use crate::config::Config;
use crate::models::{DoctorID, PatientID};

static MIGRATOR: Migrator = sqlx::migrate!();

/// Which rows a role-scoped listing covers
#[derive(Debug, Clone, Copy)]
pub enum Scope {
    Patient(PatientID),
    Doctor(DoctorID),
    Everything,
}

impl Scope {
    /// WHERE clause over the given table alias, and the value to bind
    fn filter(&self, alias: &str) -> (String, Option<i64>) {
        match self {
            Scope::Patient(id) => (format!("WHERE {alias}.patient_id = ?"), Some(id.0)),
            Scope::Doctor(id) => (format!("WHERE {alias}.doctor_id = ?"), Some(id.0)),
            Scope::Everything => (String::new(), None),
        }
    }
}

/// Opens the pool and brings the schema up to date
pub async fn connect(config: &Config) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(&config.database_url)
        .with_context(|| format!("Invalid DATABASE_URL {}", config.database_url))?
        .create_if_missing(true)
        .foreign_keys(true);

    if let Some(parent) = Path::new(options.get_filename()).parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }

    let pool = SqlitePoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(20))
        .idle_timeout(Duration::from_secs(30))
        .connect_with(options)
        .await
        .context("Failed to connect to database")?;

    MIGRATOR
        .run(&pool)
        .await
        .context("Failed to apply migrations")?;

    Ok(pool)
}

/// Round-trip to the database so that a cold server fails early and loudly
pub async fn ping(pool: &SqlitePool) -> bool {
    match sqlx::query("SELECT 1").execute(pool).await {
        Ok(_) => {
            info!("Database is ready");
            true
        }
        Err(e) => {
            error!("Database ping failed: {e}");
            false
        }
    }
}

/// A private in-memory database, kept alive by a single never-recycled connection
#[cfg(test)]
pub async fn connect_in_memory() -> SqlitePool {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .expect("valid in-memory url")
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .expect("in-memory database");

    MIGRATOR.run(&pool).await.expect("migrations");
    pool
}
