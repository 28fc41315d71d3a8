//! SeaORM-based database access
//!
//! Database-agnostic connection management with support for SQLite and
//! PostgreSQL. All catalog reads and writes go through the repositories in
//! [`repositories`].

use anyhow::{Context, Result};
use sea_orm::{ConnectOptions, Database as SeaOrmDatabase, DatabaseConnection};
use sea_orm_migration::MigratorTrait;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::config::DatabaseConfig;

pub mod migrations;
pub mod repositories;

use migrations::Migrator;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseType {
    SQLite,
    PostgreSQL,
}

impl DatabaseType {
    fn as_str(&self) -> &'static str {
        match self {
            DatabaseType::SQLite => "SQLite",
            DatabaseType::PostgreSQL => "PostgreSQL",
        }
    }
}

/// Database connection manager
#[derive(Clone)]
pub struct Database {
    pub connection: Arc<DatabaseConnection>,
    pub database_type: DatabaseType,
}

impl Database {
    /// Create a new database connection and run pending migrations
    pub async fn new(config: &DatabaseConfig) -> Result<Self> {
        let database_type = Self::detect_database_type(&config.url)?;
        info!("Connecting to {} database", database_type.as_str());

        let connection_url = match database_type {
            DatabaseType::SQLite => Self::ensure_sqlite_auto_creation(&config.url),
            DatabaseType::PostgreSQL => config.url.clone(),
        };

        let mut connect_options = ConnectOptions::new(&connection_url);
        connect_options
            .max_connections(config.max_connections.unwrap_or(10))
            .min_connections(1)
            .connect_timeout(Duration::from_secs(5))
            .acquire_timeout(Duration::from_secs(3))
            .idle_timeout(Duration::from_secs(600))
            .sqlx_logging(false);

        let connection = SeaOrmDatabase::connect(connect_options)
            .await
            .with_context(|| format!("failed to connect to {}", database_type.as_str()))?;

        Migrator::up(&connection, None)
            .await
            .context("database migration failed")?;

        Ok(Self {
            connection: Arc::new(connection),
            database_type,
        })
    }

    /// Shared connection handle for repositories and services
    pub fn connection(&self) -> Arc<DatabaseConnection> {
        self.connection.clone()
    }

    fn detect_database_type(url: &str) -> Result<DatabaseType> {
        if url.starts_with("sqlite:") {
            Ok(DatabaseType::SQLite)
        } else if url.starts_with("postgres:") || url.starts_with("postgresql:") {
            Ok(DatabaseType::PostgreSQL)
        } else {
            anyhow::bail!("unsupported database URL scheme: {}", url)
        }
    }

    /// Append `mode=rwc` so SQLite creates the file on first run
    fn ensure_sqlite_auto_creation(url: &str) -> String {
        if url.contains("mode=") || url.contains(":memory:") {
            url.to_string()
        } else if url.contains('?') {
            format!("{url}&mode=rwc")
        } else {
            format!("{url}?mode=rwc")
        }
    }
}
