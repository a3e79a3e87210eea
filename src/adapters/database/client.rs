//! PostgreSQL client implementation
//!
//! This module provides the pooled client used by the data source and
//! status store adapters.

use crate::config::DatabaseConfig;
use crate::domain::{PorterError, Result};
use deadpool_postgres::{Config as PoolConfig, Manager, ManagerConfig, Pool, RecyclingMethod};
use std::time::Duration;
use tokio_postgres::{NoTls, Row};

/// PostgreSQL client for Porter
///
/// Provides query execution over a connection pool with a per-statement
/// timeout. All parameters are bound through the driver; nothing is ever
/// interpolated into query text.
pub struct PostgresClient {
    /// Connection pool
    pool: Pool,

    /// Configuration
    config: DatabaseConfig,
}

impl PostgresClient {
    /// Create a new PostgreSQL client
    ///
    /// # Arguments
    ///
    /// * `config` - Database configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the connection string is invalid or the pool
    /// cannot be created.
    pub async fn new(config: DatabaseConfig) -> Result<Self> {
        let pg_config: tokio_postgres::Config = config.connection_string.parse().map_err(|e| {
            PorterError::Configuration(format!("Invalid PostgreSQL connection string: {}", e))
        })?;

        let mut pool_config = PoolConfig::new();
        pool_config.manager = Some(ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        });

        let manager = Manager::from_config(
            pg_config,
            NoTls,
            pool_config.manager.unwrap_or_default(),
        );

        let pool = Pool::builder(manager)
            .max_size(config.max_connections)
            .wait_timeout(Some(Duration::from_secs(config.connection_timeout_seconds)))
            .create_timeout(Some(Duration::from_secs(config.connection_timeout_seconds)))
            .recycle_timeout(Some(Duration::from_secs(config.connection_timeout_seconds)))
            .build()
            .map_err(|e| {
                PorterError::Database(format!("Failed to create connection pool: {}", e))
            })?;

        Ok(Self { pool, config })
    }

    /// Test the connection to PostgreSQL
    ///
    /// Attempts to get a connection from the pool and execute a simple query.
    pub async fn test_connection(&self) -> Result<()> {
        let client = self.get_connection().await?;

        client
            .query_one("SELECT 1", &[])
            .await
            .map_err(|e| PorterError::Database(format!("Connection test failed: {}", e)))?;

        tracing::info!("PostgreSQL connection test successful");
        Ok(())
    }

    /// Get a connection from the pool
    ///
    /// # Errors
    ///
    /// Returns an error if a connection cannot be obtained.
    async fn get_connection(&self) -> Result<deadpool_postgres::Object> {
        self.pool.get().await.map_err(|e| {
            PorterError::Database(format!("Failed to get connection from pool: {}", e))
        })
    }

    /// Execute a query and return rows
    ///
    /// # Arguments
    ///
    /// * `query` - SQL query with `$n` placeholders
    /// * `params` - Bound query parameters
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub async fn query(
        &self,
        query: &str,
        params: &[&(dyn tokio_postgres::types::ToSql + Sync)],
    ) -> Result<Vec<Row>> {
        let client = self.get_connection().await?;

        self.set_statement_timeout(&client).await?;

        client
            .query(query, params)
            .await
            .map_err(|e| PorterError::Database(format!("Query failed: {}", e)))
    }

    /// Execute a statement and return the number of affected rows
    ///
    /// # Arguments
    ///
    /// * `statement` - SQL statement with `$n` placeholders
    /// * `params` - Bound statement parameters
    ///
    /// # Errors
    ///
    /// Returns an error if the statement fails.
    pub async fn execute(
        &self,
        statement: &str,
        params: &[&(dyn tokio_postgres::types::ToSql + Sync)],
    ) -> Result<u64> {
        let client = self.get_connection().await?;

        self.set_statement_timeout(&client).await?;

        client
            .execute(statement, params)
            .await
            .map_err(|e| PorterError::Database(format!("Statement execution failed: {}", e)))
    }

    async fn set_statement_timeout(&self, client: &deadpool_postgres::Object) -> Result<()> {
        let timeout_query = format!(
            "SET statement_timeout = {}",
            self.config.statement_timeout_seconds * 1000
        );
        client
            .execute(&timeout_query, &[])
            .await
            .map_err(|e| PorterError::Database(format!("Failed to set statement timeout: {}", e)))?;
        Ok(())
    }
}
