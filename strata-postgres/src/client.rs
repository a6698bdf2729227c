//! Single-connection PostgreSQL client.

use async_trait::async_trait;
use tokio_postgres::types::ToSql;
use tokio_postgres::NoTls;
use tracing::{debug, info};

use strata_migrate::{SqlExecutor, StatementError};

use crate::config::PgConfig;
use crate::error::{PgError, PgResult};

/// A single PostgreSQL connection implementing the migration engine's
/// executor seam.
///
/// Migrations run strictly sequentially on one connection; there is no pool.
/// The connection closes when the client is dropped.
pub struct PgClient {
    client: tokio_postgres::Client,
    // Drives the connection; aborts with the client.
    _driver: tokio::task::JoinHandle<()>,
}

impl PgClient {
    /// Open a connection from a parsed configuration.
    pub async fn connect(config: &PgConfig) -> PgResult<Self> {
        let (client, connection) = config.to_pg_config().connect(NoTls).await?;

        let driver = tokio::spawn(async move {
            if let Err(e) = connection.await {
                debug!(error = %e, "connection task ended");
            }
        });

        info!(
            host = %config.host,
            port = %config.port,
            database = %config.database,
            "connected to PostgreSQL"
        );

        Ok(Self {
            client,
            _driver: driver,
        })
    }

    /// Open a connection straight from a database URL.
    pub async fn connect_url(url: impl AsRef<str>) -> PgResult<Self> {
        let config = PgConfig::from_url(url)?;
        Self::connect(&config).await
    }

    /// Check whether the underlying connection has closed.
    pub fn is_closed(&self) -> bool {
        self.client.is_closed()
    }
}

/// Translate a driver error into the engine's statement error, preserving the
/// SQLSTATE so the idempotency guard can classify it.
fn statement_error(e: tokio_postgres::Error) -> StatementError {
    if e.is_closed() {
        return StatementError::connection_lost(e.to_string());
    }
    match e.as_db_error() {
        Some(db) => StatementError::execution(db.message()).with_sqlstate(db.code().code()),
        None => StatementError::execution(e.to_string()),
    }
}

fn text_params<'a>(params: &'a [&'a str]) -> Vec<&'a (dyn ToSql + Sync)> {
    params.iter().map(|p| p as &(dyn ToSql + Sync)).collect()
}

#[async_trait]
impl SqlExecutor for PgClient {
    async fn execute(&self, sql: &str) -> Result<(), StatementError> {
        debug!(sql = %sql, "executing statement");
        // Simple query protocol: no prepare step, works for any statement.
        self.client
            .simple_query(sql)
            .await
            .map(|_| ())
            .map_err(statement_error)
    }

    async fn batch_execute(&self, sql: &str) -> Result<(), StatementError> {
        debug!(sql = %sql, "executing batch");
        self.client.batch_execute(sql).await.map_err(statement_error)
    }

    async fn execute_params(&self, sql: &str, params: &[&str]) -> Result<u64, StatementError> {
        debug!(sql = %sql, "executing parameterized statement");
        self.client
            .execute(sql, &text_params(params))
            .await
            .map_err(statement_error)
    }

    async fn query_bool(&self, sql: &str, params: &[&str]) -> Result<bool, StatementError> {
        debug!(sql = %sql, "querying boolean");
        let row = self
            .client
            .query_one(sql, &text_params(params))
            .await
            .map_err(statement_error)?;
        row.try_get::<_, bool>(0).map_err(statement_error)
    }
}
