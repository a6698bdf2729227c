//! Post-migration verification probes.
//!
//! A probe asserts the intended end-state directly, independent of
//! statement-level outcomes. It catches the case where a statement silently
//! no-ops without ever being classified benign.

use crate::client::SqlExecutor;
use crate::error::{MigrateError, MigrateResult};

/// A declarative existence check against the active database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Probe {
    /// A relation with this name exists.
    TableExists {
        /// Schema to look in; the connection's current schema when `None`.
        schema: Option<String>,
        /// Relation name.
        table: String,
    },
    /// A column exists on the named relation.
    ColumnExists {
        /// Schema to look in; the connection's current schema when `None`.
        schema: Option<String>,
        /// Relation name.
        table: String,
        /// Column name.
        column: String,
    },
}

impl Probe {
    /// Check that a table exists in the current schema.
    pub fn table_exists(table: impl Into<String>) -> Self {
        Self::TableExists {
            schema: None,
            table: table.into(),
        }
    }

    /// Check that a column exists on a table in the current schema.
    pub fn column_exists(table: impl Into<String>, column: impl Into<String>) -> Self {
        Self::ColumnExists {
            schema: None,
            table: table.into(),
            column: column.into(),
        }
    }

    /// Restrict the probe to an explicit schema.
    pub fn in_schema(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        match &mut self {
            Self::TableExists { schema, .. } | Self::ColumnExists { schema, .. } => {
                *schema = Some(name);
            }
        }
        self
    }

    /// Render the probe as an `information_schema` query plus its text
    /// parameters, in order.
    pub fn query(&self) -> (&'static str, Vec<&str>) {
        match self {
            Self::TableExists {
                schema: Some(schema),
                table,
            } => (
                "SELECT EXISTS (SELECT 1 FROM information_schema.tables \
                 WHERE table_schema = $1 AND table_name = $2)",
                vec![schema.as_str(), table.as_str()],
            ),
            Self::TableExists {
                schema: None,
                table,
            } => (
                "SELECT EXISTS (SELECT 1 FROM information_schema.tables \
                 WHERE table_schema = current_schema() AND table_name = $1)",
                vec![table.as_str()],
            ),
            Self::ColumnExists {
                schema: Some(schema),
                table,
                column,
            } => (
                "SELECT EXISTS (SELECT 1 FROM information_schema.columns \
                 WHERE table_schema = $1 AND table_name = $2 AND column_name = $3)",
                vec![schema.as_str(), table.as_str(), column.as_str()],
            ),
            Self::ColumnExists {
                schema: None,
                table,
                column,
            } => (
                "SELECT EXISTS (SELECT 1 FROM information_schema.columns \
                 WHERE table_schema = current_schema() AND table_name = $1 AND column_name = $2)",
                vec![table.as_str(), column.as_str()],
            ),
        }
    }

    /// Run the probe against a client.
    pub async fn check<E: SqlExecutor + ?Sized>(&self, client: &E) -> MigrateResult<bool> {
        let (sql, params) = self.query();
        client.query_bool(sql, &params).await.map_err(|e| {
            if e.is_connection_lost() {
                MigrateError::connection_lost(e.message().to_string())
            } else {
                MigrateError::Database(e)
            }
        })
    }
}
