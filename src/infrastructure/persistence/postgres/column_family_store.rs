//! # PostgreSQL Column-Family Store
//!
//! PostgreSQL implementation of [`ColumnFamilyStore`] using sqlx.
//!
//! Every collection shares one wide table with one row per stored column:
//!
//! ```text
//! cf_columns(collection, row_key, column_name, column_value)
//!   PRIMARY KEY (collection, row_key, column_name)
//!   INDEX (collection, column_name, column_value)
//! ```
//!
//! The secondary index serves indexed scans: a row matches a clause when
//! it holds a matching column for every distinct expression.

use crate::domain::value_objects::RecordId;
use crate::infrastructure::persistence::traits::{
    ColumnFamilyStore, ColumnMap, IndexClause, IndexExpression, KeyedRow, StoreError,
    StoreResult,
};
use async_trait::async_trait;
use bytes::Bytes;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{Postgres, QueryBuilder};
use std::collections::{BTreeSet, HashMap};
use std::time::Duration;
use uuid::Uuid;

const CREATE_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS cf_columns (
        collection   TEXT  NOT NULL,
        row_key      UUID  NOT NULL,
        column_name  TEXT  NOT NULL,
        column_value BYTEA NOT NULL,
        PRIMARY KEY (collection, row_key, column_name)
    )
"#;

const CREATE_INDEX: &str = r#"
    CREATE INDEX IF NOT EXISTS cf_columns_value_idx
        ON cf_columns (collection, column_name, column_value)
"#;

/// Connection settings for [`PostgresColumnFamilyStore`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostgresStoreConfig {
    /// Connection URLs, tried in order.
    pub endpoints: Vec<String>,
    /// Pool size.
    pub max_connections: u32,
    /// Time allowed to establish or acquire a connection.
    pub connect_timeout: Duration,
}

/// PostgreSQL implementation of [`ColumnFamilyStore`].
///
/// Uses connection pooling via `sqlx::PgPool`.
///
/// # Examples
///
/// ```ignore
/// use rememerme_cards::infrastructure::persistence::postgres::{
///     PostgresColumnFamilyStore, PostgresStoreConfig,
/// };
///
/// let store = PostgresColumnFamilyStore::connect(&config).await?;
/// store.ensure_schema().await?;
/// ```
#[derive(Debug, Clone)]
pub struct PostgresColumnFamilyStore {
    pool: PgPool,
}

impl PostgresColumnFamilyStore {
    /// Wraps an existing pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connects to the first reachable endpoint.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Unavailable` if no endpoint accepts a
    /// connection, or if the endpoint list is empty.
    pub async fn connect(config: &PostgresStoreConfig) -> StoreResult<Self> {
        let mut last_error = StoreError::unavailable("no store endpoints configured");

        for endpoint in &config.endpoints {
            let attempt = PgPoolOptions::new()
                .max_connections(config.max_connections)
                .acquire_timeout(config.connect_timeout)
                .connect(endpoint)
                .await;

            match attempt {
                Ok(pool) => {
                    tracing::info!(endpoint = %redact(endpoint), "connected to store");
                    return Ok(Self::new(pool));
                }
                Err(e) => {
                    tracing::warn!(
                        endpoint = %redact(endpoint),
                        error = %e,
                        "store endpoint unreachable, trying next"
                    );
                    last_error = map_sqlx_error(e);
                }
            }
        }

        Err(last_error)
    }

    /// Creates the column table and its secondary index if missing.
    ///
    /// # Errors
    ///
    /// Returns a store error if the DDL fails.
    pub async fn ensure_schema(&self) -> StoreResult<()> {
        sqlx::query(CREATE_TABLE)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        sqlx::query(CREATE_INDEX)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(())
    }

    /// Returns a reference to the connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    async fn matching_keys(
        &self,
        collection: &str,
        expressions: &[&IndexExpression],
        count: usize,
    ) -> StoreResult<Vec<Uuid>> {
        let mut qb = QueryBuilder::<Postgres>::new(
            "SELECT row_key FROM cf_columns WHERE collection = ",
        );
        qb.push_bind(collection);
        qb.push(" AND (");
        {
            let mut any_of = qb.separated(" OR ");
            for expr in expressions {
                any_of.push("(column_name = ");
                any_of.push_bind_unseparated(expr.column());
                any_of.push_unseparated(" AND column_value = ");
                any_of.push_bind_unseparated(expr.value().as_ref());
                any_of.push_unseparated(")");
            }
        }
        qb.push(") GROUP BY row_key HAVING COUNT(*) = ");
        qb.push_bind(expressions.len() as i64);
        qb.push(" ORDER BY row_key LIMIT ");
        qb.push_bind(count as i64);

        qb.build_query_scalar::<Uuid>()
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)
    }
}

#[async_trait]
impl ColumnFamilyStore for PostgresColumnFamilyStore {
    async fn get(&self, collection: &str, key: &RecordId) -> StoreResult<ColumnMap> {
        let rows: Vec<(String, Vec<u8>)> = sqlx::query_as(
            r#"
            SELECT column_name, column_value
            FROM cf_columns
            WHERE collection = $1 AND row_key = $2
            "#,
        )
        .bind(collection)
        .bind(*key.as_uuid())
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        if rows.is_empty() {
            return Err(StoreError::key_not_found(collection, *key));
        }

        Ok(rows
            .into_iter()
            .map(|(name, value)| (name, Bytes::from(value)))
            .collect())
    }

    async fn insert(
        &self,
        collection: &str,
        key: &RecordId,
        columns: ColumnMap,
    ) -> StoreResult<()> {
        if columns.is_empty() {
            tracing::debug!(collection, key = %key, "skipping write with no columns");
            return Ok(());
        }

        let mut qb = QueryBuilder::<Postgres>::new(
            "INSERT INTO cf_columns (collection, row_key, column_name, column_value) ",
        );
        qb.push_values(columns.iter(), |mut row, (name, value)| {
            row.push_bind(collection)
                .push_bind(*key.as_uuid())
                .push_bind(name.as_str())
                .push_bind(value.as_ref());
        });
        qb.push(
            " ON CONFLICT (collection, row_key, column_name) \
             DO UPDATE SET column_value = EXCLUDED.column_value",
        );

        qb.build()
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn get_indexed_slices(
        &self,
        collection: &str,
        clause: &IndexClause,
    ) -> StoreResult<Vec<KeyedRow>> {
        let mut seen = BTreeSet::new();
        let expressions: Vec<&IndexExpression> = clause
            .expressions()
            .iter()
            .filter(|e| seen.insert((e.column(), e.value().as_ref())))
            .collect();

        let keys = self
            .matching_keys(collection, &expressions, clause.count())
            .await?;
        if keys.is_empty() {
            return Ok(Vec::new());
        }

        let rows: Vec<(Uuid, String, Vec<u8>)> = sqlx::query_as(
            r#"
            SELECT row_key, column_name, column_value
            FROM cf_columns
            WHERE collection = $1 AND row_key = ANY($2)
            "#,
        )
        .bind(collection)
        .bind(&keys[..])
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        let mut by_key: HashMap<Uuid, ColumnMap> = HashMap::new();
        for (key, name, value) in rows {
            by_key.entry(key).or_default().insert(name, Bytes::from(value));
        }

        Ok(keys
            .into_iter()
            .filter_map(|key| by_key.remove(&key).map(|columns| (RecordId::new(key), columns)))
            .collect())
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}

/// Classifies a sqlx error as a transport failure or a rejected query.
fn map_sqlx_error(err: sqlx::Error) -> StoreError {
    let transport = matches!(
        err,
        sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed
    );
    if transport {
        StoreError::unavailable(err.to_string())
    } else {
        StoreError::query(err.to_string())
    }
}

/// Strips credentials from a connection URL for logging.
fn redact(endpoint: &str) -> String {
    match endpoint.split_once("://") {
        Some((scheme, rest)) => match rest.rsplit_once('@') {
            Some((_, host)) => format!("{scheme}://***@{host}"),
            None => endpoint.to_owned(),
        },
        None => endpoint.to_owned(),
    }
}
