pub mod record_handle;

pub use record_handle::RecordHandle;

use std::fmt::Display;

use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{QueryBuilder, Row, Sqlite, Transaction};

use crate::predicate::Predicate;
use crate::retry::{retry_with_backoff, RetryPolicy};
use crate::{DatabaseConfig, DatabaseError};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS games (
    row_id INTEGER PRIMARY KEY AUTOINCREMENT,
    id INTEGER NOT NULL,
    giantbomb_id INTEGER NOT NULL DEFAULT 0,
    popularity INTEGER NOT NULL DEFAULT 0,
    name TEXT NOT NULL DEFAULT '',
    localized_name TEXT NOT NULL DEFAULT '',
    locale TEXT NOT NULL DEFAULT '',
    viewers INTEGER NOT NULL DEFAULT 0,
    channels INTEGER NOT NULL DEFAULT 0,
    is_favorite BOOLEAN NOT NULL DEFAULT 0,
    synced_at TIMESTAMP
);
CREATE INDEX IF NOT EXISTS games_id ON games (id);

CREATE TABLE IF NOT EXISTS images (
    row_id INTEGER PRIMARY KEY AUTOINCREMENT,
    game_id INTEGER NOT NULL,
    small TEXT NOT NULL DEFAULT '',
    medium TEXT NOT NULL DEFAULT '',
    large TEXT NOT NULL DEFAULT ''
);
CREATE INDEX IF NOT EXISTS images_game_id ON images (game_id);

CREATE TABLE IF NOT EXISTS logos (
    row_id INTEGER PRIMARY KEY AUTOINCREMENT,
    game_id INTEGER NOT NULL,
    small TEXT NOT NULL DEFAULT '',
    medium TEXT NOT NULL DEFAULT '',
    large TEXT NOT NULL DEFAULT ''
);
CREATE INDEX IF NOT EXISTS logos_game_id ON logos (game_id);
"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Game,
    Image,
    Logo,
}

impl EntityKind {
    pub fn table(self) -> &'static str {
        match self {
            EntityKind::Game => "games",
            EntityKind::Image => "images",
            EntityKind::Logo => "logos",
        }
    }
}

impl Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            EntityKind::Game => write!(f, "GameEntity"),
            EntityKind::Image => write!(f, "ImageEntity"),
            EntityKind::Logo => write!(f, "LogoEntity"),
        }
    }
}

/// A column value written by a [`Record`].
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Integer(i64),
    Text(String),
    Bool(bool),
    Timestamp(Option<DateTime<Utc>>),
}

impl Value {
    fn push_bind(self, qb: &mut QueryBuilder<'_, Sqlite>) {
        match self {
            Value::Integer(v) => qb.push_bind(v),
            Value::Text(v) => qb.push_bind(v),
            Value::Bool(v) => qb.push_bind(v),
            Value::Timestamp(v) => qb.push_bind(v),
        };
    }
}

/// A persisted entity kind. Queries are generic over this trait so callers get
/// back the concrete record type they asked for.
pub trait Record: Sized + Send + Unpin + 'static {
    const KIND: EntityKind;

    /// Every column except `row_id`, in a fixed order.
    fn values(&self) -> Vec<(&'static str, Value)>;

    fn from_row(row: &SqliteRow) -> Result<Self, sqlx::Error>;
}

#[derive(Debug, Clone, PartialEq)]
pub struct Stored<R> {
    pub handle: RecordHandle,
    pub record: R,
}

/// Owner of the on-disk cache. Create one at startup and hand clones to every
/// component that needs the store; clones share the same single connection.
#[derive(Debug, Clone)]
pub struct LocalStore {
    pool: SqlitePool,
}

impl LocalStore {
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, DatabaseError> {
        let options = config.connect_options()?;
        let policy = RetryPolicy::new(config.connect_retries, config.connect_delay);

        // One connection: every scope holds it exclusively, which serializes
        // all reads and writes. It must also never be recycled, or an
        // in-memory database would vanish with it.
        let pool = retry_with_backoff("open local store", policy, move || {
            let options = options.clone();
            Box::pin(async move {
                SqlitePoolOptions::new()
                    .max_connections(1)
                    .min_connections(1)
                    .idle_timeout(None)
                    .max_lifetime(None)
                    .connect_with(options)
                    .await
            })
        })
        .await
        .map_err(|e| DatabaseError::RetryExhausted(e.to_string()))?;

        let store = Self { pool };
        store.ensure_schema().await?;
        tracing::info!(url = %config.url, "local store ready");
        Ok(store)
    }

    pub async fn in_memory() -> Result<Self, DatabaseError> {
        Self::connect(&DatabaseConfig::in_memory()).await
    }

    pub async fn ensure_schema(&self) -> Result<(), DatabaseError> {
        sqlx::raw_sql(SCHEMA)
            .execute(&self.pool)
            .await
            .map_err(|e| DatabaseError::Query(e.to_string()))?;
        Ok(())
    }

    /// Opens a unit of work. Nothing done through the scope is visible to
    /// other scopes until [`StoreScope::commit`] succeeds.
    pub async fn scope(&self) -> Result<StoreScope, DatabaseError> {
        let tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DatabaseError::Transaction(e.to_string()))?;
        Ok(StoreScope { tx, pending: 0 })
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }

    #[cfg(test)]
    pub(crate) fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

pub struct StoreScope {
    tx: Transaction<'static, Sqlite>,
    pending: usize,
}

impl StoreScope {
    pub fn has_changes(&self) -> bool {
        self.pending > 0
    }

    pub async fn insert<R: Record>(&mut self, record: &R) -> Result<RecordHandle, DatabaseError> {
        let values = record.values();
        let columns = values
            .iter()
            .map(|(column, _)| *column)
            .collect::<Vec<_>>()
            .join(", ");

        let mut qb = QueryBuilder::<Sqlite>::new(format!(
            "INSERT INTO {} ({columns}) VALUES (",
            R::KIND.table()
        ));
        for (i, (_, value)) in values.into_iter().enumerate() {
            if i > 0 {
                qb.push(", ");
            }
            value.push_bind(&mut qb);
        }
        qb.push(")");

        let result = qb
            .build()
            .execute(&mut *self.tx)
            .await
            .map_err(|e| DatabaseError::Query(e.to_string()))?;

        self.pending += 1;
        let handle = RecordHandle::new(result.last_insert_rowid());
        tracing::trace!(kind = %R::KIND, %handle, "inserted");
        Ok(handle)
    }

    /// Overwrites every column of the row behind `handle`.
    pub async fn update<R: Record>(
        &mut self,
        handle: RecordHandle,
        record: &R,
    ) -> Result<(), DatabaseError> {
        let mut qb = QueryBuilder::<Sqlite>::new(format!("UPDATE {} SET ", R::KIND.table()));
        for (i, (column, value)) in record.values().into_iter().enumerate() {
            if i > 0 {
                qb.push(", ");
            }
            qb.push(column).push(" = ");
            value.push_bind(&mut qb);
        }
        qb.push(" WHERE row_id = ").push_bind(handle.as_i64());

        qb.build()
            .execute(&mut *self.tx)
            .await
            .map_err(|e| DatabaseError::Query(e.to_string()))?;

        self.pending += 1;
        tracing::trace!(kind = %R::KIND, %handle, "updated");
        Ok(())
    }

    /// All records of kind `R` matching `predicate`, or every record when no
    /// predicate is given. An empty result means "no results", not an error.
    /// Rows come back in storage order.
    pub async fn query<R: Record>(
        &mut self,
        predicate: Option<&Predicate>,
    ) -> Result<Vec<Stored<R>>, DatabaseError> {
        let mut qb = QueryBuilder::<Sqlite>::new(format!("SELECT * FROM {}", R::KIND.table()));
        if let Some(predicate) = predicate {
            qb.push(" WHERE ");
            predicate.push_sql(&mut qb);
        }

        let rows = qb
            .build()
            .fetch_all(&mut *self.tx)
            .await
            .map_err(|e| DatabaseError::Query(e.to_string()))?;

        let records = rows
            .iter()
            .map(|row| {
                Ok(Stored {
                    handle: RecordHandle::new(row.try_get("row_id")?),
                    record: R::from_row(row)?,
                })
            })
            .collect::<Result<Vec<_>, sqlx::Error>>()?;

        tracing::trace!(
            kind = %R::KIND,
            predicate = %predicate.map(|p| p.to_string()).unwrap_or_default(),
            count = records.len(),
            "queried"
        );
        Ok(records)
    }

    pub async fn batch_delete<R: Record>(
        &mut self,
        predicate: Option<&Predicate>,
    ) -> Result<u64, DatabaseError> {
        let mut qb = QueryBuilder::<Sqlite>::new(format!("DELETE FROM {}", R::KIND.table()));
        if let Some(predicate) = predicate {
            qb.push(" WHERE ");
            predicate.push_sql(&mut qb);
        }

        let deleted = qb
            .build()
            .execute(&mut *self.tx)
            .await
            .map_err(|e| DatabaseError::Query(e.to_string()))?
            .rows_affected();

        if deleted > 0 {
            self.pending += 1;
        }
        tracing::debug!(kind = %R::KIND, deleted, "batch delete");
        Ok(deleted)
    }

    /// Makes the scope's changes durable. A scope without changes is closed
    /// without touching the database.
    pub async fn commit(self) -> Result<(), DatabaseError> {
        if self.pending == 0 {
            return self.rollback().await;
        }

        let pending = self.pending;
        self.tx.commit().await.map_err(|e| {
            tracing::error!(pending, error = %e, "commit failed");
            DatabaseError::Commit(e.to_string())
        })
    }

    pub async fn rollback(self) -> Result<(), DatabaseError> {
        self.tx
            .rollback()
            .await
            .map_err(|e| DatabaseError::Transaction(e.to_string()))
    }
}
