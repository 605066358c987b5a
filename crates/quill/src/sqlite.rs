//! SQLite executor built on an sqlx pool.

use std::ops::{Deref, DerefMut};

use quill_core::dialect::SqliteDialect;
use quill_core::params::bind_named;
use quill_core::rewrite::split_statements;
use quill_core::{Row, SqlValue, Statement};
use sqlx::pool::PoolConnection;
use sqlx::query::Query;
use sqlx::sqlite::{SqliteArguments, SqliteConnection, SqlitePool, SqliteRow};
use sqlx::{Column as _, Row as _, Sqlite, Transaction, TypeInfo as _, ValueRef as _};
use tokio::sync::{MappedMutexGuard, Mutex, MutexGuard};
use tracing::debug;

use crate::error::{Error, Result};
use crate::executor::Executor;

/// Runs statements on a SQLite pool, with an optional ambient transaction.
///
/// While a transaction opened with [`begin`](Self::begin) is active, every
/// statement runs on the transaction's connection.
pub struct SqliteExecutor {
    pool: SqlitePool,
    tx: Mutex<Option<Transaction<'static, Sqlite>>>,
}

impl SqliteExecutor {
    /// Wraps an existing pool.
    #[must_use]
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            tx: Mutex::new(None),
        }
    }

    /// Connects to `url`.
    ///
    /// # Errors
    ///
    /// Returns the connection error from sqlx.
    pub async fn connect(url: &str) -> Result<Self> {
        Ok(Self::new(SqlitePool::connect(url).await?))
    }

    /// Returns the underlying pool.
    #[must_use]
    pub const fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Opens the ambient transaction.
    ///
    /// # Errors
    ///
    /// Returns [`Error::TransactionAlreadyActive`] if one is open.
    pub async fn begin(&self) -> Result<()> {
        let mut guard = self.tx.lock().await;
        if guard.is_some() {
            return Err(Error::TransactionAlreadyActive);
        }
        *guard = Some(self.pool.begin().await?);
        debug!("Transaction started");
        Ok(())
    }

    /// Commits the ambient transaction.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoActiveTransaction`] if none is open.
    pub async fn commit(&self) -> Result<()> {
        let tx = self
            .tx
            .lock()
            .await
            .take()
            .ok_or(Error::NoActiveTransaction)?;
        tx.commit().await?;
        debug!("Transaction committed");
        Ok(())
    }

    /// Rolls back the ambient transaction.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoActiveTransaction`] if none is open.
    pub async fn rollback(&self) -> Result<()> {
        let tx = self
            .tx
            .lock()
            .await
            .take()
            .ok_or(Error::NoActiveTransaction)?;
        tx.rollback().await?;
        debug!("Transaction rolled back");
        Ok(())
    }

    /// Whether an ambient transaction is open.
    pub async fn in_transaction(&self) -> bool {
        self.tx.lock().await.is_some()
    }

    async fn conn(&self) -> Result<Conn<'_>> {
        let guard = self.tx.lock().await;
        match MutexGuard::try_map(guard, |tx| tx.as_mut()) {
            Ok(tx) => Ok(Conn::Tx(tx)),
            Err(guard) => {
                drop(guard);
                Ok(Conn::Pool(self.pool.acquire().await?))
            }
        }
    }
}

impl std::fmt::Debug for SqliteExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteExecutor")
            .field("pool", &self.pool)
            .finish_non_exhaustive()
    }
}

impl Executor for SqliteExecutor {
    async fn fetch_rows(&self, statement: &Statement) -> Result<Vec<Row>> {
        let mut conn = self.conn().await?;
        let mut rows = Vec::new();
        for piece in split_statements(&statement.sql, &SqliteDialect) {
            let (sql, values) = bind_named(piece, &statement.params, &SqliteDialect)?;
            debug!(sql = %sql, params = values.len(), "Executing SQL");
            let fetched = values
                .into_iter()
                .fold(sqlx::query(&sql), bind_value)
                .fetch_all(&mut *conn)
                .await?;
            rows = fetched
                .iter()
                .map(decode_row)
                .collect::<std::result::Result<_, sqlx::Error>>()?;
        }
        Ok(rows)
    }

    async fn execute(&self, statement: &Statement) -> Result<u64> {
        let mut conn = self.conn().await?;
        let mut affected = 0;
        for piece in split_statements(&statement.sql, &SqliteDialect) {
            let (sql, values) = bind_named(piece, &statement.params, &SqliteDialect)?;
            debug!(sql = %sql, params = values.len(), "Executing SQL");
            affected += values
                .into_iter()
                .fold(sqlx::query(&sql), bind_value)
                .execute(&mut *conn)
                .await?
                .rows_affected();
        }
        Ok(affected)
    }
}

/// Either the ambient transaction or a pooled connection.
enum Conn<'a> {
    Tx(MappedMutexGuard<'a, Transaction<'static, Sqlite>>),
    Pool(PoolConnection<Sqlite>),
}

impl Deref for Conn<'_> {
    type Target = SqliteConnection;

    fn deref(&self) -> &SqliteConnection {
        match self {
            Self::Tx(tx) => &***tx,
            Self::Pool(conn) => &**conn,
        }
    }
}

impl DerefMut for Conn<'_> {
    fn deref_mut(&mut self) -> &mut SqliteConnection {
        match self {
            Self::Tx(tx) => &mut ***tx,
            Self::Pool(conn) => &mut **conn,
        }
    }
}

/// Binds a `SqlValue` parameter to a query.
fn bind_value<'q>(
    query: Query<'q, Sqlite, SqliteArguments<'q>>,
    value: SqlValue,
) -> Query<'q, Sqlite, SqliteArguments<'q>> {
    match value {
        SqlValue::Null => query.bind(Option::<i64>::None),
        SqlValue::Bool(b) => query.bind(b),
        SqlValue::Int(i) => query.bind(i),
        SqlValue::Float(f) => query.bind(f),
        SqlValue::Text(s) => query.bind(s),
        SqlValue::Blob(b) => query.bind(b),
    }
}

/// Decodes a row by the storage class of each value.
fn decode_row(row: &SqliteRow) -> std::result::Result<Row, sqlx::Error> {
    let mut columns = Vec::with_capacity(row.len());
    for (i, column) in row.columns().iter().enumerate() {
        let raw = row.try_get_raw(i)?;
        let value = if raw.is_null() {
            SqlValue::Null
        } else {
            match raw.type_info().name() {
                "INTEGER" | "BOOLEAN" => SqlValue::Int(row.try_get_unchecked(i)?),
                "REAL" => SqlValue::Float(row.try_get_unchecked(i)?),
                "BLOB" => SqlValue::Blob(row.try_get_unchecked(i)?),
                _ => SqlValue::Text(row.try_get_unchecked(i)?),
            }
        };
        columns.push((String::from(column.name()), value));
    }
    Ok(Row::new(columns))
}
