//! The connection collaborator.

use quill_core::{Row, SqlValue, Statement};

use crate::error::Result;

/// Runs statements against a database.
///
/// Implementations receive statements with `@name` placeholders and are
/// responsible for binding them the way their driver expects. A statement's
/// text may hold several `;`-separated statements; they must run in order on
/// the same connection, and the rows of the last one are returned.
///
/// When the implementation has an ambient transaction open, every statement
/// runs inside it.
#[allow(async_fn_in_trait)]
pub trait Executor {
    /// Runs a statement and returns its rows.
    async fn fetch_rows(&self, statement: &Statement) -> Result<Vec<Row>>;

    /// Runs a statement and returns the first column of the first row.
    async fn fetch_scalar(&self, statement: &Statement) -> Result<Option<SqlValue>> {
        let rows = self.fetch_rows(statement).await?;
        Ok(rows.first().and_then(Row::first).cloned())
    }

    /// Runs a statement and returns the number of affected rows.
    async fn execute(&self, statement: &Statement) -> Result<u64>;
}

impl<X: Executor + ?Sized> Executor for &X {
    async fn fetch_rows(&self, statement: &Statement) -> Result<Vec<Row>> {
        (**self).fetch_rows(statement).await
    }

    async fn fetch_scalar(&self, statement: &Statement) -> Result<Option<SqlValue>> {
        (**self).fetch_scalar(statement).await
    }

    async fn execute(&self, statement: &Statement) -> Result<u64> {
        (**self).execute(statement).await
    }
}
