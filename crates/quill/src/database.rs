//! The CRUD and pagination surface.

use std::sync::Arc;

use quill_core::builder::{Delete, Insert, Select, Update, Upsert};
use quill_core::page::DEFAULT_ITEMS_PER_PAGE;
use quill_core::{
    Dialect, Entity, FromRow, FromSqlValue, Page, PagePlan, ParamSet, Params, Row, SqlValue,
    Statement, ToSqlValue, PRIMARY_KEY_CONVENTION,
};
use tracing::debug;

use crate::error::{Error, Result};
use crate::executor::Executor;
use crate::options::Options;
use crate::tables::{DeclaredTableNames, TableNameResolver, TableNames};

/// Entity-level reads and writes plus offset pagination over an
/// [`Executor`].
///
/// The executor is borrowed for each call and never closed by the database.
/// Every operation is a single attempt; failures from the executor are
/// returned unchanged.
#[derive(Debug)]
pub struct Database<X> {
    executor: X,
    options: Options,
    tables: TableNames,
}

impl<X: Executor> Database<X> {
    /// Creates a database with default [`Options`].
    pub fn new(executor: X) -> Self {
        Self::with_options(executor, Options::default())
    }

    /// Creates a database with the given options.
    pub fn with_options(executor: X, options: Options) -> Self {
        Self {
            executor,
            options,
            tables: TableNames::new(
                Box::new(DeclaredTableNames),
                options.lower_case_table_names,
            ),
        }
    }

    /// Replaces the table-name resolver.
    #[must_use]
    pub fn with_resolver(mut self, resolver: impl TableNameResolver + 'static) -> Self {
        self.tables = TableNames::new(Box::new(resolver), self.options.lower_case_table_names);
        self
    }

    /// Returns the executor.
    pub const fn executor(&self) -> &X {
        &self.executor
    }

    /// Returns the options.
    pub const fn options(&self) -> &Options {
        &self.options
    }

    /// Returns the dialect statements are written for.
    pub fn dialect(&self) -> &'static dyn Dialect {
        self.options.dialect.policy()
    }

    /// Returns the resolved table name of `E`.
    pub fn table_name<E: Entity>(&self) -> Arc<str> {
        self.tables.get::<E>()
    }

    fn key_of<E: Entity>(id: impl ToSqlValue) -> Result<ParamSet> {
        Ok(ParamSet::new().with(E::META.primary_key, id)?)
    }

    // Reads

    /// Returns every row of `E`'s table.
    ///
    /// # Errors
    ///
    /// Returns executor and row-mapping errors.
    pub async fn all<E: Entity>(&self) -> Result<Vec<E>> {
        let table = self.table_name::<E>();
        let statement = Select::from(self.dialect(), &table).build()?;
        self.fetch_all(&statement).await
    }

    /// Returns the rows of `E`'s table matching every field of `filter`.
    ///
    /// # Errors
    ///
    /// Returns [`quill_core::Error::InvalidArgument`] for an empty filter,
    /// plus executor and row-mapping errors.
    pub async fn all_where<E: Entity>(&self, filter: &dyn Params) -> Result<Vec<E>> {
        let table = self.table_name::<E>();
        let statement = Select::from(self.dialect(), &table)
            .filter(filter)
            .build()?;
        self.fetch_all(&statement).await
    }

    /// Returns the row whose key equals `id`, if any.
    ///
    /// # Errors
    ///
    /// Returns executor and row-mapping errors.
    pub async fn get<E: Entity>(&self, id: impl ToSqlValue) -> Result<Option<E>> {
        let key = Self::key_of::<E>(id)?;
        self.get_where(&key).await
    }

    /// Returns the first row matching every field of `filter`, if any.
    ///
    /// # Errors
    ///
    /// Returns [`quill_core::Error::InvalidArgument`] for an empty filter,
    /// plus executor and row-mapping errors.
    pub async fn get_where<E: Entity>(&self, filter: &dyn Params) -> Result<Option<E>> {
        let table = self.table_name::<E>();
        let statement = Select::from(self.dialect(), &table)
            .filter(filter)
            .first()
            .build()?;
        self.fetch_first(&statement).await
    }

    /// Returns the first row of `E`'s table in whatever order the database
    /// yields, if any.
    ///
    /// # Errors
    ///
    /// Returns executor and row-mapping errors.
    pub async fn first<E: Entity>(&self) -> Result<Option<E>> {
        let table = self.table_name::<E>();
        let statement = Select::from(self.dialect(), &table).first().build()?;
        self.fetch_first(&statement).await
    }

    // Writes

    /// Inserts a row and returns the key the database assigned.
    ///
    /// The key column of `E` is left out of the insert.
    ///
    /// # Errors
    ///
    /// Returns [`quill_core::Error::InvalidArgument`] if `data` has no
    /// column besides the key, [`Error::EmptyResult`] if no key comes back,
    /// plus executor errors.
    pub async fn insert<E: Entity>(&self, data: &dyn Params) -> Result<i64> {
        let table = self.table_name::<E>();
        let statement = Insert::into(self.dialect(), &table)
            .data(data)
            .key(E::META.primary_key)
            .build()?;
        self.fetch_key(&statement, E::META.primary_key).await
    }

    /// Inserts `data` under the single-field `key`, or updates the existing
    /// row with that key. Returns the key read back as `K`.
    ///
    /// # Errors
    ///
    /// Returns [`quill_core::Error::InvalidArgument`] unless `key` has
    /// exactly one field, [`quill_core::Error::UnsupportedOperation`] when
    /// the dialect has no upsert, [`quill_core::Error::TypeMismatch`] if the
    /// key does not convert to `K`, plus executor errors.
    pub async fn insert_or_update<E: Entity, K: FromSqlValue>(
        &self,
        key: &dyn Params,
        data: &dyn Params,
    ) -> Result<K> {
        let table = self.table_name::<E>();
        let statement = Upsert::into(self.dialect(), &table)
            .data(data)
            .key(key)
            .build()?;
        let key_name = key
            .fields()
            .iter()
            .next()
            .map_or_else(|| String::from(PRIMARY_KEY_CONVENTION), String::from);
        self.fetch_key(&statement, &key_name).await
    }

    /// [`insert_or_update`](Self::insert_or_update) keyed by `E`'s primary
    /// key.
    ///
    /// # Errors
    ///
    /// See [`insert_or_update`](Self::insert_or_update).
    pub async fn insert_or_update_by_id<E, K>(&self, id: K, data: &dyn Params) -> Result<K>
    where
        E: Entity,
        K: ToSqlValue + FromSqlValue,
    {
        let key = Self::key_of::<E>(id)?;
        self.insert_or_update::<E, K>(&key, data).await
    }

    /// Inserts `data`, updating every column on conflict. Returns the number
    /// of affected rows.
    ///
    /// # Errors
    ///
    /// Returns [`quill_core::Error::UnsupportedOperation`] when the dialect
    /// has no key-less upsert, plus executor errors.
    pub async fn upsert<E: Entity>(&self, data: &dyn Params) -> Result<u64> {
        let table = self.table_name::<E>();
        let statement = Upsert::into(self.dialect(), &table).data(data).build()?;
        self.executor.execute(&statement).await
    }

    /// Updates the row whose key equals `id`. Returns the number of affected
    /// rows, which is 0 when nothing matched.
    ///
    /// # Errors
    ///
    /// Returns [`quill_core::Error::InvalidArgument`] if `data` has no
    /// column besides the key, plus executor errors.
    pub async fn update<E: Entity>(&self, id: impl ToSqlValue, data: &dyn Params) -> Result<u64> {
        let key = Self::key_of::<E>(id)?;
        self.update_where::<E>(&key, data).await
    }

    /// Updates the rows matching every field of `filter`. Returns the number
    /// of affected rows.
    ///
    /// # Errors
    ///
    /// Returns [`quill_core::Error::InvalidArgument`] for an empty filter or
    /// nothing to set, plus executor errors.
    pub async fn update_where<E: Entity>(
        &self,
        filter: &dyn Params,
        data: &dyn Params,
    ) -> Result<u64> {
        let table = self.table_name::<E>();
        let statement = Update::table(self.dialect(), &table)
            .data(data)
            .filter(filter)
            .build()?;
        self.executor.execute(&statement).await
    }

    /// Deletes the row whose key equals `id`. Returns whether a row was
    /// deleted.
    ///
    /// # Errors
    ///
    /// Returns executor errors.
    pub async fn delete<E: Entity>(&self, id: impl ToSqlValue) -> Result<bool> {
        let key = Self::key_of::<E>(id)?;
        self.delete_where::<E>(&key).await
    }

    /// Deletes the rows matching every field of `filter`. Returns whether
    /// any row was deleted.
    ///
    /// # Errors
    ///
    /// Returns [`quill_core::Error::InvalidArgument`] for an empty filter,
    /// plus executor errors.
    pub async fn delete_where<E: Entity>(&self, filter: &dyn Params) -> Result<bool> {
        let table = self.table_name::<E>();
        let statement = Delete::from(self.dialect(), &table)
            .filter(filter)
            .build()?;
        Ok(self.executor.execute(&statement).await? > 0)
    }

    // Pagination

    /// Reads page `page` of `sql`, `items_per_page` rows at a time.
    ///
    /// Runs a COUNT derived from `sql` first, then `sql` with a row window
    /// appended. The two statements are separate round trips and only see
    /// the same snapshot inside a suitably isolated transaction.
    ///
    /// # Errors
    ///
    /// Returns [`quill_core::Error::MalformedQuery`] if `sql` is not a single
    /// SELECT with a top-level FROM, [`quill_core::Error::InvalidArgument`]
    /// for a page size below 1 or caller parameters named `offset` or
    /// `limit`, plus executor and row-mapping errors.
    pub async fn page<T: FromRow>(
        &self,
        sql: &str,
        page: i64,
        params: &dyn Params,
        items_per_page: i64,
    ) -> Result<Page<T>> {
        let (plan, total) = self.plan_page(sql, page, params, items_per_page).await?;
        let rows = self.executor.fetch_rows(&plan.window).await?;
        let items = rows
            .iter()
            .map(T::from_row)
            .collect::<quill_core::Result<Vec<_>>>()?;
        Ok(plan.finish(total, items)?)
    }

    /// [`page`](Self::page) with the default page size of 10.
    ///
    /// # Errors
    ///
    /// See [`page`](Self::page).
    pub async fn page_default<T: FromRow>(
        &self,
        sql: &str,
        page: i64,
        params: &dyn Params,
    ) -> Result<Page<T>> {
        self.page(sql, page, params, DEFAULT_ITEMS_PER_PAGE).await
    }

    /// Reads a page of a two-table join.
    ///
    /// Each row is split at the last column named `split_on` (compared
    /// case-insensitively, never the first column); the columns before it map
    /// to `A`, the rest to `B`, and `map` combines the two. Joins keyed on
    /// `Id` pass [`PRIMARY_KEY_CONVENTION`].
    ///
    /// # Errors
    ///
    /// As [`page`](Self::page), plus [`quill_core::Error::MissingColumn`]
    /// when a row has no split column.
    pub async fn page_join<A, B, T>(
        &self,
        sql: &str,
        page: i64,
        params: &dyn Params,
        items_per_page: i64,
        split_on: &str,
        map: impl FnMut(A, B) -> T,
    ) -> Result<Page<T>>
    where
        A: FromRow,
        B: FromRow,
    {
        let (plan, total) = self.plan_page(sql, page, params, items_per_page).await?;
        let rows = self.executor.fetch_rows(&plan.window).await?;
        let items = map_joined(&rows, split_on, map)?;
        Ok(plan.finish(total, items)?)
    }

    async fn plan_page(
        &self,
        sql: &str,
        page: i64,
        params: &dyn Params,
        items_per_page: i64,
    ) -> Result<(PagePlan, i64)> {
        let plan = PagePlan::new(self.dialect(), sql, page, params, items_per_page)?;
        let total = self
            .executor
            .fetch_scalar(&plan.count)
            .await?
            .ok_or(Error::EmptyResult)?;
        let total = scalar_as::<i64>(total, "COUNT")?;
        debug!(page, items_per_page, total, "Counted page rows");
        Ok((plan, total))
    }

    // Raw statements

    /// Runs `sql` and maps every row.
    ///
    /// # Errors
    ///
    /// Returns executor and row-mapping errors.
    pub async fn query<T: FromRow>(&self, sql: &str, params: &dyn Params) -> Result<Vec<T>> {
        self.fetch_all(&Statement::new(sql, params.to_param_set()))
            .await
    }

    /// Runs `sql` and maps the first row, if any.
    ///
    /// # Errors
    ///
    /// Returns executor and row-mapping errors.
    pub async fn query_first<T: FromRow>(
        &self,
        sql: &str,
        params: &dyn Params,
    ) -> Result<Option<T>> {
        self.fetch_first(&Statement::new(sql, params.to_param_set()))
            .await
    }

    /// Runs a two-table join and maps every row.
    ///
    /// Rows are split as in [`page_join`](Self::page_join).
    ///
    /// # Errors
    ///
    /// Returns [`quill_core::Error::MissingColumn`] when a row has no split
    /// column, plus executor and row-mapping errors.
    pub async fn query_join<A, B, T>(
        &self,
        sql: &str,
        params: &dyn Params,
        split_on: &str,
        map: impl FnMut(A, B) -> T,
    ) -> Result<Vec<T>>
    where
        A: FromRow,
        B: FromRow,
    {
        let statement = Statement::new(sql, params.to_param_set());
        let rows = self.executor.fetch_rows(&statement).await?;
        map_joined(&rows, split_on, map)
    }

    /// Runs a two-table join and maps the first row, if any.
    ///
    /// # Errors
    ///
    /// See [`query_join`](Self::query_join).
    pub async fn query_first_join<A, B, T>(
        &self,
        sql: &str,
        params: &dyn Params,
        split_on: &str,
        map: impl FnOnce(A, B) -> T,
    ) -> Result<Option<T>>
    where
        A: FromRow,
        B: FromRow,
    {
        let statement = Statement::new(sql, params.to_param_set());
        let rows = self.executor.fetch_rows(&statement).await?;
        let Some(row) = rows.first() else {
            return Ok(None);
        };
        let (left, right) = row.split(split_on)?;
        Ok(Some(map(A::from_row(&left)?, B::from_row(&right)?)))
    }

    /// Runs `sql` and reads the first column of the first row, if any.
    ///
    /// A NULL scalar reads as `None` only when `T` is an `Option`.
    ///
    /// # Errors
    ///
    /// Returns [`quill_core::Error::TypeMismatch`] if the value does not
    /// convert to `T`, plus executor errors.
    pub async fn query_scalar<T: FromSqlValue>(
        &self,
        sql: &str,
        params: &dyn Params,
    ) -> Result<Option<T>> {
        let statement = Statement::new(sql, params.to_param_set());
        match self.executor.fetch_scalar(&statement).await? {
            Some(value) => Ok(Some(scalar_as(value, "scalar")?)),
            None => Ok(None),
        }
    }

    /// Runs `sql` and returns the number of affected rows.
    ///
    /// # Errors
    ///
    /// Returns executor errors.
    pub async fn execute(&self, sql: &str, params: &dyn Params) -> Result<u64> {
        self.executor
            .execute(&Statement::new(sql, params.to_param_set()))
            .await
    }

    async fn fetch_all<T: FromRow>(&self, statement: &Statement) -> Result<Vec<T>> {
        let rows = self.executor.fetch_rows(statement).await?;
        Ok(rows
            .iter()
            .map(T::from_row)
            .collect::<quill_core::Result<Vec<_>>>()?)
    }

    async fn fetch_first<T: FromRow>(&self, statement: &Statement) -> Result<Option<T>> {
        let rows = self.executor.fetch_rows(statement).await?;
        Ok(rows.first().map(T::from_row).transpose()?)
    }

    async fn fetch_key<K: FromSqlValue>(&self, statement: &Statement, key: &str) -> Result<K> {
        let value = self
            .executor
            .fetch_scalar(statement)
            .await?
            .ok_or(Error::EmptyResult)?;
        scalar_as(value, key)
    }
}

fn map_joined<A, B, T>(
    rows: &[Row],
    split_on: &str,
    mut map: impl FnMut(A, B) -> T,
) -> Result<Vec<T>>
where
    A: FromRow,
    B: FromRow,
{
    let mut items = Vec::with_capacity(rows.len());
    for row in rows {
        let (left, right) = row.split(split_on)?;
        items.push(map(A::from_row(&left)?, B::from_row(&right)?));
    }
    Ok(items)
}

fn scalar_as<T: FromSqlValue>(value: SqlValue, column: &str) -> Result<T> {
    T::from_sql_value(value).ok_or_else(|| {
        Error::Core(quill_core::Error::TypeMismatch {
            column: String::from(column),
            expected: std::any::type_name::<T>(),
        })
    })
}
