use std::marker::PhantomData;
use std::sync::Arc;

use serde_json::Value;
use sqlx::mysql::MySqlArguments;
use sqlx::query::Query;
use sqlx::{MySql, MySqlPool};
use tracing::debug;

use crudkit_data::query::{self, ListOptions, Statement};
use crudkit_data::raw::{check_raw_query_allowed, prepare_raw_query, validate_raw_params};
use crudkit_data::{DataError, Entity, RawQueryRegistry, Row, SqlValue};

use crate::error::SqlxErrorExt;
use crate::scan::{scan_raw_row, scan_row};

/// Generic repository for one entity kind over a shared MySQL pool.
///
/// Statements are assembled by `crudkit-data`'s pure builders from the
/// entity's metadata; this type only binds and executes them, one statement
/// per call, and maps returned rows to generic field maps.
///
/// # Example
///
/// ```ignore
/// let registry = Arc::new(RawQueryRegistry::new());
/// let repo = Repository::<User>::with_raw_queries(pool.clone(), registry);
/// let rows = repo.list(&ListOptions::new()).await?;
/// ```
pub struct Repository<T: Entity> {
    pool: MySqlPool,
    raw_queries: Arc<RawQueryRegistry>,
    _marker: PhantomData<T>,
}

impl<T: Entity> Repository<T> {
    pub fn new(pool: MySqlPool) -> Self {
        Self::with_raw_queries(pool, Arc::new(RawQueryRegistry::new()))
    }

    /// Construct with a shared raw-query registry handle.
    pub fn with_raw_queries(pool: MySqlPool, raw_queries: Arc<RawQueryRegistry>) -> Self {
        Self {
            pool,
            raw_queries,
            _marker: PhantomData,
        }
    }

    /// Get the underlying pool reference.
    pub fn pool(&self) -> &MySqlPool {
        &self.pool
    }

    /// Insert one record. Defaultable columns carrying empty values are
    /// left to the database's own defaults.
    pub async fn add(&self, entity: &T) -> Result<(), DataError> {
        let stmt = query::build_insert(
            T::table_name(),
            T::columns(),
            entity.values(),
            T::defaultable(),
        );
        self.execute(stmt).await
    }

    /// Insert a batch in a single multi-row statement.
    pub async fn bulk_add(&self, entities: &[T]) -> Result<(), DataError> {
        if entities.is_empty() {
            return Ok(());
        }
        let rows = entities.iter().map(Entity::values).collect();
        let stmt = query::build_bulk_insert(T::table_name(), T::columns(), rows, T::defaultable());
        self.execute(stmt).await
    }

    /// Update the given columns of an active record. Editing a soft-deleted
    /// record (or passing no columns) succeeds without affecting a row.
    pub async fn edit(
        &self,
        id: &str,
        columns: &[&str],
        values: Vec<SqlValue>,
    ) -> Result<(), DataError> {
        match query::build_update(T::table_name(), T::primary_key(), id, columns, values) {
            Some(stmt) => self.execute(stmt).await,
            None => Ok(()),
        }
    }

    /// Soft-delete an active record; no-op when already deleted.
    pub async fn delete(&self, id: &str) -> Result<(), DataError> {
        self.execute(query::build_soft_delete(T::table_name(), T::primary_key(), id))
            .await
    }

    /// Restore a soft-deleted record; no-op when already active.
    pub async fn undelete(&self, id: &str) -> Result<(), DataError> {
        self.execute(query::build_undelete(T::table_name(), T::primary_key(), id))
            .await
    }

    /// Fetch one active record by id, or `NotFound`.
    pub async fn detail(&self, id: &str, fields: &[String]) -> Result<Row, DataError> {
        self.fetch_detail(id, fields, false).await
    }

    /// Fetch one soft-deleted record by id, or `NotFound`.
    pub async fn dead_detail(&self, id: &str, fields: &[String]) -> Result<Row, DataError> {
        self.fetch_detail(id, fields, true).await
    }

    /// List active records.
    pub async fn list(&self, opts: &ListOptions) -> Result<Vec<Row>, DataError> {
        let stmt = query::build_list(T::table_name(), T::columns(), T::primary_key(), opts, false);
        self.fetch_rows(stmt).await
    }

    /// List soft-deleted records.
    pub async fn dead_list(&self, opts: &ListOptions) -> Result<Vec<Row>, DataError> {
        let stmt = query::build_list(T::table_name(), T::columns(), T::primary_key(), opts, true);
        self.fetch_rows(stmt).await
    }

    /// Fetch active records matching an id list; empty ids yield an empty
    /// result, not an error.
    pub async fn bulk(&self, ids: &[String], opts: &ListOptions) -> Result<Vec<Row>, DataError> {
        match query::build_bulk(T::table_name(), T::columns(), T::primary_key(), ids, opts) {
            Some(stmt) => self.fetch_rows(stmt).await,
            None => Ok(Vec::new()),
        }
    }

    /// List with limit 1; returns the row or an empty map when none match.
    pub async fn list_one(&self, opts: &ListOptions) -> Result<Row, DataError> {
        let mut opts = opts.clone();
        opts.limit = 1;
        opts.cursor = None;
        let mut rows = self.list(&opts).await?;
        if rows.is_empty() {
            return Ok(Row::new());
        }
        Ok(rows.remove(0))
    }

    /// Execute a registered raw query through the full gate: lookup,
    /// deny/allow validation, exact parameter check, positional
    /// substitution, hard row limit. Rows come back with best-effort
    /// native typing.
    pub async fn raw(
        &self,
        name: &str,
        params: &serde_json::Map<String, Value>,
    ) -> Result<Vec<Row>, DataError> {
        let Some(template) = self.raw_queries.get(T::table_name(), name) else {
            return Err(DataError::QueryNotAllowed(format!(
                "unknown raw query: {name}"
            )));
        };
        check_raw_query_allowed(&template)?;
        validate_raw_params(&template, params)?;
        let (sql, args) = prepare_raw_query(&template, params);

        debug!(table = T::table_name(), query = name, sql = %sql, "executing raw query");
        let mut q = sqlx::query(&sql);
        for arg in args {
            q = bind_json(q, arg);
        }
        let rows = q
            .fetch_all(&self.pool)
            .await
            .map_err(|e| e.into_data_error())?;
        Ok(rows.iter().map(scan_raw_row).collect())
    }

    async fn fetch_detail(&self, id: &str, fields: &[String], dead: bool) -> Result<Row, DataError> {
        let stmt = query::build_detail(
            T::table_name(),
            T::columns(),
            T::primary_key(),
            id,
            fields,
            dead,
        );
        debug!(table = T::table_name(), sql = %stmt.sql, "executing statement");

        let Statement { sql, args } = stmt;
        let mut q = sqlx::query(&sql);
        for arg in args {
            q = bind_value(q, arg);
        }
        let row = q
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| e.into_data_error())?;
        match row {
            Some(row) => scan_row(&row, T::schema()),
            None => Err(DataError::NotFound(format!("{} {}", T::table_name(), id))),
        }
    }

    async fn execute(&self, stmt: Statement) -> Result<(), DataError> {
        debug!(table = T::table_name(), sql = %stmt.sql, "executing statement");
        let Statement { sql, args } = stmt;
        let mut q = sqlx::query(&sql);
        for arg in args {
            q = bind_value(q, arg);
        }
        q.execute(&self.pool)
            .await
            .map_err(|e| e.into_data_error())?;
        Ok(())
    }

    async fn fetch_rows(&self, stmt: Statement) -> Result<Vec<Row>, DataError> {
        debug!(table = T::table_name(), sql = %stmt.sql, "executing statement");
        let Statement { sql, args } = stmt;
        let mut q = sqlx::query(&sql);
        for arg in args {
            q = bind_value(q, arg);
        }
        let rows = q
            .fetch_all(&self.pool)
            .await
            .map_err(|e| e.into_data_error())?;
        rows.iter().map(|row| scan_row(row, T::schema())).collect()
    }
}

impl<T: Entity> Clone for Repository<T> {
    fn clone(&self) -> Self {
        Self {
            pool: self.pool.clone(),
            raw_queries: self.raw_queries.clone(),
            _marker: PhantomData,
        }
    }
}

fn bind_value<'q>(
    query: Query<'q, MySql, MySqlArguments>,
    value: SqlValue,
) -> Query<'q, MySql, MySqlArguments> {
    match value {
        SqlValue::Null => query.bind(None::<String>),
        SqlValue::Text(s) => query.bind(s),
        SqlValue::Int(n) => query.bind(n),
        SqlValue::Date(d) => query.bind(d),
        SqlValue::DateTime(t) => query.bind(t),
    }
}

fn bind_json<'q>(
    query: Query<'q, MySql, MySqlArguments>,
    value: Value,
) -> Query<'q, MySql, MySqlArguments> {
    match value {
        Value::Null => query.bind(None::<String>),
        Value::Bool(b) => query.bind(b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                query.bind(i)
            } else {
                query.bind(n.as_f64().unwrap_or(0.0))
            }
        }
        Value::String(s) => query.bind(s),
        other => query.bind(other.to_string()),
    }
}
