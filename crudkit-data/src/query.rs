//! Statement assembly for every CRUD, list and bulk operation shape.
//!
//! Builders here are pure: they take entity metadata plus per-request value
//! objects and return a [`Statement`]: SQL text with `?` placeholders and
//! the positional bind arguments. Execution belongs to backend crates.
//!
//! Every non-raw statement carries exactly one soft-delete predicate on the
//! nullable `deleted_at` column: `IS NULL` for the active shapes, `IS NOT
//! NULL` for the dead ones.

use crate::cursor::{PageCursor, DEFAULT_PAGE_LIMIT};
use crate::fields::{
    ensure_pagination_fields, escape_field, escape_fields, filter_fields, validate_order_by,
    SortOrder,
};
use crate::filter::{compile_filters, Filter};
use crate::value::SqlValue;

/// A fully assembled parameterized statement.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    pub sql: String,
    pub args: Vec<SqlValue>,
}

/// Per-request parameters for the list-shaped operations (List, DeadList,
/// Bulk, ListOne). Plain values, threaded explicitly; no per-request state
/// lives anywhere else.
#[derive(Debug, Clone)]
pub struct ListOptions {
    pub limit: i64,
    pub cursor: Option<PageCursor>,
    /// Requested order column; falls back to the primary key when not
    /// allow-listed.
    pub order_by: String,
    /// Requested direction; anything but `asc`/`desc` means descending.
    pub order: String,
    /// Requested projection; empty means all columns.
    pub fields: Vec<String>,
    pub filters: Vec<Filter>,
}

impl Default for ListOptions {
    fn default() -> Self {
        Self {
            limit: DEFAULT_PAGE_LIMIT,
            cursor: None,
            order_by: String::new(),
            order: String::new(),
            fields: Vec::new(),
            filters: Vec::new(),
        }
    }
}

impl ListOptions {
    pub fn new() -> Self {
        Self::default()
    }
}

fn soft_delete_predicate(dead: bool) -> String {
    if dead {
        "`deleted_at` IS NOT NULL".to_string()
    } else {
        "`deleted_at` IS NULL".to_string()
    }
}

/// Keyset predicate resuming after the cursor row: rows past the order-column
/// value, or tied on it with a primary key past the cursor's.
fn cursor_predicate(order_by: &str, primary_key: &str, order: SortOrder) -> String {
    let op = order.cursor_op();
    let ob = escape_field(order_by);
    let pk = escape_field(primary_key);
    format!("({ob} {op} ? OR ({ob} = ? AND {pk} {op} ?))")
}

fn cursor_args(cursor: &PageCursor) -> [SqlValue; 3] {
    [
        SqlValue::Text(cursor.last_value.clone()),
        SqlValue::Text(cursor.last_value.clone()),
        SqlValue::Text(cursor.last_id.clone()),
    ]
}

/// Render one row's VALUES tuple for a multi-row insert.
///
/// Defaultable columns carrying their semantic-zero value render as the
/// literal token `DEFAULT` instead of a placeholder, so rows in the same
/// statement may use database-side defaulting independently.
pub fn build_row_tokens(
    columns: &[&str],
    values: Vec<SqlValue>,
    defaultable: &[&str],
) -> (String, Vec<SqlValue>) {
    let mut tokens = Vec::with_capacity(columns.len());
    let mut args = Vec::new();

    for (col, value) in columns.iter().zip(values) {
        if defaultable.contains(col) && value.is_empty() {
            tokens.push("DEFAULT");
        } else {
            tokens.push("?");
            args.push(value);
        }
    }

    (format!("({})", tokens.join(", ")), args)
}

/// Single-row INSERT. Defaultable columns with an empty value are omitted
/// from both the column and value lists entirely, so the database applies
/// its own default or auto-generation.
pub fn build_insert(
    table: &str,
    columns: &[&str],
    values: Vec<SqlValue>,
    defaultable: &[&str],
) -> Statement {
    let mut final_cols = Vec::with_capacity(columns.len());
    let mut args = Vec::with_capacity(columns.len());

    for (col, value) in columns.iter().zip(values) {
        if defaultable.contains(col) && value.is_empty() {
            continue;
        }
        final_cols.push(*col);
        args.push(value);
    }

    let placeholders = vec!["?"; final_cols.len()].join(", ");
    let sql = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        escape_field(table),
        escape_fields(&final_cols).join(", "),
        placeholders,
    );

    Statement { sql, args }
}

/// Multi-row INSERT; one statement, per-row `DEFAULT` tokens via
/// [`build_row_tokens`].
pub fn build_bulk_insert(
    table: &str,
    columns: &[&str],
    rows: Vec<Vec<SqlValue>>,
    defaultable: &[&str],
) -> Statement {
    let mut row_tuples = Vec::with_capacity(rows.len());
    let mut args = Vec::new();

    for values in rows {
        let (tuple, row_args) = build_row_tokens(columns, values, defaultable);
        row_tuples.push(tuple);
        args.extend(row_args);
    }

    let sql = format!(
        "INSERT INTO {} ({}) VALUES {}",
        escape_field(table),
        escape_fields(columns).join(", "),
        row_tuples.join(", "),
    );

    Statement { sql, args }
}

/// UPDATE of the given columns, restricted to the active (non-soft-deleted)
/// row. Returns `None` for an empty column list: the edit is a no-op, not
/// an error.
pub fn build_update(
    table: &str,
    primary_key: &str,
    id: &str,
    columns: &[&str],
    values: Vec<SqlValue>,
) -> Option<Statement> {
    if columns.is_empty() {
        return None;
    }

    let set_parts: Vec<String> = columns
        .iter()
        .map(|col| format!("{} = ?", escape_field(col)))
        .collect();

    let sql = format!(
        "UPDATE {} SET {} WHERE {} = ? AND `deleted_at` IS NULL",
        escape_field(table),
        set_parts.join(", "),
        escape_field(primary_key),
    );

    let mut args = values;
    args.push(SqlValue::Text(id.to_string()));
    Some(Statement { sql, args })
}

/// Soft delete: stamp `deleted_at`, only on a currently active row. The
/// database evaluates the predicate atomically with the update, so
/// concurrent deletes resolve to one effect and one no-op.
pub fn build_soft_delete(table: &str, primary_key: &str, id: &str) -> Statement {
    Statement {
        sql: format!(
            "UPDATE {} SET `deleted_at` = NOW() WHERE {} = ? AND `deleted_at` IS NULL",
            escape_field(table),
            escape_field(primary_key),
        ),
        args: vec![SqlValue::Text(id.to_string())],
    }
}

/// Inverse of [`build_soft_delete`]; idempotent no-op on active rows.
pub fn build_undelete(table: &str, primary_key: &str, id: &str) -> Statement {
    Statement {
        sql: format!(
            "UPDATE {} SET `deleted_at` = NULL WHERE {} = ? AND `deleted_at` IS NOT NULL",
            escape_field(table),
            escape_field(primary_key),
        ),
        args: vec![SqlValue::Text(id.to_string())],
    }
}

/// Single-record fetch by primary key, active or dead per `dead`.
pub fn build_detail(
    table: &str,
    allowed: &[&str],
    primary_key: &str,
    id: &str,
    fields: &[String],
    dead: bool,
) -> Statement {
    let selected = escape_fields(&filter_fields(fields, allowed)).join(", ");
    let sql = format!(
        "SELECT {} FROM {} WHERE {} = ? AND {} LIMIT 1",
        selected,
        escape_field(table),
        escape_field(primary_key),
        soft_delete_predicate(dead),
    );

    Statement {
        sql,
        args: vec![SqlValue::Text(id.to_string())],
    }
}

/// List-shaped SELECT: compiled filters, the soft-delete predicate, an
/// optional keyset-cursor predicate, ORDER BY and a bound LIMIT.
pub fn build_list(
    table: &str,
    allowed: &[&str],
    primary_key: &str,
    opts: &ListOptions,
    dead: bool,
) -> Statement {
    let order_by = validate_order_by(&opts.order_by, allowed, primary_key);
    let order = SortOrder::parse(&opts.order);
    let fields = ensure_pagination_fields(filter_fields(&opts.fields, allowed), primary_key, order_by);
    let selected = escape_fields(&fields).join(", ");

    let (mut clauses, mut args) = compile_filters(&opts.filters);
    clauses.push(soft_delete_predicate(dead));
    if let Some(cursor) = &opts.cursor {
        clauses.push(cursor_predicate(order_by, primary_key, order));
        args.extend(cursor_args(cursor));
    }

    let sql = format!(
        "SELECT {} FROM {} WHERE {} ORDER BY {} {} LIMIT ?",
        selected,
        escape_field(table),
        clauses.join(" AND "),
        escape_field(order_by),
        order.as_sql(),
    );
    args.push(SqlValue::Int(opts.limit));

    Statement { sql, args }
}

/// Fetch-by-id-list: the list shape plus a `pk IN (…)` predicate. Returns
/// `None` for an empty id list: the result is empty, not an error.
pub fn build_bulk(
    table: &str,
    allowed: &[&str],
    primary_key: &str,
    ids: &[String],
    opts: &ListOptions,
) -> Option<Statement> {
    if ids.is_empty() {
        return None;
    }

    let order_by = validate_order_by(&opts.order_by, allowed, primary_key);
    let order = SortOrder::parse(&opts.order);
    let fields = ensure_pagination_fields(filter_fields(&opts.fields, allowed), primary_key, order_by);
    let selected = escape_fields(&fields).join(", ");

    let mut clauses = vec![soft_delete_predicate(false)];
    let mut args: Vec<SqlValue> = Vec::new();

    if let Some(cursor) = &opts.cursor {
        clauses.push(cursor_predicate(order_by, primary_key, order));
        args.extend(cursor_args(cursor));
    }

    let placeholders = vec!["?"; ids.len()].join(", ");
    clauses.push(format!("{} IN ({})", escape_field(primary_key), placeholders));
    args.extend(ids.iter().map(|id| SqlValue::Text(id.clone())));

    let (filter_clauses, filter_args) = compile_filters(&opts.filters);
    clauses.extend(filter_clauses);
    args.extend(filter_args);

    let sql = format!(
        "SELECT {} FROM {} WHERE {} ORDER BY {} {} LIMIT ?",
        selected,
        escape_field(table),
        clauses.join(" AND "),
        escape_field(order_by),
        order.as_sql(),
    );
    args.push(SqlValue::Int(opts.limit));

    Some(Statement { sql, args })
}
