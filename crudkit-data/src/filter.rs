//! Filter predicate parsing and WHERE-clause compilation.
//!
//! Raw `field:operator:value` tokens become structured [`Filter`] predicates,
//! which compile to a parameterized SQL fragment. Filter values are only
//! ever bound through placeholders, never interpolated into the SQL text.

use crate::fields::escape_field;
use crate::value::SqlValue;

/// The closed set of filter operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    /// `field = ?`
    Eql,
    /// `field != ?`
    Neq,
    /// `field LIKE ?` with the value wrapped in `%`
    Lik,
    /// `field > ?`
    Gt,
    /// `field < ?`
    Lt,
    /// `field >= ?`
    Gte,
    /// `field <= ?`
    Lte,
    /// `field BETWEEN ? AND ?` from a comma-separated pair
    Btw,
    /// `field IS NULL` when the value is `true`, else `IS NOT NULL`
    Nul,
    /// `field IS NOT NULL`
    Nnu,
    /// `field IN (?, ...)` from comma-separated values
    In,
}

impl FilterOp {
    pub fn parse(op: &str) -> Option<Self> {
        match op {
            "eql" => Some(FilterOp::Eql),
            "neq" => Some(FilterOp::Neq),
            "lik" => Some(FilterOp::Lik),
            "gt" => Some(FilterOp::Gt),
            "lt" => Some(FilterOp::Lt),
            "gte" => Some(FilterOp::Gte),
            "lte" => Some(FilterOp::Lte),
            "btw" => Some(FilterOp::Btw),
            "nul" => Some(FilterOp::Nul),
            "nnu" => Some(FilterOp::Nnu),
            "in" => Some(FilterOp::In),
            _ => None,
        }
    }
}

/// One parsed filter predicate. Multiple filters are AND-combined.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub field: String,
    pub operator: FilterOp,
    pub value: String,
}

/// Parse raw `field:operator:value` tokens against an allow-list.
///
/// Tokens that do not split into exactly three parts, reference a field
/// outside the allow-list, or carry an unknown operator are silently
/// dropped: bad filter syntax fails open to "no filter", never to an error.
pub fn parse_filters(raw: &[String], allowed: &[&str]) -> Vec<Filter> {
    let mut filters = Vec::new();

    for token in raw {
        let mut parts = token.splitn(3, ':');
        let (Some(field), Some(operator), Some(value)) = (parts.next(), parts.next(), parts.next())
        else {
            continue;
        };

        let field = field.trim();
        let value = value.trim();
        if !allowed.contains(&field) {
            continue;
        }
        let Some(operator) = FilterOp::parse(operator.trim().to_lowercase().as_str()) else {
            continue;
        };

        filters.push(Filter {
            field: field.to_string(),
            operator,
            value: value.to_string(),
        });
    }

    filters
}

/// Compile filters into bare clauses plus their bind arguments, in clause
/// order. Used by the statement builders, which splice the clauses into a
/// larger WHERE.
pub(crate) fn compile_filters(filters: &[Filter]) -> (Vec<String>, Vec<SqlValue>) {
    let mut clauses = Vec::new();
    let mut args = Vec::new();

    for f in filters {
        let field = escape_field(&f.field);
        match f.operator {
            FilterOp::Eql => {
                clauses.push(format!("{field} = ?"));
                args.push(SqlValue::Text(f.value.clone()));
            }
            FilterOp::Neq => {
                clauses.push(format!("{field} != ?"));
                args.push(SqlValue::Text(f.value.clone()));
            }
            FilterOp::Lik => {
                clauses.push(format!("{field} LIKE ?"));
                args.push(SqlValue::Text(format!("%{}%", f.value)));
            }
            FilterOp::Gt => {
                clauses.push(format!("{field} > ?"));
                args.push(SqlValue::Text(f.value.clone()));
            }
            FilterOp::Lt => {
                clauses.push(format!("{field} < ?"));
                args.push(SqlValue::Text(f.value.clone()));
            }
            FilterOp::Gte => {
                clauses.push(format!("{field} >= ?"));
                args.push(SqlValue::Text(f.value.clone()));
            }
            FilterOp::Lte => {
                clauses.push(format!("{field} <= ?"));
                args.push(SqlValue::Text(f.value.clone()));
            }
            FilterOp::Btw => {
                let bounds: Vec<&str> = f.value.split(',').collect();
                if bounds.len() == 2 {
                    clauses.push(format!("{field} BETWEEN ? AND ?"));
                    args.push(SqlValue::Text(bounds[0].to_string()));
                    args.push(SqlValue::Text(bounds[1].to_string()));
                }
            }
            FilterOp::Nul => {
                if f.value == "true" {
                    clauses.push(format!("{field} IS NULL"));
                } else {
                    clauses.push(format!("{field} IS NOT NULL"));
                }
            }
            FilterOp::Nnu => {
                clauses.push(format!("{field} IS NOT NULL"));
            }
            FilterOp::In => {
                let values: Vec<&str> = f.value.split(',').collect();
                let placeholders = vec!["?"; values.len()].join(",");
                clauses.push(format!("{field} IN ({placeholders})"));
                for v in values {
                    args.push(SqlValue::Text(v.trim().to_string()));
                }
            }
        }
    }

    (clauses, args)
}

/// Compile filters into a `WHERE …` fragment (empty string when there are no
/// clauses) plus the positional bind arguments in fragment order.
pub fn build_where_clause(filters: &[Filter]) -> (String, Vec<SqlValue>) {
    let (clauses, args) = compile_filters(filters);
    if clauses.is_empty() {
        return (String::new(), args);
    }
    (format!("WHERE {}", clauses.join(" AND ")), args)
}
