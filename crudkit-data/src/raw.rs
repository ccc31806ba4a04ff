//! Named raw-query registry and the allow/deny gate.
//!
//! Entities register pre-approved SQL templates under `(table, name)` at
//! process start; requests may only ever execute a registered template.
//! Before execution every template passes the full gate: substring deny
//! list, whole-token keyword deny list, `select`/`with` prefix allow list,
//! and exact named-parameter validation. Placeholders are then substituted
//! positionally and a hard row limit is appended.

use std::collections::HashMap;
use std::sync::{OnceLock, RwLock};

use regex::Regex;
use serde_json::Value;

use crate::error::DataError;

/// Hard row cap appended to every gated raw query.
pub const RAW_QUERY_LIMIT: i64 = 25;

const DENY_SUBSTRINGS: &[&str] = &[";", "--", "/*", "*/"];

const DENY_WORDS: &[&str] = &[
    "drop", "alter", "truncate", "delete", "update", "insert", "create", "merge", "replace",
    "grant", "revoke", "commit", "rollback", "savepoint", "lock", "unlock", "exec", "call", "use",
    "set", "limit", "offset", "join",
];

const ALLOW_PREFIXES: &[&str] = &["select", "with"];

fn param_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r":([A-Za-z0-9_]+)").expect("param pattern compiles"))
}

fn token_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[^a-z0-9_]+").expect("token pattern compiles"))
}

/// Process-wide table of named, pre-approved raw queries.
///
/// Reader/writer guarded: registrations happen once at startup per entity,
/// lookups happen per incoming request, and the lock keeps the two from
/// racing. Construct one and pass the handle into the repositories; the
/// registry is never ambient global state.
#[derive(Debug, Default)]
pub struct RawQueryRegistry {
    queries: RwLock<HashMap<String, HashMap<String, String>>>,
}

impl RawQueryRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a table's named queries, replacing any previous set for
    /// that table.
    pub fn register(&self, table: &str, queries: &[(&str, &str)]) {
        let named: HashMap<String, String> = queries
            .iter()
            .map(|(name, sql)| (name.to_string(), sql.to_string()))
            .collect();
        let mut guard = self.queries.write().expect("raw query registry poisoned");
        guard.insert(table.to_string(), named);
    }

    /// Look up a registered template by table and name.
    pub fn get(&self, table: &str, name: &str) -> Option<String> {
        let guard = self.queries.read().expect("raw query registry poisoned");
        guard.get(table).and_then(|named| named.get(name)).cloned()
    }
}

/// Validate a template against the deny/allow rules.
///
/// Checks run in order: forbidden substrings, forbidden whole tokens (an
/// identifier merely containing a deny word, like `created_at`, passes),
/// then the read-only prefix requirement.
pub fn check_raw_query_allowed(sql: &str) -> Result<(), DataError> {
    let lower = sql.to_lowercase();

    for bad in DENY_SUBSTRINGS {
        if lower.contains(bad) {
            return Err(DataError::QueryNotAllowed(format!(
                "forbidden substring in query: {bad}"
            )));
        }
    }

    for token in token_re().split(&lower) {
        if DENY_WORDS.contains(&token) {
            return Err(DataError::QueryNotAllowed(format!(
                "forbidden keyword in query: {token}"
            )));
        }
    }

    let trimmed = lower.trim();
    if !ALLOW_PREFIXES.iter().any(|p| trimmed.starts_with(p)) {
        return Err(DataError::QueryNotAllowed(
            "only select/with queries are allowed".to_string(),
        ));
    }

    Ok(())
}

/// Extract the distinct `:name` placeholders in first-occurrence order.
pub fn extract_raw_params(sql: &str) -> Vec<String> {
    let mut seen = Vec::new();
    for caps in param_re().captures_iter(sql) {
        let name = caps[1].to_string();
        if !seen.contains(&name) {
            seen.push(name);
        }
    }
    seen
}

/// Require the caller's parameter map to cover exactly the template's
/// placeholder set, naming the first missing or unexpected parameter.
pub fn validate_raw_params(sql: &str, params: &serde_json::Map<String, Value>) -> Result<(), DataError> {
    let required = extract_raw_params(sql);

    for name in &required {
        if !params.contains_key(name) {
            return Err(DataError::MissingParameter(name.clone()));
        }
    }
    for name in params.keys() {
        if !required.contains(name) {
            return Err(DataError::UnexpectedParameter(name.clone()));
        }
    }
    Ok(())
}

/// Substitute each `:name` with a positional placeholder, collecting bind
/// values in occurrence order (a repeated name binds its value once per
/// occurrence), and append the hard row limit.
pub fn prepare_raw_query(sql: &str, params: &serde_json::Map<String, Value>) -> (String, Vec<Value>) {
    let mut args = Vec::new();
    let substituted = param_re().replace_all(sql, |caps: &regex::Captures| {
        args.push(params.get(&caps[1]).cloned().unwrap_or(Value::Null));
        "?"
    });

    (format!("{substituted} LIMIT {RAW_QUERY_LIMIT}"), args)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params(pairs: &[(&str, Value)]) -> serde_json::Map<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_registry_register_and_get() {
        let registry = RawQueryRegistry::new();
        assert_eq!(registry.get("tbl", "q1"), None);

        registry.register("tbl", &[("q1", "SELECT * FROM tbl")]);
        assert_eq!(registry.get("tbl", "q1"), Some("SELECT * FROM tbl".into()));
        assert_eq!(registry.get("tbl", "other"), None);
        assert_eq!(registry.get("missing", "q1"), None);
    }

    #[test]
    fn test_registry_reregister_replaces_table_set() {
        let registry = RawQueryRegistry::new();
        registry.register("tbl", &[("q1", "SELECT 1")]);
        registry.register("tbl", &[("q2", "SELECT 2")]);
        assert_eq!(registry.get("tbl", "q1"), None);
        assert_eq!(registry.get("tbl", "q2"), Some("SELECT 2".into()));
    }

    #[test]
    fn test_deny_substrings() {
        for bad in [";", "--", "/*", "*/"] {
            let err = check_raw_query_allowed(&format!("SELECT 1 {bad}")).unwrap_err();
            assert_eq!(
                err.to_string(),
                format!("forbidden substring in query: {bad}")
            );
        }
        let err = check_raw_query_allowed("SELECT 1; DROP TABLE x").unwrap_err();
        assert!(matches!(err, DataError::QueryNotAllowed(_)));
    }

    #[test]
    fn test_deny_whole_token_but_allow_embedded() {
        let err = check_raw_query_allowed("SELECT * FROM t WHERE delete = 1").unwrap_err();
        assert_eq!(err.to_string(), "forbidden keyword in query: delete");

        assert!(check_raw_query_allowed("SELECT created_at FROM t").is_ok());
        assert!(check_raw_query_allowed("SELECT updated_total FROM t").is_ok());
    }

    #[test]
    fn test_deny_is_case_insensitive() {
        let err = check_raw_query_allowed("SELECT * FROM t WHERE Drop = 1").unwrap_err();
        assert_eq!(err.to_string(), "forbidden keyword in query: drop");
    }

    #[test]
    fn test_allow_prefixes() {
        assert!(check_raw_query_allowed("SELECT id FROM t").is_ok());
        assert!(check_raw_query_allowed("  select 1").is_ok());
        assert!(check_raw_query_allowed("WITH cte AS (SELECT 1) SELECT * FROM cte").is_ok());

        let err = check_raw_query_allowed("SHOW TABLES").unwrap_err();
        assert_eq!(err.to_string(), "only select/with queries are allowed");
    }

    #[test]
    fn test_extract_params_dedupes_in_order() {
        let sql = "SELECT * FROM t WHERE a=:a AND b= :b OR c=:a";
        assert_eq!(extract_raw_params(sql), vec!["a", "b"]);
        assert!(extract_raw_params("SELECT 1").is_empty());
    }

    #[test]
    fn test_validate_params_missing_and_unexpected() {
        let sql = "SELECT * FROM t WHERE x=:x AND y=:y";
        assert!(validate_raw_params(sql, &params(&[("x", json!(1)), ("y", json!(2))])).is_ok());

        let err = validate_raw_params(sql, &params(&[("x", json!(1))])).unwrap_err();
        assert_eq!(err.to_string(), "missing parameter: y");

        let err = validate_raw_params(
            sql,
            &params(&[("x", json!(1)), ("y", json!(2)), ("z", json!(3))]),
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "unexpected parameter: z");
    }

    #[test]
    fn test_prepare_substitutes_and_appends_limit() {
        let sql = "SELECT * FROM t WHERE name = :name AND age > :age";
        let (out, args) = prepare_raw_query(sql, &params(&[("name", json!("a")), ("age", json!(3))]));
        assert_eq!(out, "SELECT * FROM t WHERE name = ? AND age > ? LIMIT 25");
        assert_eq!(args, vec![json!("a"), json!(3)]);
    }

    #[test]
    fn test_prepare_repeated_param_binds_per_occurrence() {
        let sql = "SELECT * FROM t WHERE a = :v OR b = :v";
        let (out, args) = prepare_raw_query(sql, &params(&[("v", json!(7))]));
        assert_eq!(out, "SELECT * FROM t WHERE a = ? OR b = ? LIMIT 25");
        assert_eq!(args, vec![json!(7), json!(7)]);
    }
}
