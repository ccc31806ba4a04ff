//! Field projection and ordering validation.
//!
//! Requested field lists, order columns and directions all come from the
//! transport layer and are untrusted; everything here reduces them to the
//! entity's allow-listed columns before any SQL is assembled.

/// Sort direction for list operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    /// Parse a requested direction; anything other than exactly `asc` or
    /// `desc` falls back to descending.
    pub fn parse(order: &str) -> Self {
        match order {
            "asc" => SortOrder::Asc,
            "desc" => SortOrder::Desc,
            _ => SortOrder::Desc,
        }
    }

    pub fn as_sql(self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }

    /// Comparison operator for the keyset-pagination predicate.
    pub fn cursor_op(self) -> &'static str {
        match self {
            SortOrder::Asc => ">",
            SortOrder::Desc => "<",
        }
    }
}

/// Intersect a requested field list with the allow-listed columns.
///
/// Returns the full allow-list when the request is empty or none of the
/// requested names survive; otherwise the surviving names in request order.
pub fn filter_fields(requested: &[String], allowed: &[&str]) -> Vec<String> {
    if requested.is_empty() {
        return allowed.iter().map(|c| c.to_string()).collect();
    }

    let filtered: Vec<String> = requested
        .iter()
        .filter(|f| allowed.contains(&f.as_str()))
        .cloned()
        .collect();

    if filtered.is_empty() {
        return allowed.iter().map(|c| c.to_string()).collect();
    }
    filtered
}

/// Widen a projection so paginated results always carry what the next
/// cursor needs: the primary key and the active order column.
pub fn ensure_pagination_fields(fields: Vec<String>, primary_key: &str, order_by: &str) -> Vec<String> {
    fn add_unique(field: &str, result: &mut Vec<String>) {
        if !result.iter().any(|f| f == field) {
            result.push(field.to_string());
        }
    }

    let mut result = Vec::with_capacity(fields.len() + 2);
    for f in &fields {
        add_unique(f, &mut result);
    }
    add_unique(primary_key, &mut result);
    if !order_by.is_empty() && order_by != primary_key {
        add_unique(order_by, &mut result);
    }

    result
}

/// Resolve the order column: the requested one when allow-listed, otherwise
/// the primary key.
pub fn validate_order_by<'a>(order_by: &'a str, allowed: &[&str], primary_key: &'a str) -> &'a str {
    if allowed.contains(&order_by) {
        order_by
    } else {
        primary_key
    }
}

/// Backtick-quote a single identifier.
pub fn escape_field(field: &str) -> String {
    format!("`{field}`")
}

/// Backtick-quote a list of identifiers.
pub fn escape_fields<S: AsRef<str>>(fields: &[S]) -> Vec<String> {
    fields.iter().map(|f| escape_field(f.as_ref())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALLOWED: &[&str] = &["id", "name", "age", "created_at"];

    fn owned(fields: &[&str]) -> Vec<String> {
        fields.iter().map(|f| f.to_string()).collect()
    }

    #[test]
    fn test_filter_fields_empty_returns_all() {
        assert_eq!(filter_fields(&[], ALLOWED), owned(ALLOWED));
    }

    #[test]
    fn test_filter_fields_intersection_keeps_request_order() {
        let requested = owned(&["name", "id", "bogus"]);
        assert_eq!(filter_fields(&requested, ALLOWED), owned(&["name", "id"]));
    }

    #[test]
    fn test_filter_fields_all_invalid_returns_all() {
        let requested = owned(&["secret", "password"]);
        assert_eq!(filter_fields(&requested, ALLOWED), owned(ALLOWED));
    }

    #[test]
    fn test_ensure_pagination_fields_appends_missing() {
        let fields = owned(&["name"]);
        assert_eq!(
            ensure_pagination_fields(fields, "id", "age"),
            owned(&["name", "id", "age"])
        );
    }

    #[test]
    fn test_ensure_pagination_fields_no_duplicates() {
        let fields = owned(&["id", "age"]);
        assert_eq!(
            ensure_pagination_fields(fields, "id", "age"),
            owned(&["id", "age"])
        );
    }

    #[test]
    fn test_validate_order_by() {
        assert_eq!(validate_order_by("age", ALLOWED, "id"), "age");
        assert_eq!(validate_order_by("drop table", ALLOWED, "id"), "id");
        assert_eq!(validate_order_by("", ALLOWED, "id"), "id");
    }

    #[test]
    fn test_sort_order_parse() {
        assert_eq!(SortOrder::parse("asc"), SortOrder::Asc);
        assert_eq!(SortOrder::parse("desc"), SortOrder::Desc);
        assert_eq!(SortOrder::parse("ASC"), SortOrder::Desc);
        assert_eq!(SortOrder::parse("sideways"), SortOrder::Desc);
    }

    #[test]
    fn test_escape_fields() {
        assert_eq!(escape_field("name"), "`name`");
        assert_eq!(escape_fields(&["a", "b"]), vec!["`a`", "`b`"]);
    }
}
