use chrono::{NaiveDate, NaiveDateTime};

/// A generic result row: column name → JSON value.
///
/// Values are normalized by the row mapper: string columns are never JSON
/// null (null becomes `""`), int columns become `0`, and date/datetime
/// columns are either a formatted string or JSON null.
pub type Row = serde_json::Map<String, serde_json::Value>;

/// A value bound into a statement placeholder.
///
/// This is the closed set of semantic types the layer binds for non-raw
/// operations; backend crates translate each variant to a driver bind.
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Null,
    Text(String),
    Int(i64),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
}

impl SqlValue {
    /// Whether this value is the semantic zero for its type.
    ///
    /// Defaultable columns carrying an empty value are omitted from inserts
    /// (or rendered as `DEFAULT`) so the database applies its own default.
    pub fn is_empty(&self) -> bool {
        match self {
            SqlValue::Null => true,
            SqlValue::Text(s) => s.is_empty(),
            SqlValue::Int(n) => *n == 0,
            SqlValue::Date(_) | SqlValue::DateTime(_) => false,
        }
    }
}

impl From<&str> for SqlValue {
    fn from(s: &str) -> Self {
        SqlValue::Text(s.to_string())
    }
}

impl From<String> for SqlValue {
    fn from(s: String) -> Self {
        SqlValue::Text(s)
    }
}

impl From<i64> for SqlValue {
    fn from(n: i64) -> Self {
        SqlValue::Int(n)
    }
}

impl From<Option<NaiveDateTime>> for SqlValue {
    fn from(t: Option<NaiveDateTime>) -> Self {
        match t {
            Some(t) => SqlValue::DateTime(t),
            None => SqlValue::Null,
        }
    }
}

impl From<Option<NaiveDate>> for SqlValue {
    fn from(d: Option<NaiveDate>) -> Self {
        match d {
            Some(d) => SqlValue::Date(d),
            None => SqlValue::Null,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_values() {
        assert!(SqlValue::Null.is_empty());
        assert!(SqlValue::Text(String::new()).is_empty());
        assert!(SqlValue::Int(0).is_empty());
    }

    #[test]
    fn test_non_empty_values() {
        assert!(!SqlValue::Text("x".into()).is_empty());
        assert!(!SqlValue::Int(-1).is_empty());
        let d = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        assert!(!SqlValue::Date(d).is_empty());
        assert!(!SqlValue::DateTime(d.and_hms_opt(0, 0, 0).unwrap()).is_empty());
    }

    #[test]
    fn test_from_option_datetime() {
        assert_eq!(SqlValue::from(None::<NaiveDateTime>), SqlValue::Null);
        let t = NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(12, 30, 0)
            .unwrap();
        assert_eq!(SqlValue::from(Some(t)), SqlValue::DateTime(t));
    }
}
