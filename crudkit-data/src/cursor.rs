//! Opaque keyset-pagination cursors.
//!
//! A cursor carries the last row's primary-key value and order-column value,
//! JSON-serialized and base64url-encoded without padding. Callers treat the
//! token as opaque: it is only ever produced from a previous page's last row
//! and consumed to resume the scan.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::DataError;
use crate::value::Row;

/// Page size assumed by [`build_page_cursor`] when deciding whether a page
/// is full enough to warrant a continuation token.
pub const DEFAULT_PAGE_LIMIT: i64 = 25;

/// Resume point for a keyset-paginated scan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageCursor {
    pub last_id: String,
    pub last_value: String,
}

/// Serialize a cursor to its opaque token form.
pub fn encode_cursor(cursor: &PageCursor) -> String {
    let data = serde_json::to_vec(cursor).expect("cursor serializes to JSON");
    URL_SAFE_NO_PAD.encode(data)
}

/// Decode an opaque token back into a cursor.
///
/// The two failure modes are distinct so the transport layer can report
/// which stage rejected the token.
pub fn decode_cursor(token: &str) -> Result<PageCursor, DataError> {
    let raw = URL_SAFE_NO_PAD
        .decode(token)
        .map_err(|_| DataError::CursorEncoding)?;
    serde_json::from_slice(&raw).map_err(|_| DataError::CursorPayload)
}

/// Build the continuation token for a page of results, or `None` when the
/// page is shorter than [`DEFAULT_PAGE_LIMIT`] and the scan is exhausted.
///
/// `order_by` falls back to the primary key when empty, matching the order
/// the statement was built with.
pub fn build_page_cursor(rows: &[Row], primary_key: &str, order_by: &str) -> Option<String> {
    if rows.len() < DEFAULT_PAGE_LIMIT as usize {
        return None;
    }

    let last = rows.last()?;
    let order_col = if order_by.is_empty() { primary_key } else { order_by };

    let last_id = last
        .get(primary_key)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();
    let last_value = match last.get(order_col) {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(v) => v.to_string(),
    };

    Some(encode_cursor(&PageCursor { last_id, last_value }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn page(n: usize) -> Vec<Row> {
        (0..n)
            .map(|i| {
                let mut row = Row::new();
                row.insert("id".into(), json!(format!("id-{i}")));
                row.insert("age".into(), json!(i as i64));
                row
            })
            .collect()
    }

    #[test]
    fn test_encode_decode_roundtrip() {
        let cursor = PageCursor {
            last_id: "abc123".into(),
            last_value: "xyz789".into(),
        };
        let decoded = decode_cursor(&encode_cursor(&cursor)).unwrap();
        assert_eq!(decoded, cursor);
    }

    #[test]
    fn test_token_is_base64url_no_pad() {
        let cursor = PageCursor {
            last_id: "a".into(),
            last_value: "b".into(),
        };
        let token = encode_cursor(&cursor);
        assert!(!token.contains('='));
        assert!(!token.contains('+'));
        assert!(!token.contains('/'));
    }

    #[test]
    fn test_decode_invalid_encoding() {
        let err = decode_cursor("!!!not-base64$$$").unwrap_err();
        assert!(matches!(err, DataError::CursorEncoding));
        assert_eq!(err.to_string(), "invalid cursor encoding");
    }

    #[test]
    fn test_decode_invalid_payload() {
        let token = URL_SAFE_NO_PAD.encode(b"not-json");
        let err = decode_cursor(&token).unwrap_err();
        assert!(matches!(err, DataError::CursorPayload));
        assert_eq!(err.to_string(), "invalid cursor payload");
    }

    #[test]
    fn test_partial_page_yields_no_cursor() {
        assert_eq!(build_page_cursor(&page(10), "id", "age"), None);
        assert_eq!(build_page_cursor(&[], "id", "age"), None);
    }

    #[test]
    fn test_full_page_yields_last_row_cursor() {
        let rows = page(DEFAULT_PAGE_LIMIT as usize);
        let token = build_page_cursor(&rows, "id", "age").unwrap();
        let cursor = decode_cursor(&token).unwrap();
        assert_eq!(cursor.last_id, "id-24");
        assert_eq!(cursor.last_value, "24");
    }

    #[test]
    fn test_empty_order_by_uses_primary_key() {
        let rows = page(DEFAULT_PAGE_LIMIT as usize);
        let token = build_page_cursor(&rows, "id", "").unwrap();
        let cursor = decode_cursor(&token).unwrap();
        assert_eq!(cursor.last_value, "id-24");
    }
}
