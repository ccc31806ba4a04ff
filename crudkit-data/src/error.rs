/// Errors that can occur in the data layer.
///
/// The taxonomy is deliberately flat so a transport layer can map each kind
/// to a status code without inspecting error internals: `NotFound` → 404,
/// the cursor / raw-query / parameter variants → 400, `Database` and
/// `Other` → 500.
#[derive(Debug)]
pub enum DataError {
    /// A single-record fetch returned zero rows.
    NotFound(String),
    /// A pagination token failed base64url decoding.
    CursorEncoding,
    /// A pagination token decoded to bytes that are not a valid cursor.
    CursorPayload,
    /// A raw query was rejected by the allow/deny gate; the message names
    /// the offending token or rule.
    QueryNotAllowed(String),
    /// A raw query placeholder has no matching caller parameter.
    MissingParameter(String),
    /// The caller supplied a parameter no placeholder refers to.
    UnexpectedParameter(String),
    /// Statement execution failed in the driver.
    Database(Box<dyn std::error::Error + Send + Sync>),
    Other(String),
}

impl DataError {
    /// Construct a `Database` variant from any error type.
    ///
    /// Used by backend crates (e.g. `crudkit-data-sqlx`) to wrap
    /// driver-specific errors.
    pub fn database(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        DataError::Database(Box::new(err))
    }
}

impl std::fmt::Display for DataError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataError::NotFound(msg) => write!(f, "not found: {msg}"),
            DataError::CursorEncoding => write!(f, "invalid cursor encoding"),
            DataError::CursorPayload => write!(f, "invalid cursor payload"),
            DataError::QueryNotAllowed(reason) => write!(f, "{reason}"),
            DataError::MissingParameter(name) => write!(f, "missing parameter: {name}"),
            DataError::UnexpectedParameter(name) => write!(f, "unexpected parameter: {name}"),
            DataError::Database(err) => write!(f, "database error: {err}"),
            DataError::Other(msg) => write!(f, "data error: {msg}"),
        }
    }
}

impl std::error::Error for DataError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            DataError::Database(err) => Some(err.as_ref()),
            _ => None,
        }
    }
}
