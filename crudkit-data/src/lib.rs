pub mod cursor;
pub mod entity;
pub mod error;
pub mod fields;
pub mod filter;
pub mod query;
pub mod raw;
pub mod value;

pub use cursor::{build_page_cursor, decode_cursor, encode_cursor, PageCursor, DEFAULT_PAGE_LIMIT};
pub use entity::{Creatable, Entity, FieldType, Sanitizable, Updatable};
pub use error::DataError;
pub use filter::{build_where_clause, parse_filters, Filter, FilterOp};
pub use query::{ListOptions, Statement};
pub use raw::{RawQueryRegistry, RAW_QUERY_LIMIT};
pub use value::{Row, SqlValue};

pub mod prelude {
    //! Re-exports of the most commonly used data types.
    pub use crate::{
        DataError, Entity, FieldType, Filter, ListOptions, PageCursor, RawQueryRegistry, Row,
        SqlValue,
    };
}
