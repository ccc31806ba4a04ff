use chrono::NaiveDateTime;

use crate::value::SqlValue;

/// Semantic type of a column, driving scan-target selection and output
/// formatting in the row mapper.
///
/// `Date` and `DateTime` are distinct on purpose: the semantic type, not the
/// driver column type, determines whether a value is emitted as
/// `YYYY-MM-DD` or `YYYY-MM-DD HH:MM:SS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    String,
    Int,
    Date,
    DateTime,
}

/// Look up a column's semantic type in an ordered schema slice.
pub fn field_type(schema: &[(&str, FieldType)], column: &str) -> Option<FieldType> {
    schema
        .iter()
        .find(|(name, _)| *name == column)
        .map(|(_, ty)| *ty)
}

/// Trait describing a database entity: table name, ordered columns, primary
/// key, per-column semantic type, and the set of columns the database may
/// default.
///
/// Intended to be implemented manually per entity kind.
///
/// # Example
///
/// ```ignore
/// impl Entity for User {
///     fn table_name() -> &'static str { "user" }
///     fn primary_key() -> &'static str { "id" }
///     fn columns() -> &'static [&'static str] { &["id", "name", "deleted_at"] }
///     fn schema() -> &'static [(&'static str, FieldType)] {
///         &[
///             ("id", FieldType::String),
///             ("name", FieldType::String),
///             ("deleted_at", FieldType::DateTime),
///         ]
///     }
///     fn values(&self) -> Vec<SqlValue> { ... }
///     fn id(&self) -> &str { &self.id }
/// }
/// ```
pub trait Entity: Send + Sync + 'static {
    fn table_name() -> &'static str;

    fn primary_key() -> &'static str;

    /// Ordered column list; also the allow-list for projection, filtering
    /// and ordering.
    fn columns() -> &'static [&'static str];

    /// Column → semantic type, in column order.
    fn schema() -> &'static [(&'static str, FieldType)];

    /// Columns whose empty supplied value should be left to the database's
    /// own DEFAULT.
    fn defaultable() -> &'static [&'static str] {
        &[]
    }

    /// Current field values, in `columns()` order.
    fn values(&self) -> Vec<SqlValue>;

    /// Primary-key value of this record.
    fn id(&self) -> &str;

    /// Capability accessor: present when the entity tracks a creation
    /// timestamp. Callers stamp it before Add.
    fn as_creatable(&mut self) -> Option<&mut dyn Creatable> {
        None
    }

    /// Capability accessor: present when the entity tracks an update
    /// timestamp. Callers stamp it before Edit.
    fn as_updatable(&mut self) -> Option<&mut dyn Updatable> {
        None
    }

    /// Capability accessor: present when the entity cleans its own input.
    fn as_sanitizable(&mut self) -> Option<&mut dyn Sanitizable> {
        None
    }
}

/// Capability of entities that record when they were created.
pub trait Creatable {
    fn set_created_at(&mut self, at: NaiveDateTime);
}

/// Capability of entities that record when they were last updated.
pub trait Updatable {
    fn set_updated_at(&mut self, at: NaiveDateTime);
}

/// Capability of entities that scrub their own user-supplied fields.
pub trait Sanitizable {
    fn sanitize(&mut self);
}
