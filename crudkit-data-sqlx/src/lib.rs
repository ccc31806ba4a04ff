//! # crudkit-data-sqlx — SQLx/MySQL backend for the CrudKit data layer
//!
//! This crate provides the [SQLx](https://github.com/launchbadge/sqlx)-specific
//! execution half of the data layer. It depends on [`crudkit_data`] for the
//! pure parts (entity metadata, filter compilation, statement assembly, the
//! cursor codec and the raw-query gate) and adds the repository that binds
//! and runs those statements against a `MySqlPool`, plus the row mappers and
//! error bridging.
//!
//! # What's in this crate
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Repository<T>`] | Generic per-entity repository over an `sqlx::MySqlPool` |
//! | [`scan::scan_row`] | Schema-driven row → generic map conversion |
//! | [`scan::scan_raw_row`] | Best-effort row mapping for gated raw queries |
//! | [`SqlxErrorExt`] | Extension trait to convert `sqlx::Error` → `DataError` (`.into_data_error()`) |
//! | [`SqlxResult<T>`] | Type alias for `Result<T, DataError>` |
//!
//! # Quick start
//!
//! ```ignore
//! use crudkit_data_sqlx::prelude::*;
//! use std::sync::Arc;
//!
//! let registry = Arc::new(RawQueryRegistry::new());
//! registry.register("user", &[("count", "SELECT COUNT(1) AS total FROM user")]);
//!
//! let repo = Repository::<User>::with_raw_queries(pool.clone(), registry);
//! repo.add(&user).await?;
//! let page = repo.list(&ListOptions::new()).await?;
//! let next = build_page_cursor(&page, "id", "");
//! ```
//!
//! # Error bridging
//!
//! Due to Rust's orphan rules, `From<sqlx::Error> for DataError` can't be
//! implemented here. Use the [`SqlxErrorExt`] trait instead:
//!
//! ```ignore
//! use crudkit_data_sqlx::SqlxErrorExt;
//!
//! let rows = sqlx::query("SELECT ...")
//!     .fetch_all(&pool)
//!     .await
//!     .map_err(|e| e.into_data_error())?;
//! ```

pub mod error;
pub mod repository;
pub mod scan;

pub use error::{SqlxErrorExt, SqlxResult};
pub use repository::Repository;

/// Re-exports of the most commonly used types from both `crudkit-data` and this crate.
pub mod prelude {
    pub use crate::{Repository, SqlxErrorExt, SqlxResult};
    pub use crudkit_data::prelude::*;
}
