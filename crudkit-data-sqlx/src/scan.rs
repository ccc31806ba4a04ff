//! Row mapping: driver rows to generic field → value maps.
//!
//! The schema-driven mapper builds one nullable scan target per returned
//! column whose semantic type is known; columns outside the schema are
//! discarded. Nulls are normalized so callers never see a driver null
//! wrapper: string → `""`, int → `0`, date/datetime → JSON null. The
//! semantic type decides the emitted shape, `Date` columns formatting as
//! `YYYY-MM-DD` and `DateTime` columns as `YYYY-MM-DD HH:MM:SS`, regardless
//! of the driver column type.

use chrono::{NaiveDate, NaiveDateTime};
use serde_json::Value;
use sqlx::mysql::MySqlRow;
use sqlx::{Column as _, Row as _};

use crudkit_data::entity::{field_type, FieldType};
use crudkit_data::{DataError, Row};

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Scan one row into a generic map using the entity's semantic types.
pub fn scan_row(row: &MySqlRow, schema: &[(&str, FieldType)]) -> Result<Row, DataError> {
    let mut out = Row::new();

    for (idx, col) in row.columns().iter().enumerate() {
        let name = col.name();
        let Some(ty) = field_type(schema, name) else {
            continue;
        };

        let value = match ty {
            FieldType::String => {
                let v: Option<String> = row.try_get(idx).map_err(DataError::database)?;
                Value::String(v.unwrap_or_default())
            }
            FieldType::Int => {
                let v: Option<i64> = row.try_get(idx).map_err(DataError::database)?;
                Value::from(v.unwrap_or(0))
            }
            FieldType::Date => match get_date(row, idx)? {
                Some(d) => Value::String(d.format(DATE_FORMAT).to_string()),
                None => Value::Null,
            },
            FieldType::DateTime => match get_datetime(row, idx)? {
                Some(t) => Value::String(t.format(DATETIME_FORMAT).to_string()),
                None => Value::Null,
            },
        };
        out.insert(name.to_string(), value);
    }

    Ok(out)
}

fn get_date(row: &MySqlRow, idx: usize) -> Result<Option<NaiveDate>, DataError> {
    match row.try_get::<Option<NaiveDate>, _>(idx) {
        Ok(v) => Ok(v),
        // Semantic date over a datetime-typed column: keep the day part.
        Err(_) => row
            .try_get::<Option<NaiveDateTime>, _>(idx)
            .map(|v| v.map(|t| t.date()))
            .map_err(DataError::database),
    }
}

fn get_datetime(row: &MySqlRow, idx: usize) -> Result<Option<NaiveDateTime>, DataError> {
    match row.try_get::<Option<NaiveDateTime>, _>(idx) {
        Ok(v) => Ok(v),
        // Semantic datetime over a date-typed column: midnight.
        Err(_) => row
            .try_get::<Option<NaiveDate>, _>(idx)
            .map(|v| v.and_then(|d| d.and_hms_opt(0, 0, 0)))
            .map_err(DataError::database),
    }
}

/// Scan a raw-query row with best-effort native typing; no schema needed.
pub fn scan_raw_row(row: &MySqlRow) -> Row {
    let mut out = Row::new();
    for (idx, col) in row.columns().iter().enumerate() {
        out.insert(col.name().to_string(), best_effort_value(row, idx));
    }
    out
}

fn best_effort_value(row: &MySqlRow, idx: usize) -> Value {
    if let Ok(v) = row.try_get::<Option<i64>, _>(idx) {
        return v.map(Value::from).unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<f64>, _>(idx) {
        return v
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number)
            .unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<String>, _>(idx) {
        return v.map(Value::String).unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<NaiveDateTime>, _>(idx) {
        return v
            .map(|t| Value::String(t.format(DATETIME_FORMAT).to_string()))
            .unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<NaiveDate>, _>(idx) {
        return v
            .map(|d| Value::String(d.format(DATE_FORMAT).to_string()))
            .unwrap_or(Value::Null);
    }
    if let Ok(v) = row.try_get::<Option<bool>, _>(idx) {
        return v.map(Value::Bool).unwrap_or(Value::Null);
    }
    Value::Null
}
