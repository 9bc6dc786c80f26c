use chrono::{DateTime, Utc};
use futures::stream::BoxStream;
use futures::StreamExt;
use sqlx::sqlite::{SqliteConnection, SqliteRow, SqliteStatement};
use sqlx::{Column, Row, Statement, TypeInfo, ValueRef};

use crate::materialize::ResultCursor;
use crate::models::Value;

/// Live cursor over the rows of a prepared SQLite statement.
///
/// Column names come from the statement, so an empty result still reports
/// its schema.
pub struct SqliteCursor<'c> {
    columns: Vec<String>,
    rows: Option<BoxStream<'c, Result<SqliteRow, sqlx::Error>>>,
    current: Option<SqliteRow>,
    fault: Option<sqlx::Error>,
}

impl<'c> SqliteCursor<'c> {
    /// Executes `statement` on `conn` with `squad` bound as its only parameter.
    pub fn open(
        statement: &'c SqliteStatement<'_>,
        conn: &'c mut SqliteConnection,
        squad: String,
    ) -> Self {
        let columns = statement
            .columns()
            .iter()
            .map(|c| c.name().to_string())
            .collect();
        let rows = statement.query().bind(squad).fetch(conn);

        Self {
            columns,
            rows: Some(rows),
            current: None,
            fault: None,
        }
    }
}

impl ResultCursor for SqliteCursor<'_> {
    fn columns(&mut self) -> Result<Vec<String>, sqlx::Error> {
        Ok(self.columns.clone())
    }

    async fn advance(&mut self) -> bool {
        let Some(rows) = self.rows.as_mut() else {
            return false;
        };

        match rows.next().await {
            Some(Ok(row)) => {
                self.current = Some(row);
                true
            }
            Some(Err(err)) => {
                self.current = None;
                self.fault = Some(err);
                self.rows = None;
                false
            }
            None => {
                self.current = None;
                false
            }
        }
    }

    fn extract(&mut self) -> Result<Vec<Value>, sqlx::Error> {
        let row = self
            .current
            .as_ref()
            .ok_or_else(|| sqlx::Error::Protocol("no current row".into()))?;

        (0..row.len()).map(|index| decode_value(row, index)).collect()
    }

    fn take_fault(&mut self) -> Option<sqlx::Error> {
        self.fault.take()
    }

    fn release(&mut self) {
        self.current = None;
        self.rows = None;
    }
}

/// Declared BOOLEAN and DATETIME columns win over the storage class, since
/// SQLite stores both as INTEGER/TEXT.
fn decode_value(row: &SqliteRow, index: usize) -> Result<Value, sqlx::Error> {
    let raw = row.try_get_raw(index)?;
    if raw.is_null() {
        return Ok(Value::Null);
    }

    let value = match row.column(index).type_info().name() {
        "BOOLEAN" => Value::Bool(decode_bool(row, index, raw.type_info().name())?),
        "DATETIME" | "TIMESTAMP" => {
            Value::Timestamp(row.try_get_unchecked::<DateTime<Utc>, _>(index)?)
        }
        _ => match raw.type_info().name() {
            "INTEGER" => Value::Integer(row.try_get_unchecked(index)?),
            "REAL" => Value::Float(row.try_get_unchecked(index)?),
            "BLOB" => Value::Bytes(row.try_get_unchecked(index)?),
            _ => Value::Text(row.try_get_unchecked(index)?),
        },
    };

    Ok(value)
}

/// Only integer 0 or 1 is a boolean; anything else in a BOOLEAN column is bad data.
fn decode_bool(row: &SqliteRow, index: usize, storage: &str) -> Result<bool, sqlx::Error> {
    let n: Option<i64> = match storage {
        "INTEGER" => Some(row.try_get_unchecked(index)?),
        _ => None,
    };

    match n {
        Some(0) => Ok(false),
        Some(1) => Ok(true),
        _ => Err(sqlx::Error::ColumnDecode {
            index: index.to_string(),
            source: format!("expected 0 or 1 in BOOLEAN column, found {storage} value").into(),
        }),
    }
}
