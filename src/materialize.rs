//! Draining a result cursor of unknown shape into a `RecordSet`.

use std::future::Future;
use std::sync::Arc;

use crate::error::MaterializationError;
use crate::models::{RecordSet, Value};

/// A forward-only cursor over the rows of one query execution.
///
/// Consumed once by [`materialize`], which calls [`release`](Self::release)
/// exactly once whatever the outcome.
pub trait ResultCursor: Send {
    /// Ordered column names of the result set.
    fn columns(&mut self) -> Result<Vec<String>, sqlx::Error>;

    /// Steps to the next row. `false` means exhaustion or a terminal fault,
    /// which is then reported by [`take_fault`](Self::take_fault).
    fn advance(&mut self) -> impl Future<Output = bool> + Send;

    /// Values of the current row, aligned with [`columns`](Self::columns).
    fn extract(&mut self) -> Result<Vec<Value>, sqlx::Error>;

    fn take_fault(&mut self) -> Option<sqlx::Error>;

    fn release(&mut self);
}

pub async fn materialize<C: ResultCursor>(mut cursor: C) -> Result<RecordSet, MaterializationError> {
    let result = drain(&mut cursor).await;
    cursor.release();
    result
}

async fn drain<C: ResultCursor>(cursor: &mut C) -> Result<RecordSet, MaterializationError> {
    let columns: Arc<[String]> = cursor
        .columns()
        .map_err(MaterializationError::SchemaUnavailable)?
        .into();
    let mut records = RecordSet::new(Arc::clone(&columns));

    while cursor.advance().await {
        let row = records.len();
        let values = cursor
            .extract()
            .map_err(|source| MaterializationError::RowDecodeFailed { row, source })?;

        if values.len() != columns.len() {
            return Err(MaterializationError::RowDecodeFailed {
                row,
                source: sqlx::Error::Protocol(format!(
                    "row has {} values for {} columns",
                    values.len(),
                    columns.len()
                )),
            });
        }

        records.push(values);
    }

    if let Some(fault) = cursor.take_fault() {
        return Err(MaterializationError::CursorFault(fault));
    }

    Ok(records)
}
