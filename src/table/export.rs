//! Arrow and Parquet export
//!
//! Each column gets the narrowest Arrow type that holds all of its non-null
//! cells: Int64, Float64, Boolean, Timestamp(second, UTC), otherwise Utf8.
//! Mixed columns (e.g. a start time that fell back to the literal run id)
//! are rendered as strings. The index, if any, becomes the first column.

use super::Table;
use crate::scalar::Scalar;
use crate::Result;
use arrow::array::{
    ArrayRef, BooleanArray, Float64Array, Int64Array, StringArray, TimestampSecondArray,
};
use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use arrow::record_batch::{RecordBatch, RecordBatchOptions};
use parquet::arrow::ArrowWriter;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

const UTC: &str = "UTC";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ColumnKind {
    Int64,
    Float64,
    Boolean,
    Timestamp,
    Utf8,
}

fn infer_kind(column: &str, values: &[&Scalar]) -> ColumnKind {
    let mut non_null = values.iter().filter(|v| !v.is_null()).peekable();
    if non_null.peek().is_none() {
        return ColumnKind::Utf8;
    }

    let mut kind: Option<ColumnKind> = None;
    for value in non_null {
        let next = match value {
            Scalar::Integer(_) => ColumnKind::Int64,
            Scalar::Float(_) => ColumnKind::Float64,
            Scalar::Boolean(_) => ColumnKind::Boolean,
            Scalar::Timestamp(_) => ColumnKind::Timestamp,
            Scalar::Null | Scalar::String(_) => return ColumnKind::Utf8,
        };
        kind = Some(match (kind, next) {
            (None, k) => k,
            (Some(a), b) if a == b => a,
            (Some(ColumnKind::Int64 | ColumnKind::Float64), ColumnKind::Int64 | ColumnKind::Float64) => {
                ColumnKind::Float64
            }
            (Some(_), _) => {
                debug!(column, found = value.type_name(), "Mixed column exported as strings");
                return ColumnKind::Utf8;
            }
        });
    }
    kind.unwrap_or(ColumnKind::Utf8)
}

fn build_array(kind: ColumnKind, values: &[&Scalar]) -> (ArrayRef, DataType) {
    match kind {
        ColumnKind::Int64 => {
            let array: Int64Array = values
                .iter()
                .map(|v| match v {
                    Scalar::Integer(i) => Some(*i),
                    _ => None,
                })
                .collect();
            (Arc::new(array), DataType::Int64)
        }
        ColumnKind::Float64 => {
            let array: Float64Array = values.iter().map(|v| v.as_f64()).collect();
            (Arc::new(array), DataType::Float64)
        }
        ColumnKind::Boolean => {
            let array: BooleanArray = values
                .iter()
                .map(|v| match v {
                    Scalar::Boolean(b) => Some(*b),
                    _ => None,
                })
                .collect();
            (Arc::new(array), DataType::Boolean)
        }
        ColumnKind::Timestamp => {
            let array: TimestampSecondArray = values
                .iter()
                .map(|v| match v {
                    Scalar::Timestamp(t) => Some(t.timestamp()),
                    _ => None,
                })
                .collect();
            (
                Arc::new(array.with_timezone(UTC)),
                DataType::Timestamp(TimeUnit::Second, Some(UTC.into())),
            )
        }
        ColumnKind::Utf8 => {
            let array: StringArray = values
                .iter()
                .map(|v| (!v.is_null()).then(|| v.to_string()))
                .collect();
            (Arc::new(array), DataType::Utf8)
        }
    }
}

/// Convert a table to an Arrow record batch.
///
/// # Errors
///
/// Returns [`crate::Error::Arrow`] if the batch cannot be assembled.
///
/// # Example
///
/// ```rust
/// use bench_overview::table::export::to_record_batch;
/// use bench_overview::{Scalar, Table};
///
/// let mut table = Table::new(vec!["accuracy".to_string()]);
/// table.push_row(vec![Scalar::Float(0.9)])?;
///
/// let batch = to_record_batch(&table)?;
/// assert_eq!(batch.num_rows(), 1);
/// # Ok::<(), bench_overview::Error>(())
/// ```
pub fn to_record_batch(table: &Table) -> Result<RecordBatch> {
    let mut fields = Vec::new();
    let mut arrays = Vec::new();
    for position in table.display_positions() {
        let values: Vec<&Scalar> = table.rows.iter().map(|row| &row[position]).collect();
        let (array, data_type) = build_array(infer_kind(&table.columns[position], &values), &values);
        fields.push(Field::new(table.columns[position].as_str(), data_type, true));
        arrays.push(array);
    }

    let options = RecordBatchOptions::new().with_row_count(Some(table.num_rows()));
    let batch = RecordBatch::try_new_with_options(Arc::new(Schema::new(fields)), arrays, &options)?;
    Ok(batch)
}

/// Write a table to a Parquet file.
///
/// # Errors
///
/// Returns [`crate::Error::Io`] if the file cannot be created and
/// [`crate::Error::Parquet`] if encoding fails.
pub fn write_parquet<P: AsRef<Path>>(table: &Table, path: P) -> Result<()> {
    let batch = to_record_batch(table)?;
    let file = File::create(path.as_ref())?;
    let mut writer = ArrowWriter::try_new(file, batch.schema(), None)?;
    writer.write(&batch)?;
    writer.close()?;
    debug!(
        path = %path.as_ref().display(),
        rows = batch.num_rows(),
        "Wrote overview table to Parquet"
    );
    Ok(())
}
