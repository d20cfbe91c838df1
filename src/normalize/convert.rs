use anyhow::{Context, Result};
use arrow::{
    array::{Array, ArrayRef, Float64Builder, Int64Builder, StringArray},
    datatypes::{DataType, Field, Schema},
    record_batch::RecordBatch,
};
use std::sync::Arc;
use tracing::debug;

use super::cells::{parse_rank, parse_score};
use super::roles::ColumnRoles;
use crate::load::RawTable;

/// Build an all-Utf8 batch from the raw rows. Empty cells become nulls.
pub fn to_record_batch(table: &RawTable) -> Result<RecordBatch> {
    let fields: Vec<Field> = table
        .headers
        .iter()
        .map(|h| Field::new(h, DataType::Utf8, true))
        .collect();

    let cols: Vec<ArrayRef> = (0..table.headers.len())
        .map(|i| {
            let arr: StringArray = table
                .rows
                .iter()
                .map(|row| {
                    let cell = row[i].as_str();
                    if cell.trim().is_empty() {
                        None
                    } else {
                        Some(cell)
                    }
                })
                .collect();
            Arc::new(arr) as ArrayRef
        })
        .collect();

    RecordBatch::try_new(Arc::new(Schema::new(fields)), cols)
        .context("building record batch from raw table")
}

/// Convert Utf8 rank columns to Int64 and Utf8 score columns to Float64.
/// Cells that do not parse become null. Columns that are already numeric
/// (or any other type) pass through untouched.
#[tracing::instrument(level = "debug", skip_all)]
pub fn coerce_numeric(batch: &RecordBatch, roles: &ColumnRoles) -> Result<RecordBatch> {
    let mut fields = Vec::with_capacity(batch.num_columns());
    let mut out = Vec::with_capacity(batch.num_columns());

    for (arr, fld) in batch.columns().iter().zip(batch.schema().fields()) {
        let name = fld.name();
        match arr.as_any().downcast_ref::<StringArray>() {
            Some(sarr) if roles.is_rank(name) => {
                let mut b = Int64Builder::with_capacity(sarr.len());
                for opt in sarr.iter() {
                    b.append_option(opt.and_then(parse_rank));
                }
                let col = b.finish();
                log_coercion_nulls(name, sarr, col.null_count());
                fields.push(Field::new(name, DataType::Int64, true));
                out.push(Arc::new(col) as ArrayRef);
            }
            Some(sarr) if roles.is_score(name) => {
                let mut b = Float64Builder::with_capacity(sarr.len());
                for opt in sarr.iter() {
                    b.append_option(opt.and_then(parse_score));
                }
                let col = b.finish();
                log_coercion_nulls(name, sarr, col.null_count());
                fields.push(Field::new(name, DataType::Float64, true));
                out.push(Arc::new(col) as ArrayRef);
            }
            _ => {
                fields.push(fld.as_ref().clone());
                out.push(arr.clone());
            }
        }
    }

    RecordBatch::try_new(Arc::new(Schema::new(fields)), out).context("coercing numeric columns")
}

fn log_coercion_nulls(name: &str, before: &StringArray, nulls_after: usize) {
    let introduced = nulls_after.saturating_sub(before.null_count());
    if introduced > 0 {
        debug!(column = %name, introduced, "unparseable cells coerced to null");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::{Float64Array, Int64Array};

    fn roles() -> ColumnRoles {
        ColumnRoles {
            rank_columns: vec!["2024_rank".into()],
            score_columns: vec!["overall_score".into()],
            primary_score: "overall_score".into(),
            primary_rank: Some("2024_rank".into()),
            delta: None,
        }
    }

    fn raw() -> RawTable {
        RawTable {
            headers: vec![
                "2024_rank".into(),
                "institution_name".into(),
                "overall_score".into(),
            ],
            rows: vec![
                vec!["6".into(), "X".into(), "91.2".into()],
                vec!["601-650".into(), "Y".into(), "".into()],
                vec!["".into(), "  ".into(), "n/a".into()],
            ],
        }
    }

    #[test]
    fn test_empty_cells_become_nulls() -> Result<()> {
        let batch = to_record_batch(&raw())?;
        assert_eq!(batch.num_rows(), 3);
        assert_eq!(batch.column(0).null_count(), 1);
        assert_eq!(batch.column(1).null_count(), 1);
        assert_eq!(batch.column(2).null_count(), 1);
        Ok(())
    }

    #[test]
    fn test_ranks_and_scores_are_typed() -> Result<()> {
        let batch = coerce_numeric(&to_record_batch(&raw())?, &roles())?;
        let schema = batch.schema();
        assert_eq!(schema.field(0).data_type(), &DataType::Int64);
        assert_eq!(schema.field(1).data_type(), &DataType::Utf8);
        assert_eq!(schema.field(2).data_type(), &DataType::Float64);

        let rank = batch
            .column(0)
            .as_any()
            .downcast_ref::<Int64Array>()
            .unwrap();
        assert_eq!(rank.value(0), 6);
        assert!(rank.is_null(1));
        assert!(rank.is_null(2));

        let score = batch
            .column(2)
            .as_any()
            .downcast_ref::<Float64Array>()
            .unwrap();
        assert_eq!(score.value(0), 91.2);
        assert!(score.is_null(1));
        assert!(score.is_null(2));
        Ok(())
    }

    #[test]
    fn test_coercion_is_idempotent() -> Result<()> {
        let once = coerce_numeric(&to_record_batch(&raw())?, &roles())?;
        let twice = coerce_numeric(&once, &roles())?;
        assert_eq!(once, twice);
        Ok(())
    }
}
