use anyhow::{Context, Result};
use arrow::{
    array::{Array, ArrayRef, Int64Array},
    datatypes::{DataType, Field, Schema},
    record_batch::RecordBatch,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::info;

use super::columns::{int_column, label, text_column};
use crate::normalize::{DeltaPair, RANK_DELTA_COLUMN};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RankMove {
    pub row: usize,
    pub name: Option<String>,
    pub prior: i64,
    pub current: i64,
    /// prior − current; positive means the entity moved up.
    pub delta: i64,
}

/// Append (or replace) `rank_change = prior − current`. Null if either rank is null.
#[tracing::instrument(level = "info", skip(batch), fields(prior = %pair.prior, current = %pair.current))]
pub fn add_rank_delta(batch: &RecordBatch, pair: &DeltaPair) -> Result<RecordBatch> {
    let prior = int_column(batch, &pair.prior)?;
    let current = int_column(batch, &pair.current)?;

    let delta: Int64Array = prior
        .iter()
        .zip(current.iter())
        .map(|(p, c)| match (p, c) {
            (Some(p), Some(c)) => p.checked_sub(c),
            _ => None,
        })
        .collect();
    info!(
        computed = delta.len() - delta.null_count(),
        missing = delta.null_count(),
        "rank delta"
    );

    let schema = batch.schema();
    let mut fields: Vec<Arc<Field>> = Vec::with_capacity(batch.num_columns() + 1);
    let mut cols: Vec<ArrayRef> = Vec::with_capacity(batch.num_columns() + 1);
    for (fld, col) in schema.fields().iter().zip(batch.columns()) {
        if fld.name() != RANK_DELTA_COLUMN {
            fields.push(fld.clone());
            cols.push(col.clone());
        }
    }
    fields.push(Arc::new(Field::new(RANK_DELTA_COLUMN, DataType::Int64, true)));
    cols.push(Arc::new(delta));

    RecordBatch::try_new(Arc::new(Schema::new(fields)), cols).context("adding rank delta column")
}

fn moves(batch: &RecordBatch, name_column: &str, pair: &DeltaPair) -> Result<Vec<RankMove>> {
    let prior = int_column(batch, &pair.prior)?;
    let current = int_column(batch, &pair.current)?;
    let delta = int_column(batch, RANK_DELTA_COLUMN)?;
    let names = text_column(batch, name_column);

    Ok((0..batch.num_rows())
        .filter(|&i| delta.is_valid(i))
        .map(|row| RankMove {
            row,
            name: label(names, row),
            prior: prior.value(row),
            current: current.value(row),
            delta: delta.value(row),
        })
        .collect())
}

/// Largest positive deltas first; equal deltas keep table order.
pub fn climbers(
    batch: &RecordBatch,
    name_column: &str,
    pair: &DeltaPair,
    n: usize,
) -> Result<Vec<RankMove>> {
    let mut all = moves(batch, name_column, pair)?;
    all.sort_by(|a, b| b.delta.cmp(&a.delta));
    all.truncate(n);
    Ok(all)
}

/// Most negative deltas first; equal deltas keep table order.
pub fn fallers(
    batch: &RecordBatch,
    name_column: &str,
    pair: &DeltaPair,
    n: usize,
) -> Result<Vec<RankMove>> {
    let mut all = moves(batch, name_column, pair)?;
    all.sort_by_key(|m| m.delta);
    all.truncate(n);
    Ok(all)
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::array::StringArray;

    fn pair() -> DeltaPair {
        DeltaPair {
            prior: "2023_rank".into(),
            current: "2024_rank".into(),
        }
    }

    fn batch() -> RecordBatch {
        let schema = Schema::new(vec![
            Field::new("2024_rank", DataType::Int64, true),
            Field::new("2023_rank", DataType::Int64, true),
            Field::new("institution_name", DataType::Utf8, true),
        ]);
        RecordBatch::try_new(
            Arc::new(schema),
            vec![
                Arc::new(Int64Array::from(vec![Some(6), Some(10), Some(3), None, Some(20)]))
                    as ArrayRef,
                Arc::new(Int64Array::from(vec![Some(8), Some(5), Some(5), Some(1), Some(15)])),
                Arc::new(StringArray::from(vec!["X", "Y", "Z", "W", "V"])),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_delta_is_prior_minus_current() -> Result<()> {
        let out = add_rank_delta(&batch(), &pair())?;
        let d = int_column(&out, RANK_DELTA_COLUMN)?;
        assert_eq!(d.value(0), 2);
        assert_eq!(d.value(1), -5);
        assert_eq!(d.value(2), 2);
        assert!(d.is_null(3));
        assert_eq!(d.value(4), -5);
        assert_eq!(out.schema().fields().last().unwrap().name(), RANK_DELTA_COLUMN);
        Ok(())
    }

    #[test]
    fn test_delta_column_is_replaced_not_duplicated() -> Result<()> {
        let once = add_rank_delta(&batch(), &pair())?;
        let twice = add_rank_delta(&once, &pair())?;
        assert_eq!(once, twice);
        Ok(())
    }

    #[test]
    fn test_climbers_and_fallers_are_stable_and_skip_nulls() -> Result<()> {
        let out = add_rank_delta(&batch(), &pair())?;

        let up = climbers(&out, "institution_name", &pair(), 10)?;
        let names: Vec<_> = up.iter().map(|m| m.name.as_deref().unwrap()).collect();
        assert_eq!(names, vec!["X", "Z", "Y", "V"]);

        let down = fallers(&out, "institution_name", &pair(), 2)?;
        let names: Vec<_> = down.iter().map(|m| m.name.as_deref().unwrap()).collect();
        assert_eq!(names, vec!["Y", "V"]);
        assert_eq!(down[0].prior, 5);
        assert_eq!(down[0].current, 10);
        Ok(())
    }
}
