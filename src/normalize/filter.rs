use anyhow::{anyhow, Context, Result};
use arrow::{
    array::{Array, BooleanArray},
    compute::filter_record_batch,
    record_batch::RecordBatch,
};
use tracing::info;

/// Keep only the rows whose `score_column` is non-null. Row order is preserved.
#[tracing::instrument(level = "info", skip(batch))]
pub fn filter_primary_score(batch: &RecordBatch, score_column: &str) -> Result<RecordBatch> {
    let col = batch
        .column_by_name(score_column)
        .ok_or_else(|| anyhow!("primary score column {:?} missing from table", score_column))?;

    let mask: BooleanArray = (0..col.len()).map(|i| Some(col.is_valid(i))).collect();
    let kept = filter_record_batch(batch, &mask).context("filtering on primary score")?;

    info!(
        before = batch.num_rows(),
        after = kept.num_rows(),
        "dropped rows without a primary score"
    );
    Ok(kept)
}
