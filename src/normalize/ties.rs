use anyhow::{Context, Result};
use arrow::{
    array::{ArrayRef, StringArray},
    datatypes::{DataType, Field, Schema},
    record_batch::RecordBatch,
};
use std::sync::Arc;
use tracing::debug;

use super::cells::strip_tie_marker;
use super::roles::{raw_companion, ColumnRoles};

/// Append a `<rank>_raw` copy of every rank column. A companion that already
/// exists is left untouched, so tie notation from the first pass survives reruns.
#[tracing::instrument(level = "debug", skip_all)]
pub fn preserve_ties(batch: &RecordBatch, roles: &ColumnRoles) -> Result<RecordBatch> {
    let schema = batch.schema();
    let mut fields: Vec<Arc<Field>> = schema.fields().iter().cloned().collect();
    let mut cols: Vec<ArrayRef> = batch.columns().to_vec();

    for rank in &roles.rank_columns {
        let companion = raw_companion(rank);
        if schema.index_of(&companion).is_ok() {
            debug!(%companion, "raw companion already present");
            continue;
        }
        let Ok(idx) = schema.index_of(rank) else {
            continue;
        };
        let arr = batch.column(idx);
        // Companions always hold text, even when the rank was already numeric.
        let raw: ArrayRef = match arr.as_any().downcast_ref::<StringArray>() {
            Some(_) => arr.clone(),
            None => arrow::compute::cast(arr, &DataType::Utf8)?,
        };
        fields.push(Arc::new(Field::new(&companion, DataType::Utf8, true)));
        cols.push(raw);
    }

    RecordBatch::try_new(Arc::new(Schema::new(fields)), cols)
        .context("appending raw rank companions")
}

/// Remove the tie marker from every Utf8 rank column ("6=" → "6").
/// Numeric rank columns are passed through unchanged.
#[tracing::instrument(level = "debug", skip_all)]
pub fn strip_tie_markers(
    batch: &RecordBatch,
    roles: &ColumnRoles,
    marker: char,
) -> Result<RecordBatch> {
    let mut cols = Vec::with_capacity(batch.num_columns());
    for (i, field) in batch.schema().fields().iter().enumerate() {
        let arr = batch.column(i);
        if roles.is_rank(field.name()) {
            if let Some(sarr) = arr.as_any().downcast_ref::<StringArray>() {
                let stripped: StringArray = sarr
                    .iter()
                    .map(|opt| opt.map(|s| strip_tie_marker(s, marker)))
                    .collect();
                cols.push(Arc::new(stripped) as ArrayRef);
                continue;
            }
        }
        cols.push(arr.clone());
    }

    RecordBatch::try_new(batch.schema(), cols).context("stripping tie markers")
}
