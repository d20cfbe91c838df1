use anyhow::{anyhow, Result};
use arrow::{
    array::{Array, Float64Array, Int64Array, StringArray},
    record_batch::RecordBatch,
};

pub fn float_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a Float64Array> {
    batch
        .column_by_name(name)
        .ok_or_else(|| anyhow!("column {:?} not found", name))?
        .as_any()
        .downcast_ref::<Float64Array>()
        .ok_or_else(|| anyhow!("column {:?} is not a Float64 column", name))
}

pub fn int_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a Int64Array> {
    batch
        .column_by_name(name)
        .ok_or_else(|| anyhow!("column {:?} not found", name))?
        .as_any()
        .downcast_ref::<Int64Array>()
        .ok_or_else(|| anyhow!("column {:?} is not an Int64 column", name))
}

/// Text column, if present. Used for labels, so absence is not an error.
pub fn text_column<'a>(batch: &'a RecordBatch, name: &str) -> Option<&'a StringArray> {
    batch
        .column_by_name(name)
        .and_then(|c| c.as_any().downcast_ref::<StringArray>())
}

pub fn label(names: Option<&StringArray>, row: usize) -> Option<String> {
    names.and_then(|n| {
        if n.is_valid(row) {
            Some(n.value(row).to_string())
        } else {
            None
        }
    })
}
