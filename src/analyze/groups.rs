use anyhow::{anyhow, Result};
use arrow::{array::Array, record_batch::RecordBatch};
use serde::Serialize;
use std::collections::HashMap;

use super::columns::{float_column, text_column};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupMean {
    pub group: String,
    pub mean: f64,
    pub count: usize,
}

/// Mean score per value of `group_column`, highest first, at most `n` groups.
/// Rows with a null group or null score are ignored. Equal means keep the
/// order in which the groups first appear.
pub fn group_means(
    batch: &RecordBatch,
    group_column: &str,
    score_column: &str,
    n: usize,
) -> Result<Vec<GroupMean>> {
    let groups = text_column(batch, group_column)
        .ok_or_else(|| anyhow!("group column {:?} not found or not text", group_column))?;
    let scores = float_column(batch, score_column)?;

    let mut order: Vec<String> = Vec::new();
    let mut acc: HashMap<String, (f64, usize)> = HashMap::new();
    for i in 0..batch.num_rows() {
        if groups.is_null(i) || scores.is_null(i) {
            continue;
        }
        let key = groups.value(i);
        let slot = acc.entry(key.to_string()).or_insert_with(|| {
            order.push(key.to_string());
            (0.0, 0)
        });
        slot.0 += scores.value(i);
        slot.1 += 1;
    }

    let mut means: Vec<GroupMean> = order
        .into_iter()
        .map(|group| {
            let (sum, count) = acc[&group];
            GroupMean {
                mean: sum / count as f64,
                count,
                group,
            }
        })
        .collect();
    means.sort_by(|a, b| b.mean.total_cmp(&a.mean));
    means.truncate(n);
    Ok(means)
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::{
        array::{ArrayRef, Float64Array, StringArray},
        datatypes::{DataType, Field, Schema},
    };
    use std::sync::Arc;

    #[test]
    fn test_means_sorted_descending_and_truncated() -> Result<()> {
        let schema = Schema::new(vec![
            Field::new("country", DataType::Utf8, true),
            Field::new("overall_score", DataType::Float64, true),
        ]);
        let batch = RecordBatch::try_new(
            Arc::new(schema),
            vec![
                Arc::new(StringArray::from(vec![
                    Some("UK"),
                    Some("US"),
                    Some("UK"),
                    None,
                    Some("CH"),
                    Some("FR"),
                ])) as ArrayRef,
                Arc::new(Float64Array::from(vec![
                    Some(90.0),
                    Some(80.0),
                    Some(70.0),
                    Some(99.0),
                    Some(80.0),
                    Some(10.0),
                ])),
            ],
        )?;

        let means = group_means(&batch, "country", "overall_score", 3)?;
        let got: Vec<(&str, f64, usize)> = means
            .iter()
            .map(|g| (g.group.as_str(), g.mean, g.count))
            .collect();
        assert_eq!(got, vec![("UK", 80.0, 2), ("US", 80.0, 1), ("CH", 80.0, 1)]);
        Ok(())
    }

    #[test]
    fn test_missing_group_column_is_an_error() -> Result<()> {
        let schema = Schema::new(vec![Field::new("overall_score", DataType::Float64, true)]);
        let batch = RecordBatch::try_new(
            Arc::new(schema),
            vec![Arc::new(Float64Array::from(vec![1.0])) as ArrayRef],
        )?;
        assert!(group_means(&batch, "country", "overall_score", 10).is_err());
        Ok(())
    }
}
