use anyhow::Result;
use arrow::{array::Array, record_batch::RecordBatch};
use serde::Serialize;

use super::columns::{float_column, label, text_column};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedEntry {
    /// Row index in the cleaned table.
    pub row: usize,
    pub name: Option<String>,
    pub score: f64,
}

/// The `n` highest-scoring rows, descending. Equal scores keep table order.
pub fn top_n_by_score(
    batch: &RecordBatch,
    score_column: &str,
    name_column: &str,
    n: usize,
) -> Result<Vec<RankedEntry>> {
    let scores = float_column(batch, score_column)?;
    let names = text_column(batch, name_column);

    let mut rows: Vec<usize> = (0..scores.len()).filter(|&i| scores.is_valid(i)).collect();
    // sort_by is stable, which is what keeps ties in table order
    rows.sort_by(|&a, &b| scores.value(b).total_cmp(&scores.value(a)));

    Ok(rows
        .into_iter()
        .take(n)
        .map(|row| RankedEntry {
            row,
            name: label(names, row),
            score: scores.value(row),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use arrow::{
        array::{ArrayRef, Float64Array, StringArray},
        datatypes::{DataType, Field, Schema},
    };
    use std::sync::Arc;

    fn batch() -> RecordBatch {
        let schema = Schema::new(vec![
            Field::new("institution_name", DataType::Utf8, true),
            Field::new("overall_score", DataType::Float64, true),
        ]);
        RecordBatch::try_new(
            Arc::new(schema),
            vec![
                Arc::new(StringArray::from(vec!["A", "B", "C", "D", "E"])) as ArrayRef,
                Arc::new(Float64Array::from(vec![
                    Some(80.0),
                    Some(95.0),
                    None,
                    Some(95.0),
                    Some(70.0),
                ])),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_descending_with_stable_ties() -> Result<()> {
        let top = top_n_by_score(&batch(), "overall_score", "institution_name", 3)?;
        let names: Vec<_> = top.iter().map(|e| e.name.clone().unwrap()).collect();
        assert_eq!(names, vec!["B", "D", "A"]);
        assert_eq!(top[0].row, 1);
        assert_eq!(top[1].row, 3);
        Ok(())
    }

    #[test]
    fn test_length_is_min_of_n_and_rows() -> Result<()> {
        let top = top_n_by_score(&batch(), "overall_score", "institution_name", 50)?;
        assert_eq!(top.len(), 4);
        Ok(())
    }

    #[test]
    fn test_missing_name_column_gives_unlabeled_entries() -> Result<()> {
        let top = top_n_by_score(&batch(), "overall_score", "university", 1)?;
        assert_eq!(top[0].name, None);
        assert_eq!(top[0].score, 95.0);
        Ok(())
    }
}
