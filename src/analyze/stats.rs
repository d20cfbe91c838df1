use anyhow::Result;
use arrow::record_batch::RecordBatch;
use serde::Serialize;

use super::columns::float_column;

/// Descriptive statistics over the non-null values of one score column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreSummary {
    pub count: usize,
    pub mean: f64,
    pub median: f64,
    /// Population standard deviation (divides by n).
    pub std_dev: f64,
    pub p90: f64,
    pub min: f64,
    pub max: f64,
}

/// Non-null values of a Float64 column, in row order.
pub fn score_values(batch: &RecordBatch, column: &str) -> Result<Vec<f64>> {
    Ok(float_column(batch, column)?.iter().flatten().collect())
}

/// Returns `None` when the column holds no values.
pub fn summarize_scores(batch: &RecordBatch, column: &str) -> Result<Option<ScoreSummary>> {
    Ok(summarize(&score_values(batch, column)?))
}

pub fn summarize(values: &[f64]) -> Option<ScoreSummary> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let n = sorted.len() as f64;
    let mean = sorted.iter().sum::<f64>() / n;
    let variance = sorted.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;

    Some(ScoreSummary {
        count: sorted.len(),
        mean,
        median: percentile_sorted(&sorted, 50.0),
        std_dev: variance.sqrt(),
        p90: percentile_sorted(&sorted, 90.0),
        min: sorted[0],
        max: sorted[sorted.len() - 1],
    })
}

/// Linear interpolation between closest ranks over an ascending slice.
/// `sorted` must be non-empty.
pub fn percentile_sorted(sorted: &[f64], pct: f64) -> f64 {
    let pos = (pct / 100.0).clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_summary_matches_hand_computed_values() {
        let s = summarize(&[4.0, 1.0, 3.0, 2.0]).unwrap();
        assert_eq!(s.count, 4);
        assert!(close(s.mean, 2.5));
        assert!(close(s.median, 2.5));
        assert!(close(s.std_dev, 1.25_f64.sqrt()));
        // pos = 0.9 * 3 = 2.7 → 3 + 0.7 * (4 - 3)
        assert!(close(s.p90, 3.7));
        assert_eq!(s.min, 1.0);
        assert_eq!(s.max, 4.0);
    }

    #[test]
    fn test_single_value_and_empty() {
        let s = summarize(&[42.0]).unwrap();
        assert_eq!(s.median, 42.0);
        assert_eq!(s.p90, 42.0);
        assert_eq!(s.std_dev, 0.0);
        assert!(summarize(&[]).is_none());
    }

    #[test]
    fn test_odd_count_median() {
        let s = summarize(&[10.0, 30.0, 20.0]).unwrap();
        assert_eq!(s.median, 20.0);
    }
}
