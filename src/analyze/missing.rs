use serde::Serialize;

use crate::load::RawTable;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MissingCount {
    pub column: String,
    pub missing: usize,
}

/// Empty cells per column, most missing first. Ties keep column order.
pub fn missing_counts(table: &RawTable) -> Vec<MissingCount> {
    let mut counts: Vec<MissingCount> = table
        .headers
        .iter()
        .enumerate()
        .map(|(i, column)| MissingCount {
            column: column.clone(),
            missing: table
                .rows
                .iter()
                .filter(|row| row[i].trim().is_empty())
                .count(),
        })
        .collect();
    counts.sort_by(|a, b| b.missing.cmp(&a.missing));
    counts
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_blank_cells_descending() {
        let table = RawTable {
            headers: vec!["a".into(), "b".into(), "c".into()],
            rows: vec![
                vec!["1".into(), "".into(), " ".into()],
                vec!["".into(), "".into(), "x".into()],
            ],
        };
        let got: Vec<(String, usize)> = missing_counts(&table)
            .into_iter()
            .map(|m| (m.column, m.missing))
            .collect();
        assert_eq!(
            got,
            vec![("b".into(), 2), ("a".into(), 1), ("c".into(), 1)]
        );
    }
}
