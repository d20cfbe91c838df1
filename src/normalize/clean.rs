use std::collections::HashSet;
use tracing::{debug, info};

use super::cells::is_non_numeric_rank;
use crate::load::RawTable;

/// Drop the first row when its rank cell restates a header ("rank display")
/// instead of holding data. Returns whether a row was removed.
pub fn drop_placeholder_row(table: &mut RawTable, rank_column: Option<&str>, marker: char) -> bool {
    let Some(col) = rank_column.and_then(|c| table.column_index(c)) else {
        debug!("no rank column to inspect for a placeholder row");
        return false;
    };
    let is_placeholder = table
        .rows
        .first()
        .map(|row| is_non_numeric_rank(&row[col], marker))
        .unwrap_or(false);

    if is_placeholder {
        let dropped = table.rows.remove(0);
        info!(cell = %dropped[col], "dropped placeholder row");
    }
    is_placeholder
}

/// Remove rows identical (in every column) to an earlier row, keeping the first.
/// Returns how many rows were removed.
pub fn drop_duplicates(table: &mut RawTable) -> usize {
    let before = table.rows.len();
    let mut seen: HashSet<Vec<String>> = HashSet::with_capacity(before);
    table.rows.retain(|row| seen.insert(row.clone()));
    let removed = before - table.rows.len();
    if removed > 0 {
        info!(removed, "dropped duplicate rows");
    }
    removed
}
