// src/normalize/mod.rs
pub mod cells;
pub mod clean;
pub mod convert;
pub mod filter;
pub mod roles;
pub mod ties;

pub use clean::{drop_duplicates, drop_placeholder_row};
pub use convert::{coerce_numeric, to_record_batch};
pub use filter::filter_primary_score;
pub use roles::{raw_companion, ColumnRoles, DeltaPair, RANK_DELTA_COLUMN, RAW_SUFFIX};
pub use ties::{preserve_ties, strip_tie_markers};

use anyhow::Result;
use arrow::record_batch::RecordBatch;

/// Raw companions → tie stripping → numeric coercion.
///
/// Running this on its own output is a no-op: companions already exist,
/// there is no marker left to strip, and typed columns pass through.
pub fn normalize_batch(batch: &RecordBatch, roles: &ColumnRoles, marker: char) -> Result<RecordBatch> {
    let with_raw = preserve_ties(batch, roles)?;
    let stripped = strip_tie_markers(&with_raw, roles, marker)?;
    coerce_numeric(&stripped, roles)
}
