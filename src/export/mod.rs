// src/export/mod.rs
use anyhow::{Context, Result};
use arrow::{csv::WriterBuilder, record_batch::RecordBatch};
use parquet::{arrow::ArrowWriter, basic::Compression, file::properties::WriterProperties};
use std::{
    fs::{self, File},
    io::{BufWriter, Write},
    path::Path,
};
use tracing::info;

/// Create the parent directory of `path` if it has one.
pub fn ensure_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating output directory {:?}", parent))?;
    }
    Ok(())
}

/// Write the cleaned table as CSV with a header row.
///
/// Ranks are Int64 by this point, so they serialize as plain integers ("7")
/// and missing values as empty fields; floats are only used for scores.
#[tracing::instrument(level = "info", skip(batch, path), fields(path = %path.display()))]
pub fn write_csv(batch: &RecordBatch, path: &Path) -> Result<()> {
    ensure_parent(path)?;
    let file = File::create(path).with_context(|| format!("creating CSV file {:?}", path))?;
    let mut writer = WriterBuilder::new()
        .with_header(true)
        .build(BufWriter::new(file));
    writer
        .write(batch)
        .with_context(|| format!("writing CSV rows to {:?}", path))?;
    writer
        .into_inner()
        .flush()
        .with_context(|| format!("flushing {:?}", path))?;
    info!(rows = batch.num_rows(), cols = batch.num_columns(), "saved cleaned CSV");
    Ok(())
}

/// Write the cleaned table as a single-row-group Parquet file, keeping the
/// native column types (Int64 ranks, Float64 scores, Utf8 text).
#[tracing::instrument(level = "info", skip(batch, path), fields(path = %path.display()))]
pub fn write_parquet(batch: &RecordBatch, path: &Path) -> Result<u64> {
    ensure_parent(path)?;
    let file = File::create(path).with_context(|| format!("creating parquet file {:?}", path))?;
    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();
    let mut writer = ArrowWriter::try_new(file, batch.schema(), Some(props))
        .context("creating Arrow writer for cleaned table")?;
    writer.write(batch).context("writing cleaned batch")?;
    writer.close().context("closing parquet writer")?;

    let bytes = fs::metadata(path)
        .with_context(|| format!("reading size of {:?}", path))?
        .len();
    info!(rows = batch.num_rows(), bytes, "saved cleaned parquet");
    Ok(bytes)
}
