// src/load/mod.rs
use anyhow::{bail, Context, Result};
use csv::ReaderBuilder;

use std::{
    collections::HashSet,
    fs::File,
    io::{Cursor, Read},
    path::Path,
};
use tracing::{debug, info, warn};
use zip::ZipArchive;

/// A table exactly as read from disk, before any typing.
#[derive(Debug, Clone, PartialEq)]
pub struct RawTable {
    /// Column names, already normalized by `normalize_header`.
    pub headers: Vec<String>,
    /// One Vec per data row, padded/truncated to `headers.len()`.
    /// An empty cell means the value is missing.
    pub rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn shape(&self) -> (usize, usize) {
        (self.rows.len(), self.headers.len())
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }
}

/// Lowercase, trim, and replace spaces with underscores: "Overall Score" → "overall_score".
pub fn normalize_header(raw: &str) -> String {
    raw.trim().to_lowercase().replace(' ', "_")
}

/// Load the input table. `.zip` inputs are opened as archives and the first
/// `.csv` entry is parsed; anything else is parsed as delimited text.
#[tracing::instrument(level = "info", skip(path), fields(path = %path.as_ref().display()))]
pub fn load_table<P: AsRef<Path>>(path: P, delimiter: u8) -> Result<RawTable> {
    let path = path.as_ref();
    let is_zip = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("zip"))
        .unwrap_or(false);

    let data = if is_zip {
        read_first_csv_from_zip(path)?
    } else {
        let mut buf = Vec::new();
        File::open(path)
            .with_context(|| format!("Failed to open input file: {:?}", path))?
            .read_to_end(&mut buf)
            .with_context(|| format!("Failed to read input file: {:?}", path))?;
        buf
    };

    let table = parse_delimited(&data, delimiter)
        .with_context(|| format!("Failed to parse {:?}", path))?;
    info!(
        rows = table.rows.len(),
        cols = table.headers.len(),
        "loaded raw table"
    );
    Ok(table)
}

fn read_first_csv_from_zip(zip_path: &Path) -> Result<Vec<u8>> {
    let file = File::open(zip_path)
        .with_context(|| format!("Failed to open ZIP file: {:?}", zip_path))?;
    let mut archive = ZipArchive::new(file)
        .with_context(|| format!("Failed to read ZIP archive: {:?}", zip_path))?;

    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .with_context(|| format!("Failed to access ZIP entry #{} in {:?}", i, zip_path))?;
        let name = entry.name().to_string();

        if entry.is_file() && name.to_lowercase().ends_with(".csv") {
            let mut buf = Vec::with_capacity(entry.size() as usize);
            entry
                .read_to_end(&mut buf)
                .with_context(|| format!("Failed to read {} into memory", name))?;
            debug!(entry = %name, bytes = buf.len(), "using archive entry");
            return Ok(buf);
        }
    }

    bail!("no .csv entry found in ZIP archive {:?}", zip_path)
}

/// Parse delimited text with a header row into a `RawTable`.
pub fn parse_delimited(data: &[u8], delimiter: u8) -> Result<RawTable> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(Cursor::new(data));

    let headers: Vec<String> = rdr
        .headers()
        .context("reading header row")?
        .iter()
        .map(normalize_header)
        .collect();

    if headers.is_empty() || headers.iter().all(|h| h.is_empty()) {
        bail!("input has no header row");
    }

    let mut seen = HashSet::with_capacity(headers.len());
    for h in &headers {
        if !seen.insert(h.as_str()) {
            bail!("duplicate column {:?} after header normalization", h);
        }
    }

    let width = headers.len();
    let mut rows = Vec::new();
    let mut warned_long = false;

    for (idx, result) in rdr.records().enumerate() {
        let record = result.with_context(|| format!("CSV parse error at record {}", idx))?;
        if record.len() > width && !warned_long {
            warn!(
                record = idx,
                cells = record.len(),
                headers = width,
                "row has more cells than headers; extra cells dropped"
            );
            warned_long = true;
        }
        let mut row: Vec<String> = record.iter().take(width).map(|s| s.to_string()).collect();
        row.resize(width, String::new());
        rows.push(row);
    }

    Ok(RawTable { headers, rows })
}
