// src/config.rs

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path, path::PathBuf};

/// Explicit column declarations. Anything left unset falls back to discovery
/// by column name (see `normalize::roles`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnsConfig {
    /// Rank-bearing columns, after header normalization.
    pub rank: Option<Vec<String>>,
    /// Score-bearing columns, after header normalization.
    pub score: Option<Vec<String>>,
    pub primary_score: Option<String>,
    /// Rank column inspected when looking for a header-restatement row.
    pub primary_rank: Option<String>,
    /// Earlier-year rank for the rank delta.
    pub prior_rank: Option<String>,
    /// Later-year rank for the rank delta.
    pub current_rank: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    pub parquet_output: Option<PathBuf>,
    /// Histogram image (SVG).
    pub histogram_output: Option<PathBuf>,
    /// Interactive plotly version of the histogram.
    pub histogram_html: Option<PathBuf>,
    pub summary_output: Option<PathBuf>,
    pub delimiter: char,
    pub tie_marker: char,
    pub top_n: usize,
    pub histogram_bins: usize,
    pub name_column: String,
    pub group_column: String,
    pub columns: ColumnsConfig,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("data/qs2024.csv"),
            output: PathBuf::from("data/qs2024_cleaned.csv"),
            parquet_output: None,
            histogram_output: Some(PathBuf::from("score_distribution.svg")),
            histogram_html: None,
            summary_output: None,
            delimiter: ',',
            tie_marker: '=',
            top_n: 10,
            histogram_bins: 30,
            name_column: "institution_name".into(),
            group_column: "country".into(),
            columns: ColumnsConfig::default(),
        }
    }
}

impl PipelineConfig {
    /// Load a YAML config file. Fields missing from the file keep their defaults.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let cfg: PipelineConfig = serde_yaml::from_str(&text)
            .with_context(|| format!("parsing config file {}", path.display()))?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<()> {
        if self.top_n == 0 {
            bail!("top_n must be at least 1");
        }
        if self.histogram_bins == 0 {
            bail!("histogram_bins must be at least 1");
        }
        if !self.delimiter.is_ascii() {
            bail!("delimiter must be a single ASCII character, got {:?}", self.delimiter);
        }
        if self.tie_marker.is_ascii_digit() || self.tie_marker == '.' || self.tie_marker == '-' {
            bail!("tie marker {:?} would corrupt numeric ranks", self.tie_marker);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_yaml_overrides_only_given_fields() -> Result<()> {
        let mut tmp = NamedTempFile::new()?;
        writeln!(
            tmp,
            "input: raw/qs.csv\ntop_n: 5\ncolumns:\n  primary_score: academic_reputation_score\n"
        )?;

        let cfg = PipelineConfig::from_yaml_file(tmp.path())?;
        assert_eq!(cfg.input, PathBuf::from("raw/qs.csv"));
        assert_eq!(cfg.top_n, 5);
        assert_eq!(cfg.histogram_bins, 30);
        assert_eq!(cfg.name_column, "institution_name");
        assert_eq!(
            cfg.columns.primary_score.as_deref(),
            Some("academic_reputation_score")
        );
        assert!(cfg.columns.rank.is_none());
        Ok(())
    }

    #[test]
    fn test_validate_rejects_zero_top_n_and_numeric_marker() {
        let cfg = PipelineConfig {
            top_n: 0,
            ..Default::default()
        };
        assert!(cfg.validate().is_err());

        let cfg = PipelineConfig {
            tie_marker: '7',
            ..Default::default()
        };
        assert!(cfg.validate().is_err());

        assert!(PipelineConfig::default().validate().is_ok());
    }

    #[test]
    fn test_missing_config_file_names_the_path() {
        let err = PipelineConfig::from_yaml_file("does/not/exist.yaml").unwrap_err();
        assert!(format!("{:#}", err).contains("does/not/exist.yaml"));
    }
}
