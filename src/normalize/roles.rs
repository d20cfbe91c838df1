use anyhow::{anyhow, bail, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info, warn};

use crate::config::ColumnsConfig;

/// Name of the derived prior-minus-current rank column.
pub const RANK_DELTA_COLUMN: &str = "rank_change";
/// Suffix of the verbatim rank copies.
pub const RAW_SUFFIX: &str = "_raw";

static YEAR_RANK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{4})_rank$").expect("year rank pattern should compile"));

/// Columns used for the rank delta.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeltaPair {
    pub prior: String,
    pub current: String,
}

/// What each column of the table is used for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnRoles {
    pub rank_columns: Vec<String>,
    pub score_columns: Vec<String>,
    pub primary_score: String,
    pub primary_rank: Option<String>,
    pub delta: Option<DeltaPair>,
}

pub fn raw_companion(rank_column: &str) -> String {
    format!("{}{}", rank_column, RAW_SUFFIX)
}

fn is_derived(name: &str) -> bool {
    name.ends_with(RAW_SUFFIX) || name == RANK_DELTA_COLUMN
}

fn discover(headers: &[String], needle: &str) -> Vec<String> {
    headers
        .iter()
        .filter(|h| !is_derived(h) && h.to_lowercase().contains(needle))
        .cloned()
        .collect()
}

fn declared(headers: &[String], names: &[String], kind: &str) -> Result<Vec<String>> {
    for name in names {
        if !headers.contains(name) {
            bail!("configured {} column {:?} is not present in the input", kind, name);
        }
    }
    Ok(names.to_vec())
}

/// Pick the two most recent `<yyyy>_rank` columns, earlier year first.
fn detect_year_pair(rank_columns: &[String]) -> Option<DeltaPair> {
    let mut years: Vec<(u32, &String)> = rank_columns
        .iter()
        .filter_map(|c| {
            YEAR_RANK
                .captures(c)
                .and_then(|caps| caps[1].parse::<u32>().ok())
                .map(|y| (y, c))
        })
        .collect();
    years.sort_by_key(|(y, _)| *y);
    match years.as_slice() {
        [.., (_, prior), (_, current)] => Some(DeltaPair {
            prior: (*prior).clone(),
            current: (*current).clone(),
        }),
        _ => None,
    }
}

impl ColumnRoles {
    /// Classify `headers` using the explicit declarations in `cfg`, falling back
    /// to name discovery for anything not declared.
    pub fn resolve(headers: &[String], cfg: &ColumnsConfig) -> Result<Self> {
        let mut rank_columns = match &cfg.rank {
            Some(names) => declared(headers, names, "rank")?,
            None => discover(headers, "rank"),
        };
        let score_columns = match &cfg.score {
            Some(names) => declared(headers, names, "score")?,
            None => discover(headers, "score"),
        };

        // A column is either a rank or a score; "ranking_score" is a score.
        rank_columns.retain(|c| {
            let both = score_columns.contains(c);
            if both {
                debug!(column = %c, "column matches rank and score; treating as score");
            }
            !both
        });

        if score_columns.is_empty() {
            bail!(
                "no score-like column found among {} columns ({})",
                headers.len(),
                headers.join(", ")
            );
        }

        let primary_score = match &cfg.primary_score {
            Some(name) => {
                if !score_columns.contains(name) {
                    return Err(anyhow!(
                        "primary score column {:?} is not a score column (have: {})",
                        name,
                        score_columns.join(", ")
                    ));
                }
                name.clone()
            }
            None if score_columns.iter().any(|c| c == "overall_score") => "overall_score".into(),
            None => {
                let first = score_columns[0].clone();
                warn!(
                    column = %first,
                    candidates = score_columns.len(),
                    "no overall_score column; falling back to first score column"
                );
                first
            }
        };

        let delta = match (&cfg.prior_rank, &cfg.current_rank) {
            (Some(prior), Some(current)) => {
                if rank_columns.contains(prior) && rank_columns.contains(current) {
                    Some(DeltaPair {
                        prior: prior.clone(),
                        current: current.clone(),
                    })
                } else {
                    info!(%prior, %current, "rank delta columns not both present; skipping delta");
                    None
                }
            }
            (None, None) => detect_year_pair(&rank_columns),
            _ => bail!("prior_rank and current_rank must be configured together"),
        };

        let primary_rank = match &cfg.primary_rank {
            Some(name) => {
                if !rank_columns.contains(name) {
                    bail!("primary rank column {:?} is not a rank column", name);
                }
                Some(name.clone())
            }
            None => delta
                .as_ref()
                .map(|d| d.current.clone())
                .or_else(|| rank_columns.first().cloned()),
        };

        info!(
            ranks = ?rank_columns,
            scores = ?score_columns,
            primary = %primary_score,
            "resolved column roles"
        );

        Ok(Self {
            rank_columns,
            score_columns,
            primary_score,
            primary_rank,
            delta,
        })
    }

    pub fn is_rank(&self, name: &str) -> bool {
        self.rank_columns.iter().any(|c| c == name)
    }

    pub fn is_score(&self, name: &str) -> bool {
        self.score_columns.iter().any(|c| c == name)
    }
}
