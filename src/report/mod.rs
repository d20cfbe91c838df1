// src/report/mod.rs
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use prettytable::{format, Cell, Row, Table};
use serde::Serialize;
use std::{fs, path::Path};
use tracing::info;

use crate::analyze::{GroupMean, MissingCount, RankMove, RankedEntry, ScoreSummary};
use crate::export::ensure_parent;

/// Everything one run computed, in a form that can be printed or saved as JSON.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub generated_at: DateTime<Utc>,
    pub input: String,
    pub primary_score: String,
    pub raw_shape: (usize, usize),
    pub placeholder_dropped: bool,
    pub duplicates_dropped: usize,
    pub deduped_shape: (usize, usize),
    pub clean_shape: (usize, usize),
    pub missing: Vec<MissingCount>,
    pub scores: Option<ScoreSummary>,
    pub top: Vec<RankedEntry>,
    /// Present only when both delta rank columns exist.
    pub rank_delta: Option<RankDeltaReport>,
    pub group_column: String,
    pub group_means: Vec<GroupMean>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RankDeltaReport {
    pub prior: String,
    pub current: String,
    pub climbers: Vec<RankMove>,
    pub fallers: Vec<RankMove>,
}

fn header_row(names: &[&str]) -> Row {
    Row::new(names.iter().map(|n| Cell::new(n).style_spec("bFg")).collect())
}

fn name_cell(name: &Option<String>) -> Cell {
    Cell::new(name.as_deref().unwrap_or("-"))
}

fn new_table() -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BOX_CHARS);
    table
}

pub fn missing_table(missing: &[MissingCount]) -> Table {
    let mut table = new_table();
    table.add_row(header_row(&["Column", "Missing"]));
    for m in missing {
        table.add_row(Row::new(vec![
            Cell::new(&m.column),
            Cell::new(&m.missing.to_string()).style_spec("r"),
        ]));
    }
    table
}

pub fn top_table(top: &[RankedEntry], score_column: &str) -> Table {
    let mut table = new_table();
    table.add_row(header_row(&["Institution", score_column]));
    for e in top {
        table.add_row(Row::new(vec![
            name_cell(&e.name),
            Cell::new(&format!("{:.1}", e.score)).style_spec("r"),
        ]));
    }
    table
}

pub fn moves_table(moves: &[RankMove], prior: &str, current: &str) -> Table {
    let mut table = new_table();
    table.add_row(header_row(&["Institution", prior, current, "rank_change"]));
    for m in moves {
        table.add_row(Row::new(vec![
            name_cell(&m.name),
            Cell::new(&m.prior.to_string()).style_spec("r"),
            Cell::new(&m.current.to_string()).style_spec("r"),
            Cell::new(&format!("{:+}", m.delta)).style_spec("r"),
        ]));
    }
    table
}

pub fn groups_table(groups: &[GroupMean], group_column: &str) -> Table {
    let mut table = new_table();
    table.add_row(header_row(&[group_column, "Mean score", "Rows"]));
    for g in groups {
        table.add_row(Row::new(vec![
            Cell::new(&g.group),
            Cell::new(&format!("{:.2}", g.mean)).style_spec("r"),
            Cell::new(&g.count.to_string()).style_spec("r"),
        ]));
    }
    table
}

/// Print the human-readable report to stdout.
pub fn print_summary(s: &RunSummary) {
    println!("\nRaw shape: {:?}", s.raw_shape);
    println!(
        "After dropping placeholder row + duplicates: {:?}",
        s.deduped_shape
    );

    println!("\n--- Missing values per column ---");
    missing_table(&s.missing).printstd();

    println!("\nCleaned shape: {:?}", s.clean_shape);

    match &s.scores {
        Some(st) => {
            println!("\n--- {} summary ---", s.primary_score);
            println!("Mean score:      {:.4}", st.mean);
            println!("Median score:    {:.4}", st.median);
            println!("Std dev:         {:.4}", st.std_dev);
            println!("90th percentile: {:.4}", st.p90);
        }
        None => println!("\nNo {} values to summarize.", s.primary_score),
    }

    println!("\n--- Top {} by {} ---", s.top.len(), s.primary_score);
    top_table(&s.top, &s.primary_score).printstd();

    if let Some(d) = &s.rank_delta {
        println!("\n--- Biggest climbers ({} → {}) ---", d.prior, d.current);
        moves_table(&d.climbers, &d.prior, &d.current).printstd();
        println!("\n--- Biggest fallers ({} → {}) ---", d.prior, d.current);
        moves_table(&d.fallers, &d.prior, &d.current).printstd();
    }

    if !s.group_means.is_empty() {
        println!(
            "\n--- Top {} {} values by average {} ---",
            s.group_means.len(),
            s.group_column,
            s.primary_score
        );
        groups_table(&s.group_means, &s.group_column).printstd();
    }
}

/// Save the summary as pretty-printed JSON.
pub fn write_summary_json(s: &RunSummary, path: &Path) -> Result<()> {
    ensure_parent(path)?;
    let json = serde_json::to_string_pretty(s).context("serializing run summary")?;
    fs::write(path, json).with_context(|| format!("writing summary to {:?}", path))?;
    info!(path = %path.display(), "saved run summary");
    Ok(())
}
