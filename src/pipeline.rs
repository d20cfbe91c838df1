// src/pipeline.rs
use anyhow::{Context, Result};
use arrow::record_batch::RecordBatch;
use chrono::Utc;
use tracing::{info, warn};

use crate::analyze::{self, ScoreSummary};
use crate::config::PipelineConfig;
use crate::export;
use crate::load::{self, RawTable};
use crate::normalize::{self, ColumnRoles};
use crate::plot::{self, ChartLabels};
use crate::report::{self, RankDeltaReport};

pub use crate::report::RunSummary;

/// Output of the load → normalize → filter stages, ready for analysis.
#[derive(Debug)]
pub struct Cleaned {
    pub roles: ColumnRoles,
    pub deduped: RawTable,
    pub raw_shape: (usize, usize),
    pub placeholder_dropped: bool,
    pub duplicates_dropped: usize,
    /// Typed table restricted to rows with a primary score, delta column included.
    pub batch: RecordBatch,
}

/// Placeholder + duplicate removal, typing, and the primary-score filter.
pub fn clean(mut raw: RawTable, cfg: &PipelineConfig) -> Result<Cleaned> {
    let raw_shape = raw.shape();
    let roles = ColumnRoles::resolve(&raw.headers, &cfg.columns)?;

    let placeholder_dropped =
        normalize::drop_placeholder_row(&mut raw, roles.primary_rank.as_deref(), cfg.tie_marker);
    let duplicates_dropped = normalize::drop_duplicates(&mut raw);
    info!(shape = ?raw.shape(), "after dropping placeholder row + duplicates");

    let typed = normalize::normalize_batch(
        &normalize::to_record_batch(&raw)?,
        &roles,
        cfg.tie_marker,
    )?;
    let mut batch = normalize::filter_primary_score(&typed, &roles.primary_score)?;

    if let Some(pair) = &roles.delta {
        batch = analyze::add_rank_delta(&batch, pair)?;
    }
    info!(
        rows = batch.num_rows(),
        cols = batch.num_columns(),
        "cleaned table"
    );

    Ok(Cleaned {
        roles,
        deduped: raw,
        raw_shape,
        placeholder_dropped,
        duplicates_dropped,
        batch,
    })
}

/// Read-only analyses over the cleaned table.
pub fn summarize(cleaned: &Cleaned, cfg: &PipelineConfig) -> Result<RunSummary> {
    let batch = &cleaned.batch;
    let primary = cleaned.roles.primary_score.as_str();

    let scores: Option<ScoreSummary> = analyze::summarize_scores(batch, primary)?;
    if scores.is_none() {
        warn!(column = %primary, "no rows with a primary score");
    }

    let top = analyze::top_n_by_score(batch, primary, &cfg.name_column, cfg.top_n)?;

    let rank_delta = match &cleaned.roles.delta {
        Some(pair) => Some(RankDeltaReport {
            prior: pair.prior.clone(),
            current: pair.current.clone(),
            climbers: analyze::climbers(batch, &cfg.name_column, pair, cfg.top_n)?,
            fallers: analyze::fallers(batch, &cfg.name_column, pair, cfg.top_n)?,
        }),
        None => {
            info!("rank delta columns not available; skipping climbers/fallers");
            None
        }
    };

    let group_means = if batch.column_by_name(&cfg.group_column).is_some() {
        analyze::group_means(batch, &cfg.group_column, primary, cfg.top_n)?
    } else {
        warn!(column = %cfg.group_column, "group column missing; skipping group averages");
        Vec::new()
    };

    Ok(RunSummary {
        generated_at: Utc::now(),
        input: cfg.input.display().to_string(),
        primary_score: primary.to_string(),
        raw_shape: cleaned.raw_shape,
        placeholder_dropped: cleaned.placeholder_dropped,
        duplicates_dropped: cleaned.duplicates_dropped,
        deduped_shape: cleaned.deduped.shape(),
        clean_shape: (batch.num_rows(), batch.num_columns()),
        missing: analyze::missing_counts(&cleaned.deduped),
        scores,
        top,
        rank_delta,
        group_column: cfg.group_column.clone(),
        group_means,
    })
}

/// Write the cleaned table, the histogram, and the optional extras.
pub fn write_outputs(cleaned: &Cleaned, summary: &RunSummary, cfg: &PipelineConfig) -> Result<()> {
    export::write_csv(&cleaned.batch, &cfg.output)?;

    if let Some(path) = &cfg.parquet_output {
        export::write_parquet(&cleaned.batch, path)?;
    }

    if cfg.histogram_output.is_some() || cfg.histogram_html.is_some() {
        let values = analyze::score_values(&cleaned.batch, &cleaned.roles.primary_score)?;
        let buckets = analyze::histogram(&values, cfg.histogram_bins);
        let labels = ChartLabels::default();
        if let Some(path) = &cfg.histogram_output {
            plot::write_histogram(&buckets, &labels, path)?;
        }
        if let Some(path) = &cfg.histogram_html {
            plot::write_histogram_html(&buckets, &labels, path)?;
        }
    }

    if let Some(path) = &cfg.summary_output {
        report::write_summary_json(summary, path)?;
    }
    Ok(())
}

/// load → normalize → filter → analyze → export, once, start to finish.
#[tracing::instrument(level = "info", skip(cfg), fields(input = %cfg.input.display()))]
pub fn run(cfg: &PipelineConfig) -> Result<RunSummary> {
    cfg.validate()?;
    let delimiter = cfg.delimiter as u8;

    let raw = load::load_table(&cfg.input, delimiter)
        .with_context(|| format!("loading {}", cfg.input.display()))?;
    let cleaned = clean(raw, cfg)?;
    let summary = summarize(&cleaned, cfg)?;
    write_outputs(&cleaned, &summary, cfg)?;

    info!(output = %cfg.output.display(), "pipeline finished");
    Ok(summary)
}
