use anyhow::Result;
use clap::Parser;
use rankclean::{pipeline, report, PipelineConfig};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Clean a university rankings table: tied ranks, numeric coercion, summary stats"
)]
struct Args {
    /// YAML config file; CLI flags override its values
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Input CSV (or a ZIP containing one)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Cleaned CSV output path
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Also write the cleaned table as Parquet
    #[arg(long)]
    parquet: Option<PathBuf>,

    /// Histogram image (SVG) output path
    #[arg(long)]
    histogram: Option<PathBuf>,

    /// Also write an interactive HTML histogram
    #[arg(long)]
    histogram_html: Option<PathBuf>,

    /// Write the run summary as JSON
    #[arg(long)]
    summary_json: Option<PathBuf>,

    #[arg(long)]
    top_n: Option<usize>,

    /// Histogram bucket count
    #[arg(long)]
    bins: Option<usize>,

    /// Score column used for ranking analyses
    #[arg(long)]
    primary_score: Option<String>,

    #[arg(long)]
    name_column: Option<String>,

    #[arg(long)]
    group_column: Option<String>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn into_config(self) -> Result<PipelineConfig> {
        let mut cfg = match &self.config {
            Some(path) => PipelineConfig::from_yaml_file(path)?,
            None => PipelineConfig::default(),
        };
        if let Some(v) = self.input {
            cfg.input = v;
        }
        if let Some(v) = self.output {
            cfg.output = v;
        }
        if self.parquet.is_some() {
            cfg.parquet_output = self.parquet;
        }
        if self.histogram.is_some() {
            cfg.histogram_output = self.histogram;
        }
        if self.histogram_html.is_some() {
            cfg.histogram_html = self.histogram_html;
        }
        if self.summary_json.is_some() {
            cfg.summary_output = self.summary_json;
        }
        if let Some(v) = self.top_n {
            cfg.top_n = v;
        }
        if let Some(v) = self.bins {
            cfg.histogram_bins = v;
        }
        if self.primary_score.is_some() {
            cfg.columns.primary_score = self.primary_score;
        }
        if let Some(v) = self.name_column {
            cfg.name_column = v;
        }
        if let Some(v) = self.group_column {
            cfg.group_column = v;
        }
        Ok(cfg)
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    fmt::Subscriber::builder()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let cfg = args.into_config()?;
    info!(input = %cfg.input.display(), output = %cfg.output.display(), "startup");

    let summary = pipeline::run(&cfg)?;
    report::print_summary(&summary);
    println!("\nSaved cleaned file to: {}", cfg.output.display());
    Ok(())
}
