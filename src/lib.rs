pub mod analyze;
pub mod config;
pub mod export;
pub mod load;
pub mod normalize;
pub mod pipeline;
pub mod plot;
pub mod report;

pub use config::{ColumnsConfig, PipelineConfig};
pub use pipeline::{run, RunSummary};
