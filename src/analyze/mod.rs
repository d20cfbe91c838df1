// src/analyze/mod.rs
pub mod columns;
pub mod delta;
pub mod groups;
pub mod histogram;
pub mod missing;
pub mod stats;
pub mod top;

pub use delta::{add_rank_delta, climbers, fallers, RankMove};
pub use groups::{group_means, GroupMean};
pub use histogram::{histogram, Bucket};
pub use missing::{missing_counts, MissingCount};
pub use stats::{score_values, summarize, summarize_scores, ScoreSummary};
pub use top::{top_n_by_score, RankedEntry};
