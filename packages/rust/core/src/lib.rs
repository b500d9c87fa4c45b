//! Discovery pipeline and keyword scoring for SeedScope.
//!
//! This crate turns provider responses into ranked [`KeywordRecord`]s:
//! seed expansion, the concurrent related-keyword fan-out, scoring, and the
//! final merge/dedup/sort, tied together by [`run_discovery`].
//!
//! [`KeywordRecord`]: seedscope_shared::KeywordRecord

pub mod aggregate;
pub mod pipeline;
pub mod related;
pub mod scoring;
pub mod seed;

pub use aggregate::{
    Aggregated, OrderedKeywordMap, aggregate, collect_candidates, dedupe_last_write_wins,
    find_unmatched, merge_secondary_signal, sort_by_score,
};
pub use pipeline::{DiscoveryReport, DiscoveryStats, ProgressReporter, SilentProgress, run_discovery};
pub use related::{RelatedExpansion, RelatedParams, expand_related};
pub use scoring::{DEFAULT_RANK, build_record, estimate_traffic, score};
pub use seed::expand_seed;
