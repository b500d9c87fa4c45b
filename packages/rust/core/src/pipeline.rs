//! End-to-end discovery pipeline: seeds → suggestions → related fan-out →
//! metrics for second-order keywords → secondary signal → dedup → ranking.

use std::future::Future;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};
use uuid::Uuid;

use seedscope_provider::{Market, ProviderClient};
use seedscope_shared::{DiscoveryOptions, KeywordRecord, Result, SeedScopeError, keyword_key};

use crate::aggregate::{aggregate, collect_candidates, find_unmatched};
use crate::related::{RelatedParams, expand_related};
use crate::scoring::build_record;
use crate::seed::expand_seed;

/// Counters describing one discovery run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiscoveryStats {
    /// Records produced by seed expansion.
    pub seed_candidates: usize,
    /// Related-keyword requests issued.
    pub related_requests: usize,
    /// Related-keyword requests that failed and were skipped.
    pub related_failed: usize,
    /// Scored records from related expansion.
    pub related_enriched: usize,
    /// Second-order strings sent for metrics.
    pub related_unenriched: usize,
    /// Second-order strings the metrics provider returned data for.
    pub metrics_matched: usize,
    /// Second-order strings the metrics provider had nothing for.
    pub unmatched: Vec<String>,
    /// Secondary-signal entries the provider returned.
    pub signals_matched: usize,
    /// Records collapsed by dedup.
    pub duplicates_removed: usize,
    pub elapsed_ms: u64,
}

/// The ranked output of a discovery run plus run metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryReport {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub seeds: Vec<String>,
    /// Deduplicated keywords, highest `keyword_score` first.
    pub keywords: Vec<KeywordRecord>,
    pub stats: DiscoveryStats,
}

/// Progress callback for reporting pipeline status.
pub trait ProgressReporter: Send + Sync {
    /// Called when entering a new phase.
    fn phase(&self, name: &str);
    /// Called after each seed has been expanded.
    fn seed_expanded(&self, seed: &str, candidates: usize);
    /// Called when the pipeline completes.
    fn done(&self, report: &DiscoveryReport);
}

/// No-op progress reporter for headless/test usage.
pub struct SilentProgress;

impl ProgressReporter for SilentProgress {
    fn phase(&self, _name: &str) {}
    fn seed_expanded(&self, _seed: &str, _candidates: usize) {}
    fn done(&self, _report: &DiscoveryReport) {}
}

/// Run the full discovery pipeline.
///
/// 1. Seed expansion, once per seed, in order
/// 2. Related-keyword fan-out over every distinct seed candidate
/// 3. Metrics for the second-order related strings
/// 4. Secondary signal, dedup, ranking
///
/// Provider failures in steps 1, 3 and 4 abort the run; failures inside the
/// fan-out only drop the affected keyword. Cancelling `cancel` aborts the
/// run at the next provider call.
#[instrument(skip_all, fields(seeds = seeds.len()))]
pub async fn run_discovery(
    client: &ProviderClient,
    seeds: &[String],
    options: &DiscoveryOptions,
    progress: &dyn ProgressReporter,
    cancel: &CancellationToken,
) -> Result<DiscoveryReport> {
    let start = Instant::now();
    options.validate()?;

    let seeds: Vec<String> = seeds
        .iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    if seeds.is_empty() {
        return Err(SeedScopeError::validation("at least one seed keyword is required"));
    }

    let market = Market::from(options);
    let mut stats = DiscoveryStats::default();

    info!(?seeds, location = market.location_code, "starting discovery");

    // --- Phase 1: Seed expansion ---
    progress.phase("Expanding seed keywords");
    let mut seed_records = Vec::new();
    for seed in &seeds {
        let records = cancellable(
            cancel,
            expand_seed(client, &market, seed, options.seed_limit),
        )
        .await?;
        progress.seed_expanded(seed, records.len());
        seed_records.extend(records);
    }
    stats.seed_candidates = seed_records.len();

    // --- Phase 2: Related fan-out ---
    progress.phase("Fetching related keywords");
    let targets = distinct_keywords(&seed_records);
    stats.related_requests = targets.len();
    let related = expand_related(
        client,
        &market,
        &targets,
        RelatedParams {
            depth: options.related_depth,
            limit: options.related_limit,
            max_concurrency: options.max_concurrency as usize,
        },
        cancel,
    )
    .await?;
    stats.related_failed = related.failed.len();
    stats.related_enriched = related.enriched.len();
    stats.related_unenriched = related.unenriched.len();

    // --- Phase 3: Metrics for second-order keywords ---
    progress.phase("Enriching related keywords");
    let raw_metrics = cancellable(
        cancel,
        client.fetch_metrics(&market, &related.unenriched, true),
    )
    .await?;
    let metrics_records: Vec<KeywordRecord> = raw_metrics
        .into_iter()
        .map(|raw| build_record(raw, true))
        .collect();
    stats.metrics_matched = metrics_records.len();
    stats.unmatched = find_unmatched(&related.unenriched, &metrics_records);

    // --- Phase 4: Aggregate ---
    progress.phase("Ranking keywords");
    let candidates = collect_candidates(seed_records, related.enriched, metrics_records);
    let aggregated = cancellable(cancel, aggregate(client, &market, candidates)).await?;
    stats.signals_matched = aggregated.signals_matched;
    stats.duplicates_removed = aggregated.duplicates_removed;
    stats.elapsed_ms = start.elapsed().as_millis() as u64;

    let report = DiscoveryReport {
        run_id: Uuid::now_v7(),
        generated_at: Utc::now(),
        seeds,
        keywords: aggregated.keywords,
        stats,
    };

    info!(
        run_id = %report.run_id,
        keywords = report.keywords.len(),
        related_failed = report.stats.related_failed,
        unmatched = report.stats.unmatched.len(),
        elapsed_ms = report.stats.elapsed_ms,
        "discovery complete"
    );

    progress.done(&report);
    Ok(report)
}

/// Race `fut` against cancellation.
async fn cancellable<T>(
    cancel: &CancellationToken,
    fut: impl Future<Output = Result<T>>,
) -> Result<T> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(SeedScopeError::Cancelled),
        result = fut => result,
    }
}

/// Keywords of `records`, de-duplicated by normalized key, first-seen order.
fn distinct_keywords(records: &[KeywordRecord]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    records
        .iter()
        .filter(|r| seen.insert(keyword_key(&r.keyword)))
        .map(|r| r.keyword.clone())
        .collect()
}
