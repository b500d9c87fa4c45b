//! Candidate aggregation: secondary-signal merge, dedup, and ranking.
//!
//! All keyword comparisons use [`keyword_key`], so `"Solar Panels"` and
//! `"solar  panels"` are the same keyword everywhere in this module. The
//! stored display text is whatever the winning record carried.

use std::collections::{HashMap, HashSet};

use tracing::{debug, info, instrument};

use seedscope_provider::{Market, ProviderClient};
use seedscope_shared::{KeywordRecord, Result, SecondarySignal, keyword_key};

// ---------------------------------------------------------------------------
// Ordered keyword map
// ---------------------------------------------------------------------------

/// Keyword-keyed map that remembers where each key was first inserted.
///
/// Inserting an existing key replaces the whole stored record (no field
/// merge) but keeps the key's original position.
#[derive(Debug, Default)]
pub struct OrderedKeywordMap {
    positions: HashMap<String, usize>,
    records: Vec<KeywordRecord>,
}

impl OrderedKeywordMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a record, returning the one it replaced, if any.
    pub fn insert(&mut self, record: KeywordRecord) -> Option<KeywordRecord> {
        let key = keyword_key(&record.keyword);
        match self.positions.get(&key) {
            Some(&pos) => Some(std::mem::replace(&mut self.records[pos], record)),
            None => {
                self.positions.insert(key, self.records.len());
                self.records.push(record);
                None
            }
        }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in first-insertion order of their keys.
    pub fn into_records(self) -> Vec<KeywordRecord> {
        self.records
    }
}

// ---------------------------------------------------------------------------
// Aggregation steps
// ---------------------------------------------------------------------------

/// Step 1: concatenate every candidate source, in pipeline order.
pub fn collect_candidates(
    seed_records: Vec<KeywordRecord>,
    related_records: Vec<KeywordRecord>,
    metrics_records: Vec<KeywordRecord>,
) -> Vec<KeywordRecord> {
    let mut all = seed_records;
    all.extend(related_records);
    all.extend(metrics_records);
    all
}

/// Step 2: attach `ai_search_volume` to every record, 0 when the signal has
/// no entry for it. Record order is unchanged.
pub fn merge_secondary_signal(
    records: Vec<KeywordRecord>,
    signals: &[SecondarySignal],
) -> Vec<KeywordRecord> {
    let lookup: HashMap<String, u64> = signals
        .iter()
        .map(|s| (keyword_key(&s.keyword), s.ai_search_volume))
        .collect();

    records
        .into_iter()
        .map(|mut record| {
            record.ai_search_volume = lookup
                .get(&keyword_key(&record.keyword))
                .copied()
                .unwrap_or(0);
            record
        })
        .collect()
}

/// Step 3: collapse records sharing a keyword. The last occurrence wins;
/// output keeps first-occurrence order.
pub fn dedupe_last_write_wins(records: Vec<KeywordRecord>) -> Vec<KeywordRecord> {
    let mut map = OrderedKeywordMap::new();
    for record in records {
        if let Some(replaced) = map.insert(record) {
            debug!(keyword = %replaced.keyword, "duplicate keyword replaced");
        }
    }
    map.into_records()
}

/// Step 4: stable sort, highest `keyword_score` first. Ties keep their
/// current order; non-finite scores sort as 0.
pub fn sort_by_score(records: &mut [KeywordRecord]) {
    records.sort_by(|a, b| b.ordering_score().total_cmp(&a.ordering_score()));
}

/// Keywords from `seed_list` with no record in `scored`, first-seen order,
/// without repeats.
pub fn find_unmatched(seed_list: &[String], scored: &[KeywordRecord]) -> Vec<String> {
    let present: HashSet<String> = scored.iter().map(|r| keyword_key(&r.keyword)).collect();
    let mut reported = HashSet::new();

    seed_list
        .iter()
        .filter(|k| {
            let key = keyword_key(k);
            !key.is_empty() && !present.contains(&key) && reported.insert(key)
        })
        .cloned()
        .collect()
}

/// Outcome of [`aggregate`].
#[derive(Debug, Clone)]
pub struct Aggregated {
    /// Deduplicated records, highest score first.
    pub keywords: Vec<KeywordRecord>,
    /// Records dropped by the dedup step.
    pub duplicates_removed: usize,
    /// Secondary-signal entries returned by the provider.
    pub signals_matched: usize,
}

/// Steps 2–4 on an already collected candidate list: one secondary-signal
/// call for all distinct keywords, then merge, dedupe, sort.
#[instrument(skip_all, fields(candidates = candidates.len()))]
pub async fn aggregate(
    client: &ProviderClient,
    market: &Market,
    candidates: Vec<KeywordRecord>,
) -> Result<Aggregated> {
    let keywords: Vec<String> = candidates.iter().map(|r| r.keyword.clone()).collect();
    let signals = client.fetch_secondary_signal(market, &keywords).await?;

    let merged = merge_secondary_signal(candidates, &signals);
    let before = merged.len();
    let mut keywords = dedupe_last_write_wins(merged);
    sort_by_score(&mut keywords);

    let duplicates_removed = before - keywords.len();
    info!(
        kept = keywords.len(),
        duplicates_removed,
        signals = signals.len(),
        "candidates aggregated"
    );

    Ok(Aggregated {
        keywords,
        duplicates_removed,
        signals_matched: signals.len(),
    })
}
