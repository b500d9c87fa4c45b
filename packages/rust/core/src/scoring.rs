//! Keyword opportunity score and traffic estimate.
//!
//! ```text
//! score   = 10 · log10(1 + volume) · (1 + ln(1 + cpc)) · (1 − 0.5 · competition)
//! traffic = volume · ctr(rank) · (1 − 0.5 · difficulty / 100)
//! ```
//!
//! Unknown difficulty counts as 50. Both results are rounded to two decimals.
//! `score` never decreases with volume or cpc and never increases with
//! competition; `traffic` never decreases with volume and never increases
//! with difficulty or rank.

use seedscope_provider::RawKeyword;
use seedscope_shared::{INTENT_NOT_AVAILABLE, KeywordDifficulty, KeywordRecord, derive_competition};

/// Rank assumed for every freshly discovered keyword.
pub const DEFAULT_RANK: u32 = 1;

/// Share of competition that is subtracted from the score at competition 1.0.
const COMPETITION_PENALTY: f64 = 0.5;

/// Share of traffic lost at difficulty 100.
const DIFFICULTY_PENALTY: f64 = 0.5;

/// Difficulty assumed when the provider has none.
const UNKNOWN_DIFFICULTY: f64 = 50.0;

/// Organic click-through rate for positions 1 to 10.
const CTR_BY_RANK: [f64; 10] = [0.28, 0.15, 0.11, 0.08, 0.07, 0.05, 0.04, 0.03, 0.025, 0.02];

/// Click-through rate past the first page.
const CTR_BEYOND_FIRST_PAGE: f64 = 0.01;

/// Ranking score for a keyword.
pub fn score(search_volume: u64, cpc: f64, competition: f64) -> f64 {
    let volume = (search_volume as f64).ln_1p() / std::f64::consts::LN_10;
    let value = 1.0 + sanitize(cpc).ln_1p();
    let openness = 1.0 - COMPETITION_PENALTY * sanitize(competition).min(1.0);
    round2(10.0 * volume * value * openness)
}

/// Estimated monthly visits if the keyword ranks at `rank` (1-based; 0 is
/// treated as 1).
pub fn estimate_traffic(search_volume: u64, rank: u32, difficulty: KeywordDifficulty) -> f64 {
    let ctr = match rank.max(1) as usize {
        r if r <= CTR_BY_RANK.len() => CTR_BY_RANK[r - 1],
        _ => CTR_BEYOND_FIRST_PAGE,
    };
    let difficulty = difficulty
        .value()
        .map(|d| sanitize(d).min(100.0))
        .unwrap_or(UNKNOWN_DIFFICULTY);
    let reachability = 1.0 - DIFFICULTY_PENALTY * difficulty / 100.0;
    round2(search_volume as f64 * ctr * reachability)
}

/// Turn a provider keyword into a fully derived, scored record.
pub fn build_record(raw: RawKeyword, is_related: bool) -> KeywordRecord {
    let (competition, competition_level) =
        derive_competition(raw.competition, raw.competition_level.as_deref());
    let search_volume = raw.search_volume.unwrap_or(0);
    let cpc = raw.cpc.map(sanitize).unwrap_or(0.0);
    let keyword_difficulty = KeywordDifficulty::from_option(raw.keyword_difficulty);
    let search_intent = raw
        .main_intent
        .filter(|intent| !intent.trim().is_empty())
        .unwrap_or_else(|| INTENT_NOT_AVAILABLE.to_string());

    KeywordRecord {
        keyword: raw.keyword,
        search_volume,
        cpc,
        competition,
        competition_level,
        keyword_difficulty,
        search_intent,
        estimated_traffic: estimate_traffic(search_volume, DEFAULT_RANK, keyword_difficulty),
        keyword_score: score(search_volume, cpc, competition),
        ai_search_volume: 0,
        is_related,
    }
}

/// Non-finite or negative inputs count as 0.
fn sanitize(v: f64) -> f64 {
    if v.is_finite() { v.max(0.0) } else { 0.0 }
}

fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}
