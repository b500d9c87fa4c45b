//! Seed expansion: one seed phrase → scored keyword suggestions.

use tracing::{info, instrument};

use seedscope_provider::{Market, ProviderClient};
use seedscope_shared::{KeywordRecord, Result, SeedScopeError};

use crate::aggregate::sort_by_score;
use crate::scoring::build_record;

/// Expand one seed phrase into scored suggestions, highest score first.
///
/// Blank seeds are rejected before any request is made. A provider failure
/// fails the call.
#[instrument(skip_all, fields(seed = %seed, limit))]
pub async fn expand_seed(
    client: &ProviderClient,
    market: &Market,
    seed: &str,
    limit: u32,
) -> Result<Vec<KeywordRecord>> {
    let seed = seed.trim();
    if seed.is_empty() {
        return Err(SeedScopeError::validation("seed keyword must not be blank"));
    }

    let raw = client.keyword_suggestions(market, seed, limit).await?;
    let mut records: Vec<KeywordRecord> =
        raw.into_iter().map(|r| build_record(r, false)).collect();
    sort_by_score(&mut records);

    info!(count = records.len(), "seed expanded");
    Ok(records)
}
