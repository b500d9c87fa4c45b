//! AI search-volume lookup (the secondary ranking signal).

use tracing::{debug, info, instrument};

use seedscope_shared::{Result, SecondarySignal};

use crate::client::{Market, ProviderClient};
use crate::metrics::distinct_keywords;
use crate::wire::{AI_SEARCH_VOLUME_PATH, AiVolumeItem, AiVolumeTask};

/// Maximum keywords the AI search-volume endpoint accepts per task.
pub const SIGNAL_BATCH_SIZE: usize = 1000;

impl ProviderClient {
    /// Fetch the AI search-volume estimate for each keyword.
    ///
    /// Keywords the provider does not know are absent from the result; the
    /// caller treats a missing entry as 0. Empty input makes no call.
    #[instrument(skip_all, fields(requested = keywords.len()))]
    pub async fn fetch_secondary_signal(
        &self,
        market: &Market,
        keywords: &[String],
    ) -> Result<Vec<SecondarySignal>> {
        let distinct = distinct_keywords(keywords);
        if distinct.is_empty() {
            return Ok(Vec::new());
        }

        let mut signals = Vec::new();
        for chunk in distinct.chunks(SIGNAL_BATCH_SIZE) {
            debug!(size = chunk.len(), "requesting AI search volume");
            let task = AiVolumeTask {
                keywords: chunk.to_vec(),
                language_name: market.language_name.clone(),
                location_code: market.location_code,
            };
            let items = self.post_task(AI_SEARCH_VOLUME_PATH, &task).await?;

            signals.extend(items.into_iter().filter_map(|value| {
                let item: AiVolumeItem = serde_json::from_value(value).ok()?;
                Some(SecondarySignal {
                    keyword: item.keyword,
                    ai_search_volume: item.ai_search_volume.unwrap_or(0),
                })
            }));
        }

        info!(distinct = distinct.len(), matched = signals.len(), "AI search volume fetched");
        Ok(signals)
    }
}
