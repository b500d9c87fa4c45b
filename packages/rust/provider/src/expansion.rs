//! Keyword-suggestion and related-keyword endpoints.

use serde_json::json;
use tracing::{debug, instrument};

use seedscope_shared::Result;

use crate::client::{Market, ProviderClient};
use crate::raw::{MAX_SEARCH_VOLUME, MIN_SEARCH_VOLUME, RawKeyword, adapt_items};
use crate::wire::{
    KEYWORD_SUGGESTIONS_PATH, KeywordItem, RELATED_KEYWORDS_PATH, RelatedItem, RelatedTask,
    SuggestionsTask,
};

impl ProviderClient {
    /// Suggestions for one seed phrase, filtered provider-side to
    /// `search_volume ∈ [50, 10000]` and `cpc > 0`, highest volume first.
    #[instrument(skip_all, fields(seed = %seed, limit))]
    pub async fn keyword_suggestions(
        &self,
        market: &Market,
        seed: &str,
        limit: u32,
    ) -> Result<Vec<RawKeyword>> {
        let task = SuggestionsTask {
            keyword: seed.to_string(),
            language_name: market.language_name.clone(),
            location_code: market.location_code,
            filters: json!([
                ["keyword_info.search_volume", ">=", MIN_SEARCH_VOLUME],
                "and",
                ["keyword_info.search_volume", "<=", MAX_SEARCH_VOLUME],
                "and",
                ["keyword_info.cpc", ">", 0]
            ]),
            order_by: vec![
                "keyword_info.search_volume,desc".into(),
                "keyword_info.cpc,desc".into(),
            ],
            exact_match: false,
            ignore_synonyms: false,
            include_serp_info: false,
            include_seed_keyword: false,
            include_clickstream_data: false,
            limit,
        };

        let items = self.post_task(KEYWORD_SUGGESTIONS_PATH, &task).await?;
        let raw = adapt_items::<KeywordItem, _>(items, RawKeyword::from_keyword_item);
        debug!(count = raw.len(), "keyword suggestions received");
        Ok(raw)
    }

    /// Related keywords for one keyword, each carrying its second-order
    /// related strings.
    #[instrument(skip_all, fields(keyword = %keyword, depth, limit))]
    pub async fn related_keywords(
        &self,
        market: &Market,
        keyword: &str,
        depth: u32,
        limit: u32,
    ) -> Result<Vec<RawKeyword>> {
        let task = RelatedTask {
            keyword: keyword.to_string(),
            language_name: market.language_name.clone(),
            location_code: market.location_code,
            depth,
            limit,
            include_serp_info: false,
            include_seed_keyword: false,
            include_clickstream_data: false,
            replace_with_core_keyword: true,
            ignore_synonyms: false,
        };

        let items = self.post_task(RELATED_KEYWORDS_PATH, &task).await?;
        let raw = adapt_items::<RelatedItem, _>(items, RawKeyword::from_related_item);
        debug!(count = raw.len(), "related keywords received");
        Ok(raw)
    }
}
