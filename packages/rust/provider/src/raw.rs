//! Normalized intermediate keyword record and the per-shape adapters that
//! produce it.
//!
//! The suggestion/overview endpoints return flat items while the related
//! endpoint nests the same fields under `keyword_data`. Each shape gets one
//! adapter here; nothing downstream branches on response shape.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::wire::{KeywordItem, RelatedItem};

/// Lowest monthly search volume accepted by the discovery filter.
pub const MIN_SEARCH_VOLUME: u64 = 50;

/// Highest monthly search volume accepted by the discovery filter.
pub const MAX_SEARCH_VOLUME: u64 = 10_000;

/// A provider keyword with its metrics, before competition derivation and
/// scoring.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawKeyword {
    pub keyword: String,
    pub search_volume: Option<u64>,
    pub cpc: Option<f64>,
    pub competition: Option<f64>,
    pub competition_level: Option<String>,
    pub keyword_difficulty: Option<f64>,
    pub main_intent: Option<String>,
    /// Second-order related keywords (related-keywords shape only).
    pub related_keywords: Vec<String>,
}

impl RawKeyword {
    /// Adapt a flat suggestion/overview item. Items without a keyword or
    /// without a `keyword_info` metrics object are rejected.
    pub fn from_keyword_item(item: KeywordItem) -> Option<Self> {
        if item.keyword.trim().is_empty() {
            return None;
        }
        let info = item.keyword_info?;

        Some(Self {
            keyword: item.keyword,
            search_volume: info.search_volume,
            cpc: info.cpc,
            competition: info.competition,
            competition_level: info.competition_level,
            keyword_difficulty: item.keyword_properties.and_then(|p| p.keyword_difficulty),
            main_intent: item.search_intent_info.and_then(|s| s.main_intent),
            related_keywords: Vec::new(),
        })
    }

    /// Adapt a nested related-keywords item. An item missing `keyword_data`
    /// is rejected together with its second-order keywords.
    pub fn from_related_item(item: RelatedItem) -> Option<Self> {
        let mut raw = Self::from_keyword_item(item.keyword_data?)?;
        raw.related_keywords = item
            .related_keywords
            .unwrap_or_default()
            .into_iter()
            .filter(|k| !k.trim().is_empty())
            .collect();
        Some(raw)
    }

    /// `search_volume ∈ [50, 10000]` and `cpc > 0`.
    pub fn passes_discovery_filter(&self) -> bool {
        let volume_ok = self
            .search_volume
            .is_some_and(|v| (MIN_SEARCH_VOLUME..=MAX_SEARCH_VOLUME).contains(&v));
        let cpc_ok = self.cpc.is_some_and(|c| c > 0.0);
        volume_ok && cpc_ok
    }
}

/// Decode and adapt each item independently, skipping the ones that do not
/// fit the expected shape.
pub(crate) fn adapt_items<T, F>(items: Vec<Value>, adapt: F) -> Vec<RawKeyword>
where
    T: DeserializeOwned,
    F: Fn(T) -> Option<RawKeyword>,
{
    let total = items.len();
    let adapted: Vec<RawKeyword> = items
        .into_iter()
        .filter_map(|value| match serde_json::from_value::<T>(value) {
            Ok(item) => adapt(item),
            Err(e) => {
                debug!(error = %e, "skipping undecodable item");
                None
            }
        })
        .collect();

    if adapted.len() < total {
        debug!(total, kept = adapted.len(), "dropped malformed items");
    }
    adapted
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn flat_item_adapts() {
        let item = json!({
            "keyword": "solar panel cost",
            "keyword_info": {"search_volume": 900, "cpc": 3.2, "competition": 0.4, "competition_level": "MEDIUM"},
            "keyword_properties": {"keyword_difficulty": 41},
            "search_intent_info": {"main_intent": "commercial"}
        });
        let raw = adapt_items(vec![item], RawKeyword::from_keyword_item);
        assert_eq!(raw.len(), 1);
        assert_eq!(raw[0].search_volume, Some(900));
        assert_eq!(raw[0].keyword_difficulty, Some(41.0));
        assert_eq!(raw[0].main_intent.as_deref(), Some("commercial"));
    }

    #[test]
    fn nested_item_adapts_with_second_order_keywords() {
        let item = json!({
            "keyword_data": {
                "keyword": "home solar",
                "keyword_info": {"search_volume": 300, "cpc": 1.0}
            },
            "related_keywords": ["home solar kits", "", "home solar battery"]
        });
        let raw = adapt_items(vec![item], RawKeyword::from_related_item);
        assert_eq!(raw.len(), 1);
        assert_eq!(raw[0].keyword, "home solar");
        assert_eq!(raw[0].related_keywords, vec!["home solar kits", "home solar battery"]);
    }

    #[test]
    fn malformed_items_are_skipped_not_fatal() {
        let items = vec![
            json!({"related_keywords": ["orphan"]}),
            json!({"keyword_data": {"keyword": "no metrics"}}),
            json!({"keyword_data": {"keyword": "bad", "keyword_info": {"search_volume": "lots"}}}),
            json!({"keyword_data": {"keyword": "good", "keyword_info": {"search_volume": 120}}}),
        ];
        let raw = adapt_items(items, RawKeyword::from_related_item);
        assert_eq!(raw.len(), 1);
        assert_eq!(raw[0].keyword, "good");
    }

    #[test]
    fn discovery_filter_bounds() {
        let mut raw = RawKeyword {
            keyword: "k".into(),
            search_volume: Some(50),
            cpc: Some(0.1),
            ..Default::default()
        };
        assert!(raw.passes_discovery_filter());

        raw.search_volume = Some(10_001);
        assert!(!raw.passes_discovery_filter());

        raw.search_volume = Some(10_000);
        raw.cpc = Some(0.0);
        assert!(!raw.passes_discovery_filter());

        raw.cpc = None;
        assert!(!raw.passes_discovery_filter());
    }
}
