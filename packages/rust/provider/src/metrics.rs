//! Metrics lookup for literal keyword strings.

use std::collections::HashSet;

use tracing::{debug, info, instrument};

use seedscope_shared::{Result, keyword_key};

use crate::client::{Market, ProviderClient};
use crate::raw::{RawKeyword, adapt_items};
use crate::wire::{KEYWORD_OVERVIEW_PATH, KeywordItem, OverviewTask};

/// Maximum keywords the overview endpoint accepts per task.
pub const METRICS_BATCH_SIZE: usize = 700;

impl ProviderClient {
    /// Fetch metrics for a batch of keywords.
    ///
    /// - An empty input returns an empty result without any network call.
    /// - Keywords are de-duplicated by normalized key (first spelling wins)
    ///   and sent in sequential chunks of [`METRICS_BATCH_SIZE`].
    /// - Keywords the provider has no data for are simply absent from the
    ///   result; that is not an error.
    /// - With `enrich_only == false`, records outside the discovery filter
    ///   (`search_volume ∈ [50, 10000]`, `cpc > 0`) are dropped as well.
    ///
    /// Any chunk failing fails the whole call.
    #[instrument(skip_all, fields(requested = keywords.len(), enrich_only))]
    pub async fn fetch_metrics(
        &self,
        market: &Market,
        keywords: &[String],
        enrich_only: bool,
    ) -> Result<Vec<RawKeyword>> {
        let distinct = distinct_keywords(keywords);
        if distinct.is_empty() {
            debug!("no keywords to enrich, skipping metrics call");
            return Ok(Vec::new());
        }

        let mut records = Vec::new();
        for (index, chunk) in distinct.chunks(METRICS_BATCH_SIZE).enumerate() {
            debug!(chunk = index, size = chunk.len(), "requesting keyword metrics");
            let task = OverviewTask {
                keywords: chunk.to_vec(),
                language_name: market.language_name.clone(),
                location_code: market.location_code,
                include_serp_info: false,
                include_clickstream_data: false,
            };
            let items = self.post_task(KEYWORD_OVERVIEW_PATH, &task).await?;
            records.extend(adapt_items::<KeywordItem, _>(items, RawKeyword::from_keyword_item));
        }

        if !enrich_only {
            records.retain(RawKeyword::passes_discovery_filter);
        }

        info!(
            distinct = distinct.len(),
            matched = records.len(),
            "keyword metrics fetched"
        );
        Ok(records)
    }
}

/// Non-blank keywords, de-duplicated by normalized key in first-seen order.
pub(crate) fn distinct_keywords(keywords: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    keywords
        .iter()
        .map(|k| k.trim())
        .filter(|k| !k.is_empty() && seen.insert(keyword_key(k)))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use crate::client::test_support::*;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn overview_item(keyword: &str, volume: u64, cpc: f64) -> serde_json::Value {
        json!({
            "keyword": keyword,
            "keyword_info": {"search_volume": volume, "cpc": cpc, "competition": 0.2, "competition_level": "LOW"}
        })
    }

    #[tokio::test]
    async fn empty_input_makes_no_network_call() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = client_for(&server.uri());
        let records = client
            .fetch_metrics(&Market::default(), &[], true)
            .await
            .unwrap();
        assert!(records.is_empty());

        let blanks = vec!["  ".to_string(), String::new()];
        let records = client
            .fetch_metrics(&Market::default(), &blanks, true)
            .await
            .unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn missing_keywords_are_absent_not_errors() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(KEYWORD_OVERVIEW_PATH))
            .and(body_partial_json(json!([{"keywords": ["solar battery", "solar grant"]}])))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(ok_envelope(json!([overview_item("solar battery", 500, 1.5)]))),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server.uri());
        let keywords = vec![
            "solar battery".to_string(),
            "Solar  Battery".to_string(),
            "solar grant".to_string(),
        ];
        let records = client
            .fetch_metrics(&Market::default(), &keywords, true)
            .await
            .unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].keyword, "solar battery");
    }

    #[tokio::test]
    async fn unknown_keywords_yield_empty_result() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(KEYWORD_OVERVIEW_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(no_results_envelope()))
            .expect(1)
            .mount(&server)
            .await;

        let client = client_for(&server.uri());
        let records = client
            .fetch_metrics(&Market::default(), &["zzqx unknown phrase".to_string()], true)
            .await
            .unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn filter_applies_unless_enrich_only() {
        let server = MockServer::start().await;

        let items = json!([
            overview_item("tiny", 10, 1.0),
            overview_item("free", 400, 0.0),
            overview_item("good", 400, 2.0)
        ]);
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(ok_envelope(items)))
            .mount(&server)
            .await;

        let client = client_for(&server.uri());
        let keywords = vec!["tiny".to_string(), "free".to_string(), "good".to_string()];

        let all = client
            .fetch_metrics(&Market::default(), &keywords, true)
            .await
            .unwrap();
        assert_eq!(all.len(), 3);

        let filtered = client
            .fetch_metrics(&Market::default(), &keywords, false)
            .await
            .unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].keyword, "good");
    }

    #[tokio::test]
    async fn large_inputs_are_chunked() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path(KEYWORD_OVERVIEW_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(ok_envelope(json!([]))))
            .expect(2)
            .mount(&server)
            .await;

        let client = client_for(&server.uri());
        let keywords: Vec<String> = (0..METRICS_BATCH_SIZE + 1).map(|i| format!("kw {i}")).collect();
        let records = client
            .fetch_metrics(&Market::default(), &keywords, true)
            .await
            .unwrap();
        assert!(records.is_empty());
    }

    #[tokio::test]
    async fn batch_failure_is_an_error() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(502))
            .mount(&server)
            .await;

        let client = client_for(&server.uri());
        let result = client
            .fetch_metrics(&Market::default(), &["solar".to_string()], true)
            .await;
        assert!(result.is_err());
    }

    #[test]
    fn distinct_keywords_keeps_first_spelling() {
        let input = vec![
            "Solar Panels".to_string(),
            " solar panels ".to_string(),
            "".to_string(),
            "wind".to_string(),
        ];
        assert_eq!(distinct_keywords(&input), vec!["Solar Panels", "wind"]);
    }
}
