//! Concurrent related-keyword fan-out.
//!
//! One request per input keyword, all spawned up front and joined together.
//! In-flight requests are capped by a semaphore, each request is bounded by
//! the provider client's timeout, and a [`CancellationToken`] aborts the
//! whole batch. A request that fails only loses its own keyword's results.

use std::sync::Arc;

use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

use seedscope_provider::{Market, ProviderClient, RawKeyword};
use seedscope_shared::{KeywordRecord, Result, SeedScopeError};

use crate::scoring::build_record;

/// Parameters for one fan-out batch.
#[derive(Debug, Clone, Copy)]
pub struct RelatedParams {
    /// Provider expansion depth.
    pub depth: u32,
    /// Maximum related keywords per request.
    pub limit: u32,
    /// Maximum requests in flight.
    pub max_concurrency: usize,
}

/// Joined result of a fan-out batch.
#[derive(Debug, Clone, Default)]
pub struct RelatedExpansion {
    /// Scored related keywords, in input-keyword order.
    pub enriched: Vec<KeywordRecord>,
    /// Second-order related strings that still need metrics.
    pub unenriched: Vec<String>,
    /// Keywords whose request failed, with the error message.
    pub failed: Vec<(String, String)>,
}

impl RelatedExpansion {
    fn absorb(&mut self, raw: Vec<RawKeyword>) {
        for mut item in raw {
            self.unenriched.append(&mut item.related_keywords);
            self.enriched.push(build_record(item, true));
        }
    }
}

/// Fetch related keywords for every keyword in `keywords` concurrently.
///
/// Returns only after every request has completed or failed. Results are
/// merged in input order regardless of completion order. Individual failures
/// are logged and listed in [`RelatedExpansion::failed`]; only cancellation
/// fails the call.
#[instrument(skip_all, fields(keywords = keywords.len(), depth = params.depth, limit = params.limit))]
pub async fn expand_related(
    client: &ProviderClient,
    market: &Market,
    keywords: &[String],
    params: RelatedParams,
    cancel: &CancellationToken,
) -> Result<RelatedExpansion> {
    if keywords.is_empty() {
        return Ok(RelatedExpansion::default());
    }

    let semaphore = Arc::new(Semaphore::new(params.max_concurrency.max(1)));

    info!(
        max_concurrency = params.max_concurrency,
        "starting related-keyword fan-out"
    );

    let handles: Vec<RelatedHandle> = keywords
        .iter()
        .map(|keyword| {
            let client = client.clone();
            let market = market.clone();
            let sem = semaphore.clone();
            let cancel = cancel.clone();
            let keyword = keyword.clone();

            tokio::spawn(async move {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => Err(SeedScopeError::Cancelled),
                    result = async {
                        let _permit = sem
                            .acquire_owned()
                            .await
                            .map_err(|_| SeedScopeError::Cancelled)?;
                        client
                            .related_keywords(&market, &keyword, params.depth, params.limit)
                            .await
                    } => result,
                }
            })
        })
        .collect();

    let expansion = join_in_order(keywords, handles).await?;

    info!(
        enriched = expansion.enriched.len(),
        unenriched = expansion.unenriched.len(),
        failed = expansion.failed.len(),
        "related-keyword fan-out complete"
    );

    Ok(expansion)
}

type RelatedHandle = JoinHandle<Result<Vec<RawKeyword>>>;

/// Wait for every handle and merge results in `keywords` order.
///
/// Fails with [`SeedScopeError::Cancelled`] only if a task stopped because
/// of cancellation; a batch that finished before the token fired is kept.
async fn join_in_order(
    keywords: &[String],
    handles: Vec<RelatedHandle>,
) -> Result<RelatedExpansion> {
    let mut expansion = RelatedExpansion::default();
    let mut cancelled = false;

    for (keyword, handle) in keywords.iter().zip(handles) {
        match handle.await {
            Ok(Ok(raw)) => {
                debug!(%keyword, items = raw.len(), "related keywords joined");
                expansion.absorb(raw);
            }
            Ok(Err(SeedScopeError::Cancelled)) => cancelled = true,
            Ok(Err(e)) => {
                warn!(%keyword, error = %e, "related keyword request failed, skipping");
                expansion.failed.push((keyword.clone(), e.to_string()));
            }
            Err(e) => {
                warn!(%keyword, error = %e, "related keyword task panicked, skipping");
                expansion.failed.push((keyword.clone(), e.to_string()));
            }
        }
    }

    if cancelled {
        warn!("related-keyword fan-out cancelled");
        return Err(SeedScopeError::Cancelled);
    }
    Ok(expansion)
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use seedscope_provider::wire::RELATED_KEYWORDS_PATH;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::test_support::{client_for, client_with_timeout, ok_envelope};

    const PARAMS: RelatedParams = RelatedParams {
        depth: 2,
        limit: 50,
        max_concurrency: 4,
    };

    async fn mount_related(server: &MockServer, seed: &str, response: ResponseTemplate) {
        Mock::given(method("POST"))
            .and(path(RELATED_KEYWORDS_PATH))
            .and(body_partial_json(json!([{"keyword": seed}])))
            .respond_with(response)
            .mount(server)
            .await;
    }

    fn related_body(keyword: &str, second_order: &[&str]) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(ok_envelope(json!([{
            "keyword_data": {
                "keyword": keyword,
                "keyword_info": {"search_volume": 400, "cpc": 1.2, "competition": 0.2, "competition_level": "LOW"}
            },
            "related_keywords": second_order
        }])))
    }

    fn seeds() -> Vec<String> {
        vec!["seed one".into(), "seed two".into(), "seed three".into()]
    }

    #[tokio::test]
    async fn failed_request_is_skipped_without_error() {
        let server = MockServer::start().await;
        mount_related(&server, "seed one", related_body("one related", &["one deeper"])).await;
        mount_related(&server, "seed two", ResponseTemplate::new(500)).await;
        mount_related(&server, "seed three", related_body("three related", &[])).await;

        let client = client_for(&server.uri());
        let expansion = expand_related(
            &client,
            &Market::default(),
            &seeds(),
            PARAMS,
            &CancellationToken::new(),
        )
        .await
        .unwrap();

        let enriched: Vec<&str> = expansion.enriched.iter().map(|r| r.keyword.as_str()).collect();
        assert_eq!(enriched, vec!["one related", "three related"]);
        assert!(expansion.enriched.iter().all(|r| r.is_related));
        assert_eq!(expansion.unenriched, vec!["one deeper"]);
        assert_eq!(expansion.failed.len(), 1);
        assert_eq!(expansion.failed[0].0, "seed two");
    }

    #[tokio::test]
    async fn undecodable_response_is_skipped() {
        let server = MockServer::start().await;
        mount_related(&server, "seed one", ResponseTemplate::new(200).set_body_string("not json")).await;
        mount_related(&server, "seed two", related_body("two related", &["a", "b"])).await;
        mount_related(&server, "seed three", related_body("three related", &["c"])).await;

        let client = client_for(&server.uri());
        let expansion = expand_related(
            &client,
            &Market::default(),
            &seeds(),
            PARAMS,
            &CancellationToken::new(),
        )
        .await
        .unwrap();

        assert_eq!(expansion.enriched.len(), 2);
        assert_eq!(expansion.unenriched, vec!["a", "b", "c"]);
        assert_eq!(expansion.failed[0].0, "seed one");
    }

    #[tokio::test]
    async fn results_follow_input_order_not_completion_order() {
        let server = MockServer::start().await;
        mount_related(
            &server,
            "seed one",
            related_body("slow", &[]).set_delay(Duration::from_millis(200)),
        )
        .await;
        mount_related(&server, "seed two", related_body("fast", &[])).await;
        mount_related(&server, "seed three", related_body("faster", &[])).await;

        let client = client_for(&server.uri());
        let expansion = expand_related(
            &client,
            &Market::default(),
            &seeds(),
            PARAMS,
            &CancellationToken::new(),
        )
        .await
        .unwrap();

        let enriched: Vec<&str> = expansion.enriched.iter().map(|r| r.keyword.as_str()).collect();
        assert_eq!(enriched, vec!["slow", "fast", "faster"]);
    }

    #[tokio::test]
    async fn timed_out_request_is_skipped() {
        let server = MockServer::start().await;
        mount_related(&server, "seed one", related_body("one related", &[])).await;
        mount_related(
            &server,
            "seed two",
            related_body("too late", &[]).set_delay(Duration::from_secs(3)),
        )
        .await;
        mount_related(&server, "seed three", related_body("three related", &[])).await;

        let client = client_with_timeout(&server.uri(), 1);
        let expansion = expand_related(
            &client,
            &Market::default(),
            &seeds(),
            PARAMS,
            &CancellationToken::new(),
        )
        .await
        .unwrap();

        assert_eq!(expansion.enriched.len(), 2);
        assert_eq!(expansion.failed.len(), 1);
        assert_eq!(expansion.failed[0].0, "seed two");
    }

    #[tokio::test]
    async fn concurrency_of_one_still_completes_everything() {
        let server = MockServer::start().await;
        for seed in seeds() {
            mount_related(&server, &seed, related_body(&format!("{seed} related"), &[])).await;
        }

        let client = client_for(&server.uri());
        let params = RelatedParams {
            max_concurrency: 1,
            ..PARAMS
        };
        let expansion = expand_related(
            &client,
            &Market::default(),
            &seeds(),
            params,
            &CancellationToken::new(),
        )
        .await
        .unwrap();

        assert_eq!(expansion.enriched.len(), 3);
        assert!(expansion.failed.is_empty());
    }

    async fn slow_server(delay: Duration) -> MockServer {
        let server = MockServer::start().await;
        for seed in seeds() {
            mount_related(
                &server,
                &seed,
                related_body(&format!("{seed} related"), &[]).set_delay(delay),
            )
            .await;
        }
        server
    }

    #[tokio::test]
    async fn requests_run_in_parallel() {
        let server = slow_server(Duration::from_millis(300)).await;
        let client = client_for(&server.uri());

        let started = Instant::now();
        let expansion = expand_related(
            &client,
            &Market::default(),
            &seeds(),
            PARAMS,
            &CancellationToken::new(),
        )
        .await
        .unwrap();
        let elapsed = started.elapsed();

        assert_eq!(expansion.enriched.len(), 3);
        // three 300ms responses back to back would take at least 900ms
        assert!(elapsed < Duration::from_millis(800), "took {elapsed:?}");
    }

    #[tokio::test]
    async fn max_concurrency_caps_requests_in_flight() {
        let server = slow_server(Duration::from_millis(300)).await;
        let client = client_for(&server.uri());
        let params = RelatedParams {
            max_concurrency: 1,
            ..PARAMS
        };

        let started = Instant::now();
        let expansion = expand_related(
            &client,
            &Market::default(),
            &seeds(),
            params,
            &CancellationToken::new(),
        )
        .await
        .unwrap();
        let elapsed = started.elapsed();

        assert_eq!(expansion.enriched.len(), 3);
        assert!(elapsed >= Duration::from_millis(900), "took {elapsed:?}");
    }

    #[tokio::test]
    async fn no_search_results_is_not_a_failure() {
        let server = MockServer::start().await;
        mount_related(&server, "seed one", related_body("one related", &[])).await;
        mount_related(
            &server,
            "seed two",
            ResponseTemplate::new(200).set_body_json(json!({
                "status_code": 20000,
                "status_message": "Ok.",
                "tasks": [{"status_code": 40102, "status_message": "No Search Results.", "result": null}]
            })),
        )
        .await;
        mount_related(&server, "seed three", related_body("three related", &[])).await;

        let client = client_for(&server.uri());
        let expansion = expand_related(
            &client,
            &Market::default(),
            &seeds(),
            PARAMS,
            &CancellationToken::new(),
        )
        .await
        .unwrap();

        assert_eq!(expansion.enriched.len(), 2);
        assert!(expansion.failed.is_empty());
    }

    #[tokio::test]
    async fn join_keeps_completed_results_in_order() {
        let keywords = vec!["a".to_string(), "b".to_string()];
        let handles: Vec<RelatedHandle> = keywords
            .iter()
            .map(|k| {
                let raw = RawKeyword {
                    keyword: format!("{k} related"),
                    ..Default::default()
                };
                tokio::spawn(async move { Ok(vec![raw]) })
            })
            .collect();

        let expansion = join_in_order(&keywords, handles).await.unwrap();
        let enriched: Vec<&str> = expansion.enriched.iter().map(|r| r.keyword.as_str()).collect();
        assert_eq!(enriched, vec!["a related", "b related"]);
    }

    #[tokio::test]
    async fn cancelled_task_fails_the_join() {
        let keywords = vec!["a".to_string(), "b".to_string()];
        let handles: Vec<RelatedHandle> = vec![
            tokio::spawn(async { Ok(Vec::new()) }),
            tokio::spawn(async { Err(SeedScopeError::Cancelled) }),
        ];

        let err = join_in_order(&keywords, handles).await.unwrap_err();
        assert!(matches!(err, SeedScopeError::Cancelled));
    }

    #[tokio::test]
    async fn cancellation_aborts_the_batch() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(related_body("never", &[]).set_delay(Duration::from_secs(5)))
            .mount(&server)
            .await;

        let client = client_for(&server.uri());
        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            trigger.cancel();
        });

        let err = expand_related(&client, &Market::default(), &seeds(), PARAMS, &cancel)
            .await
            .unwrap_err();
        assert!(matches!(err, SeedScopeError::Cancelled));
    }

    #[tokio::test]
    async fn empty_input_makes_no_calls() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = client_for(&server.uri());
        let expansion = expand_related(
            &client,
            &Market::default(),
            &[],
            PARAMS,
            &CancellationToken::new(),
        )
        .await
        .unwrap();
        assert!(expansion.enriched.is_empty());
        assert!(expansion.unenriched.is_empty());
    }
}
