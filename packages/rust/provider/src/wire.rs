//! Wire types for the DataForSEO v3 JSON API.
//!
//! Request bodies are arrays of task objects; responses share one envelope
//! shape. Items are kept as raw JSON until they reach an adapter in
//! [`crate::raw`], so one bad item never poisons a whole response.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Status code the API uses for success, both at envelope and task level.
pub const STATUS_OK: u32 = 20000;

/// Task status for "No Search Results.": the provider has no data for the
/// requested keywords.
pub const STATUS_NO_RESULTS: u32 = 40102;

pub const KEYWORD_SUGGESTIONS_PATH: &str = "/v3/dataforseo_labs/google/keyword_suggestions/live";
pub const RELATED_KEYWORDS_PATH: &str = "/v3/dataforseo_labs/google/related_keywords/live";
pub const KEYWORD_OVERVIEW_PATH: &str = "/v3/dataforseo_labs/google/keyword_overview/live";
pub const AI_SEARCH_VOLUME_PATH: &str =
    "/v3/ai_optimization/ai_keyword_data/keywords_search_volume/live";

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// `keyword_suggestions/live` task.
#[derive(Debug, Clone, Serialize)]
pub struct SuggestionsTask {
    pub keyword: String,
    pub language_name: String,
    pub location_code: u32,
    pub filters: Value,
    pub order_by: Vec<String>,
    pub exact_match: bool,
    pub ignore_synonyms: bool,
    pub include_serp_info: bool,
    pub include_seed_keyword: bool,
    pub include_clickstream_data: bool,
    pub limit: u32,
}

/// `related_keywords/live` task.
#[derive(Debug, Clone, Serialize)]
pub struct RelatedTask {
    pub keyword: String,
    pub language_name: String,
    pub location_code: u32,
    pub depth: u32,
    pub limit: u32,
    pub include_serp_info: bool,
    pub include_seed_keyword: bool,
    pub include_clickstream_data: bool,
    pub replace_with_core_keyword: bool,
    pub ignore_synonyms: bool,
}

/// `keyword_overview/live` task.
#[derive(Debug, Clone, Serialize)]
pub struct OverviewTask {
    pub keywords: Vec<String>,
    pub language_name: String,
    pub location_code: u32,
    pub include_serp_info: bool,
    pub include_clickstream_data: bool,
}

/// `keywords_search_volume/live` task.
#[derive(Debug, Clone, Serialize)]
pub struct AiVolumeTask {
    pub keywords: Vec<String>,
    pub language_name: String,
    pub location_code: u32,
}

// ---------------------------------------------------------------------------
// Response envelope
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub(crate) struct Envelope {
    pub status_code: u32,
    #[serde(default)]
    pub status_message: String,
    #[serde(default)]
    pub tasks: Option<Vec<TaskEnvelope>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TaskEnvelope {
    pub status_code: u32,
    #[serde(default)]
    pub status_message: String,
    #[serde(default)]
    pub result: Option<Vec<TaskResult>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct TaskResult {
    #[serde(default)]
    pub items: Option<Vec<Value>>,
}

// ---------------------------------------------------------------------------
// Item shapes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct KeywordInfo {
    #[serde(default)]
    pub search_volume: Option<u64>,
    #[serde(default)]
    pub cpc: Option<f64>,
    #[serde(default)]
    pub competition: Option<f64>,
    #[serde(default)]
    pub competition_level: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct KeywordProperties {
    #[serde(default)]
    pub keyword_difficulty: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchIntentInfo {
    #[serde(default)]
    pub main_intent: Option<String>,
}

/// Flat item returned by `keyword_suggestions` and `keyword_overview`.
#[derive(Debug, Clone, Deserialize)]
pub struct KeywordItem {
    pub keyword: String,
    #[serde(default)]
    pub keyword_info: Option<KeywordInfo>,
    #[serde(default)]
    pub keyword_properties: Option<KeywordProperties>,
    #[serde(default)]
    pub search_intent_info: Option<SearchIntentInfo>,
}

/// Nested item returned by `related_keywords`: the metrics live one level
/// down under `keyword_data`, with second-order suggestions alongside.
#[derive(Debug, Clone, Deserialize)]
pub struct RelatedItem {
    #[serde(default)]
    pub keyword_data: Option<KeywordItem>,
    #[serde(default)]
    pub related_keywords: Option<Vec<String>>,
}

/// Item returned by the AI search-volume endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct AiVolumeItem {
    pub keyword: String,
    #[serde(default)]
    pub ai_search_volume: Option<u64>,
}
