//! Application configuration for SeedScope.
//!
//! User config lives at `~/.seedscope/seedscope.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Result, SeedScopeError};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "seedscope.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".seedscope";

// ---------------------------------------------------------------------------
// Config structs (matching seedscope.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Keyword provider connection settings.
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Discovery defaults.
    #[serde(default)]
    pub discovery: DiscoveryDefaults,
}

/// `[provider]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Base URL of the DataForSEO-compatible API.
    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// Name of the env var holding the API login (never store the login itself).
    #[serde(default = "default_login_env")]
    pub login_env: String,

    /// Name of the env var holding the API password.
    #[serde(default = "default_password_env")]
    pub password_env: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Extra attempts after a retryable failure.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Base backoff between retries, doubled on each attempt.
    #[serde(default = "default_retry_backoff")]
    pub retry_backoff_ms: u64,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            login_env: default_login_env(),
            password_env: default_password_env(),
            request_timeout_secs: default_request_timeout(),
            max_retries: default_max_retries(),
            retry_backoff_ms: default_retry_backoff(),
        }
    }
}

fn default_api_url() -> String {
    "https://api.dataforseo.com".into()
}
fn default_login_env() -> String {
    "DATAFORSEO_LOGIN".into()
}
fn default_password_env() -> String {
    "DATAFORSEO_PASSWORD".into()
}
fn default_request_timeout() -> u64 {
    60
}
fn default_max_retries() -> u32 {
    2
}
fn default_retry_backoff() -> u64 {
    500
}

/// `[discovery]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryDefaults {
    /// Provider language name.
    #[serde(default = "default_language_name")]
    pub language_name: String,

    /// Provider location code (2840 = United States).
    #[serde(default = "default_location_code")]
    pub location_code: u32,

    /// Maximum suggestions requested per seed.
    #[serde(default = "default_seed_limit")]
    pub seed_limit: u32,

    /// Related-keyword expansion depth.
    #[serde(default = "default_related_depth")]
    pub related_depth: u32,

    /// Maximum related keywords requested per candidate.
    #[serde(default = "default_related_limit")]
    pub related_limit: u32,

    /// Maximum related-keyword requests in flight at once.
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: u32,
}

impl Default for DiscoveryDefaults {
    fn default() -> Self {
        Self {
            language_name: default_language_name(),
            location_code: default_location_code(),
            seed_limit: default_seed_limit(),
            related_depth: default_related_depth(),
            related_limit: default_related_limit(),
            max_concurrency: default_max_concurrency(),
        }
    }
}

fn default_language_name() -> String {
    "English".into()
}
fn default_location_code() -> u32 {
    2840
}
fn default_seed_limit() -> u32 {
    150
}
fn default_related_depth() -> u32 {
    2
}
fn default_related_limit() -> u32 {
    100
}
fn default_max_concurrency() -> u32 {
    8
}

// ---------------------------------------------------------------------------
// Discovery options (runtime, merged from config + CLI flags)
// ---------------------------------------------------------------------------

/// Runtime discovery configuration — merged from config file + CLI flags.
#[derive(Debug, Clone)]
pub struct DiscoveryOptions {
    /// Provider language name.
    pub language_name: String,
    /// Provider location code.
    pub location_code: u32,
    /// Maximum suggestions per seed.
    pub seed_limit: u32,
    /// Related-keyword expansion depth (0..=4 on the provider side).
    pub related_depth: u32,
    /// Maximum related keywords per candidate.
    pub related_limit: u32,
    /// Maximum related-keyword requests in flight.
    pub max_concurrency: u32,
}

impl From<&AppConfig> for DiscoveryOptions {
    fn from(config: &AppConfig) -> Self {
        Self {
            language_name: config.discovery.language_name.clone(),
            location_code: config.discovery.location_code,
            seed_limit: config.discovery.seed_limit,
            related_depth: config.discovery.related_depth,
            related_limit: config.discovery.related_limit,
            max_concurrency: config.discovery.max_concurrency,
        }
    }
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        Self::from(&AppConfig::default())
    }
}

impl DiscoveryOptions {
    /// Reject values the provider would refuse anyway.
    pub fn validate(&self) -> Result<()> {
        if self.seed_limit == 0 || self.related_limit == 0 {
            return Err(SeedScopeError::validation("limits must be at least 1"));
        }
        if self.related_depth > 4 {
            return Err(SeedScopeError::validation(format!(
                "related depth {} out of range (0..=4)",
                self.related_depth
            )));
        }
        if self.max_concurrency == 0 {
            return Err(SeedScopeError::validation("max_concurrency must be at least 1"));
        }
        Ok(())
    }
}

/// API credentials resolved from the environment.
#[derive(Clone)]
pub struct Credentials {
    pub login: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("login", &self.login)
            .field("password", &"***")
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.seedscope/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| SeedScopeError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.seedscope/seedscope.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| SeedScopeError::io(path, e))?;

    let config: AppConfig = toml::from_str(&content).map_err(|e| {
        SeedScopeError::config(format!("failed to parse {}: {e}", path.display()))
    })?;

    Url::parse(&config.provider.api_url).map_err(|e| {
        SeedScopeError::config(format!("invalid api_url '{}': {e}", config.provider.api_url))
    })?;

    Ok(config)
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| SeedScopeError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| SeedScopeError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| SeedScopeError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Read the provider login and password from the env vars named in the config.
pub fn resolve_credentials(config: &ProviderConfig) -> Result<Credentials> {
    let read = |var_name: &str| match std::env::var(var_name) {
        Ok(val) if !val.is_empty() => Ok(val),
        _ => Err(SeedScopeError::config(format!(
            "provider credentials not found. Set the {var_name} environment variable.\n\
             Get API access at https://app.dataforseo.com/api-access"
        ))),
    };

    Ok(Credentials {
        login: read(&config.login_env)?,
        password: read(&config.password_env)?,
    })
}
