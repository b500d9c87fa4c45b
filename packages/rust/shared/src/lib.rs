//! Shared types, error model, and configuration for SeedScope.
//!
//! This crate is the foundation depended on by all other SeedScope crates.
//! It provides:
//! - [`SeedScopeError`] — the unified error type
//! - Domain types ([`KeywordRecord`], [`CompetitionLevel`], [`KeywordDifficulty`])
//! - Keyword normalization ([`keyword_key`], [`derive_competition`])
//! - Configuration ([`AppConfig`], [`DiscoveryOptions`], config loading)

pub mod config;
pub mod error;
pub mod normalize;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, Credentials, DiscoveryDefaults, DiscoveryOptions, ProviderConfig, config_dir,
    config_file_path, init_config, load_config, load_config_from, resolve_credentials,
};
pub use error::{Result, SeedScopeError};
pub use normalize::{derive_competition, keyword_key, level_for};
pub use types::{
    CompetitionLevel, INTENT_NOT_AVAILABLE, KeywordDifficulty, KeywordRecord, SecondarySignal,
};
