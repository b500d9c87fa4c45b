//! Keyword key normalization and competition derivation.
//!
//! Every comparison between keywords (dedup, secondary-signal lookup,
//! unmatched detection) goes through [`keyword_key`], so there is exactly one
//! notion of "the same keyword" in the pipeline. Display casing is never
//! touched.

use crate::types::CompetitionLevel;

/// Numeric competition assumed for each level when the provider reports 0.
const LOW_FALLBACK: f64 = 0.3;
const MEDIUM_FALLBACK: f64 = 0.6;
const HIGH_FALLBACK: f64 = 0.9;
const UNKNOWN_FALLBACK: f64 = 0.5;

/// Upper bounds (exclusive) used to derive a level from a numeric value.
const LOW_CEILING: f64 = 0.33;
const MEDIUM_CEILING: f64 = 0.66;

/// Comparison key for a keyword: trimmed, lower-cased, internal whitespace
/// collapsed to single spaces.
pub fn keyword_key(keyword: &str) -> String {
    keyword
        .split_whitespace()
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Resolve the numeric and categorical competition of a raw provider item.
///
/// Order matters:
/// 1. a zero (or absent) numeric value is filled in from the level,
/// 2. an unknown level is derived from the possibly filled-in number,
/// 3. the number is clamped to `[0, 1]`.
///
/// The returned level is never [`CompetitionLevel::Unknown`].
pub fn derive_competition(
    competition: Option<f64>,
    competition_level: Option<&str>,
) -> (f64, CompetitionLevel) {
    let mut value = competition.filter(|v| v.is_finite()).unwrap_or(0.0);
    let mut level = competition_level
        .map(CompetitionLevel::parse)
        .unwrap_or(CompetitionLevel::Unknown);

    if value == 0.0 {
        value = match level {
            CompetitionLevel::Low => LOW_FALLBACK,
            CompetitionLevel::Medium => MEDIUM_FALLBACK,
            CompetitionLevel::High => HIGH_FALLBACK,
            CompetitionLevel::Unknown => UNKNOWN_FALLBACK,
        };
    }

    if level == CompetitionLevel::Unknown {
        level = level_for(value);
    }

    (value.clamp(0.0, 1.0), level)
}

/// Level implied by a numeric competition value.
pub fn level_for(competition: f64) -> CompetitionLevel {
    if competition < LOW_CEILING {
        CompetitionLevel::Low
    } else if competition < MEDIUM_CEILING {
        CompetitionLevel::Medium
    } else {
        CompetitionLevel::High
    }
}
