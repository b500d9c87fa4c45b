//! Core domain types for keyword discovery.

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Search-intent label used when the provider has none.
pub const INTENT_NOT_AVAILABLE: &str = "not available";

// ---------------------------------------------------------------------------
// CompetitionLevel
// ---------------------------------------------------------------------------

/// Categorical advertiser competition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CompetitionLevel {
    Low,
    Medium,
    High,
    Unknown,
}

impl CompetitionLevel {
    /// Parse a provider label. Case and surrounding whitespace are ignored;
    /// anything unrecognized (including empty) is `Unknown`.
    pub fn parse(label: &str) -> Self {
        match label.trim().to_ascii_uppercase().as_str() {
            "LOW" => Self::Low,
            "MEDIUM" => Self::Medium,
            "HIGH" => Self::High,
            _ => Self::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "LOW",
            Self::Medium => "MEDIUM",
            Self::High => "HIGH",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl std::fmt::Display for CompetitionLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// KeywordDifficulty
// ---------------------------------------------------------------------------

/// Provider-estimated organic ranking difficulty (0–100), or unknown.
///
/// Serialized as a bare number, or the string `"unknown"`.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum KeywordDifficulty {
    Known(f64),
    #[default]
    Unknown,
}

impl KeywordDifficulty {
    pub fn from_option(value: Option<f64>) -> Self {
        match value {
            Some(v) if v.is_finite() => Self::Known(v),
            _ => Self::Unknown,
        }
    }

    pub fn value(&self) -> Option<f64> {
        match self {
            Self::Known(v) => Some(*v),
            Self::Unknown => None,
        }
    }
}

impl std::fmt::Display for KeywordDifficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Known(v) => write!(f, "{v}"),
            Self::Unknown => f.write_str("unknown"),
        }
    }
}

impl Serialize for KeywordDifficulty {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        match self {
            Self::Known(v) => serializer.serialize_f64(*v),
            Self::Unknown => serializer.serialize_str("unknown"),
        }
    }
}

impl<'de> Deserialize<'de> for KeywordDifficulty {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Number(f64),
            Text(String),
        }

        Ok(match Option::<Repr>::deserialize(deserializer)? {
            Some(Repr::Number(v)) => Self::from_option(Some(v)),
            Some(Repr::Text(_)) | None => Self::Unknown,
        })
    }
}

// ---------------------------------------------------------------------------
// KeywordRecord
// ---------------------------------------------------------------------------

/// A discovered keyword with its metrics and derived ranking fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordRecord {
    /// Keyword text in its original casing.
    pub keyword: String,
    /// Monthly search volume.
    pub search_volume: u64,
    /// Cost per click.
    pub cpc: f64,
    /// Advertiser competition, always within `[0, 1]`.
    pub competition: f64,
    pub competition_level: CompetitionLevel,
    pub keyword_difficulty: KeywordDifficulty,
    pub search_intent: String,
    pub estimated_traffic: f64,
    pub keyword_score: f64,
    /// AI search-volume estimate, 0 when the secondary source has no entry.
    #[serde(default)]
    pub ai_search_volume: u64,
    /// True when the record came out of related-keyword expansion.
    #[serde(default)]
    pub is_related: bool,
}

impl KeywordRecord {
    /// Score used for ordering: non-finite scores rank as 0.
    pub fn ordering_score(&self) -> f64 {
        if self.keyword_score.is_finite() {
            self.keyword_score
        } else {
            0.0
        }
    }
}

/// One entry of the secondary (AI search volume) signal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecondarySignal {
    pub keyword: String,
    pub ai_search_volume: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> KeywordRecord {
        KeywordRecord {
            keyword: "Solar Panels".into(),
            search_volume: 1_200,
            cpc: 4.5,
            competition: 0.9,
            competition_level: CompetitionLevel::High,
            keyword_difficulty: KeywordDifficulty::Unknown,
            search_intent: INTENT_NOT_AVAILABLE.into(),
            estimated_traffic: 336.0,
            keyword_score: 12.5,
            ai_search_volume: 0,
            is_related: false,
        }
    }

    #[test]
    fn competition_level_parse() {
        assert_eq!(CompetitionLevel::parse("high"), CompetitionLevel::High);
        assert_eq!(CompetitionLevel::parse(" Medium "), CompetitionLevel::Medium);
        assert_eq!(CompetitionLevel::parse(""), CompetitionLevel::Unknown);
        assert_eq!(CompetitionLevel::parse("n/a"), CompetitionLevel::Unknown);
    }

    #[test]
    fn record_serializes_with_sentinels() {
        let json = serde_json::to_value(record()).unwrap();
        assert_eq!(json["competition_level"], "HIGH");
        assert_eq!(json["keyword_difficulty"], "unknown");
        assert_eq!(json["search_intent"], "not available");
        assert_eq!(json["is_related"], false);
    }

    #[test]
    fn difficulty_accepts_number_or_text() {
        let known: KeywordDifficulty = serde_json::from_str("37").unwrap();
        assert_eq!(known, KeywordDifficulty::Known(37.0));

        let unknown: KeywordDifficulty = serde_json::from_str(r#""UNKNOWN""#).unwrap();
        assert_eq!(unknown, KeywordDifficulty::Unknown);

        let null: KeywordDifficulty = serde_json::from_str("null").unwrap();
        assert_eq!(null, KeywordDifficulty::Unknown);
    }

    #[test]
    fn ordering_score_treats_nan_as_zero() {
        let mut r = record();
        r.keyword_score = f64::NAN;
        assert_eq!(r.ordering_score(), 0.0);
    }
}
