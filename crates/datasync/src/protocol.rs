//! Wire types for the sentiment service's JSON endpoints.
//!
//! The service emits naive ISO-8601 datetimes; they are read as UTC.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use foundation::CountryCode;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryData {
    pub country_code: CountryCode,
    pub country_name: String,
    pub sentiment_score: f64,
    pub article_count: u64,
    /// Change from the previous hour.
    #[serde(default)]
    pub trend: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalSentiment {
    #[serde(default)]
    pub countries: Vec<CountryData>,
    pub global_average: f64,
    pub total_articles: u64,
    #[serde(with = "timestamp")]
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyTrend {
    #[serde(with = "timestamp")]
    pub hour: DateTime<Utc>,
    pub sentiment: f64,
    pub articles: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Headline {
    pub id: i64,
    pub title: String,
    pub source_name: String,
    #[serde(default)]
    pub source_type: Option<String>,
    pub sentiment_score: f64,
    #[serde(default)]
    pub sentiment_label: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default, with = "timestamp::option")]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(default, with = "timestamp::option")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryDetail {
    pub country_code: CountryCode,
    pub country_name: String,
    pub current_sentiment: f64,
    pub article_count: u64,
    #[serde(default)]
    pub hourly_trend: Vec<HourlyTrend>,
    #[serde(default)]
    pub top_headlines: Vec<Headline>,
    /// Article count per source type.
    #[serde(default)]
    pub source_breakdown: BTreeMap<String, u64>,
}

/// One row of `/trends`. Also accepts the per-country `HourlyTrend` field names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    #[serde(with = "timestamp")]
    pub hour: DateTime<Utc>,
    #[serde(alias = "avg_sentiment")]
    pub sentiment: f64,
    #[serde(alias = "total_articles")]
    pub articles: u64,
    #[serde(default)]
    pub country_count: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    #[serde(default, with = "timestamp::option")]
    pub last_collection: Option<DateTime<Utc>>,
    #[serde(default)]
    pub articles_today: u64,
    #[serde(default)]
    pub model_loaded: bool,
    #[serde(default)]
    pub database_ok: bool,
}

impl HealthStatus {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceStat {
    #[serde(default)]
    pub source_type: Option<String>,
    pub article_count: u64,
    #[serde(default)]
    pub avg_sentiment: Option<f64>,
}

/// Reply to `POST /collect/trigger`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionAck {
    pub message: String,
    pub status: String,
}

pub mod timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer, de};

    /// RFC 3339, or a naive ISO-8601 datetime taken as UTC.
    pub fn parse(raw: &str) -> Option<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
            return Some(dt.with_timezone(&Utc));
        }
        raw.parse::<NaiveDateTime>().ok().map(|n| n.and_utc())
    }

    pub fn serialize<S: Serializer>(dt: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&dt.to_rfc3339())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        parse(&raw).ok_or_else(|| de::Error::custom(format!("invalid timestamp {raw:?}")))
    }

    pub mod option {
        use chrono::{DateTime, Utc};
        use serde::{Deserialize, Deserializer, Serializer, de};

        pub fn serialize<S: Serializer>(dt: &Option<DateTime<Utc>>, s: S) -> Result<S::Ok, S::Error> {
            match dt {
                Some(dt) => s.serialize_str(&dt.to_rfc3339()),
                None => s.serialize_none(),
            }
        }

        pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<DateTime<Utc>>, D::Error> {
            match Option::<String>::deserialize(d)? {
                None => Ok(None),
                Some(raw) => super::parse(&raw)
                    .map(Some)
                    .ok_or_else(|| de::Error::custom(format!("invalid timestamp {raw:?}"))),
            }
        }
    }
}
