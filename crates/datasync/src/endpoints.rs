//! Request paths, relative to the API base URL.

use foundation::{CountryCode, SentimentBucket};

pub const GLOBAL_SENTIMENT: &str = "/sentiment/global";
pub const HEALTH: &str = "/health";
pub const SOURCES: &str = "/sources";
pub const COLLECT_TRIGGER: &str = "/collect/trigger";

pub const DEFAULT_DETAIL_HOURS: u32 = 24;
pub const DEFAULT_HEADLINE_LIMIT: u32 = 20;
pub const DEFAULT_TREND_HOURS: u32 = 24;

pub fn country_detail_path(code: &CountryCode, hours: u32) -> String {
    format!("/sentiment/{code}?hours={hours}")
}

pub fn headlines_path(code: &CountryCode, limit: u32, sentiment: Option<SentimentBucket>) -> String {
    match sentiment {
        Some(bucket) => format!("/headlines/{code}?limit={limit}&sentiment={bucket}"),
        None => format!("/headlines/{code}?limit={limit}"),
    }
}

pub fn trends_path(hours: u32) -> String {
    format!("/trends?hours={hours}")
}
