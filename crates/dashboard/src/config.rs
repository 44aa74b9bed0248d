use std::env;
use std::str::FromStr;
use std::time::Duration;

use datasync::SyncSettings;
use datasync::endpoints::{DEFAULT_DETAIL_HOURS, DEFAULT_HEADLINE_LIMIT, DEFAULT_TREND_HOURS};
use scene::DEFAULT_ROTATION_SPEED;

use crate::layout::MOBILE_BREAKPOINT_PX;

pub const DEFAULT_API_URL: &str = "http://localhost:8000/api";

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardConfig {
    pub api_url: String,
    pub poll_interval: Duration,
    pub health_interval: Duration,
    /// How long the panel's exit animation runs before the selection is dropped.
    pub panel_clear_delay: Duration,
    pub detail_hours: u32,
    pub headline_limit: u32,
    pub trend_hours: u32,
    /// Narrow the panel's headline list to the active bucket filter.
    pub filter_headlines: bool,
    pub mobile_breakpoint_px: f64,
    pub rotation_speed: f64,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            poll_interval: Duration::from_secs(60),
            health_interval: Duration::from_secs(30),
            panel_clear_delay: Duration::from_millis(300),
            detail_hours: DEFAULT_DETAIL_HOURS,
            headline_limit: DEFAULT_HEADLINE_LIMIT,
            trend_hours: DEFAULT_TREND_HOURS,
            filter_headlines: false,
            mobile_breakpoint_px: MOBILE_BREAKPOINT_PX,
            rotation_speed: DEFAULT_ROTATION_SPEED,
        }
    }
}

impl DashboardConfig {
    /// Defaults overridden by `SENTIMENT_*` environment variables. Values that
    /// do not parse fall back to the default.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let d = Self::default();
        Self {
            api_url: lookup("SENTIMENT_API_URL").unwrap_or(d.api_url),
            poll_interval: poll_interval(
                parse_or(lookup("SENTIMENT_POLL_SECS").as_deref(), d.poll_interval.as_secs()),
            ),
            health_interval: poll_interval(parse_or(
                lookup("SENTIMENT_HEALTH_POLL_SECS").as_deref(),
                d.health_interval.as_secs(),
            )),
            panel_clear_delay: Duration::from_millis(parse_or(
                lookup("SENTIMENT_PANEL_CLEAR_MS").as_deref(),
                d.panel_clear_delay.as_millis() as u64,
            )),
            detail_hours: parse_or(lookup("SENTIMENT_DETAIL_HOURS").as_deref(), d.detail_hours),
            headline_limit: parse_or(lookup("SENTIMENT_HEADLINE_LIMIT").as_deref(), d.headline_limit),
            trend_hours: parse_or(lookup("SENTIMENT_TREND_HOURS").as_deref(), d.trend_hours),
            filter_headlines: parse_or(lookup("SENTIMENT_FILTER_HEADLINES").as_deref(), d.filter_headlines),
            mobile_breakpoint_px: d.mobile_breakpoint_px,
            rotation_speed: finite_or(
                parse_or(lookup("SENTIMENT_ROTATION_SPEED").as_deref(), d.rotation_speed),
                d.rotation_speed,
            ),
        }
    }

    /// Intervals below [`MIN_POLL_INTERVAL`] are raised to it.
    pub fn sync_settings(&self) -> SyncSettings {
        SyncSettings {
            poll_interval: self.poll_interval.max(MIN_POLL_INTERVAL),
            health_interval: self.health_interval.max(MIN_POLL_INTERVAL),
            detail_hours: self.detail_hours,
            headline_limit: self.headline_limit,
        }
    }
}

/// A zero interval would make a poll loop refetch back to back.
pub const MIN_POLL_INTERVAL: Duration = Duration::from_secs(1);

fn poll_interval(secs: u64) -> Duration {
    Duration::from_secs(secs).max(MIN_POLL_INTERVAL)
}

fn finite_or(value: f64, default: f64) -> f64 {
    if value.is_finite() { value } else { default }
}

fn parse_or<T: FromStr>(raw: Option<&str>, default: T) -> T {
    raw.and_then(|v| v.trim().parse().ok()).unwrap_or(default)
}
