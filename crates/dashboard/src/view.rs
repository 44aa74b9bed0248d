//! The read model handed to the presentation layer.
//!
//! Rebuilt from the latest snapshots on every render; it owns nothing the
//! feeds own, it only copies out what the screen needs.

use chrono::{DateTime, Utc};
use datasync::{
    CountryData, CountryDetail, FetchError, GlobalSentiment, HealthStatus, ResourceState, SourceStat,
    TrendPoint,
};
use foundation::CountryCode;

use crate::controller::SelectionState;
use crate::filter::{self, BucketCounts, SentimentFilter};
use crate::layout::PanelPlacement;

#[derive(Debug, Clone)]
pub struct DashboardView {
    pub selected_country: Option<CountryCode>,
    pub panel_visible: bool,
    pub panel_placement: PanelPlacement,
    pub filter: SentimentFilter,
    /// Countries passing the active filter, in snapshot order.
    pub countries: Vec<CountryData>,
    /// Bucket sizes over the full list, independent of the filter.
    pub bucket_counts: BucketCounts,
    pub global_trend: f64,
    pub global_average: Option<f64>,
    pub total_articles: Option<u64>,
    pub last_updated: Option<DateTime<Utc>>,
    pub global_error: Option<FetchError>,
    pub global_loading: bool,
    pub detail: ResourceState<CountryDetail>,
    pub health: ResourceState<HealthStatus>,
    pub healthy: bool,
    pub trends: ResourceState<Vec<TrendPoint>>,
    pub sources: ResourceState<Vec<SourceStat>>,
}

pub struct ViewInputs {
    pub selection: SelectionState,
    pub placement: PanelPlacement,
    pub global: ResourceState<GlobalSentiment>,
    pub detail: ResourceState<CountryDetail>,
    pub health: ResourceState<HealthStatus>,
    pub trends: ResourceState<Vec<TrendPoint>>,
    pub sources: ResourceState<Vec<SourceStat>>,
}

impl DashboardView {
    pub fn build(inputs: ViewInputs) -> Self {
        let ViewInputs {
            selection,
            placement,
            global,
            detail,
            health,
            trends,
            sources,
        } = inputs;

        let all: &[CountryData] = global.data.as_deref().map_or(&[][..], |g| g.countries.as_slice());
        let countries = filter::apply(selection.filter, all).into_iter().cloned().collect();
        let healthy = health.data.as_deref().is_some_and(HealthStatus::is_healthy);

        Self {
            selected_country: selection.selected_country,
            panel_visible: selection.panel_visible,
            panel_placement: placement,
            filter: selection.filter,
            countries,
            bucket_counts: filter::partition(all).counts(),
            global_trend: global_trend(all),
            global_average: global.data.as_deref().map(|g| g.global_average),
            total_articles: global.data.as_deref().map(|g| g.total_articles),
            last_updated: global.data.as_deref().map(|g| g.last_updated),
            global_error: global.error.clone(),
            global_loading: global.is_loading,
            detail,
            health,
            healthy,
            trends,
            sources,
        }
    }

    /// No countries to show under the current filter.
    pub fn is_empty(&self) -> bool {
        self.countries.is_empty()
    }
}

/// Mean of the per-country trend values over the full list, with a missing
/// trend counted as zero. Zero for an empty list.
pub fn global_trend(countries: &[CountryData]) -> f64 {
    if countries.is_empty() {
        return 0.0;
    }
    let sum: f64 = countries.iter().map(|c| c.trend.unwrap_or(0.0)).sum();
    sum / countries.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use foundation::SentimentBucket;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;

    fn country(code: &str, score: f64, trend: Option<f64>) -> CountryData {
        CountryData {
            country_code: CountryCode::parse(code).unwrap(),
            country_name: code.to_string(),
            sentiment_score: score,
            article_count: 4,
            trend,
        }
    }

    fn snapshot() -> GlobalSentiment {
        GlobalSentiment {
            countries: vec![
                country("JP", 0.5, Some(0.3)),
                country("US", -0.5, None),
                country("FR", 0.0, Some(-0.06)),
            ],
            global_average: 0.0,
            total_articles: 12,
            last_updated: Utc::now(),
        }
    }

    fn inputs(filter: SentimentFilter) -> ViewInputs {
        ViewInputs {
            selection: SelectionState {
                filter,
                ..SelectionState::default()
            },
            placement: PanelPlacement::SlideIn,
            global: ResourceState {
                data: Some(Arc::new(snapshot())),
                error: None,
                is_loading: false,
            },
            detail: ResourceState::default(),
            health: ResourceState::default(),
            trends: ResourceState::default(),
            sources: ResourceState::default(),
        }
    }

    #[test]
    fn global_trend_counts_missing_as_zero() {
        let t = global_trend(&snapshot().countries);
        assert!((t - 0.08).abs() < 1e-12);
        assert_eq!(global_trend(&[]), 0.0);
    }

    #[test]
    fn global_trend_ignores_the_filter() {
        let all = DashboardView::build(inputs(SentimentFilter::All));
        let positive = DashboardView::build(inputs(SentimentFilter::Only(SentimentBucket::Positive)));
        assert_eq!(all.global_trend, positive.global_trend);
        assert_eq!(positive.countries.len(), 1);
        assert_eq!(all.countries.len(), 3);
        assert_eq!(positive.bucket_counts, all.bucket_counts);
    }

    #[test]
    fn empty_snapshot_is_an_empty_state_not_an_error() {
        let mut i = inputs(SentimentFilter::All);
        i.global = ResourceState::default();
        let view = DashboardView::build(i);
        assert!(view.is_empty());
        assert!(view.global_error.is_none());
        assert_eq!(view.global_trend, 0.0);
        assert_eq!(view.bucket_counts.total(), 0);
        assert!(!view.healthy);
    }

    #[test]
    fn surfaces_global_stats() {
        let view = DashboardView::build(inputs(SentimentFilter::All));
        assert_eq!(view.total_articles, Some(12));
        assert_eq!(view.global_average, Some(0.0));
        assert!(view.last_updated.is_some());
    }
}
