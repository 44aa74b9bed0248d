//! Subscriptions for each server resource the dashboard shows.

use std::sync::Arc;

use foundation::{CountryCode, SentimentBucket};
use tracing::debug;

use crate::client::SyncClient;
use crate::endpoints;
use crate::protocol::{CountryDetail, GlobalSentiment, Headline, HealthStatus, SourceStat, TrendPoint};
use crate::resource::{PolledResource, ResourceState};

/// `/sentiment/global`, polled and revalidated on focus.
pub struct GlobalSentimentFeed {
    resource: PolledResource<GlobalSentiment>,
}

impl GlobalSentimentFeed {
    pub(crate) fn new(client: &SyncClient) -> Self {
        let interval = client.settings().poll_interval;
        Self {
            resource: client.poll(Some(endpoints::GLOBAL_SENTIMENT.to_string()), interval),
        }
    }

    pub fn state(&self) -> ResourceState<GlobalSentiment> {
        self.resource.state()
    }

    /// Out-of-band fetch; the poll interval restarts from here.
    pub fn refresh(&self) {
        self.resource.refresh();
    }

    pub fn on_focus(&self) {
        self.resource.revalidate();
    }
}

/// Detail and headlines for the selected country, merged into one view.
///
/// Both underlying subscriptions always exist; with no country they are idle.
pub struct CountryDetailFeed {
    client: SyncClient,
    country: Option<CountryCode>,
    headline_filter: Option<SentimentBucket>,
    detail: PolledResource<CountryDetail>,
    headlines: PolledResource<Vec<Headline>>,
}

impl CountryDetailFeed {
    pub(crate) fn new(client: &SyncClient, country: Option<CountryCode>) -> Self {
        let detail = Self::detail_resource(client, country.as_ref());
        let headlines = Self::headlines_resource(client, country.as_ref(), None);
        Self {
            client: client.clone(),
            country,
            headline_filter: None,
            detail,
            headlines,
        }
    }

    pub fn country(&self) -> Option<&CountryCode> {
        self.country.as_ref()
    }

    pub fn headline_filter(&self) -> Option<SentimentBucket> {
        self.headline_filter
    }

    /// Switches to another country (or none). Returns false if unchanged.
    pub fn set_country(&mut self, country: Option<CountryCode>) -> bool {
        if self.country == country {
            return false;
        }
        debug!(from = ?self.country, to = ?country, "country detail feed retargeted");
        self.detail = Self::detail_resource(&self.client, country.as_ref());
        self.headlines = Self::headlines_resource(&self.client, country.as_ref(), self.headline_filter);
        self.country = country;
        true
    }

    /// Restricts the headline list to one sentiment bucket.
    pub fn set_headline_filter(&mut self, filter: Option<SentimentBucket>) -> bool {
        if self.headline_filter == filter {
            return false;
        }
        self.headline_filter = filter;
        self.headlines = Self::headlines_resource(&self.client, self.country.as_ref(), filter);
        true
    }

    pub fn state(&self) -> ResourceState<CountryDetail> {
        combine_detail_states(self.detail.state(), self.headlines.state())
    }

    pub fn refresh(&self) {
        self.detail.refresh();
        self.headlines.refresh();
    }

    fn detail_resource(client: &SyncClient, country: Option<&CountryCode>) -> PolledResource<CountryDetail> {
        let path = country.map(|c| endpoints::country_detail_path(c, client.settings().detail_hours));
        client.poll(path, client.settings().poll_interval)
    }

    fn headlines_resource(
        client: &SyncClient,
        country: Option<&CountryCode>,
        filter: Option<SentimentBucket>,
    ) -> PolledResource<Vec<Headline>> {
        let path = country.map(|c| endpoints::headlines_path(c, client.settings().headline_limit, filter));
        client.poll(path, client.settings().poll_interval)
    }
}

/// The detail with its headline list taken from the headlines endpoint when
/// that has resolved, else the headlines embedded in the detail.
pub fn merge_country_detail(detail: Option<&CountryDetail>, headlines: Option<&[Headline]>) -> Option<CountryDetail> {
    let mut merged = detail?.clone();
    if let Some(headlines) = headlines {
        merged.top_headlines = headlines.to_vec();
    }
    Some(merged)
}

/// Error is the detail error first, then the headlines error; loading while
/// either request is in flight.
pub fn combine_detail_states(
    detail: ResourceState<CountryDetail>,
    headlines: ResourceState<Vec<Headline>>,
) -> ResourceState<CountryDetail> {
    ResourceState {
        data: merge_country_detail(detail.data.as_deref(), headlines.data.as_deref().map(Vec::as_slice))
            .map(Arc::new),
        error: detail.error.or(headlines.error),
        is_loading: detail.is_loading || headlines.is_loading,
    }
}

/// `/health`, polled on its own shorter interval.
pub struct HealthFeed {
    resource: PolledResource<HealthStatus>,
}

impl HealthFeed {
    pub(crate) fn new(client: &SyncClient) -> Self {
        let interval = client.settings().health_interval;
        Self {
            resource: client.poll(Some(endpoints::HEALTH.to_string()), interval),
        }
    }

    pub fn state(&self) -> ResourceState<HealthStatus> {
        self.resource.state()
    }

    /// False until a healthy status has been received.
    pub fn is_healthy(&self) -> bool {
        self.state().data.is_some_and(|h| h.is_healthy())
    }

    pub fn refresh(&self) {
        self.resource.refresh();
    }
}

/// `/trends` over an hours window; each window is its own cache entry.
pub struct TrendsFeed {
    client: SyncClient,
    hours: u32,
    resource: PolledResource<Vec<TrendPoint>>,
}

impl TrendsFeed {
    pub(crate) fn new(client: &SyncClient, hours: u32) -> Self {
        Self {
            client: client.clone(),
            hours,
            resource: Self::resource(client, hours),
        }
    }

    pub fn hours(&self) -> u32 {
        self.hours
    }

    pub fn set_hours(&mut self, hours: u32) -> bool {
        if self.hours == hours {
            return false;
        }
        self.hours = hours;
        self.resource = Self::resource(&self.client, hours);
        true
    }

    pub fn state(&self) -> ResourceState<Vec<TrendPoint>> {
        self.resource.state()
    }

    pub fn refresh(&self) {
        self.resource.refresh();
    }

    fn resource(client: &SyncClient, hours: u32) -> PolledResource<Vec<TrendPoint>> {
        client.poll(Some(endpoints::trends_path(hours)), client.settings().poll_interval)
    }
}

/// `/sources`: today's article counts per source type.
pub struct SourceStatsFeed {
    resource: PolledResource<Vec<SourceStat>>,
}

impl SourceStatsFeed {
    pub(crate) fn new(client: &SyncClient) -> Self {
        let interval = client.settings().poll_interval;
        Self {
            resource: client.poll(Some(endpoints::SOURCES.to_string()), interval),
        }
    }

    pub fn state(&self) -> ResourceState<Vec<SourceStat>> {
        self.resource.state()
    }

    pub fn refresh(&self) {
        self.resource.refresh();
    }
}
