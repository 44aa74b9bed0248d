use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use foundation::CountryCode;
use serde::de::DeserializeOwned;
use tokio::sync::watch;
use tracing::info;

use crate::cache::Cache;
use crate::endpoints;
use crate::error::FetchError;
use crate::feeds::{CountryDetailFeed, GlobalSentimentFeed, HealthFeed, SourceStatsFeed, TrendsFeed};
use crate::fetcher::{Fetcher, HttpFetcher, decode};
use crate::protocol::CollectionAck;
use crate::resource::PolledResource;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncSettings {
    /// Global sentiment, country detail, headlines, trends and sources.
    pub poll_interval: Duration,
    pub health_interval: Duration,
    pub detail_hours: u32,
    pub headline_limit: u32,
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(60),
            health_interval: Duration::from_secs(30),
            detail_hours: endpoints::DEFAULT_DETAIL_HOURS,
            headline_limit: endpoints::DEFAULT_HEADLINE_LIMIT,
        }
    }
}

/// Entry point for every feed; all feeds made from one client (or its clones)
/// share one cache, so identical subscriptions share requests.
#[derive(Clone)]
pub struct SyncClient {
    cache: Cache,
    fetcher: Arc<dyn Fetcher>,
    settings: SyncSettings,
}

impl fmt::Debug for SyncClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SyncClient")
            .field("cache", &self.cache)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl SyncClient {
    pub fn new(fetcher: Arc<dyn Fetcher>, settings: SyncSettings) -> Self {
        Self {
            cache: Cache::new(),
            fetcher,
            settings,
        }
    }

    pub fn http(base_url: &str, settings: SyncSettings) -> Result<Self, FetchError> {
        let fetcher = HttpFetcher::new(base_url)?;
        info!(base_url = fetcher.base_url(), "sync client ready");
        Ok(Self::new(Arc::new(fetcher), settings))
    }

    pub fn settings(&self) -> &SyncSettings {
        &self.settings
    }

    pub fn cache(&self) -> &Cache {
        &self.cache
    }

    /// Ticks whenever any request settles.
    pub fn changes(&self) -> watch::Receiver<u64> {
        self.cache.subscribe()
    }

    pub fn global_sentiment(&self) -> GlobalSentimentFeed {
        GlobalSentimentFeed::new(self)
    }

    pub fn country_detail(&self, country: Option<CountryCode>) -> CountryDetailFeed {
        CountryDetailFeed::new(self, country)
    }

    pub fn health(&self) -> HealthFeed {
        HealthFeed::new(self)
    }

    pub fn trends(&self, hours: u32) -> TrendsFeed {
        TrendsFeed::new(self, hours)
    }

    pub fn sources(&self) -> SourceStatsFeed {
        SourceStatsFeed::new(self)
    }

    /// Asks the service to start a collection run. Does not wait for the run.
    pub async fn trigger_collection(&self) -> Result<CollectionAck, FetchError> {
        let value = self.fetcher.post(endpoints::COLLECT_TRIGGER).await?;
        let ack: CollectionAck = decode(endpoints::COLLECT_TRIGGER, value)?;
        info!(status = %ack.status, message = %ack.message, "collection triggered");
        Ok(ack)
    }

    pub(crate) fn poll<T>(&self, path: Option<String>, interval: Duration) -> PolledResource<T>
    where
        T: DeserializeOwned + Send + Sync + 'static,
    {
        PolledResource::spawn(self.cache.clone(), self.fetcher.clone(), path, interval)
    }
}
