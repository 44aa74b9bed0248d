use std::marker::PhantomData;
use std::sync::Arc;
use std::time::Duration;

use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use serde::de::DeserializeOwned;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::cache::{Cache, CacheKey, FetchResult, Snapshot};
use crate::error::FetchError;
use crate::fetcher::{Fetcher, decode};

/// Out-of-band requests to a poll loop.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Trigger {
    /// Fetch now even if a request is in flight, then restart the interval.
    Refresh,
    /// Fetch now, joining an in-flight request if there is one.
    Revalidate,
}

/// What a subscriber sees of one resource.
#[derive(Debug)]
pub struct ResourceState<T> {
    pub data: Option<Arc<T>>,
    pub error: Option<FetchError>,
    pub is_loading: bool,
}

impl<T> Default for ResourceState<T> {
    fn default() -> Self {
        Self {
            data: None,
            error: None,
            is_loading: false,
        }
    }
}

impl<T> Clone for ResourceState<T> {
    fn clone(&self) -> Self {
        Self {
            data: self.data.clone(),
            error: self.error.clone(),
            is_loading: self.is_loading,
        }
    }
}

/// A subscription that polls one cache key on a fixed interval.
///
/// Without a key it is idle: no task, no requests, empty state. Dropping the
/// resource stops its poll loop.
pub struct PolledResource<T> {
    cache: Cache,
    key: Option<CacheKey>,
    triggers: Option<mpsc::UnboundedSender<Trigger>>,
    task: Option<JoinHandle<()>>,
    _data: PhantomData<fn() -> T>,
}

impl<T> PolledResource<T>
where
    T: DeserializeOwned + Send + Sync + 'static,
{
    /// Starts polling `path`, or returns an idle resource for `None`.
    /// Must be called from within a Tokio runtime when `path` is set.
    pub fn spawn(cache: Cache, fetcher: Arc<dyn Fetcher>, path: Option<String>, interval: Duration) -> Self {
        let Some(path) = path else {
            return Self::idle(cache);
        };
        let key = CacheKey::new(path);
        let (tx, rx) = mpsc::unbounded_channel();
        let task = tokio::spawn(poll_loop::<T>(cache.clone(), fetcher, key.clone(), interval, rx));
        Self {
            cache,
            key: Some(key),
            triggers: Some(tx),
            task: Some(task),
            _data: PhantomData,
        }
    }

    pub fn idle(cache: Cache) -> Self {
        Self {
            cache,
            key: None,
            triggers: None,
            task: None,
            _data: PhantomData,
        }
    }

    pub fn state(&self) -> ResourceState<T> {
        let Some(key) = &self.key else {
            return ResourceState::default();
        };
        let entry = self.cache.state(key);
        ResourceState {
            data: entry.data.and_then(|s| s.downcast::<T>().ok()),
            error: entry.error,
            is_loading: entry.is_loading,
        }
    }
}

impl<T> PolledResource<T> {
    pub fn key(&self) -> Option<&CacheKey> {
        self.key.as_ref()
    }

    pub fn is_active(&self) -> bool {
        self.task.is_some()
    }

    pub fn refresh(&self) {
        self.send(Trigger::Refresh);
    }

    pub fn revalidate(&self) {
        self.send(Trigger::Revalidate);
    }

    fn send(&self, trigger: Trigger) {
        if let Some(tx) = &self.triggers {
            // The loop only goes away when the resource is dropped.
            let _ = tx.send(trigger);
        }
    }
}

impl<T> Drop for PolledResource<T> {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            if let Some(key) = &self.key {
                debug!(%key, "polling stopped");
            }
        }
    }
}

/// Builds the request future for one fetch of `path` decoded as `T`.
pub fn request_snapshot<T>(fetcher: &dyn Fetcher, path: &str) -> BoxFuture<'static, FetchResult>
where
    T: DeserializeOwned + Send + Sync + 'static,
{
    let request = fetcher.get(path);
    let path = path.to_string();
    async move {
        let value = request.await?;
        let decoded: T = decode(&path, value)?;
        Ok(Arc::new(decoded) as Snapshot)
    }
    .boxed()
}

async fn poll_loop<T>(
    cache: Cache,
    fetcher: Arc<dyn Fetcher>,
    key: CacheKey,
    interval: Duration,
    mut triggers: mpsc::UnboundedReceiver<Trigger>,
) where
    T: DeserializeOwned + Send + Sync + 'static,
{
    debug!(%key, interval_s = interval.as_secs_f64(), "polling started");
    let mut force = false;
    loop {
        let request = cache.fetch(&key, force, || request_snapshot::<T>(fetcher.as_ref(), key.as_str()));
        if let Err(err) = request.await {
            warn!(%key, error = %err, "poll failed");
        }

        force = tokio::select! {
            _ = tokio::time::sleep(interval) => false,
            trigger = triggers.recv() => match trigger {
                Some(Trigger::Refresh) => true,
                Some(Trigger::Revalidate) => false,
                None => break,
            },
        };
    }
}
