//! Shared per-key snapshot cache with request deduplication.
//!
//! Each key holds at most one snapshot, the last error, and at most one
//! in-flight request. Snapshots are replaced wholesale, never edited in
//! place. Every request gets a sequence number from a cache-wide counter; a
//! completion only lands if it is newer than what the entry already holds,
//! so a slow early request cannot overwrite data from a later one.

use std::any::Any;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, Weak};

use futures_util::FutureExt;
use futures_util::future::{BoxFuture, Shared};
use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::{debug, trace};

use crate::error::FetchError;

pub type Snapshot = Arc<dyn Any + Send + Sync>;
pub type FetchResult = Result<Snapshot, FetchError>;
pub type SharedFetch = Shared<BoxFuture<'static, FetchResult>>;

/// Cache key; by convention the request path including its query.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Point-in-time view of one entry.
#[derive(Debug, Clone, Default)]
pub struct EntryState {
    pub data: Option<Snapshot>,
    pub error: Option<FetchError>,
    pub is_loading: bool,
}

#[derive(Default)]
struct Entry {
    data: Option<Snapshot>,
    data_seq: u64,
    error: Option<FetchError>,
    error_seq: u64,
    in_flight: Option<(u64, SharedFetch)>,
}

#[derive(Default)]
struct CacheInner {
    entries: BTreeMap<CacheKey, Entry>,
    next_seq: u64,
}

#[derive(Clone)]
pub struct Cache {
    inner: Arc<Mutex<CacheInner>>,
    changes: Arc<watch::Sender<u64>>,
}

impl Default for Cache {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Cache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cache").field("entries", &self.len()).finish()
    }
}

impl Cache {
    pub fn new() -> Self {
        let (changes, _) = watch::channel(0);
        Self {
            inner: Arc::new(Mutex::new(CacheInner::default())),
            changes: Arc::new(changes),
        }
    }

    /// Returns the request for `key`, joining the one in flight unless
    /// `force` is set or nobody awaits it any more. `start` is only called
    /// when a new request is issued.
    pub fn fetch<F>(&self, key: &CacheKey, force: bool, start: F) -> SharedFetch
    where
        F: FnOnce() -> BoxFuture<'static, FetchResult>,
    {
        let mut guard = self.inner.lock();
        let inner = &mut *guard;
        let entry = inner.entries.entry(key.clone()).or_default();

        if !force && let Some((seq, pending)) = &entry.in_flight {
            if is_awaited(pending) {
                trace!(%key, seq, "joining in-flight request");
                return pending.clone();
            }
            debug!(%key, seq, "replacing abandoned in-flight request");
        }

        inner.next_seq += 1;
        let seq = inner.next_seq;
        debug!(%key, seq, force, "fetch issued");

        let request = start();
        let cache = Arc::downgrade(&self.inner);
        let changes = self.changes.clone();
        let settled_key = key.clone();
        let tracked = async move {
            let result = request.await;
            settle(&cache, &settled_key, seq, &result);
            changes.send_modify(|rev| *rev += 1);
            result
        }
        .boxed()
        .shared();

        entry.in_flight = Some((seq, tracked.clone()));
        tracked
    }

    pub fn state(&self, key: &CacheKey) -> EntryState {
        let inner = self.inner.lock();
        inner
            .entries
            .get(key)
            .map(|e| EntryState {
                data: e.data.clone(),
                error: e.error.clone(),
                is_loading: e.in_flight.as_ref().is_some_and(|(_, p)| is_awaited(p)),
            })
            .unwrap_or_default()
    }

    /// Typed snapshot for `key`, if present and of type `T`.
    pub fn snapshot<T: Any + Send + Sync>(&self, key: &CacheKey) -> Option<Arc<T>> {
        self.state(key).data.and_then(|s| s.downcast::<T>().ok())
    }

    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Revision counter bumped after every settled request.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.changes.subscribe()
    }
}

/// Whether anyone besides the cache still holds the request. Once every
/// awaiter has dropped, nothing drives it and it must not be joined.
fn is_awaited(pending: &SharedFetch) -> bool {
    pending.strong_count().is_some_and(|n| n > 1)
}

fn settle(cache: &Weak<Mutex<CacheInner>>, key: &CacheKey, seq: u64, result: &FetchResult) {
    let Some(shared) = cache.upgrade() else {
        return;
    };
    let mut inner = shared.lock();
    let Some(entry) = inner.entries.get_mut(key) else {
        return;
    };

    if entry.in_flight.as_ref().is_some_and(|(s, _)| *s == seq) {
        entry.in_flight = None;
    }

    match result {
        Ok(snapshot) => {
            if seq <= entry.data_seq {
                debug!(%key, seq, stored = entry.data_seq, "discarding out-of-order response");
                return;
            }
            entry.data = Some(snapshot.clone());
            entry.data_seq = seq;
            if seq > entry.error_seq {
                entry.error = None;
            }
            trace!(%key, seq, "snapshot stored");
        }
        Err(err) => {
            if seq <= entry.data_seq || seq <= entry.error_seq {
                debug!(%key, seq, "discarding out-of-order failure");
                return;
            }
            debug!(%key, seq, error = %err, "fetch failed, keeping previous snapshot");
            entry.error = Some(err.clone());
            entry.error_seq = seq;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::sync::oneshot;

    fn key(s: &str) -> CacheKey {
        CacheKey::new(s)
    }

    fn ready(value: u32) -> BoxFuture<'static, FetchResult> {
        async move { Ok(Arc::new(value) as Snapshot) }.boxed()
    }

    fn failing() -> BoxFuture<'static, FetchResult> {
        async {
            Err(FetchError::Status {
                status: 503,
                path: "/x".into(),
            })
        }
        .boxed()
    }

    fn gated() -> (oneshot::Sender<FetchResult>, BoxFuture<'static, FetchResult>) {
        let (tx, rx) = oneshot::channel();
        let fut = async move {
            rx.await
                .unwrap_or_else(|_| Err(FetchError::Transport("dropped".into())))
        }
        .boxed();
        (tx, fut)
    }

    #[tokio::test]
    async fn concurrent_fetches_share_one_request() {
        let cache = Cache::new();
        let calls = Arc::new(AtomicU32::new(0));
        let (tx, fut) = gated();
        let mut fut = Some(fut);

        let c = calls.clone();
        let a = cache.fetch(&key("/g"), false, || {
            c.fetch_add(1, Ordering::SeqCst);
            fut.take().unwrap()
        });
        let c = calls.clone();
        let b = cache.fetch(&key("/g"), false, move || {
            c.fetch_add(1, Ordering::SeqCst);
            ready(0)
        });
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(cache.state(&key("/g")).is_loading);

        tx.send(Ok(Arc::new(5u32) as Snapshot)).unwrap();
        let (ra, rb) = futures_util::join!(a, b);
        assert!(ra.is_ok() && rb.is_ok());
        assert_eq!(cache.snapshot::<u32>(&key("/g")).as_deref(), Some(&5));
        assert!(!cache.state(&key("/g")).is_loading);
    }

    #[tokio::test]
    async fn force_bypasses_the_in_flight_request() {
        let cache = Cache::new();
        let calls = Arc::new(AtomicU32::new(0));
        for force in [false, true] {
            let c = calls.clone();
            let _ = cache.fetch(&key("/g"), force, move || {
                c.fetch_add(1, Ordering::SeqCst);
                ready(1)
            });
        }
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn abandoned_request_is_not_joined() {
        let cache = Cache::new();
        let (_tx, stalled) = gated();
        let abandoned = cache.fetch(&key("/g"), false, move || stalled);
        assert!(cache.state(&key("/g")).is_loading);

        drop(abandoned);
        assert!(!cache.state(&key("/g")).is_loading);

        let calls = Arc::new(AtomicU32::new(0));
        let c = calls.clone();
        let fresh = cache.fetch(&key("/g"), false, move || {
            c.fetch_add(1, Ordering::SeqCst);
            ready(7)
        });
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(*fresh.await.unwrap().downcast::<u32>().unwrap(), 7);
        assert_eq!(cache.snapshot::<u32>(&key("/g")).as_deref(), Some(&7));
        assert!(!cache.state(&key("/g")).is_loading);
    }

    #[tokio::test]
    async fn late_response_from_older_request_is_discarded() {
        let cache = Cache::new();
        let (tx_old, old) = gated();
        let (tx_new, new) = gated();
        let first = cache.fetch(&key("/g"), false, move || old);
        let second = cache.fetch(&key("/g"), true, move || new);

        tx_new.send(Ok(Arc::new(2u32) as Snapshot)).unwrap();
        second.await.unwrap();
        assert_eq!(cache.snapshot::<u32>(&key("/g")).as_deref(), Some(&2));

        tx_old.send(Ok(Arc::new(1u32) as Snapshot)).unwrap();
        first.await.unwrap();
        assert_eq!(cache.snapshot::<u32>(&key("/g")).as_deref(), Some(&2));
    }

    #[tokio::test]
    async fn older_request_finishing_first_still_lands() {
        let cache = Cache::new();
        let (tx_old, old) = gated();
        let (tx_new, new) = gated();
        let first = cache.fetch(&key("/g"), false, move || old);
        let second = cache.fetch(&key("/g"), true, move || new);

        tx_old.send(Ok(Arc::new(1u32) as Snapshot)).unwrap();
        first.await.unwrap();
        assert_eq!(cache.snapshot::<u32>(&key("/g")).as_deref(), Some(&1));
        // The newer request is still pending.
        assert!(cache.state(&key("/g")).is_loading);

        tx_new.send(Ok(Arc::new(2u32) as Snapshot)).unwrap();
        second.await.unwrap();
        assert_eq!(cache.snapshot::<u32>(&key("/g")).as_deref(), Some(&2));
    }

    #[tokio::test]
    async fn failure_keeps_previous_snapshot() {
        let cache = Cache::new();
        cache.fetch(&key("/g"), false, || ready(3)).await.unwrap();
        assert!(cache.fetch(&key("/g"), false, failing).await.is_err());

        let state = cache.state(&key("/g"));
        assert!(matches!(state.error, Some(FetchError::Status { status: 503, .. })));
        assert_eq!(cache.snapshot::<u32>(&key("/g")).as_deref(), Some(&3));

        cache.fetch(&key("/g"), false, || ready(4)).await.unwrap();
        let state = cache.state(&key("/g"));
        assert!(state.error.is_none());
        assert_eq!(cache.snapshot::<u32>(&key("/g")).as_deref(), Some(&4));
    }

    #[tokio::test]
    async fn keys_are_independent() {
        let cache = Cache::new();
        cache.fetch(&key("/trends?hours=24"), false, || ready(24)).await.unwrap();
        assert!(cache.snapshot::<u32>(&key("/trends?hours=48")).is_none());
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn wrong_type_yields_no_snapshot() {
        let cache = Cache::new();
        cache.fetch(&key("/g"), false, || ready(1)).await.unwrap();
        assert!(cache.snapshot::<String>(&key("/g")).is_none());
        assert!(cache.state(&key("/g")).data.is_some());
    }

    #[tokio::test]
    async fn settled_requests_bump_the_revision() {
        let cache = Cache::new();
        let rx = cache.subscribe();
        assert_eq!(*rx.borrow(), 0);
        cache.fetch(&key("/a"), false, || ready(1)).await.unwrap();
        let _ = cache.fetch(&key("/b"), false, failing).await;
        assert_eq!(*rx.borrow(), 2);
    }
}
