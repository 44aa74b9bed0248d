//! In-memory `Fetcher` serving canned responses by path.
//!
//! Used for offline demos and for exercising feeds without a network.
//! Unknown paths answer 404, like the service does for countries without data.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::time::Duration;

use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use parking_lot::Mutex;
use serde_json::Value;

use crate::error::FetchError;
use crate::fetcher::Fetcher;

#[derive(Debug, Clone)]
enum Reply {
    Json(Value),
    Status(u16),
}

#[derive(Debug, Clone)]
struct Route {
    reply: Reply,
    delay: Duration,
}

#[derive(Debug, Default)]
struct MemoryInner {
    routes: HashMap<String, Route>,
    /// Request count per path; bounded by the number of distinct paths.
    calls: BTreeMap<String, usize>,
    total_calls: usize,
}

#[derive(Debug, Clone, Default)]
pub struct MemoryFetcher {
    inner: Arc<Mutex<MemoryInner>>,
}

impl MemoryFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `value` for `path`, keeping any configured delay.
    pub fn respond(&self, path: &str, value: Value) -> &Self {
        self.set_reply(path, Reply::Json(value));
        self
    }

    /// Answer `path` with a non-2xx status.
    pub fn fail(&self, path: &str, status: u16) -> &Self {
        self.set_reply(path, Reply::Status(status));
        self
    }

    /// Delay replies for `path`; the reply is chosen when the request starts.
    pub fn delay(&self, path: &str, delay: Duration) -> &Self {
        let mut inner = self.inner.lock();
        let route = inner.routes.entry(path.to_string()).or_insert(Route {
            reply: Reply::Status(404),
            delay: Duration::ZERO,
        });
        route.delay = delay;
        self
    }

    /// Number of requests made for `path`.
    pub fn calls(&self, path: &str) -> usize {
        self.inner.lock().calls.get(path).copied().unwrap_or(0)
    }

    pub fn total_calls(&self) -> usize {
        self.inner.lock().total_calls
    }

    /// Distinct paths requested so far, in order.
    pub fn requested_paths(&self) -> Vec<String> {
        self.inner.lock().calls.keys().cloned().collect()
    }

    fn set_reply(&self, path: &str, reply: Reply) {
        let mut inner = self.inner.lock();
        match inner.routes.get_mut(path) {
            Some(route) => route.reply = reply,
            None => {
                inner.routes.insert(
                    path.to_string(),
                    Route {
                        reply,
                        delay: Duration::ZERO,
                    },
                );
            }
        }
    }

    fn request(&self, path: &str) -> BoxFuture<'static, Result<Value, FetchError>> {
        let route = {
            let mut inner = self.inner.lock();
            *inner.calls.entry(path.to_string()).or_default() += 1;
            inner.total_calls += 1;
            inner.routes.get(path).cloned()
        };
        let path = path.to_string();
        async move {
            let Some(route) = route else {
                return Err(FetchError::Status { status: 404, path });
            };
            if !route.delay.is_zero() {
                tokio::time::sleep(route.delay).await;
            }
            match route.reply {
                Reply::Json(value) => Ok(value),
                Reply::Status(status) => Err(FetchError::Status { status, path }),
            }
        }
        .boxed()
    }
}

impl Fetcher for MemoryFetcher {
    fn get(&self, path: &str) -> BoxFuture<'static, Result<Value, FetchError>> {
        self.request(path)
    }

    fn post(&self, path: &str) -> BoxFuture<'static, Result<Value, FetchError>> {
        self.request(path)
    }
}

#[cfg(test)]
mod tests {
    use super::MemoryFetcher;
    use crate::error::FetchError;
    use crate::fetcher::Fetcher;
    use serde_json::json;

    #[tokio::test]
    async fn serves_routes_and_counts_calls() {
        let f = MemoryFetcher::new();
        f.respond("/health", json!({"status": "healthy"}));
        assert_eq!(f.get("/health").await.unwrap()["status"], "healthy");
        assert_eq!(f.calls("/health"), 1);
    }

    #[tokio::test]
    async fn unknown_and_failing_routes_are_status_errors() {
        let f = MemoryFetcher::new();
        f.fail("/sources", 500);
        assert_eq!(
            f.get("/sources").await.unwrap_err(),
            FetchError::Status {
                status: 500,
                path: "/sources".into()
            }
        );
        assert!(f.get("/nowhere").await.unwrap_err().is_not_found());
        assert_eq!(f.total_calls(), 2);
    }

    #[tokio::test]
    async fn repeated_requests_are_counted_per_path() {
        let f = MemoryFetcher::new();
        f.respond("/health", json!({"status": "healthy"}));
        for _ in 0..1000 {
            let _ = f.get("/health").await;
        }
        let _ = f.get("/sources").await;
        assert_eq!(f.calls("/health"), 1000);
        assert_eq!(f.calls("/sources"), 1);
        assert_eq!(f.calls("/trends"), 0);
        assert_eq!(f.total_calls(), 1001);
        assert_eq!(f.requested_paths(), vec!["/health".to_string(), "/sources".to_string()]);
    }
}
