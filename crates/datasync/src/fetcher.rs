use std::time::Duration;

use futures_util::FutureExt;
use futures_util::future::BoxFuture;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use crate::error::FetchError;

/// Source of JSON documents addressed by path.
///
/// Returned futures are `'static` so they can be shared between deduplicated
/// awaiters.
pub trait Fetcher: Send + Sync {
    fn get(&self, path: &str) -> BoxFuture<'static, Result<Value, FetchError>>;
    fn post(&self, path: &str) -> BoxFuture<'static, Result<Value, FetchError>>;
}

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Fetches over HTTP(S). Any non-2xx response is an error.
#[derive(Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    base_url: String,
}

impl HttpFetcher {
    pub fn new(base_url: impl Into<String>) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| FetchError::Transport(e.to_string()))?;
        Ok(Self::with_client(client, base_url))
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Fetcher for HttpFetcher {
    fn get(&self, path: &str) -> BoxFuture<'static, Result<Value, FetchError>> {
        let request = self.client.get(self.url(path));
        send(request, path.to_string()).boxed()
    }

    fn post(&self, path: &str) -> BoxFuture<'static, Result<Value, FetchError>> {
        let request = self.client.post(self.url(path));
        send(request, path.to_string()).boxed()
    }
}

async fn send(request: reqwest::RequestBuilder, path: String) -> Result<Value, FetchError> {
    debug!(%path, "request");
    let response = request
        .send()
        .await
        .map_err(|e| FetchError::Transport(e.to_string()))?;
    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            status: status.as_u16(),
            path,
        });
    }
    response.json::<Value>().await.map_err(|e| FetchError::Decode {
        path,
        message: e.to_string(),
    })
}

/// Decodes a fetched document, attributing failures to `path`.
pub fn decode<T: DeserializeOwned>(path: &str, value: Value) -> Result<T, FetchError> {
    serde_json::from_value(value).map_err(|e| FetchError::Decode {
        path: path.to_string(),
        message: e.to_string(),
    })
}
