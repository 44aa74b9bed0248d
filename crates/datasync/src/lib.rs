//! Polled, cached subscriptions to the sentiment service.
//!
//! Feeds share one [`cache::Cache`]; each keeps its own poll loop and exposes
//! `{data, error, is_loading}` through [`resource::ResourceState`].

pub mod cache;
pub mod client;
pub mod endpoints;
pub mod error;
pub mod feeds;
pub mod fetcher;
pub mod memory;
pub mod protocol;
pub mod resource;

pub use client::{SyncClient, SyncSettings};
pub use error::FetchError;
pub use feeds::*;
pub use fetcher::{Fetcher, HttpFetcher};
pub use memory::MemoryFetcher;
pub use protocol::*;
pub use resource::ResourceState;
