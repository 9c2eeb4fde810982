//! Transport: fetch a published-CSV endpoint as text, with bounded retries.

pub mod http;
pub mod retry;

pub use http::HttpFetcher;
pub use retry::{RetryPolicy, Sleeper, TokioSleeper};

use crate::errors::FetchError;
use async_trait::async_trait;

/// Anything that can turn a URL into response text.
///
/// Loaders and resolvers only depend on this, so they can be driven by canned
/// text in tests and by [`HttpFetcher`] in production.
#[async_trait]
pub trait TextFetcher: Send + Sync {
    async fn fetch_text(&self, url: &str) -> Result<String, FetchError>;
}
