//! HTTP client for fetching GPX documents.
//!
//! The only blocking step in the pipeline. Every request is bounded by the
//! configured timeout, and any network failure, timeout or non-success status
//! surfaces as [`GeometryError::Fetch`], separate from parse and analysis
//! errors. Nothing is retried here; retry policy belongs to the caller.

use futures::stream::{self, StreamExt};
use log::{debug, info, warn};
use reqwest::Client;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::{process_gpx_with_config, GeometryConfig, GeometryError, Result, RouteGeometryResult};

/// Progress callback type: `(completed, total)`
pub type ProgressCallback = Arc<dyn Fn(u32, u32) + Send + Sync>;

/// Outcome of fetching and processing one URL
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedRoute {
    pub url: String,
    pub result: Result<RouteGeometryResult>,
}

/// GPX fetcher with a per-request timeout
pub struct GpxFetcher {
    client: Client,
    /// Timeout the client was built with, when this fetcher built it.
    timeout: Option<Duration>,
    max_concurrency: usize,
}

impl GpxFetcher {
    /// Create a fetcher using the timeout and concurrency from `config`.
    pub fn new(config: &GeometryConfig) -> Result<Self> {
        let timeout = Duration::from_secs(config.fetch_timeout_secs);

        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(60))
            .tcp_keepalive(Duration::from_secs(30))
            .timeout(timeout)
            .build()
            .map_err(|e| GeometryError::Fetch(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            timeout: Some(timeout),
            ..Self::from_client(client, config)
        })
    }

    /// Wrap a preconfigured client.
    ///
    /// The client's own timeout applies to requests and `fetch_timeout_secs`
    /// is ignored; only `max_concurrent_fetches` is taken from `config`.
    pub fn from_client(client: Client, config: &GeometryConfig) -> Self {
        Self {
            client,
            timeout: None,
            max_concurrency: config.max_concurrent_fetches.max(1) as usize,
        }
    }

    /// Download the raw bytes of a GPX document.
    pub async fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        let start = Instant::now();

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| self.classify(url, e))?;

        let status = response.status();
        if !status.is_success() {
            warn!("[Fetch {}] HTTP {} after {:?}", url, status, start.elapsed());
            return Err(GeometryError::Fetch(format!("HTTP {} for {}", status, url)));
        }

        let headers_elapsed = start.elapsed();
        let bytes = response.bytes().await.map_err(|e| self.classify(url, e))?;

        debug!(
            "[Fetch {}] headers={:?} total={:?} ({:.1}KB)",
            url,
            headers_elapsed,
            start.elapsed(),
            bytes.len() as f64 / 1024.0
        );

        Ok(bytes.to_vec())
    }

    /// Fetch a GPX document and run the full geometry pipeline on it.
    pub async fn fetch_and_process(&self, url: &str, config: &GeometryConfig) -> Result<RouteGeometryResult> {
        let bytes = self.fetch(url).await?;
        process_gpx_with_config(&bytes, config)
    }

    /// Fetch and process many URLs with bounded concurrency.
    ///
    /// Results come back in input order; one failure does not affect the others.
    pub async fn fetch_and_process_many(
        &self,
        urls: Vec<String>,
        config: &GeometryConfig,
        on_progress: Option<ProgressCallback>,
    ) -> Vec<FetchedRoute> {
        let total = urls.len() as u32;
        let completed = Arc::new(AtomicU32::new(0));
        let start = Instant::now();

        info!(
            "[GpxFetcher] Starting fetch of {} documents (max concurrent: {})",
            total, self.max_concurrency
        );

        let results: Vec<FetchedRoute> = stream::iter(urls)
            .map(|url| {
                let completed = Arc::clone(&completed);
                let callback = on_progress.clone();

                async move {
                    let result = self.fetch_and_process(&url, config).await;

                    let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                    if let Some(ref cb) = callback {
                        cb(done, total);
                    }

                    FetchedRoute { url, result }
                }
            })
            .buffered(self.max_concurrency)
            .collect()
            .await;

        let failed = results.iter().filter(|r| r.result.is_err()).count();
        info!(
            "[GpxFetcher] DONE: {}/{} succeeded in {:.2}s",
            results.len() - failed,
            total,
            start.elapsed().as_secs_f64()
        );

        results
    }

    fn classify(&self, url: &str, err: reqwest::Error) -> GeometryError {
        let reason = if err.is_timeout() {
            match self.timeout {
                Some(timeout) => format!("timed out after {:?} fetching {}", timeout, url),
                None => format!("timed out fetching {}", url),
            }
        } else if err.is_connect() {
            format!("connection failed for {}: {}", url, err)
        } else {
            format!("request failed for {}: {}", url, err)
        };
        warn!("[GpxFetcher] {}", reason);
        GeometryError::Fetch(reason)
    }
}

/// Blocking fetch-and-process for hosts without an async runtime.
pub fn process_gpx_url_sync(url: &str, config: &GeometryConfig) -> Result<RouteGeometryResult> {
    use tokio::runtime::Builder;

    let rt = Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| GeometryError::Fetch(format!("failed to create runtime: {}", e)))?;

    let fetcher = GpxFetcher::new(config)?;
    rt.block_on(fetcher.fetch_and_process(url, config))
}
