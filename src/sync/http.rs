//! HTTP backend for the telemetry API.
//!
//! Talks to the read-only JSON endpoints exposed under the API base URL:
//!
//! - `GET {base}/dashboard/`
//! - `GET {base}/latest/?hostname=<name>`
//! - `GET {base}/hosts/<name>/history/?hours=<n>`
//!
//! ## Example
//!
//! ```rust,no_run
//! use fleetwatch::sync::{HttpApi, TelemetryApi};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let api = HttpApi::builder()
//!         .base_url("http://monitor.local:8000/api")
//!         .build()?;
//!
//!     let snapshot = api.dashboard().await?;
//!     for host in &snapshot.hosts {
//!         println!("{}: online={}", host.hostname, host.is_online);
//!     }
//!
//!     Ok(())
//! }
//! ```

use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;
use tracing::trace;

use super::{FetchError, Target, TelemetryApi};
use crate::data::{DashboardSnapshot, HistoryResponse, MetricSample, TimeRange};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/api";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// [`TelemetryApi`] over HTTP.
#[derive(Debug, Clone)]
pub struct HttpApi {
    client: Client,
    base: Url,
    description: String,
}

impl HttpApi {
    /// Create a new builder for configuring the client.
    pub fn builder() -> HttpApiBuilder {
        HttpApiBuilder::default()
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Build the URL for `segments` below the base path, with a trailing slash.
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        // The base is checked in `build()` to be a hierarchical http(s) URL.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments).push("");
        }
        url
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        target: Target,
        url: Url,
        query: &[(&str, String)],
    ) -> Result<T, FetchError> {
        trace!(%url, ?query, "GET");

        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(target.clone(), e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                target,
                status: status.as_u16(),
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::from_reqwest(target.clone(), e))?;

        serde_json::from_slice(&body).map_err(|e| FetchError::Decode {
            target,
            message: e.to_string(),
        })
    }
}

#[async_trait]
impl TelemetryApi for HttpApi {
    async fn dashboard(&self) -> Result<DashboardSnapshot, FetchError> {
        self.get_json(Target::Dashboard, self.url(&["dashboard"]), &[])
            .await
    }

    async fn latest(&self, hostname: &str) -> Result<MetricSample, FetchError> {
        let target = Target::Latest {
            hostname: hostname.to_string(),
        };
        self.get_json(
            target,
            self.url(&["latest"]),
            &[("hostname", hostname.to_string())],
        )
        .await
    }

    async fn history(
        &self,
        hostname: &str,
        range: TimeRange,
    ) -> Result<HistoryResponse, FetchError> {
        let target = Target::History {
            hostname: hostname.to_string(),
            range,
        };
        self.get_json(
            target,
            self.url(&["hosts", hostname, "history"]),
            &[("hours", range.hours().to_string())],
        )
        .await
    }

    fn description(&self) -> &str {
        &self.description
    }
}

/// Builder for [`HttpApi`].
#[derive(Debug, Default)]
pub struct HttpApiBuilder {
    base_url: Option<String>,
    timeout: Option<Duration>,
}

impl HttpApiBuilder {
    /// Set the API base URL (default: "http://localhost:8000/api").
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Set the request timeout (default: 10 seconds).
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Build the client.
    pub fn build(self) -> Result<HttpApi> {
        let raw = self
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let base = Url::parse(&raw).with_context(|| format!("Invalid API URL '{}'", raw))?;
        if !matches!(base.scheme(), "http" | "https") || base.cannot_be_a_base() {
            bail!("Invalid API URL '{}': expected an http(s) URL", raw);
        }

        let client = Client::builder()
            .timeout(self.timeout.unwrap_or(DEFAULT_TIMEOUT))
            .build()
            .context("Failed to build HTTP client")?;

        Ok(HttpApi {
            client,
            description: format!("API: {}", base),
            base,
        })
    }
}
