//! History polling for the selected host and range.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, warn};

use super::keyed::{KeyedSync, KeyedView};
use super::{FetchError, TelemetryApi};
use crate::data::{ChartSeries, Selection, TimeRange};

/// Follows the (hostname, range) pair and polls the history endpoint.
///
/// Responses are reshaped into a [`ChartSeries`] before they are published,
/// so readers never see the newest-first wire order.
pub struct HistorySync {
    inner: KeyedSync<(String, TimeRange), ChartSeries>,
}

impl HistorySync {
    /// Start following `selections`. Must be called within a tokio runtime.
    pub fn spawn(
        api: Arc<dyn TelemetryApi>,
        selections: watch::Receiver<Selection>,
        interval: Duration,
    ) -> Self {
        let inner = KeyedSync::spawn(
            "history",
            selections,
            interval,
            |selection: &Selection| {
                selection
                    .hostname
                    .clone()
                    .map(|hostname| (hostname, selection.range))
            },
            move |(hostname, range): (String, TimeRange)| {
                let api = api.clone();
                async move {
                    let response = api.history(&hostname, range).await?;
                    let flagged = response
                        .metrics
                        .iter()
                        .filter(|sample| !sample.anomalies().is_empty())
                        .count();
                    if flagged > 0 {
                        warn!(host = %hostname, flagged, "history contains implausible samples");
                    }

                    let series = ChartSeries::from_samples(&response.metrics);
                    debug!(host = %hostname, range = range.label(), points = series.len(), "history loaded");
                    Ok::<_, FetchError>(series)
                }
            },
        );
        Self { inner }
    }

    /// The followed host and range with their poll state, or `None` with no
    /// selection. May lag the store by one scheduler turn; `view.key` names
    /// the data.
    pub fn view(&self) -> Option<KeyedView<(String, TimeRange), ChartSeries>> {
        self.inner.view()
    }

    pub fn key(&self) -> Option<(String, TimeRange)> {
        self.inner.active_key()
    }

    pub fn refresh_now(&self) {
        self.inner.refresh_now();
    }

    pub fn is_running(&self) -> bool {
        self.inner.is_running()
    }
}

impl std::fmt::Debug for HistorySync {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HistorySync")
            .field("key", &self.key())
            .finish()
    }
}
