//! Latest-sample polling for the selected host.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::warn;

use super::keyed::{KeyedSync, KeyedView};
use super::{FetchError, TelemetryApi};
use crate::data::{MetricSample, Selection};

/// Follows the selected hostname and polls `/latest/` for it.
///
/// Selecting a different host restarts polling and clears the previous host's
/// sample. Clearing the selection stops polling. Range changes are ignored.
pub struct HostDetailSync {
    inner: KeyedSync<String, MetricSample>,
}

impl HostDetailSync {
    /// Start following `selections`. Must be called within a tokio runtime.
    pub fn spawn(
        api: Arc<dyn TelemetryApi>,
        selections: watch::Receiver<Selection>,
        interval: Duration,
    ) -> Self {
        let inner = KeyedSync::spawn(
            "host-detail",
            selections,
            interval,
            |selection: &Selection| selection.hostname.clone(),
            move |hostname: String| {
                let api = api.clone();
                async move {
                    let sample = api.latest(&hostname).await?;
                    for anomaly in sample.anomalies() {
                        warn!(host = %hostname, %anomaly, "implausible sample");
                    }
                    Ok::<_, FetchError>(sample)
                }
            },
        );
        Self { inner }
    }

    /// The followed hostname and its poll state, or `None` with no selection.
    ///
    /// The watcher applies a new selection on its next scheduler turn, so
    /// right after `SelectionStore::select` this can still report the
    /// previous host. Label the data with `view.key`, not with
    /// `App::selected_hostname()`.
    pub fn view(&self) -> Option<KeyedView<String, MetricSample>> {
        self.inner.view()
    }

    pub fn hostname(&self) -> Option<String> {
        self.inner.active_key()
    }

    pub fn refresh_now(&self) {
        self.inner.refresh_now();
    }

    pub fn is_running(&self) -> bool {
        self.inner.is_running()
    }
}

impl std::fmt::Debug for HostDetailSync {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HostDetailSync")
            .field("hostname", &self.hostname())
            .finish()
    }
}
