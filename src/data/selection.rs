//! Host selection and history range, published to the syncs that depend on them.

use tokio::sync::watch;
use tracing::debug;

/// Look-back window for history queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TimeRange {
    OneHour,
    SixHours,
    #[default]
    Day,
    Week,
}

impl TimeRange {
    pub const ALL: [TimeRange; 4] = [
        TimeRange::OneHour,
        TimeRange::SixHours,
        TimeRange::Day,
        TimeRange::Week,
    ];

    /// Window length in hours, as sent to the history endpoint.
    pub fn hours(self) -> u32 {
        match self {
            TimeRange::OneHour => 1,
            TimeRange::SixHours => 6,
            TimeRange::Day => 24,
            TimeRange::Week => 168,
        }
    }

    /// Parse one of the supported hour counts.
    pub fn from_hours(hours: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.hours() == hours)
    }

    /// Cycle to the next longer range.
    pub fn next(self) -> Self {
        match self {
            TimeRange::OneHour => TimeRange::SixHours,
            TimeRange::SixHours => TimeRange::Day,
            TimeRange::Day => TimeRange::Week,
            TimeRange::Week => TimeRange::OneHour,
        }
    }

    /// Cycle to the next shorter range.
    pub fn prev(self) -> Self {
        match self {
            TimeRange::OneHour => TimeRange::Week,
            TimeRange::SixHours => TimeRange::OneHour,
            TimeRange::Day => TimeRange::SixHours,
            TimeRange::Week => TimeRange::Day,
        }
    }

    /// Returns the display label for this range.
    pub fn label(&self) -> &'static str {
        match self {
            TimeRange::OneHour => "Last Hour",
            TimeRange::SixHours => "Last 6 Hours",
            TimeRange::Day => "Last 24 Hours",
            TimeRange::Week => "Last Week",
        }
    }
}

/// The focused host (if any) and the requested history range.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Selection {
    pub hostname: Option<String>,
    pub range: TimeRange,
}

/// Single owner of [`Selection`].
///
/// Every change is applied synchronously and published on a watch channel;
/// the host detail and history syncs subscribe and restart when the part of
/// the selection they depend on changes.
///
/// # Example
///
/// ```
/// use fleetwatch::{SelectionStore, TimeRange};
///
/// let store = SelectionStore::new(TimeRange::default());
/// store.select("web-01");
/// assert_eq!(store.current().hostname.as_deref(), Some("web-01"));
///
/// // Selecting the same host again clears the selection.
/// store.select("web-01");
/// assert_eq!(store.current().hostname, None);
/// ```
#[derive(Debug)]
pub struct SelectionStore {
    sender: watch::Sender<Selection>,
}

impl Default for SelectionStore {
    fn default() -> Self {
        Self::new(TimeRange::default())
    }
}

impl SelectionStore {
    /// Create a store with nothing selected.
    pub fn new(range: TimeRange) -> Self {
        let (sender, _) = watch::channel(Selection {
            hostname: None,
            range,
        });
        Self { sender }
    }

    /// Toggle-select a host: selecting the current host clears the selection.
    pub fn select(&self, hostname: &str) {
        self.sender.send_modify(|sel| {
            if sel.hostname.as_deref() == Some(hostname) {
                sel.hostname = None;
            } else {
                sel.hostname = Some(hostname.to_string());
            }
            debug!(hostname = ?sel.hostname, "selection changed");
        });
    }

    /// Clear the selection.
    pub fn clear(&self) {
        self.sender.send_if_modified(|sel| sel.hostname.take().is_some());
    }

    /// Replace the history range.
    pub fn set_time_range(&self, range: TimeRange) {
        self.sender.send_if_modified(|sel| {
            let changed = sel.range != range;
            sel.range = range;
            changed
        });
    }

    /// Switch to the next longer range (wrapping).
    pub fn next_range(&self) {
        self.set_time_range(self.current().range.next());
    }

    /// Switch to the next shorter range (wrapping).
    pub fn prev_range(&self) {
        self.set_time_range(self.current().range.prev());
    }

    /// The current selection.
    pub fn current(&self) -> Selection {
        self.sender.borrow().clone()
    }

    /// The selected host, if any.
    pub fn hostname(&self) -> Option<String> {
        self.sender.borrow().hostname.clone()
    }

    /// Subscribe to selection changes. The receiver starts at the current value.
    pub fn subscribe(&self) -> watch::Receiver<Selection> {
        self.sender.subscribe()
    }
}
