//! Generic polling task with generation-tagged results.
//!
//! A [`Poller`] repeatedly runs a fetch on a fixed interval and publishes the
//! outcome as a [`PollState`]. Every `start()` and `stop()` bumps a generation
//! counter; a fetch that resolves after its generation was superseded is
//! dropped without touching the state. Comparison and write happen under the
//! same lock, so a stale result can never land after a restart.

use std::future::Future;
use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, warn};

use super::FetchError;

/// Shortest accepted polling interval; `start()` raises anything below it.
pub const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Latest published outcome of a poller.
#[derive(Debug, Clone)]
pub struct PollState<T> {
    /// Last successful result of the current generation.
    pub data: Option<T>,
    /// Message of the most recent failure, cleared by the next success.
    pub error: Option<String>,
    /// True until the first fetch of the current generation resolves.
    pub is_loading: bool,
    /// When `data` was last replaced.
    pub updated_at: Option<Instant>,
    /// Generation these values belong to.
    pub generation: u64,
}

impl<T> Default for PollState<T> {
    fn default() -> Self {
        Self {
            data: None,
            error: None,
            is_loading: false,
            updated_at: None,
            generation: 0,
        }
    }
}

struct Shared<T> {
    generation: u64,
    state: PollState<T>,
    task: Option<JoinHandle<()>>,
    wake: Arc<Notify>,
}

impl<T> Drop for Shared<T> {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Handle to a repeating fetch task.
///
/// Clones share the same task and state. The task is aborted when the poller
/// is stopped, restarted, or when the last clone is dropped.
///
/// `start()` spawns onto the current tokio runtime and must be called from
/// within one.
pub struct Poller<T> {
    name: Arc<str>,
    shared: Arc<Mutex<Shared<T>>>,
}

impl<T> Clone for Poller<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            shared: self.shared.clone(),
        }
    }
}

impl<T> std::fmt::Debug for Poller<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let shared = self.shared.lock();
        f.debug_struct("Poller")
            .field("name", &self.name)
            .field("generation", &shared.generation)
            .field("running", &shared.task.is_some())
            .finish()
    }
}

impl<T: Send + 'static> Poller<T> {
    /// Start polling `fetch` every `interval`, superseding any previous run.
    ///
    /// The first fetch runs immediately. State from the previous generation
    /// is cleared so nothing fetched for old parameters stays visible. Fetches
    /// of one generation never overlap; a slow fetch delays the next tick.
    ///
    /// An `interval` below [`MIN_INTERVAL`] is raised to it.
    ///
    /// Returns the new generation.
    pub fn start<F, Fut>(&self, fetch: F, interval: Duration) -> u64
    where
        F: Fn() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, FetchError>> + Send + 'static,
    {
        let interval = if interval < MIN_INTERVAL {
            warn!(poller = %self.name, ?interval, "interval too short, using {:?}", MIN_INTERVAL);
            MIN_INTERVAL
        } else {
            interval
        };

        let mut shared = self.shared.lock();
        shared.generation += 1;
        let generation = shared.generation;

        if let Some(task) = shared.task.take() {
            task.abort();
        }

        shared.state = PollState {
            data: None,
            error: None,
            is_loading: true,
            updated_at: None,
            generation,
        };

        let wake = Arc::new(Notify::new());
        shared.wake = wake.clone();

        let weak = Arc::downgrade(&self.shared);
        let name = self.name.clone();
        debug!(poller = %name, generation, ?interval, "starting");

        shared.task = Some(tokio::spawn(async move {
            let mut ticker = time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {}
                    _ = wake.notified() => ticker.reset(),
                }

                let result = fetch().await;
                if !apply(&weak, &name, generation, result) {
                    break;
                }
            }
        }));

        generation
    }
}

impl<T> Poller<T> {
    /// Create an idle poller. `name` is used in log output.
    pub fn new(name: &str) -> Self {
        Self {
            name: Arc::from(name),
            shared: Arc::new(Mutex::new(Shared {
                generation: 0,
                state: PollState::default(),
                task: None,
                wake: Arc::new(Notify::new()),
            })),
        }
    }

    /// Stop polling. Results still in flight for this generation are discarded.
    pub fn stop(&self) {
        let mut shared = self.shared.lock();
        if let Some(task) = shared.task.take() {
            task.abort();
            shared.generation += 1;
            shared.state.is_loading = false;
            debug!(poller = %self.name, generation = shared.generation, "stopped");
        }
    }

    /// Trigger an immediate fetch in the current generation.
    pub fn refresh_now(&self) {
        self.shared.lock().wake.notify_one();
    }

    /// Whether a polling task is active.
    pub fn is_running(&self) -> bool {
        self.shared.lock().task.is_some()
    }

    /// The current generation number.
    pub fn generation(&self) -> u64 {
        self.shared.lock().generation
    }

    /// Run `f` against the current state without cloning it.
    pub fn with_state<R>(&self, f: impl FnOnce(&PollState<T>) -> R) -> R {
        f(&self.shared.lock().state)
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl<T: Clone + Send + 'static> Poller<T> {
    /// A copy of the current state.
    pub fn state(&self) -> PollState<T> {
        self.shared.lock().state.clone()
    }
}

/// Publish a fetch result if its generation is still current.
///
/// Returns false when the poller is gone or the generation was superseded,
/// which ends the task that produced the result.
fn apply<T>(
    shared: &Weak<Mutex<Shared<T>>>,
    name: &str,
    generation: u64,
    result: Result<T, FetchError>,
) -> bool {
    let Some(shared) = shared.upgrade() else {
        return false;
    };
    let mut shared = shared.lock();

    if shared.generation != generation {
        debug!(
            poller = name,
            generation,
            current = shared.generation,
            "discarding stale result"
        );
        return false;
    }

    let state = &mut shared.state;
    state.is_loading = false;
    match result {
        Ok(data) => {
            state.data = Some(data);
            state.error = None;
            state.updated_at = Some(Instant::now());
        }
        Err(err) => {
            warn!(poller = name, generation, error = %err, "fetch failed");
            state.error = Some(err.to_string());
        }
    }
    true
}
