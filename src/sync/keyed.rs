//! Pollers that follow the selection.
//!
//! A keyed sync derives a key from each [`Selection`] (a hostname, or a
//! hostname and range). When the key changes the poller is restarted for the
//! new key; when it becomes `None` the poller is stopped. Events that leave
//! the key unchanged are ignored, so a range change does not restart the host
//! detail poller.

use std::fmt::Debug;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::info;

use super::{FetchError, PollState, Poller};
use crate::data::Selection;

/// A poller's state together with the key it was fetched for.
#[derive(Debug, Clone)]
pub struct KeyedView<K, T> {
    pub key: K,
    pub state: PollState<T>,
}

pub(crate) struct KeyedSync<K, T> {
    poller: Poller<T>,
    active: Arc<Mutex<Option<K>>>,
    watcher: JoinHandle<()>,
}

impl<K, T> KeyedSync<K, T>
where
    K: Clone + PartialEq + Debug + Send + Sync + 'static,
    T: Send + 'static,
{
    /// Spawn the selection watcher. Must be called within a tokio runtime.
    pub(crate) fn spawn<S, M, Fut>(
        name: &str,
        mut selections: watch::Receiver<Selection>,
        interval: Duration,
        key_of: S,
        fetch: M,
    ) -> Self
    where
        S: Fn(&Selection) -> Option<K> + Send + 'static,
        M: Fn(K) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<T, FetchError>> + Send + 'static,
    {
        let poller = Poller::new(name);
        let active = Arc::new(Mutex::new(None));
        let fetch = Arc::new(fetch);

        let watcher = {
            let poller = poller.clone();
            let active = active.clone();
            tokio::spawn(async move {
                loop {
                    let key = key_of(&selections.borrow_and_update());
                    reconcile(&poller, &active, key, &fetch, interval);

                    if selections.changed().await.is_err() {
                        break;
                    }
                }
                poller.stop();
            })
        };

        Self {
            poller,
            active,
            watcher,
        }
    }

    /// The key of the running generation, if any.
    pub(crate) fn active_key(&self) -> Option<K> {
        self.active.lock().clone()
    }

    pub(crate) fn refresh_now(&self) {
        self.poller.refresh_now();
    }

    pub(crate) fn is_running(&self) -> bool {
        self.poller.is_running()
    }
}

impl<K, T> KeyedSync<K, T>
where
    K: Clone + PartialEq + Debug + Send + Sync + 'static,
    T: Clone + Send + 'static,
{
    /// State of the active key, or `None` when nothing is selected.
    ///
    /// Key and state are read under the same lock that guards restarts, so the
    /// state always belongs to the returned key.
    pub(crate) fn view(&self) -> Option<KeyedView<K, T>> {
        let active = self.active.lock();
        let key = active.clone()?;
        Some(KeyedView {
            key,
            state: self.poller.state(),
        })
    }
}

impl<K, T> Drop for KeyedSync<K, T> {
    fn drop(&mut self) {
        self.watcher.abort();
        self.poller.stop();
    }
}

fn reconcile<K, T, M, Fut>(
    poller: &Poller<T>,
    active: &Mutex<Option<K>>,
    key: Option<K>,
    fetch: &Arc<M>,
    interval: Duration,
) where
    K: Clone + PartialEq + Debug + Send + Sync + 'static,
    T: Send + 'static,
    M: Fn(K) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<T, FetchError>> + Send + 'static,
{
    let mut active = active.lock();
    if *active == key {
        return;
    }

    match &key {
        Some(k) => {
            let fetch = fetch.clone();
            let k = k.clone();
            let generation = poller.start(move || fetch(k.clone()), interval);
            info!(poller = poller.name(), key = ?key, generation, "following new selection");
        }
        None => {
            poller.stop();
            info!(poller = poller.name(), "selection cleared, stopped");
        }
    }
    *active = key;
}
