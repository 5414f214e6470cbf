//! Deduplicating, caching batch loader.
//!
//! Each key moves through `unrequested -> pending -> resolved`. The first
//! key registered in an empty window spawns a dispatcher task; when it runs
//! it takes every pending key of the window and hands them to the
//! [`BatchFn`] in chunks of at most [`LoaderConfig::max_batch_size`].
//! Resolved results (values and errors) stay cached until cleared.

use std::collections::HashMap;
use std::collections::hash_map::Entry as MapEntry;
use std::future::Future;
use std::sync::Arc;

use futures::future::join_all;
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{Span, debug, trace, warn};

use crate::batch_fn::{BatchFn, PerKey};
use crate::config::LoaderConfig;
use crate::error::LoaderError;
use crate::key::Key;

type Slot<V, E> = Option<Result<V, E>>;

enum Entry<V, E> {
    Pending { id: u64, rx: watch::Receiver<Slot<V, E>> },
    Resolved(Result<V, E>),
}

/// A key registered in the current batch window. The window is the only
/// owner of the sender, so a dispatcher that dies closes the channel.
struct Waiting<V, E> {
    key: Key,
    id: u64,
    tx: watch::Sender<Slot<V, E>>,
}

struct State<V, E> {
    entries: HashMap<Key, Entry<V, E>>,
    window: Vec<Waiting<V, E>>,
    next_id: u64,
    deadline: Option<Instant>,
}

struct Inner<V, E> {
    name: &'static str,
    config: LoaderConfig,
    fetch: Box<dyn BatchFn<V, E>>,
    span: Span,
    state: Mutex<State<V, E>>,
}

/// Request-scoped batching loader.
///
/// Cloning is cheap; clones share one cache. A loader must never outlive
/// the request it was created for.
pub struct BatchLoader<V, E> {
    inner: Arc<Inner<V, E>>,
}

impl<V, E> Clone for BatchLoader<V, E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V, E> std::fmt::Debug for BatchLoader<V, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchLoader")
            .field("name", &self.inner.name)
            .field("config", &self.inner.config)
            .finish_non_exhaustive()
    }
}

impl<V, E> BatchLoader<V, E>
where
    V: Clone + Send + Sync + 'static,
    E: Clone + From<LoaderError> + Send + Sync + 'static,
{
    /// Create a loader around a batch fetch function.
    ///
    /// Log output is emitted inside `parent`.
    #[must_use]
    pub fn new(
        name: &'static str,
        config: &LoaderConfig,
        parent: &Span,
        fetch: impl BatchFn<V, E>,
    ) -> Self {
        Self {
            inner: Arc::new(Inner {
                name,
                config: config.clone(),
                fetch: Box::new(fetch),
                span: parent.clone(),
                state: Mutex::new(State {
                    entries: HashMap::new(),
                    window: Vec::new(),
                    next_id: 0,
                    deadline: None,
                }),
            }),
        }
    }

    /// Create a loader whose batch call runs `fetch` once per key, concurrently.
    #[must_use]
    pub fn per_key<F, Fut>(
        name: &'static str,
        config: &LoaderConfig,
        parent: &Span,
        fetch: F,
    ) -> Self
    where
        F: Fn(Key) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<V, E>> + Send + 'static,
    {
        Self::new(name, config, parent, PerKey::new(name, fetch))
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.inner.name
    }

    /// Bound every subsequent batch fetch by `deadline`.
    pub fn set_deadline(&self, deadline: Option<Instant>) {
        self.inner.state.lock().deadline = deadline;
    }

    /// Load one key.
    ///
    /// Resolved keys are answered from the cache; a key already pending
    /// shares the in-flight fetch.
    ///
    /// # Errors
    ///
    /// Returns the fetch error cached for `key`, or a [`LoaderError`]
    /// converted into `E` when the loader could not produce a result.
    pub async fn load(&self, key: Key) -> Result<V, E> {
        let (id, rx, leader) = {
            let mut state = self.inner.state.lock();
            match state.entries.get(&key) {
                Some(Entry::Resolved(result)) => {
                    trace!(parent: &self.inner.span, loader = self.inner.name, %key, "cache hit");
                    return result.clone();
                }
                Some(Entry::Pending { id, rx }) => (*id, rx.clone(), false),
                None => {
                    state.next_id += 1;
                    let id = state.next_id;
                    let (tx, rx) = watch::channel(None);
                    state.entries.insert(
                        key.clone(),
                        Entry::Pending {
                            id,
                            rx: rx.clone(),
                        },
                    );
                    state.window.push(Waiting {
                        key: key.clone(),
                        id,
                        tx,
                    });
                    (id, rx, state.window.len() == 1)
                }
            }
        };

        if leader {
            tokio::spawn(Arc::clone(&self.inner).dispatch());
        }

        self.inner.wait(&key, id, rx).await
    }

    /// Load several keys; results follow the order of `keys`.
    pub async fn load_many<I>(&self, keys: I) -> Vec<Result<V, E>>
    where
        I: IntoIterator<Item = Key>,
    {
        join_all(keys.into_iter().map(|key| self.load(key))).await
    }

    /// Cache `value` under `key` unless the key was already requested.
    ///
    /// Returns `true` when the value was inserted.
    pub fn prime(&self, key: Key, value: V) -> bool {
        let mut state = self.inner.state.lock();
        match state.entries.entry(key) {
            MapEntry::Vacant(slot) => {
                slot.insert(Entry::Resolved(Ok(value)));
                true
            }
            MapEntry::Occupied(_) => false,
        }
    }

    /// Evict one key. Callers already waiting on it still receive its result.
    pub fn clear(&self, key: &Key) {
        self.inner.state.lock().entries.remove(key);
    }

    /// Evict every key.
    pub fn clear_all(&self) {
        let mut state = self.inner.state.lock();
        let evicted = state.entries.len();
        state.entries.clear();
        debug!(parent: &self.inner.span, loader = self.inner.name, evicted, "cache cleared");
    }

    /// Number of cached or pending keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.state.lock().entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<V, E> Inner<V, E>
where
    V: Clone + Send + Sync + 'static,
    E: Clone + From<LoaderError> + Send + Sync + 'static,
{
    async fn dispatch(self: Arc<Self>) {
        let delay = self.config.batch_delay();
        if delay.is_zero() {
            tokio::task::yield_now().await;
        } else {
            tokio::time::sleep(delay).await;
        }

        let (window, deadline) = {
            let mut state = self.state.lock();
            (std::mem::take(&mut state.window), state.deadline)
        };
        if window.is_empty() {
            return;
        }

        debug!(parent: &self.span, loader = self.name, keys = window.len(), "dispatching batch");
        let chunks = window
            .chunks(self.config.chunk_size())
            .map(|chunk| self.run_chunk(chunk, deadline));
        join_all(chunks).await;
    }

    async fn run_chunk(&self, chunk: &[Waiting<V, E>], deadline: Option<Instant>) {
        let keys: Vec<Key> = chunk.iter().map(|w| w.key.clone()).collect();

        let fetched = match deadline {
            Some(at) => {
                if let Ok(results) = tokio::time::timeout_at(at, self.fetch.load(&keys)).await {
                    results
                } else {
                    warn!(parent: &self.span, loader = self.name, keys = keys.len(), "batch fetch hit the request deadline");
                    keys.iter()
                        .map(|_| Err(E::from(LoaderError::DeadlineExceeded { loader: self.name })))
                        .collect()
                }
            }
            None => self.fetch.load(&keys).await,
        };

        let mut results = fetched.into_iter();
        for waiting in chunk {
            let result = results.next().unwrap_or_else(|| {
                Err(E::from(LoaderError::MissingResult {
                    loader: self.name,
                    key: waiting.key.to_string(),
                }))
            });
            self.resolve(waiting, result);
        }
    }

    fn resolve(&self, waiting: &Waiting<V, E>, result: Result<V, E>) {
        {
            let mut state = self.state.lock();
            let still_pending = matches!(
                state.entries.get(&waiting.key),
                Some(Entry::Pending { id, .. }) if *id == waiting.id
            );
            if still_pending {
                state
                    .entries
                    .insert(waiting.key.clone(), Entry::Resolved(result.clone()));
            }
        }
        waiting.tx.send_replace(Some(result));
    }

    async fn wait(&self, key: &Key, id: u64, mut rx: watch::Receiver<Slot<V, E>>) -> Result<V, E> {
        let delivered = match rx.wait_for(Option::is_some).await {
            Ok(slot) => (*slot).clone(),
            Err(_) => None,
        };

        if let Some(result) = delivered {
            return result;
        }

        self.forget(key, id);
        Err(E::from(LoaderError::Cancelled {
            loader: self.name,
            key: key.to_string(),
        }))
    }

    /// Drop a pending entry whose dispatcher went away so the key can be retried.
    fn forget(&self, key: &Key, id: u64) {
        let mut state = self.state.lock();
        if matches!(state.entries.get(key), Some(Entry::Pending { id: current, .. }) if *current == id)
        {
            state.entries.remove(key);
        }
    }
}
