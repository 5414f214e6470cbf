//! Caller-supplied batch fetch functions.

use std::future::Future;

use async_trait::async_trait;
use tokio::task::JoinSet;
use tracing::warn;

use crate::error::LoaderError;
use crate::key::Key;

/// Fetches the values for one batch window.
///
/// Implementations must return exactly one result per key, in key order.
/// Missing trailing results are reported to their waiters as
/// [`LoaderError::MissingResult`]; an error for one key never affects the
/// other keys of the batch.
#[async_trait]
pub trait BatchFn<V, E>: Send + Sync + 'static
where
    V: Send + 'static,
    E: Send + 'static,
{
    async fn load(&self, keys: &[Key]) -> Vec<Result<V, E>>;
}

/// Adapts a per-key async fetch into a [`BatchFn`].
///
/// Every key of the batch becomes its own tokio task; the batch call joins
/// all of them before returning. Dropping the batch future aborts the
/// tasks still in flight.
pub struct PerKey<F> {
    loader: &'static str,
    fetch: F,
}

impl<F> PerKey<F> {
    #[must_use]
    pub fn new(loader: &'static str, fetch: F) -> Self {
        Self { loader, fetch }
    }
}

#[async_trait]
impl<V, E, F, Fut> BatchFn<V, E> for PerKey<F>
where
    V: Send + 'static,
    E: From<LoaderError> + Send + 'static,
    F: Fn(Key) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<V, E>> + Send + 'static,
{
    async fn load(&self, keys: &[Key]) -> Vec<Result<V, E>> {
        let mut tasks = JoinSet::new();
        for (idx, key) in keys.iter().enumerate() {
            let unit = (self.fetch)(key.clone());
            tasks.spawn(async move { (idx, unit.await) });
        }

        let mut slots: Vec<Option<Result<V, E>>> =
            std::iter::repeat_with(|| None).take(keys.len()).collect();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((idx, result)) => {
                    if let Some(slot) = slots.get_mut(idx) {
                        *slot = Some(result);
                    }
                }
                Err(err) => {
                    warn!(loader = self.loader, error = %err, "per-key fetch task failed");
                }
            }
        }

        slots
            .into_iter()
            .zip(keys)
            .map(|(slot, key)| {
                slot.unwrap_or_else(|| {
                    Err(E::from(LoaderError::FetchPanicked {
                        loader: self.loader,
                        key: key.to_string(),
                    }))
                })
            })
            .collect()
    }
}
