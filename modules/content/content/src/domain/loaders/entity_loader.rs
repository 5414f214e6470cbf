//! Loader set for one entity kind.

use std::sync::Arc;

use content_sdk::{ContentError, ContentStore, Entity, Lookup, Stored};
use dataloader::{BatchLoader, Key, LoaderConfig};
use tokio::time::Instant;
use tracing::Span;

/// One [`BatchLoader`] per lookup path of `E`: by id plus one per natural key.
///
/// Every record resolved through any path primes every sibling path whose
/// key it determines, so a record reached by name is not fetched again by id.
pub struct EntityLoader<E: Entity> {
    by_id: BatchLoader<E, ContentError>,
    lookups: Vec<(Lookup, BatchLoader<E, ContentError>)>,
}

impl<E: Stored> EntityLoader<E> {
    #[must_use]
    pub fn new(store: &dyn ContentStore, config: &LoaderConfig, span: &Span) -> Self {
        let records = E::records(store);

        let by_id = BatchLoader::per_key(E::KIND.as_str(), config, span, {
            let records = Arc::clone(&records);
            move |key: Key| {
                let records = Arc::clone(&records);
                async move { records.get(key.as_str()).await }
            }
        });

        let lookups = E::LOOKUPS
            .iter()
            .map(|lookup| {
                let records = Arc::clone(&records);
                let name = lookup.name;
                let loader = BatchLoader::per_key(name, config, span, move |key: Key| {
                    let records = Arc::clone(&records);
                    async move {
                        let parts: Vec<String> = key.split().into_iter().map(str::to_owned).collect();
                        records.find(name, &parts).await
                    }
                });
                (*lookup, loader)
            })
            .collect();

        Self { by_id, lookups }
    }
}

impl<E: Entity> EntityLoader<E> {
    /// Load by id.
    ///
    /// # Errors
    ///
    /// Propagates the storage error cached for `id`, including `NotFound`.
    pub async fn get(&self, id: &str) -> Result<E, ContentError> {
        let record = self.by_id.load(Key::new(id)).await?;
        self.prime(&record);
        Ok(record)
    }

    /// Load several ids; results follow the order of `ids`.
    pub async fn get_many(&self, ids: &[&str]) -> Vec<Result<E, ContentError>> {
        let results = self
            .by_id
            .load_many(ids.iter().map(|id| Key::new(*id)))
            .await;
        for record in results.iter().flatten() {
            self.prime(record);
        }
        results
    }

    /// Load by the natural key named `lookup`.
    ///
    /// # Errors
    ///
    /// `Invalid` when `E` declares no such lookup; otherwise the cached
    /// storage error for the key.
    pub async fn get_by(&self, lookup: &str, parts: &[&str]) -> Result<E, ContentError> {
        let loader = self.lookup(lookup)?;
        let record = loader.load(Key::composite(parts)).await?;
        self.prime(&record);
        Ok(record)
    }

    /// Cache `record` under every key derivable from it. Keys already
    /// requested are left alone.
    pub fn prime(&self, record: &E) {
        self.by_id.prime(Key::new(record.id()), record.clone());
        for (lookup, loader) in &self.lookups {
            if let Some(parts) = record.lookup_key(lookup.name) {
                loader.prime(Key::composite(&parts), record.clone());
            }
        }
    }

    /// Evict every key derivable from `record`.
    pub fn clear(&self, record: &E) {
        self.by_id.clear(&Key::new(record.id()));
        for (lookup, loader) in &self.lookups {
            if let Some(parts) = record.lookup_key(lookup.name) {
                loader.clear(&Key::composite(&parts));
            }
        }
    }

    pub fn clear_all(&self) {
        self.by_id.clear_all();
        for (_, loader) in &self.lookups {
            loader.clear_all();
        }
    }

    pub fn set_deadline(&self, deadline: Option<Instant>) {
        self.by_id.set_deadline(deadline);
        for (_, loader) in &self.lookups {
            loader.set_deadline(deadline);
        }
    }

    /// Cached or pending keys across every path.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_id.len() + self.lookups.iter().map(|(_, l)| l.len()).sum::<usize>()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lookup(&self, name: &str) -> Result<&BatchLoader<E, ContentError>, ContentError> {
        self.lookups
            .iter()
            .find(|(lookup, _)| lookup.name == name)
            .map(|(_, loader)| loader)
            .ok_or_else(|| ContentError::invalid(format!("{} has no lookup '{name}'", E::KIND)))
    }
}
