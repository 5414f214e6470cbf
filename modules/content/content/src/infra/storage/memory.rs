//! `BTreeMap`-backed record tables.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use content_sdk::models::{
    Appled, Comment, Course, CourseLesson, Email, Enrolled, Label, Labeled, Lesson, Notification,
    Study, Topic, User, UserAsset,
};
use content_sdk::{ContentError, ContentStore, Entity, ListFilter, RecordStore};
use parking_lot::RwLock;
use tracing::trace;
use uuid::Uuid;

/// Storage calls served by one table, by method.
#[derive(Debug, Default)]
pub struct CallCounts {
    gets: AtomicUsize,
    finds: AtomicUsize,
    lists: AtomicUsize,
    creates: AtomicUsize,
    updates: AtomicUsize,
    deletes: AtomicUsize,
}

impl CallCounts {
    #[must_use]
    pub fn gets(&self) -> usize {
        self.gets.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn finds(&self) -> usize {
        self.finds.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn lists(&self) -> usize {
        self.lists.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn creates(&self) -> usize {
        self.creates.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn updates(&self) -> usize {
        self.updates.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn deletes(&self) -> usize {
        self.deletes.load(Ordering::Relaxed)
    }

    /// Create, update and delete calls.
    #[must_use]
    pub fn writes(&self) -> usize {
        self.creates() + self.updates() + self.deletes()
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.gets() + self.finds() + self.lists() + self.writes()
    }

    fn bump(counter: &AtomicUsize) {
        counter.fetch_add(1, Ordering::Relaxed);
    }
}

/// One kind's records, keyed by id.
#[derive(Debug, Default)]
pub struct MemoryTable<E> {
    rows: RwLock<BTreeMap<String, E>>,
    calls: CallCounts,
    latency: RwLock<Option<Duration>>,
}

impl<E: Entity> MemoryTable<E> {
    /// Seed a row without counting a storage call.
    pub fn insert(&self, record: E) {
        self.rows.write().insert(record.id().to_owned(), record);
    }

    /// Current row, read without counting a storage call.
    #[must_use]
    pub fn row(&self, id: &str) -> Option<E> {
        self.rows.read().get(id).cloned()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.read().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.read().is_empty()
    }

    #[must_use]
    pub fn calls(&self) -> &CallCounts {
        &self.calls
    }

    /// Delay every later read by `latency`.
    pub fn set_latency(&self, latency: Option<Duration>) {
        *self.latency.write() = latency;
    }

    async fn delay(&self) {
        let latency = *self.latency.read();
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }
    }

    fn matches(record: &E, filter: &ListFilter) -> bool {
        match filter {
            ListFilter::All => true,
            ListFilter::Eq { field, value } => {
                record.field_text(field).is_some_and(|text| text == *value)
            }
            ListFilter::Search { query } => {
                let query = query.to_lowercase();
                E::FIELDS.iter().any(|field| {
                    record
                        .field_text(field)
                        .is_some_and(|text| text.to_lowercase().contains(&query))
                })
            }
        }
    }
}

#[async_trait]
impl<E: Entity> RecordStore<E> for MemoryTable<E> {
    async fn get(&self, id: &str) -> Result<E, ContentError> {
        CallCounts::bump(&self.calls.gets);
        self.delay().await;
        trace!(kind = E::KIND.as_str(), id, "memory get");

        self.row(id)
            .ok_or_else(|| ContentError::not_found(format!("{} {id}", E::KIND)))
    }

    async fn find(&self, lookup: &str, parts: &[String]) -> Result<E, ContentError> {
        CallCounts::bump(&self.calls.finds);
        self.delay().await;
        trace!(kind = E::KIND.as_str(), lookup, "memory find");

        self.rows
            .read()
            .values()
            .find(|record| record.lookup_key(lookup).as_deref() == Some(parts))
            .cloned()
            .ok_or_else(|| {
                ContentError::not_found(format!("{} {lookup} {}", E::KIND, parts.join(":")))
            })
    }

    async fn list(&self, filter: &ListFilter) -> Result<Vec<E>, ContentError> {
        CallCounts::bump(&self.calls.lists);
        self.delay().await;

        Ok(self
            .rows
            .read()
            .values()
            .filter(|record| Self::matches(record, filter))
            .cloned()
            .collect())
    }

    async fn create(&self, mut record: E) -> Result<E, ContentError> {
        CallCounts::bump(&self.calls.creates);

        if record.id().is_empty() {
            record.set_id(Uuid::new_v4().to_string());
        }
        let mut rows = self.rows.write();
        if rows.contains_key(record.id()) {
            return Err(ContentError::invalid(format!(
                "{} {} already exists",
                E::KIND,
                record.id()
            )));
        }
        rows.insert(record.id().to_owned(), record.clone());
        Ok(record)
    }

    async fn update(&self, patch: E) -> Result<E, ContentError> {
        CallCounts::bump(&self.calls.updates);

        let mut rows = self.rows.write();
        let row = rows
            .get_mut(patch.id())
            .ok_or_else(|| ContentError::not_found(format!("{} {}", E::KIND, patch.id())))?;
        row.merge(&patch);
        Ok(row.clone())
    }

    async fn delete(&self, id: &str) -> Result<E, ContentError> {
        CallCounts::bump(&self.calls.deletes);

        self.rows
            .write()
            .remove(id)
            .ok_or_else(|| ContentError::not_found(format!("{} {id}", E::KIND)))
    }
}

macro_rules! memory_store {
    ($($field:ident: $model:ty => $accessor:ident),* $(,)?) => {
        /// A [`ContentStore`] holding every kind in memory.
        #[derive(Debug, Default)]
        pub struct MemoryStore {
            $($field: Arc<MemoryTable<$model>>,)*
        }

        impl MemoryStore {
            $(
                #[must_use]
                pub fn $field(&self) -> &MemoryTable<$model> {
                    &self.$field
                }
            )*
        }

        impl ContentStore for MemoryStore {
            $(
                fn $accessor(&self) -> Arc<dyn RecordStore<$model>> {
                    Arc::clone(&self.$field) as Arc<dyn RecordStore<$model>>
                }
            )*
        }
    };
}

memory_store! {
    user_table: User => users,
    email_table: Email => emails,
    study_table: Study => studies,
    lesson_table: Lesson => lessons,
    course_table: Course => courses,
    course_lesson_table: CourseLesson => course_lessons,
    comment_table: Comment => comments,
    label_table: Label => labels,
    labeled_table: Labeled => labeleds,
    topic_table: Topic => topics,
    user_asset_table: UserAsset => user_assets,
    enrolled_table: Enrolled => enrolleds,
    appled_table: Appled => appleds,
    notification_table: Notification => notifications,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage calls across every table.
    #[must_use]
    pub fn total_calls(&self) -> usize {
        self.tables().into_iter().map(CallCounts::total).sum()
    }

    /// Write calls across every table.
    #[must_use]
    pub fn total_writes(&self) -> usize {
        self.tables().into_iter().map(CallCounts::writes).sum()
    }

    fn tables(&self) -> [&CallCounts; 14] {
        [
            self.user_table.calls(),
            self.email_table.calls(),
            self.study_table.calls(),
            self.lesson_table.calls(),
            self.course_table.calls(),
            self.course_lesson_table.calls(),
            self.comment_table.calls(),
            self.label_table.calls(),
            self.labeled_table.calls(),
            self.topic_table.calls(),
            self.user_asset_table.calls(),
            self.enrolled_table.calls(),
            self.appled_table.calls(),
            self.notification_table.calls(),
        ]
    }
}
