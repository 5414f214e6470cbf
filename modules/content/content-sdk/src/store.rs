//! Storage collaborator traits.
//!
//! The content module never generates queries itself: every kind's fetch
//! and write functions come from a [`ContentStore`] supplied per request.

use std::sync::Arc;

use async_trait::async_trait;

use crate::entity::Entity;
use crate::error::ContentError;
use crate::models::{
    Appled, Comment, Course, CourseLesson, Email, Enrolled, Label, Labeled, Lesson, Notification,
    Study, Topic, User, UserAsset,
};

/// Row filter for list operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListFilter {
    All,
    /// Records whose `field` renders as `value`.
    Eq { field: &'static str, value: String },
    /// Backend-defined text search.
    Search { query: String },
}

impl ListFilter {
    pub fn eq(field: &'static str, value: impl Into<String>) -> Self {
        Self::Eq {
            field,
            value: value.into(),
        }
    }

    pub fn search(query: impl Into<String>) -> Self {
        Self::Search {
            query: query.into(),
        }
    }
}

/// Persistence for one entity kind.
///
/// Missing records are reported as `ContentError::NotFound`.
#[async_trait]
pub trait RecordStore<E: Entity>: Send + Sync {
    async fn get(&self, id: &str) -> Result<E, ContentError>;

    /// Fetch by the natural key named `lookup`; `parts` follow the lookup's field order.
    async fn find(&self, lookup: &str, parts: &[String]) -> Result<E, ContentError>;

    async fn list(&self, filter: &ListFilter) -> Result<Vec<E>, ContentError>;

    async fn create(&self, record: E) -> Result<E, ContentError>;

    /// Apply the non-zero fields of `patch` to the record with `patch.id()`.
    async fn update(&self, patch: E) -> Result<E, ContentError>;

    /// Remove a record and return it as it was.
    async fn delete(&self, id: &str) -> Result<E, ContentError>;
}

/// Storage handle for one request: one [`RecordStore`] per kind.
pub trait ContentStore: Send + Sync {
    fn users(&self) -> Arc<dyn RecordStore<User>>;
    fn emails(&self) -> Arc<dyn RecordStore<Email>>;
    fn studies(&self) -> Arc<dyn RecordStore<Study>>;
    fn lessons(&self) -> Arc<dyn RecordStore<Lesson>>;
    fn courses(&self) -> Arc<dyn RecordStore<Course>>;
    fn course_lessons(&self) -> Arc<dyn RecordStore<CourseLesson>>;
    fn comments(&self) -> Arc<dyn RecordStore<Comment>>;
    fn labels(&self) -> Arc<dyn RecordStore<Label>>;
    fn labeleds(&self) -> Arc<dyn RecordStore<Labeled>>;
    fn topics(&self) -> Arc<dyn RecordStore<Topic>>;
    fn user_assets(&self) -> Arc<dyn RecordStore<UserAsset>>;
    fn enrolleds(&self) -> Arc<dyn RecordStore<Enrolled>>;
    fn appleds(&self) -> Arc<dyn RecordStore<Appled>>;
    fn notifications(&self) -> Arc<dyn RecordStore<Notification>>;
}

/// Routes a kind to its [`RecordStore`] on a [`ContentStore`].
pub trait Stored: Entity {
    fn records(store: &dyn ContentStore) -> Arc<dyn RecordStore<Self>>;
}

macro_rules! impl_stored {
    ($($model:ty => $accessor:ident),* $(,)?) => {
        $(
            impl Stored for $model {
                fn records(store: &dyn ContentStore) -> Arc<dyn RecordStore<Self>> {
                    store.$accessor()
                }
            }
        )*
    };
}

impl_stored! {
    User => users,
    Email => emails,
    Study => studies,
    Lesson => lessons,
    Course => courses,
    CourseLesson => course_lessons,
    Comment => comments,
    Label => labels,
    Labeled => labeleds,
    Topic => topics,
    UserAsset => user_assets,
    Enrolled => enrolleds,
    Appled => appleds,
    Notification => notifications,
}
