//! Per-request loader sets for every entity kind.

use async_trait::async_trait;
use content_sdk::models::{
    Appled, Comment, Course, CourseLesson, Email, Enrolled, Label, Labeled, Lesson, Notification,
    Study, Topic, User, UserAsset,
};
use content_sdk::{ContentError, ContentStore, EntityKind, OwnerRef, Stored};
use dataloader::LoaderConfig;
use tokio::time::Instant;
use tracing::Span;

mod entity_loader;

pub use entity_loader::EntityLoader;

/// Resolves the owner of a record identified by kind and id.
#[async_trait]
pub trait OwnerLookup: Send + Sync {
    /// Owner declared by the record `id` of `kind`.
    ///
    /// # Errors
    ///
    /// `NotFound` when the record does not exist; storage errors otherwise.
    async fn owner_of(&self, kind: EntityKind, id: &str) -> Result<Option<OwnerRef>, ContentError>;
}

macro_rules! loaders {
    ($($field:ident: $model:ty),* $(,)?) => {
        /// Every entity loader of one request. Shared by the repositories
        /// and by ownership resolution so both hit the same caches.
        pub struct Loaders {
            $(pub $field: EntityLoader<$model>,)*
        }

        impl Loaders {
            #[must_use]
            pub fn new(store: &dyn ContentStore, config: &LoaderConfig, span: &Span) -> Self {
                Self {
                    $($field: EntityLoader::new(store, config, span),)*
                }
            }

            pub fn set_deadline(&self, deadline: Option<Instant>) {
                $(self.$field.set_deadline(deadline);)*
            }

            pub fn clear_all(&self) {
                $(self.$field.clear_all();)*
            }
        }

        $(
            impl LoadedBy for $model {
                fn loader(loaders: &Loaders) -> &EntityLoader<Self> {
                    &loaders.$field
                }
            }
        )*
    };
}

/// Routes a kind to its loader set within [`Loaders`].
pub trait LoadedBy: Stored {
    fn loader(loaders: &Loaders) -> &EntityLoader<Self>;
}

loaders! {
    user: User,
    email: Email,
    study: Study,
    lesson: Lesson,
    course: Course,
    course_lesson: CourseLesson,
    comment: Comment,
    label: Label,
    labeled: Labeled,
    topic: Topic,
    user_asset: UserAsset,
    enrolled: Enrolled,
    appled: Appled,
    notification: Notification,
}

impl Loaders {
    #[must_use]
    pub fn of<E: LoadedBy>(&self) -> &EntityLoader<E> {
        E::loader(self)
    }

    async fn owner<E: LoadedBy>(&self, id: &str) -> Result<Option<OwnerRef>, ContentError> {
        Ok(self.of::<E>().get(id).await?.owner())
    }
}

#[async_trait]
impl OwnerLookup for Loaders {
    async fn owner_of(&self, kind: EntityKind, id: &str) -> Result<Option<OwnerRef>, ContentError> {
        match kind {
            EntityKind::User => self.owner::<User>(id).await,
            EntityKind::Email => self.owner::<Email>(id).await,
            EntityKind::Study => self.owner::<Study>(id).await,
            EntityKind::Lesson => self.owner::<Lesson>(id).await,
            EntityKind::Course => self.owner::<Course>(id).await,
            EntityKind::CourseLesson => self.owner::<CourseLesson>(id).await,
            EntityKind::Comment => self.owner::<Comment>(id).await,
            EntityKind::Label => self.owner::<Label>(id).await,
            EntityKind::Labeled => self.owner::<Labeled>(id).await,
            EntityKind::Topic => self.owner::<Topic>(id).await,
            EntityKind::UserAsset => self.owner::<UserAsset>(id).await,
            EntityKind::Enrolled => self.owner::<Enrolled>(id).await,
            EntityKind::Appled => self.owner::<Appled>(id).await,
            EntityKind::Notification => self.owner::<Notification>(id).await,
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::test_support::{lesson, seeded_store, study};

    #[tokio::test]
    async fn get_by_name_then_id_costs_one_storage_call() {
        let store = seeded_store();
        let loaders = Loaders::new(&*store, &LoaderConfig::default(), &Span::none());

        let by_name = loaders.study.get_by("name", &["user_alice", "rust"]).await.unwrap();
        let by_id = loaders.study.get(&by_name.id).await.unwrap();

        assert_eq!(by_id, study());
        assert_eq!(store.study_table().calls().finds(), 1);
        assert_eq!(store.study_table().calls().gets(), 0);
    }

    #[tokio::test]
    async fn get_by_id_primes_natural_key() {
        let store = seeded_store();
        let loaders = Loaders::new(&*store, &LoaderConfig::default(), &Span::none());

        loaders.lesson.get("lesson_1").await.unwrap();
        let by_number = loaders.lesson.get_by("number", &["study_1", "1"]).await.unwrap();

        assert_eq!(by_number, lesson());
        assert_eq!(store.lesson_table().calls().total(), 1);
    }

    #[tokio::test]
    async fn get_many_keeps_input_order_and_primes_lookups() {
        let store = seeded_store();
        let loaders = Loaders::new(&*store, &LoaderConfig::default(), &Span::none());

        let results = loaders.lesson.get_many(&["lesson_404", "lesson_1"]).await;

        assert!(results[0].as_ref().unwrap_err().is_not_found());
        assert_eq!(results[1].as_ref().unwrap(), &lesson());

        let before = store.lesson_table().calls().total();
        let by_number = loaders.lesson.get_by("number", &["study_1", "1"]).await.unwrap();
        assert_eq!(by_number, lesson());
        assert_eq!(store.lesson_table().calls().total(), before);
    }

    #[tokio::test]
    async fn unknown_lookup_is_invalid() {
        let store = seeded_store();
        let loaders = Loaders::new(&*store, &LoaderConfig::default(), &Span::none());

        let err = loaders.comment.get_by("name", &["x"]).await.unwrap_err();

        assert!(matches!(err, ContentError::Invalid { .. }));
    }

    #[tokio::test]
    async fn owner_of_follows_one_hop() {
        let store = seeded_store();
        let loaders = Loaders::new(&*store, &LoaderConfig::default(), &Span::none());

        let owner = loaders.owner_of(EntityKind::Lesson, "lesson_1").await.unwrap();

        assert_eq!(
            owner,
            Some(OwnerRef::Record {
                kind: EntityKind::Study,
                id: "study_1".to_owned(),
            })
        );
    }

    #[tokio::test]
    async fn missing_record_is_not_found() {
        let store = seeded_store();
        let loaders = Loaders::new(&*store, &LoaderConfig::default(), &Span::none());

        let err = loaders.owner_of(EntityKind::Study, "nope").await.unwrap_err();

        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn clear_all_empties_every_loader() {
        let store = seeded_store();
        let loaders = Loaders::new(&*store, &LoaderConfig::default(), &Span::none());
        loaders.study.get("study_1").await.unwrap();
        assert!(!loaders.study.is_empty());

        loaders.clear_all();

        assert!(loaders.study.is_empty());
    }
}
