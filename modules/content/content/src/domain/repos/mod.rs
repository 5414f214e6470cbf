//! Repositories: the public facade over loaders and the permitter.
//!
//! Every repository must be opened with the request's permitter before use
//! and is closed at the end of the request. Operations outside that window
//! fail with `ConnClosed`.

use std::sync::Arc;

use content_sdk::ContentError;

use crate::domain::loaders::Loaders;
use crate::domain::permitter::Permitter;

mod record;
mod session;

pub use record::RecordRepo;
pub use session::Session;

/// Declares a per-kind repository around [`RecordRepo`] with the operations
/// every kind supports. Kind-specific lookups live next to each invocation.
macro_rules! record_repo {
    ($(#[$meta:meta])* $name:ident => $model:ty) => {
        $(#[$meta])*
        pub struct $name {
            records: $crate::domain::repos::RecordRepo<$model>,
        }

        impl $name {
            #[must_use]
            pub fn new(loaders: ::std::sync::Arc<$crate::domain::loaders::Loaders>) -> Self {
                Self {
                    records: $crate::domain::repos::RecordRepo::new(loaders),
                }
            }

            /// # Errors
            ///
            /// `NilPermitter` when no permitter is supplied.
            pub fn open(
                &self,
                permitter: Option<::std::sync::Arc<$crate::domain::permitter::Permitter>>,
            ) -> Result<(), ::content_sdk::ContentError> {
                self.records.open(permitter)
            }

            pub fn close(&self) {
                self.records.close();
            }

            #[must_use]
            pub fn is_open(&self) -> bool {
                self.records.is_open()
            }

            /// # Errors
            ///
            /// See `RecordRepo::get`.
            pub async fn get(
                &self,
                ctx: &$crate::domain::context::RequestCtx,
                id: &str,
            ) -> Result<$crate::domain::permit::Permit<$model>, ::content_sdk::ContentError> {
                self.records.get(ctx, id).await
            }

            /// # Errors
            ///
            /// See `RecordRepo::create`.
            pub async fn create(
                &self,
                ctx: &$crate::domain::context::RequestCtx,
                record: $model,
            ) -> Result<$crate::domain::permit::Permit<$model>, ::content_sdk::ContentError> {
                self.records.create(ctx, record).await
            }

            /// # Errors
            ///
            /// See `RecordRepo::update`.
            pub async fn update(
                &self,
                ctx: &$crate::domain::context::RequestCtx,
                patch: $model,
            ) -> Result<$crate::domain::permit::Permit<$model>, ::content_sdk::ContentError> {
                self.records.update(ctx, patch).await
            }

            /// # Errors
            ///
            /// See `RecordRepo::delete`.
            pub async fn delete(
                &self,
                ctx: &$crate::domain::context::RequestCtx,
                id: &str,
            ) -> Result<$crate::domain::permit::Permit<$model>, ::content_sdk::ContentError> {
                self.records.delete(ctx, id).await
            }
        }
    };
}

mod activity;
mod labels;
mod studies;
mod users;

pub use activity::{AppledRepo, CommentRepo, EnrolledRepo, NotificationRepo};
pub use labels::{LabelRepo, LabeledRepo, TopicRepo};
pub use studies::{CourseLessonRepo, CourseRepo, LessonRepo, StudyRepo, UserAssetRepo};
pub use users::{EmailRepo, UserRepo};

macro_rules! repos {
    ($($field:ident: $repo:ident),* $(,)?) => {
        /// Every repository of one request.
        pub struct Repos {
            $(pub $field: $repo,)*
        }

        impl Repos {
            #[must_use]
            pub fn new(loaders: &Arc<Loaders>) -> Self {
                Self {
                    $($field: $repo::new(Arc::clone(loaders)),)*
                }
            }

            /// Open every repository with the same permitter.
            ///
            /// # Errors
            ///
            /// `NilPermitter` when no permitter is supplied.
            pub fn open(&self, permitter: Option<Arc<Permitter>>) -> Result<(), ContentError> {
                let permitter = permitter.ok_or(ContentError::NilPermitter)?;
                $(self.$field.open(Some(Arc::clone(&permitter)))?;)*
                Ok(())
            }

            pub fn close(&self) {
                $(self.$field.close();)*
            }
        }
    };
}

repos! {
    user: UserRepo,
    email: EmailRepo,
    study: StudyRepo,
    lesson: LessonRepo,
    course: CourseRepo,
    course_lesson: CourseLessonRepo,
    comment: CommentRepo,
    label: LabelRepo,
    labeled: LabeledRepo,
    topic: TopicRepo,
    user_asset: UserAssetRepo,
    enrolled: EnrolledRepo,
    appled: AppledRepo,
    notification: NotificationRepo,
}
