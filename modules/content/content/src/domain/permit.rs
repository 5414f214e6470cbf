//! Authorization-scoped read views.

use content_sdk::models::{
    Appled, Comment, Course, CourseLesson, Email, Enrolled, Label, Labeled, Lesson, Notification,
    Study, Topic, User, UserAsset,
};
use content_sdk::{ContentError, Entity, Operation};
use time::OffsetDateTime;

use super::permitter::FieldPermission;

/// One record paired with the field-permission function that authorized it.
///
/// [`Permit::get`] masks denied fields to their zero value; the typed
/// accessors fail with `AccessDenied` instead. Permits are built per fetch
/// and never cached.
#[derive(Debug, Clone)]
pub struct Permit<E> {
    permission: FieldPermission,
    record: E,
}

impl<E: Entity> Permit<E> {
    pub(crate) fn new(permission: FieldPermission, record: E) -> Self {
        Self { permission, record }
    }

    /// The record with every denied field zeroed.
    #[must_use]
    pub fn get(&self) -> E {
        let mut masked = self.record.clone();
        for field in E::FIELDS {
            if !self.permission.allows(field) {
                masked.clear_field(field);
            }
        }
        masked
    }

    /// # Errors
    ///
    /// `AccessDenied` when the viewer may not read `field`.
    pub fn check_field(&self, field: &str) -> Result<(), ContentError> {
        if self.permission.allows(field) {
            Ok(())
        } else {
            Err(ContentError::AccessDenied)
        }
    }

    #[must_use]
    pub fn allows(&self, field: &str) -> bool {
        self.permission.allows(field)
    }

    #[must_use]
    pub fn operation(&self) -> Operation {
        self.permission.operation()
    }
}

/// Typed accessors: `str` fields are borrowed, `copy` fields returned by value.
macro_rules! permit_accessors {
    ($model:ty { $($kind:ident $field:ident: $ty:ty),* $(,)? }) => {
        impl Permit<$model> {
            $(permit_accessors!(@accessor $kind $field $ty);)*
        }
    };
    (@accessor str $field:ident $ty:ty) => {
        #[doc = concat!("`", stringify!($field), "`, if the viewer may read it.")]
        ///
        /// # Errors
        ///
        /// `AccessDenied` when the field is masked for this viewer.
        pub fn $field(&self) -> Result<&str, ContentError> {
            self.check_field(stringify!($field))?;
            Ok(&self.record.$field)
        }
    };
    (@accessor copy $field:ident $ty:ty) => {
        #[doc = concat!("`", stringify!($field), "`, if the viewer may read it.")]
        ///
        /// # Errors
        ///
        /// `AccessDenied` when the field is masked for this viewer.
        pub fn $field(&self) -> Result<$ty, ContentError> {
            self.check_field(stringify!($field))?;
            Ok(self.record.$field)
        }
    };
}

type Timestamp = Option<OffsetDateTime>;

permit_accessors!(User {
    str id: String,
    str login: String,
    str name: String,
    str bio: String,
    copy created_at: Timestamp,
    copy updated_at: Timestamp,
});

permit_accessors!(Email {
    str id: String,
    str user_id: String,
    str value: String,
    str kind: String,
    copy verified_at: Timestamp,
    copy created_at: Timestamp,
});

permit_accessors!(Study {
    str id: String,
    str user_id: String,
    str name: String,
    str description: String,
    copy private: bool,
    copy created_at: Timestamp,
    copy updated_at: Timestamp,
});

permit_accessors!(Lesson {
    str id: String,
    str study_id: String,
    copy number: i32,
    str title: String,
    str body: String,
    copy draft: bool,
    copy published_at: Timestamp,
    copy created_at: Timestamp,
    copy updated_at: Timestamp,
});

permit_accessors!(Course {
    str id: String,
    str study_id: String,
    copy number: i32,
    str name: String,
    str description: String,
    copy published_at: Timestamp,
    copy created_at: Timestamp,
    copy updated_at: Timestamp,
});

permit_accessors!(CourseLesson {
    str id: String,
    str course_id: String,
    str lesson_id: String,
    copy number: i32,
    copy created_at: Timestamp,
});

permit_accessors!(Comment {
    str id: String,
    str user_id: String,
    str commentable_id: String,
    str body: String,
    copy created_at: Timestamp,
    copy updated_at: Timestamp,
});

permit_accessors!(Label {
    str id: String,
    str study_id: String,
    str name: String,
    str color: String,
    str description: String,
    copy created_at: Timestamp,
});

permit_accessors!(Labeled {
    str id: String,
    str label_id: String,
    str labelable_id: String,
    copy created_at: Timestamp,
});

permit_accessors!(Topic {
    str id: String,
    str name: String,
    str description: String,
    copy created_at: Timestamp,
});

permit_accessors!(UserAsset {
    str id: String,
    str user_id: String,
    str study_id: String,
    str name: String,
    str description: String,
    str content_type: String,
    copy size: i64,
    copy created_at: Timestamp,
});

permit_accessors!(Enrolled {
    str id: String,
    str enrollable_id: String,
    str user_id: String,
    copy created_at: Timestamp,
});

permit_accessors!(Appled {
    str id: String,
    str appleable_id: String,
    str user_id: String,
    copy created_at: Timestamp,
});

permit_accessors!(Notification {
    str id: String,
    str user_id: String,
    str subject_id: String,
    str reason: String,
    copy unread: bool,
    copy created_at: Timestamp,
});
