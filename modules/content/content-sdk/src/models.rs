//! Raw record structs, one per entity kind.
//!
//! These are storage representations: no access control is applied here.
//! Repositories hand them out only wrapped in a permit.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::Permissible;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Permissible)]
#[permit(kind = "user", owner = "id", no_create_parent, lookup(login = ["login"]))]
pub struct User {
    pub id: String,
    pub login: String,
    pub name: String,
    pub bio: String,
    pub created_at: Option<OffsetDateTime>,
    pub updated_at: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Permissible)]
#[permit(
    kind = "email",
    owner = "user_id",
    create_parent = "user_id",
    lookup(value = ["value"])
)]
pub struct Email {
    pub id: String,
    pub user_id: String,
    pub value: String,
    /// `primary`, `backup` or `extra`.
    #[serde(rename = "type")]
    pub kind: String,
    pub verified_at: Option<OffsetDateTime>,
    pub created_at: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Permissible)]
#[permit(
    kind = "study",
    owner = "user_id",
    create_parent = "user_id",
    lookup(name = ["user_id", "name"])
)]
pub struct Study {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub description: String,
    pub private: bool,
    pub created_at: Option<OffsetDateTime>,
    pub updated_at: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Permissible)]
#[permit(
    kind = "lesson",
    owner_via(study = "study_id"),
    create_via(study = "study_id"),
    lookup(number = ["study_id", "number"])
)]
pub struct Lesson {
    pub id: String,
    pub study_id: String,
    pub number: i32,
    pub title: String,
    pub body: String,
    pub draft: bool,
    pub published_at: Option<OffsetDateTime>,
    pub created_at: Option<OffsetDateTime>,
    pub updated_at: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Permissible)]
#[permit(
    kind = "course",
    owner_via(study = "study_id"),
    create_via(study = "study_id"),
    lookup(number = ["study_id", "number"])
)]
pub struct Course {
    pub id: String,
    pub study_id: String,
    pub number: i32,
    pub name: String,
    pub description: String,
    pub published_at: Option<OffsetDateTime>,
    pub created_at: Option<OffsetDateTime>,
    pub updated_at: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Permissible)]
#[permit(
    kind = "course_lesson",
    owner_via(course = "course_id"),
    create_via(course = "course_id"),
    lookup(number = ["course_id", "number"])
)]
pub struct CourseLesson {
    pub id: String,
    pub course_id: String,
    pub lesson_id: String,
    pub number: i32,
    pub created_at: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Permissible)]
#[permit(kind = "comment", owner = "user_id", create_parent = "user_id")]
pub struct Comment {
    pub id: String,
    pub user_id: String,
    /// Id of the lesson or other record commented on.
    pub commentable_id: String,
    pub body: String,
    pub created_at: Option<OffsetDateTime>,
    pub updated_at: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Permissible)]
#[permit(
    kind = "label",
    owner_via(study = "study_id"),
    create_via(study = "study_id"),
    lookup(name = ["study_id", "name"])
)]
pub struct Label {
    pub id: String,
    pub study_id: String,
    pub name: String,
    pub color: String,
    pub description: String,
    pub created_at: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Permissible)]
#[permit(
    kind = "labeled",
    owner_via(label = "label_id"),
    create_via(label = "label_id"),
    lookup(labelable = ["label_id", "labelable_id"])
)]
pub struct Labeled {
    pub id: String,
    pub label_id: String,
    pub labelable_id: String,
    pub created_at: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Permissible)]
#[permit(kind = "topic", no_owner, no_create_parent, lookup(name = ["name"]))]
pub struct Topic {
    pub id: String,
    pub name: String,
    pub description: String,
    pub created_at: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Permissible)]
#[permit(
    kind = "user_asset",
    owner = "user_id",
    create_via(study = "study_id"),
    lookup(name = ["study_id", "name"])
)]
pub struct UserAsset {
    pub id: String,
    pub user_id: String,
    pub study_id: String,
    pub name: String,
    pub description: String,
    pub content_type: String,
    pub size: i64,
    pub created_at: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Permissible)]
#[permit(
    kind = "enrolled",
    owner = "user_id",
    create_parent = "user_id",
    lookup(enrollee = ["enrollable_id", "user_id"])
)]
pub struct Enrolled {
    pub id: String,
    /// Id of the study or course enrolled in.
    pub enrollable_id: String,
    pub user_id: String,
    pub created_at: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Permissible)]
#[permit(
    kind = "appled",
    owner = "user_id",
    create_parent = "user_id",
    lookup(appler = ["appleable_id", "user_id"])
)]
pub struct Appled {
    pub id: String,
    pub appleable_id: String,
    pub user_id: String,
    pub created_at: Option<OffsetDateTime>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, Permissible)]
#[permit(kind = "notification", owner = "user_id", no_create_parent)]
pub struct Notification {
    pub id: String,
    pub user_id: String,
    pub subject_id: String,
    pub reason: String,
    pub unread: bool,
    pub created_at: Option<OffsetDateTime>,
}
