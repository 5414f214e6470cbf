//! Entity kinds, access kinds and the operations they form.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ContentError;

/// Every record kind the content module stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    User,
    Email,
    Study,
    Lesson,
    Course,
    CourseLesson,
    Comment,
    Label,
    Labeled,
    Topic,
    UserAsset,
    Enrolled,
    Appled,
    Notification,
}

impl EntityKind {
    pub const ALL: [Self; 14] = [
        Self::User,
        Self::Email,
        Self::Study,
        Self::Lesson,
        Self::Course,
        Self::CourseLesson,
        Self::Comment,
        Self::Label,
        Self::Labeled,
        Self::Topic,
        Self::UserAsset,
        Self::Enrolled,
        Self::Appled,
        Self::Notification,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Email => "email",
            Self::Study => "study",
            Self::Lesson => "lesson",
            Self::Course => "course",
            Self::CourseLesson => "course_lesson",
            Self::Comment => "comment",
            Self::Label => "label",
            Self::Labeled => "labeled",
            Self::Topic => "topic",
            Self::UserAsset => "user_asset",
            Self::Enrolled => "enrolled",
            Self::Appled => "appled",
            Self::Notification => "notification",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = ContentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| ContentError::invalid(format!("unknown entity kind '{s}'")))
    }
}

/// How a record is being accessed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessKind {
    Create,
    Read,
    Update,
    Delete,
    Connect,
    Disconnect,
}

impl AccessKind {
    pub const ALL: [Self; 6] = [
        Self::Create,
        Self::Read,
        Self::Update,
        Self::Delete,
        Self::Connect,
        Self::Disconnect,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Read => "read",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Connect => "connect",
            Self::Disconnect => "disconnect",
        }
    }

    /// Whether the access writes the candidate's fields and must validate them.
    #[must_use]
    pub const fn writes_fields(self) -> bool {
        matches!(self, Self::Create | Self::Update)
    }
}

impl fmt::Display for AccessKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccessKind {
    type Err = ContentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|access| access.as_str() == s)
            .ok_or_else(|| ContentError::invalid(format!("unknown access kind '{s}'")))
    }
}

/// `(AccessKind, EntityKind)`: the key of a role-based permission lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Operation {
    pub access: AccessKind,
    pub kind: EntityKind,
}

impl Operation {
    #[must_use]
    pub const fn new(access: AccessKind, kind: EntityKind) -> Self {
        Self { access, kind }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.access, self.kind)
    }
}
