//! Shared fixtures for unit tests: a seeded in-memory store, a permission
//! table and viewers.

use std::sync::Arc;

use content_sdk::models::{Label, Lesson, Study, Topic, User};
use content_sdk::{AccessKind, EntityKind, FieldSet};
use studyhub_security::{Viewer, roles};

use crate::config::ContentConfig;
use crate::domain::context::RequestCtx;
use crate::infra::storage::{MemoryPermissionStore, MemoryStore};
use crate::service::{ContentService, RequestScope};

pub fn alice() -> User {
    User {
        id: "user_alice".to_owned(),
        login: "alice".to_owned(),
        name: "Alice".to_owned(),
        bio: "Writes about Rust".to_owned(),
        ..User::default()
    }
}

pub fn bob() -> User {
    User {
        id: "user_bob".to_owned(),
        login: "bob".to_owned(),
        name: "Bob".to_owned(),
        ..User::default()
    }
}

pub fn study() -> Study {
    Study {
        id: "study_1".to_owned(),
        user_id: "user_alice".to_owned(),
        name: "rust".to_owned(),
        description: "Learning Rust".to_owned(),
        ..Study::default()
    }
}

pub fn lesson() -> Lesson {
    Lesson {
        id: "lesson_1".to_owned(),
        study_id: "study_1".to_owned(),
        number: 1,
        title: "Ownership".to_owned(),
        ..Lesson::default()
    }
}

pub fn label() -> Label {
    Label {
        id: "label_1".to_owned(),
        study_id: "study_1".to_owned(),
        name: "beginner".to_owned(),
        ..Label::default()
    }
}

pub fn topic() -> Topic {
    Topic {
        id: "topic_1".to_owned(),
        name: "systems".to_owned(),
        ..Topic::default()
    }
}

pub fn seeded_store() -> Arc<MemoryStore> {
    let store = MemoryStore::new();
    store.user_table().insert(alice());
    store.user_table().insert(bob());
    store.study_table().insert(study());
    store.lesson_table().insert(lesson());
    store.label_table().insert(label());
    store.topic_table().insert(topic());
    Arc::new(store)
}

pub fn member(user: &User) -> Viewer {
    Viewer::builder()
        .id(&user.id)
        .login(&user.login)
        .role(roles::MEMBER)
        .build()
}

/// Members read user ids and logins plus every content field; owners may
/// read and edit their own records.
pub fn permissions() -> Arc<MemoryPermissionStore> {
    use AccessKind::{Connect, Create, Delete, Disconnect, Read, Update};

    let store = MemoryPermissionStore::new()
        .with_grant(roles::MEMBER, Read, EntityKind::User, FieldSet::only(["id", "login"]))
        .with_grant(roles::OWNER, Read, EntityKind::User, FieldSet::All)
        .with_grant(roles::OWNER, Update, EntityKind::User, FieldSet::only(["name", "bio"]))
        .with_grant(
            roles::OWNER,
            Create,
            EntityKind::Study,
            FieldSet::only(["user_id", "name", "description", "private"]),
        )
        .with_grant(
            roles::OWNER,
            Update,
            EntityKind::Study,
            FieldSet::only(["name", "description", "private"]),
        )
        .with_grant(roles::OWNER, Delete, EntityKind::Study, FieldSet::All)
        .with_grant(
            roles::OWNER,
            Create,
            EntityKind::Lesson,
            FieldSet::only(["study_id", "number", "title", "body", "draft"]),
        )
        .with_grant(
            roles::OWNER,
            Update,
            EntityKind::Lesson,
            FieldSet::only(["title", "body", "draft"]),
        )
        .with_grant(roles::OWNER, Delete, EntityKind::Lesson, FieldSet::All)
        .with_grant(
            roles::OWNER,
            Connect,
            EntityKind::Labeled,
            FieldSet::only(["label_id", "labelable_id"]),
        )
        .with_grant(roles::OWNER, Disconnect, EntityKind::Labeled, FieldSet::All);

    for kind in [
        EntityKind::Study,
        EntityKind::Lesson,
        EntityKind::Label,
        EntityKind::Labeled,
        EntityKind::Topic,
    ] {
        store.grant(roles::MEMBER, Read, kind, FieldSet::All);
    }
    Arc::new(store)
}

pub fn ctx(viewer: Viewer, store: &Arc<MemoryStore>) -> RequestCtx {
    RequestCtx::builder()
        .viewer(viewer)
        .store(Arc::clone(store) as Arc<dyn content_sdk::ContentStore>)
        .build()
}

/// Open a request scope for `viewer` over `store` with the default grants.
pub fn scope(viewer: Viewer, store: &Arc<MemoryStore>) -> RequestScope {
    open_scope(ctx(viewer, store), permissions())
}

pub fn open_scope(ctx: RequestCtx, grants: Arc<MemoryPermissionStore>) -> RequestScope {
    ContentService::new(grants, ContentConfig::default())
        .begin(ctx)
        .expect("request scope opens")
}
