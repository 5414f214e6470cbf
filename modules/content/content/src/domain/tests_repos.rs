use std::sync::Arc;

use content_sdk::models::{Labeled, Lesson, Study, User};
use content_sdk::{AccessKind, ContentError, ContentStore, EntityKind, FieldSet};
use studyhub_security::{Viewer, roles};

use crate::domain::context::RequestCtx;
use crate::infra::storage::{MemoryPermissionStore, MemoryStore};
use crate::test_support::{
    alice, bob, ctx, label, lesson, member, open_scope, permissions, scope, seeded_store, study,
};

fn attached(store: &MemoryStore) -> Labeled {
    let labeled = Labeled {
        id: "labeled_1".to_owned(),
        label_id: label().id,
        labelable_id: "lesson_1".to_owned(),
        ..Labeled::default()
    };
    store.labeled_table().insert(labeled.clone());
    labeled
}

#[tokio::test]
async fn get_masks_denied_fields() {
    let store = seeded_store();
    let scope = scope(member(&bob()), &store);

    let permit = scope.repos().user.get(scope.ctx(), "user_alice").await.unwrap();

    assert_eq!(permit.login().unwrap(), "alice");
    assert_eq!(permit.name().unwrap_err(), ContentError::AccessDenied);
    assert_eq!(
        permit.get(),
        User {
            id: "user_alice".to_owned(),
            login: "alice".to_owned(),
            ..User::default()
        }
    );
}

#[tokio::test]
async fn owner_sees_every_field() {
    let store = seeded_store();
    let scope = scope(member(&alice()), &store);

    let permit = scope.repos().user.get(scope.ctx(), "user_alice").await.unwrap();

    assert_eq!(permit.get(), alice());
    assert_eq!(permit.operation().access, AccessKind::Read);
}

#[tokio::test]
async fn get_by_login_primes_id_loader() {
    let store = seeded_store();
    let scope = scope(member(&bob()), &store);

    scope.repos().user.get_by_login(scope.ctx(), "alice").await.unwrap();
    scope.repos().user.get(scope.ctx(), "user_alice").await.unwrap();

    assert_eq!(store.user_table().calls().finds(), 1);
    assert_eq!(store.user_table().calls().gets(), 0);
}

#[tokio::test]
async fn missing_record_is_not_found() {
    let store = seeded_store();
    let scope = scope(member(&alice()), &store);

    let err = scope.repos().study.get(scope.ctx(), "study_404").await.unwrap_err();

    assert!(err.is_not_found());
}

#[tokio::test]
async fn create_returns_readable_permit() {
    let store = seeded_store();
    let scope = scope(member(&alice()), &store);

    let permit = scope
        .repos()
        .lesson
        .create(
            scope.ctx(),
            Lesson {
                study_id: "study_1".to_owned(),
                number: 2,
                title: "Borrowing".to_owned(),
                ..Lesson::default()
            },
        )
        .await
        .unwrap();

    let created = permit.get();
    assert!(!created.id.is_empty());
    assert_eq!(created.title, "Borrowing");
    assert_eq!(store.lesson_table().len(), 2);
}

#[tokio::test]
async fn created_record_is_served_from_cache() {
    let store = seeded_store();
    let scope = scope(member(&alice()), &store);
    let created = scope
        .repos()
        .study
        .create(
            scope.ctx(),
            Study {
                user_id: "user_alice".to_owned(),
                name: "go".to_owned(),
                ..Study::default()
            },
        )
        .await
        .unwrap()
        .get();

    let by_name = scope
        .repos()
        .study
        .get_by_name(scope.ctx(), "user_alice", "go")
        .await
        .unwrap();

    assert_eq!(by_name.get(), created);
    assert_eq!(store.study_table().calls().finds(), 0);
}

#[tokio::test]
async fn denied_create_never_reaches_storage() {
    let store = seeded_store();
    let scope = scope(member(&bob()), &store);

    let err = scope
        .repos()
        .lesson
        .create(
            scope.ctx(),
            Lesson {
                study_id: "study_1".to_owned(),
                number: 2,
                ..Lesson::default()
            },
        )
        .await
        .unwrap_err();

    assert_eq!(err, ContentError::AccessDenied);
    assert_eq!(store.lesson_table().calls().creates(), 0);
}

#[tokio::test]
async fn update_applies_patch_and_refreshes_cache() {
    let store = seeded_store();
    let scope = scope(member(&alice()), &store);

    let updated = scope
        .repos()
        .study
        .update(
            scope.ctx(),
            Study {
                id: "study_1".to_owned(),
                name: "rust-2024".to_owned(),
                ..Study::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.name().unwrap(), "rust-2024");
    assert_eq!(updated.description().unwrap(), "Learning Rust");

    let renamed = scope
        .repos()
        .study
        .get_by_name(scope.ctx(), "user_alice", "rust-2024")
        .await
        .unwrap();
    assert_eq!(renamed.get().id, "study_1");

    let err = scope
        .repos()
        .study
        .get_by_name(scope.ctx(), "user_alice", "rust")
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn denied_update_never_writes() {
    let store = seeded_store();
    let scope = scope(member(&bob()), &store);

    let err = scope
        .repos()
        .study
        .update(
            scope.ctx(),
            Study {
                id: "study_1".to_owned(),
                name: "hijacked".to_owned(),
                ..Study::default()
            },
        )
        .await
        .unwrap_err();

    assert_eq!(err, ContentError::AccessDenied);
    assert_eq!(store.study_table().calls().writes(), 0);
    assert_eq!(store.study_table().row("study_1").unwrap(), study());
}

#[tokio::test]
async fn delete_evicts_every_key() {
    let store = seeded_store();
    let scope = scope(member(&alice()), &store);
    scope.repos().lesson.get(scope.ctx(), "lesson_1").await.unwrap();

    let removed = scope.repos().lesson.delete(scope.ctx(), "lesson_1").await.unwrap();
    assert_eq!(removed.get(), lesson());

    let err = scope
        .repos()
        .lesson
        .get_by_number(scope.ctx(), "study_1", 1)
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    assert!(store.lesson_table().is_empty());
}

#[tokio::test]
async fn list_shares_first_record_permission() {
    let store = seeded_store();
    let scope = scope(member(&alice()), &store);

    let lessons = scope
        .repos()
        .lesson
        .list_by_study(scope.ctx(), "study_1")
        .await
        .unwrap();

    assert_eq!(lessons.len(), 1);
    assert_eq!(lessons[0].title().unwrap(), "Ownership");

    scope.repos().lesson.get(scope.ctx(), "lesson_1").await.unwrap();
    assert_eq!(store.lesson_table().calls().gets(), 0);
}

#[tokio::test]
async fn later_rows_reuse_first_row_permission() {
    let store = seeded_store();
    store.user_table().insert(User {
        bio: "Writes about Go".to_owned(),
        ..bob()
    });
    let scope = scope(member(&alice()), &store);

    let users = scope
        .repos()
        .user
        .search(scope.ctx(), "writes about")
        .await
        .unwrap();

    assert_eq!(users.len(), 2);
    assert_eq!(users[0].get().id, "user_alice");
    assert_eq!(users[1].get().id, "user_bob");
    assert_eq!(users[1].name().unwrap(), "Bob");
    assert_eq!(users[1].bio().unwrap(), "Writes about Go");
}

#[tokio::test]
async fn denied_first_row_hides_whole_list() {
    let store = seeded_store();
    store.study_table().insert(Study {
        id: "study_2".to_owned(),
        user_id: "user_bob".to_owned(),
        name: "rust-for-bob".to_owned(),
        ..Study::default()
    });
    let grants = MemoryPermissionStore::new().with_grant(
        roles::OWNER,
        AccessKind::Read,
        EntityKind::Study,
        FieldSet::All,
    );
    let scope = open_scope(ctx(member(&bob()), &store), Arc::new(grants));

    let studies = scope.repos().study.search(scope.ctx(), "rust").await.unwrap();
    assert!(studies.is_empty());

    let own = scope.repos().study.get(scope.ctx(), "study_2").await.unwrap();
    assert_eq!(own.name().unwrap(), "rust-for-bob");
}

#[tokio::test]
async fn denied_list_is_empty() {
    let store = seeded_store();
    let scope = scope(Viewer::guest(), &store);

    let studies = scope
        .repos()
        .study
        .list_by_user(scope.ctx(), "user_alice")
        .await
        .unwrap();

    assert!(studies.is_empty());
}

#[tokio::test]
async fn connect_and_disconnect_label() {
    let store = seeded_store();
    let scope = scope(member(&alice()), &store);

    let connected = scope
        .repos()
        .labeled
        .connect(scope.ctx(), &label().id, "lesson_1")
        .await
        .unwrap();
    assert_eq!(connected.get().labelable_id, "lesson_1");
    assert_eq!(store.labeled_table().len(), 1);

    let disconnected = scope
        .repos()
        .labeled
        .disconnect(scope.ctx(), &label().id, "lesson_1")
        .await
        .unwrap();
    assert_eq!(disconnected.get().id, connected.get().id);
    assert!(store.labeled_table().is_empty());
}

#[tokio::test]
async fn stranger_cannot_connect_label() {
    let store = seeded_store();
    let scope = scope(member(&bob()), &store);

    let err = scope
        .repos()
        .labeled
        .connect(scope.ctx(), &label().id, "lesson_1")
        .await
        .unwrap_err();

    assert_eq!(err, ContentError::AccessDenied);
    assert_eq!(store.labeled_table().calls().writes(), 0);
}

#[tokio::test]
async fn closed_scope_rejects_calls() {
    let store = seeded_store();
    let scope = scope(member(&alice()), &store);
    scope.close();

    let err = scope.repos().study.get(scope.ctx(), "study_1").await.unwrap_err();

    assert_eq!(err, ContentError::ConnClosed);
    assert!(!scope.repos().study.is_open());
}

#[tokio::test]
async fn disconnect_after_close_touches_no_storage() {
    let store = seeded_store();
    attached(&store);
    let scope = scope(member(&alice()), &store);
    scope.close();

    let err = scope
        .repos()
        .labeled
        .disconnect(scope.ctx(), &label().id, "lesson_1")
        .await
        .unwrap_err();

    assert_eq!(err, ContentError::ConnClosed);
    assert_eq!(store.labeled_table().calls().total(), 0);
    assert!(scope.loaders().labeled.is_empty());
    assert_eq!(store.labeled_table().len(), 1);
}

#[tokio::test]
async fn disconnect_without_viewer_is_not_found() {
    let store = seeded_store();
    attached(&store);
    let ctx = RequestCtx::builder()
        .store(Arc::clone(&store) as Arc<dyn ContentStore>)
        .build();
    let scope = open_scope(ctx, permissions());

    let err = scope
        .repos()
        .labeled
        .disconnect(scope.ctx(), &label().id, "lesson_1")
        .await
        .unwrap_err();

    assert_eq!(err, ContentError::not_found("viewer"));
    assert_eq!(store.total_calls(), 0);
}
