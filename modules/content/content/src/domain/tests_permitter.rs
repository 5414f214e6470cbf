use std::sync::Arc;

use async_trait::async_trait;
use content_sdk::models::{Lesson, Study, User};
use content_sdk::{
    AccessKind, ContentError, EntityKind, FieldSet, Operation, PermissionStore, QueryPermission,
};
use dataloader::LoaderConfig;
use studyhub_security::{Viewer, roles};
use tracing::Span;
use tracing_test::traced_test;

use super::loaders::Loaders;
use super::permitter::Permitter;
use crate::infra::storage::{MemoryPermissionStore, MemoryStore};
use crate::test_support::{alice, bob, lesson, member, permissions, seeded_store, study};

fn permitter(store: &Arc<MemoryStore>, permissions: Arc<dyn PermissionStore>) -> Permitter {
    let loaders = Arc::new(Loaders::new(&**store, &LoaderConfig::default(), &Span::none()));
    Permitter::new(permissions, loaders, &LoaderConfig::default(), &Span::none())
}

#[tokio::test]
async fn owner_reads_every_user_field() {
    let store = seeded_store();
    let permitter = permitter(&store, permissions());

    let permission = permitter
        .check(&member(&alice()), AccessKind::Read, &alice())
        .await
        .unwrap();

    assert!(permission.allows("name"));
    assert!(permission.allows("bio"));
}

#[tokio::test]
async fn non_owner_reads_member_fields_only() {
    let store = seeded_store();
    let permitter = permitter(&store, permissions());

    let permission = permitter
        .check(&member(&bob()), AccessKind::Read, &alice())
        .await
        .unwrap();

    assert!(permission.allows("login"));
    assert!(!permission.allows("name"));
}

#[tokio::test]
async fn same_roles_share_one_permission_lookup() {
    let store = seeded_store();
    let grants = permissions();
    let permitter = permitter(&store, Arc::clone(&grants) as Arc<dyn PermissionStore>);
    let viewer = member(&bob());

    permitter.check(&viewer, AccessKind::Read, &alice()).await.unwrap();
    permitter.check(&viewer, AccessKind::Read, &User::default()).await.unwrap();

    assert_eq!(grants.calls(), 1);
}

#[tokio::test]
async fn ownership_follows_parent_records() {
    let store = seeded_store();
    let permitter = permitter(&store, permissions());

    assert!(permitter.viewer_can_admin(&member(&alice()), &lesson()).await.unwrap());
    assert!(!permitter.viewer_can_admin(&member(&bob()), &lesson()).await.unwrap());
}

#[tokio::test]
async fn missing_parent_is_not_owned() {
    let store = seeded_store();
    let permitter = permitter(&store, permissions());
    let orphan = Lesson {
        study_id: "study_gone".to_owned(),
        ..lesson()
    };

    let owns = permitter
        .viewer_can_admin(&member(&alice()), &orphan)
        .await
        .unwrap();

    assert!(!owns);
}

#[tokio::test]
#[traced_test]
async fn chain_longer_than_limit_is_not_owned() {
    let store = seeded_store();
    let permitter = permitter(&store, permissions()).with_max_owner_depth(0);

    let owns = permitter
        .viewer_can_admin(&member(&alice()), &lesson())
        .await
        .unwrap();

    assert!(!owns);
    assert!(logs_contain("ownership chain too deep"));
}

#[tokio::test]
async fn create_tests_the_create_parent() {
    let store = seeded_store();
    let permitter = permitter(&store, permissions());
    let candidate = Lesson {
        id: String::new(),
        number: 2,
        title: "Borrowing".to_owned(),
        ..lesson()
    };

    assert!(permitter.viewer_can_create(&member(&alice()), &candidate).await.unwrap());
    let err = permitter
        .check(&member(&bob()), AccessKind::Create, &candidate)
        .await
        .unwrap_err();
    assert_eq!(err, ContentError::AccessDenied);
}

#[tokio::test]
async fn write_outside_permitted_fields_is_denied() {
    let store = seeded_store();
    let permitter = permitter(&store, permissions());
    let candidate = Study {
        id: "chosen_id".to_owned(),
        user_id: "user_alice".to_owned(),
        name: "go".to_owned(),
        ..Study::default()
    };

    let err = permitter
        .check(&member(&alice()), AccessKind::Create, &candidate)
        .await
        .unwrap_err();

    assert_eq!(err, ContentError::AccessDenied);
}

#[tokio::test]
async fn patch_id_is_not_validated() {
    let store = seeded_store();
    let permitter = permitter(&store, permissions());
    let patch = Study {
        id: "study_1".to_owned(),
        description: "Rust, the long way".to_owned(),
        ..Study::default()
    };

    let permission = permitter
        .check_patch(&member(&alice()), &study(), &patch)
        .await
        .unwrap();

    assert!(permission.allows("description"));
}

#[tokio::test]
async fn patch_ownership_comes_from_stored_record() {
    let store = seeded_store();
    let permitter = permitter(&store, permissions());
    let hijack = Study {
        id: "study_1".to_owned(),
        user_id: "user_bob".to_owned(),
        ..Study::default()
    };

    let err = permitter
        .check_patch(&member(&bob()), &study(), &hijack)
        .await
        .unwrap_err();

    assert_eq!(err, ContentError::AccessDenied);
}

#[tokio::test]
async fn check_kind_uses_viewer_roles_only() {
    let store = seeded_store();
    let permitter = permitter(&store, permissions());

    let permission = permitter
        .check_kind(&member(&alice()), AccessKind::Read, EntityKind::User)
        .await
        .unwrap();

    assert!(!permission.allows("name"));
}

#[tokio::test]
async fn guest_without_grants_is_denied() {
    let store = seeded_store();
    let permitter = permitter(&store, permissions());

    let err = permitter
        .check(&Viewer::guest(), AccessKind::Read, &study())
        .await
        .unwrap_err();

    assert_eq!(err, ContentError::AccessDenied);
}

#[tokio::test]
async fn unavailable_permission_store_is_conn_closed() {
    let store = seeded_store();
    let grants = permissions();
    grants.set_available(false);
    let permitter = permitter(&store, grants);

    let err = permitter
        .check(&member(&alice()), AccessKind::Read, &study())
        .await
        .unwrap_err();

    assert_eq!(err, ContentError::ConnClosed);
}

/// Answers every query with a row for `read user`.
struct MisroutedPermissions;

#[async_trait]
impl PermissionStore for MisroutedPermissions {
    async fn get_query_permission(
        &self,
        _operation: Operation,
        _roles: &[String],
    ) -> Result<Option<QueryPermission>, ContentError> {
        Ok(Some(QueryPermission::new(
            Operation::new(AccessKind::Read, EntityKind::User),
            FieldSet::All,
        )))
    }
}

#[tokio::test]
async fn permission_for_another_operation_is_wrong_type() {
    let store = seeded_store();
    let permitter = permitter(&store, Arc::new(MisroutedPermissions));

    let err = permitter
        .check(&member(&alice()), AccessKind::Read, &study())
        .await
        .unwrap_err();

    assert!(matches!(err, ContentError::WrongType { .. }));
}

#[tokio::test]
async fn admin_role_is_matched_by_role_set() {
    let store = seeded_store();
    let grants = MemoryPermissionStore::new().with_grant(
        roles::ADMIN,
        AccessKind::Delete,
        EntityKind::Study,
        FieldSet::All,
    );
    let permitter = permitter(&store, Arc::new(grants));
    let admin = Viewer::builder().id("user_root").role(roles::ADMIN).build();

    let permission = permitter
        .check(&admin, AccessKind::Delete, &study())
        .await
        .unwrap();

    assert_eq!(
        permission.operation(),
        Operation::new(AccessKind::Delete, EntityKind::Study)
    );
}
