//! Role-indexed grant table.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use content_sdk::{
    AccessKind, ContentError, EntityKind, FieldSet, Operation, PermissionStore, QueryPermission,
};
use parking_lot::RwLock;
use tracing::debug;

/// [`PermissionStore`] answering from grants registered per `(operation, role)`.
///
/// A viewer holding several roles gets the union of their grants.
#[derive(Debug)]
pub struct MemoryPermissionStore {
    grants: RwLock<HashMap<(Operation, String), FieldSet>>,
    available: AtomicBool,
    calls: AtomicUsize,
}

impl Default for MemoryPermissionStore {
    fn default() -> Self {
        Self {
            grants: RwLock::default(),
            available: AtomicBool::new(true),
            calls: AtomicUsize::new(0),
        }
    }
}

impl MemoryPermissionStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Grant `fields` of `kind` to `role` for `access`. Repeated grants widen.
    pub fn grant(&self, role: &str, access: AccessKind, kind: EntityKind, fields: FieldSet) {
        let mut grants = self.grants.write();
        let key = (Operation::new(access, kind), role.to_owned());
        let merged = match grants.remove(&key) {
            Some(existing) => existing.union(fields),
            None => fields,
        };
        grants.insert(key, merged);
    }

    /// Builder form of [`MemoryPermissionStore::grant`].
    #[must_use]
    pub fn with_grant(
        self,
        role: &str,
        access: AccessKind,
        kind: EntityKind,
        fields: FieldSet,
    ) -> Self {
        self.grant(role, access, kind, fields);
        self
    }

    /// An unavailable store answers every query with `ConnClosed`.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::Relaxed);
    }

    /// Queries served so far.
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl PermissionStore for MemoryPermissionStore {
    async fn get_query_permission(
        &self,
        operation: Operation,
        roles: &[String],
    ) -> Result<Option<QueryPermission>, ContentError> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        if !self.available.load(Ordering::Relaxed) {
            return Err(ContentError::ConnClosed);
        }

        let grants = self.grants.read();
        let fields = roles
            .iter()
            .filter_map(|role| grants.get(&(operation, role.clone())).cloned())
            .reduce(FieldSet::union);

        debug!(%operation, ?roles, granted = fields.is_some(), "query permission resolved");
        Ok(fields.map(|fields| QueryPermission::new(operation, fields)))
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    fn read_user() -> Operation {
        Operation::new(AccessKind::Read, EntityKind::User)
    }

    #[tokio::test]
    async fn roles_union_their_grants() {
        let store = MemoryPermissionStore::new()
            .with_grant("member", AccessKind::Read, EntityKind::User, FieldSet::only(["id", "login"]))
            .with_grant("owner", AccessKind::Read, EntityKind::User, FieldSet::only(["name"]));

        let permission = store
            .get_query_permission(read_user(), &["member".to_owned(), "owner".to_owned()])
            .await
            .unwrap()
            .unwrap();

        assert_eq!(permission.fields, FieldSet::only(["id", "login", "name"]));
    }

    #[tokio::test]
    async fn ungranted_roles_get_none() {
        let store = MemoryPermissionStore::new().with_grant(
            "admin",
            AccessKind::Read,
            EntityKind::User,
            FieldSet::All,
        );

        let permission = store
            .get_query_permission(read_user(), &["guest".to_owned()])
            .await
            .unwrap();

        assert!(permission.is_none());
    }

    #[tokio::test]
    async fn unavailable_store_is_conn_closed() {
        let store = MemoryPermissionStore::new();
        store.set_available(false);

        let err = store.get_query_permission(read_user(), &[]).await.unwrap_err();

        assert_eq!(err, ContentError::ConnClosed);
        assert_eq!(store.calls(), 1);
    }
}
