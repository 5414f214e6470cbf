//! Field-level authorization.
//!
//! [`Permitter`] answers "which fields of this record may this viewer see
//! or write" by combining the viewer's roles, an ownership test, and the
//! role-indexed [`QueryPermission`] rows of the permission store:
//!
//! 1. Build the operation from the access kind and the candidate's kind.
//! 2. Create tests the candidate's create parent; every other access tests
//!    its owner. A viewer who passes gets the `owner` role for this check only.
//! 3. Look the permission up for `(operation, roles)` through a per-request cache.
//! 4. Create and update additionally require every non-zero field of the
//!    candidate to be permitted.

use std::fmt;
use std::sync::Arc;

use content_sdk::{
    AccessKind, ContentError, Entity, EntityKind, Operation, OwnerRef, PermissionStore,
    QueryPermission,
};
use dataloader::{BatchLoader, Key, LoaderConfig};
use studyhub_security::{Viewer, roles};
use tokio::time::Instant;
use tracing::{Span, debug, warn};

use super::loaders::OwnerLookup;

/// Default number of `owner_via` hops followed when resolving ownership.
pub const DEFAULT_MAX_OWNER_DEPTH: usize = 4;

/// Field-permission function produced by one [`Permitter`] check.
#[derive(Debug, Clone)]
pub struct FieldPermission {
    operation: Operation,
    permission: Arc<QueryPermission>,
}

impl FieldPermission {
    #[must_use]
    pub fn allows(&self, field: &str) -> bool {
        self.permission.allows(field)
    }

    #[must_use]
    pub fn operation(&self) -> Operation {
        self.operation
    }
}

pub struct Permitter {
    permissions: BatchLoader<Arc<QueryPermission>, ContentError>,
    owners: Arc<dyn OwnerLookup>,
    max_owner_depth: usize,
    span: Span,
}

impl fmt::Debug for Permitter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Permitter")
            .field("permissions", &self.permissions)
            .field("max_owner_depth", &self.max_owner_depth)
            .finish_non_exhaustive()
    }
}

impl Permitter {
    #[must_use]
    pub fn new(
        store: Arc<dyn PermissionStore>,
        owners: Arc<dyn OwnerLookup>,
        cache: &LoaderConfig,
        span: &Span,
    ) -> Self {
        let permissions = BatchLoader::per_key("query_permission", cache, span, move |key: Key| {
            let store = Arc::clone(&store);
            async move { fetch_permission(store.as_ref(), &key).await }
        });

        Self {
            permissions,
            owners,
            max_owner_depth: DEFAULT_MAX_OWNER_DEPTH,
            span: span.clone(),
        }
    }

    #[must_use]
    pub fn with_max_owner_depth(mut self, depth: usize) -> Self {
        self.max_owner_depth = depth;
        self
    }

    pub fn set_deadline(&self, deadline: Option<Instant>) {
        self.permissions.set_deadline(deadline);
    }

    /// Authorize `access` to `candidate`.
    ///
    /// # Errors
    ///
    /// - `AccessDenied` when no permission row matches the viewer's roles, or
    ///   when a create/update candidate sets a field that is not permitted
    /// - `ConnClosed` when the permission store is unavailable
    /// - `WrongType` when the store answers for a different operation
    pub async fn check<E: Entity>(
        &self,
        viewer: &Viewer,
        access: AccessKind,
        candidate: &E,
    ) -> Result<FieldPermission, ContentError> {
        let operation = Operation::new(access, E::KIND);
        let is_owner = if access == AccessKind::Create {
            self.viewer_can_create(viewer, candidate).await?
        } else {
            self.viewer_can_admin(viewer, candidate).await?
        };

        let permission = self.query_permission(viewer, operation, is_owner).await?;
        if access.writes_fields() {
            validate_fields(&permission, candidate.set_fields().into_iter())?;
        }

        Ok(FieldPermission {
            operation,
            permission,
        })
    }

    /// Authorize an update: ownership is taken from the stored record,
    /// field validation from the patch. The patch's `id` selects the
    /// record and is not validated.
    ///
    /// # Errors
    ///
    /// Same as [`Permitter::check`].
    pub async fn check_patch<E: Entity>(
        &self,
        viewer: &Viewer,
        current: &E,
        patch: &E,
    ) -> Result<FieldPermission, ContentError> {
        let operation = Operation::new(AccessKind::Update, E::KIND);
        let is_owner = self.viewer_can_admin(viewer, current).await?;

        let permission = self.query_permission(viewer, operation, is_owner).await?;
        validate_fields(
            &permission,
            patch.set_fields().into_iter().filter(|field| *field != "id"),
        )?;

        Ok(FieldPermission {
            operation,
            permission,
        })
    }

    /// Authorize `access` to a kind without a candidate record: the viewer's
    /// own roles only, no ownership elevation.
    ///
    /// # Errors
    ///
    /// Same as [`Permitter::check`], without field validation.
    pub async fn check_kind(
        &self,
        viewer: &Viewer,
        access: AccessKind,
        kind: EntityKind,
    ) -> Result<FieldPermission, ContentError> {
        let operation = Operation::new(access, kind);
        let permission = self.query_permission(viewer, operation, false).await?;

        Ok(FieldPermission {
            operation,
            permission,
        })
    }

    /// Whether the viewer owns `candidate`, directly or through its parents.
    ///
    /// # Errors
    ///
    /// Storage errors other than a missing parent.
    pub async fn viewer_can_admin<E: Entity>(
        &self,
        viewer: &Viewer,
        candidate: &E,
    ) -> Result<bool, ContentError> {
        self.owns(viewer, candidate.owner()).await
    }

    /// Whether the viewer owns the record `candidate` would be created under.
    ///
    /// # Errors
    ///
    /// Storage errors other than a missing parent.
    pub async fn viewer_can_create<E: Entity>(
        &self,
        viewer: &Viewer,
        candidate: &E,
    ) -> Result<bool, ContentError> {
        self.owns(viewer, candidate.create_parent()).await
    }

    /// Drop the permission cache.
    pub fn clear(&self) {
        self.permissions.clear_all();
    }

    async fn owns(&self, viewer: &Viewer, owner: Option<OwnerRef>) -> Result<bool, ContentError> {
        let mut next = owner;
        for _ in 0..=self.max_owner_depth {
            match next {
                None => return Ok(false),
                Some(OwnerRef::User(user_id)) => return Ok(viewer.is_user(&user_id)),
                Some(OwnerRef::Record { kind, id }) => {
                    next = match self.owners.owner_of(kind, &id).await {
                        Ok(owner) => owner,
                        Err(e) if e.is_not_found() => {
                            debug!(parent: &self.span, %kind, %id, "owning record is missing");
                            return Ok(false);
                        }
                        Err(e) => return Err(e),
                    };
                }
            }
        }

        warn!(parent: &self.span, depth = self.max_owner_depth, "ownership chain too deep");
        Ok(false)
    }

    async fn query_permission(
        &self,
        viewer: &Viewer,
        operation: Operation,
        is_owner: bool,
    ) -> Result<Arc<QueryPermission>, ContentError> {
        let mut role_set: Vec<&str> = viewer.roles().iter().map(String::as_str).collect();
        if is_owner {
            role_set.push(roles::OWNER);
        }
        role_set.sort_unstable();
        role_set.dedup();

        let key = Key::composite(
            [operation.access.as_str(), operation.kind.as_str()]
                .into_iter()
                .chain(role_set),
        );
        let result = self.permissions.load(key).await;
        if let Err(e) = &result {
            debug!(parent: &self.span, %operation, is_owner, error = %e, "permission check failed");
        }
        result
    }
}

/// Reject the check if any of `fields` is not granted.
fn validate_fields<'a>(
    permission: &QueryPermission,
    mut fields: impl Iterator<Item = &'a str>,
) -> Result<(), ContentError> {
    match fields.find(|field| !permission.allows(field)) {
        Some(field) => {
            warn!(operation = %permission.operation, field, "write to a field outside the permission");
            Err(ContentError::AccessDenied)
        }
        None => Ok(()),
    }
}

/// Batch fetch for one permission cache key: `access:kind[:role...]`.
async fn fetch_permission(
    store: &dyn PermissionStore,
    key: &Key,
) -> Result<Arc<QueryPermission>, ContentError> {
    let parts = key.split();
    let [access, kind, role_set @ ..] = parts.as_slice() else {
        return Err(ContentError::invalid(format!(
            "malformed permission key '{key}'"
        )));
    };
    let operation = Operation::new(access.parse()?, kind.parse()?);
    let role_set: Vec<String> = role_set.iter().map(|role| (*role).to_owned()).collect();

    match store.get_query_permission(operation, &role_set).await {
        Ok(Some(permission)) if permission.operation != operation => Err(
            ContentError::wrong_type(operation.to_string(), permission.operation.to_string()),
        ),
        Ok(Some(permission)) => Ok(Arc::new(permission)),
        Ok(None) => Err(ContentError::AccessDenied),
        Err(e) if e.is_not_found() => Err(ContentError::AccessDenied),
        Err(e) => Err(e),
    }
}
