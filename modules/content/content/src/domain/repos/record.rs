//! Operations shared by every repository.

use std::marker::PhantomData;
use std::sync::Arc;

use content_sdk::{AccessKind, ContentError, Entity, ListFilter};
use studyhub_security::Viewer;
use tracing::{debug, instrument};

use super::session::Session;
use crate::domain::context::{RequestCtx, within_deadline};
use crate::domain::loaders::{EntityLoader, LoadedBy, Loaders};
use crate::domain::permit::Permit;
use crate::domain::permitter::Permitter;

/// Repository over one entity kind: a loader set plus the request's permitter.
pub struct RecordRepo<E> {
    loaders: Arc<Loaders>,
    session: Session,
    _kind: PhantomData<fn() -> E>,
}

impl<E: LoadedBy> RecordRepo<E> {
    #[must_use]
    pub fn new(loaders: Arc<Loaders>) -> Self {
        Self {
            loaders,
            session: Session::default(),
            _kind: PhantomData,
        }
    }

    /// # Errors
    ///
    /// `NilPermitter` when no permitter is supplied.
    pub fn open(&self, permitter: Option<Arc<Permitter>>) -> Result<(), ContentError> {
        self.session.open(permitter)
    }

    /// Close the session and clear this kind's loader caches.
    pub fn close(&self) {
        self.session.close();
        self.loader().clear_all();
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.session.is_open()
    }

    /// # Errors
    ///
    /// `ConnClosed` outside open/close, `NotFound` for the viewer or the
    /// record, `AccessDenied` when the viewer may not read the kind.
    #[instrument(parent = ctx.span(), skip_all, fields(kind = E::KIND.as_str(), id = id))]
    pub async fn get(&self, ctx: &RequestCtx, id: &str) -> Result<Permit<E>, ContentError> {
        let (permitter, viewer) = self.enter(ctx)?;
        let record = self.loader().get(id).await?;
        permit_read(&permitter, viewer, record).await
    }

    /// Fetch by the natural key named `lookup`.
    ///
    /// # Errors
    ///
    /// As [`RecordRepo::get`]; `Invalid` for an undeclared lookup.
    #[instrument(parent = ctx.span(), skip_all, fields(kind = E::KIND.as_str(), lookup = lookup))]
    pub async fn get_by(
        &self,
        ctx: &RequestCtx,
        lookup: &str,
        parts: &[&str],
    ) -> Result<Permit<E>, ContentError> {
        let (permitter, viewer) = self.enter(ctx)?;
        let record = self.loader().get_by(lookup, parts).await?;
        permit_read(&permitter, viewer, record).await
    }

    /// List records matching `filter`.
    ///
    /// Read permission is computed once, against the first record, and
    /// shared by the whole list. A viewer denied that record gets an empty
    /// list.
    ///
    /// # Errors
    ///
    /// `ConnClosed`, `NotFound` for the viewer or storage handle, and
    /// storage or permission-store failures.
    #[instrument(parent = ctx.span(), skip_all, fields(kind = E::KIND.as_str()))]
    pub async fn list(
        &self,
        ctx: &RequestCtx,
        filter: ListFilter,
    ) -> Result<Vec<Permit<E>>, ContentError> {
        let (permitter, viewer) = self.enter(ctx)?;
        let store = ctx.store()?;

        let records = within_deadline(ctx, E::records(store.as_ref()).list(&filter)).await?;
        let Some(first) = records.first() else {
            return Ok(Vec::new());
        };

        let permission = match permitter.check(viewer, AccessKind::Read, first).await {
            Ok(permission) => permission,
            Err(ContentError::AccessDenied) => {
                debug!(rows = records.len(), "list hidden from viewer");
                return Ok(Vec::new());
            }
            Err(e) => return Err(e),
        };

        for record in &records {
            self.loader().prime(record);
        }
        Ok(records
            .into_iter()
            .map(|record| Permit::new(permission.clone(), record))
            .collect())
    }

    /// # Errors
    ///
    /// `AccessDenied` before any storage call when the viewer may not create
    /// the record or sets a field outside the permission.
    pub async fn create(&self, ctx: &RequestCtx, record: E) -> Result<Permit<E>, ContentError> {
        self.insert_as(ctx, AccessKind::Create, record).await
    }

    /// Store a new record after authorizing `access` against it.
    ///
    /// # Errors
    ///
    /// As [`RecordRepo::create`].
    #[instrument(parent = ctx.span(), skip_all, fields(kind = E::KIND.as_str(), access = access.as_str()))]
    pub async fn insert_as(
        &self,
        ctx: &RequestCtx,
        access: AccessKind,
        record: E,
    ) -> Result<Permit<E>, ContentError> {
        let (permitter, viewer) = self.enter(ctx)?;
        let store = ctx.store()?;

        permitter.check(viewer, access, &record).await?;
        let created = within_deadline(ctx, E::records(store.as_ref()).create(record)).await?;
        debug!(id = created.id(), "record stored");

        self.refresh(None, &created);
        permit_read(&permitter, viewer, created).await
    }

    /// Apply the non-zero fields of `patch` to the record `patch.id()`.
    ///
    /// # Errors
    ///
    /// `NotFound` for a missing record; `AccessDenied` before the write when
    /// the viewer may not update it or sets a field outside the permission.
    #[instrument(parent = ctx.span(), skip_all, fields(kind = E::KIND.as_str(), id = patch.id()))]
    pub async fn update(&self, ctx: &RequestCtx, patch: E) -> Result<Permit<E>, ContentError> {
        let (permitter, viewer) = self.enter(ctx)?;
        let store = ctx.store()?;

        let current = self.loader().get(patch.id()).await?;
        permitter.check_patch(viewer, &current, &patch).await?;
        let updated = within_deadline(ctx, E::records(store.as_ref()).update(patch)).await?;

        self.refresh(Some(&current), &updated);
        permit_read(&permitter, viewer, updated).await
    }

    /// # Errors
    ///
    /// `NotFound` for a missing record; `AccessDenied` before the write when
    /// the viewer may not delete it.
    pub async fn delete(&self, ctx: &RequestCtx, id: &str) -> Result<Permit<E>, ContentError> {
        self.enter(ctx)?;
        let current = self.loader().get(id).await?;
        self.remove_as(ctx, AccessKind::Delete, current).await
    }

    /// Remove `current` after authorizing `access` against it. The returned
    /// permit views the record as it was.
    ///
    /// # Errors
    ///
    /// As [`RecordRepo::delete`].
    #[instrument(parent = ctx.span(), skip_all, fields(kind = E::KIND.as_str(), access = access.as_str(), id = current.id()))]
    pub async fn remove_as(
        &self,
        ctx: &RequestCtx,
        access: AccessKind,
        current: E,
    ) -> Result<Permit<E>, ContentError> {
        let (permitter, viewer) = self.enter(ctx)?;
        let store = ctx.store()?;

        permitter.check(viewer, access, &current).await?;
        let removed = within_deadline(ctx, E::records(store.as_ref()).delete(current.id())).await?;

        self.loader().clear(&current);
        self.loader().clear(&removed);
        permit_read(&permitter, viewer, removed).await
    }

    /// Remove the record found under the natural key `lookup` after
    /// authorizing `access` against it.
    ///
    /// # Errors
    ///
    /// As [`RecordRepo::delete`]; `Invalid` for an undeclared lookup.
    pub async fn remove_by(
        &self,
        ctx: &RequestCtx,
        access: AccessKind,
        lookup: &str,
        parts: &[&str],
    ) -> Result<Permit<E>, ContentError> {
        self.enter(ctx)?;
        let current = self.loader().get_by(lookup, parts).await?;
        self.remove_as(ctx, access, current).await
    }

    /// Permitter and viewer every operation needs; fails before any loader is touched.
    fn enter<'c>(&self, ctx: &'c RequestCtx) -> Result<(Arc<Permitter>, &'c Viewer), ContentError> {
        let permitter = self.session.permitter()?;
        Ok((permitter, ctx.viewer()?))
    }

    fn loader(&self) -> &EntityLoader<E> {
        self.loaders.of::<E>()
    }

    /// Evict every key of the old and new versions, then cache the new one.
    fn refresh(&self, old: Option<&E>, new: &E) {
        let loader = self.loader();
        if let Some(old) = old {
            loader.clear(old);
        }
        loader.clear(new);
        loader.prime(new);
    }
}

/// A permit is never returned to a viewer who cannot read the record.
async fn permit_read<E: Entity>(
    permitter: &Permitter,
    viewer: &Viewer,
    record: E,
) -> Result<Permit<E>, ContentError> {
    let permission = permitter.check(viewer, AccessKind::Read, &record).await?;
    Ok(Permit::new(permission, record))
}
