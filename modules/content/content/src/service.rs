//! Per-request wiring of loaders, permitter and repositories.

use std::sync::Arc;

use content_sdk::{ContentError, PermissionStore};
use tracing::debug;

use crate::config::ContentConfig;
use crate::domain::context::RequestCtx;
use crate::domain::loaders::{Loaders, OwnerLookup};
use crate::domain::permitter::Permitter;
use crate::domain::repos::Repos;

// ============================================================================
// Service Implementation
// ============================================================================

/// Long-lived entry point. Holds only what is safe to share across
/// requests; everything cached lives in a [`RequestScope`].
pub struct ContentService {
    permissions: Arc<dyn PermissionStore>,
    config: ContentConfig,
}

impl ContentService {
    #[must_use]
    pub fn new(permissions: Arc<dyn PermissionStore>, config: ContentConfig) -> Self {
        Self {
            permissions,
            config,
        }
    }

    #[must_use]
    pub fn config(&self) -> &ContentConfig {
        &self.config
    }

    /// Build the loaders, permitter and opened repositories of one request.
    ///
    /// # Errors
    ///
    /// `NotFound { resource: "handle" }` when `ctx` carries no storage handle.
    pub fn begin(&self, ctx: RequestCtx) -> Result<RequestScope, ContentError> {
        let store = Arc::clone(ctx.store()?);

        let loaders = Arc::new(Loaders::new(store.as_ref(), &self.config.loader, ctx.span()));
        loaders.set_deadline(ctx.deadline());

        let owners: Arc<dyn OwnerLookup> = Arc::clone(&loaders) as Arc<dyn OwnerLookup>;
        let permitter = Arc::new(
            Permitter::new(
                Arc::clone(&self.permissions),
                owners,
                &self.config.permission_cache,
                ctx.span(),
            )
            .with_max_owner_depth(self.config.max_owner_depth),
        );
        permitter.set_deadline(ctx.deadline());

        let repos = Repos::new(&loaders);
        repos.open(Some(Arc::clone(&permitter)))?;
        debug!(parent: ctx.span(), deadline = ?ctx.deadline(), "request scope opened");

        Ok(RequestScope {
            ctx,
            loaders,
            permitter,
            repos,
        })
    }
}

// ============================================================================
// Request Scope
// ============================================================================

/// Everything one request reads through. Dropping the scope closes every
/// repository and empties every cache.
pub struct RequestScope {
    ctx: RequestCtx,
    loaders: Arc<Loaders>,
    permitter: Arc<Permitter>,
    repos: Repos,
}

impl RequestScope {
    #[must_use]
    pub fn ctx(&self) -> &RequestCtx {
        &self.ctx
    }

    #[must_use]
    pub fn repos(&self) -> &Repos {
        &self.repos
    }

    #[must_use]
    pub fn permitter(&self) -> &Permitter {
        &self.permitter
    }

    #[must_use]
    pub fn loaders(&self) -> &Loaders {
        &self.loaders
    }

    /// Close every repository. Later repository calls fail with `ConnClosed`.
    pub fn close(&self) {
        self.repos.close();
        self.permitter.clear();
        self.loaders.clear_all();
    }
}

impl Drop for RequestScope {
    fn drop(&mut self) {
        self.close();
        debug!(parent: self.ctx.span(), "request scope closed");
    }
}
