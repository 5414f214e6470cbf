use std::fmt;
use std::sync::Arc;

use content_sdk::{ContentError, ContentStore};
use studyhub_security::Viewer;
use tokio::time::Instant;
use tracing::Span;

/// Per-request inputs threaded explicitly through every repository call.
#[derive(Clone)]
pub struct RequestCtx {
    viewer: Option<Viewer>,
    store: Option<Arc<dyn ContentStore>>,
    deadline: Option<Instant>,
    span: Span,
}

impl fmt::Debug for RequestCtx {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestCtx")
            .field("viewer", &self.viewer)
            .field("store", &self.store.is_some())
            .field("deadline", &self.deadline)
            .field("span", &self.span)
            .finish()
    }
}

impl RequestCtx {
    #[must_use]
    pub fn builder() -> RequestCtxBuilder {
        RequestCtxBuilder::default()
    }

    /// The authenticated caller.
    ///
    /// # Errors
    ///
    /// `NotFound { resource: "viewer" }` when the request carries no viewer.
    pub fn viewer(&self) -> Result<&Viewer, ContentError> {
        self.viewer
            .as_ref()
            .ok_or_else(|| ContentError::not_found("viewer"))
    }

    /// The storage handle for this request.
    ///
    /// # Errors
    ///
    /// `NotFound { resource: "handle" }` when the request carries no store.
    pub fn store(&self) -> Result<&Arc<dyn ContentStore>, ContentError> {
        self.store
            .as_ref()
            .ok_or_else(|| ContentError::not_found("handle"))
    }

    #[must_use]
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Span every log line of the request is emitted in.
    #[must_use]
    pub fn span(&self) -> &Span {
        &self.span
    }
}

pub struct RequestCtxBuilder {
    viewer: Option<Viewer>,
    store: Option<Arc<dyn ContentStore>>,
    deadline: Option<Instant>,
    span: Span,
}

impl Default for RequestCtxBuilder {
    fn default() -> Self {
        Self {
            viewer: None,
            store: None,
            deadline: None,
            span: Span::none(),
        }
    }
}

impl RequestCtxBuilder {
    #[must_use]
    pub fn viewer(mut self, viewer: Viewer) -> Self {
        self.viewer = Some(viewer);
        self
    }

    #[must_use]
    pub fn store(mut self, store: Arc<dyn ContentStore>) -> Self {
        self.store = Some(store);
        self
    }

    #[must_use]
    pub fn deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    #[must_use]
    pub fn span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    #[must_use]
    pub fn build(self) -> RequestCtx {
        RequestCtx {
            viewer: self.viewer,
            store: self.store,
            deadline: self.deadline,
            span: self.span,
        }
    }
}

/// Run a storage call under the request deadline, if any.
pub(crate) async fn within_deadline<T, F>(ctx: &RequestCtx, call: F) -> Result<T, ContentError>
where
    F: Future<Output = Result<T, ContentError>>,
{
    match ctx.deadline {
        Some(at) => tokio::time::timeout_at(at, call)
            .await
            .map_err(|_| ContentError::DeadlineExceeded)?,
        None => call.await,
    }
}
