#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Content module
//!
//! Data-access and authorization core for StudyHub content. Every inbound
//! request gets its own [`RequestScope`]: one set of batching loaders, one
//! [`Permitter`] with its permission cache, and one opened repository per
//! entity kind. Nothing is shared across requests.
//!
//! ## Usage
//!
//! ```ignore
//! use content::{ContentConfig, ContentService, RequestCtx};
//!
//! let service = ContentService::new(permission_store, ContentConfig::default());
//!
//! let ctx = RequestCtx::builder()
//!     .viewer(viewer)
//!     .store(store)
//!     .span(tracing::info_span!("request", id = %request_id))
//!     .build();
//! let scope = service.begin(ctx)?;
//!
//! let study = scope.repos().study.get(scope.ctx(), "study_1").await?;
//! println!("{}", study.name()?);
//! ```
//!
//! ## Layering
//!
//! - `domain` - request context, loaders, permitter, permits, repositories
//! - `infra` - in-memory storage and permission backends
//! - `service` - per-request wiring

pub mod config;
pub mod service;

// === INTERNAL MODULES ===
// Exposed for integration tests; consumers use the re-exports below.
#[doc(hidden)]
pub mod domain;
#[doc(hidden)]
pub mod infra;

#[cfg(test)]
mod test_support;

pub use config::{ConfigError, ContentConfig};
pub use domain::context::{RequestCtx, RequestCtxBuilder};
pub use domain::loaders::{EntityLoader, Loaders, OwnerLookup};
pub use domain::permit::Permit;
pub use domain::permitter::{FieldPermission, Permitter};
pub use domain::repos::Repos;
pub use service::{ContentService, RequestScope};
