#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Content SDK
//!
//! This crate provides the public vocabulary of the `content` module:
//!
//! - [`EntityKind`], [`AccessKind`], [`Operation`] - what is being accessed and how
//! - [`models`] - raw record structs, one per entity kind
//! - [`Entity`] - per-kind field table and ownership rules, derived with [`Permissible`]
//! - [`QueryPermission`], [`PermissionStore`] - role-indexed field grants
//! - [`RecordStore`], [`ContentStore`] - storage collaborator traits
//! - [`ContentError`] - error taxonomy
//!
//! ## Usage
//!
//! ```ignore
//! use content_sdk::{Entity, EntityKind, models::Study};
//!
//! let study = Study { id: "study_1".into(), user_id: "user_1".into(), ..Study::default() };
//! assert_eq!(Study::KIND, EntityKind::Study);
//! assert!(study.is_set("user_id"));
//! ```

// Generated `Entity` impls refer to `::content_sdk`, including the ones in this crate.
extern crate self as content_sdk;

pub mod entity;
pub mod error;
pub mod fields;
pub mod kinds;
pub mod models;
pub mod permission;
pub mod store;

pub use content_macros::Permissible;
pub use entity::{Entity, Lookup, OwnerRef};
pub use error::ContentError;
pub use fields::FieldValue;
pub use kinds::{AccessKind, EntityKind, Operation};
pub use permission::{FieldSet, PermissionStore, QueryPermission};
pub use store::{ContentStore, ListFilter, RecordStore, Stored};
