#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Request principal shared by every StudyHub module.
//!
//! A [`Viewer`] is resolved once per request by the caller (token parsing
//! happens upstream) and passed explicitly to every repository call.

pub mod roles;
pub mod viewer;

pub use viewer::{Viewer, ViewerBuilder};
