#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! # content-macros
//!
//! Procedural macros for StudyHub content entities.
//!
//! ## `#[derive(Permissible)]`
//!
//! Implements `content_sdk::Entity` for a record struct: the per-kind field
//! table used for read-masking and write validation, the ownership rule and
//! the create-eligibility rule consulted by the permitter, and the natural
//! lookup keys used to cross-prime loaders.
//!
//! **IMPORTANT**: ownership and create-eligibility must both be explicitly
//! declared. No implicit defaults.
//!
//! ### Example
//!
//! ```ignore
//! use content_sdk::Permissible;
//!
//! #[derive(Clone, Debug, Default, Permissible)]
//! #[permit(
//!     kind = "lesson",
//!     owner_via(study = "study_id"),
//!     create_via(study = "study_id"),
//!     lookup(number = ["study_id", "number"])
//! )]
//! pub struct Lesson {
//!     pub id: String,
//!     pub study_id: String,
//!     pub number: i32,
//!     pub title: String,
//! }
//! ```
//!
//! ### Attributes
//!
//! - **Kind**: `kind = "snake_case_kind"` (required)
//! - **Owner**: `owner = "field"` OR `owner_via(kind = "field")` OR `no_owner`
//! - **Create parent**: `create_parent = "field"` OR `create_via(kind = "field")` OR `no_create_parent`
//! - **Lookups**: `lookup(name = ["field", ...])` (repeatable)

use proc_macro::TokenStream;
use proc_macro_error2::proc_macro_error;
use syn::{DeriveInput, parse_macro_input};

mod permissible;

/// Derive macro for implementing `content_sdk::Entity`.
///
/// The struct must have named fields, one of them `id: String`. Every field
/// type must implement `content_sdk::FieldValue`, `Clone` and `Default`.
///
/// # Attributes
///
/// **Both rules must be explicitly specified:**
///
/// - `owner = "field"` - the field holds the owning user's id
/// - `owner_via(kind = "field")` - the record is owned by whoever owns the referenced record
/// - `no_owner` - nobody owns the record
/// - `create_parent = "field"` - creating requires the viewer to be the referenced user
/// - `create_via(kind = "field")` - creating requires the viewer to own the referenced record
/// - `no_create_parent` - creating never grants the owner role
/// - `lookup(name = ["field", ...])` - natural key, one loader per lookup (repeatable)
///
/// # Example
///
/// ```ignore
/// #[derive(Clone, Debug, Default, Permissible)]
/// #[permit(kind = "topic", no_owner, no_create_parent, lookup(name = ["name"]))]
/// pub struct Topic {
///     pub id: String,
///     pub name: String,
/// }
/// ```
#[proc_macro_derive(Permissible, attributes(permit))]
#[proc_macro_error]
pub fn derive_permissible(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    permissible::expand_derive_permissible(input).into()
}
