#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Request-scoped batching loader.
//!
//! - [`Key`] - opaque lookup key, optionally composed of several parts
//! - [`BatchLoader`] - deduplicating, caching loader that coalesces pending keys into one fetch
//! - [`BatchFn`] / [`PerKey`] - caller-supplied batch fetch functions
//! - [`LoaderConfig`] - batch window and chunk size
//! - [`LoaderError`] - failures raised by the loader itself (never by the fetch function)
//!
//! ## Usage
//!
//! ```ignore
//! use dataloader::{BatchLoader, Key, LoaderConfig};
//!
//! let loader = BatchLoader::per_key("study_by_id", &LoaderConfig::default(), &span, move |key: Key| {
//!     let store = store.clone();
//!     async move { store.study(key.as_str()).await }
//! });
//!
//! // Both calls share one fetch.
//! let (a, b) = tokio::join!(loader.load(Key::new("study_1")), loader.load(Key::new("study_1")));
//! ```

pub mod batch_fn;
pub mod config;
pub mod error;
pub mod key;
pub mod loader;

pub use batch_fn::{BatchFn, PerKey};
pub use config::LoaderConfig;
pub use error::LoaderError;
pub use key::{KEY_SEPARATOR, Key};
pub use loader::BatchLoader;
