//! Domain layer: request context, loaders, permitter, permits and repositories.
//!
//! ## Flow
//!
//! caller -> repository -> entity loader (dedup, cache, batch fetch)
//! -> permitter check -> [`Permit`](permit::Permit) -> caller reads fields.
//!
//! Reads mask denied fields to their zero value; writes with a denied
//! field are rejected before storage is touched.

pub mod context;
pub mod loaders;
pub mod permit;
pub mod permitter;
pub mod repos;

#[cfg(test)]
mod tests_permitter;

#[cfg(test)]
mod tests_repos;
