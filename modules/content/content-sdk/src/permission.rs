//! Role-indexed field grants.

use std::collections::BTreeSet;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ContentError;
use crate::kinds::Operation;

/// Fields granted by one permission row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldSet {
    /// Every field of the kind.
    All,
    Only(BTreeSet<String>),
}

impl FieldSet {
    pub fn only<I, S>(fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::Only(fields.into_iter().map(Into::into).collect())
    }

    #[must_use]
    pub fn allows(&self, field: &str) -> bool {
        match self {
            Self::All => true,
            Self::Only(fields) => fields.contains(field),
        }
    }

    /// Union of two grants.
    #[must_use]
    pub fn union(self, other: Self) -> Self {
        match (self, other) {
            (Self::Only(mut a), Self::Only(b)) => {
                a.extend(b);
                Self::Only(a)
            }
            _ => Self::All,
        }
    }
}

/// The fields an operation exposes to a set of roles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryPermission {
    pub operation: Operation,
    pub fields: FieldSet,
}

impl QueryPermission {
    #[must_use]
    pub fn new(operation: Operation, fields: FieldSet) -> Self {
        Self { operation, fields }
    }

    #[must_use]
    pub fn allows(&self, field: &str) -> bool {
        self.fields.allows(field)
    }
}

/// Source of [`QueryPermission`] rows.
#[async_trait]
pub trait PermissionStore: Send + Sync {
    /// Permission granted for `operation` to a viewer holding `roles`.
    ///
    /// `roles` is sorted and deduplicated. Returns `None` when no role is
    /// granted the operation.
    ///
    /// # Errors
    ///
    /// - `ConnClosed` if the store is unavailable
    /// - `Storage` for backend failures
    async fn get_query_permission(
        &self,
        operation: Operation,
        roles: &[String],
    ) -> Result<Option<QueryPermission>, ContentError>;
}
