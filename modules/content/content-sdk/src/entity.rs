//! The capability every stored record exposes to loaders and the permitter.

use crate::kinds::EntityKind;

/// Who a record belongs to, as declared by its kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum OwnerRef {
    /// Owned directly by the user with this id.
    User(String),
    /// Owned by whoever owns this other record.
    Record { kind: EntityKind, id: String },
}

/// A secondary natural key: the loader named `name` is keyed by the
/// composite of `fields`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Lookup {
    pub name: &'static str,
    pub fields: &'static [&'static str],
}

/// Per-kind field table and ownership rules.
///
/// Implemented with `#[derive(Permissible)]`; every method is generated from
/// the struct's named fields and its `#[permit(...)]` declaration.
pub trait Entity: Clone + Default + Send + Sync + 'static {
    const KIND: EntityKind;

    /// Every named field, in declaration order.
    const FIELDS: &'static [&'static str];

    const LOOKUPS: &'static [Lookup];

    fn id(&self) -> &str;

    fn set_id(&mut self, id: String);

    /// Whether `field` holds a non-zero value. Unknown fields are never set.
    fn is_set(&self, field: &str) -> bool;

    /// Reset `field` to its zero value. Unknown fields are ignored.
    fn clear_field(&mut self, field: &str);

    fn field_text(&self, field: &str) -> Option<String>;

    /// Copy every non-zero field of `patch` except `id` onto `self`.
    fn merge(&mut self, patch: &Self);

    /// Ownership rule consulted for every access except create.
    fn owner(&self) -> Option<OwnerRef>;

    /// Create-eligibility rule: the record whose owner may create this one.
    fn create_parent(&self) -> Option<OwnerRef>;

    /// Key parts of the named lookup, taken from this record.
    fn lookup_key(&self, lookup: &str) -> Option<Vec<String>>;

    /// Names of the non-zero fields.
    fn set_fields(&self) -> Vec<&'static str> {
        Self::FIELDS
            .iter()
            .copied()
            .filter(|field| self.is_set(field))
            .collect()
    }
}
