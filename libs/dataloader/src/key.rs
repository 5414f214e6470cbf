//! Lookup keys and the composite key codec.

use std::fmt;

/// Separator placed between the parts of a composite key.
pub const KEY_SEPARATOR: char = ':';

/// Opaque key identifying one lookup in a [`BatchLoader`](crate::BatchLoader).
///
/// A composite key joins several string parts with [`KEY_SEPARATOR`].
/// [`Key::split`] inverts [`Key::composite`] only when no part contains the
/// separator. Parts are not escaped: a part containing `:` splits into
/// extra parts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Key(String);

impl Key {
    /// Create a single-part key.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Join `parts` into one composite key.
    #[must_use]
    pub fn composite<I, S>(parts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut joined = String::new();
        for (idx, part) in parts.into_iter().enumerate() {
            if idx > 0 {
                joined.push(KEY_SEPARATOR);
            }
            joined.push_str(part.as_ref());
        }
        Self(joined)
    }

    /// Split the key back into its parts.
    #[must_use]
    pub fn split(&self) -> Vec<&str> {
        self.0.split(KEY_SEPARATOR).collect()
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Key {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl AsRef<str> for Key {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
