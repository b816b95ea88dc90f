//! Identifier management using string interning
//!
//! This module provides the [`Id`] type. Every node, cluster and diagram in a
//! topology is keyed by an `Id`; human-readable labels are display attributes
//! only, so two elements may share a label without colliding.

use std::{
    fmt,
    sync::{Mutex, MutexGuard, OnceLock},
};

use string_interner::{DefaultStringInterner, DefaultSymbol};

/// Global string interner for identifier storage.
///
/// # Thread Safety
///
/// This uses `Mutex` for thread-safe access to the string interner.
static INTERNER: OnceLock<Mutex<DefaultStringInterner>> = OnceLock::new();

fn interner() -> MutexGuard<'static, DefaultStringInterner> {
    INTERNER
        .get_or_init(|| Mutex::new(DefaultStringInterner::new()))
        .lock()
        .expect("Failed to acquire interner lock")
}

/// Interned identifier
///
/// `Id` is `Copy` and compares in constant time, which makes it a cheap key for
/// arena lookups and edge endpoints.
///
/// # Examples
///
/// ```
/// use trellis_core::identifier::Id;
///
/// let queue = Id::sequenced("node", 0);
/// assert_eq!(queue, "node_0");
///
/// let named = Id::new("pipeline");
/// assert_ne!(queue, named);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Id(DefaultSymbol);

impl Id {
    /// Creates an `Id` from &str.
    ///
    /// # Arguments
    ///
    /// * `name` - The string representation of the identifier
    pub fn new(name: &str) -> Self {
        Self(interner().get_or_intern(name))
    }

    /// Creates an identifier of the form `<prefix>_<index>`.
    ///
    /// Used for counter-generated identifiers, so that identical construction
    /// sequences produce identical identifiers.
    ///
    /// # Examples
    ///
    /// ```
    /// use trellis_core::identifier::Id;
    ///
    /// assert_eq!(Id::sequenced("cluster", 2), "cluster_2");
    /// ```
    pub fn sequenced(prefix: &str, index: usize) -> Self {
        Self::new(&format!("{prefix}_{index}"))
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let str_value = {
            let interner = interner();
            interner
                .resolve(self.0)
                .expect("Symbol should exist in interner")
                .to_string()
        };
        f.write_str(&str_value)
    }
}

impl From<&str> for Id {
    /// Creates an `Id` from a string slice
    ///
    /// This is a convenience implementation that calls `Id::new`.
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl PartialEq<str> for Id {
    /// Allows direct comparison with string slices: `id == "string"`
    fn eq(&self, other: &str) -> bool {
        let interner = interner();
        interner
            .resolve(self.0)
            .is_some_and(|self_str| self_str == other)
    }
}

impl PartialEq<&str> for Id {
    fn eq(&self, other: &&str) -> bool {
        self == *other
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn test_new() {
        let id1 = Id::new("queue");
        let id2 = Id::new("queue");
        let id3 = Id::new("db");

        assert_eq!(id1, id2);
        assert_ne!(id1, id3);
        assert_eq!(id1, "queue");
    }

    #[test]
    fn test_sequenced() {
        let first = Id::sequenced("node", 0);
        let second = Id::sequenced("node", 1);
        let cluster = Id::sequenced("cluster", 0);

        assert_ne!(first, second);
        assert_ne!(first, cluster);
        assert_eq!(first, "node_0");
        assert_eq!(cluster, "cluster_0");
    }

    #[test]
    fn test_display_trait() {
        let id = Id::new("display_test");
        assert_eq!(format!("{id}"), "display_test");
        assert_eq!(id.to_string(), "display_test");
    }

    #[test]
    fn test_hash_and_eq() {
        use std::collections::HashMap;

        let id1 = Id::new("key1");
        let id2 = Id::new("key1");
        let id3 = Id::new("key2");

        let mut map = HashMap::new();
        map.insert(id1, "value1");
        map.insert(id3, "value2");

        assert_eq!(map.get(&id2), Some(&"value1"));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_partial_eq_str_ref() {
        let id = Id::new("Component");
        let other = String::from("Element");

        assert!(id == "Component");
        assert!(id != other.as_str());
    }

    proptest! {
        #[test]
        fn sequenced_ids_are_distinct_per_index(a in 0usize..10_000, b in 0usize..10_000) {
            let left = Id::sequenced("node", a);
            let right = Id::sequenced("node", b);
            prop_assert_eq!(left == right, a == b);
        }
    }
}
