//! Ordered multi-valued containers.
//!
//! Every request location (query string, form, headers, cookies, ...) is
//! exposed as a [`MultiDict`]: an ordered list of `(key, value)` pairs where
//! the same key may appear more than once.
//!
//! Storage uses a small-vector optimization so typical requests with a
//! handful of fields don't allocate for the container itself.

use smallvec::SmallVec;

use crate::Value;

/// Maximum number of entries stored inline (stack allocated).
const INLINE_ENTRIES: usize = 4;

/// An ordered container mapping keys to one or more values.
///
/// Lookups return the first value for a key; [`MultiDict::get_all`] returns
/// every value in insertion order. Header containers compare keys
/// case-insensitively.
///
/// # Example
///
/// ```rust
/// use reqparse_core::{MultiDict, Value};
///
/// let mut dict = MultiDict::new();
/// dict.push("tag", "a");
/// dict.push("tag", "b");
/// dict.push("page", 2);
///
/// assert_eq!(dict.get("tag"), Some(&Value::from("a")));
/// assert_eq!(dict.get_all("tag").count(), 2);
/// assert_eq!(dict.keys().collect::<Vec<_>>(), vec!["tag", "page"]);
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MultiDict {
    entries: SmallVec<[(String, Value); INLINE_ENTRIES]>,
    case_insensitive: bool,
}

impl MultiDict {
    /// Creates an empty container with case-sensitive keys.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty container whose keys compare ASCII case-insensitively.
    #[must_use]
    pub fn case_insensitive() -> Self {
        Self {
            entries: SmallVec::new(),
            case_insensitive: true,
        }
    }

    /// Creates a container with the given capacity.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: SmallVec::with_capacity(capacity),
            case_insensitive: false,
        }
    }

    /// Returns `true` if keys compare case-insensitively.
    #[must_use]
    pub fn is_case_insensitive(&self) -> bool {
        self.case_insensitive
    }

    fn key_matches(&self, stored: &str, key: &str) -> bool {
        if self.case_insensitive {
            stored.eq_ignore_ascii_case(key)
        } else {
            stored == key
        }
    }

    /// Appends a value for `key`, keeping any existing values.
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.entries.push((key.into(), value.into()));
    }

    /// Returns the first value stored for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(k, _)| self.key_matches(k, key))
            .map(|(_, v)| v)
    }

    /// Returns every value stored for `key`, in insertion order.
    pub fn get_all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a Value> + 'a {
        self.entries
            .iter()
            .filter(move |(k, _)| self.key_matches(k, key))
            .map(|(_, v)| v)
    }

    /// Returns `true` if at least one value is stored for `key`.
    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.iter().any(|(k, _)| self.key_matches(k, key))
    }

    /// Removes every value stored for `key`, returning how many were removed.
    pub fn remove(&mut self, key: &str) -> usize {
        let before = self.entries.len();
        let case_insensitive = self.case_insensitive;
        self.entries.retain(|(k, _)| {
            if case_insensitive {
                !k.eq_ignore_ascii_case(key)
            } else {
                k != key
            }
        });
        before - self.entries.len()
    }

    /// Returns the distinct keys in order of first appearance.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(i, (k, _))| {
                !self.entries[..*i]
                    .iter()
                    .any(|(prev, _)| self.key_matches(prev, k))
            })
            .map(|(_, (k, _))| k.as_str())
    }

    /// Returns an iterator over all `(key, value)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Appends every entry of `other`, after the existing entries.
    pub fn extend_from(&mut self, other: &Self) {
        self.entries.extend(other.entries.iter().cloned());
    }

    /// Returns the total number of entries, counting repeated keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the container has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Clears all entries, retaining allocated capacity.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for MultiDict {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            entries: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
            case_insensitive: false,
        }
    }
}

impl<K: Into<String>, V: Into<Value>> Extend<(K, V)> for MultiDict {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        self.entries
            .extend(iter.into_iter().map(|(k, v)| (k.into(), v.into())));
    }
}

impl<'a> IntoIterator for &'a MultiDict {
    type Item = (&'a str, &'a Value);
    type IntoIter = std::iter::Map<
        std::slice::Iter<'a, (String, Value)>,
        fn(&'a (String, Value)) -> (&'a str, &'a Value),
    >;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }
}
