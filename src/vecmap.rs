//! A wrapper around a vector of pairs that backs [`Value::Mapping`].
//!
//! ETF maps are written as a count followed by key/value pairs, and nothing requires
//! the keys to be ordered or even hashable on the host side (floats make perfectly
//! good keys). So a [`VecMap`] keeps its pairs in insertion order: decode order when it
//! came off the wire, and whatever order the caller built it in when it's going on.
//!
//! # Example
//!
//! ```
//! use etfpack::prelude::*;
//!
//! let mut vmap = VecMap::new();
//! vmap.push(Value::atom("b"), Value::from(2));
//! vmap.push(Value::atom("a"), Value::from(1));
//!
//! // insertion order is kept
//! let keys: Vec<&Value> = vmap.keys().collect();
//! assert_eq!(keys, vec![&Value::atom("b"), &Value::atom("a")]);
//!
//! assert_eq!(vmap.get(&Value::atom("a")), Some(&Value::from(1)));
//! ```
//!
//! [`Value::Mapping`]: crate::Value::Mapping

use std::{iter::FromIterator, slice::Iter, vec::IntoIter};

#[derive(PartialEq, Clone, Debug, Default)]
/// An insertion-ordered map implemented as a [`Vec`] of pairs.
///
/// See also: [module level documentation](`crate::vecmap`).
pub struct VecMap<K, V>(Vec<(K, V)>);

impl<K, V> VecMap<K, V> {
    /// Creates an empty [`VecMap`].
    pub fn new() -> Self { VecMap(Vec::new()) }

    /// Creates an empty [`VecMap`] with room for `cap` pairs.
    pub fn with_capacity(cap: usize) -> Self { VecMap(Vec::with_capacity(cap)) }

    /// Appends a pair. Duplicate keys are kept, the wire format allows them.
    ///
    /// # Arguments
    ///
    /// * `k: K` - The key.
    /// * `v: V` - The value.
    pub fn push(&mut self, k: K, v: V) { self.0.push((k, v)) }

    /// Returns length.
    ///
    /// # Example
    ///
    /// ```
    /// use etfpack::prelude::*;
    ///
    /// let vmap = VecMap::from(vec![("foo", "bar")]);
    ///
    /// // should have one element
    /// assert_eq!(vmap.len(), 1);
    /// ```
    pub fn len(&self) -> usize { self.0.len() }

    /// Indicates whether the [`VecMap`] is empty.
    pub fn is_empty(&self) -> bool { self.0.is_empty() }

    /// Returns an [`Iter`] of the key value pairs, in insertion order.
    pub fn iter(&self) -> Iter<(K, V)> { self.0.iter() }

    /// Returns the keys, in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &K> { self.0.iter().map(|(k, _)| k) }

    /// Returns the values, in insertion order.
    pub fn values(&self) -> impl Iterator<Item = &V> { self.0.iter().map(|(_, v)| v) }

    /// Consumes the [`VecMap`], returning the underlying pairs.
    pub fn into_vec(self) -> Vec<(K, V)> { self.0 }
}

impl<K: PartialEq, V> VecMap<K, V> {
    /// Returns the value of the first pair whose key equals `k`.
    ///
    /// This is a linear scan.
    pub fn get(&self, k: &K) -> Option<&V> {
        self.0.iter().find(|(key, _)| key == k).map(|(_, v)| v)
    }
}

impl<K, V> From<Vec<(K, V)>> for VecMap<K, V> {
    fn from(v: Vec<(K, V)>) -> Self { VecMap(v) }
}

impl<K, V> IntoIterator for VecMap<K, V> {
    type IntoIter = IntoIter<(K, V)>;
    type Item = (K, V);

    fn into_iter(self) -> IntoIter<(K, V)> { self.0.into_iter() }
}

impl<'a, K, V> IntoIterator for &'a VecMap<K, V> {
    type IntoIter = Iter<'a, (K, V)>;
    type Item = &'a (K, V);

    fn into_iter(self) -> Iter<'a, (K, V)> { self.0.iter() }
}

impl<K, V> FromIterator<(K, V)> for VecMap<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> VecMap<K, V> {
        VecMap(Vec::from_iter(iter))
    }
}

impl<K, V> Extend<(K, V)> for VecMap<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) { self.0.extend(iter) }
}
