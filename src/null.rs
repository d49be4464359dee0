//! The null sentinel.
//!
//! ETF has no null. By convention the atom `null` stands in for one, and decoding it
//! yields [`Value::Null`] carrying whichever [`NullSentinel`] the decoder was built
//! with. Sentinels compare by identity, so an embedder can hand each decoder its own
//! marker and tell them apart afterwards.
//!
//! ```
//! use etfpack::prelude::*;
//!
//! let mine = NullSentinel::new("mine");
//!
//! assert_eq!(mine.clone(), mine);
//! assert_ne!(mine, NullSentinel::default());
//! assert_eq!(NullSentinel::default(), NullSentinel::default());
//! ```
//!
//! [`Value::Null`]: crate::Value::Null

use std::{
    fmt,
    sync::{Arc, OnceLock},
};

static DEFAULT: OnceLock<NullSentinel> = OnceLock::new();

#[derive(Clone)]
/// An identity-compared marker for the `null` atom.
pub struct NullSentinel(Arc<str>);

impl NullSentinel {
    /// Creates a fresh sentinel, distinct from every other one.
    ///
    /// The label only shows up in `Debug` output.
    pub fn new(label: &str) -> NullSentinel { NullSentinel(Arc::from(label)) }

    /// The process-wide sentinel used when a decoder is not given one.
    pub fn shared() -> NullSentinel { DEFAULT.get_or_init(|| NullSentinel::new("null")).clone() }

    /// The label this sentinel was created with.
    pub fn label(&self) -> &str { &self.0 }

    /// Whether `self` and `other` are the same sentinel.
    pub fn same(&self, other: &NullSentinel) -> bool { Arc::ptr_eq(&self.0, &other.0) }
}

impl Default for NullSentinel {
    fn default() -> Self { NullSentinel::shared() }
}

impl PartialEq for NullSentinel {
    fn eq(&self, other: &Self) -> bool { self.same(other) }
}

impl Eq for NullSentinel {}

impl fmt::Debug for NullSentinel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_tuple("NullSentinel").field(&self.label()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity() {
        let a = NullSentinel::new("null");
        let b = NullSentinel::new("null");

        // same label, different sentinel
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
    }

    #[test]
    fn shared_is_stable() {
        assert!(NullSentinel::shared().same(&NullSentinel::default()));
        assert_eq!(NullSentinel::shared().label(), "null");
    }
}
