//! Canonical ordering of compounds, for comparing trees that hold the same
//! entries in a different order.
//!
//! Compound entries are sorted by name, and compounds nested directly in
//! compounds are sorted the same way. Lists keep their order, they are
//! sequences rather than keyed bags, and so does everything inside them.
//!
//! ```
//! use nbtree::{canonical::sort_keys, Compound};
//!
//! let a: Compound = [("Z", 1), ("A", 2), ("R", 3)].into_iter().collect();
//! let b: Compound = [("R", 3), ("Z", 1), ("A", 2)].into_iter().collect();
//!
//! assert_ne!(a, b);
//! assert_eq!(sort_keys(&a), sort_keys(&b));
//! ```
//!
//! Names are compared with the Unicode root collation rather than by bytes,
//! so `_x` sorts before `a`, and `b` before `B`.
use std::cmp::Ordering;

use icu_collator::{Collator, CollatorOptions};

use crate::{Compound, Value};

thread_local! {
    static COLLATOR: Option<Collator> =
        Collator::try_new(&Default::default(), CollatorOptions::new()).ok();
}

/// Order used between entry names: root locale collation, with byte order
/// deciding between names the collation treats as equal. Entries with the
/// same name keep their relative order.
pub fn compare_names(a: &str, b: &str) -> Ordering {
    COLLATOR.with(|collator| match collator {
        Some(collator) => collator.compare(a, b).then_with(|| a.cmp(b)),
        None => a.cmp(b),
    })
}

/// Return a sorted copy of `entries`. Sorting is idempotent: sorting an
/// already sorted compound gives it back unchanged.
pub fn sort_keys(entries: &Compound) -> Compound {
    let mut sorted = entries.clone();
    sorted.sort_keys();
    sorted
}

/// True if `a` and `b` hold the same entries, ignoring compound entry order.
pub fn equivalent(a: &Compound, b: &Compound) -> bool {
    sort_keys(a) == sort_keys(b)
}

impl Compound {
    /// Sort entries by name in place, recursing into compound values.
    pub fn sort_keys(&mut self) {
        self.entries.sort_by(|(a, _), (b, _)| compare_names(a, b));
        for (_, value) in self.entries.iter_mut() {
            if let Value::Compound(inner) = value {
                inner.sort_keys();
            }
        }
    }
}
