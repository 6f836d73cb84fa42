//! Order-preserving deduplication.

use std::collections::HashSet;
use std::hash::Hash;

/// Keeps the first occurrence of each item, in input order.
pub fn unique_stable<T, I>(items: I) -> Vec<T>
where
    T: Eq + Hash + Clone,
    I: IntoIterator<Item = T>,
{
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for item in items {
        if seen.insert(item.clone()) {
            out.push(item);
        }
    }
    out
}
