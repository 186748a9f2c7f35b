use std::cmp::Ordering;
use std::fmt::{self, Display};
use std::slice::{Chunks, Iter};

use rayon::prelude::*;

///
/// A point-in-time snapshot of RS accession numbers.
///
/// The ids are kept sorted and unique, which makes every set operation a
/// single linear merge over two slices. Construction from arbitrary input goes
/// through [IdentifierSet::from_unsorted], so callers never have to sort first.
///
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct IdentifierSet {
    ids: Vec<u64>,
}

impl IdentifierSet {
    pub fn new() -> Self {
        Self::default()
    }

    ///
    /// Build a set from ids in any order, possibly repeated.
    ///
    /// Sorting runs in parallel since release universes routinely hold tens
    /// of millions of ids.
    ///
    pub fn from_unsorted(mut ids: Vec<u64>) -> Self {
        ids.par_sort_unstable();
        ids.dedup();
        Self { ids }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn contains(&self, id: u64) -> bool {
        self.ids.binary_search(&id).is_ok()
    }

    pub fn iter(&self) -> Iter<'_, u64> {
        self.ids.iter()
    }

    pub fn as_slice(&self) -> &[u64] {
        &self.ids
    }

    pub fn into_vec(self) -> Vec<u64> {
        self.ids
    }

    /// Sorted, non-overlapping batches of at most `size` ids.
    pub fn chunks(&self, size: usize) -> Chunks<'_, u64> {
        self.ids.chunks(size)
    }

    ///
    /// Ids in `self` that are not in `other`.
    ///
    /// Linear in `self.len() + other.len()`.
    ///
    pub fn difference(&self, other: &IdentifierSet) -> IdentifierSet {
        let (a, b) = (&self.ids, &other.ids);
        let mut result = Vec::with_capacity(a.len());
        let (mut i, mut j) = (0, 0);

        while i < a.len() && j < b.len() {
            match a[i].cmp(&b[j]) {
                Ordering::Less => {
                    result.push(a[i]);
                    i += 1;
                }
                Ordering::Greater => j += 1,
                Ordering::Equal => {
                    i += 1;
                    j += 1;
                }
            }
        }
        result.extend_from_slice(&a[i..]);

        IdentifierSet { ids: result }
    }

    /// Ids present in either set.
    pub fn union(&self, other: &IdentifierSet) -> IdentifierSet {
        let (a, b) = (&self.ids, &other.ids);
        let mut result = Vec::with_capacity(a.len() + b.len());
        let (mut i, mut j) = (0, 0);

        while i < a.len() && j < b.len() {
            match a[i].cmp(&b[j]) {
                Ordering::Less => {
                    result.push(a[i]);
                    i += 1;
                }
                Ordering::Greater => {
                    result.push(b[j]);
                    j += 1;
                }
                Ordering::Equal => {
                    result.push(a[i]);
                    i += 1;
                    j += 1;
                }
            }
        }
        result.extend_from_slice(&a[i..]);
        result.extend_from_slice(&b[j..]);

        IdentifierSet { ids: result }
    }

    pub fn is_disjoint(&self, other: &IdentifierSet) -> bool {
        let (a, b) = (&self.ids, &other.ids);
        let (mut i, mut j) = (0, 0);

        while i < a.len() && j < b.len() {
            match a[i].cmp(&b[j]) {
                Ordering::Less => i += 1,
                Ordering::Greater => j += 1,
                Ordering::Equal => return false,
            }
        }

        true
    }

    pub fn is_subset(&self, other: &IdentifierSet) -> bool {
        self.difference(other).is_empty()
    }
}

///
/// The release-vs-store differ: everything in `a` that `b` lacks.
///
pub fn diff(a: &IdentifierSet, b: &IdentifierSet) -> IdentifierSet {
    a.difference(b)
}

impl FromIterator<u64> for IdentifierSet {
    fn from_iter<I: IntoIterator<Item = u64>>(iter: I) -> Self {
        IdentifierSet::from_unsorted(iter.into_iter().collect())
    }
}

impl From<Vec<u64>> for IdentifierSet {
    fn from(value: Vec<u64>) -> Self {
        IdentifierSet::from_unsorted(value)
    }
}

impl<'a> IntoIterator for &'a IdentifierSet {
    type Item = &'a u64;
    type IntoIter = Iter<'a, u64>;

    fn into_iter(self) -> Self::IntoIter {
        self.ids.iter()
    }
}

impl Display for IdentifierSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "IdentifierSet({} ids)", self.ids.len())
    }
}
