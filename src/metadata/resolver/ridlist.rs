use std::{ops::Range, slice, vec};

/// An ordered list of rids.
///
/// Member lists without indirection or deletion are plain ranges and stay
/// [`RidList::Contiguous`]; everything else is materialized as [`RidList::Explicit`]. Order and
/// duplicates are preserved as resolved; nothing is sorted or deduplicated. Equality compares
/// the rids, not the representation.
#[derive(Clone, Debug)]
pub enum RidList {
    /// `len` consecutive rids starting at `start`
    Contiguous {
        /// First rid
        start: u32,
        /// Number of rids
        len: u32,
    },
    /// Arbitrary rids, in order
    Explicit(Vec<u32>),
}

impl RidList {
    /// The empty list
    pub const EMPTY: RidList = RidList::Contiguous { start: 0, len: 0 };

    /// The half-open range `[start, end)`; empty if `end <= start`
    #[must_use]
    pub fn range(start: u32, end: u32) -> RidList {
        if end <= start {
            return RidList::EMPTY;
        }

        RidList::Contiguous {
            start,
            len: end - start,
        }
    }

    /// Number of rids
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            RidList::Contiguous { len, .. } => *len as usize,
            RidList::Explicit(rids) => rids.len(),
        }
    }

    /// `true` if there are no rids
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The rid at `index`
    #[must_use]
    pub fn get(&self, index: usize) -> Option<u32> {
        match self {
            RidList::Contiguous { start, len } => {
                let index = u32::try_from(index).ok()?;
                if index < *len {
                    start.checked_add(index)
                } else {
                    None
                }
            }
            RidList::Explicit(rids) => rids.get(index).copied(),
        }
    }

    /// The first rid
    #[must_use]
    pub fn first(&self) -> Option<u32> {
        self.get(0)
    }

    /// `true` if `rid` is part of the list
    #[must_use]
    pub fn contains(&self, rid: u32) -> bool {
        match self {
            RidList::Contiguous { start, len } => rid >= *start && rid - start < *len,
            RidList::Explicit(rids) => rids.contains(&rid),
        }
    }

    /// Iterate over the rids
    #[must_use]
    pub fn iter(&self) -> Iter<'_> {
        match self {
            RidList::Contiguous { start, len } => Iter::Range(*start..start.saturating_add(*len)),
            RidList::Explicit(rids) => Iter::Slice(rids.iter()),
        }
    }

    /// Copy the rids into a vector
    #[must_use]
    pub fn to_vec(&self) -> Vec<u32> {
        self.iter().collect()
    }
}

impl Default for RidList {
    fn default() -> Self {
        RidList::EMPTY
    }
}

impl PartialEq for RidList {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().eq(other.iter())
    }
}

impl Eq for RidList {}

impl From<Vec<u32>> for RidList {
    fn from(rids: Vec<u32>) -> Self {
        RidList::Explicit(rids)
    }
}

/// Borrowing iterator over a [`RidList`]
#[derive(Clone, Debug)]
pub enum Iter<'a> {
    /// Over a contiguous list
    Range(Range<u32>),
    /// Over an explicit list
    Slice(slice::Iter<'a, u32>),
}

impl Iterator for Iter<'_> {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        match self {
            Iter::Range(range) => range.next(),
            Iter::Slice(rids) => rids.next().copied(),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self {
            Iter::Range(range) => range.size_hint(),
            Iter::Slice(rids) => rids.size_hint(),
        }
    }
}

impl ExactSizeIterator for Iter<'_> {}

/// Owning iterator over a [`RidList`]
#[derive(Clone, Debug)]
pub enum IntoIter {
    /// Over a contiguous list
    Range(Range<u32>),
    /// Over an explicit list
    Vec(vec::IntoIter<u32>),
}

impl Iterator for IntoIter {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        match self {
            IntoIter::Range(range) => range.next(),
            IntoIter::Vec(rids) => rids.next(),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self {
            IntoIter::Range(range) => range.size_hint(),
            IntoIter::Vec(rids) => rids.size_hint(),
        }
    }
}

impl ExactSizeIterator for IntoIter {}

impl IntoIterator for RidList {
    type Item = u32;
    type IntoIter = IntoIter;

    fn into_iter(self) -> IntoIter {
        match self {
            RidList::Contiguous { start, len } => IntoIter::Range(start..start.saturating_add(len)),
            RidList::Explicit(rids) => IntoIter::Vec(rids.into_iter()),
        }
    }
}

impl<'a> IntoIterator for &'a RidList {
    type Item = u32;
    type IntoIter = Iter<'a>;

    fn into_iter(self) -> Iter<'a> {
        self.iter()
    }
}
