use std::collections::BTreeSet;

/// Selected polyline vertex indices, iterated in ascending order.
///
/// Besides the set itself this tracks the most recently added index, which
/// anchors shift-click range extension.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VertexSelection {
    indices: BTreeSet<usize>,
    anchor: Option<usize>,
}

impl VertexSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn contains(&self, index: usize) -> bool {
        self.indices.contains(&index)
    }

    pub fn iter(&self) -> impl Iterator<Item = usize> + '_ {
        self.indices.iter().copied()
    }

    pub fn first(&self) -> Option<usize> {
        self.indices.first().copied()
    }

    pub fn last(&self) -> Option<usize> {
        self.indices.last().copied()
    }

    /// The most recently added index.
    pub fn anchor(&self) -> Option<usize> {
        self.anchor
    }

    pub fn clear(&mut self) {
        self.indices.clear();
        self.anchor = None;
    }

    pub fn insert(&mut self, index: usize) {
        self.indices.insert(index);
        self.anchor = Some(index);
    }

    /// Replace the selection with a single index.
    pub fn select_only(&mut self, index: usize) {
        self.indices.clear();
        self.insert(index);
    }

    /// Add `index` if absent, remove it otherwise.
    pub fn toggle(&mut self, index: usize) {
        if self.indices.remove(&index) {
            if self.anchor == Some(index) {
                self.anchor = self.indices.last().copied();
            }
        } else {
            self.insert(index);
        }
    }

    /// Add the contiguous range between the anchor and `index`, inclusive.
    /// Without an anchor this selects `index` alone.
    pub fn extend_to(&mut self, index: usize) {
        let Some(anchor) = self.anchor else {
            self.select_only(index);
            return;
        };
        let (lo, hi) = if anchor <= index {
            (anchor, index)
        } else {
            (index, anchor)
        };
        self.indices.extend(lo..=hi);
        self.anchor = Some(index);
    }

    /// Merge another set of indices into this one.
    pub fn union_with(&mut self, other: &BTreeSet<usize>) {
        self.indices.extend(other.iter().copied());
        if let Some(&last) = other.last() {
            self.anchor = Some(last);
        }
    }

    /// Drop indices at or beyond `len`, after the polyline shrank.
    pub fn retain_below(&mut self, len: usize) {
        self.indices.retain(|&i| i < len);
        if self.anchor.is_some_and(|a| a >= len) {
            self.anchor = self.indices.last().copied();
        }
    }

    pub fn as_set(&self) -> &BTreeSet<usize> {
        &self.indices
    }
}
