//! Trigger index over eligible catalog entries.

use std::collections::{BTreeSet, HashMap};

use crate::content::{ContentItem, ContentKind};

/// Maps `(kind, trigger point)` to catalog positions of `Unseen` items.
///
/// Positions are kept in catalog arrival order. Keys whose position list
/// becomes empty are removed, so every key present has content.
#[derive(Debug, Default)]
pub struct TriggerIndex {
    by_kind: HashMap<ContentKind, HashMap<String, Vec<usize>>>,
    entries: usize,
}

impl TriggerIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds the index from a catalog.
    pub fn rebuild(&mut self, items: &[ContentItem]) {
        self.clear();
        for (pos, item) in items.iter().enumerate().filter(|(_, i)| i.is_eligible()) {
            self.by_kind
                .entry(item.kind())
                .or_default()
                .entry(item.trigger_point().to_string())
                .or_default()
                .push(pos);
            self.entries += 1;
        }
    }

    /// Positions of eligible items for a trigger point, in arrival order.
    #[must_use]
    pub fn positions(&self, trigger_point: &str, kind: ContentKind) -> &[usize] {
        self.by_kind
            .get(&kind)
            .and_then(|codes| codes.get(trigger_point))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    #[must_use]
    pub fn first(&self, trigger_point: &str, kind: ContentKind) -> Option<usize> {
        self.positions(trigger_point, kind).first().copied()
    }

    #[must_use]
    pub fn contains(&self, trigger_point: &str, kind: ContentKind) -> bool {
        !self.positions(trigger_point, kind).is_empty()
    }

    /// Trigger points with at least one eligible item of `kind`.
    #[must_use]
    pub fn trigger_points(&self, kind: ContentKind) -> BTreeSet<String> {
        self.by_kind
            .get(&kind)
            .map(|codes| codes.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Drops a single position. Returns true if it was indexed.
    pub fn remove(&mut self, trigger_point: &str, kind: ContentKind, pos: usize) -> bool {
        let Some(codes) = self.by_kind.get_mut(&kind) else {
            return false;
        };
        let Some(positions) = codes.get_mut(trigger_point) else {
            return false;
        };
        let Some(at) = positions.iter().position(|p| *p == pos) else {
            return false;
        };

        positions.remove(at);
        self.entries -= 1;

        if positions.is_empty() {
            codes.remove(trigger_point);
            if codes.is_empty() {
                self.by_kind.remove(&kind);
            }
        }
        true
    }

    pub fn clear(&mut self) {
        self.by_kind.clear();
        self.entries = 0;
    }

    /// Number of indexed (eligible) items.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.entries
    }

    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.entries == 0
    }
}
