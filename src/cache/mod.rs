//! Content cache: the current catalog plus its trigger index.
//!
//! The cache answers eligibility queries in constant time and is the only
//! place where an item's presentation state changes. It does not emit events
//! itself; callers inspect the returned outcomes and notify listeners.

/// Eligibility index keyed by kind and trigger point.
pub mod index;

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, Utc};

use crate::content::{ContentId, ContentItem, ContentKind};
use crate::presentation::{PresentationState, Transition};

pub use index::TriggerIndex;

/// In-memory catalog for one session.
#[derive(Debug, Default)]
pub struct ContentCache {
    items: Vec<ContentItem>,
    positions: HashMap<ContentId, usize>,
    index: TriggerIndex,
    installed_at: Option<DateTime<Utc>>,
}

impl ContentCache {
    /// Empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the catalog wholesale and rebuilds the index.
    ///
    /// Items whose id already appeared earlier in the same catalog are dropped.
    /// Returns the number of items kept.
    pub fn install(&mut self, items: Vec<ContentItem>) -> usize {
        self.items.clear();
        self.positions.clear();

        for item in items {
            if self.positions.contains_key(&item.id()) {
                tracing::warn!(content_id = %item.id(), "dropping duplicate content id in catalog");
                continue;
            }
            self.positions.insert(item.id(), self.items.len());
            self.items.push(item);
        }

        self.index.rebuild(&self.items);
        self.installed_at = Some(Utc::now());
        self.items.len()
    }

    /// Eligible items for a trigger point and kind, in arrival order.
    #[must_use]
    pub fn eligible_for(&self, trigger_point: &str, kind: ContentKind) -> Vec<ContentItem> {
        self.index
            .positions(trigger_point, kind)
            .iter()
            .map(|pos| self.items[*pos].clone())
            .collect()
    }

    /// Id of the item that would be shown next for a trigger point and kind.
    #[must_use]
    pub fn first_eligible(&self, trigger_point: &str, kind: ContentKind) -> Option<ContentId> {
        self.index
            .first(trigger_point, kind)
            .map(|pos| self.items[pos].id())
    }

    /// True if anything of `kind` is eligible at `trigger_point`.
    #[must_use]
    pub fn has_content(&self, trigger_point: &str, kind: ContentKind) -> bool {
        self.index.contains(trigger_point, kind)
    }

    /// Trigger points with eligible items of `kind`.
    #[must_use]
    pub fn trigger_points_with_content(&self, kind: ContentKind) -> BTreeSet<String> {
        self.index.trigger_points(kind)
    }

    /// Moves an item from `Unseen` to `Presented` and drops it from the index.
    ///
    /// Returns the updated item if the transition applied, `None` otherwise
    /// (unknown id or not `Unseen`).
    pub fn present(&mut self, id: ContentId) -> Option<ContentItem> {
        let pos = *self.positions.get(&id)?;
        let item = &mut self.items[pos];

        match item.state_mut().advance(PresentationState::Presented) {
            Transition::Applied { .. } => {
                let trigger_point = item.trigger_point().to_string();
                let kind = item.kind();
                let removed = self.index.remove(&trigger_point, kind, pos);
                debug_assert!(removed, "unseen item missing from trigger index");
                Some(self.items[pos].clone())
            }
            Transition::Ignored { .. } => None,
        }
    }

    /// Moves an item from `Presented` to `Dismissed`.
    ///
    /// Returns the updated item if the transition applied. The index is not
    /// touched: presented items are never indexed.
    pub fn dismiss(&mut self, id: ContentId) -> Option<ContentItem> {
        let pos = *self.positions.get(&id)?;
        let item = &mut self.items[pos];

        item.state_mut()
            .advance(PresentationState::Dismissed)
            .is_applied()
            .then(|| item.clone())
    }

    /// Empties catalog and index.
    pub fn clear(&mut self) {
        self.items.clear();
        self.positions.clear();
        self.index.clear();
        self.installed_at = None;
    }

    /// Item by id, whatever its state.
    #[must_use]
    pub fn get(&self, id: ContentId) -> Option<&ContentItem> {
        self.positions.get(&id).map(|pos| &self.items[*pos])
    }

    /// Every item of the current catalog, in arrival order, whatever its state.
    #[must_use]
    pub fn items(&self) -> &[ContentItem] {
        &self.items
    }

    /// Number of items in the catalog.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// True if no catalog is installed or it was empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// True if any item of any kind is still eligible.
    #[must_use]
    pub const fn has_eligible(&self) -> bool {
        !self.index.is_empty()
    }

    /// When the current catalog was installed.
    #[must_use]
    pub const fn installed_at(&self) -> Option<DateTime<Utc>> {
        self.installed_at
    }
}
