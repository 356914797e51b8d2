//! Brute-force collision index, rebuilt from scratch every frame.
//!
//! The index is a flat list of `(id, shape)` entries. Rebuilding is O(n) and
//! answering every entity's [`overlaps_of`](CollisionIndex::overlaps_of) is
//! O(n^2) per frame. There is no spatial partitioning: layers are expected
//! to hold tens to a few hundred colliders.
//!
//! The layer clears and refills the index each frame, so a shape swapped on
//! an entity between frames can never leave a stale entry behind.

use crate::geometry::Shape;
use crate::store::ItemId;

/// Rebuildable set of `(entity, shape)` pairs.
#[derive(Debug, Default, Clone)]
pub struct CollisionIndex {
    entries: Vec<(ItemId, Shape)>,
}

impl CollisionIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every entry. Capacity is kept for the next rebuild.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Append an entry. No deduplication: insert each id at most once per
    /// rebuild.
    pub fn insert(&mut self, id: ItemId, shape: Shape) {
        self.entries.push((id, shape));
    }

    /// Every other indexed id whose shape overlaps the shape indexed for
    /// `id`, in insertion order. `id` itself is never part of the result.
    ///
    /// Empty if `id` is not indexed.
    pub fn overlaps_of(&self, id: ItemId) -> Vec<ItemId> {
        match self.shape_of(id) {
            Some(shape) => self.overlapping(id, &shape).collect(),
            None => Vec::new(),
        }
    }

    /// Every indexed id other than `exclude` whose shape overlaps `shape`.
    pub fn overlapping<'a>(
        &'a self,
        exclude: ItemId,
        shape: &'a Shape,
    ) -> impl Iterator<Item = ItemId> + 'a {
        self.entries
            .iter()
            .filter(move |(other, other_shape)| *other != exclude && shape.overlaps(other_shape))
            .map(|(other, _)| *other)
    }

    /// Every indexed id overlapping `shape`, e.g. for a point or area query.
    pub fn query(&self, shape: &Shape) -> Vec<ItemId> {
        self.entries
            .iter()
            .filter(|(_, s)| shape.overlaps(s))
            .map(|(id, _)| *id)
            .collect()
    }

    /// The shape indexed for `id` this frame.
    pub fn shape_of(&self, id: ItemId) -> Option<Shape> {
        self.entries
            .iter()
            .find(|(entry, _)| *entry == id)
            .map(|(_, shape)| *shape)
    }

    pub fn iter(&self) -> impl Iterator<Item = (ItemId, &Shape)> {
        self.entries.iter().map(|(id, shape)| (*id, shape))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
