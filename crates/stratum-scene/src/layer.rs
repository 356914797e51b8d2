//! Layers: ordered item containers that run the per-frame pipeline.
//!
//! A [`Layer`] holds two ordered id sequences -- colliding entities and
//! decorations -- and one [`CollisionIndex`]. Insertion order is the update
//! order, the collision-dispatch order, and the paint order.
//!
//! # Frame pipeline
//!
//! [`Layer::update`] runs four passes over the entity sequence:
//!
//! 1. **Update.** Every entity steps in insertion order. Entities that are
//!    (or become) marked for destruction are collected and removed once the
//!    pass has visited every entity; a removal never shifts the iteration.
//! 2. **Rebuild.** The collision index is cleared and refilled with the
//!    current shape of every surviving entity.
//! 3. **Dispatch.** Each surviving entity receives `on_collision` once per
//!    other entity whose shape overlaps its own. An A-B overlap yields both
//!    `A <- B` and `B <- A`.
//! 4. **Commands.** [`LayerCommands`] queued by the hooks are applied.
//!
//! Collision queries therefore always see post-movement shapes, and an entity
//! destroyed before or during pass 1 never takes part in pass 3.

use std::collections::HashSet;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::collision::CollisionIndex;
use crate::command::{ApplyReport, LayerCommands};
use crate::entity::Contact;
use crate::input::{KeyAction, KeyEvent};
use crate::store::{ItemId, ItemStore};
use crate::world::WorldId;
use crate::SceneError;

// ---------------------------------------------------------------------------
// LayerId
// ---------------------------------------------------------------------------

/// Process-unique layer identifier, used as the item -> layer back-reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LayerId(u64);

impl LayerId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        LayerId(NEXT.fetch_add(1, Ordering::Relaxed))
    }

    pub fn to_raw(self) -> u64 {
        self.0
    }
}

impl fmt::Display for LayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "layer#{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// FrameReport
// ---------------------------------------------------------------------------

/// What happened during one [`Layer::update`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FrameReport {
    /// Entities whose update hook ran (or were found marked) in pass 1.
    pub stepped: usize,
    /// Entities removed and dropped in pass 1, in removal order.
    pub removed: Vec<ItemId>,
    /// `on_collision` calls made in pass 3.
    pub collisions: usize,
    /// Outcome of the queued commands applied in pass 4.
    pub commands: ApplyReport,
}

// ---------------------------------------------------------------------------
// Layer
// ---------------------------------------------------------------------------

/// Ordered container of entities and decorations with its own collision index.
#[derive(Debug)]
pub struct Layer {
    id: LayerId,
    entities: Vec<ItemId>,
    decorations: Vec<ItemId>,
    index: CollisionIndex,
    commands: LayerCommands,
    pub(crate) world: Option<WorldId>,
}

impl Layer {
    pub fn new() -> Self {
        Self {
            id: LayerId::next(),
            entities: Vec::new(),
            decorations: Vec::new(),
            index: CollisionIndex::new(),
            commands: LayerCommands::new(),
            world: None,
        }
    }

    pub fn id(&self) -> LayerId {
        self.id
    }

    /// The world this layer was added to.
    pub fn world(&self) -> Option<WorldId> {
        self.world
    }

    /// Attach item `id` to this layer.
    ///
    /// Entities join the colliding sequence, decorations the decorative one;
    /// either way the item takes part from the next frame on. Membership is
    /// unchanged on error.
    ///
    /// # Errors
    ///
    /// - [`SceneError::DuplicateItem`] if `id` is already in this layer.
    /// - [`SceneError::AttachedElsewhere`] if it belongs to another layer.
    /// - [`SceneError::StaleItem`] if `id` is not in `store`.
    pub fn add(&mut self, store: &mut ItemStore, id: ItemId) -> Result<(), SceneError> {
        if self.contains(id) {
            return Err(SceneError::DuplicateItem {
                item: id,
                layer: self.id,
            });
        }
        let item = store.get_mut(id).ok_or(SceneError::StaleItem { item: id })?;
        if let Some(other) = item.layer() {
            return Err(SceneError::AttachedElsewhere {
                item: id,
                layer: other,
            });
        }
        item.set_layer(Some(self.id));
        if item.is_entity() {
            self.entities.push(id);
        } else {
            self.decorations.push(id);
        }
        debug!(layer = %self.id, item = %id, "item attached");
        Ok(())
    }

    /// Detach item `id` and clear its back-reference. The item stays in
    /// `store` and may be added to any layer again.
    ///
    /// # Errors
    ///
    /// [`SceneError::ItemNotFound`] if `id` is not a member of this layer.
    pub fn remove(&mut self, store: &mut ItemStore, id: ItemId) -> Result<(), SceneError> {
        let list = if self.entities.contains(&id) {
            &mut self.entities
        } else if self.decorations.contains(&id) {
            &mut self.decorations
        } else {
            return Err(SceneError::ItemNotFound {
                item: id,
                layer: self.id,
            });
        };
        list.retain(|&member| member != id);
        if let Some(item) = store.get_mut(id).filter(|item| item.layer() == Some(self.id)) {
            item.set_layer(None);
        }
        debug!(layer = %self.id, item = %id, "item detached");
        Ok(())
    }

    /// Detach every member, entities first. Returns how many were detached.
    pub fn remove_all_items(&mut self, store: &mut ItemStore) -> usize {
        let members: Vec<ItemId> = self.entities.drain(..).chain(self.decorations.drain(..)).collect();
        for &id in &members {
            if let Some(item) = store.get_mut(id).filter(|item| item.layer() == Some(self.id)) {
                item.set_layer(None);
            }
        }
        self.index.clear();
        debug!(layer = %self.id, count = members.len(), "all items detached");
        members.len()
    }

    /// Remove every member and drop it from `store`. Returns how many items
    /// were dropped; ids owned by another layer are only forgotten.
    pub fn despawn_all(&mut self, store: &mut ItemStore) -> usize {
        let members: Vec<ItemId> = self.entities.drain(..).chain(self.decorations.drain(..)).collect();
        let mut dropped = 0;
        for id in members {
            if store.get(id).is_some_and(|item| item.layer() == Some(self.id)) {
                store.remove(id);
                dropped += 1;
            }
        }
        self.index.clear();
        dropped
    }

    /// Run one frame: update, rebuild the index, dispatch collisions, apply
    /// queued commands. See the module docs for the ordering guarantees.
    pub fn update(&mut self, store: &mut ItemStore, dt: f64) -> FrameReport {
        let _span = tracing::trace_span!("layer_update", layer = %self.id).entered();
        let mut cmds = std::mem::take(&mut self.commands);
        let mut report = FrameReport::default();

        // Pass 1: update in insertion order; removals wait for the pass to end.
        // Ids whose item does not point back here are forgotten, never dropped.
        let mut foreign = Vec::new();
        for &id in &self.entities {
            match store.entity_mut(id) {
                Some(entity) if entity.body().layer() == Some(self.id) => {
                    report.stepped += 1;
                    if !entity.step(&mut cmds, dt) {
                        report.removed.push(id);
                    }
                }
                _ => {
                    warn!(layer = %self.id, item = %id, "member not owned by this layer, forgetting it");
                    foreign.push(id);
                }
            }
        }
        if !report.removed.is_empty() || !foreign.is_empty() {
            let gone: HashSet<ItemId> = report.removed.iter().chain(&foreign).copied().collect();
            self.entities.retain(|id| !gone.contains(id));
            for &id in &report.removed {
                store.remove(id);
            }
            debug!(layer = %self.id, count = report.removed.len(), "destroyed entities removed");
        }

        // Pass 2: rebuild the index from this frame's shapes only.
        self.index.clear();
        for &id in &self.entities {
            if let Some(entity) = store.entity(id) {
                self.index.insert(id, *entity.body().shape());
            }
        }

        // Pass 3: dispatch, subject order = insertion order.
        for &id in &self.entities {
            for other in self.index.overlaps_of(id) {
                if let Some((entity, other_entity)) = store.pair_mut(id, other) {
                    let contact = Contact {
                        id: other,
                        body: other_entity.body(),
                    };
                    entity.collide(&contact, &mut cmds);
                    report.collisions += 1;
                }
            }
        }

        // Pass 4: deferred commands.
        report.commands = cmds.apply(self, store);
        self.commands = cmds;

        trace!(
            layer = %self.id,
            stepped = report.stepped,
            removed = report.removed.len(),
            collisions = report.collisions,
            "layer frame complete"
        );
        report
    }

    /// Forward a key press to every entity in insertion order.
    pub fn key_down(&mut self, store: &mut ItemStore, event: KeyEvent) {
        self.dispatch_key(store, KeyAction::Down, event);
    }

    /// Forward a key release to every entity in insertion order.
    pub fn key_up(&mut self, store: &mut ItemStore, event: KeyEvent) {
        self.dispatch_key(store, KeyAction::Up, event);
    }

    /// Fan a key event out to every entity, then apply whatever the hooks
    /// queued.
    pub fn dispatch_key(&mut self, store: &mut ItemStore, action: KeyAction, event: KeyEvent) {
        let mut cmds = std::mem::take(&mut self.commands);
        for &id in &self.entities {
            if let Some(entity) = store
                .entity_mut(id)
                .filter(|entity| entity.body().layer() == Some(self.id))
            {
                match action {
                    KeyAction::Down => entity.key_down(event, &mut cmds),
                    KeyAction::Up => entity.key_up(event, &mut cmds),
                }
            }
        }
        cmds.apply(self, store);
        self.commands = cmds;
    }

    // -- accessors ----------------------------------------------------------

    /// Colliding members, in insertion order.
    pub fn entities(&self) -> &[ItemId] {
        &self.entities
    }

    /// Decorative members, in insertion order.
    pub fn decorations(&self) -> &[ItemId] {
        &self.decorations
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.entities.contains(&id) || self.decorations.contains(&id)
    }

    /// Total members, entities plus decorations.
    pub fn len(&self) -> usize {
        self.entities.len() + self.decorations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The index as built by the last update (for debug outlines).
    pub fn collision_index(&self) -> &CollisionIndex {
        &self.index
    }
}

impl Default for Layer {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// LayerMut
// ---------------------------------------------------------------------------

/// A layer borrowed together with the item store of the world that owns it.
pub struct LayerMut<'w> {
    pub(crate) layer: &'w mut Layer,
    pub(crate) store: &'w mut ItemStore,
}

impl LayerMut<'_> {
    pub fn add(&mut self, id: ItemId) -> Result<(), SceneError> {
        self.layer.add(self.store, id)
    }

    pub fn remove(&mut self, id: ItemId) -> Result<(), SceneError> {
        self.layer.remove(self.store, id)
    }

    pub fn remove_all_items(&mut self) -> usize {
        self.layer.remove_all_items(self.store)
    }

    pub fn update(&mut self, dt: f64) -> FrameReport {
        self.layer.update(self.store, dt)
    }

    pub fn key_down(&mut self, event: KeyEvent) {
        self.layer.key_down(self.store, event);
    }

    pub fn key_up(&mut self, event: KeyEvent) {
        self.layer.key_up(self.store, event);
    }

    pub fn layer(&self) -> &Layer {
        self.layer
    }

    pub fn store(&self) -> &ItemStore {
        self.store
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
