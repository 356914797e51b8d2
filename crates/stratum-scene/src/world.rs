//! The [`World`] is the top-level container. It owns the item store and the
//! ordered list of layers, and is advanced once per frame by an external
//! clock.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::decoration::Decoration;
use crate::entity::Entity;
use crate::input::{KeyAction, KeyEvent};
use crate::layer::{FrameReport, Layer, LayerId, LayerMut};
use crate::store::{Item, ItemId, ItemStore};
use crate::SceneError;

// ---------------------------------------------------------------------------
// WorldId
// ---------------------------------------------------------------------------

/// Process-unique world identifier, used as the layer -> world back-reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WorldId(u64);

impl WorldId {
    fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        WorldId(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for WorldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "world#{}", self.0)
    }
}

// ---------------------------------------------------------------------------
// WorldConfig
// ---------------------------------------------------------------------------

/// Scene-level settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Ask renderers to outline collision shapes.
    pub debug: bool,
}

// ---------------------------------------------------------------------------
// WorldReport
// ---------------------------------------------------------------------------

/// Per-layer frame reports from one [`World::update`], in layer order.
#[derive(Debug, Clone, Default)]
pub struct WorldReport {
    pub layers: Vec<(LayerId, FrameReport)>,
}

impl WorldReport {
    pub fn collisions(&self) -> usize {
        self.layers.iter().map(|(_, r)| r.collisions).sum()
    }

    pub fn removed(&self) -> usize {
        self.layers.iter().map(|(_, r)| r.removed.len()).sum()
    }
}

// ---------------------------------------------------------------------------
// World
// ---------------------------------------------------------------------------

/// Ordered container of layers plus the store owning every item.
#[derive(Debug)]
pub struct World {
    id: WorldId,
    store: ItemStore,
    layers: Vec<Layer>,
    config: WorldConfig,
}

impl World {
    pub fn new() -> Self {
        Self::with_config(WorldConfig::default())
    }

    pub fn with_config(config: WorldConfig) -> Self {
        Self {
            id: WorldId::next(),
            store: ItemStore::new(),
            layers: Vec::new(),
            config,
        }
    }

    pub fn id(&self) -> WorldId {
        self.id
    }

    // -- layers -------------------------------------------------------------

    /// Append `layer`; it updates after every layer added before it.
    ///
    /// # Errors
    ///
    /// [`SceneError::LayerNotEmpty`] if `layer` already has members. Their
    /// ids belong to some other store and would resolve to this world's
    /// items; fill layers through the world instead.
    pub fn add(&mut self, mut layer: Layer) -> Result<LayerId, SceneError> {
        if !layer.is_empty() {
            return Err(SceneError::LayerNotEmpty {
                layer: layer.id(),
                members: layer.len(),
            });
        }
        layer.world = Some(self.id);
        let id = layer.id();
        self.layers.push(layer);
        debug!(world = %self.id, layer = %id, "layer added");
        Ok(id)
    }

    /// Append a fresh, empty layer.
    pub fn add_layer(&mut self) -> LayerId {
        let mut layer = Layer::new();
        layer.world = Some(self.id);
        let id = layer.id();
        self.layers.push(layer);
        debug!(world = %self.id, layer = %id, "layer added");
        id
    }

    /// Detach layer `id`, dropping every item it held from the store.
    ///
    /// Returns the now-empty layer with its world back-reference cleared.
    ///
    /// # Errors
    ///
    /// [`SceneError::UnknownLayer`] if no such layer is in this world.
    pub fn remove_layer(&mut self, id: LayerId) -> Result<Layer, SceneError> {
        let pos = self
            .layers
            .iter()
            .position(|l| l.id() == id)
            .ok_or(SceneError::UnknownLayer { layer: id })?;
        let mut layer = self.layers.remove(pos);
        let dropped = layer.despawn_all(&mut self.store);
        layer.world = None;
        debug!(world = %self.id, layer = %id, dropped, "layer removed");
        Ok(layer)
    }

    /// Remove layers front to back until none remain.
    pub fn remove_all_layers(&mut self) {
        while let Some(front) = self.layers.first().map(Layer::id) {
            if self.remove_layer(front).is_err() {
                break;
            }
        }
    }

    pub fn layer(&self, id: LayerId) -> Option<&Layer> {
        self.layers.iter().find(|l| l.id() == id)
    }

    /// Borrow layer `id` together with the store, for add/remove/update.
    pub fn layer_mut(&mut self, id: LayerId) -> Option<LayerMut<'_>> {
        let layer = self.layers.iter_mut().find(|l| l.id() == id)?;
        Some(LayerMut {
            layer,
            store: &mut self.store,
        })
    }

    /// Layers in update order.
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layer_count(&self) -> usize {
        self.layers.len()
    }

    // -- items --------------------------------------------------------------

    /// Hand an item to the world. It is detached until added to a layer.
    pub fn spawn(&mut self, item: impl Into<Item>) -> ItemId {
        self.store.insert(item)
    }

    /// Spawn `item` and attach it to layer `layer` in one step.
    pub fn spawn_into(
        &mut self,
        layer: LayerId,
        item: impl Into<Item>,
    ) -> Result<ItemId, SceneError> {
        let mut view = self
            .layer_mut(layer)
            .ok_or(SceneError::UnknownLayer { layer })?;
        let id = view.store.insert(item);
        if let Err(e) = view.add(id) {
            view.store.remove(id);
            return Err(e);
        }
        Ok(id)
    }

    /// Drop item `id`, detaching it from its layer first.
    pub fn despawn(&mut self, id: ItemId) -> Option<Item> {
        if let Some(layer_id) = self.store.get(id)?.layer() {
            if let Some(layer) = self.layers.iter_mut().find(|l| l.id() == layer_id) {
                if let Err(e) = layer.remove(&mut self.store, id) {
                    warn!(world = %self.id, item = %id, error = %e, "back-reference names a layer that does not hold the item");
                }
            }
        }
        self.store.remove(id)
    }

    pub fn item(&self, id: ItemId) -> Option<&Item> {
        self.store.get(id)
    }

    pub fn entity(&self, id: ItemId) -> Option<&Entity> {
        self.store.entity(id)
    }

    pub fn entity_mut(&mut self, id: ItemId) -> Option<&mut Entity> {
        self.store.entity_mut(id)
    }

    pub fn decoration(&self, id: ItemId) -> Option<&Decoration> {
        self.store.decoration(id)
    }

    pub fn decoration_mut(&mut self, id: ItemId) -> Option<&mut Decoration> {
        self.store.decoration_mut(id)
    }

    pub fn store(&self) -> &ItemStore {
        &self.store
    }

    // -- frame --------------------------------------------------------------

    /// Advance every layer by `dt` seconds, in insertion order.
    pub fn update(&mut self, dt: f64) -> WorldReport {
        let mut report = WorldReport::default();
        for layer in &mut self.layers {
            let frame = layer.update(&mut self.store, dt);
            report.layers.push((layer.id(), frame));
        }
        report
    }

    /// Forward a key press to every layer in order.
    pub fn key_down(&mut self, event: KeyEvent) {
        self.dispatch_key(KeyAction::Down, event);
    }

    /// Forward a key release to every layer in order.
    pub fn key_up(&mut self, event: KeyEvent) {
        self.dispatch_key(KeyAction::Up, event);
    }

    pub fn dispatch_key(&mut self, action: KeyAction, event: KeyEvent) {
        for layer in &mut self.layers {
            layer.dispatch_key(&mut self.store, action, event);
        }
    }

    // -- config -------------------------------------------------------------

    /// Whether renderers should outline collision shapes.
    pub fn debug(&self) -> bool {
        self.config.debug
    }

    pub fn set_debug(&mut self, debug: bool) {
        self.config.debug = debug;
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
