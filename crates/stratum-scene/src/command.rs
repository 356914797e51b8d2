//! Deferred layer mutations issued from behavior hooks.
//!
//! A behavior only ever holds its own [`Body`](crate::entity::Body). Effects
//! that touch the rest of the layer -- firing a bullet, destroying whatever
//! it hit -- are queued on [`LayerCommands`] and applied by the layer in
//! FIFO order once the frame's collision pass has finished. Spawned items
//! therefore start participating on the following frame.

use tracing::{trace, warn};

use crate::layer::Layer;
use crate::store::{Item, ItemId, ItemStore};

/// A single queued mutation.
#[derive(Debug)]
pub enum LayerCommand {
    /// Add a new item to the issuing layer.
    Spawn(Item),
    /// Mark another entity of the issuing layer for destruction.
    Destroy(ItemId),
}

/// Outcome counters from the last [`LayerCommands::apply`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ApplyReport {
    pub spawned: usize,
    pub destroyed: usize,
    pub failed: usize,
}

/// FIFO queue of [`LayerCommand`]s.
#[derive(Debug, Default)]
pub struct LayerCommands {
    commands: Vec<LayerCommand>,
}

impl LayerCommands {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a new entity or decoration for this layer.
    pub fn spawn(&mut self, item: impl Into<Item>) {
        self.commands.push(LayerCommand::Spawn(item.into()));
    }

    /// Queue destruction of another entity in this layer. It is removed on
    /// the next frame's update pass, like any destroyed entity.
    pub fn destroy(&mut self, target: ItemId) {
        self.commands.push(LayerCommand::Destroy(target));
    }

    pub fn commands(&self) -> &[LayerCommand] {
        &self.commands
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Apply every queued command to `layer`, emptying the queue.
    ///
    /// Destroy commands aimed at items that are gone or belong to another
    /// layer are logged and skipped.
    pub fn apply(&mut self, layer: &mut Layer, store: &mut ItemStore) -> ApplyReport {
        let mut report = ApplyReport::default();
        for command in std::mem::take(&mut self.commands) {
            match command {
                LayerCommand::Spawn(item) => {
                    let id = store.insert(item);
                    match layer.add(store, id) {
                        Ok(()) => report.spawned += 1,
                        Err(e) => {
                            // Unreachable for a fresh id; keep the store clean anyway.
                            store.remove(id);
                            report.failed += 1;
                            warn!(layer = %layer.id(), error = %e, "spawn command failed");
                        }
                    }
                }
                LayerCommand::Destroy(target) => {
                    let in_layer = layer.contains(target);
                    match store.entity_mut(target) {
                        Some(entity) if in_layer && entity.body().layer() == Some(layer.id()) => {
                            entity.destroy();
                            report.destroyed += 1;
                        }
                        _ => {
                            report.failed += 1;
                            warn!(
                                layer = %layer.id(),
                                target = ?target,
                                "destroy command skipped: target is not an entity of this layer"
                            );
                        }
                    }
                }
            }
        }
        trace!(
            layer = %layer.id(),
            spawned = report.spawned,
            destroyed = report.destroyed,
            failed = report.failed,
            "layer commands applied"
        );
        report
    }
}
