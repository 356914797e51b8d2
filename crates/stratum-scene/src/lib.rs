//! Stratum Scene -- layered 2D entity management with per-frame collisions.
//!
//! A [`World`](world::World) holds an ordered list of
//! [`Layer`](layer::Layer)s; each layer holds an ordered list of entities and
//! decorations. Once per frame the world updates every layer, and every layer
//! updates its entities, rebuilds a brute-force
//! [`CollisionIndex`](collision::CollisionIndex) from their current shapes,
//! and notifies each entity of every other entity it overlaps.
//!
//! # Quick Start
//!
//! ```
//! use stratum_scene::prelude::*;
//!
//! let mut world = World::new();
//! let layer = world.add_layer();
//!
//! let a = world
//!     .spawn_into(layer, Entity::from_shape(Shape::circle((0.0, 0.0), 5.0)))
//!     .unwrap();
//! let b = world
//!     .spawn_into(layer, Entity::from_shape(Shape::circle((8.0, 0.0), 5.0)))
//!     .unwrap();
//!
//! let report = world.update(1.0 / 60.0);
//! assert_eq!(report.collisions(), 2);
//!
//! world.entity_mut(a).unwrap().destroy();
//! world.update(1.0 / 60.0);
//! assert!(world.entity(a).is_none());
//! assert!(world.entity(b).is_some());
//! ```

#![deny(unsafe_code)]

pub mod collision;
pub mod command;
pub mod decoration;
pub mod entity;
pub mod geometry;
pub mod input;
pub mod layer;
pub mod store;
pub mod world;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors produced by scene operations.
///
/// All of them report a caller mistake; none is retryable.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SceneError {
    /// The item is already a member of this layer.
    #[error("item {item} is already in {layer}")]
    DuplicateItem {
        item: store::ItemId,
        layer: layer::LayerId,
    },

    /// The item is not a member of this layer.
    #[error("item {item} is not in {layer}")]
    ItemNotFound {
        item: store::ItemId,
        layer: layer::LayerId,
    },

    /// A collision shape was configured with an unrecognised tag.
    #[error("collision shape must be \"rectangle\", \"circle\" or an explicit shape, got {value:?}")]
    InvalidShapeKind { value: String },

    /// The id does not resolve to a live item (stale or never allocated).
    #[error("item {item} does not exist (stale or never allocated)")]
    StaleItem { item: store::ItemId },

    /// The item is a member of a different layer.
    #[error("item {item} already belongs to {layer}")]
    AttachedElsewhere {
        item: store::ItemId,
        layer: layer::LayerId,
    },

    /// A layer handed to a world must be empty; its members' ids would
    /// resolve against the world's store.
    #[error("{layer} already holds {members} items and cannot join a world")]
    LayerNotEmpty {
        layer: layer::LayerId,
        members: usize,
    },

    /// No layer with this id in the world.
    #[error("{layer} is not part of this world")]
    UnknownLayer { layer: layer::LayerId },
}

// ---------------------------------------------------------------------------
// Prelude
// ---------------------------------------------------------------------------

/// Convenience re-exports for common usage.
pub mod prelude {
    pub use crate::collision::CollisionIndex;
    pub use crate::command::{ApplyReport, LayerCommand, LayerCommands};
    pub use crate::decoration::{Anchor, Color, Decoration, HAlign, VAlign};
    pub use crate::entity::{Behavior, Body, Contact, Entity, Inert, Lifecycle};
    pub use crate::geometry::{Shape, ShapeKind, Vec2, Visual};
    pub use crate::input::{KeyAction, KeyCode, KeyEvent, Modifiers};
    pub use crate::layer::{FrameReport, Layer, LayerId, LayerMut};
    pub use crate::store::{Item, ItemId, ItemStore};
    pub use crate::world::{World, WorldConfig, WorldId, WorldReport};
    pub use crate::SceneError;
}
