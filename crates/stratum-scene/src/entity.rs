//! Colliding game objects and the behavior hooks that drive them.
//!
//! An [`Entity`] is split in two halves:
//!
//! - [`Body`] -- the engine-owned state: position, visual extents, collision
//!   shape, the destruction flag and the back-reference to the owning layer.
//! - [`Behavior`] -- caller-supplied game logic. Every hook receives the
//!   entity's own `Body` mutably plus a [`LayerCommands`] queue for effects
//!   that reach beyond the entity (spawning, destroying others).
//!
//! # Lifecycle
//!
//! ```text
//! Active --destroy()--> MarkedForRemoval --layer update--> (dropped)
//!    ^
//!    +--Layer::add-- Detached <--Layer::remove-- Active
//! ```
//!
//! [`Body::destroy`] only sets a flag. The owning layer drops the entity
//! during its next update pass, before any collision is dispatched.

use std::fmt;

use crate::command::LayerCommands;
use crate::geometry::{Shape, ShapeKind, Vec2, Visual};
use crate::input::KeyEvent;
use crate::layer::LayerId;
use crate::store::ItemId;
use crate::SceneError;

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

/// Where an entity is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lifecycle {
    /// Attached to a layer and updated every frame.
    Active,
    /// `destroy()` was called; removed on the owning layer's next update.
    MarkedForRemoval,
    /// Not attached to any layer.
    Detached,
}

// ---------------------------------------------------------------------------
// Body
// ---------------------------------------------------------------------------

/// Engine-side state of an entity.
#[derive(Debug, Clone)]
pub struct Body {
    position: Vec2,
    visual: Visual,
    shape_kind: ShapeKind,
    shape: Shape,
    label: Option<String>,
    pending_destroy: bool,
    pub(crate) layer: Option<LayerId>,
}

impl Body {
    /// Build a body and derive its shape from `shape_kind`.
    pub fn new(position: impl Into<Vec2>, visual: Visual, shape_kind: ShapeKind) -> Self {
        let position = position.into();
        Self {
            position,
            visual,
            shape_kind,
            shape: shape_kind.build(&visual, position),
            label: None,
            pending_destroy: false,
            layer: None,
        }
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Move the entity. The shape follows at the next
    /// [`compute_center`](Self::compute_center).
    pub fn set_position(&mut self, position: impl Into<Vec2>) {
        self.position = position.into();
    }

    pub fn translate(&mut self, delta: Vec2) {
        self.position = self.position + delta;
    }

    pub fn visual(&self) -> &Visual {
        &self.visual
    }

    /// Swap the visual extents (a new image) and rebuild the shape from them.
    pub fn set_visual(&mut self, visual: Visual) {
        self.visual = visual;
        self.shape = self.shape_kind.build(&self.visual, self.position);
    }

    pub fn shape_kind(&self) -> ShapeKind {
        self.shape_kind
    }

    /// Replace the collision shape configuration and rebuild the shape.
    pub fn set_shape_kind(&mut self, kind: impl Into<ShapeKind>) {
        self.shape_kind = kind.into();
        self.shape = self.shape_kind.build(&self.visual, self.position);
    }

    /// Like [`set_shape_kind`](Self::set_shape_kind) from a configuration
    /// tag (`"circle"` or `"rectangle"`).
    pub fn set_shape_kind_str(&mut self, tag: &str) -> Result<(), SceneError> {
        let kind: ShapeKind = tag.parse()?;
        self.set_shape_kind(kind);
        Ok(())
    }

    /// The current collision shape.
    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// Recenter the shape over the visual at the current position.
    pub fn compute_center(&mut self) {
        self.shape.set_center(self.visual.center_at(self.position));
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = Some(label.into());
    }

    /// Mark the entity for removal. Irreversible.
    pub fn destroy(&mut self) {
        self.pending_destroy = true;
    }

    pub fn is_destroyed(&self) -> bool {
        self.pending_destroy
    }

    /// The layer currently holding this entity.
    pub fn layer(&self) -> Option<LayerId> {
        self.layer
    }
}

// ---------------------------------------------------------------------------
// Behavior
// ---------------------------------------------------------------------------

/// The other participant of a collision, as seen by the receiving entity.
#[derive(Debug, Clone, Copy)]
pub struct Contact<'a> {
    /// Id of the other entity.
    pub id: ItemId,
    /// The other entity's body, read-only.
    pub body: &'a Body,
}

impl Contact<'_> {
    pub fn label(&self) -> Option<&str> {
        self.body.label()
    }
}

/// Game logic attached to an entity. Every hook defaults to a no-op.
pub trait Behavior: 'static {
    /// Called once per frame, in layer insertion order, before collision
    /// detection. Moving `body` here is reflected in this frame's collisions.
    fn update(&mut self, _body: &mut Body, _cmds: &mut LayerCommands, _dt: f64) {}

    /// Called once for every other entity whose shape overlaps this one in
    /// the current frame.
    fn on_collision(&mut self, _body: &mut Body, _other: &Contact<'_>, _cmds: &mut LayerCommands) {}

    fn on_key_down(&mut self, _body: &mut Body, _event: KeyEvent, _cmds: &mut LayerCommands) {}

    fn on_key_up(&mut self, _body: &mut Body, _event: KeyEvent, _cmds: &mut LayerCommands) {}
}

/// Behavior that does nothing: static scenery that still collides.
#[derive(Debug, Clone, Copy, Default)]
pub struct Inert;

impl Behavior for Inert {}

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// A positioned, collidable game object.
pub struct Entity {
    body: Body,
    behavior: Box<dyn Behavior>,
}

impl Entity {
    /// Entity with the [`Inert`] behavior.
    pub fn new(position: impl Into<Vec2>, visual: Visual, shape_kind: ShapeKind) -> Self {
        Self {
            body: Body::new(position, visual, shape_kind),
            behavior: Box::new(Inert),
        }
    }

    /// Entity whose shape is given explicitly, with no visual extents.
    ///
    /// The position is the shape's center.
    pub fn from_shape(shape: Shape) -> Self {
        Self::new(shape.center(), Visual::default(), ShapeKind::Explicit(shape))
    }

    pub fn with_behavior(mut self, behavior: impl Behavior) -> Self {
        self.behavior = Box::new(behavior);
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.body.set_label(label);
        self
    }

    pub fn body(&self) -> &Body {
        &self.body
    }

    pub fn body_mut(&mut self) -> &mut Body {
        &mut self.body
    }

    /// Shorthand for `body_mut().destroy()`.
    pub fn destroy(&mut self) {
        self.body.destroy();
    }

    pub fn lifecycle(&self) -> Lifecycle {
        if self.body.pending_destroy {
            Lifecycle::MarkedForRemoval
        } else if self.body.layer.is_some() {
            Lifecycle::Active
        } else {
            Lifecycle::Detached
        }
    }

    /// One frame of this entity's update pass.
    ///
    /// Returns `false` when the entity must be removed from its layer: either
    /// it was already marked, or its own behavior marked it this frame.
    pub(crate) fn step(&mut self, cmds: &mut LayerCommands, dt: f64) -> bool {
        if self.body.pending_destroy {
            return false;
        }
        self.behavior.update(&mut self.body, cmds, dt);
        if self.body.pending_destroy {
            return false;
        }
        self.body.compute_center();
        true
    }

    pub(crate) fn collide(&mut self, other: &Contact<'_>, cmds: &mut LayerCommands) {
        self.behavior.on_collision(&mut self.body, other, cmds);
    }

    pub(crate) fn key_down(&mut self, event: KeyEvent, cmds: &mut LayerCommands) {
        self.behavior.on_key_down(&mut self.body, event, cmds);
    }

    pub(crate) fn key_up(&mut self, event: KeyEvent, cmds: &mut LayerCommands) {
        self.behavior.on_key_up(&mut self.body, event, cmds);
    }
}

impl fmt::Debug for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entity")
            .field("body", &self.body)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
