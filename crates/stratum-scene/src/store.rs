//! Item handles and the arena that owns every item.
//!
//! Layers hold only [`ItemId`]s; the [`ItemStore`] owns the items themselves.
//! This keeps the entity -> layer back-reference a plain [`LayerId`] and lets
//! a layer walk its member list while mutating the members it points at.
//!
//! Every slot carries a generation that is bumped when its item is removed,
//! so an id kept past its item's removal never resolves to whatever reuses
//! the slot.
//!
//! [`LayerId`]: crate::layer::LayerId

use std::collections::VecDeque;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::decoration::Decoration;
use crate::entity::Entity;
use crate::layer::LayerId;

// ---------------------------------------------------------------------------
// ItemId
// ---------------------------------------------------------------------------

/// Handle to an item in an [`ItemStore`]: slot plus the slot's generation at
/// insertion time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemId {
    slot: u32,
    generation: u32,
}

impl ItemId {
    pub fn new(slot: u32, generation: u32) -> Self {
        Self { slot, generation }
    }

    pub fn slot(self) -> u32 {
        self.slot
    }

    pub fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}.{}", self.slot, self.generation)
    }
}

// ---------------------------------------------------------------------------
// Item
// ---------------------------------------------------------------------------

/// Anything a layer can hold.
#[derive(Debug)]
pub enum Item {
    /// Updated, collided, and receives input.
    Entity(Entity),
    /// Painted only.
    Decoration(Decoration),
}

impl Item {
    pub fn as_entity(&self) -> Option<&Entity> {
        match self {
            Item::Entity(e) => Some(e),
            Item::Decoration(_) => None,
        }
    }

    pub fn as_entity_mut(&mut self) -> Option<&mut Entity> {
        match self {
            Item::Entity(e) => Some(e),
            Item::Decoration(_) => None,
        }
    }

    pub fn as_decoration(&self) -> Option<&Decoration> {
        match self {
            Item::Decoration(d) => Some(d),
            Item::Entity(_) => None,
        }
    }

    pub fn as_decoration_mut(&mut self) -> Option<&mut Decoration> {
        match self {
            Item::Decoration(d) => Some(d),
            Item::Entity(_) => None,
        }
    }

    pub fn is_entity(&self) -> bool {
        matches!(self, Item::Entity(_))
    }

    /// The layer currently holding this item.
    pub fn layer(&self) -> Option<LayerId> {
        match self {
            Item::Entity(e) => e.body().layer,
            Item::Decoration(d) => d.layer,
        }
    }

    pub(crate) fn set_layer(&mut self, layer: Option<LayerId>) {
        match self {
            Item::Entity(e) => e.body_mut().layer = layer,
            Item::Decoration(d) => d.layer = layer,
        }
    }
}

impl From<Entity> for Item {
    fn from(e: Entity) -> Self {
        Item::Entity(e)
    }
}

impl From<Decoration> for Item {
    fn from(d: Decoration) -> Self {
        Item::Decoration(d)
    }
}

// ---------------------------------------------------------------------------
// ItemStore
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct Slot {
    generation: u32,
    item: Option<Item>,
}

/// Arena owning every item, addressed by [`ItemId`].
#[derive(Debug, Default)]
pub struct ItemStore {
    slots: Vec<Slot>,
    /// Empty slots, reused oldest first.
    vacant: VecDeque<u32>,
    live: usize,
}

impl ItemStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of `item` and return its id. The item is detached.
    pub fn insert(&mut self, item: impl Into<Item>) -> ItemId {
        let mut item = item.into();
        item.set_layer(None);
        self.live += 1;
        match self.vacant.pop_front() {
            Some(slot) => {
                let entry = &mut self.slots[slot as usize];
                entry.item = Some(item);
                ItemId::new(slot, entry.generation)
            }
            None => {
                let slot = self.slots.len() as u32;
                self.slots.push(Slot {
                    generation: 0,
                    item: Some(item),
                });
                ItemId::new(slot, 0)
            }
        }
    }

    /// Drop ownership of `id`, handing the item back. `None` if stale.
    pub fn remove(&mut self, id: ItemId) -> Option<Item> {
        let entry = self.slots.get_mut(id.slot as usize)?;
        if entry.generation != id.generation {
            return None;
        }
        let item = entry.item.take()?;
        entry.generation = entry.generation.wrapping_add(1);
        self.vacant.push_back(id.slot);
        self.live -= 1;
        Some(item)
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.get(id).is_some()
    }

    pub fn get(&self, id: ItemId) -> Option<&Item> {
        self.slots
            .get(id.slot as usize)
            .filter(|entry| entry.generation == id.generation)?
            .item
            .as_ref()
    }

    pub fn get_mut(&mut self, id: ItemId) -> Option<&mut Item> {
        self.slots
            .get_mut(id.slot as usize)
            .filter(|entry| entry.generation == id.generation)?
            .item
            .as_mut()
    }

    pub fn entity(&self, id: ItemId) -> Option<&Entity> {
        self.get(id)?.as_entity()
    }

    pub fn entity_mut(&mut self, id: ItemId) -> Option<&mut Entity> {
        self.get_mut(id)?.as_entity_mut()
    }

    pub fn decoration(&self, id: ItemId) -> Option<&Decoration> {
        self.get(id)?.as_decoration()
    }

    pub fn decoration_mut(&mut self, id: ItemId) -> Option<&mut Decoration> {
        self.get_mut(id)?.as_decoration_mut()
    }

    /// Mutable access to entity `a` alongside shared access to entity `b`.
    ///
    /// `None` if `a` and `b` share a slot, or either is stale or not an entity.
    pub fn pair_mut(&mut self, a: ItemId, b: ItemId) -> Option<(&mut Entity, &Entity)> {
        if a.slot == b.slot || !self.contains(a) || !self.contains(b) {
            return None;
        }
        let (sa, sb) = (a.slot as usize, b.slot as usize);
        let (first, second) = if sa < sb {
            let (lo, hi) = self.slots.split_at_mut(sb);
            (&mut lo[sa], &hi[0])
        } else {
            let (lo, hi) = self.slots.split_at_mut(sa);
            (&mut hi[0], &lo[sb])
        };
        let subject = first.item.as_mut()?.as_entity_mut()?;
        let other = second.item.as_ref()?.as_entity()?;
        Some((subject, other))
    }

    /// Number of live items.
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
