use crate::entity::Entity;
use common::pool::IndexPool;
use common::shapes::{Point, Rectangle};
use regiontree::{EntitySource, NodeId};
use std::ops::{Index, IndexMut};

/// Handle of an entity in an [`Entities`] store. Recycled after `destroy`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(u32);

impl EntityId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Caller-owned entity arena. The region tree refers to entities by id and
/// reads their geometry from here.
#[derive(Debug, Default)]
pub struct Entities {
    slots: Vec<Option<Entity>>,
    pool: IndexPool,
}

impl Entities {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&mut self, entity: Entity) -> EntityId {
        let index = self.pool.take();
        if index as usize == self.slots.len() {
            self.slots.push(Some(entity));
        } else {
            self.slots[index as usize] = Some(entity);
        }
        EntityId(index)
    }

    /// Releases the slot and hands the entity back, automaton and texture
    /// included. Untrack it from any tree first.
    pub fn destroy(&mut self, id: EntityId) -> Option<Entity> {
        let entity = self.slots.get_mut(id.index())?.take()?;
        self.pool.give(id.0);
        Some(entity)
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.slots.get(id.index())?.as_ref()
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.slots.get_mut(id.index())?.as_mut()
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.get(id).is_some()
    }

    pub fn len(&self) -> usize {
        self.pool.live()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &Entity)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_ref().map(|entity| (EntityId(index as u32), entity)))
    }
}

impl Index<EntityId> for Entities {
    type Output = Entity;

    fn index(&self, id: EntityId) -> &Entity {
        match self.get(id) {
            Some(entity) => entity,
            None => panic!("{:?} is not alive", id),
        }
    }
}

impl IndexMut<EntityId> for Entities {
    fn index_mut(&mut self, id: EntityId) -> &mut Entity {
        match self.get_mut(id) {
            Some(entity) => entity,
            None => panic!("{:?} is not alive", id),
        }
    }
}

impl EntitySource<EntityId> for Entities {
    fn position(&self, key: EntityId) -> Point {
        self[key].position()
    }

    fn hitbox(&self, key: EntityId) -> Rectangle {
        self[key].hitbox()
    }

    fn anchor(&self, key: EntityId) -> Option<NodeId> {
        self[key].anchor
    }

    fn set_anchor(&mut self, key: EntityId, anchor: Option<NodeId>) {
        self[key].anchor = anchor;
    }
}
