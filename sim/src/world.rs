use crate::config::Config;
use crate::entity::Entity;
use crate::error::SimResult;
use crate::event::InputEvent;
use crate::layer::LayerMask;
use crate::motion::{self, Motion, Resolution};
use crate::present::{Canvas, TextureLoader};
use crate::store::{Entities, EntityId};
use common::shapes::Rectangle;
use regiontree::{RegionTree, UpdateStats};

/// Counts from one [`World::tick`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickSummary {
    pub moved: usize,
    pub blocked: usize,
    pub idle: usize,
    pub tree: UpdateStats,
}

impl TickSummary {
    pub fn resolved(&self) -> usize {
        self.moved + self.blocked + self.idle
    }

    fn record(&mut self, motion: Motion) {
        match motion {
            Motion::Moved => self.moved += 1,
            Motion::Blocked => self.blocked += 1,
            Motion::Idle => self.idle += 1,
        }
    }
}

/// Entities plus the region tree indexing them.
pub struct World {
    entities: Entities,
    tree: RegionTree<EntityId>,
    config: Config,
}

impl World {
    pub fn new(config: Config) -> SimResult<World> {
        let tree = RegionTree::new_with_config(config.bounds(), config.tree_config())?;
        Ok(World {
            entities: Entities::new(),
            tree,
            config,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn entities(&self) -> &Entities {
        &self.entities
    }

    pub fn tree(&self) -> &RegionTree<EntityId> {
        &self.tree
    }

    pub fn entity(&self, id: EntityId) -> Option<&Entity> {
        self.entities.get(id)
    }

    /// Mutable access for wiring transitions and the like. Use
    /// [`World::move_entity`] to move it so the tree follows.
    pub fn entity_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        self.entities.get_mut(id)
    }

    /// Translates the entity without collision checks and refiles it if it
    /// left its node. Returns false for a dead id.
    pub fn move_entity(&mut self, id: EntityId, dx: f32, dy: f32) -> bool {
        match self.entities.get_mut(id) {
            Some(entity) => entity.translate(dx, dy),
            None => return false,
        }
        self.tree.relocate(&mut self.entities, id);
        true
    }

    /// Stores `entity` and files it in the tree.
    pub fn spawn(&mut self, entity: Entity) -> EntityId {
        let id = self.entities.create(entity);
        self.tree.insert(&mut self.entities, id);
        id
    }

    /// Builds an entity at the configured speed and spawns it.
    pub fn create_entity<L>(
        &mut self,
        loader: &mut L,
        x: f32,
        y: f32,
        layer: LayerMask,
        hitbox: Rectangle,
        path: &str,
    ) -> SimResult<EntityId>
    where
        L: TextureLoader + ?Sized,
    {
        let mut entity = Entity::new(loader, x, y, layer, hitbox, path)?;
        entity.set_speed(self.config.entity_speed);
        Ok(self.spawn(entity))
    }

    /// Unfiles and releases the entity, handing it back.
    pub fn despawn(&mut self, id: EntityId) -> Option<Entity> {
        if !self.entities.contains(id) {
            return None;
        }
        self.tree.remove(&mut self.entities, id);
        self.entities.destroy(id)
    }

    /// One entity's tick without the tree sweep.
    pub fn step_entity(&mut self, id: EntityId, event: &InputEvent, delta_ms: f32) -> Option<Resolution> {
        motion::resolve(&mut self.tree, &mut self.entities, id, event, delta_ms)
    }

    /// Resolves motion for every entity whose hitbox touches `area`, then
    /// rebalances the tree once.
    pub fn tick(&mut self, area: Rectangle, event: &InputEvent, delta_ms: f32) -> TickSummary {
        let mut summary = TickSummary::default();
        let active = self.tree.fetch(&self.entities, area);
        for id in active.iter() {
            if let Some(resolution) = self.step_entity(*id, event, delta_ms) {
                summary.record(resolution.motion);
            }
        }
        summary.tree = self.tree.update(&mut self.entities);

        log::debug!(
            "tick {:?}: {} moved, {} blocked, {} idle",
            event.kind,
            summary.moved,
            summary.blocked,
            summary.idle
        );
        summary
    }

    /// Draws every entity whose hitbox touches `view`.
    pub fn draw<C>(&self, canvas: &mut C, view: Rectangle)
    where
        C: Canvas + ?Sized,
    {
        for id in self.tree.fetch(&self.entities, view).iter() {
            self.entities[*id].draw(canvas);
        }
    }

    /// Outlines every region tree node.
    pub fn draw_tree<C>(&self, canvas: &mut C)
    where
        C: Canvas + ?Sized,
    {
        self.tree.draw(|rect| canvas.outline(rect));
    }

    /// Drops the tree and every entity it tracked, handing their textures
    /// to `loader`.
    pub fn destroy<L>(mut self, loader: &mut L)
    where
        L: TextureLoader + ?Sized,
    {
        for id in self.tree.destroy() {
            if let Some(entity) = self.entities.destroy(id) {
                loader.release(*entity.texture());
            }
        }
    }
}
