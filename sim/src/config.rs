use crate::entity::ENTITY_SPEED;
use crate::error::SimResult;
use common::shapes::Rectangle;
use serde::Deserialize;

/// Play area covered by the region tree root.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct WorldBounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Default for WorldBounds {
    fn default() -> Self {
        WorldBounds {
            x: 0.0,
            y: 0.0,
            width: 1024.0,
            height: 768.0,
        }
    }
}

/// Simulation settings. Every field is optional in JSON; missing ones take
/// their default.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub bounds: WorldBounds,
    /// Region tree nodes reserved up front.
    pub pool_size: usize,
    pub max_depth: u32,
    pub min_size: f32,
    /// Base speed in world units per millisecond for entities built through the world.
    pub entity_speed: f32,
}

impl Default for Config {
    fn default() -> Self {
        let tree = regiontree::Config::default();
        Config {
            bounds: WorldBounds::default(),
            pool_size: tree.pool_size,
            max_depth: tree.max_depth,
            min_size: tree.min_size,
            entity_speed: ENTITY_SPEED,
        }
    }
}

impl Config {
    pub fn from_json(json: &str) -> SimResult<Config> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn bounds(&self) -> Rectangle {
        let bounds = &self.bounds;
        Rectangle::new(bounds.x, bounds.y, bounds.width, bounds.height)
    }

    pub fn tree_config(&self) -> regiontree::Config {
        regiontree::Config {
            pool_size: self.pool_size,
            max_depth: self.max_depth,
            min_size: self.min_size,
        }
    }
}
