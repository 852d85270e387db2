pub mod action;
pub mod automaton;
pub mod config;
pub mod entity;
pub mod error;
pub mod event;
pub mod layer;
pub mod motion;
pub mod present;
pub mod store;
pub mod world;

pub use action::ActionFlags;
pub use automaton::{Automaton, StateId, StateRef};
pub use config::Config;
pub use entity::{Entity, Velocity, ENTITY_SPEED};
pub use error::{SimError, SimResult};
pub use event::{EventKind, InputEvent};
pub use layer::LayerMask;
pub use motion::{Motion, Resolution};
pub use present::{Canvas, Texture, TextureHandle, TextureLoader};
pub use store::{Entities, EntityId};
pub use world::{TickSummary, World};
