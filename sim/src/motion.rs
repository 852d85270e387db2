use crate::automaton::StateId;
use crate::event::InputEvent;
use crate::store::{Entities, EntityId};
use regiontree::RegionTree;

/// What happened to an entity's position this tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Motion {
    Moved,
    /// A neighbour on a shared layer overlapped the destination; nothing moved.
    Blocked,
    /// Zero velocity.
    Idle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub motion: Motion,
    /// Automaton state after the step.
    pub state: StateId,
}

/// Runs one tick for `id`: steps its automaton with `event`, then moves it by
/// its velocity over `delta_ms` unless the moved hitbox would overlap a
/// neighbour sharing a layer. Collision response is all or nothing.
///
/// Neighbours are fetched from the entity's anchor node, so an entity the tree
/// does not track never collides. A move that carries the entity out of its
/// node refiles it right away, so entities resolved later in the same tick
/// still see it. Returns `None` for a dead id.
pub fn resolve(
    tree: &mut RegionTree<EntityId>,
    entities: &mut Entities,
    id: EntityId,
    event: &InputEvent,
    delta_ms: f32,
) -> Option<Resolution> {
    let entity = entities.get_mut(id)?;
    let hitbox = entity.hitbox();
    let area = entity.neighbourhood();
    let state = entity.step(event);
    let velocity = entity.velocity();
    // Standing still cannot create an overlap, so the neighbour query is skipped.
    if velocity.is_still() {
        return Some(Resolution {
            motion: Motion::Idle,
            state,
        });
    }

    let (dx, dy) = velocity.displacement(delta_ms);
    let destination = hitbox.translate(dx, dy);
    let area = area.translate(dx, dy);
    let layer = entity.layer();
    let anchor = entity.anchor();

    let blocker = anchor.and_then(|node| {
        tree.fetch_from(node, &*entities, area)
            .iter()
            .copied()
            .find(|other| {
                let neighbour = &entities[*other];
                *other != id
                    && neighbour.layer().shares(layer)
                    && neighbour.hitbox().intersects(&destination)
            })
    });

    let motion = match blocker {
        Some(blocker) => {
            log::trace!("{:?} blocked by {:?}", id, blocker);
            Motion::Blocked
        }
        None => {
            entities[id].translate(dx, dy);
            tree.relocate(entities, id);
            Motion::Moved
        }
    };
    Some(Resolution { motion, state })
}
