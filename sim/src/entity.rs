use crate::action::ActionFlags;
use crate::automaton::{Automaton, StateId, StateRef};
use crate::error::SimResult;
use crate::event::{EventKind, InputEvent};
use crate::layer::LayerMask;
use crate::present::{Canvas, Texture, TextureLoader};
use common::chain::Chain;
use common::shapes::{Point, Rectangle};
use regiontree::NodeId;

/// Default base speed, in world units per millisecond.
pub const ENTITY_SPEED: f32 = 0.1;

/// Per-axis velocity plus a speed multiplier.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Velocity {
    pub x: f32,
    pub y: f32,
    pub s: f32,
}

impl Default for Velocity {
    fn default() -> Self {
        Velocity { x: 0.0, y: 0.0, s: 1.0 }
    }
}

impl Velocity {
    /// Offset covered in `delta_ms` milliseconds.
    pub fn displacement(&self, delta_ms: f32) -> (f32, f32) {
        (self.x * self.s * delta_ms, self.y * self.s * delta_ms)
    }

    pub fn is_still(&self) -> bool {
        self.x == 0.0 && self.y == 0.0
    }
}

#[derive(Debug, Clone)]
pub struct Entity {
    position: Point,
    layer: LayerMask,
    // Relative to position.
    hitbox: Rectangle,
    velocity: Velocity,
    speed: f32,
    pub(crate) anchor: Option<NodeId>,
    automaton: Automaton,
    texture: Texture,
    light_radius: f32,
}

impl Entity {
    /// Builds an entity at `(x, y)` with a texture loaded from `path`.
    ///
    /// `hitbox` is relative to the position. The automaton starts with the
    /// single state 0.
    pub fn new<L>(
        loader: &mut L,
        x: f32,
        y: f32,
        layer: LayerMask,
        hitbox: Rectangle,
        path: &str,
    ) -> SimResult<Entity>
    where
        L: TextureLoader + ?Sized,
    {
        let texture = loader.load(path)?;
        Ok(Entity {
            position: Point::new(x, y),
            layer,
            hitbox,
            velocity: Velocity::default(),
            speed: ENTITY_SPEED,
            anchor: None,
            automaton: Automaton::new(),
            texture,
            light_radius: 1.0,
        })
    }

    pub fn position(&self) -> Point {
        self.position
    }

    pub fn translate(&mut self, dx: f32, dy: f32) {
        self.position = self.position.offset(dx, dy);
    }

    pub fn layer(&self) -> LayerMask {
        self.layer
    }

    pub fn set_layer(&mut self, layer: LayerMask) {
        self.layer = layer;
    }

    /// Collision rectangle in world space.
    pub fn hitbox(&self) -> Rectangle {
        self.hitbox.translate(self.position.x, self.position.y)
    }

    /// Destination rectangle of the texture, anchored at the position.
    pub fn texture_rect(&self) -> Rectangle {
        Rectangle::new(
            self.position.x,
            self.position.y,
            self.texture.width,
            self.texture.height,
        )
    }

    /// Area searched for blockers: the texture rectangle grown to three times
    /// its size around itself.
    pub fn neighbourhood(&self) -> Rectangle {
        let rect = self.texture_rect();
        Rectangle::new(
            rect.x - rect.width,
            rect.y - rect.height,
            rect.width * 3.0,
            rect.height * 3.0,
        )
    }

    pub fn texture(&self) -> &Texture {
        &self.texture
    }

    pub fn velocity(&self) -> Velocity {
        self.velocity
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn set_speed(&mut self, speed: f32) {
        self.speed = speed;
    }

    /// Tree node this entity was filed through. Only the region tree writes it.
    pub fn anchor(&self) -> Option<NodeId> {
        self.anchor
    }

    pub fn automaton(&self) -> &Automaton {
        &self.automaton
    }

    pub fn state_id(&self) -> StateId {
        self.automaton.current_id()
    }

    pub fn states(&self) -> Chain<StateRef> {
        self.automaton.reachable_states()
    }

    /// See [`Automaton::add_transition`].
    pub fn add_transition(
        &mut self,
        from: StateId,
        kind: EventKind,
        symbol: i32,
        actions: ActionFlags,
        to: StateId,
    ) -> usize {
        self.automaton.add_transition(from, kind, symbol, actions, to)
    }

    /// Feeds `event` to the automaton and applies the resulting actions to
    /// the velocity. Does not move the entity.
    pub fn step(&mut self, event: &InputEvent) -> StateId {
        let actions = self.automaton.fire(event);
        actions.apply(&mut self.velocity, self.speed);
        self.automaton.current_id()
    }

    pub fn light_radius(&self) -> f32 {
        self.light_radius
    }

    pub fn set_light_radius(&mut self, radius: f32) {
        self.light_radius = radius.max(0.0);
    }

    /// Where the presentation layer blends this entity's light: the texture
    /// rectangle scaled by the light radius around its centre.
    pub fn lighting_rect(&self) -> Rectangle {
        self.texture_rect().scale_about_center(self.light_radius)
    }

    pub fn draw<C>(&self, canvas: &mut C)
    where
        C: Canvas + ?Sized,
    {
        canvas.draw(self.texture_rect(), self.texture.handle);
    }
}
