use crate::entity::Velocity;
use std::ops::{BitOr, BitOrAssign};

/// Velocity edits a transition performs when it fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ActionFlags(pub u8);

impl ActionFlags {
    pub const NONE: ActionFlags = ActionFlags(0);
    pub const MOVE_RIGHT: ActionFlags = ActionFlags(1 << 0);
    pub const MOVE_LEFT: ActionFlags = ActionFlags(1 << 1);
    pub const STOP_X: ActionFlags = ActionFlags(1 << 2);
    pub const MOVE_DOWN: ActionFlags = ActionFlags(1 << 3);
    pub const MOVE_UP: ActionFlags = ActionFlags(1 << 4);
    pub const STOP_Y: ActionFlags = ActionFlags(1 << 5);
    pub const SPRINT: ActionFlags = ActionFlags(1 << 6);
    pub const WALK: ActionFlags = ActionFlags(1 << 7);

    #[inline(always)]
    pub fn contains(self, other: ActionFlags) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Applies every set flag in bit order, so later bits win on the same axis.
    pub fn apply(self, velocity: &mut Velocity, speed: f32) {
        if self.contains(Self::MOVE_RIGHT) {
            velocity.x = speed;
        }
        if self.contains(Self::MOVE_LEFT) {
            velocity.x = -speed;
        }
        if self.contains(Self::STOP_X) {
            velocity.x = 0.0;
        }
        if self.contains(Self::MOVE_DOWN) {
            velocity.y = speed;
        }
        if self.contains(Self::MOVE_UP) {
            velocity.y = -speed;
        }
        if self.contains(Self::STOP_Y) {
            velocity.y = 0.0;
        }
        if self.contains(Self::SPRINT) {
            velocity.s = 2.0;
        }
        if self.contains(Self::WALK) {
            velocity.s = 1.0;
        }
    }
}

impl BitOr for ActionFlags {
    type Output = ActionFlags;

    fn bitor(self, rhs: ActionFlags) -> ActionFlags {
        ActionFlags(self.0 | rhs.0)
    }
}

impl BitOrAssign for ActionFlags {
    fn bitor_assign(&mut self, rhs: ActionFlags) {
        self.0 |= rhs.0;
    }
}
