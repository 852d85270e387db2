use std::ops::{BitAnd, BitOr, BitOrAssign};

/// Collision layers. Two entities interact only when their masks share a bit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct LayerMask(pub u16);

impl LayerMask {
    pub const NONE: LayerMask = LayerMask(0);
    pub const LAYER_01: LayerMask = LayerMask(1 << 0);
    pub const LAYER_02: LayerMask = LayerMask(1 << 1);
    pub const LAYER_03: LayerMask = LayerMask(1 << 2);
    pub const LAYER_04: LayerMask = LayerMask(1 << 3);
    pub const LAYER_05: LayerMask = LayerMask(1 << 4);
    pub const LAYER_06: LayerMask = LayerMask(1 << 5);
    pub const LAYER_07: LayerMask = LayerMask(1 << 6);
    pub const LAYER_08: LayerMask = LayerMask(1 << 7);
    pub const LAYER_09: LayerMask = LayerMask(1 << 8);
    pub const LAYER_10: LayerMask = LayerMask(1 << 9);
    pub const LAYER_11: LayerMask = LayerMask(1 << 10);
    pub const LAYER_12: LayerMask = LayerMask(1 << 11);
    pub const LAYER_13: LayerMask = LayerMask(1 << 12);
    pub const LAYER_14: LayerMask = LayerMask(1 << 13);
    pub const LAYER_15: LayerMask = LayerMask(1 << 14);
    pub const LAYER_16: LayerMask = LayerMask(1 << 15);

    #[inline(always)]
    pub fn shares(self, other: LayerMask) -> bool {
        self.0 & other.0 != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for LayerMask {
    type Output = LayerMask;

    fn bitor(self, rhs: LayerMask) -> LayerMask {
        LayerMask(self.0 | rhs.0)
    }
}

impl BitOrAssign for LayerMask {
    fn bitor_assign(&mut self, rhs: LayerMask) {
        self.0 |= rhs.0;
    }
}

impl BitAnd for LayerMask {
    type Output = LayerMask;

    fn bitand(self, rhs: LayerMask) -> LayerMask {
        LayerMask(self.0 & rhs.0)
    }
}
