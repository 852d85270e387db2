use common::shapes::{Point, Rectangle};
use smallvec::SmallVec;

pub(crate) const FLAG_LEFT: u8 = 0b0001;
pub(crate) const FLAG_BOTTOM: u8 = 0b0010;
pub(crate) const FLAG_RIGHT: u8 = 0b0100;
pub(crate) const FLAG_TOP: u8 = 0b1000;
pub(crate) const FLAG_ALL: u8 = FLAG_LEFT | FLAG_BOTTOM | FLAG_RIGHT | FLAG_TOP;

/// Direct entity slots per leaf.
pub const NODE_CAPACITY: usize = 4;

/// A node whose children hold fewer entities than this collapses during `update`.
pub const COLLAPSE_THRESHOLD: usize = NODE_CAPACITY + 1;

/// Index of a node in the tree's arena. Indices are recycled after a collapse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) u32);

impl NodeId {
    pub const ROOT: NodeId = NodeId(0);

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

pub(crate) type Slots<K> = SmallVec<[K; NODE_CAPACITY]>;

/// Node bounds as explicit edges. Sibling quadrants share their edge values
/// exactly, so routing by midpoint and containment never disagree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) struct RectExtent {
    pub(crate) min_x: f32,
    pub(crate) min_y: f32,
    pub(crate) max_x: f32,
    pub(crate) max_y: f32,
}

impl RectExtent {
    pub(crate) fn from_rect(rect: &Rectangle) -> Self {
        Self {
            min_x: rect.left(),
            min_y: rect.top(),
            max_x: rect.right(),
            max_y: rect.bottom(),
        }
    }

    pub(crate) fn to_rect(self) -> Rectangle {
        Rectangle::new(
            self.min_x,
            self.min_y,
            self.max_x - self.min_x,
            self.max_y - self.min_y,
        )
    }

    #[inline(always)]
    pub(crate) fn mid(&self) -> Point {
        Point::new(
            self.min_x + (self.max_x - self.min_x) * 0.5,
            self.min_y + (self.max_y - self.min_y) * 0.5,
        )
    }

    /// Quadrant in row-major order: 0 top-left, 1 top-right, 2 bottom-left, 3 bottom-right.
    pub(crate) fn quadrant(&self, quadrant: usize) -> Self {
        let mid = self.mid();
        let (min_x, max_x) = if quadrant % 2 == 0 {
            (self.min_x, mid.x)
        } else {
            (mid.x, self.max_x)
        };
        let (min_y, max_y) = if quadrant / 2 == 0 {
            (self.min_y, mid.y)
        } else {
            (mid.y, self.max_y)
        };
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    pub(crate) fn width(&self) -> f32 {
        self.max_x - self.min_x
    }

    pub(crate) fn height(&self) -> f32 {
        self.max_y - self.min_y
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Node<K> {
    pub(crate) extent: RectExtent,
    // Sides lying on the root boundary. Those sides are open, so points outside
    // the root still route to exactly one leaf.
    pub(crate) border: u8,
    pub(crate) depth: u32,
    pub(crate) slots: Slots<K>,
    pub(crate) children: [Option<NodeId>; 4],
}

impl<K> Node<K> {
    pub(crate) fn new(extent: RectExtent, border: u8, depth: u32) -> Self {
        Self {
            extent,
            border,
            depth,
            slots: SmallVec::new(),
            children: [None; 4],
        }
    }

    #[inline(always)]
    pub(crate) fn has_children(&self) -> bool {
        self.children.iter().any(Option::is_some)
    }

    #[inline(always)]
    pub(crate) fn child_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.children.iter().flatten().copied()
    }

    pub(crate) fn holds(&self, point: Point) -> bool {
        let extent = &self.extent;
        (point.x >= extent.min_x || self.border & FLAG_LEFT != 0)
            && (point.x < extent.max_x || self.border & FLAG_RIGHT != 0)
            && (point.y >= extent.min_y || self.border & FLAG_TOP != 0)
            && (point.y < extent.max_y || self.border & FLAG_BOTTOM != 0)
    }

    /// Quadrant index for a point this node holds.
    #[inline(always)]
    pub(crate) fn quadrant_of(&self, point: Point) -> usize {
        let mid = self.extent.mid();
        let col = (point.x >= mid.x) as usize;
        let row = (point.y >= mid.y) as usize;
        row * 2 + col
    }

    pub(crate) fn child_border(&self, quadrant: usize) -> u8 {
        let mut border = 0;
        if quadrant % 2 == 0 {
            border |= self.border & FLAG_LEFT;
        } else {
            border |= self.border & FLAG_RIGHT;
        }
        if quadrant / 2 == 0 {
            border |= self.border & FLAG_TOP;
        } else {
            border |= self.border & FLAG_BOTTOM;
        }
        border
    }
}

/// How far hitboxes stick out of their position point. Only grows between
/// sweeps; [`RegionTree::update`](crate::RegionTree::update) rebuilds it from
/// the entities still tracked.
#[derive(Debug, Clone, Copy, Default)]
pub(crate) struct Reach {
    pub(crate) left: f32,
    pub(crate) top: f32,
    pub(crate) right: f32,
    pub(crate) bottom: f32,
}

impl Reach {
    /// Smallest box, relative to a position, covering every hitbox seen.
    pub(crate) fn to_rect(self) -> Rectangle {
        Rectangle::new(-self.left, -self.top, self.left + self.right, self.top + self.bottom)
    }

    pub(crate) fn include(&mut self, position: Point, hitbox: &Rectangle) {
        self.left = self.left.max(position.x - hitbox.left());
        self.top = self.top.max(position.y - hitbox.top());
        self.right = self.right.max(hitbox.right() - position.x);
        self.bottom = self.bottom.max(hitbox.bottom() - position.y);
    }

    /// Whether any hitbox filed under `node` could overlap `query`.
    pub(crate) fn may_overlap<K>(&self, node: &Node<K>, query: &Rectangle) -> bool {
        let extent = &node.extent;
        let left = if node.border & FLAG_LEFT != 0 {
            f32::NEG_INFINITY
        } else {
            extent.min_x - self.left
        };
        let right = if node.border & FLAG_RIGHT != 0 {
            f32::INFINITY
        } else {
            extent.max_x + self.right
        };
        let top = if node.border & FLAG_TOP != 0 {
            f32::NEG_INFINITY
        } else {
            extent.min_y - self.top
        };
        let bottom = if node.border & FLAG_BOTTOM != 0 {
            f32::INFINITY
        } else {
            extent.max_y + self.bottom
        };
        query.left() <= right && left <= query.right() && query.top() <= bottom && top <= query.bottom()
    }
}
