use crate::node::NodeId;
use common::shapes::{Point, Rectangle};

/// Where the tree reads entity geometry and records the anchor back-reference.
///
/// The tree only stores keys. Positions are read live, so an entity that moved
/// since the last [`update`](crate::RegionTree::update) is still filed under
/// its old node until the next sweep.
pub trait EntitySource<K> {
    /// Reference point used for bucket placement.
    fn position(&self, key: K) -> Point;

    /// Collision rectangle in world space.
    fn hitbox(&self, key: K) -> Rectangle;

    fn anchor(&self, key: K) -> Option<NodeId>;

    /// Only the tree calls this.
    fn set_anchor(&mut self, key: K, anchor: Option<NodeId>);
}
