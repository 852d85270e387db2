use crate::config::Config;
use crate::error::{RegionTreeError, RegionTreeResult};
use crate::node::{Node, NodeId, Reach, RectExtent, FLAG_ALL, NODE_CAPACITY};
use crate::source::EntitySource;
use common::chain::Chain;
use common::pool::IndexPool;
use common::shapes::Rectangle;
use fxhash::FxHashMap;
use std::fmt::Debug;
use std::hash::Hash;

/// Four-way region tree over entity keys.
///
/// Entities are filed by their position point; the tree never owns entity
/// data, it reads it through an [`EntitySource`].
pub struct RegionTree<K> {
    pub(crate) nodes: Vec<Node<K>>,
    pub(crate) node_pool: IndexPool,
    // Key -> node holding it in a direct slot.
    pub(crate) owners: FxHashMap<K, NodeId>,
    pub(crate) reach: Reach,
    max_depth: u32,
    min_size: f32,
}

impl<K> RegionTree<K>
where
    K: Copy + Eq + Hash + Debug,
{
    pub fn new(bounds: Rectangle) -> RegionTreeResult<Self> {
        Self::new_with_config(bounds, Config::default())
    }

    pub fn new_with_config(bounds: Rectangle, config: Config) -> RegionTreeResult<Self> {
        let valid = bounds.x.is_finite()
            && bounds.y.is_finite()
            && bounds.width.is_finite()
            && bounds.height.is_finite()
            && bounds.width > 0.0
            && bounds.height > 0.0;
        if !valid {
            return Err(RegionTreeError::InvalidBounds {
                x: bounds.x,
                y: bounds.y,
                width: bounds.width,
                height: bounds.height,
            });
        }

        let mut node_pool = IndexPool::with_capacity(config.pool_size);
        let mut nodes = Vec::with_capacity(config.pool_size.max(1));
        let root = node_pool.take();
        debug_assert_eq!(root, NodeId::ROOT.0);
        nodes.push(Node::new(RectExtent::from_rect(&bounds), FLAG_ALL, 0));

        Ok(RegionTree {
            nodes,
            node_pool,
            owners: FxHashMap::default(),
            reach: Reach::default(),
            max_depth: config.max_depth,
            min_size: config.min_size,
        })
    }

    pub fn root(&self) -> NodeId {
        NodeId::ROOT
    }

    pub fn bounds(&self) -> Rectangle {
        self.nodes[NodeId::ROOT.index()].extent.to_rect()
    }

    /// Number of tracked entities.
    pub fn len(&self) -> usize {
        self.owners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }

    pub fn contains(&self, key: K) -> bool {
        self.owners.contains_key(&key)
    }

    /// Node holding `key` in a direct slot.
    pub fn owner(&self, key: K) -> Option<NodeId> {
        self.owners.get(&key).copied()
    }

    /// Box around an entity's position that every tracked hitbox fits in,
    /// as used to prune queries.
    pub fn hitbox_reach(&self) -> Rectangle {
        self.reach.to_rect()
    }

    pub fn node_count(&self) -> usize {
        self.node_pool.live()
    }

    pub fn is_live(&self, node: NodeId) -> bool {
        node.index() < self.nodes.len() && !self.node_pool.is_free(node.0)
    }

    pub fn rect(&self, node: NodeId) -> Rectangle {
        self.nodes[node.index()].extent.to_rect()
    }

    pub fn depth_of(&self, node: NodeId) -> u32 {
        self.nodes[node.index()].depth
    }

    pub fn children(&self, node: NodeId) -> [Option<NodeId>; 4] {
        self.nodes[node.index()].children
    }

    pub fn slots(&self, node: NodeId) -> &[K] {
        &self.nodes[node.index()].slots
    }

    pub fn is_leaf(&self, node: NodeId) -> bool {
        !self.nodes[node.index()].has_children()
    }

    /// Deepest level currently in use.
    pub fn depth(&self) -> u32 {
        self.live_nodes()
            .map(|id| self.nodes[id.index()].depth)
            .max()
            .unwrap_or(0)
    }

    /// Every live node reachable from the root, parents before children.
    pub fn live_nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        let mut stack = vec![NodeId::ROOT];
        std::iter::from_fn(move || {
            let id = stack.pop()?;
            stack.extend(self.nodes[id.index()].child_ids());
            Some(id)
        })
    }

    pub fn all_node_rects(&self, rects: &mut Vec<Rectangle>) {
        rects.extend(self.live_nodes().map(|id| self.rect(id)));
    }

    /// Files `key` under the root.
    ///
    /// The key must not already be tracked by this or any other tree; remove
    /// it first.
    pub fn insert<S>(&mut self, source: &mut S, key: K)
    where
        S: EntitySource<K> + ?Sized,
    {
        debug_assert!(!self.contains(key), "{:?} inserted twice", key);
        if self.contains(key) {
            return;
        }
        let position = source.position(key);
        self.reach.include(position, &source.hitbox(key));
        if source.anchor(key).is_none() {
            source.set_anchor(key, Some(NodeId::ROOT));
        }
        self.insert_into(source, NodeId::ROOT, key);
    }

    pub(crate) fn insert_into<S>(&mut self, source: &S, node_id: NodeId, key: K)
    where
        S: EntitySource<K> + ?Sized,
    {
        let node = &self.nodes[node_id.index()];
        let has_children = node.has_children();

        if !has_children && (node.slots.len() < NODE_CAPACITY || self.at_floor(node)) {
            self.place(node_id, key);
            return;
        }

        // First overflow: the four residents move down along with the newcomer.
        let mut movers: Chain<K> = Chain::new();
        if !has_children {
            movers.extend(self.nodes[node_id.index()].slots.drain(..));
        }
        movers.push(key);

        while let Some(mover) = movers.pop() {
            let quadrant = self.nodes[node_id.index()].quadrant_of(source.position(mover));
            let child = self.child_or_create(node_id, quadrant);
            self.insert_into(source, child, mover);
        }
    }

    fn place(&mut self, node_id: NodeId, key: K) {
        self.nodes[node_id.index()].slots.push(key);
        self.owners.insert(key, node_id);
    }

    fn at_floor(&self, node: &Node<K>) -> bool {
        node.depth >= self.max_depth
            || node.extent.width() / 2.0 < self.min_size
            || node.extent.height() / 2.0 < self.min_size
    }

    fn child_or_create(&mut self, parent: NodeId, quadrant: usize) -> NodeId {
        if let Some(child) = self.nodes[parent.index()].children[quadrant] {
            return child;
        }

        let parent_node = &self.nodes[parent.index()];
        let child_node = Node::new(
            parent_node.extent.quadrant(quadrant),
            parent_node.child_border(quadrant),
            parent_node.depth + 1,
        );

        let index = self.node_pool.take();
        if index as usize == self.nodes.len() {
            self.nodes.push(child_node);
        } else {
            self.nodes[index as usize] = child_node;
        }
        let child = NodeId(index);
        self.nodes[parent.index()].children[quadrant] = Some(child);
        child
    }

    /// Unfiles `key` and clears its anchor. Returns whether it was tracked.
    pub fn remove<S>(&mut self, source: &mut S, key: K) -> bool
    where
        S: EntitySource<K> + ?Sized,
    {
        match self.detach(key) {
            Some(_) => {
                source.set_anchor(key, None);
                true
            }
            None => false,
        }
    }

    /// Files `key` again if its position has left the node holding it. Call
    /// after moving a tracked entity between sweeps, so later queries still
    /// find it. Returns whether it was refiled.
    pub fn relocate<S>(&mut self, source: &mut S, key: K) -> bool
    where
        S: EntitySource<K> + ?Sized,
    {
        let node_id = match self.owner(key) {
            Some(node_id) => node_id,
            None => return false,
        };
        if self.nodes[node_id.index()].holds(source.position(key)) {
            return false;
        }
        self.detach(key);
        self.insert(source, key);
        log::trace!("{:?} refiled from {:?} to {:?}", key, node_id, self.owner(key));
        true
    }

    // Clears the slot and owner entry, leaving the anchor alone.
    pub(crate) fn detach(&mut self, key: K) -> Option<NodeId> {
        let node_id = self.owners.remove(&key)?;
        let slots = &mut self.nodes[node_id.index()].slots;
        if let Some(slot) = slots.iter().position(|resident| *resident == key) {
            slots.swap_remove(slot);
        }
        Some(node_id)
    }

    pub(crate) fn free_node(&mut self, node_id: NodeId) {
        debug_assert!(node_id != NodeId::ROOT);
        let node = &mut self.nodes[node_id.index()];
        debug_assert!(node.slots.is_empty() && !node.has_children());
        node.slots = Default::default();
        self.node_pool.give(node_id.0);
    }

    /// Tears the tree down and hands back every key it still tracked so the
    /// caller can release them.
    pub fn destroy(self) -> Chain<K> {
        let keys: Chain<K> = self
            .live_nodes()
            .flat_map(|id| self.nodes[id.index()].slots.iter().copied())
            .collect();
        keys
    }

    /// Verifies slots, owner index, node modes and anchors agree.
    pub fn check_invariants<S>(&self, source: &S) -> RegionTreeResult<()>
    where
        S: EntitySource<K> + ?Sized,
    {
        let inconsistent = |node: NodeId, reason: String| RegionTreeError::Inconsistent { node, reason };

        let mut reached = 0usize;
        let mut filed = 0usize;
        for id in self.live_nodes() {
            reached += 1;
            if !self.is_live(id) {
                return Err(inconsistent(id, "child points at a freed node".to_string()));
            }
            let node = &self.nodes[id.index()];
            if node.has_children() && !node.slots.is_empty() {
                return Err(inconsistent(
                    id,
                    format!("internal node holds {} direct entities", node.slots.len()),
                ));
            }
            if node.slots.len() > NODE_CAPACITY && !self.at_floor(node) {
                return Err(inconsistent(
                    id,
                    format!("leaf holds {} entities above the depth floor", node.slots.len()),
                ));
            }
            for (quadrant, child) in node.children.iter().enumerate() {
                if let Some(child) = child {
                    let child_node = &self.nodes[child.index()];
                    if child_node.extent != node.extent.quadrant(quadrant) || child_node.depth != node.depth + 1 {
                        return Err(inconsistent(*child, format!("not quadrant {} of its parent", quadrant)));
                    }
                }
            }
            for key in node.slots.iter() {
                filed += 1;
                if self.owners.get(key) != Some(&id) {
                    return Err(inconsistent(id, format!("{:?} is not indexed under this node", key)));
                }
                if source.anchor(*key).is_none() {
                    return Err(inconsistent(id, format!("{:?} is filed but has no anchor", key)));
                }
            }
        }

        if filed != self.owners.len() {
            return Err(inconsistent(
                NodeId::ROOT,
                format!("{} keys indexed but {} filed", self.owners.len(), filed),
            ));
        }
        if reached != self.node_pool.live() {
            return Err(inconsistent(
                NodeId::ROOT,
                format!("{} nodes allocated but {} reachable", self.node_pool.live(), reached),
            ));
        }
        Ok(())
    }
}
