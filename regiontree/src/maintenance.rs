use crate::node::{NodeId, Reach, COLLAPSE_THRESHOLD};
use crate::source::EntitySource;
use crate::tree::RegionTree;
use common::chain::Chain;
use std::collections::VecDeque;
use std::fmt::Debug;
use std::hash::Hash;

/// What one rebalancing sweep changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateStats {
    /// Entities whose position left their node.
    pub escaped: usize,
    /// Nodes freed by collapsing into their parent.
    pub collapsed: usize,
    /// Entities filed again from the root (escaped plus pulled out of collapsed nodes).
    pub reinserted: usize,
}

impl UpdateStats {
    pub fn is_noop(&self) -> bool {
        self.reinserted == 0 && self.collapsed == 0
    }
}

impl<K> RegionTree<K>
where
    K: Copy + Eq + Hash + Debug,
{
    /// Rebalancing sweep. Run once per tick, after entities have moved.
    ///
    /// Level by level from the root, entities whose position left their node
    /// are detached. Then, deepest level first, every node whose children are
    /// all leaves holding fewer than [`COLLAPSE_THRESHOLD`] entities between
    /// them loses those children. Everything detached is inserted again at
    /// the root. The hitbox reach used to prune queries is rebuilt from the
    /// entities still tracked, so it shrinks again after large hitboxes leave.
    pub fn update<S>(&mut self, source: &mut S) -> UpdateStats
    where
        S: EntitySource<K> + ?Sized,
    {
        let mut stats = UpdateStats::default();
        let mut escaped: Chain<K> = Chain::new();
        let mut reach = Reach::default();

        let mut order: Vec<NodeId> = Vec::with_capacity(self.node_count());
        let mut queue: VecDeque<NodeId> = VecDeque::new();
        queue.push_back(NodeId::ROOT);
        while let Some(node_id) = queue.pop_front() {
            order.push(node_id);
            let node = &mut self.nodes[node_id.index()];
            let mut slot = 0;
            while slot < node.slots.len() {
                let key = node.slots[slot];
                let position = source.position(key);
                if node.holds(position) {
                    reach.include(position, &source.hitbox(key));
                    slot += 1;
                    continue;
                }
                node.slots.swap_remove(slot);
                self.owners.remove(&key);
                source.set_anchor(key, None);
                escaped.push(key);
                stats.escaped += 1;
            }
            queue.extend(node.child_ids());
        }

        for &node_id in order.iter().rev() {
            let node = &self.nodes[node_id.index()];
            if !node.has_children() {
                continue;
            }
            let mut total = 0;
            let mut deeper = false;
            for child in node.child_ids() {
                let child = &self.nodes[child.index()];
                total += child.slots.len();
                deeper |= child.has_children();
            }
            if deeper || total >= COLLAPSE_THRESHOLD {
                continue;
            }

            let children = std::mem::replace(&mut self.nodes[node_id.index()].children, [None; 4]);
            for child in children.into_iter().flatten() {
                let slots = std::mem::take(&mut self.nodes[child.index()].slots);
                for key in slots {
                    self.owners.remove(&key);
                    source.set_anchor(key, None);
                    escaped.push(key);
                }
                self.free_node(child);
                stats.collapsed += 1;
            }
        }

        // Reinsertion adds the escapees back in.
        self.reach = reach;
        while let Some(key) = escaped.pop() {
            self.insert(source, key);
            stats.reinserted += 1;
        }

        if !stats.is_noop() {
            log::debug!(
                "region tree update: {} escaped, {} nodes collapsed, {} reinserted, {} nodes live",
                stats.escaped,
                stats.collapsed,
                stats.reinserted,
                self.node_count()
            );
        }
        stats
    }
}
