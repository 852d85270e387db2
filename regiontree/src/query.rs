use crate::node::NodeId;
use crate::source::EntitySource;
use crate::tree::RegionTree;
use common::chain::Chain;
use common::shapes::Rectangle;
use smallvec::SmallVec;
use std::fmt::Debug;
use std::hash::Hash;

type NodeStack = SmallVec<[NodeId; 64]>;

impl<K> RegionTree<K>
where
    K: Copy + Eq + Hash + Debug,
{
    /// Every tracked entity whose hitbox intersects `query`, each once.
    pub fn fetch<S>(&self, source: &S, query: Rectangle) -> Chain<K>
    where
        S: EntitySource<K> + ?Sized,
    {
        self.fetch_from(NodeId::ROOT, source, query)
    }

    /// Like [`fetch`](Self::fetch) but limited to the subtree under `start`.
    pub fn fetch_from<S>(&self, start: NodeId, source: &S, query: Rectangle) -> Chain<K>
    where
        S: EntitySource<K> + ?Sized,
    {
        let mut found = Chain::new();
        self.for_each_in(start, source, query, |key| found.push(key));
        found
    }

    pub(crate) fn for_each_in<S, F>(&self, start: NodeId, source: &S, query: Rectangle, mut f: F)
    where
        S: EntitySource<K> + ?Sized,
        F: FnMut(K),
    {
        if !self.is_live(start) {
            return;
        }
        let mut stack: NodeStack = SmallVec::new();
        stack.push(start);
        while let Some(node_id) = stack.pop() {
            let node = &self.nodes[node_id.index()];
            for key in node.slots.iter() {
                if source.hitbox(*key).intersects(&query) {
                    f(*key);
                }
            }
            // Positions partition the children, so no key is reported twice.
            for child in node.child_ids() {
                if self.reach.may_overlap(&self.nodes[child.index()], &query) {
                    stack.push(child);
                }
            }
        }
    }

    /// Hands every node rectangle to `outline`, parents first. Debug aid.
    pub fn draw<F>(&self, mut outline: F)
    where
        F: FnMut(Rectangle),
    {
        for id in self.live_nodes() {
            outline(self.rect(id));
        }
    }
}
