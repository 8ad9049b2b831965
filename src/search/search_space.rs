use crate::search::{NodeId, Priority, SearchNode, StateId, NO_NODE};
use crate::domains::Cost;
use indexmap::map::Entry;
use indexmap::IndexMap;
use segvec::{Linear, SegVec};
use std::hash::Hash;

/// Bookkeeping shared by every search algorithm: an interning map from
/// state to its current best node (the closed map; it covers frontier and
/// expanded states alike) and an append-only arena of every node ever
/// created.
///
/// Invariant: for each registered state, the mapped node has the smallest
/// g pushed for it so far and is the only valid node of that state; all of
/// its predecessors in the arena carry `is_valid == false`.
#[derive(Debug)]
pub struct SearchSpace<S: Hash + Eq> {
    states: IndexMap<S, NodeId>,
    nodes: SegVec<SearchNode, Linear>,
}

impl<S: Hash + Eq + Clone> SearchSpace<S> {
    pub fn new() -> Self {
        Self {
            states: IndexMap::new(),
            nodes: SegVec::new(),
        }
    }

    /// Intern a state, returning its dense id and the node currently
    /// mapped to it, if any. A state registered but never given a node
    /// (bound-pruned before creation) reports `None` like a fresh one.
    pub fn register(&mut self, state: S) -> (StateId, Option<NodeId>) {
        match self.states.entry(state) {
            Entry::Occupied(entry) => {
                let node = *entry.get();
                let existing = (node != NO_NODE).then_some(node);
                (StateId::new(entry.index()), existing)
            }
            Entry::Vacant(entry) => {
                let state_id = StateId::new(entry.index());
                entry.insert(NO_NODE);
                (state_id, None)
            }
        }
    }

    /// Create a node and point the closed map at it. Any bookkeeping on
    /// the node it supersedes (invalidation, reopen accounting) is the
    /// caller's job and must happen before this.
    pub fn new_node(
        &mut self,
        state: StateId,
        f: Priority,
        h: Cost,
        g: Cost,
        parent: NodeId,
    ) -> NodeId {
        let node_id = NodeId::new(self.nodes.len());
        self.nodes.push(SearchNode::new(state, f, h, g, parent));
        let (_, current) = self
            .states
            .get_index_mut(state.index())
            .expect("state was registered before its node");
        *current = node_id;
        node_id
    }

    pub fn get_state(&self, state_id: StateId) -> &S {
        self.states
            .get_index(state_id.index())
            .expect("invalid state id")
            .0
    }

    pub fn get_node(&self, node_id: NodeId) -> &SearchNode {
        self.nodes.get(node_id.index()).expect("invalid node id")
    }

    pub fn get_node_mut(&mut self, node_id: NodeId) -> &mut SearchNode {
        self.nodes.get_mut(node_id.index()).expect("invalid node id")
    }

    /// Number of distinct states discovered so far.
    pub fn num_states(&self) -> usize {
        self.states.len()
    }

    /// Reconstruct the state sequence from the root to `node_id` by
    /// walking parent pointers. Parents always have strictly smaller g, so
    /// the walk terminates at the root.
    pub fn extract_path(&self, node_id: NodeId) -> Vec<S> {
        let mut path = Vec::new();
        let mut current = node_id;
        while current != NO_NODE {
            let node = self.get_node(current);
            path.push(self.get_state(node.get_state()).clone());
            current = node.get_parent();
        }
        path.reverse();
        path
    }
}

impl<S: Hash + Eq + Clone> Default for SearchSpace<S> {
    fn default() -> Self {
        Self::new()
    }
}
