use crate::domains::Cost;
use ordered_float::OrderedFloat;

/// Priority key of the open list, smaller is better. A* keys are integral
/// g + h values, but Potential Search keys are the ratio h / (C − g), so
/// the key is a totally ordered float for both.
pub type Priority = OrderedFloat<f64>;

/// Dense identifier of a unique state, assigned in discovery order. Doubles
/// as the index into the search space's interning map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StateId(usize);

impl StateId {
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    pub(crate) fn index(self) -> usize {
        self.0
    }
}

/// Identifier of a search node in the arena. A state accumulates one node
/// per g-improvement over its lifetime; only the most recent one is valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(usize);

impl NodeId {
    pub(crate) fn new(index: usize) -> Self {
        Self(index)
    }

    pub(crate) fn index(self) -> usize {
        self.0
    }
}

/// Sentinel parent of the root node.
pub const NO_NODE: NodeId = NodeId(usize::MAX);

/// A node in the search space. `state` and `g` are fixed at creation:
/// finding a cheaper path to the same state creates a replacement node and
/// flips `is_valid` off on this one, rather than updating it in place.
#[derive(Debug, Clone)]
pub struct SearchNode {
    /// State this node evaluates.
    state: StateId,
    /// Priority key, formula depends on the search algorithm.
    f: Priority,
    /// Heuristic estimate at this state.
    h: Cost,
    /// Cost of the path from the root to this node.
    g: Cost,
    /// Node that generated this one; `NO_NODE` for the root.
    parent: NodeId,
    /// True while the node is logically in the open list.
    in_open: bool,
    /// False marks a stale entry superseded by a cheaper node.
    is_valid: bool,
}

impl SearchNode {
    pub fn new(state: StateId, f: Priority, h: Cost, g: Cost, parent: NodeId) -> Self {
        Self {
            state,
            f,
            h,
            g,
            parent,
            in_open: true,
            is_valid: true,
        }
    }

    pub fn get_state(&self) -> StateId {
        self.state
    }

    pub fn get_f(&self) -> Priority {
        self.f
    }

    pub fn get_h(&self) -> Cost {
        self.h
    }

    pub fn get_g(&self) -> Cost {
        self.g
    }

    pub fn get_parent(&self) -> NodeId {
        self.parent
    }

    pub fn is_in_open(&self) -> bool {
        self.in_open
    }

    pub fn is_valid(&self) -> bool {
        self.is_valid
    }

    /// Called on every pop, valid or stale.
    pub fn leave_open(&mut self) {
        self.in_open = false;
    }

    /// Mark the node stale. The replacement node has already been pushed
    /// when this runs, so a later pop simply discards this one.
    pub fn invalidate(&mut self) {
        debug_assert!(self.in_open, "only open nodes can go stale");
        self.is_valid = false;
    }
}
