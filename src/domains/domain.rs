use rand::Rng;
use std::fmt::Debug;
use std::hash::Hash;
use thiserror::Error;

/// Path costs and heuristic estimates. Operator costs are positive integers
/// in every supported domain, so plain unsigned arithmetic is enough.
pub type Cost = u32;

/// Construction-time failure of a domain or one of its knobs. These are
/// fatal for the caller that produced them; nothing in the search loop
/// raises them.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InvalidInput {
    #[error("goal must be a permutation of 0..{size}, got {goal:?}")]
    BadGoal { size: usize, goal: Vec<u8> },
    #[error("tile sequence {tiles:?} is not a permutation of 0..{size}")]
    BadTiles { size: usize, tiles: Vec<u8> },
    #[error("puzzle must have between 2 and 256 cells, got {width}x{height}")]
    BadDimensions { width: usize, height: usize },
    #[error("all four slide directions must appear exactly once in the operator order")]
    IncompleteOperatorOrder,
    #[error("stack must hold between 2 and 255 pancakes, got {0}")]
    BadStackSize(usize),
    #[error("stack {0:?} is not a permutation of 1..=N")]
    BadStack(Vec<u8>),
    #[error("heuristic degradation must be a non-negative multiple of 0.5, got {0}")]
    BadDegradation(f64),
    #[error("cannot parse {value:?} as a state: {reason}")]
    UnparsableState { value: String, reason: String },
}

/// True when `values` holds every value in `start..start + len` exactly
/// once. Both bundled domains use this to validate externally supplied
/// states.
pub(crate) fn is_permutation(values: &[u8], start: u8) -> bool {
    let mut seen = vec![false; values.len()];
    values.iter().all(|&value| {
        let Some(index) = value.checked_sub(start).map(usize::from) else {
            return false;
        };
        if index >= seen.len() || seen[index] {
            return false;
        }
        seen[index] = true;
        true
    })
}

/// A deterministic planning domain with integer operator costs.
///
/// The searchers treat a domain as shared and read-only: every capability
/// takes `&self`, and mutating knobs such as the goal or the heuristic
/// degradation must happen between solves, never during one.
pub trait Domain {
    type State: Clone + Debug + Eq + Hash;

    /// Heuristic estimate of the remaining cost from `state` to the goal.
    /// Admissibility is a property of the configuration, not the trait:
    /// degraded heuristics may overestimate, which is the user's choice.
    fn heuristic(&self, state: &Self::State) -> Cost;

    /// Equivalent to `state == goal`.
    fn is_goal(&self, state: &Self::State) -> bool;

    /// All states reachable in one operator application, paired with the
    /// operator cost. Enumeration order is deterministic and preserved, as
    /// tie-breaking downstream depends on it for reproducibility.
    fn successors(&self, state: &Self::State) -> Vec<(Self::State, Cost)>;

    /// Generate `num_instances` states by random walks from the goal: each
    /// walk applies a uniformly random number in `[min_ops, max_ops]` of
    /// uniformly random applicable operators. Instances are not
    /// deduplicated and may coincidentally equal the goal; callers filter.
    fn generate_instances<R: Rng>(
        &self,
        rng: &mut R,
        num_instances: usize,
        min_ops: usize,
        max_ops: usize,
    ) -> Vec<Self::State>;
}
