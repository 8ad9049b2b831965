//! The rectangular sliding-tile puzzle with a weighted Manhattan-distance
//! heuristic. The heuristic can be degraded by ignoring small-valued tiles,
//! which trades accuracy for evaluation speed in experiments.

use crate::domains::domain::is_permutation;
use crate::domains::{Cost, Domain, InvalidInput};
use itertools::Itertools;
use rand::Rng;
use smallvec::SmallVec;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

/// A direction a neighbour tile can slide into the blank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SlideDirection {
    Left,
    Up,
    Down,
    Right,
}

/// State of a W×H tile puzzle: the tiles in row-major order (0 is the
/// blank) and the cached position of the blank. Equality and hashing use
/// the tile sequence only; the cached blank always equals the index of 0.
#[derive(Debug, Clone)]
pub struct TilePuzzleState {
    tiles: Box<[u8]>,
    blank: u8,
}

impl TilePuzzleState {
    /// Build a state from a row-major tile sequence, validating that it is
    /// a permutation of `0..len`.
    pub fn new(tiles: Vec<u8>) -> Result<Self, InvalidInput> {
        let size = tiles.len();
        if !is_permutation(&tiles, 0) {
            return Err(InvalidInput::BadTiles { size, tiles });
        }
        let blank = tiles
            .iter()
            .position(|&tile| tile == 0)
            .expect("a permutation of 0..N contains 0");
        Ok(Self {
            tiles: tiles.into_boxed_slice(),
            blank: blank as u8,
        })
    }

    fn from_parts(tiles: Vec<u8>, blank: usize) -> Self {
        debug_assert_eq!(tiles[blank], 0);
        Self {
            tiles: tiles.into_boxed_slice(),
            blank: blank as u8,
        }
    }

    pub fn tiles(&self) -> &[u8] {
        &self.tiles
    }

    pub fn blank(&self) -> usize {
        usize::from(self.blank)
    }
}

impl PartialEq for TilePuzzleState {
    fn eq(&self, other: &Self) -> bool {
        self.tiles == other.tiles
    }
}

impl Eq for TilePuzzleState {}

impl Hash for TilePuzzleState {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.tiles.hash(state);
    }
}

impl fmt::Display for TilePuzzleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tiles.iter().join(" "))
    }
}

impl FromStr for TilePuzzleState {
    type Err = InvalidInput;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let tiles = s
            .split_whitespace()
            .map(|token| token.parse::<u8>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| InvalidInput::UnparsableState {
                value: s.to_owned(),
                reason: e.to_string(),
            })?;
        Self::new(tiles)
    }
}

/// The sliding-tile puzzle domain. Holds the goal-dependent Manhattan table
/// and the per-blank-position applicable-operator lists, both precomputed;
/// the search loop only ever reads them.
#[derive(Debug)]
pub struct TilePuzzle {
    width: usize,
    height: usize,
    size: usize,
    goal: TilePuzzleState,
    ignore_tiles_up_to: u8,
    operator_order: [SlideDirection; 4],
    applicable_operators: Vec<SmallVec<[SlideDirection; 4]>>,
    /// `h_increment[tile][position]` is the Manhattan distance from
    /// `position` to the goal position of `tile`. Row 0 stays zero: the
    /// blank never contributes because every operator already pays for the
    /// tile it moves.
    h_increment: Vec<Vec<Cost>>,
}

impl TilePuzzle {
    pub const DEFAULT_OPERATOR_ORDER: [SlideDirection; 4] = [
        SlideDirection::Right,
        SlideDirection::Left,
        SlideDirection::Down,
        SlideDirection::Up,
    ];

    pub fn new(width: usize, height: usize) -> Result<Self, InvalidInput> {
        Self::with_operator_order(width, height, Self::DEFAULT_OPERATOR_ORDER)
    }

    /// Create a puzzle whose successor lists enumerate operators in the
    /// given order. The order must mention each direction exactly once; it
    /// matters because tie-breaking in the searchers depends on successor
    /// enumeration order.
    pub fn with_operator_order(
        width: usize,
        height: usize,
        operator_order: [SlideDirection; 4],
    ) -> Result<Self, InvalidInput> {
        let size = width * height;
        if size < 2 || size > 256 || width == 0 || height == 0 {
            return Err(InvalidInput::BadDimensions { width, height });
        }
        for direction in [
            SlideDirection::Left,
            SlideDirection::Up,
            SlideDirection::Down,
            SlideDirection::Right,
        ] {
            if !operator_order.contains(&direction) {
                return Err(InvalidInput::IncompleteOperatorOrder);
            }
        }

        let applicable_operators = (0..size)
            .map(|blank| {
                let row = blank / width;
                let column = blank % width;
                operator_order
                    .iter()
                    .copied()
                    .filter(|op| match op {
                        SlideDirection::Up => row > 0,
                        SlideDirection::Down => row < height - 1,
                        SlideDirection::Left => column > 0,
                        SlideDirection::Right => column < width - 1,
                    })
                    .collect()
            })
            .collect();

        // Classic solved board: tiles in order, blank in the last cell.
        let goal_tiles: Vec<u8> = (1..size).map(|tile| tile as u8).chain([0]).collect();
        let goal = TilePuzzleState::new(goal_tiles)
            .expect("the default goal is a permutation of 0..N");
        let mut puzzle = Self {
            width,
            height,
            size,
            goal: goal.clone(),
            ignore_tiles_up_to: 0,
            operator_order,
            applicable_operators,
            h_increment: Vec::new(),
        };
        puzzle.set_goal(goal)?;
        Ok(puzzle)
    }

    /// Replace the goal state and rebuild the Manhattan table. Must not be
    /// called while a solve is running; the searchers borrow the domain
    /// immutably for their whole run, so the borrow checker enforces this.
    pub fn set_goal(&mut self, goal: TilePuzzleState) -> Result<(), InvalidInput> {
        if goal.tiles.len() != self.size {
            return Err(InvalidInput::BadGoal {
                size: self.size,
                goal: goal.tiles.to_vec(),
            });
        }

        let mut h_increment = vec![vec![0; self.size]; self.size];
        for (goal_position, &tile) in goal.tiles.iter().enumerate() {
            if tile == 0 {
                continue;
            }
            let goal_row = goal_position / self.width;
            let goal_column = goal_position % self.width;
            for position in 0..self.size {
                let row = position / self.width;
                let column = position % self.width;
                h_increment[usize::from(tile)][position] =
                    (goal_row.abs_diff(row) + goal_column.abs_diff(column)) as Cost;
            }
        }

        self.goal = goal;
        self.h_increment = h_increment;
        Ok(())
    }

    /// Tiles with value at or below the threshold stop contributing to the
    /// heuristic. Zero keeps the standard Manhattan distance (only the
    /// blank is skipped).
    pub fn set_ignored_tiles(&mut self, ignore_tiles_up_to: u8) {
        self.ignore_tiles_up_to = ignore_tiles_up_to;
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn goal(&self) -> &TilePuzzleState {
        &self.goal
    }

    pub fn operator_order(&self) -> [SlideDirection; 4] {
        self.operator_order
    }

    /// Slide a tile into the blank, updating `tiles` in place and returning
    /// the new blank position. Callers only pass operators from the
    /// applicable table of `blank`.
    fn apply(&self, tiles: &mut [u8], blank: usize, op: SlideDirection) -> usize {
        let swapped = match op {
            SlideDirection::Up => {
                debug_assert!(blank >= self.width);
                blank - self.width
            }
            SlideDirection::Down => {
                debug_assert!(blank + self.width < self.size);
                blank + self.width
            }
            SlideDirection::Left => {
                debug_assert!(blank % self.width > 0);
                blank - 1
            }
            SlideDirection::Right => {
                debug_assert!(blank % self.width < self.width - 1);
                blank + 1
            }
        };
        tiles.swap(blank, swapped);
        swapped
    }
}

impl Domain for TilePuzzle {
    type State = TilePuzzleState;

    fn heuristic(&self, state: &TilePuzzleState) -> Cost {
        let mut distance = 0;
        for (position, &tile) in state.tiles.iter().enumerate() {
            if tile <= self.ignore_tiles_up_to {
                continue;
            }
            distance += self.h_increment[usize::from(tile)][position];
        }
        distance
    }

    fn is_goal(&self, state: &TilePuzzleState) -> bool {
        *state == self.goal
    }

    fn successors(&self, state: &TilePuzzleState) -> Vec<(TilePuzzleState, Cost)> {
        let blank = state.blank();
        self.applicable_operators[blank]
            .iter()
            .map(|&op| {
                let mut tiles = state.tiles.to_vec();
                let new_blank = self.apply(&mut tiles, blank, op);
                (TilePuzzleState::from_parts(tiles, new_blank), 1)
            })
            .collect()
    }

    fn generate_instances<R: Rng>(
        &self,
        rng: &mut R,
        num_instances: usize,
        min_ops: usize,
        max_ops: usize,
    ) -> Vec<TilePuzzleState> {
        (0..num_instances)
            .map(|_| {
                let num_ops = rng.random_range(min_ops..=max_ops);
                let mut tiles = self.goal.tiles.to_vec();
                let mut blank = self.goal.blank();
                for _ in 0..num_ops {
                    let applicable = &self.applicable_operators[blank];
                    let op = applicable[rng.random_range(0..applicable.len())];
                    blank = self.apply(&mut tiles, blank, op);
                }
                TilePuzzleState::from_parts(tiles, blank)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    fn state(tiles: &[u8]) -> TilePuzzleState {
        TilePuzzleState::new(tiles.to_vec()).unwrap()
    }

    #[test]
    fn state_rejects_non_permutations() {
        assert!(TilePuzzleState::new(vec![1, 2, 3]).is_err());
        assert!(TilePuzzleState::new(vec![0, 0, 1]).is_err());
        assert!(TilePuzzleState::new(vec![0, 1, 3]).is_err());
    }

    #[test]
    fn state_equality_ignores_cached_blank() {
        let a = state(&[1, 0, 2]);
        let b = TilePuzzleState::from_parts(vec![1, 0, 2], 1);
        assert_eq!(a, b);
        assert_eq!(a.blank(), 1);
    }

    #[test]
    fn display_round_trips() {
        let a = state(&[3, 1, 2, 0]);
        let shown = a.to_string();
        assert_eq!(shown, "3 1 2 0");
        assert_eq!(shown.parse::<TilePuzzleState>().unwrap(), a);
    }

    #[test]
    fn rejects_bad_dimensions() {
        assert!(TilePuzzle::new(1, 1).is_err());
        assert!(TilePuzzle::new(0, 4).is_err());
        assert!(TilePuzzle::new(32, 32).is_err());
    }

    #[test]
    fn rejects_duplicate_operator_order() {
        let order = [
            SlideDirection::Left,
            SlideDirection::Left,
            SlideDirection::Down,
            SlideDirection::Up,
        ];
        assert_eq!(
            TilePuzzle::with_operator_order(3, 3, order).unwrap_err(),
            InvalidInput::IncompleteOperatorOrder
        );
    }

    #[test]
    fn rejects_wrong_sized_goal() {
        let mut puzzle = TilePuzzle::new(3, 3).unwrap();
        assert!(puzzle.set_goal(state(&[0, 1, 2, 3])).is_err());
    }

    #[test]
    fn default_goal_has_the_blank_last() {
        let puzzle = TilePuzzle::new(3, 3).unwrap();
        assert_eq!(puzzle.goal(), &state(&[1, 2, 3, 4, 5, 6, 7, 8, 0]));
    }

    #[test]
    fn manhattan_distance_matches_hand_computation() {
        let puzzle = TilePuzzle::new(3, 3).unwrap();
        assert_eq!(puzzle.heuristic(puzzle.goal()), 0);
        // Tile 8 is one column from home.
        assert_eq!(puzzle.heuristic(&state(&[1, 2, 3, 4, 5, 6, 7, 0, 8])), 1);
        // Tiles 7 and 8 are each one column from home.
        assert_eq!(puzzle.heuristic(&state(&[1, 2, 3, 4, 5, 6, 0, 7, 8])), 2);
    }

    #[test]
    fn ignored_tiles_stop_contributing() {
        let mut puzzle = TilePuzzle::new(3, 3).unwrap();
        // Tiles 1 and 2 are swapped, one column of displacement each.
        let s = state(&[2, 1, 3, 4, 5, 6, 7, 8, 0]);
        let full = puzzle.heuristic(&s);
        assert_eq!(full, 2);
        puzzle.set_ignored_tiles(1);
        assert_eq!(puzzle.heuristic(&s), 1);
        puzzle.set_ignored_tiles(2);
        assert_eq!(puzzle.heuristic(&s), 0);
    }

    #[test]
    fn degradation_never_increases_the_heuristic() {
        let mut puzzle = TilePuzzle::new(3, 3).unwrap();
        let mut rng = SmallRng::seed_from_u64(7);
        let instances = puzzle.generate_instances(&mut rng, 20, 5, 40);
        for instance in instances {
            let mut previous = Cost::MAX;
            for ignore in 0..9 {
                puzzle.set_ignored_tiles(ignore);
                let h = puzzle.heuristic(&instance);
                assert!(h <= previous);
                previous = h;
            }
            puzzle.set_ignored_tiles(0);
        }
    }

    #[test]
    fn successors_preserve_operator_order() {
        let puzzle = TilePuzzle::new(3, 3).unwrap();
        // Blank in the centre: all four operators apply, in default order
        // right, left, down, up.
        let s = state(&[1, 2, 3, 4, 0, 5, 6, 7, 8]);
        let successors = puzzle.successors(&s);
        assert_eq!(successors.len(), 4);
        assert_eq!(successors[0].0, state(&[1, 2, 3, 4, 5, 0, 6, 7, 8]));
        assert_eq!(successors[1].0, state(&[1, 2, 3, 0, 4, 5, 6, 7, 8]));
        assert_eq!(successors[2].0, state(&[1, 2, 3, 4, 7, 5, 6, 0, 8]));
        assert_eq!(successors[3].0, state(&[1, 0, 3, 4, 2, 5, 6, 7, 8]));
        assert!(successors.iter().all(|(_, cost)| *cost == 1));
    }

    #[test]
    fn corner_blank_has_two_successors() {
        let puzzle = TilePuzzle::new(3, 3).unwrap();
        assert_eq!(puzzle.successors(puzzle.goal()).len(), 2);
    }

    #[test]
    fn every_slide_is_reversible() {
        let puzzle = TilePuzzle::new(4, 3).unwrap();
        let mut rng = SmallRng::seed_from_u64(11);
        for instance in puzzle.generate_instances(&mut rng, 10, 3, 30) {
            for (neighbour, _) in puzzle.successors(&instance) {
                assert!(puzzle
                    .successors(&neighbour)
                    .iter()
                    .any(|(back, _)| *back == instance));
            }
        }
    }

    #[test]
    fn generated_instances_are_valid_permutations() {
        let puzzle = TilePuzzle::new(4, 4).unwrap();
        let mut rng = SmallRng::seed_from_u64(3);
        let instances = puzzle.generate_instances(&mut rng, 5, 10, 20);
        assert_eq!(instances.len(), 5);
        for instance in instances {
            assert!(TilePuzzleState::new(instance.tiles().to_vec()).is_ok());
            assert_eq!(instance.tiles()[instance.blank()], 0);
        }
    }

    #[test]
    fn custom_goal_rebuilds_the_table() {
        let mut puzzle = TilePuzzle::new(2, 2).unwrap();
        let goal = state(&[3, 1, 2, 0]);
        puzzle.set_goal(goal.clone()).unwrap();
        assert_eq!(puzzle.heuristic(&goal), 0);
        assert!(puzzle.is_goal(&goal));
        assert!(!puzzle.is_goal(&state(&[0, 1, 2, 3])));
    }
}
