//! A* search with lazy open-list updates.

use crate::domains::{Cost, Domain};
use crate::search::{
    OpenList, SearchError, SearchSpace, SearchStatistics, Solution, TerminationCondition, NO_NODE,
};
use ordered_float::OrderedFloat;
use std::time::Duration;

/// Optimal best-first search with `f = g + h`. The goal test runs when a
/// node is popped, not when it is generated: a cheaper path to the goal
/// may still be waiting in the open list, and popping in f-order is what
/// makes the first goal pop optimal under an admissible heuristic.
#[derive(Debug)]
pub struct AstarSearcher<'a, D: Domain> {
    domain: &'a D,
    statistics: SearchStatistics,
    cost: Option<Cost>,
    total_time: Option<Duration>,
}

impl<'a, D: Domain> AstarSearcher<'a, D> {
    pub fn new(domain: &'a D) -> Self {
        Self {
            domain,
            statistics: SearchStatistics::new(),
            cost: None,
            total_time: None,
        }
    }

    pub fn statistics(&self) -> &SearchStatistics {
        &self.statistics
    }

    /// Cost of the last successful solve.
    pub fn cost(&self) -> Option<Cost> {
        self.cost
    }

    /// Wall time of the last successful solve.
    pub fn total_time(&self) -> Option<Duration> {
        self.total_time
    }

    fn reset(&mut self) {
        self.statistics = SearchStatistics::new();
        self.cost = None;
        self.total_time = None;
    }

    pub fn solve(
        &mut self,
        start: &D::State,
        time_limit: Duration,
    ) -> Result<Solution, SearchError> {
        self.reset();
        let mut termination = TerminationCondition::new(time_limit);
        let mut space: SearchSpace<D::State> = SearchSpace::new();
        let mut open = OpenList::new();

        let root_h = self.domain.heuristic(start);
        let (root_state, _) = space.register(start.clone());
        let root = space.new_node(
            root_state,
            OrderedFloat(f64::from(root_h)),
            root_h,
            0,
            NO_NODE,
        );
        self.statistics.increment_generated();
        open.push(root, space.get_node(root));

        while let Some(node_id) = open.pop() {
            if termination.timed_out() {
                return Err(SearchError::Timeout {
                    elapsed: termination.elapsed(),
                });
            }
            termination.log_if_needed(&self.statistics);

            let node = space.get_node_mut(node_id);
            node.leave_open();
            // A stale pop: the node was superseded by a cheaper path after
            // it entered the heap. Discard it without charging `expanded`.
            if !node.is_valid() {
                continue;
            }
            let g = node.get_g();
            let state_id = node.get_state();

            if self.domain.is_goal(space.get_state(state_id)) {
                let total_time = termination.elapsed();
                termination.finalise(&self.statistics);
                self.cost = Some(g);
                self.total_time = Some(total_time);
                return Ok(Solution {
                    cost: g,
                    total_time,
                });
            }
            self.statistics.increment_expanded();

            let state = space.get_state(state_id).clone();
            for (successor, op_cost) in self.domain.successors(&state) {
                let successor_g = g + op_cost;

                // The closed map holds every state seen so far, frontier
                // included; an entry with an equal or smaller g dominates
                // this path and the successor is dropped unevaluated.
                let (successor_state, existing) = space.register(successor);
                if let Some(best) = existing {
                    if space.get_node(best).get_g() <= successor_g {
                        continue;
                    }
                }

                let successor_h = self.domain.heuristic(space.get_state(successor_state));
                let f = OrderedFloat(f64::from(successor_g + successor_h));

                if let Some(best) = existing {
                    let best_node = space.get_node_mut(best);
                    if best_node.is_in_open() {
                        best_node.invalidate();
                    } else {
                        self.statistics.increment_reopened();
                    }
                }

                let successor_node =
                    space.new_node(successor_state, f, successor_h, successor_g, node_id);
                self.statistics.increment_generated();
                open.push(successor_node, space.get_node(successor_node));
            }
        }

        Err(SearchError::NoSolution {
            bound: None,
            elapsed: termination.elapsed(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::{Pancakes, PancakesState, TilePuzzle, TilePuzzleState};
    use crate::test_utils::brute_force_cost;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    const MINUTE: Duration = Duration::from_secs(60);

    fn tile_state(tiles: &[u8]) -> TilePuzzleState {
        TilePuzzleState::new(tiles.to_vec()).unwrap()
    }

    #[test]
    fn trivial_instance_costs_nothing() {
        let puzzle = TilePuzzle::new(3, 3).unwrap();
        let start = tile_state(&[1, 2, 3, 4, 5, 6, 7, 8, 0]);
        let mut searcher = AstarSearcher::new(&puzzle);
        let solution = searcher.solve(&start, MINUTE).unwrap();
        assert_eq!(solution.cost, 0);
        // The goal test fires on the root pop, before any expansion.
        assert_eq!(searcher.statistics().expanded, 0);
        assert_eq!(searcher.statistics().generated, 1);
        assert_eq!(searcher.cost(), Some(0));
    }

    #[test]
    fn one_move_instance() {
        let puzzle = TilePuzzle::new(3, 3).unwrap();
        let start = tile_state(&[1, 2, 3, 4, 5, 6, 7, 0, 8]);
        let mut searcher = AstarSearcher::new(&puzzle);
        assert_eq!(searcher.solve(&start, MINUTE).unwrap().cost, 1);
    }

    #[test]
    fn two_move_instance() {
        let puzzle = TilePuzzle::new(3, 3).unwrap();
        let start = tile_state(&[1, 2, 3, 4, 5, 6, 0, 7, 8]);
        let mut searcher = AstarSearcher::new(&puzzle);
        assert_eq!(searcher.solve(&start, MINUTE).unwrap().cost, 2);
        assert!(searcher.statistics().expanded <= searcher.statistics().generated);
    }

    #[test]
    fn pancake_trivial_and_one_flip() {
        let domain = Pancakes::new(5).unwrap();
        let mut searcher = AstarSearcher::new(&domain);
        assert_eq!(searcher.solve(domain.goal(), MINUTE).unwrap().cost, 0);

        let one_flip = PancakesState::new(vec![5, 4, 3, 1, 2]).unwrap();
        assert_eq!(searcher.solve(&one_flip, MINUTE).unwrap().cost, 1);
    }

    #[test]
    fn matches_brute_force_on_random_tile_instances() {
        let puzzle = TilePuzzle::new(3, 2).unwrap();
        let mut rng = SmallRng::seed_from_u64(17);
        for start in puzzle.generate_instances(&mut rng, 15, 1, 20) {
            let expected = brute_force_cost(&puzzle, &start);
            let mut searcher = AstarSearcher::new(&puzzle);
            assert_eq!(searcher.solve(&start, MINUTE).unwrap().cost, expected);
        }
    }

    #[test]
    fn matches_brute_force_on_random_pancake_instances() {
        let domain = Pancakes::new(6).unwrap();
        let mut rng = SmallRng::seed_from_u64(29);
        for start in domain.generate_instances(&mut rng, 15, 1, 12) {
            let expected = brute_force_cost(&domain, &start);
            let mut searcher = AstarSearcher::new(&domain);
            assert_eq!(searcher.solve(&start, MINUTE).unwrap().cost, expected);
        }
    }

    #[test]
    fn gap_heuristic_never_overestimates() {
        let domain = Pancakes::new(6).unwrap();
        let mut rng = SmallRng::seed_from_u64(41);
        for start in domain.generate_instances(&mut rng, 20, 1, 15) {
            let optimal = brute_force_cost(&domain, &start);
            assert!(domain.heuristic(&start) <= optimal);
        }
    }

    #[test]
    fn repeated_runs_are_deterministic() {
        let puzzle = TilePuzzle::new(3, 3).unwrap();
        let mut rng = SmallRng::seed_from_u64(53);
        let start = puzzle
            .generate_instances(&mut rng, 1, 25, 35)
            .pop()
            .unwrap();

        let mut first = AstarSearcher::new(&puzzle);
        let first_solution = first.solve(&start, MINUTE).unwrap();
        let mut second = AstarSearcher::new(&puzzle);
        let second_solution = second.solve(&start, MINUTE).unwrap();

        assert_eq!(first_solution.cost, second_solution.cost);
        assert_eq!(first.statistics(), second.statistics());
    }

    #[test]
    fn zero_time_limit_reports_a_timeout() {
        let puzzle = TilePuzzle::new(3, 3).unwrap();
        let start = tile_state(&[1, 2, 3, 4, 5, 6, 7, 8, 0]);
        let mut searcher = AstarSearcher::new(&puzzle);
        let error = searcher.solve(&start, Duration::ZERO).unwrap_err();
        assert!(matches!(error, SearchError::Timeout { .. }));
        assert_eq!(searcher.cost(), None);
    }

    #[test]
    fn solver_state_resets_between_solves() {
        let puzzle = TilePuzzle::new(3, 3).unwrap();
        let mut searcher = AstarSearcher::new(&puzzle);
        let hard = tile_state(&[1, 2, 3, 4, 5, 6, 0, 7, 8]);
        searcher.solve(&hard, MINUTE).unwrap();
        let expanded_hard = searcher.statistics().expanded;
        assert!(expanded_hard > 0);

        searcher.solve(puzzle.goal(), MINUTE).unwrap();
        assert_eq!(searcher.statistics().expanded, 0);
        assert_eq!(searcher.statistics().generated, 1);
    }
}
