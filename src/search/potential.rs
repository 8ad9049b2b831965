//! Bounded-cost search: Potential Search and its pure-heuristic variant.

use crate::domains::{Cost, Domain};
use crate::search::{
    OpenList, Priority, SearchError, SearchSpace, SearchStatistics, Solution,
    TerminationCondition, NO_NODE,
};
use ordered_float::OrderedFloat;
use std::time::Duration;

/// Best-first search for any path of cost strictly below a bound C.
///
/// Potential Search orders the open list by the potential
/// `u(n) = h(n) / (C − g(n))`; with `pure_heuristic_search` the order is
/// plain `h(n)` instead. Children that cannot beat the bound
/// (`g + h >= C`) are pruned before the potential is computed, which also
/// keeps the denominator positive. Unlike A*, the goal test runs at
/// generation time: any goal that survives the pruning check is already
/// known to be under the bound, so waiting for its pop would only cost
/// expansions.
#[derive(Debug)]
pub struct PotentialSearcher<'a, D: Domain> {
    domain: &'a D,
    statistics: SearchStatistics,
    cost: Option<Cost>,
    total_time: Option<Duration>,
}

impl<'a, D: Domain> PotentialSearcher<'a, D> {
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

    fn priority(cost_bound: Cost, pure_heuristic_search: bool, g: Cost, h: Cost) -> Priority {
        if pure_heuristic_search {
            OrderedFloat(f64::from(h))
        } else {
            OrderedFloat(f64::from(h) / f64::from(cost_bound - g))
        }
    }

    pub fn solve(
        &mut self,
        start: &D::State,
        cost_bound: Cost,
        pure_heuristic_search: bool,
        time_limit: Duration,
    ) -> Result<Solution, SearchError> {
        self.reset();
        let mut termination = TerminationCondition::new(time_limit);

        // Nothing costs strictly less than zero; bail out before the root
        // potential would divide by zero.
        if cost_bound == 0 {
            return Err(SearchError::NoSolution {
                bound: Some(cost_bound),
                elapsed: termination.elapsed(),
            });
        }

        let mut space: SearchSpace<D::State> = SearchSpace::new();
        let mut open = OpenList::new();

        let root_h = self.domain.heuristic(start);
        let (root_state, _) = space.register(start.clone());
        let root = space.new_node(
            root_state,
            Self::priority(cost_bound, pure_heuristic_search, 0, root_h),
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
            if !node.is_valid() {
                continue;
            }
            let g = node.get_g();
            let state_id = node.get_state();
            self.statistics.increment_expanded();

            let state = space.get_state(state_id).clone();
            for (successor, op_cost) in self.domain.successors(&state) {
                let successor_g = g + op_cost;

                let (successor_state, existing) = space.register(successor);
                if let Some(best) = existing {
                    if space.get_node(best).get_g() <= successor_g {
                        continue;
                    }
                }

                let successor_h = self.domain.heuristic(space.get_state(successor_state));
                // The dominance check above only used g, so it stays sound
                // under the ratio priority; the bound check here is what
                // rules the child out entirely.
                if successor_g + successor_h >= cost_bound {
                    continue;
                }

                // Any goal reached here is under the bound by the check
                // above, and under-the-bound is all this search promises.
                if self.domain.is_goal(space.get_state(successor_state)) {
                    let total_time = termination.elapsed();
                    termination.finalise(&self.statistics);
                    self.cost = Some(successor_g);
                    self.total_time = Some(total_time);
                    return Ok(Solution {
                        cost: successor_g,
                        total_time,
                    });
                }

                let f = Self::priority(cost_bound, pure_heuristic_search, successor_g, successor_h);
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
            bound: Some(cost_bound),
            elapsed: termination.elapsed(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::{Pancakes, TilePuzzle, TilePuzzleState};
    use crate::search::AstarSearcher;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    const MINUTE: Duration = Duration::from_secs(60);

    fn tile_state(tiles: &[u8]) -> TilePuzzleState {
        TilePuzzleState::new(tiles.to_vec()).unwrap()
    }

    #[test]
    fn stays_under_the_bound_and_beats_astar_expansions() {
        let puzzle = TilePuzzle::new(3, 3).unwrap();
        let start = tile_state(&[1, 2, 3, 4, 5, 6, 0, 7, 8]);

        let mut astar = AstarSearcher::new(&puzzle);
        let astar_solution = astar.solve(&start, MINUTE).unwrap();
        assert_eq!(astar_solution.cost, 2);

        let mut potential = PotentialSearcher::new(&puzzle);
        let solution = potential.solve(&start, 4, false, MINUTE).unwrap();
        assert!(solution.cost < 4);
        assert_eq!(solution.cost, 2);
        assert!(potential.statistics().expanded <= astar.statistics().expanded);
    }

    #[test]
    fn reports_no_solution_when_the_bound_is_too_tight() {
        let puzzle = TilePuzzle::new(3, 3).unwrap();
        // Optimal cost is 2, so no path is strictly below a bound of 2.
        let start = tile_state(&[1, 2, 3, 4, 5, 6, 0, 7, 8]);
        let mut searcher = PotentialSearcher::new(&puzzle);
        let error = searcher.solve(&start, 2, false, MINUTE).unwrap_err();
        assert!(matches!(
            error,
            SearchError::NoSolution { bound: Some(2), .. }
        ));
    }

    #[test]
    fn zero_bound_fails_immediately() {
        let domain = Pancakes::new(5).unwrap();
        let mut searcher = PotentialSearcher::new(&domain);
        let error = searcher.solve(domain.goal(), 0, false, MINUTE).unwrap_err();
        assert!(matches!(
            error,
            SearchError::NoSolution { bound: Some(0), .. }
        ));
        assert_eq!(searcher.statistics().generated, 0);
    }

    #[test]
    fn goal_start_is_only_detected_through_the_cycle() {
        // The goal test runs at generation, never on the root, so starting
        // at the goal finds the flip-and-flip-back path when the bound
        // admits it and nothing otherwise.
        let domain = Pancakes::new(5).unwrap();

        let mut searcher = PotentialSearcher::new(&domain);
        let solution = searcher.solve(domain.goal(), 3, false, MINUTE).unwrap();
        assert_eq!(solution.cost, 2);

        let error = searcher.solve(domain.goal(), 1, false, MINUTE).unwrap_err();
        assert!(matches!(error, SearchError::NoSolution { bound: Some(1), .. }));
    }

    #[test]
    fn pure_heuristic_mode_respects_the_bound_too() {
        let domain = Pancakes::new(7).unwrap();
        let mut rng = SmallRng::seed_from_u64(61);
        for start in domain.generate_instances(&mut rng, 10, 3, 25) {
            if domain.is_goal(&start) {
                continue;
            }
            let mut astar = AstarSearcher::new(&domain);
            let optimal = astar.solve(&start, MINUTE).unwrap().cost;

            for pure in [true, false] {
                let bound = 2 * optimal + 1;
                let mut searcher = PotentialSearcher::new(&domain);
                let solution = searcher.solve(&start, bound, pure, MINUTE).unwrap();
                assert!(solution.cost < bound);
                assert!(solution.cost >= optimal);
            }
        }
    }

    #[test]
    fn degraded_heuristic_still_respects_the_bound() {
        let mut domain = Pancakes::new(7).unwrap();
        let mut rng = SmallRng::seed_from_u64(67);
        let starts = domain.generate_instances(&mut rng, 5, 5, 20);

        let mut optima = Vec::new();
        for start in &starts {
            let mut astar = AstarSearcher::new(&domain);
            optima.push(astar.solve(start, MINUTE).unwrap().cost);
        }

        domain.set_degradation(1.5).unwrap();
        for (start, optimal) in starts.iter().zip(optima) {
            if domain.is_goal(start) {
                continue;
            }
            let bound = 2 * optimal + 2;
            let mut searcher = PotentialSearcher::new(&domain);
            let solution = searcher.solve(start, bound, false, MINUTE).unwrap();
            assert!(solution.cost < bound);
        }
    }

    #[test]
    fn repeated_runs_are_deterministic() {
        let domain = Pancakes::new(8).unwrap();
        let mut rng = SmallRng::seed_from_u64(71);
        let start = domain
            .generate_instances(&mut rng, 1, 10, 30)
            .pop()
            .unwrap();

        let mut astar = AstarSearcher::new(&domain);
        let optimal = astar.solve(&start, MINUTE).unwrap().cost;
        let bound = optimal + 3;

        let mut first = PotentialSearcher::new(&domain);
        let first_solution = first.solve(&start, bound, false, MINUTE).unwrap();
        let mut second = PotentialSearcher::new(&domain);
        let second_solution = second.solve(&start, bound, false, MINUTE).unwrap();

        assert_eq!(first_solution.cost, second_solution.cost);
        assert_eq!(first.statistics(), second.statistics());
    }
}
