//! The prefix-reversal (pancake) puzzle with the Gap heuristic.
//!
//! Stacks hold the values `1..=N`; the goal stack is descending, so the
//! maximum sits on top (index 0) and the undegraded heuristic of the goal
//! is zero. The degradation parameter relaxes the heuristic by ignoring
//! gaps between small pancakes, in steps of 0.5.

use crate::domains::domain::is_permutation;
use crate::domains::{Cost, Domain, InvalidInput};
use itertools::Itertools;
use rand::Rng;
use std::fmt;
use std::str::FromStr;

/// State of an N-tall pancake stack. Index 0 is the fixed end of the
/// stack; operators reverse a suffix.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PancakesState {
    stack: Box<[u8]>,
}

impl PancakesState {
    /// Build a state from a stack, validating that it is a permutation of
    /// `1..=N`.
    pub fn new(stack: Vec<u8>) -> Result<Self, InvalidInput> {
        if stack.len() < 2 || stack.len() > 255 || !is_permutation(&stack, 1) {
            return Err(InvalidInput::BadStack(stack));
        }
        Ok(Self {
            stack: stack.into_boxed_slice(),
        })
    }

    fn from_stack(stack: Vec<u8>) -> Self {
        Self {
            stack: stack.into_boxed_slice(),
        }
    }

    pub fn stack(&self) -> &[u8] {
        &self.stack
    }
}

impl fmt::Display for PancakesState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.stack.iter().join(" "))
    }
}

impl FromStr for PancakesState {
    type Err = InvalidInput;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let stack = s
            .split_whitespace()
            .map(|token| token.parse::<u8>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| InvalidInput::UnparsableState {
                value: s.to_owned(),
                reason: e.to_string(),
            })?;
        Self::new(stack)
    }
}

/// The pancake domain: N−1 prefix-reversal operators per state, all of
/// cost 1, and the Gap heuristic with optional degradation.
#[derive(Debug)]
pub struct Pancakes {
    size: usize,
    goal: PancakesState,
    /// Gap-count threshold derived from the degradation parameter: for an
    /// integer degradation d this is d and a gap counts when the smaller
    /// adjacent value exceeds it; for a half-integer d it is ⌈d⌉ and a gap
    /// whose smaller adjacent value equals the threshold counts as well.
    ignore_up_to: u8,
    half_gap: bool,
}

impl Pancakes {
    pub fn new(size: usize) -> Result<Self, InvalidInput> {
        if size < 2 || size > 255 {
            return Err(InvalidInput::BadStackSize(size));
        }
        let goal = PancakesState::from_stack((1..=size as u8).rev().collect());
        Ok(Self {
            size,
            goal,
            ignore_up_to: 0,
            half_gap: false,
        })
    }

    /// Size the domain after an existing stack. The goal is the descending
    /// sort of its values, which for a valid stack is `(N, …, 1)`.
    pub fn from_initial_state(state: &PancakesState) -> Result<Self, InvalidInput> {
        if !is_permutation(state.stack(), 1) {
            return Err(InvalidInput::BadStack(state.stack().to_vec()));
        }
        Self::new(state.stack().len())
    }

    /// Set the heuristic degradation. Accepts non-negative multiples of
    /// 0.5 only; zero restores the exact Gap heuristic. Must be called
    /// between solves, never during one.
    pub fn set_degradation(&mut self, degradation: f64) -> Result<(), InvalidInput> {
        if !degradation.is_finite()
            || degradation < 0.0
            || (degradation * 2.0).fract() != 0.0
            || degradation > 255.0
        {
            return Err(InvalidInput::BadDegradation(degradation));
        }
        self.half_gap = degradation.fract() != 0.0;
        self.ignore_up_to = degradation.ceil() as u8;
        Ok(())
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn goal(&self) -> &PancakesState {
        &self.goal
    }

    fn gap_counts(&self, smaller: u8) -> bool {
        if self.half_gap {
            smaller >= self.ignore_up_to
        } else {
            smaller > self.ignore_up_to
        }
    }
}

impl Domain for Pancakes {
    type State = PancakesState;

    /// Count adjacent pairs differing by more than 1, restricted to pairs
    /// the degradation still admits, plus 1 if the top pancake is not the
    /// largest. With zero degradation this is the admissible Gap
    /// heuristic.
    fn heuristic(&self, state: &PancakesState) -> Cost {
        let gaps = state
            .stack
            .iter()
            .copied()
            .tuple_windows()
            .filter(|&(a, b)| a.abs_diff(b) > 1 && self.gap_counts(a.min(b)))
            .count();
        let top_is_max = state.stack[0] == self.size as u8;
        gaps as Cost + Cost::from(!top_is_max)
    }

    fn is_goal(&self, state: &PancakesState) -> bool {
        *state == self.goal
    }

    fn successors(&self, state: &PancakesState) -> Vec<(PancakesState, Cost)> {
        (0..self.size - 1)
            .map(|i| {
                let mut stack = state.stack.to_vec();
                stack[i..].reverse();
                (PancakesState::from_stack(stack), 1)
            })
            .collect()
    }

    fn generate_instances<R: Rng>(
        &self,
        rng: &mut R,
        num_instances: usize,
        min_ops: usize,
        max_ops: usize,
    ) -> Vec<PancakesState> {
        (0..num_instances)
            .map(|_| {
                let num_ops = rng.random_range(min_ops..=max_ops);
                let mut stack = self.goal.stack.to_vec();
                for _ in 0..num_ops {
                    let i = rng.random_range(0..self.size - 1);
                    stack[i..].reverse();
                }
                PancakesState::from_stack(stack)
            })
            .collect()
    }
}
