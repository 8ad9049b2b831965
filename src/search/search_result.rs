use crate::domains::Cost;
use std::time::Duration;
use thiserror::Error;

/// A successful solve: the cost of the path found and the wall time the
/// search took. The searcher's counters stay readable alongside.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Solution {
    pub cost: Cost,
    pub total_time: Duration,
}

/// The two ways a search loop can fail. Construction-time problems are
/// [`crate::domains::InvalidInput`] instead; the loop itself only ever
/// runs out of time or out of nodes.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SearchError {
    /// The wall-clock budget was exceeded.
    #[error("timed out after {} seconds", elapsed.as_secs_f64())]
    Timeout { elapsed: Duration },
    /// The open list emptied before any goal under the bound was found.
    /// A* exhausts without a bound; Potential Search reports the bound it
    /// was given.
    #[error("no solution within bound {}; elapsed {} seconds", format_bound(bound), elapsed.as_secs_f64())]
    NoSolution {
        bound: Option<Cost>,
        elapsed: Duration,
    },
}

fn format_bound(bound: &Option<Cost>) -> String {
    match bound {
        Some(bound) => bound.to_string(),
        None => "infinity".to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn errors_render_their_context() {
        let timeout = SearchError::Timeout {
            elapsed: Duration::from_secs(2),
        };
        assert_eq!(timeout.to_string(), "timed out after 2 seconds");

        let no_solution = SearchError::NoSolution {
            bound: Some(12),
            elapsed: Duration::from_millis(1500),
        };
        assert_eq!(
            no_solution.to_string(),
            "no solution within bound 12; elapsed 1.5 seconds"
        );

        let exhausted = SearchError::NoSolution {
            bound: None,
            elapsed: Duration::ZERO,
        };
        assert!(exhausted.to_string().contains("infinity"));
    }
}
