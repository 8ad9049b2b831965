mod astar;
mod open_list;
mod potential;
mod search_node;
mod search_result;
mod search_space;
mod search_statistics;
mod termination_condition;
mod verbosity;

pub use astar::AstarSearcher;
pub use open_list::OpenList;
pub use potential::PotentialSearcher;
pub use search_node::{NodeId, Priority, SearchNode, StateId, NO_NODE};
pub use search_result::{SearchError, Solution};
pub use search_space::SearchSpace;
pub use search_statistics::SearchStatistics;
pub use termination_condition::TerminationCondition;
pub use verbosity::Verbosity;
