//! The pure-heuristic vs potential-search comparison experiment and the
//! record files it exchanges with the analysis side. Plotting and
//! statistical breakdowns happen elsewhere; this module's contract is that
//! the files round-trip bit-identically.

mod comparison;
mod instance_files;
mod state_cost;

pub use comparison::{
    cost_bounds, generate_state_costs, run_experiment, ExperimentConfig, BOUND_MULTIPLIERS,
    DEGRADATIONS, NO_SOLUTION_COST, TIMEOUT_COST,
};
pub use instance_files::{
    append_instance, append_result, read_instances, read_results, setup_experiment_files,
    ExperimentError, InstanceRecord, ResultRecord, INSTANCE_IDS_HEADER, RESULTS_HEADER,
};
pub use state_cost::{read_state_cost_file, write_state_cost_file, StateCostRecord};
