use thiserror::Error;

/// The closed set of error kinds a caller can match on (see SPEC_FULL.md §7).
///
/// `InvariantViolation` deliberately has no variant here: those conditions are
/// asserted at the point of occurrence and abort the simulation, the same way
/// the teacher's simulator asserts per-vehicle capacity/LIFO invariants inline.
#[derive(Debug, Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("infeasible assignment: demand {demand} exceeds available capacity {capacity}")]
    InfeasibleAssignment { demand: i64, capacity: i64 },

    #[error("solver failure: {0}")]
    SolverFailure(String),

    #[error("optimizer deadline exceeded after {elapsed_ms}ms")]
    OptimizerTimeout { elapsed_ms: u128 },
}

pub type Result<T> = std::result::Result<T, Error>;
