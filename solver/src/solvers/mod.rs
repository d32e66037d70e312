mod external_solver;
mod interruptible_solver;
mod time_limited_solver;

pub use external_solver::{ExternalSolver, ExternalSolverConfig};
pub use interruptible_solver::{InterruptibleSolver, InterruptibleSolverWrapper};
pub use time_limited_solver::TimeLimitedSolver;
