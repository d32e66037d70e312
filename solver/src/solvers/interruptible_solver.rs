use crate::error::Result;
use crate::{CNF, SATSolution, Solver};
use async_trait::async_trait;
use async_std::task::block_on;
use auto_impl::auto_impl;

/// A solver whose work can be abandoned: dropping the returned future
/// stops the search (for external solvers it kills the process).
#[async_trait]
#[auto_impl(Box)]
pub trait InterruptibleSolver {
    async fn solve_interruptible(&self, formula: &CNF) -> Result<SATSolution>;
}

/// Runs an [`InterruptibleSolver`] to completion on the current thread
pub struct InterruptibleSolverWrapper<S: InterruptibleSolver> {
    solver: S,
}

impl<S: InterruptibleSolver> From<S> for InterruptibleSolverWrapper<S> {
    fn from(solver: S) -> Self {
        InterruptibleSolverWrapper{solver}
    }
}

impl<S: InterruptibleSolver> InterruptibleSolverWrapper<S> {
    pub fn inner(&self) -> &S {
        &self.solver
    }
}

impl<S: InterruptibleSolver> Solver for InterruptibleSolverWrapper<S> {
    fn solve(&self, formula: &CNF) -> Result<SATSolution> {
        block_on(self.solver.solve_interruptible(formula))
    }
}
