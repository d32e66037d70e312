use std::time::Duration;
use async_std::future::timeout;
use async_std::task::block_on;
use async_trait::async_trait;
use super::InterruptibleSolver;
use crate::error::{Result, SolverError};
use crate::{SATSolution, CNF, Solver};


/// Gives up on the wrapped solver once `max_duration` has passed.
/// The abandoned search is dropped, which kills external processes.
pub struct TimeLimitedSolver<S: InterruptibleSolver> {
    max_duration: Duration,
    solver: S,
}

impl<S: InterruptibleSolver> TimeLimitedSolver<S> {
    pub fn new(solver: S, max_duration: Duration) -> TimeLimitedSolver<S> {
        TimeLimitedSolver {
            solver,
            max_duration,
        }
    }

    pub fn max_duration(&self) -> Duration {
        self.max_duration
    }
}

impl<S: InterruptibleSolver> Solver for TimeLimitedSolver<S> {
    fn solve(&self, formula: &CNF) -> Result<SATSolution> {
        block_on(async {
            timeout(self.max_duration, self.solver.solve_interruptible(formula)).await
                .unwrap_or(Err(SolverError::Timeout(self.max_duration)))
        })
    }
}

#[async_trait]
impl <S: InterruptibleSolver+Send+Sync> InterruptibleSolver for TimeLimitedSolver<S> {
    async fn solve_interruptible(&self, formula: &CNF) -> Result<SATSolution> {
        timeout(self.max_duration, self.solver.solve_interruptible(formula)).await
            .unwrap_or(Err(SolverError::Timeout(self.max_duration)))
    }
}
