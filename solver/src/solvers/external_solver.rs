use async_std::process::{Command, Stdio};
use async_trait::async_trait;
use rand::Rng;
use std::path::PathBuf;
use tempfile::TempDir;
use tracing::{debug, trace};

use crate::error::{Result, SolverError};
use crate::solvers::InterruptibleSolver;
use crate::{SATSolution, CNF};

/// Configuration for an [`ExternalSolver`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalSolverConfig {
    /// Solver executable, looked up in `PATH` when relative
    pub program: PathBuf,
    /// Arguments passed before the seed and the file arguments
    pub args: Vec<String>,
    /// Pass `-rnd-init -rnd-seed=<n>` with a fresh seed on every call,
    /// so repeated calls on similar formulae do not always come up
    /// with the same first model
    pub randomize: bool,
    /// Exit codes that mean "the solver finished"
    pub accepted_exit_codes: Vec<i32>,
}

impl Default for ExternalSolverConfig {
    fn default() -> Self {
        Self {
            program: PathBuf::from("minisat"),
            args: Vec::new(),
            randomize: true,
            // minisat reports SAT with 10 and UNSAT with 20
            accepted_exit_codes: vec![0, 10, 20],
        }
    }
}

/// A solver living in another process. It is called as
/// `<program> <args..> [-rnd-init -rnd-seed=<n>] <input> <output>` and
/// has to write its verdict into the output file.
pub struct ExternalSolver {
    config: ExternalSolverConfig,
}

impl Default for ExternalSolver {
    fn default() -> Self {
        Self::with_config(ExternalSolverConfig::default())
    }
}

impl ExternalSolver {
    pub fn new(program: PathBuf) -> ExternalSolver {
        Self::with_config(ExternalSolverConfig {
            program,
            ..ExternalSolverConfig::default()
        })
    }

    pub fn with_config(config: ExternalSolverConfig) -> ExternalSolver {
        ExternalSolver { config }
    }

    pub fn config(&self) -> &ExternalSolverConfig {
        &self.config
    }
}

#[async_trait]
impl InterruptibleSolver for ExternalSolver {
    async fn solve_interruptible(&self, formula: &CNF) -> Result<SATSolution> {
        let workdir = TempDir::new()?;
        let input = workdir.path().join("formula.cnf");
        let output = workdir.path().join("solution.txt");

        async_std::fs::write(&input, formula.to_dimacs()).await?;

        let mut program = Command::new(&self.config.program);
        program.args(&self.config.args);

        if self.config.randomize {
            // minisat wants a strictly positive seed
            let seed: u32 = rand::thread_rng().gen_range(1, u32::MAX);
            program.arg("-rnd-init").arg(format!("-rnd-seed={}", seed));
            debug!(seed, "randomized solver seed");
        }

        program
            .arg(&input)
            .arg(&output)
            .kill_on_drop(true)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        debug!(
            program = %self.config.program.display(),
            variables = formula.num_variables,
            clauses = formula.len(),
            "invoking external solver"
        );

        let finished = program.output().await.map_err(|source| SolverError::Spawn {
            program: self.config.program.display().to_string(),
            source,
        })?;

        trace!(stdout = %String::from_utf8_lossy(&finished.stdout), "solver stdout");
        trace!(stderr = %String::from_utf8_lossy(&finished.stderr), "solver stderr");

        let code = finished.status.code();
        if !code.map_or(false, |code| self.config.accepted_exit_codes.contains(&code)) {
            return Err(SolverError::ExitStatus { code });
        }

        let verdict = async_std::fs::read_to_string(&output).await?;
        trace!(%verdict, "solver output file");

        SATSolution::from_solver_output(&verdict, formula.num_variables)
    }
}
