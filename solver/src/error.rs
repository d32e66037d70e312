use std::time::Duration;
use thiserror::Error;

/// Result type used throughout the solver crate
pub type Result<T> = std::result::Result<T, SolverError>;

/// Everything that can go wrong while talking to a solver or
/// reading a formula.
#[derive(Debug, Error)]
pub enum SolverError {
    /// The solver process could not be started at all.
    #[error("could not start solver `{program}`: {source}")]
    Spawn {
        program: String,
        source: std::io::Error,
    },

    /// Writing the formula or reading the solver output failed.
    #[error("solver i/o failed: {0}")]
    Io(#[from] std::io::Error),

    /// The process ended with an exit code that is not accepted,
    /// or was killed by a signal (`code == None`).
    #[error("solver exited with {}", match .code { Some(code) => format!("code {}", code), None => "a signal".to_string() })]
    ExitStatus { code: Option<i32> },

    /// The output file does not follow the `SAT`/`UNSAT` format.
    #[error("malformed solver output: {0}")]
    MalformedOutput(String),

    /// The time limit elapsed before the solver finished.
    #[error("solver timed out after {0:?}")]
    Timeout(Duration),

    /// The solver answered, but neither with SAT nor with UNSAT.
    #[error("solver could not decide the formula")]
    Indeterminate,

    /// DIMACS text which could not be parsed.
    ///
    /// # Arguments
    /// * `line` - The (1-based) line of the offending token.
    /// * `reason` - What was wrong with it.
    #[error("malformed CNF in line {line}: {reason}")]
    MalformedCnf { line: usize, reason: String },
}
