use solver::{SolverError, VarId};
use thiserror::Error;

use crate::model::ConstraintId;

/// Result type used by the constraint model
pub type Result<T> = std::result::Result<T, ModelError>;

/// Errors raised while building or solving a [`ConstraintModel`](crate::ConstraintModel)
#[derive(Debug, Error)]
pub enum ModelError {
    /// A slot or set with this name was already declared.
    #[error("already using name {0}")]
    NameCollision(String),

    /// A constraint refers to a group that was never declared.
    #[error("can't find group {0}")]
    GroupNotFound(String),

    /// Failures were added to a constraint that does not exist.
    #[error("can't find {0}")]
    ConstraintNotFound(ConstraintId),

    /// A variable number that was never registered.
    #[error("variable {0} is not registered")]
    VariableNotFound(VarId),

    /// An operation was called without something it cannot do without.
    #[error("missing required argument: {0}")]
    MissingRequiredArgument(&'static str),

    /// The cardinality window does not fit the group.
    ///
    /// # Arguments
    /// * `min_on` - Lowest number of variables that must be true.
    /// * `max_on` - Highest number of variables that may be true.
    /// * `len` - Number of variables in the group.
    #[error("cannot have between {min_on} and {max_on} of {len} variables switched on")]
    InvalidCardinality { min_on: usize, max_on: usize, len: usize },

    /// Running the solver failed.
    #[error(transparent)]
    Solver(#[from] SolverError),
}
