/// Decoded solutions: names mapped to their values
pub mod assignment;
/// Errors raised while building or solving a model
pub mod error;
/// Hands out the boolean variables of a model
pub mod registry;
/// Cardinality constraints over a sequence of variables
pub mod group;
/// Combinations ruled out by user constraints
pub mod failure;
/// The constraint compiler tying everything together
pub mod model;

pub use assignment::{Assignment, Selection, Value};
pub use error::{ModelError, Result};
pub use registry::{Variable, VariableRegistry};
pub use group::{ConstraintGroup, Possibilities, Semantics};
pub use failure::FailureRecorder;
pub use model::{ConstraintId, ConstraintModel};

pub use solver;
