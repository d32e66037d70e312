/// The CNF representation of a formula
pub mod cnf;
/// The Solver trait which has to be implemented by each solver
pub mod sat_solver;
/// Module that specifies the output of a solver
mod sat_solution;
pub mod bruteforce;
/// Listing all models of a formula with blocking clauses
pub mod enumerator;
/// Errors of solver invocations and DIMACS parsing
pub mod error;
/// A module which offers some additional solver,
/// for one that runs in another process or can be interrupted or timed.
pub mod solvers;

pub use cnf::{CNFClause, CNFVar, VarId, CNF};
pub use sat_solver::Solver;
pub use bruteforce::Bruteforce;
pub use enumerator::SolutionEnumerator;
pub use error::{Result, SolverError};
pub use sat_solution::{valuation_to_literals, SATSolution, Valuation};
