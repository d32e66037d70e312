use tracing::debug;

use crate::error::SolverError;
use crate::sat_solution::valuation_to_literals;
use crate::{CNFVar, SATSolution, Solver, CNF};

/// Lists every model of a formula.
///
/// The solver is called over and over; after each model it is handed
/// back the same formula plus one clause forbidding exactly that model,
/// until it answers "unsatisfiable". Every round removes at least one
/// of finitely many assignments, so the iteration always ends.
///
/// Models are passed through `decode` before they are yielded. Solver
/// failures (including an undecided answer) and decode failures are
/// yielded as a single `Err`, after which the enumerator is exhausted.
/// The error type is chosen by `decode`; it only has to absorb
/// [`SolverError`].
pub struct SolutionEnumerator<S, F> {
    solver: S,
    formula: CNF,
    decode: F,
    found: usize,
    done: bool,
}

impl<S, F, T, E> SolutionEnumerator<S, F>
where
    S: Solver,
    F: FnMut(&[CNFVar]) -> std::result::Result<T, E>,
    E: From<SolverError>,
{
    pub fn new(solver: S, formula: CNF, decode: F) -> Self {
        SolutionEnumerator {
            solver,
            formula,
            decode,
            found: 0,
            done: false,
        }
    }

    /// The formula as it stands, blocking clauses included
    pub fn formula(&self) -> &CNF {
        &self.formula
    }

    /// How many models were found so far
    pub fn found(&self) -> usize {
        self.found
    }

    fn next_solution(&mut self) -> std::result::Result<Option<T>, E> {
        match self.solver.solve(&self.formula)? {
            SATSolution::Unsatisfiable => {
                debug!(found = self.found, "no more solutions");
                Ok(None)
            }
            SATSolution::Unknown => Err(SolverError::Indeterminate.into()),
            SATSolution::Satisfiable(valuation) => {
                // the model must cover every variable, otherwise the
                // blocking clause would rule out more than this model
                let mut literals = valuation_to_literals(&valuation);
                literals.truncate(self.formula.num_variables);
                for id in literals.len() + 1..=self.formula.num_variables {
                    literals.push(CNFVar::neg(id));
                }

                self.found += 1;
                debug!(index = self.found, "found solution");

                let decoded = (self.decode)(&literals)?;
                self.formula.push(literals.iter().map(CNFVar::negated).collect());
                Ok(Some(decoded))
            }
        }
    }
}

impl<S, F, T, E> Iterator for SolutionEnumerator<S, F>
where
    S: Solver,
    F: FnMut(&[CNFVar]) -> std::result::Result<T, E>,
    E: From<SolverError>,
{
    type Item = std::result::Result<T, E>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        match self.next_solution() {
            Ok(Some(solution)) => Some(Ok(solution)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(error) => {
                self.done = true;
                Some(Err(error))
            }
        }
    }
}

impl<S, F, T, E> std::iter::FusedIterator for SolutionEnumerator<S, F>
where
    S: Solver,
    F: FnMut(&[CNFVar]) -> std::result::Result<T, E>,
    E: From<SolverError>,
{}
