use crate::error::Result;
use crate::sat_solver::*;
use crate::{CNF, CNFClause, SATSolution, Valuation};

/// A simple in-process solver that walks through valuations in a
/// fixed order (all variables false first) and backtracks as soon
/// as a clause is falsified. Its answers are fully deterministic,
/// which makes it the solver of choice for tests.
pub enum Bruteforce {
    Bruteforce,
}

impl Solver for Bruteforce {
    fn solve(&self, formula: &CNF) -> Result<SATSolution> {
        let num_variables = formula.clauses.iter()
            .filter_map(CNFClause::max_id)
            .fold(formula.num_variables, usize::max);

        // initial valuation sets all to false
        let mut valuation = vec![false; num_variables];

        // clauses sorted by their last variable, so that a clause is
        // checked as soon as all of its variables are fixed
        let mut by_last_var: Vec<Vec<&CNFClause>> = vec![Vec::new(); num_variables + 1];
        for clause in &formula.clauses {
            by_last_var[clause.max_id().unwrap_or(0)].push(clause);
        }

        // an empty clause can never be satisfied
        if !by_last_var[0].is_empty() {
            return Ok(SATSolution::Unsatisfiable);
        }

        if guess(&by_last_var, 0, &mut valuation) {
            debug_assert!(check_valuation(formula, &valuation));
            Ok(SATSolution::Satisfiable(valuation))
        } else {
            Ok(SATSolution::Unsatisfiable)
        }
    }
}

fn guess(by_last_var: &[Vec<&CNFClause>], change: usize, valuation: &mut Valuation) -> bool {
    if change == valuation.len() {
        return true;
    }

    for value in &[false, true] {
        valuation[change] = *value;
        let consistent = by_last_var[change + 1].iter()
            .all(|clause| clause.is_satisfied_by(valuation));

        if consistent && guess(by_last_var, change + 1, valuation) {
            return true;
        }
    }

    // if failed set back to default
    valuation[change] = false;
    false
}
