use auto_impl::auto_impl;
use rayon::prelude::*;

use crate::error::Result;
use crate::{CNF, SATSolution, Valuation};

/// A blocking SAT solver. Each call decides one formula from scratch.
#[auto_impl(&, Box)]
pub trait Solver {
    fn solve(&self, formula: &CNF) -> Result<SATSolution>;
}

/// Checks whether `val` satisfies every clause of `formula`
pub fn check_valuation(formula: &CNF, val: &Valuation) -> bool {
    formula.clauses.par_iter()
        .all(|clause| clause.is_satisfied_by(val))
}
