use std::convert::TryFrom;
use std::fmt;
use std::iter::FromIterator;
use itertools::Itertools;

use crate::error::{Result, SolverError};
use crate::sat_solution::Valuation;

/// Type used for referencing logical variables
pub type VarId = usize;

/// Representation of logical formulae in CNF form
/// (conjunction of clauses)
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CNF {
    /// Number of variables the formula ranges over. Variables are
    /// numbered `1..=num_variables`; some of them may not occur in
    /// any clause.
    pub num_variables: usize,
    /// Vector of inner clauses
    pub clauses: Vec<CNFClause>,
}

/// Representation of a clause (disjunction of variables)
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct CNFClause {
    /// Vector of inner variables
    pub vars: Vec<CNFVar>,
}

/// Logical variable
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd, Ord, Eq, Hash)]
pub struct CNFVar {
    /// Identifier of a variable
    pub id: VarId,
    /// Variable is negated iff `sign == false`
    pub sign: bool,
}

impl CNF {
    /// Creates an empty CNF formula
    pub fn empty() -> CNF {
        CNF { num_variables: 0, clauses: Vec::new() }
    }

    /// Creates an empty formula over `num_variables` variables
    pub fn with_variables(num_variables: usize) -> CNF {
        CNF { num_variables, clauses: Vec::new() }
    }

    /// Inserts a new clause into the formula, growing the
    /// variable range if needed
    pub fn push(&mut self, c: CNFClause) {
        if let Some(max) = c.max_id() {
            self.num_variables = self.num_variables.max(max);
        }
        self.clauses.push(c)
    }

    /// Concatenates two formulae
    pub fn extend(&mut self, c: CNF) {
        self.num_variables = self.num_variables.max(c.num_variables);
        self.clauses.extend(c.clauses)
    }

    /// Returns number of clauses in the formula
    pub fn len(&self) -> usize {
        self.clauses.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    /// Prints formula in DIMACS compatible form
    pub fn to_dimacs(&self) -> String {
        let mut out = format!("p cnf {} {}\n", self.num_variables, self.clauses.len());

        for clause in &self.clauses {
            out.push_str(&clause.to_dimacs());
            out.push('\n');
        }
        out
    }

    /// Parse DIMACS text into a CNF structure.
    ///
    /// Comment lines and blank lines are skipped, the problem line is
    /// optional and its counts are only used as a lower bound for the
    /// number of variables. Clauses end at `0` and may span lines.
    pub fn from_dimacs(input: &str) -> Result<CNF> {
        let mut formula = CNF::empty();
        let mut current = CNFClause::new();

        for (index, line) in input.lines().enumerate() {
            let line_no = index + 1;
            let line = line.trim();

            if line.is_empty() || line.starts_with('c') || line.starts_with('%') {
                continue;
            }

            if line.starts_with('p') {
                let fields = line.split_whitespace().collect_vec();
                match fields.as_slice() {
                    ["p", "cnf", vars, _clauses] => {
                        let vars = vars.parse::<usize>().map_err(|_| SolverError::MalformedCnf {
                            line: line_no,
                            reason: format!("bad variable count `{}`", vars),
                        })?;
                        formula.num_variables = formula.num_variables.max(vars);
                    }
                    _ => return Err(SolverError::MalformedCnf {
                        line: line_no,
                        reason: format!("bad problem line `{}`", line),
                    }),
                }
                continue;
            }

            for token in line.split_whitespace() {
                let literal = token.parse::<i64>().map_err(|_| SolverError::MalformedCnf {
                    line: line_no,
                    reason: format!("`{}` is not a literal", token),
                })?;

                if literal == 0 {
                    formula.push(std::mem::take(&mut current));
                } else {
                    current.push(CNFVar::from_i64(literal));
                }
            }
        }

        if !current.vars.is_empty() {
            return Err(SolverError::MalformedCnf {
                line: input.lines().count(),
                reason: "last clause is not terminated by 0".to_string(),
            });
        }

        Ok(formula)
    }

    /// Checks whether the valuation satisfies every clause
    pub fn is_satisfied_by(&self, valuation: &Valuation) -> bool {
        crate::sat_solver::check_valuation(self, valuation)
    }
}

impl FromIterator<CNFClause> for CNF {
    fn from_iter<I: IntoIterator<Item=CNFClause>>(iter: I) -> Self {
        let mut formula = CNF::empty();
        iter.into_iter().for_each(|clause| formula.push(clause));
        formula
    }
}

impl IntoIterator for CNF {
    type Item = CNFClause;
    type IntoIter = std::vec::IntoIter<Self::Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.clauses.into_iter()
    }
}

impl CNFClause {
    /// Creates an empty CNF clause
    pub fn new() -> CNFClause {
        CNFClause { vars: vec![] }
    }

    /// Creates a CNF clause containing a single variable
    pub fn single(var: CNFVar) -> CNFClause {
        CNFClause { vars: vec![var] }
    }

    /// Adds a single variable into the clause
    pub fn push(&mut self, v: CNFVar) {
        self.vars.push(v)
    }

    /// Concatenates two clauses
    pub fn extend(&mut self, c: CNFClause) {
        self.vars.extend(c.vars)
    }

    /// The clause with every literal flipped. Applied to a full
    /// assignment this gives the clause excluding exactly that
    /// assignment.
    pub fn negated(&self) -> CNFClause {
        self.vars.iter().map(CNFVar::negated).collect()
    }

    /// Highest variable identifier in the clause
    pub fn max_id(&self) -> Option<VarId> {
        self.vars.iter().map(CNFVar::id).max()
    }

    pub fn is_satisfied_by(&self, valuation: &Valuation) -> bool {
        self.vars.iter()
            .any(|var| var.id()
                .checked_sub(1)
                .and_then(|index| valuation.get(index))
                .map_or(false, |value| *value == var.sign()))
    }

    /// Space separated literals terminated by `0`
    pub fn to_dimacs(&self) -> String {
        self.vars.iter()
            .map(CNFVar::to_string)
            .chain(std::iter::once("0".to_string()))
            .join(" ")
    }
}

impl FromIterator<CNFVar> for CNFClause {
    fn from_iter<I: IntoIterator<Item=CNFVar>>(iter: I) -> Self {
        CNFClause { vars: iter.into_iter().collect() }
    }
}

impl IntoIterator for CNFClause {
    type Item = CNFVar;
    type IntoIter = std::vec::IntoIter<Self::Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.vars.into_iter()
    }
}

impl CNFVar {
    /// Creates variable with given identifier and positivity
    pub fn new(id: VarId, sign: bool) -> CNFVar {
        CNFVar { id, sign }
    }

    /// Creates a positive variable with given identifier
    pub fn pos(id: VarId) -> CNFVar {
        CNFVar { id, sign: true }
    }

    /// Creates a negative variable with given identifier
    pub fn neg(id: VarId) -> CNFVar {
        CNFVar { id, sign: false }
    }

    /// Reads a signed DIMACS literal. Must not be zero.
    pub fn from_i64(literal: i64) -> CNFVar {
        CNFVar { id: literal.unsigned_abs() as VarId, sign: literal > 0 }
    }

    /// Gets the identifier of a variable
    pub fn id(&self) -> VarId {
        self.id
    }

    /// Checks if the variable is positive
    pub fn sign(&self) -> bool {
        self.sign
    }

    pub fn negated(&self) -> CNFVar {
        CNFVar { id: self.id, sign: !self.sign }
    }

    /// Converts to signed integer. The absolute value indicates
    /// the identifier and sign states for positivity. `None` if the
    /// identifier does not fit.
    pub fn to_i32(&self) -> Option<i32> {
        let id = i32::try_from(self.id).ok()?;
        Some(if self.sign { id } else { -id })
    }
}


impl fmt::Display for CNF {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for c in &self.clauses {
            writeln!(f, "{}", c)?;
        }
        Ok(())
    }
}

impl fmt::Display for CNFClause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_dimacs())
    }
}

impl fmt::Display for CNFVar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.sign {
            write!(f, "{}", self.id)
        } else {
            write!(f, "-{}", self.id)
        }
    }
}
