use std::fmt::Write as FmtWrite;
use tracing::warn;

use crate::cnf::{CNFClause, CNFVar};
use crate::error::{Result, SolverError};

/// Truth value of every variable; index `i` belongs to variable `i + 1`
pub type Valuation = Vec<bool>;

const MAX_LITERALS_PER_LINE: usize = 8;

#[derive(Clone, PartialEq, Eq)]
pub enum SATSolution {
    Satisfiable(Valuation),
    Unsatisfiable,
    Unknown,
}

impl std::iter::FromIterator<bool> for SATSolution {
    fn from_iter<T: IntoIterator<Item = bool>>(iter: T) -> Self {
        SATSolution::Satisfiable(iter.into_iter().collect())
    }
}

impl SATSolution {
    pub fn is_sat(&self) -> bool {
        matches!(self, SATSolution::Satisfiable(_))
    }

    pub fn is_unsat(&self) -> bool {
        matches!(self, SATSolution::Unsatisfiable)
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, SATSolution::Unknown)
    }

    /// Reads the minisat style result file: a status line starting with
    /// `SAT` or `UNSAT` (so `SATISFIABLE` works as well), for `SAT`
    /// followed by space separated literals terminated by `0`.
    /// Variables the solver did not mention are false.
    pub fn from_solver_output(output: &str, num_variables: usize) -> Result<SATSolution> {
        let mut lines = output.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty());

        let status = lines.next()
            .ok_or_else(|| SolverError::MalformedOutput("empty output".to_string()))?;

        // UNSAT first, SAT is a prefix of it
        if status.starts_with("UNSAT") {
            return Ok(SATSolution::Unsatisfiable);
        }
        if status.starts_with("INDET") || status.starts_with("UNKNOWN") {
            return Ok(SATSolution::Unknown);
        }
        if !status.starts_with("SAT") {
            return Err(SolverError::MalformedOutput(format!("unexpected status `{}`", status)));
        }

        let mut valuation = vec![false; num_variables];
        let mut terminated = false;

        for token in lines.flat_map(str::split_whitespace) {
            let literal = token.parse::<i64>()
                .map_err(|_| SolverError::MalformedOutput(format!("`{}` is not a literal", token)))?;

            if literal == 0 {
                terminated = true;
                break;
            }

            let var = CNFVar::from_i64(literal);
            match valuation.get_mut(var.id() - 1) {
                Some(value) => *value = var.sign(),
                None => warn!(literal, num_variables, "solver reported a literal outside the formula"),
            }
        }

        if !terminated {
            return Err(SolverError::MalformedOutput("assignment is not terminated by 0".to_string()));
        }

        Ok(SATSolution::Satisfiable(valuation))
    }

    /// The satisfying assignment as one literal per variable
    pub fn literals(&self) -> Option<Vec<CNFVar>> {
        match self {
            SATSolution::Satisfiable(valuation) => Some(valuation_to_literals(valuation)),
            _ => None,
        }
    }

    /// The clause which rules out exactly this assignment
    pub fn blocking_clause(&self) -> Option<CNFClause> {
        self.literals()
            .map(|literals| literals.into_iter().map(|var| var.negated()).collect())
    }

    pub fn to_dimacs(&self) -> String {
        format!("s {}\n",
            match self {
                SATSolution::Unsatisfiable => "UNSATISFIABLE".to_string(),
                SATSolution::Unknown => "UNKNOWN".to_string(),
                SATSolution::Satisfiable(variables) => {
                    format!("SATISFIABLE\n{}", {
                        let mut out = String::new();
                        let mut iter = variables.iter().enumerate().peekable();

                        while iter.peek().is_some() {
                            out.push('v');
                            out.push(' ');
                            for (id, sign) in iter.by_ref().take(MAX_LITERALS_PER_LINE) {
                                // writing into a String cannot fail
                                let _ = write!(&mut out, "{}{}",
                                    if *sign { " " }
                                    else { "-" },
                                    id+1);
                                out.push(' ');
                            }
                            out.push('0');
                            out.push('\n');
                        }
                        out
                    })
                }
            })
    }
}

/// Turns a valuation into literals `±1 .. ±n`
pub fn valuation_to_literals(valuation: &Valuation) -> Vec<CNFVar> {
    valuation.iter()
        .enumerate()
        .map(|(index, sign)| CNFVar::new(index + 1, *sign))
        .collect()
}

impl std::fmt::Debug for SATSolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{}", self.to_dimacs())
    }
}

impl std::fmt::Display for SATSolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}",
            match self {
                SATSolution::Unsatisfiable => "Unsatisfiable".to_string(),
                SATSolution::Unknown => "Unknown".to_string(),
                SATSolution::Satisfiable(variables) => {
                    format!("Satisfiable:\n{}", {
                        let mut out = String::new();
                        let mut iter = variables.iter().enumerate().peekable();

                        while iter.peek().is_some() {
                            for (id, sign) in iter.by_ref().take(MAX_LITERALS_PER_LINE) {
                                write!(&mut out, "{}{}",
                                    if *sign { " " }
                                    else { "-" },
                                    id+1)?;
                                out.push(' ');
                            }
                            out.push('\n');
                        }
                        out
                    })
                }
            })
    }
}
