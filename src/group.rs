use std::cell::OnceCell;
use std::fmt::Write as FmtWrite;

use indexmap::IndexMap;
use itertools::Itertools;
use solver::{CNFClause, CNFVar, Solver, SolutionEnumerator, VarId, CNF};
use tracing::debug;

use crate::assignment::{Assignment, Value};
use crate::error::{ModelError, Result};
use crate::registry::{Variable, VariableRegistry};

/// Every locally valid assignment of a group, together with the full
/// literal list (one literal per group variable) that produces it
pub type Possibilities<V> = IndexMap<Assignment<V>, CNFClause>;

/// How the variables switched on in a group are read back
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Semantics {
    /// A name holds a single value; a later value replaces an earlier one
    Slot,
    /// A name holds the list of all its values switched on, in
    /// declaration order
    Set,
}

/// Between `min_on` and `max_on` of the group's variables are true.
///
/// The cardinality is encoded without auxiliary variables:
///
/// * at least `min_on`: every choice of `n - min_on + 1` variables
///   contains a true one,
/// * at most `max_on`: every choice of `max_on + 1` variables
///   contains a false one.
///
/// This needs `C(n, n - min_on + 1) + C(n, max_on + 1)` clauses, so it
/// is only meant for groups of a few dozen variables.
#[derive(Clone, Debug)]
pub struct ConstraintGroup<V> {
    variables: Vec<Variable<V>>,
    min_on: usize,
    max_on: usize,
    semantics: Semantics,
    possibilities: OnceCell<Possibilities<V>>,
}

impl<V: Value> ConstraintGroup<V> {
    /// A group over the given variables, in the given order
    pub fn new(registry: &VariableRegistry<V>, ids: &[VarId], min_on: usize, max_on: usize) -> Result<Self> {
        let variables = ids.iter()
            .map(|id| registry.lookup(*id).map(Clone::clone))
            .collect::<Result<Vec<_>>>()?;

        Self::from_variables(variables, min_on, max_on)
    }

    /// A group over every registered variable accepted by `predicate`,
    /// in registration order
    pub fn select(
        registry: &VariableRegistry<V>,
        predicate: impl Fn(&str, &V) -> bool,
        min_on: usize,
        max_on: usize,
    ) -> Result<Self> {
        let variables = registry.iter()
            .filter(|variable| predicate(variable.name(), variable.value()))
            .cloned()
            .collect();

        Self::from_variables(variables, min_on, max_on)
    }

    /// `max_on` may exceed the number of variables, which simply
    /// leaves the group without an upper bound.
    fn from_variables(variables: Vec<Variable<V>>, min_on: usize, max_on: usize) -> Result<Self> {
        Self::check_cardinality(min_on, max_on, variables.len())?;

        let semantics = if max_on > 1 { Semantics::Set } else { Semantics::Slot };

        Ok(ConstraintGroup {
            variables,
            min_on,
            max_on,
            semantics,
            possibilities: OnceCell::new(),
        })
    }

    /// Fails unless `min_on <= max_on` and `min_on <= len`
    pub fn check_cardinality(min_on: usize, max_on: usize, len: usize) -> Result<()> {
        if min_on > max_on || min_on > len {
            return Err(ModelError::InvalidCardinality { min_on, max_on, len });
        }
        Ok(())
    }

    /// Overrides the semantics derived from `max_on`
    pub fn with_semantics(mut self, semantics: Semantics) -> Self {
        self.semantics = semantics;
        self.possibilities = OnceCell::new();
        self
    }

    pub fn variables(&self) -> &[Variable<V>] {
        &self.variables
    }

    pub fn ids(&self) -> impl Iterator<Item = VarId> + '_ {
        self.variables.iter().map(Variable::id)
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    pub fn min_on(&self) -> usize {
        self.min_on
    }

    pub fn max_on(&self) -> usize {
        self.max_on
    }

    pub fn semantics(&self) -> Semantics {
        self.semantics
    }

    /// The cardinality clauses over the global variable numbers
    pub fn clauses(&self) -> Vec<CNFClause> {
        self.cardinality_clauses(|index| self.variables[index].id())
    }

    /// Builds the clauses over variable positions, numbering them with `number`
    fn cardinality_clauses(&self, number: impl Fn(usize) -> VarId) -> Vec<CNFClause> {
        let n = self.variables.len();
        let mut clauses = Vec::new();

        if self.min_on > 0 {
            clauses.extend((0..n)
                .combinations(n - (self.min_on - 1))
                .map(|combo| combo.into_iter().map(|index| CNFVar::pos(number(index))).collect::<CNFClause>()));
        }

        if self.max_on < n {
            clauses.extend((0..n)
                .combinations(self.max_on + 1)
                .map(|combo| combo.into_iter().map(|index| CNFVar::neg(number(index))).collect::<CNFClause>()));
        }

        clauses
    }

    /// DIMACS text of the group: its variables as comments, then its clauses
    pub fn to_dimacs(&self) -> String {
        let mut out = String::from("c Switches:\n");

        for variable in &self.variables {
            // writing into a String cannot fail
            let _ = writeln!(out, "c   {}: {} = {:?}", variable.id(), variable.name(), variable.value());
        }

        for clause in self.clauses() {
            out.push_str(&clause.to_dimacs());
            out.push('\n');
        }

        out.push('\n');
        out
    }

    /// Reads the true literals of a (global) solution into an assignment
    pub fn decode(&self, literals: &[CNFVar]) -> Result<Assignment<V>> {
        let on = literals.iter()
            .filter(|literal| literal.sign())
            .map(|literal| self.variables.iter()
                .find(|variable| variable.id() == literal.id())
                .ok_or(ModelError::VariableNotFound(literal.id())))
            .collect::<Result<Vec<_>>>()?;

        Ok(self.assignment_from(on))
    }

    fn assignment_from<'a>(&self, on: impl IntoIterator<Item = &'a Variable<V>>) -> Assignment<V>
    where
        V: 'a,
    {
        let mut assignment = Assignment::new();

        for variable in on {
            match self.semantics {
                Semantics::Slot => assignment.set_one(variable.name(), variable.value().clone()),
                Semantics::Set => assignment.push_many(variable.name(), variable.value().clone()),
            }
        }

        assignment
    }

    /// Every assignment of this group's variables that satisfies the
    /// group on its own. Computed on first use and kept afterwards.
    pub fn possibilities<S: Solver>(&self, solver: &S) -> Result<&Possibilities<V>> {
        if let Some(possibilities) = self.possibilities.get() {
            return Ok(possibilities);
        }

        let computed = if self.clauses().is_empty() {
            self.enumerate_directly()
        } else {
            self.enumerate_with(solver)?
        };

        debug!(variables = self.len(), possibilities = computed.len(), "computed group possibilities");
        Ok(self.possibilities.get_or_init(|| computed))
    }

    /// Without clauses every combination is valid, so there is no need
    /// to ask a solver.
    fn enumerate_directly(&self) -> Possibilities<V> {
        let mut possibilities = IndexMap::new();

        if self.variables.is_empty() {
            possibilities.insert(Assignment::new(), CNFClause::new());
            return possibilities;
        }

        for signs in self.variables.iter().map(|_| vec![true, false]).multi_cartesian_product() {
            let clause = self.variables.iter()
                .zip(&signs)
                .map(|(variable, sign)| CNFVar::new(variable.id(), *sign))
                .collect();
            let assignment = self.assignment_from(self.variables.iter()
                .zip(&signs)
                .filter(|(_, sign)| **sign)
                .map(|(variable, _)| variable));

            possibilities.insert(assignment, clause);
        }

        possibilities
    }

    /// Solves the group's clauses on their own. The variables are
    /// renumbered to `1..=n` first, so the solver sees a formula over
    /// exactly the group's variables.
    fn enumerate_with<S: Solver>(&self, solver: &S) -> Result<Possibilities<V>> {
        let mut formula = CNF::with_variables(self.variables.len());
        self.cardinality_clauses(|index| index + 1)
            .into_iter()
            .for_each(|clause| formula.push(clause));

        let decode = |literals: &[CNFVar]| -> solver::Result<(Assignment<V>, CNFClause)> {
            let clause = literals.iter()
                .map(|literal| CNFVar::new(self.variables[literal.id() - 1].id(), literal.sign()))
                .collect();
            let assignment = self.assignment_from(literals.iter()
                .filter(|literal| literal.sign())
                .map(|literal| &self.variables[literal.id() - 1]));

            Ok((assignment, clause))
        };

        let mut possibilities = IndexMap::new();
        for found in SolutionEnumerator::new(solver, formula, decode) {
            let (assignment, clause) = found?;
            possibilities.insert(assignment, clause);
        }

        Ok(possibilities)
    }
}
