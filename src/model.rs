use std::fmt::{self, Write as FmtWrite};

use indexmap::IndexMap;
use itertools::Itertools;
use solver::{CNFClause, CNFVar, Solver, SolutionEnumerator, VarId, CNF};
use tracing::debug;

use crate::assignment::{Assignment, Value};
use crate::error::{ModelError, Result};
use crate::failure::FailureRecorder;
use crate::group::{ConstraintGroup, Semantics};
use crate::registry::VariableRegistry;

/// Identifies the failures recorded by one `add_constraint` call
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConstraintId(usize);

impl ConstraintId {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl fmt::Display for ConstraintId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "constraint #{}", self.0)
    }
}

/// Groups that do not decide how a solution is read back
#[derive(Clone, Debug)]
enum Auxiliary<V> {
    Exclusion(ConstraintGroup<V>),
    Failures { id: ConstraintId, recorder: FailureRecorder },
}

impl<V: Value> Auxiliary<V> {
    fn clauses(&self) -> Vec<CNFClause> {
        match self {
            Auxiliary::Exclusion(group) => group.clauses(),
            Auxiliary::Failures { recorder, .. } => recorder.clauses(),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Auxiliary::Exclusion(_) => "ConstraintGroup",
            Auxiliary::Failures { .. } => "FailureRecorder",
        }
    }
}

/// Compiles named slots and sets, and constraints over them, into CNF.
///
/// A model is built first (declarations and constraints) and solved
/// afterwards. `solutions` borrows the model, so it cannot be changed
/// while an enumeration is running.
///
/// ```ignore
/// let mut model = ConstraintModel::new_session(Bruteforce::Bruteforce);
/// model.declare_set("A", vec![3, 4, 5], true, 2)?;
/// model.declare_slot("B", vec![1, 2], false)?;
/// model.add_constraint(&["A", "B"], |s| s.one("B") == Some(&1) || s.many("A").is_empty())?;
///
/// for solution in model.solutions() {
///     println!("{:?}", solution?);
/// }
/// ```
pub struct ConstraintModel<V, S> {
    registry: VariableRegistry<V>,
    solver: S,
    slots: IndexMap<String, ConstraintGroup<V>>,
    sets: IndexMap<String, ConstraintGroup<V>>,
    auxiliary: IndexMap<String, Auxiliary<V>>,
    constraints: usize,
}

impl<V: Value, S: Solver> ConstraintModel<V, S> {
    /// Starts a session with an empty registry. `solver` is used for
    /// computing group possibilities while constraints are compiled,
    /// and for enumerating solutions.
    pub fn new_session(solver: S) -> Self {
        ConstraintModel {
            registry: VariableRegistry::new_session(),
            solver,
            slots: IndexMap::new(),
            sets: IndexMap::new(),
            auxiliary: IndexMap::new(),
            constraints: 0,
        }
    }

    pub fn registry(&self) -> &VariableRegistry<V> {
        &self.registry
    }

    pub fn solver(&self) -> &S {
        &self.solver
    }

    /// A name holding exactly one of `domain`, or nothing if `allow_empty`
    pub fn declare_slot(&mut self, name: &str, domain: impl IntoIterator<Item = V>, allow_empty: bool) -> Result<()> {
        let min_on = if allow_empty { 0 } else { 1 };
        let group = self.declare_group(name, domain, min_on, 1, Semantics::Slot)?;
        self.slots.insert(name.to_string(), group);
        Ok(())
    }

    /// A name holding up to `max_values` of `domain`, at least one
    /// unless `allow_empty`
    pub fn declare_set(
        &mut self,
        name: &str,
        domain: impl IntoIterator<Item = V>,
        allow_empty: bool,
        max_values: usize,
    ) -> Result<()> {
        let min_on = if allow_empty { 0 } else { 1 };
        let group = self.declare_group(name, domain, min_on, max_values, Semantics::Set)?;
        self.sets.insert(name.to_string(), group);
        Ok(())
    }

    fn declare_group(
        &mut self,
        name: &str,
        domain: impl IntoIterator<Item = V>,
        min_on: usize,
        max_on: usize,
        semantics: Semantics,
    ) -> Result<ConstraintGroup<V>> {
        if self.slots.contains_key(name) || self.sets.contains_key(name) {
            return Err(ModelError::NameCollision(name.to_string()));
        }

        let domain: Vec<V> = domain.into_iter().collect();
        ConstraintGroup::<V>::check_cardinality(min_on, max_on, domain.len())?;

        let ids: Vec<VarId> = domain.into_iter()
            .map(|value| self.registry.register(name, value))
            .collect();

        debug!(name, ?semantics, variables = ids.len(), min_on, max_on, "declared group");
        Ok(ConstraintGroup::new(&self.registry, &ids, min_on, max_on)?.with_semantics(semantics))
    }

    /// Declares a slot for every name (names already declared are kept
    /// as they are) and forbids any two of them from holding the same value.
    pub fn declare_mutually_exclusive_slots(&mut self, names: &[&str], domain: &[V], allow_empty: bool) -> Result<()> {
        let min_on = if allow_empty { 0 } else { 1 };
        self.check_exclusions(names, domain, min_on, 1, 0)?;

        for name in names {
            match self.declare_slot(name, domain.iter().cloned(), allow_empty) {
                Ok(()) | Err(ModelError::NameCollision(_)) => (),
                Err(error) => return Err(error),
            }
        }

        self.declare_exclusions("Slots", names, domain, 0, Semantics::Slot)
    }

    /// Declares a set for every name (names already declared are kept
    /// as they are) and lets every value go into at most one of them.
    /// With `require_complete` every value has to go somewhere.
    pub fn declare_mutually_exclusive_sets(
        &mut self,
        names: &[&str],
        domain: &[V],
        allow_empty: bool,
        require_complete: bool,
        max_values: usize,
    ) -> Result<()> {
        let min_on = if allow_empty { 0 } else { 1 };
        let exclusion_min_on = if require_complete { 1 } else { 0 };
        self.check_exclusions(names, domain, min_on, max_values, exclusion_min_on)?;

        for name in names {
            match self.declare_set(name, domain.iter().cloned(), allow_empty, max_values) {
                Ok(()) | Err(ModelError::NameCollision(_)) => (),
                Err(error) => return Err(error),
            }
        }

        self.declare_exclusions("Sets", names, domain, exclusion_min_on, Semantics::Set)
    }

    /// Everything that could make a mutual exclusion fail half way:
    /// the cardinality of the groups declared for new names, and a
    /// required value none of `names` can hold.
    fn check_exclusions(
        &self,
        names: &[&str],
        domain: &[V],
        min_on: usize,
        max_on: usize,
        exclusion_min_on: usize,
    ) -> Result<()> {
        let undeclared = names.iter()
            .filter(|name| !self.slots.contains_key(**name) && !self.sets.contains_key(**name))
            .count();

        if undeclared > 0 {
            ConstraintGroup::<V>::check_cardinality(min_on, max_on, domain.len())?;
        }

        for value in domain {
            let declared = self.registry.iter()
                .filter(|variable| names.iter().any(|name| *name == variable.name()) && variable.value() == value)
                .count();
            ConstraintGroup::<V>::check_cardinality(exclusion_min_on, 1, declared + undeclared)?;
        }

        Ok(())
    }

    /// One group per value, over that value's variables in all `names`.
    /// Re-declaring the same exclusions replaces the earlier groups.
    fn declare_exclusions(
        &mut self,
        kind: &str,
        names: &[&str],
        domain: &[V],
        min_on: usize,
        semantics: Semantics,
    ) -> Result<()> {
        let groups = domain.iter()
            .map(|value| -> Result<(String, ConstraintGroup<V>)> {
                let group = ConstraintGroup::select(
                    &self.registry,
                    |name, candidate| names.iter().any(|wanted| *wanted == name) && candidate == value,
                    min_on,
                    1,
                )?.with_semantics(semantics);

                let key = format!("{} [{}] mutually exclusive, value: {:?}", kind, names.join(", "), value);
                Ok((key, group))
            })
            .collect::<Result<Vec<_>>>()?;

        for (key, group) in groups {
            debug!(key = %key, variables = group.len(), "declared exclusion");
            self.auxiliary.insert(key, Auxiliary::Exclusion(group));
        }

        Ok(())
    }

    /// A slot, set or exclusion group by its name or key
    pub fn group(&self, name: &str) -> Result<&ConstraintGroup<V>> {
        if let Some(group) = self.slots.get(name).or_else(|| self.sets.get(name)) {
            return Ok(group);
        }

        match self.auxiliary.get(name) {
            Some(Auxiliary::Exclusion(group)) => Ok(group),
            _ => Err(ModelError::GroupNotFound(name.to_string())),
        }
    }

    /// The failures recorded for a constraint
    pub fn constraint(&self, id: ConstraintId) -> Result<&FailureRecorder> {
        match self.auxiliary.get(&id.to_string()) {
            Some(Auxiliary::Failures { recorder, .. }) => Ok(recorder),
            _ => Err(ModelError::ConstraintNotFound(id)),
        }
    }

    /// Rules out every combination of the named groups' values that
    /// `predicate` rejects.
    ///
    /// `predicate` only sees the named groups, and is called once per
    /// combination of their locally valid values. Nothing is changed
    /// if compilation fails.
    pub fn add_constraint(&mut self, names: &[&str], predicate: impl Fn(&Assignment<V>) -> bool) -> Result<ConstraintId> {
        let failures = self.compile(names, predicate)?;

        self.constraints += 1;
        let id = ConstraintId(self.constraints);

        let mut recorder = FailureRecorder::new();
        recorder.extend(failures);
        self.auxiliary.insert(id.to_string(), Auxiliary::Failures { id, recorder });

        Ok(id)
    }

    /// Like `add_constraint`, but the failures go to an existing constraint
    pub fn extend_constraint(
        &mut self,
        id: ConstraintId,
        names: &[&str],
        predicate: impl Fn(&Assignment<V>) -> bool,
    ) -> Result<()> {
        self.constraint(id)?;
        let failures = self.compile(names, predicate)?;

        if let Some(Auxiliary::Failures { recorder, .. }) = self.auxiliary.get_mut(&id.to_string()) {
            recorder.extend(failures);
        }

        Ok(())
    }

    /// Every combination of the groups' possibilities the predicate
    /// rejects, as the full literal list of that combination
    fn compile(&self, names: &[&str], predicate: impl Fn(&Assignment<V>) -> bool) -> Result<Vec<CNFClause>> {
        if names.is_empty() {
            return Err(ModelError::MissingRequiredArgument("group names"));
        }

        let groups = names.iter()
            .map(|name| self.group(name))
            .collect::<Result<Vec<_>>>()?;
        let possibilities = groups.iter()
            .map(|group| group.possibilities(&self.solver))
            .collect::<Result<Vec<_>>>()?;

        let mut tried = 0;
        let mut failures = Vec::new();

        for combination in possibilities.iter().map(|possibilities| possibilities.iter()).multi_cartesian_product() {
            tried += 1;

            let mut assignment = Assignment::new();
            let mut literals = CNFClause::new();
            for (partial, clause) in combination {
                assignment.merge(partial);
                literals.extend(clause.clone());
            }

            if !predicate(&assignment) {
                failures.push(literals);
            }
        }

        debug!(?names, tried, failed = failures.len(), "compiled constraint");
        Ok(failures)
    }

    /// The whole model as one formula over the global numbering
    pub fn formula(&self) -> CNF {
        let mut formula = CNF::with_variables(self.registry.len());

        for group in self.slots.values().chain(self.sets.values()) {
            group.clauses().into_iter().for_each(|clause| formula.push(clause));
        }
        for auxiliary in self.auxiliary.values() {
            auxiliary.clauses().into_iter().for_each(|clause| formula.push(clause));
        }

        formula
    }

    /// The formula as DIMACS, every group preceded by a comment block
    /// telling where its clauses come from
    pub fn dimacs(&self) -> String {
        let formula = self.formula();
        let mut out = format!("c ConstraintModel\np cnf {} {}\n\n", formula.num_variables, formula.len());

        // writing into a String cannot fail
        for (key, group) in self.slots.iter().chain(self.sets.iter()) {
            let _ = write!(out, "c ---------------------------\nc INTERPRETED\nc ConstraintGroup =>\nc   {}\nc\n", key);
            out.push_str(&group.to_dimacs());
        }

        for (key, auxiliary) in &self.auxiliary {
            let _ = write!(out, "c ---------------------------\nc NON-INTERPRETED\nc {} =>\nc   {}\nc\n", auxiliary.kind(), key);
            match auxiliary {
                Auxiliary::Exclusion(group) => out.push_str(&group.to_dimacs()),
                Auxiliary::Failures { recorder, .. } => {
                    for clause in recorder.clauses() {
                        out.push_str(&clause.to_dimacs());
                        out.push('\n');
                    }
                }
            }
        }

        out
    }

    /// Reads the true literals of a solution back into names and values.
    /// Set names collect their values in declaration order.
    pub fn decode(&self, literals: &[CNFVar]) -> Result<Assignment<V>> {
        let mut assignment = Assignment::new();

        for literal in literals.iter().filter(|literal| literal.sign()) {
            let variable = self.registry.lookup(literal.id())?;

            if self.sets.contains_key(variable.name()) {
                assignment.push_many(variable.name(), variable.value().clone());
            } else {
                assignment.set_one(variable.name(), variable.value().clone());
            }
        }

        Ok(assignment)
    }

    /// Lazily lists every solution of the model
    pub fn solutions(&self) -> SolutionEnumerator<&S, impl FnMut(&[CNFVar]) -> Result<Assignment<V>> + '_> {
        SolutionEnumerator::new(&self.solver, self.formula(), move |literals: &[CNFVar]| self.decode(literals))
    }
}
