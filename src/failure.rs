use solver::CNFClause;

/// Collects the full literal lists of combinations a constraint rejected.
///
/// Each recorded clause is one failing combination ("all of these at
/// once"), so it is emitted negated: "not all of these at once". That
/// excludes exactly the recorded combination.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FailureRecorder {
    failures: Vec<CNFClause>,
}

impl FailureRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, failure: CNFClause) {
        self.failures.push(failure);
    }

    /// The recorded combinations, as they were recorded
    pub fn failures(&self) -> &[CNFClause] {
        &self.failures
    }

    /// The clauses excluding every recorded combination
    pub fn clauses(&self) -> Vec<CNFClause> {
        self.failures.iter().map(CNFClause::negated).collect()
    }

    pub fn len(&self) -> usize {
        self.failures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.failures.is_empty()
    }
}

impl Extend<CNFClause> for FailureRecorder {
    fn extend<T: IntoIterator<Item = CNFClause>>(&mut self, iter: T) {
        self.failures.extend(iter);
    }
}
