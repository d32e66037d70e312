use solver::VarId;

use crate::error::{ModelError, Result};

/// One concrete possibility: "`name` has the value `value`".
/// It becomes one boolean variable of the formula.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Variable<V> {
    id: VarId,
    name: String,
    value: V,
}

impl<V> Variable<V> {
    pub fn id(&self) -> VarId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> &V {
        &self.value
    }
}

/// Hands out variable numbers. Numbers start at 1, grow by one with
/// every registration and are never reused within a session.
#[derive(Clone, Debug)]
pub struct VariableRegistry<V> {
    variables: Vec<Variable<V>>,
}

impl<V> VariableRegistry<V> {
    /// An empty registry; the first variable will get number 1
    pub fn new_session() -> Self {
        VariableRegistry { variables: Vec::new() }
    }

    pub fn register(&mut self, name: impl Into<String>, value: V) -> VarId {
        let id = self.variables.len() + 1;
        self.variables.push(Variable { id, name: name.into(), value });
        id
    }

    pub fn lookup(&self, id: VarId) -> Result<&Variable<V>> {
        id.checked_sub(1)
            .and_then(|index| self.variables.get(index))
            .ok_or(ModelError::VariableNotFound(id))
    }

    /// Forgets every variable and restarts numbering at 1
    pub fn reset(&mut self) {
        self.variables.clear();
    }

    pub fn len(&self) -> usize {
        self.variables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.variables.is_empty()
    }

    /// All variables in registration order
    pub fn iter(&self) -> impl Iterator<Item = &Variable<V>> {
        self.variables.iter()
    }
}

impl<V> Default for VariableRegistry<V> {
    fn default() -> Self {
        Self::new_session()
    }
}
