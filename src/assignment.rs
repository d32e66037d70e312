use std::collections::btree_map::{self, BTreeMap};
use std::fmt::{self, Debug};
use std::hash::Hash;
use std::iter::FromIterator;

/// Anything that can be put into a slot or set
pub trait Value: Clone + Eq + Ord + Hash + Debug {}

impl<T: Clone + Eq + Ord + Hash + Debug> Value for T {}

/// What a name got assigned: one value for a slot, an ordered
/// list of values for a set.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Selection<V> {
    One(V),
    Many(Vec<V>),
}

impl<V> Selection<V> {
    /// The selected values as a slice, whatever the kind
    pub fn values(&self) -> &[V] {
        match self {
            Selection::One(value) => std::slice::from_ref(value),
            Selection::Many(values) => values,
        }
    }
}

/// A (possibly partial) solution: names mapped to what they hold.
/// Names that hold nothing are absent.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Assignment<V> {
    values: BTreeMap<String, Selection<V>>,
}

impl<V> Assignment<V> {
    pub fn new() -> Self {
        Assignment { values: BTreeMap::new() }
    }

    pub fn get(&self, name: &str) -> Option<&Selection<V>> {
        self.values.get(name)
    }

    /// The value of a slot; `None` for empty slots and for sets
    pub fn one(&self, name: &str) -> Option<&V> {
        match self.values.get(name) {
            Some(Selection::One(value)) => Some(value),
            _ => None,
        }
    }

    /// The values of a set (or the single value of a slot);
    /// empty when nothing is assigned
    pub fn many(&self, name: &str) -> &[V] {
        match self.values.get(name) {
            Some(selection) => selection.values(),
            None => &[],
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, Selection<V>> {
        self.values.iter()
    }

    /// Slot semantics: the name holds exactly this value from now on
    pub fn set_one(&mut self, name: &str, value: V) {
        self.values.insert(name.to_string(), Selection::One(value));
    }

    /// Set semantics: the value is appended to what the name holds
    pub fn push_many(&mut self, name: &str, value: V) {
        match self.values.get_mut(name) {
            Some(Selection::Many(values)) => values.push(value),
            _ => {
                self.values.insert(name.to_string(), Selection::Many(vec![value]));
            }
        }
    }

    /// Takes over every entry of `other`, replacing entries with
    /// the same name
    pub fn merge(&mut self, other: &Assignment<V>)
    where
        V: Clone,
    {
        self.values.extend(other.values.iter().map(|(name, selection)| (name.clone(), selection.clone())));
    }

    pub fn into_inner(self) -> BTreeMap<String, Selection<V>> {
        self.values
    }
}

impl<V> Default for Assignment<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Debug> Debug for Assignment<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.values.iter().map(|(name, selection)| match selection {
                Selection::One(value) => (name, value as &dyn Debug),
                Selection::Many(values) => (name, values as &dyn Debug),
            }))
            .finish()
    }
}

impl<N: Into<String>, V> FromIterator<(N, Selection<V>)> for Assignment<V> {
    fn from_iter<I: IntoIterator<Item = (N, Selection<V>)>>(iter: I) -> Self {
        Assignment {
            values: iter.into_iter().map(|(name, selection)| (name.into(), selection)).collect(),
        }
    }
}

impl<'a, V> IntoIterator for &'a Assignment<V> {
    type Item = (&'a String, &'a Selection<V>);
    type IntoIter = btree_map::Iter<'a, String, Selection<V>>;

    fn into_iter(self) -> Self::IntoIter {
        self.values.iter()
    }
}
