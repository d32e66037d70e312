use proptest::prelude::*;
use std::cell::Cell;
use std::collections::HashSet;
use whatnot::solver::{Bruteforce, SATSolution, Solver, SolverError, CNF};
use whatnot::{Assignment, ConstraintGroup, ConstraintModel, ModelError, Selection, VariableRegistry};

fn one(value: i32) -> Selection<i32> {
    Selection::One(value)
}

fn many(values: &[i32]) -> Selection<i32> {
    Selection::Many(values.to_vec())
}

fn solution(entries: Vec<(&str, Selection<i32>)>) -> Assignment<i32> {
    entries.into_iter().collect()
}

fn all_solutions<S: Solver>(model: &ConstraintModel<i32, S>) -> Vec<Assignment<i32>> {
    model.solutions().collect::<whatnot::Result<_>>().unwrap()
}

fn distinct(solutions: &[Assignment<i32>]) -> HashSet<Assignment<i32>> {
    let set: HashSet<_> = solutions.iter().cloned().collect();
    assert_eq!(set.len(), solutions.len(), "a solution was listed twice");
    set
}

#[test]
fn set_slot_and_constraint() {
    let mut model = ConstraintModel::new_session(Bruteforce::Bruteforce);
    model.declare_set("A", vec![3, 4, 5], true, 2).unwrap();
    model.declare_slot("B", vec![1, 2], false).unwrap();
    model.add_constraint(&["A", "B"], |s| s.many("A").is_empty() || s.one("B") == Some(&1)).unwrap();

    let expected: HashSet<_> = vec![
        solution(vec![("B", one(2))]),
        solution(vec![("B", one(1))]),
        solution(vec![("A", many(&[3])), ("B", one(1))]),
        solution(vec![("A", many(&[5])), ("B", one(1))]),
        solution(vec![("A", many(&[4])), ("B", one(1))]),
        solution(vec![("A", many(&[3, 4])), ("B", one(1))]),
        solution(vec![("A", many(&[4, 5])), ("B", one(1))]),
        solution(vec![("A", many(&[3, 5])), ("B", one(1))]),
    ].into_iter().collect();

    assert_eq!(distinct(&all_solutions(&model)), expected);
}

#[test]
fn mutually_exclusive_slots() {
    let mut model = ConstraintModel::new_session(Bruteforce::Bruteforce);
    model.declare_mutually_exclusive_slots(&["A", "B"], &[3, 4, 5], true).unwrap();

    let found = all_solutions(&model);
    let mut expected: HashSet<_> = vec![Assignment::new()].into_iter().collect();
    for value in 3..=5 {
        expected.insert(solution(vec![("A", one(value))]));
        expected.insert(solution(vec![("B", one(value))]));
        for other in (3..=5).filter(|other| *other != value) {
            expected.insert(solution(vec![("A", one(value)), ("B", one(other))]));
        }
    }

    assert_eq!(expected.len(), 13);
    assert_eq!(distinct(&found), expected);
    assert!(found.iter().all(|s| s.one("A").is_none() || s.one("A") != s.one("B")));
}

#[test]
fn mutually_exclusive_sets() {
    let mut model = ConstraintModel::new_session(Bruteforce::Bruteforce);
    model.declare_mutually_exclusive_sets(&["A", "B"], &[3, 4, 5], true, true, 3).unwrap();

    let expected: HashSet<_> = vec![
        solution(vec![("B", many(&[3, 4, 5]))]),
        solution(vec![("A", many(&[3])), ("B", many(&[4, 5]))]),
        solution(vec![("A", many(&[4])), ("B", many(&[3, 5]))]),
        solution(vec![("A", many(&[3, 4, 5]))]),
        solution(vec![("A", many(&[5])), ("B", many(&[3, 4]))]),
        solution(vec![("A", many(&[3, 4])), ("B", many(&[5]))]),
        solution(vec![("A", many(&[3, 5])), ("B", many(&[4]))]),
        solution(vec![("A", many(&[4, 5])), ("B", many(&[3]))]),
    ].into_iter().collect();

    assert_eq!(distinct(&all_solutions(&model)), expected);
}

#[test]
fn incomplete_exclusive_sets_may_drop_values() {
    let mut model = ConstraintModel::new_session(Bruteforce::Bruteforce);
    model.declare_mutually_exclusive_sets(&["A", "B"], &[1, 2], true, false, 2).unwrap();

    // every value goes to A, to B or nowhere
    assert_eq!(distinct(&all_solutions(&model)).len(), 9);
}

/// Order 3 Latin squares: rows are exclusive slots, columns are
/// exclusive slots over the same names, and one cell is given.
#[test]
fn latin_square() {
    let cell = |row: usize, column: usize| format!("r{}c{}", row, column);
    let mut model = ConstraintModel::new_session(Bruteforce::Bruteforce);

    for row in 1..=3 {
        let names: Vec<String> = (1..=3).map(|column| cell(row, column)).collect();
        let names: Vec<&str> = names.iter().map(String::as_str).collect();
        model.declare_mutually_exclusive_slots(&names, &[1, 2, 3], false).unwrap();
    }

    for column in 1..=3 {
        let names: Vec<String> = (1..=3).map(|row| cell(row, column)).collect();
        let names: Vec<&str> = names.iter().map(String::as_str).collect();
        model.declare_mutually_exclusive_slots(&names, &[1, 2, 3], false).unwrap();
    }

    assert_eq!(model.registry().len(), 27);
    assert_eq!(distinct(&all_solutions(&model)).len(), 12);

    model.add_constraint(&["r1c1"], |s| s.one("r1c1") == Some(&1)).unwrap();
    let found = all_solutions(&model);
    assert_eq!(distinct(&found).len(), 4);

    for square in &found {
        assert_eq!(square.one("r1c1"), Some(&1));
        for index in 1..=3 {
            let row: HashSet<_> = (1..=3).filter_map(|column| square.one(&cell(index, column))).collect();
            let column: HashSet<_> = (1..=3).filter_map(|row| square.one(&cell(row, index))).collect();
            assert_eq!(row.len(), 3);
            assert_eq!(column.len(), 3);
        }
    }
}

#[test]
fn constraints_on_exclusion_groups() {
    let mut model = ConstraintModel::new_session(Bruteforce::Bruteforce);
    model.declare_mutually_exclusive_slots(&["A", "B"], &[1, 2], true).unwrap();
    // value 1 has to be used by someone
    model.add_constraint(&["Slots [A, B] mutually exclusive, value: 1"], |s| !s.is_empty()).unwrap();

    let found = all_solutions(&model);
    assert_eq!(distinct(&found).len(), 4);
    assert!(found.iter().all(|s| s.one("A") == Some(&1) || s.one("B") == Some(&1)));
}

#[test]
fn unsatisfiable_models_have_no_solutions() {
    let mut model = ConstraintModel::new_session(Bruteforce::Bruteforce);
    model.declare_slot("A", vec![1, 2], false).unwrap();
    model.add_constraint(&["A"], |_| false).unwrap();

    assert_eq!(model.solutions().count(), 0);
}

#[test]
fn empty_model_has_one_empty_solution() {
    let model: ConstraintModel<i32, _> = ConstraintModel::new_session(Bruteforce::Bruteforce);
    assert_eq!(all_solutions(&model), vec![Assignment::new()]);
}

/// Delegates to the brute force solver a limited number of times
struct Flaky {
    calls_left: Cell<usize>,
}

impl Solver for Flaky {
    fn solve(&self, formula: &CNF) -> whatnot::solver::Result<SATSolution> {
        match self.calls_left.get() {
            0 => Err(SolverError::MalformedOutput("truncated".to_string())),
            left => {
                self.calls_left.set(left - 1);
                Bruteforce::Bruteforce.solve(formula)
            }
        }
    }
}

#[test]
fn solver_failures_end_the_enumeration() {
    let mut model = ConstraintModel::new_session(Flaky { calls_left: Cell::new(1) });
    model.declare_slot("A", vec![1, 2, 3], false).unwrap();

    let mut solutions = model.solutions();
    assert!(solutions.next().unwrap().is_ok());
    assert!(matches!(solutions.next(), Some(Err(ModelError::Solver(SolverError::MalformedOutput(_))))));
    assert!(solutions.next().is_none());
}

#[test]
fn solver_failures_abort_compilation() {
    let mut model = ConstraintModel::new_session(Flaky { calls_left: Cell::new(0) });
    model.declare_slot("A", vec![1, 2, 3], false).unwrap();

    assert!(matches!(model.add_constraint(&["A"], |_| true), Err(ModelError::Solver(_))));
    assert_eq!(model.formula().len(), model.group("A").unwrap().clauses().len());
}

fn binomial(n: usize, k: usize) -> usize {
    (1..=k).fold(1, |acc, i| acc * (n + 1 - i) / i)
}

fn numbered(n: usize) -> VariableRegistry<i32> {
    let mut registry = VariableRegistry::new_session();
    for value in 0..n as i32 {
        registry.register("X", value);
    }
    registry
}

proptest! {
    #[test]
    fn slot_has_one_possibility_per_value(n in 1usize..=6) {
        let group = ConstraintGroup::select(&numbered(n), |_, _| true, 1, 1).unwrap();
        let possibilities = group.possibilities(&Bruteforce::Bruteforce).unwrap();

        prop_assert_eq!(possibilities.len(), n);
        prop_assert!(possibilities.keys().all(|assignment| assignment.one("X").is_some()));
    }

    #[test]
    fn set_possibilities_are_bounded_subsets((n, k) in (1usize..=6).prop_flat_map(|n| (Just(n), 0..=n))) {
        let group = ConstraintGroup::select(&numbered(n), |_, _| true, 0, k)
            .unwrap()
            .with_semantics(whatnot::Semantics::Set);
        let possibilities = group.possibilities(&Bruteforce::Bruteforce).unwrap();

        prop_assert_eq!(possibilities.len(), (0..=k).map(|i| binomial(n, i)).sum::<usize>());
        prop_assert!(possibilities.keys().all(|assignment| assignment.many("X").len() <= k));
    }

    #[test]
    fn cardinality_clauses_are_exact((n, min_on, max_on) in (1usize..=5)
        .prop_flat_map(|n| (Just(n), 0..=n))
        .prop_flat_map(|(n, min_on)| (Just(n), Just(min_on), min_on..=n)))
    {
        let group = ConstraintGroup::select(&numbered(n), |_, _| true, min_on, max_on).unwrap();
        let formula: CNF = group.clauses().into_iter().collect();

        for bits in 0..1u32 << n {
            let valuation: Vec<bool> = (0..n).map(|i| bits & (1 << i) != 0).collect();
            let on = valuation.iter().filter(|value| **value).count();
            let satisfied = formula.clauses.iter().all(|clause| clause.is_satisfied_by(&valuation));
            prop_assert_eq!(satisfied, min_on <= on && on <= max_on);
        }
    }
}
