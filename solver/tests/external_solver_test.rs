//! The external solver is exercised with small `sh` scripts that follow
//! the minisat calling convention: `$1` is the formula, `$2` the result.
#![cfg(unix)]

use solver::solvers::{ExternalSolver, ExternalSolverConfig, InterruptibleSolverWrapper, TimeLimitedSolver};
use solver::{CNFVar, SATSolution, Solver, SolutionEnumerator, SolverError, CNF};
use std::path::PathBuf;
use std::time::Duration;

fn scripted(script: &str) -> ExternalSolver {
    ExternalSolver::with_config(ExternalSolverConfig {
        program: PathBuf::from("sh"),
        args: vec!["-c".to_string(), script.to_string(), "sh".to_string()],
        randomize: false,
        ..ExternalSolverConfig::default()
    })
}

fn formula() -> CNF {
    CNF::from_dimacs("1 -2 0\n-1 2 0\n").unwrap()
}

#[test]
fn reads_satisfiable_output() {
    let solver = InterruptibleSolverWrapper::from(scripted(r#"printf 'SAT\n1 2 0\n' > "$2""#));
    assert_eq!(solver.solve(&formula()).unwrap(), SATSolution::Satisfiable(vec![true, true]));
}

#[test]
fn reads_unsatisfiable_output() {
    let solver = InterruptibleSolverWrapper::from(scripted(r#"echo UNSAT > "$2"; exit 20"#));
    assert!(solver.solve(&formula()).unwrap().is_unsat());
}

#[test]
fn solver_receives_the_formula() {
    // answers SAT only if the input carries the expected header
    let solver = InterruptibleSolverWrapper::from(scripted(
        r#"if grep -q '^p cnf 2 2$' "$1"; then printf 'SAT\n-1 -2 0\n' > "$2"; else echo UNSAT > "$2"; fi"#,
    ));
    assert!(solver.solve(&formula()).unwrap().is_sat());
}

#[test]
fn rejected_exit_code_is_an_error() {
    let solver = InterruptibleSolverWrapper::from(scripted("exit 3"));
    match solver.solve(&formula()) {
        Err(SolverError::ExitStatus { code: Some(3) }) => (),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn garbage_output_is_an_error() {
    let solver = InterruptibleSolverWrapper::from(scripted(r#"echo 'Segmentation fault' > "$2""#));
    assert!(matches!(solver.solve(&formula()), Err(SolverError::MalformedOutput(_))));
}

#[test]
fn missing_output_file_is_an_error() {
    let solver = InterruptibleSolverWrapper::from(scripted("true"));
    assert!(matches!(solver.solve(&formula()), Err(SolverError::Io(_))));
}

#[test]
fn missing_program_is_an_error() {
    let solver = InterruptibleSolverWrapper::from(ExternalSolver::new(PathBuf::from("/nonexistent/minisat")));
    assert!(matches!(solver.solve(&formula()), Err(SolverError::Spawn { .. })));
}

#[test]
fn slow_solver_times_out() {
    let solver = TimeLimitedSolver::new(scripted("sleep 5"), Duration::from_millis(200));
    match solver.solve(&formula()) {
        Err(SolverError::Timeout(limit)) => assert_eq!(limit, Duration::from_millis(200)),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn enumeration_surfaces_solver_failure() {
    // the first call succeeds, every later one fails
    let script = r#"if grep -q '^-1 -2 0$' "$1"; then exit 1; else printf 'SAT\n1 2 0\n' > "$2"; fi"#;
    let solver = InterruptibleSolverWrapper::from(scripted(script));
    let decode = |literals: &[CNFVar]| Ok::<_, SolverError>(literals.to_vec());
    let results: Vec<_> = SolutionEnumerator::new(solver, formula(), decode).collect();

    assert_eq!(results.len(), 2);
    assert!(results[0].is_ok());
    assert!(matches!(results[1], Err(SolverError::ExitStatus { code: Some(1) })));
}

#[test]
#[ignore = "needs minisat on PATH"]
fn minisat_enumerates_equivalence() {
    let solver = InterruptibleSolverWrapper::from(ExternalSolver::default());
    let decode = |literals: &[CNFVar]| Ok::<_, SolverError>(literals.iter().map(|var| var.to_i32().unwrap()).collect::<Vec<_>>());
    let mut found: Vec<Vec<i32>> = SolutionEnumerator::new(solver, formula(), decode)
        .collect::<solver::Result<_>>()
        .unwrap();
    found.sort();

    assert_eq!(found, vec![vec![-1, -2], vec![1, 2]]);
}
