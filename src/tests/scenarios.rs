#![cfg(test)]
use crate::api::CheckResult;
use crate::engine::bounds::BoundKind;
use crate::engine::test_helper::TestEngine;
use crate::engine::variables::VarSort;
use crate::math::rational;
use crate::math::InfRational;

#[test]
fn strict_bounds_exclude_their_threshold() {
    let mut engine = TestEngine::default();
    let x = engine.real("x");
    let y = engine.real("y");
    let s = engine.linear("s", VarSort::Real, &[(x, 1), (y, 1)]);
    let x_large = engine.greater_than(x, 1, 1);
    let y_large = engine.greater_than(y, 2, 1);
    let s_small = engine.at_most(s, 3);

    let explanation = engine.assert_unsat();
    assert_eq!(3, explanation.literals.len());
    assert!([x_large, y_large, s_small]
        .iter()
        .all(|&literal| explanation.contains(literal)));
}

#[test]
fn strict_bounds_are_satisfied_by_the_model() {
    let mut engine = TestEngine::default();
    let x = engine.real("x");
    let y = engine.real("y");
    let s = engine.linear("s", VarSort::Real, &[(x, 1), (y, -1)]);
    let _ = engine.greater_than(x, 1, 1);
    let _ = engine.less_than(x, 2, 1);
    let _ = engine.greater_than(s, 0, 1);
    let _ = engine.at_least(y, 1);

    let model = engine.assert_sat();
    assert!(model[x.id as usize] > rational(1));
    assert!(model[x.id as usize] < rational(2));
    assert!(model[x.id as usize] > model[y.id as usize]);
}

#[test]
fn conflicts_mention_the_row_and_its_bounds() {
    let mut engine = TestEngine::default();
    let x = engine.real("x");
    let y = engine.real("y");
    let z = engine.real("z");
    let s = engine.linear("s", VarSort::Real, &[(x, 1), (y, 1)]);

    let x_positive = engine.at_least(x, 0);
    let y_positive = engine.at_least(y, 0);
    let _ = engine.at_least(z, 5);
    let s_negative = engine.at_most(s, -1);

    let explanation = engine.assert_unsat();
    assert_eq!(vec![x_positive, y_positive, s_negative], explanation.literals);
    assert!(explanation.equalities.is_empty());
}

#[test]
fn a_small_linear_program_turns_infeasible() {
    let mut engine = TestEngine::default();
    let x = engine.real("x");
    let y = engine.real("y");
    let sum = engine.linear("sum", VarSort::Real, &[(x, 1), (y, 1)]);
    let weighted = engine.linear("weighted", VarSort::Real, &[(x, 1), (y, 3)]);
    let difference = engine.linear("difference", VarSort::Real, &[(x, 1), (y, -1)]);

    let asserted = [
        engine.at_least(x, 0),
        engine.at_least(y, 0),
        engine.at_most(sum, 4),
        engine.at_most(weighted, 6),
        engine.at_least(difference, 3),
    ];
    let _ = engine.assert_sat();

    let x_large = engine.at_least(x, 5);
    let explanation = engine.assert_unsat();
    assert!(explanation.contains(x_large));
    assert!(explanation.contains(asserted[1]));
    assert!(explanation.contains(asserted[2]));
    assert!(explanation
        .literals
        .iter()
        .all(|literal| *literal == x_large || asserted.contains(literal)));
}

#[test]
fn rows_propagate_entailed_atoms_to_the_host() {
    let mut engine = TestEngine::default();
    let x = engine.real("x");
    let y = engine.real("y");
    let d = engine.linear("d", VarSort::Real, &[(y, 1), (x, -1)]);

    let gap = engine.at_least(d, 1);
    let x_large = engine.at_least(x, 3);
    let y_large = engine.atom(y, BoundKind::Lower, rational(4));
    let _ = engine.assert_sat();

    let propagation = std::iter::from_fn(|| engine.solver.next_propagation())
        .find(|propagation| propagation.literal == y_large)
        .expect("y >= 4 follows from d >= 1 and x >= 3");
    assert_eq!(vec![gap, x_large], propagation.explanation.literals);
}

#[test]
fn axioms_never_appear_in_explanations() {
    let mut engine = TestEngine::default();
    let x = engine.real("x");
    engine
        .solver
        .assert_axiom(x, BoundKind::Upper, InfRational::from(rational(0)))
        .expect("x exists");
    let x_positive = engine.at_least(x, 1);

    let explanation = engine.assert_unsat();
    assert_eq!(vec![x_positive], explanation.literals);
}

#[test]
fn rows_added_after_a_check_join_the_tableau() {
    let mut engine = TestEngine::default();
    let x = engine.real("x");
    let y = engine.real("y");
    let _ = engine.at_least(x, 2);
    let _ = engine.at_most(y, 1);
    let _ = engine.assert_sat();

    let d = engine.linear("d", VarSort::Real, &[(x, 1), (y, -1)]);
    let _ = engine.assert_sat();
    assert!(engine.solver.model_value(d) >= rational(1));

    let _ = engine.at_most(d, 0);
    let _ = engine.assert_unsat();
}

#[test]
fn opposite_literals_of_one_atom_conflict() {
    let mut engine = TestEngine::default();
    let x = engine.real("x");
    let atom = engine.atom(x, BoundKind::Lower, rational(1));
    let _ = engine.assert(atom);
    let _ = engine.assert(!atom);

    let explanation = engine.assert_unsat();
    assert_eq!(2, explanation.literals.len());
    assert!(explanation.contains(atom));
    assert!(explanation.contains(!atom));
}

#[test]
fn equal_bounds_fix_the_model_value() {
    let mut engine = TestEngine::default();
    let x = engine.real("x");
    let y = engine.real("y");
    let s = engine.linear("s", VarSort::Real, &[(x, 2), (y, 1)]);
    let _ = engine.equal(x, 3);
    let _ = engine.equal(s, 10);

    let model = engine.assert_sat();
    assert_eq!(rational(4), model[y.id as usize]);
    assert!(engine.solver.is_fixed(x));
}

#[test]
fn checking_twice_gives_the_same_verdict() {
    let mut engine = TestEngine::default();
    let x = engine.real("x");
    let _ = engine.at_least(x, 1);
    assert_eq!(CheckResult::Sat, engine.check());
    assert_eq!(CheckResult::Sat, engine.check());

    let _ = engine.at_most(x, 0);
    assert!(engine.check().is_unsat());
    assert!(engine.check().is_unsat());
}
