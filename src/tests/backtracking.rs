#![cfg(test)]
use crate::basic_types::ArithmeticError;
use crate::engine::bounds::BoundKind;
use crate::engine::test_helper::TestEngine;
use crate::engine::variables::VarSort;
use crate::math::rational;

fn triangle() -> TestEngine {
    let mut engine = TestEngine::default();
    let x = engine.real("x");
    let y = engine.real("y");
    let z = engine.real("z");
    let xy = engine.linear("xy", VarSort::Real, &[(x, 1), (y, 1)]);
    let yz = engine.linear("yz", VarSort::Real, &[(y, 1), (z, -2)]);
    let _ = engine.at_least(x, 1);
    let _ = engine.at_most(xy, 5);
    let _ = engine.at_least(yz, -3);
    engine
}

#[test]
fn pop_restores_the_assignment_exactly() {
    let mut engine = triangle();
    let before = engine.assert_sat();

    engine.solver.push();
    let y = engine.solver.var_by_name("y").expect("y is named");
    let z = engine.solver.var_by_name("z").expect("z is named");
    let _ = engine.at_least(y, 3);
    let _ = engine.at_least(z, 4);
    let _ = engine.check();
    engine.solver.pop(1).expect("one scope is open");

    assert_eq!(before, engine.solver.model());
    assert_eq!(before, engine.assert_sat());
}

#[test]
fn rows_and_variables_of_a_scope_are_removed() {
    let mut engine = triangle();
    let _ = engine.assert_sat();
    let num_rows = engine.solver.num_rows();
    let num_vars = engine.solver.num_vars();

    engine.solver.push();
    let x = engine.solver.var_by_name("x").expect("x is named");
    let w = engine.real("w");
    let _ = engine.linear("xw", VarSort::Real, &[(x, 1), (w, 1)]);
    assert_eq!(num_rows + 1, engine.solver.num_rows());
    engine.solver.pop(1).expect("one scope is open");

    assert_eq!(num_rows, engine.solver.num_rows());
    assert_eq!(num_vars, engine.solver.num_vars());
    assert_eq!(None, engine.solver.var_by_name("w"));
    let _ = engine.assert_sat();
}

#[test]
fn atoms_created_in_a_scope_are_forgotten() {
    let mut engine = triangle();
    let x = engine.solver.var_by_name("x").expect("x is named");

    engine.solver.push();
    let literal = engine.atom(x, BoundKind::Upper, rational(7));
    engine.solver.pop(1).expect("one scope is open");

    assert_eq!(
        Err(ArithmeticError::UnknownLiteral(literal)),
        engine.solver.assert_literal(literal)
    );
}

#[test]
fn conflicts_are_forgotten_on_pop() {
    let mut engine = triangle();
    let x = engine.solver.var_by_name("x").expect("x is named");

    engine.solver.push();
    let _ = engine.at_most(x, 0);
    let _ = engine.assert_unsat();
    assert!(engine.solver.is_infeasible());
    engine.solver.pop(1).expect("one scope is open");

    assert!(!engine.solver.is_infeasible());
    let _ = engine.assert_sat();
}

#[test]
fn retracting_to_a_mark_pops_every_later_scope() {
    let mut engine = triangle();
    let x = engine.solver.var_by_name("x").expect("x is named");
    let y = engine.solver.var_by_name("y").expect("y is named");

    engine.solver.push();
    let mark = engine.solver.mark();
    let _ = engine.at_least(y, 1);
    engine.solver.push();
    let _ = engine.at_least(x, 3);
    engine.solver.push();
    let _ = engine.at_least(y, 3);
    let _ = engine.assert_unsat();
    assert_eq!(3, engine.solver.scope_depth());

    engine.solver.retract_to(mark).expect("the mark is below the current depth");
    assert_eq!(1, engine.solver.scope_depth());
    let model = engine.assert_sat();
    assert!(model[y.id as usize] >= rational(1));

    engine.solver.pop(1).expect("one scope is open");
    assert_eq!(
        Err(ArithmeticError::PopBelowRoot {
            requested: 1,
            open: 0
        }),
        engine.solver.pop(1)
    );
}

#[test]
fn bounds_asserted_below_a_scope_survive_its_pop() {
    let mut engine = triangle();
    let x = engine.solver.var_by_name("x").expect("x is named");
    let _ = engine.at_least(x, 2);
    let _ = engine.assert_sat();

    engine.solver.push();
    let _ = engine.at_least(x, 4);
    let _ = engine.assert_sat();
    assert_eq!(Some(rational(4)), engine.solver.lower_bound(x).map(|bound| bound.real().clone()));
    engine.solver.pop(1).expect("one scope is open");

    let _ = engine.assert_sat();
    assert_eq!(Some(rational(2)), engine.solver.lower_bound(x).map(|bound| bound.real().clone()));
}
