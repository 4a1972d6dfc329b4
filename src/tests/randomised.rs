#![cfg(test)]
//! Random small problems. Real problems are checked for sound models and explanations, integer
//! problems are compared against enumerating every point of their bounding box.
use rand::rngs::SmallRng;
use rand::Rng;
use rand::SeedableRng;

use crate::api::CheckResult;
use crate::branching::variable_selection::MostFractional;
use crate::engine::bounds::BoundKind;
use crate::engine::termination::Indefinite;
use crate::engine::test_helper::TestEngine;
use crate::engine::variables::ArithVar;
use crate::engine::variables::Literal;
use crate::engine::variables::VarSort;
use crate::math::rational;
use crate::runner::solve_with_splits;
use crate::runner::SearchResult;

/// `num_vars` variables followed by one variable per row.
#[derive(Debug)]
struct Problem {
    sort: VarSort,
    num_vars: usize,
    rows: Vec<Vec<(usize, i64)>>,
    bounds: Vec<(usize, BoundKind, i64)>,
}

impl Problem {
    fn random(rng: &mut SmallRng, sort: VarSort) -> Problem {
        let num_vars = rng.gen_range(2..=3);

        let mut rows = vec![];
        for _ in 0..rng.gen_range(1..=3) {
            let mut row = vec![];
            for var in 0..num_vars {
                let coeff = rng.gen_range(-3..=3);
                if coeff != 0 {
                    row.push((var, coeff));
                }
            }
            if !row.is_empty() {
                rows.push(row);
            }
        }

        let mut bounds = vec![];
        for var in 0..num_vars + rows.len() {
            let boxed = sort == VarSort::Int && var < num_vars;
            if boxed || rng.gen_bool(0.6) {
                bounds.push((var, BoundKind::Lower, rng.gen_range(-2..=0)));
            }
            if boxed || rng.gen_bool(0.6) {
                bounds.push((var, BoundKind::Upper, rng.gen_range(0..=2)));
            }
            if var >= num_vars && rng.gen_bool(0.3) {
                let threshold = rng.gen_range(-4..=4);
                bounds.push((var, BoundKind::Lower, threshold));
                bounds.push((var, BoundKind::Upper, threshold + rng.gen_range(0..=1)));
            }
        }

        Problem {
            sort,
            num_vars,
            rows,
            bounds,
        }
    }

    /// Creates the variables, rows and atoms. The atoms are not asserted.
    fn build(&self, engine: &mut TestEngine) -> (Vec<ArithVar>, Vec<Literal>) {
        let mut vars = (0..self.num_vars)
            .map(|index| engine.var(&format!("x{index}"), self.sort))
            .collect::<Vec<_>>();
        for (index, row) in self.rows.iter().enumerate() {
            let terms = row
                .iter()
                .map(|&(var, coeff)| (vars[var], coeff))
                .collect::<Vec<_>>();
            vars.push(engine.linear(&format!("s{index}"), self.sort, &terms));
        }

        let literals = self
            .bounds
            .iter()
            .map(|&(var, kind, value)| engine.atom(vars[var], kind, rational(value)))
            .collect();
        (vars, literals)
    }

    fn holds(&self, point: &[i64]) -> bool {
        let values = point
            .iter()
            .copied()
            .chain(self.rows.iter().map(|row| {
                row.iter()
                    .map(|&(var, coeff)| coeff * point[var])
                    .sum::<i64>()
            }))
            .collect::<Vec<_>>();

        self.bounds.iter().all(|&(var, kind, value)| match kind {
            BoundKind::Lower => values[var] >= value,
            BoundKind::Upper => values[var] <= value,
        })
    }

    /// Enumerates the box `[-2, 2]^num_vars`, which contains every bounded integer problem.
    fn has_integral_point(&self) -> bool {
        let mut point = vec![-2; self.num_vars];
        loop {
            if self.holds(&point) {
                return true;
            }
            let Some(position) = point.iter().position(|&value| value < 2) else {
                return false;
            };
            for value in &mut point[..position] {
                *value = -2;
            }
            point[position] += 1;
        }
    }
}

#[test]
fn real_models_and_explanations_are_sound() {
    for seed in 0..64 {
        let mut rng = SmallRng::seed_from_u64(seed);
        let problem = Problem::random(&mut rng, VarSort::Real);

        let mut engine = TestEngine::default();
        let (_, literals) = problem.build(&mut engine);
        for &literal in &literals {
            let _ = engine.assert(literal);
        }

        match engine.check() {
            CheckResult::Sat => {
                let model = engine.solver.model();
                engine.verify_model(&model);
            }
            CheckResult::Unsat(explanation) => {
                assert!(!explanation.is_empty(), "seed {seed}: empty explanation");

                // asserting only the explanation must already be infeasible
                let mut replay = TestEngine::default();
                let _ = problem.build(&mut replay);
                for &literal in &explanation.literals {
                    let _ = replay.assert(literal);
                }
                assert!(
                    replay.check().is_unsat(),
                    "seed {seed}: {explanation} is satisfiable on its own"
                );
            }
            other => panic!("seed {seed}: unexpected {other:?} for {problem:?}"),
        }
    }
}

#[test]
fn pop_undoes_a_random_scope() {
    for seed in 0..64 {
        let mut rng = SmallRng::seed_from_u64(seed);
        let problem = Problem::random(&mut rng, VarSort::Real);

        let mut engine = TestEngine::default();
        let (vars, literals) = problem.build(&mut engine);
        for &literal in &literals {
            let _ = engine.assert(literal);
        }
        let verdict = engine.check();
        let before = engine.solver.model();
        let num_rows = engine.solver.num_rows();

        engine.solver.push();
        for _ in 0..3 {
            let var = vars[rng.gen_range(0..vars.len())];
            let kind = if rng.gen_bool(0.5) {
                BoundKind::Lower
            } else {
                BoundKind::Upper
            };
            let literal = engine.atom(var, kind, rational(rng.gen_range(-3..=3)));
            let _ = engine.assert(literal);
        }
        let _ = engine.check();
        engine.solver.pop(1).expect("one scope is open");

        assert_eq!(before, engine.solver.model(), "seed {seed}");
        assert_eq!(num_rows, engine.solver.num_rows(), "seed {seed}");
        assert_eq!(verdict, engine.check(), "seed {seed}");
    }
}

#[test]
fn integer_verdicts_match_enumeration() {
    for seed in 0..48 {
        let mut rng = SmallRng::seed_from_u64(seed);
        let problem = Problem::random(&mut rng, VarSort::Int);

        let mut engine = TestEngine::default();
        let (_, literals) = problem.build(&mut engine);
        for &literal in &literals {
            let _ = engine.assert(literal);
        }

        let result = solve_with_splits(&mut engine.solver, MostFractional, &mut Indefinite)
            .expect("no misuse");
        match result {
            SearchResult::Sat(model) => {
                assert!(problem.has_integral_point(), "seed {seed}: {problem:?}");
                engine.verify_model(&model);
            }
            SearchResult::Unsat(explanation) => {
                assert!(!problem.has_integral_point(), "seed {seed}: {problem:?}");
                assert!(explanation
                    .literals
                    .iter()
                    .all(|literal| literals.contains(literal)));
            }
            other => panic!("seed {seed}: unexpected {other:?} for {problem:?}"),
        }
    }
}
