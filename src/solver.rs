//! Solver backends for [`Model`]s.
//!
//! A solver takes a finished model and an optional time budget and reports a
//! [`SolveStatus`] together with the best assignment it has. Proven
//! infeasibility and running out of time are outcomes, not errors.

use std::time::{Duration, Instant};

use good_lp::solvers::highs::highs;
use good_lp::{constraint, variable, Expression, ProblemVariables, ResolutionError, Solution, SolverModel, Variable};
use log::*;

use crate::error::{Error, Result};
use crate::model::{Assignment, Cmp, Direction, Domain, LinExpr, Model};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveStatus {
    /// Proven optimal, or any feasible point of a model without objective.
    Optimal,
    /// Feasible, but the budget ran out before optimality was proven.
    FeasibleSuboptimal,
    /// Proven infeasible.
    Infeasible,
    /// The budget ran out without a feasible point. One may still exist.
    NoSolutionFound,
}

impl SolveStatus {
    pub fn has_assignment(self) -> bool {
        matches!(self, SolveStatus::Optimal | SolveStatus::FeasibleSuboptimal)
    }

    /// True when the verdict holds regardless of the time budget.
    pub fn is_proven(self) -> bool {
        matches!(self, SolveStatus::Optimal | SolveStatus::Infeasible)
    }
}

#[derive(Debug, Clone)]
pub struct Solved {
    pub status :SolveStatus,
    pub assignment :Option<Assignment>,
    /// Objective value of `assignment`, if the model has an objective.
    pub objective :Option<i64>,
    pub elapsed :Duration,
}

impl Solved {
    fn without_assignment(status :SolveStatus, elapsed :Duration) -> Self {
        Solved { status, assignment: None, objective: None, elapsed }
    }

    fn with_assignment(status :SolveStatus, model :&Model, assignment :Assignment, elapsed :Duration) -> Self {
        let objective = model.objective().map(|o| o.expr.eval(&assignment));
        Solved { status, assignment: Some(assignment), objective, elapsed }
    }
}

/// An integer programming backend.
pub trait Solver {
    fn name(&self) -> &'static str;

    /// Solves `model` within `time_limit` (unbounded if `None`).
    fn solve(&self, model :&Model, time_limit :Option<Duration>) -> Result<Solved>;
}

/// Classifies the incumbent a backend returned after running out of time.
///
/// The incumbent is only trusted if it satisfies every constraint of the
/// model. For a model without objective a feasible point is already optimal.
pub fn classify_incumbent(model :&Model, incumbent :Assignment, elapsed :Duration) -> Solved {
    if !model.check(&incumbent) {
        let violated = model.violations(&incumbent).count();
        debug!("Incumbent violates {} constraints, treating as no solution", violated);
        return Solved::without_assignment(SolveStatus::NoSolutionFound, elapsed);
    }
    let status = if model.objective().is_some() { SolveStatus::FeasibleSuboptimal } else { SolveStatus::Optimal };
    Solved::with_assignment(status, model, incumbent, elapsed)
}

/// HiGHS through `good_lp`.
#[derive(Debug, Default, Clone)]
pub struct HighsSolver {
    pub verbose :bool,
}

impl HighsSolver {
    pub fn new() -> Self {
        Self::default()
    }
}

fn to_expression(cols :&[Variable], expr :&LinExpr) -> Expression {
    expr.terms().iter().map(|(v, c)| (*c as f64) * cols[v.index()]).sum()
}

impl Solver for HighsSolver {
    fn name(&self) -> &'static str {
        "highs"
    }

    fn solve(&self, model :&Model, time_limit :Option<Duration>) -> Result<Solved> {
        let start = Instant::now();

        let mut problem = ProblemVariables::new();
        let cols = model.vars().iter().map(|def| {
            let v = match def.domain {
                Domain::Binary => variable().binary(),
                Domain::Integer { min, max } => variable().integer().min(min as f64).max(max as f64),
            };
            problem.add(v.name(def.name.clone()))
        }).collect::<Vec<_>>();

        let objective = model.objective().map(|o| (o.direction, to_expression(&cols, &o.expr)));
        let mut lp = match objective {
            Some((Direction::Maximize, e)) => problem.maximise(e),
            Some((Direction::Minimize, e)) => problem.minimise(e),
            None => problem.minimise(to_expression(&cols, &LinExpr::zero())),
        }.using(highs).set_verbose(self.verbose);

        if let Some(limit) = time_limit {
            lp = lp.set_time_limit(limit.as_secs_f64());
        }

        for c in model.constraints() {
            let lhs = to_expression(&cols, &c.lhs);
            let rhs = c.rhs as f64;
            lp = match c.cmp {
                Cmp::Le => lp.with(constraint!(lhs <= rhs)),
                Cmp::Ge => lp.with(constraint!(lhs >= rhs)),
                Cmp::Eq => lp.with(constraint!(lhs == rhs)),
            };
        }

        info!("Solving {} variables, {} constraints with {} (time limit {:?})",
              model.num_vars(), model.num_constraints(), self.name(), time_limit);

        let result = lp.solve();
        let elapsed = start.elapsed();
        let timed_out = time_limit.map(|limit| elapsed >= limit).unwrap_or(false);

        let solution = match result {
            Ok(solution) => solution,
            // Every variable is bounded, so "unbounded" can only be HiGHS
            // reporting infeasible-or-unbounded from presolve.
            Err(ResolutionError::Infeasible) | Err(ResolutionError::Unbounded) => {
                info!("Proven infeasible after {:?}", elapsed);
                return Ok(Solved::without_assignment(SolveStatus::Infeasible, elapsed));
            }
            Err(e) if timed_out => {
                warn!("Time limit reached after {:?} without a solution ({})", elapsed, e);
                return Ok(Solved::without_assignment(SolveStatus::NoSolutionFound, elapsed));
            }
            Err(e) => return Err(Error::Solver(e.to_string())),
        };

        let assignment = Assignment::new(cols.iter().map(|c| solution.value(*c).round() as i64).collect());

        let solved = if timed_out {
            warn!("Time limit reached after {:?}", elapsed);
            classify_incumbent(model, assignment, elapsed)
        } else {
            Solved::with_assignment(SolveStatus::Optimal, model, assignment, elapsed)
        };

        info!("Solver status {:?} after {:?}, objective {:?}", solved.status, elapsed, solved.objective);
        Ok(solved)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn knapsack() -> (Model, crate::model::Var, crate::model::Var) {
        let mut m = Model::new();
        let x = m.binary("x");
        let y = m.integer("y", 0, 4);
        m.leq("cap", x * 3 + y * 2, 9);
        m.set_objective(Direction::Maximize, x * 5 + y * 3);
        (m, x, y)
    }

    #[test]
    fn feasible_incumbent_is_suboptimal_when_optimizing() {
        let (m, x, y) = knapsack();
        let mut a = Assignment::zeros(&m);
        a.set(x, 1);
        a.set(y, 1);
        let solved = classify_incumbent(&m, a, Duration::from_secs(1));
        assert_eq!(solved.status, SolveStatus::FeasibleSuboptimal);
        assert_eq!(solved.objective, Some(8));
        assert!(!solved.status.is_proven());
        assert!(solved.status.has_assignment());
    }

    #[test]
    fn infeasible_incumbent_is_no_solution() {
        let (m, x, y) = knapsack();
        let mut a = Assignment::zeros(&m);
        a.set(x, 1);
        a.set(y, 4);
        let solved = classify_incumbent(&m, a, Duration::from_secs(1));
        assert_eq!(solved.status, SolveStatus::NoSolutionFound);
        assert!(solved.assignment.is_none());
    }

    #[test]
    fn feasible_incumbent_without_objective_is_optimal() {
        let mut m = Model::new();
        let x = m.binary("x");
        m.leq("c", x, 1);
        let solved = classify_incumbent(&m, Assignment::zeros(&m), Duration::from_secs(1));
        assert_eq!(solved.status, SolveStatus::Optimal);
        assert_eq!(solved.objective, None);
    }

    #[test]
    fn highs_solves_small_knapsack() {
        let (m, x, y) = knapsack();
        let solved = HighsSolver::new().solve(&m, Some(Duration::from_secs(30))).unwrap();
        assert_eq!(solved.status, SolveStatus::Optimal);
        let a = solved.assignment.unwrap();
        // 3x + 2y <= 9: x=1,y=3 gives 14, x=0,y=4 gives 12.
        assert_eq!((a.value(x), a.value(y)), (1, 3));
        assert_eq!(solved.objective, Some(14));
    }

    #[test]
    fn highs_reports_infeasibility() {
        let mut m = Model::new();
        let x = m.binary("x");
        let y = m.binary("y");
        m.geq("both", x + y, 2);
        m.leq("not_both", x + y, 1);
        let solved = HighsSolver::new().solve(&m, None).unwrap();
        assert_eq!(solved.status, SolveStatus::Infeasible);
        assert!(solved.status.is_proven());
        assert!(solved.assignment.is_none());
    }
}
