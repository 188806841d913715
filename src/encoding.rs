//! Builds the whole model for a query, solves it and reads the schedule back.

use std::time::Duration;

use log::*;

use crate::base::encode_base;
use crate::error::Result;
use crate::model::Model;
use crate::params::{ForbiddenPairs, Rikishi, TournamentParams};
use crate::query::{encode_query, Query};
use crate::schedule::{extract, Schedule};
use crate::score::encode_results;
use crate::solver::{SolveStatus, Solver};
use crate::vars::{allocate, TournamentVars};

/// A finished model together with the variables that index into it.
#[derive(Debug, Clone)]
pub struct Encoding {
    pub model :Model,
    pub vars :TournamentVars,
}

/// Allocates the variables and encodes the base rules, the results layer if
/// the query needs one, and the query. All parameter and query checks run
/// before anything is allocated.
pub fn encode(params :&TournamentParams,
              forbidden :&ForbiddenPairs,
              reserved :&[(Rikishi, Rikishi)],
              query :&Query) -> Result<Encoding> {
    params.check_constructible()?;
    query.validate(params)?;

    let mut model = Model::new();
    let vars = allocate(&mut model, params, query.needs_results())?;
    encode_base(&mut model, &vars, params, forbidden, reserved)?;
    debug!("After base rules: {} variables, {} constraints", model.num_vars(), model.num_constraints());

    if query.needs_results() {
        encode_results(&mut model, &vars)?;
        debug!("After results: {} variables, {} constraints", model.num_vars(), model.num_constraints());
    }

    encode_query(&mut model, &vars, params, query)?;
    info!("Model for '{}': {} variables, {} constraints", query, model.num_vars(), model.num_constraints());
    Ok(Encoding { model, vars })
}

#[derive(Debug, Clone)]
pub struct Outcome {
    pub status :SolveStatus,
    /// Present whenever the status carries an assignment.
    pub schedule :Option<Schedule>,
    pub objective :Option<i64>,
    pub elapsed :Duration,
}

pub fn solve_encoding(encoding :&Encoding, solver :&dyn Solver, time_limit :Option<Duration>) -> Result<Outcome> {
    let solved = solver.solve(&encoding.model, time_limit)?;
    let schedule = solved.assignment.as_ref().map(|a| extract(&encoding.vars, a));
    Ok(Outcome { status: solved.status, schedule, objective: solved.objective, elapsed: solved.elapsed })
}
