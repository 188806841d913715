//! Bout results and running scores.

use log::*;

use crate::error::{Error, Result};
use crate::model::{LinExpr, Model};
use crate::params::{Day, Rikishi};
use crate::vars::TournamentVars;

/// Wins of `i` on `day` as an expression over bout and win variables:
///
/// `sum_{j<i} (f[j,i,d] - w[j,i,d]) + sum_{j>i} w[i,j,d]`
///
/// For a pair (j, i) with j < i, i won exactly when the bout happened and j did
/// not win it, so `f - w` is 1. If there was no bout both are 0.
pub fn wins_on(vars :&TournamentVars, day :Day, i :Rikishi) -> Result<LinExpr> {
    let results = vars.results().ok_or_else(|| Error::query("model was built without win and score variables"))?;
    let mut expr = LinExpr::zero();
    for j in 0..i {
        expr = expr + vars.bout(day, j, i) - results.win(day, j, i);
    }
    for j in (i + 1)..vars.n {
        expr = expr + results.win(day, i, j);
    }
    Ok(expr)
}

/// Links wins to bouts and accumulates scores:
///
/// - `w[i,j,d] <= f[i,j,d]`, nobody wins a bout that did not happen,
/// - `s[i,0] = wins_on(0, i)`,
/// - `s[i,d] = s[i,d-1] + wins_on(d, i)`.
pub fn encode_results(model :&mut Model, vars :&TournamentVars) -> Result<()> {
    let results = vars.results().ok_or_else(|| Error::query("model was built without win and score variables"))?;
    let constraints_before = model.num_constraints();

    for (i, j) in vars.pairs() {
        for day in vars.days() {
            model.leq(format!("win_needs_bout_{}_{}_{}", i, j, day), results.win(day, i, j), vars.bout(day, i, j));
        }
    }

    for i in vars.wrestlers() {
        for day in vars.days() {
            let mut total_wins = wins_on(vars, day, i)?;
            if day > 0 {
                total_wins = total_wins + results.score(day - 1, i);
            }
            model.equal(format!("score_{}_{}", i, day), results.score(day, i), total_wins);
        }
    }

    info!("Results: {} constraints", model.num_constraints() - constraints_before);
    Ok(())
}
