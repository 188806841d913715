//! Structural scheduling rules.

use itertools::Itertools;
use log::*;

use crate::error::{Error, Result};
use crate::model::{LinExpr, Model};
use crate::params::{ForbiddenPairs, Rikishi, TournamentParams};
use crate::vars::TournamentVars;

/// Encodes the rules every valid schedule obeys:
///
/// - each wrestler fights at most once a day (exactly once if `m == d`),
/// - each wrestler fights exactly `m` bouts,
/// - each pairing happens at most once,
/// - between `lb` and `ub` bouts are held every day,
/// - forbidden pairs never meet,
/// - reserved pairs meet on the last day and not before.
///
/// Nothing is emitted when the parameters are inconsistent.
pub fn encode_base(model :&mut Model,
                   vars :&TournamentVars,
                   params :&TournamentParams,
                   forbidden :&ForbiddenPairs,
                   reserved :&[(Rikishi, Rikishi)]) -> Result<()> {
    params.check_constructible()?;
    forbidden.validate(params)?;
    validate_reserved(params, forbidden, reserved)?;

    let constraints_before = model.num_constraints();

    // ## One bout per day
    for i in vars.wrestlers() {
        for day in vars.days() {
            let name = format!("daily_{}_{}", i, day);
            if params.is_compact() {
                model.equal(name, vars.fights_on(day, i), 1);
            } else {
                model.leq(name, vars.fights_on(day, i), 1);
            }
        }
    }

    // ## No repeated pairings
    for (i, j) in vars.pairs() {
        let meetings = vars.days().map(|day| vars.bout(day, i, j));
        model.leq(format!("once_{}_{}", i, j), meetings.sum::<LinExpr>(), 1);
    }

    // ## Bouts per day
    for day in vars.days() {
        let all_day_bouts = vars.pairs().map(|(i, j)| vars.bout(day, i, j)).collect::<Vec<_>>();
        if params.lb == params.ub {
            model.equal(format!("day_bouts_{}", day), all_day_bouts.into_iter().sum::<LinExpr>(), params.ub as i64);
        } else {
            model.leq(format!("day_max_{}", day), all_day_bouts.iter().copied().sum::<LinExpr>(), params.ub as i64);
            model.geq(format!("day_min_{}", day), all_day_bouts.into_iter().sum::<LinExpr>(), params.lb as i64);
        }
    }

    // ## Bouts per wrestler
    for i in vars.wrestlers() {
        let all_wrestler_bouts = vars.days().flat_map(|day| vars.bouts_of(day, i)).collect::<Vec<_>>();
        model.equal(format!("total_{}", i), all_wrestler_bouts.into_iter().sum::<LinExpr>(), params.m as i64);
    }

    encode_forbidden(model, vars, forbidden);
    encode_reserved(model, vars, reserved);

    info!("Base schedule: {} constraints ({} forbidden pairs, {} reserved pairs)",
          model.num_constraints() - constraints_before, forbidden.len(), reserved.len());
    Ok(())
}

/// Stablemates and relatives never meet.
pub fn encode_forbidden(model :&mut Model, vars :&TournamentVars, forbidden :&ForbiddenPairs) {
    for (i, j) in forbidden.iter() {
        for day in vars.days() {
            model.equal(format!("forbidden_{}_{}_{}", i, j, day), vars.bout(day, i, j), 0);
        }
    }
}

/// Koreyori sanyaku: the final bouts of the tournament are between the top
/// rankers. Each reserved pair meets on the last day and on no other day.
pub fn encode_reserved(model :&mut Model, vars :&TournamentVars, reserved :&[(Rikishi, Rikishi)]) {
    let last = vars.d - 1;
    for (i, j) in reserved.iter().copied() {
        for day in 0..last {
            model.equal(format!("reserved_early_{}_{}_{}", i, j, day), vars.bout(day, i, j), 0);
        }
        model.equal(format!("reserved_{}_{}", i, j), vars.bout(last, i, j), 1);
    }
}

/// Picks `k` pairings from the top of the banzuke for the final day: the
/// highest ranked wrestler is paired with the next highest one not already
/// used and not forbidden, and so on.
///
/// Fails if `k` bouts do not fit in one day, or if the forbidden pairs leave
/// fewer than `k` such pairings.
pub fn nominate_reserved_pairs(params :&TournamentParams, k :usize, forbidden :&ForbiddenPairs) -> Result<Vec<(Rikishi, Rikishi)>> {
    check_reserved_count(params, k)?;
    let n = params.n;
    let mut special = Vec::new();
    let mut matched = vec![false; n];

    for i in 0..n {
        if special.len() == k {
            break;
        }
        if matched[i] {
            continue;
        }
        if let Some(j) = ((i + 1)..n).find(|j| !matched[*j] && !forbidden.contains(i, *j)) {
            special.push((i, j));
            matched[i] = true;
            matched[j] = true;
        }
    }

    if special.len() < k {
        return Err(Error::infeasible(format!(
            "only {} of {} reserved final-day pairings avoid the forbidden pairs", special.len(), k)));
    }
    debug!("Nominated reserved pairings {:?}", special);
    Ok(special)
}

/// `k` reserved bouts must fit on the final day.
pub fn check_reserved_count(params :&TournamentParams, k :usize) -> Result<()> {
    if k > params.ub {
        return Err(Error::infeasible(format!(
            "{} reserved final-day bouts but at most {} bouts per day", k, params.ub)));
    }
    if k > params.n / 2 {
        return Err(Error::infeasible(format!(
            "{} reserved final-day bouts need more than {} wrestlers", k, params.n)));
    }
    Ok(())
}

fn validate_reserved(params :&TournamentParams, forbidden :&ForbiddenPairs, reserved :&[(Rikishi, Rikishi)]) -> Result<()> {
    check_reserved_count(params, reserved.len())?;
    for (i, j) in reserved.iter().copied() {
        if i == j || i >= params.n || j >= params.n {
            return Err(Error::params(format!("reserved pair ({}, {}) is not a valid pairing", i, j)));
        }
        if forbidden.contains(i, j) {
            return Err(Error::params(format!("reserved pair ({}, {}) is a forbidden pairing", i, j)));
        }
    }
    let wrestlers = reserved.iter().flat_map(|(i, j)| vec![*i, *j]).collect::<Vec<_>>();
    if wrestlers.iter().unique().count() != wrestlers.len() {
        return Err(Error::params(format!("reserved pairs {:?} share a wrestler", reserved)));
    }
    Ok(())
}
