//! Queries: what to ask of a tournament on top of the base schedule.
//!
//! Every query only adds constraints and possibly an objective to a model that
//! already holds the base and result encodings.

use std::fmt;

use log::*;

use crate::error::{Error, Result};
use crate::model::{Direction, LinExpr, Model, Var};
use crate::params::{Day, Rikishi, TournamentParams};
use crate::threshold::lt_const;
use crate::vars::TournamentVars;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TieMode {
    /// The champion may share the top score (a playoff).
    IncludeTies,
    /// The champion finishes strictly ahead of everyone else.
    ExcludeTies,
}

impl TieMode {
    pub fn margin(self) -> i64 {
        match self {
            TieMode::IncludeTies => 0,
            TieMode::ExcludeTies => 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Query {
    /// Any valid schedule. Without `include_scores` no results are modeled.
    Generate { include_scores :bool },

    /// `champion` finishes with the best score, fixed to `score` if given.
    Champion {
        champion :Rikishi,
        score :Option<usize>,
        ties :TieMode,
    },

    /// As `Champion`, and on `day` no rival can catch the champion even by
    /// winning every remaining bout.
    SecureChampionship {
        champion :Rikishi,
        score :Option<usize>,
        day :Day,
        ties :TieMode,
    },

    /// Champion finishing on `score` with ties allowed; optimizes how many
    /// others share that score.
    OptimizeTieSize {
        champion :Rikishi,
        score :usize,
        secure_day :Option<Day>,
        direction :Direction,
    },

    /// Optimizes how many wrestlers have a score in `lower..=upper` after `day`.
    OptimizeScoreCount {
        lower :usize,
        upper :usize,
        day :Day,
        direction :Direction,
    },
}

impl Query {
    /// Whether the query needs win and score variables.
    pub fn needs_results(&self) -> bool {
        match self {
            Query::Generate { include_scores } => *include_scores,
            _ => true,
        }
    }

    pub fn has_objective(&self) -> bool {
        matches!(self, Query::OptimizeTieSize { .. } | Query::OptimizeScoreCount { .. })
    }

    /// Range checks on every index, score and day the query refers to.
    pub fn validate(&self, params :&TournamentParams) -> Result<()> {
        let wrestler = |i :Rikishi| if i < params.n { Ok(()) } else {
            Err(Error::query(format!("wrestler {} out of range, there are {}", i, params.n)))
        };
        let score = |s :usize| if s <= params.m { Ok(()) } else {
            Err(Error::query(format!("score {} out of range 0..={}", s, params.m)))
        };
        let day = |d :Day| if d < params.d { Ok(()) } else {
            Err(Error::query(format!("day {} out of range 0..={}", d, params.d.saturating_sub(1))))
        };

        match *self {
            Query::Generate { .. } => {}
            Query::Champion { champion, score: s, ties } => {
                wrestler(champion)?;
                if let Some(s) = s {
                    score(s)?;
                    check_outright(s, ties)?;
                }
            }
            Query::SecureChampionship { champion, score: s, day: d, ties } => {
                wrestler(champion)?;
                day(d)?;
                if let Some(s) = s {
                    score(s)?;
                    check_outright(s, ties)?;
                }
            }
            Query::OptimizeTieSize { champion, score: s, secure_day, .. } => {
                wrestler(champion)?;
                score(s)?;
                if let Some(d) = secure_day {
                    day(d)?;
                }
            }
            Query::OptimizeScoreCount { lower, upper, day: d, .. } => {
                score(lower)?;
                score(upper)?;
                day(d)?;
                if lower > upper {
                    return Err(Error::query(format!("lower score {} above upper score {}", lower, upper)));
                }
            }
        }
        Ok(())
    }
}

fn check_outright(score :usize, ties :TieMode) -> Result<()> {
    if score == 0 && ties == TieMode::ExcludeTies {
        return Err(Error::infeasible("an outright champion cannot finish without a win"));
    }
    Ok(())
}

impl fmt::Display for Query {
    fn fmt(&self, f :&mut fmt::Formatter) -> fmt::Result {
        match self {
            Query::Generate { include_scores } => write!(f, "generate (scores: {})", include_scores),
            Query::Champion { champion, score, ties } =>
                write!(f, "champion {} with score {:?} ({:?})", champion, score, ties),
            Query::SecureChampionship { champion, score, day, ties } =>
                write!(f, "champion {} with score {:?} secure on day {} ({:?})", champion, score, day, ties),
            Query::OptimizeTieSize { champion, score, secure_day, direction } =>
                write!(f, "{:?} ties with champion {} on {} (secure day {:?})", direction, champion, score, secure_day),
            Query::OptimizeScoreCount { lower, upper, day, direction } =>
                write!(f, "{:?} wrestlers scoring {}..={} on day {}", direction, lower, upper, day),
        }
    }
}

/// Flat form of the champion options as they come from a command line,
/// before they are resolved into a [`Query`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChampionRequest {
    pub champion :Rikishi,
    pub score :Option<usize>,
    pub secure_day :Option<Day>,
    pub no_ties :bool,
    pub tie_objective :Option<Direction>,
}

impl ChampionRequest {
    /// Resolves the options into one query. Without an explicit score the
    /// champion is taken to win every bout. Excluding ties while optimizing
    /// the number of ties is a conflict.
    pub fn into_query(self, params :&TournamentParams) -> Result<Query> {
        let ties = if self.no_ties { TieMode::ExcludeTies } else { TieMode::IncludeTies };
        let score = self.score.unwrap_or(params.m);
        let query = match (self.tie_objective, self.secure_day) {
            (Some(_), _) if self.no_ties => {
                return Err(Error::conflict("cannot optimize the number of ties while excluding ties"));
            }
            (Some(direction), secure_day) => Query::OptimizeTieSize { champion: self.champion, score, secure_day, direction },
            (None, Some(day)) => Query::SecureChampionship { champion: self.champion, score: Some(score), day, ties },
            (None, None) => Query::Champion { champion: self.champion, score: Some(score), ties },
        };
        query.validate(params)?;
        Ok(query)
    }
}

/// Adds the constraints and objective of `query`.
pub fn encode_query(model :&mut Model, vars :&TournamentVars, params :&TournamentParams, query :&Query) -> Result<()> {
    query.validate(params)?;
    if query.needs_results() && vars.results().is_none() {
        return Err(Error::query(format!("'{}' needs win and score variables", query)));
    }

    let constraints_before = model.num_constraints();
    info!("Encoding query: {}", query);

    match *query {
        Query::Generate { .. } => {}
        Query::Champion { champion, score, ties } => {
            encode_champion(model, vars, champion, score, ties)?;
        }
        Query::SecureChampionship { champion, score, day, ties } => {
            encode_champion(model, vars, champion, score, ties)?;
            encode_secure(model, vars, champion, day, ties)?;
        }
        Query::OptimizeTieSize { champion, score, secure_day, direction } => {
            encode_champion(model, vars, champion, Some(score), TieMode::IncludeTies)?;
            if let Some(day) = secure_day {
                encode_secure(model, vars, champion, day, TieMode::IncludeTies)?;
            }
            encode_tie_objective(model, vars, params, champion, score, direction)?;
        }
        Query::OptimizeScoreCount { lower, upper, day, direction } => {
            encode_score_count_objective(model, vars, params, lower, upper, day, direction)?;
        }
    }

    info!("Query: {} constraints, objective {}", model.num_constraints() - constraints_before,
          if model.objective().is_some() { "set" } else { "none" });
    Ok(())
}

fn final_score(vars :&TournamentVars, i :Rikishi) -> Result<Var> {
    let results = vars.results().ok_or_else(|| Error::query("model was built without win and score variables"))?;
    Ok(results.score(vars.d - 1, i))
}

fn score_on(vars :&TournamentVars, day :Day, i :Rikishi) -> Result<Var> {
    let results = vars.results().ok_or_else(|| Error::query("model was built without win and score variables"))?;
    Ok(results.score(day, i))
}

/// Everyone else finishes at or below the champion (strictly below when ties
/// are excluded); the champion's final score is fixed if given.
pub fn encode_champion(model :&mut Model, vars :&TournamentVars, champion :Rikishi, score :Option<usize>, ties :TieMode) -> Result<()> {
    let champ = final_score(vars, champion)?;
    for i in vars.wrestlers().filter(|i| *i != champion) {
        let other = final_score(vars, i)?;
        model.geq(format!("champion_over_{}", i), champ, other + ties.margin());
    }
    if let Some(score) = score {
        model.equal("champion_score", champ, score as i64);
    }
    Ok(())
}

/// Bouts `i` may still fight after `day`, i.e. on days `day+1 .. d`.
pub fn remaining_bouts(vars :&TournamentVars, day :Day, i :Rikishi) -> LinExpr {
    ((day + 1)..vars.d).flat_map(|e| vars.bouts_of(e, i)).sum()
}

/// On `day` the championship is mathematically decided: every rival's score
/// that day plus all bouts they still have left stays at or below the
/// champion's score that day (strictly below when ties are excluded).
pub fn encode_secure(model :&mut Model, vars :&TournamentVars, champion :Rikishi, day :Day, ties :TieMode) -> Result<()> {
    let champ = score_on(vars, day, champion)?;
    for i in vars.wrestlers().filter(|i| *i != champion) {
        let best_possible_score = score_on(vars, day, i)? + remaining_bouts(vars, day, i);
        model.geq(format!("secure_over_{}", i), champ, best_possible_score + ties.margin());
    }
    Ok(())
}

/// `l[i] = 1` iff rival i finishes below `score`. Rivals are already held to at
/// most `score`, so `sum(1 - l[i])` counts the rivals tied with the champion.
fn encode_tie_objective(model :&mut Model,
                        vars :&TournamentVars,
                        params :&TournamentParams,
                        champion :Rikishi,
                        score :usize,
                        direction :Direction) -> Result<()> {
    let mut ties = LinExpr::zero();
    for i in vars.wrestlers().filter(|i| *i != champion) {
        let below = lt_const(model, &format!("below_champion_{}", i), final_score(vars, i)?, score as i64, params.m as i64);
        ties = ties + (LinExpr::from(1) - below);
    }
    model.set_objective(direction, ties);
    Ok(())
}

/// Per wrestler `hi = [s <= upper]` and `lo = [s < lower]`; `(1 - lo) + hi - 1`
/// is 1 exactly when `lower <= s <= upper`.
fn encode_score_count_objective(model :&mut Model,
                                vars :&TournamentVars,
                                params :&TournamentParams,
                                lower :usize,
                                upper :usize,
                                day :Day,
                                direction :Direction) -> Result<()> {
    let m = params.m as i64;
    let mut in_range = LinExpr::zero();
    for i in vars.wrestlers() {
        let s = score_on(vars, day, i)?;
        let hi = lt_const(model, &format!("at_most_upper_{}", i), s, upper as i64 + 1, m);
        let lo = lt_const(model, &format!("below_lower_{}", i), s, lower as i64, m);
        in_range = in_range + (LinExpr::from(1) - lo) + hi - 1;
    }
    model.set_objective(direction, in_range);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::base::encode_base;
    use crate::model::Assignment;
    use crate::params::ForbiddenPairs;
    use crate::score::encode_results;
    use crate::vars::allocate;

    fn params() -> TournamentParams {
        TournamentParams::new(4, 3, 2, 2, 3)
    }

    fn setup(query :&Query) -> Result<(Model, TournamentVars)> {
        let mut model = Model::new();
        let vars = allocate(&mut model, &params(), query.needs_results())?;
        encode_base(&mut model, &vars, &params(), &ForbiddenPairs::new(), &[])?;
        if query.needs_results() {
            encode_results(&mut model, &vars)?;
        }
        encode_query(&mut model, &vars, &params(), query)?;
        Ok((model, vars))
    }

    /// Round robin {0-1, 2-3}, {0-2, 1-3}, {0-3, 1-2} with the given winners,
    /// and the matching running scores.
    fn played(model :&Model, vars :&TournamentVars, winners :&[[Rikishi; 2]; 3]) -> Assignment {
        let results = vars.results().unwrap();
        let days = [[(0, 1), (2, 3)], [(0, 2), (1, 3)], [(0, 3), (1, 2)]];
        let mut a = Assignment::zeros(model);
        let mut score = [0i64; 4];
        for day in 0..3 {
            for (k, (i, j)) in days[day].iter().copied().enumerate() {
                a.set(vars.bout(day, i, j), 1);
                if winners[day][k] == i {
                    a.set(results.win(day, i, j), 1);
                }
                score[winners[day][k]] += 1;
            }
            for w in 0..4 {
                a.set(results.score(day, w), score[w]);
            }
        }
        a
    }

    /// Sets every auxiliary (indicator) variable to the value its own constraints force.
    fn settle_indicators(model :&Model, a :&mut Assignment, first_aux :usize) {
        for v in model.all_vars().skip(first_aux) {
            let touching = |a :&Assignment| model.constraints().iter()
                .filter(|c| c.lhs.terms().iter().any(|(t, _)| *t == v))
                .all(|c| c.holds(a));
            a.set(v, 0);
            if !touching(&*a) {
                a.set(v, 1);
            }
        }
    }

    // Final scores 3, 2, 1, 0.
    const FAVOURITES :[[Rikishi; 2]; 3] = [[0, 2], [0, 1], [0, 1]];
    // Final scores 2, 2, 2, 0: 0 beats 1 and 3, loses to 2.
    const THREE_WAY :[[Rikishi; 2]; 3] = [[0, 2], [2, 1], [0, 1]];

    #[test]
    fn generate_adds_nothing() {
        let (model, _) = setup(&Query::Generate { include_scores: false }).unwrap();
        let mut base = Model::new();
        let vars = allocate(&mut base, &params(), false).unwrap();
        encode_base(&mut base, &vars, &params(), &ForbiddenPairs::new(), &[]).unwrap();
        assert_eq!(model, base);
        assert!(model.objective().is_none());
    }

    #[test]
    fn outright_champion() {
        let q = Query::Champion { champion: 0, score: Some(3), ties: TieMode::ExcludeTies };
        let (model, vars) = setup(&q).unwrap();
        assert!(model.check(&played(&model, &vars, &FAVOURITES)));

        let q = Query::Champion { champion: 0, score: Some(2), ties: TieMode::ExcludeTies };
        let (model, vars) = setup(&q).unwrap();
        assert!(!model.check(&played(&model, &vars, &THREE_WAY)));

        let q = Query::Champion { champion: 0, score: Some(2), ties: TieMode::IncludeTies };
        let (model, vars) = setup(&q).unwrap();
        assert!(model.check(&played(&model, &vars, &THREE_WAY)));
    }

    #[test]
    fn champion_without_score_only_orders() {
        let q = Query::Champion { champion: 1, score: None, ties: TieMode::IncludeTies };
        let (model, vars) = setup(&q).unwrap();
        assert!(!model.check(&played(&model, &vars, &FAVOURITES)));
        assert!(model.constraints().iter().all(|c| c.name != "champion_score"));
    }

    #[test]
    fn secure_championship_bounds_rivals_by_remaining_bouts() {
        // After day 1: 0 has 2 wins, 1 and 2 have 1 win and 1 bout left, 3 has none.
        let q = Query::SecureChampionship { champion: 0, score: Some(3), day: 1, ties: TieMode::IncludeTies };
        let (model, vars) = setup(&q).unwrap();
        assert!(model.check(&played(&model, &vars, &FAVOURITES)));

        let q = Query::SecureChampionship { champion: 0, score: Some(3), day: 1, ties: TieMode::ExcludeTies };
        let (model, vars) = setup(&q).unwrap();
        let a = played(&model, &vars, &FAVOURITES);
        assert_eq!(model.violations(&a).map(|c| c.name.as_str()).collect::<Vec<_>>(), vec!["secure_over_1", "secure_over_2"]);

        // After day 0 wrestler 2 has 1 win and 2 bouts left.
        let q = Query::SecureChampionship { champion: 0, score: Some(3), day: 0, ties: TieMode::IncludeTies };
        let (model, vars) = setup(&q).unwrap();
        assert!(!model.check(&played(&model, &vars, &FAVOURITES)));
    }

    #[test]
    fn remaining_bouts_cover_only_later_days() {
        let q = Query::Generate { include_scores: false };
        let (model, vars) = setup(&q).unwrap();
        let mut a = Assignment::zeros(&model);
        for day in 0..3 {
            a.set(vars.bout(day, 0, day + 1), 1);
        }
        assert_eq!(remaining_bouts(&vars, 0, 0).eval(&a), 2);
        assert_eq!(remaining_bouts(&vars, 2, 0).eval(&a), 0);
        assert_eq!(remaining_bouts(&vars, 0, 3).eval(&a), 1);
    }

    #[test]
    fn tie_objective_counts_rivals_on_the_champions_score() {
        let q = Query::OptimizeTieSize { champion: 0, score: 2, secure_day: None, direction: Direction::Maximize };
        let (model, vars) = setup(&q).unwrap();
        let first_aux = vars.n * (vars.n - 1) / 2 * vars.d * 2 + vars.n * vars.d;
        let mut a = played(&model, &vars, &THREE_WAY);
        settle_indicators(&model, &mut a, first_aux);
        assert!(model.check(&a));
        let objective = model.objective().unwrap();
        assert_eq!(objective.direction, Direction::Maximize);
        assert_eq!(objective.expr.eval(&a), 2);
    }

    #[test]
    fn tie_objective_with_secure_day_keeps_both_parts() {
        let q = Query::OptimizeTieSize { champion: 0, score: 3, secure_day: Some(1), direction: Direction::Minimize };
        let (model, vars) = setup(&q).unwrap();
        let names = model.constraints().iter().map(|c| c.name.as_str()).collect::<Vec<_>>();
        for i in 1..4 {
            assert!(names.contains(&format!("secure_over_{}", i).as_str()), "{:?}", names);
            assert!(names.contains(&format!("below_champion_{}_below", i).as_str()), "{:?}", names);
        }
        assert!(names.contains(&"champion_score"));
        let objective = model.objective().unwrap();
        assert_eq!(objective.direction, Direction::Minimize);

        let first_aux = vars.n * (vars.n - 1) / 2 * vars.d * 2 + vars.n * vars.d;
        let mut a = played(&model, &vars, &FAVOURITES);
        settle_indicators(&model, &mut a, first_aux);
        assert!(model.check(&a));
        assert_eq!(objective.expr.eval(&a), 0);

        // Three-way tie on 2, but after day 1 wrestler 2 leads and 1 can still catch up.
        let q = Query::OptimizeTieSize { champion: 0, score: 2, secure_day: Some(1), direction: Direction::Maximize };
        let (model, vars) = setup(&q).unwrap();
        let mut a = played(&model, &vars, &THREE_WAY);
        settle_indicators(&model, &mut a, first_aux);
        assert_eq!(model.objective().unwrap().expr.eval(&a), 2);
        let broken = model.violations(&a).map(|c| c.name.as_str()).collect::<Vec<_>>();
        assert_eq!(broken, vec!["secure_over_1", "secure_over_2"]);
    }

    #[test]
    fn score_count_objective_counts_wrestlers_in_range() {
        let q = Query::OptimizeScoreCount { lower: 1, upper: 2, day: 2, direction: Direction::Minimize };
        let (model, vars) = setup(&q).unwrap();
        let first_aux = vars.n * (vars.n - 1) / 2 * vars.d * 2 + vars.n * vars.d;

        let mut a = played(&model, &vars, &FAVOURITES);
        settle_indicators(&model, &mut a, first_aux);
        assert!(model.check(&a));
        assert_eq!(model.objective().unwrap().expr.eval(&a), 2);

        let mut a = played(&model, &vars, &THREE_WAY);
        settle_indicators(&model, &mut a, first_aux);
        assert_eq!(model.objective().unwrap().expr.eval(&a), 3);
    }

    #[test]
    fn out_of_range_queries_are_rejected() {
        let p = params();
        let bad = vec![
            Query::Champion { champion: 4, score: None, ties: TieMode::IncludeTies },
            Query::Champion { champion: 0, score: Some(4), ties: TieMode::IncludeTies },
            Query::SecureChampionship { champion: 0, score: Some(3), day: 3, ties: TieMode::IncludeTies },
            Query::OptimizeTieSize { champion: 0, score: 3, secure_day: Some(7), direction: Direction::Maximize },
            Query::OptimizeScoreCount { lower: 2, upper: 1, day: 0, direction: Direction::Maximize },
            Query::OptimizeScoreCount { lower: 0, upper: 4, day: 0, direction: Direction::Maximize },
        ];
        for q in bad {
            assert!(matches!(q.validate(&p), Err(Error::InvalidQuery { .. })), "{}", q);
        }
        let q = Query::Champion { champion: 0, score: Some(0), ties: TieMode::ExcludeTies };
        assert!(matches!(q.validate(&p), Err(Error::InfeasibleByConstruction { .. })));
    }

    #[test]
    fn rejected_query_leaves_base_model_untouched() {
        let mut model = Model::new();
        let vars = allocate(&mut model, &params(), true).unwrap();
        encode_base(&mut model, &vars, &params(), &ForbiddenPairs::new(), &[]).unwrap();
        encode_results(&mut model, &vars).unwrap();
        let before = model.clone();
        let q = Query::OptimizeScoreCount { lower: 0, upper: 1, day: 9, direction: Direction::Maximize };
        assert!(encode_query(&mut model, &vars, &params(), &q).is_err());
        assert_eq!(model, before);
    }

    #[test]
    fn champion_request_resolution() {
        let p = params();
        let req = ChampionRequest { champion: 1, ..Default::default() };
        assert_eq!(req.into_query(&p).unwrap(), Query::Champion { champion: 1, score: Some(3), ties: TieMode::IncludeTies });

        let req = ChampionRequest { champion: 1, score: Some(2), secure_day: Some(1), no_ties: true, tie_objective: None };
        assert_eq!(req.into_query(&p).unwrap(),
                   Query::SecureChampionship { champion: 1, score: Some(2), day: 1, ties: TieMode::ExcludeTies });

        let req = ChampionRequest { champion: 0, score: Some(2), secure_day: None, no_ties: false, tie_objective: Some(Direction::Minimize) };
        assert_eq!(req.into_query(&p).unwrap(),
                   Query::OptimizeTieSize { champion: 0, score: 2, secure_day: None, direction: Direction::Minimize });

        let req = ChampionRequest { champion: 0, score: None, secure_day: None, no_ties: true, tie_objective: Some(Direction::Maximize) };
        assert!(matches!(req.into_query(&p), Err(Error::ConflictingQuery { .. })));

        let req = ChampionRequest { champion: 9, ..Default::default() };
        assert!(matches!(req.into_query(&p), Err(Error::InvalidQuery { .. })));
    }

    #[test]
    fn query_needing_results_on_bouts_only_model_fails() {
        let mut model = Model::new();
        let vars = allocate(&mut model, &params(), false).unwrap();
        let q = Query::Champion { champion: 0, score: None, ties: TieMode::IncludeTies };
        assert!(encode_query(&mut model, &vars, &params(), &q).is_err());
    }
}
