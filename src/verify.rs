//! Re-checks an extracted schedule against the tournament rules, without
//! looking at the model it came from.

use std::collections::HashMap;

use log::*;

use crate::params::{Day, ForbiddenPairs, Rikishi, TournamentParams};
use crate::query::{Query, TieMode};
use crate::schedule::Schedule;

/// Every rule of the base schedule and, if winners are known, of the score
/// table. Returns a description of each broken rule; empty means valid.
pub fn verify_schedule(schedule :&Schedule,
                       params :&TournamentParams,
                       forbidden :&ForbiddenPairs,
                       reserved :&[(Rikishi, Rikishi)]) -> Vec<String> {
    let mut problems = Vec::new();
    let n = params.n;

    if schedule.num_days() != params.d {
        problems.push(format!("schedule has {} days, expected {}", schedule.num_days(), params.d));
        return problems;
    }

    let mut met :HashMap<(Rikishi, Rikishi), Vec<Day>> = HashMap::new();
    for (day, bouts) in schedule.days.iter().enumerate() {
        if bouts.len() < params.lb || bouts.len() > params.ub {
            problems.push(format!("day {} has {} bouts, expected {}..={}", day, bouts.len(), params.lb, params.ub));
        }

        let mut fights = vec![0; n];
        for b in bouts {
            if b.first >= b.second || b.second >= n {
                problems.push(format!("day {} has invalid bout {}-{}", day, b.first, b.second));
                continue;
            }
            fights[b.first] += 1;
            fights[b.second] += 1;
            met.entry((b.first, b.second)).or_default().push(day);

            if forbidden.contains(b.first, b.second) {
                problems.push(format!("forbidden pairing {}-{} fights on day {}", b.first, b.second, day));
            }
            if let Some(w) = b.winner {
                if !b.involves(w) {
                    problems.push(format!("winner {} of bout {}-{} on day {} did not fight", w, b.first, b.second, day));
                }
            }
        }

        for (i, f) in fights.iter().enumerate() {
            if *f > 1 {
                problems.push(format!("on day {}, {} fights {} bouts", day, i, f));
            } else if params.is_compact() && *f == 0 {
                problems.push(format!("on day {}, {} does not fight", day, i));
            }
        }
    }

    for ((i, j), days) in met.iter() {
        if days.len() > 1 {
            problems.push(format!("{}-{} meet {} times, on days {:?}", i, j, days.len(), days));
        }
    }

    for i in 0..n {
        let total = schedule.bouts_of(i).count();
        if total != params.m {
            problems.push(format!("{} fights {} bouts, expected {}", i, total, params.m));
        }
    }

    for (i, j) in reserved.iter().map(|(i, j)| crate::params::pair(*i, *j)) {
        match met.get(&(i, j)).map(|d| d.as_slice()) {
            Some([day]) if *day == params.last_day() => {}
            Some(days) => problems.push(format!("reserved pairing {}-{} fights on days {:?}, not only the last", i, j, days)),
            None => problems.push(format!("reserved pairing {}-{} never fights", i, j)),
        }
    }

    if let Some(scores) = schedule.scores.as_ref() {
        for i in 0..n {
            for day in 0..params.d {
                let recount = schedule.wins(i, day);
                if scores[i][day] != recount {
                    problems.push(format!("{} has score {} on day {} but won {} bouts", i, scores[i][day], day, recount));
                }
            }
        }
    }

    for p in problems.iter() {
        warn!("Schedule check: {}", p);
    }
    problems
}

/// Checks the property a query asks for. Generate queries have none.
pub fn verify_query(schedule :&Schedule, query :&Query) -> Vec<String> {
    let problems = match *query {
        Query::Generate { include_scores } => {
            if include_scores && schedule.scores.is_none() {
                vec!["schedule has no scores".to_string()]
            } else {
                Vec::new()
            }
        }
        Query::Champion { champion, score, ties } => check_champion(schedule, champion, score, ties),
        Query::SecureChampionship { champion, score, day, ties } => {
            let mut p = check_champion(schedule, champion, score, ties);
            p.extend(check_secure(schedule, champion, day, ties));
            p
        }
        Query::OptimizeTieSize { champion, score, secure_day, .. } => {
            let mut p = check_champion(schedule, champion, Some(score), TieMode::IncludeTies);
            if let Some(day) = secure_day {
                p.extend(check_secure(schedule, champion, day, TieMode::IncludeTies));
            }
            p
        }
        Query::OptimizeScoreCount { .. } => {
            if schedule.scores.is_none() {
                vec!["schedule has no scores".to_string()]
            } else {
                Vec::new()
            }
        }
    };
    for p in problems.iter() {
        warn!("Query check: {}", p);
    }
    problems
}

/// The champion's final score is at least everyone else's (strictly more
/// when ties are excluded), and equals `score` if given.
pub fn check_champion(schedule :&Schedule, champion :Rikishi, score :Option<usize>, ties :TieMode) -> Vec<String> {
    let champ = match schedule.final_score(champion) {
        Some(s) => s,
        None => return vec!["schedule has no scores".to_string()],
    };
    let mut problems = Vec::new();
    if let Some(score) = score {
        if champ != score {
            problems.push(format!("champion {} finishes on {}, expected {}", champion, champ, score));
        }
    }
    for i in (0..schedule.n).filter(|i| *i != champion) {
        let other = schedule.final_score(i).unwrap_or(0);
        if champ < other + ties.margin() as usize {
            problems.push(format!("{} finishes on {} against champion {} on {} ({:?})", i, other, champion, champ, ties));
        }
    }
    problems
}

/// On `day` no rival can reach the champion's score of that day, even by
/// winning every bout they have left.
pub fn check_secure(schedule :&Schedule, champion :Rikishi, day :Day, ties :TieMode) -> Vec<String> {
    let champ = match schedule.score(champion, day) {
        Some(s) => s,
        None => return vec!["schedule has no scores".to_string()],
    };
    let mut problems = Vec::new();
    for i in (0..schedule.n).filter(|i| *i != champion) {
        let remaining = schedule.bouts_of(i).filter(|(d, _)| *d > day).count();
        let best = schedule.score(i, day).unwrap_or(0) + remaining;
        if champ < best + ties.margin() as usize {
            problems.push(format!("after day {}, {} can still reach {} against champion {} on {}", day, i, best, champion, champ));
        }
    }
    problems
}

/// Objective value of the query recomputed from the schedule itself.
pub fn objective_value(schedule :&Schedule, query :&Query) -> Option<i64> {
    match *query {
        Query::OptimizeTieSize { champion, score, .. } => Some(
            (0..schedule.n)
                .filter(|i| *i != champion && schedule.final_score(*i) == Some(score))
                .count() as i64),
        Query::OptimizeScoreCount { lower, upper, day, .. } => Some(
            (0..schedule.n)
                .filter(|i| schedule.score(*i, day).map(|s| lower <= s && s <= upper).unwrap_or(false))
                .count() as i64),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Direction;
    use crate::schedule::Bout;

    fn params() -> TournamentParams {
        TournamentParams::new(4, 3, 2, 2, 3)
    }

    /// Round robin where the lower index always wins: final scores 3, 2, 1, 0.
    fn favourites() -> Schedule {
        let days = vec![vec![(2, 3), (0, 1)], vec![(1, 3), (0, 2)], vec![(1, 2), (0, 3)]];
        let days = days.into_iter()
            .map(|bouts| bouts.into_iter().map(|(i, j)| Bout { first: i, second: j, winner: Some(i) }).collect())
            .collect();
        let scores = vec![vec![1, 2, 3], vec![0, 1, 2], vec![1, 1, 1], vec![0, 0, 0]];
        Schedule { n: 4, days, scores: Some(scores) }
    }

    #[test]
    fn valid_schedule_has_no_problems() {
        assert!(verify_schedule(&favourites(), &params(), &ForbiddenPairs::new(), &[]).is_empty());
        assert!(verify_schedule(&favourites(), &params(), &ForbiddenPairs::new(), &[(0, 3)]).is_empty());
    }

    #[test]
    fn broken_rules_are_reported() {
        let mut s = favourites();
        s.days[2][1] = Bout { first: 0, second: 1, winner: Some(0) };
        let problems = verify_schedule(&s, &params(), &ForbiddenPairs::new(), &[]);
        assert!(problems.iter().any(|p| p.contains("0-1 meet 2 times")));

        let forbidden = vec![(1, 2)].into_iter().collect::<ForbiddenPairs>();
        let problems = verify_schedule(&favourites(), &params(), &forbidden, &[(0, 1)]);
        assert!(problems.iter().any(|p| p.contains("forbidden pairing 1-2")));
        assert!(problems.iter().any(|p| p.contains("reserved pairing 0-1")));

        let mut s = favourites();
        s.scores.as_mut().unwrap()[3][2] = 1;
        let problems = verify_schedule(&s, &params(), &ForbiddenPairs::new(), &[]);
        assert_eq!(problems, vec!["3 has score 1 on day 2 but won 0 bouts".to_string()]);
    }

    #[test]
    fn missing_bouts_are_reported() {
        let mut s = favourites();
        s.days[0].pop();
        let problems = verify_schedule(&s, &params(), &ForbiddenPairs::new(), &[]);
        assert!(problems.iter().any(|p| p.contains("day 0 has 1 bouts")));
        assert!(problems.iter().any(|p| p.contains("0 fights 2 bouts, expected 3")));
    }

    #[test]
    fn champion_and_secure_checks() {
        let s = favourites();
        assert!(check_champion(&s, 0, Some(3), TieMode::ExcludeTies).is_empty());
        assert_eq!(check_champion(&s, 1, None, TieMode::IncludeTies).len(), 1);
        // After day 1: 0 has 2, wrestler 1 has 1 win and 1 bout left.
        assert!(check_secure(&s, 0, 1, TieMode::IncludeTies).is_empty());
        assert_eq!(check_secure(&s, 0, 1, TieMode::ExcludeTies).len(), 2);
        assert!(!check_secure(&s, 0, 0, TieMode::IncludeTies).is_empty());
    }

    #[test]
    fn objective_is_recomputed() {
        let s = favourites();
        let q = Query::OptimizeScoreCount { lower: 1, upper: 2, day: 2, direction: Direction::Maximize };
        assert_eq!(objective_value(&s, &q), Some(2));
        let q = Query::OptimizeTieSize { champion: 0, score: 3, secure_day: None, direction: Direction::Minimize };
        assert_eq!(objective_value(&s, &q), Some(0));
        assert!(verify_query(&s, &q).is_empty());
        assert_eq!(objective_value(&s, &Query::Generate { include_scores: true }), None);
    }
}
