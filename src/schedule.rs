//! Reading a solved assignment back into a day-by-day schedule.

use crate::model::Assignment;
use crate::params::{Day, Rikishi};
use crate::vars::TournamentVars;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bout {
    /// The higher ranked (lower index) wrestler.
    pub first :Rikishi,
    pub second :Rikishi,
    /// Known only if results were modeled.
    pub winner :Option<Rikishi>,
}

impl Bout {
    pub fn involves(&self, i :Rikishi) -> bool {
        self.first == i || self.second == i
    }

    pub fn loser(&self) -> Option<Rikishi> {
        self.winner.map(|w| if w == self.first { self.second } else { self.first })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule {
    pub n :usize,
    /// Bouts per day, the highest ranked pairings last.
    pub days :Vec<Vec<Bout>>,
    /// `scores[i][d]`, wins of i up to and including day d.
    pub scores :Option<Vec<Vec<usize>>>,
}

/// Collects the bouts that happened and, if modeled, their winners and the
/// score table. The assignment is taken as is; see [`crate::verify`] for an
/// independent check.
pub fn extract(vars :&TournamentVars, assignment :&Assignment) -> Schedule {
    let results = vars.results();

    let days = vars.days().map(|day| {
        let mut bouts = vars.pairs()
            .filter(|(i, j)| assignment.is_one(vars.bout(day, *i, *j)))
            .map(|(i, j)| {
                let winner = results.map(|r| if assignment.is_one(r.win(day, i, j)) { i } else { j });
                Bout { first: i, second: j, winner }
            })
            .collect::<Vec<_>>();
        // Torikumi list the top ranked bouts last.
        bouts.sort_by_key(|b| std::cmp::Reverse((b.first, b.second)));
        bouts
    }).collect();

    let scores = results.map(|r| {
        vars.wrestlers().map(|i| {
            vars.days().map(|day| assignment.value(r.score(day, i)).max(0) as usize).collect()
        }).collect()
    });

    Schedule { n: vars.n, days, scores }
}

impl Schedule {
    pub fn num_days(&self) -> usize {
        self.days.len()
    }

    pub fn bouts_on(&self, day :Day) -> &[Bout] {
        &self.days[day]
    }

    /// Day and bout for every bout `i` fights, in day order.
    pub fn bouts_of(&self, i :Rikishi) -> impl Iterator<Item = (Day, &Bout)> + '_ {
        self.days.iter().enumerate()
            .flat_map(move |(day, bouts)| bouts.iter().filter(move |b| b.involves(i)).map(move |b| (day, b)))
    }

    pub fn score(&self, i :Rikishi, day :Day) -> Option<usize> {
        self.scores.as_ref().map(|s| s[i][day])
    }

    pub fn final_score(&self, i :Rikishi) -> Option<usize> {
        self.score(i, self.num_days() - 1)
    }

    /// Bouts lost by `i` up to and including `day`.
    pub fn losses(&self, i :Rikishi, day :Day) -> usize {
        self.bouts_of(i).filter(|(d, b)| *d <= day && b.loser() == Some(i)).count()
    }

    /// Wins recounted from the bout winners, independent of the score table.
    pub fn wins(&self, i :Rikishi, day :Day) -> usize {
        self.bouts_of(i).filter(|(d, b)| *d <= day && b.winner == Some(i)).count()
    }

    /// Wrestlers on the best final score, and that score.
    pub fn leaders(&self) -> Option<(usize, Vec<Rikishi>)> {
        let best = (0..self.n).filter_map(|i| self.final_score(i)).max()?;
        Some((best, (0..self.n).filter(|i| self.final_score(*i) == Some(best)).collect()))
    }
}
