//! Decision variables of a tournament model.
//!
//! `bout[(d, (i, j))]` is 1 iff i and j meet on day d, `win[(d, (i, j))]` is 1 iff
//! that bout happened and i won it, `score[(d, i)]` is the number of wins of i
//! up to and including day d. Pairs are always stored with `i < j`, so there is
//! exactly one bout and one win variable per unordered pair and day.

use std::collections::HashMap;

use log::*;

use crate::error::{Error, Result};
use crate::model::{LinExpr, Model, Var};
use crate::params::{pair, Day, Rikishi, TournamentParams};

#[derive(Debug, Clone)]
pub struct ResultVars {
    pub win :HashMap<(Day, (Rikishi, Rikishi)), Var>,
    pub score :HashMap<(Day, Rikishi), Var>,
}

#[derive(Debug, Clone)]
pub struct TournamentVars {
    pub n :usize,
    pub d :usize,
    pub bout :HashMap<(Day, (Rikishi, Rikishi)), Var>,
    pub results :Option<ResultVars>,
}

/// Creates the bout variables for `params`, and the win/score variables when
/// `with_results` is set. Variables are created in a fixed order so identical
/// inputs always give an identical model.
pub fn allocate(model :&mut Model, params :&TournamentParams, with_results :bool) -> Result<TournamentVars> {
    let (n, d) = (params.n, params.d);
    if n < 2 || n % 2 != 0 {
        return Err(Error::params(format!("must have an even number of at least two wrestlers, got {}", n)));
    }

    let mut bout = HashMap::with_capacity(params.num_pairs() * d);
    for i in 0..n {
        for j in (i + 1)..n {
            for day in 0..d {
                bout.insert((day, (i, j)), model.binary(format!("f_{}_{}_{}", i, j, day)));
            }
        }
    }

    let results = if with_results {
        let mut win = HashMap::with_capacity(params.num_pairs() * d);
        for i in 0..n {
            for j in (i + 1)..n {
                for day in 0..d {
                    win.insert((day, (i, j)), model.binary(format!("w_{}_{}_{}", i, j, day)));
                }
            }
        }
        let mut score = HashMap::with_capacity(n * d);
        for i in 0..n {
            for day in 0..d {
                score.insert((day, i), model.integer(format!("s_{}_{}", i, day), 0, params.m as i64));
            }
        }
        Some(ResultVars { win, score })
    } else {
        None
    };

    info!("Allocated {} variables for {} wrestlers over {} days", model.num_vars(), n, d);
    Ok(TournamentVars { n, d, bout, results })
}

impl TournamentVars {
    /// Bout variable of the unordered pair `{i, j}` on `day`.
    pub fn bout(&self, day :Day, i :Rikishi, j :Rikishi) -> Var {
        self.bout[&(day, pair(i, j))]
    }

    /// All bout variables involving `i` on `day`, opponents in index order.
    pub fn bouts_of(&self, day :Day, i :Rikishi) -> impl Iterator<Item = Var> + '_ {
        (0..self.n).filter(move |j| *j != i).map(move |j| self.bout(day, i, j))
    }

    /// Number of bouts `i` fights on `day`, as an expression.
    pub fn fights_on(&self, day :Day, i :Rikishi) -> LinExpr {
        self.bouts_of(day, i).sum()
    }

    pub fn results(&self) -> Option<&ResultVars> {
        self.results.as_ref()
    }

    pub fn days(&self) -> std::ops::Range<Day> {
        0..self.d
    }

    pub fn wrestlers(&self) -> std::ops::Range<Rikishi> {
        0..self.n
    }

    /// All canonical pairs `(i, j)`, `i < j`, in allocation order.
    pub fn pairs(&self) -> impl Iterator<Item = (Rikishi, Rikishi)> {
        let n = self.n;
        (0..n).flat_map(move |i| ((i + 1)..n).map(move |j| (i, j)))
    }
}

impl ResultVars {
    pub fn win(&self, day :Day, i :Rikishi, j :Rikishi) -> Var {
        debug_assert!(i < j);
        self.win[&(day, (i, j))]
    }

    pub fn score(&self, day :Day, i :Rikishi) -> Var {
        self.score[&(day, i)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Domain;

    #[test]
    fn one_variable_per_unordered_pair_and_day() {
        let params = TournamentParams::new(6, 5, 3, 3, 5);
        let mut model = Model::new();
        let vars = allocate(&mut model, &params, true).unwrap();
        assert_eq!(vars.bout.len(), 15 * 5);
        let results = vars.results().unwrap();
        assert_eq!(results.win.len(), 15 * 5);
        assert_eq!(results.score.len(), 6 * 5);
        assert_eq!(model.num_vars(), 15 * 5 * 2 + 6 * 5);

        assert_eq!(vars.bout(2, 4, 1), vars.bout(2, 1, 4));
        assert_eq!(vars.bouts_of(0, 3).count(), 5);
        assert_eq!(model.var(results.score(4, 5)).domain, Domain::Integer { min: 0, max: 5 });
        assert_eq!(vars.pairs().count(), 15);
    }

    #[test]
    fn results_are_optional() {
        let params = TournamentParams::new(4, 3, 2, 2, 3);
        let mut model = Model::new();
        let vars = allocate(&mut model, &params, false).unwrap();
        assert!(vars.results().is_none());
        assert_eq!(model.num_vars(), 6 * 3);
    }

    #[test]
    fn odd_or_tiny_fields_are_rejected() {
        let mut model = Model::new();
        assert!(allocate(&mut model, &TournamentParams::new(5, 3, 2, 2, 3), true).is_err());
        assert!(allocate(&mut model, &TournamentParams::new(0, 3, 0, 0, 3), true).is_err());
        assert_eq!(model.num_vars(), 0);
    }

    #[test]
    fn allocation_is_deterministic() {
        let params = TournamentParams::new(6, 5, 3, 3, 5);
        let mut a = Model::new();
        let mut b = Model::new();
        allocate(&mut a, &params, true).unwrap();
        allocate(&mut b, &params, true).unwrap();
        assert_eq!(a, b);
    }
}
