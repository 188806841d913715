//! Tournament parameters and the forbidden-pairing set.

use std::collections::BTreeSet;

use crate::error::{Error, Result};

/// Index into the banzuke; lower index means higher rank.
pub type Rikishi = usize;
/// 0-based tournament day.
pub type Day = usize;

/// Canonical (smaller index first) form of an unordered pair.
pub fn pair(i :Rikishi, j :Rikishi) -> (Rikishi, Rikishi) {
    if i < j { (i, j) } else { (j, i) }
}

/// Constants describing one tournament.
///
/// `n` wrestlers over `d` days, each fighting `m` bouts in total, with between
/// `lb` and `ub` bouts held on every day. Defaults are the top division.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TournamentParams {
    pub n :usize,
    pub d :usize,
    pub lb :usize,
    pub ub :usize,
    pub m :usize,
}

impl Default for TournamentParams {
    fn default() -> Self {
        Self::makuuchi()
    }
}

impl TournamentParams {
    pub fn new(n :usize, d :usize, lb :usize, ub :usize, m :usize) -> Self {
        TournamentParams { n, d, lb, ub, m }
    }

    /// Top division: 42 wrestlers, 21 bouts every day, 15 bouts each.
    pub fn makuuchi() -> Self {
        Self::new(42, 15, 21, 21, 15)
    }

    /// Second division: 28 wrestlers, 14 bouts every day, 15 bouts each.
    pub fn juryo() -> Self {
        Self::new(28, 15, 14, 14, 15)
    }

    /// Third division: 120 wrestlers fighting 7 bouts each, 20-30 bouts a day.
    pub fn makushita() -> Self {
        Self::new(120, 15, 20, 30, 7)
    }

    pub fn num_pairs(&self) -> usize {
        self.n.saturating_mul(self.n.saturating_sub(1)) / 2
    }

    pub fn last_day(&self) -> Day {
        self.d - 1
    }

    /// True if every wrestler fights on every day.
    pub fn is_compact(&self) -> bool {
        self.m == self.d
    }

    /// Shape checks: malformed values that do not describe a tournament at all.
    pub fn validate(&self) -> Result<()> {
        if self.n < 2 {
            return Err(Error::params(format!("need at least two wrestlers, got {}", self.n)));
        }
        if self.n % 2 != 0 {
            return Err(Error::params(format!("must have an even number of wrestlers, got {}", self.n)));
        }
        if self.d == 0 {
            return Err(Error::params("tournament must last at least one day"));
        }
        if self.m == 0 {
            return Err(Error::params("each wrestler must fight at least one bout"));
        }
        // Every count derived below and in the encoding stays within these products.
        let sizes = [
            self.n.checked_mul(self.n - 1).and_then(|p| p.checked_mul(self.d)),
            self.n.checked_mul(self.m),
            self.lb.checked_mul(self.d),
            self.ub.checked_mul(self.d),
        ];
        if sizes.iter().any(Option::is_none) {
            return Err(Error::params(format!("parameters {:?} are too large to count bouts", self)));
        }
        Ok(())
    }

    /// Arithmetic checks for parameter combinations that no schedule can satisfy.
    /// Cheaper than letting the solver discover it.
    pub fn check_constructible(&self) -> Result<()> {
        self.validate()?;
        if self.lb > self.ub {
            return Err(Error::infeasible(format!("lower bound {} exceeds upper bound {} of bouts per day", self.lb, self.ub)));
        }
        if self.m > self.d {
            return Err(Error::infeasible(format!("{} bouts per wrestler do not fit in {} days", self.m, self.d)));
        }
        if self.m > self.n - 1 {
            return Err(Error::infeasible(format!("{} bouts per wrestler but only {} possible opponents", self.m, self.n - 1)));
        }
        if self.lb > self.n / 2 {
            return Err(Error::infeasible(format!("too many bouts per day ({}) for {} wrestlers", self.lb, self.n)));
        }
        if self.lb * self.d > self.num_pairs() {
            return Err(Error::infeasible("more bouts scheduled than the number of distinct matchups"));
        }
        let total = self.n * self.m / 2;
        if total < self.lb * self.d || total > self.ub * self.d {
            return Err(Error::infeasible(format!(
                "{} bouts in total cannot be spread over {} days with {}..={} per day",
                total, self.d, self.lb, self.ub)));
        }
        Ok(())
    }
}

/// Division presets selectable by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Division {
    Makuuchi,
    Juryo,
    Makushita,
}

impl Division {
    pub fn params(self) -> TournamentParams {
        match self {
            Division::Makuuchi => TournamentParams::makuuchi(),
            Division::Juryo => TournamentParams::juryo(),
            Division::Makushita => TournamentParams::makushita(),
        }
    }
}

impl std::str::FromStr for Division {
    type Err = String;
    fn from_str(s :&str) -> std::result::Result<Self, String> {
        match s.to_ascii_lowercase().as_str() {
            "makuuchi" => Ok(Division::Makuuchi),
            "juryo" => Ok(Division::Juryo),
            "makushita" => Ok(Division::Makushita),
            _ => Err(format!("unknown division '{}', expected makuuchi, juryo or makushita", s)),
        }
    }
}

/// Unordered pairs that may never be scheduled against each other
/// (stablemates, blood relatives).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ForbiddenPairs {
    pairs :BTreeSet<(Rikishi, Rikishi)>,
}

impl ForbiddenPairs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, i :Rikishi, j :Rikishi) -> Result<()> {
        if i == j {
            return Err(Error::params(format!("wrestler {} cannot be forbidden from fighting themselves", i)));
        }
        self.pairs.insert(pair(i, j));
        Ok(())
    }

    pub fn contains(&self, i :Rikishi, j :Rikishi) -> bool {
        self.pairs.contains(&pair(i, j))
    }

    pub fn iter(&self) -> impl Iterator<Item = (Rikishi, Rikishi)> + '_ {
        self.pairs.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn validate(&self, params :&TournamentParams) -> Result<()> {
        for (i, j) in self.iter() {
            if j >= params.n {
                return Err(Error::params(format!("forbidden pair ({}, {}) out of range for {} wrestlers", i, j, params.n)));
            }
        }
        Ok(())
    }
}

impl std::iter::FromIterator<(Rikishi, Rikishi)> for ForbiddenPairs {
    fn from_iter<I :IntoIterator<Item = (Rikishi, Rikishi)>>(iter :I) -> Self {
        ForbiddenPairs { pairs: iter.into_iter().filter(|(i, j)| i != j).map(|(i, j)| pair(i, j)).collect() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn divisions_by_name() {
        assert_eq!("Juryo".parse::<Division>().unwrap().params(), TournamentParams::juryo());
        assert_eq!("makushita".parse::<Division>().unwrap().params().m, 7);
        assert!("sandanme".parse::<Division>().is_err());
    }

    #[test]
    fn presets_are_constructible() {
        for p in vec![TournamentParams::makuuchi(), TournamentParams::juryo(), TournamentParams::makushita()] {
            p.check_constructible().unwrap();
        }
        assert_eq!(TournamentParams::default(), TournamentParams::makuuchi());
    }

    #[test]
    fn malformed_parameters_are_validation_errors() {
        for p in vec![
            TournamentParams::new(7, 5, 3, 3, 5),
            TournamentParams::new(0, 5, 0, 0, 1),
            TournamentParams::new(6, 0, 3, 3, 5),
            TournamentParams::new(6, 5, 3, 3, 0),
            TournamentParams::new(1 << 40, 15, 21, 21, 15),
            TournamentParams::new(6, 5, usize::MAX, usize::MAX, 5),
        ] {
            match p.check_constructible() {
                Err(Error::InvalidParams { .. }) => {}
                other => panic!("{:?} gave {:?}", p, other),
            }
        }
    }

    #[test]
    fn huge_parameters_do_not_overflow() {
        let p = TournamentParams::new(1 << 40, 15, 21, 21, 15);
        assert_eq!(p.num_pairs(), usize::MAX / 2);
        assert!(matches!(p.check_constructible(), Err(Error::InvalidParams { .. })));
        let p = TournamentParams::new(6, 1 << 62, 3, 3, 5);
        assert!(matches!(p.validate(), Err(Error::InvalidParams { .. })));
    }

    #[test]
    fn impossible_combinations_are_caught_before_encoding() {
        for p in vec![
            TournamentParams::new(6, 5, 3, 2, 5),  // lb > ub
            TournamentParams::new(6, 4, 3, 3, 5),  // m > d
            TournamentParams::new(6, 8, 2, 3, 6),  // m > n-1
            TournamentParams::new(6, 5, 4, 4, 5),  // lb > n/2
            TournamentParams::new(6, 5, 1, 2, 5),  // 15 bouts do not fit in 5 days of at most 2
        ] {
            match p.check_constructible() {
                Err(Error::InfeasibleByConstruction { .. }) => {}
                other => panic!("{:?} gave {:?}", p, other),
            }
        }
    }

    #[test]
    fn forbidden_pairs_are_unordered() {
        let mut f = ForbiddenPairs::new();
        f.insert(4, 1).unwrap();
        assert!(f.contains(1, 4));
        assert!(f.contains(4, 1));
        f.insert(1, 4).unwrap();
        assert_eq!(f.len(), 1);
        assert!(f.insert(2, 2).is_err());

        let params = TournamentParams::new(4, 3, 2, 2, 3);
        assert!(f.validate(&params).is_err());
        let ok :ForbiddenPairs = vec![(0, 1), (3, 2)].into_iter().collect();
        ok.validate(&params).unwrap();
    }
}
