//! Names file and conflicts file.
//!
//! Names: a JSON list of one `[name, rank, isEast]` triple per wrestler, in
//! banzuke order. Conflicts: a JSON list of one list per wrestler `i`, holding
//! the indices `j > i` that `i` must never be paired with.

use std::path::Path;

use log::*;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::params::{ForbiddenPairs, Rikishi};

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "(String, String, bool)")]
pub struct Entry {
    pub name :String,
    pub rank :String,
    pub east :bool,
}

impl From<(String, String, bool)> for Entry {
    fn from((name, rank, east) :(String, String, bool)) -> Self {
        Entry { name, rank, east }
    }
}

impl Entry {
    /// Banzuke form, e.g. `YE Terunofuji`.
    pub fn display_name(&self) -> String {
        format!("{}{} {}", self.rank, if self.east { "E" } else { "W" }, self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Roster {
    pub entries :Vec<Entry>,
}

impl Roster {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, i :Rikishi) -> Option<&Entry> {
        self.entries.get(i)
    }
}

fn read_json<T :serde::de::DeserializeOwned>(path :&Path) -> Result<T> {
    let display = path.display().to_string();
    let contents = std::fs::read_to_string(path).map_err(|source| Error::Io { path: display.clone(), source })?;
    serde_json::from_str(&contents).map_err(|source| Error::Json { path: display, source })
}

pub fn roster_from_entries(entries :Vec<Entry>, n :usize) -> std::result::Result<Roster, String> {
    check_len("names", entries.len(), n)?;
    Ok(Roster { entries })
}

pub fn load_names(path :&Path, n :usize) -> Result<Roster> {
    info!("Loading names from {:?}", path);
    let entries :Vec<Entry> = read_json(path)?;
    roster_from_entries(entries, n).map_err(Error::params)
}

pub fn conflicts_from_lists(lists :&[Vec<Rikishi>], n :usize) -> std::result::Result<ForbiddenPairs, String> {
    check_len("conflict lists", lists.len(), n)?;
    let mut forbidden = ForbiddenPairs::new();
    for (i, list) in lists.iter().enumerate() {
        for j in list.iter().copied() {
            if j <= i {
                return Err(format!("conflict {} listed for {} must have a higher index", j, i));
            }
            if j >= n {
                return Err(format!("conflict {} listed for {} is out of range", j, i));
            }
            if forbidden.contains(i, j) {
                return Err(format!("conflict {}-{} listed twice", i, j));
            }
            forbidden.insert(i, j).map_err(|e| e.to_string())?;
        }
    }
    Ok(forbidden)
}

pub fn load_conflicts(path :&Path, n :usize) -> Result<ForbiddenPairs> {
    info!("Loading conflicts from {:?}", path);
    let lists :Vec<Vec<Rikishi>> = read_json(path)?;
    let forbidden = conflicts_from_lists(&lists, n).map_err(Error::params)?;
    info!("Loaded {} forbidden pairings", forbidden.len());
    Ok(forbidden)
}

fn check_len(what :&str, len :usize, n :usize) -> std::result::Result<(), String> {
    if len != n {
        return Err(format!("{} must have {} entries, got {}", what, n, len));
    }
    Ok(())
}
