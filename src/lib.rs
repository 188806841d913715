//! Sumo tournament schedules (torikumi) as integer linear programs.
//!
//! A [`Query`](query::Query) is encoded into an explicit [`Model`](model::Model)
//! on top of the base scheduling rules, solved by a [`Solver`](solver::Solver)
//! backend, and read back into a [`Schedule`](schedule::Schedule).

pub mod base;
pub mod encoding;
pub mod error;
pub mod lp;
pub mod model;
pub mod params;
pub mod query;
pub mod render;
pub mod roster;
pub mod schedule;
pub mod score;
pub mod solver;
pub mod threshold;
pub mod vars;
pub mod verify;

pub use encoding::{encode, solve_encoding, Encoding, Outcome};
pub use error::{Error, Result};
pub use params::{ForbiddenPairs, TournamentParams};
pub use query::{ChampionRequest, Query, TieMode};
pub use solver::{HighsSolver, SolveStatus, Solver};
