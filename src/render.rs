//! Markdown torikumi.

use std::fmt::Write;

use crate::params::Rikishi;
use crate::roster::Roster;
use crate::schedule::{Bout, Schedule};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    pub unicode :bool,
    /// Bouts per wrestler, used to emphasize winning records.
    pub m :usize,
}

struct Renderer<'a> {
    schedule :&'a Schedule,
    roster :Option<&'a Roster>,
    options :RenderOptions,
}

impl<'a> Renderer<'a> {
    fn name(&self, i :Rikishi) -> String {
        match self.roster.and_then(|r| r.get(i)) {
            Some(entry) => entry.display_name(),
            None => format!("R{}", i),
        }
    }

    fn is_east(&self, i :Rikishi) -> bool {
        match self.roster.and_then(|r| r.get(i)) {
            Some(entry) => entry.east,
            None => i % 2 == 0,
        }
    }

    fn win_mark(&self, bout :&Bout, i :Rikishi) -> &'static str {
        match (bout.winner, self.options.unicode) {
            (None, _) => " ",
            (Some(w), true) => if w == i { "○" } else { "●" },
            (Some(w), false) => if w == i { "*" } else { "o" },
        }
    }

    fn record(&self, i :Rikishi, day :usize) -> String {
        let wins = match self.schedule.score(i, day) {
            Some(w) => w,
            None => return String::new(),
        };
        let record = format!("({} - {})", wins, self.schedule.losses(i, day));
        if wins > self.options.m / 2 {
            format!("_{}_", record)
        } else {
            record
        }
    }

    fn write_day(&self, out :&mut String, day :usize) -> std::fmt::Result {
        writeln!(out, "# Matchups for Day {}", day + 1)?;
        writeln!(out, "| East | West |")?;
        writeln!(out, "|------|------|")?;
        for bout in self.schedule.bouts_on(day) {
            // The higher ranked wrestler stands east unless only the other one is an east side wrestler.
            let (east, west) = if self.is_east(bout.second) && !self.is_east(bout.first) {
                (bout.second, bout.first)
            } else {
                (bout.first, bout.second)
            };
            writeln!(out, "| {} {} {} | {} {} {} |",
                     self.win_mark(bout, east), self.name(east), self.record(east, day),
                     self.name(west), self.record(west, day), self.win_mark(bout, west))?;
        }
        writeln!(out)
    }

    fn write_result(&self, out :&mut String) -> std::fmt::Result {
        let (best, winners) = match self.schedule.leaders() {
            Some(l) => l,
            None => return Ok(()),
        };
        let names = |ws :&[Rikishi]| ws.iter().map(|i| self.name(*i)).collect::<Vec<_>>().join(", ");

        writeln!(out, "## {}", if winners.len() == 1 { "Winner" } else { "Playoff" })?;
        writeln!(out, "{}", names(&winners))?;

        // With a playoff the runners-up are the playoff losers.
        if winners.len() == 1 {
            let second = (0..self.schedule.n).filter_map(|i| self.schedule.final_score(i)).filter(|s| *s != best).max();
            if let Some(second) = second {
                let runners_up = (0..self.schedule.n).filter(|i| self.schedule.final_score(*i) == Some(second)).collect::<Vec<_>>();
                writeln!(out, "## Runner(s)-Up")?;
                writeln!(out, "{}", names(&runners_up))?;
            }
        }
        Ok(())
    }
}

/// Renders one table per day, then the winner section if scores are known.
fn render_text(schedule :&Schedule, roster :Option<&Roster>, options :RenderOptions) -> Result<String, std::fmt::Error> {
    let renderer = Renderer { schedule, roster, options };
    let mut out = String::new();
    for day in 0..schedule.num_days() {
        renderer.write_day(&mut out, day)?;
    }
    renderer.write_result(&mut out)?;
    Ok(out)
}

pub fn render_schedule(schedule :&Schedule, roster :Option<&Roster>, options :RenderOptions) -> String {
    // Formatting into a String only fails if a Display impl does.
    render_text(schedule, roster, options).unwrap_or_default()
}
