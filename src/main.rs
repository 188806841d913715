use std::path::PathBuf;
use std::time::Duration;

use log::*;
use structopt::*;

use torikumi::base::nominate_reserved_pairs;
use torikumi::lp::write_lp;
use torikumi::model::Direction;
use torikumi::params::Division;
use torikumi::render::{render_schedule, RenderOptions};
use torikumi::roster::{load_conflicts, load_names};
use torikumi::verify::{verify_query, verify_schedule};
use torikumi::*;

#[derive(StructOpt, Debug)]
#[structopt(about = "Generate sumo tournament schedules with integer linear programming.")]
struct Opt {
    /// Division preset the numbers below default to: makuuchi, juryo or makushita.
    #[structopt(long, default_value = "makuuchi")]
    division :Division,

    /// Number of wrestlers (even).
    #[structopt(long)]
    n :Option<usize>,

    /// Number of tournament days.
    #[structopt(long)]
    d :Option<usize>,

    /// Minimum number of bouts per day.
    #[structopt(long)]
    lb :Option<usize>,

    /// Maximum number of bouts per day.
    #[structopt(long)]
    ub :Option<usize>,

    /// Bouts per wrestler over the tournament.
    #[structopt(long)]
    m :Option<usize>,

    /// Solver time limit in seconds.
    #[structopt(long, default_value = "300")]
    time :u64,

    /// JSON list of [name, rank, isEast] per wrestler, used for the printout.
    #[structopt(long, parse(from_os_str))]
    names :Option<PathBuf>,

    /// JSON list per wrestler i of the indices j > i that i must not meet.
    #[structopt(long, parse(from_os_str))]
    conflicts :Option<PathBuf>,

    /// Number of top ranked pairings reserved for the final day.
    #[structopt(short = "k", long, default_value = "1")]
    koreyori_sanyaku :usize,

    /// Write the model in LP format before solving.
    #[structopt(long, parse(from_os_str))]
    to_lp :Option<PathBuf>,

    /// Build the model, report its size and stop.
    #[structopt(long)]
    encode_only :bool,

    /// Plain ASCII win marks.
    #[structopt(long)]
    ascii :bool,

    #[structopt(short, long, parse(from_occurrences))]
    verbose :u8,

    #[structopt(long)]
    quiet :bool,

    #[structopt(subcommand)]
    command :Command,
}

#[derive(StructOpt, Debug)]
enum Command {
    /// Any valid schedule.
    Generate {
        /// Also decide winners and running scores.
        #[structopt(short, long)]
        include_scores :bool,
    },

    /// Fix a champion.
    Champ {
        /// Index of the champion (or one of the tied leaders).
        #[structopt(long, default_value = "0")]
        idx :usize,

        /// Final score of the champion, all bouts won if not given.
        #[structopt(long)]
        score :Option<usize>,

        /// Day (0-based) on which the championship is decided.
        #[structopt(long)]
        secure :Option<usize>,

        /// The champion finishes strictly ahead of everyone else.
        #[structopt(long)]
        no_ties :bool,

        /// Maximize the number of wrestlers tied with the champion.
        #[structopt(long)]
        max_tie :bool,

        /// Minimize the number of wrestlers tied with the champion.
        #[structopt(long)]
        min_tie :bool,
    },

    /// Maximize or minimize how many wrestlers end up in a score range.
    OptScore {
        #[structopt(long)]
        max :bool,

        #[structopt(long)]
        min :bool,

        /// Lowest score counted (inclusive).
        #[structopt(long)]
        lower_score :usize,

        /// Highest score counted (inclusive).
        #[structopt(long)]
        upper_score :usize,

        /// Day (0-based) the range applies to, the last day by default.
        #[structopt(long)]
        day :Option<usize>,
    },
}

impl Opt {
    fn params(&self) -> TournamentParams {
        let preset = self.division.params();
        TournamentParams::new(
            self.n.unwrap_or(preset.n),
            self.d.unwrap_or(preset.d),
            self.lb.unwrap_or(preset.lb),
            self.ub.unwrap_or(preset.ub),
            self.m.unwrap_or(preset.m),
        )
    }
}

fn pick_direction(max :bool, min :bool, what :&str) -> Result<Option<Direction>> {
    match (max, min) {
        (true, true) => Err(Error::conflict(format!("cannot both maximize and minimize {}", what))),
        (true, false) => Ok(Some(Direction::Maximize)),
        (false, true) => Ok(Some(Direction::Minimize)),
        (false, false) => Ok(None),
    }
}

impl Command {
    fn query(&self, params :&TournamentParams) -> Result<Query> {
        match *self {
            Command::Generate { include_scores } => Ok(Query::Generate { include_scores }),
            Command::Champ { idx, score, secure, no_ties, max_tie, min_tie } => {
                let tie_objective = pick_direction(max_tie, min_tie, "ties")?;
                let request = ChampionRequest { champion: idx, score, secure_day: secure, no_ties, tie_objective };
                request.into_query(params)
            }
            Command::OptScore { max, min, lower_score, upper_score, day } => {
                let direction = pick_direction(max, min, "the score count")?
                    .ok_or_else(|| Error::query("one of --max or --min is required"))?;
                let query = Query::OptimizeScoreCount {
                    lower: lower_score,
                    upper: upper_score,
                    day: day.unwrap_or_else(|| params.last_day()),
                    direction,
                };
                query.validate(params)?;
                Ok(query)
            }
        }
    }
}

fn run(options :&Opt) -> Result<i32> {
    let params = options.params();
    params.validate()?;
    info!("Parameters {:?}", params);

    let roster = options.names.as_ref().map(|p| load_names(p, params.n)).transpose()?;
    let forbidden = match options.conflicts.as_ref() {
        Some(p) => load_conflicts(p, params.n)?,
        None => ForbiddenPairs::new(),
    };
    let reserved = nominate_reserved_pairs(&params, options.koreyori_sanyaku, &forbidden)?;
    info!("Reserved for the final day: {:?}", reserved);

    let query = options.command.query(&params)?;
    let encoding = encode(&params, &forbidden, &reserved, &query)?;

    if let Some(path) = options.to_lp.as_ref() {
        info!("Writing LP file {:?}", path);
        std::fs::write(path, write_lp(&encoding.model))
            .map_err(|source| Error::Io { path: path.display().to_string(), source })?;
    }

    if options.encode_only {
        println!("{} variables, {} constraints", encoding.model.num_vars(), encoding.model.num_constraints());
        return Ok(0);
    }

    let solver = HighsSolver { verbose: options.verbose > 2 };
    let outcome = solve_encoding(&encoding, &solver, Some(Duration::from_secs(options.time)))?;

    let schedule = match (outcome.status, outcome.schedule) {
        (SolveStatus::Infeasible, _) => {
            println!("Schedule impossible: proven infeasible.");
            return Ok(1);
        }
        (SolveStatus::NoSolutionFound, _) | (_, None) => {
            println!("No schedule found: one may exist but the solver did not find it.");
            return Ok(1);
        }
        (SolveStatus::FeasibleSuboptimal, Some(s)) => {
            println!("Warning: solution not guaranteed optimal.");
            s
        }
        (SolveStatus::Optimal, Some(s)) => s,
    };

    let mut problems = verify_schedule(&schedule, &params, &forbidden, &reserved);
    problems.extend(verify_query(&schedule, &query));
    if !problems.is_empty() {
        warn!("Extracted schedule failed {} checks", problems.len());
    }

    if let Some(objective) = outcome.objective {
        println!("Objective: {}", objective);
    }
    let render = RenderOptions { unicode: !options.ascii, m: params.m };
    print!("{}", render_schedule(&schedule, roster.as_ref(), render));
    info!("Finished in {:?}", outcome.elapsed);
    Ok(0)
}

fn main() {
    let options = Opt::from_args();

    if let Err(e) = stderrlog::StdErrLog::new()
        .verbosity(options.verbose as usize)
        .quiet(options.quiet)
        .module(module_path!())
        .show_module_names(true)
        .color(stderrlog::ColorChoice::Auto)
        .init() {
        eprintln!("Could not set up logging: {}", e);
    }

    info!("Arguments {:#?}", options);

    let code = match run(&options) {
        Ok(code) => code,
        Err(e @ Error::Solver(_)) => {
            eprintln!("Error: {}", e);
            1
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            2
        }
    };
    std::process::exit(code);
}
