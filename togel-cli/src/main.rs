mod display;
mod import;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};

use crate::display::{
    display_draw, display_evaluation, display_frontier, display_import_summary,
};
use togel_engine::config::DrawConfig;
use togel_engine::evaluate::{evaluate, winners};
use togel_engine::models::{
    Candidate, PayoutBasis, RawRow, parse_excluded_users, parse_profit_percentage,
};
use togel_engine::normalize::{BetBook, normalize_rows};
use togel_engine::report::DrawReport;
use togel_engine::resolver::{find_frontier, run_draw, split_revenue};

#[derive(Parser)]
#[command(name = "togel", about = "Togel draw resolver")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
struct DrawArgs {
    /// CSV upload with columns User, Inv, Bet, x, Bayar, Tebak
    #[arg(short, long)]
    file: PathBuf,

    /// JSON draw configuration; flags below override it
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Share of total Bayar kept by the house, 0-100; blank means 20
    #[arg(short, long)]
    profit: Option<String>,

    /// Comma-separated users to leave out of the draw
    #[arg(short, long)]
    exclude: Option<String>,

    /// Amount the multiplier applies to when pricing a win
    #[arg(long)]
    payout_basis: Option<PayoutBasis>,

    /// Seed for the tie-break between equally good numbers
    #[arg(long)]
    seed: Option<u64>,

    /// Scan candidates on one thread
    #[arg(long)]
    sequential: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Pick the winning number for an upload
    Draw {
        #[command(flatten)]
        args: DrawArgs,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// List every optimal number without picking one
    Frontier {
        #[command(flatten)]
        args: DrawArgs,

        /// Maximum numbers to print
        #[arg(short, long, default_value = "200")]
        limit: usize,
    },

    /// Show who would win, and for how much, with a given number
    Inspect {
        #[command(flatten)]
        args: DrawArgs,

        /// Four-digit number to evaluate
        #[arg(short, long)]
        number: String,
    },
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Command::Draw { args, json } => cmd_draw(&args, json),
        Command::Frontier { args, limit } => cmd_frontier(&args, limit),
        Command::Inspect { args, number } => cmd_inspect(&args, &number),
    }
}

fn build_config(args: &DrawArgs) -> Result<DrawConfig> {
    let mut config = match &args.config {
        Some(path) => DrawConfig::load(path)?,
        None => DrawConfig::default(),
    };
    if let Some(profit) = &args.profit {
        config.profit_percentage = parse_profit_percentage(Some(profit.as_str()))?;
    }
    if let Some(exclude) = &args.exclude {
        config.excluded_users = parse_excluded_users(exclude);
    }
    if let Some(basis) = args.payout_basis {
        config.payout_basis = basis;
    }
    if args.seed.is_some() {
        config.seed = args.seed;
    }
    if args.sequential {
        config.parallel = false;
    }
    config.validate()?;
    Ok(config)
}

/// Config is validated before the upload is touched.
fn load(args: &DrawArgs, quiet: bool) -> Result<(DrawConfig, Vec<RawRow>)> {
    let config = build_config(args)?;
    let (rows, summary) = import::import_csv(&args.file)?;
    if !quiet {
        display_import_summary(&summary);
    }
    Ok((config, rows))
}

fn load_book(args: &DrawArgs) -> Result<(DrawConfig, BetBook, f64)> {
    let (config, rows) = load(args, false)?;
    let book = normalize_rows(&rows, &config.exclusions(), config.payout_basis);
    let (_, prize_pool) = split_revenue(book.total_stake(), config.profit_percentage);
    Ok((config, book, prize_pool))
}

fn cmd_draw(args: &DrawArgs, json: bool) -> Result<()> {
    let (config, rows) = load(args, json)?;
    let result = run_draw(&rows, &config, &mut config.rng())?;

    if json {
        println!("{}", serde_json::to_string_pretty(&DrawReport::from(&result))?);
    } else {
        display_draw(&result);
    }
    Ok(())
}

fn cmd_frontier(args: &DrawArgs, limit: usize) -> Result<()> {
    let (config, book, prize_pool) = load_book(args)?;
    let frontier = find_frontier(&book, prize_pool, config.parallel);
    display_frontier(&frontier, prize_pool, limit);
    Ok(())
}

fn cmd_inspect(args: &DrawArgs, number: &str) -> Result<()> {
    let candidate = Candidate::parse(number)?;
    let (_, book, prize_pool) = load_book(args)?;
    let eval = evaluate(&book.index, candidate);
    display_evaluation(&eval, &winners(&book, candidate), prize_pool);
    Ok(())
}
