mod commands;
mod config;
mod installed;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "depset")]
#[command(about = "Inspect, evaluate and normalize DepSet dependency strings")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Parse a DepSet and print its canonical form
    Parse(commands::ParseArgs),

    /// Evaluate conditionals against enabled flags
    Eval(commands::EvalArgs),

    /// Show the conditions under which each leaf is required
    Conds(commands::CondsArgs),

    /// List the flags a DepSet depends on
    Flags(commands::FlagsArgs),

    /// Lock `:=` slot dependencies against installed packages
    Slotdep(commands::SlotdepArgs),
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .format_timestamp(None)
        .init();
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Parse(args) => commands::parse::execute(args),
        Commands::Eval(args) => commands::eval::execute(args),
        Commands::Conds(args) => commands::conds::execute(args),
        Commands::Flags(args) => commands::flags::execute(args),
        Commands::Slotdep(args) => commands::slotdep::execute(args),
    }
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            for cause in e.chain().skip(1) {
                eprintln!("  Caused by: {}", cause);
            }
            ExitCode::FAILURE
        }
    }
}
