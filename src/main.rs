use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::*;
use rayon::prelude::*;

use std::fs::OpenOptions;
use std::path::PathBuf;

use checkers_ai::board::Side;
use checkers_ai::config::{ConfigFile, Settings, SettingsSource};
use checkers_ai::controller::*;

mod terminal;
use terminal::*;

/// Play Checkers between any mix of people and bots
#[derive(Parser)]
#[command(name = "checkers", version)]
struct Cli {
    /// Settings file, re-read at the start of every game
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Seed for the bots' move ordering (overrides `no_random`)
    #[arg(long)]
    seed: Option<u64>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Play bot-vs-bot games without a board and report the results
    Match {
        /// Number of games to play
        #[arg(short, long, default_value_t = 10)]
        games: usize,
    },
}

fn init_logging(settings: &Settings) -> Result<()> {
    let level = if settings.log_file.is_some() { "info" } else { "warn" };
    let mut builder = env_logger::Builder::from_env(
        env_logger::Env::default().filter_or(env_logger::DEFAULT_FILTER_ENV, level),
    );
    // the board owns the terminal, so logs go to a file when one is configured
    if let Some(path) = &settings.log_file {
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("failed to open log file {}", path.display()))?;
        builder
            .target(env_logger::Target::Pipe(Box::new(file)))
            .write_style(env_logger::WriteStyle::Never);
    }
    builder.init();
    Ok(())
}

fn play<S: SettingsSource>(source: S, seed: Option<u64>) -> Result<Option<GameResult>> {
    let _guard = TerminalGuard::enter()?;
    let mut controller = Controller::new(TerminalTable::new(), TerminalInput::new(), source);
    if let Some(seed) = seed {
        controller = controller.with_seed(seed);
    }
    controller.play()
}

fn run_match(mut settings: Settings, games: usize, seed: u64) -> Result<()> {
    settings.bot.white_bot = true;
    settings.bot.black_bot = true;
    settings.bot.delay_ms = 0;

    println!(
        "Playing {} games, white depth {}, black depth {}",
        games,
        settings.depth(Side::White),
        settings.depth(Side::Black)
    );

    let progress = ProgressBar::new(games as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("Playing games: {bar:40.cyan/blue} {pos}/{len} ~{eta} remaining")
            .progress_chars("█▓▒░  "),
    );

    let exits = (0..games)
        .into_par_iter()
        .map(|game| {
            let mut controller = Controller::new(MemoryTable::new(), NoInput, settings.clone())
                .with_seed(seed.wrapping_add(game as u64));
            let exit = controller.play_game();
            progress.inc(1);
            exit
        })
        .collect::<Result<Vec<GameExit>>>()?;
    progress.finish();

    let (mut white, mut black, mut draws) = (0, 0, 0);
    for exit in exits {
        match exit {
            GameExit::Over(GameResult::Winner(Side::White)) => white += 1,
            GameExit::Over(GameResult::Winner(Side::Black)) => black += 1,
            _ => draws += 1,
        }
    }
    println!("White wins: {}, Black wins: {}, Draws: {}", white, black, draws);
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let settings = match &cli.config {
        Some(path) => Settings::from_file(path)?,
        None => Settings::default(),
    };
    init_logging(&settings)?;

    match cli.command {
        Some(Command::Match { games }) => {
            run_match(settings, games, cli.seed.unwrap_or_else(rand::random))
        }
        None => {
            let result = match cli.config {
                Some(path) => play(ConfigFile::new(path), cli.seed)?,
                None => play(settings, cli.seed)?,
            };
            if let Some(result) = result {
                println!("{}", result);
            }
            Ok(())
        }
    }
}
