//! Gemgem: a match-3 gem-swapping game core.
//!
//! ## Usage
//!
//! - `gemgem` - Show a demo
//! - `gemgem demo` - Deal a board and play one hinted swap
//! - `gemgem autoplay --turns 50` - Play hinted swaps until the game ends
//! - `gemgem console` - Start the line-oriented text console on stdin/stdout
//!
//! Logs go to stderr; set `RUST_LOG` (default `warn`) to see more.

use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use gemgem::config::GameConfig;
use gemgem::console::Console;
use gemgem::moves::find_matching_swap;
use gemgem::session::{Selection, Session, TurnReport};

/// Gemgem: a match-3 gem-swapping game core
#[derive(Parser)]
#[command(name = "gemgem")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to a TOML game config; defaults are used if it is missing
    #[arg(long, global = true, default_value = "gemgem.toml")]
    config: PathBuf,

    /// Seed for a reproducible game
    #[arg(long, global = true)]
    seed: Option<u64>,

    /// Board width in cells
    #[arg(long, global = true)]
    width: Option<usize>,

    /// Board height in cells
    #[arg(long, global = true)]
    height: Option<usize>,

    /// Number of gem kinds
    #[arg(long, global = true)]
    kinds: Option<u8>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Deal a board and play one hinted swap
    Demo,
    /// Play hinted swaps until no move is left or the turn limit is reached
    Autoplay {
        #[arg(long, default_value_t = 100)]
        turns: usize,
    },
    /// Start the text console on stdin/stdout
    Console,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_json);

    let config = load_config(&cli)?;

    match cli.command {
        Some(Commands::Console) => {
            let mut console = Console::new(Session::new(config));
            let stdin = io::stdin();
            console
                .run(stdin.lock(), io::stdout().lock())
                .context("console I/O failed")?;
        }
        Some(Commands::Autoplay { turns }) => run_autoplay(config, turns),
        Some(Commands::Demo) | None => run_demo(config),
    }
    Ok(())
}

fn init_logging(json: bool) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let fmt_layer = if json {
        fmt::layer().json().with_writer(io::stderr).boxed()
    } else {
        fmt::layer().with_writer(io::stderr).boxed()
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}

/// Config file first, then command-line overrides.
fn load_config(cli: &Cli) -> Result<GameConfig> {
    let mut config = GameConfig::load_or_default(&cli.config)
        .with_context(|| format!("loading {}", cli.config.display()))?;
    if let Some(seed) = cli.seed {
        config.seed = Some(seed);
    }
    if let Some(width) = cli.width {
        config.width = width;
    }
    if let Some(height) = cli.height {
        config.height = height;
    }
    if let Some(kinds) = cli.kinds {
        config.gem_kinds = kinds;
    }
    config.validate().context("invalid game settings")?;
    Ok(config)
}

fn run_demo(config: GameConfig) {
    println!("Gemgem: match-3 board simulation\n");

    let mut session = Session::new(config);
    println!("=== Opening Deal ===");
    println!("Dealt in {} drop steps", session.deal_steps().len());
    println!("{}", session.grid());

    println!("=== Hinted Swap ===");
    let Some((from, to)) = find_matching_swap(session.grid()) else {
        println!("No move available");
        return;
    };
    println!("Swapping {from} with {to}");
    if let Selection::Turn(report) = session.drag(from, to) {
        print_report(&report);
    }
    println!("{}", session.grid());
    println!("Score: {}", session.score());
}

fn run_autoplay(config: GameConfig, turns: usize) {
    let mut session = Session::new(config);
    let mut played = 0;
    while played < turns && !session.is_over() {
        let Some((from, to)) = find_matching_swap(session.grid()) else {
            break;
        };
        played += 1;
        println!("Turn {played}: {from} <-> {to}");
        if let Selection::Turn(report) = session.drag(from, to) {
            print_report(&report);
        }
    }
    println!("\n{}", session.grid());
    println!(
        "Played {played} turns, score {}{}",
        session.score(),
        if session.is_over() { ", no moves left" } else { "" }
    );
}

fn print_report(report: &TurnReport) {
    for (i, cascade) in report.cascades.iter().enumerate() {
        let awards: Vec<String> = cascade
            .points
            .iter()
            .map(|p| format!("+{} at {}", p.points, p.at))
            .collect();
        println!(
            "  cascade {}: {} group(s), {}",
            i + 1,
            cascade.groups.len(),
            awards.join(", ")
        );
    }
    println!("  {:?}, +{} points", report.sound(), report.score_delta);
}
