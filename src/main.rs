//! Checkers-Rust: play English draughts against an alpha-beta engine.
//!
//! ## Usage
//!
//! - `checkers-rust` - Show a demo
//! - `checkers-rust play` - Start the text protocol on stdin/stdout
//! - `checkers-rust demo` - Let the engine play itself

use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use checkers_rust::constants::{DEFAULT_DEPTH, DEMO_PLY_LIMIT};
use checkers_rust::game::GameState;
use checkers_rust::protocol::ProtocolEngine;
use checkers_rust::search::{SearchConfig, Searcher};

/// Checkers-Rust: English draughts against an alpha-beta engine
#[derive(Parser)]
#[command(name = "checkers-rust")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    search: SearchArgs,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a game over the line-oriented text protocol on stdin/stdout
    Play,
    /// Let the engine play both sides and print every position
    Demo,
}

#[derive(Args)]
struct SearchArgs {
    /// Search depth in plies
    #[arg(long, global = true, default_value_t = DEFAULT_DEPTH)]
    depth: u8,
    /// Time budget per move in milliseconds
    #[arg(long, global = true)]
    budget_ms: Option<u64>,
    /// Seed for tie-breaking between equally good moves
    #[arg(long, global = true)]
    seed: Option<u64>,
}

impl SearchArgs {
    fn config(&self) -> SearchConfig {
        SearchConfig {
            max_depth: self.depth,
            time_budget: self.budget_ms.map(Duration::from_millis),
            seed: self.seed,
            ..SearchConfig::default()
        }
    }
}

fn main() -> Result<()> {
    // Logs go to stderr so stdout stays clean for the protocol.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.search.config();

    match cli.command {
        Some(Commands::Play) => {
            info!(?config, "starting protocol session");
            let mut engine = ProtocolEngine::new(config);
            engine.run().context("protocol session failed")?;
        }
        Some(Commands::Demo) | None => run_demo(config),
    }
    Ok(())
}

fn run_demo(config: SearchConfig) {
    println!("Checkers-Rust: English draughts engine self-play\n");

    let mut searcher = Searcher::new(config);
    let mut state = GameState::new();
    println!("{}", state.board());

    for ply in 1..=DEMO_PLY_LIMIT {
        let result = searcher.search(&state, config.max_depth, config.time_budget);
        let Some(mv) = result.best_move else {
            break;
        };
        let side = state.to_move();
        state = match state.submit_move(&mv) {
            Ok(next) => next,
            Err(err) => {
                error!(%err, "engine produced an illegal move");
                return;
            }
        };
        println!(
            "{ply}. {side} {mv} (score {}, depth {}, {} nodes)",
            result.score, result.depth, result.nodes
        );
        println!("{}", state.board());
        if state.is_game_over() {
            break;
        }
    }

    match state.winner() {
        Some(winner) => println!("{winner} wins"),
        None => println!("No result after {DEMO_PLY_LIMIT} plies"),
    }
}
