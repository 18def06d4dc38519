//! Line-oriented text protocol for playing one game against the engine.
//!
//! The framing follows GTP: each command may start with a numeric id, and
//! each response is `=[id] text` on success or `?[id] text` on failure,
//! followed by a blank line. Squares are written `row,col` with row 0 at the
//! top (the Computer's back rank).
//!
//! ## Supported Commands
//!
//! - `name` - Return engine name
//! - `version` - Return engine version
//! - `list_commands` - List all supported commands
//! - `known_command <cmd>` - Check if a command is supported
//! - `quit` - Exit the program
//! - `new` - Start a new game and forget cached search results
//! - `board` - Show the board
//! - `moves` - List the legal moves of the side to move
//! - `play <from> <to>` - Submit one step or jump, e.g. `play 5,2 4,3`
//! - `genmove` - Let the engine move for the side to move, finishing any
//!   capture chain, and print the steps it played
//! - `status` - Whose turn it is, or who won
//!
//! ## Example
//!
//! ```ignore
//! use checkers_rust::protocol::ProtocolEngine;
//! use checkers_rust::search::SearchConfig;
//! let mut engine = ProtocolEngine::new(SearchConfig::default());
//! engine.run()?;
//! ```

use std::io::{self, BufRead, Write};

use tracing::debug;

use crate::board::{Move, Square};
use crate::game::{GameState, Turn};
use crate::search::{SearchConfig, Searcher};

/// The list of known commands.
const KNOWN_COMMANDS: &[&str] = &[
    "board",
    "genmove",
    "known_command",
    "list_commands",
    "moves",
    "name",
    "new",
    "play",
    "quit",
    "status",
    "version",
];

/// Protocol engine state.
pub struct ProtocolEngine {
    /// Current game
    state: GameState,
    /// Searcher for the computer's moves (cache lives for one game)
    searcher: Searcher,
}

impl Default for ProtocolEngine {
    fn default() -> Self {
        Self::new(SearchConfig::default())
    }
}

impl ProtocolEngine {
    pub fn new(config: SearchConfig) -> Self {
        Self {
            state: GameState::new(),
            searcher: Searcher::new(config),
        }
    }

    /// Current game state.
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Run the command loop, reading from stdin and writing to stdout.
    pub fn run(&mut self) -> io::Result<()> {
        let stdin = io::stdin();
        let stdout = io::stdout();
        self.serve(stdin.lock(), stdout.lock())
    }

    /// Run the command loop over arbitrary streams until `quit` or EOF.
    pub fn serve<R: BufRead, W: Write>(&mut self, input: R, mut output: W) -> io::Result<()> {
        for line in input.lines() {
            let line = line?;

            // Skip empty lines and comments
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let (id, command_line) = Self::parse_id(line);
            let parts: Vec<&str> = command_line.split_whitespace().collect();
            let Some((command, args)) = parts.split_first() else {
                continue;
            };
            let command = command.to_lowercase();

            debug!(%command, ?args, "command");
            let (success, message) = self.execute(&command, args);

            let prefix = if success { '=' } else { '?' };
            let id_str = id.map(|i| i.to_string()).unwrap_or_default();
            writeln!(output, "{prefix}{id_str} {message}\n")?;
            output.flush()?;

            if command == "quit" {
                break;
            }
        }
        Ok(())
    }

    /// Parse an optional numeric command ID from the beginning of the line.
    fn parse_id(line: &str) -> (Option<u32>, &str) {
        let trimmed = line.trim();
        let end = trimmed
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(trimmed.len());
        match trimmed[..end].parse::<u32>() {
            Ok(id) => (Some(id), trimmed[end..].trim()),
            Err(_) => (None, trimmed),
        }
    }

    /// Execute a command and return (success, response).
    fn execute(&mut self, command: &str, args: &[&str]) -> (bool, String) {
        match command {
            "name" => (true, env!("CARGO_PKG_NAME").to_string()),

            "version" => (true, env!("CARGO_PKG_VERSION").to_string()),

            "list_commands" => (true, KNOWN_COMMANDS.join("\n")),

            "known_command" => {
                let Some(cmd) = args.first() else {
                    return (false, "missing argument".to_string());
                };
                let known = KNOWN_COMMANDS.contains(&cmd.to_lowercase().as_str());
                (true, known.to_string())
            }

            "quit" => (true, String::new()),

            "new" => {
                self.state = GameState::new();
                self.searcher.clear();
                (true, String::new())
            }

            "board" => (true, format!("\n{}", self.state.board())),

            "moves" => (true, join_moves(&self.state.legal_moves())),

            "status" => (true, describe(&self.state)),

            "play" => {
                let [from, to] = args else {
                    return (false, "expected: play <row,col> <row,col>".to_string());
                };
                let squares = from
                    .parse::<Square>()
                    .and_then(|from| Ok((from, to.parse::<Square>()?)));
                let (from, to) = match squares {
                    Ok(pair) => pair,
                    Err(err) => return (false, err.to_string()),
                };
                match self.state.submit_move(&Move::between(from, to)) {
                    Ok(next) => {
                        self.state = next;
                        (true, String::new())
                    }
                    Err(err) => (false, err.to_string()),
                }
            }

            "genmove" => {
                if self.state.is_game_over() {
                    return (false, "game is finished".to_string());
                }
                let side = self.state.to_move();
                let mut played = Vec::new();
                while !self.state.is_game_over() && self.state.to_move() == side {
                    let Some(mv) = self.searcher.reply(&self.state) else {
                        break;
                    };
                    match self.state.submit_move(&mv) {
                        Ok(next) => self.state = next,
                        Err(err) => return (false, err.to_string()),
                    }
                    played.push(mv);
                }
                (true, join_moves(&played))
            }

            _ => (false, format!("unknown command: {command}")),
        }
    }
}

fn join_moves(moves: &[Move]) -> String {
    moves
        .iter()
        .map(Move::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

fn describe(state: &GameState) -> String {
    match state.turn() {
        Turn::AwaitingMove(side) => format!("{side} to move"),
        Turn::CaptureResolved { side, piece } => {
            format!("{side} must continue capturing with {piece}")
        }
        Turn::GameOver { winner } => format!("{winner} wins"),
    }
}
