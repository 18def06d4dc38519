//! Checkers-Rust: an English draughts engine.
//!
//! This crate provides the rules of 8x8 checkers (mandatory captures,
//! multi-jump chains, crowning) and an alpha-beta search that plays the
//! Computer side against a human Player.
//!
//! ## Modules
//!
//! - [`constants`] - Board geometry, evaluation weights, and search defaults
//! - [`board`] - Board value type, pieces, squares, and moves
//! - [`movegen`] - Legal move generation
//! - [`game`] - Rules engine (turns, capture chains, game end)
//! - [`eval`] - Static position evaluation
//! - [`search`] - Alpha-beta search with iterative deepening and memoization
//! - [`protocol`] - Text protocol for playing over stdin/stdout
//!
//! ## Example
//!
//! ```
//! use checkers_rust::board::{Move, Square};
//! use checkers_rust::game::GameState;
//! use checkers_rust::search::compute_reply;
//!
//! // Create a new game and play an opening move for the Player
//! let state = GameState::new();
//! let opening = Move::simple(Square::new(5, 2)?, Square::new(4, 3)?);
//! let state = state.submit_move(&opening)?;
//!
//! // Let the engine answer
//! let reply = compute_reply(&state, 4, None).expect("computer has a move");
//! let state = state.submit_move(&reply)?;
//! println!("Computer played {reply}\n{}", state.board());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod board;
pub mod constants;
pub mod eval;
pub mod game;
pub mod movegen;
pub mod protocol;
pub mod search;
