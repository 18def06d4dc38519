//! Constants for board geometry, evaluation weights, and search defaults.
//!
//! The board is a plain 8x8 grid stored row-major, so a square's index is
//! `row * BOARD_SIZE + col`. Only dark squares (`(row + col)` odd) are ever
//! occupied in a position reached by legal play.

// =============================================================================
// Board Geometry
// =============================================================================

/// Board size (NxN). English draughts is always played on 8x8.
pub const BOARD_SIZE: usize = 8;

/// Total number of cells on the board.
pub const CELLS: usize = BOARD_SIZE * BOARD_SIZE;

/// Number of men each side starts with.
pub const STARTING_PIECES: usize = 12;

/// Rows holding the Computer's men at the start (top of the board).
pub const COMPUTER_START_ROWS: std::ops::Range<usize> = 0..3;

/// Rows holding the Player's men at the start (bottom of the board).
pub const PLAYER_START_ROWS: std::ops::Range<usize> = 5..8;

// =============================================================================
// Diagonal Directions
// =============================================================================

/// All four diagonal steps as (row delta, col delta). Kings use all of them.
pub const KING_DIRECTIONS: [(isize, isize); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];

/// Forward steps for a Player man (toward row 0).
pub const PLAYER_DIRECTIONS: [(isize, isize); 2] = [(-1, -1), (-1, 1)];

/// Forward steps for a Computer man (toward row 7).
pub const COMPUTER_DIRECTIONS: [(isize, isize); 2] = [(1, -1), (1, 1)];

// =============================================================================
// Evaluation Weights
// =============================================================================

/// Material value of a man.
pub const MAN_VALUE: i32 = 100;

/// Material value of a king.
pub const KING_VALUE: i32 = 160;

/// Bonus for a piece standing on one of the central 4x4 squares.
pub const CENTER_BONUS: i32 = 4;

/// Bonus per row a man has advanced from its own back row.
pub const ADVANCE_BONUS: i32 = 1;

/// Bonus for a man still guarding its own back row.
pub const BACK_RANK_BONUS: i32 = 3;

/// Weight of the difference in available moves.
pub const MOBILITY_WEIGHT: i32 = 2;

/// Score of a decided game. Far above any material swing.
pub const WIN_SCORE: i32 = 100_000;

// =============================================================================
// Search Parameters
// =============================================================================

/// Default search depth in plies.
pub const DEFAULT_DEPTH: u8 = 6;

/// Maximum number of memoized positions before the cache is flushed.
pub const CACHE_CAPACITY: usize = 1 << 20;

/// Nodes visited between two deadline checks.
pub const DEADLINE_CHECK_INTERVAL: u64 = 1024;

/// Plies after which the self-play demo gives up.
pub const DEMO_PLY_LIMIT: usize = 200;
