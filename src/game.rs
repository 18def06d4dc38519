//! Rules engine: turn sequencing, capture chains, promotion, and game end.
//!
//! A [`GameState`] is an immutable value. [`GameState::submit_move`] validates
//! a move against the current legal set and returns the successor state, so
//! a rejected move never leaves a half-applied game behind.

use derive_more::{Display, Error};
use tracing::{info, trace};

use crate::board::{Board, Move, Side, Square};
use crate::movegen::{has_further_capture, legal_moves};

/// Errors returned by [`GameState::submit_move`].
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum RulesError {
    /// The move is not in the legal set of the current state.
    #[display("illegal move {mv}")]
    IllegalMove { mv: Move },
    /// The game has already been decided.
    #[display("game is finished")]
    GameFinished,
}

/// Where the game currently stands.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Turn {
    /// `side` may move any piece.
    AwaitingMove(Side),
    /// `side` has just captured with the piece now on `piece` and must keep
    /// jumping with it.
    CaptureResolved { side: Side, piece: Square },
    /// The game is over and `winner` has won.
    GameOver { winner: Side },
}

/// Complete state of one game.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct GameState {
    board: Board,
    to_move: Side,
    /// Live piece counts, indexed by [`Side::index`].
    counts: [usize; 2],
    /// Piece that must continue a capture chain this turn.
    pinned: Option<Square>,
    winner: Option<Side>,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new()
    }
}

impl GameState {
    /// A new game from the standard layout, Player to move.
    pub fn new() -> Self {
        Self::from_board(Board::standard(), Side::Player)
    }

    /// A game starting from an arbitrary board with `to_move` on turn.
    pub fn from_board(board: Board, to_move: Side) -> Self {
        let mut state = Self {
            board,
            to_move,
            counts: [board.count(Side::Player), board.count(Side::Computer)],
            pinned: None,
            winner: None,
        };
        state.winner = state.detect_winner();
        state
    }

    #[inline]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[inline]
    pub fn to_move(&self) -> Side {
        self.to_move
    }

    /// Live piece count of `side`.
    #[inline]
    pub fn piece_count(&self, side: Side) -> usize {
        self.counts[side.index()]
    }

    /// Piece that must continue jumping, if a capture chain is in progress.
    #[inline]
    pub fn pinned(&self) -> Option<Square> {
        self.pinned
    }

    /// The winner, once the game is over.
    #[inline]
    pub fn winner(&self) -> Option<Side> {
        self.winner
    }

    pub fn is_game_over(&self) -> bool {
        self.winner.is_some()
    }

    pub fn turn(&self) -> Turn {
        match (self.winner, self.pinned) {
            (Some(winner), _) => Turn::GameOver { winner },
            (None, Some(piece)) => Turn::CaptureResolved {
                side: self.to_move,
                piece,
            },
            (None, None) => Turn::AwaitingMove(self.to_move),
        }
    }

    /// Moves the side to move may play. Empty once the game is over.
    ///
    /// During a capture chain only jumps by the pinned piece are returned.
    pub fn legal_moves(&self) -> Vec<Move> {
        if self.winner.is_some() {
            return Vec::new();
        }
        let mut moves = legal_moves(&self.board, self.to_move);
        if let Some(pinned) = self.pinned {
            moves.retain(|mv| mv.from == pinned && mv.is_capture());
        }
        moves
    }

    /// Validate and apply a move, returning the successor state.
    pub fn submit_move(&self, mv: &Move) -> Result<GameState, RulesError> {
        if self.winner.is_some() {
            return Err(RulesError::GameFinished);
        }
        if !self.legal_moves().contains(mv) {
            return Err(RulesError::IllegalMove { mv: *mv });
        }
        let next = self.advance(mv);
        if let Some(winner) = next.winner {
            info!(%winner, "game over");
        }
        Ok(next)
    }

    /// Apply a move already known to be legal.
    ///
    /// # Panics
    ///
    /// Panics if the move does not fit the board, which means the caller and
    /// the move generator are out of sync.
    pub(crate) fn advance(&self, mv: &Move) -> GameState {
        let mover = self.to_move;
        let was_king = self
            .board
            .get(mv.from)
            .is_some_and(|piece| piece.king);
        let board = self
            .board
            .with_move(mv)
            .unwrap_or_else(|err| panic!("cannot apply {mv} to\n{}{err}", self.board));

        let mut next = GameState {
            board,
            to_move: mover,
            counts: self.counts,
            pinned: None,
            winner: None,
        };
        if mv.is_capture() {
            next.counts[mover.opponent().index()] -= 1;
        }

        let crowned = !was_king && board.get(mv.to).is_some_and(|piece| piece.king);
        if crowned {
            trace!(side = %mover, square = %mv.to, "piece crowned");
        }

        // A crowning move ends the turn even mid-chain.
        if mv.is_capture() && !crowned && has_further_capture(&board, mv.to, mover, was_king) {
            trace!(side = %mover, square = %mv.to, "capture chain continues");
            next.pinned = Some(mv.to);
        } else {
            next.to_move = mover.opponent();
        }

        next.winner = next.detect_winner();
        next
    }

    fn detect_winner(&self) -> Option<Side> {
        if let Some(&side) = Side::BOTH.iter().find(|side| self.piece_count(**side) == 0) {
            return Some(side.opponent());
        }
        // The pinned piece always has a jump, so only an unpinned side can be stuck.
        if self.pinned.is_none() && legal_moves(&self.board, self.to_move).is_empty() {
            return Some(self.to_move.opponent());
        }
        None
    }
}
