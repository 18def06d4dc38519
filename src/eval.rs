//! Static position evaluation.
//!
//! Scores are from the Computer's point of view: positive favors the
//! Computer, negative favors the Player. Material dominates; position and
//! mobility only break ties between materially equal boards.

use crate::board::{Board, Piece, Side, Square};
use crate::constants::{
    ADVANCE_BONUS, BACK_RANK_BONUS, CENTER_BONUS, KING_VALUE, MAN_VALUE, MOBILITY_WEIGHT,
};
use crate::movegen::mobility;

/// Evaluate `board`. Deterministic and free of side effects.
pub fn score(board: &Board) -> i32 {
    let mut total = 0;
    for side in Side::BOTH {
        let sign = perspective(side);
        for (sq, piece) in board.pieces(side) {
            total += sign * (material(piece) + positional(sq, piece));
        }
        total += sign * MOBILITY_WEIGHT * mobility(board, side) as i32;
    }
    total
}

/// +1 for the Computer, -1 for the Player.
#[inline]
pub fn perspective(side: Side) -> i32 {
    match side {
        Side::Computer => 1,
        Side::Player => -1,
    }
}

#[inline]
fn material(piece: Piece) -> i32 {
    if piece.king { KING_VALUE } else { MAN_VALUE }
}

fn positional(sq: Square, piece: Piece) -> i32 {
    let mut bonus = 0;
    if (2..6).contains(&sq.row()) && (2..6).contains(&sq.col()) {
        bonus += CENTER_BONUS;
    }
    if !piece.king {
        let back = piece.side.back_row();
        bonus += ADVANCE_BONUS * sq.row().abs_diff(back) as i32;
        if sq.row() == back {
            bonus += BACK_RANK_BONUS;
        }
    }
    bonus
}
