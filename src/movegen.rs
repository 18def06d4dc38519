//! Legal move generation.
//!
//! Men step and jump diagonally forward only; kings use all four diagonals.
//! Captures are mandatory: whenever any piece of the side to move can jump,
//! only jumps are legal.
//!
//! Generation order is deterministic (pieces in row-major order, directions
//! in the fixed order of the direction tables), which keeps search and tests
//! reproducible.

use crate::board::{Board, Move, Piece, Side, Square};

/// Jumps available to `piece` standing on `from`.
pub fn captures_from(board: &Board, from: Square, piece: Piece) -> Vec<Move> {
    piece
        .side
        .directions(piece.king)
        .iter()
        .filter_map(|&dir| {
            let over = from.offset(dir, 1)?;
            let to = from.offset(dir, 2)?;
            match (board.get(over), board.get(to)) {
                (Some(victim), None) if victim.side != piece.side => {
                    Some(Move::jump(from, to, over))
                }
                _ => None,
            }
        })
        .collect()
}

/// Non-capturing steps available to `piece` standing on `from`.
fn simple_moves_from(board: &Board, from: Square, piece: Piece) -> Vec<Move> {
    piece
        .side
        .directions(piece.king)
        .iter()
        .filter_map(|&dir| from.offset(dir, 1))
        .filter(|&to| board.get(to).is_none())
        .map(|to| Move::simple(from, to))
        .collect()
}

/// All legal moves for `side`, honoring the mandatory-capture rule.
pub fn legal_moves(board: &Board, side: Side) -> Vec<Move> {
    let captures: Vec<Move> = board
        .pieces(side)
        .flat_map(|(sq, piece)| captures_from(board, sq, piece))
        .collect();
    if !captures.is_empty() {
        return captures;
    }
    board
        .pieces(side)
        .flat_map(|(sq, piece)| simple_moves_from(board, sq, piece))
        .collect()
}

/// Whether the piece on `from` could jump again.
///
/// Used after a capture lands to decide if the same piece must continue the
/// chain within the current turn.
pub fn has_further_capture(board: &Board, from: Square, side: Side, king: bool) -> bool {
    !captures_from(board, from, Piece { side, king }).is_empty()
}

/// Count of every step and jump `side` could make, ignoring the
/// mandatory-capture restriction. A smoother mobility signal for evaluation
/// than the length of [`legal_moves`].
pub fn mobility(board: &Board, side: Side) -> usize {
    board
        .pieces(side)
        .map(|(sq, piece)| {
            captures_from(board, sq, piece).len() + simple_moves_from(board, sq, piece).len()
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sq(row: usize, col: usize) -> Square {
        Square::new(row, col).unwrap()
    }

    #[test]
    fn test_opening_moves() {
        let board = Board::standard();
        let player = legal_moves(&board, Side::Player);
        let computer = legal_moves(&board, Side::Computer);
        assert_eq!(player.len(), 7);
        assert_eq!(computer.len(), 7);
        assert!(player.iter().all(|mv| mv.from.row() == 5 && mv.to.row() == 4));
        assert!(computer.iter().all(|mv| mv.from.row() == 2 && mv.to.row() == 3));
    }

    #[test]
    fn test_men_only_move_forward() {
        let board = Board::empty().with_cell(sq(4, 3), Some(Piece::man(Side::Player)));
        let moves = legal_moves(&board, Side::Player);
        let targets: Vec<Square> = moves.iter().map(|mv| mv.to).collect();
        assert_eq!(targets, vec![sq(3, 2), sq(3, 4)]);

        let board = Board::empty().with_cell(sq(4, 3), Some(Piece::man(Side::Computer)));
        let targets: Vec<Square> = legal_moves(&board, Side::Computer)
            .iter()
            .map(|mv| mv.to)
            .collect();
        assert_eq!(targets, vec![sq(5, 2), sq(5, 4)]);
    }

    #[test]
    fn test_king_moves_all_directions() {
        let board = Board::empty().with_cell(sq(4, 3), Some(Piece::king(Side::Player)));
        assert_eq!(legal_moves(&board, Side::Player).len(), 4);

        let corner = Board::empty().with_cell(sq(7, 0), Some(Piece::king(Side::Computer)));
        assert_eq!(
            legal_moves(&corner, Side::Computer),
            vec![Move::simple(sq(7, 0), sq(6, 1))]
        );
    }

    #[test]
    fn test_mandatory_capture_excludes_simple_moves() {
        let board = Board::from_diagram(
            "
            . . . . . . . .
            . . . . . . . .
            . . . c . . . .
            . . . . p . . .
            . . . . . . . .
            . p . . . . . .
            . . . . . . . .
            . . . . . . . .
            ",
        )
        .unwrap();
        let moves = legal_moves(&board, Side::Player);
        assert_eq!(moves, vec![Move::jump(sq(3, 4), sq(1, 2), sq(2, 3))]);
    }

    #[test]
    fn test_no_capture_when_landing_blocked_or_off_board() {
        let board = Board::from_diagram(
            "
            . . . . . . . .
            . . c . . . . .
            . . . c . . . .
            . . . . p . . .
            . . . . . . . .
            . . . . . . . .
            . . . . . . . .
            c . . . . . . .
            ",
        )
        .unwrap();
        let moves = legal_moves(&board, Side::Player);
        assert!(moves.iter().all(|mv| !mv.is_capture()));

        // An enemy on the edge cannot be jumped.
        let edge = Board::empty()
            .with_cell(sq(3, 1), Some(Piece::man(Side::Player)))
            .with_cell(sq(2, 0), Some(Piece::man(Side::Computer)));
        assert!(legal_moves(&edge, Side::Player).iter().all(|mv| !mv.is_capture()));
    }

    #[test]
    fn test_men_cannot_capture_backwards() {
        let board = Board::empty()
            .with_cell(sq(3, 4), Some(Piece::man(Side::Player)))
            .with_cell(sq(4, 3), Some(Piece::man(Side::Computer)));
        // Both men face away from each other.
        assert!(legal_moves(&board, Side::Player).iter().all(|mv| !mv.is_capture()));
        assert!(legal_moves(&board, Side::Computer).iter().all(|mv| !mv.is_capture()));

        let king = board.with_cell(sq(3, 4), Some(Piece::king(Side::Player)));
        assert_eq!(
            legal_moves(&king, Side::Player),
            vec![Move::jump(sq(3, 4), sq(5, 2), sq(4, 3))]
        );
    }

    #[test]
    fn test_has_further_capture() {
        let board = Board::from_diagram(
            "
            . . . . . . . .
            . . . . . . . .
            . . . c . . . .
            . . . . . . . .
            . . . . . c . .
            . . . . . . . .
            . . . . . . . .
            . . . . . . . .
            ",
        )
        .unwrap();
        assert!(has_further_capture(&board, sq(3, 4), Side::Player, false));
        // Only a king could go back for (4,5).
        assert!(!has_further_capture(&board, sq(3, 6), Side::Player, false));
        assert!(has_further_capture(&board, sq(3, 6), Side::Player, true));
    }

    #[test]
    fn test_mobility_counts_all_candidates() {
        let board = Board::standard();
        assert_eq!(mobility(&board, Side::Player), 7);
        let board = Board::empty()
            .with_cell(sq(3, 4), Some(Piece::man(Side::Player)))
            .with_cell(sq(2, 3), Some(Piece::man(Side::Computer)));
        // One jump plus one simple step, even though only the jump is legal.
        assert_eq!(mobility(&board, Side::Player), 2);
        assert_eq!(legal_moves(&board, Side::Player).len(), 1);
    }
}
