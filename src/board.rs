//! Board representation: sides, pieces, squares, moves, and the 8x8 grid.
//!
//! [`Board`] is a small `Copy` value. Applying a move never mutates a board in
//! place; [`Board::with_move`] returns the successor position instead.

use std::fmt;
use std::str::FromStr;

use derive_more::{Display, Error};

use crate::constants::{
    BOARD_SIZE, CELLS, COMPUTER_DIRECTIONS, COMPUTER_START_ROWS, KING_DIRECTIONS,
    PLAYER_DIRECTIONS, PLAYER_START_ROWS,
};

/// One of the two sides of the game.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Display)]
pub enum Side {
    /// The human, starting at the bottom of the board and moving up.
    Player,
    /// The engine, starting at the top of the board and moving down.
    Computer,
}

impl Side {
    /// Both sides, in turn order.
    pub const BOTH: [Side; 2] = [Side::Player, Side::Computer];

    pub fn opponent(self) -> Side {
        match self {
            Side::Player => Side::Computer,
            Side::Computer => Side::Player,
        }
    }

    /// Row on which a man of this side is crowned.
    pub fn promotion_row(self) -> usize {
        match self {
            Side::Player => 0,
            Side::Computer => BOARD_SIZE - 1,
        }
    }

    /// Row a man of this side starts furthest back on.
    pub fn back_row(self) -> usize {
        self.opponent().promotion_row()
    }

    /// Diagonal steps available to a piece of this side.
    pub fn directions(self, king: bool) -> &'static [(isize, isize)] {
        match (king, self) {
            (true, _) => &KING_DIRECTIONS,
            (false, Side::Player) => &PLAYER_DIRECTIONS,
            (false, Side::Computer) => &COMPUTER_DIRECTIONS,
        }
    }

    /// Dense index for per-side tables.
    pub(crate) fn index(self) -> usize {
        match self {
            Side::Player => 0,
            Side::Computer => 1,
        }
    }
}

/// A piece on the board. Kings are a property of the piece, not a separate side.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Piece {
    pub side: Side,
    pub king: bool,
}

impl Piece {
    pub const fn man(side: Side) -> Self {
        Self { side, king: false }
    }

    pub const fn king(side: Side) -> Self {
        Self { side, king: true }
    }

    fn symbol(self) -> char {
        match (self.side, self.king) {
            (Side::Player, false) => 'p',
            (Side::Player, true) => 'P',
            (Side::Computer, false) => 'c',
            (Side::Computer, true) => 'C',
        }
    }

    fn from_symbol(ch: char) -> Option<Self> {
        match ch {
            'p' => Some(Piece::man(Side::Player)),
            'P' => Some(Piece::king(Side::Player)),
            'c' => Some(Piece::man(Side::Computer)),
            'C' => Some(Piece::king(Side::Computer)),
            _ => None,
        }
    }
}

/// State of one cell: empty, or holding exactly one piece.
pub type Cell = Option<Piece>;

/// Errors raised by board queries and transformations.
#[derive(Debug, Clone, PartialEq, Eq, Display, Error)]
pub enum BoardError {
    /// Coordinate outside the 8x8 grid.
    #[display("square ({row}, {col}) is off the board")]
    OutOfBounds { row: usize, col: usize },
    /// A structural precondition of a board transformation does not hold.
    #[display("illegal board state: {reason}")]
    IllegalState { reason: &'static str },
    /// A text diagram could not be parsed into a board.
    #[display("invalid board diagram: {reason}")]
    InvalidDiagram { reason: String },
    /// Text that does not name a square as `row,col`.
    #[display("expected `row,col`, got `{input}`")]
    InvalidSquare { input: String },
}

/// A square of the board, always within bounds once constructed.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Square {
    row: u8,
    col: u8,
}

impl Square {
    pub fn new(row: usize, col: usize) -> Result<Self, BoardError> {
        if row >= BOARD_SIZE || col >= BOARD_SIZE {
            return Err(BoardError::OutOfBounds { row, col });
        }
        Ok(Self {
            row: row as u8,
            col: col as u8,
        })
    }

    #[inline]
    pub fn row(self) -> usize {
        self.row as usize
    }

    #[inline]
    pub fn col(self) -> usize {
        self.col as usize
    }

    /// Index into the row-major cell array.
    #[inline]
    pub fn index(self) -> usize {
        self.row() * BOARD_SIZE + self.col()
    }

    /// Whether this is a dark (playable) square.
    pub fn is_dark(self) -> bool {
        (self.row() + self.col()) % 2 == 1
    }

    /// Step `distance` times along a diagonal, or `None` if that leaves the board.
    pub fn offset(self, (dr, dc): (isize, isize), distance: isize) -> Option<Square> {
        let row = self.row as isize + dr * distance;
        let col = self.col as isize + dc * distance;
        if (0..BOARD_SIZE as isize).contains(&row) && (0..BOARD_SIZE as isize).contains(&col) {
            Some(Square {
                row: row as u8,
                col: col as u8,
            })
        } else {
            None
        }
    }

    /// Iterate over all 64 squares in row-major order.
    pub fn all() -> impl Iterator<Item = Square> {
        (0..CELLS).map(|i| Square {
            row: (i / BOARD_SIZE) as u8,
            col: (i % BOARD_SIZE) as u8,
        })
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.row, self.col)
    }
}

impl FromStr for Square {
    type Err = BoardError;

    /// Parse a square written as `row,col`, e.g. `5,2`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || BoardError::InvalidSquare {
            input: s.to_string(),
        };
        let (row, col) = s.trim().split_once(',').ok_or_else(invalid)?;
        let row = row.trim().parse::<usize>().map_err(|_| invalid())?;
        let col = col.trim().parse::<usize>().map_err(|_| invalid())?;
        Square::new(row, col)
    }
}

/// A single step of play: a diagonal slide or a jump over one enemy piece.
///
/// A multi-jump is a sequence of `Move`s by the same piece within one turn.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    /// Square of the jumped piece, present only for captures.
    pub captured: Option<Square>,
}

impl Move {
    pub fn simple(from: Square, to: Square) -> Self {
        Self {
            from,
            to,
            captured: None,
        }
    }

    pub fn jump(from: Square, to: Square, captured: Square) -> Self {
        Self {
            from,
            to,
            captured: Some(captured),
        }
    }

    /// Build a move from its endpoints, inferring the jumped square when the
    /// endpoints are two diagonal steps apart.
    pub fn between(from: Square, to: Square) -> Self {
        let dr = to.row() as isize - from.row() as isize;
        let dc = to.col() as isize - from.col() as isize;
        if dr.abs() == 2 && dc.abs() == 2 {
            let captured = from.offset((dr / 2, dc / 2), 1);
            Self {
                from,
                to,
                captured,
            }
        } else {
            Self::simple(from, to)
        }
    }

    #[inline]
    pub fn is_capture(&self) -> bool {
        self.captured.is_some()
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sep = if self.is_capture() { 'x' } else { '-' };
        write!(f, "{}{sep}{}", self.from, self.to)
    }
}

/// The 8x8 grid of cells.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Board {
    cells: [Cell; CELLS],
}

impl Default for Board {
    fn default() -> Self {
        Self::standard()
    }
}

impl Board {
    /// A board with no pieces on it.
    pub fn empty() -> Self {
        Self {
            cells: [None; CELLS],
        }
    }

    /// The standard 12-vs-12 starting layout.
    pub fn standard() -> Self {
        let mut board = Self::empty();
        for sq in Square::all().filter(|sq| sq.is_dark()) {
            if COMPUTER_START_ROWS.contains(&sq.row()) {
                board.cells[sq.index()] = Some(Piece::man(Side::Computer));
            } else if PLAYER_START_ROWS.contains(&sq.row()) {
                board.cells[sq.index()] = Some(Piece::man(Side::Player));
            }
        }
        board
    }

    /// Parse a diagram of eight rows, top row first.
    ///
    /// Each row holds eight symbols: `p`/`P` for a Player man/king, `c`/`C`
    /// for a Computer man/king and `.` for an empty cell. Whitespace inside a
    /// row is ignored and blank lines are skipped.
    pub fn from_diagram(diagram: &str) -> Result<Self, BoardError> {
        let rows: Vec<Vec<char>> = diagram
            .lines()
            .map(|line| line.chars().filter(|c| !c.is_whitespace()).collect::<Vec<_>>())
            .filter(|row| !row.is_empty())
            .collect();
        if rows.len() != BOARD_SIZE {
            return Err(BoardError::InvalidDiagram {
                reason: format!("expected {BOARD_SIZE} rows, found {}", rows.len()),
            });
        }

        let mut board = Self::empty();
        for (row, symbols) in rows.iter().enumerate() {
            if symbols.len() != BOARD_SIZE {
                return Err(BoardError::InvalidDiagram {
                    reason: format!("row {row} has {} cells", symbols.len()),
                });
            }
            for (col, &ch) in symbols.iter().enumerate() {
                board.cells[row * BOARD_SIZE + col] = match ch {
                    '.' => None,
                    other => Some(Piece::from_symbol(other).ok_or_else(|| {
                        BoardError::InvalidDiagram {
                            reason: format!("unknown symbol `{other}` at ({row}, {col})"),
                        }
                    })?),
                };
            }
        }
        Ok(board)
    }

    /// Cell state at `(row, col)`.
    pub fn at(&self, row: usize, col: usize) -> Result<Cell, BoardError> {
        Ok(self.get(Square::new(row, col)?))
    }

    #[inline]
    pub fn get(&self, sq: Square) -> Cell {
        self.cells[sq.index()]
    }

    /// A copy of this board with `cell` placed on `sq`.
    pub fn with_cell(mut self, sq: Square, cell: Cell) -> Self {
        self.cells[sq.index()] = cell;
        self
    }

    /// Apply a move, returning the successor board.
    ///
    /// The moving piece is crowned when it lands on its side's promotion row.
    /// Only structural preconditions are checked here: `from` must hold a
    /// piece, `to` must be empty, and a captured square must hold a piece.
    pub fn with_move(&self, mv: &Move) -> Result<Board, BoardError> {
        let Some(mut piece) = self.get(mv.from) else {
            return Err(BoardError::IllegalState {
                reason: "move starts on an empty square",
            });
        };
        if self.get(mv.to).is_some() {
            return Err(BoardError::IllegalState {
                reason: "move lands on an occupied square",
            });
        }

        let mut next = *self;
        next.cells[mv.from.index()] = None;
        if let Some(captured) = mv.captured {
            if next.get(captured).is_none() {
                return Err(BoardError::IllegalState {
                    reason: "capture jumps over an empty square",
                });
            }
            next.cells[captured.index()] = None;
        }
        if mv.to.row() == piece.side.promotion_row() {
            piece.king = true;
        }
        next.cells[mv.to.index()] = Some(piece);
        Ok(next)
    }

    /// All pieces of `side` with their squares, in row-major order.
    pub fn pieces(&self, side: Side) -> impl Iterator<Item = (Square, Piece)> + '_ {
        Square::all().filter_map(move |sq| match self.get(sq) {
            Some(piece) if piece.side == side => Some((sq, piece)),
            _ => None,
        })
    }

    /// Number of pieces (men and kings) belonging to `side`.
    pub fn count(&self, side: Side) -> usize {
        self.cells
            .iter()
            .flatten()
            .filter(|piece| piece.side == side)
            .count()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in 0..BOARD_SIZE {
            for col in 0..BOARD_SIZE {
                let ch = match self.cells[row * BOARD_SIZE + col] {
                    Some(piece) => piece.symbol(),
                    None => '.',
                };
                write!(f, "{ch} ")?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}
