use anyhow::{anyhow, Result};

use std::fmt;

use crate::{SIZE, START_ROWS};

/// The colour of a player, white moves first
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Side {
    White,
    Black,
}

impl Side {
    /// The side to move on the given (zero based) turn index
    pub fn from_turn(turn: usize) -> Self {
        if turn % 2 == 0 {
            Side::White
        } else {
            Side::Black
        }
    }

    pub fn opponent(self) -> Self {
        match self {
            Side::White => Side::Black,
            Side::Black => Side::White,
        }
    }

    /// The row on which this side's men are promoted
    pub fn promotion_row(self) -> i8 {
        match self {
            Side::White => 0,
            Side::Black => SIZE as i8 - 1,
        }
    }

    /// The row delta of a forward step for this side's men
    pub fn forward(self) -> i8 {
        match self {
            Side::White => -1,
            Side::Black => 1,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::White => write!(f, "White"),
            Side::Black => write!(f, "Black"),
        }
    }
}

/// The content of a single square
///
/// The discriminants follow the classic encoding: the value modulo 2
/// identifies the colour and values above 2 are kings.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
#[repr(u8)]
pub enum Cell {
    Empty = 0,
    WhiteMan = 1,
    BlackMan = 2,
    WhiteKing = 3,
    BlackKing = 4,
}

impl Cell {
    pub fn man(side: Side) -> Self {
        match side {
            Side::White => Cell::WhiteMan,
            Side::Black => Cell::BlackMan,
        }
    }

    pub fn king(side: Side) -> Self {
        match side {
            Side::White => Cell::WhiteKing,
            Side::Black => Cell::BlackKing,
        }
    }

    pub fn value(self) -> u8 {
        self as u8
    }

    pub fn is_empty(self) -> bool {
        self == Cell::Empty
    }

    pub fn is_king(self) -> bool {
        self.value() > 2
    }

    pub fn side(self) -> Option<Side> {
        match self {
            Cell::Empty => None,
            _ if self.value() % 2 == 1 => Some(Side::White),
            _ => Some(Side::Black),
        }
    }

    pub fn belongs_to(self, side: Side) -> bool {
        self.side() == Some(side)
    }

    /// The piece after promotion, kings stay kings
    pub fn promoted(self) -> Self {
        match self {
            Cell::WhiteMan => Cell::WhiteKing,
            Cell::BlackMan => Cell::BlackKing,
            other => other,
        }
    }

    fn glyph(self) -> char {
        match self {
            Cell::Empty => '.',
            Cell::WhiteMan => 'w',
            Cell::BlackMan => 'b',
            Cell::WhiteKing => 'W',
            Cell::BlackKing => 'B',
        }
    }

    fn from_glyph(glyph: char) -> Option<Self> {
        match glyph {
            '.' | '_' => Some(Cell::Empty),
            'w' => Some(Cell::WhiteMan),
            'b' => Some(Cell::BlackMan),
            'W' => Some(Cell::WhiteKing),
            'B' => Some(Cell::BlackKing),
            _ => None,
        }
    }
}

impl Default for Cell {
    fn default() -> Self {
        Cell::Empty
    }
}

/// A board coordinate, rows and columns run from 0 to 7
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Square {
    pub row: i8,
    pub col: i8,
}

impl Square {
    pub const fn new(row: i8, col: i8) -> Self {
        Self { row, col }
    }

    pub fn on_board(self) -> bool {
        (0..SIZE as i8).contains(&self.row) && (0..SIZE as i8).contains(&self.col)
    }

    /// Pieces only ever stand on the dark squares
    pub fn is_dark(self) -> bool {
        (self.row + self.col) % 2 == 1
    }

    /// The square `steps` diagonal steps away, if it is still on the board
    pub fn offset(self, (d_row, d_col): (i8, i8), steps: i8) -> Option<Square> {
        let square = Square::new(self.row + d_row * steps, self.col + d_col * steps);
        if square.on_board() {
            Some(square)
        } else {
            None
        }
    }
}

impl fmt::Display for Square {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{})", self.row, self.col)
    }
}

/// A single step of a piece, optionally jumping over a captured piece
///
/// Two moves compare equal when their start and end squares match, the
/// captured square is ignored so a move picked by its endpoints can be
/// looked up in a generated list.
#[derive(Copy, Clone, Debug)]
pub struct Move {
    pub from: Square,
    pub to: Square,
    pub captured: Option<Square>,
}

impl Move {
    pub fn new(from: Square, to: Square) -> Self {
        Self {
            from,
            to,
            captured: None,
        }
    }

    pub fn capture(from: Square, to: Square, captured: Square) -> Self {
        Self {
            from,
            to,
            captured: Some(captured),
        }
    }

    pub fn is_capture(&self) -> bool {
        self.captured.is_some()
    }
}

impl PartialEq for Move {
    fn eq(&self, other: &Self) -> bool {
        self.from == other.from && self.to == other.to
    }
}

impl Eq for Move {}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.captured {
            Some(captured) => write!(f, "{}x{}->{}", self.from, captured, self.to),
            None => write!(f, "{}->{}", self.from, self.to),
        }
    }
}

/// One side's complete move: a first step followed by any number of
/// chained captures made by the same piece
#[derive(Clone, Eq, PartialEq, Debug)]
pub struct Turn {
    moves: Vec<Move>,
}

impl Turn {
    pub fn new(first: Move) -> Self {
        Self { moves: vec![first] }
    }

    /// Builds a turn from a list of moves, checking the chaining rules
    pub fn from_moves(moves: Vec<Move>) -> Result<Self> {
        let first = moves.first().ok_or_else(|| anyhow!("a turn needs at least one move"))?;
        if moves.len() > 1 && !first.is_capture() {
            return Err(anyhow!("only captures can be continued, {} is not one", first));
        }
        for pair in moves.windows(2) {
            if pair[1].from != pair[0].to {
                return Err(anyhow!("{} does not continue from {}", pair[1], pair[0].to));
            }
            if !pair[1].is_capture() {
                return Err(anyhow!("chained move {} is not a capture", pair[1]));
            }
        }
        Ok(Self { moves })
    }

    /// Returns this turn extended by a chained capture
    pub fn then(&self, next: Move) -> Self {
        debug_assert!(next.is_capture() && next.from == self.last().to);
        let mut moves = self.moves.clone();
        moves.push(next);
        Self { moves }
    }

    pub fn moves(&self) -> &[Move] {
        &self.moves
    }

    pub fn first(&self) -> &Move {
        &self.moves[0]
    }

    pub fn last(&self) -> &Move {
        &self.moves[self.moves.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    /// A turn is simple when it is a single non-capturing step
    pub fn is_simple(&self) -> bool {
        self.moves.len() == 1 && !self.moves[0].is_capture()
    }

    pub fn captures(&self) -> usize {
        self.moves.iter().filter(|m| m.is_capture()).count()
    }
}

impl<'a> IntoIterator for &'a Turn {
    type Item = &'a Move;
    type IntoIter = std::slice::Iter<'a, Move>;

    fn into_iter(self) -> Self::IntoIter {
        self.moves.iter()
    }
}

impl fmt::Display for Turn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, m) in self.moves.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", m)?;
        }
        Ok(())
    }
}

/// A snapshot of the 8x8 grid
///
/// Boards are plain values: applying a move returns a new board and leaves
/// the one it was called on as it was.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Board {
    cells: [[Cell; SIZE]; SIZE],
}

impl Board {
    /// An empty board
    pub fn new() -> Self {
        Self {
            cells: [[Cell::Empty; SIZE]; SIZE],
        }
    }

    /// The standard starting position, black on the top three rows and
    /// white on the bottom three
    pub fn starting() -> Self {
        let mut board = Self::new();
        for row in 0..SIZE as i8 {
            for col in 0..SIZE as i8 {
                let square = Square::new(row, col);
                if !square.is_dark() {
                    continue;
                }
                if (row as usize) < START_ROWS {
                    board.set(square, Cell::BlackMan);
                } else if row as usize >= SIZE - START_ROWS {
                    board.set(square, Cell::WhiteMan);
                }
            }
        }
        board
    }

    /// Parses a board from eight rows of eight glyphs, top row first
    ///
    /// `.` is an empty square, `w`/`b` are men and `W`/`B` are kings.
    /// Whitespace inside a row is ignored.
    pub fn from_rows<S: AsRef<str>>(rows: &[S]) -> Result<Self> {
        if rows.len() != SIZE {
            return Err(anyhow!("expected {} rows, found {}", SIZE, rows.len()));
        }
        let mut board = Self::new();
        for (row, line) in rows.iter().enumerate() {
            let glyphs: Vec<char> = line.as_ref().chars().filter(|c| !c.is_whitespace()).collect();
            if glyphs.len() != SIZE {
                return Err(anyhow!(
                    "row {} has {} squares, expected {}",
                    row,
                    glyphs.len(),
                    SIZE
                ));
            }
            for (col, &glyph) in glyphs.iter().enumerate() {
                let cell = Cell::from_glyph(glyph)
                    .ok_or_else(|| anyhow!("could not parse '{}' as a square", glyph))?;
                let square = Square::new(row as i8, col as i8);
                if !cell.is_empty() && !square.is_dark() {
                    return Err(anyhow!("piece on light square {}", square));
                }
                board.set(square, cell);
            }
        }
        Ok(board)
    }

    pub fn get(&self, square: Square) -> Cell {
        self.cells[square.row as usize][square.col as usize]
    }

    pub fn set(&mut self, square: Square, cell: Cell) {
        self.cells[square.row as usize][square.col as usize] = cell;
    }

    /// Iterates over every occupied square together with its piece
    pub fn pieces(&self) -> impl Iterator<Item = (Square, Cell)> + '_ {
        self.cells.iter().enumerate().flat_map(|(row, cells)| {
            cells
                .iter()
                .enumerate()
                .filter(|(_, cell)| !cell.is_empty())
                .map(move |(col, &cell)| (Square::new(row as i8, col as i8), cell))
        })
    }

    /// The number of men and kings a side has left
    pub fn material(&self, side: Side) -> (usize, usize) {
        self.pieces()
            .filter(|(_, cell)| cell.belongs_to(side))
            .fold((0, 0), |(men, kings), (_, cell)| {
                if cell.is_king() {
                    (men, kings + 1)
                } else {
                    (men + 1, kings)
                }
            })
    }

    /// Returns the board after the move, removing the captured piece and
    /// promoting a man that lands on its far row
    pub fn apply(&self, m: &Move) -> Board {
        let mut next = *self;
        if let Some(captured) = m.captured {
            next.set(captured, Cell::Empty);
        }
        let mut piece = next.get(m.from);
        if let Some(side) = piece.side() {
            if m.to.row == side.promotion_row() {
                piece = piece.promoted();
            }
        }
        next.set(m.from, Cell::Empty);
        next.set(m.to, piece);
        next
    }

    /// Applies every move of a turn in order
    pub fn apply_turn(&self, turn: &Turn) -> Board {
        turn.moves().iter().fold(*self, |board, m| board.apply(m))
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for cells in self.cells.iter() {
            let line: String = cells.iter().map(|cell| cell.glyph()).collect();
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}
