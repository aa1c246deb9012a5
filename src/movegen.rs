//! Legal move generation
//!
//! Captures always take precedence: whenever a capture exists for the
//! pieces being considered, plain moves are left out of the result.

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::board::{Board, Move, Side, Square};

/// The four diagonal directions as (row, column) deltas
pub const DIRECTIONS: [(i8, i8); 4] = [(-1, -1), (-1, 1), (1, -1), (1, 1)];

/// A list of legal moves and whether they are captures
///
/// Either every move in the list captures or none does.
#[derive(Clone, Debug, Default)]
pub struct MoveList {
    pub moves: Vec<Move>,
    pub captures: bool,
}

impl MoveList {
    pub fn is_empty(&self) -> bool {
        self.moves.is_empty()
    }

    pub fn len(&self) -> usize {
        self.moves.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Move> {
        self.moves.iter()
    }

    /// Looks up a move by its endpoints, returning the generated move with
    /// its captured square filled in
    pub fn find(&self, from: Square, to: Square) -> Option<Move> {
        let probe = Move::new(from, to);
        self.moves.iter().copied().find(|m| *m == probe)
    }

    pub fn starts_at(&self, square: Square) -> bool {
        self.moves.iter().any(|m| m.from == square)
    }

    fn extend(&mut self, other: MoveList) {
        if other.captures && !self.captures {
            // the first capture found discards every plain move collected so far
            self.moves.clear();
            self.captures = true;
        }
        if other.captures == self.captures {
            self.moves.extend(other.moves);
        }
    }
}

/// The result of playing a move: the new board and whether the same piece
/// must keep capturing
#[derive(Copy, Clone, Debug)]
pub struct Step {
    pub board: Board,
    pub chain_open: bool,
}

/// Plays a move, reporting whether the moved piece has a further capture
/// from its landing square
pub fn advance(board: &Board, m: &Move) -> Step {
    let next = board.apply(m);
    let chain_open = m.is_capture() && piece_moves(&next, m.to).captures;
    Step {
        board: next,
        chain_open,
    }
}

/// Generates the moves of the piece on `square` in generation order
///
/// An empty square yields no moves.
pub fn piece_moves(board: &Board, square: Square) -> MoveList {
    let piece = board.get(square);
    let side = match piece.side() {
        Some(side) => side,
        None => return MoveList::default(),
    };

    let mut moves = Vec::new();
    if piece.is_king() {
        for &direction in DIRECTIONS.iter() {
            let mut captured = None;
            let mut steps = 1;
            while let Some(target) = square.offset(direction, steps) {
                steps += 1;
                let cell = board.get(target);
                if !cell.is_empty() {
                    // stop at a friendly piece or a second piece in a row
                    if cell.belongs_to(side) || captured.is_some() {
                        break;
                    }
                    captured = Some(target);
                    continue;
                }
                if let Some(captured) = captured {
                    moves.push(Move::capture(square, target, captured));
                }
            }
        }
    } else {
        for &direction in DIRECTIONS.iter() {
            let (over, landing) = match (square.offset(direction, 1), square.offset(direction, 2)) {
                (Some(over), Some(landing)) => (over, landing),
                _ => continue,
            };
            if board.get(landing).is_empty() && board.get(over).belongs_to(side.opponent()) {
                moves.push(Move::capture(square, landing, over));
            }
        }
    }
    if !moves.is_empty() {
        return MoveList {
            moves,
            captures: true,
        };
    }

    if piece.is_king() {
        for &direction in DIRECTIONS.iter() {
            let mut steps = 1;
            while let Some(target) = square.offset(direction, steps) {
                if !board.get(target).is_empty() {
                    break;
                }
                moves.push(Move::new(square, target));
                steps += 1;
            }
        }
    } else {
        for &d_col in [-1, 1].iter() {
            if let Some(target) = square.offset((side.forward(), d_col), 1) {
                if board.get(target).is_empty() {
                    moves.push(Move::new(square, target));
                }
            }
        }
    }
    MoveList {
        moves,
        captures: false,
    }
}

/// Generates the moves of every piece of `side` in board order, keeping
/// only captures when any piece can capture
pub fn side_moves(board: &Board, side: Side) -> MoveList {
    let mut list = MoveList::default();
    for (square, cell) in board.pieces() {
        if cell.belongs_to(side) {
            list.extend(piece_moves(board, square));
        }
    }
    list
}

/// A move generator with an explicit, seedable source of randomness
///
/// Every generated list is shuffled so equally scored moves are explored
/// in a varying order. A fixed seed gives reproducible lists.
#[derive(Clone, Debug)]
pub struct MoveGenerator {
    rng: Xoshiro256PlusPlus,
}

impl MoveGenerator {
    pub fn from_seed(seed: u64) -> Self {
        Self {
            rng: Xoshiro256PlusPlus::seed_from_u64(seed),
        }
    }

    /// A generator seeded with 0 when `no_random` is set, otherwise with a
    /// fresh random seed
    pub fn new(no_random: bool) -> Self {
        if no_random {
            Self::from_seed(0)
        } else {
            Self::from_seed(rand::random())
        }
    }

    /// Draws a seed for a derived generator
    pub fn next_seed(&mut self) -> u64 {
        use rand::RngCore;
        self.rng.next_u64()
    }

    /// All legal moves for `side`, shuffled
    pub fn generate(&mut self, board: &Board, side: Side) -> MoveList {
        let mut list = side_moves(board, side);
        list.moves.shuffle(&mut self.rng);
        list
    }

    /// The legal moves of the piece on `square`, shuffled
    ///
    /// The result is empty when the square does not hold a piece of `side`.
    pub fn generate_square(&mut self, board: &Board, side: Side, square: Square) -> MoveList {
        if !board.get(square).belongs_to(side) {
            return MoveList::default();
        }
        let mut list = piece_moves(board, square);
        list.moves.shuffle(&mut self.rng);
        list
    }
}
