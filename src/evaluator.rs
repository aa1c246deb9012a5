//! Static position scoring
//!
//! Scores are material ratios seen from one side: the opponent's weighted
//! material divided by the side's own, so lower is better for that side.

use serde::Deserialize;

use crate::board::{Board, Cell, Side};
use crate::SIZE;

/// The score of a position where the scoring side has no pieces left
pub const LOST_SCORE: f64 = 1e9;

/// The score of a position where the opponent has no pieces left
pub const WON_SCORE: f64 = 0.0;

/// Bonus per row a man has advanced from its own back row
const POTENTIAL_BONUS: f64 = 0.05;

/// How positions are scored by the bots
#[derive(Copy, Clone, Eq, PartialEq, Debug, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoringMode {
    /// Counts men and kings
    Number,
    /// Counts men and kings and rewards men for advancing towards promotion
    NumberAndPotential,
}

impl ScoringMode {
    /// The weight of a king relative to a man
    pub fn king_weight(self) -> f64 {
        match self {
            ScoringMode::Number => 4.0,
            ScoringMode::NumberAndPotential => 5.0,
        }
    }
}

impl Default for ScoringMode {
    fn default() -> Self {
        ScoringMode::NumberAndPotential
    }
}

#[derive(Copy, Clone, Default)]
struct Tally {
    pieces: usize,
    men: f64,
    kings: f64,
}

impl Tally {
    fn weighted(&self, mode: ScoringMode) -> f64 {
        self.men + self.kings * mode.king_weight()
    }
}

/// Scores `board` from the point of view of `side`
///
/// Returns [`LOST_SCORE`] when `side` has no material, [`WON_SCORE`] when
/// the opponent has none and the opponent/own weighted material ratio
/// otherwise.
pub fn score(board: &Board, side: Side, mode: ScoringMode) -> f64 {
    let mut own = Tally::default();
    let mut opponent = Tally::default();

    for (square, cell) in board.pieces() {
        let tally = if cell.belongs_to(side) {
            &mut own
        } else {
            &mut opponent
        };
        tally.pieces += 1;
        match cell {
            Cell::WhiteKing | Cell::BlackKing => tally.kings += 1.0,
            _ => {
                tally.men += 1.0;
                if mode == ScoringMode::NumberAndPotential {
                    // rows travelled from the man's own back row
                    let advanced = match cell {
                        Cell::WhiteMan => SIZE as i8 - 1 - square.row,
                        _ => square.row,
                    };
                    tally.men += POTENTIAL_BONUS * advanced as f64;
                }
            }
        }
    }

    if own.pieces == 0 {
        return LOST_SCORE;
    }
    if opponent.pieces == 0 {
        return WON_SCORE;
    }
    opponent.weighted(mode) / own.weighted(mode)
}
