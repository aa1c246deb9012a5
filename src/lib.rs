//! An engine for playing the board game 'Checkers' (8x8 draughts with
//! mandatory capture chains and flying kings)
//!
//! The engine generates legal moves, scores positions and finds the best
//! full turn for a side with a fixed-depth minimax search with
//! alpha-beta pruning. A turn controller sequences whole games between
//! any mix of human and computer players.
//!
//! # Basic Usage
//!
//! ```
//! use checkers_ai::{board::{Board, Side}, solver::Solver, config::Settings};
//!
//! let settings = Settings::default();
//! let mut solver = Solver::new(Board::starting(), Side::White, 1, &settings.bot, 0);
//! let turn = solver.best_turn().expect("the starting position has legal moves");
//!
//! assert!(turn.is_simple());
//! ```

use static_assertions::*;
pub use anyhow;

pub mod board;

pub mod movegen;

pub mod evaluator;

pub mod solver;

pub mod config;

pub mod controller;

mod test;

/// The number of rows and columns of the game board
pub const SIZE: usize = 8;

/// The number of rows each side fills with men at the start of a game
pub const START_ROWS: usize = 3;

// squares are addressed with signed bytes so diagonal steps can go negative
const_assert!(SIZE <= i8::MAX as usize);
// the two camps must not overlap
const_assert!(2 * START_ROWS < SIZE);
