//! Sequencing of whole games
//!
//! The controller alternates the sides, asks either the player (through an
//! [`Input`]) or the [`Solver`] for a turn and commits it to a [`Table`],
//! which owns the live board and its history.

use anyhow::{anyhow, Result};
use log::{debug, info};

use std::fmt;
use std::thread;
use std::time::{Duration, Instant};

use crate::board::{Board, Move, Side, Square};
use crate::config::{Settings, SettingsSource};
use crate::movegen::{advance, MoveGenerator, MoveList};
use crate::solver::Solver;

/// An action requested by the player
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum Event {
    Quit,
    Replay,
    Undo,
    Cell(Square),
}

/// A source of player actions, blocking until the next one arrives
pub trait Input {
    fn next_event(&mut self) -> Result<Event>;
}

/// The final result of a finished game
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum GameResult {
    Draw,
    Winner(Side),
}

impl fmt::Display for GameResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GameResult::Draw => write!(f, "Draw!"),
            GameResult::Winner(side) => write!(f, "{} wins!", side),
        }
    }
}

/// How a single game ended
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum GameExit {
    Over(GameResult),
    Quit,
    Replay,
}

/// The live board together with the boards at the start of every
/// committed turn, plus whatever display goes with it
///
/// The visual hooks default to doing nothing.
pub trait Table {
    fn board(&self) -> Board;

    /// Puts the starting position back and clears the history
    fn reset(&mut self) -> Result<()>;

    /// Plays a move on the live board, `beat_series` counts the captures
    /// made so far in the current turn
    fn commit(&mut self, m: &Move, beat_series: usize) -> Result<()>;

    /// Records the live board once a turn is complete
    fn push_history(&mut self) -> Result<()>;

    /// Drops the latest recorded board and makes the one before it live
    fn rollback(&mut self) -> Result<()>;

    fn history_len(&self) -> usize;

    fn highlight(&mut self, _squares: &[Square]) -> Result<()> {
        Ok(())
    }

    fn set_active(&mut self, _square: Option<Square>) -> Result<()> {
        Ok(())
    }

    fn show_result(&mut self, _result: GameResult) -> Result<()> {
        Ok(())
    }
}

/// A table that keeps everything in memory and draws nothing
#[derive(Clone, Debug)]
pub struct MemoryTable {
    start: Board,
    board: Board,
    history: Vec<Board>,
    pub beat_series: usize,
    pub highlighted: Vec<Square>,
    pub active: Option<Square>,
    pub result: Option<GameResult>,
}

impl MemoryTable {
    pub fn new() -> Self {
        Self::with_start(Board::starting())
    }

    /// A table whose games start from `start` instead of the usual setup
    pub fn with_start(start: Board) -> Self {
        Self {
            start,
            board: start,
            history: vec![start],
            beat_series: 0,
            highlighted: Vec::new(),
            active: None,
            result: None,
        }
    }
}

impl Default for MemoryTable {
    fn default() -> Self {
        Self::new()
    }
}

impl Table for MemoryTable {
    fn board(&self) -> Board {
        self.board
    }

    fn reset(&mut self) -> Result<()> {
        self.board = self.start;
        self.history = vec![self.start];
        self.beat_series = 0;
        self.highlighted.clear();
        self.active = None;
        self.result = None;
        Ok(())
    }

    fn commit(&mut self, m: &Move, beat_series: usize) -> Result<()> {
        self.board = self.board.apply(m);
        self.beat_series = beat_series;
        Ok(())
    }

    fn push_history(&mut self) -> Result<()> {
        self.history.push(self.board);
        Ok(())
    }

    fn rollback(&mut self) -> Result<()> {
        if self.history.len() > 1 {
            self.history.pop();
        }
        if let Some(&board) = self.history.last() {
            self.board = board;
        }
        Ok(())
    }

    fn history_len(&self) -> usize {
        self.history.len()
    }

    fn highlight(&mut self, squares: &[Square]) -> Result<()> {
        self.highlighted = squares.to_vec();
        Ok(())
    }

    fn set_active(&mut self, square: Option<Square>) -> Result<()> {
        self.active = square;
        Ok(())
    }

    fn show_result(&mut self, result: GameResult) -> Result<()> {
        self.result = Some(result);
        Ok(())
    }
}

/// Input for games without human players, every request is answered with
/// [`Event::Quit`]
#[derive(Copy, Clone, Debug, Default)]
pub struct NoInput;

impl Input for NoInput {
    fn next_event(&mut self) -> Result<Event> {
        Ok(Event::Quit)
    }
}

/// Progress of the game in play
#[derive(Copy, Clone, Eq, PartialEq, Debug, Default)]
pub struct Session {
    /// Zero based index of the turn in play, white moves on even turns
    pub turn: usize,
    /// Captures made so far in the turn in play
    pub beat_series: usize,
}

impl Session {
    pub fn side(&self) -> Side {
        Side::from_turn(self.turn)
    }
}

/// What became of a human turn
enum Response {
    Ok,
    Undo,
    Replay,
    Quit,
}

/// Plays games on a table, taking turns from the input or the solver
pub struct Controller<T, I, S> {
    table: T,
    input: I,
    source: S,
    settings: Settings,
    generator: MoveGenerator,
    seed: Option<u64>,
    session: Session,
}

impl<T: Table, I: Input, S: SettingsSource> Controller<T, I, S> {
    pub fn new(table: T, input: I, source: S) -> Self {
        Self {
            table,
            input,
            source,
            settings: Settings::default(),
            generator: MoveGenerator::from_seed(0),
            seed: None,
            session: Session::default(),
        }
    }

    /// Fixes the seed of every game, overriding the `no_random` setting
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn table(&self) -> &T {
        &self.table
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn session(&self) -> Session {
        self.session
    }

    /// Plays games until the player quits
    ///
    /// Returns the result of the last finished game, or `None` if the
    /// player quit in the middle of one.
    pub fn play(&mut self) -> Result<Option<GameResult>> {
        'games: loop {
            let result = match self.play_game()? {
                GameExit::Quit => return Ok(None),
                GameExit::Replay => continue 'games,
                GameExit::Over(result) => result,
            };
            self.table.show_result(result)?;
            loop {
                match self.input.next_event()? {
                    Event::Replay => continue 'games,
                    Event::Quit => return Ok(Some(result)),
                    _ => {}
                }
            }
        }
    }

    /// Plays a single game from the starting position with freshly loaded
    /// settings
    pub fn play_game(&mut self) -> Result<GameExit> {
        let start = Instant::now();

        self.settings = self.source.load()?;
        self.generator = match self.seed {
            Some(seed) => MoveGenerator::from_seed(seed),
            None => MoveGenerator::new(self.settings.bot.no_random),
        };
        self.table.reset()?;
        self.session = Session::default();

        let max_turns = self.settings.game.max_turns;
        let exit = loop {
            if self.session.turn >= max_turns {
                break GameExit::Over(GameResult::Draw);
            }
            self.session.beat_series = 0;

            let side = self.session.side();
            let moves = self.generator.generate(&self.table.board(), side);
            if moves.is_empty() {
                break GameExit::Over(GameResult::Winner(side.opponent()));
            }

            if self.settings.is_bot(side) {
                self.bot_turn(side)?;
            } else {
                match self.human_turn(side, &moves)? {
                    Response::Ok => {}
                    Response::Undo => {
                        self.undo(side)?;
                        continue;
                    }
                    Response::Quit => break GameExit::Quit,
                    Response::Replay => break GameExit::Replay,
                }
            }
            self.table.push_history()?;
            self.session.turn += 1;
        };

        info!(
            "Game time: {} millisec ({:?} after {} turns)",
            start.elapsed().as_millis(),
            exit,
            self.session.turn
        );
        Ok(exit)
    }

    fn bot_turn(&mut self, side: Side) -> Result<()> {
        let start = Instant::now();
        let delay = Duration::from_millis(self.settings.bot.delay_ms);

        // keep the bot from moving faster than the configured delay
        let pacing = thread::spawn(move || thread::sleep(delay));
        let mut solver = Solver::new(
            self.table.board(),
            side,
            self.settings.depth(side),
            &self.settings.bot,
            self.generator.next_seed(),
        );
        let turn = solver.best_turn();
        pacing
            .join()
            .map_err(|_| anyhow!("bot pacing thread panicked"))?;
        let turn =
            turn.ok_or_else(|| anyhow!("search found no turn although {} can move", side))?;

        for (i, m) in turn.moves().iter().enumerate() {
            if i > 0 {
                thread::sleep(delay);
            }
            if m.is_capture() {
                self.session.beat_series += 1;
            }
            self.table.commit(m, self.session.beat_series)?;
        }

        info!(
            "Bot turn time: {} millisec ({} played {}, {} nodes)",
            start.elapsed().as_millis(),
            side,
            turn,
            solver.node_count
        );
        Ok(())
    }

    fn human_turn(&mut self, side: Side, moves: &MoveList) -> Result<Response> {
        let mut movable: Vec<Square> = Vec::new();
        for m in moves.iter() {
            if !movable.contains(&m.from) {
                movable.push(m.from);
            }
        }
        self.table.highlight(&movable)?;

        // pick a piece, then one of its destinations
        let mut selected: Option<Square> = None;
        let mut current = loop {
            let square = match self.input.next_event()? {
                Event::Cell(square) => square,
                Event::Undo => return Ok(Response::Undo),
                Event::Replay => return Ok(Response::Replay),
                Event::Quit => return Ok(Response::Quit),
            };
            if let Some(m) = selected.and_then(|from| moves.find(from, square)) {
                break m;
            }
            if moves.starts_at(square) {
                selected = Some(square);
                let targets: Vec<Square> = moves
                    .iter()
                    .filter(|m| m.from == square)
                    .map(|m| m.to)
                    .collect();
                self.table.set_active(Some(square))?;
                self.table.highlight(&targets)?;
            } else if selected.take().is_some() {
                debug!("{} is not a legal selection, starting over", square);
                self.table.set_active(None)?;
                self.table.highlight(&movable)?;
            }
        };

        // keep capturing with the same piece while it can
        loop {
            let step = advance(&self.table.board(), &current);
            self.table.highlight(&[])?;
            self.table.set_active(None)?;
            if current.is_capture() {
                self.session.beat_series += 1;
            }
            self.table.commit(&current, self.session.beat_series)?;
            if !step.chain_open {
                return Ok(Response::Ok);
            }

            let from = current.to;
            let continuations = self.generator.generate_square(&step.board, side, from);
            let targets: Vec<Square> = continuations.iter().map(|m| m.to).collect();
            self.table.highlight(&targets)?;
            self.table.set_active(Some(from))?;

            current = loop {
                match self.input.next_event()? {
                    Event::Cell(square) => {
                        if let Some(m) = continuations.find(from, square) {
                            break m;
                        }
                    }
                    Event::Undo => debug!("undo refused in the middle of a capture chain"),
                    Event::Replay => return Ok(Response::Replay),
                    Event::Quit => return Ok(Response::Quit),
                }
            };
        }
    }

    /// Takes back the last turn of `side`, skipping over a bot turn made
    /// in between
    ///
    /// Only reached before the first move of a turn, requests made during a
    /// capture chain are dropped by [`Controller::human_turn`].
    fn undo(&mut self, side: Side) -> Result<()> {
        let history = self.table.history_len();
        if history < 2 {
            debug!("undo refused with {} boards of history", history);
            return Ok(());
        }
        let steps = if self.settings.is_bot(side.opponent()) && history > 2 {
            2
        } else {
            1
        };
        for _ in 0..steps {
            self.table.rollback()?;
        }
        self.session.turn = self.session.turn.saturating_sub(steps);
        info!("{} took back {} turn(s)", side, steps);
        Ok(())
    }
}
