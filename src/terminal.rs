use anyhow::Result;
use crossterm::{
    cursor::{Hide, MoveTo, Show},
    event::{
        self as term, DisableMouseCapture, EnableMouseCapture, KeyCode, KeyEvent, KeyModifiers,
        MouseButton, MouseEvent,
    },
    style::{style, Attribute, Color, PrintStyledContent},
    terminal::{
        disable_raw_mode, enable_raw_mode, Clear, ClearType, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
    ExecutableCommand, QueueableCommand,
};

use std::io::{stdout, Write};

use checkers_ai::board::{Board, Cell, Move, Side, Square};
use checkers_ai::controller::{Event, GameResult, Input, MemoryTable, Table};
use checkers_ai::SIZE;

// screen position of the top left square
const BOARD_X: u16 = 3;
const BOARD_Y: u16 = 2;
const CELL_WIDTH: u16 = 3;

fn cell_position(square: Square) -> (u16, u16) {
    (
        BOARD_X + square.col as u16 * CELL_WIDTH,
        BOARD_Y + square.row as u16,
    )
}

fn square_at(x: u16, y: u16) -> Option<Square> {
    if x < BOARD_X || y < BOARD_Y {
        return None;
    }
    let (row, col) = (y - BOARD_Y, (x - BOARD_X) / CELL_WIDTH);
    if row >= SIZE as u16 || col >= SIZE as u16 {
        return None;
    }
    Some(Square::new(row as i8, col as i8))
}

/// Switches the terminal into raw mode on an alternate screen and
/// restores it when dropped
pub struct TerminalGuard;

impl TerminalGuard {
    pub fn enter() -> Result<Self> {
        enable_raw_mode()?;
        stdout()
            .execute(EnterAlternateScreen)?
            .execute(EnableMouseCapture)?
            .execute(Hide)?;
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let mut stdout = stdout();
        let _ = stdout.execute(DisableMouseCapture);
        let _ = stdout.execute(Show);
        let _ = stdout.execute(LeaveAlternateScreen);
        let _ = disable_raw_mode();
    }
}

/// Draws the game on the terminal
pub struct TerminalTable {
    table: MemoryTable,
}

impl TerminalTable {
    pub fn new() -> Self {
        Self {
            table: MemoryTable::new(),
        }
    }

    fn status(&self) -> String {
        if let Some(result) = self.table.result {
            return format!("{} Press r to play again or q to quit.", result);
        }
        let side = Side::from_turn(self.table.history_len() - 1);
        if self.table.beat_series > 0 {
            format!("{} to move, {} captured this turn", side, self.table.beat_series)
        } else {
            format!("{} to move", side)
        }
    }

    pub fn display(&self) -> Result<()> {
        let mut stdout = stdout();
        let board = self.table.board();

        stdout
            .queue(Clear(ClearType::All))?
            .queue(MoveTo(0, 0))?
            .queue(PrintStyledContent(
                style("Checkers").attribute(Attribute::Bold),
            ))?;

        for col in 0..SIZE as i8 {
            let (x, _) = cell_position(Square::new(0, col));
            stdout
                .queue(MoveTo(x + 1, BOARD_Y - 1))?
                .queue(PrintStyledContent(style(col.to_string())))?;
        }

        for row in 0..SIZE as i8 {
            stdout
                .queue(MoveTo(1, BOARD_Y + row as u16))?
                .queue(PrintStyledContent(style(row.to_string())))?;
            for col in 0..SIZE as i8 {
                let square = Square::new(row, col);
                let (x, y) = cell_position(square);
                let background = if self.table.active == Some(square) {
                    Color::DarkYellow
                } else if self.table.highlighted.contains(&square) {
                    Color::DarkGreen
                } else if square.is_dark() {
                    Color::DarkGrey
                } else {
                    Color::Grey
                };
                let (glyph, colour) = match board.get(square) {
                    Cell::Empty => ("   ", Color::White),
                    Cell::WhiteMan => (" o ", Color::White),
                    Cell::BlackMan => (" o ", Color::Black),
                    Cell::WhiteKing => (" K ", Color::White),
                    Cell::BlackKing => (" K ", Color::Black),
                };
                stdout.queue(MoveTo(x, y))?.queue(PrintStyledContent(
                    style(glyph)
                        .attribute(Attribute::Bold)
                        .on(background)
                        .with(colour),
                ))?;
            }
        }

        let bottom = BOARD_Y + SIZE as u16 + 1;
        stdout
            .queue(MoveTo(0, bottom))?
            .queue(PrintStyledContent(style(self.status())))?
            .queue(MoveTo(0, bottom + 1))?
            .queue(PrintStyledContent(style(
                "arrows/hjkl move, enter/space or click selects, u undo, r replay, q quit",
            )))?;
        stdout.flush()?;
        Ok(())
    }
}

impl Table for TerminalTable {
    fn board(&self) -> Board {
        self.table.board()
    }

    fn reset(&mut self) -> Result<()> {
        self.table.reset()?;
        self.display()
    }

    fn commit(&mut self, m: &Move, beat_series: usize) -> Result<()> {
        self.table.commit(m, beat_series)?;
        self.display()
    }

    fn push_history(&mut self) -> Result<()> {
        self.table.push_history()?;
        self.table.beat_series = 0;
        self.display()
    }

    fn rollback(&mut self) -> Result<()> {
        self.table.rollback()?;
        self.display()
    }

    fn history_len(&self) -> usize {
        self.table.history_len()
    }

    fn highlight(&mut self, squares: &[Square]) -> Result<()> {
        self.table.highlight(squares)?;
        self.display()
    }

    fn set_active(&mut self, square: Option<Square>) -> Result<()> {
        self.table.set_active(square)?;
        self.display()
    }

    fn show_result(&mut self, result: GameResult) -> Result<()> {
        self.table.show_result(result)?;
        self.display()
    }
}

/// Reads keyboard and mouse events, keeping a cursor on the board
pub struct TerminalInput {
    cursor: Square,
}

impl TerminalInput {
    pub fn new() -> Self {
        Self {
            cursor: Square::new(SIZE as i8 - 1, 0),
        }
    }

    fn shift(&mut self, d_row: i8, d_col: i8) {
        if let Some(square) = self.cursor.offset((d_row, d_col), 1) {
            self.cursor = square;
        }
    }
}

impl Input for TerminalInput {
    fn next_event(&mut self) -> Result<Event> {
        loop {
            let (x, y) = cell_position(self.cursor);
            stdout().execute(MoveTo(x + 1, y))?.execute(Show)?;

            match term::read()? {
                term::Event::Key(KeyEvent { code, modifiers }) => match code {
                    KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => {
                        return Ok(Event::Quit)
                    }
                    KeyCode::Char('q') | KeyCode::Esc => return Ok(Event::Quit),
                    KeyCode::Char('r') => return Ok(Event::Replay),
                    KeyCode::Char('u') => return Ok(Event::Undo),
                    KeyCode::Enter | KeyCode::Char(' ') => return Ok(Event::Cell(self.cursor)),
                    KeyCode::Up | KeyCode::Char('k') => self.shift(-1, 0),
                    KeyCode::Down | KeyCode::Char('j') => self.shift(1, 0),
                    KeyCode::Left | KeyCode::Char('h') => self.shift(0, -1),
                    KeyCode::Right | KeyCode::Char('l') => self.shift(0, 1),
                    _ => {}
                },
                term::Event::Mouse(MouseEvent::Down(MouseButton::Left, x, y, _)) => {
                    if let Some(square) = square_at(x, y) {
                        self.cursor = square;
                        return Ok(Event::Cell(square));
                    }
                }
                _ => {}
            }
        }
    }
}
