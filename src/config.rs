//! Game and bot settings, read from a TOML file
//!
//! Every key is optional, missing keys take the values of
//! [`Settings::default`].

use anyhow::{Context, Result};
use serde::Deserialize;

use std::fs;
use std::path::{Path, PathBuf};

use crate::board::Side;
use crate::evaluator::ScoringMode;
use crate::solver::Optimization;

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// File that receives the log output of the terminal front-end
    pub log_file: Option<PathBuf>,
    pub game: GameSettings,
    pub bot: BotSettings,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    /// A game reaching this many turns is a draw
    pub max_turns: usize,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self { max_turns: 120 }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct BotSettings {
    pub white_bot: bool,
    pub black_bot: bool,
    /// Search depth of the white bot in turns
    pub white_level: usize,
    /// Search depth of the black bot in turns
    pub black_level: usize,
    /// Minimum time a bot takes per turn and pause between chained captures
    pub delay_ms: u64,
    pub scoring: ScoringMode,
    pub optimization: Optimization,
    /// Use a fixed seed so games are reproducible
    pub no_random: bool,
    /// Search the root moves on the rayon thread pool
    pub parallel: bool,
}

impl Default for BotSettings {
    fn default() -> Self {
        Self {
            white_bot: false,
            black_bot: true,
            white_level: 5,
            black_level: 5,
            delay_ms: 300,
            scoring: ScoringMode::default(),
            optimization: Optimization::default(),
            no_random: false,
            parallel: true,
        }
    }
}

impl BotSettings {
    pub fn is_bot(&self, side: Side) -> bool {
        match side {
            Side::White => self.white_bot,
            Side::Black => self.black_bot,
        }
    }

    pub fn depth(&self, side: Side) -> usize {
        match side {
            Side::White => self.white_level,
            Side::Black => self.black_level,
        }
    }
}

impl Settings {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("invalid config file {}", path.display()))
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn is_bot(&self, side: Side) -> bool {
        self.bot.is_bot(side)
    }

    pub fn depth(&self, side: Side) -> usize {
        self.bot.depth(side)
    }
}

/// Somewhere settings can be (re)loaded from at the start of each game
pub trait SettingsSource {
    fn load(&mut self) -> Result<Settings>;
}

/// Fixed settings that never change between games
impl SettingsSource for Settings {
    fn load(&mut self) -> Result<Settings> {
        Ok(self.clone())
    }
}

/// Settings re-read from disk whenever a game starts
#[derive(Clone, Debug)]
pub struct ConfigFile {
    pub path: PathBuf,
}

impl ConfigFile {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }
}

impl SettingsSource for ConfigFile {
    fn load(&mut self) -> Result<Settings> {
        Settings::from_file(&self.path)
    }
}
