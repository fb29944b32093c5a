//! Maze-chase simulation core: one player, four pursuers, one maze.
//!
//! Everything here is a pure per-frame state update; drawing, key polling and
//! the event loop live in the `pacman` binary.

pub mod components;
pub mod config;
pub mod error;
pub mod ghost;
pub mod level;
pub mod motion;
pub mod player;
pub mod round;
pub mod scores;

pub use components::{Cell, Direction, Pixel, TilePos};
pub use config::{Config, PolicyKind, PursuerSpec};
pub use error::{GameError, GameResult};
pub use ghost::{Policy, Pursuer, PursuerState};
pub use level::{Grid, PelletKind, Pellets};
pub use motion::Mover;
pub use player::Player;
pub use round::{PlayerView, PursuerView, Round, RoundEvent, RoundStatus, Snapshot};
pub use scores::{HighScores, NameEntry, ScoreEntry};
