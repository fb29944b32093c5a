use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GameError {
    #[error("maze layout is empty")]
    EmptyLayout,

    #[error("maze row {row} has width {got}, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        got: usize,
    },

    #[error("unknown maze cell {ch:?} at ({x}, {y})")]
    UnknownCell { ch: char, x: usize, y: usize },

    #[error("tile size must be a positive even number of pixels, got {0}")]
    TileSize(i32),

    #[error("{what} tile ({x}, {y}) is not walkable")]
    Blocked { what: String, x: i32, y: i32 },

    #[error("score file i/o: {0}")]
    Io(#[from] io::Error),

    #[error("score file format: {0}")]
    Json(#[from] serde_json::Error),
}

pub type GameResult<T> = Result<T, GameError>;
