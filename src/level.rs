use std::collections::HashSet;

use crate::components::{Cell, Direction, Pixel, TilePos};
use crate::config::Config;
use crate::error::{GameError, GameResult};

/// Static maze: cell kinds plus the geometry needed to map tiles to pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    width: i32,
    height: i32,
    tile_size: i32,
    cells: Vec<Cell>,
}

impl Grid {
    pub fn from_config(config: &Config) -> GameResult<Self> {
        Self::from_layout(&config.layout, config.tile_size)
    }

    pub fn from_layout<S: AsRef<str>>(rows: &[S], tile_size: i32) -> GameResult<Self> {
        if tile_size <= 0 || tile_size % 2 != 0 {
            return Err(GameError::TileSize(tile_size));
        }
        let width = rows.first().map(|r| r.as_ref().chars().count()).unwrap_or(0);
        if width == 0 {
            return Err(GameError::EmptyLayout);
        }

        let mut cells = Vec::with_capacity(width * rows.len());
        for (y, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            let got = row.chars().count();
            if got != width {
                return Err(GameError::RaggedRow {
                    row: y,
                    expected: width,
                    got,
                });
            }
            for (x, ch) in row.chars().enumerate() {
                let cell = Cell::from_layout_char(ch).ok_or(GameError::UnknownCell { ch, x, y })?;
                cells.push(cell);
            }
        }

        Ok(Grid {
            width: width as i32,
            height: rows.len() as i32,
            tile_size,
            cells,
        })
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn tile_size(&self) -> i32 {
        self.tile_size
    }

    pub fn pixel_width(&self) -> i32 {
        self.width * self.tile_size
    }

    /// Horizontal tunnel wrap. Rows are left alone.
    pub fn wrap(&self, tile: TilePos) -> TilePos {
        TilePos {
            x: tile.x.rem_euclid(self.width),
            y: tile.y,
        }
    }

    pub fn neighbor(&self, tile: TilePos, dir: Direction) -> TilePos {
        self.wrap(tile.offset(dir))
    }

    /// Cell kind after wrapping; rows outside the maze read as walls.
    pub fn cell(&self, tile: TilePos) -> Cell {
        let tile = self.wrap(tile);
        if tile.y < 0 || tile.y >= self.height {
            return Cell::Wall;
        }
        self.cells[(tile.y * self.width + tile.x) as usize]
    }

    pub fn is_walkable(&self, tile: TilePos, allow_door: bool) -> bool {
        match self.cell(tile) {
            Cell::Wall => false,
            Cell::GhostDoor => allow_door,
            _ => true,
        }
    }

    pub fn center(&self, tile: TilePos) -> Pixel {
        Pixel {
            x: tile.x * self.tile_size + self.tile_size / 2,
            y: tile.y * self.tile_size + self.tile_size / 2,
        }
    }

    /// Tile whose square contains `pixel`, wrapped into the maze.
    pub fn tile_at(&self, pixel: Pixel) -> TilePos {
        self.wrap(TilePos {
            x: pixel.x.div_euclid(self.tile_size),
            y: pixel.y.div_euclid(self.tile_size),
        })
    }

    pub fn pellets(&self) -> Pellets {
        let mut pellets = Pellets::default();
        for y in 0..self.height {
            for x in 0..self.width {
                let tile = TilePos { x, y };
                match self.cell(tile) {
                    Cell::Pellet => {
                        pellets.pellets.insert(tile);
                    }
                    Cell::PowerPellet => {
                        pellets.power.insert(tile);
                    }
                    _ => {}
                }
            }
        }
        pellets
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PelletKind {
    Normal,
    Power,
}

/// Remaining pellets. Rebuilt from the grid at round start and on level clear.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Pellets {
    pellets: HashSet<TilePos>,
    power: HashSet<TilePos>,
}

impl Pellets {
    pub fn eat(&mut self, tile: TilePos) -> Option<PelletKind> {
        if self.pellets.remove(&tile) {
            Some(PelletKind::Normal)
        } else if self.power.remove(&tile) {
            Some(PelletKind::Power)
        } else {
            None
        }
    }

    pub fn has_pellet(&self, tile: TilePos) -> bool {
        self.pellets.contains(&tile)
    }

    pub fn has_power(&self, tile: TilePos) -> bool {
        self.power.contains(&tile)
    }

    pub fn pellets(&self) -> &HashSet<TilePos> {
        &self.pellets
    }

    pub fn power(&self) -> &HashSet<TilePos> {
        &self.power
    }

    pub fn remaining(&self) -> usize {
        self.pellets.len() + self.power.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pellets.is_empty() && self.power.is_empty()
    }
}
