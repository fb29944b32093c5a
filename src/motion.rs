//! Tile-quantized motion shared by the player and the pursuers.
//!
//! A mover is either idle on a tile center or transitioning toward one
//! adjacent tile. Transitions only start from idle, advance a fixed number of
//! pixels per frame and finish by snapping to the exact target center, so no
//! rounding error survives a completed step.

use crate::components::{Direction, Pixel, TilePos};
use crate::level::Grid;

#[derive(Debug, Clone, PartialEq)]
pub struct Mover {
    tile: TilePos,
    target: TilePos,
    pixel: Pixel,
    direction: Direction,
    moving: bool,
}

impl Mover {
    pub fn new(grid: &Grid, tile: TilePos) -> Self {
        Self {
            tile,
            target: tile,
            pixel: grid.center(tile),
            direction: Direction::None,
            moving: false,
        }
    }

    pub fn tile(&self) -> TilePos {
        self.tile
    }

    pub fn target(&self) -> TilePos {
        self.target
    }

    pub fn pixel(&self) -> Pixel {
        self.pixel
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn is_idle(&self) -> bool {
        !self.moving
    }

    /// Drops the mover, idle, on `tile`.
    pub fn place(&mut self, grid: &Grid, tile: TilePos, direction: Direction) {
        self.tile = tile;
        self.target = tile;
        self.pixel = grid.center(tile);
        self.direction = direction;
        self.moving = false;
    }

    /// Starts a transition toward the neighbour in `dir` if idle and walkable.
    pub fn try_start(&mut self, grid: &Grid, dir: Direction, allow_door: bool) -> bool {
        if self.moving || dir.is_none() {
            return false;
        }
        let next = grid.neighbor(self.tile, dir);
        if !grid.is_walkable(next, allow_door) {
            return false;
        }
        self.target = next;
        self.direction = dir;
        self.moving = true;
        true
    }

    /// One frame of interpolation. Returns true when the transition completed.
    pub fn advance(&mut self, grid: &Grid, speed: i32) -> bool {
        if !self.moving {
            return false;
        }
        let goal = self.goal_pixel(grid);
        let diff_x = goal.x - self.pixel.x;
        let diff_y = goal.y - self.pixel.y;

        if diff_x.abs() <= speed && diff_y.abs() <= speed {
            self.tile = self.target;
            self.pixel = grid.center(self.tile);
            self.moving = false;
            return true;
        }

        self.pixel.x += diff_x.signum() * speed.min(diff_x.abs());
        self.pixel.y += diff_y.signum() * speed.min(diff_y.abs());
        false
    }

    // Across the tunnel seam the goal is the phantom tile just past the edge.
    fn goal_pixel(&self, grid: &Grid) -> Pixel {
        let mut goal = grid.center(self.target);
        let last = grid.width() - 1;
        if self.tile.x == last && self.target.x == 0 {
            goal.x = grid.pixel_width() + grid.tile_size() / 2;
        } else if self.tile.x == 0 && self.target.x == last {
            goal.x = -grid.tile_size() / 2;
        }
        goal
    }
}
