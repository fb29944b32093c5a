use crate::components::{Direction, Pixel, TilePos};
use crate::level::Grid;
use crate::motion::Mover;

const MOUTH_FRAMES: u32 = 5;

pub struct Player {
    mover: Mover,
    speed: i32,
    requested: Direction,
    facing: Direction,
    anim_timer: u32,
    mouth_open: bool,
}

impl Player {
    pub fn new(grid: &Grid, start: TilePos, speed: i32) -> Self {
        Self {
            mover: Mover::new(grid, start),
            speed,
            requested: Direction::None,
            facing: Direction::None,
            anim_timer: 0,
            mouth_open: true,
        }
    }

    /// Buffers the latest intent; it is applied at the next tile center.
    pub fn request(&mut self, dir: Direction) {
        if !dir.is_none() {
            self.requested = dir;
        }
    }

    pub fn update(&mut self, grid: &Grid) {
        self.anim_timer += 1;
        if self.anim_timer >= MOUTH_FRAMES {
            self.anim_timer = 0;
            self.mouth_open = !self.mouth_open;
        }

        if self.mover.is_idle() && self.mover.try_start(grid, self.requested, false) {
            self.facing = self.requested;
        }
        self.mover.advance(grid, self.speed);
    }

    pub fn tile(&self) -> TilePos {
        self.mover.tile()
    }

    pub fn pixel(&self) -> Pixel {
        self.mover.pixel()
    }

    pub fn facing(&self) -> Direction {
        self.facing
    }

    pub fn requested(&self) -> Direction {
        self.requested
    }

    pub fn mouth_open(&self) -> bool {
        self.mouth_open
    }

    pub fn is_idle(&self) -> bool {
        self.mover.is_idle()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::Cell;
    use crate::config::Config;

    // (1,1) open, (2,1) wall, (1,2) open below.
    const CORNER: [&str; 5] = ["11111", "12111", "12221", "12111", "11111"];

    #[test]
    fn blocked_request_waits_then_turns_down() {
        let grid = Grid::from_layout(&CORNER, 24).unwrap();
        assert_eq!(grid.cell(TilePos::new(2, 1)), Cell::Wall);
        let mut player = Player::new(&grid, TilePos::new(1, 1), 4);

        player.request(Direction::Right);
        for _ in 0..10 {
            player.update(&grid);
            assert_eq!(player.tile(), TilePos::new(1, 1));
            assert!(player.is_idle());
        }

        player.request(Direction::Down);
        let mut visited = vec![player.tile()];
        for _ in 0..30 {
            player.update(&grid);
            assert_eq!(player.pixel().x, grid.center(TilePos::new(1, 1)).x);
            visited.push(player.tile());
        }
        assert_eq!(player.facing(), Direction::Down);
        assert!(visited.contains(&TilePos::new(1, 2)));
        assert!(!visited.contains(&TilePos::new(2, 1)));
    }

    #[test]
    fn pre_turn_is_applied_at_the_next_center() {
        let grid = Grid::from_layout(&CORNER, 24).unwrap();
        let mut player = Player::new(&grid, TilePos::new(1, 1), 4);
        player.request(Direction::Down);
        player.update(&grid);
        // Mid-transition request is only buffered.
        player.request(Direction::Right);
        assert_eq!(player.requested(), Direction::Right);
        while !player.is_idle() {
            player.update(&grid);
        }
        assert_eq!(player.tile(), TilePos::new(1, 2));
        player.update(&grid);
        assert_eq!(player.facing(), Direction::Right);
    }

    #[test]
    fn none_intent_keeps_the_buffer() {
        let grid = Grid::from_config(&Config::default()).unwrap();
        let mut player = Player::new(&grid, TilePos::new(1, 1), 4);
        player.request(Direction::Right);
        player.request(Direction::None);
        assert_eq!(player.requested(), Direction::Right);
    }

    #[test]
    fn never_walks_through_the_ghost_door() {
        let grid = Grid::from_config(&Config::default()).unwrap();
        let mut player = Player::new(&grid, TilePos::new(13, 11), 4);
        player.request(Direction::Down);
        for _ in 0..50 {
            player.update(&grid);
            assert_eq!(player.tile(), TilePos::new(13, 11));
        }
    }

    #[test]
    fn mouth_toggles_every_five_frames() {
        let grid = Grid::from_config(&Config::default()).unwrap();
        let mut player = Player::new(&grid, TilePos::new(1, 1), 4);
        let start = player.mouth_open();
        for _ in 0..4 {
            player.update(&grid);
        }
        assert_eq!(player.mouth_open(), start);
        player.update(&grid);
        assert_ne!(player.mouth_open(), start);
    }
}
