use std::path::PathBuf;

use crate::components::TilePos;

const TILE_SIZE: i32 = 24;
const PLAYER_SPEED: i32 = 4;
const GHOST_SPEED: i32 = 2;
const GHOST_VULNERABLE_SPEED: i32 = 1;
const GHOST_EATEN_SPEED: i32 = 4;
const VULNERABLE_FRAMES: u32 = 360;
const PELLET_POINTS: u32 = 10;
const POWER_PELLET_POINTS: u32 = 50;
const CAPTURE_BASE_POINTS: u32 = 200;
const START_LIVES: u32 = 3;
const CATCH_DISTANCE_TILES: f64 = 0.6;
const MIXED_CHASE_CHANCE: f64 = 0.7;
const DEFAULT_FPS: u64 = 60;
const MAX_SCORES: usize = 10;
const SCORES_FILE: &str = "highscores.json";

const MAZE_LAYOUT: [&str; 31] = [
    "1111111111111111111111111111",
    "1222222222222112222222222221",
    "1211112111112112111112111121",
    "1311112111112112111112111131",
    "1211112111112112111112111121",
    "1222222222222222222222222221",
    "1211112112111111112112111121",
    "1211112112111111112112111121",
    "1222222112222112222112222221",
    "1111112111110110111112111111",
    "0000012111110110111112100000",
    "0000012110000000001112100000",
    "0000012110111411110112100000",
    "1111112110100000010112111111",
    "0000002000100000010002000000",
    "1111112110100000010112111111",
    "0000012110111111110112100000",
    "0000012110000000001112100000",
    "0000012110111111110112100000",
    "1111112110111111110112111111",
    "1222222222222112222222222221",
    "1211112111112112111112111121",
    "1311112111112112111112111131",
    "1222112222222002222222112221",
    "1112112112111111112112112111",
    "1112112112111111112112112111",
    "1222222112222112222112222221",
    "1211111111112112111111111121",
    "1211111111112112111111111121",
    "1222222222222222222222222221",
    "1111111111111111111111111111",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyKind {
    Chase,
    Mixed,
    Random,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PursuerSpec {
    pub name: &'static str,
    pub spawn: TilePos,
    pub policy: PolicyKind,
    /// Frames spent in the house before the first release.
    pub exit_delay: u32,
}

/// Every tunable of a game, built once and shared by reference.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub tile_size: i32,
    pub layout: Vec<String>,
    pub player_start: TilePos,
    pub player_speed: i32,
    pub ghost_speed: i32,
    pub ghost_vulnerable_speed: i32,
    pub ghost_eaten_speed: i32,
    pub roster: Vec<PursuerSpec>,
    pub house_exit: TilePos,
    pub house_entry: TilePos,
    pub vulnerable_frames: u32,
    pub pellet_points: u32,
    pub power_pellet_points: u32,
    pub capture_base_points: u32,
    pub start_lives: u32,
    /// Collision radius as a fraction of a tile.
    pub catch_distance: f64,
    pub mixed_chase_chance: f64,
    pub fps: u64,
    pub max_scores: usize,
    pub scores_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tile_size: TILE_SIZE,
            layout: MAZE_LAYOUT.iter().map(|row| row.to_string()).collect(),
            player_start: TilePos::new(1, 1),
            player_speed: PLAYER_SPEED,
            ghost_speed: GHOST_SPEED,
            ghost_vulnerable_speed: GHOST_VULNERABLE_SPEED,
            ghost_eaten_speed: GHOST_EATEN_SPEED,
            roster: default_roster(),
            house_exit: TilePos::new(13, 11),
            house_entry: TilePos::new(13, 14),
            vulnerable_frames: VULNERABLE_FRAMES,
            pellet_points: PELLET_POINTS,
            power_pellet_points: POWER_PELLET_POINTS,
            capture_base_points: CAPTURE_BASE_POINTS,
            start_lives: START_LIVES,
            catch_distance: CATCH_DISTANCE_TILES,
            mixed_chase_chance: MIXED_CHASE_CHANCE,
            fps: DEFAULT_FPS,
            max_scores: MAX_SCORES,
            scores_path: PathBuf::from(SCORES_FILE),
        }
    }
}

impl Config {
    /// Reference tuning with `PACMAN_FPS`, `PACMAN_LIVES` and `PACMAN_SCORES` applied.
    pub fn from_env() -> Self {
        let mut config = Config::default();
        if let Some(fps) = env_number("PACMAN_FPS") {
            config.fps = fps;
        }
        if let Some(lives) = env_number("PACMAN_LIVES") {
            config.start_lives = lives as u32;
        }
        if let Some(path) = std::env::var_os("PACMAN_SCORES").filter(|p| !p.is_empty()) {
            config.scores_path = PathBuf::from(path);
        }
        config
    }

    /// Squared collision distance in pixels.
    pub fn catch_distance_sq(&self) -> f64 {
        let d = self.catch_distance * self.tile_size as f64;
        d * d
    }
}

fn env_number(key: &str) -> Option<u64> {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse::<u64>().ok())
        .filter(|v| *v > 0 && *v <= u32::MAX as u64)
}

fn default_roster() -> Vec<PursuerSpec> {
    vec![
        PursuerSpec {
            name: "blinky",
            spawn: TilePos::new(12, 14),
            policy: PolicyKind::Chase,
            exit_delay: 1,
        },
        PursuerSpec {
            name: "pinky",
            spawn: TilePos::new(13, 14),
            policy: PolicyKind::Mixed,
            exit_delay: 60,
        },
        PursuerSpec {
            name: "inky",
            spawn: TilePos::new(14, 14),
            policy: PolicyKind::Random,
            exit_delay: 120,
        },
        PursuerSpec {
            name: "clyde",
            spawn: TilePos::new(15, 14),
            policy: PolicyKind::Random,
            exit_delay: 180,
        },
    ]
}
