use log::{debug, info};
use rand::rngs::SmallRng;
use rand::SeedableRng;

use crate::components::{Direction, Pixel, TilePos};
use crate::config::Config;
use crate::error::{GameError, GameResult};
use crate::ghost::{Pursuer, PursuerState};
use crate::level::{Grid, PelletKind, Pellets};
use crate::player::Player;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundStatus {
    Playing,
    Over,
}

/// Things that happened during one `Round::step`, in the order they happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundEvent {
    PelletEaten,
    PowerPelletEaten,
    PursuerCaptured { index: usize, points: u32 },
    LifeLost { remaining: u32 },
    GameOver,
    LevelCleared { level: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlayerView {
    pub pixel: Pixel,
    pub tile: TilePos,
    pub facing: Direction,
    pub mouth_open: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PursuerView {
    pub name: &'static str,
    pub pixel: Pixel,
    pub tile: TilePos,
    pub direction: Direction,
    pub state: PursuerState,
}

/// Read-only picture of a round for whoever draws it.
pub struct Snapshot<'r> {
    pub grid: &'r Grid,
    pub pellets: &'r Pellets,
    pub player: PlayerView,
    pub pursuers: Vec<PursuerView>,
    pub score: u32,
    pub lives: u32,
    pub level: u32,
    pub power_active: bool,
    pub status: RoundStatus,
}

pub struct Round<'a> {
    config: &'a Config,
    grid: Grid,
    pellets: Pellets,
    player: Player,
    pursuers: Vec<Pursuer>,
    score: u32,
    lives: u32,
    level: u32,
    streak: u32,
    status: RoundStatus,
    rng: SmallRng,
}

impl<'a> Round<'a> {
    pub fn new(config: &'a Config) -> GameResult<Self> {
        Self::with_rng(config, SmallRng::from_entropy())
    }

    /// Same as `new` but with reproducible pursuer randomness.
    pub fn seeded(config: &'a Config, seed: u64) -> GameResult<Self> {
        Self::with_rng(config, SmallRng::seed_from_u64(seed))
    }

    fn with_rng(config: &'a Config, rng: SmallRng) -> GameResult<Self> {
        let grid = Grid::from_config(config)?;
        require_walkable(&grid, config.player_start, false, "player start")?;
        require_walkable(&grid, config.house_exit, false, "house exit")?;
        require_walkable(&grid, config.house_entry, true, "house entry")?;
        for spec in &config.roster {
            require_walkable(&grid, spec.spawn, true, spec.name)?;
        }

        let pellets = grid.pellets();
        let player = Player::new(&grid, config.player_start, config.player_speed);
        let pursuers = spawn_pursuers(&grid, config);
        info!(
            "round started: {} pellets, {} pursuers, {} lives",
            pellets.remaining(),
            pursuers.len(),
            config.start_lives
        );
        Ok(Round {
            config,
            grid,
            pellets,
            player,
            pursuers,
            score: 0,
            lives: config.start_lives,
            level: 1,
            streak: 0,
            status: RoundStatus::Playing,
            rng,
        })
    }

    /// Advances the round by one frame. Does nothing once the round is over.
    pub fn step(&mut self, intent: Direction) -> Vec<RoundEvent> {
        let mut events = Vec::new();
        if self.status == RoundStatus::Over {
            return events;
        }

        self.player.request(intent);
        self.player.update(&self.grid);

        self.consume(&mut events);

        let target = self.player.pixel();
        for pursuer in &mut self.pursuers {
            pursuer.update(&self.grid, self.config, target, &mut self.rng);
        }

        self.resolve_collisions(&mut events);

        if self.status == RoundStatus::Playing && self.pellets.is_empty() {
            self.pellets = self.grid.pellets();
            self.reset_positions();
            self.level += 1;
            info!("level cleared, starting level {}", self.level);
            events.push(RoundEvent::LevelCleared { level: self.level });
        }
        events
    }

    fn consume(&mut self, events: &mut Vec<RoundEvent>) {
        match self.pellets.eat(self.player.tile()) {
            Some(PelletKind::Normal) => {
                self.score += self.config.pellet_points;
                events.push(RoundEvent::PelletEaten);
            }
            Some(PelletKind::Power) => {
                self.score += self.config.power_pellet_points;
                self.activate_power();
                events.push(RoundEvent::PowerPelletEaten);
            }
            None => {}
        }
    }

    fn activate_power(&mut self) {
        self.streak = 0;
        for pursuer in &mut self.pursuers {
            pursuer.frighten(self.config.vulnerable_frames);
        }
        debug!("power pellet: pursuers vulnerable for {} frames", self.config.vulnerable_frames);
    }

    fn resolve_collisions(&mut self, events: &mut Vec<RoundEvent>) {
        let reach = self.config.catch_distance_sq();
        let player = self.player.pixel();
        for index in 0..self.pursuers.len() {
            let pursuer = &mut self.pursuers[index];
            if !pursuer.can_collide() || pursuer.pixel().distance_sq(player) as f64 >= reach {
                continue;
            }
            if pursuer.capture() {
                self.streak += 1;
                let points = capture_points(self.config.capture_base_points, self.streak);
                self.score = self.score.saturating_add(points);
                events.push(RoundEvent::PursuerCaptured { index, points });
            } else {
                self.lose_life(events);
                break;
            }
        }
    }

    fn lose_life(&mut self, events: &mut Vec<RoundEvent>) {
        self.lives = self.lives.saturating_sub(1);
        events.push(RoundEvent::LifeLost { remaining: self.lives });
        if self.lives == 0 {
            self.status = RoundStatus::Over;
            info!("game over with score {}", self.score);
            events.push(RoundEvent::GameOver);
        } else {
            debug!("life lost, {} left", self.lives);
            self.reset_positions();
        }
    }

    fn reset_positions(&mut self) {
        self.player = Player::new(&self.grid, self.config.player_start, self.config.player_speed);
        self.pursuers = spawn_pursuers(&self.grid, self.config);
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn lives(&self) -> u32 {
        self.lives
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn status(&self) -> RoundStatus {
        self.status
    }

    pub fn is_over(&self) -> bool {
        self.status == RoundStatus::Over
    }

    pub fn power_active(&self) -> bool {
        self.pursuers.iter().any(Pursuer::is_vulnerable)
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn pellets(&self) -> &Pellets {
        &self.pellets
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn pursuers(&self) -> &[Pursuer] {
        &self.pursuers
    }

    pub fn snapshot(&self) -> Snapshot<'_> {
        Snapshot {
            grid: &self.grid,
            pellets: &self.pellets,
            player: PlayerView {
                pixel: self.player.pixel(),
                tile: self.player.tile(),
                facing: self.player.facing(),
                mouth_open: self.player.mouth_open(),
            },
            pursuers: self
                .pursuers
                .iter()
                .map(|p| PursuerView {
                    name: p.name(),
                    pixel: p.pixel(),
                    tile: p.tile(),
                    direction: p.direction(),
                    state: p.state(),
                })
                .collect(),
            score: self.score,
            lives: self.lives,
            level: self.level,
            power_active: self.power_active(),
            status: self.status,
        }
    }
}

/// `base * 2^(streak - 1)`, saturating.
pub fn capture_points(base: u32, streak: u32) -> u32 {
    let factor = 2u32.saturating_pow(streak.saturating_sub(1));
    base.saturating_mul(factor)
}

fn spawn_pursuers(grid: &Grid, config: &Config) -> Vec<Pursuer> {
    config
        .roster
        .iter()
        .map(|spec| Pursuer::new(grid, spec, config))
        .collect()
}

fn require_walkable(grid: &Grid, tile: TilePos, allow_door: bool, what: &str) -> GameResult<()> {
    let inside = tile.x >= 0 && tile.x < grid.width();
    if inside && grid.is_walkable(tile, allow_door) {
        Ok(())
    } else {
        Err(GameError::Blocked {
            what: what.to_string(),
            x: tile.x,
            y: tile.y,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config::default()
    }

    fn put_player(round: &mut Round<'_>, tile: TilePos) {
        round.player = Player::new(&round.grid, tile, round.config.player_speed);
    }

    fn put_pursuer(round: &mut Round<'_>, index: usize, tile: TilePos, state: PursuerState) {
        round.pursuers[index].teleport(&round.grid, tile, state);
    }

    // Empty corridor tile above the house, clear of the reference pellets.
    const OPEN: TilePos = TilePos::new(13, 11);

    #[test]
    fn pellet_and_power_pellet_points() {
        let config = config();
        let mut round = Round::seeded(&config, 1).unwrap();
        let events = round.step(Direction::None);
        assert_eq!(events, vec![RoundEvent::PelletEaten]);
        assert_eq!(round.score(), 10);

        put_player(&mut round, TilePos::new(1, 3));
        let events = round.step(Direction::None);
        assert_eq!(events, vec![RoundEvent::PowerPelletEaten]);
        assert_eq!(round.score(), 60);
        assert!(!round.pellets().has_power(TilePos::new(1, 3)));
        // blinky is already out; the others carry the fright inside the house
        assert!(round.power_active());
        assert!(round.pursuers()[0].is_vulnerable());
        assert!(matches!(
            round.pursuers()[1].state(),
            PursuerState::Confined { fright, .. } if fright > 0
        ));
    }

    #[test]
    fn capture_bonus_doubles_then_resets() {
        let config = config();
        let mut round = Round::seeded(&config, 2).unwrap();
        put_player(&mut round, OPEN);
        for index in 0..4 {
            put_pursuer(&mut round, index, OPEN, PursuerState::Vulnerable { remaining: 100 });
        }
        let events = round.step(Direction::None);
        let points: Vec<u32> = events
            .iter()
            .filter_map(|e| match e {
                RoundEvent::PursuerCaptured { points, .. } => Some(*points),
                _ => None,
            })
            .collect();
        assert_eq!(points, vec![200, 400, 800, 1600]);
        assert_eq!(round.score(), 3000);
        assert!(round.pursuers().iter().all(Pursuer::is_eaten));
        assert_eq!(round.lives(), config.start_lives);

        put_pursuer(&mut round, 0, OPEN, PursuerState::Active);
        round.activate_power();
        let events = round.step(Direction::None);
        assert!(events.contains(&RoundEvent::PursuerCaptured { index: 0, points: 200 }));
        assert_eq!(round.score(), 3200);
    }

    #[test]
    fn capture_points_formula() {
        assert_eq!(capture_points(200, 1), 200);
        assert_eq!(capture_points(200, 5), 3200);
        assert_eq!(capture_points(200, 40), u32::MAX);
    }

    #[test]
    fn only_one_life_per_frame_and_positions_reset() {
        let config = config();
        let mut round = Round::seeded(&config, 3).unwrap();
        round.step(Direction::None);
        let score = round.score();
        let remaining = round.pellets().remaining();

        put_player(&mut round, OPEN);
        put_pursuer(&mut round, 0, OPEN, PursuerState::Active);
        put_pursuer(&mut round, 1, OPEN, PursuerState::Active);
        let events = round.step(Direction::None);
        assert_eq!(events, vec![RoundEvent::LifeLost { remaining: 2 }]);
        assert_eq!(round.lives(), 2);
        assert_eq!(round.score(), score);
        assert_eq!(round.pellets().remaining(), remaining);
        assert_eq!(round.player().tile(), config.player_start);
        for (pursuer, spec) in round.pursuers().iter().zip(&config.roster) {
            assert_eq!(pursuer.tile(), spec.spawn);
            assert!(matches!(pursuer.state(), PursuerState::Confined { .. }));
        }
    }

    #[test]
    fn confined_and_eaten_pursuers_are_harmless() {
        let config = config();
        let mut round = Round::seeded(&config, 4).unwrap();
        put_player(&mut round, OPEN);
        for index in [0, 1, 3] {
            put_pursuer(
                &mut round,
                index,
                OPEN,
                PursuerState::Confined {
                    release_in: 500,
                    fright: 0,
                },
            );
        }
        put_pursuer(&mut round, 2, OPEN, PursuerState::Eaten);
        let events = round.step(Direction::None);
        assert!(events.is_empty());
        assert_eq!(round.lives(), config.start_lives);
    }

    #[test]
    fn game_over_happens_exactly_once() {
        let mut config = config();
        config.start_lives = 1;
        let mut round = Round::seeded(&config, 5).unwrap();
        put_player(&mut round, OPEN);
        put_pursuer(&mut round, 0, OPEN, PursuerState::Active);
        let events = round.step(Direction::None);
        assert_eq!(
            events,
            vec![RoundEvent::LifeLost { remaining: 0 }, RoundEvent::GameOver]
        );
        assert!(round.is_over());
        let score = round.score();
        for _ in 0..100 {
            assert!(round.step(Direction::Right).is_empty());
        }
        assert_eq!(round.lives(), 0);
        assert_eq!(round.score(), score);
    }

    #[test]
    fn level_completion_restores_every_pellet() {
        let config = config();
        let mut round = Round::seeded(&config, 6).unwrap();
        let full = round.grid().pellets();
        let last = TilePos::new(2, 1);
        let all: Vec<TilePos> = full
            .pellets()
            .iter()
            .chain(full.power().iter())
            .copied()
            .collect();
        for tile in all {
            if tile != last {
                round.pellets.eat(tile);
            }
        }
        assert_eq!(round.pellets().remaining(), 1);
        // Let the pursuers wander off their spawns first.
        for _ in 0..30 {
            assert!(round.step(Direction::None).is_empty());
        }
        put_player(&mut round, last);

        let score = round.score();
        let lives = round.lives();
        let events = round.step(Direction::None);
        assert_eq!(
            events,
            vec![RoundEvent::PelletEaten, RoundEvent::LevelCleared { level: 2 }]
        );
        assert_eq!(round.pellets(), &full);
        assert_eq!(round.score(), score + 10);
        assert_eq!(round.lives(), lives);
        assert_eq!(round.player().tile(), config.player_start);
        for (pursuer, spec) in round.pursuers().iter().zip(&config.roster) {
            assert_eq!(pursuer.tile(), spec.spawn);
        }
    }

    #[test]
    fn rejects_unwalkable_spawns() {
        let mut config = config();
        config.player_start = TilePos::new(0, 0);
        assert!(matches!(
            Round::seeded(&config, 0),
            Err(GameError::Blocked { x: 0, y: 0, .. })
        ));
    }

    #[test]
    fn long_session_is_deterministic_and_drift_free() {
        let config = config();
        let mut a = Round::seeded(&config, 99).unwrap();
        let mut b = Round::seeded(&config, 99).unwrap();
        let script = Direction::CARDINALS;
        let mut last_score = 0;
        for frame in 0..10_000usize {
            let intent = script[(frame / 37) % script.len()];
            let ea = a.step(intent);
            let eb = b.step(intent);
            assert_eq!(ea, eb);
            assert!(a.score() >= last_score);
            last_score = a.score();

            let grid = a.grid();
            let player = a.player();
            if player.is_idle() {
                assert_eq!(player.pixel(), grid.center(player.tile()));
            }
            for pursuer in a.pursuers() {
                if pursuer.is_idle() {
                    assert_eq!(pursuer.pixel(), grid.center(pursuer.tile()));
                }
            }
        }
        assert_eq!(a.score(), b.score());
        assert_eq!(a.lives(), b.lives());
    }

    #[test]
    fn snapshot_mirrors_round() {
        let config = config();
        let mut round = Round::seeded(&config, 8).unwrap();
        round.step(Direction::Right);
        let snap = round.snapshot();
        assert_eq!(snap.score, round.score());
        assert_eq!(snap.lives, config.start_lives);
        assert_eq!(snap.level, 1);
        assert_eq!(snap.status, RoundStatus::Playing);
        assert_eq!(snap.player.pixel, round.player().pixel());
        assert_eq!(snap.player.facing, Direction::Right);
        let names: Vec<_> = snap.pursuers.iter().map(|p| p.name).collect();
        assert_eq!(names, ["blinky", "pinky", "inky", "clyde"]);
    }
}
