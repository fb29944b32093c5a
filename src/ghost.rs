use log::debug;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::components::{Direction, Pixel, TilePos};
use crate::config::{Config, PolicyKind, PursuerSpec};
use crate::level::Grid;
use crate::motion::Mover;

/// How a pursuer picks a direction while it is neither fleeing nor eaten.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Policy {
    Chase,
    /// Chases with probability `chase_chance`, resampled at every decision.
    Mixed { chase_chance: f64 },
    Random,
}

impl Policy {
    pub fn from_kind(kind: PolicyKind, config: &Config) -> Self {
        match kind {
            PolicyKind::Chase => Policy::Chase,
            PolicyKind::Mixed => Policy::Mixed {
                chase_chance: config.mixed_chase_chance,
            },
            PolicyKind::Random => Policy::Random,
        }
    }

    pub fn choose(
        &self,
        options: &[Direction],
        from: TilePos,
        target: Pixel,
        grid: &Grid,
        rng: &mut impl Rng,
    ) -> Direction {
        match *self {
            Policy::Chase => nearest(options, from, target, grid),
            Policy::Random => pick_random(options, rng),
            Policy::Mixed { chase_chance } => {
                if rng.gen_bool(chase_chance.clamp(0.0, 1.0)) {
                    nearest(options, from, target, grid)
                } else {
                    pick_random(options, rng)
                }
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PursuerState {
    /// Waiting in the house. `fright` carries a power-up that landed meanwhile.
    Confined { release_in: u32, fright: u32 },
    Active,
    Vulnerable { remaining: u32 },
    Eaten,
}

pub struct Pursuer {
    name: &'static str,
    spawn: TilePos,
    exit_delay: u32,
    policy: Policy,
    state: PursuerState,
    mover: Mover,
    last_decision: Option<TilePos>,
}

impl Pursuer {
    pub fn new(grid: &Grid, spec: &PursuerSpec, config: &Config) -> Self {
        Self {
            name: spec.name,
            spawn: spec.spawn,
            exit_delay: spec.exit_delay,
            policy: Policy::from_kind(spec.policy, config),
            state: PursuerState::Confined {
                release_in: spec.exit_delay,
                fright: 0,
            },
            mover: Mover::new(grid, spec.spawn),
            last_decision: None,
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn state(&self) -> PursuerState {
        self.state
    }

    pub fn policy(&self) -> Policy {
        self.policy
    }

    pub fn tile(&self) -> TilePos {
        self.mover.tile()
    }

    pub fn pixel(&self) -> Pixel {
        self.mover.pixel()
    }

    pub fn direction(&self) -> Direction {
        self.mover.direction()
    }

    pub fn is_idle(&self) -> bool {
        self.mover.is_idle()
    }

    pub fn is_vulnerable(&self) -> bool {
        matches!(self.state, PursuerState::Vulnerable { .. })
    }

    pub fn is_eaten(&self) -> bool {
        self.state == PursuerState::Eaten
    }

    /// Only pursuers roaming the maze take part in collisions.
    pub fn can_collide(&self) -> bool {
        matches!(self.state, PursuerState::Active | PursuerState::Vulnerable { .. })
    }

    pub fn frighten(&mut self, frames: u32) {
        self.state = match self.state {
            PursuerState::Eaten => PursuerState::Eaten,
            PursuerState::Confined { release_in, .. } => PursuerState::Confined {
                release_in,
                fright: frames,
            },
            PursuerState::Active | PursuerState::Vulnerable { .. } => {
                PursuerState::Vulnerable { remaining: frames }
            }
        };
    }

    /// Vulnerable -> Eaten. Returns false for any other state.
    pub fn capture(&mut self) -> bool {
        if !self.is_vulnerable() {
            return false;
        }
        self.state = PursuerState::Eaten;
        debug!("{} eaten, heading home", self.name);
        true
    }

    pub fn speed(&self, config: &Config) -> i32 {
        match self.state {
            PursuerState::Vulnerable { .. } => config.ghost_vulnerable_speed,
            PursuerState::Eaten => config.ghost_eaten_speed,
            _ => config.ghost_speed,
        }
    }

    /// One frame: timers, a decision if sitting on a fresh tile center, then motion.
    pub fn update(&mut self, grid: &Grid, config: &Config, target: Pixel, rng: &mut impl Rng) {
        if let PursuerState::Vulnerable { remaining } = &mut self.state {
            *remaining = remaining.saturating_sub(1);
            if *remaining == 0 {
                self.state = PursuerState::Active;
            }
        }

        if let PursuerState::Confined { release_in, fright } = &mut self.state {
            *release_in = release_in.saturating_sub(1);
            *fright = fright.saturating_sub(1);
            if *release_in == 0 {
                let fright = *fright;
                self.release(grid, config.house_exit, fright);
            }
            return;
        }

        if self.mover.is_idle() && !self.steer(grid, config, target, rng) {
            return;
        }
        self.mover.advance(grid, self.speed(config));
    }

    #[cfg(test)]
    pub(crate) fn teleport(&mut self, grid: &Grid, tile: TilePos, state: PursuerState) {
        self.mover = Mover::new(grid, tile);
        self.state = state;
        self.last_decision = None;
    }

    fn release(&mut self, grid: &Grid, exit: TilePos, fright: u32) {
        self.mover.place(grid, exit, Direction::Left);
        self.last_decision = Some(exit);
        self.state = if fright > 0 {
            PursuerState::Vulnerable { remaining: fright }
        } else {
            PursuerState::Active
        };
        debug!("{} released", self.name);
    }

    fn reconfine(&mut self, grid: &Grid) {
        self.state = PursuerState::Confined {
            release_in: self.exit_delay / 2,
            fright: 0,
        };
        self.mover.place(grid, self.spawn, Direction::None);
        self.last_decision = None;
        debug!("{} back in the house", self.name);
    }

    // Returns false when the pursuer was re-confined and must not move this frame.
    fn steer(&mut self, grid: &Grid, config: &Config, target: Pixel, rng: &mut impl Rng) -> bool {
        let tile = self.mover.tile();
        if self.is_eaten() && tile == config.house_entry {
            self.reconfine(grid);
            return false;
        }

        let heading = if self.last_decision != Some(tile) {
            self.last_decision = Some(tile);
            self.choose_direction(grid, config, target, rng)
        } else {
            self.mover.direction()
        };

        if !self.mover.try_start(grid, heading, self.is_eaten()) {
            self.last_decision = None;
        }
        true
    }

    fn choose_direction(
        &self,
        grid: &Grid,
        config: &Config,
        target: Pixel,
        rng: &mut impl Rng,
    ) -> Direction {
        let tile = self.mover.tile();
        let options = legal_directions(grid, tile, self.mover.direction(), self.is_eaten());
        match self.state {
            PursuerState::Eaten => nearest(&options, tile, grid.center(config.house_entry), grid),
            PursuerState::Vulnerable { .. } => farthest(&options, tile, target, grid),
            _ => self.policy.choose(&options, tile, target, grid, rng),
        }
    }
}

/// Walkable directions from `tile`, minus the reversal of `current` unless
/// that is the only way out.
pub fn legal_directions(
    grid: &Grid,
    tile: TilePos,
    current: Direction,
    allow_door: bool,
) -> Vec<Direction> {
    let open: Vec<Direction> = Direction::CARDINALS
        .into_iter()
        .filter(|&dir| grid.is_walkable(grid.neighbor(tile, dir), allow_door))
        .collect();
    let reverse = current.opposite();
    let forward: Vec<Direction> = open
        .iter()
        .copied()
        .filter(|&dir| current.is_none() || dir != reverse)
        .collect();
    if forward.is_empty() {
        open
    } else {
        forward
    }
}

pub fn nearest(options: &[Direction], from: TilePos, target: Pixel, grid: &Grid) -> Direction {
    extreme(options, from, target, grid, |d, best| d < best)
}

pub fn farthest(options: &[Direction], from: TilePos, target: Pixel, grid: &Grid) -> Direction {
    extreme(options, from, target, grid, |d, best| d > best)
}

// Distance is measured from the unwrapped neighbour center so that a tunnel
// exit is judged by where it physically leads next frame.
fn extreme(
    options: &[Direction],
    from: TilePos,
    target: Pixel,
    grid: &Grid,
    better: impl Fn(i64, i64) -> bool,
) -> Direction {
    let mut best: Option<(Direction, i64)> = None;
    for &dir in options {
        let d = grid.center(from.offset(dir)).distance_sq(target);
        match best {
            Some((_, b)) if !better(d, b) => {}
            _ => best = Some((dir, d)),
        }
    }
    best.map(|(dir, _)| dir).unwrap_or(Direction::None)
}

fn pick_random(options: &[Direction], rng: &mut impl Rng) -> Direction {
    options.choose(rng).copied().unwrap_or(Direction::None)
}
