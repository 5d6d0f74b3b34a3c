//! Run state and core simulation types
//!
//! A `RunState` is created when a run starts and discarded when it ends;
//! nothing in here is persisted.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use super::collision::Aabb;
use super::spawn::{self, SpawnTimer};
use crate::catalog::Season;
use crate::consts::*;

/// Endless difficulty tiers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    Extreme,
}

impl Difficulty {
    /// Map a tier number (1..4) to a difficulty; anything unrecognized is tier 1
    pub fn from_tier(tier: u8) -> Self {
        match tier {
            2 => Difficulty::Medium,
            3 => Difficulty::Hard,
            4 => Difficulty::Extreme,
            _ => Difficulty::Easy,
        }
    }

    pub fn tier(&self) -> u8 {
        match self {
            Difficulty::Easy => 1,
            Difficulty::Medium => 2,
            Difficulty::Hard => 3,
            Difficulty::Extreme => 4,
        }
    }

    /// (base speed, obstacle spawn rate in frames)
    pub fn params(&self) -> (f32, f32) {
        match self {
            Difficulty::Easy => (3.0, 140.0),
            Difficulty::Medium => (4.2, 100.0),
            Difficulty::Hard => (5.2, 74.0),
            Difficulty::Extreme => (6.5, 55.0),
        }
    }

    /// Endless runs add this on top of the base speed
    pub fn speed_bonus(&self) -> f32 {
        self.tier() as f32 * 0.4
    }
}

/// Run configuration: which game the player picked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Endless { tier: Difficulty },
    Adventure { season: Season, level: u32 },
}

impl Mode {
    pub fn is_endless(&self) -> bool {
        matches!(self, Mode::Endless { .. })
    }

    pub fn is_adventure(&self) -> bool {
        matches!(self, Mode::Adventure { .. })
    }
}

/// Lane-change input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Steer {
    Left,
    Right,
}

/// Lane center x-coordinates, recomputed whenever the display width changes.
/// The road occupies a fixed fraction of the display and the lane centers
/// evenly subdivide it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LaneGeometry {
    pub centers: [f32; LANE_COUNT],
    pub lane_width: f32,
    pub road_x: f32,
    pub road_w: f32,
}

impl LaneGeometry {
    pub fn compute(display_width: f32) -> Self {
        let road_x = (display_width * ROAD_X_FRACTION).round();
        let road_w = (display_width * ROAD_W_FRACTION).round();
        let lane_width = (road_w / LANE_COUNT as f32).floor();
        let mut centers = [0.0; LANE_COUNT];
        for (i, center) in centers.iter_mut().enumerate() {
            *center = road_x + (lane_width * (i as f32 + 0.5)).round();
        }
        Self {
            centers,
            lane_width,
            road_x,
            road_w,
        }
    }
}

/// The player's car. x is the box center; y is the box top.
#[derive(Debug, Clone, Copy)]
pub struct Player {
    pub lane: usize,
    pub x: f32,
    pub y: f32,
}

impl Player {
    pub fn hitbox(&self) -> Aabb {
        Aabb::new(
            self.x - PLAYER_WIDTH / 2.0,
            self.y,
            PLAYER_WIDTH,
            PLAYER_HEIGHT,
        )
    }
}

/// An oncoming obstacle. x/y is the box top-left corner.
#[derive(Debug, Clone, Copy)]
pub struct Obstacle {
    pub x: f32,
    pub y: f32,
    pub lane: usize,
    /// Index into the obstacle sprite catalog
    pub sprite: usize,
}

impl Obstacle {
    pub fn hitbox(&self) -> Aabb {
        Aabb::new(self.x, self.y, OBSTACLE_WIDTH, OBSTACLE_HEIGHT)
    }
}

/// A collectible coin. x/y is the box top-left corner.
#[derive(Debug, Clone, Copy)]
pub struct Coin {
    pub x: f32,
    pub y: f32,
    pub lane: usize,
}

impl Coin {
    pub fn hitbox(&self) -> Aabb {
        Aabb::new(self.x, self.y, COIN_SIZE, COIN_SIZE)
    }
}

/// The adventure-mode finish line, spanning the whole road
#[derive(Debug, Clone, Copy)]
pub struct FinishLine {
    pub y: f32,
}

/// All state for one run
#[derive(Debug, Clone)]
pub struct RunState {
    pub mode: Mode,
    pub frame: u64,
    pub score: u32,
    /// Coins collected this run (already credited to the wallet)
    pub coins_run: u32,
    /// Mode base speed; `effective_speed` adds the endless tier bonus
    pub speed: f32,
    /// Nominal frames between obstacle spawns, before jitter
    pub spawn_rate: f32,
    /// Adventure: frame count at which the finish line spawns
    pub finish_target: Option<u64>,
    pub finish: Option<FinishLine>,
    pub player: Player,
    pub obstacles: Vec<Obstacle>,
    pub coins: Vec<Coin>,
    pub lanes: LaneGeometry,
    pub width: f32,
    pub height: f32,
    pub(crate) obstacle_timer: SpawnTimer,
    pub(crate) coin_timer: SpawnTimer,
    pub(crate) rng: Pcg32,
}

impl RunState {
    /// Fresh run state for the given mode and display size
    pub fn new(mode: Mode, width: f32, height: f32, seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);

        let (speed, spawn_rate, finish_target) = match mode {
            Mode::Endless { tier } => {
                let (speed, rate) = tier.params();
                (speed, rate, None)
            }
            Mode::Adventure { level, .. } => {
                let l = level as f32;
                (
                    3.0 + l * 0.02,
                    (140.0 - (l * 0.6).floor()).max(40.0),
                    Some(FINISH_BASE_FRAMES + u64::from(level) * FINISH_FRAMES_PER_LEVEL),
                )
            }
        };

        let lanes = LaneGeometry::compute(width);
        let lane = LANE_COUNT / 2;
        let player = Player {
            lane,
            x: lanes.centers[lane],
            y: height - PLAYER_BOTTOM_OFFSET,
        };

        let obstacle_timer = SpawnTimer::new(spawn::obstacle_interval(spawn_rate, &mut rng));
        let coin_timer = SpawnTimer::new(spawn::coin_interval(&mut rng));

        Self {
            mode,
            frame: 0,
            score: 0,
            coins_run: 0,
            speed,
            spawn_rate,
            finish_target,
            finish: None,
            player,
            obstacles: Vec::new(),
            coins: Vec::new(),
            lanes,
            width,
            height,
            obstacle_timer,
            coin_timer,
            rng,
        }
    }

    /// Recompute lane geometry for a new display size. Idempotent; clamps the
    /// player's lane and snaps the car back onto its lane center.
    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
        self.lanes = LaneGeometry::compute(width);
        self.player.lane = self.player.lane.min(LANE_COUNT - 1);
        self.player.x = self.lanes.centers[self.player.lane];
        self.player.y = height - PLAYER_BOTTOM_OFFSET;
    }

    /// Speed applied to every entity this frame
    pub fn effective_speed(&self) -> f32 {
        match self.mode {
            Mode::Endless { tier } => self.speed + tier.speed_bonus(),
            Mode::Adventure { .. } => self.speed,
        }
    }

    /// Move one lane over; returns true if the car actually moved
    pub fn steer(&mut self, dir: Steer) -> bool {
        let target = match dir {
            Steer::Left if self.player.lane > 0 => self.player.lane - 1,
            Steer::Right if self.player.lane < LANE_COUNT - 1 => self.player.lane + 1,
            _ => return false,
        };
        self.player.lane = target;
        self.player.x = self.lanes.centers[target];
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lane_geometry_subdivides_road() {
        let geo = LaneGeometry::compute(1000.0);
        assert_eq!(geo.road_x, 140.0);
        assert_eq!(geo.road_w, 720.0);
        assert_eq!(geo.lane_width, 240.0);
        assert_eq!(geo.centers, [260.0, 500.0, 740.0]);
    }

    #[test]
    fn test_resize_is_idempotent_and_clamps() {
        let mode = Mode::Endless {
            tier: Difficulty::Easy,
        };
        let mut run = RunState::new(mode, 1000.0, 800.0, 7);
        run.steer(Steer::Right);
        assert_eq!(run.player.lane, 2);

        run.resize(600.0, 500.0);
        let after_once = (run.player.x, run.player.y, run.lanes);
        run.resize(600.0, 500.0);
        assert_eq!((run.player.x, run.player.y, run.lanes), after_once);
        assert_eq!(run.player.lane, 2);
        assert_eq!(run.player.x, run.lanes.centers[2]);
        assert_eq!(run.player.y, 500.0 - PLAYER_BOTTOM_OFFSET);
    }

    #[test]
    fn test_steer_clamps_to_road() {
        let mode = Mode::Endless {
            tier: Difficulty::Easy,
        };
        let mut run = RunState::new(mode, 900.0, 600.0, 1);
        assert_eq!(run.player.lane, 1);

        assert!(run.steer(Steer::Left));
        assert!(!run.steer(Steer::Left));
        assert_eq!(run.player.lane, 0);

        assert!(run.steer(Steer::Right));
        assert!(run.steer(Steer::Right));
        assert!(!run.steer(Steer::Right));
        assert_eq!(run.player.lane, 2);
    }

    #[test]
    fn test_endless_tier_table() {
        assert_eq!(Difficulty::from_tier(1).params(), (3.0, 140.0));
        assert_eq!(Difficulty::from_tier(2).params(), (4.2, 100.0));
        assert_eq!(Difficulty::from_tier(3).params(), (5.2, 74.0));
        assert_eq!(Difficulty::from_tier(4).params(), (6.5, 55.0));
        // Unrecognized tiers fall back to tier 1
        assert_eq!(Difficulty::from_tier(9), Difficulty::Easy);
        assert_eq!(Difficulty::from_tier(0), Difficulty::Easy);
    }

    #[test]
    fn test_adventure_level_scaling() {
        let mode = Mode::Adventure {
            season: Season::Summer,
            level: 50,
        };
        let run = RunState::new(mode, 900.0, 600.0, 1);
        assert!((run.speed - 4.0).abs() < 1e-5);
        assert_eq!(run.spawn_rate, 110.0);
        assert_eq!(run.finish_target, Some(1800 + 50 * 90));
        // Adventure speed has no endless tier bonus
        assert_eq!(run.effective_speed(), run.speed);
    }

    #[test]
    fn test_adventure_spawn_rate_floor() {
        let mode = Mode::Adventure {
            season: Season::Summer,
            level: 400,
        };
        let run = RunState::new(mode, 900.0, 600.0, 1);
        assert_eq!(run.spawn_rate, 40.0);
    }
}
