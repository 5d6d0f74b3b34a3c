//! Spawn scheduling and entity spawners.
//!
//! Each spawner runs a countdown timer that is reset to a freshly sampled,
//! jittered interval after every spawn. This keeps spawn gaps pseudo-random
//! without tying them to frame parity.

use rand::Rng;
use rand_pcg::Pcg32;

use super::state::{Coin, Obstacle, RunState};
use crate::catalog::OBSTACLE_SPRITES;
use crate::consts::*;

/// Frame countdown until the next spawn
#[derive(Debug, Clone)]
pub struct SpawnTimer {
    frames_left: u32,
}

impl SpawnTimer {
    pub fn new(frames: u32) -> Self {
        Self {
            frames_left: frames.max(1),
        }
    }

    /// Count down one frame; true when the timer fires. The caller resets
    /// the timer with a fresh interval after acting on it.
    pub fn advance(&mut self) -> bool {
        self.frames_left = self.frames_left.saturating_sub(1);
        self.frames_left == 0
    }
}

/// Frames until the next obstacle: max(8, round(spawn_rate - U(0,20)))
pub fn obstacle_interval(spawn_rate: f32, rng: &mut Pcg32) -> u32 {
    let jitter: f32 = rng.random_range(0.0..OBSTACLE_INTERVAL_JITTER);
    ((spawn_rate - jitter).round().max(0.0) as u32).max(OBSTACLE_INTERVAL_MIN)
}

/// Frames until the next coin: max(12, round(900 - U(0,200)))
pub fn coin_interval(rng: &mut Pcg32) -> u32 {
    let jitter: f32 = rng.random_range(0.0..COIN_INTERVAL_JITTER);
    ((COIN_INTERVAL_BASE - jitter).round().max(0.0) as u32).max(COIN_INTERVAL_MIN)
}

/// Append a new obstacle at the top of a uniformly random lane, with a
/// uniformly random sprite from the catalog.
pub fn spawn_obstacle(run: &mut RunState) {
    let lane = run.rng.random_range(0..LANE_COUNT);
    let sprite = run.rng.random_range(0..OBSTACLE_SPRITES.len());
    run.obstacles.push(Obstacle {
        x: run.lanes.centers[lane] - OBSTACLE_WIDTH / 2.0,
        y: OBSTACLE_SPAWN_Y,
        lane,
        sprite,
    });
}

/// Append a new coin at the top of a uniformly random lane
pub fn spawn_coin(run: &mut RunState) {
    let lane = run.rng.random_range(0..LANE_COUNT);
    run.coins.push(Coin {
        x: run.lanes.centers[lane] - COIN_SIZE / 2.0,
        y: COIN_SPAWN_Y,
        lane,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{Difficulty, Mode};
    use rand::SeedableRng;

    #[test]
    fn test_timer_fires_after_interval() {
        let mut timer = SpawnTimer::new(3);
        assert!(!timer.advance());
        assert!(!timer.advance());
        assert!(timer.advance());
    }

    #[test]
    fn test_obstacle_interval_bounds() {
        let mut rng = Pcg32::seed_from_u64(42);
        for _ in 0..1000 {
            let interval = obstacle_interval(140.0, &mut rng);
            assert!((120..=140).contains(&interval), "interval {interval}");
        }
        // A tiny spawn rate still respects the floor
        for _ in 0..1000 {
            assert!(obstacle_interval(10.0, &mut rng) >= OBSTACLE_INTERVAL_MIN);
        }
    }

    #[test]
    fn test_coin_interval_bounds() {
        let mut rng = Pcg32::seed_from_u64(42);
        for _ in 0..1000 {
            let interval = coin_interval(&mut rng);
            assert!((700..=900).contains(&interval), "interval {interval}");
        }
    }

    #[test]
    fn test_spawned_entities_sit_on_lane_centers() {
        let mode = Mode::Endless {
            tier: Difficulty::Easy,
        };
        let mut run = crate::sim::RunState::new(mode, 1000.0, 700.0, 9);
        for _ in 0..50 {
            spawn_obstacle(&mut run);
            spawn_coin(&mut run);
        }
        for o in &run.obstacles {
            assert_eq!(o.y, OBSTACLE_SPAWN_Y);
            assert_eq!(o.x, run.lanes.centers[o.lane] - OBSTACLE_WIDTH / 2.0);
            assert!(o.sprite < OBSTACLE_SPRITES.len());
        }
        for c in &run.coins {
            assert_eq!(c.y, COIN_SPAWN_Y);
            assert_eq!(c.x, run.lanes.centers[c.lane] - COIN_SIZE / 2.0);
        }
        // All lanes get used eventually
        let lanes: std::collections::HashSet<_> =
            run.obstacles.iter().map(|o| o.lane).collect();
        assert_eq!(lanes.len(), LANE_COUNT);
    }
}
