//! Per-frame simulation step.
//!
//! Advances every entity by the current effective speed, prunes what left the
//! screen, runs the spawn timers, and reports what happened as events for the
//! controller to act on.

use super::collision::overlaps;
use super::spawn::{self, SpawnTimer};
use super::state::{FinishLine, Mode, RunState};
use crate::consts::*;

/// What happened during a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickEvent {
    /// A coin was consumed; COIN_VALUE goes to the run counter and wallet
    CoinCollected,
    /// The endless score advanced
    ScoreChanged(u32),
    /// The finish line reached the bottom of the display; the run is won
    FinishCrossed,
    /// The player hit an obstacle; the run is lost
    Crashed,
}

/// Advance the simulation by one frame. Only called while the run is live;
/// pausing is a flag check upstream, never in here.
pub fn tick(run: &mut RunState) -> Vec<TickEvent> {
    let mut events = Vec::new();
    run.frame += 1;

    if run.obstacle_timer.advance() {
        spawn::spawn_obstacle(run);
        let next = spawn::obstacle_interval(run.spawn_rate, &mut run.rng);
        run.obstacle_timer = SpawnTimer::new(next);
    }
    if run.coin_timer.advance() {
        spawn::spawn_coin(run);
        let next = spawn::coin_interval(&mut run.rng);
        run.coin_timer = SpawnTimer::new(next);
    }

    let speed = run.effective_speed();
    for obstacle in &mut run.obstacles {
        obstacle.y += speed;
    }
    for coin in &mut run.coins {
        coin.y += speed;
    }

    let obstacle_limit = run.height + OBSTACLE_PRUNE_MARGIN;
    run.obstacles.retain(|o| o.y < obstacle_limit);
    let coin_limit = run.height + COIN_PRUNE_MARGIN;
    run.coins.retain(|c| c.y < coin_limit);

    if let Mode::Adventure { .. } = run.mode {
        if run.finish.is_none() && run.finish_target.is_some_and(|t| run.frame >= t) {
            run.finish = Some(FinishLine { y: FINISH_SPAWN_Y });
        }
    }
    if let Some(finish) = &mut run.finish {
        finish.y += speed;
        if finish.y > run.height - FINISH_WIN_MARGIN {
            events.push(TickEvent::FinishCrossed);
            return events;
        }
    }

    let player_box = run.player.hitbox();
    if run
        .obstacles
        .iter()
        .any(|o| overlaps(&player_box, &o.hitbox()))
    {
        events.push(TickEvent::Crashed);
        return events;
    }

    let before = run.coins.len();
    run.coins.retain(|c| !overlaps(&player_box, &c.hitbox()));
    for _ in 0..before - run.coins.len() {
        run.coins_run += COIN_VALUE;
        events.push(TickEvent::CoinCollected);
    }

    if run.mode.is_endless() && run.frame % SCORE_INTERVAL_FRAMES == 0 {
        run.score += 1;
        events.push(TickEvent::ScoreChanged(run.score));
    }

    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Season;
    use crate::sim::state::{Coin, Difficulty, Obstacle};

    fn endless_run(tier: Difficulty) -> RunState {
        RunState::new(Mode::Endless { tier }, 1000.0, 600.0, 12345)
    }

    /// Push the spawn timers far out so a test controls exactly what exists
    fn quiet(run: &mut RunState) {
        run.obstacle_timer = SpawnTimer::new(u32::MAX);
        run.coin_timer = SpawnTimer::new(u32::MAX);
    }

    #[test]
    fn test_entities_advance_by_effective_speed() {
        let mut run = endless_run(Difficulty::Medium);
        quiet(&mut run);
        run.obstacles.push(Obstacle {
            x: 100.0,
            y: 50.0,
            lane: 0,
            sprite: 0,
        });
        run.coins.push(Coin {
            x: 100.0,
            y: 30.0,
            lane: 0,
        });

        tick(&mut run);
        // Tier 2: 4.2 base + 2 * 0.4 bonus
        let speed = 4.2 + 0.8;
        assert!((run.obstacles[0].y - (50.0 + speed)).abs() < 1e-4);
        assert!((run.coins[0].y - (30.0 + speed)).abs() < 1e-4);
    }

    #[test]
    fn test_prune_thresholds() {
        let mut run = endless_run(Difficulty::Easy);
        quiet(&mut run);
        let speed = run.effective_speed();

        // Ends up past height + 200 after one tick -> pruned
        run.obstacles.push(Obstacle {
            x: 100.0,
            y: 600.0 + 200.0 - speed + 0.5,
            lane: 0,
            sprite: 0,
        });
        // Stays just inside the margin -> kept
        run.obstacles.push(Obstacle {
            x: 100.0,
            y: 600.0 + 200.0 - speed - 0.5,
            lane: 1,
            sprite: 0,
        });
        // Coin margin is tighter: height + 80
        run.coins.push(Coin {
            x: 100.0,
            y: 600.0 + 80.0 - speed + 0.5,
            lane: 0,
        });

        tick(&mut run);
        assert_eq!(run.obstacles.len(), 1);
        assert_eq!(run.obstacles[0].lane, 1);
        assert!(run.coins.is_empty());
    }

    #[test]
    fn test_endless_scoring_cadence() {
        let mut run = endless_run(Difficulty::Easy);
        quiet(&mut run);

        let mut score_events = 0;
        for _ in 0..24 {
            for event in tick(&mut run) {
                if let TickEvent::ScoreChanged(s) = event {
                    score_events += 1;
                    assert_eq!(s, score_events);
                }
            }
        }
        assert_eq!(run.score, 2);
        assert_eq!(score_events, 2);
    }

    #[test]
    fn test_adventure_does_not_score() {
        let mode = Mode::Adventure {
            season: Season::Summer,
            level: 1,
        };
        let mut run = RunState::new(mode, 1000.0, 600.0, 5);
        quiet(&mut run);
        for _ in 0..48 {
            tick(&mut run);
        }
        assert_eq!(run.score, 0);
    }

    #[test]
    fn test_coin_pickup() {
        let mut run = endless_run(Difficulty::Easy);
        quiet(&mut run);
        let speed = run.effective_speed();
        // Will overlap the player box after this tick's movement
        run.coins.push(Coin {
            x: run.player.x,
            y: run.player.y - speed + 1.0,
            lane: run.player.lane,
        });

        let events = tick(&mut run);
        assert_eq!(events, vec![TickEvent::CoinCollected]);
        assert!(run.coins.is_empty());
        assert_eq!(run.coins_run, 5);
    }

    #[test]
    fn test_obstacle_collision_loses_the_run() {
        let mut run = endless_run(Difficulty::Easy);
        quiet(&mut run);
        run.obstacles.push(Obstacle {
            x: run.player.x - 10.0,
            y: run.player.y,
            lane: run.player.lane,
            sprite: 0,
        });

        let events = tick(&mut run);
        assert_eq!(events, vec![TickEvent::Crashed]);
    }

    #[test]
    fn test_dodged_obstacle_is_harmless() {
        let mut run = endless_run(Difficulty::Easy);
        quiet(&mut run);
        // Same height as the player, but one lane over
        let other_lane = (run.player.lane + 1) % crate::consts::LANE_COUNT;
        run.obstacles.push(Obstacle {
            x: run.lanes.centers[other_lane] - OBSTACLE_WIDTH / 2.0,
            y: run.player.y,
            lane: other_lane,
            sprite: 0,
        });

        let events = tick(&mut run);
        assert!(!events.contains(&TickEvent::Crashed));
    }

    #[test]
    fn test_finish_line_spawns_and_wins() {
        let mode = Mode::Adventure {
            season: Season::Summer,
            level: 1,
        };
        let mut run = RunState::new(mode, 1000.0, 600.0, 99);
        quiet(&mut run);
        run.finish_target = Some(3);

        tick(&mut run);
        tick(&mut run);
        assert!(run.finish.is_none());
        tick(&mut run);
        let finish = run.finish.expect("finish line spawns at the target frame");
        assert!((finish.y - (FINISH_SPAWN_Y + run.effective_speed())).abs() < 1e-4);

        // Let it travel to the bottom; the win fires once it passes
        // height - FINISH_WIN_MARGIN
        let mut won = false;
        for _ in 0..2000 {
            let events = tick(&mut run);
            if events.contains(&TickEvent::FinishCrossed) {
                won = true;
                break;
            }
        }
        assert!(won);
        let finish = run.finish.unwrap();
        assert!(finish.y > run.height - FINISH_WIN_MARGIN);
        assert!(finish.y <= run.height - FINISH_WIN_MARGIN + run.effective_speed());
    }

    #[test]
    fn test_spawn_timer_drives_obstacles() {
        let mut run = endless_run(Difficulty::Easy);
        // Easy spawn rate is 140; the first obstacle must appear within the
        // jittered window and later ones keep arriving.
        let mut total_spawned = 0;
        let mut seen = 0;
        for _ in 0..1000 {
            tick(&mut run);
            if run.obstacles.len() > seen {
                total_spawned += run.obstacles.len() - seen;
            }
            seen = run.obstacles.len();
        }
        // 1000 frames at a 120..140 frame cadence
        assert!((6..=9).contains(&total_spawned), "spawned {total_spawned}");
    }
}
