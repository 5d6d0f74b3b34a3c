//! Run lifecycle state machine, screen navigation, and the top-level
//! application state.
//!
//! `App` owns everything mutable - profile, settings, store, the active run -
//! and every transition goes through it. The shell (web or native) only
//! forwards inputs and renders snapshots; it never touches simulation state
//! directly.

use thiserror::Error;

use crate::catalog::Season;
use crate::consts::{COIN_VALUE, SEASON_LEVELS, WIN_REWARD_MIN};
use crate::profile::{AdWatch, Profile, ProgressError};
use crate::settings::Settings;
use crate::sim::{Mode, RunState, Steer, TickEvent, tick};
use crate::store::Store;

/// Which screen the player is on. Rendering is the shell's problem; only the
/// transitions (and their gating) live here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    MainMenu,
    ModeSelect,
    EndlessMenu,
    SeasonSelect,
    LevelSelect(Season),
    Garage,
    Game,
}

/// How a finished run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Won { reward: u64 },
    Lost { score: u32 },
}

/// Run lifecycle states
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Idle,
    Running,
    Paused,
    Ended(Outcome),
}

/// A selection the controller refuses. The UI should never offer these, but
/// they are enforced here regardless.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GateError {
    #[error("Complete all {prior} levels to unlock {season}")]
    SeasonLocked { season: Season, prior: Season },
    #[error("{season} level {level} is locked")]
    LevelLocked { season: Season, level: u32 },
}

/// Top-level application state
pub struct App {
    store: Box<dyn Store>,
    pub profile: Profile,
    pub settings: Settings,
    screen: Screen,
    phase: RunPhase,
    run: Option<RunState>,
    viewport: (f32, f32),
}

impl App {
    pub fn new(store: Box<dyn Store>) -> Self {
        let profile = Profile::load(store.as_ref());
        let settings = Settings::load(store.as_ref());
        Self {
            store,
            profile,
            settings,
            screen: Screen::MainMenu,
            phase: RunPhase::Idle,
            run: None,
            viewport: (960.0, 640.0),
        }
    }

    pub fn store(&self) -> &dyn Store {
        self.store.as_ref()
    }

    pub fn screen(&self) -> Screen {
        self.screen
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    /// Read-only snapshot of the active run, for rendering and the HUD
    pub fn run(&self) -> Option<&RunState> {
        self.run.as_ref()
    }

    /// New display size; recomputes lane geometry for any active run
    pub fn resize(&mut self, width: f32, height: f32) {
        self.viewport = (width, height);
        if let Some(run) = &mut self.run {
            run.resize(width, height);
        }
    }

    /// Navigate between menu screens. Season gating happens here so a locked
    /// season's level list can never be shown.
    pub fn goto(&mut self, screen: Screen) -> Result<(), GateError> {
        if let Screen::LevelSelect(season) = screen {
            if !self.profile.season_unlocked(season) {
                // prior() is Some for every gated season
                let prior = season.prior().unwrap_or(season);
                return Err(GateError::SeasonLocked { season, prior });
            }
        }
        self.screen = screen;
        Ok(())
    }

    /// Idle/Ended -> Running: reset and configure a fresh run. Rejects
    /// adventure levels beyond the unlocked boundary.
    pub fn start_run(&mut self, mode: Mode, seed: u64) -> Result<(), GateError> {
        if let Mode::Adventure { season, level } = mode {
            if !self.profile.season_unlocked(season) {
                let prior = season.prior().unwrap_or(season);
                return Err(GateError::SeasonLocked { season, prior });
            }
            if level < 1
                || level > SEASON_LEVELS
                || level > self.profile.unlocked_level(season)
            {
                return Err(GateError::LevelLocked { season, level });
            }
        }

        let (width, height) = self.viewport;
        self.run = Some(RunState::new(mode, width, height, seed));
        self.phase = RunPhase::Running;
        self.screen = Screen::Game;
        log::info!("Run started: {mode:?}");
        Ok(())
    }

    /// Running -> Paused. Idempotent: pausing anything else is a no-op.
    pub fn pause(&mut self) {
        if self.phase == RunPhase::Running {
            self.phase = RunPhase::Paused;
        }
    }

    /// Paused -> Running. Idempotent.
    pub fn resume(&mut self) {
        if self.phase == RunPhase::Paused {
            self.phase = RunPhase::Running;
        }
    }

    pub fn toggle_pause(&mut self) {
        match self.phase {
            RunPhase::Running => self.phase = RunPhase::Paused,
            RunPhase::Paused => self.phase = RunPhase::Running,
            _ => {}
        }
    }

    /// The host surface lost foreground focus (tab hidden, window blur)
    pub fn focus_lost(&mut self) {
        self.pause();
    }

    /// The host surface regained foreground focus
    pub fn focus_gained(&mut self) {
        self.resume();
    }

    /// Lane-change input; dropped entirely unless a run is live
    pub fn steer(&mut self, dir: Steer) -> bool {
        if self.phase != RunPhase::Running {
            return false;
        }
        match &mut self.run {
            Some(run) => run.steer(dir),
            None => false,
        }
    }

    /// One display frame. Ticks the simulation when Running and applies the
    /// resulting events to the persisted profile; otherwise does nothing.
    pub fn frame(&mut self) -> Vec<TickEvent> {
        if self.phase != RunPhase::Running {
            return Vec::new();
        }
        let Some(run) = &mut self.run else {
            return Vec::new();
        };

        let events = tick(run);
        let mode = run.mode;
        let score = run.score;
        let frame = run.frame;

        for event in &events {
            match event {
                TickEvent::CoinCollected => {
                    self.profile
                        .add_coins(self.store.as_ref(), u64::from(COIN_VALUE));
                }
                TickEvent::ScoreChanged(score) => {
                    self.profile.record_score(self.store.as_ref(), *score);
                }
                TickEvent::Crashed => {
                    self.phase = RunPhase::Ended(Outcome::Lost { score });
                    log::info!("Run lost at frame {frame} with score {score}");
                }
                TickEvent::FinishCrossed => {
                    let reward = u64::from((score / 10).max(WIN_REWARD_MIN));
                    self.profile.add_coins(self.store.as_ref(), reward);
                    if let Mode::Adventure { season, level } = mode {
                        self.profile
                            .unlock_next_level(self.store.as_ref(), season, level);
                    }
                    self.phase = RunPhase::Ended(Outcome::Won { reward });
                    log::info!("Run won; reward {reward} coins");
                }
            }
        }

        events
    }

    /// Ended -> Running with the same configuration
    pub fn retry(&mut self, seed: u64) -> Result<(), GateError> {
        let RunPhase::Ended(_) = self.phase else {
            return Ok(());
        };
        match self.run.as_ref().map(|r| r.mode) {
            Some(mode) => self.start_run(mode, seed),
            None => Ok(()),
        }
    }

    /// Ended(Won) -> Running at the next adventure level
    pub fn next_level(&mut self, seed: u64) -> Result<(), GateError> {
        let RunPhase::Ended(Outcome::Won { .. }) = self.phase else {
            return Ok(());
        };
        match self.run.as_ref().map(|r| r.mode) {
            Some(Mode::Adventure { season, level }) => {
                self.start_run(Mode::Adventure { season, level: level + 1 }, seed)
            }
            _ => Ok(()),
        }
    }

    /// Any state -> Idle at the main menu; the run is discarded
    pub fn to_menu(&mut self) {
        self.run = None;
        self.phase = RunPhase::Idle;
        self.screen = Screen::MainMenu;
    }

    // Progression and preference operations, routed through App so call
    // sites never juggle the profile and store borrows themselves.

    pub fn purchase_vehicle(&mut self, id: &str) -> Result<(), ProgressError> {
        self.profile.purchase(self.store.as_ref(), id)
    }

    pub fn select_vehicle(&mut self, id: &str) -> Result<(), ProgressError> {
        self.profile.select_vehicle(self.store.as_ref(), id)
    }

    pub fn record_ad_watch(&mut self, id: &str, granted: bool) -> AdWatch {
        self.profile.record_ad_watch(self.store.as_ref(), id, granted)
    }

    pub fn toggle_theme(&mut self) {
        self.settings.toggle_theme(self.store.as_ref());
    }

    /// Returns the new music state
    pub fn toggle_music(&mut self) -> bool {
        self.settings.toggle_music(self.store.as_ref());
        self.settings.music
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::state::{Coin, Difficulty, Obstacle};
    use crate::sim::{FinishLine, SpawnTimer};
    use crate::store::MemoryStore;

    fn app() -> App {
        App::new(Box::new(MemoryStore::new()))
    }

    fn endless() -> Mode {
        Mode::Endless {
            tier: Difficulty::Medium,
        }
    }

    /// Stop the spawners so tests control exactly what is on screen
    fn quiet(app: &mut App) {
        let run = app.run.as_mut().unwrap();
        run.obstacle_timer = SpawnTimer::new(u32::MAX);
        run.coin_timer = SpawnTimer::new(u32::MAX);
    }

    #[test]
    fn test_start_resets_run_state() {
        let mut app = app();
        app.start_run(endless(), 1).unwrap();
        assert_eq!(app.phase(), RunPhase::Running);
        assert_eq!(app.screen(), Screen::Game);

        let run = app.run().unwrap();
        assert_eq!(run.frame, 0);
        assert_eq!(run.score, 0);
        assert_eq!(run.coins_run, 0);
        assert!(run.obstacles.is_empty());
        assert!(run.coins.is_empty());
    }

    #[test]
    fn test_pause_resume_idempotent() {
        let mut app = app();
        app.pause(); // Idle: no-op
        assert_eq!(app.phase(), RunPhase::Idle);

        app.start_run(endless(), 1).unwrap();
        app.focus_lost();
        assert_eq!(app.phase(), RunPhase::Paused);
        app.focus_lost();
        assert_eq!(app.phase(), RunPhase::Paused);

        app.focus_gained();
        assert_eq!(app.phase(), RunPhase::Running);
        app.focus_gained();
        assert_eq!(app.phase(), RunPhase::Running);
    }

    #[test]
    fn test_input_ignored_unless_running() {
        let mut app = app();
        assert!(!app.steer(Steer::Left));

        app.start_run(endless(), 1).unwrap();
        app.pause();
        assert!(!app.steer(Steer::Left));
        assert_eq!(app.run().unwrap().player.lane, 1);
        assert!(app.frame().is_empty());
        let frame_before = app.run().unwrap().frame;
        app.frame();
        assert_eq!(app.run().unwrap().frame, frame_before);

        app.resume();
        assert!(app.steer(Steer::Left));
        assert_eq!(app.run().unwrap().player.lane, 0);
    }

    #[test]
    fn test_locked_level_rejected() {
        let mut app = app();
        let err = app
            .start_run(
                Mode::Adventure {
                    season: Season::Summer,
                    level: 2,
                },
                1,
            )
            .unwrap_err();
        assert_eq!(
            err,
            GateError::LevelLocked {
                season: Season::Summer,
                level: 2
            }
        );
        assert_eq!(app.phase(), RunPhase::Idle);
        assert!(app.run().is_none());
    }

    #[test]
    fn test_locked_season_rejected() {
        let mut app = app();
        let err = app.goto(Screen::LevelSelect(Season::Winter)).unwrap_err();
        assert_eq!(
            err,
            GateError::SeasonLocked {
                season: Season::Winter,
                prior: Season::Summer
            }
        );
        assert_eq!(app.screen(), Screen::MainMenu);

        // Unlock summer fully; winter opens up
        for level in 1..100 {
            app.profile
                .unlock_next_level(app.store.as_ref(), Season::Summer, level);
        }
        app.goto(Screen::LevelSelect(Season::Winter)).unwrap();
        assert_eq!(app.screen(), Screen::LevelSelect(Season::Winter));
    }

    #[test]
    fn test_coin_pickup_credits_wallet_immediately() {
        let mut app = app();
        app.start_run(endless(), 1).unwrap();
        quiet(&mut app);

        {
            let run = app.run.as_mut().unwrap();
            let speed = run.effective_speed();
            for i in 0..3 {
                run.coins.push(Coin {
                    x: run.player.x,
                    y: run.player.y - speed * (i + 1) as f32 + 1.0,
                    lane: run.player.lane,
                });
            }
        }

        let mut collected = 0;
        for _ in 0..3 {
            collected += app
                .frame()
                .iter()
                .filter(|e| **e == TickEvent::CoinCollected)
                .count();
        }
        assert_eq!(collected, 3);
        assert_eq!(app.run().unwrap().coins_run, 15);
        assert_eq!(app.profile.coins(), 15);
        // Persisted as it happened, not deferred to run end
        assert_eq!(
            app.store().get(crate::store::keys::COINS).as_deref(),
            Some("15")
        );
    }

    #[test]
    fn test_crash_ends_run_without_reward() {
        let mut app = app();
        app.start_run(endless(), 1).unwrap();
        quiet(&mut app);
        {
            let run = app.run.as_mut().unwrap();
            run.score = 77;
            run.obstacles.push(Obstacle {
                x: run.player.x,
                y: run.player.y,
                lane: run.player.lane,
                sprite: 0,
            });
        }

        app.frame();
        assert_eq!(app.phase(), RunPhase::Ended(Outcome::Lost { score: 77 }));
        assert_eq!(app.profile.coins(), 0);
        // Ended runs no longer tick
        assert!(app.frame().is_empty());
    }

    #[test]
    fn test_win_pays_reward_and_unlocks() {
        let mut app = app();
        app.start_run(
            Mode::Adventure {
                season: Season::Summer,
                level: 1,
            },
            1,
        )
        .unwrap();
        quiet(&mut app);
        {
            let run = app.run.as_mut().unwrap();
            run.score = 120;
            // Finish line one tick away from the win threshold
            run.finish = Some(FinishLine {
                y: run.height - crate::consts::FINISH_WIN_MARGIN,
            });
        }

        let events = app.frame();
        assert!(events.contains(&TickEvent::FinishCrossed));
        assert_eq!(app.phase(), RunPhase::Ended(Outcome::Won { reward: 12 }));
        assert_eq!(app.profile.coins(), 12);
        assert_eq!(app.profile.unlocked_level(Season::Summer), 2);
    }

    #[test]
    fn test_win_reward_floor() {
        let mut app = app();
        app.start_run(
            Mode::Adventure {
                season: Season::Summer,
                level: 1,
            },
            1,
        )
        .unwrap();
        quiet(&mut app);
        {
            let run = app.run.as_mut().unwrap();
            // Adventure runs never score; reward falls back to the floor
            run.finish = Some(FinishLine {
                y: run.height - crate::consts::FINISH_WIN_MARGIN,
            });
        }
        app.frame();
        assert_eq!(app.phase(), RunPhase::Ended(Outcome::Won { reward: 10 }));
    }

    #[test]
    fn test_retry_keeps_configuration() {
        let mut app = app();
        app.start_run(endless(), 1).unwrap();
        quiet(&mut app);
        {
            let run = app.run.as_mut().unwrap();
            run.obstacles.push(Obstacle {
                x: run.player.x,
                y: run.player.y,
                lane: run.player.lane,
                sprite: 0,
            });
        }
        app.frame();
        assert!(matches!(app.phase(), RunPhase::Ended(Outcome::Lost { .. })));

        app.retry(2).unwrap();
        assert_eq!(app.phase(), RunPhase::Running);
        assert_eq!(app.run().unwrap().mode, endless());
        assert_eq!(app.run().unwrap().frame, 0);
    }

    #[test]
    fn test_next_level_after_win() {
        let mut app = app();
        app.start_run(
            Mode::Adventure {
                season: Season::Summer,
                level: 1,
            },
            1,
        )
        .unwrap();
        quiet(&mut app);
        {
            let run = app.run.as_mut().unwrap();
            run.finish = Some(FinishLine {
                y: run.height - crate::consts::FINISH_WIN_MARGIN,
            });
        }
        app.frame();

        app.next_level(2).unwrap();
        assert_eq!(app.phase(), RunPhase::Running);
        assert_eq!(
            app.run().unwrap().mode,
            Mode::Adventure {
                season: Season::Summer,
                level: 2
            }
        );
    }

    #[test]
    fn test_to_menu_discards_run() {
        let mut app = app();
        app.start_run(endless(), 1).unwrap();
        app.to_menu();
        assert_eq!(app.phase(), RunPhase::Idle);
        assert_eq!(app.screen(), Screen::MainMenu);
        assert!(app.run().is_none());
    }

    #[test]
    fn test_finish_line_spawn_is_adventure_only() {
        let mut app = app();
        app.start_run(endless(), 1).unwrap();
        quiet(&mut app);
        for _ in 0..3000 {
            app.frame();
        }
        assert_eq!(app.phase(), RunPhase::Running);
        assert!(app.run().unwrap().finish.is_none());
    }
}
