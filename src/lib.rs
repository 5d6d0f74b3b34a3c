//! Lane Rush - a lane-dodging arcade car game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (spawning, movement, collisions, scoring)
//! - `controller`: Run lifecycle state machine and screen navigation
//! - `profile`: Persisted wallet/progression and unlock rules
//! - `store`: Key-value persistence (LocalStorage on web)
//! - `ads`: Monetization gateway capability (real SDK or no-op)
//! - `renderer`: WebGPU rendering pipeline

pub mod ads;
pub mod audio;
pub mod catalog;
pub mod controller;
pub mod profile;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod store;

pub use controller::App;
pub use profile::Profile;
pub use settings::{Settings, Theme};

/// Game configuration constants
pub mod consts {
    /// Number of lanes on the road
    pub const LANE_COUNT: usize = 3;

    /// Road region as fractions of the display width
    pub const ROAD_X_FRACTION: f32 = 0.14;
    pub const ROAD_W_FRACTION: f32 = 0.72;

    /// Player car bounding box
    pub const PLAYER_WIDTH: f32 = 56.0;
    pub const PLAYER_HEIGHT: f32 = 110.0;
    /// Player car sits this far above the bottom edge
    pub const PLAYER_BOTTOM_OFFSET: f32 = 140.0;

    /// Obstacle bounding box and spawn position
    pub const OBSTACLE_WIDTH: f32 = 56.0;
    pub const OBSTACLE_HEIGHT: f32 = 120.0;
    pub const OBSTACLE_SPAWN_Y: f32 = -150.0;
    /// Obstacles are pruned once y exceeds height + this margin
    pub const OBSTACLE_PRUNE_MARGIN: f32 = 200.0;

    /// Coin bounding box and spawn position
    pub const COIN_SIZE: f32 = 36.0;
    pub const COIN_SPAWN_Y: f32 = -80.0;
    pub const COIN_PRUNE_MARGIN: f32 = 80.0;
    /// Wallet/run credit per coin picked up
    pub const COIN_VALUE: u32 = 5;

    /// Endless mode scores one point every this many frames
    pub const SCORE_INTERVAL_FRAMES: u64 = 12;

    /// Finish line (adventure mode)
    pub const FINISH_SPAWN_Y: f32 = -250.0;
    /// The run is won once the finish line passes height - this margin
    pub const FINISH_WIN_MARGIN: f32 = 200.0;

    /// Obstacle spawn interval: max(MIN, spawn_rate - U(0, JITTER)) frames
    pub const OBSTACLE_INTERVAL_MIN: u32 = 8;
    pub const OBSTACLE_INTERVAL_JITTER: f32 = 20.0;

    /// Coin spawn interval: max(MIN, BASE - U(0, JITTER)) frames
    pub const COIN_INTERVAL_MIN: u32 = 12;
    pub const COIN_INTERVAL_BASE: f32 = 900.0;
    pub const COIN_INTERVAL_JITTER: f32 = 200.0;

    /// Adventure mode: the finish line spawns once the frame counter
    /// reaches FINISH_BASE_FRAMES + level * FINISH_FRAMES_PER_LEVEL
    pub const FINISH_BASE_FRAMES: u64 = 1800;
    pub const FINISH_FRAMES_PER_LEVEL: u64 = 90;

    /// Levels per season; completing them all gates the next season
    pub const SEASON_LEVELS: u32 = 100;

    /// Winning an adventure level pays max(WIN_REWARD_MIN, score / 10)
    pub const WIN_REWARD_MIN: u32 = 10;
}
