//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - One tick per display frame
//! - Seeded RNG only
//! - No rendering or platform dependencies

pub mod collision;
pub mod spawn;
pub mod state;
pub mod tick;

pub use collision::{Aabb, overlaps};
pub use spawn::SpawnTimer;
pub use state::{
    Coin, Difficulty, FinishLine, LaneGeometry, Mode, Obstacle, Player, RunState, Steer,
};
pub use tick::{TickEvent, tick};
